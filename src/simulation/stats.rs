//! Aggregate flow statistics
//!
//! Standalone collaborators that only look at snapshots.

use log::info;

use super::road::SimulationState;
use super::sink::SnapshotSink;

/// Smoothing kernel for the density profile, centred on the cell
const DENSITY_KERNEL: [(isize, f64); 5] = [(-2, 0.25), (-1, 0.5), (0, 1.0), (1, 0.5), (2, 0.25)];

/// Smoothed occupancy of every cell, wrapping around the ring
pub fn density_profile(state: &SimulationState) -> Vec<f64> {
    let length = state.params().length;
    let mut occupancy = vec![0.0; length];
    for vehicle in state.vehicles() {
        occupancy[vehicle.position] = 1.0;
    }

    (0..length as isize)
        .map(|cell| {
            DENSITY_KERNEL
                .iter()
                .map(|&(offset, weight)| {
                    let neighbour = (cell + offset).rem_euclid(length as isize) as usize;
                    weight * occupancy[neighbour]
                })
                .sum()
        })
        .collect()
}

/// Measurements of a single generation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepStats {
    pub step: u64,
    pub mean_velocity: f64,
    /// Vehicles passing a fixed point per step, averaged over the ring
    pub flow: f64,
    pub stopped: usize,
    /// Size of the longest bumper-to-bumper cluster of stopped vehicles
    pub largest_jam: usize,
}

impl StepStats {
    pub fn of(state: &SimulationState) -> Self {
        let vehicles = state.vehicles();
        let total_velocity: usize = vehicles.iter().map(|vehicle| vehicle.velocity).sum();
        let mean_velocity = if vehicles.is_empty() {
            0.0
        } else {
            total_velocity as f64 / vehicles.len() as f64
        };

        Self {
            step: state.step(),
            mean_velocity,
            flow: total_velocity as f64 / state.params().length as f64,
            stopped: vehicles.iter().filter(|vehicle| vehicle.velocity == 0).count(),
            largest_jam: largest_jam(state),
        }
    }
}

fn largest_jam(state: &SimulationState) -> usize {
    let vehicles = state.vehicles();
    let count = vehicles.len();
    let gaps = state.gaps();
    let stopped: Vec<bool> = vehicles.iter().map(|vehicle| vehicle.velocity == 0).collect();

    // Vehicle `i` is stuck directly behind the stopped vehicle `i + 1`
    let linked = |i: usize| stopped[i] && stopped[(i + 1) % count] && gaps[i] == 0;

    let Some(break_at) = (0..count).find(|&i| !linked(i)) else {
        return count;
    };

    let start = (break_at + 1) % count;
    let mut largest = 0;
    let mut current = 0;
    for k in 0..count {
        let i = (start + k) % count;
        if stopped[i] {
            current += 1;
            largest = largest.max(current);
        }
        if !linked(i) {
            current = 0;
        }
    }
    largest
}

/// Running totals over a whole run
#[derive(Debug, Clone, Default)]
pub struct FlowStats {
    pub steps_observed: u64,
    pub last_step: u64,
    pub peak_stopped: usize,
    pub largest_jam: usize,
    total_mean_velocity: f64,
    total_flow: f64,
}

impl FlowStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, stats: &StepStats) {
        self.steps_observed += 1;
        self.last_step = stats.step;
        self.peak_stopped = self.peak_stopped.max(stats.stopped);
        self.largest_jam = self.largest_jam.max(stats.largest_jam);
        self.total_mean_velocity += stats.mean_velocity;
        self.total_flow += stats.flow;
    }

    /// Mean velocity averaged over every observed step
    pub fn mean_velocity(&self) -> f64 {
        if self.steps_observed == 0 {
            0.0
        } else {
            self.total_mean_velocity / self.steps_observed as f64
        }
    }

    /// Flow averaged over every observed step
    pub fn mean_flow(&self) -> f64 {
        if self.steps_observed == 0 {
            0.0
        } else {
            self.total_flow / self.steps_observed as f64
        }
    }

    pub fn log_summary(&self) {
        info!("=== SIMULATION COMPLETE ===");
        info!("Steps observed: {}", self.steps_observed);
        info!("Last step: {}", self.last_step);
        info!("Mean velocity: {:.3}", self.mean_velocity());
        info!("Mean flow: {:.3}", self.mean_flow());
        info!("Peak stopped vehicles: {}", self.peak_stopped);
        info!("Largest jam: {}", self.largest_jam);
    }
}

impl SnapshotSink for FlowStats {
    fn consume(&mut self, snapshot: &SimulationState) {
        self.record(&StepStats::of(snapshot));
    }
}
