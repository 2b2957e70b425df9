//! Simulation loop that drives the ring road
//!
//! Owns the parameters, the seeded random stream and the current
//! generation. Each step applies the update rule once and hands the new
//! generation to every registered sink.

use log::{debug, error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::error::SimError;
use super::road::SimulationState;
use super::rules;
use super::sink::SnapshotSink;
use super::types::{InitPolicy, Parameters};

/// The main simulation loop
pub struct Simulation<'a> {
    /// Current generation
    state: SimulationState,

    /// Single random stream for initialization and braking draws
    rng: StdRng,

    /// Snapshot consumers, called in registration order
    sinks: Vec<Box<dyn SnapshotSink + 'a>>,

    /// Verify the road after every step
    check_invariants: bool,

    /// Set once an invariant check fails; no further steps are taken
    halted: Option<SimError>,
}

impl<'a> Simulation<'a> {
    fn new_internal(state: SimulationState, rng: StdRng) -> Self {
        Self {
            state,
            rng,
            sinks: Vec::new(),
            check_invariants: cfg!(debug_assertions),
            halted: None,
        }
    }

    /// Create a simulation with vehicles placed by `policy`, seeded for reproducible runs
    pub fn new(params: Parameters, policy: InitPolicy, seed: u64) -> Result<Self, SimError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let state = SimulationState::initialize(params, policy, &mut rng)?;

        info!(
            "Initialized ring road: L={}, n={}, vmax={}, p={}, density={:.2}, seed={}",
            params.length,
            params.vehicle_count,
            params.vmax,
            params.brake_probability,
            params.density(),
            seed
        );

        Ok(Self::new_internal(state, rng))
    }

    /// Create a simulation starting from an explicit configuration
    pub fn from_state(state: SimulationState, seed: u64) -> Result<Self, SimError> {
        state.check_invariants()?;
        Ok(Self::new_internal(state, StdRng::seed_from_u64(seed)))
    }

    /// Turn per-step invariant checks on or off
    pub fn with_invariant_checks(mut self, enabled: bool) -> Self {
        self.check_invariants = enabled;
        self
    }

    /// Add a sink that will receive every published snapshot
    pub fn register<S: SnapshotSink + 'a>(&mut self, sink: S) {
        self.sinks.push(Box::new(sink));
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn params(&self) -> &Parameters {
        self.state.params()
    }

    /// Deliver the current generation to every sink
    pub fn publish(&mut self) {
        for sink in &mut self.sinks {
            sink.consume(&self.state);
        }
    }

    /// Apply the update rule once, publish and return the new generation
    pub fn step(&mut self) -> Result<&SimulationState, SimError> {
        if let Some(halted) = &self.halted {
            return Err(halted.clone());
        }

        let next = rules::advance(&self.state, &mut self.rng);

        if self.check_invariants {
            if let Err(violation) = next.check_invariants() {
                error!("Aborting run: {}", violation);
                self.halted = Some(violation.clone());
                return Err(violation);
            }
        }

        self.state = next;

        debug!(
            "Step {}: positions={:?} velocities={:?}",
            self.state.step(),
            self.state.positions(),
            self.state.velocities()
        );

        self.publish();
        Ok(&self.state)
    }

    /// Step `steps` times, stopping at the first error
    pub fn run_steps(&mut self, steps: u64) -> Result<&SimulationState, SimError> {
        for _ in 0..steps {
            self.step()?;
        }
        Ok(&self.state)
    }

    /// Turn this simulation into a lazy sequence of the next `steps` generations
    pub fn into_run(self, steps: u64) -> Run<'a> {
        Run {
            simulation: self,
            remaining: steps,
            finished: false,
        }
    }
}

/// Lazy, finite sequence of generations produced by [`run`]
pub struct Run<'a> {
    simulation: Simulation<'a>,
    remaining: u64,
    finished: bool,
}

impl Iterator for Run<'_> {
    type Item = Result<SimulationState, SimError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        match self.simulation.step() {
            Ok(state) => Some(Ok(state.clone())),
            Err(violation) => {
                self.finished = true;
                Some(Err(violation))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finished {
            (0, Some(0))
        } else {
            (0, usize::try_from(self.remaining).ok())
        }
    }
}

/// Generations 1 through `steps` of a fresh run
///
/// Calling again with the same arguments replays the same sequence.
pub fn run(
    steps: u64,
    params: Parameters,
    policy: InitPolicy,
    seed: u64,
) -> Result<Run<'static>, SimError> {
    Ok(Simulation::new(params, policy, seed)?.into_run(steps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::sink::SnapshotRecorder;

    #[test]
    fn test_step_publishes_to_sinks() {
        let params = Parameters::new(20, 4, 3, 0.3).unwrap();
        let mut recorder = SnapshotRecorder::new();
        {
            let mut simulation = Simulation::new(params, InitPolicy::default(), 5).unwrap();
            simulation.register(&mut recorder);
            simulation.publish();
            simulation.run_steps(3).unwrap();
            assert_eq!(simulation.state().step(), 3);
        }
        assert_eq!(recorder.steps(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_run_yields_requested_steps() {
        let params = Parameters::new(30, 10, 5, 0.5).unwrap();
        let steps: Vec<u64> = run(6, params, InitPolicy::default(), 9)
            .unwrap()
            .map(|state| state.unwrap().step())
            .collect();
        assert_eq!(steps, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_from_state_rejects_corrupt_state() {
        let params = Parameters::new(10, 2, 2, 0.0).unwrap();
        let state = SimulationState::from_vehicles(params, &[(0, 0), (5, 0)]).unwrap();
        let corrupt = state.next_generation(Vec::new());
        assert!(matches!(
            Simulation::from_state(corrupt, 0),
            Err(SimError::InvariantViolation { .. })
        ));
    }

    #[test]
    fn test_invariant_violation_aborts_run() {
        let params = Parameters::new(10, 2, 2, 0.0).unwrap();
        let state = SimulationState::from_vehicles(params, &[(0, 0), (5, 0)]).unwrap();
        let corrupt = state.next_generation(Vec::new());
        let mut recorder = SnapshotRecorder::new();
        {
            let mut simulation =
                Simulation::new_internal(corrupt.clone(), StdRng::seed_from_u64(0))
                    .with_invariant_checks(true);
            simulation.register(&mut recorder);

            let first = simulation.step().map(|state| state.step());
            assert!(matches!(first, Err(SimError::InvariantViolation { .. })));

            // The loop stays on its last good state and repeats the same error
            let second = simulation.step().map(|state| state.step());
            assert_eq!(first, second);
            assert_eq!(simulation.state(), &corrupt);
        }
        assert!(recorder.snapshots.is_empty());

        let run = Simulation::new_internal(corrupt, StdRng::seed_from_u64(0))
            .with_invariant_checks(true)
            .into_run(5);
        let items: Vec<Result<SimulationState, SimError>> = run.collect();
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(SimError::InvariantViolation { .. })));
    }
}
