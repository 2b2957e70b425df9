//! Core types for the ring-road simulation
//!
//! Plain data shared by the road, the update rule and every collaborator.

use super::error::SimError;

/// A stable identifier for a vehicle, assigned once at initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VehicleId(pub usize);

/// A vehicle on the ring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vehicle {
    pub id: VehicleId,
    /// Cell index, always in `0..length`
    pub position: usize,
    /// Cells moved per step, always in `0..=vmax`
    pub velocity: usize,
}

impl Vehicle {
    pub fn new(id: VehicleId, position: usize, velocity: usize) -> Self {
        Self {
            id,
            position,
            velocity,
        }
    }

    /// The same vehicle after moving `velocity` cells around a ring of `length` cells
    pub fn moved(&self, velocity: usize, length: usize) -> Self {
        Self {
            id: self.id,
            position: (self.position + velocity) % length,
            velocity,
        }
    }
}

/// Fixed configuration of a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameters {
    /// Number of cells on the ring (L)
    pub length: usize,
    /// Number of vehicles (n)
    pub vehicle_count: usize,
    /// Velocity ceiling shared by all vehicles
    pub vmax: usize,
    /// Per-vehicle, per-step probability of a random slowdown (p)
    pub brake_probability: f64,
}

impl Parameters {
    /// Build validated parameters
    ///
    /// Rejects an empty road, more vehicles than cells, and a braking
    /// probability outside `[0, 1]` (NaN included).
    pub fn new(
        length: usize,
        vehicle_count: usize,
        vmax: usize,
        brake_probability: f64,
    ) -> Result<Self, SimError> {
        let params = Self {
            length,
            vehicle_count,
            vmax,
            brake_probability,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.length == 0 {
            return Err(SimError::InvalidConfiguration(
                "road length must be positive".to_string(),
            ));
        }
        if self.vehicle_count > self.length {
            return Err(SimError::InvalidConfiguration(format!(
                "{} vehicles do not fit on {} cells",
                self.vehicle_count, self.length
            )));
        }
        if !(0.0..=1.0).contains(&self.brake_probability) {
            return Err(SimError::InvalidConfiguration(format!(
                "braking probability {} is outside [0, 1]",
                self.brake_probability
            )));
        }
        Ok(())
    }

    /// Vehicles per cell
    pub fn density(&self) -> f64 {
        self.vehicle_count as f64 / self.length as f64
    }
}

/// Where vehicles start on the ring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    /// Vehicle `i` at cell `floor(i * L / n)`
    #[default]
    Even,
    /// `n` distinct cells sampled uniformly
    Random,
    /// Vehicle `i` at cell `2i + 1`, leaving one free cell behind every vehicle
    Alternate,
}

/// How starting velocities are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitialVelocity {
    /// Every vehicle starts at rest
    #[default]
    Zero,
    /// Uniform in `0..=vmax`, drawn in ascending position order
    Random,
    /// Uniform in `1..=min(3, vmax)`, so every vehicle starts rolling
    Moving,
}

/// Fastest starting velocity under `InitialVelocity::Moving`
pub const MOVING_START_CAP: usize = 3;

/// Initialization policy for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InitPolicy {
    pub placement: Placement,
    pub velocity: InitialVelocity,
}

impl InitPolicy {
    pub fn new(placement: Placement, velocity: InitialVelocity) -> Self {
        Self {
            placement,
            velocity,
        }
    }
}
