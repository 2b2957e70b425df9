//! Ring road state
//!
//! A `SimulationState` is one generation of the automaton: the step index,
//! the run parameters and every vehicle sorted by ascending cell. States are
//! never edited after construction; the update rule builds a fresh one each
//! tick.

use log::debug;
use rand::seq::index;
use rand::Rng;

use super::error::SimError;
use super::types::{
    InitPolicy, InitialVelocity, Parameters, Placement, Vehicle, VehicleId, MOVING_START_CAP,
};

/// One generation of the ring road
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    step: u64,
    params: Parameters,
    /// Sorted by position, no two vehicles on the same cell
    vehicles: Vec<Vehicle>,
}

impl SimulationState {
    /// Place `params.vehicle_count` vehicles according to `policy`
    ///
    /// Placement draws come first, then one velocity draw per vehicle in
    /// ascending position order when velocities are random.
    pub fn initialize<R: Rng + ?Sized>(
        params: Parameters,
        policy: InitPolicy,
        rng: &mut R,
    ) -> Result<Self, SimError> {
        params.validate()?;

        let count = params.vehicle_count;
        if policy.placement == Placement::Alternate && 2 * count > params.length {
            return Err(SimError::InvalidConfiguration(format!(
                "{} vehicles need {} cells for alternate placement, road has {}",
                count,
                2 * count,
                params.length
            )));
        }

        let mut positions: Vec<usize> = match policy.placement {
            Placement::Even => (0..count).map(|i| i * params.length / count).collect(),
            Placement::Random => index::sample(rng, params.length, count).into_vec(),
            Placement::Alternate => (0..count).map(|i| 2 * i + 1).collect(),
        };
        positions.sort_unstable();

        let vehicles = positions
            .into_iter()
            .enumerate()
            .map(|(i, position)| {
                let velocity = match policy.velocity {
                    InitialVelocity::Zero => 0,
                    InitialVelocity::Random => rng.random_range(0..=params.vmax),
                    InitialVelocity::Moving => match params.vmax.min(MOVING_START_CAP) {
                        0 => 0,
                        cap => rng.random_range(1..=cap),
                    },
                };
                Vehicle::new(VehicleId(i), position, velocity)
            })
            .collect();

        debug!(
            "Placed {} vehicles on {} cells ({:?})",
            count, params.length, policy
        );

        Ok(Self {
            step: 0,
            params,
            vehicles,
        })
    }

    /// Build a step-0 state from explicit `(position, velocity)` pairs
    ///
    /// Ids are assigned in ascending position order.
    pub fn from_vehicles(params: Parameters, pairs: &[(usize, usize)]) -> Result<Self, SimError> {
        params.validate()?;

        if pairs.len() != params.vehicle_count {
            return Err(SimError::InvalidConfiguration(format!(
                "expected {} vehicles, got {}",
                params.vehicle_count,
                pairs.len()
            )));
        }

        let mut sorted = pairs.to_vec();
        sorted.sort_unstable();

        for window in sorted.windows(2) {
            if window[0].0 == window[1].0 {
                return Err(SimError::InvalidConfiguration(format!(
                    "two vehicles placed on cell {}",
                    window[0].0
                )));
            }
        }

        for &(position, velocity) in &sorted {
            if position >= params.length {
                return Err(SimError::InvalidConfiguration(format!(
                    "cell {} is off a road of length {}",
                    position, params.length
                )));
            }
            if velocity > params.vmax {
                return Err(SimError::InvalidConfiguration(format!(
                    "velocity {} exceeds vmax {}",
                    velocity, params.vmax
                )));
            }
        }

        let vehicles = sorted
            .into_iter()
            .enumerate()
            .map(|(i, (position, velocity))| Vehicle::new(VehicleId(i), position, velocity))
            .collect();

        Ok(Self {
            step: 0,
            params,
            vehicles,
        })
    }

    /// The state one tick later holding `vehicles`, re-sorted by position
    pub(crate) fn next_generation(&self, mut vehicles: Vec<Vehicle>) -> Self {
        vehicles.sort_by_key(|vehicle| vehicle.position);
        Self {
            step: self.step + 1,
            params: self.params,
            vehicles,
        }
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// Vehicles sorted by ascending position
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// `(position, velocity)` pairs sorted by ascending position
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        self.vehicles
            .iter()
            .map(|vehicle| (vehicle.position, vehicle.velocity))
            .collect()
    }

    pub fn positions(&self) -> Vec<usize> {
        self.vehicles.iter().map(|vehicle| vehicle.position).collect()
    }

    pub fn velocities(&self) -> Vec<usize> {
        self.vehicles.iter().map(|vehicle| vehicle.velocity).collect()
    }

    /// Look up a vehicle by id
    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|vehicle| vehicle.id == id)
    }

    /// Empty cells between the vehicle at sorted `index` and the one ahead of it
    ///
    /// A lone vehicle sees `L - 1` free cells up to its own rear.
    pub fn gap_ahead(&self, index: usize) -> Option<usize> {
        let vehicle = self.vehicles.get(index)?;
        let ahead = &self.vehicles[(index + 1) % self.vehicles.len()];
        let length = self.params.length;
        Some((ahead.position + length - vehicle.position - 1) % length)
    }

    /// Gap ahead of every vehicle, in the same order as `vehicles()`
    pub fn gaps(&self) -> Vec<usize> {
        (0..self.vehicles.len())
            .filter_map(|index| self.gap_ahead(index))
            .collect()
    }

    /// Verify the road is consistent
    ///
    /// Checks vehicle count, ordering, distinct in-range cells and the
    /// velocity bound.
    pub fn check_invariants(&self) -> Result<(), SimError> {
        let violation = |reason: String| SimError::InvariantViolation {
            step: self.step,
            reason,
        };

        if self.vehicles.len() != self.params.vehicle_count {
            return Err(violation(format!(
                "{} vehicles on the road, expected {}",
                self.vehicles.len(),
                self.params.vehicle_count
            )));
        }

        for window in self.vehicles.windows(2) {
            if window[0].position == window[1].position {
                return Err(violation(format!(
                    "vehicles {:?} and {:?} share cell {}",
                    window[0].id, window[1].id, window[0].position
                )));
            }
            if window[0].position > window[1].position {
                return Err(violation(format!(
                    "vehicles out of order at cells {} and {}",
                    window[0].position, window[1].position
                )));
            }
        }

        for vehicle in &self.vehicles {
            if vehicle.position >= self.params.length {
                return Err(violation(format!(
                    "vehicle {:?} is on cell {} of a {}-cell road",
                    vehicle.id, vehicle.position, self.params.length
                )));
            }
            if vehicle.velocity > self.params.vmax {
                return Err(violation(format!(
                    "vehicle {:?} has velocity {} above vmax {}",
                    vehicle.id, vehicle.velocity, self.params.vmax
                )));
            }
        }

        Ok(())
    }
}
