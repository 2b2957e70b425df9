//! Ring-road traffic simulation core
//!
//! The road state, the Nagel–Schreckenberg update rule and the loop that
//! drives it. Nothing here renders or parses; collaborators observe the
//! loop through [`SnapshotSink`].

mod error;
mod road;
mod rules;
mod sink;
mod stats;
mod types;
mod world;

pub use error::SimError;
pub use road::SimulationState;
pub use rules::{accelerate, advance, brake_for_gap, random_brake};
pub use sink::{SnapshotRecorder, SnapshotSink};
pub use stats::{density_profile, FlowStats, StepStats};
pub use types::{
    InitPolicy, InitialVelocity, Parameters, Placement, Vehicle, VehicleId, MOVING_START_CAP,
};
pub use world::{run, Run, Simulation};
