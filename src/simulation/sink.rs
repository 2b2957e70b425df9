//! Snapshot consumers
//!
//! Renderers and statistics plug into the simulation loop through
//! [`SnapshotSink`]. They receive each generation by shared reference, once
//! per step, in step order.

use super::road::SimulationState;

/// Anything that wants to observe the road step by step
pub trait SnapshotSink {
    fn consume(&mut self, snapshot: &SimulationState);
}

impl<S: SnapshotSink + ?Sized> SnapshotSink for &mut S {
    fn consume(&mut self, snapshot: &SimulationState) {
        (**self).consume(snapshot);
    }
}

/// Keeps a copy of every snapshot it sees
#[derive(Debug, Default)]
pub struct SnapshotRecorder {
    pub snapshots: Vec<SimulationState>,
}

impl SnapshotRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> Vec<u64> {
        self.snapshots.iter().map(|snapshot| snapshot.step()).collect()
    }
}

impl SnapshotSink for SnapshotRecorder {
    fn consume(&mut self, snapshot: &SimulationState) {
        self.snapshots.push(snapshot.clone());
    }
}
