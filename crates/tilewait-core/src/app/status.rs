//! Status views - キューの観測用ビュー
//!
//! The queue never reports outcomes back to the enqueuer. These views are
//! what operators and the deployment orchestrator can see instead.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{TileId, TileKind};

/// Read-only snapshot of one queued tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingTile {
    pub tile_id: TileId,
    pub kind: TileKind,
    pub questions: usize,
    pub attempts: u32,
    pub enqueued_at: DateTime<Utc>,
}

/// What happened to one entry during a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOutcome {
    /// Tile was ONLINE and the batch was applied; entry removed.
    Applied,
    /// Not ready yet; entry kept for the next cycle.
    Retained,
    /// Attempt ceiling reached; entry removed, payload discarded.
    Exhausted,
    /// Status check or apply failed (or panicked); entry removed without retry.
    Failed,
    /// The manager does not handle this tile kind; entry removed.
    Misconfigured,
    /// The entry was replaced or removed after the snapshot was taken;
    /// the stale copy was skipped.
    Superseded,
}

/// Per-cycle tally, mostly for logs and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub applied: usize,
    pub retained: usize,
    pub exhausted: usize,
    pub failed: usize,
    pub misconfigured: usize,
    pub superseded: usize,
}

impl CycleReport {
    pub fn record(&mut self, outcome: EntryOutcome) {
        match outcome {
            EntryOutcome::Applied => self.applied += 1,
            EntryOutcome::Retained => self.retained += 1,
            EntryOutcome::Exhausted => self.exhausted += 1,
            EntryOutcome::Failed => self.failed += 1,
            EntryOutcome::Misconfigured => self.misconfigured += 1,
            EntryOutcome::Superseded => self.superseded += 1,
        }
    }

    /// Number of entries looked at in the cycle.
    pub fn processed(&self) -> usize {
        self.applied
            + self.retained
            + self.exhausted
            + self.failed
            + self.misconfigured
            + self.superseded
    }
}

/// Result of `TileExampleQueue::wait_until_drained`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    Drained,
    /// Gave up waiting; the worker keeps processing what is left.
    TimedOut { remaining: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_tallies_outcomes() {
        let mut report = CycleReport::default();
        for outcome in [
            EntryOutcome::Applied,
            EntryOutcome::Retained,
            EntryOutcome::Retained,
            EntryOutcome::Failed,
        ] {
            report.record(outcome);
        }
        assert_eq!(report.applied, 1);
        assert_eq!(report.retained, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.processed(), 4);
    }
}
