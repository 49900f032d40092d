//! Queue entry: one unit of deferred work.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::time::{Duration, Instant};

use super::status::PendingTile;
use crate::domain::{ExampleQuestion, TileId, TileKind};
use crate::ports::TileManager;

/// Deferred batch for one tile.
///
/// Design:
/// - The live map holds exactly one entry per tile id; re-enqueue replaces it.
/// - `questions` is shared and immutable, so snapshots are cheap to clone.
/// - `generation` changes on every enqueue. The worker only touches the live
///   entry whose generation matches the snapshot copy it processed.
#[derive(Clone)]
pub(crate) struct QueueEntry {
    pub kind: TileKind,
    pub questions: Arc<[ExampleQuestion]>,
    pub manager: Arc<dyn TileManager>,

    /// Number of poll cycles this entry has entered.
    pub attempts: u32,
    pub generation: u64,

    /// Monotonic, for elapsed-time logs.
    pub enqueued_at: Instant,
    /// Wall clock, for status views.
    pub enqueued_wall: DateTime<Utc>,
}

impl QueueEntry {
    pub fn new(
        kind: TileKind,
        questions: Vec<ExampleQuestion>,
        manager: Arc<dyn TileManager>,
        generation: u64,
    ) -> Self {
        Self {
            kind,
            questions: questions.into(),
            manager,
            attempts: 0,
            generation,
            enqueued_at: Instant::now(),
            enqueued_wall: Utc::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.enqueued_at.elapsed()
    }

    pub fn view(&self, tile_id: &TileId) -> PendingTile {
        PendingTile {
            tile_id: tile_id.clone(),
            kind: self.kind,
            questions: self.questions.len(),
            attempts: self.attempts,
            enqueued_at: self.enqueued_wall,
        }
    }
}
