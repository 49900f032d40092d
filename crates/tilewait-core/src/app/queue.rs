//! TileExampleQueue - 準備待ちタイルへの例題追加キュー
//!
//! Tiles are created asynchronously by the remote API. Their example
//! questions can only be added once the serving endpoint is ONLINE, so the
//! deployment hands them to this queue and moves on.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, MutexGuard, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::entry::QueueEntry;
use super::status::{CycleReport, DrainOutcome, PendingTile};
use super::worker_loop;
use crate::config::{DrainPolicy, QueuePolicy};
use crate::domain::{ExampleQuestion, TileId, TileKind};
use crate::ports::TileManager;

/// State shared between the queue handle and its worker.
///
/// The map lock is held for map mutation only, never across a manager call.
/// The cycle lock is held for a whole poll cycle, so at most one cycle runs
/// at a time no matter who drives it (worker or `run_cycle()`).
pub(crate) struct QueueShared {
    entries: Mutex<HashMap<TileId, QueueEntry>>,
    cycle: Mutex<()>,
    pub policy: QueuePolicy,
}

impl QueueShared {
    pub async fn lock_cycle(&self) -> MutexGuard<'_, ()> {
        self.cycle.lock().await
    }

    pub async fn snapshot(&self) -> Vec<(TileId, QueueEntry)> {
        let entries = self.entries.lock().await;
        entries
            .iter()
            .map(|(id, entry)| (id.clone(), entry.clone()))
            .collect()
    }

    /// Bump the live entry's attempt count. Returns the new count, or `None`
    /// when the live entry is no longer the one the snapshot saw.
    pub async fn start_attempt(&self, tile_id: &TileId, generation: u64) -> Option<u32> {
        let mut entries = self.entries.lock().await;
        match entries.get_mut(tile_id) {
            Some(entry) if entry.generation == generation => {
                entry.attempts += 1;
                Some(entry.attempts)
            }
            _ => None,
        }
    }

    pub async fn remove_if_current(&self, tile_id: &TileId, generation: u64) -> bool {
        let mut entries = self.entries.lock().await;
        if entries
            .get(tile_id)
            .is_some_and(|entry| entry.generation == generation)
        {
            entries.remove(tile_id);
            true
        } else {
            false
        }
    }
}

struct Worker {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

#[derive(Default)]
struct WorkerSlot {
    active: Option<Worker>,
    /// Worker that missed `stop_timeout`; the next worker waits for it.
    lingering: Option<JoinHandle<()>>,
}

/// Deferred "add examples once ONLINE" queue.
///
/// - `enqueue` only touches the map; status checks and applies happen on the
///   single background worker.
/// - One entry per tile id. Re-enqueuing replaces the payload and resets the
///   attempt count (last write wins, no merge).
/// - Outcomes are reported through logs only.
///
/// Must be used from within a Tokio runtime (the worker is a Tokio task).
pub struct TileExampleQueue {
    shared: Arc<QueueShared>,
    next_generation: AtomicU64,
    worker: Mutex<WorkerSlot>,
}

impl TileExampleQueue {
    pub fn new(policy: QueuePolicy) -> Self {
        Self {
            shared: Arc::new(QueueShared {
                entries: Mutex::new(HashMap::new()),
                cycle: Mutex::new(()),
                policy,
            }),
            next_generation: AtomicU64::new(0),
            worker: Mutex::new(WorkerSlot::default()),
        }
    }

    pub fn policy(&self) -> &QueuePolicy {
        &self.shared.policy
    }

    /// Insert or replace the entry for `tile_id`, then start the worker
    /// (when `autostart` is on).
    pub async fn enqueue(
        &self,
        tile_id: impl Into<TileId>,
        manager: Arc<dyn TileManager>,
        questions: Vec<ExampleQuestion>,
        kind: TileKind,
    ) {
        let tile_id = tile_id.into();
        let count = questions.len();
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let entry = QueueEntry::new(kind, questions, manager, generation);

        let replaced = {
            let mut entries = self.shared.entries.lock().await;
            entries.insert(tile_id.clone(), entry)
        };

        if let Some(previous) = replaced {
            warn!(
                "Replacing {} queued examples for {kind} {tile_id} (previous entry had {} attempts)",
                previous.questions.len(),
                previous.attempts
            );
        }
        info!("Enqueued {count} examples for {kind} {tile_id} (will add when endpoint is ONLINE)");

        if self.shared.policy.autostart {
            self.start().await;
        }
    }

    /// Start the background worker. No-op if it is already running.
    ///
    /// If a previous worker missed its stop timeout, the new one waits for it
    /// to exit before its first cycle.
    pub async fn start(&self) {
        let mut slot = self.worker.lock().await;
        if let Some(worker) = slot.active.as_ref()
            && !worker.join.is_finished()
        {
            return;
        }

        let previous = slot.lingering.take().filter(|join| !join.is_finished());
        if previous.is_some() {
            info!("Previous tile example queue worker is still finishing its cycle; new worker starts after it");
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(worker_loop::worker_loop(
            Arc::clone(&self.shared),
            shutdown_rx,
            previous,
        ));
        slot.active = Some(Worker { shutdown_tx, join });

        let policy = &self.shared.policy;
        info!(
            "Started tile example queue worker (poll every {}s, max {} attempts, gives up after {}s)",
            policy.poll_interval.as_secs(),
            policy.max_attempts,
            policy.max_wait().as_secs()
        );
    }

    /// Signal the worker and wait up to `stop_timeout` for it to exit.
    ///
    /// Entries stay in the map with their attempt counts; `start()` resumes
    /// them. An in-flight manager call is not interrupted.
    pub async fn stop(&self) {
        let Some(Worker { shutdown_tx, mut join }) = self.worker.lock().await.active.take() else {
            debug!("Tile example queue worker is not running");
            return;
        };

        // ignore send error: the worker may already be gone
        let _ = shutdown_tx.send(true);

        let timeout = self.shared.policy.stop_timeout;
        match tokio::time::timeout(timeout, &mut join).await {
            Ok(Ok(())) => info!("Stopped tile example queue worker"),
            Ok(Err(e)) => error!("Tile example queue worker ended abnormally: {e}"),
            Err(_) => {
                warn!(
                    "Tile example queue worker did not stop within {}s; it exits after its current cycle",
                    timeout.as_secs()
                );
                self.worker.lock().await.lingering = Some(join);
            }
        }
    }

    pub async fn is_running(&self) -> bool {
        self.worker
            .lock()
            .await
            .active
            .as_ref()
            .is_some_and(|worker| !worker.join.is_finished())
    }

    /// Run one poll cycle on the caller's task.
    ///
    /// Waits for a cycle already in progress on the worker, then works on a
    /// fresh snapshot.
    pub async fn run_cycle(&self) -> CycleReport {
        worker_loop::run_cycle(&self.shared).await
    }

    pub async fn len(&self) -> usize {
        self.shared.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn contains(&self, tile_id: &str) -> bool {
        self.shared.entries.lock().await.contains_key(tile_id)
    }

    /// Views of everything still queued, ordered by tile id.
    pub async fn pending(&self) -> Vec<PendingTile> {
        let entries = self.shared.entries.lock().await;
        let mut views: Vec<PendingTile> = entries
            .iter()
            .map(|(id, entry)| entry.view(id))
            .collect();
        views.sort_by(|a, b| a.tile_id.cmp(&b.tile_id));
        views
    }

    /// Poll `len()` until the queue is empty or `policy.max_wait` passes.
    ///
    /// Timing out does not stop the worker; remaining tiles keep being polled.
    pub async fn wait_until_drained(&self, policy: &DrainPolicy) -> DrainOutcome {
        let started = Instant::now();

        let initial = self.len().await;
        if initial == 0 {
            return DrainOutcome::Drained;
        }
        info!(
            "Waiting for {initial} tiles to finish processing examples (up to {}s)",
            policy.max_wait.as_secs()
        );

        loop {
            let remaining = self.len().await;
            if remaining == 0 {
                info!("All queued examples processed");
                return DrainOutcome::Drained;
            }

            let elapsed = started.elapsed();
            if elapsed >= policy.max_wait {
                warn!(
                    "Timed out after {}s with {remaining} tiles still queued; the worker keeps processing them",
                    elapsed.as_secs()
                );
                return DrainOutcome::TimedOut { remaining };
            }

            info!(
                "Still waiting for {remaining} tiles ({}s elapsed)",
                elapsed.as_secs()
            );
            tokio::time::sleep(policy.check_interval.min(policy.max_wait - elapsed)).await;
        }
    }
}

impl Default for TileExampleQueue {
    fn default() -> Self {
        Self::new(QueuePolicy::default())
    }
}
