//! WorkerLoop - タイル状態のポーリングと例題の一括追加
//!
//! # フロー（1 サイクル）
//! 1. ロック下でスナップショットを取り、すぐにロックを手放す
//! 2. エントリごとに: 上限チェック → attempts 加算 → 状態確認
//! 3. ONLINE なら一括追加して削除、それ以外は次のサイクルへ持ち越し
//! 4. poll_interval だけ眠る（stop() で起こされる）
//!
//! ロックは map の更新にだけ使い、manager 呼び出しを跨いで保持しない。

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::entry::QueueEntry;
use super::queue::QueueShared;
use super::status::{CycleReport, EntryOutcome};
use crate::domain::{EndpointStatus, ExampleQuestion, ManagerError, TileId, TileKind};
use crate::ports::TileManager;

/// Background worker: one cycle, then an interruptible sleep, until shutdown.
///
/// Shutdown is observed at the top of the loop and during the sleep. An
/// in-flight manager call is never interrupted; the current cycle finishes
/// first.
///
/// `previous` is a worker that missed its stop timeout; it is awaited before
/// the first cycle so two workers never overlap.
pub(crate) async fn worker_loop(
    shared: Arc<QueueShared>,
    mut shutdown_rx: watch::Receiver<bool>,
    previous: Option<JoinHandle<()>>,
) {
    if let Some(previous) = previous
        && let Err(e) = previous.await
    {
        error!("Previous tile example queue worker ended abnormally: {e}");
    }
    debug!("Tile example queue worker started");

    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        let report = run_cycle(&shared).await;
        if report.processed() > 0 {
            debug!(?report, "Tile example queue cycle finished");
        }

        tokio::select! {
            _ = tokio::time::sleep(shared.policy.poll_interval) => {}
            changed = shutdown_rx.changed() => {
                // sender dropped: the queue itself is gone
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    debug!("Tile example queue worker stopped");
}

/// Process every entry of one snapshot, sequentially.
///
/// Holds the cycle lock throughout; the snapshot is taken under it.
pub(crate) async fn run_cycle(shared: &QueueShared) -> CycleReport {
    let _cycle = shared.lock_cycle().await;
    let snapshot = shared.snapshot().await;

    let mut report = CycleReport::default();
    for (tile_id, entry) in snapshot {
        let outcome = process_entry(shared, tile_id, entry).await;
        report.record(outcome);
    }
    report
}

enum Probe {
    NotReady(Option<EndpointStatus>),
    Applied(usize),
}

pub(crate) async fn process_entry(
    shared: &QueueShared,
    tile_id: TileId,
    entry: QueueEntry,
) -> EntryOutcome {
    let max = shared.policy.max_attempts;
    let kind = entry.kind;

    if entry.attempts >= max {
        return exhaust(shared, &tile_id, &entry, entry.attempts).await;
    }

    let Some(attempt) = shared.start_attempt(&tile_id, entry.generation).await else {
        debug!("{kind} {tile_id} was re-enqueued or removed since the snapshot; skipping");
        return EntryOutcome::Superseded;
    };

    // 別タスクで実行して panic をこのエントリだけに閉じ込める
    let probe = tokio::spawn(probe_and_apply(
        Arc::clone(&entry.manager),
        kind,
        tile_id.clone(),
        Arc::clone(&entry.questions),
        attempt,
        max,
    ))
    .await;

    match probe {
        Ok(Ok(Probe::Applied(created))) => {
            info!(
                "Added {created} examples to {kind} {tile_id} after {attempt} attempts ({}s)",
                entry.elapsed().as_secs()
            );
            shared.remove_if_current(&tile_id, entry.generation).await;
            EntryOutcome::Applied
        }
        Ok(Ok(Probe::NotReady(status))) => {
            if attempt >= max {
                return exhaust(shared, &tile_id, &entry, attempt).await;
            }
            info!(
                "{kind} {tile_id} not ready yet (status: {}), will retry in {}s (attempt {attempt}/{max})",
                status_label(status.as_ref()),
                shared.policy.poll_interval.as_secs()
            );
            EntryOutcome::Retained
        }
        Ok(Err(err)) if err.is_configuration() => {
            error!("Cannot process {kind} {tile_id}: {err}; removing from queue");
            shared.remove_if_current(&tile_id, entry.generation).await;
            EntryOutcome::Misconfigured
        }
        Ok(Err(err)) => {
            error!(
                error = ?err,
                "Failed to add {} examples to {kind} {tile_id} on attempt {attempt}: {err}; removing from queue",
                entry.questions.len()
            );
            shared.remove_if_current(&tile_id, entry.generation).await;
            EntryOutcome::Failed
        }
        Err(join_err) => {
            error!(
                "Processing {kind} {tile_id} panicked on attempt {attempt}: {join_err}; removing from queue"
            );
            shared.remove_if_current(&tile_id, entry.generation).await;
            EntryOutcome::Failed
        }
    }
}

async fn probe_and_apply(
    manager: Arc<dyn TileManager>,
    kind: TileKind,
    tile_id: TileId,
    questions: Arc<[ExampleQuestion]>,
    attempt: u32,
    max: u32,
) -> Result<Probe, ManagerError> {
    let status = manager.endpoint_status(kind, tile_id.as_str()).await?;
    debug!(
        "{kind} {tile_id} status: {} (attempt {attempt}/{max})",
        status_label(status.as_ref())
    );

    match status {
        Some(status) if status.is_ready() => {
            info!("{kind} {tile_id} is {status}, adding {} examples", questions.len());
            let created = manager
                .add_examples_batch(kind, tile_id.as_str(), &questions)
                .await?;
            Ok(Probe::Applied(created.len()))
        }
        other => Ok(Probe::NotReady(other)),
    }
}

async fn exhaust(
    shared: &QueueShared,
    tile_id: &TileId,
    entry: &QueueEntry,
    attempts: u32,
) -> EntryOutcome {
    error!(
        "{} {tile_id} not ready after {attempts} attempts ({}s, max {}); dropping {} examples",
        entry.kind,
        entry.elapsed().as_secs(),
        shared.policy.max_attempts,
        entry.questions.len()
    );
    shared.remove_if_current(tile_id, entry.generation).await;
    EntryOutcome::Exhausted
}

fn status_label(status: Option<&EndpointStatus>) -> &str {
    status.map_or("not found", EndpointStatus::as_str)
}
