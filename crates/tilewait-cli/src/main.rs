use std::sync::Arc;

use serde_json::json;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use tilewait_core::app::{DeploymentPlan, DrainOutcome, deploy_examples};
use tilewait_core::impls::InMemoryTileManager;
use tilewait_core::{DrainPolicy, QueuePolicy, TileExampleQueue};

const USAGE: &str = "usage: tilewait-cli <plan.json>";

/// First argument after the program name.
fn plan_path_arg(
    mut args: impl Iterator<Item = String>,
) -> Result<String, Box<dyn std::error::Error>> {
    match args.nth(1) {
        Some(path) => Ok(path),
        None => {
            error!("No deployment plan given");
            Err(USAGE.into())
        }
    }
}

/// Demo driver: read a deployment plan, register examples through the
/// queue against an in-memory manager, wait for the queue to drain.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let log_level = std::env::var("TILEWAIT_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .init();

    let plan_path = plan_path_arg(std::env::args())?;

    let policy = QueuePolicy::from_env()?;
    let drain = DrainPolicy::from_env()?;
    let plan = DeploymentPlan::from_path(&plan_path)?;
    info!("Loaded {} tiles from {plan_path}", plan.tiles.len());

    // REST クライアントの代わりに、計画の simulate 列をそのまま状態として返す
    let manager = Arc::new(InMemoryTileManager::new());
    for tile in &plan.tiles {
        if !tile.simulate.is_empty() {
            manager.script_status(tile.tile_id.clone(), tile.simulate.clone());
        }
    }

    if TileExampleQueue::install_global(Arc::new(TileExampleQueue::new(policy))).is_err() {
        warn!("Global tile example queue already initialised; using it as is");
    }
    let queue = TileExampleQueue::global();

    let summary = deploy_examples(&plan, manager.clone(), &queue).await?;
    info!(
        "Examples applied now for {} tiles, queued for {}, skipped {}",
        summary.applied.len(),
        summary.enqueued.len(),
        summary.skipped.len()
    );

    let outcome = queue.wait_until_drained(&drain).await;
    let pending = queue.pending().await;
    queue.stop().await;

    let applied: Vec<_> = plan
        .tiles
        .iter()
        .map(|tile| {
            let batches = manager.applied(tile.tile_id.as_str());
            json!({
                "tile_id": tile.tile_id,
                "kind": tile.kind,
                "batches": batches.len(),
                "questions": batches.iter().map(|b| b.questions.len()).sum::<usize>(),
            })
        })
        .collect();

    let report = json!({
        "summary": summary,
        "drained": matches!(outcome, DrainOutcome::Drained),
        "pending": pending,
        "applied": applied,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
