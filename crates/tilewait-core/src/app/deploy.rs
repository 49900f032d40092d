//! Deploy - デプロイ計画から例題を登録する
//!
//! # フロー
//! 1. JSON の計画ファイルを読む（タイル ID・種別・例題）
//! 2. タイルごとに状態を 1 回だけ確認
//! 3. ONLINE ならその場で一括追加、そうでなければキューに預ける
//!
//! 待ち合わせ（キューが空になるまで待つ）は呼び出し側が
//! `TileExampleQueue::wait_until_drained` で行う。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::queue::TileExampleQueue;
use crate::domain::{EndpointStatus, ExampleQuestion, ManagerError, TileId, TileKind};
use crate::ports::TileManager;

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("failed to read deployment plan {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid deployment plan: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{kind} {tile_id}: {source}")]
    Manager {
        tile_id: TileId,
        kind: TileKind,
        #[source]
        source: ManagerError,
    },
}

/// An example as written in the plan file. The API format allows several
/// guidelines; only the first one is carried into the queue payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanExample {
    pub question: String,

    #[serde(default)]
    pub guidelines: Vec<String>,
}

impl From<&PlanExample> for ExampleQuestion {
    fn from(example: &PlanExample) -> Self {
        ExampleQuestion {
            question: example.question.clone(),
            guideline: example.guidelines.first().cloned(),
        }
    }
}

/// One tile of the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilePlan {
    pub tile_id: TileId,
    pub kind: TileKind,

    #[serde(default)]
    pub examples: Vec<PlanExample>,

    /// Status sequence for the in-memory manager (demo runs only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub simulate: Vec<EndpointStatus>,
}

impl TilePlan {
    pub fn questions(&self) -> Vec<ExampleQuestion> {
        self.examples.iter().map(ExampleQuestion::from).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentPlan {
    pub tiles: Vec<TilePlan>,
}

impl DeploymentPlan {
    pub fn from_json(raw: &str) -> Result<Self, DeployError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DeployError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| DeployError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }
}

/// What `deploy_examples` did with each tile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeploySummary {
    /// Tiles already ONLINE; examples added right away.
    pub applied: Vec<TileId>,
    /// Tiles handed to the queue.
    pub enqueued: Vec<TileId>,
    /// Tiles with no examples.
    pub skipped: Vec<TileId>,
}

/// Register each tile's examples now if it is ONLINE, otherwise queue them.
///
/// Errors from the immediate status check or apply abort the deployment;
/// failures after a tile is queued only show up in the queue's logs.
pub async fn deploy_examples(
    plan: &DeploymentPlan,
    manager: Arc<dyn TileManager>,
    queue: &TileExampleQueue,
) -> Result<DeploySummary, DeployError> {
    let mut summary = DeploySummary::default();

    for tile in &plan.tiles {
        let (tile_id, kind) = (&tile.tile_id, tile.kind);
        if tile.examples.is_empty() {
            debug!("{kind} {tile_id} has no examples, skipping");
            summary.skipped.push(tile_id.clone());
            continue;
        }

        let manager_err = |source| DeployError::Manager {
            tile_id: tile_id.clone(),
            kind,
            source,
        };

        let questions = tile.questions();
        let status = manager
            .endpoint_status(kind, tile_id.as_str())
            .await
            .map_err(manager_err)?;

        match status {
            Some(status) if status.is_ready() => {
                let created = manager
                    .add_examples_batch(kind, tile_id.as_str(), &questions)
                    .await
                    .map_err(manager_err)?;
                info!("Added {} example questions to {kind} {tile_id}", created.len());
                summary.applied.push(tile_id.clone());
            }
            other => {
                info!(
                    "{kind} {tile_id} endpoint not ready (status: {}), enqueueing {} questions",
                    other.as_ref().map_or("not found", EndpointStatus::as_str),
                    questions.len()
                );
                queue
                    .enqueue(tile_id.clone(), Arc::clone(&manager), questions, kind)
                    .await;
                summary.enqueued.push(tile_id.clone());
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QueuePolicy;
    use crate::impls::InMemoryTileManager;

    const PLAN: &str = r#"{
        "tiles": [
            {
                "tile_id": "ka-1",
                "kind": "KA",
                "examples": [
                    {"question": "What drives scrap?", "guidelines": ["cite line data", "be brief"]},
                    {"question": "Which plant is slowest?"}
                ]
            },
            {
                "tile_id": "mas-1",
                "kind": "MAS",
                "examples": [{"question": "Summarise supplier risk"}],
                "simulate": ["PROVISIONING", "ONLINE"]
            },
            {"tile_id": "ka-empty", "kind": "KA"}
        ]
    }"#;

    #[test]
    fn plan_keeps_first_guideline_only() {
        let plan = DeploymentPlan::from_json(PLAN).unwrap();
        assert_eq!(plan.tiles.len(), 3);

        let questions = plan.tiles[0].questions();
        assert_eq!(
            questions,
            vec![
                ExampleQuestion::new("What drives scrap?").with_guideline("cite line data"),
                ExampleQuestion::new("Which plant is slowest?"),
            ]
        );
        assert_eq!(
            plan.tiles[1].simulate,
            vec![EndpointStatus::Provisioning, EndpointStatus::Online]
        );
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let raw = r#"{"tiles":[{"tile_id":"g-1","kind":"GENIE"}]}"#;
        assert!(matches!(
            DeploymentPlan::from_json(raw),
            Err(DeployError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_reported_with_path() {
        let err = DeploymentPlan::from_path("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }

    #[tokio::test]
    async fn ready_tiles_apply_now_and_others_are_queued() {
        let plan = DeploymentPlan::from_json(PLAN).unwrap();
        let manager = Arc::new(InMemoryTileManager::new());
        manager.set_status("ka-1", EndpointStatus::Online);
        manager.set_status("mas-1", EndpointStatus::Provisioning);
        let queue = TileExampleQueue::new(QueuePolicy::manual());

        let summary = deploy_examples(&plan, manager.clone(), &queue).await.unwrap();

        assert_eq!(summary.applied, vec![TileId::from("ka-1")]);
        assert_eq!(summary.enqueued, vec![TileId::from("mas-1")]);
        assert_eq!(summary.skipped, vec![TileId::from("ka-empty")]);

        assert_eq!(manager.applied("ka-1")[0].questions.len(), 2);
        assert!(queue.contains("mas-1").await);
        assert!(!queue.contains("ka-1").await);
    }

    #[tokio::test]
    async fn immediate_apply_failure_aborts() {
        let plan = DeploymentPlan::from_json(PLAN).unwrap();
        let manager = Arc::new(InMemoryTileManager::new());
        manager.set_status("ka-1", EndpointStatus::Online);
        manager.fail_apply("ka-1", ManagerError::Rejected("bad request".into()));
        let queue = TileExampleQueue::new(QueuePolicy::manual());

        let err = deploy_examples(&plan, manager, &queue).await.unwrap_err();
        assert!(matches!(
            err,
            DeployError::Manager { ref tile_id, kind: TileKind::KnowledgeAssistant, .. } if tile_id.as_str() == "ka-1"
        ));
        assert!(queue.is_empty().await);
    }
}
