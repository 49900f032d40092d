//! InMemoryTileManager - 開発・テスト用のタイル管理 API
//!
//! # 実装詳細
//! - タイルごとに状態のスクリプトを持ち、呼び出しごとに 1 つ進む（最後の値は繰り返す）
//! - 状態確認 / 一括追加の失敗、panic を注入できる
//! - 適用されたバッチを記録し、テストから検証できる
//!
//! ロックは同期 Mutex で、await を跨いで保持しない。

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::{
    CreatedExample, EndpointStatus, ExampleQuestion, ManagerError, TileId, TileKind,
};
use crate::ports::TileManager;

/// A batch the manager accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedBatch {
    pub kind: TileKind,
    pub questions: Vec<ExampleQuestion>,
}

#[derive(Default)]
struct TileScript {
    statuses: Vec<EndpointStatus>,
    status_calls: u32,
    /// (1-based call number, error)
    status_failure: Option<(u32, ManagerError)>,
    panic_on_status: bool,
    apply_failure: Option<ManagerError>,
    apply_calls: u32,
    applied: Vec<AppliedBatch>,
}

/// Scripted `TileManager`.
///
/// Tiles without a script report `Ok(None)` (not found).
pub struct InMemoryTileManager {
    supported: Vec<TileKind>,
    tiles: Mutex<HashMap<TileId, TileScript>>,
}

impl InMemoryTileManager {
    /// Manager for both tile kinds.
    pub fn new() -> Self {
        Self::supporting(&[TileKind::KnowledgeAssistant, TileKind::MultiAgentSupervisor])
    }

    /// Manager that rejects the kinds not listed with `UnsupportedKind`.
    pub fn supporting(kinds: &[TileKind]) -> Self {
        Self {
            supported: kinds.to_vec(),
            tiles: Mutex::new(HashMap::new()),
        }
    }

    /// Statuses returned by successive calls; the last one repeats.
    pub fn script_status(&self, tile_id: impl Into<TileId>, statuses: Vec<EndpointStatus>) {
        let mut tiles = self.lock();
        tiles.entry(tile_id.into()).or_default().statuses = statuses;
    }

    pub fn set_status(&self, tile_id: impl Into<TileId>, status: EndpointStatus) {
        self.script_status(tile_id, vec![status]);
    }

    /// Make the `call`-th status check (1-based) for the tile fail.
    pub fn fail_status_on_call(&self, tile_id: impl Into<TileId>, call: u32, error: ManagerError) {
        let mut tiles = self.lock();
        tiles.entry(tile_id.into()).or_default().status_failure = Some((call, error));
    }

    pub fn panic_on_status(&self, tile_id: impl Into<TileId>) {
        let mut tiles = self.lock();
        tiles.entry(tile_id.into()).or_default().panic_on_status = true;
    }

    pub fn fail_apply(&self, tile_id: impl Into<TileId>, error: ManagerError) {
        let mut tiles = self.lock();
        tiles.entry(tile_id.into()).or_default().apply_failure = Some(error);
    }

    pub fn status_calls(&self, tile_id: &str) -> u32 {
        self.lock().get(tile_id).map_or(0, |t| t.status_calls)
    }

    pub fn apply_calls(&self, tile_id: &str) -> u32 {
        self.lock().get(tile_id).map_or(0, |t| t.apply_calls)
    }

    pub fn applied(&self, tile_id: &str) -> Vec<AppliedBatch> {
        self.lock()
            .get(tile_id)
            .map(|t| t.applied.clone())
            .unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TileId, TileScript>> {
        // a panicking test hook must not poison later lookups
        self.tiles.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_kind(&self, kind: TileKind) -> Result<(), ManagerError> {
        if self.supported.contains(&kind) {
            Ok(())
        } else {
            Err(ManagerError::UnsupportedKind(kind))
        }
    }

    fn status_for(
        &self,
        kind: TileKind,
        tile_id: &str,
    ) -> Result<Option<EndpointStatus>, ManagerError> {
        self.check_kind(kind)?;

        let (result, panic) = {
            let mut tiles = self.lock();
            let script = tiles.entry(TileId::from(tile_id)).or_default();
            script.status_calls += 1;
            let call = script.status_calls;

            let result = match &script.status_failure {
                Some((n, err)) if *n == call => Err(err.clone()),
                _ => {
                    let idx = (call as usize - 1).min(script.statuses.len().saturating_sub(1));
                    Ok(script.statuses.get(idx).cloned())
                }
            };
            (result, script.panic_on_status)
        };

        if panic {
            panic!("scripted panic while checking status of {kind} {tile_id}");
        }
        result
    }

    fn apply(
        &self,
        kind: TileKind,
        tile_id: &str,
        questions: &[ExampleQuestion],
    ) -> Result<Vec<CreatedExample>, ManagerError> {
        self.check_kind(kind)?;

        let mut tiles = self.lock();
        let script = tiles.entry(TileId::from(tile_id)).or_default();
        script.apply_calls += 1;
        if let Some(err) = &script.apply_failure {
            return Err(err.clone());
        }

        let offset = script.applied.iter().map(|b| b.questions.len()).sum::<usize>();
        let created = questions
            .iter()
            .filter(|q| !q.question.is_empty())
            .enumerate()
            .map(|(i, q)| CreatedExample {
                example_id: format!("{tile_id}-ex-{}", offset + i + 1),
                question: q.question.clone(),
                guidelines: q.guidelines(),
            })
            .collect();

        script.applied.push(AppliedBatch {
            kind,
            questions: questions.to_vec(),
        });
        Ok(created)
    }
}

impl Default for InMemoryTileManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TileManager for InMemoryTileManager {
    async fn ka_endpoint_status(
        &self,
        tile_id: &str,
    ) -> Result<Option<EndpointStatus>, ManagerError> {
        self.status_for(TileKind::KnowledgeAssistant, tile_id)
    }

    async fn mas_endpoint_status(
        &self,
        tile_id: &str,
    ) -> Result<Option<EndpointStatus>, ManagerError> {
        self.status_for(TileKind::MultiAgentSupervisor, tile_id)
    }

    async fn ka_add_examples_batch(
        &self,
        tile_id: &str,
        questions: &[ExampleQuestion],
    ) -> Result<Vec<CreatedExample>, ManagerError> {
        self.apply(TileKind::KnowledgeAssistant, tile_id, questions)
    }

    async fn mas_add_examples_batch(
        &self,
        tile_id: &str,
        questions: &[ExampleQuestion],
    ) -> Result<Vec<CreatedExample>, ManagerError> {
        self.apply(TileKind::MultiAgentSupervisor, tile_id, questions)
    }
}
