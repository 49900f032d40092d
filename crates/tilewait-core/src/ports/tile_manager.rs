//! TileManager port - タイル管理 API への抽象化
//!
//! キューが必要とするのは「状態確認」と「例題の一括追加」の 2 つだけです。
//! REST クライアント本体はこのクレートの外側にあり、この trait を実装します。

use async_trait::async_trait;

use crate::domain::{CreatedExample, EndpointStatus, ExampleQuestion, ManagerError, TileKind};

/// Capability the queue holds per entry: check a tile's endpoint status and
/// apply a batch of example questions to it.
///
/// Every method has a default body that rejects the call with
/// `ManagerError::UnsupportedKind`, so an adapter that manages only one kind
/// of tile implements only that kind's pair.
///
/// The queue shares implementations by `Arc` and never mutates them.
/// Per-request timeouts are the adapter's job.
#[async_trait]
pub trait TileManager: Send + Sync {
    /// Knowledge Assistant endpoint status; `Ok(None)` when the tile is not found.
    async fn ka_endpoint_status(
        &self,
        _tile_id: &str,
    ) -> Result<Option<EndpointStatus>, ManagerError> {
        Err(ManagerError::UnsupportedKind(TileKind::KnowledgeAssistant))
    }

    /// Multi-Agent Supervisor endpoint status; `Ok(None)` when the tile is not found.
    async fn mas_endpoint_status(
        &self,
        _tile_id: &str,
    ) -> Result<Option<EndpointStatus>, ManagerError> {
        Err(ManagerError::UnsupportedKind(TileKind::MultiAgentSupervisor))
    }

    async fn ka_add_examples_batch(
        &self,
        _tile_id: &str,
        _questions: &[ExampleQuestion],
    ) -> Result<Vec<CreatedExample>, ManagerError> {
        Err(ManagerError::UnsupportedKind(TileKind::KnowledgeAssistant))
    }

    async fn mas_add_examples_batch(
        &self,
        _tile_id: &str,
        _questions: &[ExampleQuestion],
    ) -> Result<Vec<CreatedExample>, ManagerError> {
        Err(ManagerError::UnsupportedKind(TileKind::MultiAgentSupervisor))
    }

    /// Status accessor selected by `kind`.
    async fn endpoint_status(
        &self,
        kind: TileKind,
        tile_id: &str,
    ) -> Result<Option<EndpointStatus>, ManagerError> {
        match kind {
            TileKind::KnowledgeAssistant => self.ka_endpoint_status(tile_id).await,
            TileKind::MultiAgentSupervisor => self.mas_endpoint_status(tile_id).await,
        }
    }

    /// Batch method selected by `kind`.
    ///
    /// No partial-success contract: an `Err` means the whole batch is
    /// considered failed, even if the remote side created some examples.
    async fn add_examples_batch(
        &self,
        kind: TileKind,
        tile_id: &str,
        questions: &[ExampleQuestion],
    ) -> Result<Vec<CreatedExample>, ManagerError> {
        match kind {
            TileKind::KnowledgeAssistant => self.ka_add_examples_batch(tile_id, questions).await,
            TileKind::MultiAgentSupervisor => {
                self.mas_add_examples_batch(tile_id, questions).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct KaOnly;

    #[async_trait]
    impl TileManager for KaOnly {
        async fn ka_endpoint_status(
            &self,
            _tile_id: &str,
        ) -> Result<Option<EndpointStatus>, ManagerError> {
            Ok(Some(EndpointStatus::Online))
        }
    }

    #[tokio::test]
    async fn dispatch_follows_kind() {
        let m = KaOnly;
        let status = m
            .endpoint_status(TileKind::KnowledgeAssistant, "ka-1")
            .await
            .unwrap();
        assert_eq!(status, Some(EndpointStatus::Online));

        let err = m
            .endpoint_status(TileKind::MultiAgentSupervisor, "mas-1")
            .await
            .unwrap_err();
        assert_eq!(err, ManagerError::UnsupportedKind(TileKind::MultiAgentSupervisor));
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn unimplemented_batch_is_unsupported() {
        let err = KaOnly
            .add_examples_batch(TileKind::KnowledgeAssistant, "ka-1", &[])
            .await
            .unwrap_err();
        assert!(err.is_configuration());
    }
}
