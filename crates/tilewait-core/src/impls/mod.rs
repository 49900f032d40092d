//! Impls - 実装（開発用・テスト用）
//!
//! # 含まれる実装
//! - **InMemoryTileManager**: スクリプト駆動のタイル管理 API
//!
//! 本番用の REST クライアントはこのクレートの外で `TileManager` を実装します。

pub mod inmem_manager;

pub use self::inmem_manager::{AppliedBatch, InMemoryTileManager};
