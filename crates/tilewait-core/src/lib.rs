//! tilewait-core
//!
//! Deferred "add examples once the tile is ONLINE" queue for Knowledge
//! Assistant and Multi-Agent Supervisor tiles.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（TileId, TileKind, EndpointStatus, ExampleQuestion, ManagerError）
//! - **ports**: 抽象化レイヤー（TileManager）
//! - **app**: アプリケーションロジック（TileExampleQueue, worker loop, deploy, status）
//! - **impls**: 実装（InMemoryTileManager など開発用）
//! - **config**: QueuePolicy / DrainPolicy

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;

pub use app::TileExampleQueue;
pub use config::{ConfigError, DrainPolicy, QueuePolicy};
