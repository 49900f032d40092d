//! App - アプリケーション層
//!
//! # 主要コンポーネント
//! - **TileExampleQueue**: 準備待ちタイルへの例題追加キュー
//! - **WorkerLoop**: ポーリングと一括追加のサイクル
//! - **Deploy**: デプロイ計画からの登録（即時 or キュー）
//! - **Status**: 観測用ビュー

pub mod deploy;
mod entry;
pub mod global;
pub mod queue;
pub mod status;
mod worker_loop;

pub use self::deploy::{DeployError, DeploySummary, DeploymentPlan, PlanExample, TilePlan, deploy_examples};
pub use self::queue::TileExampleQueue;
pub use self::status::{CycleReport, DrainOutcome, EntryOutcome, PendingTile};
