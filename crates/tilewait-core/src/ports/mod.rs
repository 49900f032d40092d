//! Ports - 抽象化レイヤー
//!
//! キューの外側にある協調者（タイル管理 API）へのインターフェースを定義します。
//! 実装は `impls`（開発・テスト用）か、このクレートを使う側が提供します。

pub mod tile_manager;

pub use self::tile_manager::TileManager;
