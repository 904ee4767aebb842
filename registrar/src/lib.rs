//! llm-consul
//!
//! モデルサーバーをConsulへ登録し、ヘルスチェックに応答し、終了時に登録解除する

#![warn(missing_docs)]

/// REST APIルーター
pub mod api;

/// CLIインターフェース
pub mod cli;

/// 設定管理（環境変数ヘルパー）
pub mod config;

/// Consul agentクライアント
pub mod consul;

/// ヘルスチェック
pub mod health;

/// 登録の取得と解放をまとめたスコープ
pub mod lifecycle;

/// ロギング初期化ユーティリティ
pub mod logging;

/// サービス登録ライフサイクル管理
pub mod manager;

/// axumサーバー起動・シャットダウン
pub mod server;

/// Shutdown controller
pub mod shutdown;

pub use manager::{LifecyclePhase, RegistrationManager};

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// サービス登録マネージャー
    pub manager: std::sync::Arc<RegistrationManager>,
    /// Cooperative shutdown controller
    pub shutdown: shutdown::ShutdownController,
}
