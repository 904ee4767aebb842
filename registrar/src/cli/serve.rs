//! serve サブコマンド
//!
//! 設定を読み込み、モデルをConsulへ登録してからヘルスチェックを提供する。
//! 終了時（シグナル・エラー・パニック）には必ず登録解除する。

use crate::config::{self, LoadedConfig};
use crate::consul::ConsulClient;
use crate::manager::RegistrationManager;
use crate::shutdown::ShutdownController;
use crate::{api, lifecycle, server, AppState};
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// serve サブコマンドの引数
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Listen port (defaults to bind_service_port from the Consul settings)
    #[arg(short, long, env = "LLM_CONSUL_PORT")]
    pub port: Option<u16>,

    /// Bind address
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "LLM_CONSUL_HOST")]
    pub host: String,

    /// Consul settings file
    #[arg(long)]
    pub consul_config: Option<PathBuf>,

    /// Model settings file
    #[arg(long)]
    pub model_config: Option<PathBuf>,
}

impl ServeArgs {
    /// Arguments used when no subcommand is given: everything from the environment.
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("LLM_CONSUL_PORT")
                .ok()
                .and_then(|p| p.parse().ok()),
            host: std::env::var("LLM_CONSUL_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            consul_config: None,
            model_config: None,
        }
    }
}

/// Load configuration and build the registration manager.
pub fn build_manager(
    consul_config: Option<&std::path::Path>,
    model_config: Option<&std::path::Path>,
) -> anyhow::Result<RegistrationManager> {
    let consul_path = config::consul_config_path(consul_config);
    let model_path = config::model_config_path(model_config);

    let loaded = LoadedConfig::load(&consul_path, &model_path).with_context(|| {
        format!(
            "failed to load configuration ({}, {})",
            consul_path.display(),
            model_path.display()
        )
    })?;

    let registry = ConsulClient::from_settings(&loaded.settings, config::registry_timeout())?;
    let manager =
        RegistrationManager::configure(loaded.settings, loaded.descriptors, Arc::new(registry))?;
    Ok(manager)
}

/// Execute the serve command
pub async fn execute(args: &ServeArgs) -> anyhow::Result<()> {
    let manager = Arc::new(build_manager(
        args.consul_config.as_deref(),
        args.model_config.as_deref(),
    )?);

    let port = args.port.unwrap_or(manager.settings().advertise_port);
    let bind_addr = format!("{}:{}", args.host, port);

    info!(
        enabled = manager.is_enabled(),
        models = manager.descriptors().len(),
        bind = %bind_addr,
        "Starting llm-consul"
    );

    let state = AppState {
        manager: manager.clone(),
        shutdown: ShutdownController::default(),
    };
    let app = api::create_app(state.clone());

    lifecycle::run_registered(&manager, server::run(app, &bind_addr, state.shutdown))
        .await
        .with_context(|| format!("server on {bind_addr} failed"))?;

    Ok(())
}
