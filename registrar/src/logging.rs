//! ロギング初期化ユーティリティ
//!
//! `LLM_CONSUL_LOG_LEVEL`（未設定なら `RUST_LOG`）でフィルタを、
//! `LLM_CONSUL_LOG_FORMAT=json` で出力形式を切り替える。
//! サブスクライバ導入前に読むため、旧変数名の警告は出さない。

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human readable lines
    Text,
    /// One JSON object per line
    Json,
}

impl LogFormat {
    fn from_env() -> Self {
        match first_env(&["LLM_CONSUL_LOG_FORMAT", "LOG_FORMAT"])
            .map(|v| v.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

fn first_env(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| std::env::var(name).ok())
}

fn filter_from_env() -> EnvFilter {
    let directive = first_env(&["LLM_CONSUL_LOG_LEVEL", "RUST_LOG"])
        .unwrap_or_else(|| DEFAULT_FILTER.to_string());
    EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global tracing subscriber.
pub fn init() -> Result<(), tracing_subscriber::util::TryInitError> {
    let registry = tracing_subscriber::registry().with(filter_from_env());

    match LogFormat::from_env() {
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
        LogFormat::Text => registry.with(fmt::layer()).try_init(),
    }
}
