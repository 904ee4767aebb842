//! Configuration management via environment variables
//!
//! Provides helper functions for reading environment variables with fallback
//! to legacy variable names with warning logs, and resolves the two
//! configuration files the server starts from.

use llm_consul_common::config::{
    ModelConfigFile, RegistrationSettings, CONSUL_CONFIG_FILE_ENV, DEFAULT_CONSUL_CONFIG_FILE,
    DEFAULT_MODEL_CONFIG_FILE, MODEL_CONFIG_FILE_ENV,
};
use llm_consul_common::error::CommonResult;
use llm_consul_common::types::ServiceDescriptor;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::consul::DEFAULT_REGISTRY_TIMEOUT_SECS;

/// Get an environment variable with fallback to a legacy name
///
/// If the new variable name is set, returns its value.
/// If only the old (legacy) variable name is set, returns its value
/// and logs a deprecation warning.
///
/// # Example
/// ```
/// use llm_consul::config::get_env_with_fallback;
///
/// let path = get_env_with_fallback("LLM_CONSUL_CONFIG_FILE", "CONSUL_CONFIG_FILE");
/// ```
pub fn get_env_with_fallback(new_name: &str, old_name: &str) -> Option<String> {
    if let Ok(val) = std::env::var(new_name) {
        return Some(val);
    }
    if let Ok(val) = std::env::var(old_name) {
        tracing::warn!(
            "Environment variable '{}' is deprecated, use '{}' instead",
            old_name,
            new_name
        );
        return Some(val);
    }
    None
}

/// Get an environment variable with fallback and default value
pub fn get_env_with_fallback_or(new_name: &str, old_name: &str, default: &str) -> String {
    get_env_with_fallback(new_name, old_name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable with fallback, parsing to a specific type
///
/// Falls back to `default` when neither is set or parsing fails.
pub fn get_env_with_fallback_parse<T: std::str::FromStr>(
    new_name: &str,
    old_name: &str,
    default: T,
) -> T {
    get_env_with_fallback(new_name, old_name)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Consul設定ファイルのパスを解決
///
/// CLI引数 > `LLM_CONSUL_CONFIG_FILE` > `CONSUL_CONFIG_FILE` > デフォルトの順。
pub fn consul_config_path(arg: Option<&Path>) -> PathBuf {
    match arg {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(get_env_with_fallback_or(
            "LLM_CONSUL_CONFIG_FILE",
            CONSUL_CONFIG_FILE_ENV,
            DEFAULT_CONSUL_CONFIG_FILE,
        )),
    }
}

/// モデル設定ファイルのパスを解決
///
/// CLI引数 > `LLM_CONSUL_MODEL_CONFIG_FILE` > `CONFIG_FILE` > デフォルトの順。
pub fn model_config_path(arg: Option<&Path>) -> PathBuf {
    match arg {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(get_env_with_fallback_or(
            "LLM_CONSUL_MODEL_CONFIG_FILE",
            MODEL_CONFIG_FILE_ENV,
            DEFAULT_MODEL_CONFIG_FILE,
        )),
    }
}

/// Consul API呼び出しのタイムアウトを取得
///
/// 環境変数 `LLM_CONSUL_REGISTRY_TIMEOUT_SECS` から取得し、未設定の場合は10秒。
pub fn registry_timeout() -> Duration {
    let secs = get_env_with_fallback_parse(
        "LLM_CONSUL_REGISTRY_TIMEOUT_SECS",
        "CONSUL_TIMEOUT_SECS",
        DEFAULT_REGISTRY_TIMEOUT_SECS,
    );
    Duration::from_secs(secs)
}

/// Settings and descriptors loaded from disk.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Registration settings
    pub settings: RegistrationSettings,
    /// Descriptors for the configured models, in file order
    pub descriptors: Vec<ServiceDescriptor>,
}

impl LoadedConfig {
    /// Load both configuration files.
    pub fn load(consul_config: &Path, model_config: &Path) -> CommonResult<Self> {
        let settings = RegistrationSettings::load(consul_config)?;
        let descriptors = ModelConfigFile::load(model_config)?.descriptors();

        Ok(Self {
            settings,
            descriptors,
        })
    }
}
