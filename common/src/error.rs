//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! 登録処理の失敗は呼び出し側でログに落とすだけ。
//! ヘルスエンドポイントに出してよい文言は`external_message()`で返す。

use std::path::PathBuf;
use thiserror::Error;

/// Common layer error type
#[derive(Debug, Error)]
pub enum CommonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// File that failed to load
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<config::ConfigError> for CommonError {
    fn from(err: config::ConfigError) -> Self {
        CommonError::Config(err.to_string())
    }
}

/// Registration subsystem error type
#[derive(Debug, Error)]
pub enum RegistrarError {
    /// Common layer error
    #[error(transparent)]
    Common(#[from] CommonError),

    /// A model descriptor is unusable (e.g. missing alias)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The registry refused or could not be reached for one service
    #[error("Failed to register service {service_id}: {reason}")]
    Registration {
        /// Instance id that was being registered
        service_id: String,
        /// Cause reported by the registry client
        reason: String,
    },

    /// The registry refused or could not be reached while deregistering
    #[error("Failed to deregister service {service_id}: {reason}")]
    Deregistration {
        /// Instance id that was being deregistered
        service_id: String,
        /// Cause reported by the registry client
        reason: String,
    },

    /// Registry answered with a non-success status
    #[error("Registry error: {0}")]
    Registry(String),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    Http(String),

    /// Timeout error
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Fault raised while evaluating the health status
    #[error("Health evaluation failed: {0}")]
    HealthEvaluation(String),
}

impl RegistrarError {
    /// Returns a safe error message for external clients.
    ///
    /// Registry addresses and instance ids stay in the server logs; the
    /// health endpoint only ever sees these strings.
    pub fn external_message(&self) -> &'static str {
        match self {
            Self::Common(_) => "Configuration error",
            Self::Configuration(_) => "Configuration error",
            Self::Registration { .. } => "Service registration failed",
            Self::Deregistration { .. } => "Service deregistration failed",
            Self::Registry(_) => "Registry error",
            Self::Http(_) => "Registry unavailable",
            Self::Timeout(_) => "Registry timeout",
            Self::HealthEvaluation(_) => "Health evaluation failed",
        }
    }
}

/// Result type alias (Common)
pub type CommonResult<T> = Result<T, CommonError>;

/// Result type alias (Registrar)
pub type RegistrarResult<T> = Result<T, RegistrarError>;
