//! 設定管理
//!
//! RegistrationSettings, ModelSettings等の設定構造体

use crate::error::{CommonError, CommonResult};
use crate::types::ServiceDescriptor;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Consul設定ファイルのパスを指定する環境変数
pub const CONSUL_CONFIG_FILE_ENV: &str = "CONSUL_CONFIG_FILE";

/// Consul設定ファイルのデフォルトパス
pub const DEFAULT_CONSUL_CONFIG_FILE: &str = "configs/config_consul.json";

/// モデル設定ファイルのパスを指定する環境変数
pub const MODEL_CONFIG_FILE_ENV: &str = "CONFIG_FILE";

/// モデル設定ファイルのデフォルトパス
pub const DEFAULT_MODEL_CONFIG_FILE: &str = "configs/config_models.json";

/// 設定値を上書きする環境変数のプレフィックス（例: `LLM_CONSUL_IS_REGISTER=true`）
pub const SETTINGS_ENV_PREFIX: &str = "LLM_CONSUL";

/// サービス登録設定
///
/// JSONのキー名は既存の設定ファイルとの互換のため `is_register` /
/// `consul_host` / `bind_service_host` 等を使う。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationSettings {
    /// 登録の有効/無効 (デフォルト: false)
    #[serde(rename = "is_register", default)]
    pub enabled: bool,

    /// Consulホスト (デフォルト: "localhost")
    #[serde(rename = "consul_host", default = "default_host")]
    pub registry_host: String,

    /// Consulポート (デフォルト: 8500)
    #[serde(rename = "consul_port", default = "default_registry_port")]
    pub registry_port: u16,

    /// このプロセスに到達できるホスト (デフォルト: "localhost")
    #[serde(rename = "bind_service_host", default = "default_host")]
    pub advertise_host: String,

    /// このプロセスに到達できるポート (デフォルト: 8000)
    #[serde(rename = "bind_service_port", default = "default_advertise_port")]
    pub advertise_port: u16,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_registry_port() -> u16 {
    8500
}

fn default_advertise_port() -> u16 {
    8000
}

impl Default for RegistrationSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            registry_host: default_host(),
            registry_port: default_registry_port(),
            advertise_host: default_host(),
            advertise_port: default_advertise_port(),
        }
    }
}

impl RegistrationSettings {
    /// Load settings from a JSON file, letting `LLM_CONSUL_*` variables
    /// override individual keys.
    pub fn load(path: impl AsRef<Path>) -> CommonResult<Self> {
        let contents = read_file(path.as_ref())?;
        let settings = config::Config::builder()
            .add_source(config::File::from_str(&contents, config::FileFormat::Json))
            .add_source(config::Environment::with_prefix(SETTINGS_ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize::<Self>()?;
        Ok(settings)
    }

    /// Base URL of the registry agent API.
    pub fn registry_url(&self) -> String {
        format!("http://{}:{}", self.registry_host, self.registry_port)
    }

    /// URL the registry polls to decide whether this instance is alive.
    pub fn health_url(&self) -> String {
        format!(
            "http://{}:{}/health",
            self.advertise_host, self.advertise_port
        )
    }
}

/// モデル設定ファイル
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelConfigFile {
    /// 提供するモデル一覧
    #[serde(default)]
    pub models: Vec<ModelSettings>,
}

impl ModelConfigFile {
    /// Load a model configuration file.
    pub fn load(path: impl AsRef<Path>) -> CommonResult<Self> {
        let contents = read_file(path.as_ref())?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Descriptors for every configured model, in file order.
    pub fn descriptors(&self) -> Vec<ServiceDescriptor> {
        self.models.iter().map(ModelSettings::descriptor).collect()
    }
}

/// 1モデル分の設定
///
/// モデルサーバーの設定ファイルをそのまま読むため、登録に使わないキーは無視する。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelSettings {
    /// モデルファイルのパス
    #[serde(default)]
    pub model: Option<String>,

    /// 公開名（必須。欠けていると登録全体が開始されない）
    #[serde(default)]
    pub model_alias: Option<String>,

    /// embeddingモデルかどうか
    #[serde(default)]
    pub embedding: bool,
}

impl ModelSettings {
    /// Service descriptor published for this model.
    pub fn descriptor(&self) -> ServiceDescriptor {
        ServiceDescriptor {
            alias: self.model_alias.clone(),
            is_embedding_service: self.embedding,
        }
    }
}

fn read_file(path: &Path) -> CommonResult<String> {
    std::fs::read_to_string(path).map_err(|source| CommonError::Io {
        path: path.to_path_buf(),
        source,
    })
}
