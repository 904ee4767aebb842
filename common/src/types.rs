//! 共通型定義
//!
//! ServiceDescriptor, ServiceRegistration, HealthReport等のコアデータ型

use crate::config::RegistrationSettings;
use crate::error::{RegistrarError, RegistrarResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Consulがヘルスチェックを実行する間隔（秒）
pub const HEALTH_CHECK_INTERVAL_SECS: u64 = 10;

/// embeddingモデルに付与する分類タグ
pub const EMBEDDINGS_TAG: &str = "embeddings";

/// チャット/補完モデルに付与する分類タグ
pub const CHAT_TAG: &str = "chat";

/// 公開するサービス1件分の入力
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    /// 論理サービス名（モデル名）。空や未設定は不可
    pub alias: Option<String>,
    /// embeddingサービスかどうか
    #[serde(default)]
    pub is_embedding_service: bool,
}

impl ServiceDescriptor {
    /// Descriptor for a named model.
    pub fn new(alias: impl Into<String>, is_embedding_service: bool) -> Self {
        Self {
            alias: Some(alias.into()),
            is_embedding_service,
        }
    }

    /// Returns the alias, or a configuration error naming the position of
    /// the offending descriptor.
    pub fn require_alias(&self, index: usize) -> RegistrarResult<&str> {
        match self.alias.as_deref() {
            Some(alias) if !alias.trim().is_empty() => Ok(alias),
            _ => Err(RegistrarError::Configuration(format!(
                "missing alias: model #{index} must set model_alias"
            ))),
        }
    }

    /// Classification tag for this descriptor.
    pub fn classification_tag(&self) -> &'static str {
        if self.is_embedding_service {
            EMBEDDINGS_TAG
        } else {
            CHAT_TAG
        }
    }
}

/// Registry-facing service name: the alias in lowercase.
pub fn service_name(alias: &str) -> String {
    alias.to_lowercase()
}

/// Path segment used by the edge router: dots are not allowed there.
pub fn route_name(service_name: &str) -> String {
    service_name.replace('.', "_")
}

/// Tag that makes a Consul-aware edge router expose `/{route}` for the service.
pub fn route_tag(route_name: &str) -> String {
    format!("urlprefix-/{route_name} strip=/{route_name}")
}

/// Fresh instance id: unique per registration attempt, never reused.
pub fn instance_id(service_name: &str) -> String {
    format!("{}-{}", service_name, Uuid::new_v4())
}

/// HTTPヘルスチェック定義
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheckSpec {
    /// ポーリング先URL
    pub http: String,
    /// ポーリング間隔（秒）
    pub interval_secs: u64,
}

/// レジストリに送る登録内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRegistration {
    /// サービス名
    pub name: String,
    /// インスタンスID
    pub id: String,
    /// 到達可能なアドレス
    pub address: String,
    /// 到達可能なポート
    pub port: u16,
    /// 分類タグとルーティングタグ
    pub tags: Vec<String>,
    /// ヘルスチェック
    pub check: HealthCheckSpec,
}

impl ServiceRegistration {
    /// Derive the registration for a validated descriptor, generating a new
    /// instance id.
    pub fn derive(
        alias: &str,
        descriptor: &ServiceDescriptor,
        settings: &RegistrationSettings,
    ) -> Self {
        let name = service_name(alias);
        let route = route_name(&name);
        let id = instance_id(&name);

        Self {
            tags: vec![
                descriptor.classification_tag().to_string(),
                route_tag(&route),
            ],
            address: settings.advertise_host.clone(),
            port: settings.advertise_port,
            check: HealthCheckSpec {
                http: settings.health_url(),
                interval_secs: HEALTH_CHECK_INTERVAL_SECS,
            },
            name,
            id,
        }
    }
}

/// ヘルス状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    /// プロセスは応答可能
    Ok,
    /// 状態評価中に障害が発生
    Failed,
}

/// `/health` のレスポンスボディ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    /// 状態
    pub status: HealthStatus,
    /// 障害内容（FAILED時のみ）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl HealthReport {
    /// Healthy report.
    pub fn ok() -> Self {
        Self {
            status: HealthStatus::Ok,
            msg: None,
        }
    }

    /// Report for a fault raised while evaluating health.
    pub fn failed(msg: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Failed,
            msg: Some(msg.into()),
        }
    }

    /// HTTP status code that accompanies this report.
    pub fn status_code(&self) -> u16 {
        match self.status {
            HealthStatus::Ok => 200,
            HealthStatus::Failed => 503,
        }
    }
}
