//! Consul agent client
//!
//! `ServiceRegistry` は登録マネージャーから見たレジストリの最小インターフェース。
//! `ConsulClient` は Consul agent HTTP API (`/v1/agent/service/*`) を叩く実装。

use async_trait::async_trait;
use llm_consul_common::config::RegistrationSettings;
use llm_consul_common::error::{RegistrarError, RegistrarResult};
use llm_consul_common::types::ServiceRegistration;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Consul APIのデフォルトタイムアウト（秒）
pub const DEFAULT_REGISTRY_TIMEOUT_SECS: u64 = 10;

/// Service-discovery registry used by the registration manager.
///
/// `Ok(())` means the registry accepted the request; any `Err` is treated as
/// a failure of that single item.
#[async_trait]
pub trait ServiceRegistry: Send + Sync {
    /// サービスを登録
    async fn register(&self, registration: &ServiceRegistration) -> RegistrarResult<()>;
    /// サービスを登録解除
    async fn deregister(&self, service_id: &str) -> RegistrarResult<()>;
}

/// Consul agent API のサービス登録ペイロード
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct AgentServiceRegistration<'a> {
    name: &'a str,
    #[serde(rename = "ID")]
    id: &'a str,
    address: &'a str,
    port: u16,
    tags: &'a [String],
    check: AgentServiceCheck,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct AgentServiceCheck {
    #[serde(rename = "HTTP")]
    http: String,
    interval: String,
}

impl<'a> From<&'a ServiceRegistration> for AgentServiceRegistration<'a> {
    fn from(registration: &'a ServiceRegistration) -> Self {
        Self {
            name: &registration.name,
            id: &registration.id,
            address: &registration.address,
            port: registration.port,
            tags: &registration.tags,
            check: AgentServiceCheck {
                http: registration.check.http.clone(),
                interval: format!("{}s", registration.check.interval_secs),
            },
        }
    }
}

/// Consul agent HTTP client
#[derive(Clone)]
pub struct ConsulClient {
    base_url: String,
    client: Client,
}

impl ConsulClient {
    /// Create a client for the agent at `base_url` (e.g. `http://localhost:8500`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> RegistrarResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RegistrarError::Http(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Create a client for the registry named in `settings`.
    pub fn from_settings(settings: &RegistrationSettings, timeout: Duration) -> RegistrarResult<Self> {
        Self::new(settings.registry_url(), timeout)
    }

    /// Agent base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn put(&self, path: &str, body: Option<&AgentServiceRegistration<'_>>) -> RegistrarResult<()> {
        let url = format!("{}/v1{}", self.base_url, path);

        let mut request = self.client.put(&url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                RegistrarError::Timeout(format!("{url}: {e}"))
            } else {
                RegistrarError::Http(format!("{url}: {e}"))
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        debug!(url = %url, status = %status, body = %body, "Consul request rejected");
        Err(RegistrarError::Registry(format!(
            "HTTP {} from {}: {}",
            status.as_u16(),
            url,
            body.trim()
        )))
    }
}

#[async_trait]
impl ServiceRegistry for ConsulClient {
    async fn register(&self, registration: &ServiceRegistration) -> RegistrarResult<()> {
        let payload = AgentServiceRegistration::from(registration);
        self.put("/agent/service/register", Some(&payload)).await
    }

    async fn deregister(&self, service_id: &str) -> RegistrarResult<()> {
        self.put(&format!("/agent/service/deregister/{service_id}"), None)
            .await
    }
}
