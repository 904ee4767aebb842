//! サービス登録ライフサイクル管理
//!
//! 起動時に全モデルをレジストリへ登録し、成功したインスタンスIDだけを記録する。
//! 停止時は記録したIDを1回ずつ登録解除し、結果にかかわらず記録から外す。
//!
//! 登録はベストエフォート: 1件の失敗でバッチは中断せず、ロールバックもしない。

use crate::consul::ServiceRegistry;
use crate::health::{self, LivenessProbe, ProcessLiveness};
use llm_consul_common::config::RegistrationSettings;
use llm_consul_common::error::{RegistrarError, RegistrarResult};
use llm_consul_common::types::{HealthReport, ServiceDescriptor, ServiceRegistration};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Lifecycle position of a [`RegistrationManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// Validated, nothing registered yet
    Configured,
    /// Registration is switched off; start/stop do nothing
    Disabled,
    /// `start()` has run
    Started,
    /// `stop()` has run
    Stopped,
}

#[derive(Debug)]
struct RegistrationState {
    phase: LifecyclePhase,
    registered_ids: Vec<String>,
}

/// Registers model services at startup and deregisters them at shutdown.
pub struct RegistrationManager {
    settings: RegistrationSettings,
    descriptors: Vec<ServiceDescriptor>,
    registry: Arc<dyn ServiceRegistry>,
    liveness: Arc<dyn LivenessProbe>,
    // start/stop は操作全体でこのロックを保持する
    state: Mutex<RegistrationState>,
}

impl RegistrationManager {
    /// Validate the descriptors and build a manager.
    ///
    /// Fails with [`RegistrarError::Configuration`] if any descriptor has no
    /// alias. The registry is not contacted.
    pub fn configure(
        settings: RegistrationSettings,
        descriptors: Vec<ServiceDescriptor>,
        registry: Arc<dyn ServiceRegistry>,
    ) -> RegistrarResult<Self> {
        for (index, descriptor) in descriptors.iter().enumerate() {
            descriptor.require_alias(index)?;
        }

        Ok(Self {
            settings,
            descriptors,
            registry,
            liveness: Arc::new(ProcessLiveness),
            state: Mutex::new(RegistrationState {
                phase: LifecyclePhase::Configured,
                registered_ids: Vec::new(),
            }),
        })
    }

    /// Replace the probe consulted by [`health`](Self::health).
    pub fn with_liveness_probe(mut self, probe: Arc<dyn LivenessProbe>) -> Self {
        self.liveness = probe;
        self
    }

    /// Settings this manager was configured with.
    pub fn settings(&self) -> &RegistrationSettings {
        &self.settings
    }

    /// Descriptors published by this manager, in registration order.
    pub fn descriptors(&self) -> &[ServiceDescriptor] {
        &self.descriptors
    }

    /// Whether registration is switched on.
    pub fn is_enabled(&self) -> bool {
        self.settings.enabled
    }

    /// Current lifecycle phase.
    pub async fn phase(&self) -> LifecyclePhase {
        self.state.lock().await.phase
    }

    /// Instance ids currently registered, in registration order.
    pub async fn registered_ids(&self) -> Vec<String> {
        self.state.lock().await.registered_ids.clone()
    }

    /// Register every descriptor, recording the ids the registry accepted.
    ///
    /// Runs once: later calls log a warning and return without touching the
    /// registry, so the same models are never registered twice.
    pub async fn start(&self) {
        let mut state = self.state.lock().await;

        if state.phase != LifecyclePhase::Configured {
            warn!(phase = ?state.phase, "Service registration already ran; ignoring start");
            return;
        }

        if !self.settings.enabled {
            info!("Service registration disabled");
            state.phase = LifecyclePhase::Disabled;
            return;
        }

        info!(
            count = self.descriptors.len(),
            registry = %self.settings.registry_url(),
            "Registering services"
        );

        for (index, descriptor) in self.descriptors.iter().enumerate() {
            // configure() で検証済み
            let alias = match descriptor.require_alias(index) {
                Ok(alias) => alias,
                Err(e) => {
                    warn!(error = %e, "Skipping invalid descriptor");
                    continue;
                }
            };
            let registration = ServiceRegistration::derive(alias, descriptor, &self.settings);

            match self.registry.register(&registration).await {
                Ok(()) => {
                    info!(
                        service_name = %registration.name,
                        service_id = %registration.id,
                        "register service success"
                    );
                    state.registered_ids.push(registration.id);
                }
                Err(e) => {
                    let error = RegistrarError::Registration {
                        service_id: registration.id.clone(),
                        reason: e.to_string(),
                    };
                    info!(
                        service_name = %registration.name,
                        service_id = %registration.id,
                        error = %error,
                        "register service failed"
                    );
                }
            }
        }

        state.phase = LifecyclePhase::Started;
    }

    /// Deregister every recorded id exactly once and clear the record.
    ///
    /// Failed deregistrations are logged and still dropped; they are never
    /// retried.
    pub async fn stop(&self) {
        let mut state = self.state.lock().await;

        if state.phase != LifecyclePhase::Started {
            return;
        }

        info!(
            count = state.registered_ids.len(),
            "Deregistering services"
        );

        let ids = std::mem::take(&mut state.registered_ids);
        for service_id in ids {
            match self.registry.deregister(&service_id).await {
                Ok(()) => info!(service_id = %service_id, "deregister service success"),
                Err(e) => {
                    let error = RegistrarError::Deregistration {
                        service_id: service_id.clone(),
                        reason: e.to_string(),
                    };
                    info!(service_id = %service_id, error = %error, "deregister service failed");
                }
            }
        }

        state.phase = LifecyclePhase::Stopped;
    }

    /// Process liveness. Never touches the registry or the recorded ids.
    pub fn health(&self) -> HealthReport {
        health::evaluate(self.liveness.as_ref())
    }
}
