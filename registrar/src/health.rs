//! ヘルスチェック
//!
//! Consul が10秒ごとにポーリングする `GET /health`。
//! プロセスの生存だけを返し、登録状態やレジストリには依存しない。

use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use llm_consul_common::error::{RegistrarError, RegistrarResult};
use llm_consul_common::types::HealthReport;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Decides whether the process reports itself alive.
pub trait LivenessProbe: Send + Sync {
    /// `Err` becomes a `FAILED` report.
    fn check(&self) -> RegistrarResult<()>;
}

/// Always alive while the process can answer HTTP.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessLiveness;

impl LivenessProbe for ProcessLiveness {
    fn check(&self) -> RegistrarResult<()> {
        Ok(())
    }
}

/// Evaluate `probe`, turning an error or a panic into a `FAILED` report.
pub fn evaluate(probe: &dyn LivenessProbe) -> HealthReport {
    match catch_unwind(AssertUnwindSafe(|| probe.check())) {
        Ok(Ok(())) => HealthReport::ok(),
        Ok(Err(RegistrarError::HealthEvaluation(msg))) => HealthReport::failed(msg),
        // 内部のアドレス等はレスポンスに出さない
        Ok(Err(e)) => HealthReport::failed(e.external_message()),
        Err(panic) => HealthReport::failed(panic_message(panic.as_ref())),
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "health evaluation panicked".to_string()
    }
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let report = state.manager.health();
    let status =
        StatusCode::from_u16(report.status_code()).unwrap_or(StatusCode::SERVICE_UNAVAILABLE);
    (status, Json(report))
}
