//! REST APIルーター
//!
//! 登録が有効なときだけ `GET /health` を公開する。
//! 無効時はルート自体が存在しない（404）。

use crate::{health, AppState};
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

/// Build the application router.
pub fn create_app(state: AppState) -> Router {
    let mut router = Router::new();

    if state.manager.is_enabled() {
        router = router.route("/health", get(health::health_check));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
