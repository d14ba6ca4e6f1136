use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

use jobboard::adverts::{
    advert_router, AdvertRepository, AdvertRouterState, ApplicationRepository, PublishQueue,
};
use jobboard::identity::{identity_router, AccountRepository, IdentityService, TokenRepository};

/// Compose the identity and advert routers with the operational endpoints.
pub(crate) fn api_router<R, Q, U, T>(
    adverts: AdvertRouterState<R, Q>,
    identity: Arc<IdentityService<U, T>>,
) -> axum::Router
where
    R: AdvertRepository + ApplicationRepository + 'static,
    Q: PublishQueue + 'static,
    U: AccountRepository + 'static,
    T: TokenRepository + 'static,
{
    identity_router(identity)
        .merge(advert_router(adverts))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    if state.readiness.load(std::sync::atomic::Ordering::Relaxed) {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "initializing" })),
        )
    }
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
