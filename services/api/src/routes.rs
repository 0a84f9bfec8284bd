use crate::infra::{AppState, Portal};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use placement_cell::academics::academics_router;
use placement_cell::board::board_router;
use placement_cell::identity::identity_router;
use placement_cell::profiles::profile_router;
use placement_cell::recruitment::recruitment_router;
use serde_json::json;

pub(crate) fn with_portal_routes(portal: &Portal) -> axum::Router {
    identity_router(portal.identity.clone())
        .merge(profile_router(portal.profiles.clone()))
        .merge(academics_router(portal.academics.clone()))
        .merge(recruitment_router(portal.recruitment.clone()))
        .merge(board_router(portal.board.clone()))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
