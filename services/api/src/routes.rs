use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

use coverdesk::workflows::claims::{claim_router, ClaimRepository, ClaimService};
use coverdesk::workflows::notifications::NotificationPublisher;
use coverdesk::workflows::payments::{payment_router, PaymentRepository, PaymentService};
use coverdesk::workflows::quotes::{quote_router, QuoteRepository, QuoteService};

/// Merges the workflow routers with the operational and catalog endpoints.
pub(crate) fn with_workflow_routes<QR, CR, PR, N>(
    quotes: Arc<QuoteService<QR, N>>,
    claims: Arc<ClaimService<CR, N>>,
    payments: Arc<PaymentService<PR, QR, N>>,
) -> axum::Router
where
    QR: QuoteRepository + 'static,
    CR: ClaimRepository + 'static,
    PR: PaymentRepository + 'static,
    N: NotificationPublisher + 'static,
{
    quote_router(quotes)
        .merge(claim_router(claims))
        .merge(payment_router(payments))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/catalog/slabs",
            axum::routing::get(catalog_slabs_endpoint),
        )
        .route(
            "/api/v1/catalog/coverages",
            axum::routing::get(catalog_coverages_endpoint),
        )
        .route(
            "/api/v1/catalog/addons",
            axum::routing::get(catalog_addons_endpoint),
        )
        .route(
            "/api/v1/catalog/discount-rules",
            axum::routing::get(catalog_discount_rules_endpoint),
        )
        .route(
            "/api/v1/catalog/approval-thresholds",
            axum::routing::get(catalog_thresholds_endpoint),
        )
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

pub(crate) async fn catalog_slabs_endpoint(
    Extension(state): Extension<AppState>,
) -> Json<serde_json::Value> {
    Json(json!({ "slabs": state.catalog.slabs }))
}

pub(crate) async fn catalog_coverages_endpoint(
    Extension(state): Extension<AppState>,
) -> Json<serde_json::Value> {
    Json(json!({ "coverages": state.catalog.coverages }))
}

pub(crate) async fn catalog_addons_endpoint(
    Extension(state): Extension<AppState>,
) -> Json<serde_json::Value> {
    Json(json!({ "addons": state.catalog.addons }))
}

pub(crate) async fn catalog_discount_rules_endpoint(
    Extension(state): Extension<AppState>,
) -> Json<serde_json::Value> {
    Json(json!({ "discount_rules": state.catalog.discount_rules }))
}

pub(crate) async fn catalog_thresholds_endpoint(
    Extension(state): Extension<AppState>,
) -> Json<serde_json::Value> {
    Json(json!({ "approval_thresholds": state.catalog.thresholds }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
    }
}
