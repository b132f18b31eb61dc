use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, Utc};
use serde_json::json;

use crate::workflows::notifications::NotificationPublisher;
use crate::workflows::RepositoryError;

use super::domain::{ClaimNumber, ClaimStatus};
use super::repository::ClaimRepository;
use super::service::{ClaimService, ClaimServiceError, ClaimSubmission, TransitionRequest};
use super::transitions::TransitionError;

/// Router builder exposing HTTP endpoints for claim intake and transitions.
pub fn claim_router<R, N>(service: Arc<ClaimService<R, N>>) -> Router
where
    R: ClaimRepository + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route("/api/v1/claims", post(submit_handler::<R, N>))
        .route("/api/v1/claims/:claim_number", get(get_handler::<R, N>))
        .route(
            "/api/v1/claims/:claim_number/status",
            post(transition_handler::<R, N>),
        )
        .with_state(service)
}

fn labels(statuses: &[ClaimStatus]) -> Vec<&'static str> {
    statuses.iter().map(|status| status.label()).collect()
}

fn error_response(error: ClaimServiceError) -> Response {
    match error {
        ClaimServiceError::Transition(TransitionError::InvalidTransition {
            from,
            to,
            allowed,
        }) => {
            let payload = json!({
                "error": format!("cannot move claim from {} to {}", from.label(), to.label()),
                "current_status": from.label(),
                "allowed_transitions": labels(allowed),
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        ClaimServiceError::Transition(TransitionError::ExceedsApprovalAuthority {
            actor_id,
            amount,
        }) => {
            let payload = json!({
                "error": "exceeds approval authority",
                "actor_id": actor_id,
                "amount_requested": amount,
            });
            (StatusCode::FORBIDDEN, axum::Json(payload)).into_response()
        }
        ClaimServiceError::Transition(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        ClaimServiceError::NonPositiveAmount(_) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        ClaimServiceError::Repository(RepositoryError::NotFound) => {
            let payload = json!({ "error": "claim not found" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        other => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn submit_handler<R, N>(
    State(service): State<Arc<ClaimService<R, N>>>,
    axum::Json(submission): axum::Json<ClaimSubmission>,
) -> Response
where
    R: ClaimRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let today = Local::now().date_naive();
    match service.submit(submission, today) {
        Ok(claim) => (StatusCode::CREATED, axum::Json(claim)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_handler<R, N>(
    State(service): State<Arc<ClaimService<R, N>>>,
    Path(claim_number): Path<String>,
) -> Response
where
    R: ClaimRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let today = Local::now().date_naive();
    match service.get(&ClaimNumber(claim_number), today) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn transition_handler<R, N>(
    State(service): State<Arc<ClaimService<R, N>>>,
    Path(claim_number): Path<String>,
    axum::Json(request): axum::Json<TransitionRequest>,
) -> Response
where
    R: ClaimRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.transition(&ClaimNumber(claim_number), request, Utc::now()) {
        Ok(claim) => (StatusCode::OK, axum::Json(claim)).into_response(),
        Err(error) => error_response(error),
    }
}
