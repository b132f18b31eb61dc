use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::workflows::notifications::NotificationPublisher;
use crate::workflows::quotes::QuoteRepository;
use crate::workflows::RepositoryError;

use super::repository::PaymentRepository;
use super::service::{PaymentService, PaymentServiceError, VerificationRequest};

#[derive(Debug, Deserialize)]
pub(crate) struct InitiateRequest {
    quote_number: String,
}

/// Router builder exposing HTTP endpoints for the payment flow.
pub fn payment_router<P, Q, N>(service: Arc<PaymentService<P, Q, N>>) -> Router
where
    P: PaymentRepository + 'static,
    Q: QuoteRepository + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route(
            "/api/v1/payments/initiate",
            post(initiate_handler::<P, Q, N>),
        )
        .route("/api/v1/payments/verify", post(verify_handler::<P, Q, N>))
        .with_state(service)
}

fn error_response(error: PaymentServiceError) -> Response {
    let status = match &error {
        PaymentServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        PaymentServiceError::Repository(RepositoryError::Conflict)
        | PaymentServiceError::QuoteNotAccepted { .. }
        | PaymentServiceError::AlreadyPaid { .. } => StatusCode::CONFLICT,
        PaymentServiceError::SignatureMismatch { .. } => StatusCode::BAD_REQUEST,
        PaymentServiceError::Repository(RepositoryError::Unavailable(_))
        | PaymentServiceError::Notification(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn initiate_handler<P, Q, N>(
    State(service): State<Arc<PaymentService<P, Q, N>>>,
    axum::Json(request): axum::Json<InitiateRequest>,
) -> Response
where
    P: PaymentRepository + 'static,
    Q: QuoteRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.initiate(&request.quote_number, Utc::now()) {
        Ok(payment) => (StatusCode::CREATED, axum::Json(payment)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn verify_handler<P, Q, N>(
    State(service): State<Arc<PaymentService<P, Q, N>>>,
    axum::Json(request): axum::Json<VerificationRequest>,
) -> Response
where
    P: PaymentRepository + 'static,
    Q: QuoteRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.verify(request, Utc::now()) {
        Ok(policy) => (StatusCode::OK, axum::Json(policy)).into_response(),
        Err(error) => error_response(error),
    }
}
