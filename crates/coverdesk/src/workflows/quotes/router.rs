use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Local;
use serde_json::json;

use crate::workflows::notifications::NotificationPublisher;
use crate::workflows::RepositoryError;

use super::domain::{QuoteNumber, QuoteRequest};
use super::repository::{QuoteRepository, QuoteView};
use super::service::{QuoteService, QuoteServiceError};

/// Router builder exposing HTTP endpoints for quote generation and acceptance.
pub fn quote_router<R, N>(service: Arc<QuoteService<R, N>>) -> Router
where
    R: QuoteRepository + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route("/api/v1/quotes/generate", post(generate_handler::<R, N>))
        .route("/api/v1/quotes/:quote_number", get(get_handler::<R, N>))
        .route(
            "/api/v1/quotes/:quote_number/accept",
            post(accept_handler::<R, N>),
        )
        .route(
            "/api/v1/applications/:application_id/quotes",
            get(compare_handler::<R, N>),
        )
        .with_state(service)
}

fn error_response(error: QuoteServiceError) -> Response {
    let payload = json!({ "error": error.to_string() });
    let status = match &error {
        QuoteServiceError::Pricing(_) => StatusCode::UNPROCESSABLE_ENTITY,
        QuoteServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        QuoteServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        QuoteServiceError::Expired(_)
        | QuoteServiceError::AlreadyAccepted(_)
        | QuoteServiceError::NotAcceptable { .. } => StatusCode::CONFLICT,
        QuoteServiceError::Repository(RepositoryError::Unavailable(_))
        | QuoteServiceError::Notification(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn generate_handler<R, N>(
    State(service): State<Arc<QuoteService<R, N>>>,
    axum::Json(request): axum::Json<QuoteRequest>,
) -> Response
where
    R: QuoteRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let today = Local::now().date_naive();
    match service.generate(request, today) {
        Ok(quotes) => {
            let views: Vec<QuoteView> = quotes.iter().map(QuoteView::from_quote).collect();
            (StatusCode::CREATED, axum::Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_handler<R, N>(
    State(service): State<Arc<QuoteService<R, N>>>,
    Path(quote_number): Path<String>,
) -> Response
where
    R: QuoteRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.get(&QuoteNumber(quote_number)) {
        Ok(quote) => (StatusCode::OK, axum::Json(quote)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn compare_handler<R, N>(
    State(service): State<Arc<QuoteService<R, N>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: QuoteRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.compare(&application_id) {
        Ok(quotes) => {
            let views: Vec<QuoteView> = quotes.iter().map(QuoteView::from_quote).collect();
            let payload = json!({
                "application_id": application_id,
                "quotes": views,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn accept_handler<R, N>(
    State(service): State<Arc<QuoteService<R, N>>>,
    Path(quote_number): Path<String>,
) -> Response
where
    R: QuoteRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let today = Local::now().date_naive();
    match service.accept(&QuoteNumber(quote_number), today) {
        Ok(quote) => {
            (StatusCode::OK, axum::Json(QuoteView::from_quote(&quote))).into_response()
        }
        Err(error) => error_response(error),
    }
}
