use chrono::NaiveDate;
use serde::Serialize;

use crate::workflows::RepositoryError;

use super::domain::{Quote, QuoteNumber};
use super::scoring;

/// Storage abstraction so the service module can be exercised in isolation.
pub trait QuoteRepository: Send + Sync {
    fn insert(&self, quote: Quote) -> Result<Quote, RepositoryError>;
    fn update(&self, quote: Quote) -> Result<(), RepositoryError>;
    fn fetch(&self, number: &QuoteNumber) -> Result<Option<Quote>, RepositoryError>;
    fn for_application(&self, application_id: &str) -> Result<Vec<Quote>, RepositoryError>;
}

/// Comparison-friendly projection of a quote for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteView {
    pub quote_number: QuoteNumber,
    pub company_code: String,
    pub company_name: String,
    pub status: &'static str,
    pub total_premium: f64,
    pub overall_score: f64,
    pub valid_until: NaiveDate,
    pub recommendation: String,
}

impl QuoteView {
    pub fn from_quote(quote: &Quote) -> Self {
        Self {
            quote_number: quote.quote_number.clone(),
            company_code: quote.company.company_code.clone(),
            company_name: quote.company.company_name.clone(),
            status: quote.status.label(),
            total_premium: quote.breakdown.total_premium,
            overall_score: quote.score.overall,
            valid_until: quote.valid_until,
            recommendation: scoring::recommendation_reason(
                &quote.score,
                &quote.company.company_name,
            ),
        }
    }
}
