use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Duration, NaiveDate};

use crate::catalog::BusinessConfig;
use crate::workflows::notifications::{Notification, NotificationError, NotificationPublisher};
use crate::workflows::RepositoryError;

use super::domain::{CompanyProfile, Quote, QuoteNumber, QuoteRequest, QuoteStatus};
use super::pricing::{PremiumEngine, PricingError};
use super::repository::QuoteRepository;
use super::scoring;

/// Service composing the pricing engine, scorer, repository, and insurer panel.
pub struct QuoteService<R, N> {
    repository: Arc<R>,
    notifier: Arc<N>,
    engine: PremiumEngine,
    companies: Vec<CompanyProfile>,
    validity_days: i64,
}

static QUOTE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_quote_number() -> QuoteNumber {
    let id = QUOTE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    QuoteNumber(format!("QT-{id:06}"))
}

impl<R, N> QuoteService<R, N>
where
    R: QuoteRepository + 'static,
    N: NotificationPublisher + 'static,
{
    pub fn new(
        repository: Arc<R>,
        notifier: Arc<N>,
        engine: PremiumEngine,
        companies: Vec<CompanyProfile>,
        config: &BusinessConfig,
    ) -> Self {
        Self {
            repository,
            notifier,
            engine,
            companies,
            validity_days: config.get_int("QUOTE_VALIDITY_DAYS", 30),
        }
    }

    /// Price the request once and produce one scored quote per insurer.
    pub fn generate(
        &self,
        request: QuoteRequest,
        today: NaiveDate,
    ) -> Result<Vec<Quote>, QuoteServiceError> {
        let breakdown = self.engine.calculate(&request, today)?;
        let valid_until = today + Duration::days(self.validity_days);

        let mut quotes = Vec::with_capacity(self.companies.len());
        for company in &self.companies {
            let score = scoring::score_quote(
                breakdown.total_premium,
                company,
                request.sum_insured,
                request.requested_coverage_amount,
                request.annual_income,
                request.budget.as_ref(),
            );

            let quote = Quote {
                quote_number: next_quote_number(),
                application_id: request.application_id.clone(),
                insurance_type: request.insurance_type,
                company: company.clone(),
                sum_insured: request.sum_insured,
                breakdown: breakdown.clone(),
                score,
                status: QuoteStatus::Generated,
                generated_on: today,
                valid_until,
            };

            let stored = self.repository.insert(quote)?;
            quotes.push(stored);
        }

        tracing::info!(
            application_id = %request.application_id,
            count = quotes.len(),
            "quotes generated"
        );
        Ok(quotes)
    }

    pub fn get(&self, number: &QuoteNumber) -> Result<Quote, QuoteServiceError> {
        self.repository
            .fetch(number)?
            .ok_or(QuoteServiceError::Repository(RepositoryError::NotFound))
    }

    /// Quotes for an application, best score first.
    pub fn compare(&self, application_id: &str) -> Result<Vec<Quote>, QuoteServiceError> {
        let mut quotes = self.repository.for_application(application_id)?;
        quotes.sort_by(|a, b| {
            b.score
                .overall
                .partial_cmp(&a.score.overall)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(quotes)
    }

    /// Accept a quote, rejecting its siblings. Accepted quotes are immutable;
    /// expired quotes are marked as such before the refusal is returned.
    pub fn accept(
        &self,
        number: &QuoteNumber,
        today: NaiveDate,
    ) -> Result<Quote, QuoteServiceError> {
        let mut quote = self.get(number)?;

        match quote.status {
            QuoteStatus::Accepted => {
                return Err(QuoteServiceError::AlreadyAccepted(number.0.clone()))
            }
            QuoteStatus::Rejected | QuoteStatus::Expired => {
                return Err(QuoteServiceError::NotAcceptable {
                    quote_number: number.0.clone(),
                    status: quote.status.label(),
                })
            }
            QuoteStatus::Generated | QuoteStatus::Sent => {}
        }

        if quote.is_expired(today) {
            quote.status = QuoteStatus::Expired;
            self.repository.update(quote)?;
            return Err(QuoteServiceError::Expired(number.0.clone()));
        }

        quote.status = QuoteStatus::Accepted;
        self.repository.update(quote.clone())?;

        for mut sibling in self.repository.for_application(&quote.application_id)? {
            if sibling.quote_number != quote.quote_number
                && matches!(sibling.status, QuoteStatus::Generated | QuoteStatus::Sent)
            {
                sibling.status = QuoteStatus::Rejected;
                self.repository.update(sibling)?;
            }
        }

        self.notifier.publish(
            Notification::new("quote_accepted", quote.quote_number.0.clone())
                .with_detail("company", quote.company.company_name.clone())
                .with_detail("total_premium", format!("{:.2}", quote.breakdown.total_premium)),
        )?;

        Ok(quote)
    }
}

/// Error raised by the quote service.
#[derive(Debug, thiserror::Error)]
pub enum QuoteServiceError {
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
    #[error("quote {0} has expired")]
    Expired(String),
    #[error("quote {0} is already accepted")]
    AlreadyAccepted(String),
    #[error("quote {quote_number} cannot be accepted from status {status}")]
    NotAcceptable {
        quote_number: String,
        status: &'static str,
    },
}
