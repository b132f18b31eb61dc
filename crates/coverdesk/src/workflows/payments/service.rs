use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::workflows::notifications::{Notification, NotificationError, NotificationPublisher};
use crate::workflows::quotes::{QuoteNumber, QuoteRepository, QuoteStatus};
use crate::workflows::RepositoryError;

use super::domain::{OrderId, Payment, PaymentReference, PaymentStatus, Policy};
use super::gateway::SignatureVerifier;
use super::repository::PaymentRepository;

static ORDER_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static POLICY_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_order_id() -> OrderId {
    let id = ORDER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    OrderId(format!("PAY-{id:06}"))
}

fn next_policy_number() -> String {
    let id = POLICY_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("POL-{id:06}")
}

/// Webhook payload for one verification attempt.
#[derive(Debug, Clone, Deserialize)]
pub struct VerificationRequest {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

/// Coordinates payment initiation, webhook verification, and policy issuance.
pub struct PaymentService<P, Q, N> {
    payments: Arc<P>,
    quotes: Arc<Q>,
    notifier: Arc<N>,
    verifier: SignatureVerifier,
}

impl<P, Q, N> PaymentService<P, Q, N>
where
    P: PaymentRepository,
    Q: QuoteRepository,
    N: NotificationPublisher,
{
    pub fn new(
        payments: Arc<P>,
        quotes: Arc<Q>,
        notifier: Arc<N>,
        verifier: SignatureVerifier,
    ) -> Self {
        Self {
            payments,
            quotes,
            notifier,
            verifier,
        }
    }

    /// Opens a pending payment for an accepted quote. The storage contract
    /// allows only one pending payment per quote, so a concurrent duplicate
    /// initiation fails with `Conflict` instead of double-charging.
    pub fn initiate(
        &self,
        quote_number: &str,
        now: DateTime<Utc>,
    ) -> Result<Payment, PaymentServiceError> {
        let quote = self
            .quotes
            .fetch(&QuoteNumber(quote_number.to_owned()))?
            .ok_or(PaymentServiceError::Repository(RepositoryError::NotFound))?;
        if quote.status != QuoteStatus::Accepted {
            return Err(PaymentServiceError::QuoteNotAccepted {
                quote_number: quote_number.to_owned(),
                status: quote.status.label(),
            });
        }
        if self.payments.policy_for_quote(quote_number)?.is_some() {
            return Err(PaymentServiceError::AlreadyPaid {
                quote_number: quote_number.to_owned(),
            });
        }

        let payment = Payment {
            order_id: next_order_id(),
            quote_number: quote_number.to_owned(),
            amount: quote.breakdown.total_premium,
            status: PaymentStatus::Pending,
            payment_reference: None,
            created_at: now,
            verified_at: None,
        };
        let payment = self.payments.insert_pending(payment)?;
        tracing::info!(
            order_id = %payment.order_id.0,
            quote_number = %payment.quote_number,
            amount = payment.amount,
            "payment initiated"
        );
        Ok(payment)
    }

    /// Verifies a gateway callback. Already-successful payments return their
    /// policy idempotently; a bad signature fails the payment and never
    /// issues a policy.
    pub fn verify(
        &self,
        request: VerificationRequest,
        now: DateTime<Utc>,
    ) -> Result<Policy, PaymentServiceError> {
        let order_id = OrderId(request.order_id.clone());
        let payment = self
            .payments
            .fetch_by_order(&order_id)?
            .ok_or(PaymentServiceError::Repository(RepositoryError::NotFound))?;

        if payment.status == PaymentStatus::Success {
            return self
                .payments
                .policy_for_quote(&payment.quote_number)?
                .ok_or(PaymentServiceError::Repository(RepositoryError::NotFound));
        }

        if !self
            .verifier
            .verify(&request.order_id, &request.payment_id, &request.signature)
        {
            tracing::warn!(
                order_id = %request.order_id,
                payment_id = %request.payment_id,
                "payment signature mismatch"
            );
            let mut failed = payment;
            failed.status = PaymentStatus::Failed;
            failed.payment_reference = Some(PaymentReference(request.payment_id.clone()));
            self.payments.mark_failed(failed)?;
            return Err(PaymentServiceError::SignatureMismatch {
                order_id: request.order_id,
            });
        }

        let mut paid = payment;
        paid.status = PaymentStatus::Success;
        paid.payment_reference = Some(PaymentReference(request.payment_id.clone()));
        paid.verified_at = Some(now);

        let policy = Policy {
            policy_number: next_policy_number(),
            quote_number: paid.quote_number.clone(),
            premium_paid: paid.amount,
            issued_at: now,
        };
        let policy = self.payments.complete(paid, policy)?;

        tracing::info!(
            policy_number = %policy.policy_number,
            quote_number = %policy.quote_number,
            "policy issued"
        );
        self.notifier.publish(
            Notification::new("policy_issued", policy.policy_number.clone())
                .with_detail("quote_number", policy.quote_number.clone())
                .with_detail("premium_paid", format!("{:.2}", policy.premium_paid)),
        )?;
        Ok(policy)
    }
}

#[derive(Debug, Error)]
pub enum PaymentServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
    #[error("quote {quote_number} is {status}, only accepted quotes are payable")]
    QuoteNotAccepted {
        quote_number: String,
        status: &'static str,
    },
    #[error("quote {quote_number} already has an issued policy")]
    AlreadyPaid { quote_number: String },
    #[error("signature mismatch for order {order_id}")]
    SignatureMismatch { order_id: String },
}
