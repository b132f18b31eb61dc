use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::catalog::{Actor, BusinessConfig, InsuranceType, ThresholdTable};
use crate::workflows::notifications::{Notification, NotificationError, NotificationPublisher};
use crate::workflows::RepositoryError;

use super::domain::{Claim, ClaimNumber, ClaimStatus, SlaState, SlaStatus};
use super::repository::{ClaimRepository, ClaimView};
use super::transitions::{apply_transition, TransitionError, TransitionInput};

static CLAIM_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_claim_number() -> ClaimNumber {
    let id = CLAIM_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ClaimNumber(format!("CLM-{id:06}"))
}

const DEFAULT_SLA_DAYS: i64 = 15;

/// Intake payload for registering a new claim.
#[derive(Debug, Clone, Deserialize)]
pub struct ClaimSubmission {
    pub policy_number: String,
    pub insurance_type: InsuranceType,
    pub claimant_id: String,
    pub description: String,
    pub amount_requested: f64,
}

/// Caller payload for one transition attempt.
#[derive(Debug, Clone, Deserialize)]
pub struct TransitionRequest {
    pub target: ClaimStatus,
    pub actor: Actor,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub approved_amount: Option<f64>,
}

/// Coordinates claim intake, the transition state machine, and SLA reporting.
pub struct ClaimService<R, N> {
    repository: Arc<R>,
    notifier: Arc<N>,
    thresholds: ThresholdTable,
    sla_days: i64,
}

impl<R, N> ClaimService<R, N>
where
    R: ClaimRepository,
    N: NotificationPublisher,
{
    pub fn new(
        repository: Arc<R>,
        notifier: Arc<N>,
        thresholds: ThresholdTable,
        config: &BusinessConfig,
    ) -> Self {
        let sla_days = config.get_int("CLAIM_SLA_DAYS", DEFAULT_SLA_DAYS);
        Self {
            repository,
            notifier,
            thresholds,
            sla_days,
        }
    }

    pub fn submit(
        &self,
        submission: ClaimSubmission,
        today: NaiveDate,
    ) -> Result<Claim, ClaimServiceError> {
        if submission.amount_requested <= 0.0 {
            return Err(ClaimServiceError::NonPositiveAmount(
                submission.amount_requested,
            ));
        }
        let claim = Claim {
            claim_number: next_claim_number(),
            policy_number: submission.policy_number,
            insurance_type: submission.insurance_type,
            claimant_id: submission.claimant_id,
            description: submission.description,
            status: ClaimStatus::Submitted,
            amount_requested: submission.amount_requested,
            amount_approved: None,
            amount_settled: None,
            rejection_reason: None,
            submitted_on: today,
            reviewed_at: None,
            surveyor_assigned_at: None,
            assessed_at: None,
            approved_at: None,
            rejected_at: None,
            settled_at: None,
            closed_at: None,
        };
        let claim = self.repository.insert(claim)?;
        tracing::info!(
            claim_number = %claim.claim_number.0,
            policy_number = %claim.policy_number,
            amount_requested = claim.amount_requested,
            "claim registered"
        );
        Ok(claim)
    }

    pub fn transition(
        &self,
        number: &ClaimNumber,
        request: TransitionRequest,
        now: DateTime<Utc>,
    ) -> Result<Claim, ClaimServiceError> {
        let claim = self
            .repository
            .fetch(number)?
            .ok_or(ClaimServiceError::Repository(RepositoryError::NotFound))?;

        let input = TransitionInput {
            target: request.target,
            actor: &request.actor,
            reason: request.reason,
            approved_amount: request.approved_amount,
        };
        let (claim, entry) = apply_transition(claim, input, &self.thresholds, now)?;
        let claim = self.repository.apply(claim, entry)?;

        tracing::info!(
            claim_number = %claim.claim_number.0,
            status = claim.status.label(),
            actor = %request.actor.id,
            "claim transitioned"
        );
        self.notify_on(&claim)?;
        Ok(claim)
    }

    fn notify_on(&self, claim: &Claim) -> Result<(), NotificationError> {
        let template = match claim.status {
            ClaimStatus::Approved => "claim_approved",
            ClaimStatus::Rejected => "claim_rejected",
            ClaimStatus::Settled => "claim_settled",
            _ => return Ok(()),
        };
        let mut notification = Notification::new(template, claim.claim_number.0.clone())
            .with_detail("policy_number", claim.policy_number.clone());
        if let Some(approved) = claim.amount_approved {
            notification = notification.with_detail("amount_approved", format!("{approved:.2}"));
        }
        if let Some(reason) = &claim.rejection_reason {
            notification = notification.with_detail("reason", reason.clone());
        }
        self.notifier.publish(notification)
    }

    pub fn get(&self, number: &ClaimNumber, today: NaiveDate) -> Result<ClaimView, ClaimServiceError> {
        let claim = self
            .repository
            .fetch(number)?
            .ok_or(ClaimServiceError::Repository(RepositoryError::NotFound))?;
        let history = self.repository.history(number)?;
        let sla = self.sla_status(&claim, today);
        Ok(ClaimView {
            claim,
            history,
            sla,
        })
    }

    /// SLA position of one claim relative to the configured processing window.
    pub fn sla_status(&self, claim: &Claim, today: NaiveDate) -> SlaStatus {
        match claim.concluded_on() {
            Some(concluded_on) => {
                let processing_days = (concluded_on - claim.submitted_on).num_days();
                let state = if processing_days <= self.sla_days {
                    SlaState::WithinSla
                } else {
                    SlaState::Breached
                };
                SlaStatus {
                    claim_number: claim.claim_number.clone(),
                    state,
                    sla_days: self.sla_days,
                    days_elapsed: processing_days,
                    days_remaining: None,
                }
            }
            None => {
                let elapsed = (today - claim.submitted_on).num_days();
                let remaining = self.sla_days - elapsed;
                let state = if remaining >= 0 {
                    SlaState::InProgress
                } else {
                    SlaState::Overdue
                };
                SlaStatus {
                    claim_number: claim.claim_number.clone(),
                    state,
                    sla_days: self.sla_days,
                    days_elapsed: elapsed,
                    days_remaining: Some(remaining),
                }
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ClaimServiceError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
    #[error("claim amount must be positive, got {0:.2}")]
    NonPositiveAmount(f64),
}
