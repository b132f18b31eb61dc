//! Pure state-machine rules for claim transitions. Guards run to completion
//! before the claim record is touched, so a failed transition never leaves a
//! partially mutated claim behind.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::catalog::{Actor, CatalogError, ThresholdTable};

use super::domain::{Claim, ClaimStatus, StatusHistoryEntry};

/// The complete transition table. Any (from, to) pair not listed here is
/// invalid regardless of who asks.
pub const fn allowed_transitions(from: ClaimStatus) -> &'static [ClaimStatus] {
    match from {
        ClaimStatus::Submitted => &[ClaimStatus::UnderReview],
        ClaimStatus::UnderReview => &[
            ClaimStatus::SurveyorAssigned,
            ClaimStatus::Approved,
            ClaimStatus::Rejected,
        ],
        ClaimStatus::SurveyorAssigned => &[ClaimStatus::UnderInvestigation],
        ClaimStatus::UnderInvestigation => &[ClaimStatus::Assessed],
        ClaimStatus::Assessed => &[ClaimStatus::Approved, ClaimStatus::Rejected],
        ClaimStatus::Approved => &[ClaimStatus::Settled],
        ClaimStatus::Settled => &[ClaimStatus::Closed],
        ClaimStatus::Rejected => &[ClaimStatus::Closed],
        ClaimStatus::Closed => &[],
    }
}

#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("cannot move claim from {} to {}", from.label(), to.label())]
    InvalidTransition {
        from: ClaimStatus,
        to: ClaimStatus,
        allowed: &'static [ClaimStatus],
    },
    #[error("actor {actor_id} lacks the authority required to approve {amount:.2}")]
    ExceedsApprovalAuthority { actor_id: String, amount: f64 },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("a rejection reason is required")]
    ReasonRequired,
    #[error("an approved amount is required to approve a claim")]
    MissingApprovedAmount,
    #[error("approved amount {approved:.2} exceeds requested amount {requested:.2}")]
    ApprovedExceedsRequested { approved: f64, requested: f64 },
    #[error("claim must be approved before settlement")]
    NotApproved,
}

/// Inputs supplied by the caller for a single transition attempt.
#[derive(Debug, Clone)]
pub struct TransitionInput<'a> {
    pub target: ClaimStatus,
    pub actor: &'a Actor,
    pub reason: Option<String>,
    pub approved_amount: Option<f64>,
}

/// Validates and applies one transition, returning the mutated claim and the
/// audit row to persist with it. The caller owns persistence; this function
/// never does I/O.
pub fn apply_transition(
    mut claim: Claim,
    input: TransitionInput<'_>,
    thresholds: &ThresholdTable,
    now: DateTime<Utc>,
) -> Result<(Claim, StatusHistoryEntry), TransitionError> {
    let from = claim.status;
    let to = input.target;
    let allowed = allowed_transitions(from);
    if !allowed.contains(&to) {
        return Err(TransitionError::InvalidTransition { from, to, allowed });
    }

    match to {
        ClaimStatus::Approved => {
            let threshold =
                thresholds.for_claim(claim.insurance_type, claim.amount_requested)?;
            if !input.actor.holds(threshold.required_authority) {
                return Err(TransitionError::ExceedsApprovalAuthority {
                    actor_id: input.actor.id.clone(),
                    amount: claim.amount_requested,
                });
            }
            let approved = input
                .approved_amount
                .ok_or(TransitionError::MissingApprovedAmount)?;
            if approved > claim.amount_requested {
                return Err(TransitionError::ApprovedExceedsRequested {
                    approved,
                    requested: claim.amount_requested,
                });
            }
            claim.amount_approved = Some(approved);
            claim.approved_at = Some(now);
        }
        ClaimStatus::Rejected => {
            match input.reason.as_deref() {
                Some(reason) if !reason.trim().is_empty() => {}
                _ => return Err(TransitionError::ReasonRequired),
            }
            claim.rejection_reason = input.reason.clone();
            claim.rejected_at = Some(now);
        }
        ClaimStatus::Settled => {
            let approved = claim.amount_approved.ok_or(TransitionError::NotApproved)?;
            claim.amount_settled = Some(approved);
            claim.settled_at = Some(now);
        }
        ClaimStatus::UnderReview => claim.reviewed_at = Some(now),
        ClaimStatus::SurveyorAssigned => claim.surveyor_assigned_at = Some(now),
        ClaimStatus::Assessed => claim.assessed_at = Some(now),
        ClaimStatus::Closed => claim.closed_at = Some(now),
        ClaimStatus::Submitted | ClaimStatus::UnderInvestigation => {}
    }

    claim.status = to;
    let entry = StatusHistoryEntry {
        claim_number: claim.claim_number.clone(),
        old_status: from,
        new_status: to,
        actor_id: input.actor.id.clone(),
        reason: input.reason,
        occurred_at: now,
    };
    Ok((claim, entry))
}
