use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::InsuranceType;

/// Business identifier assigned when a claim is registered, e.g. `CLM-000042`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClaimNumber(pub String);

/// Lifecycle states of a claim. Transitions between them are encoded in
/// [`super::transitions::allowed_transitions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimStatus {
    Submitted,
    UnderReview,
    SurveyorAssigned,
    UnderInvestigation,
    Assessed,
    Approved,
    Rejected,
    Settled,
    Closed,
}

impl ClaimStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ClaimStatus::Submitted => "SUBMITTED",
            ClaimStatus::UnderReview => "UNDER_REVIEW",
            ClaimStatus::SurveyorAssigned => "SURVEYOR_ASSIGNED",
            ClaimStatus::UnderInvestigation => "UNDER_INVESTIGATION",
            ClaimStatus::Assessed => "ASSESSED",
            ClaimStatus::Approved => "APPROVED",
            ClaimStatus::Rejected => "REJECTED",
            ClaimStatus::Settled => "SETTLED",
            ClaimStatus::Closed => "CLOSED",
        }
    }

    /// Terminal processing states where the clock stops for SLA purposes.
    pub const fn is_concluded(self) -> bool {
        matches!(
            self,
            ClaimStatus::Settled | ClaimStatus::Rejected | ClaimStatus::Closed
        )
    }
}

/// A registered claim against an issued policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub claim_number: ClaimNumber,
    pub policy_number: String,
    pub insurance_type: InsuranceType,
    pub claimant_id: String,
    pub description: String,
    pub status: ClaimStatus,
    pub amount_requested: f64,
    pub amount_approved: Option<f64>,
    pub amount_settled: Option<f64>,
    pub rejection_reason: Option<String>,
    pub submitted_on: NaiveDate,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub surveyor_assigned_at: Option<DateTime<Utc>>,
    pub assessed_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub settled_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}

/// Append-only audit row recorded alongside every applied transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub claim_number: ClaimNumber,
    pub old_status: ClaimStatus,
    pub new_status: ClaimStatus,
    pub actor_id: String,
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Whether a claim ran (or is running) inside its processing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaState {
    WithinSla,
    Breached,
    InProgress,
    Overdue,
}

impl SlaState {
    pub const fn label(self) -> &'static str {
        match self {
            SlaState::WithinSla => "within_sla",
            SlaState::Breached => "breached",
            SlaState::InProgress => "in_progress",
            SlaState::Overdue => "overdue",
        }
    }
}

/// SLA report for a single claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaStatus {
    pub claim_number: ClaimNumber,
    pub state: SlaState,
    pub sla_days: i64,
    pub days_elapsed: i64,
    /// Days left before breach; negative once past due. `None` for
    /// concluded claims.
    pub days_remaining: Option<i64>,
}

impl Claim {
    /// Date on which processing concluded, if it has.
    pub fn concluded_on(&self) -> Option<NaiveDate> {
        let concluded_at = match self.status {
            ClaimStatus::Settled => self.settled_at,
            ClaimStatus::Rejected => self.rejected_at,
            ClaimStatus::Closed => self.closed_at.or(self.settled_at).or(self.rejected_at),
            _ => None,
        };
        concluded_at.map(|at| at.date_naive())
    }
}
