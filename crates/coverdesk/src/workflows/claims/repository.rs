use serde::Serialize;

use crate::workflows::RepositoryError;

use super::domain::{Claim, ClaimNumber, SlaStatus, StatusHistoryEntry};

/// Storage abstraction so the service module can be exercised in isolation.
///
/// `apply` persists the mutated claim together with exactly one history row.
/// Implementations must make it all-or-nothing: either both land or neither
/// does.
pub trait ClaimRepository: Send + Sync {
    fn insert(&self, claim: Claim) -> Result<Claim, RepositoryError>;
    fn apply(&self, claim: Claim, entry: StatusHistoryEntry) -> Result<Claim, RepositoryError>;
    fn fetch(&self, number: &ClaimNumber) -> Result<Option<Claim>, RepositoryError>;
    fn history(&self, number: &ClaimNumber) -> Result<Vec<StatusHistoryEntry>, RepositoryError>;
}

/// Claim record plus its audit trail and SLA position, as exposed over HTTP.
#[derive(Debug, Clone, Serialize)]
pub struct ClaimView {
    #[serde(flatten)]
    pub claim: Claim,
    pub history: Vec<StatusHistoryEntry>,
    pub sla: SlaStatus,
}
