//! Claim lifecycle workflow: intake, the status state machine with
//! authority-gated approvals, and SLA tracking.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;
pub mod transitions;

pub use domain::{
    Claim, ClaimNumber, ClaimStatus, SlaState, SlaStatus, StatusHistoryEntry,
};
pub use repository::{ClaimRepository, ClaimView};
pub use router::claim_router;
pub use service::{ClaimService, ClaimServiceError, ClaimSubmission, TransitionRequest};
pub use transitions::{allowed_transitions, apply_transition, TransitionError};
