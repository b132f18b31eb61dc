//! Payment verification workflow: order initiation for accepted quotes,
//! gateway signature checking, and policy issuance on verified payment.

pub mod domain;
pub mod gateway;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{OrderId, Payment, PaymentReference, PaymentStatus, Policy};
pub use gateway::SignatureVerifier;
pub use repository::PaymentRepository;
pub use router::payment_router;
pub use service::{PaymentService, PaymentServiceError, VerificationRequest};
