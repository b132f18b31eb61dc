use crate::workflows::RepositoryError;

use super::domain::{OrderId, Payment, Policy};

/// Storage abstraction for payments and issued policies.
///
/// `insert_pending` must enforce at most one pending payment per quote, so
/// a concurrent duplicate initiation surfaces as `Conflict` at the storage
/// layer rather than racing a read-then-write check. `complete` persists the
/// successful payment and the issued policy all-or-nothing.
pub trait PaymentRepository: Send + Sync {
    fn insert_pending(&self, payment: Payment) -> Result<Payment, RepositoryError>;
    fn fetch_by_order(&self, order_id: &OrderId) -> Result<Option<Payment>, RepositoryError>;
    fn mark_failed(&self, payment: Payment) -> Result<Payment, RepositoryError>;
    fn complete(&self, payment: Payment, policy: Policy) -> Result<Policy, RepositoryError>;
    fn policy_for_quote(&self, quote_number: &str) -> Result<Option<Policy>, RepositoryError>;
}
