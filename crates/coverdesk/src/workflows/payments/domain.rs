use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Gateway order identifier handed to the customer at initiation, e.g.
/// `PAY-000017`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

/// Identifier returned by the gateway once the customer has paid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentReference(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
}

impl PaymentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Success => "SUCCESS",
            PaymentStatus::Failed => "FAILED",
        }
    }
}

/// A payment attempt against an accepted quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub order_id: OrderId,
    pub quote_number: String,
    pub amount: f64,
    pub status: PaymentStatus,
    pub payment_reference: Option<PaymentReference>,
    pub created_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
}

/// Policy record issued when a payment verifies successfully.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub policy_number: String,
    pub quote_number: String,
    pub premium_paid: f64,
    pub issued_at: DateTime<Utc>,
}
