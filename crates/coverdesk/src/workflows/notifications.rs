use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Trait describing outbound notification hooks (e-mail or SMS adapters).
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError>;
}

/// Simple notification payload so routes/tests can assert integration boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub template: String,
    /// Business key the notification refers to (quote, claim, or policy number).
    pub reference: String,
    pub details: BTreeMap<String, String>,
}

impl Notification {
    pub fn new(template: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            reference: reference.into(),
            details: BTreeMap::new(),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// Notification dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
