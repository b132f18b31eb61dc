//! Insurance administration domain library.
//!
//! The catalog module holds configuration-driven business rules (premium
//! slabs, discount rules, approval thresholds, key-value settings); the
//! workflow modules build quote pricing and scoring, the claims state
//! machine, and payment verification on top of them.

pub mod catalog;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
