//! Quote generation: slab-based premium pricing, discount evaluation,
//! suitability scoring, and the accept lifecycle.

pub mod domain;
pub mod pricing;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

pub use domain::{
    Addon, BudgetRange, CompanyProfile, Coverage, DiscountApplication, PremiumBreakdown, Quote,
    QuoteNumber, QuoteRequest, QuoteStatus, RiskCategory, RiskProfile, ScoreBreakdown,
};
pub use pricing::{PremiumEngine, PricingError};
pub use repository::{QuoteRepository, QuoteView};
pub use router::quote_router;
pub use service::{QuoteService, QuoteServiceError};
