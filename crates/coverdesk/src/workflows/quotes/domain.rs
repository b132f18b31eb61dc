use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::{InsuranceType, QuoteContext};

/// Identifier wrapper for generated quotes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteNumber(pub String);

/// Lifecycle of a quote. A quote is immutable once accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuoteStatus {
    Generated,
    Sent,
    Accepted,
    Rejected,
    Expired,
}

impl QuoteStatus {
    pub const fn label(self) -> &'static str {
        match self {
            QuoteStatus::Generated => "generated",
            QuoteStatus::Sent => "sent",
            QuoteStatus::Accepted => "accepted",
            QuoteStatus::Rejected => "rejected",
            QuoteStatus::Expired => "expired",
        }
    }
}

/// Insurer snapshot used for scoring and presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub company_code: String,
    pub company_name: String,
    /// Fraction of claims historically paid out, in `0.0..=1.0`.
    pub claim_settlement_ratio: f64,
    /// Service quality rating on a five point scale.
    pub service_rating: f64,
}

/// A coverage item with a fixed premium contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coverage {
    pub code: String,
    pub name: String,
    pub fixed_premium: f64,
    pub mandatory: bool,
}

/// A rider priced as a percentage of the base premium, optionally capped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Addon {
    pub code: String,
    pub name: String,
    pub premium_percentage: f64,
    pub max_premium: Option<f64>,
}

/// Coarse risk bands derived from the weighted sub-factor score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskCategory {
    Low,
    Medium,
    High,
}

impl RiskCategory {
    pub const fn label(self) -> &'static str {
        match self {
            RiskCategory::Low => "LOW",
            RiskCategory::Medium => "MEDIUM",
            RiskCategory::High => "HIGH",
        }
    }

    /// Multiplicative premium loading applied for the band.
    pub const fn adjustment_percentage(self) -> f64 {
        match self {
            RiskCategory::Low => -5.0,
            RiskCategory::Medium => 5.0,
            RiskCategory::High => 15.0,
        }
    }
}

/// Per-customer risk sub-factors, each normalized to `0.0..=100.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    pub age_score: f64,
    pub medical_score: f64,
    pub driving_score: f64,
    pub claim_history_score: f64,
}

impl RiskProfile {
    const WEIGHT_AGE: f64 = 0.25;
    const WEIGHT_MEDICAL: f64 = 0.25;
    const WEIGHT_DRIVING: f64 = 0.25;
    const WEIGHT_CLAIM_HISTORY: f64 = 0.25;

    /// Weighted overall risk score in `0.0..=100.0`.
    pub fn overall_score(&self) -> f64 {
        let weighted = Self::WEIGHT_AGE * self.age_score
            + Self::WEIGHT_MEDICAL * self.medical_score
            + Self::WEIGHT_DRIVING * self.driving_score
            + Self::WEIGHT_CLAIM_HISTORY * self.claim_history_score;
        weighted.clamp(0.0, 100.0)
    }

    pub fn category(&self) -> RiskCategory {
        let overall = self.overall_score();
        if overall < 35.0 {
            RiskCategory::Low
        } else if overall < 65.0 {
            RiskCategory::Medium
        } else {
            RiskCategory::High
        }
    }

    pub fn adjustment_percentage(&self) -> f64 {
        self.category().adjustment_percentage()
    }
}

/// Customer budget preference for affordability scoring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetRange {
    pub min: f64,
    pub max: f64,
}

/// Input to quote generation, built from application and customer data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub application_id: String,
    pub insurance_type: InsuranceType,
    pub sum_insured: f64,
    /// Coverage amount the customer asked for; feeds the coverage sub-score.
    pub requested_coverage_amount: f64,
    pub coverage_codes: Vec<String>,
    pub addon_codes: Vec<String>,
    pub risk_profile: RiskProfile,
    pub annual_income: Option<f64>,
    pub budget: Option<BudgetRange>,
    #[serde(default)]
    pub context: QuoteContext,
}

/// A matched discount rule with the amount it contributed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountApplication {
    pub rule_code: String,
    pub rule_name: String,
    pub percentage: f64,
    pub amount: f64,
    pub combinable: bool,
}

/// Every intermediate amount of the premium pipeline, kept for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PremiumBreakdown {
    pub base_premium: f64,
    pub coverage_premium: f64,
    pub addon_premium: f64,
    pub subtotal: f64,
    pub risk_percentage: f64,
    pub risk_category: RiskCategory,
    pub risk_adjustment: f64,
    pub adjusted_premium: f64,
    pub discounts: Vec<DiscountApplication>,
    pub total_discount: f64,
    pub net_premium: f64,
    pub gst_rate_percent: f64,
    pub gst_amount: f64,
    pub total_premium: f64,
}

/// Weighted suitability score with its sub-scores, each in `0.0..=100.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub affordability: f64,
    pub claim_ratio: f64,
    pub coverage: f64,
    pub service: f64,
    pub overall: f64,
}

/// A generated quote for one insurer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub quote_number: QuoteNumber,
    pub application_id: String,
    pub insurance_type: InsuranceType,
    pub company: CompanyProfile,
    pub sum_insured: f64,
    pub breakdown: PremiumBreakdown,
    pub score: ScoreBreakdown,
    pub status: QuoteStatus,
    pub generated_on: NaiveDate,
    pub valid_until: NaiveDate,
}

impl Quote {
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        today > self.valid_until
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_profile_bands_map_to_adjustments() {
        let low = RiskProfile {
            age_score: 20.0,
            medical_score: 10.0,
            driving_score: 30.0,
            claim_history_score: 20.0,
        };
        assert_eq!(low.category(), RiskCategory::Low);
        assert_eq!(low.adjustment_percentage(), -5.0);

        let medium = RiskProfile {
            age_score: 50.0,
            medical_score: 40.0,
            driving_score: 60.0,
            claim_history_score: 50.0,
        };
        assert_eq!(medium.category(), RiskCategory::Medium);
        assert_eq!(medium.adjustment_percentage(), 5.0);

        let high = RiskProfile {
            age_score: 80.0,
            medical_score: 70.0,
            driving_score: 90.0,
            claim_history_score: 75.0,
        };
        assert_eq!(high.category(), RiskCategory::High);
        assert_eq!(high.adjustment_percentage(), 15.0);
    }

    #[test]
    fn quote_expiry_is_exclusive_of_the_last_valid_day() {
        let generated = NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid");
        let valid_until = NaiveDate::from_ymd_opt(2026, 1, 31).expect("valid");
        let quote = Quote {
            quote_number: QuoteNumber("QT-000001".to_string()),
            application_id: "APP-1".to_string(),
            insurance_type: InsuranceType::Motor,
            company: CompanyProfile {
                company_code: "ACME".to_string(),
                company_name: "Acme General".to_string(),
                claim_settlement_ratio: 0.9,
                service_rating: 4.0,
            },
            sum_insured: 100_000.0,
            breakdown: PremiumBreakdown {
                base_premium: 0.0,
                coverage_premium: 0.0,
                addon_premium: 0.0,
                subtotal: 0.0,
                risk_percentage: 0.0,
                risk_category: RiskCategory::Medium,
                risk_adjustment: 0.0,
                adjusted_premium: 0.0,
                discounts: Vec::new(),
                total_discount: 0.0,
                net_premium: 0.0,
                gst_rate_percent: 18.0,
                gst_amount: 0.0,
                total_premium: 0.0,
            },
            score: ScoreBreakdown {
                affordability: 0.0,
                claim_ratio: 0.0,
                coverage: 0.0,
                service: 0.0,
                overall: 0.0,
            },
            status: QuoteStatus::Generated,
            generated_on: generated,
            valid_until,
        };

        assert!(!quote.is_expired(valid_until));
        let after = valid_until.succ_opt().expect("valid");
        assert!(quote.is_expired(after));
    }
}
