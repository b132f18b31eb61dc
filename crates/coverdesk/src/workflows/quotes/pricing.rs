//! Premium calculation pipeline.
//!
//! base (slab rate x sum insured) -> fixed coverage costs -> percentage
//! addons -> multiplicative risk adjustment -> discount rules -> GST.
//! Every intermediate amount lands in the breakdown for auditability.

use chrono::NaiveDate;

use crate::catalog::{BusinessConfig, CatalogError, DiscountRule, SlabTable};

use super::domain::{Addon, Coverage, DiscountApplication, PremiumBreakdown, QuoteRequest};

/// Rounds to two decimal places at breakdown edges.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Validation and configuration failures raised during pricing.
#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("unknown coverage code '{0}'")]
    UnknownCoverage(String),
    #[error("unknown addon code '{0}'")]
    UnknownAddon(String),
    #[error("sum insured must be positive, got {0:.2}")]
    NonPositiveSumInsured(f64),
}

/// Stateless calculator over the pricing catalog.
pub struct PremiumEngine {
    slabs: SlabTable,
    coverages: Vec<Coverage>,
    addons: Vec<Addon>,
    discount_rules: Vec<DiscountRule>,
    gst_rate_percent: f64,
}

impl PremiumEngine {
    pub fn new(
        slabs: SlabTable,
        coverages: Vec<Coverage>,
        addons: Vec<Addon>,
        mut discount_rules: Vec<DiscountRule>,
        config: &BusinessConfig,
    ) -> Self {
        discount_rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        Self {
            slabs,
            coverages,
            addons,
            discount_rules,
            gst_rate_percent: config.get_decimal("GST_RATE", 18.0),
        }
    }

    pub fn gst_rate_percent(&self) -> f64 {
        self.gst_rate_percent
    }

    pub fn calculate(
        &self,
        request: &QuoteRequest,
        today: NaiveDate,
    ) -> Result<PremiumBreakdown, PricingError> {
        if request.sum_insured <= 0.0 {
            return Err(PricingError::NonPositiveSumInsured(request.sum_insured));
        }

        let slab = self
            .slabs
            .lookup(request.insurance_type, request.sum_insured)?;
        let base_premium = round2(request.sum_insured * (slab.rate_percent / 100.0));

        let mut coverage_premium = 0.0;
        for code in &request.coverage_codes {
            let coverage = self
                .coverages
                .iter()
                .find(|coverage| &coverage.code == code)
                .ok_or_else(|| PricingError::UnknownCoverage(code.clone()))?;
            coverage_premium += coverage.fixed_premium;
        }
        let coverage_premium = round2(coverage_premium);

        let mut addon_premium = 0.0;
        for code in &request.addon_codes {
            let addon = self
                .addons
                .iter()
                .find(|addon| &addon.code == code)
                .ok_or_else(|| PricingError::UnknownAddon(code.clone()))?;
            let mut amount = base_premium * (addon.premium_percentage / 100.0);
            if let Some(cap) = addon.max_premium {
                if amount > cap {
                    amount = cap;
                }
            }
            addon_premium += amount;
        }
        let addon_premium = round2(addon_premium);

        let subtotal = round2(base_premium + coverage_premium + addon_premium);

        let risk_category = request.risk_profile.category();
        let risk_percentage = risk_category.adjustment_percentage();
        let risk_adjustment = round2(subtotal * (risk_percentage / 100.0));
        let adjusted_premium = round2(subtotal + risk_adjustment);

        let (discounts, total_discount) =
            self.evaluate_discounts(request, adjusted_premium, today);

        let net_premium = round2((adjusted_premium - total_discount).max(0.0));
        let gst_amount = round2(net_premium * (self.gst_rate_percent / 100.0));
        let total_premium = round2(net_premium + gst_amount);

        Ok(PremiumBreakdown {
            base_premium,
            coverage_premium,
            addon_premium,
            subtotal,
            risk_percentage,
            risk_category,
            risk_adjustment,
            adjusted_premium,
            discounts,
            total_discount,
            net_premium,
            gst_rate_percent: self.gst_rate_percent,
            gst_amount,
            total_premium,
        })
    }

    /// Combinable matches accumulate; the single best exclusive match (amount
    /// first, priority as tie-break) replaces the combined set only when it
    /// is strictly larger.
    fn evaluate_discounts(
        &self,
        request: &QuoteRequest,
        adjusted_premium: f64,
        today: NaiveDate,
    ) -> (Vec<DiscountApplication>, f64) {
        let mut combinable = Vec::new();
        let mut best_exclusive: Option<DiscountApplication> = None;

        for rule in &self.discount_rules {
            if !rule.matches(request.insurance_type, &request.context, today) {
                continue;
            }

            let application = DiscountApplication {
                rule_code: rule.rule_code.clone(),
                rule_name: rule.rule_name.clone(),
                percentage: rule.discount_percentage,
                amount: round2(rule.discount_amount(adjusted_premium)),
                combinable: rule.combinable,
            };

            if rule.combinable {
                combinable.push(application);
            } else {
                // Rules are pre-sorted by priority, so on equal amounts the
                // earlier (higher priority) exclusive rule is kept.
                let better = best_exclusive
                    .as_ref()
                    .map(|current| application.amount > current.amount)
                    .unwrap_or(true);
                if better {
                    best_exclusive = Some(application);
                }
            }
        }

        let combined_total = round2(combinable.iter().map(|d| d.amount).sum());
        match best_exclusive {
            Some(exclusive) if exclusive.amount > combined_total => {
                let total = exclusive.amount;
                (vec![exclusive], total)
            }
            _ => (combinable, combined_total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{
        ContextField, ContextValue, InsuranceType, Predicate, PremiumSlab, QuoteContext,
        Operator,
    };
    use crate::workflows::quotes::domain::RiskProfile;

    fn slab_table() -> SlabTable {
        SlabTable::new(vec![PremiumSlab {
            insurance_type: InsuranceType::Motor,
            slab_name: "MOTOR Slab 3".to_string(),
            min_sum_insured: 500_001.0,
            max_sum_insured: 5_000_000.0,
            rate_percent: 2.5,
            active: true,
        }])
        .expect("valid slabs")
    }

    fn coverages() -> Vec<Coverage> {
        vec![
            Coverage {
                code: "THIRD_PARTY".to_string(),
                name: "Third Party Liability".to_string(),
                fixed_premium: 2_500.0,
                mandatory: true,
            },
            Coverage {
                code: "OWN_DAMAGE".to_string(),
                name: "Own Damage".to_string(),
                fixed_premium: 2_000.0,
                mandatory: false,
            },
        ]
    }

    fn addons() -> Vec<Addon> {
        vec![
            Addon {
                code: "ZERO_DEP".to_string(),
                name: "Zero Depreciation".to_string(),
                premium_percentage: 8.0,
                max_premium: None,
            },
            Addon {
                code: "ROADSIDE".to_string(),
                name: "Roadside Assistance".to_string(),
                premium_percentage: 5.2,
                max_premium: None,
            },
        ]
    }

    fn discount_rules() -> Vec<DiscountRule> {
        vec![
            DiscountRule {
                rule_code: "NO_CLAIM".to_string(),
                rule_name: "No Claim Bonus".to_string(),
                insurance_type: None,
                predicates: vec![Predicate {
                    field: ContextField::ClaimFreeYears,
                    operator: Operator::AtLeast,
                    value: ContextValue::Count(1),
                }],
                discount_percentage: 10.0,
                discount_max_amount: None,
                priority: 2,
                combinable: true,
                active: true,
                effective_from: None,
                effective_to: None,
            },
            DiscountRule {
                rule_code: "MULTI_POLICY".to_string(),
                rule_name: "Multi-Policy Discount".to_string(),
                insurance_type: None,
                predicates: vec![Predicate {
                    field: ContextField::ActivePolicyCount,
                    operator: Operator::AtLeast,
                    value: ContextValue::Count(2),
                }],
                discount_percentage: 5.0,
                discount_max_amount: None,
                priority: 1,
                combinable: true,
                active: true,
                effective_from: None,
                effective_to: None,
            },
        ]
    }

    fn high_risk_profile() -> RiskProfile {
        RiskProfile {
            age_score: 80.0,
            medical_score: 70.0,
            driving_score: 75.0,
            claim_history_score: 72.0,
        }
    }

    fn request() -> QuoteRequest {
        QuoteRequest {
            application_id: "APP-100".to_string(),
            insurance_type: InsuranceType::Motor,
            sum_insured: 1_000_000.0,
            requested_coverage_amount: 1_000_000.0,
            coverage_codes: vec!["THIRD_PARTY".to_string(), "OWN_DAMAGE".to_string()],
            addon_codes: vec!["ZERO_DEP".to_string(), "ROADSIDE".to_string()],
            risk_profile: high_risk_profile(),
            annual_income: Some(1_200_000.0),
            budget: None,
            context: QuoteContext::from([
                (ContextField::ClaimFreeYears, ContextValue::Count(3)),
                (ContextField::ActivePolicyCount, ContextValue::Count(2)),
            ]),
        }
    }

    fn engine() -> PremiumEngine {
        PremiumEngine::new(
            slab_table(),
            coverages(),
            addons(),
            discount_rules(),
            &BusinessConfig::from_entries([("GST_RATE", "18")]),
        )
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid")
    }

    #[test]
    fn worked_example_matches_documented_breakdown() {
        let breakdown = engine().calculate(&request(), today()).expect("prices");

        assert_eq!(breakdown.base_premium, 25_000.0);
        assert_eq!(breakdown.coverage_premium, 4_500.0);
        assert_eq!(breakdown.addon_premium, 3_300.0);
        assert_eq!(breakdown.subtotal, 32_800.0);
        assert_eq!(breakdown.risk_percentage, 15.0);
        assert_eq!(breakdown.risk_adjustment, 4_920.0);
        assert_eq!(breakdown.adjusted_premium, 37_720.0);
        assert_eq!(breakdown.total_discount, 5_658.0);
        assert_eq!(breakdown.net_premium, 32_062.0);
        assert_eq!(breakdown.gst_amount, 5_771.16);
        assert_eq!(breakdown.total_premium, 37_833.16);
        assert_eq!(breakdown.discounts.len(), 2);
    }

    #[test]
    fn final_premium_never_below_base_before_adjustments() {
        let breakdown = engine().calculate(&request(), today()).expect("prices");
        assert!(breakdown.base_premium >= 0.0);
        assert!(breakdown.subtotal >= breakdown.base_premium);
    }

    #[test]
    fn missing_slab_is_a_surfaced_configuration_error() {
        let mut request = request();
        request.sum_insured = 100_000.0;

        match engine().calculate(&request, today()) {
            Err(PricingError::Catalog(CatalogError::MissingSlab { .. })) => {}
            other => panic!("expected missing slab error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_coverage_code_is_rejected() {
        let mut request = request();
        request.coverage_codes.push("FLOOD".to_string());

        match engine().calculate(&request, today()) {
            Err(PricingError::UnknownCoverage(code)) => assert_eq!(code, "FLOOD"),
            other => panic!("expected unknown coverage, got {other:?}"),
        }
    }

    #[test]
    fn discounts_never_drive_premium_below_zero() {
        let mut rules = discount_rules();
        rules.push(DiscountRule {
            rule_code: "EVERYTHING".to_string(),
            rule_name: "Full Waiver".to_string(),
            insurance_type: None,
            predicates: Vec::new(),
            discount_percentage: 100.0,
            discount_max_amount: None,
            priority: 9,
            combinable: true,
            active: true,
            effective_from: None,
            effective_to: None,
        });
        let engine = PremiumEngine::new(
            slab_table(),
            coverages(),
            addons(),
            rules,
            &BusinessConfig::from_entries([("GST_RATE", "18")]),
        );

        let breakdown = engine.calculate(&request(), today()).expect("prices");
        assert_eq!(breakdown.net_premium, 0.0);
        assert_eq!(breakdown.gst_amount, 0.0);
        assert_eq!(breakdown.total_premium, 0.0);
    }

    #[test]
    fn per_rule_cap_limits_discount_amount() {
        let mut rules = discount_rules();
        rules[0].discount_max_amount = Some(1_000.0);
        let engine = PremiumEngine::new(
            slab_table(),
            coverages(),
            addons(),
            rules,
            &BusinessConfig::from_entries([("GST_RATE", "18")]),
        );

        let breakdown = engine.calculate(&request(), today()).expect("prices");
        let capped = breakdown
            .discounts
            .iter()
            .find(|d| d.rule_code == "NO_CLAIM")
            .expect("rule applied");
        assert_eq!(capped.amount, 1_000.0);
    }

    #[test]
    fn larger_exclusive_rule_replaces_combined_set() {
        let mut rules = discount_rules();
        rules.push(DiscountRule {
            rule_code: "FLEET_LARGE".to_string(),
            rule_name: "Fleet Discount Large".to_string(),
            insurance_type: None,
            predicates: Vec::new(),
            discount_percentage: 20.0,
            discount_max_amount: None,
            priority: 6,
            combinable: false,
            active: true,
            effective_from: None,
            effective_to: None,
        });
        let engine = PremiumEngine::new(
            slab_table(),
            coverages(),
            addons(),
            rules,
            &BusinessConfig::from_entries([("GST_RATE", "18")]),
        );

        let breakdown = engine.calculate(&request(), today()).expect("prices");
        // 20% of 37,720 beats the combined 15%.
        assert_eq!(breakdown.discounts.len(), 1);
        assert_eq!(breakdown.discounts[0].rule_code, "FLEET_LARGE");
        assert_eq!(breakdown.total_discount, 7_544.0);
    }

    #[test]
    fn smaller_exclusive_rule_defers_to_combined_set() {
        let mut rules = discount_rules();
        rules.push(DiscountRule {
            rule_code: "FLEET_SMALL".to_string(),
            rule_name: "Fleet Discount Small".to_string(),
            insurance_type: None,
            predicates: Vec::new(),
            discount_percentage: 5.0,
            discount_max_amount: None,
            priority: 6,
            combinable: false,
            active: true,
            effective_from: None,
            effective_to: None,
        });
        let engine = PremiumEngine::new(
            slab_table(),
            coverages(),
            addons(),
            rules,
            &BusinessConfig::from_entries([("GST_RATE", "18")]),
        );

        let breakdown = engine.calculate(&request(), today()).expect("prices");
        assert_eq!(breakdown.discounts.len(), 2);
        assert_eq!(breakdown.total_discount, 5_658.0);
    }
}
