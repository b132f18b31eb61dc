//! Rule-based suitability scoring for quote comparison.
//!
//! overall = 0.4 * affordability + 0.3 * claim_ratio + 0.2 * coverage
//!         + 0.1 * service, each sub-score normalized to `0.0..=100.0`.
//! Deterministic and pure; no side effects.

use super::domain::{BudgetRange, CompanyProfile, ScoreBreakdown};
use super::pricing::round2;

pub const WEIGHT_AFFORDABILITY: f64 = 0.40;
pub const WEIGHT_CLAIM_RATIO: f64 = 0.30;
pub const WEIGHT_COVERAGE: f64 = 0.20;
pub const WEIGHT_SERVICE: f64 = 0.10;

/// Budget fit when a range is given, else tiered premium-to-income ratio,
/// else a neutral 50.
pub fn affordability_score(
    premium: f64,
    annual_income: Option<f64>,
    budget: Option<&BudgetRange>,
) -> f64 {
    if let Some(budget) = budget {
        if premium >= budget.min && premium <= budget.max {
            let range = budget.max - budget.min;
            if range > 0.0 {
                let position = (premium - budget.min) / range;
                return 100.0 - position * 20.0;
            }
            return 90.0;
        }
        if premium < budget.min {
            // Below budget can signal thin coverage.
            return 70.0;
        }
        let overage_pct = (premium - budget.max) / budget.max * 100.0;
        return if overage_pct <= 10.0 {
            60.0
        } else if overage_pct <= 25.0 {
            40.0
        } else {
            20.0
        };
    }

    match annual_income {
        Some(income) if income > 0.0 => {
            let premium_pct = premium / income * 100.0;
            if premium_pct <= 3.0 {
                100.0
            } else if premium_pct <= 5.0 {
                90.0
            } else if premium_pct <= 8.0 {
                75.0
            } else if premium_pct <= 12.0 {
                55.0
            } else if premium_pct <= 15.0 {
                35.0
            } else {
                15.0
            }
        }
        _ => 50.0,
    }
}

pub fn claim_ratio_score(company: &CompanyProfile) -> f64 {
    (company.claim_settlement_ratio * 100.0).clamp(0.0, 100.0)
}

/// How much of the requested coverage the sum insured actually delivers.
pub fn coverage_score(sum_insured: f64, requested_coverage_amount: f64) -> f64 {
    if requested_coverage_amount <= 0.0 {
        return 100.0;
    }
    (sum_insured / requested_coverage_amount * 100.0).clamp(0.0, 100.0)
}

pub fn service_rating_score(company: &CompanyProfile) -> f64 {
    (company.service_rating / 5.0 * 100.0).clamp(0.0, 100.0)
}

pub fn score_quote(
    premium: f64,
    company: &CompanyProfile,
    sum_insured: f64,
    requested_coverage_amount: f64,
    annual_income: Option<f64>,
    budget: Option<&BudgetRange>,
) -> ScoreBreakdown {
    let affordability = affordability_score(premium, annual_income, budget);
    let claim_ratio = claim_ratio_score(company);
    let coverage = coverage_score(sum_insured, requested_coverage_amount);
    let service = service_rating_score(company);

    let overall = WEIGHT_AFFORDABILITY * affordability
        + WEIGHT_CLAIM_RATIO * claim_ratio
        + WEIGHT_COVERAGE * coverage
        + WEIGHT_SERVICE * service;

    ScoreBreakdown {
        affordability: round2(affordability),
        claim_ratio: round2(claim_ratio),
        coverage: round2(coverage),
        service: round2(service),
        overall: round2(overall),
    }
}

/// Human readable summary rendered from the sub-scores.
pub fn recommendation_reason(score: &ScoreBreakdown, company_name: &str) -> String {
    let mut reasons = Vec::new();

    if score.affordability >= 80.0 {
        reasons.push("fits well within your budget".to_string());
    } else if score.affordability >= 60.0 {
        reasons.push("reasonably priced".to_string());
    }

    if score.claim_ratio >= 85.0 {
        reasons.push(format!(
            "{company_name} has an excellent claim settlement record"
        ));
    } else if score.claim_ratio >= 70.0 {
        reasons.push(format!("{company_name} has a good claim settlement ratio"));
    }

    if score.coverage >= 80.0 {
        reasons.push("provides comprehensive coverage".to_string());
    } else if score.coverage >= 60.0 {
        reasons.push("covers all essential needs".to_string());
    }

    if score.service >= 80.0 {
        reasons.push("highly rated for customer service".to_string());
    }

    if reasons.is_empty() {
        reasons.push("balanced option for your requirements".to_string());
    }

    format!("This quote {}.", reasons.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company(ratio: f64, rating: f64) -> CompanyProfile {
        CompanyProfile {
            company_code: "ACME".to_string(),
            company_name: "Acme General".to_string(),
            claim_settlement_ratio: ratio,
            service_rating: rating,
        }
    }

    #[test]
    fn overall_score_stays_in_bounds_for_extreme_inputs() {
        let cases = [
            (0.0, Some(1.0), 0.0, 1.0, 0.0, 0.0),
            (1_000_000.0, Some(1.0), 1.0, 0.0001, 1.0, 5.0),
            (50_000.0, None, 1_000_000.0, 1.0, 0.5, 2.5),
        ];

        for (premium, income, sum_insured, requested, ratio, rating) in cases {
            let score = score_quote(
                premium,
                &company(ratio, rating),
                sum_insured,
                requested,
                income,
                None,
            );
            assert!(score.overall >= 0.0 && score.overall <= 100.0, "{score:?}");
            assert!(score.affordability >= 0.0 && score.affordability <= 100.0);
            assert!(score.claim_ratio >= 0.0 && score.claim_ratio <= 100.0);
            assert!(score.coverage >= 0.0 && score.coverage <= 100.0);
            assert!(score.service >= 0.0 && score.service <= 100.0);
        }
    }

    #[test]
    fn affordability_prefers_low_premium_to_income_ratio() {
        assert_eq!(affordability_score(30_000.0, Some(1_200_000.0), None), 100.0);
        assert_eq!(affordability_score(60_000.0, Some(1_200_000.0), None), 90.0);
        assert_eq!(affordability_score(170_000.0, Some(1_200_000.0), None), 35.0);
        assert_eq!(affordability_score(200_000.0, Some(1_200_000.0), None), 15.0);
        assert_eq!(affordability_score(400_000.0, Some(1_200_000.0), None), 15.0);
        assert_eq!(affordability_score(30_000.0, None, None), 50.0);
    }

    #[test]
    fn affordability_uses_budget_position_when_range_given() {
        let budget = BudgetRange {
            min: 20_000.0,
            max: 40_000.0,
        };
        assert_eq!(affordability_score(20_000.0, None, Some(&budget)), 100.0);
        assert_eq!(affordability_score(30_000.0, None, Some(&budget)), 90.0);
        assert_eq!(affordability_score(40_000.0, None, Some(&budget)), 80.0);
        assert_eq!(affordability_score(10_000.0, None, Some(&budget)), 70.0);
        assert_eq!(affordability_score(43_000.0, None, Some(&budget)), 60.0);
        assert_eq!(affordability_score(48_000.0, None, Some(&budget)), 40.0);
        assert_eq!(affordability_score(80_000.0, None, Some(&budget)), 20.0);
    }

    #[test]
    fn coverage_score_caps_at_full_coverage() {
        assert_eq!(coverage_score(1_000_000.0, 500_000.0), 100.0);
        assert_eq!(coverage_score(250_000.0, 1_000_000.0), 25.0);
        assert_eq!(coverage_score(250_000.0, 0.0), 100.0);
    }

    #[test]
    fn sub_scores_normalize_company_attributes() {
        let insurer = company(0.92, 4.5);
        assert_eq!(claim_ratio_score(&insurer), 92.0);
        assert_eq!(service_rating_score(&insurer), 90.0);
    }

    #[test]
    fn weighted_formula_is_applied_and_rounded() {
        let insurer = company(0.90, 4.0);
        let score = score_quote(
            30_000.0,
            &insurer,
            1_000_000.0,
            1_000_000.0,
            Some(1_200_000.0),
            None,
        );

        // 0.4*100 + 0.3*90 + 0.2*100 + 0.1*80 = 95.00
        assert_eq!(score.overall, 95.0);
    }

    #[test]
    fn recommendation_mentions_strong_settlement_record() {
        let insurer = company(0.96, 4.8);
        let score = score_quote(
            30_000.0,
            &insurer,
            1_000_000.0,
            1_000_000.0,
            Some(1_200_000.0),
            None,
        );
        let reason = recommendation_reason(&score, &insurer.company_name);
        assert!(reason.contains("excellent claim settlement record"));
        assert!(reason.starts_with("This quote"));
    }

    #[test]
    fn recommendation_falls_back_to_balanced_option() {
        let score = ScoreBreakdown {
            affordability: 30.0,
            claim_ratio: 40.0,
            coverage: 50.0,
            service: 20.0,
            overall: 36.0,
        };
        assert_eq!(
            recommendation_reason(&score, "Acme General"),
            "This quote balanced option for your requirements."
        );
    }
}
