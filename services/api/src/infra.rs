use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use coverdesk::catalog::{
    ApprovalAuthority, BusinessConfig, CatalogError, ClaimApprovalThreshold, ContextField,
    ContextValue, DiscountRule, InsuranceType, Operator, Predicate, PremiumSlab, SlabTable,
};
use coverdesk::workflows::claims::{
    Claim, ClaimNumber, ClaimRepository, StatusHistoryEntry,
};
use coverdesk::workflows::notifications::{
    Notification, NotificationError, NotificationPublisher,
};
use coverdesk::workflows::payments::{
    OrderId, Payment, PaymentRepository, PaymentStatus, Policy,
};
use coverdesk::workflows::quotes::{
    Addon, CompanyProfile, Coverage, Quote, QuoteNumber, QuoteRepository,
};
use coverdesk::workflows::RepositoryError;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) catalog: Arc<SeedCatalog>,
}

/// Catalog snapshot the read-only listing endpoints serve from.
pub(crate) struct SeedCatalog {
    pub(crate) slabs: Vec<PremiumSlab>,
    pub(crate) coverages: Vec<Coverage>,
    pub(crate) addons: Vec<Addon>,
    pub(crate) discount_rules: Vec<DiscountRule>,
    pub(crate) thresholds: Vec<ClaimApprovalThreshold>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryQuoteRepository {
    quotes: Arc<Mutex<HashMap<String, Quote>>>,
}

impl QuoteRepository for InMemoryQuoteRepository {
    fn insert(&self, quote: Quote) -> Result<Quote, RepositoryError> {
        let mut guard = self.quotes.lock().expect("repository mutex poisoned");
        if guard.contains_key(&quote.quote_number.0) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(quote.quote_number.0.clone(), quote.clone());
        Ok(quote)
    }

    fn update(&self, quote: Quote) -> Result<(), RepositoryError> {
        let mut guard = self.quotes.lock().expect("repository mutex poisoned");
        if guard.contains_key(&quote.quote_number.0) {
            guard.insert(quote.quote_number.0.clone(), quote);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, number: &QuoteNumber) -> Result<Option<Quote>, RepositoryError> {
        let guard = self.quotes.lock().expect("repository mutex poisoned");
        Ok(guard.get(&number.0).cloned())
    }

    fn for_application(&self, application_id: &str) -> Result<Vec<Quote>, RepositoryError> {
        let guard = self.quotes.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|quote| quote.application_id == application_id)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryClaimRepository {
    claims: Arc<Mutex<HashMap<String, Claim>>>,
    history: Arc<Mutex<Vec<StatusHistoryEntry>>>,
}

impl ClaimRepository for InMemoryClaimRepository {
    fn insert(&self, claim: Claim) -> Result<Claim, RepositoryError> {
        let mut guard = self.claims.lock().expect("repository mutex poisoned");
        if guard.contains_key(&claim.claim_number.0) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(claim.claim_number.0.clone(), claim.clone());
        Ok(claim)
    }

    fn apply(&self, claim: Claim, entry: StatusHistoryEntry) -> Result<Claim, RepositoryError> {
        // Both locks are held across the write so the claim mutation and its
        // history row land together.
        let mut claims = self.claims.lock().expect("repository mutex poisoned");
        let mut history = self.history.lock().expect("history mutex poisoned");
        if !claims.contains_key(&claim.claim_number.0) {
            return Err(RepositoryError::NotFound);
        }
        claims.insert(claim.claim_number.0.clone(), claim.clone());
        history.push(entry);
        Ok(claim)
    }

    fn fetch(&self, number: &ClaimNumber) -> Result<Option<Claim>, RepositoryError> {
        let guard = self.claims.lock().expect("repository mutex poisoned");
        Ok(guard.get(&number.0).cloned())
    }

    fn history(&self, number: &ClaimNumber) -> Result<Vec<StatusHistoryEntry>, RepositoryError> {
        let guard = self.history.lock().expect("history mutex poisoned");
        Ok(guard
            .iter()
            .filter(|entry| entry.claim_number == *number)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryPaymentRepository {
    payments: Arc<Mutex<HashMap<String, Payment>>>,
    policies: Arc<Mutex<HashMap<String, Policy>>>,
}

impl PaymentRepository for InMemoryPaymentRepository {
    fn insert_pending(&self, payment: Payment) -> Result<Payment, RepositoryError> {
        let mut guard = self.payments.lock().expect("repository mutex poisoned");
        let pending_exists = guard.values().any(|existing| {
            existing.quote_number == payment.quote_number
                && existing.status == PaymentStatus::Pending
        });
        if pending_exists {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(payment.order_id.0.clone(), payment.clone());
        Ok(payment)
    }

    fn fetch_by_order(&self, order_id: &OrderId) -> Result<Option<Payment>, RepositoryError> {
        let guard = self.payments.lock().expect("repository mutex poisoned");
        Ok(guard.get(&order_id.0).cloned())
    }

    fn mark_failed(&self, payment: Payment) -> Result<Payment, RepositoryError> {
        let mut guard = self.payments.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&payment.order_id.0) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(payment.order_id.0.clone(), payment.clone());
        Ok(payment)
    }

    fn complete(&self, payment: Payment, policy: Policy) -> Result<Policy, RepositoryError> {
        // Held together so the success flip and the policy issue are atomic.
        let mut payments = self.payments.lock().expect("repository mutex poisoned");
        let mut policies = self.policies.lock().expect("policy mutex poisoned");
        if !payments.contains_key(&payment.order_id.0) {
            return Err(RepositoryError::NotFound);
        }
        payments.insert(payment.order_id.0.clone(), payment);
        policies.insert(policy.quote_number.clone(), policy.clone());
        Ok(policy)
    }

    fn policy_for_quote(&self, quote_number: &str) -> Result<Option<Policy>, RepositoryError> {
        let guard = self.policies.lock().expect("policy mutex poisoned");
        Ok(guard.get(quote_number).cloned())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryNotificationPublisher {
    events: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationPublisher for InMemoryNotificationPublisher {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError> {
        let mut guard = self.events.lock().expect("notification mutex poisoned");
        guard.push(notification);
        Ok(())
    }
}

impl InMemoryNotificationPublisher {
    pub(crate) fn events(&self) -> Vec<Notification> {
        self.events
            .lock()
            .expect("notification mutex poisoned")
            .clone()
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<chrono::NaiveDate, String> {
    chrono::NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn seed_business_config() -> BusinessConfig {
    BusinessConfig::from_entries([
        ("GST_RATE", "18"),
        ("QUOTE_VALIDITY_DAYS", "30"),
        ("CLAIM_SLA_DAYS", "15"),
        ("MAX_PAYMENT_RETRIES", "3"),
        ("ACCOUNT_LOCK_THRESHOLD", "5"),
    ])
}

pub(crate) fn seed_slab_table() -> Result<SlabTable, CatalogError> {
    let mut slabs = Vec::new();
    for insurance_type in [
        InsuranceType::Health,
        InsuranceType::Motor,
        InsuranceType::Life,
        InsuranceType::Home,
        InsuranceType::Travel,
    ] {
        slabs.push(PremiumSlab {
            insurance_type,
            slab_name: "Bronze".to_string(),
            min_sum_insured: 0.0,
            max_sum_insured: 500_000.0,
            rate_percent: 3.0,
            active: true,
        });
        slabs.push(PremiumSlab {
            insurance_type,
            slab_name: "Silver".to_string(),
            min_sum_insured: 500_000.01,
            max_sum_insured: 5_000_000.0,
            rate_percent: 2.5,
            active: true,
        });
        slabs.push(PremiumSlab {
            insurance_type,
            slab_name: "Gold".to_string(),
            min_sum_insured: 5_000_000.01,
            max_sum_insured: 50_000_000.0,
            rate_percent: 2.0,
            active: true,
        });
    }
    SlabTable::new(slabs)
}

pub(crate) fn seed_coverages() -> Vec<Coverage> {
    vec![
        Coverage {
            code: "BASE".to_string(),
            name: "Base indemnity".to_string(),
            fixed_premium: 2_500.0,
            mandatory: true,
        },
        Coverage {
            code: "PA".to_string(),
            name: "Personal accident".to_string(),
            fixed_premium: 2_000.0,
            mandatory: false,
        },
        Coverage {
            code: "HOSP_CASH".to_string(),
            name: "Hospital cash allowance".to_string(),
            fixed_premium: 1_200.0,
            mandatory: false,
        },
    ]
}

pub(crate) fn seed_addons() -> Vec<Addon> {
    vec![
        Addon {
            code: "ZERO_DEP".to_string(),
            name: "Zero depreciation".to_string(),
            premium_percentage: 8.0,
            max_premium: Some(10_000.0),
        },
        Addon {
            code: "ROADSIDE".to_string(),
            name: "Roadside assistance".to_string(),
            premium_percentage: 5.2,
            max_premium: Some(4_000.0),
        },
        Addon {
            code: "CONSUMABLES".to_string(),
            name: "Consumables cover".to_string(),
            premium_percentage: 3.0,
            max_premium: None,
        },
    ]
}

pub(crate) fn seed_discount_rules() -> Vec<DiscountRule> {
    vec![
        DiscountRule {
            rule_code: "NO_CLAIM".to_string(),
            rule_name: "No-claim bonus".to_string(),
            insurance_type: None,
            predicates: vec![Predicate {
                field: ContextField::ClaimFreeYears,
                operator: Operator::AtLeast,
                value: ContextValue::Count(3),
            }],
            discount_percentage: 10.0,
            discount_max_amount: None,
            priority: 30,
            combinable: true,
            active: true,
            effective_from: None,
            effective_to: None,
        },
        DiscountRule {
            rule_code: "MULTI_POLICY".to_string(),
            rule_name: "Multi-policy loyalty".to_string(),
            insurance_type: None,
            predicates: vec![Predicate {
                field: ContextField::ActivePolicyCount,
                operator: Operator::AtLeast,
                value: ContextValue::Count(2),
            }],
            discount_percentage: 5.0,
            discount_max_amount: Some(7_500.0),
            priority: 20,
            combinable: true,
            active: true,
            effective_from: None,
            effective_to: None,
        },
        DiscountRule {
            rule_code: "FLEET".to_string(),
            rule_name: "Fleet owner".to_string(),
            insurance_type: Some(InsuranceType::Motor),
            predicates: vec![Predicate {
                field: ContextField::FleetSize,
                operator: Operator::AtLeast,
                value: ContextValue::Count(5),
            }],
            discount_percentage: 18.0,
            discount_max_amount: Some(25_000.0),
            priority: 40,
            combinable: false,
            active: true,
            effective_from: None,
            effective_to: None,
        },
    ]
}

pub(crate) fn seed_companies() -> Vec<CompanyProfile> {
    vec![
        CompanyProfile {
            company_code: "ACME".to_string(),
            company_name: "Acme General Insurance".to_string(),
            claim_settlement_ratio: 0.96,
            service_rating: 4.5,
        },
        CompanyProfile {
            company_code: "NSURE".to_string(),
            company_name: "Northstar Assurance".to_string(),
            claim_settlement_ratio: 0.91,
            service_rating: 4.1,
        },
        CompanyProfile {
            company_code: "PVT".to_string(),
            company_name: "Pivot Mutual".to_string(),
            claim_settlement_ratio: 0.88,
            service_rating: 3.8,
        },
    ]
}

pub(crate) fn seed_thresholds() -> Vec<ClaimApprovalThreshold> {
    let mut thresholds = Vec::new();
    for insurance_type in [
        InsuranceType::Health,
        InsuranceType::Motor,
        InsuranceType::Life,
        InsuranceType::Home,
        InsuranceType::Travel,
    ] {
        thresholds.push(ClaimApprovalThreshold {
            insurance_type,
            min_amount: 0.0,
            max_amount: 50_000.0,
            required_authority: ApprovalAuthority::Backoffice,
            max_processing_days: 7,
            active: true,
        });
        thresholds.push(ClaimApprovalThreshold {
            insurance_type,
            min_amount: 50_000.01,
            max_amount: 500_000.0,
            required_authority: ApprovalAuthority::Admin,
            max_processing_days: 15,
            active: true,
        });
    }
    thresholds
}
