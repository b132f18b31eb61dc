//! Configuration-driven business rules: key-value settings, premium slabs,
//! claim approval thresholds, and discount rules.
//!
//! Everything here is read-only once constructed and injected into the
//! calculators; missing configuration is surfaced as a [`CatalogError`], never
//! silently defaulted.

pub mod rules;

pub use rules::{ContextField, ContextValue, DiscountRule, Operator, Predicate, QuoteContext};

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Lines of business the catalog is segmented by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InsuranceType {
    Health,
    Motor,
    Life,
    Home,
    Travel,
}

impl InsuranceType {
    pub const fn code(self) -> &'static str {
        match self {
            InsuranceType::Health => "HEALTH",
            InsuranceType::Motor => "MOTOR",
            InsuranceType::Life => "LIFE",
            InsuranceType::Home => "HOME",
            InsuranceType::Travel => "TRAVEL",
        }
    }
}

/// System-wide key-value settings (GST rate, SLA days, retry caps).
#[derive(Debug, Clone, Default)]
pub struct BusinessConfig {
    entries: BTreeMap<String, String>,
}

impl BusinessConfig {
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.get(key)
            .and_then(|value| value.trim().parse::<i64>().ok())
            .unwrap_or(default)
    }

    pub fn get_decimal(&self, key: &str, default: f64) -> f64 {
        self.get(key)
            .and_then(|value| value.trim().parse::<f64>().ok())
            .unwrap_or(default)
    }
}

/// Configuration lookup failures that must reach the caller.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("no active premium slab covers {insurance_type:?} for sum insured {sum_insured:.2}")]
    MissingSlab {
        insurance_type: InsuranceType,
        sum_insured: f64,
    },
    #[error("premium slab '{slab_name}' has min above max")]
    InvertedSlabRange { slab_name: String },
    #[error("premium slabs '{first}' and '{second}' overlap for {insurance_type:?}")]
    OverlappingSlabs {
        insurance_type: InsuranceType,
        first: String,
        second: String,
    },
    #[error("no approval threshold covers {insurance_type:?} for claim amount {amount:.2}")]
    MissingThreshold {
        insurance_type: InsuranceType,
        amount: f64,
    },
}

/// A sum-insured range mapped to a base rate for one line of business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PremiumSlab {
    pub insurance_type: InsuranceType,
    pub slab_name: String,
    pub min_sum_insured: f64,
    pub max_sum_insured: f64,
    /// Percentage of the sum insured charged as base premium.
    pub rate_percent: f64,
    pub active: bool,
}

impl PremiumSlab {
    pub fn covers(&self, sum_insured: f64) -> bool {
        sum_insured >= self.min_sum_insured && sum_insured <= self.max_sum_insured
    }
}

/// Validated collection of premium slabs.
///
/// Ranges must not overlap per insurance type; the schema cannot enforce
/// that, so construction does.
#[derive(Debug, Clone, Default)]
pub struct SlabTable {
    slabs: Vec<PremiumSlab>,
}

impl SlabTable {
    pub fn new(slabs: Vec<PremiumSlab>) -> Result<Self, CatalogError> {
        for slab in &slabs {
            if slab.min_sum_insured > slab.max_sum_insured {
                return Err(CatalogError::InvertedSlabRange {
                    slab_name: slab.slab_name.clone(),
                });
            }
        }

        let active: Vec<&PremiumSlab> = slabs.iter().filter(|slab| slab.active).collect();
        for (index, slab) in active.iter().enumerate() {
            for other in active.iter().skip(index + 1) {
                if slab.insurance_type == other.insurance_type
                    && slab.min_sum_insured <= other.max_sum_insured
                    && other.min_sum_insured <= slab.max_sum_insured
                {
                    return Err(CatalogError::OverlappingSlabs {
                        insurance_type: slab.insurance_type,
                        first: slab.slab_name.clone(),
                        second: other.slab_name.clone(),
                    });
                }
            }
        }

        Ok(Self { slabs })
    }

    pub fn slabs(&self) -> &[PremiumSlab] {
        &self.slabs
    }

    pub fn lookup(
        &self,
        insurance_type: InsuranceType,
        sum_insured: f64,
    ) -> Result<&PremiumSlab, CatalogError> {
        self.slabs
            .iter()
            .find(|slab| {
                slab.active && slab.insurance_type == insurance_type && slab.covers(sum_insured)
            })
            .ok_or(CatalogError::MissingSlab {
                insurance_type,
                sum_insured,
            })
    }
}

/// Approval level an actor must hold to clear a claim amount band.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ApprovalAuthority {
    Backoffice,
    Admin,
}

impl ApprovalAuthority {
    pub const fn label(self) -> &'static str {
        match self {
            ApprovalAuthority::Backoffice => "BACKOFFICE",
            ApprovalAuthority::Admin => "ADMIN",
        }
    }

    /// Full capability set granted by this role. Admin subsumes Backoffice.
    fn granted(self) -> BTreeSet<ApprovalAuthority> {
        match self {
            ApprovalAuthority::Backoffice => BTreeSet::from([ApprovalAuthority::Backoffice]),
            ApprovalAuthority::Admin => {
                BTreeSet::from([ApprovalAuthority::Backoffice, ApprovalAuthority::Admin])
            }
        }
    }
}

/// A request actor with their capability set resolved up front.
///
/// Authority checks are plain set membership so no role hierarchy is consulted
/// at decision time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub display_name: String,
    pub authorities: BTreeSet<ApprovalAuthority>,
}

impl Actor {
    pub fn customer(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            authorities: BTreeSet::new(),
        }
    }

    pub fn backoffice(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::with_role(id, display_name, ApprovalAuthority::Backoffice)
    }

    pub fn admin(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::with_role(id, display_name, ApprovalAuthority::Admin)
    }

    fn with_role(
        id: impl Into<String>,
        display_name: impl Into<String>,
        role: ApprovalAuthority,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            authorities: role.granted(),
        }
    }

    pub fn holds(&self, required: ApprovalAuthority) -> bool {
        self.authorities.contains(&required)
    }
}

/// Claim amount band mapped to the authority required to approve it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimApprovalThreshold {
    pub insurance_type: InsuranceType,
    pub min_amount: f64,
    pub max_amount: f64,
    pub required_authority: ApprovalAuthority,
    pub max_processing_days: u32,
    pub active: bool,
}

/// Lookup table for claim approval thresholds.
#[derive(Debug, Clone, Default)]
pub struct ThresholdTable {
    thresholds: Vec<ClaimApprovalThreshold>,
}

impl ThresholdTable {
    pub fn new(thresholds: Vec<ClaimApprovalThreshold>) -> Self {
        Self { thresholds }
    }

    pub fn for_claim(
        &self,
        insurance_type: InsuranceType,
        amount: f64,
    ) -> Result<&ClaimApprovalThreshold, CatalogError> {
        self.thresholds
            .iter()
            .find(|threshold| {
                threshold.active
                    && threshold.insurance_type == insurance_type
                    && amount >= threshold.min_amount
                    && amount <= threshold.max_amount
            })
            .ok_or(CatalogError::MissingThreshold {
                insurance_type,
                amount,
            })
    }
}
