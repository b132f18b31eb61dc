//! Discount rules expressed as tagged predicates over a typed context map.
//!
//! Rules never execute free-form conditions; each predicate names a context
//! field, a comparison operator, and a literal value.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::InsuranceType;

/// Customer/application attributes a discount rule may inspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContextField {
    CustomerAge,
    Gender,
    FleetSize,
    ClaimFreeYears,
    ActivePolicyCount,
    DaysToRenewal,
    ClaimRatio,
}

/// Structured values carried in the quote context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContextValue {
    Number(f64),
    Count(u32),
    Flag(bool),
    Text(String),
}

impl ContextValue {
    fn as_number(&self) -> Option<f64> {
        match self {
            ContextValue::Number(value) => Some(*value),
            ContextValue::Count(value) => Some(f64::from(*value)),
            ContextValue::Flag(_) | ContextValue::Text(_) => None,
        }
    }
}

/// Typed attribute map built from customer and application data.
pub type QuoteContext = BTreeMap<ContextField, ContextValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Equals,
    AtLeast,
    AtMost,
}

/// A single (field, operator, value) condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub field: ContextField,
    pub operator: Operator,
    pub value: ContextValue,
}

impl Predicate {
    /// A predicate over an absent context field never holds.
    pub fn holds(&self, context: &QuoteContext) -> bool {
        let Some(actual) = context.get(&self.field) else {
            return false;
        };

        match self.operator {
            Operator::Equals => match (actual.as_number(), self.value.as_number()) {
                (Some(lhs), Some(rhs)) => lhs == rhs,
                _ => actual == &self.value,
            },
            Operator::AtLeast => match (actual.as_number(), self.value.as_number()) {
                (Some(lhs), Some(rhs)) => lhs >= rhs,
                _ => false,
            },
            Operator::AtMost => match (actual.as_number(), self.value.as_number()) {
                (Some(lhs), Some(rhs)) => lhs <= rhs,
                _ => false,
            },
        }
    }
}

/// A discount with eligibility predicates, percentage, cap, and active window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountRule {
    pub rule_code: String,
    pub rule_name: String,
    /// `None` applies the rule to every insurance type.
    pub insurance_type: Option<InsuranceType>,
    pub predicates: Vec<Predicate>,
    pub discount_percentage: f64,
    pub discount_max_amount: Option<f64>,
    /// Higher priority rules are evaluated first.
    pub priority: u32,
    pub combinable: bool,
    pub active: bool,
    pub effective_from: Option<NaiveDate>,
    pub effective_to: Option<NaiveDate>,
}

impl DiscountRule {
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        if let Some(from) = self.effective_from {
            if date < from {
                return false;
            }
        }
        if let Some(to) = self.effective_to {
            if date > to {
                return false;
            }
        }
        true
    }

    /// Whether the rule is eligible for this quote. An empty predicate list
    /// always matches.
    pub fn matches(
        &self,
        insurance_type: InsuranceType,
        context: &QuoteContext,
        date: NaiveDate,
    ) -> bool {
        if !self.active || !self.applies_on(date) {
            return false;
        }
        if let Some(scoped) = self.insurance_type {
            if scoped != insurance_type {
                return false;
            }
        }
        self.predicates.iter().all(|predicate| predicate.holds(context))
    }

    /// Discount against the given premium, honoring the per-rule cap.
    pub fn discount_amount(&self, premium: f64) -> f64 {
        let amount = premium * (self.discount_percentage / 100.0);
        match self.discount_max_amount {
            Some(cap) if amount > cap => cap,
            _ => amount,
        }
    }
}
