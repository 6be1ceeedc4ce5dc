//! Tax region routing
//!
//! A customer's tax region decides both the tax template applied to the
//! invoice and the income account the revenue is posted to. The shipped
//! default table reproduces the accounting setup of the source system, but
//! the table is an explicit value handed to the assembler, not a hardcoded
//! branch: an installation can replace any row.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::BillingError;

/// Tax regions the billing engine distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaxRegion {
    /// Domestic (Austria)
    #[serde(rename = "AT")]
    Domestic,
    /// EU member states
    #[serde(rename = "EU")]
    Eu,
    /// Third countries (export)
    #[serde(rename = "DRL")]
    Export,
    /// Switzerland (separate VAT registration)
    #[serde(rename = "CH")]
    Swiss,
}

/// The billing consequences of a tax region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRule {
    /// Name of the sales tax template
    pub template: String,
    /// Income account revenue is routed to
    pub income_account: String,
}

impl TaxRule {
    pub fn new(template: impl Into<String>, income_account: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            income_account: income_account.into(),
        }
    }
}

static DEFAULT_RULES: Lazy<HashMap<TaxRegion, TaxRule>> = Lazy::new(|| {
    HashMap::from([
        (
            TaxRegion::Domestic,
            TaxRule::new("Umsatzsteuer 022 (20%)", "4200 - Erlöse Inland 20% USt"),
        ),
        (
            TaxRegion::Eu,
            TaxRule::new("Umsatzsteuer 021 (0% ig. Lieferung)", "4210 - Erlöse EU-Ausfuhr"),
        ),
        (
            TaxRegion::Export,
            TaxRule::new("Umsatzsteuer 022/221 (0% Ausfuhr)", "4220 - Erlöse Export Drittland"),
        ),
        (
            TaxRegion::Swiss,
            TaxRule::new("Umsatzsteuer 302 (CH)", "4230 - Erlöse Schweiz"),
        ),
    ])
});

/// Region-to-rule table used by the invoice assembler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxPolicy {
    rules: HashMap<TaxRegion, TaxRule>,
}

impl Default for TaxPolicy {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES.clone(),
        }
    }
}

impl TaxPolicy {
    /// Builds a policy from an explicit table
    pub fn new(rules: HashMap<TaxRegion, TaxRule>) -> Self {
        Self { rules }
    }

    /// Replaces the rule for one region
    pub fn with_rule(mut self, region: TaxRegion, rule: TaxRule) -> Self {
        self.rules.insert(region, rule);
        self
    }

    /// Resolves the rule for a region
    pub fn rule_for(&self, region: TaxRegion) -> Result<&TaxRule, BillingError> {
        self.rules
            .get(&region)
            .ok_or(BillingError::MissingTaxRule(region))
    }
}
