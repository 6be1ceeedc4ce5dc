//! Licence contracts
//!
//! A licence is the recurring billing agreement for one customer's
//! installation: which items are billed, how often per year, whether item
//! groups get separate invoices, and whether a retailer takes the bill.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{CustomerId, LicenceId, Money, Rate};
use domain_billing::LineItem;

use crate::error::LicenceError;

/// How finished invoices reach the customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryChannel {
    Email,
    Post,
}

/// A recurring item on a licence
///
/// The quantity and rate describe one month of the item; the invoice cycle
/// scales the quantity by the number of months a cycle invoice covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenceItem {
    pub item_code: String,
    pub qty: Decimal,
    pub rate: Money,
    pub group: Option<String>,
    pub cost_center: Option<String>,
}

impl LicenceItem {
    pub fn new(item_code: impl Into<String>, qty: Decimal, rate: Money) -> Self {
        Self {
            item_code: item_code.into(),
            qty,
            rate,
            group: None,
            cost_center: None,
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_cost_center(mut self, cost_center: impl Into<String>) -> Self {
        self.cost_center = Some(cost_center.into());
        self
    }

    /// Converts to an invoice line scaled by the cycle multiplier
    pub fn to_line(&self, multiplier: Decimal) -> LineItem {
        let mut line = LineItem::new(self.item_code.clone(), self.qty, self.rate)
            .scaled(multiplier);
        if let Some(cc) = &self.cost_center {
            line = line.with_cost_center(cc.clone());
        }
        if let Some(group) = &self.group {
            line = line.with_group(group.clone());
        }
        line
    }
}

/// Lookup port for the licence book
pub trait LicenceRepository: Send + Sync {
    /// All licences, enabled or not; the cycle driver skips disabled ones
    /// itself so the skip shows up in its report
    fn licences(&self) -> Result<Vec<Licence>, core_kernel::PortError>;
}

/// In-process licence repository
#[derive(Debug, Default)]
pub struct MemoryLicenceRepository {
    licences: std::sync::RwLock<Vec<Licence>>,
}

impl MemoryLicenceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, licence: Licence) {
        self.licences
            .write()
            .expect("licence lock poisoned")
            .push(licence);
    }
}

impl LicenceRepository for MemoryLicenceRepository {
    fn licences(&self) -> Result<Vec<Licence>, core_kernel::PortError> {
        Ok(self
            .licences
            .read()
            .expect("licence lock poisoned")
            .clone())
    }
}

/// The recurring billing agreement for one customer installation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Licence {
    pub id: LicenceId,
    pub customer: CustomerId,
    pub customer_code: String,
    /// Retailer that receives the licence bills instead of the customer
    pub retailer: Option<CustomerId>,
    pub enabled: bool,
    /// How many invoices per year; must divide 12 evenly
    pub invoices_per_year: u8,
    /// Bill each item group on its own invoice
    pub invoice_separately: bool,
    pub overall_discount: Rate,
    pub delivery_channel: DeliveryChannel,
    /// The recurring items, billed on every cycle invoice
    pub invoice_items: Vec<LicenceItem>,
    /// One-off items billed on the next cycle invoice only, then cleared
    pub special_invoice_items: Vec<LicenceItem>,
}

impl Licence {
    /// Validates the cycle configuration
    ///
    /// # Errors
    ///
    /// Returns [`LicenceError::InvalidFrequency`] when `invoices_per_year`
    /// is not one of 1, 2, 4, 6 or 12.
    pub fn validate(&self) -> Result<(), LicenceError> {
        match self.invoices_per_year {
            1 | 2 | 4 | 6 | 12 => Ok(()),
            other => Err(LicenceError::InvalidFrequency(other)),
        }
    }

    pub fn has_special_items(&self) -> bool {
        !self.special_invoice_items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn licence(per_year: u8) -> Licence {
        Licence {
            id: LicenceId::new(),
            customer: CustomerId::new(),
            customer_code: "K-1".to_string(),
            retailer: None,
            enabled: true,
            invoices_per_year: per_year,
            invoice_separately: false,
            overall_discount: Rate::ZERO,
            delivery_channel: DeliveryChannel::Email,
            invoice_items: vec![],
            special_invoice_items: vec![],
        }
    }

    #[test]
    fn test_valid_frequencies() {
        for n in [1u8, 2, 4, 6, 12] {
            assert!(licence(n).validate().is_ok());
        }
    }

    #[test]
    fn test_invalid_frequency_rejected() {
        for n in [0u8, 3, 5, 7, 8, 13] {
            assert!(matches!(
                licence(n).validate(),
                Err(LicenceError::InvalidFrequency(_))
            ));
        }
    }

    #[test]
    fn test_item_to_line_scales_quantity() {
        let item = LicenceItem::new("LIC-ZE-BASE", dec!(3), Money::new(dec!(12), Currency::EUR))
            .with_group("ZE")
            .with_cost_center("HQ - Z");

        let line = item.to_line(dec!(6));
        assert_eq!(line.qty, dec!(18));
        assert_eq!(line.group.as_deref(), Some("ZE"));
        assert_eq!(line.cost_center.as_deref(), Some("HQ - Z"));
    }
}
