//! Invoice drafts and line items

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, CustomerId, InvoiceId, Money, Rate};

/// A line on a draft invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Item code
    pub item_code: String,
    /// Quantity (hours for time lines, pieces for materials)
    pub qty: Decimal,
    /// Unit rate
    pub rate: Money,
    /// Line discount; 100% for free-of-charge work
    pub discount: Rate,
    /// Cost center the revenue is attributed to
    pub cost_center: Option<String>,
    /// Item group, used when a licence bills groups separately
    pub group: Option<String>,
}

impl LineItem {
    pub fn new(item_code: impl Into<String>, qty: Decimal, rate: Money) -> Self {
        Self {
            item_code: item_code.into(),
            qty,
            rate,
            discount: Rate::ZERO,
            cost_center: None,
            group: None,
        }
    }

    /// Sets the line discount
    pub fn with_discount(mut self, discount: Rate) -> Self {
        self.discount = discount;
        self
    }

    /// Sets the cost center
    pub fn with_cost_center(mut self, cost_center: impl Into<String>) -> Self {
        self.cost_center = Some(cost_center.into());
        self
    }

    /// Sets the item group
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Scales the quantity, used by the invoice cycle multiplier
    pub fn scaled(mut self, factor: Decimal) -> Self {
        self.qty *= factor;
        self
    }

    /// Net amount of the line after its discount
    pub fn amount(&self) -> Money {
        self.discount.apply_discount(&self.rate.multiply(self.qty))
    }
}

/// A draft invoice for one customer
///
/// Drafts are built in memory and handed to the invoice store; submission
/// (the irreversible finalization in the host accounting system) is the
/// store adapter's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    pub id: InvoiceId,
    /// The customer the work was delivered to
    pub customer: CustomerId,
    /// The party that receives the bill (differs when a retailer redirects)
    pub bill_to: CustomerId,
    pub currency: Currency,
    pub items: Vec<LineItem>,
    /// Invoice-level discount applied after line discounts
    pub overall_discount: Rate,
    pub remarks: String,
    /// Sales tax template selected from the bill-to party's tax region
    pub tax_template: String,
    /// Income account revenue is routed to
    pub income_account: String,
    /// Key guarding against duplicate inserts of the same batch work
    pub idempotency_key: String,
    pub created_at: DateTime<Utc>,
}

impl InvoiceDraft {
    /// Net subtotal over all lines, before the overall discount
    pub fn subtotal(&self) -> Money {
        self.items
            .iter()
            .fold(Money::zero(self.currency), |acc, item| acc + item.amount())
    }

    /// Subtotals per item group, in group order
    ///
    /// Ungrouped lines appear under the empty string.
    pub fn group_subtotals(&self) -> BTreeMap<String, Money> {
        let mut totals = BTreeMap::new();
        for item in &self.items {
            let key = item.group.clone().unwrap_or_default();
            let entry = totals
                .entry(key)
                .or_insert_with(|| Money::zero(self.currency));
            *entry = *entry + item.amount();
        }
        totals
    }

    /// Grand total: overall discount applied to the subtotal, rounded to
    /// 2 decimals
    pub fn grand_total(&self) -> Money {
        self.overall_discount
            .apply_discount(&self.subtotal())
            .round_commercial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn eur(amount: Decimal) -> Money {
        Money::new(amount, Currency::EUR)
    }

    fn draft(items: Vec<LineItem>, overall_discount: Rate) -> InvoiceDraft {
        InvoiceDraft {
            id: InvoiceId::new(),
            customer: CustomerId::new(),
            bill_to: CustomerId::new(),
            currency: Currency::EUR,
            items,
            overall_discount,
            remarks: String::new(),
            tax_template: "Umsatzsteuer 022 (20%)".to_string(),
            income_account: "4200".to_string(),
            idempotency_key: "test".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_line_amount_with_discount() {
        let line = LineItem::new("SUPPORT-R", dec!(2), eur(dec!(90)))
            .with_discount(Rate::from_percentage(dec!(50)));
        assert_eq!(line.amount().amount(), dec!(90));
    }

    #[test]
    fn test_free_line_contributes_zero() {
        let line = LineItem::new("SUPPORT-R", dec!(3), eur(dec!(90))).with_discount(Rate::full());
        assert!(line.amount().is_zero());
    }

    #[test]
    fn test_grand_total_applies_overall_discount() {
        let d = draft(
            vec![
                LineItem::new("LIC-BASE", dec!(1), eur(dec!(100))),
                LineItem::new("LIC-USER", dec!(4), eur(dec!(25))),
            ],
            Rate::from_percentage(dec!(10)),
        );
        // (100 + 100) * 0.9
        assert_eq!(d.grand_total().amount(), dec!(180.00));
    }

    #[test]
    fn test_group_subtotals() {
        let d = draft(
            vec![
                LineItem::new("LIC-BASE", dec!(1), eur(dec!(100))).with_group("ZE"),
                LineItem::new("LIC-TERM", dec!(2), eur(dec!(50))).with_group("ZUKO"),
                LineItem::new("SETUP", dec!(1), eur(dec!(10))),
            ],
            Rate::ZERO,
        );
        let totals = d.group_subtotals();
        assert_eq!(totals[""].amount(), dec!(10));
        assert_eq!(totals["ZE"].amount(), dec!(100));
        assert_eq!(totals["ZUKO"].amount(), dec!(100));
    }

    #[test]
    fn test_scaled_quantity() {
        let line = LineItem::new("LIC-BASE", dec!(2), eur(dec!(10))).scaled(dec!(6));
        assert_eq!(line.qty, dec!(12));
        assert_eq!(line.amount().amount(), dec!(120));
    }
}
