//! Invoice cycle batch drivers
//!
//! Two batch jobs live here. The licence cycle walks every licence once
//! per month, asks the firing schedule whether it is due, and assembles
//! the recurring invoice with quantities scaled to the covered interval.
//! The service invoicer pulls the previous month's time bookings from the
//! time-tracking system, classifies them per customer and bills the hours
//! and materials.
//!
//! Both drivers isolate failures per customer: one broken licence or one
//! unknown customer code is logged and reported, and the batch moves on.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{error, info, warn};

use core_kernel::{
    BillingMonth, Currency, CycleRunId, InvoiceId, LicenceId, Money, MoneyError, Rate,
};
use domain_billing::{BillingError, CustomerDirectory, InvoiceAssembler, InvoiceRequest, LineItem};
use domain_bookings::{
    classify, Booking, ClassifiedBookings, DiscountLookup, SkipReason, SkippedBooking,
    TimeTrackingPort,
};

use crate::error::LicenceError;
use crate::licence::{DeliveryChannel, Licence};
use crate::schedule::firing_for;

/// List price lookup for service and material items
pub trait PriceList: Send + Sync {
    /// Returns the list price per unit, or None for an unknown item
    fn list_price(&self, item_code: &str) -> Option<Money>;
}

/// Why a licence produced no invoice this month
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleSkip {
    /// The licence is disabled
    Disabled,
    /// The firing schedule says this is an in-between month
    NotDue,
    /// The licence fired but carries no items
    NoItems,
    /// Every invoice of the licence was already created by an earlier run
    AlreadyInvoiced,
}

/// One licence that invoiced successfully
#[derive(Debug, Clone, PartialEq)]
pub struct CycleOutcome {
    pub licence: LicenceId,
    pub invoices: Vec<InvoiceId>,
    /// How the customer receives the invoice
    pub delivery_channel: DeliveryChannel,
    /// True when one-off special items went onto this invoice; the caller
    /// must clear them from the licence afterwards
    pub billed_special_items: bool,
}

/// One licence the cycle could not invoice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleFailure {
    pub licence: LicenceId,
    pub error: String,
}

/// The result of one licence cycle run
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub run: CycleRunId,
    pub month: BillingMonth,
    pub invoiced: Vec<CycleOutcome>,
    pub skipped: Vec<(LicenceId, CycleSkip)>,
    pub failed: Vec<CycleFailure>,
}

impl CycleReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// The monthly licence invoice cycle
pub struct InvoiceCycle {
    assembler: Arc<InvoiceAssembler>,
}

impl InvoiceCycle {
    pub fn new(assembler: Arc<InvoiceAssembler>) -> Self {
        Self { assembler }
    }

    /// Runs the cycle for one month over the given licences
    ///
    /// Each licence is processed independently; a failure is recorded in
    /// the report and processing continues with the next licence. Re-runs
    /// for the same month are safe: the idempotency key is derived from
    /// the month and licence id, so already-created invoices are not
    /// created again and a customer with several licences gets one
    /// invoice per licence.
    pub fn run(&self, month: BillingMonth, licences: &[Licence]) -> CycleReport {
        let run = CycleRunId::new_v7();
        info!(%run, %month, licences = licences.len(), "starting licence invoice cycle");

        let mut report = CycleReport {
            run,
            month,
            invoiced: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
        };

        for licence in licences {
            match self.process_licence(month, licence) {
                Ok(Ok(outcome)) => report.invoiced.push(outcome),
                Ok(Err(skip)) => report.skipped.push((licence.id, skip)),
                Err(err) => {
                    error!(licence = %licence.id, %err, "licence cycle failed for licence");
                    report.failed.push(CycleFailure {
                        licence: licence.id,
                        error: err.to_string(),
                    });
                }
            }
        }

        info!(
            %run,
            invoiced = report.invoiced.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "licence invoice cycle finished"
        );
        report
    }

    fn process_licence(
        &self,
        month: BillingMonth,
        licence: &Licence,
    ) -> Result<Result<CycleOutcome, CycleSkip>, LicenceError> {
        if !licence.enabled {
            return Ok(Err(CycleSkip::Disabled));
        }
        let firing = match firing_for(licence, month)? {
            Some(firing) => firing,
            None => return Ok(Err(CycleSkip::NotDue)),
        };

        let multiplier = firing.multiplier_decimal();
        let mut items: Vec<LineItem> = licence
            .invoice_items
            .iter()
            .map(|item| item.to_line(multiplier))
            .collect();
        // One-off items are billed once, never scaled
        items.extend(
            licence
                .special_invoice_items
                .iter()
                .map(|item| item.to_line(rust_decimal::Decimal::ONE)),
        );

        if items.is_empty() {
            return Ok(Err(CycleSkip::NoItems));
        }

        let currency = items
            .first()
            .map(|i| i.rate.currency())
            .unwrap_or(Currency::EUR);

        let request = InvoiceRequest {
            customer: licence.customer,
            retailer: licence.retailer,
            currency,
            items,
            overall_discount: licence.overall_discount,
            remarks: format!("Lizenzabrechnung {month}"),
            invoice_separately: licence.invoice_separately,
            idempotency_key: format!("cycle:{}:{}", month, licence.id),
        };

        let invoices = self.assembler.create_invoices(&request)?;
        if invoices.is_empty() {
            return Ok(Err(CycleSkip::AlreadyInvoiced));
        }
        Ok(Ok(CycleOutcome {
            licence: licence.id,
            invoices,
            delivery_channel: licence.delivery_channel,
            billed_special_items: licence.has_special_items(),
        }))
    }
}

/// One customer the service invoicer billed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceOutcome {
    pub customer_code: String,
    pub invoice: InvoiceId,
    pub confirmed_bookings: usize,
}

/// What billing one customer's classified bookings came to
enum CustomerBilling {
    Invoiced(ServiceOutcome),
    /// Nothing to bill, or a replay of an already-billed month
    Nothing,
    /// The customer is disabled; the caller reports the bookings
    Disabled,
}

/// The result of one service billing run
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceRunReport {
    pub month: BillingMonth,
    pub invoiced: Vec<ServiceOutcome>,
    pub skipped_bookings: Vec<SkippedBooking>,
    pub failed: Vec<(String, String)>,
}

/// Bills time bookings and materials from the time-tracking system
pub struct ServiceInvoicer {
    port: Arc<dyn TimeTrackingPort>,
    assembler: Arc<InvoiceAssembler>,
    directory: Arc<dyn CustomerDirectory>,
    prices: Arc<dyn PriceList>,
}

impl ServiceInvoicer {
    pub fn new(
        port: Arc<dyn TimeTrackingPort>,
        assembler: Arc<InvoiceAssembler>,
        directory: Arc<dyn CustomerDirectory>,
        prices: Arc<dyn PriceList>,
    ) -> Self {
        Self {
            port,
            assembler,
            directory,
            prices,
        }
    }

    /// Bills all bookings of the given month, one invoice per customer
    ///
    /// Bookings are fetched from the time-tracking system, partitioned by
    /// customer code, classified, priced and invoiced. Only after an
    /// invoice is persisted are its bookings confirmed as processed in the
    /// source system, so a crash between the two steps re-bills nothing on
    /// the next run (the idempotency key catches the replay) but never
    /// loses a booking.
    pub async fn run(
        &self,
        month: BillingMonth,
        discounts: &(impl DiscountLookup + Sync),
    ) -> Result<ServiceRunReport, LicenceError> {
        let window = month.utc_window()?;
        let bookings = self.port.fetch_bookings(window).await?;
        info!(%month, bookings = bookings.len(), "fetched bookings for service billing");

        let mut by_customer: BTreeMap<String, Vec<Booking>> = BTreeMap::new();
        for booking in bookings {
            by_customer
                .entry(booking.customer_code.clone())
                .or_default()
                .push(booking);
        }

        let mut report = ServiceRunReport {
            month,
            invoiced: Vec::new(),
            skipped_bookings: Vec::new(),
            failed: Vec::new(),
        };

        for (code, bookings) in by_customer {
            let classified = classify(&bookings, &code, discounts);
            // Classifier skips are collected no matter how billing goes,
            // so every unbilled booking shows up in the report
            report.skipped_bookings.extend(classified.skipped.iter().cloned());

            match self.bill_customer(month, &code, &classified).await {
                Ok(CustomerBilling::Invoiced(outcome)) => report.invoiced.push(outcome),
                Ok(CustomerBilling::Nothing) => {}
                Ok(CustomerBilling::Disabled) => {
                    warn!(customer = %code, "customer disabled, bookings left unprocessed");
                    report.skipped_bookings.extend(
                        classified.billed_booking_ids().into_iter().map(|id| {
                            SkippedBooking {
                                booking_id: id,
                                reason: SkipReason::CustomerDisabled,
                                detail: Some(code.clone()),
                            }
                        }),
                    );
                }
                Err(err) => {
                    error!(customer = %code, %err, "service billing failed for customer");
                    report.failed.push((code, err.to_string()));
                }
            }
        }

        Ok(report)
    }

    async fn bill_customer(
        &self,
        month: BillingMonth,
        code: &str,
        classified: &ClassifiedBookings,
    ) -> Result<CustomerBilling, LicenceError> {
        if classified.is_empty() {
            if !classified.skipped.is_empty() {
                warn!(customer = %code, skipped = classified.skipped.len(), "only unbillable bookings for customer");
            }
            return Ok(CustomerBilling::Nothing);
        }

        let customer = self.directory.customer_by_code(code)?;
        if customer.disabled {
            return Ok(CustomerBilling::Disabled);
        }

        let mut items = Vec::new();
        let mut currency: Option<Currency> = None;
        for line in classified.items_remote.iter().chain(classified.items_onsite.iter()) {
            let rate = self.price(&line.item_code, &mut currency)?;
            items.push(
                LineItem::new(line.item_code.clone(), line.hours, rate)
                    .with_discount(line.discount),
            );
        }
        for material in &classified.materials {
            let rate = self.price(&material.item_code, &mut currency)?;
            items.push(
                LineItem::new(material.item_code.clone(), material.qty, rate)
                    .with_discount(material.discount),
            );
        }

        let request = InvoiceRequest {
            customer: customer.id,
            retailer: None,
            currency: currency.unwrap_or(Currency::EUR),
            items,
            overall_discount: Rate::ZERO,
            remarks: format!("Dienstleistungen {month}"),
            invoice_separately: false,
            idempotency_key: format!("svc:{}:{}", month, code),
        };

        let billed = classified.billed_booking_ids();
        let invoice = match self.assembler.create_invoice(&request)? {
            Some(id) => id,
            None => {
                // Replay of an already-billed month: the invoice exists
                // from an earlier run, but that run may have crashed
                // before confirming, so the bookings are confirmed again.
                self.port.confirm_processed(&billed).await?;
                return Ok(CustomerBilling::Nothing);
            }
        };

        self.port.confirm_processed(&billed).await?;

        Ok(CustomerBilling::Invoiced(ServiceOutcome {
            customer_code: code.to_string(),
            invoice,
            confirmed_bookings: billed.len(),
        }))
    }

    /// Looks up a list price and checks it against the invoice currency
    ///
    /// The first priced line pins the currency; any later line priced in a
    /// different currency fails the customer instead of producing a mixed
    /// invoice.
    fn price(
        &self,
        item_code: &str,
        currency: &mut Option<Currency>,
    ) -> Result<Money, LicenceError> {
        let rate = self
            .prices
            .list_price(item_code)
            .ok_or_else(|| LicenceError::UnknownItem(item_code.to_string()))?;
        match currency {
            Some(expected) if *expected != rate.currency() => {
                Err(BillingError::Money(MoneyError::CurrencyMismatch(
                    expected.code().to_string(),
                    rate.currency().code().to_string(),
                ))
                .into())
            }
            _ => {
                currency.get_or_insert(rate.currency());
                Ok(rate)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::licence::LicenceItem;
    use domain_billing::{Customer, MemoryCustomerDirectory, MemoryInvoiceStore, TaxPolicy, TaxRegion};
    use domain_billing::InvoiceStore;
    use core_kernel::CustomerId;
    use rust_decimal_macros::dec;

    fn eur(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::EUR)
    }

    fn setup() -> (Arc<MemoryCustomerDirectory>, Arc<MemoryInvoiceStore>, InvoiceCycle) {
        let directory = Arc::new(MemoryCustomerDirectory::new());
        let store = Arc::new(MemoryInvoiceStore::new());
        let assembler = Arc::new(InvoiceAssembler::new(
            TaxPolicy::default(),
            directory.clone(),
            store.clone(),
        ));
        (directory, store, InvoiceCycle::new(assembler))
    }

    fn licence(customer: CustomerId, per_year: u8) -> Licence {
        Licence {
            id: LicenceId::new(),
            customer,
            customer_code: "K-1".to_string(),
            retailer: None,
            enabled: true,
            invoices_per_year: per_year,
            invoice_separately: false,
            overall_discount: Rate::ZERO,
            delivery_channel: DeliveryChannel::Email,
            invoice_items: vec![LicenceItem::new("LIC-ZE-BASE", dec!(1), eur(dec!(40)))],
            special_invoice_items: vec![],
        }
    }

    #[test]
    fn test_quarterly_licence_bills_three_months_at_once() {
        let (directory, store, cycle) = setup();
        let customer = Customer::new(CustomerId::new(), "K-1", "Uhrenwerk AG", TaxRegion::Domestic);
        directory.insert(customer.clone());

        let lic = licence(customer.id, 4);
        let report = cycle.run(BillingMonth::new(2025, 4).unwrap(), &[lic]);

        assert_eq!(report.invoiced.len(), 1);
        let draft = store.get(&report.invoiced[0].invoices[0]).unwrap();
        assert_eq!(draft.items[0].qty, dec!(3));
        assert_eq!(draft.grand_total().amount(), dec!(120.00));
    }

    #[test]
    fn test_off_month_is_skipped_not_due() {
        let (directory, _store, cycle) = setup();
        let customer = Customer::new(CustomerId::new(), "K-1", "Uhrenwerk AG", TaxRegion::Domestic);
        directory.insert(customer.clone());

        let lic = licence(customer.id, 4);
        let report = cycle.run(BillingMonth::new(2025, 5).unwrap(), &[lic.clone()]);

        assert!(report.invoiced.is_empty());
        assert_eq!(report.skipped, vec![(lic.id, CycleSkip::NotDue)]);
    }

    #[test]
    fn test_disabled_licence_is_skipped() {
        let (directory, _store, cycle) = setup();
        let customer = Customer::new(CustomerId::new(), "K-1", "Uhrenwerk AG", TaxRegion::Domestic);
        directory.insert(customer.clone());

        let mut lic = licence(customer.id, 12);
        lic.enabled = false;
        let report = cycle.run(BillingMonth::new(2025, 5).unwrap(), &[lic.clone()]);
        assert_eq!(report.skipped, vec![(lic.id, CycleSkip::Disabled)]);
    }

    #[test]
    fn test_one_bad_licence_does_not_stop_the_batch() {
        let (directory, store, cycle) = setup();
        let customer = Customer::new(CustomerId::new(), "K-1", "Uhrenwerk AG", TaxRegion::Domestic);
        directory.insert(customer.clone());

        let mut broken = licence(customer.id, 12);
        broken.invoices_per_year = 5;
        broken.customer_code = "K-broken".to_string();
        let good = licence(customer.id, 12);

        let report = cycle.run(BillingMonth::new(2025, 5).unwrap(), &[broken.clone(), good]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].licence, broken.id);
        assert_eq!(report.invoiced.len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_two_licences_of_one_customer_bill_independently() {
        let (directory, store, cycle) = setup();
        let customer = Customer::new(CustomerId::new(), "K-1", "Uhrenwerk AG", TaxRegion::Domestic);
        directory.insert(customer.clone());

        let first = licence(customer.id, 12);
        let second = licence(customer.id, 12);
        let report = cycle.run(BillingMonth::new(2025, 5).unwrap(), &[first, second]);

        // the same customer code must not collapse the two licences
        assert_eq!(report.invoiced.len(), 2);
        assert!(report.skipped.is_empty());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_rerun_reports_already_invoiced() {
        let (directory, store, cycle) = setup();
        let customer = Customer::new(CustomerId::new(), "K-1", "Uhrenwerk AG", TaxRegion::Domestic);
        directory.insert(customer.clone());

        let lic = licence(customer.id, 12);
        let month = BillingMonth::new(2025, 5).unwrap();
        let first = cycle.run(month, &[lic.clone()]);
        let second = cycle.run(month, &[lic.clone()]);

        assert_eq!(first.invoiced.len(), 1);
        assert_eq!(second.skipped, vec![(lic.id, CycleSkip::AlreadyInvoiced)]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_special_items_are_billed_unscaled_and_flagged() {
        let (directory, store, cycle) = setup();
        let customer = Customer::new(CustomerId::new(), "K-1", "Uhrenwerk AG", TaxRegion::Domestic);
        directory.insert(customer.clone());

        let mut lic = licence(customer.id, 4);
        lic.special_invoice_items =
            vec![LicenceItem::new("SETUP-TERMINAL", dec!(2), eur(dec!(150)))];

        let report = cycle.run(BillingMonth::new(2025, 1).unwrap(), &[lic]);
        assert!(report.invoiced[0].billed_special_items);

        let draft = store.get(&report.invoiced[0].invoices[0]).unwrap();
        let setup_line = draft
            .items
            .iter()
            .find(|i| i.item_code == "SETUP-TERMINAL")
            .unwrap();
        // quantity is not multiplied by the quarterly interval
        assert_eq!(setup_line.qty, dec!(2));
    }
}
