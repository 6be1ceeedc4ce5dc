//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible
//! defaults. Tests specify only the relevant fields and take defaults for
//! everything else.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{BookingId, CustomerId, LicenceId, Money, PaymentRecordId, Rate};
use domain_bookings::{Booking, InvoiceType, MaterialItem, ServiceType};
use domain_licence::{DeliveryChannel, Licence, LicenceItem};
use domain_payments::{PaymentMethod, PaymentRecord, PostalAddress};

use crate::fixtures::{MoneyFixtures, TemporalFixtures};

/// Builder for booking records
pub struct BookingBuilder {
    from_time: DateTime<Utc>,
    duration_minutes: i64,
    person: String,
    customer_code: String,
    service_type: ServiceType,
    invoice_type: InvoiceType,
    item_code: String,
    material_items: Vec<MaterialItem>,
    override_duration: Option<String>,
}

impl Default for BookingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingBuilder {
    pub fn new() -> Self {
        Self {
            from_time: TemporalFixtures::booking_start(),
            duration_minutes: 60,
            person: "M. Leitner".to_string(),
            customer_code: "K-100".to_string(),
            service_type: ServiceType::Remote,
            invoice_type: InvoiceType::Billable,
            item_code: "SVC-REMOTE".to_string(),
            material_items: Vec::new(),
            override_duration: None,
        }
    }

    pub fn with_customer(mut self, code: impl Into<String>) -> Self {
        self.customer_code = code.into();
        self
    }

    pub fn with_minutes(mut self, minutes: i64) -> Self {
        self.duration_minutes = minutes;
        self
    }

    pub fn with_service_type(mut self, service_type: ServiceType) -> Self {
        self.service_type = service_type;
        self
    }

    pub fn with_invoice_type(mut self, invoice_type: InvoiceType) -> Self {
        self.invoice_type = invoice_type;
        self
    }

    pub fn with_item_code(mut self, code: impl Into<String>) -> Self {
        self.item_code = code.into();
        self
    }

    pub fn with_material(mut self, item_code: impl Into<String>, qty: Decimal) -> Self {
        self.material_items.push(MaterialItem {
            item_code: item_code.into(),
            qty,
        });
        self
    }

    pub fn with_override(mut self, hhmm: impl Into<String>) -> Self {
        self.override_duration = Some(hhmm.into());
        self
    }

    pub fn build(self) -> Booking {
        Booking {
            id: BookingId::new(),
            from_time: self.from_time,
            duration_minutes: self.duration_minutes,
            person: self.person,
            customer_code: self.customer_code,
            service_type: self.service_type,
            invoice_type: self.invoice_type,
            item_code: self.item_code,
            material_items: self.material_items,
            override_duration: self.override_duration,
        }
    }
}

/// Builder for licence contracts
pub struct LicenceBuilder {
    customer: CustomerId,
    customer_code: String,
    retailer: Option<CustomerId>,
    enabled: bool,
    invoices_per_year: u8,
    invoice_separately: bool,
    overall_discount: Rate,
    invoice_items: Vec<LicenceItem>,
    special_invoice_items: Vec<LicenceItem>,
}

impl LicenceBuilder {
    pub fn for_customer(customer: CustomerId, code: impl Into<String>) -> Self {
        Self {
            customer,
            customer_code: code.into(),
            retailer: None,
            enabled: true,
            invoices_per_year: 12,
            invoice_separately: false,
            overall_discount: Rate::ZERO,
            invoice_items: vec![LicenceItem::new(
                "LIC-ZE-BASE",
                dec!(1),
                MoneyFixtures::licence_base_rate(),
            )],
            special_invoice_items: Vec::new(),
        }
    }

    pub fn with_retailer(mut self, retailer: CustomerId) -> Self {
        self.retailer = Some(retailer);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn with_frequency(mut self, invoices_per_year: u8) -> Self {
        self.invoices_per_year = invoices_per_year;
        self
    }

    pub fn invoice_separately(mut self) -> Self {
        self.invoice_separately = true;
        self
    }

    pub fn with_discount(mut self, discount: Rate) -> Self {
        self.overall_discount = discount;
        self
    }

    pub fn with_items(mut self, items: Vec<LicenceItem>) -> Self {
        self.invoice_items = items;
        self
    }

    pub fn with_special_items(mut self, items: Vec<LicenceItem>) -> Self {
        self.special_invoice_items = items;
        self
    }

    pub fn build(self) -> Licence {
        Licence {
            id: LicenceId::new(),
            customer: self.customer,
            customer_code: self.customer_code,
            retailer: self.retailer,
            enabled: self.enabled,
            invoices_per_year: self.invoices_per_year,
            invoice_separately: self.invoice_separately,
            overall_discount: self.overall_discount,
            delivery_channel: DeliveryChannel::Email,
            invoice_items: self.invoice_items,
            special_invoice_items: self.special_invoice_items,
        }
    }
}

/// Builder for outgoing payment records
pub struct PaymentRecordBuilder {
    creditor_name: String,
    creditor_address: PostalAddress,
    method: PaymentMethod,
    amount: Money,
    reference: String,
}

impl Default for PaymentRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentRecordBuilder {
    pub fn new() -> Self {
        Self {
            creditor_name: "Beschläge Huber GmbH".to_string(),
            creditor_address: PostalAddress::default(),
            method: PaymentMethod::Sepa {
                iban: "AT611904300234573201".to_string(),
                bic: Some("BKAUATWW".to_string()),
            },
            amount: Money::new(dec!(100.00), core_kernel::Currency::EUR),
            reference: "ER-2025-0815".to_string(),
        }
    }

    pub fn with_creditor(mut self, name: impl Into<String>) -> Self {
        self.creditor_name = name.into();
        self
    }

    pub fn with_address(mut self, address: PostalAddress) -> Self {
        self.creditor_address = address;
        self
    }

    pub fn with_method(mut self, method: PaymentMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_amount(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }

    pub fn build(self) -> PaymentRecord {
        PaymentRecord {
            id: PaymentRecordId::new(),
            creditor_name: self.creditor_name,
            creditor_address: self.creditor_address,
            method: self.method,
            amount: self.amount,
            reference: self.reference,
        }
    }
}
