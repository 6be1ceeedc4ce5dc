//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data that
//! maintains domain invariants.

use fake::faker::company::en::CompanyName;
use fake::faker::name::en::Name;
use fake::Fake;
use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{Currency, Money, Rate};
use domain_bookings::{InvoiceType, ServiceType};

/// Strategy for generating valid Currency values
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::EUR),
        Just(Currency::CHF),
        Just(Currency::USD),
        Just(Currency::GBP),
    ]
}

/// Strategy for generating positive amounts in cents
pub fn positive_cents_strategy() -> impl Strategy<Value = i64> {
    1i64..100_000_000i64
}

/// Strategy for generating positive Money values
pub fn positive_money_strategy() -> impl Strategy<Value = Money> {
    (positive_cents_strategy(), currency_strategy())
        .prop_map(|(cents, currency)| Money::new(Decimal::new(cents, 2), currency))
}

/// Strategy for generating EUR Money values
pub fn eur_money_strategy() -> impl Strategy<Value = Money> {
    positive_cents_strategy().prop_map(|cents| Money::new(Decimal::new(cents, 2), Currency::EUR))
}

/// Strategy for generating discount rates between 0% and 100%
pub fn discount_strategy() -> impl Strategy<Value = Rate> {
    (0u32..=100u32).prop_map(|pct| Rate::from_percentage(Decimal::from(pct)))
}

/// Strategy for generating plausible booking durations in minutes
pub fn duration_minutes_strategy() -> impl Strategy<Value = i64> {
    5i64..600i64
}

/// Strategy for generating service types
pub fn service_type_strategy() -> impl Strategy<Value = ServiceType> {
    prop_oneof![
        Just(ServiceType::Remote),
        Just(ServiceType::Onsite),
        Just(ServiceType::Project),
    ]
}

/// Strategy for generating invoice types
pub fn invoice_type_strategy() -> impl Strategy<Value = InvoiceType> {
    prop_oneof![
        Just(InvoiceType::Billable),
        Just(InvoiceType::Free),
        Just(InvoiceType::NotBilled),
        Just(InvoiceType::FlatRate),
    ]
}

/// Strategy for generating valid invoicing frequencies
pub fn frequency_strategy() -> impl Strategy<Value = u8> {
    prop::sample::select(vec![1u8, 2, 4, 6, 12])
}

/// A random company name for customer records
pub fn random_company_name() -> String {
    CompanyName().fake()
}

/// A random person name for booking records
pub fn random_person_name() -> String {
    Name().fake()
}
