//! Integration tests for payment proposals and pain.001 rendering

use rust_decimal_macros::dec;

use core_kernel::{business_today, Currency, Money};
use domain_payments::{
    validate_pain001, write_pain001, Debtor, PaymentProposal, PaymentRecord, PostalAddress,
};
use test_utils::{assert_money_rounded, PaymentRecordBuilder};

fn debtor() -> Debtor {
    Debtor {
        name: "Zeitbill GmbH".to_string(),
        iban: "AT483200000012345864".to_string(),
        bic: "RLNWATWW".to_string(),
    }
}

fn sepa(amount: rust_decimal::Decimal, reference: &str) -> PaymentRecord {
    PaymentRecordBuilder::new()
        .with_address(PostalAddress {
            street: "Industriestraße".to_string(),
            building: "12a".to_string(),
            pincode: "4020".to_string(),
            city: "Linz".to_string(),
            country: "AT".to_string(),
        })
        .with_amount(Money::new(amount, Currency::EUR))
        .with_reference(reference)
        .build()
}

#[test]
fn proposal_to_file_roundtrip_validates() {
    let proposal = PaymentProposal::new(
        "Zahlungsvorschlag April 2025",
        debtor(),
        Currency::EUR,
        business_today(),
        vec![
            sepa(dec!(1234.56), "ER-2025-0815"),
            sepa(dec!(78.90), "ER-2025-0816"),
            sepa(dec!(0.01), "ER-2025-0817"),
        ],
    )
    .unwrap();

    let xml = write_pain001(&proposal).unwrap();
    validate_pain001(&xml).unwrap();

    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xml.contains("<NbOfTxs>3</NbOfTxs>"));
    assert!(xml.contains("<CtrlSum>1313.47</CtrlSum>"));
    assert!(xml.contains("<ChrgBr>SLEV</ChrgBr>"));
}

#[test]
fn overlong_address_fields_are_clipped_to_schema_limits() {
    let mut record = sepa(dec!(10), "ER-1");
    record.creditor_address = PostalAddress {
        street: "Wirtschaftsparkstraße am oberen Mühlbachufer".to_string(),
        building: "128/3/17".to_string(),
        pincode: "A-4020-INDUSTRIEGEBIET-NORD".to_string(),
        city: "Sankt Georgen an der Gusen im Mühlviertel".to_string(),
        country: "AT".to_string(),
    };

    let proposal = PaymentProposal::new(
        "ZV-2025-04",
        debtor(),
        Currency::EUR,
        business_today(),
        vec![record],
    )
    .unwrap();

    let xml = write_pain001(&proposal).unwrap();
    validate_pain001(&xml).unwrap();

    let street = between(&xml, "<StrtNm>", "</StrtNm>");
    let building = between(&xml, "<BldgNb>", "</BldgNb>");
    let pincode = between(&xml, "<PstCd>", "</PstCd>");
    let city = between(&xml, "<TwnNm>", "</TwnNm>");

    assert!(street.chars().count() <= 35);
    assert_eq!(building.chars().count(), 5);
    assert_eq!(pincode.chars().count(), 16);
    assert!(city.chars().count() <= 35);
}

#[test]
fn special_characters_are_escaped() {
    let mut record = sepa(dec!(10), "ER-1");
    record.creditor_name = "Huber & Söhne <OG>".to_string();

    let proposal = PaymentProposal::new(
        "ZV-2025-04",
        debtor(),
        Currency::EUR,
        business_today(),
        vec![record],
    )
    .unwrap();

    let xml = write_pain001(&proposal).unwrap();
    validate_pain001(&xml).unwrap();
    assert!(xml.contains("Huber &amp; Söhne &lt;OG&gt;"));
}

fn between<'a>(xml: &'a str, open: &str, close: &str) -> &'a str {
    let start = xml.find(open).unwrap() + open.len();
    let end = xml[start..].find(close).unwrap() + start;
    &xml[start..end]
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// The declared control sum always equals the sum of the per
        /// transfer commercially rounded amounts, whatever the batch.
        #[test]
        fn control_sum_matches_rounded_transfer_sum(
            cents in proptest::collection::vec(1i64..10_000_000i64, 1..25)
        ) {
            let payments: Vec<PaymentRecord> = cents
                .iter()
                .enumerate()
                .map(|(i, c)| sepa(rust_decimal::Decimal::new(*c, 2), &format!("ER-{i}")))
                .collect();

            let proposal = PaymentProposal::new(
                "ZV-prop",
                debtor(),
                Currency::EUR,
                business_today(),
                payments,
            )
            .unwrap();

            assert_money_rounded(&proposal.control_sum().unwrap());

            let xml = write_pain001(&proposal).unwrap();
            prop_assert!(validate_pain001(&xml).is_ok());
        }
    }
}
