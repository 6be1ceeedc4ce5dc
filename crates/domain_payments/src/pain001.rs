//! ISO 20022 pain.001.001.03 credit transfer initiation writer
//!
//! One proposal becomes one file: a group header with message id and
//! control sum, then one payment information block per transfer. The
//! writer emits events rather than templating strings so nesting errors
//! are impossible and special characters are escaped by the library.
//!
//! Swiss transfers branch on the participation number: a QR-IBAN carries
//! its structured reference as type QRR, a classic payment slip uses the
//! CH01 local instrument with the creditor's participation number as the
//! account.

use std::io::Write;

use chrono::Utc;
use quick_xml::events::{BytesDecl, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use rust_decimal::Decimal;
use tracing::info;

use core_kernel::Money;

use crate::error::PaymentError;
use crate::proposal::{PaymentMethod, PaymentProposal, PaymentRecord, PostalAddress};

const NAMESPACE: &str = "urn:iso:std:iso:20022:tech:xsd:pain.001.001.03";

/// Renders the proposal as a pain.001 document
pub fn write_pain001(proposal: &PaymentProposal) -> Result<String, PaymentError> {
    let control_sum = proposal.control_sum()?;
    let msg_id = format!("MSG-{}", Utc::now().format("%Y%m%d%H%M%S%3f"));

    let mut buf = Vec::new();
    let mut wr = Writer::new_with_indent(&mut buf, b' ', 2);

    wr.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut doc = BytesStart::new("Document");
    doc.push_attribute(("xmlns", NAMESPACE));
    wr.write_event(Event::Start(doc))?;
    start(&mut wr, "CstmrCdtTrfInitn")?;

    write_group_header(&mut wr, proposal, &msg_id, &control_sum)?;
    for (index, payment) in proposal.payments.iter().enumerate() {
        write_payment(&mut wr, proposal, payment, index)?;
    }

    end(&mut wr, "CstmrCdtTrfInitn")?;
    end(&mut wr, "Document")?;

    info!(
        proposal = %proposal.id,
        %msg_id,
        transactions = proposal.transaction_count(),
        control_sum = %control_sum,
        "pain.001 file rendered"
    );
    String::from_utf8(buf).map_err(|e| PaymentError::Render(e.to_string()))
}

fn write_group_header<W: Write>(
    wr: &mut Writer<W>,
    proposal: &PaymentProposal,
    msg_id: &str,
    control_sum: &Money,
) -> Result<(), PaymentError> {
    start(wr, "GrpHdr")?;
    text_el(wr, "MsgId", msg_id)?;
    text_el(
        wr,
        "CreDtTm",
        &Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
    )?;
    text_el(wr, "NbOfTxs", &proposal.transaction_count().to_string())?;
    text_el(wr, "CtrlSum", &format_amount(control_sum))?;
    start(wr, "InitgPty")?;
    text_el(wr, "Nm", &proposal.debtor.name)?;
    end(wr, "InitgPty")?;
    end(wr, "GrpHdr")?;
    Ok(())
}

fn write_payment<W: Write>(
    wr: &mut Writer<W>,
    proposal: &PaymentProposal,
    payment: &PaymentRecord,
    index: usize,
) -> Result<(), PaymentError> {
    let amount = payment.amount.round_commercial();

    start(wr, "PmtInf")?;
    text_el(wr, "PmtInfId", &format!("{}-{}", proposal.id, index + 1))?;
    text_el(wr, "PmtMtd", "TRF")?;
    text_el(wr, "NbOfTxs", "1")?;
    text_el(wr, "CtrlSum", &format_amount(&amount))?;

    write_payment_type(wr, &payment.method)?;

    text_el(
        wr,
        "ReqdExctnDt",
        &proposal.execution_date.format("%Y-%m-%d").to_string(),
    )?;
    start(wr, "Dbtr")?;
    text_el(wr, "Nm", &proposal.debtor.name)?;
    end(wr, "Dbtr")?;
    start(wr, "DbtrAcct")?;
    start(wr, "Id")?;
    text_el(wr, "IBAN", &proposal.debtor.iban)?;
    end(wr, "Id")?;
    end(wr, "DbtrAcct")?;
    start(wr, "DbtrAgt")?;
    start(wr, "FinInstnId")?;
    text_el(wr, "BIC", &proposal.debtor.bic)?;
    end(wr, "FinInstnId")?;
    end(wr, "DbtrAgt")?;
    text_el(wr, "ChrgBr", "SLEV")?;

    write_transaction(wr, payment, &amount)?;

    end(wr, "PmtInf")?;
    Ok(())
}

fn write_payment_type<W: Write>(
    wr: &mut Writer<W>,
    method: &PaymentMethod,
) -> Result<(), PaymentError> {
    start(wr, "PmtTpInf")?;
    match method {
        PaymentMethod::Sepa { .. } => {
            start(wr, "SvcLvl")?;
            text_el(wr, "Cd", "SEPA")?;
            end(wr, "SvcLvl")?;
        }
        PaymentMethod::Swiss { .. } if method.is_qrr() => {
            // QR-IBAN transfers carry no local instrument; the QRR
            // reference type in the remittance block is sufficient
        }
        PaymentMethod::Swiss { .. } => {
            start(wr, "LclInstrm")?;
            text_el(wr, "Prtry", "CH01")?;
            end(wr, "LclInstrm")?;
        }
    }
    end(wr, "PmtTpInf")?;
    Ok(())
}

fn write_transaction<W: Write>(
    wr: &mut Writer<W>,
    payment: &PaymentRecord,
    amount: &Money,
) -> Result<(), PaymentError> {
    start(wr, "CdtTrfTxInf")?;

    start(wr, "PmtId")?;
    text_el(wr, "EndToEndId", &payment.end_to_end_id())?;
    end(wr, "PmtId")?;

    start(wr, "Amt")?;
    let mut instd = BytesStart::new("InstdAmt");
    instd.push_attribute(("Ccy", amount.currency().code()));
    wr.write_event(Event::Start(instd))?;
    wr.write_event(Event::Text(BytesText::new(&format_amount(amount))))?;
    wr.write_event(Event::End(BytesStart::new("InstdAmt").to_end()))?;
    end(wr, "Amt")?;

    if let PaymentMethod::Sepa { bic: Some(bic), .. } = &payment.method {
        start(wr, "CdtrAgt")?;
        start(wr, "FinInstnId")?;
        text_el(wr, "BIC", bic)?;
        end(wr, "FinInstnId")?;
        end(wr, "CdtrAgt")?;
    }

    start(wr, "Cdtr")?;
    text_el(wr, "Nm", &payment.clipped_name())?;
    write_address(wr, &payment.creditor_address)?;
    end(wr, "Cdtr")?;

    write_creditor_account(wr, &payment.method)?;
    write_remittance(wr, payment)?;

    end(wr, "CdtTrfTxInf")?;
    Ok(())
}

fn write_address<W: Write>(
    wr: &mut Writer<W>,
    address: &PostalAddress,
) -> Result<(), PaymentError> {
    if address.is_empty() {
        return Ok(());
    }
    let clipped = address.clipped();
    start(wr, "PstlAdr")?;
    if !clipped.street.is_empty() {
        text_el(wr, "StrtNm", &clipped.street)?;
    }
    if !clipped.building.is_empty() {
        text_el(wr, "BldgNb", &clipped.building)?;
    }
    if !clipped.pincode.is_empty() {
        text_el(wr, "PstCd", &clipped.pincode)?;
    }
    if !clipped.city.is_empty() {
        text_el(wr, "TwnNm", &clipped.city)?;
    }
    if !clipped.country.is_empty() {
        text_el(wr, "Ctry", &clipped.country)?;
    }
    end(wr, "PstlAdr")?;
    Ok(())
}

fn write_creditor_account<W: Write>(
    wr: &mut Writer<W>,
    method: &PaymentMethod,
) -> Result<(), PaymentError> {
    start(wr, "CdtrAcct")?;
    start(wr, "Id")?;
    match method {
        PaymentMethod::Sepa { iban, .. } => text_el(wr, "IBAN", iban)?,
        PaymentMethod::Swiss { account, .. } if method.is_qrr() => {
            text_el(wr, "IBAN", account)?
        }
        PaymentMethod::Swiss {
            participation_no, ..
        } => {
            start(wr, "Othr")?;
            text_el(wr, "Id", participation_no)?;
            end(wr, "Othr")?;
        }
    }
    end(wr, "Id")?;
    end(wr, "CdtrAcct")?;
    Ok(())
}

fn write_remittance<W: Write>(
    wr: &mut Writer<W>,
    payment: &PaymentRecord,
) -> Result<(), PaymentError> {
    start(wr, "RmtInf")?;
    match &payment.method {
        PaymentMethod::Sepa { .. } => {
            text_el(wr, "Ustrd", &payment.end_to_end_id())?;
        }
        PaymentMethod::Swiss { reference, .. } => {
            start(wr, "Strd")?;
            start(wr, "CdtrRefInf")?;
            if payment.method.is_qrr() {
                start(wr, "Tp")?;
                start(wr, "CdOrPrtry")?;
                text_el(wr, "Prtry", "QRR")?;
                end(wr, "CdOrPrtry")?;
                end(wr, "Tp")?;
            }
            text_el(wr, "Ref", reference)?;
            end(wr, "CdtrRefInf")?;
            end(wr, "Strd")?;
        }
    }
    end(wr, "RmtInf")?;
    Ok(())
}

fn start<W: Write>(wr: &mut Writer<W>, name: &str) -> Result<(), quick_xml::Error> {
    wr.write_event(Event::Start(BytesStart::new(name)))
}

fn end<W: Write>(wr: &mut Writer<W>, name: &str) -> Result<(), quick_xml::Error> {
    wr.write_event(Event::End(BytesStart::new(name).to_end()))
}

fn text_el<W: Write>(
    wr: &mut Writer<W>,
    name: &str,
    value: &str,
) -> Result<(), quick_xml::Error> {
    start(wr, name)?;
    wr.write_event(Event::Text(BytesText::new(value)))?;
    end(wr, name)
}

fn format_amount(money: &Money) -> String {
    format!("{:.2}", money.amount())
}

/// Structural check of a rendered pain.001 file
///
/// Re-reads the XML and verifies that the declared transaction count
/// matches the number of `CdtTrfTxInf` blocks and that the control sum
/// equals the sum of all instructed amounts. This does not replace XSD
/// validation at the bank, but it catches every assembly error the writer
/// could plausibly make.
pub fn validate_pain001(xml: &str) -> Result<(), PaymentError> {
    let mut reader = Reader::from_str(xml);

    let mut current = Vec::new();
    let mut declared_txs: Option<u32> = None;
    let mut declared_sum: Option<Decimal> = None;
    let mut tx_count = 0u32;
    let mut amount_sum = Decimal::ZERO;
    let mut in_group_header = false;
    let mut has_msg_id = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "GrpHdr" {
                    in_group_header = true;
                }
                if name == "CdtTrfTxInf" {
                    tx_count += 1;
                }
                current.push(name);
            }
            Event::End(e) => {
                if e.name().as_ref() == b"GrpHdr" {
                    in_group_header = false;
                }
                current.pop();
            }
            Event::Text(t) => {
                let value = t.unescape()?.to_string();
                match current.last().map(String::as_str) {
                    Some("MsgId") if in_group_header => has_msg_id = !value.is_empty(),
                    Some("NbOfTxs") if in_group_header => {
                        declared_txs = Some(value.parse().map_err(|_| {
                            PaymentError::Validation(format!("bad NbOfTxs: {value}"))
                        })?);
                    }
                    Some("CtrlSum") if in_group_header => {
                        declared_sum = Some(value.parse().map_err(|_| {
                            PaymentError::Validation(format!("bad CtrlSum: {value}"))
                        })?);
                    }
                    Some("InstdAmt") => {
                        let amount: Decimal = value.parse().map_err(|_| {
                            PaymentError::Validation(format!("bad InstdAmt: {value}"))
                        })?;
                        amount_sum += amount;
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !has_msg_id {
        return Err(PaymentError::Validation("missing MsgId".to_string()));
    }
    match declared_txs {
        Some(n) if n == tx_count => {}
        other => {
            return Err(PaymentError::Validation(format!(
                "NbOfTxs {:?} does not match {} transactions",
                other, tx_count
            )))
        }
    }
    match declared_sum {
        Some(sum) if sum == amount_sum => Ok(()),
        other => Err(PaymentError::Validation(format!(
            "CtrlSum {:?} does not match amount sum {}",
            other, amount_sum
        ))),
    }
}
