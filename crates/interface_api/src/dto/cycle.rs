//! Invoice cycle DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;

use domain_licence::{CycleReport, CycleSkip, DeliveryChannel};

/// Request to run the licence invoice cycle for one month
#[derive(Debug, Deserialize, Validate)]
pub struct RunCycleRequest {
    #[validate(range(min = 2000, max = 2100))]
    pub year: i32,
    #[validate(range(min = 1, max = 12))]
    pub month: u32,
}

#[derive(Debug, Serialize)]
pub struct InvoicedLicenceResponse {
    pub licence_id: String,
    pub invoice_ids: Vec<String>,
    pub delivery: String,
}

#[derive(Debug, Serialize)]
pub struct SkippedLicenceResponse {
    pub licence_id: String,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct FailedLicenceResponse {
    pub licence_id: String,
    pub error: String,
}

/// The cycle run summary returned to the operator
#[derive(Debug, Serialize)]
pub struct CycleResponse {
    pub run_id: String,
    pub month: String,
    pub invoiced: Vec<InvoicedLicenceResponse>,
    pub skipped: Vec<SkippedLicenceResponse>,
    pub failed: Vec<FailedLicenceResponse>,
}

fn delivery(channel: DeliveryChannel) -> &'static str {
    match channel {
        DeliveryChannel::Email => "email",
        DeliveryChannel::Post => "post",
    }
}

fn skip_reason(skip: &CycleSkip) -> &'static str {
    match skip {
        CycleSkip::Disabled => "disabled",
        CycleSkip::NotDue => "not_due",
        CycleSkip::NoItems => "no_items",
        CycleSkip::AlreadyInvoiced => "already_invoiced",
    }
}

impl From<&CycleReport> for CycleResponse {
    fn from(report: &CycleReport) -> Self {
        Self {
            run_id: report.run.to_string(),
            month: report.month.to_string(),
            invoiced: report
                .invoiced
                .iter()
                .map(|o| InvoicedLicenceResponse {
                    licence_id: o.licence.to_string(),
                    invoice_ids: o.invoices.iter().map(ToString::to_string).collect(),
                    delivery: delivery(o.delivery_channel).to_string(),
                })
                .collect(),
            skipped: report
                .skipped
                .iter()
                .map(|(id, skip)| SkippedLicenceResponse {
                    licence_id: id.to_string(),
                    reason: skip_reason(skip).to_string(),
                })
                .collect(),
            failed: report
                .failed
                .iter()
                .map(|f| FailedLicenceResponse {
                    licence_id: f.licence.to_string(),
                    error: f.error.clone(),
                })
                .collect(),
        }
    }
}
