//! Invoice cycle handler

use axum::{extract::State, Json};
use validator::Validate;

use core_kernel::BillingMonth;

use crate::dto::cycle::{CycleResponse, RunCycleRequest};
use crate::{error::ApiError, AppState};

/// Runs the licence invoice cycle for the requested month
///
/// The run is synchronous; the response carries the full per-licence
/// outcome so the operator sees skips and failures immediately. Calling
/// it twice for the same month is harmless, already-created invoices are
/// reported as skipped.
pub async fn run_invoice_cycle(
    State(state): State<AppState>,
    Json(request): Json<RunCycleRequest>,
) -> Result<Json<CycleResponse>, ApiError> {
    request.validate()?;
    let month = BillingMonth::new(request.year, request.month)
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let licences = state.licences.licences()?;
    let report = state.invoice_cycle.run(month, &licences);
    Ok(Json((&report).into()))
}
