//! Credit ledger handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use core_kernel::CustomerId;
use domain_billing::CreditLedger;

use crate::dto::ledger::{BalanceResponse, LedgerResponse};
use crate::{error::ApiError, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct LedgerQuery {
    /// Cut-off date; rows after it are left out
    pub until: Option<NaiveDate>,
}

fn build_ledger(state: &AppState, id: Uuid, until: Option<NaiveDate>) -> Result<CreditLedger, ApiError> {
    let customer_id = CustomerId::from(id);
    // 404 for unknown customers rather than an empty ledger
    state.directory.customer(&customer_id)?;
    let rows = state.credit_source.credit_rows(&customer_id, until)?;
    Ok(CreditLedger::from_rows(
        customer_id,
        state.currency,
        rows,
    )?)
}

/// Returns the credit ledger of a customer, optionally up to a cut-off date
pub async fn get_credit_ledger(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<LedgerQuery>,
) -> Result<Json<LedgerResponse>, ApiError> {
    let ledger = build_ledger(&state, id, query.until)?;
    Ok(Json((&ledger).into()))
}

/// Returns only the current credit balance of a customer
pub async fn get_credit_balance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let ledger = build_ledger(&state, id, None)?;
    let balance = ledger.balance();
    Ok(Json(BalanceResponse {
        customer_id: ledger.customer.to_string(),
        currency: balance.currency().code().to_string(),
        balance: balance.amount(),
    }))
}
