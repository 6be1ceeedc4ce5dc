//! HTTP API Layer
//!
//! This crate provides the REST API for the billing engine using Axum.
//!
//! # Endpoints
//!
//! - `GET /health` - liveness
//! - `GET /api/customers/:id/credit-ledger` - full derived credit ledger
//! - `GET /api/customers/:id/credit-balance` - current balance only
//! - `POST /api/invoice-cycle` - run the licence cycle for one month
//! - `GET /api/calendar?user=..&secret=..` - iCalendar appointment feed
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod feed;
pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use core_kernel::Currency;
use domain_billing::{CreditSource, CustomerDirectory};
use domain_licence::{InvoiceCycle, LicenceRepository};

use crate::config::ApiConfig;
use crate::feed::EventSource;
use crate::handlers::{calendar, cycle, health, ledger};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    /// Currency the ledger and cycle report amounts are in
    pub currency: Currency,
    pub directory: Arc<dyn CustomerDirectory>,
    pub credit_source: Arc<dyn CreditSource>,
    pub licences: Arc<dyn LicenceRepository>,
    pub invoice_cycle: Arc<InvoiceCycle>,
    pub events: Arc<dyn EventSource>,
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route(
            "/customers/:id/credit-ledger",
            get(ledger::get_credit_ledger),
        )
        .route(
            "/customers/:id/credit-balance",
            get(ledger::get_credit_balance),
        )
        .route("/invoice-cycle", post(cycle::run_invoice_cycle))
        .route("/calendar", get(calendar::calendar_feed));

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
