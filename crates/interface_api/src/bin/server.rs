//! Zeitbill - API Server Binary
//!
//! This binary starts the HTTP API server for the billing engine.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin zeitbill-api
//!
//! # Run with environment variables
//! API_HOST=0.0.0.0 API_PORT=8080 API_FEED_SECRET=... cargo run --bin zeitbill-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_FEED_SECRET` - Shared secret for the calendar feed
//! * `API_FEED_ENABLED` - Whether the calendar feed is served (default: true)
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::Currency;
use domain_billing::{
    InvoiceAssembler, MemoryCreditSource, MemoryCustomerDirectory, MemoryInvoiceStore, TaxPolicy,
};
use domain_licence::{InvoiceCycle, MemoryLicenceRepository};
use interface_api::{config::ApiConfig, create_router, feed::NoAppointments, AppState};

/// Main entry point for the API server.
///
/// Initializes logging, loads configuration, wires the in-process
/// adapters and starts the HTTP server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = load_config()?;
    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        "Starting zeitbill API server"
    );

    let directory = Arc::new(MemoryCustomerDirectory::new());
    let store = Arc::new(MemoryInvoiceStore::new());
    let assembler = Arc::new(InvoiceAssembler::new(
        TaxPolicy::default(),
        directory.clone(),
        store,
    ));

    let state = AppState {
        config: config.clone(),
        currency: Currency::EUR,
        directory,
        credit_source: Arc::new(MemoryCreditSource::new()),
        licences: Arc::new(MemoryLicenceRepository::new()),
        invoice_cycle: Arc::new(InvoiceCycle::new(assembler)),
        events: Arc::new(NoAppointments),
    };

    let app = create_router(state);
    let addr: SocketAddr = config.server_addr().parse()?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Loads API configuration from environment variables.
///
/// Falls back to default values if environment variables are not set.
fn load_config() -> anyhow::Result<ApiConfig> {
    let config = ApiConfig::from_env().unwrap_or_else(|_| ApiConfig {
        host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
        port: std::env::var("API_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080),
        feed_secret: std::env::var("API_FEED_SECRET")
            .unwrap_or_else(|_| "dev-secret-change-in-production".to_string()),
        feed_enabled: std::env::var("API_FEED_ENABLED")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(true),
        log_level: std::env::var("API_LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string()),
    });
    config.validate()?;
    Ok(config)
}

/// Initializes the tracing subscriber for structured logging.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// This enables graceful shutdown of the server, allowing in-flight
/// requests to complete before the process exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
