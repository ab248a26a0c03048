//! Wallet Ledger server
//!
//! Serves the wallet ledger over HTTP.
//!
//! # Usage
//!
//! ```bash
//! cargo run
//! cargo run -- --bind 127.0.0.1:8080 --store-timeout-ms 2000
//! LEDGER_JSON_LOGS=true RUST_LOG=wallet_ledger=debug cargo run
//! ```
//!
//! # Exit Codes
//!
//! - 0: Clean shutdown (Ctrl-C)
//! - 1: Error (invalid arguments, address in use, etc.)

use anyhow::Context;
use std::sync::Arc;
use wallet_ledger::api::{self, AppState};
use wallet_ledger::cli::{self, CliArgs};
use wallet_ledger::core::{LedgerService, MemoryLedgerStore};
use wallet_ledger::telemetry;

fn main() -> anyhow::Result<()> {
    let args = cli::parse_args();

    telemetry::init_tracing(&args.to_telemetry_config()).context("failed to initialize tracing")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(args.worker_threads())
        .enable_all()
        .build()
        .context("failed to build runtime")?;

    runtime.block_on(serve(args))
}

async fn serve(args: CliArgs) -> anyhow::Result<()> {
    let store = Arc::new(MemoryLedgerStore::new());
    let service = LedgerService::new(store, args.to_processor_config());
    let app = api::create_router(AppState::new(service));

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    tracing::info!(addr = %listener.local_addr()?, "wallet ledger listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("wallet ledger stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
