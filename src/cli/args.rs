use crate::core::{ProcessorConfig, DEFAULT_STORE_TIMEOUT_MS};
use crate::telemetry::TelemetryConfig;
use clap::Parser;
use std::time::Duration;

/// Serve the wallet ledger over HTTP
#[derive(Parser, Debug)]
#[command(name = "wallet-ledger")]
#[command(about = "Wallet ledger service with atomic credits, debits and reversals", long_about = None)]
pub struct CliArgs {
    /// Address to listen on
    #[arg(
        long = "bind",
        env = "LEDGER_BIND",
        value_name = "ADDR",
        default_value = "0.0.0.0:2004",
        help = "Address to listen on"
    )]
    pub bind: String,

    /// Deadline for each store interaction
    #[arg(
        long = "store-timeout-ms",
        env = "LEDGER_STORE_TIMEOUT_MS",
        value_name = "MS",
        help = "Deadline for store interactions in milliseconds (default: 5000)"
    )]
    pub store_timeout_ms: Option<u64>,

    /// Number of runtime worker threads
    #[arg(
        long = "workers",
        env = "LEDGER_WORKERS",
        value_name = "COUNT",
        help = "Number of runtime worker threads (default: CPU cores)"
    )]
    pub workers: Option<usize>,

    /// Log filter used when RUST_LOG is not set
    #[arg(
        long = "log-level",
        env = "LEDGER_LOG_LEVEL",
        value_name = "FILTER",
        default_value = "info"
    )]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long = "json-logs", env = "LEDGER_JSON_LOGS")]
    pub json_logs: bool,
}

impl CliArgs {
    /// Create a ProcessorConfig from CLI arguments
    ///
    /// A zero timeout would fail every request, so it falls back to the
    /// default with a warning.
    pub fn to_processor_config(&self) -> ProcessorConfig {
        let timeout_ms = match self.store_timeout_ms {
            Some(0) => {
                tracing::warn!(
                    default = DEFAULT_STORE_TIMEOUT_MS,
                    "invalid store timeout (0ms), using default"
                );
                DEFAULT_STORE_TIMEOUT_MS
            }
            Some(ms) => ms,
            None => DEFAULT_STORE_TIMEOUT_MS,
        };
        ProcessorConfig {
            store_timeout: Duration::from_millis(timeout_ms),
        }
    }

    /// Number of runtime worker threads, zero falls back to the CPU count
    pub fn worker_threads(&self) -> usize {
        match self.workers {
            Some(0) | None => num_cpus::get(),
            Some(count) => count,
        }
    }

    /// Create a TelemetryConfig from CLI arguments
    pub fn to_telemetry_config(&self) -> TelemetryConfig {
        TelemetryConfig {
            log_level: self.log_level.clone(),
            json_logs: self.json_logs,
        }
    }
}
