// CLI module
// Command-line and environment configuration

mod args;

pub use crate::core::DEFAULT_STORE_TIMEOUT_MS;
pub use args::CliArgs;

use clap::Parser;

/// Parse command-line arguments using clap
///
/// Every option can also be set through its `LEDGER_*` environment variable.
/// If parsing fails (invalid arguments or --help), clap displays an error
/// message or help text and exits the process.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}
