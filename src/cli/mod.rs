// CLI module
// Command-line interface, argument parsing and log setup

mod args;

pub use args::{AuditArgs, StrategyType};

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Parse command-line arguments using clap
///
/// Flags not given on the command line are read from `ROUTING_AUDIT_*`
/// environment variables. On invalid arguments or `--help`, clap prints
/// the message and exits the process.
pub fn parse_args() -> AuditArgs {
    AuditArgs::parse()
}

/// Install the global tracing subscriber
///
/// Filtering follows `RUST_LOG`, defaulting to `info` for the library and the binary.
/// Logs go to stderr so stdout carries only the report.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "routing_rules_engine=info,routing_audit=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
