//! Routing rule audit CLI
//!
//! Command-line interface for auditing an exported snapshot of routing rules
//! and organization bindings.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- snapshot.json > report.csv
//! cargo run -- --strategy sync snapshot.json > report.csv
//! cargo run -- --strategy async --max-concurrent 8 snapshot.json > report.csv
//! cargo run -- --priority-policy shared-tier-priority snapshot.json > report.csv
//! ```
//!
//! The program validates every rule in the snapshot, loads the valid ones and
//! their bindings, audits every organization for conflicting rules, and writes
//! a CSV report to stdout. Settings can also come from `ROUTING_AUDIT_*`
//! variables in the environment or a `.env` file.
//!
//! # Exit Codes
//!
//! - 0: Success, whether or not anything was reported
//! - 1: Error (missing arguments, file not found, malformed snapshot, etc.)

use routing_rules_engine::cli;
use routing_rules_engine::strategy;
use std::process;

fn main() {
    dotenvy::dotenv().ok();
    cli::init_tracing();

    let args = cli::parse_args();
    let strategy = strategy::create_strategy(args.strategy, args.to_audit_config());

    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.input_file, &mut output) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}
