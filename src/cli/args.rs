use crate::core::PriorityPolicy;
use crate::strategy::AuditConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Audit a snapshot of routing rules and organization bindings
#[derive(Parser, Debug)]
#[command(name = "routing-audit")]
#[command(
    about = "Validate routing rules and report conflicting organization bindings",
    long_about = None
)]
pub struct AuditArgs {
    /// Input JSON snapshot containing rules and bindings
    #[arg(value_name = "SNAPSHOT", help = "Path to the JSON snapshot file")]
    pub input_file: PathBuf,

    /// Processing strategy to use for auditing
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        env = "ROUTING_AUDIT_STRATEGY",
        default_value = "async",
        help = "Audit strategy: 'sync' for sequential or 'async' for concurrent"
    )]
    pub strategy: StrategyType,

    /// Maximum number of organizations audited concurrently (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        env = "ROUTING_AUDIT_MAX_CONCURRENT",
        help = "Maximum number of organizations audited concurrently (default: CPU cores)"
    )]
    pub max_concurrent: Option<usize>,

    /// Whether differing tier priorities suppress a conflict
    #[arg(
        long = "priority-policy",
        value_name = "POLICY",
        env = "ROUTING_AUDIT_PRIORITY_POLICY",
        default_value = "whole-rule",
        help = "'whole-rule' ignores tier priorities, 'shared-tier-priority' requires a shared one"
    )]
    pub priority_policy: PriorityPolicy,
}

/// Available audit strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl AuditArgs {
    /// Create an AuditConfig from CLI arguments
    ///
    /// Falls back to defaults for anything not given; a zero concurrency
    /// limit is replaced with the default and logged.
    pub fn to_audit_config(&self) -> AuditConfig {
        match self.max_concurrent {
            Some(max_concurrent) => AuditConfig::new(max_concurrent, self.priority_policy),
            None => AuditConfig {
                priority_policy: self.priority_policy,
                ..AuditConfig::default()
            },
        }
    }
}
