//! Processing strategy module for snapshot auditing
//!
//! This module defines the Strategy pattern for the complete audit pipeline:
//! reading a snapshot, loading it into a store, auditing every organization
//! for conflicts and writing the CSV report. Different implementations
//! (sequential, concurrent) can be selected at runtime.

use crate::cli::StrategyType;
use crate::types::RoutingError;
use std::io::Write;
use std::path::Path;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncAuditStrategy, AuditConfig};
pub use sync::SyncAuditStrategy;

/// Audit strategy trait for complete snapshot audit pipelines
pub trait AuditStrategy: Send + Sync {
    /// Audit the snapshot at `input_path` and write the report to `output`
    ///
    /// # Arguments
    ///
    /// * `input_path` - Path to the JSON snapshot of rules and bindings
    /// * `output` - Writer for the CSV report
    ///
    /// # Returns
    ///
    /// * `Ok(())` once the report is written, whatever it contains
    /// * `Err(RoutingError)` if a fatal error occurred
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The snapshot file is missing or unreadable
    /// - The snapshot is not valid JSON of the expected shape
    /// - The report cannot be written
    ///
    /// Invalid rules, rejected bindings and conflicts are findings, not
    /// errors: they are written to the report and processing continues.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), RoutingError>;
}

/// Create an audit strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - Sequential or concurrent auditing
/// * `config` - Priority policy for both, concurrency limit for async
///
/// # Returns
///
/// A boxed trait object implementing the AuditStrategy trait
pub fn create_strategy(strategy_type: StrategyType, config: AuditConfig) -> Box<dyn AuditStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncAuditStrategy::new(config.priority_policy)),
        StrategyType::Async => Box::new(AsyncAuditStrategy::new(config)),
    }
}
