//! Asynchronous audit strategy
//!
//! This module provides a concurrent implementation of the AuditStrategy
//! trait. Organizations are independent of each other, so after the snapshot
//! is loaded they are audited in parallel on a tokio multi-threaded runtime.
//!
//! # Architecture
//!
//! ```text
//! AsyncAuditStrategy
//!     ├── AuditConfig (max_concurrent, priority_policy)
//!     ├── read_snapshot_async (tokio::fs)
//!     ├── AsyncRuleRegistry (DashMap-backed store)
//!     └── AuditProcessor (one task per organization, bounded)
//! ```

use crate::core::r#async::{AsyncRuleRegistry, AuditProcessor};
use crate::core::{load_snapshot, ConflictDetector, PriorityPolicy};
use crate::io::async_reader::read_snapshot_async;
use crate::io::report::{report_rows, write_report_csv};
use crate::strategy::AuditStrategy;
use crate::types::RoutingError;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Configuration for auditing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditConfig {
    /// Maximum number of organizations audited concurrently
    pub max_concurrent: usize,
    /// How tier priorities affect conflict detection
    pub priority_policy: PriorityPolicy,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            max_concurrent: num_cpus::get(),
            priority_policy: PriorityPolicy::default(),
        }
    }
}

impl AuditConfig {
    /// Create a new AuditConfig with custom values
    pub fn new(max_concurrent: usize, priority_policy: PriorityPolicy) -> Self {
        let default = Self::default();

        let max_concurrent = if max_concurrent == 0 {
            tracing::warn!(
                "invalid max_concurrent ({}), using default ({})",
                max_concurrent,
                default.max_concurrent
            );
            default.max_concurrent
        } else {
            max_concurrent
        };

        Self {
            max_concurrent,
            priority_policy,
        }
    }
}

/// Asynchronous audit strategy
///
/// # Configuration
///
/// The strategy accepts an AuditConfig with:
/// - `max_concurrent`: organizations in flight and worker threads (default: CPU cores)
/// - `priority_policy`: see [`PriorityPolicy`]
#[derive(Debug, Clone)]
pub struct AsyncAuditStrategy {
    config: AuditConfig,
}

impl AsyncAuditStrategy {
    pub fn new(config: AuditConfig) -> Self {
        Self { config }
    }
}

impl AuditStrategy for AsyncAuditStrategy {
    /// Run the audit pipeline on a dedicated runtime
    ///
    /// 1. Reads the snapshot with `tokio::fs`
    /// 2. Loads it into an `AsyncRuleRegistry`
    /// 3. Audits every organization through an `AuditProcessor`
    /// 4. Writes the report once all audits are done
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), RoutingError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent)
            .build()
            .map_err(|e| RoutingError::IoError {
                message: format!("Failed to create tokio runtime: {}", e),
            })?;

        let (summary, audits) = runtime.block_on(async {
            let snapshot = read_snapshot_async(input_path).await?;

            let mut registry = AsyncRuleRegistry::new();
            let summary = load_snapshot(&mut registry, snapshot);

            let processor = AuditProcessor::new(
                Arc::new(registry),
                ConflictDetector::new(self.config.priority_policy),
            );
            let audits = processor.audit_all(self.config.max_concurrent).await;

            Ok::<_, RoutingError>((summary, audits))
        })?;

        let conflicts: Vec<_> = audits
            .into_iter()
            .flat_map(|audit| audit.conflicts)
            .collect();

        tracing::info!(conflicts = conflicts.len(), "audit finished");

        write_report_csv(&report_rows(&summary, &conflicts), output)
    }
}
