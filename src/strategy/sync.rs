//! Synchronous audit strategy
//!
//! This module provides a sequential implementation of the AuditStrategy
//! trait. It loads the snapshot into a single-threaded `RuleRegistry` and
//! audits one organization after another through a `RoutingEngine`.
//!
//! # Design
//!
//! The SyncAuditStrategy focuses on orchestration, delegating:
//! - File reading and parsing to `read_snapshot`
//! - Validation and storage to `load_snapshot`
//! - Conflict detection to `RoutingEngine::audit`
//! - CSV output to `report::write_report_csv`

use crate::core::{load_snapshot, ConflictDetector, PriorityPolicy, RoutingEngine, RuleRegistry};
use crate::core::traits::RoutingStore;
use crate::io::report::{report_rows, write_report_csv};
use crate::io::snapshot_reader::read_snapshot;
use crate::strategy::AuditStrategy;
use crate::types::RoutingError;
use std::io::Write;
use std::path::Path;

/// Synchronous audit strategy
///
/// # Examples
///
/// ```no_run
/// use routing_rules_engine::core::PriorityPolicy;
/// use routing_rules_engine::strategy::{AuditStrategy, SyncAuditStrategy};
/// use std::path::Path;
/// use std::io;
///
/// let strategy = SyncAuditStrategy::new(PriorityPolicy::WholeRule);
/// let mut output = io::stdout();
///
/// strategy.process(Path::new("snapshot.json"), &mut output)
///     .expect("Audit failed");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncAuditStrategy {
    detector: ConflictDetector,
}

impl SyncAuditStrategy {
    pub fn new(priority_policy: PriorityPolicy) -> Self {
        Self {
            detector: ConflictDetector::new(priority_policy),
        }
    }
}

impl AuditStrategy for SyncAuditStrategy {
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), RoutingError> {
        let snapshot = read_snapshot(input_path)?;

        let mut registry = RuleRegistry::new();
        let summary = load_snapshot(&mut registry, snapshot);

        let engine = RoutingEngine::new(registry, self.detector);
        let conflicts: Vec<_> = engine
            .store()
            .organizations()
            .iter()
            .flat_map(|organization_id| engine.audit(organization_id))
            .collect();

        tracing::info!(conflicts = conflicts.len(), "audit finished");

        write_report_csv(&report_rows(&summary, &conflicts), output)
    }
}
