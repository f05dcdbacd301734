//! Organization-partitioned conflict auditing
//!
//! This module provides the `AuditProcessor`, which audits every organization
//! in a shared registry for conflicting bindings. Each organization is an
//! independent unit of work: its audit reads only that organization's
//! bindings, so organizations are audited concurrently on tokio worker
//! threads with a bounded number in flight.
//!
//! # Architecture
//!
//! ```text
//! AuditProcessor
//!     ├── Arc<AsyncRuleRegistry>  (shared, read-only during an audit)
//!     └── ConflictDetector        (pure, Copy)
//! ```

use std::sync::Arc;

use futures::stream::{self, StreamExt};

use super::AsyncRuleRegistry;
use crate::core::conflict::{Conflict, ConflictDetector};
use crate::core::traits::RoutingStore;
use crate::types::OrganizationId;

/// Conflicts found for one organization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationAudit {
    pub organization_id: OrganizationId,
    pub conflicts: Vec<Conflict>,
}

/// Concurrent per-organization auditor
#[derive(Debug, Clone)]
pub struct AuditProcessor {
    registry: Arc<AsyncRuleRegistry>,
    detector: ConflictDetector,
}

impl AuditProcessor {
    pub fn new(registry: Arc<AsyncRuleRegistry>, detector: ConflictDetector) -> Self {
        Self { registry, detector }
    }

    /// Audit a single organization
    pub fn audit_organization(&self, organization_id: &str) -> OrganizationAudit {
        let bound = self.registry.bound_rules(organization_id);
        OrganizationAudit {
            organization_id: organization_id.to_string(),
            conflicts: self.detector.audit_organization(organization_id, &bound),
        }
    }

    /// Audit every organization with at least one binding
    ///
    /// At most `max_concurrent` organizations are audited at once. Results
    /// are sorted by organization id regardless of completion order. A task
    /// that panics is logged and its organization is left out.
    pub async fn audit_all(&self, max_concurrent: usize) -> Vec<OrganizationAudit> {
        let organizations = self.registry.organizations();

        let mut tasks = stream::iter(organizations)
            .map(|organization_id| {
                let processor = self.clone();
                tokio::spawn(async move { processor.audit_organization(&organization_id) })
            })
            .buffer_unordered(max_concurrent.max(1));

        let mut audits = Vec::new();
        while let Some(joined) = tasks.next().await {
            match joined {
                Ok(audit) => audits.push(audit),
                Err(e) => tracing::error!(error = %e, "organization audit task failed"),
            }
        }

        audits.sort_by(|a, b| a.organization_id.cmp(&b.organization_id));
        audits
    }
}
