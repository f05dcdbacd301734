//! Organization binding types
//!
//! A binding scopes a routing rule to one organization. Bindings are enabled
//! and disabled independently of the rule they reference, which may be bound
//! to other organizations too.

use super::rule::{RoutingRule, RuleId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Binding identifier
pub type BindingId = String;

/// Organization identifier
///
/// Opaque and flat; the organization tree lives outside this crate.
pub type OrganizationId = String;

/// Association of a routing rule with an organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgRoutingBinding {
    pub id: BindingId,
    pub organization_id: OrganizationId,
    pub routing_rule_id: RuleId,
    #[serde(default = "enabled_by_default")]
    pub enable: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn enabled_by_default() -> bool {
    true
}

impl OrgRoutingBinding {
    /// Create an enabled binding with a fresh id
    pub fn new(organization_id: &str, routing_rule_id: &str) -> Self {
        let now = Utc::now();
        OrgRoutingBinding {
            id: uuid::Uuid::now_v7().to_string(),
            organization_id: organization_id.to_string(),
            routing_rule_id: routing_rule_id.to_string(),
            enable: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A binding joined with the rule it references
///
/// This is the shape the conflict detector consumes: the caller fetches an
/// organization's bindings together with their rules before asking for
/// conflicts.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundRule {
    pub binding: OrgRoutingBinding,
    pub rule: RoutingRule,
}

impl BoundRule {
    /// Both the binding and the rule are enabled
    pub fn is_active(&self) -> bool {
        self.binding.enable && self.rule.enable
    }
}
