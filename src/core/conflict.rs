//! Conflict detection between rules bound to the same organization
//!
//! Two enabled rules bound to one organization conflict when a single
//! transaction could match both of them:
//!
//! 1. same payment method
//! 2. same transaction type
//! 3. compatible account types (either side unrestricted, or both equal)
//! 4. overlapping amount ranges (inclusive, a missing range is unbounded)
//!
//! Conflicts are advisory. The detector reports them so an operator can be
//! warned; it never blocks a binding.
//!
//! # Priority policy
//!
//! Tiers carry a priority used by the external runtime for fallback within a
//! rule. Whether two overlapping rules should still be reported when their
//! tier priorities differ is a policy decision, exposed as
//! [`PriorityPolicy`]. The default, [`PriorityPolicy::WholeRule`], ignores
//! priorities entirely.

use crate::types::{ranges_overlap, AccountType, BoundRule, OrganizationId, RoutingRule, RuleId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// How tier priorities affect conflict detection
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum PriorityPolicy {
    /// Compare whole rules; tier priorities never suppress a conflict
    #[default]
    WholeRule,
    /// Report a pair only when the rules share at least one effective tier
    /// priority (a tier without an explicit priority uses its 1-based position)
    SharedTierPriority,
}

/// One rule that could match the same transaction as another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub organization_id: OrganizationId,
    /// The rule being checked
    pub rule_id: RuleId,
    pub rule_title: String,
    /// The already-bound rule it overlaps with
    pub conflicting_rule_id: RuleId,
    pub conflicting_rule_title: String,
    /// Binding through which the conflicting rule applies to the organization
    pub binding_id: String,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rule {} ({}) conflicts with rule {} ({}) for organization {}",
            self.rule_id,
            self.rule_title,
            self.conflicting_rule_id,
            self.conflicting_rule_title,
            self.organization_id
        )
    }
}

/// An absent account type matches every account type
pub fn account_types_compatible(a: Option<AccountType>, b: Option<AccountType>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

/// Detects overlapping rule applicability
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConflictDetector {
    policy: PriorityPolicy,
}

impl ConflictDetector {
    pub fn new(policy: PriorityPolicy) -> Self {
        ConflictDetector { policy }
    }

    pub fn policy(&self) -> PriorityPolicy {
        self.policy
    }

    /// Whether `a` and `b` could match the same transaction
    ///
    /// Symmetric. A rule never conflicts with itself (compared by id), and
    /// the `enable` flags are not consulted here; callers filter inactive
    /// rules before comparing.
    pub fn rules_conflict(&self, a: &RoutingRule, b: &RoutingRule) -> bool {
        if a.id == b.id {
            return false;
        }

        let overlapping = a.payment_method == b.payment_method
            && a.transaction_type == b.transaction_type
            && account_types_compatible(a.account_type, b.account_type)
            && ranges_overlap(a.amount_range.as_ref(), b.amount_range.as_ref());

        overlapping
            && match self.policy {
                PriorityPolicy::WholeRule => true,
                PriorityPolicy::SharedTierPriority => {
                    let priorities: HashSet<u32> = a.effective_priorities().collect();
                    b.effective_priorities().any(|p| priorities.contains(&p))
                }
            }
    }

    /// Rules bound to `organization_id` that conflict with `target`
    ///
    /// `bound` is the organization's bindings joined with their rules. Entries
    /// are skipped when the binding or its rule is disabled, when they belong
    /// to another organization, or when they are `target` itself. A disabled
    /// target matches nothing and so has no conflicts.
    ///
    /// # Returns
    ///
    /// Conflicts ordered by the conflicting rule's creation time (then id),
    /// one per conflicting rule.
    pub fn find_conflicts(
        &self,
        organization_id: &str,
        target: &RoutingRule,
        bound: &[BoundRule],
    ) -> Vec<Conflict> {
        if !target.enable {
            return Vec::new();
        }

        active_for(organization_id, bound)
            .into_iter()
            .filter(|entry| self.rules_conflict(target, &entry.rule))
            .map(|entry| conflict_between(organization_id, target, entry))
            .collect()
    }

    /// Every conflicting pair among an organization's active bindings
    ///
    /// Each unordered pair is reported once, with the earlier-created rule as
    /// `rule_id` and the later one as `conflicting_rule_id`.
    pub fn audit_organization(&self, organization_id: &str, bound: &[BoundRule]) -> Vec<Conflict> {
        let active = active_for(organization_id, bound);
        let mut conflicts = Vec::new();

        for (i, first) in active.iter().enumerate() {
            for second in &active[i + 1..] {
                if self.rules_conflict(&first.rule, &second.rule) {
                    conflicts.push(conflict_between(organization_id, &first.rule, second));
                }
            }
        }

        if !conflicts.is_empty() {
            tracing::debug!(
                organization = organization_id,
                conflicts = conflicts.len(),
                "organization has overlapping routing rules"
            );
        }

        conflicts
    }
}

/// Active entries of one organization, in creation order, one per rule
fn active_for<'a>(organization_id: &str, bound: &'a [BoundRule]) -> Vec<&'a BoundRule> {
    let mut active: Vec<&BoundRule> = bound
        .iter()
        .filter(|entry| entry.binding.organization_id == organization_id && entry.is_active())
        .collect();

    active.sort_by(|a, b| {
        a.rule
            .created_at
            .cmp(&b.rule.created_at)
            .then_with(|| a.rule.id.cmp(&b.rule.id))
    });

    let mut seen: HashSet<&str> = HashSet::new();
    active.retain(|entry| seen.insert(entry.rule.id.as_str()));
    active
}

fn conflict_between(organization_id: &str, rule: &RoutingRule, other: &BoundRule) -> Conflict {
    Conflict {
        organization_id: organization_id.to_string(),
        rule_id: rule.id.clone(),
        rule_title: rule.title.clone(),
        conflicting_rule_id: other.rule.id.clone(),
        conflicting_rule_title: other.rule.title.clone(),
        binding_id: other.binding.id.clone(),
    }
}
