//! Store abstraction for rules and bindings
//!
//! The backend that owns rules and bindings is outside this crate. This trait
//! is the seam the engine talks through, so the single-threaded
//! [`RuleRegistry`](crate::core::RuleRegistry) and the thread-safe
//! [`AsyncRuleRegistry`](crate::core::AsyncRuleRegistry) can be used
//! interchangeably, and a real API client can be plugged in later.

use crate::types::{
    BindingId, BoundRule, OrgRoutingBinding, OrganizationId, RoutingError, RoutingRule,
};

/// Storage of routing rules and organization bindings
///
/// Reference checks (unknown rule, duplicate binding) are the store's
/// responsibility. Batch operations are all-or-nothing.
pub trait RoutingStore {
    /// Insert a new rule
    fn insert_rule(&mut self, rule: RoutingRule) -> Result<(), RoutingError>;

    /// Replace an existing rule wholesale, returning the previous version
    fn replace_rule(&mut self, rule: RoutingRule) -> Result<RoutingRule, RoutingError>;

    /// Get a rule by id
    fn get_rule(&self, rule_id: &str) -> Option<RoutingRule>;

    /// Toggle a rule's `enable` flag
    fn set_rule_enabled(&mut self, rule_id: &str, enable: bool) -> Result<(), RoutingError>;

    /// Remove a rule that no binding references any more
    fn remove_rule(&mut self, rule_id: &str) -> Result<RoutingRule, RoutingError>;

    /// Insert bindings; rejects the whole batch on an unknown rule, an id
    /// already in use, or an `(organization, rule)` pair bound twice
    fn insert_bindings(&mut self, bindings: Vec<OrgRoutingBinding>) -> Result<(), RoutingError>;

    /// Remove bindings by id; rejects the whole batch on an unknown id
    fn remove_bindings(
        &mut self,
        binding_ids: &[BindingId],
    ) -> Result<Vec<OrgRoutingBinding>, RoutingError>;

    /// Toggle a binding's `enable` flag
    fn set_binding_enabled(&mut self, binding_id: &str, enable: bool) -> Result<(), RoutingError>;

    /// All bindings referencing a rule
    fn bindings_for_rule(&self, rule_id: &str) -> Vec<OrgRoutingBinding>;

    /// All bindings of an organization
    fn bindings_for_organization(&self, organization_id: &str) -> Vec<OrgRoutingBinding>;

    /// Every organization with at least one binding, sorted
    fn organizations(&self) -> Vec<OrganizationId>;

    /// An organization's bindings joined with their rules, ordered by rule
    /// creation time then rule id
    fn bound_rules(&self, organization_id: &str) -> Vec<BoundRule> {
        let mut bound: Vec<BoundRule> = self
            .bindings_for_organization(organization_id)
            .into_iter()
            .filter_map(|binding| {
                self.get_rule(&binding.routing_rule_id)
                    .map(|rule| BoundRule { binding, rule })
            })
            .collect();

        bound.sort_by(|a, b| {
            a.rule
                .created_at
                .cmp(&b.rule.created_at)
                .then_with(|| a.rule.id.cmp(&b.rule.id))
        });
        bound
    }
}
