//! In-memory rule and binding registry
//!
//! This module provides the `RuleRegistry`, a single-threaded implementation
//! of [`RoutingStore`] backed by `HashMap`s. It stands in for the backend's
//! data store in tests and in the audit CLI's sync strategy.
//!
//! # Referential integrity
//!
//! - a binding can only reference a rule that exists
//! - an organization is bound to a given rule at most once
//! - a rule cannot be removed while bindings still reference it; callers
//!   delete the bindings first (see [`RoutingEngine::delete_rule`])
//!
//! [`RoutingEngine::delete_rule`]: crate::core::RoutingEngine::delete_rule

use crate::core::traits::RoutingStore;
use crate::types::{
    BindingId, OrgRoutingBinding, OrganizationId, RoutingError, RoutingRule, RuleId,
};
use chrono::Utc;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Single-threaded rule and binding store
#[derive(Debug, Default)]
pub struct RuleRegistry {
    /// Map of rule id to rule
    rules: HashMap<RuleId, RoutingRule>,
    /// Map of binding id to binding
    bindings: HashMap<BindingId, OrgRoutingBinding>,
}

impl RuleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        RuleRegistry {
            rules: HashMap::new(),
            bindings: HashMap::new(),
        }
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    fn is_bound(&self, organization_id: &str, rule_id: &str) -> bool {
        self.bindings
            .values()
            .any(|b| b.organization_id == organization_id && b.routing_rule_id == rule_id)
    }
}

impl RoutingStore for RuleRegistry {
    fn insert_rule(&mut self, rule: RoutingRule) -> Result<(), RoutingError> {
        if self.rules.contains_key(&rule.id) {
            return Err(RoutingError::duplicate_rule(&rule.id));
        }
        self.rules.insert(rule.id.clone(), rule);
        Ok(())
    }

    fn replace_rule(&mut self, rule: RoutingRule) -> Result<RoutingRule, RoutingError> {
        let slot = self
            .rules
            .get_mut(&rule.id)
            .ok_or_else(|| RoutingError::rule_not_found(&rule.id))?;
        Ok(std::mem::replace(slot, rule))
    }

    fn get_rule(&self, rule_id: &str) -> Option<RoutingRule> {
        self.rules.get(rule_id).cloned()
    }

    fn set_rule_enabled(&mut self, rule_id: &str, enable: bool) -> Result<(), RoutingError> {
        let rule = self
            .rules
            .get_mut(rule_id)
            .ok_or_else(|| RoutingError::rule_not_found(rule_id))?;
        rule.enable = enable;
        Ok(())
    }

    fn remove_rule(&mut self, rule_id: &str) -> Result<RoutingRule, RoutingError> {
        let remaining = self
            .bindings
            .values()
            .filter(|b| b.routing_rule_id == rule_id)
            .count();
        if remaining > 0 {
            return Err(RoutingError::rule_in_use(rule_id, remaining));
        }
        self.rules
            .remove(rule_id)
            .ok_or_else(|| RoutingError::rule_not_found(rule_id))
    }

    fn insert_bindings(&mut self, bindings: Vec<OrgRoutingBinding>) -> Result<(), RoutingError> {
        // Check the whole batch before touching the map
        let mut pairs: HashSet<(&str, &str)> = HashSet::new();
        let mut ids: HashSet<&str> = HashSet::new();
        for binding in &bindings {
            if !self.rules.contains_key(&binding.routing_rule_id) {
                return Err(RoutingError::rule_not_found(&binding.routing_rule_id));
            }
            if self.bindings.contains_key(&binding.id) || !ids.insert(binding.id.as_str()) {
                return Err(RoutingError::duplicate_binding_id(&binding.id));
            }
            let pair = (
                binding.organization_id.as_str(),
                binding.routing_rule_id.as_str(),
            );
            if self.is_bound(pair.0, pair.1) || !pairs.insert(pair) {
                return Err(RoutingError::duplicate_binding(pair.0, pair.1));
            }
        }

        for binding in bindings {
            self.bindings.insert(binding.id.clone(), binding);
        }
        Ok(())
    }

    fn remove_bindings(
        &mut self,
        binding_ids: &[BindingId],
    ) -> Result<Vec<OrgRoutingBinding>, RoutingError> {
        if let Some(missing) = binding_ids
            .iter()
            .find(|id| !self.bindings.contains_key(id.as_str()))
        {
            return Err(RoutingError::binding_not_found(missing));
        }

        Ok(binding_ids
            .iter()
            .filter_map(|id| self.bindings.remove(id))
            .collect())
    }

    fn set_binding_enabled(&mut self, binding_id: &str, enable: bool) -> Result<(), RoutingError> {
        let binding = self
            .bindings
            .get_mut(binding_id)
            .ok_or_else(|| RoutingError::binding_not_found(binding_id))?;
        binding.enable = enable;
        binding.updated_at = Utc::now();
        Ok(())
    }

    fn bindings_for_rule(&self, rule_id: &str) -> Vec<OrgRoutingBinding> {
        let mut bindings: Vec<OrgRoutingBinding> = self
            .bindings
            .values()
            .filter(|b| b.routing_rule_id == rule_id)
            .cloned()
            .collect();
        bindings.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        bindings
    }

    fn bindings_for_organization(&self, organization_id: &str) -> Vec<OrgRoutingBinding> {
        let mut bindings: Vec<OrgRoutingBinding> = self
            .bindings
            .values()
            .filter(|b| b.organization_id == organization_id)
            .cloned()
            .collect();
        bindings.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        bindings
    }

    fn organizations(&self) -> Vec<OrganizationId> {
        self.bindings
            .values()
            .map(|b| b.organization_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PaymentChannel, PaymentMethod, Percentage, RoutingTier, TransactionType};

    fn rule(id: &str) -> RoutingRule {
        RoutingRule {
            id: id.to_string(),
            title: format!("Rule {}", id),
            description: None,
            payment_method: PaymentMethod::Momo,
            transaction_type: TransactionType::Deposit,
            account_type: None,
            amount_range: None,
            tiers: vec![RoutingTier::new(None, Percentage::single(PaymentChannel::MomoDirect)).unwrap()],
            enable: true,
            created_at: Utc::now(),
        }
    }

    fn binding(id: &str, org: &str, rule_id: &str) -> OrgRoutingBinding {
        let mut binding = OrgRoutingBinding::new(org, rule_id);
        binding.id = id.to_string();
        binding
    }

    #[test]
    fn test_insert_and_get_rule() {
        let mut registry = RuleRegistry::new();
        registry.insert_rule(rule("r-1")).unwrap();
        assert_eq!(registry.get_rule("r-1").unwrap().title, "Rule r-1");
        assert!(registry.get_rule("r-2").is_none());
    }

    #[test]
    fn test_duplicate_rule_rejected() {
        let mut registry = RuleRegistry::new();
        registry.insert_rule(rule("r-1")).unwrap();
        assert_eq!(
            registry.insert_rule(rule("r-1")).unwrap_err(),
            RoutingError::duplicate_rule("r-1")
        );
    }

    #[test]
    fn test_replace_rule_returns_previous() {
        let mut registry = RuleRegistry::new();
        registry.insert_rule(rule("r-1")).unwrap();

        let mut updated = rule("r-1");
        updated.title = "Renamed".to_string();
        let previous = registry.replace_rule(updated).unwrap();

        assert_eq!(previous.title, "Rule r-1");
        assert_eq!(registry.get_rule("r-1").unwrap().title, "Renamed");
        assert!(registry.replace_rule(rule("missing")).is_err());
    }

    #[test]
    fn test_set_rule_enabled() {
        let mut registry = RuleRegistry::new();
        registry.insert_rule(rule("r-1")).unwrap();
        registry.set_rule_enabled("r-1", false).unwrap();
        assert!(!registry.get_rule("r-1").unwrap().enable);
        assert!(registry.set_rule_enabled("nope", true).is_err());
    }

    #[test]
    fn test_binding_to_unknown_rule_rejects_batch() {
        let mut registry = RuleRegistry::new();
        registry.insert_rule(rule("r-1")).unwrap();

        let result = registry.insert_bindings(vec![
            binding("b-1", "org-1", "r-1"),
            binding("b-2", "org-1", "ghost"),
        ]);
        assert_eq!(result.unwrap_err(), RoutingError::rule_not_found("ghost"));
        assert_eq!(registry.binding_count(), 0);
    }

    #[test]
    fn test_duplicate_pair_rejected() {
        let mut registry = RuleRegistry::new();
        registry.insert_rule(rule("r-1")).unwrap();
        registry
            .insert_bindings(vec![binding("b-1", "org-1", "r-1")])
            .unwrap();

        let err = registry
            .insert_bindings(vec![binding("b-2", "org-1", "r-1")])
            .unwrap_err();
        assert_eq!(err, RoutingError::duplicate_binding("org-1", "r-1"));

        // same pair twice inside one batch
        let err = registry
            .insert_bindings(vec![
                binding("b-3", "org-2", "r-1"),
                binding("b-4", "org-2", "r-1"),
            ])
            .unwrap_err();
        assert_eq!(err, RoutingError::duplicate_binding("org-2", "r-1"));
        assert_eq!(registry.binding_count(), 1);
    }

    #[test]
    fn test_remove_bindings_all_or_nothing() {
        let mut registry = RuleRegistry::new();
        registry.insert_rule(rule("r-1")).unwrap();
        registry
            .insert_bindings(vec![binding("b-1", "org-1", "r-1"), binding("b-2", "org-2", "r-1")])
            .unwrap();

        let err = registry
            .remove_bindings(&["b-1".to_string(), "b-9".to_string()])
            .unwrap_err();
        assert_eq!(err, RoutingError::binding_not_found("b-9"));
        assert_eq!(registry.binding_count(), 2);

        let removed = registry
            .remove_bindings(&["b-1".to_string(), "b-2".to_string()])
            .unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(registry.binding_count(), 0);
    }

    #[test]
    fn test_remove_rule_requires_no_bindings() {
        let mut registry = RuleRegistry::new();
        registry.insert_rule(rule("r-1")).unwrap();
        registry
            .insert_bindings(vec![binding("b-1", "org-1", "r-1")])
            .unwrap();

        assert_eq!(
            registry.remove_rule("r-1").unwrap_err(),
            RoutingError::rule_in_use("r-1", 1)
        );

        registry.remove_bindings(&["b-1".to_string()]).unwrap();
        assert_eq!(registry.remove_rule("r-1").unwrap().id, "r-1");
        assert_eq!(registry.rule_count(), 0);
    }

    #[test]
    fn test_bound_rules_and_organizations() {
        let mut registry = RuleRegistry::new();
        registry.insert_rule(rule("r-1")).unwrap();
        registry.insert_rule(rule("r-2")).unwrap();
        registry
            .insert_bindings(vec![
                binding("b-1", "org-b", "r-1"),
                binding("b-2", "org-a", "r-1"),
                binding("b-3", "org-a", "r-2"),
            ])
            .unwrap();

        assert_eq!(registry.organizations(), vec!["org-a", "org-b"]);
        let bound = registry.bound_rules("org-a");
        assert_eq!(bound.len(), 2);
        assert!(bound.iter().all(|b| b.binding.organization_id == "org-a"));
        assert_eq!(registry.bindings_for_rule("r-1").len(), 2);
    }

    #[test]
    fn test_set_binding_enabled() {
        let mut registry = RuleRegistry::new();
        registry.insert_rule(rule("r-1")).unwrap();
        registry
            .insert_bindings(vec![binding("b-1", "org-1", "r-1")])
            .unwrap();

        registry.set_binding_enabled("b-1", false).unwrap();
        assert!(!registry.bindings_for_rule("r-1")[0].enable);
        assert!(registry.get_rule("r-1").unwrap().enable);
    }
}
