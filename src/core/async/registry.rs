//! Thread-safe rule and binding registry
//!
//! This module provides the `AsyncRuleRegistry`, a concurrent implementation
//! of [`RoutingStore`] for callers that share one store across threads, such
//! as request handlers in a server or the audit CLI's async strategy.
//!
//! # Design
//!
//! Rules and bindings live in `DashMap`s, so single-entity reads and toggles
//! on different entries never block each other. Operations that must check
//! several entries before writing (batch binding inserts and removals, rule
//! removal) take a registry-wide write guard so their all-or-nothing
//! semantics hold under concurrent writers.

use crate::core::traits::RoutingStore;
use crate::types::{
    BindingId, OrgRoutingBinding, OrganizationId, RoutingError, RoutingRule, RuleId,
};
use chrono::Utc;
use dashmap::DashMap;
use std::collections::{BTreeSet, HashSet};
use std::sync::{Mutex, MutexGuard};

/// Thread-safe rule and binding store
#[derive(Debug, Default)]
pub struct AsyncRuleRegistry {
    /// Concurrent map of rule id to rule
    rules: DashMap<RuleId, RoutingRule>,
    /// Concurrent map of binding id to binding
    bindings: DashMap<BindingId, OrgRoutingBinding>,
    /// Serializes multi-entry writes
    write_guard: Mutex<()>,
}

impl AsyncRuleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            rules: DashMap::new(),
            bindings: DashMap::new(),
            write_guard: Mutex::new(()),
        }
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        // The guarded data is `()`, so a poisoned lock carries no broken state
        self.write_guard
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Insert a new rule (thread-safe)
    pub fn insert_rule(&self, rule: RoutingRule) -> Result<(), RoutingError> {
        let _guard = self.lock_writes();

        if self.rules.contains_key(&rule.id) {
            return Err(RoutingError::duplicate_rule(&rule.id));
        }
        self.rules.insert(rule.id.clone(), rule);
        Ok(())
    }

    /// Replace an existing rule, returning the previous version (thread-safe)
    pub fn replace_rule(&self, rule: RoutingRule) -> Result<RoutingRule, RoutingError> {
        let mut entry = self
            .rules
            .get_mut(&rule.id)
            .ok_or_else(|| RoutingError::rule_not_found(&rule.id))?;
        Ok(std::mem::replace(entry.value_mut(), rule))
    }

    /// Get a rule by id; the rule is cloned so no lock outlives the call
    pub fn get_rule(&self, rule_id: &str) -> Option<RoutingRule> {
        self.rules.get(rule_id).map(|entry| entry.value().clone())
    }

    pub fn set_rule_enabled(&self, rule_id: &str, enable: bool) -> Result<(), RoutingError> {
        let mut entry = self
            .rules
            .get_mut(rule_id)
            .ok_or_else(|| RoutingError::rule_not_found(rule_id))?;
        entry.value_mut().enable = enable;
        Ok(())
    }

    /// Remove a rule no binding references any more
    pub fn remove_rule(&self, rule_id: &str) -> Result<RoutingRule, RoutingError> {
        let _guard = self.lock_writes();

        let remaining = self
            .bindings
            .iter()
            .filter(|entry| entry.value().routing_rule_id == rule_id)
            .count();
        if remaining > 0 {
            return Err(RoutingError::rule_in_use(rule_id, remaining));
        }

        self.rules
            .remove(rule_id)
            .map(|(_, rule)| rule)
            .ok_or_else(|| RoutingError::rule_not_found(rule_id))
    }

    /// Insert a batch of bindings, all or nothing
    pub fn insert_bindings(&self, bindings: Vec<OrgRoutingBinding>) -> Result<(), RoutingError> {
        let _guard = self.lock_writes();

        let existing: HashSet<(OrganizationId, RuleId)> = self
            .bindings
            .iter()
            .map(|entry| {
                let binding = entry.value();
                (
                    binding.organization_id.clone(),
                    binding.routing_rule_id.clone(),
                )
            })
            .collect();

        let mut pairs: HashSet<(&str, &str)> = HashSet::new();
        let mut ids: HashSet<&str> = HashSet::new();
        for binding in &bindings {
            if !self.rules.contains_key(&binding.routing_rule_id) {
                return Err(RoutingError::rule_not_found(&binding.routing_rule_id));
            }
            if self.bindings.contains_key(&binding.id) || !ids.insert(binding.id.as_str()) {
                return Err(RoutingError::duplicate_binding_id(&binding.id));
            }
            let key = (
                binding.organization_id.clone(),
                binding.routing_rule_id.clone(),
            );
            let pair = (
                binding.organization_id.as_str(),
                binding.routing_rule_id.as_str(),
            );
            if existing.contains(&key) || !pairs.insert(pair) {
                return Err(RoutingError::duplicate_binding(pair.0, pair.1));
            }
        }

        for binding in bindings {
            self.bindings.insert(binding.id.clone(), binding);
        }
        Ok(())
    }

    /// Remove a batch of bindings, all or nothing
    pub fn remove_bindings(
        &self,
        binding_ids: &[BindingId],
    ) -> Result<Vec<OrgRoutingBinding>, RoutingError> {
        let _guard = self.lock_writes();

        if let Some(missing) = binding_ids
            .iter()
            .find(|id| !self.bindings.contains_key(id.as_str()))
        {
            return Err(RoutingError::binding_not_found(missing));
        }

        Ok(binding_ids
            .iter()
            .filter_map(|id| self.bindings.remove(id).map(|(_, binding)| binding))
            .collect())
    }

    pub fn set_binding_enabled(&self, binding_id: &str, enable: bool) -> Result<(), RoutingError> {
        let mut entry = self
            .bindings
            .get_mut(binding_id)
            .ok_or_else(|| RoutingError::binding_not_found(binding_id))?;
        let binding = entry.value_mut();
        binding.enable = enable;
        binding.updated_at = Utc::now();
        Ok(())
    }

    fn collect_bindings<F>(&self, predicate: F) -> Vec<OrgRoutingBinding>
    where
        F: Fn(&OrgRoutingBinding) -> bool,
    {
        let mut bindings: Vec<OrgRoutingBinding> = self
            .bindings
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        bindings.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        bindings
    }

    pub fn bindings_for_rule(&self, rule_id: &str) -> Vec<OrgRoutingBinding> {
        self.collect_bindings(|b| b.routing_rule_id == rule_id)
    }

    pub fn bindings_for_organization(&self, organization_id: &str) -> Vec<OrgRoutingBinding> {
        self.collect_bindings(|b| b.organization_id == organization_id)
    }

    pub fn organizations(&self) -> Vec<OrganizationId> {
        self.bindings
            .iter()
            .map(|entry| entry.value().organization_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl RoutingStore for AsyncRuleRegistry {
    fn insert_rule(&mut self, rule: RoutingRule) -> Result<(), RoutingError> {
        AsyncRuleRegistry::insert_rule(self, rule)
    }

    fn replace_rule(&mut self, rule: RoutingRule) -> Result<RoutingRule, RoutingError> {
        AsyncRuleRegistry::replace_rule(self, rule)
    }

    fn get_rule(&self, rule_id: &str) -> Option<RoutingRule> {
        AsyncRuleRegistry::get_rule(self, rule_id)
    }

    fn set_rule_enabled(&mut self, rule_id: &str, enable: bool) -> Result<(), RoutingError> {
        AsyncRuleRegistry::set_rule_enabled(self, rule_id, enable)
    }

    fn remove_rule(&mut self, rule_id: &str) -> Result<RoutingRule, RoutingError> {
        AsyncRuleRegistry::remove_rule(self, rule_id)
    }

    fn insert_bindings(&mut self, bindings: Vec<OrgRoutingBinding>) -> Result<(), RoutingError> {
        AsyncRuleRegistry::insert_bindings(self, bindings)
    }

    fn remove_bindings(
        &mut self,
        binding_ids: &[BindingId],
    ) -> Result<Vec<OrgRoutingBinding>, RoutingError> {
        AsyncRuleRegistry::remove_bindings(self, binding_ids)
    }

    fn set_binding_enabled(&mut self, binding_id: &str, enable: bool) -> Result<(), RoutingError> {
        AsyncRuleRegistry::set_binding_enabled(self, binding_id, enable)
    }

    fn bindings_for_rule(&self, rule_id: &str) -> Vec<OrgRoutingBinding> {
        AsyncRuleRegistry::bindings_for_rule(self, rule_id)
    }

    fn bindings_for_organization(&self, organization_id: &str) -> Vec<OrgRoutingBinding> {
        AsyncRuleRegistry::bindings_for_organization(self, organization_id)
    }

    fn organizations(&self) -> Vec<OrganizationId> {
        AsyncRuleRegistry::organizations(self)
    }
}
