//! Routing rule engine
//!
//! This module provides the RoutingEngine that orchestrates the rule and
//! binding lifecycle by coordinating the validator, the conflict detector and
//! a [`RoutingStore`].
//!
//! The engine enforces business rules such as:
//! - Every stored rule has passed validation
//! - Deleting a rule removes its bindings first
//! - Binding reports overlapping rules as warnings without blocking

use crate::core::conflict::{Conflict, ConflictDetector};
use crate::core::traits::RoutingStore;
use crate::core::validator::validate_rule;
use crate::io::json_format::RuleDraft;
use crate::types::{BindingId, BoundRule, OrgRoutingBinding, RoutingError, RoutingRule, RuleId};

/// Result of binding rules to an organization
#[derive(Debug, Clone, PartialEq)]
pub struct BindingOutcome {
    /// Bindings that were created, in request order
    pub bindings: Vec<OrgRoutingBinding>,
    /// Overlaps between the new rules and the organization's active rules
    pub conflicts: Vec<Conflict>,
}

impl BindingOutcome {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Rule and binding lifecycle engine
///
/// Generic over the store so the same orchestration runs against the
/// single-threaded registry, the shared registry, or a remote backend.
pub struct RoutingEngine<S: RoutingStore> {
    store: S,
    detector: ConflictDetector,
}

impl<S: RoutingStore> RoutingEngine<S> {
    /// Create a new RoutingEngine
    ///
    /// # Arguments
    ///
    /// * `store` - Backing store for rules and bindings
    /// * `detector` - Conflict detector, carrying the priority policy
    pub fn new(store: S, detector: ConflictDetector) -> Self {
        RoutingEngine { store, detector }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Validate a draft and store it as a new rule
    ///
    /// # Returns
    ///
    /// * `Ok(RoutingRule)` - the stored rule, with its id and creation time
    /// * `Err(RoutingError::Validation)` - every violation found on the draft
    /// * `Err(RoutingError::DuplicateRule)` - the draft's id is already taken
    pub fn create_rule(&mut self, draft: &RuleDraft) -> Result<RoutingRule, RoutingError> {
        let rule = validate_rule(draft)
            .map_err(|errors| RoutingError::validation(&draft.label(), errors))?;
        self.store.insert_rule(rule.clone())?;

        tracing::debug!(rule = %rule.id, title = %rule.title, "routing rule created");
        Ok(rule)
    }

    /// Replace an existing rule wholesale
    ///
    /// The draft's id is ignored in favour of `rule_id`. When the draft has no
    /// creation time, the stored rule's is kept.
    ///
    /// # Errors
    ///
    /// - `RuleNotFound` if no rule has this id
    /// - `Validation` if the replacement draft is invalid
    pub fn replace_rule(
        &mut self,
        rule_id: &str,
        draft: &RuleDraft,
    ) -> Result<RoutingRule, RoutingError> {
        let existing = self
            .store
            .get_rule(rule_id)
            .ok_or_else(|| RoutingError::rule_not_found(rule_id))?;

        let mut draft = draft.clone();
        draft.id = Some(rule_id.to_string());
        if draft.created_at.is_none() {
            draft.created_at = Some(existing.created_at);
        }

        let rule =
            validate_rule(&draft).map_err(|errors| RoutingError::validation(rule_id, errors))?;
        self.store.replace_rule(rule.clone())?;

        tracing::debug!(rule = rule_id, "routing rule replaced");
        Ok(rule)
    }

    /// Enable or disable a rule everywhere it is bound
    pub fn set_rule_enabled(&mut self, rule_id: &str, enable: bool) -> Result<(), RoutingError> {
        self.store.set_rule_enabled(rule_id, enable)
    }

    /// Delete a rule and every binding that references it
    ///
    /// Bindings are removed before the rule, so no binding is ever left
    /// pointing at a missing rule.
    ///
    /// # Returns
    ///
    /// The bindings that were removed along with the rule
    pub fn delete_rule(&mut self, rule_id: &str) -> Result<Vec<OrgRoutingBinding>, RoutingError> {
        if self.store.get_rule(rule_id).is_none() {
            return Err(RoutingError::rule_not_found(rule_id));
        }

        let binding_ids: Vec<BindingId> = self
            .store
            .bindings_for_rule(rule_id)
            .into_iter()
            .map(|binding| binding.id)
            .collect();

        let removed = if binding_ids.is_empty() {
            Vec::new()
        } else {
            self.store.remove_bindings(&binding_ids)?
        };
        self.store.remove_rule(rule_id)?;

        tracing::debug!(
            rule = rule_id,
            bindings = removed.len(),
            "routing rule deleted"
        );
        Ok(removed)
    }

    /// Bind rules to an organization
    ///
    /// Each new rule is checked against the organization's active rules and
    /// against the rules earlier in the same request. Conflicts are logged and
    /// returned as warnings; the bindings are created regardless.
    ///
    /// # Errors
    ///
    /// Unknown rules and pairs that are already bound reject the whole
    /// request; nothing is created.
    pub fn bind_rules(
        &mut self,
        organization_id: &str,
        rule_ids: &[RuleId],
    ) -> Result<BindingOutcome, RoutingError> {
        let mut bound = self.store.bound_rules(organization_id);
        let mut bindings = Vec::with_capacity(rule_ids.len());
        let mut conflicts = Vec::new();

        for rule_id in rule_ids {
            let rule = self
                .store
                .get_rule(rule_id)
                .ok_or_else(|| RoutingError::rule_not_found(rule_id))?;

            conflicts.extend(self.detector.find_conflicts(organization_id, &rule, &bound));

            let binding = OrgRoutingBinding::new(organization_id, rule_id);
            bound.push(BoundRule {
                binding: binding.clone(),
                rule,
            });
            bindings.push(binding);
        }

        self.store.insert_bindings(bindings.clone())?;

        for conflict in &conflicts {
            tracing::warn!(
                organization = %conflict.organization_id,
                rule = %conflict.rule_id,
                conflicting_rule = %conflict.conflicting_rule_id,
                "{}",
                conflict
            );
        }

        Ok(BindingOutcome {
            bindings,
            conflicts,
        })
    }

    /// Remove bindings by id; an unknown id rejects the whole request
    pub fn unbind(
        &mut self,
        binding_ids: &[BindingId],
    ) -> Result<Vec<OrgRoutingBinding>, RoutingError> {
        self.store.remove_bindings(binding_ids)
    }

    pub fn set_binding_enabled(
        &mut self,
        binding_id: &str,
        enable: bool,
    ) -> Result<(), RoutingError> {
        self.store.set_binding_enabled(binding_id, enable)
    }

    /// Conflicts of a stored rule within one organization
    ///
    /// A rule without an enabled binding to the organization matches nothing
    /// there and so has no conflicts.
    pub fn conflicts_for(
        &self,
        organization_id: &str,
        rule_id: &str,
    ) -> Result<Vec<Conflict>, RoutingError> {
        let rule = self
            .store
            .get_rule(rule_id)
            .ok_or_else(|| RoutingError::rule_not_found(rule_id))?;
        let bound = self.store.bound_rules(organization_id);
        let actively_bound = bound.iter().any(|entry| {
            entry.binding.enable
                && entry.binding.organization_id == organization_id
                && entry.rule.id == rule.id
        });
        if !actively_bound {
            return Ok(Vec::new());
        }

        Ok(self.detector.find_conflicts(organization_id, &rule, &bound))
    }

    /// Every conflicting pair among an organization's active bindings
    pub fn audit(&self, organization_id: &str) -> Vec<Conflict> {
        let bound = self.store.bound_rules(organization_id);
        self.detector.audit_organization(organization_id, &bound)
    }
}
