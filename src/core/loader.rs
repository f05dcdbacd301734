//! Loading a snapshot into a store
//!
//! A snapshot exported from the backend may contain rules that no longer
//! pass validation and bindings that point at such rules. Loading never stops
//! at the first bad entry: every rule is validated, valid ones are stored, and
//! everything rejected is collected for reporting.

use crate::core::traits::RoutingStore;
use crate::core::validator::validate_rule;
use crate::io::json_format::Snapshot;
use crate::types::{OrgRoutingBinding, RoutingError, ValidationErrors};

/// A rule draft that could not be stored
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRule {
    /// Rule id, or its title when the draft has no id
    pub label: String,
    pub errors: ValidationErrors,
}

/// A binding that could not be stored
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedBinding {
    pub binding: OrgRoutingBinding,
    pub error: RoutingError,
}

/// What happened to each snapshot entry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadSummary {
    pub rules_loaded: usize,
    pub bindings_loaded: usize,
    pub rejected_rules: Vec<RejectedRule>,
    pub rejected_bindings: Vec<RejectedBinding>,
}

/// Validate and store every rule, then every binding, of a snapshot
///
/// Bindings are inserted one at a time so a single bad binding does not take
/// the rest of the organization's bindings with it. A binding to a rule that
/// was rejected fails as an unknown rule.
pub fn load_snapshot<S: RoutingStore>(store: &mut S, snapshot: Snapshot) -> LoadSummary {
    let mut summary = LoadSummary::default();

    for draft in &snapshot.rules {
        let label = draft.label();
        let stored = validate_rule(draft).and_then(|rule| {
            store.insert_rule(rule).map_err(|e| {
                let mut errors = ValidationErrors::new();
                errors.push("id", e.to_string());
                errors
            })
        });

        match stored {
            Ok(()) => summary.rules_loaded += 1,
            Err(errors) => {
                tracing::warn!(
                    rule = %label,
                    violations = errors.len(),
                    "skipping invalid routing rule"
                );
                summary.rejected_rules.push(RejectedRule { label, errors });
            }
        }
    }

    for binding in snapshot.bindings {
        match store.insert_bindings(vec![binding.clone()]) {
            Ok(()) => summary.bindings_loaded += 1,
            Err(error) => {
                tracing::warn!(binding = %binding.id, error = %error, "skipping routing binding");
                summary.rejected_bindings.push(RejectedBinding { binding, error });
            }
        }
    }

    tracing::info!(
        rules = summary.rules_loaded,
        bindings = summary.bindings_loaded,
        rejected_rules = summary.rejected_rules.len(),
        rejected_bindings = summary.rejected_bindings.len(),
        "snapshot loaded"
    );

    summary
}
