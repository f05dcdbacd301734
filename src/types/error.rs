//! Error types for the routing rule engine
//!
//! This module defines the errors that can occur while building typed rule
//! values, talking to the rule store, and loading snapshots from disk, plus
//! the field-level violation list produced by rule validation.
//!
//! # Error Categories
//!
//! - **Construction Errors**: a percentage map, amount range or priority that
//!   breaks its invariant
//! - **Validation Errors**: one or more field-level violations on a rule draft
//! - **Reference Errors**: unknown rules or bindings, duplicate ids or pairs
//! - **File I/O Errors**: snapshot not found, unreadable or malformed
//!
//! Conflicts between rules are not errors; see [`crate::core::conflict`].

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// A single field-level violation on a rule draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Field path, e.g. `title` or `routingRule[1].percentage`
    pub field: String,
    /// Human-readable description of what is wrong
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Violation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every violation found on one rule draft, in the order they were detected
///
/// Never empty when returned from the validator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    violations: Vec<Violation>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.violations.push(Violation::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Group messages by field path for field-level rendering
    pub fn by_field(&self) -> BTreeMap<String, Vec<String>> {
        let mut fields: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for violation in &self.violations {
            fields
                .entry(violation.field.clone())
                .or_default()
                .push(violation.message.clone());
        }
        fields
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for violation in &self.violations {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}", violation)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Main error type for the routing rule engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoutingError {
    /// Snapshot file not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error while reading a snapshot or writing a report
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// Snapshot JSON could not be parsed
    #[error("JSON parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Description of the parsing error
        message: String,
    },

    /// A rule draft failed validation
    #[error("Rule '{rule}' failed validation: {errors}")]
    Validation {
        /// Rule id or title used to identify the draft
        rule: String,
        /// Every violation found
        errors: ValidationErrors,
    },

    /// A tier's percentage map has no entries
    #[error("Percentage map must contain at least one channel")]
    EmptyPercentage,

    /// A tier's percentage weights do not add up to 100
    #[error("Percentage weights sum to {sum}, expected 100")]
    PercentageSum {
        /// Actual sum of the weights
        sum: u64,
    },

    /// A tier priority below 1
    #[error("Tier priority must be at least 1, got {priority}")]
    InvalidPriority {
        /// The rejected priority
        priority: i64,
    },

    /// Amount bounds that are negative or not strictly increasing
    #[error("Invalid amount range: min {min} must be >= 0 and less than max {max}")]
    InvalidAmountRange {
        /// Lower bound
        min: Decimal,
        /// Upper bound
        max: Decimal,
    },

    /// Rule id not present in the store
    #[error("Routing rule {rule_id} not found")]
    RuleNotFound {
        /// The missing rule id
        rule_id: String,
    },

    /// Binding id not present in the store
    #[error("Routing binding {binding_id} not found")]
    BindingNotFound {
        /// The missing binding id
        binding_id: String,
    },

    /// A rule with the same id already exists
    #[error("Routing rule {rule_id} already exists")]
    DuplicateRule {
        /// The duplicated rule id
        rule_id: String,
    },

    /// A rule still referenced by bindings cannot be removed
    #[error("Routing rule {rule_id} is still referenced by {bindings} binding(s)")]
    RuleInUse {
        /// The rule id
        rule_id: String,
        /// Number of bindings still referencing it
        bindings: usize,
    },

    /// A binding with the same id already exists
    #[error("Routing binding {binding_id} already exists")]
    DuplicateBindingId {
        /// The duplicated binding id
        binding_id: String,
    },

    /// The organization is already bound to the rule
    #[error("Organization {organization_id} is already bound to routing rule {rule_id}")]
    DuplicateBinding {
        /// Organization id
        organization_id: String,
        /// Rule id
        rule_id: String,
    },
}

impl From<std::io::Error> for RoutingError {
    fn from(error: std::io::Error) -> Self {
        RoutingError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for RoutingError {
    fn from(error: serde_json::Error) -> Self {
        let line = match error.line() {
            0 => None,
            line => Some(line),
        };

        RoutingError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for RoutingError {
    fn from(error: csv::Error) -> Self {
        RoutingError::IoError {
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl RoutingError {
    /// Create a Validation error
    pub fn validation(rule: &str, errors: ValidationErrors) -> Self {
        RoutingError::Validation {
            rule: rule.to_string(),
            errors,
        }
    }

    /// Create a RuleNotFound error
    pub fn rule_not_found(rule_id: &str) -> Self {
        RoutingError::RuleNotFound {
            rule_id: rule_id.to_string(),
        }
    }

    /// Create a BindingNotFound error
    pub fn binding_not_found(binding_id: &str) -> Self {
        RoutingError::BindingNotFound {
            binding_id: binding_id.to_string(),
        }
    }

    /// Create a DuplicateRule error
    pub fn duplicate_rule(rule_id: &str) -> Self {
        RoutingError::DuplicateRule {
            rule_id: rule_id.to_string(),
        }
    }

    /// Create a RuleInUse error
    pub fn rule_in_use(rule_id: &str, bindings: usize) -> Self {
        RoutingError::RuleInUse {
            rule_id: rule_id.to_string(),
            bindings,
        }
    }

    /// Create a DuplicateBindingId error
    pub fn duplicate_binding_id(binding_id: &str) -> Self {
        RoutingError::DuplicateBindingId {
            binding_id: binding_id.to_string(),
        }
    }

    /// Create a DuplicateBinding error
    pub fn duplicate_binding(organization_id: &str, rule_id: &str) -> Self {
        RoutingError::DuplicateBinding {
            organization_id: organization_id.to_string(),
            rule_id: rule_id.to_string(),
        }
    }
}
