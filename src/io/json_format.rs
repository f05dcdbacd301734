//! JSON wire format for routing rules and snapshots
//!
//! This module centralizes all wire-format concerns, providing:
//! - `RuleDraft` / `TierDraft`: lenient rule shape for deserialization
//! - `Snapshot`: the rules and bindings exported by the backend
//! - Conversion from a validated rule back to its wire shape
//!
//! Drafts keep enums as raw strings and tier priorities and weights as raw
//! JSON values so that a malformed rule still deserializes and every problem
//! in it can be reported by the validator in one pass. All functions are pure
//! (no I/O).

use crate::types::{OrgRoutingBinding, RoutingError, RoutingRule};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Routing rule as received from an operator or the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub transaction_type: Option<String>,
    #[serde(default)]
    pub account_type: Option<String>,
    #[serde(default)]
    pub min_value: Option<Decimal>,
    #[serde(default)]
    pub max_value: Option<Decimal>,
    /// Tiers; named `routingRule` on the wire
    #[serde(rename = "routingRule", default)]
    pub tiers: Vec<TierDraft>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// One tier as received on the wire
///
/// Values are checked to be integers by the validator, not by serde.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TierDraft {
    #[serde(default)]
    pub priority: Option<Value>,
    #[serde(default)]
    pub percentage: BTreeMap<String, Value>,
}

impl RuleDraft {
    /// Label used in reports and logs: the id when present, otherwise the title
    pub fn label(&self) -> String {
        self.id
            .clone()
            .or_else(|| self.title.clone().filter(|t| !t.trim().is_empty()))
            .unwrap_or_else(|| "<unnamed>".to_string())
    }
}

impl From<&RoutingRule> for RuleDraft {
    fn from(rule: &RoutingRule) -> Self {
        RuleDraft {
            id: Some(rule.id.clone()),
            title: Some(rule.title.clone()),
            description: rule.description.clone(),
            payment_method: Some(rule.payment_method.to_string()),
            transaction_type: Some(rule.transaction_type.to_string()),
            account_type: rule.account_type.map(|t| t.to_string()),
            min_value: rule.amount_range.map(|r| r.min()),
            max_value: rule.amount_range.map(|r| r.max()),
            tiers: rule
                .tiers
                .iter()
                .map(|tier| TierDraft {
                    priority: tier.priority().map(Value::from),
                    percentage: tier
                        .percentage()
                        .iter()
                        .map(|(channel, weight)| (channel.to_string(), Value::from(weight)))
                        .collect(),
                })
                .collect(),
            enable: Some(rule.enable),
            created_at: Some(rule.created_at),
        }
    }
}

/// Rules and bindings exported from the backend for offline auditing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub rules: Vec<RuleDraft>,
    #[serde(default)]
    pub bindings: Vec<OrgRoutingBinding>,
}

/// Parse a snapshot document
///
/// # Errors
///
/// `ParseError` with the offending line when the JSON is malformed or a
/// field has the wrong JSON type.
pub fn parse_snapshot(content: &str) -> Result<Snapshot, RoutingError> {
    Ok(serde_json::from_str(content)?)
}

/// Parse a single rule draft, e.g. the body of a create-rule request
pub fn parse_rule_draft(content: &str) -> Result<RuleDraft, RoutingError> {
    Ok(serde_json::from_str(content)?)
}
