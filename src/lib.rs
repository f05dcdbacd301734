//! Routing Rules Engine Library
//! # Overview
//!
//! This library models transaction routing rules for a payment platform: which
//! upstream channels handle a deposit or withdrawal, how traffic is split
//! between them, and which organizations a rule applies to. It validates rules
//! and detects rules bound to the same organization that could match the same
//! transaction. Executing rules against live traffic is left to the runtime
//! that consumes them.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (RoutingRule, Percentage, OrgRoutingBinding, etc.)
//! - [`cli`] - CLI arguments parsing for the `routing-audit` binary
//! - [`core`] - Business logic components:
//!   - [`core::validator`] - Field-level validation of rule drafts
//!   - [`core::conflict`] - Conflict detection within an organization
//!   - [`core::engine`] - Rule and binding lifecycle orchestration
//!   - [`core::registry`] - In-memory rule and binding store
//! - [`io`] - Snapshot parsing and CSV report output
//! - [`strategy`] - Sequential and concurrent snapshot audits
//!
//! # Conflicts
//!
//! Two enabled rules bound (through enabled bindings) to the same organization
//! conflict when all of the following hold:
//!
//! - **Payment method**: identical
//! - **Transaction type**: identical
//! - **Account type**: either rule unrestricted, or both the same
//! - **Amount range**: inclusive overlap, a missing range being unbounded
//!
//! Conflicts are warnings. They never prevent a binding from being created.
//!
//! # Example
//!
//! ```
//! use routing_rules_engine::core::{ConflictDetector, RoutingEngine, RuleRegistry};
//! use routing_rules_engine::io::parse_rule_draft;
//!
//! let mut engine = RoutingEngine::new(RuleRegistry::new(), ConflictDetector::default());
//! let draft = parse_rule_draft(r#"{
//!     "id": "momo-deposits",
//!     "title": "MoMo deposits",
//!     "paymentMethod": "MOMO",
//!     "transactionType": "DEPOSIT",
//!     "routingRule": [{ "priority": 1, "percentage": { "MOMO_DIRECT": 60, "PAYOO": 40 } }]
//! }"#).unwrap();
//!
//! engine.create_rule(&draft).unwrap();
//! let outcome = engine.bind_rules("org-1", &["momo-deposits".to_string()]).unwrap();
//! assert!(outcome.conflicts.is_empty());
//! ```

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use core::{
    validate_rule, BindingOutcome, Conflict, ConflictDetector, PriorityPolicy, RoutingEngine,
    RoutingStore, RuleRegistry,
};
pub use io::{write_report_csv, RuleDraft, Snapshot};
pub use types::{
    AccountType, AmountRange, OrgRoutingBinding, PaymentChannel, PaymentMethod, Percentage,
    RoutingError, RoutingRule, RoutingTier, TransactionType, ValidationErrors,
};
