//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `channel`: Payment methods, channels, account types and their catalog
//! - `rule`: Routing rules, tiers, percentage maps and amount ranges
//! - `binding`: Organization bindings
//! - `error`: Error types and validation violations

pub mod binding;
pub mod channel;
pub mod error;
pub mod rule;

pub use binding::{BindingId, BoundRule, OrgRoutingBinding, OrganizationId};
pub use channel::{AccountType, PaymentChannel, PaymentMethod, TransactionType};
pub use error::{RoutingError, ValidationErrors, Violation};
pub use rule::{ranges_overlap, AmountRange, Percentage, RoutingRule, RoutingTier, RuleId};
