//! Core business logic module
//!
//! This module contains the routing rule components:
//! - `validator` - Structural validation of rule drafts
//! - `conflict` - Conflict detection between rules bound to one organization
//! - `traits` - Store abstraction for interchangeable implementations
//! - `registry` - Single-threaded in-memory store
//! - `engine` - Rule and binding lifecycle orchestration
//! - `loader` - Loading exported snapshots into a store
//! - `async` - Thread-safe store and concurrent auditing

pub mod r#async;
pub mod conflict;
pub mod engine;
pub mod loader;
pub mod registry;
pub mod traits;
pub mod validator;

pub use conflict::{Conflict, ConflictDetector, PriorityPolicy};
pub use engine::{BindingOutcome, RoutingEngine};
pub use loader::{load_snapshot, LoadSummary, RejectedBinding, RejectedRule};
pub use r#async::{AsyncRuleRegistry, AuditProcessor, OrganizationAudit};
pub use registry::RuleRegistry;
pub use traits::RoutingStore;
pub use validator::validate_rule;
