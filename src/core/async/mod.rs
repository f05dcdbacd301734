//! Thread-safe implementations of core components
//!
//! This module provides concurrent counterparts of the single-threaded
//! components, for callers that share a store across threads.
//!
//! - **AsyncRuleRegistry**: rule and binding store on `DashMap`
//! - **AuditProcessor**: audits organizations concurrently on tokio tasks
//!
//! # Thread Safety
//!
//! - Reads and toggles on different rules/bindings proceed in parallel
//! - Multi-entry writes (batch binds, removals) are serialized
//! - Conflict detection itself is pure and shares nothing

pub mod audit_processor;
pub mod registry;

pub use audit_processor::{AuditProcessor, OrganizationAudit};
pub use registry::AsyncRuleRegistry;
