//! potrack - PO Task Tracking Library
//!
//! This library provides the core functionality for the potrack CLI tool:
//! a task-tracking dashboard core for operational "PO tasks" assigned to a
//! fixed roster of responsible persons (PICs).
//!
//! # Core Concepts
//!
//! - **SLA evaluation**: a pure classification of urgency from due date,
//!   status, and an injected "now"
//! - **Role gating**: the Super Admin edits everything; a PIC updates only
//!   status and remarks on their own tasks
//! - **Reconciliation**: the periodic pass that promotes due-soon and
//!   overdue tasks to `AlmostExpired` in storage
//! - **Soft delete**: logical removal with an append-only audit trail
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `potrack.toml` (roster, intervals)
//! - `error`: Error types and result aliases
//! - `sla`: Pure SLA urgency evaluator
//! - `task`: Task records and the closed status enumeration
//! - `lifecycle`: Role-gated mutations, visibility, reconciliation
//! - `actor`: Actor identity and role resolution
//! - `clock`: Injectable time source
//! - `store`: File-backed task storage and the deletion audit log
//! - `lock`: File locking and atomic writes for concurrency safety
//! - `output`: CLI output envelopes

pub mod actor;
pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod lock;
pub mod output;
pub mod sla;
pub mod store;
pub mod task;

pub use error::{Error, Result};
