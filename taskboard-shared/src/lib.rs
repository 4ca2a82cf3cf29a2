//! # Taskboard Shared Library
//!
//! Types and client-side state shared by the Taskboard client and its
//! front ends.
//!
//! ## Module Organization
//!
//! - `models`: API models (users, projects, tasks, stats)
//! - `auth`: Auth request/response bodies and password rules
//! - `validation`: Field-level validation helpers
//! - `storage`: Persisted bearer token storage
//! - `session`: Session state and the session store
//! - `sequence`: Per-slot request sequencing for stale-response guards
//! - `board`: Kanban grouping and navigation rules

pub mod auth;
pub mod board;
pub mod models;
pub mod sequence;
pub mod session;
pub mod storage;
pub mod validation;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
