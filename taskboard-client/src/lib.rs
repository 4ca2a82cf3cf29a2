//! # Taskboard Client Library
//!
//! Client core for the Taskboard notes/projects/tasks service: the HTTP
//! gateways, the startup sequence and the status controller. Domain types
//! and the session store live in `taskboard-shared`.
//!
//! ## Modules
//!
//! - `app`: Wiring and session-level actions (login, register, logout)
//! - `bootstrap`: One-shot startup sequence (CSRF, stored session check)
//! - `config`: Configuration management
//! - `error`: Error taxonomy for every client operation
//! - `gateway`: REST gateways for auth, projects and tasks
//! - `http`: Shared HTTP core (bearer, CSRF, cookies, 401 handling)
//! - `status`: Task/project status controller and view state
//! - `cli`: Command-line front end

pub mod app;
pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod status;
