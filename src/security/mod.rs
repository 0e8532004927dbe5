//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (route already resolved):
//!     → auth.rs (Basic credential check, only for routes that require it)
//!     → Pass to forwarder, or 401 with challenge
//! ```
//!
//! # Design Decisions
//! - One shared secret per deployment, no accounts or sessions
//! - Fail closed: the upstream is never contacted for a rejected request

pub mod auth;

pub use auth::Authenticator;
