//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (Host header)
//!     → host.rs (leading label extraction)
//!     → table.rs (exact subdomain lookup)
//!     → Return: matched RouteRule or NoMatch
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → expand {domain}, parse upstream origin
//!     → compile literal body rewrites
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same Host always resolves to the same rule
//! - The resolved rule governs both forwarding and response rewriting

pub mod host;
pub mod table;

pub use host::{request_host, subdomain};
pub use table::{RouteError, RouteRule, RouteTable};
