//! Upstream forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! Request + RouteRule
//!     → target.rs (origin + verbatim path/query, upstream Host)
//!     → forwarder.rs (header copy, streamed body, client call)
//!     → rewrite (headers, then stream-through or buffer-and-rewrite)
//!     → Response ready to send
//!
//! Fetch endpoint:
//!     /?url=... → fetch.rs (validate url) → forwarder.rs → Location loop-back
//! ```

pub mod fetch;
pub mod forwarder;
pub mod target;

pub use forwarder::{build_client, Forwarder, HttpsClient};
pub use target::UpstreamTarget;
