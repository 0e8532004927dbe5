//! Response rewriting subsystem.
//!
//! # Data Flow
//! ```text
//! Upstream response (status, headers, body)
//!     → headers.rs (drop CSP, rewrite Location)
//!     → TransferStrategy::for_rules
//!         StreamThrough    → body piped to client as it arrives
//!         BufferAndRewrite → body.rs (collect, literal substitution)
//! ```
//!
//! # Design Decisions
//! - Pure functions only; no I/O happens here
//! - Header rewriting always completes before any body byte is sent
//! - The strategy is decided once per response from the matched route

pub mod body;
pub mod headers;
pub mod location;

pub use body::{rewrite, BodyRewrite};
pub use headers::response_headers;
pub use location::{loop_back_location, rewrite_location, LocationRewrite};

/// Rewrite rules attached to a route.
#[derive(Debug, Clone, Default)]
pub struct RewriteRules {
    /// Literal body substitutions, in declaration order.
    pub body: Vec<BodyRewrite>,
    /// `Location` origin substitutions, in declaration order.
    pub location: Vec<LocationRewrite>,
}

impl RewriteRules {
    /// Rules that leave the response untouched apart from CSP removal.
    pub fn none() -> Self {
        Self::default()
    }
}

/// How a response body travels to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStrategy {
    /// Pipe upstream chunks through unmodified with original framing.
    StreamThrough,
    /// Collect the whole body, rewrite it, send it as one body.
    BufferAndRewrite,
}

impl TransferStrategy {
    pub fn for_rules(rules: &RewriteRules) -> Self {
        if rules.body.is_empty() {
            TransferStrategy::StreamThrough
        } else {
            TransferStrategy::BufferAndRewrite
        }
    }
}
