//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → robots.txt answered locally (response.rs)
//!     → routing → auth → proxy forwarder
//!     → rewritten upstream response, or plain-text error
//!     → Send to client
//! ```

pub mod response;
pub mod server;

pub use server::{AppState, HttpServer};
