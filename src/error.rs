//! Error types for request handling and startup.
//!
//! `ProxyError` is terminal for the request that raised it and maps straight
//! to a plain-text HTTP response. Nothing is retried.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::config::ConfigError;
use crate::routing::RouteError;

/// Per-request failures.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// No route is declared for the request's subdomain.
    #[error("no route for host {host:?}")]
    RouteNotFound { host: String },

    /// Missing or incorrect `Authorization` on a protected route.
    #[error("authorization required")]
    Unauthorized { challenge: HeaderValue },

    /// The fetch endpoint was given an unusable `url` parameter.
    #[error("invalid resource url: {0}")]
    InvalidResourceUrl(String),

    /// The upstream request could not be built from the route and target.
    #[error("invalid upstream target: {0}")]
    UpstreamTarget(#[from] axum::http::Error),

    /// Connect, TLS or protocol failure before a response arrived.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    /// The upstream body failed while being buffered for rewriting.
    #[error("upstream body failed: {0}")]
    UpstreamBody(#[source] axum::Error),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            ProxyError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ProxyError::InvalidResourceUrl(_) => StatusCode::BAD_REQUEST,
            ProxyError::UpstreamTarget(_)
            | ProxyError::Upstream(_)
            | ProxyError::UpstreamBody(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = status.canonical_reason().unwrap_or("Error");
        let mut response = (
            status,
            [(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"))],
            body,
        )
            .into_response();

        if let ProxyError::Unauthorized { challenge } = self {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, challenge);
        }

        response
    }
}

/// Failures that stop the proxy from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("routes: {0}")]
    Routes(#[from] RouteError),

    #[error("upstream TLS setup: {0}")]
    Tls(#[source] std::io::Error),

    #[error("auth realm is not a valid header value: {0}")]
    Realm(#[from] axum::http::header::InvalidHeaderValue),

    #[error("metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("invalid metrics address {0:?}")]
    MetricsAddress(String),

    #[error("listener: {0}")]
    Io(#[from] std::io::Error),
}
