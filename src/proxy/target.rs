//! Upstream request targets.

use axum::http::uri::{PathAndQuery, Uri};
use axum::http::HeaderValue;
use url::{Position, Url};

use crate::error::ProxyError;

/// Where an upstream request goes and the `Host` it carries.
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    pub uri: Uri,
    pub host: HeaderValue,
}

impl UpstreamTarget {
    /// Route target: the rule's origin with the inbound path and query
    /// copied verbatim.
    pub fn for_route(origin: &Url, inbound: &Uri) -> Result<Self, ProxyError> {
        let path_and_query = inbound
            .path_and_query()
            .cloned()
            .unwrap_or_else(|| PathAndQuery::from_static("/"));
        Self::build(origin, path_and_query)
    }

    /// Fetch target: an absolute URL taken as a whole.
    pub fn for_url(url: &Url) -> Result<Self, ProxyError> {
        let path_and_query: PathAndQuery = url[Position::BeforePath..Position::AfterQuery]
            .parse()
            .map_err(|e: axum::http::uri::InvalidUri| ProxyError::UpstreamTarget(e.into()))?;
        Self::build(url, path_and_query)
    }

    fn build(origin: &Url, path_and_query: PathAndQuery) -> Result<Self, ProxyError> {
        let authority = authority(origin);
        let uri = Uri::builder()
            .scheme(origin.scheme())
            .authority(authority.as_str())
            .path_and_query(path_and_query)
            .build()?;
        let host = HeaderValue::from_str(&authority)
            .map_err(|e| ProxyError::UpstreamTarget(e.into()))?;
        Ok(Self { uri, host })
    }
}

/// `host[:port]`, with the port only when it differs from the scheme default.
fn authority(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}
