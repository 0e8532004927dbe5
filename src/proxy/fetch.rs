//! Resource fetch endpoint: `/?url=<absolute url>`.
//!
//! Bodies are streamed untouched. Redirects are turned back into fetch
//! URLs so the browser never navigates to the third-party origin itself.
//!
//! Targets must be `https` on a public host. The caller's cookies and
//! credentials belong to the proxy domain and are never sent along.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{HeaderValue, AUTHORIZATION, COOKIE, LOCATION, PROXY_AUTHORIZATION};
use axum::http::{Request, Response, Uri};
use url::{Host, Url};

use crate::config::schema::FetchConfig;
use crate::error::ProxyError;
use crate::proxy::forwarder::Forwarder;
use crate::proxy::target::UpstreamTarget;
use crate::rewrite::{loop_back_location, RewriteRules};

/// The enabled fetch endpoint.
#[derive(Debug, Clone)]
pub struct FetchEndpoint {
    pub subdomain: Arc<str>,
    pub allow_insecure_targets: bool,
}

impl FetchEndpoint {
    /// `None` when the endpoint is disabled.
    pub fn from_config(config: &FetchConfig) -> Option<Self> {
        config.enabled.then(|| Self {
            subdomain: Arc::from(config.subdomain.as_str()),
            allow_insecure_targets: config.allow_insecure_targets,
        })
    }
}

/// Extract and validate the `url` query parameter.
pub fn resource_url(uri: &Uri, allow_insecure: bool) -> Result<Url, ProxyError> {
    let raw = uri
        .query()
        .and_then(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(key, _)| key == "url")
                .map(|(_, value)| value.into_owned())
        })
        .ok_or_else(|| ProxyError::InvalidResourceUrl("missing url parameter".to_string()))?;

    let url = Url::parse(&raw).map_err(|e| ProxyError::InvalidResourceUrl(format!("{raw}: {e}")))?;

    let scheme_ok = match url.scheme() {
        "https" => true,
        "http" => allow_insecure,
        _ => false,
    };
    if !scheme_ok {
        return Err(ProxyError::InvalidResourceUrl(format!("{raw}: scheme not allowed")));
    }

    match url.host() {
        None => return Err(ProxyError::InvalidResourceUrl(format!("{raw}: no host"))),
        Some(host) if !allow_insecure && is_internal_host(&host) => {
            return Err(ProxyError::InvalidResourceUrl(format!("{raw}: host not allowed")));
        }
        Some(_) => {}
    }

    Ok(url)
}

/// Loopback, private, link-local and unspecified addresses, plus `localhost`.
///
/// Only literal hosts are checked; names are not resolved here.
pub fn is_internal_host(host: &Host<&str>) -> bool {
    match host {
        Host::Domain(name) => {
            let name = name.trim_end_matches('.').to_ascii_lowercase();
            name == "localhost" || name.ends_with(".localhost")
        }
        Host::Ipv4(ip) => is_internal_v4(ip),
        Host::Ipv6(ip) => is_internal_v6(ip),
    }
}

fn is_internal_v4(ip: &Ipv4Addr) -> bool {
    ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
        // carrier-grade NAT, 100.64.0.0/10
        || (ip.octets()[0] == 100 && (ip.octets()[1] & 0xc0) == 64)
}

fn is_internal_v6(ip: &Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_internal_v4(&v4);
    }
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        || (first & 0xfe00) == 0xfc00
        || (first & 0xffc0) == 0xfe80
}

/// Fetch the resource named by the request's `url` parameter.
pub async fn fetch_resource(
    forwarder: &Forwarder,
    endpoint: &FetchEndpoint,
    mut request: Request<Body>,
) -> Result<Response<Body>, ProxyError> {
    let url = resource_url(request.uri(), endpoint.allow_insecure_targets)?;
    let target = UpstreamTarget::for_url(&url)?;

    let headers = request.headers_mut();
    headers.remove(COOKIE);
    headers.remove(AUTHORIZATION);
    headers.remove(PROXY_AUTHORIZATION);

    tracing::debug!(url = %url, "Fetching resource");

    let mut response = forwarder.send(request, target, &RewriteRules::none()).await?;

    let looped = response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|location| loop_back_location(location, &url))
        .and_then(|location| HeaderValue::from_str(&location).ok());
    if let Some(location) = looped {
        response.headers_mut().insert(LOCATION, location);
    }

    Ok(response)
}
