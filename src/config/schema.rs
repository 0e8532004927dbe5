//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Placeholder expanded to [`ProxyConfig::domain`] inside route strings.
pub const DOMAIN_PLACEHOLDER: &str = "{domain}";

/// Root configuration for the subdomain proxy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Operator-controlled domain the subdomains hang off (e.g. "example.com").
    ///
    /// Only used to expand `{domain}` in route rewrites; routing itself looks
    /// at the leading Host label alone.
    pub domain: String,

    /// Shared Basic credential for routes that require it.
    pub auth: AuthConfig,

    /// Subdomain routes. Defaults to the built-in route set.
    pub routes: Vec<RouteConfig>,

    /// Resource fetch endpoint.
    pub fetch: FetchConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            domain: "example.com".to_string(),
            auth: AuthConfig::default(),
            routes: default_routes(),
            fetch: FetchConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Basic authentication settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Pre-encoded base64 `user:password` token, compared as `Basic <credential>`.
    pub credential: String,

    /// Realm announced in the `WWW-Authenticate` challenge.
    pub realm: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            // "user:"
            credential: "dXNlcjo=".to_string(),
            realm: "Username required".to_string(),
        }
    }
}

/// A single subdomain route.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Leading Host label this route answers for (e.g. "wiki").
    pub subdomain: String,

    /// Upstream origin, scheme and authority only (e.g. "https://en.wikipedia.org").
    pub upstream: String,

    /// Gate the route behind the shared Basic credential.
    #[serde(default)]
    pub require_auth: bool,

    /// Literal body substitutions, applied in order to text responses.
    #[serde(default)]
    pub body_rewrites: Vec<RewritePair>,

    /// Origin substitutions applied to `Location` headers.
    #[serde(default)]
    pub location_rewrites: Vec<RewritePair>,
}

/// A `from` → `to` literal substitution.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RewritePair {
    pub from: String,
    pub to: String,
}

impl RewritePair {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Resource fetch endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Serve the fetch endpoint.
    pub enabled: bool,

    /// Leading Host label the endpoint answers on.
    pub subdomain: String,

    /// Also accept `http` targets and loopback, private or link-local hosts.
    /// Only for local development.
    pub allow_insecure_targets: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            subdomain: "fetch".to_string(),
            allow_insecure_targets: false,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-request timeout in seconds. Unset means requests may wait on
    /// the upstream indefinitely.
    pub request_secs: Option<u64>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

fn wikipedia_body_rewrites() -> Vec<RewritePair> {
    vec![
        RewritePair::new("//en.wikipedia.org", "//wiki.{domain}"),
        RewritePair::new("//zh.wikipedia.org", "//wikizh.{domain}"),
        RewritePair::new("//upload.wikimedia.org", "//wikiupload.{domain}"),
    ]
}

fn wikipedia_location_rewrites() -> Vec<RewritePair> {
    vec![
        RewritePair::new("https://en.wikipedia.org", "https://wiki.{domain}"),
        RewritePair::new("https://zh.wikipedia.org", "https://wikizh.{domain}"),
    ]
}

/// The built-in route set: search, code hosting, encyclopedia and media.
pub fn default_routes() -> Vec<RouteConfig> {
    vec![
        RouteConfig {
            subdomain: "g".to_string(),
            upstream: "https://www.google.com".to_string(),
            require_auth: false,
            body_rewrites: vec![
                RewritePair::new("//en.wikipedia.org", "//wiki.{domain}"),
                RewritePair::new("//zh.wikipedia.org", "//wikizh.{domain}"),
                RewritePair::new("//github.com", "//gh.{domain}"),
            ],
            location_rewrites: Vec::new(),
        },
        RouteConfig {
            subdomain: "gh".to_string(),
            upstream: "https://github.com".to_string(),
            require_auth: true,
            body_rewrites: vec![RewritePair::new("//github.com", "//gh.{domain}")],
            location_rewrites: vec![RewritePair::new(
                "https://raw.githubusercontent.com",
                "https://ghraw.{domain}",
            )],
        },
        RouteConfig {
            subdomain: "ghraw".to_string(),
            upstream: "https://raw.githubusercontent.com".to_string(),
            require_auth: false,
            body_rewrites: Vec::new(),
            location_rewrites: Vec::new(),
        },
        RouteConfig {
            subdomain: "wiki".to_string(),
            upstream: "https://en.wikipedia.org".to_string(),
            require_auth: false,
            body_rewrites: wikipedia_body_rewrites(),
            location_rewrites: wikipedia_location_rewrites(),
        },
        RouteConfig {
            subdomain: "wikizh".to_string(),
            upstream: "https://zh.wikipedia.org".to_string(),
            require_auth: false,
            body_rewrites: wikipedia_body_rewrites(),
            location_rewrites: wikipedia_location_rewrites(),
        },
        RouteConfig {
            subdomain: "wikiupload".to_string(),
            upstream: "https://upload.wikimedia.org".to_string(),
            require_auth: false,
            body_rewrites: Vec::new(),
            location_rewrites: Vec::new(),
        },
    ]
}
