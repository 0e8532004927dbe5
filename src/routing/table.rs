//! Route lookup.
//!
//! # Responsibilities
//! - Compile route configs into immutable [`RouteRule`]s at startup
//! - Look up the rule for a subdomain label
//! - Build the upstream target for a request under a rule
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) lookup via HashMap keyed by subdomain
//! - Explicit miss (`None`) rather than a silent default route

use std::collections::HashMap;

use thiserror::Error;
use url::Url;

use crate::config::schema::{RewritePair, RouteConfig, DOMAIN_PLACEHOLDER};
use crate::rewrite::{BodyRewrite, LocationRewrite, RewriteRules};

/// Errors raised while compiling routes.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("route {subdomain:?}: invalid upstream {upstream:?}: {source}")]
    Upstream {
        subdomain: String,
        upstream: String,
        #[source]
        source: url::ParseError,
    },

    #[error("route {subdomain:?}: cannot compile rewrite {from:?}: {source}")]
    Rewrite {
        subdomain: String,
        from: String,
        #[source]
        source: regex::Error,
    },

    #[error("subdomain {0:?} is declared more than once")]
    Duplicate(String),
}

/// A compiled route: one upstream origin plus its rewrite rules.
#[derive(Debug, Clone)]
pub struct RouteRule {
    pub subdomain: String,
    pub upstream: Url,
    pub require_auth: bool,
    pub rewrites: RewriteRules,
}

impl RouteRule {
    /// Compile a route config, expanding `{domain}` in every string.
    pub fn compile(config: &RouteConfig, domain: &str) -> Result<Self, RouteError> {
        let upstream_str = expand(&config.upstream, domain);
        let upstream = Url::parse(&upstream_str).map_err(|source| RouteError::Upstream {
            subdomain: config.subdomain.clone(),
            upstream: upstream_str.clone(),
            source,
        })?;

        let body = config
            .body_rewrites
            .iter()
            .map(|pair| compile_body_rewrite(&config.subdomain, pair, domain))
            .collect::<Result<Vec<_>, _>>()?;

        let location = config
            .location_rewrites
            .iter()
            .map(|pair| LocationRewrite::new(expand(&pair.from, domain), expand(&pair.to, domain)))
            .collect();

        Ok(Self {
            subdomain: config.subdomain.clone(),
            upstream,
            require_auth: config.require_auth,
            rewrites: RewriteRules { body, location },
        })
    }
}

fn compile_body_rewrite(
    subdomain: &str,
    pair: &RewritePair,
    domain: &str,
) -> Result<BodyRewrite, RouteError> {
    let from = expand(&pair.from, domain);
    BodyRewrite::new(&from, expand(&pair.to, domain)).map_err(|source| RouteError::Rewrite {
        subdomain: subdomain.to_string(),
        from,
        source,
    })
}

fn expand(value: &str, domain: &str) -> String {
    value.replace(DOMAIN_PLACEHOLDER, domain)
}

/// Immutable subdomain → rule map.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: HashMap<String, RouteRule>,
}

impl RouteTable {
    /// Compile every route config.
    pub fn from_config(configs: &[RouteConfig], domain: &str) -> Result<Self, RouteError> {
        let mut routes = HashMap::with_capacity(configs.len());

        for config in configs {
            let rule = RouteRule::compile(config, domain)?;
            tracing::debug!(
                subdomain = %rule.subdomain,
                upstream = %rule.upstream,
                require_auth = rule.require_auth,
                body_rewrites = ?rule
                    .rewrites
                    .body
                    .iter()
                    .map(BodyRewrite::replacement)
                    .collect::<Vec<_>>(),
                location_rewrites = rule.rewrites.location.len(),
                "Route compiled"
            );
            if routes.insert(rule.subdomain.clone(), rule).is_some() {
                return Err(RouteError::Duplicate(config.subdomain.clone()));
            }
        }

        Ok(Self { routes })
    }

    /// Exact, case-sensitive lookup of a subdomain label.
    pub fn lookup(&self, subdomain: &str) -> Option<&RouteRule> {
        self.routes.get(subdomain)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
