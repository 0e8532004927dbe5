//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, bind address parses)
//! - Check route integrity (unique subdomains, usable upstream origins)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::{ProxyConfig, RouteConfig};

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("domain must not be empty")]
    EmptyDomain,

    #[error("invalid bind address {0:?}")]
    InvalidBindAddress(String),

    #[error("invalid subdomain {0:?}: must be a single non-empty label")]
    InvalidSubdomain(String),

    #[error("subdomain {0:?} is declared more than once")]
    DuplicateSubdomain(String),

    #[error("route {subdomain:?}: invalid upstream {upstream:?}: {reason}")]
    InvalidUpstream {
        subdomain: String,
        upstream: String,
        reason: String,
    },

    #[error("route {0:?}: rewrite match text must not be empty")]
    EmptyMatchText(String),

    #[error("route {0:?} requires auth but no credential is configured")]
    MissingCredential(String),

    #[error("fetch subdomain {0:?} collides with a route")]
    FetchSubdomainTaken(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.domain.trim().is_empty() {
        errors.push(ValidationError::EmptyDomain);
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.timeouts.request_secs == Some(0) {
        errors.push(ValidationError::ZeroTimeout);
    }

    let mut seen = HashSet::new();
    for route in &config.routes {
        validate_route(route, config, &mut errors);
        if !seen.insert(route.subdomain.as_str()) {
            errors.push(ValidationError::DuplicateSubdomain(route.subdomain.clone()));
        }
    }

    if config.fetch.enabled {
        if !is_single_label(&config.fetch.subdomain) {
            errors.push(ValidationError::InvalidSubdomain(config.fetch.subdomain.clone()));
        } else if seen.contains(config.fetch.subdomain.as_str()) {
            errors.push(ValidationError::FetchSubdomainTaken(config.fetch.subdomain.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_route(route: &RouteConfig, config: &ProxyConfig, errors: &mut Vec<ValidationError>) {
    if !is_single_label(&route.subdomain) {
        errors.push(ValidationError::InvalidSubdomain(route.subdomain.clone()));
    }

    if let Err(reason) = check_upstream(&route.upstream) {
        errors.push(ValidationError::InvalidUpstream {
            subdomain: route.subdomain.clone(),
            upstream: route.upstream.clone(),
            reason,
        });
    }

    let empty_match = route
        .body_rewrites
        .iter()
        .chain(&route.location_rewrites)
        .any(|pair| pair.from.is_empty());
    if empty_match {
        errors.push(ValidationError::EmptyMatchText(route.subdomain.clone()));
    }

    if route.require_auth && config.auth.credential.is_empty() {
        errors.push(ValidationError::MissingCredential(route.subdomain.clone()));
    }
}

fn is_single_label(label: &str) -> bool {
    !label.is_empty() && !label.contains('.') && !label.contains(':')
}

fn check_upstream(upstream: &str) -> Result<(), String> {
    let url = Url::parse(upstream).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme {:?}", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    if url.path() != "/" || url.query().is_some() {
        return Err("must be an origin without path or query".to_string());
    }
    Ok(())
}
