//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment variable {var}: {reason}")]
    Env { var: &'static str, reason: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a TOML file into a configuration without validating it.
pub fn read_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

impl ProxyConfig {
    /// Overlay `PROXY_DOMAIN`, `PORT` and `AUTH` onto this configuration.
    ///
    /// `lookup` abstracts the environment so callers can pass
    /// `|k| std::env::var(k).ok()` or a fixed map.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(domain) = lookup("PROXY_DOMAIN") {
            self.domain = domain;
        }

        if let Some(port) = lookup("PORT") {
            let port: u16 = port.trim().parse().map_err(|e| ConfigError::Env {
                var: "PORT",
                reason: format!("{e}"),
            })?;
            self.listener.bind_address = format!("0.0.0.0:{port}");
        }

        if let Some(credential) = lookup("AUTH") {
            self.auth.credential = credential;
        }

        Ok(())
    }
}

/// Build the effective configuration: an optional TOML file (or defaults)
/// with environment overrides on top, then validation.
pub fn resolve<F>(path: Option<&Path>, lookup: F) -> Result<ProxyConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => ProxyConfig::default(),
    };
    config.apply_env(lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
