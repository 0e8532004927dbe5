//! Shared-secret Basic authentication.

use axum::http::header::{HeaderMap, HeaderValue, InvalidHeaderValue, AUTHORIZATION};

use crate::config::schema::AuthConfig;

/// Checks `Authorization` against one configured credential.
///
/// The expected value is built once; every check is a plain byte comparison
/// with no per-request decoding and no state.
#[derive(Debug, Clone)]
pub struct Authenticator {
    expected: String,
    challenge: HeaderValue,
}

impl Authenticator {
    pub fn new(config: &AuthConfig) -> Result<Self, InvalidHeaderValue> {
        let challenge = HeaderValue::from_str(&format!("Basic realm=\"{}\"", config.realm))?;
        Ok(Self {
            expected: format!("Basic {}", config.credential),
            challenge,
        })
    }

    /// True when the request carries exactly `Basic <credential>`.
    pub fn authenticate(&self, headers: &HeaderMap) -> bool {
        headers
            .get(AUTHORIZATION)
            .map(|value| value.as_bytes() == self.expected.as_bytes())
            .unwrap_or(false)
    }

    /// Value for the `WWW-Authenticate` header on a 401.
    pub fn challenge(&self) -> &HeaderValue {
        &self.challenge
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> Authenticator {
        Authenticator::new(&AuthConfig {
            credential: "dXNlcjpwYXNz".to_string(),
            realm: "Username required".to_string(),
        })
        .unwrap()
    }

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_exact_match() {
        assert!(auth().authenticate(&headers("Basic dXNlcjpwYXNz")));
    }

    #[test]
    fn test_rejects_missing_and_wrong() {
        let auth = auth();
        assert!(!auth.authenticate(&HeaderMap::new()));
        assert!(!auth.authenticate(&headers("Basic d3Jvbmc6cGFzcw==")));
        assert!(!auth.authenticate(&headers("Bearer dXNlcjpwYXNz")));
        // byte-for-byte: scheme case and padding matter
        assert!(!auth.authenticate(&headers("basic dXNlcjpwYXNz")));
        assert!(!auth.authenticate(&headers("Basic dXNlcjpwYXNz ")));
    }

    #[test]
    fn test_challenge() {
        assert_eq!(auth().challenge(), "Basic realm=\"Username required\"");
    }
}
