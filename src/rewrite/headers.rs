//! Response header transformation.

use axum::http::header::{HeaderMap, HeaderValue, CONTENT_SECURITY_POLICY, LOCATION};

use crate::rewrite::location::{rewrite_location, LocationRewrite};

/// Build the client-facing header set from the upstream one.
///
/// `Content-Security-Policy` is always dropped; `Location` goes through the
/// route's origin rules. Every other header keeps its name, value and order.
pub fn response_headers(upstream: &HeaderMap, location_rules: &[LocationRewrite]) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(upstream.len());

    for (name, value) in upstream {
        if name == CONTENT_SECURITY_POLICY {
            continue;
        }

        if name == LOCATION && !location_rules.is_empty() {
            out.append(name.clone(), rewritten_location(value, location_rules));
            continue;
        }

        out.append(name.clone(), value.clone());
    }

    out
}

fn rewritten_location(value: &HeaderValue, rules: &[LocationRewrite]) -> HeaderValue {
    let Ok(location) = value.to_str() else {
        return value.clone();
    };
    HeaderValue::from_str(&rewrite_location(location, rules)).unwrap_or_else(|_| value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE, SET_COOKIE};

    fn upstream() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/html"));
        headers.insert(
            CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("default-src 'self'"),
        );
        headers.insert(LOCATION, HeaderValue::from_static("https://en.wikipedia.org/Dog"));
        headers.append(SET_COOKIE, HeaderValue::from_static("a=1"));
        headers.append(SET_COOKIE, HeaderValue::from_static("b=2"));
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("42"));
        headers
    }

    #[test]
    fn test_strips_csp_without_rules() {
        let out = response_headers(&upstream(), &[]);
        assert!(out.get(CONTENT_SECURITY_POLICY).is_none());
        assert_eq!(out.get(LOCATION).unwrap(), "https://en.wikipedia.org/Dog");
        assert_eq!(out.get(CONTENT_LENGTH).unwrap(), "42");
    }

    #[test]
    fn test_rewrites_location_and_keeps_multi_values() {
        let rules = [LocationRewrite::new(
            "https://en.wikipedia.org",
            "https://wiki.example.com",
        )];
        let out = response_headers(&upstream(), &rules);

        assert_eq!(out.get(LOCATION).unwrap(), "https://wiki.example.com/Dog");
        let cookies: Vec<_> = out.get_all(SET_COOKIE).iter().collect();
        assert_eq!(cookies, vec!["a=1", "b=2"]);
    }
}
