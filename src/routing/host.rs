//! Host header parsing.
//!
//! # Design Decisions
//! - Only the leading label is significant; the rest of the host is ignored
//! - Matching is case-sensitive and exact (no wildcards, no regex)
//! - A `:port` suffix is removed before the label is taken

use axum::http::{header::HOST, Request};

/// The host a request was addressed to: the `Host` header, falling back to
/// the authority of an absolute-form request target.
pub fn request_host<B>(req: &Request<B>) -> Option<&str> {
    req.headers()
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| req.uri().authority().map(|a| a.as_str()))
}

/// Leading label of a host, e.g. `"wiki"` for `"wiki.example.com:8080"`.
pub fn subdomain(host: &str) -> &str {
    let host = strip_port(host);
    host.split('.').next().unwrap_or(host)
}

fn strip_port(host: &str) -> &str {
    // bracketed IPv6 literals carry colons of their own
    if host.starts_with('[') {
        return host.split_once(']').map(|(h, _)| &host[..h.len() + 1]).unwrap_or(host);
    }
    host.split_once(':').map(|(h, _)| h).unwrap_or(host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_subdomain() {
        assert_eq!(subdomain("wiki.example.com"), "wiki");
        assert_eq!(subdomain("gh.example.com:8080"), "gh");
        assert_eq!(subdomain("localhost:3000"), "localhost");
        assert_eq!(subdomain("example"), "example");
        assert_eq!(subdomain(""), "");
        assert_eq!(subdomain("[::1]:3000"), "[::1]");
    }

    #[test]
    fn test_subdomain_is_case_sensitive() {
        // callers compare the label verbatim
        assert_eq!(subdomain("WIKI.example.com"), "WIKI");
    }

    #[test]
    fn test_request_host() {
        let req = Request::builder()
            .header("Host", "wiki.example.com")
            .body(Body::default())
            .unwrap();
        assert_eq!(request_host(&req), Some("wiki.example.com"));

        let req = Request::builder()
            .uri("http://gh.example.com/user/repo")
            .body(Body::default())
            .unwrap();
        assert_eq!(request_host(&req), Some("gh.example.com"));

        let req = Request::builder().uri("/").body(Body::default()).unwrap();
        assert_eq!(request_host(&req), None);
    }
}
