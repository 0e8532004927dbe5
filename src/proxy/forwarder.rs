//! Upstream request forwarding.
//!
//! # Responsibilities
//! - Build the upstream request (verbatim method/path/query, adjusted headers)
//! - Stream the inbound body upstream without buffering
//! - Hand the upstream response to the rewriter before anything is sent
//!
//! # Design Decisions
//! - One shared client; upstream origins are reached over TLS
//! - Compression is disabled upstream so rewriting sees plain text
//! - Failures are reported once as 502, never retried

use axum::body::Body;
use axum::http::header::{
    HeaderMap, HeaderValue, ACCEPT_ENCODING, CONTENT_LENGTH, HOST, TRANSFER_ENCODING,
};
use axum::http::{Request, Response, Version};
use hyper::body::Incoming;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::error::ProxyError;
use crate::proxy::target::UpstreamTarget;
use crate::rewrite::{self, RewriteRules, TransferStrategy};
use crate::routing::RouteRule;

/// HTTP client used for every upstream call.
pub type HttpsClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Build the upstream client, trusting the bundled webpki roots.
///
/// The `ring` provider is named explicitly; other crates in the graph may
/// compile in a second rustls provider, and then no process default exists.
/// Route origins are `https`; plain `http` origins are accepted so local
/// upstreams can be used in development and tests.
pub fn build_client() -> Result<HttpsClient, std::io::Error> {
    let connector = HttpsConnectorBuilder::new()
        .with_provider_and_webpki_roots(rustls::crypto::ring::default_provider())
        .map_err(std::io::Error::other)?
        .https_or_http()
        .enable_http1()
        .build();

    Ok(Client::builder(TokioExecutor::new()).build(connector))
}

/// Forwards requests upstream and applies response rewriting.
#[derive(Clone)]
pub struct Forwarder {
    client: HttpsClient,
}

impl Forwarder {
    pub fn new(client: HttpsClient) -> Self {
        Self { client }
    }

    /// Forward a request under a route; the same rule drives the outbound
    /// target and the response rewriting.
    pub async fn forward(
        &self,
        request: Request<Body>,
        rule: &RouteRule,
    ) -> Result<Response<Body>, ProxyError> {
        let target = UpstreamTarget::for_route(&rule.upstream, request.uri())?;
        self.send(request, target, &rule.rewrites).await
    }

    /// Send a request to an explicit target and rewrite the response.
    pub async fn send(
        &self,
        request: Request<Body>,
        target: UpstreamTarget,
        rules: &RewriteRules,
    ) -> Result<Response<Body>, ProxyError> {
        let (parts, body) = request.into_parts();

        let mut upstream = Request::builder()
            .method(parts.method)
            .uri(target.uri)
            .version(Version::HTTP_11)
            .body(body)?;
        *upstream.headers_mut() = upstream_request_headers(&parts.headers, target.host);

        tracing::debug!(
            method = %upstream.method(),
            uri = %upstream.uri(),
            "Sending upstream request"
        );

        let response: Response<Incoming> = self.client.request(upstream).await?;
        let (mut parts, body) = response.into_parts();
        parts.headers = rewrite::response_headers(&parts.headers, &rules.location);

        match TransferStrategy::for_rules(rules) {
            TransferStrategy::StreamThrough => Ok(Response::from_parts(parts, Body::new(body))),
            TransferStrategy::BufferAndRewrite => {
                let bytes = axum::body::to_bytes(Body::new(body), usize::MAX)
                    .await
                    .map_err(ProxyError::UpstreamBody)?;
                let rewritten = rewrite::body::rewrite_bytes(bytes.to_vec(), &rules.body);

                // framing no longer matches the rewritten body
                parts.headers.remove(CONTENT_LENGTH);
                parts.headers.remove(TRANSFER_ENCODING);

                Ok(Response::from_parts(parts, Body::from(rewritten)))
            }
        }
    }
}

/// Copy inbound headers for the upstream request.
///
/// `Host` is replaced with the upstream authority and `Accept-Encoding` is
/// forced to `identity`; everything else passes through in order.
pub fn upstream_request_headers(inbound: &HeaderMap, host: HeaderValue) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(inbound.len() + 1);

    for (name, value) in inbound {
        if name == HOST || name == ACCEPT_ENCODING {
            continue;
        }
        out.append(name.clone(), value.clone());
    }

    out.insert(HOST, host);
    out.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));
    out
}
