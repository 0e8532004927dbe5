//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, request ID, optional timeout)
//! - Resolve the Host subdomain to a route (or 404)
//! - Gate protected routes (401 + challenge)
//! - Forward to the upstream and return the rewritten response
//! - Observability (metrics, request IDs)

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::error::{ProxyError, StartupError};
use crate::http::response::robots_txt;
use crate::observability::metrics;
use crate::proxy::fetch::{self, FetchEndpoint};
use crate::proxy::{build_client, Forwarder, HttpsClient};
use crate::routing::{request_host, subdomain, RouteTable};
use crate::security::Authenticator;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub auth: Arc<Authenticator>,
    pub forwarder: Forwarder,
    /// The fetch endpoint, when enabled.
    pub fetch: Option<FetchEndpoint>,
}

/// HTTP server for the subdomain proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, StartupError> {
        let client = build_client().map_err(StartupError::Tls)?;
        Self::with_client(config, client)
    }

    /// Create a server that reaches upstreams through `client`.
    pub fn with_client(config: ProxyConfig, client: HttpsClient) -> Result<Self, StartupError> {
        let routes = RouteTable::from_config(&config.routes, &config.domain)?;
        let auth = Authenticator::new(&config.auth)?;

        tracing::info!(
            routes = routes.len(),
            domain = %config.domain,
            fetch_enabled = config.fetch.enabled,
            "Route table built"
        );
        if routes.is_empty() {
            tracing::warn!("No routes configured; every proxied host will get 404");
        }

        let state = AppState {
            routes: Arc::new(routes),
            auth: Arc::new(auth),
            forwarder: Forwarder::new(client),
            fetch: FetchEndpoint::from_config(&config.fetch),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/robots.txt", get(robots_txt))
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state);

        if let Some(secs) = config.timeouts.request_secs {
            router = router.layer(TimeoutLayer::new(Duration::from_secs(secs)));
        }

        router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for driving requests without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            domain = %self.config.domain,
            "HTTP server starting"
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler.
/// Resolves the route, checks auth, and forwards the request.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let host = request_host(&request).unwrap_or_default().to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    tracing::info!(
        request_id = %request_id,
        method = %method,
        host = %host,
        path = %path,
        "Proxying request"
    );

    let route = route_label(&state, &host);
    let response = match dispatch(&state, request, &host).await {
        Ok(response) => response,
        Err(err) => {
            match &err {
                ProxyError::RouteNotFound { .. } => {
                    tracing::warn!(request_id = %request_id, host = %host, "No route matched");
                }
                ProxyError::Unauthorized { .. } => {
                    tracing::info!(request_id = %request_id, host = %host, "Authorization failed");
                }
                ProxyError::InvalidResourceUrl(reason) => {
                    tracing::debug!(request_id = %request_id, reason = %reason, "Rejected fetch");
                }
                _ => {
                    tracing::error!(request_id = %request_id, host = %host, error = %err, "Upstream error");
                }
            }
            err.into_response()
        }
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), route, start_time);
    response
}

/// Route the request: fetch endpoint, declared route, or 404.
async fn dispatch(
    state: &AppState,
    request: Request<Body>,
    host: &str,
) -> Result<Response, ProxyError> {
    let label = subdomain(host);

    if let Some(endpoint) = state.fetch.as_ref().filter(|e| &*e.subdomain == label) {
        return fetch::fetch_resource(&state.forwarder, endpoint, request).await;
    }

    let rule = state
        .routes
        .lookup(label)
        .ok_or_else(|| ProxyError::RouteNotFound { host: host.to_string() })?;

    if rule.require_auth && !state.auth.authenticate(request.headers()) {
        return Err(ProxyError::Unauthorized {
            challenge: state.auth.challenge().clone(),
        });
    }

    state.forwarder.forward(request, rule).await
}

/// Metric label for a host: the route name, or "none" for unknown hosts.
fn route_label<'a>(state: &'a AppState, host: &str) -> &'a str {
    let label = subdomain(host);
    if let Some(rule) = state.routes.lookup(label) {
        return &rule.subdomain;
    }
    match &state.fetch {
        Some(endpoint) if &*endpoint.subdomain == label => &*endpoint.subdomain,
        _ => "none",
    }
}
