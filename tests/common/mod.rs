//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, Method, Request, Response, StatusCode},
    Router,
};
use subdomain_proxy::config::{ProxyConfig, RewritePair, RouteConfig};
use subdomain_proxy::{HttpServer, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tower::ServiceExt;

/// A request as seen by a mock upstream.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct Recorded {
    pub method: Method,
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Handle to a running mock upstream.
#[derive(Clone)]
pub struct MockBackend {
    pub addr: SocketAddr,
    recorded: Arc<Mutex<Vec<Recorded>>>,
}

#[allow(dead_code)]
impl MockBackend {
    pub fn origin(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn calls(&self) -> usize {
        self.recorded.lock().unwrap().len()
    }

    pub fn last(&self) -> Recorded {
        self.recorded.lock().unwrap().last().cloned().expect("no upstream call recorded")
    }
}

/// Start a programmable mock backend on an ephemeral port.
///
/// Every request is recorded, then answered by `respond`.
pub async fn start_programmable_backend<F>(respond: F) -> MockBackend
where
    F: Fn(&Recorded) -> Response<Body> + Send + Sync + 'static,
{
    let recorded = Arc::new(Mutex::new(Vec::new()));
    let respond = Arc::new(respond);

    let log = recorded.clone();
    let app = Router::new().fallback(move |request: Request<Body>| {
        let log = log.clone();
        let respond = respond.clone();
        async move {
            let (parts, body) = request.into_parts();
            let body = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();
            let entry = Recorded {
                method: parts.method,
                path_and_query: parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str().to_string())
                    .unwrap_or_default(),
                headers: parts.headers,
                body,
            };
            let response = (respond.as_ref())(&entry);
            log.lock().unwrap().push(entry);
            response
        }
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockBackend { addr, recorded }
}

/// Start a mock backend that returns a fixed 200 response.
#[allow(dead_code)]
pub async fn start_mock_backend(body: &'static str) -> MockBackend {
    start_programmable_backend(move |_| {
        Response::builder()
            .status(StatusCode::OK)
            .header("content-type", "text/plain")
            .body(Body::from(body))
            .unwrap()
    })
    .await
}

/// Handle to an upstream that writes fixed bytes and then holds the socket.
#[allow(dead_code)]
pub struct RawBackend {
    pub addr: SocketAddr,
    closed: Arc<Notify>,
}

#[allow(dead_code)]
impl RawBackend {
    pub fn origin(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Resolves once a connection has been closed by the proxy.
    pub async fn closed(&self) {
        self.closed.notified().await
    }
}

/// Start an upstream that reads one request head, writes `response`
/// verbatim and then keeps the connection open until the peer closes it.
///
/// Lets tests send a partial chunked body and observe what the proxy does
/// before the upstream finishes.
#[allow(dead_code)]
pub async fn start_raw_backend(response: &'static [u8]) -> RawBackend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let closed = Arc::new(Notify::new());

    let notify = closed.clone();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let notify = notify.clone();
            tokio::spawn(async move {
                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => head.extend_from_slice(&buf[..n]),
                    }
                }
                if socket.write_all(response).await.is_err() {
                    return;
                }
                loop {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(_) => {}
                    }
                }
                notify.notify_one();
            });
        }
    });

    RawBackend { addr, closed }
}

/// A route pointing at a mock upstream.
#[allow(dead_code)]
pub fn route(subdomain: &str, upstream: &str) -> RouteConfig {
    RouteConfig {
        subdomain: subdomain.to_string(),
        upstream: upstream.to_string(),
        require_auth: false,
        body_rewrites: Vec::new(),
        location_rewrites: Vec::new(),
    }
}

#[allow(dead_code)]
pub fn pair(from: &str, to: &str) -> RewritePair {
    RewritePair::new(from, to)
}

/// Config for `example.com` with the given routes.
pub fn config(routes: Vec<RouteConfig>) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.domain = "example.com".to_string();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.routes = routes;
    config
}

/// Drive one request through the proxy router without a listener.
pub async fn send(server: &HttpServer, request: Request<Body>) -> Response<Body> {
    server.router().oneshot(request).await.unwrap()
}

/// Collect a response body as text.
#[allow(dead_code)]
pub async fn text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Serve the proxy on an ephemeral port until the returned `Shutdown` fires.
#[allow(dead_code)]
pub async fn spawn_server(server: HttpServer) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    tokio::spawn(server.run(listener, shutdown.subscribe()));
    (addr, shutdown)
}
