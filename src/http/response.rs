//! Fixed responses served without contacting an upstream.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

/// Disallow-all crawler policy.
pub const ROBOTS_TXT: &str = "User-agent: *\nDisallow: /\n";

/// `GET /robots.txt` on any host.
pub async fn robots_txt() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"))],
        ROBOTS_TXT,
    )
        .into_response()
}
