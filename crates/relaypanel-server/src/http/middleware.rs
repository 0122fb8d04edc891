//! Request logging.

use std::time::Instant;

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tracing::info;
use uuid::Uuid;

/// Header carrying the per-request id, echoed on the response.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Log method, path, status and duration of every request.
///
/// A client-supplied `x-request-id` is kept; otherwise a v4 UUID is assigned.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let start = Instant::now();

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    info!(
        %method,
        %path,
        status = response.status().as_u16(),
        req_id = %request_id,
        dur = ?start.elapsed(),
        "http"
    );
    response
}
