//! Static web UI files.

use std::io;
use std::path::{Component, Path, PathBuf};

use axum::extract::State;
use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use tracing::warn;

use super::SharedState;

pub const INDEX_FILE: &str = "index.html";

/// `static/` next to the executable, or relative to the working directory
/// when the executable path is unknown.
pub fn default_static_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("static")))
        .unwrap_or_else(|| PathBuf::from("static"))
}

/// Map a request path onto a file below `root`.
///
/// Returns `None` for paths that would escape `root`.
pub fn resolve_path(root: &Path, request_path: &str) -> Option<PathBuf> {
    let mut resolved = root.to_path_buf();
    for segment in request_path.split('/').filter(|s| !s.is_empty() && *s != ".") {
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) => resolved.push(part),
            _ => return None,
        }
    }

    if request_path.is_empty() || request_path.ends_with('/') {
        resolved.push(INDEX_FILE);
    }
    Some(resolved)
}

pub fn content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("woff2") => "font/woff2",
        Some("webmanifest") => "application/manifest+json",
        _ => "application/octet-stream",
    }
}

/// Fallback handler serving files from the static directory.
pub async fn serve_static(State(state): State<SharedState>, uri: Uri) -> Response {
    let Some(mut path) = resolve_path(&state.static_dir, uri.path()) else {
        return (StatusCode::BAD_REQUEST, "invalid path").into_response();
    };

    if tokio::fs::metadata(&path)
        .await
        .is_ok_and(|metadata| metadata.is_dir())
    {
        path.push(INDEX_FILE);
    }

    match tokio::fs::read(&path).await {
        Ok(contents) => ([(header::CONTENT_TYPE, content_type(&path))], contents).into_response(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            (StatusCode::NOT_FOUND, "404 page not found").into_response()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "static file read failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
