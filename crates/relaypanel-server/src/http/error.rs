use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use relaypanel_hardware::HardwareError;
use relaypanel_storage::StorageError;
use relaypanel_tv::TvError;
use tracing::warn;

/// Handler error, rendered as a plain-text body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Hardware(#[from] HardwareError),

    #[error("adb client not configured")]
    TvNotConfigured,

    #[error(transparent)]
    Tv(#[from] TvError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Hardware(e) if e.is_validation() => StatusCode::BAD_REQUEST,
            Self::Hardware(_) | Self::TvNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            Self::Tv(e) if e.is_unknown_command() => StatusCode::NOT_FOUND,
            Self::Tv(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(status = status.as_u16(), error = %self, "request failed");
        }
        (status, self.to_string()).into_response()
    }
}
