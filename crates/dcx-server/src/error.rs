//! API error type and its JSON rendering.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use dcx_compose::ComposeError;
use dcx_locator::LocateError;
use serde_json::json;
use tracing::{error, warn};

/// Realm announced on 401 responses.
pub const AUTH_REALM: &str = r#"Basic realm="Login Required""#;

/// Errors returned by API handlers.
///
/// Every variant renders as `{"error": "<message>"}` with a matching status.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The named resource does not exist (404).
    #[error("{0}")]
    NotFound(String),

    /// The request is malformed (400).
    #[error("{0}")]
    BadRequest(String),

    /// The resource already exists (409).
    #[error("{0}")]
    Conflict(String),

    /// Credentials are missing or wrong (401).
    #[error("authentication required")]
    Unauthorized,

    /// The compose registry could not be reached or answered garbage (502).
    #[error("registry unavailable: {0}")]
    Upstream(String),

    /// A docker invocation failed (500).
    #[error("{}", docker_message(.0))]
    Docker(ComposeError),

    /// Anything else (500).
    #[error("error: {0}")]
    Internal(String),
}

fn docker_message(err: &ComposeError) -> String {
    if err.is_docker_missing() {
        format!("docker host not found: {err}")
    } else {
        format!("docker exception: {err}")
    }
}

impl ApiError {
    /// Creates a [`ApiError::BadRequest`].
    #[inline]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Creates an [`ApiError::Internal`].
    #[inline]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// The HTTP status this error maps to.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Docker(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<LocateError> for ApiError {
    fn from(err: LocateError) -> Self {
        match err {
            LocateError::UnknownProject(_) => Self::NotFound(err.to_string()),
            LocateError::InvalidProjectName { .. } => Self::BadRequest(err.to_string()),
            LocateError::ProjectExists(_) => Self::Conflict(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<ComposeError> for ApiError {
    fn from(err: ComposeError) -> Self {
        match err {
            ComposeError::ContainerNotFound(_) => Self::NotFound(err.to_string()),
            other => Self::Docker(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        } else if status != StatusCode::UNAUTHORIZED {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let mut response = (status, Json(json!({ "error": self.to_string() }))).into_response();
        if matches!(self, Self::Unauthorized) {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(AUTH_REALM),
            );
        }
        response
    }
}
