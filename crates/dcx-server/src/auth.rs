//! Optional HTTP basic authentication.
//!
//! Authentication is off until credentials are configured, either at
//! startup or through `POST /api/v1/authentication`. While on, handlers
//! that take a [`RequireAuth`] argument reject requests without matching
//! `Authorization: Basic ...` credentials.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;

/// A username and password pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

impl Credentials {
    /// Creates credentials.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Decodes the value of an `Authorization: Basic` header.
    ///
    /// Returns `None` for any other scheme or malformed payload.
    #[must_use]
    pub fn from_basic_header(value: &str) -> Option<Self> {
        let (scheme, encoded) = value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }
        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (username, password) = decoded.split_once(':')?;
        Some(Self::new(username, password))
    }

    /// Encodes these credentials as an `Authorization` header value.
    #[must_use]
    pub fn to_basic_header(&self) -> String {
        let raw = format!("{}:{}", self.username, self.password);
        format!("Basic {}", STANDARD.encode(raw))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Runtime-switchable credential check.
#[derive(Debug, Default)]
pub struct AuthGate {
    credentials: RwLock<Option<Credentials>>,
}

impl AuthGate {
    /// Creates a gate, enabled when `credentials` is `Some`.
    #[must_use]
    pub fn new(credentials: Option<Credentials>) -> Self {
        Self {
            credentials: RwLock::new(credentials),
        }
    }

    /// Returns `true` if requests to protected endpoints need credentials.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.credentials.read().is_some()
    }

    /// Turns authentication on with `credentials`.
    pub fn enable(&self, credentials: Credentials) {
        info!(username = %credentials.username, "Basic authentication enabled");
        *self.credentials.write() = Some(credentials);
    }

    /// Turns authentication off.
    pub fn disable(&self) {
        info!("Basic authentication disabled");
        *self.credentials.write() = None;
    }

    /// Checks an `Authorization` header value.
    ///
    /// Always passes while authentication is disabled.
    #[must_use]
    pub fn permits(&self, authorization: Option<&str>) -> bool {
        let guard = self.credentials.read();
        let Some(expected) = guard.as_ref() else {
            return true;
        };
        authorization
            .and_then(Credentials::from_basic_header)
            .is_some_and(|given| given == *expected)
    }
}

/// Extractor guarding protected handlers.
///
/// Rejects with [`ApiError::Unauthorized`] when authentication is enabled
/// and the request does not carry the configured credentials.
#[derive(Debug, Clone, Copy)]
pub struct RequireAuth;

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let authorization = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        if state.auth.permits(authorization) {
            Ok(Self)
        } else {
            debug!(path = %parts.uri.path(), "Rejected unauthenticated request");
            Err(ApiError::Unauthorized)
        }
    }
}
