//! Docker host and authentication settings.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::auth::{Credentials, RequireAuth};
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub(crate) struct HostRequest {
    #[serde(default)]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CredentialsRequest {
    username: String,
    password: String,
}

/// `GET /host`
pub(crate) async fn host(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "host": state.compose.host().get() }))
}

/// `POST /host`: sets the docker host, or clears it for `{"id": null}`.
pub(crate) async fn set_host(
    _auth: RequireAuth,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<HostRequest>,
) -> Json<Value> {
    match body.id {
        Some(host) => {
            info!(%host, "Docker host set");
            state.compose.host().set(host.clone());
            Json(json!({ "host": host }))
        }
        None => {
            info!("Docker host cleared");
            state.compose.host().clear();
            Json(json!({}))
        }
    }
}

/// `GET /authentication`
pub(crate) async fn authentication(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "enabled": state.auth.is_enabled() }))
}

/// `POST /authentication`
pub(crate) async fn enable_authentication(
    _auth: RequireAuth,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CredentialsRequest>,
) -> Result<Json<Value>, ApiError> {
    if body.username.is_empty() {
        return Err(ApiError::bad_request("username must not be empty"));
    }
    // Basic auth splits user and password at the first ':'
    if body.username.contains(':') {
        return Err(ApiError::bad_request("username must not contain ':'"));
    }
    state
        .auth
        .enable(Credentials::new(body.username, body.password));
    Ok(Json(json!({ "enabled": true })))
}

/// `DELETE /authentication`
pub(crate) async fn disable_authentication(
    _auth: RequireAuth,
    State(state): State<AppState>,
) -> Json<Value> {
    state.auth.disable();
    Json(json!({ "enabled": false }))
}
