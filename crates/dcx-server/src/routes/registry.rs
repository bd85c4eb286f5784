//! Compose registry proxy handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub(crate) struct SearchRequest {
    query: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct YmlRequest {
    id: Value,
}

/// `POST /search`: the registry's status code is passed through.
pub(crate) async fn search(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<SearchRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (status, results) = state.registry.search(&body.query).await?;
    Ok((status, Json(results)))
}

/// `POST /yml`
pub(crate) async fn yml(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<YmlRequest>,
) -> Result<Json<Value>, ApiError> {
    // Registry ids are numeric but clients send them either way.
    let id = match body.id {
        Value::String(id) => id,
        Value::Number(id) => id.to_string(),
        other => return Err(ApiError::bad_request(format!("invalid registry id: {other}"))),
    };
    Ok(Json(state.registry.yml(&id).await?))
}
