//! Container log handlers.
//!
//! `/logs/{name}/{segment}` is ambiguous: a numeric segment is a line limit
//! for the whole project, anything else is a container id.

use axum::Json;
use axum::extract::{Path, State};
use dcx_compose::LogTail;
use serde_json::{Map, Value, json};

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /logs/{name}`
pub(crate) async fn project_logs(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    all_container_logs(&state, &name, LogTail::All).await
}

/// `GET /logs/{name}/{limit}` or `GET /logs/{name}/{container_id}`
pub(crate) async fn limited_or_container_logs(
    State(state): State<AppState>,
    Path((name, segment)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    match parse_limit(&segment) {
        Some(limit) => all_container_logs(&state, &name, LogTail::Lines(limit)).await,
        None => single_container_logs(&state, &name, &segment, LogTail::All).await,
    }
}

/// `GET /logs/{name}/{container_id}/{limit}`
pub(crate) async fn container_logs(
    State(state): State<AppState>,
    Path((name, container_id, limit)): Path<(String, String, String)>,
) -> Result<Json<Value>, ApiError> {
    let limit = parse_limit(&limit)
        .ok_or_else(|| ApiError::bad_request(format!("invalid line limit: {limit}")))?;
    single_container_logs(&state, &name, &container_id, LogTail::Lines(limit)).await
}

/// Parses a line limit. Only plain ASCII digits are accepted, no sign.
fn parse_limit(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

async fn all_container_logs(
    state: &AppState,
    name: &str,
    tail: LogTail,
) -> Result<Json<Value>, ApiError> {
    let project = state.project(name)?;
    let logs: Map<String, Value> = state
        .compose
        .project_logs(&project, tail)
        .await?
        .into_iter()
        .map(|(container, lines)| (container, json!(lines)))
        .collect();
    Ok(Json(json!({ "logs": logs })))
}

async fn single_container_logs(
    state: &AppState,
    name: &str,
    container_id: &str,
    tail: LogTail,
) -> Result<Json<Value>, ApiError> {
    state.project(name)?;
    let lines = state.compose.container_logs(container_id, tail).await?;
    Ok(Json(json!({ "logs": lines })))
}
