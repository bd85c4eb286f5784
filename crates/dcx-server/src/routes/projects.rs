//! Project lifecycle handlers.

use std::io;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use dcx_compose::ProjectCommand;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::state::AppState;

/// Body naming a project: `{"id": "<name>"}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ProjectId {
    id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScaleRequest {
    project: String,
    service: String,
    num: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateRequest {
    name: String,
    yml: String,
}

/// `GET /projects`: rescans the root and lists every project.
pub(crate) async fn list_projects(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let store = Arc::clone(&state.store);
    let outcome = tokio::task::spawn_blocking(move || store.refresh())
        .await
        .map_err(|err| ApiError::internal(format!("scan task failed: {err}")))?;

    Ok(Json(json!({ "projects": outcome.into_registry() })))
}

/// `GET /projects/{name}`
pub(crate) async fn project_containers(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let project = state.project(&name)?;
    let containers = state.compose.ps(&project).await?;
    Ok(Json(json!({ "containers": containers })))
}

/// `GET /projects/yml/{name}`
pub(crate) async fn project_yml(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let path = state.store.descriptor_path(&name)?;
    let yml = tokio::fs::read_to_string(&path).await.map_err(|err| {
        if err.kind() == io::ErrorKind::NotFound {
            ApiError::NotFound(format!("descriptor not found: {path}"))
        } else {
            ApiError::internal(format!("{path}: {err}"))
        }
    })?;
    Ok(Json(json!({ "yml": yml })))
}

/// `GET /projects/{name}/{container_id}`
pub(crate) async fn container(
    State(state): State<AppState>,
    Path((name, container_id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    state.project(&name)?;
    let details = state.compose.container(&container_id).await?;
    Ok(Json(json!(details)))
}

/// `DELETE /projects/{name}`
pub(crate) async fn kill(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    run_command(&state, &name, ProjectCommand::Kill).await
}

/// `PUT /projects`
pub(crate) async fn pull(
    _auth: RequireAuth,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ProjectId>,
) -> Result<Json<Value>, ApiError> {
    run_command(&state, &body.id, ProjectCommand::Pull).await
}

/// `POST /build`
pub(crate) async fn build(
    _auth: RequireAuth,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ProjectId>,
) -> Result<Json<Value>, ApiError> {
    run_command(&state, &body.id, ProjectCommand::Build).await
}

/// `POST /start`
pub(crate) async fn start(
    _auth: RequireAuth,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ProjectId>,
) -> Result<Json<Value>, ApiError> {
    run_command(&state, &body.id, ProjectCommand::Start).await
}

/// `POST /stop`
pub(crate) async fn stop(
    _auth: RequireAuth,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ProjectId>,
) -> Result<Json<Value>, ApiError> {
    run_command(&state, &body.id, ProjectCommand::Stop).await
}

/// `POST /projects`: `docker compose up -d`.
pub(crate) async fn up(
    _auth: RequireAuth,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ProjectId>,
) -> Result<Json<Value>, ApiError> {
    let project = state.project(&body.id)?;
    let containers = state.compose.up(&project).await?;
    let names: Vec<String> = containers.into_iter().map(|c| c.name).collect();
    Ok(Json(json!({ "command": "up", "containers": names })))
}

/// `PUT /services`
pub(crate) async fn scale(
    _auth: RequireAuth,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ScaleRequest>,
) -> Result<Json<Value>, ApiError> {
    let replicas = parse_replicas(&body.num)?;
    let project = state.project(&body.project)?;
    state
        .compose
        .scale(&project, &body.service, replicas)
        .await?;
    Ok(Json(json!({ "command": "scale" })))
}

/// `POST /create`
pub(crate) async fn create(
    _auth: RequireAuth,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateRequest>,
) -> Result<Json<Value>, ApiError> {
    let store = Arc::clone(&state.store);
    let path = tokio::task::spawn_blocking(move || store.create_project(&body.name, &body.yml))
        .await
        .map_err(|err| ApiError::internal(format!("create task failed: {err}")))??;

    Ok(Json(json!({ "path": path })))
}

async fn run_command(
    state: &AppState,
    name: &str,
    command: ProjectCommand,
) -> Result<Json<Value>, ApiError> {
    let project = state.project(name)?;
    state.compose.run(&project, command).await?;
    info!(project = %name, command = command.as_str(), "Handled project command");
    Ok(Json(json!({ "command": command.as_str() })))
}

/// Accepts a replica count as a JSON number or a numeric string.
fn parse_replicas(num: &Value) -> Result<u32, ApiError> {
    let parsed = match num {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| ApiError::bad_request(format!("invalid replica count: {num}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_replicas_accepts_numbers_and_numeric_strings() {
        assert_eq!(parse_replicas(&json!(3)).unwrap(), 3);
        assert_eq!(parse_replicas(&json!("4")).unwrap(), 4);
        assert_eq!(parse_replicas(&json!(" 0 ")).unwrap(), 0);
    }

    #[test]
    fn test_parse_replicas_rejects_everything_else() {
        for bad in [json!(-1), json!(1.5), json!("two"), json!(null), json!([1])] {
            assert!(
                matches!(parse_replicas(&bad), Err(ApiError::BadRequest(_))),
                "{bad} should be rejected"
            );
        }
    }
}
