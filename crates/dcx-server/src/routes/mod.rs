//! `/api/v1` route table.

mod logs;
mod projects;
mod registry;
mod settings;

use axum::Router;
use axum::routing::{get, post, put};

use crate::state::AppState;

/// Path prefix of every API route.
pub const API_PREFIX: &str = "/api/v1";

/// Builds the API routes, relative to [`API_PREFIX`].
pub(crate) fn api_router() -> Router<AppState> {
    Router::new()
        // Projects
        .route(
            "/projects",
            get(projects::list_projects)
                .put(projects::pull)
                .post(projects::up),
        )
        .route("/projects/yml/{name}", get(projects::project_yml))
        .route(
            "/projects/{name}",
            get(projects::project_containers).delete(projects::kill),
        )
        .route("/projects/{name}/{container_id}", get(projects::container))
        .route("/services", put(projects::scale))
        .route("/build", post(projects::build))
        .route("/start", post(projects::start))
        .route("/stop", post(projects::stop))
        .route("/create", post(projects::create))
        // Logs
        .route("/logs/{name}", get(logs::project_logs))
        .route("/logs/{name}/{segment}", get(logs::limited_or_container_logs))
        .route(
            "/logs/{name}/{container_id}/{limit}",
            get(logs::container_logs),
        )
        // Compose registry
        .route("/search", post(registry::search))
        .route("/yml", post(registry::yml))
        // Settings
        .route("/host", get(settings::host).post(settings::set_host))
        .route(
            "/authentication",
            get(settings::authentication)
                .post(settings::enable_authentication)
                .delete(settings::disable_authentication),
        )
}
