//! HTTP facade over docker compose projects.
//!
//! Serves the `/api/v1` JSON API on top of a [`ProjectStore`] and a
//! [`ComposeClient`]:
//!
//! - project listing, lifecycle commands, scaling and creation
//! - container details and logs
//! - a proxy for the compose registry search API
//! - runtime docker host and basic-auth settings
//!
//! Any other path falls through to an optional static UI directory.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use dcx_compose::ComposeClient;
//! use dcx_core::RegistryConfig;
//! use dcx_locator::{LocateConfig, ProjectLocator, ProjectStore};
//! use dcx_server::{AppState, AuthGate, RegistryClient, build_router};
//! use camino::Utf8Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let locator = ProjectLocator::new(LocateConfig::new(Utf8Path::new("/srv/compose")))?;
//! let (store, _) = ProjectStore::open(locator);
//! let state = AppState::new(
//!     Arc::new(store),
//!     ComposeClient::new(),
//!     Arc::new(AuthGate::default()),
//!     RegistryClient::new(&RegistryConfig::default())?,
//! );
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//! dcx_server::serve(listener, build_router(state, None), std::future::pending()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! [`ProjectStore`]: dcx_locator::ProjectStore
//! [`ComposeClient`]: dcx_compose::ComposeClient

#![deny(clippy::all)]
#![warn(missing_docs)]

mod auth;
mod error;
mod extract;
mod registry;
mod routes;
mod state;

use std::future::Future;
use std::io;

use axum::Router;
use camino::Utf8Path;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};

pub use auth::{AuthGate, Credentials, RequireAuth};
pub use error::{AUTH_REALM, ApiError};
pub use extract::JsonBody;
pub use registry::RegistryClient;
pub use routes::API_PREFIX;
pub use state::AppState;

/// Builds the application router.
///
/// # Arguments
///
/// * `state` - Shared handler state
/// * `static_dir` - Directory served for every non-API path, if any
pub fn build_router(state: AppState, static_dir: Option<&Utf8Path>) -> Router {
    let router = Router::new().nest(API_PREFIX, routes::api_router());

    let router = match static_dir {
        Some(dir) => {
            info!(dir = %dir, "Serving static UI");
            router.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true))
        }
        None => router,
    };

    router
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Serves `router` on `listener` until `shutdown` resolves.
///
/// In-flight requests are allowed to finish after `shutdown` fires.
///
/// # Errors
///
/// Returns an error if accepting connections fails.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "API listening");
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}
