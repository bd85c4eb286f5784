//! Shared handler state.

use std::sync::Arc;

use dcx_compose::{ComposeClient, ProjectRef};
use dcx_locator::ProjectStore;

use crate::auth::AuthGate;
use crate::error::ApiError;
use crate::registry::RegistryClient;

/// State cloned into every handler.
///
/// All fields are handles; cloning is cheap.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Project registry and scanner.
    pub store: Arc<ProjectStore>,
    /// Docker compose client, carrying the docker host override.
    pub compose: ComposeClient,
    /// Basic authentication switch.
    pub auth: Arc<AuthGate>,
    /// Compose registry proxy.
    pub registry: RegistryClient,
}

impl AppState {
    /// Bundles the service components.
    #[must_use]
    pub fn new(
        store: Arc<ProjectStore>,
        compose: ComposeClient,
        auth: Arc<AuthGate>,
        registry: RegistryClient,
    ) -> Self {
        Self {
            store,
            compose,
            auth,
            registry,
        }
    }

    /// Resolves a registered project for the compose client.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if `name` is not in the registry.
    pub fn project(&self, name: &str) -> Result<ProjectRef, ApiError> {
        let dir = self.store.require(name)?;
        Ok(ProjectRef::new(&dir, self.store.descriptor_name()))
    }
}
