//! The `DOCKER_HOST` override shared by every docker call.

use std::sync::Arc;

use parking_lot::RwLock;

/// Shared, runtime-changeable docker host.
///
/// Clones share the same value. When set, it is passed to child processes
/// as `DOCKER_HOST`; when cleared, `DOCKER_HOST` is removed from their
/// environment so docker falls back to its local socket.
///
/// # Examples
///
/// ```
/// use dcx_compose::DockerHost;
///
/// let host = DockerHost::default();
/// let shared = host.clone();
/// host.set("tcp://10.0.0.5:2375");
/// assert_eq!(shared.get().as_deref(), Some("tcp://10.0.0.5:2375"));
/// shared.clear();
/// assert!(host.get().is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DockerHost {
    inner: Arc<RwLock<Option<String>>>,
}

impl DockerHost {
    /// Creates a host holding `initial`.
    #[must_use]
    pub fn new(initial: Option<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    /// Returns the current override.
    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.inner.read().clone()
    }

    /// Replaces the override.
    pub fn set(&self, host: impl Into<String>) {
        *self.inner.write() = Some(host.into());
    }

    /// Removes the override.
    pub fn clear(&self) {
        *self.inner.write() = None;
    }
}
