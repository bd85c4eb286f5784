//! Project registry types.
//!
//! A [`ProjectRegistry`] maps a project name (the basename of a directory
//! holding a `docker-compose.yml`) to that directory's absolute path.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

/// Mapping from project name to absolute project directory.
///
/// Names are unique. Inserting a name twice keeps the later path and hands
/// the earlier one back to the caller, which is how scans detect basename
/// collisions. Iteration and serialization are ordered by name.
///
/// Serializes as a plain JSON object:
///
/// ```
/// use dcx_core::ProjectRegistry;
///
/// let mut registry = ProjectRegistry::new();
/// registry.insert("web", "/srv/compose/web");
///
/// let json = serde_json::to_string(&registry).unwrap();
/// assert_eq!(json, r#"{"web":"/srv/compose/web"}"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectRegistry {
    projects: BTreeMap<String, Utf8PathBuf>,
}

impl ProjectRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites a project.
    ///
    /// Returns the previously registered directory when `name` was already
    /// present and pointed somewhere else.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        dir: impl Into<Utf8PathBuf>,
    ) -> Option<Utf8PathBuf> {
        let dir = dir.into();
        self.projects
            .insert(name.into(), dir.clone())
            .filter(|previous| *previous != dir)
    }

    /// Returns the directory registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Utf8Path> {
        self.projects.get(name).map(Utf8PathBuf::as_path)
    }

    /// Returns `true` if a project called `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.projects.contains_key(name)
    }

    /// Number of registered projects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    /// Returns `true` if no projects are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Iterates over project names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.projects.keys().map(String::as_str)
    }

    /// Iterates over `(name, directory)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Utf8Path)> {
        self.projects
            .iter()
            .map(|(name, dir)| (name.as_str(), dir.as_path()))
    }
}

impl<N, P> FromIterator<(N, P)> for ProjectRegistry
where
    N: Into<String>,
    P: Into<Utf8PathBuf>,
{
    fn from_iter<I: IntoIterator<Item = (N, P)>>(iter: I) -> Self {
        let mut registry = Self::new();
        for (name, dir) in iter {
            registry.insert(name, dir);
        }
        registry
    }
}

/// Two project directories that share a basename.
///
/// The registry keeps only one of them (`kept`, the one visited last); the
/// other (`replaced`) is unreachable by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectCollision {
    /// The shared project name.
    pub name: String,
    /// Directory that ended up in the registry.
    pub kept: Utf8PathBuf,
    /// Directory that was overwritten.
    pub replaced: Utf8PathBuf,
}
