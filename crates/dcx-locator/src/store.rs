//! Service-owned project registry.
//!
//! [`ProjectStore`] holds the registry produced by the most recent scan and
//! hands out cheap snapshots. Readers never block a rebuild for long: a
//! refresh walks the tree without holding the lock and only swaps the `Arc`
//! at the end.
//!
//! # Examples
//!
//! ```no_run
//! use camino::Utf8Path;
//! use dcx_locator::{LocateConfig, ProjectLocator, ProjectStore};
//!
//! let locator = ProjectLocator::new(LocateConfig::new(Utf8Path::new("/srv/compose")))?;
//! let store = ProjectStore::new(locator);
//!
//! store.refresh();
//! if let Some(dir) = store.get("web") {
//!     println!("web lives in {dir}");
//! }
//! # Ok::<(), dcx_locator::LocateError>(())
//! ```

use std::io;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use dcx_core::ProjectRegistry;
use parking_lot::RwLock;
use tracing::info;

use crate::error::LocateError;
use crate::{ProjectLocator, ScanOutcome};

/// Thread-safe holder of the current [`ProjectRegistry`].
///
/// Starts empty; call [`refresh`](Self::refresh) to populate it. The
/// registry is authoritative until the next refresh.
#[derive(Debug)]
pub struct ProjectStore {
    locator: ProjectLocator,
    registry: RwLock<Arc<ProjectRegistry>>,
}

impl ProjectStore {
    /// Creates an empty store backed by `locator`.
    #[must_use]
    pub fn new(locator: ProjectLocator) -> Self {
        Self {
            locator,
            registry: RwLock::new(Arc::new(ProjectRegistry::new())),
        }
    }

    /// Creates a store and performs the first scan.
    ///
    /// Returns the store together with the outcome of that scan so callers
    /// can decide what to do about an invalid root.
    #[must_use]
    pub fn open(locator: ProjectLocator) -> (Self, ScanOutcome) {
        let store = Self::new(locator);
        let outcome = store.refresh();
        (store, outcome)
    }

    /// Returns the scan root.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        self.locator.root()
    }

    /// Returns the descriptor file name projects are recognized by.
    #[inline]
    #[must_use]
    pub fn descriptor_name(&self) -> &str {
        &self.locator.config().descriptor_name
    }

    /// Rescans the tree and replaces the registry.
    ///
    /// An invalid root replaces the registry with an empty one; the returned
    /// outcome says why.
    pub fn refresh(&self) -> ScanOutcome {
        let outcome = self.locator.locate();
        let registry = Arc::new(outcome.registry());
        *self.registry.write() = registry;
        outcome
    }

    /// Returns the current registry.
    #[must_use]
    pub fn snapshot(&self) -> Arc<ProjectRegistry> {
        Arc::clone(&self.registry.read())
    }

    /// Returns the directory of project `name`, if registered.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Utf8PathBuf> {
        self.registry.read().get(name).map(Utf8Path::to_owned)
    }

    /// Returns the directory of project `name`.
    ///
    /// # Errors
    ///
    /// Returns [`LocateError::UnknownProject`] if `name` is not registered.
    pub fn require(&self, name: &str) -> Result<Utf8PathBuf, LocateError> {
        self.get(name)
            .ok_or_else(|| LocateError::UnknownProject(name.to_owned()))
    }

    /// Returns the path of project `name`'s descriptor file.
    ///
    /// # Errors
    ///
    /// Returns [`LocateError::UnknownProject`] if `name` is not registered.
    pub fn descriptor_path(&self, name: &str) -> Result<Utf8PathBuf, LocateError> {
        let dir = self.require(name)?;
        Ok(dir.join(&self.locator.config().descriptor_name))
    }

    /// Creates a new project directly under the root and rescans.
    ///
    /// The directory `root/name` must not exist yet. The descriptor is
    /// written with `contents` verbatim.
    ///
    /// # Returns
    ///
    /// The path of the written descriptor file.
    ///
    /// # Errors
    ///
    /// - [`LocateError::InvalidProjectName`] if `name` is empty, `.`/`..`, or
    ///   contains a path separator or NUL
    /// - [`LocateError::ProjectExists`] if the directory already exists
    /// - [`LocateError::Io`] if a filesystem operation fails
    pub fn create_project(&self, name: &str, contents: &str) -> Result<Utf8PathBuf, LocateError> {
        validate_project_name(name)?;

        let root = self.root();
        std::fs::create_dir_all(root).map_err(|err| LocateError::io(root, err))?;

        let dir = root.join(name);
        match std::fs::create_dir(&dir) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                return Err(LocateError::ProjectExists(dir));
            }
            Err(err) => return Err(LocateError::io(dir, err)),
        }

        let descriptor = dir.join(&self.locator.config().descriptor_name);
        std::fs::write(&descriptor, contents)
            .map_err(|err| LocateError::io(descriptor.clone(), err))?;

        info!(project = %name, path = %descriptor, "Created project");
        self.refresh();
        Ok(descriptor)
    }
}

fn validate_project_name(name: &str) -> Result<(), LocateError> {
    let reason = if name.trim().is_empty() {
        Some("must not be empty")
    } else if name == "." || name == ".." {
        Some("must not be a relative path segment")
    } else if name.contains(['/', '\\']) {
        Some("must not contain path separators")
    } else if name.contains('\0') {
        Some("must not contain NUL")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(LocateError::InvalidProjectName {
            name: name.to_owned(),
            reason,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LocateConfig;
    use std::fs;
    use tempfile::TempDir;

    fn store_in(temp: &TempDir) -> ProjectStore {
        let root = Utf8Path::from_path(temp.path()).unwrap();
        ProjectStore::new(ProjectLocator::new(LocateConfig::new(root)).unwrap())
    }

    #[test]
    fn test_store_starts_empty_until_refresh() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("web")).unwrap();
        fs::write(temp.path().join("web/docker-compose.yml"), "").unwrap();

        let store = store_in(&temp);
        assert!(store.snapshot().is_empty());

        let outcome = store.refresh();
        assert!(!outcome.is_invalid_root());
        assert!(store.get("web").is_some());
    }

    #[test]
    fn test_open_scans_immediately() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("web")).unwrap();
        fs::write(temp.path().join("web/docker-compose.yml"), "").unwrap();
        let root = Utf8Path::from_path(temp.path()).unwrap();

        let (store, outcome) = ProjectStore::open(ProjectLocator::new(LocateConfig::new(root)).unwrap());

        assert!(!outcome.is_invalid_root());
        assert!(store.snapshot().contains("web"));
    }

    #[test]
    fn test_snapshot_is_stable_across_refresh() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        store.refresh();
        let before = store.snapshot();

        fs::create_dir(temp.path().join("db")).unwrap();
        fs::write(temp.path().join("db/docker-compose.yml"), "").unwrap();
        store.refresh();

        assert!(before.is_empty());
        assert!(store.snapshot().contains("db"));
    }

    #[test]
    fn test_require_unknown_project() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        assert!(matches!(
            store.require("ghost"),
            Err(LocateError::UnknownProject(name)) if name == "ghost"
        ));
    }

    #[test]
    fn test_create_project_writes_descriptor_and_registers() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);

        let path = store
            .create_project("api", "services:\n  api:\n    image: nginx\n")
            .unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "services:\n  api:\n    image: nginx\n"
        );
        assert_eq!(store.descriptor_path("api").unwrap(), path);
    }

    #[test]
    fn test_create_project_rejects_existing_directory() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("taken")).unwrap();
        let store = store_in(&temp);

        assert!(matches!(
            store.create_project("taken", ""),
            Err(LocateError::ProjectExists(_))
        ));
    }

    #[test]
    fn test_create_project_rejects_bad_names() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);

        for name in ["", "..", ".", "a/b", "a\\b", "nul\0"] {
            assert!(
                matches!(
                    store.create_project(name, ""),
                    Err(LocateError::InvalidProjectName { .. })
                ),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_create_project_creates_missing_root() {
        let temp = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().join("fresh")).unwrap();
        let store = ProjectStore::new(ProjectLocator::new(LocateConfig::new(&root)).unwrap());

        assert!(store.refresh().is_invalid_root());
        store.create_project("first", "").unwrap();
        assert!(!store.refresh().is_invalid_root());
        assert_eq!(store.snapshot().len(), 1);
    }
}
