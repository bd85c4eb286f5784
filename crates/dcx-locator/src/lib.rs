//! Project discovery for the dcx compose facade.
//!
//! This crate finds docker-compose projects on disk. A project is any
//! directory holding a file named exactly `docker-compose.yml`; it is
//! registered under the directory's basename.
//!
//! # Overview
//!
//! - [`DirWalker`]: bounded-depth traversal built on the `ignore` crate
//! - [`ProjectLocator`]: turns a walk into a [`ProjectRegistry`], detecting
//!   invalid roots and basename collisions
//! - [`ProjectStore`]: the service-owned registry, rebuilt by an explicit
//!   [`ProjectStore::refresh`]
//! - [`scan`]: one-shot convenience that returns just the registry
//!
//! # Example
//!
//! ```no_run
//! use camino::Utf8Path;
//! use dcx_core::MaxDepth;
//! use dcx_locator::{LocateConfig, ProjectLocator, ScanOutcome};
//!
//! let config = LocateConfig::new(Utf8Path::new("/opt/docker-compose-projects"))
//!     .with_max_depth(MaxDepth::Limited(2));
//! let locator = ProjectLocator::new(config)?;
//!
//! match locator.locate() {
//!     ScanOutcome::Scanned(report) => {
//!         for (name, dir) in report.registry.iter() {
//!             println!("{name} -> {dir}");
//!         }
//!     }
//!     ScanOutcome::InvalidRoot { root, reason } => {
//!         eprintln!("cannot scan {root}: {reason}");
//!     }
//! }
//! # Ok::<(), dcx_locator::LocateError>(())
//! ```
//!
//! # Traversal order
//!
//! Depth-first with entries sorted by file name. When two project
//! directories share a basename, the one visited last wins and the clash is
//! reported in [`ScanReport::collisions`].

#![deny(clippy::all)]
#![warn(missing_docs)]

mod error;
mod store;
mod walker;

pub use error::LocateError;
pub use store::ProjectStore;
pub use walker::{DirWalker, WalkOutput};

use std::fmt;
use std::io;
use std::time::{Duration, Instant};

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use dcx_core::{LocatorConfig, MaxDepth, ProjectCollision, ProjectRegistry, DESCRIPTOR_FILE_NAME};
use tracing::{debug, info, warn};

/// Configuration for a [`ProjectLocator`].
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use dcx_core::MaxDepth;
/// use dcx_locator::LocateConfig;
///
/// let config = LocateConfig::new(Utf8Path::new("/srv/compose"))
///     .with_max_depth(MaxDepth::Limited(1))
///     .with_follow_links(true);
/// assert_eq!(config.descriptor_name, "docker-compose.yml");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocateConfig {
    /// Directory under which discovery begins.
    pub root: Utf8PathBuf,
    /// Levels below the root to descend into.
    pub max_depth: MaxDepth,
    /// Whether to follow symbolic links.
    pub follow_links: bool,
    /// File name that marks a project directory.
    pub descriptor_name: String,
}

impl LocateConfig {
    /// Creates an unbounded, non-link-following configuration for `root`.
    #[must_use]
    pub fn new(root: &Utf8Path) -> Self {
        Self {
            root: root.to_owned(),
            max_depth: MaxDepth::Unbounded,
            follow_links: false,
            descriptor_name: DESCRIPTOR_FILE_NAME.to_owned(),
        }
    }

    /// Sets the depth bound.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: MaxDepth) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Configures whether to follow symbolic links.
    #[must_use]
    pub const fn with_follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Overrides the descriptor file name.
    #[must_use]
    pub fn with_descriptor_name(mut self, name: impl Into<String>) -> Self {
        self.descriptor_name = name.into();
        self
    }
}

impl From<&LocatorConfig> for LocateConfig {
    fn from(config: &LocatorConfig) -> Self {
        Self {
            root: config.root_path.clone(),
            max_depth: config.max_depth,
            follow_links: config.follow_links,
            descriptor_name: config.descriptor_name.clone(),
        }
    }
}

/// Why a root could not be scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidRootReason {
    /// Nothing exists at the root path.
    Missing,
    /// The root path exists but is not a directory.
    NotADirectory,
    /// The root path could not be inspected (e.g. permission denied).
    Inaccessible,
}

impl fmt::Display for InvalidRootReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Missing => "does not exist",
            Self::NotADirectory => "is not a directory",
            Self::Inaccessible => "cannot be accessed",
        };
        f.write_str(text)
    }
}

/// Details of a completed scan.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// The discovered projects.
    pub registry: ProjectRegistry,
    /// Basename clashes; each names the directory that was dropped.
    pub collisions: Vec<ProjectCollision>,
    /// Entries skipped because they could not be read.
    pub skipped: Vec<LocateError>,
    /// Directories whose files were inspected.
    pub directories_visited: usize,
    /// Descriptor files found, counting collided ones.
    pub descriptors_found: usize,
    /// Wall time of the scan.
    pub elapsed: Duration,
}

/// The result of [`ProjectLocator::locate`].
///
/// Separates "the root is fine and holds these projects (possibly none)"
/// from "the root cannot be scanned at all", so callers can decide whether a
/// misconfigured root is fatal.
#[derive(Debug)]
pub enum ScanOutcome {
    /// The root was a directory and has been walked.
    Scanned(ScanReport),
    /// The root is missing, not a directory, or unreadable.
    InvalidRoot {
        /// The normalized root path.
        root: Utf8PathBuf,
        /// What is wrong with it.
        reason: InvalidRootReason,
    },
}

impl ScanOutcome {
    /// Returns the registry; empty for an invalid root.
    #[must_use]
    pub fn registry(&self) -> ProjectRegistry {
        match self {
            Self::Scanned(report) => report.registry.clone(),
            Self::InvalidRoot { .. } => ProjectRegistry::new(),
        }
    }

    /// Consumes the outcome and returns the registry; empty for an invalid root.
    #[must_use]
    pub fn into_registry(self) -> ProjectRegistry {
        match self {
            Self::Scanned(report) => report.registry,
            Self::InvalidRoot { .. } => ProjectRegistry::new(),
        }
    }

    /// Returns `true` if the root could not be scanned.
    #[inline]
    #[must_use]
    pub const fn is_invalid_root(&self) -> bool {
        matches!(self, Self::InvalidRoot { .. })
    }
}

/// Builds [`ProjectRegistry`] values from a directory tree.
///
/// The locator holds no state between calls; each [`locate`](Self::locate)
/// walks the tree from scratch, so repeated calls on an unchanged tree return
/// equal registries.
#[derive(Debug, Clone)]
pub struct ProjectLocator {
    config: LocateConfig,
}

impl ProjectLocator {
    /// Creates a locator, normalizing the configured root.
    ///
    /// Relative roots are resolved against the current working directory and
    /// `.`/`..` components are removed lexically. Symbolic links in the root
    /// path are kept as written.
    ///
    /// # Errors
    ///
    /// Returns [`LocateError::Config`] if the root is empty, the descriptor
    /// name is not a plain file name, or the working directory cannot be
    /// determined for a relative root.
    pub fn new(config: LocateConfig) -> Result<Self, LocateError> {
        if config.root.as_str().trim().is_empty() {
            return Err(LocateError::config("project root must not be empty"));
        }
        let descriptor = &config.descriptor_name;
        if descriptor.is_empty() || descriptor.contains(['/', '\\']) {
            return Err(LocateError::config(format!(
                "descriptor name must be a plain file name: {descriptor:?}"
            )));
        }

        let root = normalize_root(&config.root)?;
        debug!(root = %root, max_depth = %config.max_depth, "Creating project locator");

        Ok(Self {
            config: LocateConfig { root, ..config },
        })
    }

    /// Returns the normalized root.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.config.root
    }

    /// Returns the locator configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &LocateConfig {
        &self.config
    }

    /// Scans the tree and builds a registry.
    ///
    /// Never fails: an unusable root yields [`ScanOutcome::InvalidRoot`], and
    /// unreadable entries below a valid root are skipped and reported.
    pub fn locate(&self) -> ScanOutcome {
        let root = &self.config.root;

        if let Err(reason) = check_root(root) {
            warn!(root = %root, %reason, "Project root cannot be scanned");
            return ScanOutcome::InvalidRoot {
                root: root.clone(),
                reason,
            };
        }

        let start = Instant::now();
        let walk = DirWalker::new(root, &self.config.descriptor_name)
            .with_max_depth(self.config.max_depth)
            .with_follow_links(self.config.follow_links)
            .collect_project_dirs();

        let mut report = ScanReport {
            descriptors_found: walk.project_dirs.len(),
            directories_visited: walk.directories_visited,
            skipped: walk.skipped,
            ..ScanReport::default()
        };

        for dir in walk.project_dirs {
            let name = project_name(&dir);
            if let Some(replaced) = report.registry.insert(name.clone(), dir.clone()) {
                warn!(
                    project = %name,
                    kept = %dir,
                    replaced = %replaced,
                    "Duplicate project name, keeping the later directory"
                );
                report.collisions.push(ProjectCollision {
                    name,
                    kept: dir,
                    replaced,
                });
            }
        }

        report.elapsed = start.elapsed();
        info!(
            root = %root,
            projects = report.registry.len(),
            collisions = report.collisions.len(),
            skipped = report.skipped.len(),
            elapsed_ms = report.elapsed.as_millis(),
            "Project scan complete"
        );

        ScanOutcome::Scanned(report)
    }
}

/// Scans `root` and returns the project registry.
///
/// A missing or non-directory root yields an empty registry.
///
/// # Errors
///
/// Returns [`LocateError::Config`] if `root` is empty.
///
/// # Examples
///
/// ```no_run
/// use camino::Utf8Path;
/// use dcx_core::MaxDepth;
///
/// let registry = dcx_locator::scan(Utf8Path::new("/srv/compose"), MaxDepth::Unbounded)?;
/// println!("{} projects", registry.len());
/// # Ok::<(), dcx_locator::LocateError>(())
/// ```
pub fn scan(root: &Utf8Path, max_depth: MaxDepth) -> Result<ProjectRegistry, LocateError> {
    let locator = ProjectLocator::new(LocateConfig::new(root).with_max_depth(max_depth))?;
    Ok(locator.locate().into_registry())
}

/// The registry key for a project directory: its final path segment.
pub(crate) fn project_name(dir: &Utf8Path) -> String {
    dir.file_name().unwrap_or(dir.as_str()).to_owned()
}

fn check_root(root: &Utf8Path) -> Result<(), InvalidRootReason> {
    match std::fs::metadata(root.as_std_path()) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(InvalidRootReason::NotADirectory),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Err(InvalidRootReason::Missing),
        Err(_) => Err(InvalidRootReason::Inaccessible),
    }
}

/// Makes `path` absolute and strips `.`, `..` and trailing separators.
fn normalize_root(path: &Utf8Path) -> Result<Utf8PathBuf, LocateError> {
    let absolute = if path.is_absolute() {
        path.to_owned()
    } else {
        let cwd = std::env::current_dir()
            .map_err(|err| LocateError::config(format!("cannot resolve working directory: {err}")))?;
        let cwd = Utf8PathBuf::from_path_buf(cwd).map_err(LocateError::NonUtf8Path)?;
        cwd.join(path)
    };

    let mut normalized = Utf8PathBuf::new();
    for component in absolute.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn temp_root() -> (TempDir, Utf8PathBuf) {
        let temp = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        (temp, root)
    }

    fn add_project(root: &Utf8Path, rel: &str) -> Utf8PathBuf {
        let dir = root.join(rel);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(DESCRIPTOR_FILE_NAME), "services: {}\n").unwrap();
        dir
    }

    fn names(registry: &ProjectRegistry) -> Vec<&str> {
        registry.names().collect()
    }

    #[test]
    fn test_unbounded_finds_nested_projects() {
        let (_temp, root) = temp_root();
        let a = add_project(&root, "A");
        let b = add_project(&root, "A/B");

        let registry = scan(&root, MaxDepth::Unbounded).unwrap();

        assert_eq!(names(&registry), vec!["A", "B"]);
        assert_eq!(registry.get("A"), Some(a.as_path()));
        assert_eq!(registry.get("B"), Some(b.as_path()));
    }

    #[test]
    fn test_depth_zero_matches_only_root() {
        let (_temp, root) = temp_root();
        add_project(&root, "A");
        add_project(&root, "A/B");

        assert!(scan(&root, MaxDepth::Limited(0)).unwrap().is_empty());

        add_project(&root, "");
        let registry = scan(&root, MaxDepth::Limited(0)).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&project_name(&root)), Some(root.as_path()));
    }

    #[test]
    fn test_depth_one_excludes_grandchildren() {
        let (_temp, root) = temp_root();
        add_project(&root, "A");
        add_project(&root, "A/B");

        let registry = scan(&root, MaxDepth::Limited(1)).unwrap();

        assert_eq!(names(&registry), vec!["A"]);
    }

    #[test]
    fn test_depth_two_includes_grandchildren() {
        let (_temp, root) = temp_root();
        add_project(&root, "A/B");
        add_project(&root, "A/B/C");

        let registry = scan(&root, MaxDepth::Limited(2)).unwrap();

        assert_eq!(names(&registry), vec!["B"]);
    }

    #[test]
    fn test_missing_root_is_empty_not_error() {
        let (_temp, root) = temp_root();
        let missing = root.join("nope");

        let registry = scan(&missing, MaxDepth::Unbounded).unwrap();
        assert!(registry.is_empty());

        let locator = ProjectLocator::new(LocateConfig::new(&missing)).unwrap();
        match locator.locate() {
            ScanOutcome::InvalidRoot { reason, .. } => {
                assert_eq!(reason, InvalidRootReason::Missing);
            }
            ScanOutcome::Scanned(_) => panic!("expected invalid root"),
        }
    }

    #[test]
    fn test_file_root_is_not_a_directory() {
        let (_temp, root) = temp_root();
        let file = root.join("plain.txt");
        fs::write(&file, "x").unwrap();

        let outcome = ProjectLocator::new(LocateConfig::new(&file))
            .unwrap()
            .locate();

        assert!(outcome.is_invalid_root());
        assert!(matches!(
            outcome,
            ScanOutcome::InvalidRoot {
                reason: InvalidRootReason::NotADirectory,
                ..
            }
        ));
        assert!(outcome.into_registry().is_empty());
    }

    #[test]
    fn test_empty_root_is_config_error() {
        let err = scan(Utf8Path::new(""), MaxDepth::Unbounded).unwrap_err();
        assert!(matches!(err, LocateError::Config(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_bad_descriptor_name_is_config_error() {
        let config = LocateConfig::new(Utf8Path::new("/srv")).with_descriptor_name("a/b.yml");
        assert!(matches!(
            ProjectLocator::new(config),
            Err(LocateError::Config(_))
        ));
    }

    #[test]
    fn test_collision_keeps_last_visited_and_reports() {
        let (_temp, root) = temp_root();
        let first = add_project(&root, "a/app");
        let second = add_project(&root, "b/app");

        let outcome = ProjectLocator::new(LocateConfig::new(&root))
            .unwrap()
            .locate();
        let ScanOutcome::Scanned(report) = outcome else {
            panic!("expected a scan");
        };

        assert_eq!(report.registry.len(), 1);
        assert_eq!(report.registry.get("app"), Some(second.as_path()));
        assert_eq!(report.descriptors_found, 2);
        assert_eq!(
            report.collisions,
            vec![ProjectCollision {
                name: "app".to_owned(),
                kept: second,
                replaced: first,
            }]
        );
    }

    #[test]
    fn test_nested_same_name_child_wins_over_parent() {
        let (_temp, root) = temp_root();
        let parent = add_project(&root, "app");
        let child = add_project(&root, "app/app");

        let outcome = ProjectLocator::new(LocateConfig::new(&root))
            .unwrap()
            .locate();
        let ScanOutcome::Scanned(report) = outcome else {
            panic!("expected a scan");
        };

        assert_eq!(report.registry.get("app"), Some(child.as_path()));
        assert_eq!(report.collisions[0].replaced, parent);
    }

    #[test]
    fn test_scan_is_idempotent() {
        let (_temp, root) = temp_root();
        add_project(&root, "web");
        add_project(&root, "infra/db");
        add_project(&root, "infra/cache");

        let first = scan(&root, MaxDepth::Unbounded).unwrap();
        let second = scan(&root, MaxDepth::Unbounded).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_trailing_separator_and_dot_segments_are_normalized() {
        let (_temp, root) = temp_root();
        add_project(&root, "web");

        let trailing = Utf8PathBuf::from(format!("{root}/"));
        let dotted = root.join("web").join("..").join(".");

        let plain = scan(&root, MaxDepth::Limited(1)).unwrap();
        assert_eq!(scan(&trailing, MaxDepth::Limited(1)).unwrap(), plain);
        assert_eq!(scan(&dotted, MaxDepth::Limited(1)).unwrap(), plain);

        let locator = ProjectLocator::new(LocateConfig::new(&dotted)).unwrap();
        assert_eq!(locator.root(), root);
    }

    #[test]
    fn test_relative_root_becomes_absolute() {
        let locator = ProjectLocator::new(LocateConfig::new(Utf8Path::new("some/dir"))).unwrap();
        assert!(locator.root().is_absolute());
        assert!(locator.root().ends_with("some/dir"));
    }

    #[test]
    fn test_report_counts_visited_directories() {
        let (_temp, root) = temp_root();
        add_project(&root, "one");
        fs::create_dir_all(root.join("two/deeper")).unwrap();

        let outcome = ProjectLocator::new(
            LocateConfig::new(&root).with_max_depth(MaxDepth::Limited(1)),
        )
        .unwrap()
        .locate();
        let ScanOutcome::Scanned(report) = outcome else {
            panic!("expected a scan");
        };

        // root, one, two; "two/deeper" is beyond the bound
        assert_eq!(report.directories_visited, 3);
        assert!(report.collisions.is_empty());
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn test_project_name_is_basename() {
        assert_eq!(project_name(Utf8Path::new("/srv/compose/web")), "web");
        assert_eq!(project_name(Utf8Path::new("/")), "/");
    }

    #[test]
    fn test_locate_config_from_locator_config() {
        let core = LocatorConfig {
            root_path: Utf8PathBuf::from("/srv"),
            max_depth: MaxDepth::Limited(4),
            follow_links: true,
            descriptor_name: "compose.yaml".to_owned(),
        };
        let config = LocateConfig::from(&core);
        assert_eq!(config.root, "/srv");
        assert_eq!(config.max_depth, MaxDepth::Limited(4));
        assert!(config.follow_links);
        assert_eq!(config.descriptor_name, "compose.yaml");
    }
}
