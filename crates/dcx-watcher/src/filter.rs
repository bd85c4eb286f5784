//! Event filtering.
//!
//! Filters run on the blocking watcher thread, before anything is sent to
//! the async side.

use camino::Utf8Path;
use dcx_core::DESCRIPTOR_FILE_NAME;

/// A predicate deciding which changed paths are worth reporting.
///
/// Filters must be [`Send`], [`Sync`] and `'static` because they move into
/// the blocking watcher task.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use dcx_watcher::FileFilter;
///
/// struct YamlOnly;
///
/// impl FileFilter for YamlOnly {
///     fn should_process(&self, path: &Utf8Path) -> bool {
///         matches!(path.extension(), Some("yml" | "yaml"))
///     }
/// }
/// ```
pub trait FileFilter: Send + Sync + 'static {
    /// Returns `true` if a change at `path` should be reported.
    fn should_process(&self, path: &Utf8Path) -> bool;
}

/// Accepts every path.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllFilter;

impl FileFilter for AcceptAllFilter {
    #[inline]
    fn should_process(&self, _path: &Utf8Path) -> bool {
        true
    }
}

/// Accepts changes that can alter the project registry.
///
/// That is a descriptor file being written or removed, or a directory being
/// created, renamed, or deleted (which can carry descriptors with it). Edits
/// to any other regular file are dropped.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use dcx_watcher::{DescriptorFilter, FileFilter};
///
/// let filter = DescriptorFilter::default();
/// assert!(filter.should_process(Utf8Path::new("/srv/web/docker-compose.yml")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorFilter {
    descriptor_name: String,
}

impl DescriptorFilter {
    /// Creates a filter for descriptor files called `descriptor_name`.
    #[must_use]
    pub fn new(descriptor_name: impl Into<String>) -> Self {
        Self {
            descriptor_name: descriptor_name.into(),
        }
    }

    /// Returns the descriptor file name being matched.
    #[inline]
    #[must_use]
    pub fn descriptor_name(&self) -> &str {
        &self.descriptor_name
    }
}

impl Default for DescriptorFilter {
    fn default() -> Self {
        Self::new(DESCRIPTOR_FILE_NAME)
    }
}

impl FileFilter for DescriptorFilter {
    fn should_process(&self, path: &Utf8Path) -> bool {
        if path.file_name() == Some(self.descriptor_name.as_str()) {
            return true;
        }
        // Gone or a directory: either may have taken a descriptor with it
        !path.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_accept_all() {
        assert!(AcceptAllFilter.should_process(Utf8Path::new("anything.txt")));
    }

    #[test]
    fn test_descriptor_filter_accepts_descriptor_even_when_missing() {
        let filter = DescriptorFilter::default();
        assert!(filter.should_process(Utf8Path::new("/nowhere/docker-compose.yml")));
    }

    #[test]
    fn test_descriptor_filter_drops_regular_files() {
        let temp = TempDir::new().unwrap();
        let root = Utf8Path::from_path(temp.path()).unwrap();
        fs::write(root.join("notes.txt"), "x").unwrap();
        fs::write(root.join("Docker-Compose.yml"), "x").unwrap();

        let filter = DescriptorFilter::default();
        assert!(!filter.should_process(&root.join("notes.txt")));
        assert!(!filter.should_process(&root.join("Docker-Compose.yml")));
    }

    #[test]
    fn test_descriptor_filter_accepts_directories_and_removals() {
        let temp = TempDir::new().unwrap();
        let root = Utf8Path::from_path(temp.path()).unwrap();
        fs::create_dir(root.join("newproject")).unwrap();

        let filter = DescriptorFilter::default();
        assert!(filter.should_process(&root.join("newproject")));
        assert!(filter.should_process(&root.join("deleted")));
    }

    #[test]
    fn test_descriptor_filter_accepts_both_ends_of_a_rename() {
        let temp = TempDir::new().unwrap();
        let root = Utf8Path::from_path(temp.path()).unwrap();
        fs::create_dir(root.join("web")).unwrap();
        fs::write(root.join("web/docker-compose.yml"), "services: {}\n").unwrap();
        fs::rename(root.join("web"), root.join("frontend")).unwrap();

        let filter = DescriptorFilter::default();
        assert!(filter.should_process(&root.join("web")));
        assert!(filter.should_process(&root.join("frontend")));
    }

    #[test]
    fn test_custom_descriptor_name() {
        let filter = DescriptorFilter::new("compose.yaml");
        assert_eq!(filter.descriptor_name(), "compose.yaml");
        assert!(filter.should_process(Utf8Path::new("/x/compose.yaml")));
    }
}
