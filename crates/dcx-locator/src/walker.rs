//! Bounded-depth directory traversal.
//!
//! This module provides [`DirWalker`], which uses the `ignore` crate to walk a
//! directory tree and report every directory that contains the project
//! descriptor file.
//!
//! # Traversal rules
//!
//! - Top-down and depth-first: a directory is checked before any of its
//!   subdirectories, and siblings are visited in file-name order
//! - Nothing is filtered: hidden directories and `.gitignore`d paths are
//!   scanned like any other
//! - A directory's own files are always inspected; [`MaxDepth`] only decides
//!   whether its subdirectories are entered
//! - Unreadable entries are skipped and reported, never fatal
//!
//! # Examples
//!
//! ```no_run
//! use camino::Utf8Path;
//! use dcx_core::MaxDepth;
//! use dcx_locator::DirWalker;
//!
//! let walk = DirWalker::new(Utf8Path::new("/srv/compose"), "docker-compose.yml")
//!     .with_max_depth(MaxDepth::Limited(2))
//!     .collect_project_dirs();
//!
//! for dir in &walk.project_dirs {
//!     println!("project in {dir}");
//! }
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use dcx_core::MaxDepth;
use ignore::{DirEntry, WalkBuilder};
use tracing::{trace, warn};

use crate::error::LocateError;

/// Result of a single walk.
#[derive(Debug, Default)]
pub struct WalkOutput {
    /// Directories holding a descriptor, in visit order.
    pub project_dirs: Vec<Utf8PathBuf>,
    /// Entries that could not be read or represented.
    pub skipped: Vec<LocateError>,
    /// Directories whose files were inspected.
    pub directories_visited: usize,
}

/// A depth-limited walker that finds project descriptor files.
#[derive(Debug, Clone)]
pub struct DirWalker {
    /// The root directory to walk.
    root: Utf8PathBuf,
    /// Exact file name to look for.
    descriptor: String,
    /// How far below the root to descend.
    max_depth: MaxDepth,
    /// Whether to follow symbolic links.
    follow_links: bool,
}

impl DirWalker {
    /// Creates a walker rooted at `root` looking for files named `descriptor`.
    ///
    /// The root is used as given; callers are expected to pass an absolute,
    /// existing directory (see [`ProjectLocator`](crate::ProjectLocator)).
    #[must_use]
    pub fn new(root: &Utf8Path, descriptor: &str) -> Self {
        Self {
            root: root.to_owned(),
            descriptor: descriptor.to_owned(),
            max_depth: MaxDepth::Unbounded,
            follow_links: false,
        }
    }

    /// Sets the depth bound. Unbounded by default.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: MaxDepth) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Configures whether to follow symbolic links. Off by default.
    #[must_use]
    pub const fn with_follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Returns the directory being walked.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Walks the tree and collects every directory holding the descriptor.
    ///
    /// Each directory is checked for the descriptor when the walker yields
    /// it, before any of its subdirectories, so visit order is top-down.
    ///
    /// Never fails as a whole: each unreadable entry is logged at `warn` and
    /// recorded in [`WalkOutput::skipped`].
    pub fn collect_project_dirs(&self) -> WalkOutput {
        let mut output = WalkOutput::default();

        for result in self.build_walker() {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(root = %self.root, error = %err, "Skipping unreadable entry");
                    output.skipped.push(LocateError::Walk(err));
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
                continue;
            }
            output.directories_visited += 1;

            if !self.holds_descriptor(&entry) {
                continue;
            }

            match Utf8Path::from_path(entry.path()) {
                Some(dir) => {
                    trace!(dir = %dir, "Descriptor found");
                    output.project_dirs.push(dir.to_owned());
                }
                None => {
                    warn!(path = %entry.path().display(), "Skipping project in non-UTF-8 directory");
                    output
                        .skipped
                        .push(LocateError::NonUtf8Path(entry.path().to_owned()));
                }
            }
        }

        output
    }

    /// Builds the `ignore` walker.
    ///
    /// Directories at the bound are yielded (and checked) but not entered.
    fn build_walker(&self) -> ignore::Walk {
        WalkBuilder::new(self.root.as_std_path())
            // Scan everything, including hidden and ignored paths
            .standard_filters(false)
            .follow_links(self.follow_links)
            .max_depth(self.max_depth.limit())
            .sort_by_file_name(|a, b| a.cmp(b))
            .build()
    }

    /// Checks whether a directory entry contains the descriptor file.
    ///
    /// Symlinks count when they resolve to a regular file.
    fn holds_descriptor(&self, dir: &DirEntry) -> bool {
        dir.path().join(&self.descriptor).is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn utf8_root(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    fn touch_descriptor(root: &Utf8Path, rel: &str) {
        let dir = root.join(rel);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("docker-compose.yml"), "services: {}\n").unwrap();
    }

    fn relative_dirs(root: &Utf8Path, output: &WalkOutput) -> Vec<String> {
        output
            .project_dirs
            .iter()
            .map(|d| {
                d.strip_prefix(root)
                    .map(|p| p.as_str().replace('\\', "/"))
                    .unwrap_or_default()
            })
            .collect()
    }

    #[test]
    fn test_finds_nested_descriptors_in_sorted_order() {
        let temp = TempDir::new().unwrap();
        let root = utf8_root(&temp);
        touch_descriptor(&root, "b");
        touch_descriptor(&root, "a/nested");
        touch_descriptor(&root, "a");

        let output = DirWalker::new(&root, "docker-compose.yml").collect_project_dirs();

        assert_eq!(relative_dirs(&root, &output), vec!["a", "a/nested", "b"]);
        assert!(output.skipped.is_empty());
    }

    #[test]
    fn test_parent_is_found_before_same_named_child() {
        let temp = TempDir::new().unwrap();
        let root = utf8_root(&temp);
        touch_descriptor(&root, "app");
        touch_descriptor(&root, "app/app");
        touch_descriptor(&root, "app/Backend");
        touch_descriptor(&root, "app/0-first");

        let output = DirWalker::new(&root, "docker-compose.yml").collect_project_dirs();

        assert_eq!(
            relative_dirs(&root, &output),
            vec!["app", "app/0-first", "app/Backend", "app/app"]
        );
    }

    #[test]
    fn test_depth_zero_only_checks_root_files() {
        let temp = TempDir::new().unwrap();
        let root = utf8_root(&temp);
        touch_descriptor(&root, "");
        touch_descriptor(&root, "child");

        let output = DirWalker::new(&root, "docker-compose.yml")
            .with_max_depth(MaxDepth::Limited(0))
            .collect_project_dirs();

        assert_eq!(output.project_dirs, vec![root.clone()]);
        assert_eq!(output.directories_visited, 1);
    }

    #[test]
    fn test_hidden_directories_are_scanned() {
        let temp = TempDir::new().unwrap();
        let root = utf8_root(&temp);
        touch_descriptor(&root, ".hidden");
        fs::write(root.join(".gitignore"), ".hidden\n").unwrap();

        let output = DirWalker::new(&root, "docker-compose.yml").collect_project_dirs();

        assert_eq!(relative_dirs(&root, &output), vec![".hidden"]);
    }

    #[test]
    fn test_directory_named_like_descriptor_is_ignored() {
        let temp = TempDir::new().unwrap();
        let root = utf8_root(&temp);
        fs::create_dir_all(root.join("weird/docker-compose.yml")).unwrap();

        let output = DirWalker::new(&root, "docker-compose.yml").collect_project_dirs();

        assert!(output.project_dirs.is_empty());
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let temp = TempDir::new().unwrap();
        let root = utf8_root(&temp);
        fs::create_dir_all(root.join("upper")).unwrap();
        fs::write(root.join("upper/Docker-Compose.yml"), "").unwrap();
        fs::create_dir_all(root.join("yaml")).unwrap();
        fs::write(root.join("yaml/docker-compose.yaml"), "").unwrap();

        let output = DirWalker::new(&root, "docker-compose.yml").collect_project_dirs();

        assert!(output.project_dirs.is_empty());
    }

    #[test]
    fn test_custom_descriptor_name() {
        let temp = TempDir::new().unwrap();
        let root = utf8_root(&temp);
        fs::create_dir_all(root.join("svc")).unwrap();
        fs::write(root.join("svc/compose.yaml"), "").unwrap();

        let output = DirWalker::new(&root, "compose.yaml").collect_project_dirs();

        assert_eq!(relative_dirs(&root, &output), vec!["svc"]);
    }

    #[test]
    fn test_builder_options() {
        let walker = DirWalker::new(Utf8Path::new("/srv"), "docker-compose.yml")
            .with_max_depth(MaxDepth::Limited(3))
            .with_follow_links(true);
        assert_eq!(walker.root(), "/srv");
        assert_eq!(walker.max_depth, MaxDepth::Limited(3));
        assert!(walker.follow_links);
    }
}
