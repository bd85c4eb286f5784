//! Error types for the dcx-locator crate.
//!
//! This module provides the [`LocateError`] type for errors that can occur
//! during project discovery and project store operations.

use camino::Utf8PathBuf;

/// Errors that can occur while locating or managing projects.
///
/// # Error Recovery Strategy
///
/// - **Walk errors** ([`LocateError::Walk`]): Recoverable - the entry or
///   subtree is skipped, logged, and the scan continues
/// - **Non-UTF-8 paths** ([`LocateError::NonUtf8Path`]): Recoverable - skipped
/// - **Configuration** ([`LocateError::Config`]): Fatal - the caller passed
///   something unusable (e.g. an empty root) and must fix it
/// - **Store operations** (unknown project, invalid name, existing project,
///   I/O): returned to the caller of that operation
///
/// # Examples
///
/// ```
/// use dcx_locator::LocateError;
///
/// let err = LocateError::config("project root must not be empty");
/// assert!(err.is_fatal());
/// ```
#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    /// Failed to read a directory entry during traversal.
    #[error("failed to walk directory: {0}")]
    Walk(#[from] ignore::Error),

    /// A path is not valid UTF-8 and cannot become a registry entry.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),

    /// The locator was configured with unusable parameters.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// No project with this name is registered.
    #[error("unknown project: {0}")]
    UnknownProject(String),

    /// A requested project name cannot be used as a directory name.
    #[error("invalid project name '{name}': {reason}")]
    InvalidProjectName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The directory for a new project already exists.
    #[error("project directory already exists: {0}")]
    ProjectExists(Utf8PathBuf),

    /// A filesystem operation on a specific path failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path involved.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl LocateError {
    /// Creates a new [`LocateError::Config`] error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a new [`LocateError::Io`] error.
    #[inline]
    pub fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if scanning can continue past this error.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Walk(_) | Self::NonUtf8Path(_))
    }

    /// Returns `true` if this error is fatal for the operation.
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }
}
