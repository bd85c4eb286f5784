//! Error types for the dcx-watcher crate.

use camino::Utf8PathBuf;

/// Errors that can occur while watching descriptor files.
///
/// # Error Recovery Strategy
///
/// - **Notify errors** ([`WatchError::Notify`]): Fatal - the watcher stops
/// - **Path not found** ([`WatchError::PathNotFound`]): Fatal - the root must exist
/// - **Channel closed** ([`WatchError::ChannelClosed`]): Fatal - nobody is listening
/// - **Non-UTF-8 path** ([`WatchError::NonUtf8Path`]): Recoverable - the event is dropped
/// - **I/O errors** ([`WatchError::Io`]): Fatal
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// Failed to initialize or operate the notify watcher.
    #[error("notify watcher error: {0}")]
    Notify(#[from] notify::Error),

    /// The directory to watch does not exist.
    #[error("path does not exist: {0}")]
    PathNotFound(Utf8PathBuf),

    /// The event channel was closed unexpectedly.
    #[error("event channel closed unexpectedly")]
    ChannelClosed,

    /// An event path is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),

    /// An I/O error occurred while resolving the watch path.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WatchError {
    /// Creates a new [`WatchError::PathNotFound`] error.
    #[inline]
    pub fn path_not_found(path: impl Into<Utf8PathBuf>) -> Self {
        Self::PathNotFound(path.into())
    }

    /// Returns `true` if watching can continue past this error.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::NonUtf8Path(_))
    }

    /// Returns `true` if watching must stop.
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_path_not_found_is_fatal() {
        let err = WatchError::path_not_found("/srv/compose");
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "path does not exist: /srv/compose");
    }

    #[test]
    fn test_non_utf8_is_recoverable() {
        let err = WatchError::NonUtf8Path(PathBuf::from("x"));
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("not valid UTF-8"));
    }

    #[test]
    fn test_channel_closed_display() {
        assert!(WatchError::ChannelClosed.to_string().contains("channel closed"));
    }
}
