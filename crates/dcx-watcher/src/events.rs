//! Change notifications emitted after debouncing.
//!
//! One [`ChangeBatch`] is sent per debounce window, holding every distinct
//! path that passed the filter. Consumers typically refresh the project
//! registry once per batch.

use std::time::Instant;

use camino::{Utf8Path, Utf8PathBuf};
use dcx_core::fx_hash_set;
use smallvec::SmallVec;

/// The distinct paths that changed within one debounce window.
///
/// # Examples
///
/// ```
/// use camino::Utf8PathBuf;
/// use dcx_watcher::ChangeBatch;
///
/// let batch: ChangeBatch = [
///     Utf8PathBuf::from("/srv/web/docker-compose.yml"),
///     Utf8PathBuf::from("/srv/web/docker-compose.yml"),
///     Utf8PathBuf::from("/srv/db"),
/// ]
/// .into_iter()
/// .collect();
///
/// assert_eq!(batch.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct ChangeBatch {
    /// Changed paths, deduplicated, in arrival order.
    pub paths: SmallVec<[Utf8PathBuf; 4]>,

    /// When the batch was assembled.
    pub received_at: Instant,
}

impl ChangeBatch {
    /// Creates an empty batch stamped with the current instant.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            paths: SmallVec::new(),
            received_at: Instant::now(),
        }
    }

    /// Number of distinct paths.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns `true` if no paths changed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Returns `true` if any changed path is a file called `descriptor_name`.
    #[must_use]
    pub fn touches_descriptor(&self, descriptor_name: &str) -> bool {
        self.paths
            .iter()
            .any(|p| p.file_name() == Some(descriptor_name))
    }

    /// Iterates over the changed paths.
    pub fn iter(&self) -> impl Iterator<Item = &Utf8Path> {
        self.paths.iter().map(Utf8PathBuf::as_path)
    }
}

impl Default for ChangeBatch {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<Utf8PathBuf> for ChangeBatch {
    fn from_iter<I: IntoIterator<Item = Utf8PathBuf>>(iter: I) -> Self {
        let mut seen = fx_hash_set();
        let mut batch = Self::new();
        for path in iter {
            if seen.insert(path.clone()) {
                batch.paths.push(path);
            }
        }
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_deduplicates_preserving_order() {
        let batch: ChangeBatch = ["/b", "/a", "/b", "/c", "/a"]
            .into_iter()
            .map(Utf8PathBuf::from)
            .collect();
        let paths: Vec<&str> = batch.iter().map(Utf8Path::as_str).collect();
        assert_eq!(paths, vec!["/b", "/a", "/c"]);
    }

    #[test]
    fn test_empty_batch() {
        let batch = ChangeBatch::default();
        assert!(batch.is_empty());
        assert_eq!(batch.len(), 0);
    }

    #[test]
    fn test_touches_descriptor() {
        let batch: ChangeBatch = [Utf8PathBuf::from("/srv/web/docker-compose.yml")]
            .into_iter()
            .collect();
        assert!(batch.touches_descriptor("docker-compose.yml"));
        assert!(!batch.touches_descriptor("compose.yaml"));
    }
}
