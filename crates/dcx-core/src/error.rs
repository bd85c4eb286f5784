//! Configuration errors shared across the workspace.

use camino::Utf8PathBuf;

/// Why a configuration could not be loaded or used.
///
/// # Examples
///
/// ```
/// use dcx_core::ConfigError;
///
/// let error = ConfigError::invalid_option("max_depth", "'deep' is not an integer");
/// assert!(error.to_string().contains("max_depth"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A path setting cannot be used.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath {
        /// The offending path.
        path: Utf8PathBuf,
        /// What is wrong with it.
        reason: String,
    },

    /// A setting has a value no component accepts.
    #[error("invalid value for '{option}': {reason}")]
    InvalidOption {
        /// Setting name, as spelled in the config file.
        option: String,
        /// What is wrong with the value.
        reason: String,
    },

    /// The config file could not be read.
    #[error("cannot read config file {path}: {source}")]
    Read {
        /// The config file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for [`Config`](crate::Config).
    #[error("cannot parse config file {path}: {source}")]
    Parse {
        /// The config file.
        path: Utf8PathBuf,
        /// Underlying JSON error, with line and column.
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    /// Creates a [`ConfigError::InvalidOption`].
    #[inline]
    pub fn invalid_option(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            option: option.into(),
            reason: reason.into(),
        }
    }
}
