//! Configuration structures for the dcx compose facade.
//!
//! - [`LocatorConfig`] - where and how deep to look for projects
//! - [`ServerConfig`] - HTTP bind address, static UI, docker host
//! - [`WatchConfig`] - filesystem watching for descriptor changes
//! - [`RegistryConfig`] - the upstream compose registry API
//! - [`AuthConfig`] - initial basic-auth credentials
//! - [`Config`] - root configuration combining all sections
//!
//! Every section implements [`Default`] and is `#[serde(default)]`, so a
//! JSON config file only needs the keys it wants to change. Command-line
//! flags and environment variables are layered on top by the binary.

use std::net::SocketAddr;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::MaxDepth;
use crate::DESCRIPTOR_FILE_NAME;

/// Default directory scanned for compose projects.
pub const DEFAULT_ROOT_PATH: &str = "/opt/docker-compose-projects";

/// Default compose registry API base URL.
pub const DEFAULT_REGISTRY_URL: &str = "http://www.composeregistry.com/api/v1";

/// Configuration for project discovery.
///
/// # Examples
///
/// ```
/// use dcx_core::{LocatorConfig, MaxDepth};
///
/// let config = LocatorConfig::default();
/// assert_eq!(config.root_path, "/opt/docker-compose-projects");
/// assert_eq!(config.max_depth, MaxDepth::Unbounded);
/// assert_eq!(config.descriptor_name, "docker-compose.yml");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Directory under which project discovery begins.
    pub root_path: Utf8PathBuf,

    /// How many levels below the root to descend into.
    pub max_depth: MaxDepth,

    /// Whether to follow symbolic links while scanning.
    pub follow_links: bool,

    /// File name that marks a project directory.
    pub descriptor_name: String,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            root_path: Utf8PathBuf::from(DEFAULT_ROOT_PATH),
            max_depth: MaxDepth::Unbounded,
            follow_links: false,
            descriptor_name: DESCRIPTOR_FILE_NAME.to_owned(),
        }
    }
}

/// Configuration for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind: SocketAddr,

    /// Directory with the web UI, served for non-API paths.
    pub static_dir: Option<Utf8PathBuf>,

    /// `DOCKER_HOST` value handed to docker commands at startup.
    pub docker_host: Option<String>,

    /// Start even if the project root is missing or not a directory.
    pub allow_missing_root: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 5000)),
            static_dir: None,
            docker_host: None,
            allow_missing_root: false,
        }
    }
}

/// Configuration for the descriptor file watcher.
///
/// # Examples
///
/// ```
/// use dcx_core::WatchConfig;
///
/// let config = WatchConfig::default();
/// assert!(!config.enabled);
/// assert_eq!(config.debounce_ms, 250);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Refresh the project registry when descriptor files change.
    pub enabled: bool,

    /// Debounce window in milliseconds.
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            debounce_ms: 250,
        }
    }
}

/// Configuration for the upstream compose registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// API base URL; `/search` and `/yml` are appended.
    pub base_url: String,

    /// Value sent in the `x-key` header.
    pub api_key: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_REGISTRY_URL.to_owned(),
            api_key: "default".to_owned(),
            timeout_secs: 10,
        }
    }
}

/// Initial basic-auth credentials.
///
/// Authentication starts disabled unless both fields are set. Credentials can
/// be changed or removed at runtime through the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Expected username.
    pub username: Option<String>,

    /// Expected password.
    pub password: Option<String>,
}

impl AuthConfig {
    /// Returns the configured credentials when both parts are present.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }
}

/// Root configuration.
///
/// # Examples
///
/// ```
/// use dcx_core::Config;
///
/// let config: Config = serde_json::from_str(r#"{"locator": {"max_depth": 2}}"#).unwrap();
/// assert_eq!(config.locator.max_depth.limit(), Some(2));
/// assert_eq!(config.watch.debounce_ms, 250);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project discovery.
    pub locator: LocatorConfig,

    /// HTTP server.
    pub server: ServerConfig,

    /// Descriptor watcher.
    pub watch: WatchConfig,

    /// Compose registry proxy.
    pub registry: RegistryConfig,

    /// Basic authentication.
    pub auth: AuthConfig,
}

impl Config {
    /// Loads a configuration from a JSON file.
    ///
    /// Missing keys fall back to their defaults.
    pub fn from_json_file(path: &Utf8Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// Checks the configuration for values no component can work with.
    ///
    /// A root path that does not exist is *not* an error here; discovery
    /// treats it as an empty tree.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.locator.root_path.as_str().trim().is_empty() {
            return Err(ConfigError::InvalidPath {
                path: self.locator.root_path.clone(),
                reason: "project root must not be empty".to_owned(),
            });
        }

        let descriptor = &self.locator.descriptor_name;
        if descriptor.is_empty() || descriptor.contains(['/', '\\']) {
            return Err(ConfigError::invalid_option(
                "descriptor_name",
                "must be a plain file name",
            ));
        }

        if self.registry.base_url.trim().is_empty() {
            return Err(ConfigError::invalid_option("base_url", "must not be empty"));
        }

        if self.auth.username.is_some() != self.auth.password.is_some() {
            return Err(ConfigError::invalid_option(
                "auth",
                "username and password must be set together",
            ));
        }

        if self.auth.username.as_deref().is_some_and(|u| u.contains(':')) {
            return Err(ConfigError::invalid_option(
                "auth",
                "username must not contain ':'",
            ));
        }

        Ok(())
    }
}
