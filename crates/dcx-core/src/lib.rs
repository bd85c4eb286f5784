//! Core types, configuration, and errors for the dcx compose facade.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - [`ProjectRegistry`] - the name-to-directory mapping produced by a scan
//! - [`MaxDepth`] - the recursion bound for project discovery
//! - [`Config`] and its sections, loadable from JSON
//! - [`ConfigError`] for configuration failures
//! - An `FxHashSet` alias used for event deduplication
//!
//! # Crate Dependencies
//!
//! ```text
//! dcx-cli ──┬─► dcx-server ──┬─► dcx-locator ──► dcx-core
//!           │                └─► dcx-compose
//!           └─► dcx-watcher ──► dcx-core
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod hash;
pub mod types;

pub use config::{AuthConfig, Config, LocatorConfig, RegistryConfig, ServerConfig, WatchConfig};
pub use error::ConfigError;
pub use hash::{FxHashSet, fx_hash_set};
pub use types::{MaxDepth, ProjectCollision, ProjectRegistry};

/// File name that marks a directory as a docker-compose project.
///
/// Matching is exact and case-sensitive.
pub const DESCRIPTOR_FILE_NAME: &str = "docker-compose.yml";
