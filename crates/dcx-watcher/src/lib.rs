//! Descriptor file watching for the dcx compose facade.
//!
//! Watches the project root with `notify`, debounced through
//! `notify-debouncer-mini`, and streams one [`ChangeBatch`] per debounce
//! window to async code. The server uses it to refresh the project
//! registry when projects appear or disappear on disk, instead of waiting
//! for the next listing request.
//!
//! # Usage
//!
//! ```no_run
//! use camino::Utf8Path;
//! use dcx_core::WatchConfig;
//! use dcx_watcher::{DescriptorFilter, DescriptorWatcher};
//!
//! # async fn example() -> Result<(), dcx_watcher::WatchError> {
//! let mut watcher = DescriptorWatcher::new(
//!     Utf8Path::new("/opt/docker-compose-projects"),
//!     &WatchConfig::default(),
//!     DescriptorFilter::default(),
//! )
//! .await?;
//!
//! while let Some(batch) = watcher.recv().await {
//!     // refresh the registry once per batch
//!     let _ = batch;
//! }
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod events;
pub mod filter;
pub mod watcher;

pub use error::WatchError;
pub use events::ChangeBatch;
pub use filter::{AcceptAllFilter, DescriptorFilter, FileFilter};
pub use watcher::DescriptorWatcher;
