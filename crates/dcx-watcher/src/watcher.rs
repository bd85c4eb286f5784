//! Debounced watcher bridged to tokio.
//!
//! ```text
//!  blocking thread                              async runtime
//! ┌──────────────────────────────────────┐    ┌───────────────────────┐
//! │ notify -> debouncer -> filter/dedupe │ -> │ mpsc::Receiver        │
//! └──────────────────────────────────────┘    │ (ChangeBatch per tick)│
//!                     ▲                       └───────────────────────┘
//!                     └── oneshot shutdown ── DescriptorWatcher
//! ```

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use dcx_core::WatchConfig;
use notify::RecursiveMode;
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::error::WatchError;
use crate::events::ChangeBatch;
use crate::filter::FileFilter;

/// Capacity of the batch channel.
const CHANNEL_CAPACITY: usize = 32;

/// Watches a project root recursively and streams [`ChangeBatch`]es.
///
/// Dropping the watcher signals the blocking task to stop; call
/// [`shutdown`](Self::shutdown) to also wait for it.
///
/// # Examples
///
/// ```no_run
/// use camino::Utf8Path;
/// use dcx_core::WatchConfig;
/// use dcx_watcher::{DescriptorFilter, DescriptorWatcher};
///
/// # async fn example() -> Result<(), dcx_watcher::WatchError> {
/// let mut watcher = DescriptorWatcher::new(
///     Utf8Path::new("/opt/docker-compose-projects"),
///     &WatchConfig::default(),
///     DescriptorFilter::default(),
/// )
/// .await?;
///
/// while let Some(batch) = watcher.recv().await {
///     println!("{} paths changed", batch.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct DescriptorWatcher {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task_handle: Option<JoinHandle<Result<(), WatchError>>>,
    batch_rx: mpsc::Receiver<ChangeBatch>,
    watch_path: Utf8PathBuf,
}

impl std::fmt::Debug for DescriptorWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptorWatcher")
            .field("watch_path", &self.watch_path)
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl DescriptorWatcher {
    /// Starts watching `path` recursively.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory to watch; must exist
    /// * `config` - Supplies the debounce window
    /// * `filter` - Decides which changed paths are reported
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::PathNotFound`] if `path` does not exist, or
    /// [`WatchError::Io`] if it cannot be canonicalized. Failures to start
    /// the notify backend surface from [`shutdown`](Self::shutdown).
    #[allow(clippy::unused_async)] // Must be called inside a runtime for spawn_blocking
    pub async fn new<F: FileFilter>(
        path: &Utf8Path,
        config: &WatchConfig,
        filter: F,
    ) -> Result<Self, WatchError> {
        if !path.exists() {
            return Err(WatchError::path_not_found(path));
        }
        let watch_path = path.canonicalize_utf8()?;

        let (batch_tx, batch_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task_path = watch_path.clone();
        let debounce = Duration::from_millis(config.debounce_ms);
        let task_handle = tokio::task::spawn_blocking(move || {
            run_watcher_loop(task_path, debounce, batch_tx, shutdown_rx, filter)
        });

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
            task_handle: Some(task_handle),
            batch_rx,
            watch_path,
        })
    }

    /// Receives the next batch. `None` once the watcher has stopped.
    pub async fn recv(&mut self) -> Option<ChangeBatch> {
        self.batch_rx.recv().await
    }

    /// Returns the canonical path being watched.
    #[must_use]
    pub fn watch_path(&self) -> &Utf8Path {
        &self.watch_path
    }

    /// Returns `true` while the blocking task is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some() && self.task_handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stops the watcher and waits for the blocking task.
    ///
    /// # Errors
    ///
    /// Returns the error the watcher task ended with, or
    /// [`WatchError::ChannelClosed`] if it panicked.
    pub async fn shutdown(mut self) -> Result<(), WatchError> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.task_handle.take() {
            match handle.await {
                Ok(result) => result?,
                Err(_join_error) => return Err(WatchError::ChannelClosed),
            }
        }
        Ok(())
    }
}

impl Drop for DescriptorWatcher {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

#[allow(clippy::needless_pass_by_value)] // Owned for the blocking task lifetime
fn run_watcher_loop<F: FileFilter>(
    path: Utf8PathBuf,
    debounce: Duration,
    batch_tx: mpsc::Sender<ChangeBatch>,
    shutdown_rx: oneshot::Receiver<()>,
    filter: F,
) -> Result<(), WatchError> {
    let mut debouncer: Debouncer<notify::RecommendedWatcher> =
        new_debouncer(debounce, move |res: DebounceEventResult| match res {
            Ok(events) => {
                let batch: ChangeBatch = events
                    .into_iter()
                    .filter_map(|event| match Utf8PathBuf::try_from(event.path) {
                        Ok(path) => Some(path),
                        Err(err) => {
                            warn!(
                                path = %err.into_path_buf().display(),
                                "Skipping non-UTF-8 path in change event"
                            );
                            None
                        }
                    })
                    .filter(|path| {
                        let keep = filter.should_process(path);
                        if !keep {
                            trace!(path = %path, "Filtered out change event");
                        }
                        keep
                    })
                    .collect();

                if batch.is_empty() {
                    return;
                }
                debug!(paths = batch.len(), "Descriptor changes detected");
                if batch_tx.blocking_send(batch).is_err() {
                    debug!("Change channel closed, dropping batch");
                }
            }
            Err(error) => warn!(error = %error, "Debouncer error"),
        })?;

    debouncer
        .watcher()
        .watch(path.as_std_path(), RecursiveMode::Recursive)?;

    info!(path = %path, debounce_ms = debounce.as_millis(), "Descriptor watcher started");

    let _ = shutdown_rx.blocking_recv();

    info!(path = %path, "Descriptor watcher stopped");
    Ok(())
}
