//! CLI entry point for the dcx compose facade.
//!
//! This binary discovers docker-compose projects below a root directory and
//! serves the REST API that drives them.
//!
//! # Usage
//!
//! ```bash
//! dcx [OPTIONS] <COMMAND>
//!
//! # Serve the API on 0.0.0.0:5000, refreshing on descriptor changes
//! dcx --root /opt/docker-compose-projects serve --watch
//!
//! # Print the discovered projects as JSON
//! dcx --root ./projects --max-depth 2 list
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{WrapErr, eyre};
use dcx_compose::{ComposeClient, DockerHost};
use dcx_core::{Config, MaxDepth, WatchConfig};
use dcx_locator::{LocateConfig, ProjectLocator, ProjectStore, ScanOutcome};
use dcx_server::{AppState, AuthGate, Credentials, RegistryClient, build_router};
use dcx_watcher::{DescriptorFilter, DescriptorWatcher};
use serde_json::json;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// REST facade over docker-compose projects.
///
/// Every directory below the root that holds a `docker-compose.yml` is a
/// project, named after the directory.
#[derive(Parser)]
#[command(name = "dcx", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// Directory scanned for docker-compose projects.
    ///
    /// Defaults to `/opt/docker-compose-projects`.
    #[arg(short, long, global = true, env = "YML_PATH")]
    root: Option<Utf8PathBuf>,

    /// How many directory levels below the root to descend (-1: unbounded).
    #[arg(long, global = true, env = "MAX_DEPTH", allow_hyphen_values = true)]
    max_depth: Option<MaxDepth>,

    /// Follow symbolic links while scanning.
    #[arg(long, global = true, env = "DCX_FOLLOW_LINKS")]
    follow_links: bool,

    /// JSON configuration file; flags override its values.
    #[arg(short, long, global = true, env = "DCX_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Serve the REST API.
    Serve(ServeArgs),

    /// Scan once and print the discovered projects as JSON.
    List,
}

/// Options of `dcx serve`.
#[derive(Args)]
struct ServeArgs {
    /// Address to listen on.
    ///
    /// Defaults to `0.0.0.0:5000`.
    #[arg(short, long, env = "DCX_BIND")]
    bind: Option<SocketAddr>,

    /// Directory with the web UI, served for every non-API path.
    #[arg(long, env = "DCX_STATIC_DIR")]
    static_dir: Option<Utf8PathBuf>,

    /// Refresh the project list when descriptor files change.
    #[arg(short, long, env = "DCX_WATCH")]
    watch: bool,

    /// Docker daemon to talk to (passed to docker as `DOCKER_HOST`).
    #[arg(long, env = "DOCKER_HOST")]
    docker_host: Option<String>,

    /// Base URL of the compose registry API.
    #[arg(long, env = "DCX_REGISTRY_URL")]
    registry_url: Option<String>,

    /// API key sent to the compose registry.
    #[arg(long, env = "DCX_REGISTRY_KEY", hide_env_values = true)]
    registry_key: Option<String>,

    /// Enable basic authentication with this username.
    #[arg(long, env = "DCX_AUTH_USERNAME", requires = "auth_password")]
    auth_username: Option<String>,

    /// Password for basic authentication.
    #[arg(long, env = "DCX_AUTH_PASSWORD", hide_env_values = true, requires = "auth_username")]
    auth_password: Option<String>,

    /// Start even if the project root is missing or not a directory.
    #[arg(long)]
    allow_missing_root: bool,
}

impl ServeArgs {
    /// Applies the flags that were given on top of `config`.
    fn apply(&self, config: &mut Config) {
        if let Some(bind) = self.bind {
            config.server.bind = bind;
        }
        if let Some(dir) = &self.static_dir {
            config.server.static_dir = Some(dir.clone());
        }
        if self.watch {
            config.watch.enabled = true;
        }
        if let Some(host) = &self.docker_host {
            config.server.docker_host = Some(host.clone());
        }
        if let Some(url) = &self.registry_url {
            config.registry.base_url.clone_from(url);
        }
        if let Some(key) = &self.registry_key {
            config.registry.api_key.clone_from(key);
        }
        if let (Some(username), Some(password)) = (&self.auth_username, &self.auth_password) {
            config.auth.username = Some(username.clone());
            config.auth.password = Some(password.clone());
        }
        if self.allow_missing_root {
            config.server.allow_missing_root = true;
        }
    }
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `info` level by default.
/// Noisy crates like `hyper` and `mio` are filtered to `warn` level.
///
/// # Arguments
///
/// * `verbose` - Enable debug-level logging
/// * `no_color` - Disable ANSI colors in output
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},hyper=warn,mio=warn,notify=warn"))
    });

    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_ansi(use_ansi))
        .with(filter)
        .init();
}

/// Builds the effective [`Config`]: defaults, then the config file, then flags.
///
/// # Errors
///
/// Returns an error if the config file cannot be loaded or the result fails
/// validation.
fn build_config(cli: &Cli) -> color_eyre::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };

    if let Some(root) = &cli.root {
        config.locator.root_path = root.clone();
    }
    if let Some(max_depth) = cli.max_depth {
        config.locator.max_depth = max_depth;
    }
    if cli.follow_links {
        config.locator.follow_links = true;
    }
    if let Commands::Serve(args) = &cli.command {
        args.apply(&mut config);
    }

    config.validate()?;
    Ok(config)
}

fn create_locator(config: &Config) -> color_eyre::Result<ProjectLocator> {
    ProjectLocator::new(LocateConfig::from(&config.locator))
        .map_err(|e| eyre!("Failed to create project locator: {}", e))
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Runs the API server until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the root is invalid (unless allowed), the listener
/// cannot be bound, or serving fails.
async fn run_serve(config: Config) -> color_eyre::Result<()> {
    let locator = create_locator(&config)?;
    info!(
        root = %locator.root(),
        max_depth = %config.locator.max_depth,
        "Starting dcx"
    );

    let (store, outcome) = ProjectStore::open(locator);
    if let ScanOutcome::InvalidRoot { root, reason } = &outcome {
        if !config.server.allow_missing_root {
            return Err(eyre!(
                "Project root {root} {reason} (pass --allow-missing-root to serve anyway)"
            ));
        }
        warn!(%root, %reason, "Serving without a valid project root");
    }
    let store = Arc::new(store);
    info!(projects = store.snapshot().len(), "Project registry loaded");

    let credentials = config
        .auth
        .credentials()
        .map(|(username, password)| Credentials::new(username, password));
    let compose =
        ComposeClient::new().with_host(DockerHost::new(config.server.docker_host.clone()));
    let registry = RegistryClient::new(&config.registry)?;
    let state = AppState::new(
        Arc::clone(&store),
        compose,
        Arc::new(AuthGate::new(credentials)),
        registry,
    );
    let router = build_router(state, config.server.static_dir.as_deref());

    let listener = TcpListener::bind(config.server.bind)
        .await
        .wrap_err_with(|| format!("Failed to bind {}", config.server.bind))?;

    let shutdown = CancellationToken::new();
    let watch_task = config
        .watch
        .enabled
        .then(|| tokio::spawn(watch_projects(Arc::clone(&store), config.watch, shutdown.clone())));

    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            wait_for_signal().await;
            shutdown.cancel();
        }
    });

    dcx_server::serve(listener, router, shutdown.clone().cancelled_owned()).await?;

    shutdown.cancel();
    if let Some(task) = watch_task {
        if let Err(e) = task.await {
            warn!(error = %e, "Watcher task failed");
        }
    }
    info!("Shut down cleanly");
    Ok(())
}

/// Scans once and prints `{"projects": {...}}`.
///
/// Collisions, skipped entries and an invalid root are reported on stderr.
///
/// # Errors
///
/// Returns an error if the locator cannot be created or output fails.
fn run_list(config: &Config) -> color_eyre::Result<()> {
    let locator = create_locator(config)?;
    let outcome = locator.locate();

    {
        let stderr = std::io::stderr();
        let mut handle = stderr.lock();
        match &outcome {
            ScanOutcome::InvalidRoot { root, reason } => {
                writeln!(handle, "Project root {root} {reason}")?;
            }
            ScanOutcome::Scanned(report) => {
                for collision in &report.collisions {
                    writeln!(
                        handle,
                        "Duplicate project name '{}': {} replaced {}",
                        collision.name, collision.kept, collision.replaced
                    )?;
                }
                for skipped in &report.skipped {
                    writeln!(handle, "Skipped: {skipped}")?;
                }
            }
        }
    }

    let output = serde_json::to_string_pretty(&json!({ "projects": outcome.into_registry() }))
        .map_err(|e| eyre!("Failed to serialize JSON: {}", e))?;
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{output}")?;

    Ok(())
}

// =============================================================================
// BACKGROUND TASKS
// =============================================================================

/// Refreshes the store whenever a descriptor file changes.
///
/// A watcher that cannot start is logged and the server keeps refreshing on
/// request only.
async fn watch_projects(store: Arc<ProjectStore>, config: WatchConfig, shutdown: CancellationToken) {
    let filter = DescriptorFilter::new(store.descriptor_name());
    let mut watcher = match DescriptorWatcher::new(store.root(), &config, filter).await {
        Ok(watcher) => watcher,
        Err(e) => {
            warn!(error = %e, "Descriptor watcher unavailable, refreshing on request only");
            return;
        }
    };
    info!(path = %watcher.watch_path(), debounce_ms = config.debounce_ms, "Watching for descriptor changes");

    loop {
        tokio::select! {
            () = shutdown.cancelled() => break,
            batch = watcher.recv() => {
                let Some(batch) = batch else {
                    warn!("Descriptor watcher stopped");
                    break;
                };
                debug!(changes = batch.len(), "Descriptor change detected");

                let refresh_store = Arc::clone(&store);
                match tokio::task::spawn_blocking(move || refresh_store.refresh()).await {
                    Ok(_) => info!(projects = store.snapshot().len(), "Project registry refreshed"),
                    Err(e) => warn!(error = %e, "Refresh task failed"),
                }
            }
        }
    }

    if let Err(e) = watcher.shutdown().await {
        warn!(error = %e, "Descriptor watcher ended with an error");
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl-C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Initialize tracing (handles --no-color for log output)
    init_tracing(cli.verbose, cli.no_color);

    // 4. Merge config file and flags
    let config = build_config(&cli)?;

    // 5. Route to appropriate command
    match &cli.command {
        Commands::Serve(_) => run_serve(config).await,
        Commands::List => run_list(&config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::fs;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_negative_max_depth_is_unbounded() {
        let cli = Cli::try_parse_from(["dcx", "--root", "/srv", "--max-depth", "-1", "list"]).unwrap();
        let config = build_config(&cli).unwrap();

        assert_eq!(config.locator.root_path, "/srv");
        assert_eq!(config.locator.max_depth, MaxDepth::Unbounded);
    }

    #[test]
    fn test_serve_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "dcx",
            "serve",
            "--bind",
            "127.0.0.1:8080",
            "--max-depth",
            "2",
            "--auth-username",
            "admin",
            "--auth-password",
            "pw",
            "--allow-missing-root",
        ])
        .unwrap();
        let config = build_config(&cli).unwrap();

        assert_eq!(config.server.bind, SocketAddr::from(([127, 0, 0, 1], 8080)));
        assert_eq!(config.locator.max_depth, MaxDepth::Limited(2));
        assert_eq!(config.auth.credentials(), Some(("admin", "pw")));
        assert!(config.server.allow_missing_root);
    }

    #[test]
    fn test_auth_username_requires_password() {
        let result = Cli::try_parse_from(["dcx", "serve", "--auth-username", "admin"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_flags_override_config_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("dcx.json");
        fs::write(
            &path,
            r#"{"locator": {"root_path": "/from/file", "max_depth": 3}, "watch": {"debounce_ms": 50}}"#,
        )
        .unwrap();
        let path = path.to_str().unwrap();

        let cli = Cli::try_parse_from(["dcx", "--config", path, "--max-depth", "1", "list"]).unwrap();
        let config = build_config(&cli).unwrap();

        assert_eq!(config.locator.root_path, "/from/file");
        assert_eq!(config.locator.max_depth, MaxDepth::Limited(1));
        assert_eq!(config.watch.debounce_ms, 50);
    }
}
