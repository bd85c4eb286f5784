//! Async client for the docker compose CLI.
//!
//! Every operation is a single `docker compose` (or plain `docker`) child
//! process. Compose calls always name the project explicitly:
//!
//! ```text
//! docker compose --project-directory <dir> -f <dir>/docker-compose.yml <args>
//! ```
//!
//! and run with `<dir>` as the working directory. A [`DockerHost`] override,
//! when set, is passed to the child as `DOCKER_HOST`; the server's own
//! environment is never modified.
//!
//! # Overview
//!
//! - [`ComposeClient`]: project lifecycle, scaling, listing, inspection, logs
//! - [`CommandRunner`]: the process seam; [`ProcessRunner`] in production
//! - [`ContainerSummary`] / [`ContainerDetails`]: parsed docker JSON
//! - [`ComposeError`]: spawn failures, non-zero exits, unparsable output

#![deny(clippy::all)]
#![warn(missing_docs)]

mod client;
mod command;
mod error;
mod host;
mod types;

pub use client::{ComposeClient, DOCKER_PROGRAM, ProjectCommand, ProjectRef};
pub use command::{CommandOutput, CommandRunner, Invocation, ProcessRunner};
pub use error::ComposeError;
pub use host::DockerHost;
pub use types::{
    ContainerDetails, ContainerSummary, LogTail, merge_log_streams, parse_inspect, parse_ps,
};
