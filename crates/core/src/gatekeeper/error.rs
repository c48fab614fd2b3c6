//! Error types for the gatekeeper.

use thiserror::Error;

use crate::config::ConfigError;
use crate::disk::DiskError;
use crate::torrent_client::TorrentClientError;

/// Failures that stop a gatekeeper run. Running short of space is an
/// [`Outcome`](super::Outcome), not an error.
#[derive(Debug, Error)]
pub enum GatekeeperError {
    /// Free space could not be determined.
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] DiskError),

    /// The torrent client could not list or remove torrents.
    #[error("Torrent client API error: {0}")]
    ClientApi(#[from] TorrentClientError),

    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
