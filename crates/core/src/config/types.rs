use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::reclaim::RemovalOrder;
use crate::torrent_client::TorrentState;
use crate::units::{ByteSize, Seconds};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub disk: DiskConfig,
    #[serde(default)]
    pub torrent_client: Option<TorrentClientConfig>,
    #[serde(default)]
    pub reclaim: ReclaimConfig,
}

impl Config {
    /// qBittorrent settings, if a qBittorrent backend is configured.
    pub fn qbittorrent(&self) -> Option<&QBittorrentConfig> {
        self.torrent_client
            .as_ref()
            .filter(|tc| tc.backend == TorrentClientBackend::QBittorrent)
            .and_then(|tc| tc.qbittorrent.as_ref())
    }
}

/// Monitored path and free space requirement
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DiskConfig {
    /// Directory whose filesystem is checked (e.g. "/downloads")
    #[serde(default)]
    pub path: PathBuf,
    /// Minimum free space required to allow ingestion
    #[serde(default)]
    pub required: ByteSize,
}

/// Torrent client configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TorrentClientConfig {
    /// Client backend type
    #[serde(default)]
    pub backend: TorrentClientBackend,
    /// qBittorrent-specific configuration (required when backend = "qbittorrent")
    #[serde(default)]
    pub qbittorrent: Option<QBittorrentConfig>,
}

/// Available torrent client backends
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TorrentClientBackend {
    #[default]
    #[serde(rename = "qbittorrent")]
    QBittorrent,
}

/// qBittorrent Web API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QBittorrentConfig {
    /// Web UI URL (e.g., "http://localhost:8080")
    pub url: String,
    /// Web UI username. `$NAME` is replaced by the environment variable NAME.
    #[serde(default)]
    pub username: String,
    /// Web UI password. `$NAME` is replaced by the environment variable NAME.
    #[serde(default)]
    pub password: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    30
}

/// Reclaim policy: which torrents may be removed and how
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReclaimConfig {
    /// Remove torrents when space is short (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Log the removal plan without deleting anything
    #[serde(default)]
    pub dry_run: bool,
    /// Only torrents that finished downloading are eligible (default: true)
    #[serde(default = "default_true")]
    pub require_complete: bool,
    /// Client states that are eligible for removal
    #[serde(default = "default_states")]
    pub states: Vec<TorrentState>,
    /// Minimum share ratio before removal
    #[serde(default)]
    pub min_ratio: Option<f64>,
    /// Minimum time spent seeding before removal
    #[serde(default)]
    pub min_seeding_time: Option<Seconds>,
    /// Torrents carrying any of these tags are never removed
    #[serde(default = "default_exclude_tags")]
    pub exclude_tags: Vec<String>,
    /// Torrents with any announce URL containing one of these strings are never
    /// removed. When set, torrents whose trackers are unknown are kept too.
    #[serde(default)]
    pub exclude_trackers: Vec<String>,
    /// Restrict candidates to one client category
    #[serde(default)]
    pub category: Option<String>,
    /// Order in which eligible torrents are removed
    #[serde(default)]
    pub order: RemovalOrder,
    /// Also delete downloaded data (default: true)
    #[serde(default = "default_true")]
    pub delete_files: bool,
    /// Wait after each removal before re-measuring free space (default: 2s)
    #[serde(default = "default_settle")]
    pub settle_secs: Seconds,
}

impl Default for ReclaimConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dry_run: false,
            require_complete: true,
            states: default_states(),
            min_ratio: None,
            min_seeding_time: None,
            exclude_tags: default_exclude_tags(),
            exclude_trackers: Vec::new(),
            category: None,
            order: RemovalOrder::default(),
            delete_files: true,
            settle_secs: default_settle(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_states() -> Vec<TorrentState> {
    vec![
        TorrentState::Seeding,
        TorrentState::Stalled,
        TorrentState::Paused,
        TorrentState::Checking,
    ]
}

fn default_exclude_tags() -> Vec<String> {
    vec!["permaseed".to_string(), "keep".to_string()]
}

fn default_settle() -> Seconds {
    Seconds(2)
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub disk: DiskConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qbittorrent: Option<SanitizedQBittorrentConfig>,
    pub reclaim: ReclaimConfig,
}

/// Sanitized qBittorrent config (password hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedQBittorrentConfig {
    pub url: String,
    pub username: String,
    pub password_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            disk: config.disk.clone(),
            qbittorrent: config.qbittorrent().map(|q| SanitizedQBittorrentConfig {
                url: q.url.clone(),
                username: q.username.clone(),
                password_configured: !q.password.is_empty(),
                timeout_secs: q.timeout_secs,
            }),
            reclaim: config.reclaim.clone(),
        }
    }
}
