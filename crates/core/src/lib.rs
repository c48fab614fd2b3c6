pub mod config;
pub mod disk;
pub mod exit;
pub mod gatekeeper;
pub mod reclaim;
pub mod testing;
pub mod torrent_client;
pub mod units;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, ConfigOverrides,
    QBittorrentConfig, ReclaimConfig, SanitizedConfig, TorrentClientBackend,
};
pub use disk::{DiskError, FreeSpaceReading, SpaceProbe, StatvfsProbe};
pub use exit::ExitStatus;
pub use gatekeeper::{Gatekeeper, GatekeeperError, Outcome};
pub use reclaim::{EligibilityPolicy, RemovalOrder, TorrentCandidate};
pub use torrent_client::{
    QBittorrentClient, TorrentClient, TorrentClientError, TorrentFilters, TorrentInfo,
    TorrentState,
};
pub use units::{ByteSize, Seconds};
