//! Testing utilities and mock implementations.
//!
//! `MockDisk` stands in for the filesystem and `MockTorrentClient` for the
//! client API. Linking them with [`MockTorrentClient::with_disk`] makes each
//! removal free the torrent's size on the mock disk, so reclaim runs can be
//! exercised end to end without a real client.
//!
//! # Example
//!
//! ```rust,ignore
//! use spacegate_core::testing::{fixtures, MockDisk, MockTorrentClient};
//!
//! let disk = MockDisk::new(10 * GIB, 100 * GIB);
//! let client = MockTorrentClient::with_disk(disk.clone());
//! client.add_mock_torrent(fixtures::seeding_torrent("abc", 5 * GIB)).await;
//! ```

mod mock_disk;
mod mock_torrent_client;

pub use mock_disk::MockDisk;
pub use mock_torrent_client::{MockTorrentClient, RecordedRemoval};

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{TimeZone, Utc};

    use crate::torrent_client::{TorrentInfo, TorrentState};

    /// A finished torrent that has been seeding for a week at ratio 2.0.
    pub fn seeding_torrent(hash: &str, size_bytes: u64) -> TorrentInfo {
        TorrentInfo {
            hash: hash.to_string(),
            name: format!("Torrent {}", hash),
            state: TorrentState::Seeding,
            progress: 1.0,
            size_bytes,
            ratio: 2.0,
            seeding_time_secs: 7 * 86_400,
            tags: Vec::new(),
            trackers: vec!["https://tracker.example.org/announce".to_string()],
            category: None,
            added_at: Utc.timestamp_opt(1_700_000_000, 0).single(),
            completed_at: Utc.timestamp_opt(1_700_003_600, 0).single(),
        }
    }

    /// A torrent still downloading (half done).
    pub fn downloading_torrent(hash: &str, size_bytes: u64) -> TorrentInfo {
        TorrentInfo {
            state: TorrentState::Downloading,
            progress: 0.5,
            ratio: 0.1,
            seeding_time_secs: 0,
            completed_at: None,
            ..seeding_torrent(hash, size_bytes)
        }
    }
}
