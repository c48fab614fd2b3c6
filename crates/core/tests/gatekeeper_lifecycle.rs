//! Gatekeeper lifecycle integration tests.
//!
//! These tests drive full runs against a mock disk and a mock torrent client
//! and check the outcome, the exit code, and which torrents were removed.

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use spacegate_core::{
    config::DiskConfig,
    testing::{fixtures, MockDisk, MockTorrentClient},
    ByteSize, Config, ExitStatus, Gatekeeper, GatekeeperError, Outcome, RemovalOrder, Seconds,
    StatvfsProbe, TorrentClientError, TorrentInfo,
};

const GIB: u64 = 1024 * 1024 * 1024;

/// Test helper wiring a mock disk to a mock client.
struct TestHarness {
    disk: MockDisk,
    client: Arc<MockTorrentClient>,
    config: Config,
}

impl TestHarness {
    fn new(available: u64, required: u64) -> Self {
        let disk = MockDisk::new(available, 1_000 * GIB);
        let client = Arc::new(MockTorrentClient::with_disk(disk.clone()));

        let mut config = Config {
            disk: DiskConfig {
                path: PathBuf::from("/downloads"),
                required: ByteSize(required),
            },
            ..Default::default()
        };
        config.reclaim.settle_secs = Seconds(0);

        Self {
            disk,
            client,
            config,
        }
    }

    async fn with_seeding(self, torrents: &[(&str, u64)]) -> Self {
        for (hash, size) in torrents {
            self.client
                .add_mock_torrent(fixtures::seeding_torrent(hash, *size))
                .await;
        }
        self
    }

    async fn run(&self) -> Result<Outcome, GatekeeperError> {
        Gatekeeper::new(&self.config, self.disk.clone())
            .with_client(self.client.clone())
            .run()
            .await
    }
}

#[tokio::test]
async fn test_sufficient_space_exits_zero_without_contacting_client() {
    let harness = TestHarness::new(50 * GIB, 20 * GIB)
        .with_seeding(&[("aaa", 10 * GIB)])
        .await;

    let result = harness.run().await;

    assert!(matches!(result, Ok(Outcome::Sufficient { .. })));
    assert_eq!(ExitStatus::from_result(&result).code(), 0);
    assert_eq!(harness.client.list_calls(), 0);
    assert!(harness.client.removed().await.is_empty());
    assert_eq!(harness.disk.read_count(), 1);
}

#[tokio::test]
async fn test_exactly_required_space_is_sufficient() {
    let harness = TestHarness::new(20 * GIB, 20 * GIB);
    let result = harness.run().await;
    assert_eq!(ExitStatus::from_result(&result), ExitStatus::Proceed);
}

#[tokio::test]
async fn test_insufficient_space_with_reclaim_disabled_exits_one() {
    let mut harness = TestHarness::new(5 * GIB, 20 * GIB)
        .with_seeding(&[("aaa", 100 * GIB)])
        .await;
    harness.config.reclaim.enabled = false;

    let result = harness.run().await;

    assert!(matches!(result, Ok(Outcome::Insufficient { .. })));
    assert_eq!(ExitStatus::from_result(&result).code(), 1);
    assert_eq!(harness.client.list_calls(), 0);
    assert_eq!(harness.client.torrent_count().await, 1);
}

#[tokio::test]
async fn test_reclaim_removes_minimal_largest_first_prefix() {
    // Deficit is 15 GiB: largest-first removes 12 GiB then 8 GiB and stops.
    let harness = TestHarness::new(5 * GIB, 20 * GIB)
        .with_seeding(&[
            ("small", 2 * GIB),
            ("large", 12 * GIB),
            ("medium", 8 * GIB),
            ("tiny", GIB),
        ])
        .await;

    let result = harness.run().await;

    assert_eq!(ExitStatus::from_result(&result).code(), 0);
    let outcome = result.unwrap();
    assert!(matches!(outcome, Outcome::Reclaimed { .. }));
    assert_eq!(harness.client.removed_hashes().await, vec!["large", "medium"]);
    assert_eq!(outcome.removed().len(), 2);
    assert_eq!(outcome.reading().available_bytes, 25 * GIB);
    // Initial measurement plus one after each removal.
    assert_eq!(harness.disk.read_count(), 3);
    assert!(harness.client.has_torrent("small").await);
    assert!(harness.client.has_torrent("tiny").await);
}

#[tokio::test]
async fn test_reclaim_smallest_first_order() {
    let mut harness = TestHarness::new(5 * GIB, 20 * GIB)
        .with_seeding(&[
            ("large", 12 * GIB),
            ("small", 6 * GIB),
            ("medium", 8 * GIB),
        ])
        .await;
    harness.config.reclaim.order = RemovalOrder::SmallestFirst;

    let result = harness.run().await;

    assert_eq!(ExitStatus::from_result(&result), ExitStatus::Proceed);
    assert_eq!(harness.client.removed_hashes().await, vec!["small", "medium", "large"]);
}

#[tokio::test]
async fn test_equal_sizes_removed_in_hash_order() {
    let harness = TestHarness::new(0, 10 * GIB)
        .with_seeding(&[("ccc", 5 * GIB), ("aaa", 5 * GIB), ("bbb", 5 * GIB)])
        .await;

    let result = harness.run().await;

    assert_eq!(ExitStatus::from_result(&result), ExitStatus::Proceed);
    assert_eq!(harness.client.removed_hashes().await, vec!["aaa", "bbb"]);
}

#[tokio::test]
async fn test_insufficient_candidates_removes_all_eligible_and_exits_one() {
    let harness = TestHarness::new(5 * GIB, 50 * GIB)
        .with_seeding(&[("aaa", 10 * GIB), ("bbb", 5 * GIB)])
        .await;
    let mut protected = fixtures::seeding_torrent("keepme", 100 * GIB);
    protected.tags = vec!["permaseed".to_string()];
    harness.client.add_mock_torrent(protected).await;
    harness
        .client
        .add_mock_torrent(fixtures::downloading_torrent("partial", 100 * GIB))
        .await;

    let result = harness.run().await;

    assert_eq!(ExitStatus::from_result(&result).code(), 1);
    let outcome = result.unwrap();
    assert!(matches!(outcome, Outcome::Insufficient { .. }));
    assert_eq!(harness.client.removed_hashes().await, vec!["aaa", "bbb"]);
    assert_eq!(outcome.reading().available_bytes, 20 * GIB);
    assert!(harness.client.has_torrent("keepme").await);
    assert!(harness.client.has_torrent("partial").await);
}

#[tokio::test]
async fn test_no_eligible_torrents_exits_one() {
    let mut harness = TestHarness::new(5 * GIB, 20 * GIB)
        .with_seeding(&[("young", 50 * GIB)])
        .await;
    harness.config.reclaim.min_seeding_time = Some("30d".parse().unwrap());

    let result = harness.run().await;

    assert_eq!(ExitStatus::from_result(&result), ExitStatus::InsufficientSpace);
    assert_eq!(harness.client.list_calls(), 1);
    assert!(harness.client.removed().await.is_empty());
}

#[tokio::test]
async fn test_missing_path_is_operational_error_without_deletion() {
    let dir = TempDir::new().unwrap();
    let disk = MockDisk::new(0, GIB);
    let client = Arc::new(MockTorrentClient::with_disk(disk));
    client
        .add_mock_torrent(fixtures::seeding_torrent("aaa", 10 * GIB))
        .await;

    let config = Config {
        disk: DiskConfig {
            path: dir.path().join("not-there"),
            required: ByteSize(GIB),
        },
        ..Default::default()
    };

    let result = Gatekeeper::new(&config, StatvfsProbe::new())
        .with_client(client.clone())
        .run()
        .await;

    assert!(matches!(result, Err(GatekeeperError::Filesystem(_))));
    assert_eq!(ExitStatus::from_result(&result).code(), 2);
    assert_eq!(client.list_calls(), 0);
    assert!(client.removed().await.is_empty());
}

#[tokio::test]
async fn test_vanished_mount_is_operational_error() {
    let harness = TestHarness::new(0, 20 * GIB)
        .with_seeding(&[("aaa", 50 * GIB)])
        .await;
    harness.disk.set_missing(true);

    let result = harness.run().await;

    assert!(matches!(result, Err(GatekeeperError::Filesystem(_))));
    assert_eq!(ExitStatus::from_result(&result).code(), 2);
    assert_eq!(harness.client.list_calls(), 0);
    assert_eq!(harness.client.torrent_count().await, 1);
}

#[tokio::test]
async fn test_listing_failure_is_operational_error() {
    let harness = TestHarness::new(0, 20 * GIB)
        .with_seeding(&[("aaa", 50 * GIB)])
        .await;
    harness
        .client
        .set_next_error(TorrentClientError::ConnectionFailed("refused".into()))
        .await;

    let result = harness.run().await;

    assert!(matches!(result, Err(GatekeeperError::ClientApi(_))));
    assert_eq!(ExitStatus::from_result(&result).code(), 2);
    assert!(harness.client.removed().await.is_empty());
}

#[tokio::test]
async fn test_client_unreachable_mid_reclaim_keeps_earlier_deletions() {
    let harness = TestHarness::new(0, 50 * GIB)
        .with_seeding(&[("first", 20 * GIB), ("second", 15 * GIB), ("third", 10 * GIB)])
        .await;
    harness
        .client
        .fail_removal(
            "second",
            TorrentClientError::ConnectionFailed("connection refused".into()),
        )
        .await;

    let result = harness.run().await;

    assert!(matches!(
        result,
        Err(GatekeeperError::ClientApi(TorrentClientError::ConnectionFailed(_)))
    ));
    assert_eq!(ExitStatus::from_result(&result).code(), 2);
    assert_eq!(harness.client.removed_hashes().await, vec!["first"]);
    assert_eq!(harness.disk.available(), 20 * GIB);
    assert!(harness.client.has_torrent("third").await);
}

#[tokio::test]
async fn test_failed_individual_deletion_is_skipped() {
    let harness = TestHarness::new(0, 20 * GIB)
        .with_seeding(&[("big", 30 * GIB), ("next", 25 * GIB)])
        .await;
    harness
        .client
        .fail_removal("big", TorrentClientError::ApiError("HTTP 500".into()))
        .await;

    let result = harness.run().await;

    assert_eq!(ExitStatus::from_result(&result), ExitStatus::Proceed);
    assert_eq!(harness.client.removed_hashes().await, vec!["next"]);
    assert!(harness.client.has_torrent("big").await);
}

fn with_trackers(hash: &str, size: u64, trackers: &[&str]) -> TorrentInfo {
    let mut torrent = fixtures::seeding_torrent(hash, size);
    torrent.trackers = trackers.iter().map(|t| t.to_string()).collect();
    torrent
}

#[tokio::test]
async fn test_protected_tracker_behind_working_tracker_is_kept() {
    let mut harness = TestHarness::new(0, 10 * GIB);
    harness.config.reclaim.exclude_trackers = vec!["lst.gg".to_string()];
    // The listing only shows the first tracker; the protected one is second.
    harness
        .client
        .add_mock_torrent(with_trackers(
            "private",
            30 * GIB,
            &["https://open.example/announce", "https://lst.gg/announce/key"],
        ))
        .await;
    harness
        .client
        .add_mock_torrent(with_trackers(
            "public",
            20 * GIB,
            &["https://open.example/announce"],
        ))
        .await;

    let result = harness.run().await;

    assert_eq!(ExitStatus::from_result(&result), ExitStatus::Proceed);
    assert_eq!(harness.client.removed_hashes().await, vec!["public"]);
    assert!(harness.client.has_torrent("private").await);
}

#[tokio::test]
async fn test_torrent_without_known_tracker_is_kept_when_trackers_protected() {
    let mut harness = TestHarness::new(0, 10 * GIB);
    harness.config.reclaim.exclude_trackers = vec!["lst.gg".to_string()];
    harness
        .client
        .add_mock_torrent(with_trackers("trackerless", 30 * GIB, &[]))
        .await;

    let result = harness.run().await;

    assert_eq!(ExitStatus::from_result(&result), ExitStatus::InsufficientSpace);
    assert!(harness.client.removed().await.is_empty());
}

#[tokio::test]
async fn test_tracker_lookup_failure_keeps_torrent() {
    let mut harness = TestHarness::new(0, 10 * GIB)
        .with_seeding(&[("unknown", 30 * GIB), ("known", 20 * GIB)])
        .await;
    harness.config.reclaim.exclude_trackers = vec!["lst.gg".to_string()];
    harness
        .client
        .fail_trackers("unknown", TorrentClientError::ApiError("HTTP 500".into()))
        .await;

    let result = harness.run().await;

    assert_eq!(ExitStatus::from_result(&result), ExitStatus::Proceed);
    assert_eq!(harness.client.removed_hashes().await, vec!["known"]);
    assert!(harness.client.has_torrent("unknown").await);
}

#[tokio::test]
async fn test_client_unreachable_during_tracker_lookup_is_operational_error() {
    let mut harness = TestHarness::new(0, 10 * GIB)
        .with_seeding(&[("aaa", 30 * GIB)])
        .await;
    harness.config.reclaim.exclude_trackers = vec!["lst.gg".to_string()];
    harness
        .client
        .fail_trackers("aaa", TorrentClientError::Timeout)
        .await;

    let result = harness.run().await;

    assert!(matches!(
        result,
        Err(GatekeeperError::ClientApi(TorrentClientError::Timeout))
    ));
    assert_eq!(ExitStatus::from_result(&result).code(), 2);
    assert!(harness.client.removed().await.is_empty());
}
