//! Mock torrent client for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::MockDisk;
use crate::torrent_client::{TorrentClient, TorrentClientError, TorrentFilters, TorrentInfo};

/// A recorded torrent removal for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRemoval {
    pub hash: String,
    pub delete_files: bool,
}

/// Mock implementation of the TorrentClient trait.
///
/// Provides controllable behavior for testing:
/// - Pre-populated torrents, listed in insertion order
/// - Recorded removals for assertions
/// - Injected failures, globally or per torrent
/// - Listings that carry only the first tracker, like qBittorrent's `tracker`
///   field; [`TorrentClient::torrent_trackers`] returns all of them
/// - Optional link to a [`MockDisk`] that gains space on removal
///
/// # Example
///
/// ```rust,ignore
/// let client = MockTorrentClient::new();
/// client.add_mock_torrent(fixtures::seeding_torrent("abc", 1024)).await;
///
/// client.remove_torrent("abc", true).await?;
/// assert_eq!(client.removed_hashes().await, vec!["abc"]);
/// ```
#[derive(Debug, Default)]
pub struct MockTorrentClient {
    /// Current torrents, in listing order.
    torrents: Arc<RwLock<Vec<TorrentInfo>>>,
    /// Recorded remove_torrent calls that succeeded.
    removed: Arc<RwLock<Vec<RecordedRemoval>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<TorrentClientError>>>,
    /// Errors returned when removing specific hashes.
    removal_errors: Arc<RwLock<HashMap<String, TorrentClientError>>>,
    /// Errors returned when fetching trackers of specific hashes.
    tracker_errors: Arc<RwLock<HashMap<String, TorrentClientError>>>,
    /// Number of list_torrents calls.
    list_calls: Arc<AtomicUsize>,
    /// Disk credited with a torrent's size when its files are deleted.
    disk: Option<MockDisk>,
}

impl MockTorrentClient {
    /// Create a new mock torrent client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock client whose removals free space on `disk`.
    pub fn with_disk(disk: MockDisk) -> Self {
        Self {
            disk: Some(disk),
            ..Self::new()
        }
    }

    /// Pre-populate a torrent.
    pub async fn add_mock_torrent(&self, info: TorrentInfo) {
        self.torrents.write().await.push(info);
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: TorrentClientError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make removing `hash` fail with the given error.
    pub async fn fail_removal(&self, hash: &str, error: TorrentClientError) {
        self.removal_errors
            .write()
            .await
            .insert(hash.to_string(), error);
    }

    /// Make fetching the trackers of `hash` fail with the given error.
    pub async fn fail_trackers(&self, hash: &str, error: TorrentClientError) {
        self.tracker_errors
            .write()
            .await
            .insert(hash.to_string(), error);
    }

    /// Get all recorded removals.
    pub async fn removed(&self) -> Vec<RecordedRemoval> {
        self.removed.read().await.clone()
    }

    /// Hashes of removed torrents, in removal order.
    pub async fn removed_hashes(&self) -> Vec<String> {
        self.removed
            .read()
            .await
            .iter()
            .map(|r| r.hash.clone())
            .collect()
    }

    /// Number of times torrents were listed.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Check if a torrent exists.
    pub async fn has_torrent(&self, hash: &str) -> bool {
        self.torrents.read().await.iter().any(|t| t.hash == hash)
    }

    /// Get the number of torrents.
    pub async fn torrent_count(&self) -> usize {
        self.torrents.read().await.len()
    }

    /// Take the next error if set.
    async fn take_error(&self) -> Option<TorrentClientError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl TorrentClient for MockTorrentClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_torrents(
        &self,
        filters: &TorrentFilters,
    ) -> Result<Vec<TorrentInfo>, TorrentClientError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        let torrents = self.torrents.read().await;
        Ok(torrents
            .iter()
            .filter(|t| !filters.completed_only || t.is_complete())
            .filter(|t| match &filters.category {
                Some(category) => t.category.as_ref() == Some(category),
                None => true,
            })
            .map(|t| TorrentInfo {
                trackers: t.trackers.iter().take(1).cloned().collect(),
                ..t.clone()
            })
            .collect())
    }

    async fn torrent_trackers(&self, hash: &str) -> Result<Vec<String>, TorrentClientError> {
        if let Some(err) = self.tracker_errors.write().await.remove(hash) {
            return Err(err);
        }
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.torrents
            .read()
            .await
            .iter()
            .find(|t| t.hash == hash)
            .map(|t| t.trackers.clone())
            .ok_or_else(|| TorrentClientError::TorrentNotFound(hash.to_string()))
    }

    async fn remove_torrent(
        &self,
        hash: &str,
        delete_files: bool,
    ) -> Result<(), TorrentClientError> {
        if let Some(err) = self.removal_errors.write().await.remove(hash) {
            return Err(err);
        }
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        let mut torrents = self.torrents.write().await;
        let Some(index) = torrents.iter().position(|t| t.hash == hash) else {
            return Err(TorrentClientError::TorrentNotFound(hash.to_string()));
        };
        let info = torrents.remove(index);

        if delete_files {
            if let Some(disk) = &self.disk {
                disk.free(info.size_bytes);
            }
        }

        self.removed.write().await.push(RecordedRemoval {
            hash: hash.to_string(),
            delete_files,
        });
        Ok(())
    }
}
