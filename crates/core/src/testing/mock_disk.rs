//! Mock filesystem for testing.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::disk::{DiskError, FreeSpaceReading, SpaceProbe};

#[derive(Debug)]
struct MockDiskState {
    available: AtomicU64,
    total: u64,
    missing: AtomicBool,
    reads: AtomicUsize,
}

/// Mock implementation of the SpaceProbe trait.
///
/// Clones share state, so a clone handed to a [`MockTorrentClient`] sees the
/// same free space as the one measured by the gatekeeper.
///
/// [`MockTorrentClient`]: super::MockTorrentClient
#[derive(Debug, Clone)]
pub struct MockDisk {
    state: Arc<MockDiskState>,
}

impl MockDisk {
    pub fn new(available_bytes: u64, total_bytes: u64) -> Self {
        Self {
            state: Arc::new(MockDiskState {
                available: AtomicU64::new(available_bytes),
                total: total_bytes,
                missing: AtomicBool::new(false),
                reads: AtomicUsize::new(0),
            }),
        }
    }

    pub fn available(&self) -> u64 {
        self.state.available.load(Ordering::SeqCst)
    }

    /// Add `bytes` to the free space, as a deletion would.
    pub fn free(&self, bytes: u64) {
        let _ = self
            .state
            .available
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                Some(current.saturating_add(bytes).min(self.state.total))
            });
    }

    /// Make the monitored path disappear.
    pub fn set_missing(&self, missing: bool) {
        self.state.missing.store(missing, Ordering::SeqCst);
    }

    /// Number of successful reads so far.
    pub fn read_count(&self) -> usize {
        self.state.reads.load(Ordering::SeqCst)
    }
}

impl SpaceProbe for MockDisk {
    fn read(&self, path: &Path) -> Result<FreeSpaceReading, DiskError> {
        if self.state.missing.load(Ordering::SeqCst) {
            return Err(DiskError::PathNotFound {
                path: path.to_path_buf(),
            });
        }
        self.state.reads.fetch_add(1, Ordering::SeqCst);
        Ok(FreeSpaceReading {
            path: path.to_path_buf(),
            available_bytes: self.available(),
            total_bytes: self.state.total,
        })
    }
}
