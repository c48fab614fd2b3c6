//! Free space measurement for the monitored path.

mod statvfs;

pub use statvfs::StatvfsProbe;

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::units::ByteSize;

/// Errors raised while measuring free space.
#[derive(Debug, Error)]
pub enum DiskError {
    /// The monitored path does not exist.
    #[error("Path does not exist: {path}")]
    PathNotFound { path: PathBuf },

    /// statvfs failed for another reason (permissions, I/O).
    #[error("Failed to stat filesystem at {path}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Free space cannot be measured on this platform.
    #[error("Free space measurement is not supported on this platform ({path})")]
    Unsupported { path: PathBuf },
}

/// A point-in-time free space snapshot of the filesystem holding `path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FreeSpaceReading {
    pub path: PathBuf,
    /// Bytes available to unprivileged users.
    pub available_bytes: u64,
    pub total_bytes: u64,
}

impl FreeSpaceReading {
    pub fn available(&self) -> ByteSize {
        ByteSize(self.available_bytes)
    }

    pub fn total(&self) -> ByteSize {
        ByteSize(self.total_bytes)
    }

    /// Whether at least `required` bytes are available.
    pub fn satisfies(&self, required: ByteSize) -> bool {
        self.available_bytes >= required.bytes()
    }

    /// Bytes still missing to reach `required` (0 when satisfied).
    pub fn deficit(&self, required: ByteSize) -> ByteSize {
        ByteSize(required.bytes().saturating_sub(self.available_bytes))
    }
}

/// Source of free space readings.
pub trait SpaceProbe: Send + Sync {
    fn read(&self, path: &Path) -> Result<FreeSpaceReading, DiskError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(available: u64) -> FreeSpaceReading {
        FreeSpaceReading {
            path: PathBuf::from("/downloads"),
            available_bytes: available,
            total_bytes: 1000,
        }
    }

    #[test]
    fn test_satisfies_is_inclusive() {
        assert!(reading(100).satisfies(ByteSize(100)));
        assert!(reading(101).satisfies(ByteSize(100)));
        assert!(!reading(99).satisfies(ByteSize(100)));
    }

    #[test]
    fn test_deficit() {
        assert_eq!(reading(40).deficit(ByteSize(100)), ByteSize(60));
        assert_eq!(reading(400).deficit(ByteSize(100)), ByteSize(0));
    }

    #[test]
    fn test_disk_error_messages() {
        let err = DiskError::PathNotFound {
            path: PathBuf::from("/missing"),
        };
        assert_eq!(err.to_string(), "Path does not exist: /missing");
    }
}
