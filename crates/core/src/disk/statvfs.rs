use std::path::Path;

use tracing::debug;

use super::{DiskError, FreeSpaceReading, SpaceProbe};

/// Reads free space with `statvfs(3)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatvfsProbe;

impl StatvfsProbe {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(unix)]
impl SpaceProbe for StatvfsProbe {
    fn read(&self, path: &Path) -> Result<FreeSpaceReading, DiskError> {
        if !path.exists() {
            return Err(DiskError::PathNotFound {
                path: path.to_path_buf(),
            });
        }

        let stat = nix::sys::statvfs::statvfs(path).map_err(|errno| DiskError::Stat {
            path: path.to_path_buf(),
            source: std::io::Error::from(errno),
        })?;

        let fragment = stat.fragment_size() as u64;
        let reading = FreeSpaceReading {
            path: path.to_path_buf(),
            available_bytes: (stat.blocks_available() as u64).saturating_mul(fragment),
            total_bytes: (stat.blocks() as u64).saturating_mul(fragment),
        };
        debug!(
            path = %path.display(),
            available = reading.available_bytes,
            total = reading.total_bytes,
            "statvfs"
        );
        Ok(reading)
    }
}

#[cfg(not(unix))]
impl SpaceProbe for StatvfsProbe {
    fn read(&self, path: &Path) -> Result<FreeSpaceReading, DiskError> {
        if !path.exists() {
            return Err(DiskError::PathNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(DiskError::Unsupported {
            path: path.to_path_buf(),
        })
    }
}
