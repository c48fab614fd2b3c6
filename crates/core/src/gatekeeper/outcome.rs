use serde::Serialize;

use crate::disk::FreeSpaceReading;
use crate::reclaim::TorrentCandidate;

/// Result of a completed gatekeeper run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Enough space was available from the start.
    Sufficient { reading: FreeSpaceReading },
    /// Enough space after removing torrents.
    Reclaimed {
        reading: FreeSpaceReading,
        removed: Vec<TorrentCandidate>,
    },
    /// Still short of space; `removed` lists what was deleted trying.
    Insufficient {
        reading: FreeSpaceReading,
        removed: Vec<TorrentCandidate>,
    },
}

impl Outcome {
    /// Final free space reading.
    pub fn reading(&self) -> &FreeSpaceReading {
        match self {
            Outcome::Sufficient { reading }
            | Outcome::Reclaimed { reading, .. }
            | Outcome::Insufficient { reading, .. } => reading,
        }
    }

    /// Torrents removed during this run.
    pub fn removed(&self) -> &[TorrentCandidate] {
        match self {
            Outcome::Sufficient { .. } => &[],
            Outcome::Reclaimed { removed, .. } | Outcome::Insufficient { removed, .. } => removed,
        }
    }

    /// Whether ingestion may proceed.
    pub fn allows_ingestion(&self) -> bool {
        !matches!(self, Outcome::Insufficient { .. })
    }
}
