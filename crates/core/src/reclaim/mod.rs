//! Reclaim: deciding which torrents may be removed, in what order, and how
//! many are expected to cover a free space deficit.

mod order;
mod plan;
mod policy;

pub use order::RemovalOrder;
pub use plan::{plan_removals, RemovalPlan};
pub use policy::{EligibilityPolicy, Ineligible};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::torrent_client::TorrentInfo;
use crate::units::ByteSize;

/// The slice of a client torrent needed to decide and perform a removal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TorrentCandidate {
    pub hash: String,
    pub name: String,
    pub size_bytes: u64,
    pub ratio: f64,
    pub seeding_time_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl TorrentCandidate {
    pub fn size(&self) -> ByteSize {
        ByteSize(self.size_bytes)
    }
}

impl From<TorrentInfo> for TorrentCandidate {
    fn from(info: TorrentInfo) -> Self {
        Self {
            hash: info.hash,
            name: info.name,
            size_bytes: info.size_bytes,
            ratio: info.ratio,
            seeding_time_secs: info.seeding_time_secs,
            added_at: info.added_at,
            completed_at: info.completed_at,
        }
    }
}

/// Keep the torrents the policy allows removing, ordered for removal.
pub fn select_candidates(
    torrents: Vec<TorrentInfo>,
    policy: &EligibilityPolicy,
    order: RemovalOrder,
) -> Vec<TorrentCandidate> {
    let mut candidates: Vec<TorrentCandidate> = torrents
        .into_iter()
        .filter(|t| match policy.check(t) {
            Ok(()) => true,
            Err(reason) => {
                debug!(hash = %t.hash, name = %t.name, "Not eligible: {}", reason);
                false
            }
        })
        .map(TorrentCandidate::from)
        .collect();

    order.sort(&mut candidates);
    candidates
}
