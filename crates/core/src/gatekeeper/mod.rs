//! The space gatekeeper: measure free space, reclaim it from the torrent
//! client when short, and report whether ingestion may proceed.
//!
//! Flow: measure → (sufficient? done) → list + rank candidates → remove one
//! at a time, re-measuring after each → final measurement.

mod error;
mod outcome;

pub use error::GatekeeperError;
pub use outcome::Outcome;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::config::{Config, ReclaimConfig};
use crate::disk::{FreeSpaceReading, SpaceProbe};
use crate::reclaim::{plan_removals, select_candidates, EligibilityPolicy, TorrentCandidate};
use crate::torrent_client::{TorrentClient, TorrentFilters, TorrentInfo};
use crate::units::ByteSize;

/// One-shot free space gate for a single path.
pub struct Gatekeeper<P: SpaceProbe> {
    path: PathBuf,
    required: ByteSize,
    reclaim: ReclaimConfig,
    probe: P,
    client: Option<Arc<dyn TorrentClient>>,
}

impl<P: SpaceProbe> Gatekeeper<P> {
    pub fn new(config: &Config, probe: P) -> Self {
        Self {
            path: config.disk.path.clone(),
            required: config.disk.required,
            reclaim: config.reclaim.clone(),
            probe,
            client: None,
        }
    }

    /// Attach the torrent client used for reclaiming space.
    pub fn with_client(mut self, client: Arc<dyn TorrentClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Run the check, reclaiming space if needed and allowed.
    pub async fn run(&self) -> Result<Outcome, GatekeeperError> {
        let initial = self.measure()?;
        if initial.satisfies(self.required) {
            info!("Sufficient disk space is already available");
            return Ok(Outcome::Sufficient { reading: initial });
        }

        let deficit = initial.deficit(self.required);
        info!("Need to free {} to meet requirement", deficit);

        if !self.reclaim.enabled {
            info!("Reclaim disabled, not removing torrents");
            return Ok(Outcome::Insufficient {
                reading: initial,
                removed: Vec::new(),
            });
        }

        let Some(client) = &self.client else {
            warn!("Reclaim enabled but no torrent client configured");
            return Ok(Outcome::Insufficient {
                reading: initial,
                removed: Vec::new(),
            });
        };

        self.reclaim(client.as_ref(), initial, deficit).await
    }

    async fn reclaim(
        &self,
        client: &dyn TorrentClient,
        initial: FreeSpaceReading,
        deficit: ByteSize,
    ) -> Result<Outcome, GatekeeperError> {
        let filters = TorrentFilters {
            completed_only: self.reclaim.require_complete,
            category: self.reclaim.category.clone(),
        };
        let mut torrents = client.list_torrents(&filters).await.map_err(|e| {
            error!("Failed to list torrents from {}: {}", client.name(), e);
            GatekeeperError::ClientApi(e)
        })?;
        let listed = torrents.len();

        let policy = EligibilityPolicy::from_config(&self.reclaim);
        if policy.needs_trackers() {
            resolve_trackers(client, &mut torrents).await?;
        }
        let candidates = select_candidates(torrents, &policy, self.reclaim.order);
        info!(
            listed,
            eligible = candidates.len(),
            order = %self.reclaim.order,
            "Selected removal candidates"
        );

        if candidates.is_empty() {
            info!("No torrents matched the removal policy");
            return Ok(Outcome::Insufficient {
                reading: initial,
                removed: Vec::new(),
            });
        }

        let plan = plan_removals(&candidates, deficit);
        if plan.covers_deficit {
            info!(
                "Expect to remove {} torrent(s) totalling {}",
                plan.count, plan.planned
            );
        } else {
            warn!(
                "Eligible torrents total only {} of the {} needed",
                plan.planned, deficit
            );
        }

        if self.reclaim.dry_run {
            for candidate in &candidates[..plan.count] {
                info!(
                    hash = %candidate.hash,
                    "Dry run, would remove: {} ({})",
                    candidate.name,
                    candidate.size()
                );
            }
            return Ok(Outcome::Insufficient {
                reading: initial,
                removed: Vec::new(),
            });
        }

        let settle = self.reclaim.settle_secs.as_duration();
        let mut removed: Vec<TorrentCandidate> = Vec::new();

        for candidate in candidates {
            info!(
                hash = %candidate.hash,
                "Removing: {} ({})",
                candidate.name,
                candidate.size()
            );

            if let Err(e) = client
                .remove_torrent(&candidate.hash, self.reclaim.delete_files)
                .await
            {
                if e.is_unreachable() {
                    error!(
                        "Torrent client became unreachable after {} removal(s): {}",
                        removed.len(),
                        e
                    );
                    return Err(GatekeeperError::ClientApi(e));
                }
                warn!("Failed to remove {}, skipping: {}", candidate.hash, e);
                continue;
            }
            removed.push(candidate);

            settle_delay(settle).await;
            let reading = self.measure()?;
            if reading.satisfies(self.required) {
                info!(
                    "Sufficient disk space freed after removing {} torrent(s)",
                    removed.len()
                );
                return Ok(Outcome::Reclaimed { reading, removed });
            }
        }

        let reading = self.measure()?;
        if reading.satisfies(self.required) {
            Ok(Outcome::Reclaimed { reading, removed })
        } else {
            warn!(
                "Still short of {} after removing {} torrent(s)",
                reading.deficit(self.required),
                removed.len()
            );
            Ok(Outcome::Insufficient { reading, removed })
        }
    }

    fn measure(&self) -> Result<FreeSpaceReading, GatekeeperError> {
        let reading = self.probe.read(&self.path).map_err(|e| {
            error!("Cannot determine free space: {}", e);
            GatekeeperError::Filesystem(e)
        })?;
        info!(
            path = %reading.path.display(),
            "Required: {} | Available: {} of {}",
            self.required,
            reading.available(),
            reading.total()
        );
        Ok(reading)
    }
}

/// Replace the listed tracker with every announce URL of each torrent.
/// A torrent whose trackers cannot be fetched is left with none, which the
/// policy treats as protected.
async fn resolve_trackers(
    client: &dyn TorrentClient,
    torrents: &mut [TorrentInfo],
) -> Result<(), GatekeeperError> {
    for torrent in torrents.iter_mut() {
        match client.torrent_trackers(&torrent.hash).await {
            Ok(urls) => torrent.trackers = urls,
            Err(e) if e.is_unreachable() => {
                error!("Failed to fetch trackers from {}: {}", client.name(), e);
                return Err(GatekeeperError::ClientApi(e));
            }
            Err(e) => {
                warn!("Could not fetch trackers of {}: {}", torrent.hash, e);
                torrent.trackers.clear();
            }
        }
    }
    Ok(())
}

async fn settle_delay(settle: Duration) {
    if !settle.is_zero() {
        tokio::time::sleep(settle).await;
    }
}
