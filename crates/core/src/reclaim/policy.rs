use std::fmt;

use crate::config::ReclaimConfig;
use crate::torrent_client::{TorrentInfo, TorrentState};
use crate::units::Seconds;

/// Rules a torrent must pass before it may be removed.
#[derive(Debug, Clone)]
pub struct EligibilityPolicy {
    pub require_complete: bool,
    pub states: Vec<TorrentState>,
    pub min_ratio: Option<f64>,
    pub min_seeding_time: Option<Seconds>,
    /// Lowercased.
    pub exclude_tags: Vec<String>,
    pub exclude_trackers: Vec<String>,
}

/// Why a torrent was kept.
#[derive(Debug, Clone, PartialEq)]
pub enum Ineligible {
    Incomplete { progress: f64 },
    State(TorrentState),
    Ratio { ratio: f64, min: f64 },
    SeedingTime { secs: u64, min: Seconds },
    ExcludedTag(String),
    ExcludedTracker(String),
    /// Protected trackers are configured but the torrent's trackers are unknown.
    UnknownTracker,
}

impl fmt::Display for Ineligible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ineligible::Incomplete { progress } => {
                write!(f, "download incomplete ({:.1}%)", progress * 100.0)
            }
            Ineligible::State(state) => write!(f, "state '{}' not eligible", state.as_str()),
            Ineligible::Ratio { ratio, min } => write!(f, "ratio {:.2} below {:.2}", ratio, min),
            Ineligible::SeedingTime { secs, min } => {
                write!(f, "seeded {} of required {}", Seconds(*secs), min)
            }
            Ineligible::ExcludedTag(tag) => write!(f, "has protected tag '{}'", tag),
            Ineligible::ExcludedTracker(tracker) => {
                write!(f, "tracker matches protected '{}'", tracker)
            }
            Ineligible::UnknownTracker => {
                write!(f, "trackers unknown while protected trackers are configured")
            }
        }
    }
}

impl EligibilityPolicy {
    pub fn from_config(config: &ReclaimConfig) -> Self {
        Self {
            require_complete: config.require_complete,
            states: config.states.clone(),
            min_ratio: config.min_ratio,
            min_seeding_time: config.min_seeding_time,
            exclude_tags: config
                .exclude_tags
                .iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
            exclude_trackers: config
                .exclude_trackers
                .iter()
                .filter(|t| !t.is_empty())
                .cloned()
                .collect(),
        }
    }

    /// `Ok(())` if the torrent may be removed, otherwise the first rule it fails.
    pub fn check(&self, torrent: &TorrentInfo) -> Result<(), Ineligible> {
        if self.require_complete && !torrent.is_complete() {
            return Err(Ineligible::Incomplete {
                progress: torrent.progress,
            });
        }

        if !self.states.contains(&torrent.state) {
            return Err(Ineligible::State(torrent.state));
        }

        if let Some(min) = self.min_ratio {
            if torrent.ratio < min {
                return Err(Ineligible::Ratio {
                    ratio: torrent.ratio,
                    min,
                });
            }
        }

        if let Some(min) = self.min_seeding_time {
            if torrent.seeding_time_secs < min.secs() {
                return Err(Ineligible::SeedingTime {
                    secs: torrent.seeding_time_secs,
                    min,
                });
            }
        }

        if let Some(tag) = torrent
            .tags
            .iter()
            .find(|tag| self.exclude_tags.contains(&tag.trim().to_lowercase()))
        {
            return Err(Ineligible::ExcludedTag(tag.clone()));
        }

        if self.needs_trackers() {
            if torrent.trackers.is_empty() {
                return Err(Ineligible::UnknownTracker);
            }
            if let Some(pattern) = self.exclude_trackers.iter().find(|pattern| {
                torrent
                    .trackers
                    .iter()
                    .any(|url| url.contains(pattern.as_str()))
            }) {
                return Err(Ineligible::ExcludedTracker(pattern.clone()));
            }
        }

        Ok(())
    }

    /// Whether `check` needs each torrent's full tracker list.
    pub fn needs_trackers(&self) -> bool {
        !self.exclude_trackers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    fn default_policy() -> EligibilityPolicy {
        EligibilityPolicy::from_config(&ReclaimConfig::default())
    }

    #[test]
    fn test_seeding_torrent_is_eligible_by_default() {
        assert!(default_policy().check(&fixtures::seeding_torrent("abc", 10)).is_ok());
    }

    #[test]
    fn test_incomplete_torrent_is_kept() {
        let mut torrent = fixtures::seeding_torrent("abc", 10);
        torrent.progress = 0.42;
        assert!(matches!(
            default_policy().check(&torrent),
            Err(Ineligible::Incomplete { .. })
        ));

        let mut policy = default_policy();
        policy.require_complete = false;
        assert!(policy.check(&torrent).is_ok());
    }

    #[test]
    fn test_state_must_be_listed() {
        let mut torrent = fixtures::seeding_torrent("abc", 10);
        torrent.state = TorrentState::Queued;
        assert_eq!(
            default_policy().check(&torrent),
            Err(Ineligible::State(TorrentState::Queued))
        );

        torrent.state = TorrentState::Stalled;
        assert!(default_policy().check(&torrent).is_ok());
    }

    #[test]
    fn test_min_ratio() {
        let mut policy = default_policy();
        policy.min_ratio = Some(1.0);

        let mut torrent = fixtures::seeding_torrent("abc", 10);
        torrent.ratio = 0.5;
        assert!(matches!(
            policy.check(&torrent),
            Err(Ineligible::Ratio { .. })
        ));

        torrent.ratio = 1.0;
        assert!(policy.check(&torrent).is_ok());
    }

    #[test]
    fn test_min_seeding_time() {
        let mut policy = default_policy();
        policy.min_seeding_time = Some(Seconds(3 * 86_400));

        let mut torrent = fixtures::seeding_torrent("abc", 10);
        torrent.seeding_time_secs = 86_400;
        let err = policy.check(&torrent).unwrap_err();
        assert_eq!(err.to_string(), "seeded 1d of required 3d");

        torrent.seeding_time_secs = 3 * 86_400 + 1;
        assert!(policy.check(&torrent).is_ok());
    }

    #[test]
    fn test_excluded_tags_are_case_insensitive() {
        let mut torrent = fixtures::seeding_torrent("abc", 10);
        torrent.tags = vec!["tv".to_string(), "PermaSeed".to_string()];
        assert_eq!(
            default_policy().check(&torrent),
            Err(Ineligible::ExcludedTag("PermaSeed".to_string()))
        );
    }

    #[test]
    fn test_excluded_trackers_match_substring() {
        let mut policy = default_policy();
        policy.exclude_trackers = vec!["lst.gg".to_string()];

        let mut torrent = fixtures::seeding_torrent("abc", 10);
        torrent.trackers = vec!["https://lst.gg/announce/abcdef".to_string()];
        assert_eq!(
            policy.check(&torrent),
            Err(Ineligible::ExcludedTracker("lst.gg".to_string()))
        );

        torrent.trackers = vec!["https://other.example/announce".to_string()];
        assert!(policy.check(&torrent).is_ok());
    }

    #[test]
    fn test_excluded_tracker_matches_any_announce_url() {
        let mut policy = default_policy();
        policy.exclude_trackers = vec!["lst.gg".to_string()];

        let mut torrent = fixtures::seeding_torrent("abc", 10);
        torrent.trackers = vec![
            "udp://open.example:1337/announce".to_string(),
            "https://lst.gg/announce/abcdef".to_string(),
        ];
        assert_eq!(
            policy.check(&torrent),
            Err(Ineligible::ExcludedTracker("lst.gg".to_string()))
        );
    }

    #[test]
    fn test_unknown_tracker_is_kept_when_trackers_are_protected() {
        let mut torrent = fixtures::seeding_torrent("abc", 10);
        torrent.trackers.clear();
        assert!(default_policy().check(&torrent).is_ok());

        let mut policy = default_policy();
        policy.exclude_trackers = vec!["lst.gg".to_string()];
        assert_eq!(policy.check(&torrent), Err(Ineligible::UnknownTracker));
    }
}
