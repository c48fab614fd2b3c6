use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::TorrentCandidate;

/// Order in which eligible torrents are removed. Ties always fall back to
/// ascending hash, so the client's listing order never matters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalOrder {
    /// Fewest removals to cover a deficit.
    #[default]
    LargestFirst,
    /// Remove many small torrents before touching large ones.
    SmallestFirst,
    /// Oldest completion (then addition) time first; unknown times last.
    OldestFirst,
}

impl RemovalOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemovalOrder::LargestFirst => "largest_first",
            RemovalOrder::SmallestFirst => "smallest_first",
            RemovalOrder::OldestFirst => "oldest_first",
        }
    }

    pub fn sort(&self, candidates: &mut [TorrentCandidate]) {
        candidates.sort_by(|a, b| self.compare(a, b).then_with(|| a.hash.cmp(&b.hash)));
    }

    fn compare(&self, a: &TorrentCandidate, b: &TorrentCandidate) -> Ordering {
        match self {
            RemovalOrder::LargestFirst => b.size_bytes.cmp(&a.size_bytes),
            RemovalOrder::SmallestFirst => a.size_bytes.cmp(&b.size_bytes),
            RemovalOrder::OldestFirst => {
                let a_time = a.completed_at.or(a.added_at);
                let b_time = b.completed_at.or(b.added_at);
                match (a_time, b_time) {
                    (Some(a), Some(b)) => a.cmp(&b),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            }
        }
    }
}

impl fmt::Display for RemovalOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RemovalOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "largest_first" | "largest" => Ok(RemovalOrder::LargestFirst),
            "smallest_first" | "smallest" => Ok(RemovalOrder::SmallestFirst),
            "oldest_first" | "oldest" => Ok(RemovalOrder::OldestFirst),
            other => Err(format!(
                "unknown removal order '{}' (expected largest_first, smallest_first or oldest_first)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn candidate(hash: &str, size: u64) -> TorrentCandidate {
        TorrentCandidate {
            hash: hash.to_string(),
            name: format!("Torrent {}", hash),
            size_bytes: size,
            ratio: 1.0,
            seeding_time_secs: 0,
            added_at: None,
            completed_at: None,
        }
    }

    fn hashes(candidates: &[TorrentCandidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.hash.as_str()).collect()
    }

    #[test]
    fn test_largest_first_with_hash_tie_break() {
        let mut list = vec![
            candidate("d", 10),
            candidate("b", 30),
            candidate("a", 30),
            candidate("c", 20),
        ];
        RemovalOrder::LargestFirst.sort(&mut list);
        assert_eq!(hashes(&list), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_smallest_first() {
        let mut list = vec![candidate("x", 300), candidate("y", 100), candidate("z", 200)];
        RemovalOrder::SmallestFirst.sort(&mut list);
        assert_eq!(hashes(&list), vec!["y", "z", "x"]);
    }

    #[test]
    fn test_oldest_first_prefers_completion_time() {
        let mut old = candidate("old", 1);
        old.completed_at = Utc.timestamp_opt(1_000, 0).single();
        let mut newer = candidate("newer", 1);
        newer.completed_at = Utc.timestamp_opt(2_000, 0).single();
        let mut added_only = candidate("added", 1);
        added_only.added_at = Utc.timestamp_opt(1_500, 0).single();
        let unknown = candidate("unknown", 1);

        let mut list = vec![unknown, newer, added_only, old];
        RemovalOrder::OldestFirst.sort(&mut list);
        assert_eq!(hashes(&list), vec!["old", "added", "newer", "unknown"]);
    }

    #[test]
    fn test_sort_ignores_input_order() {
        let mut forward = vec![candidate("a", 5), candidate("b", 5), candidate("c", 5)];
        let mut backward = vec![candidate("c", 5), candidate("b", 5), candidate("a", 5)];
        RemovalOrder::SmallestFirst.sort(&mut forward);
        RemovalOrder::SmallestFirst.sort(&mut backward);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            "largest-first".parse::<RemovalOrder>().unwrap(),
            RemovalOrder::LargestFirst
        );
        assert_eq!(
            "smallest".parse::<RemovalOrder>().unwrap(),
            RemovalOrder::SmallestFirst
        );
        assert_eq!(
            "OLDEST_FIRST".parse::<RemovalOrder>().unwrap(),
            RemovalOrder::OldestFirst
        );
        assert!("random".parse::<RemovalOrder>().is_err());
    }
}
