use super::TorrentCandidate;
use crate::units::ByteSize;

/// How much of an ordered candidate list is expected to cover a deficit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovalPlan {
    /// Length of the candidate prefix to remove.
    pub count: usize,
    /// Sum of the reported sizes of that prefix.
    pub planned: ByteSize,
    /// Whether the prefix covers the deficit on paper.
    pub covers_deficit: bool,
}

/// Minimal prefix of `candidates` whose sizes add up to `deficit`.
///
/// When even the whole list falls short, the plan spans every candidate.
/// Reported sizes are an estimate: the gatekeeper still re-measures after
/// each removal.
pub fn plan_removals(candidates: &[TorrentCandidate], deficit: ByteSize) -> RemovalPlan {
    let mut planned = 0u64;
    let mut count = 0;

    for candidate in candidates {
        if planned >= deficit.bytes() {
            break;
        }
        planned = planned.saturating_add(candidate.size_bytes);
        count += 1;
    }

    RemovalPlan {
        count,
        planned: ByteSize(planned),
        covers_deficit: planned >= deficit.bytes(),
    }
}
