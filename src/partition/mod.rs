/*!
 * Partition Module
 * Pure row/column work partitioning across a fixed participant count
 */

use crate::core::types::Rank;
use serde::{Deserialize, Serialize};

/// A contiguous, half-open index range assigned to one rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionRange {
    pub start: usize,
    pub end: usize,
}

impl PartitionRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// One rank's share of an extent: a base range plus at most one leftover
/// index.
///
/// The participant count is clamped to `min(participants, extent)` so no rank
/// gets a negative or backwards range when the group outnumbers the rows.
/// With `p = min(participants, extent)` and `base = extent / p`, rank `r < p`
/// takes `[r*base, (r+1)*base)`; the `extent mod p` leftover indices
/// `p*base..extent` go round-robin, one each, to ranks `0..extent mod p`.
/// The union over all ranks tiles `[0, extent)` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankAssignment {
    pub base: PartitionRange,
    pub extra: Option<PartitionRange>,
}

impl RankAssignment {
    /// Compute the assignment of `extent` indices to `rank` out of
    /// `participants`.
    pub fn compute(extent: usize, participants: u32, rank: Rank) -> Self {
        let empty = Self {
            base: PartitionRange { start: 0, end: 0 },
            extra: None,
        };

        let clamped = (participants as usize).min(extent);
        if clamped == 0 || rank as usize >= clamped {
            return empty;
        }

        let base_len = extent / clamped;
        let leftover = extent % clamped;
        let start = rank as usize * base_len;
        let base = PartitionRange {
            start,
            end: start + base_len,
        };

        let extra = if (rank as usize) < leftover {
            let row = clamped * base_len + rank as usize;
            Some(PartitionRange {
                start: row,
                end: row + 1,
            })
        } else {
            None
        };

        Self { base, extra }
    }

    /// All indices assigned to this rank, base range first.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        (self.base.start..self.base.end).chain(self.extra.iter().flat_map(|r| r.start..r.end))
    }

    pub fn len(&self) -> usize {
        self.base.len() + self.extra.map_or(0, |r| r.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
