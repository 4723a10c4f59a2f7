/*!
 * Barrier Types
 * Errors for group segment attachment and the rendezvous channel
 */

use crate::shm::ShmError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Barrier error types
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "error", content = "details")]
pub enum BarrierError {
    /// The mapped group segment was sized for a different group
    #[error("Participant count mismatch: group segment holds {found}, caller expects {expected}")]
    ParticipantMismatch { expected: u32, found: u32 },

    /// Rank does not fit the group
    #[error("Rank {rank} out of range for group of {participant_count}")]
    RankOutOfRange { rank: u32, participant_count: u32 },

    /// Groups must have at least one participant
    #[error("Invalid participant count: {0}")]
    InvalidParticipantCount(u32),

    /// Published resource name exceeds the fixed name slot
    #[error("Resource name too long: {len} bytes (max {max})")]
    NameTooLong { len: usize, max: usize },

    /// Underlying segment failure
    #[error(transparent)]
    Shm(#[from] ShmError),
}
