/*!
 * Shared Barrier
 * Full-group rendezvous over the generation arena of the group segment
 */

use super::layout::{BarrierLayout, RegionView, RESOURCE_NAME_CAP};
use super::types::BarrierError;
use crate::core::types::{Generation, Rank};
use crate::shm::SharedSegment;
use log::info;
use std::sync::atomic::Ordering;

// Yield to the scheduler every this many failed rescans.
const YIELD_INTERVAL: u32 = 64;

/// Per-process handle to the group's rendezvous barrier.
///
/// The group segment is created and sized by the launcher before any
/// participant starts (see [`crate::launch`]); each participant attaches with
/// its own rank.
///
/// There is no timeout and no partial release: if a participant never reaches
/// [`SharedBarrier::synch`], every other participant spins forever. The group
/// trades failure detection for simplicity across a small set of trusted
/// cooperating processes.
pub struct SharedBarrier {
    segment: SharedSegment,
    view: RegionView,
    rank: Rank,
    participant_count: u32,
}

impl SharedBarrier {
    /// Attach to an existing group segment as `rank`.
    pub fn attach(
        group_name: &str,
        rank: Rank,
        participant_count: u32,
    ) -> Result<Self, BarrierError> {
        if participant_count == 0 {
            return Err(BarrierError::InvalidParticipantCount(0));
        }
        if rank >= participant_count {
            return Err(BarrierError::RankOutOfRange {
                rank,
                participant_count,
            });
        }

        let segment = SharedSegment::open(group_name, BarrierLayout::size_for(participant_count))?;
        // SAFETY: the mapping is sized for participant_count and owned by
        // self, so it outlives the view.
        let view = unsafe { RegionView::new(segment.as_mut_ptr(), participant_count) };

        let found = view.participants().load(Ordering::Acquire);
        if found != participant_count {
            return Err(BarrierError::ParticipantMismatch {
                expected: participant_count,
                found,
            });
        }

        info!(
            "Rank {} attached to group '{}' ({} participants)",
            rank, group_name, participant_count
        );

        Ok(Self {
            segment,
            view,
            rank,
            participant_count,
        })
    }

    pub fn rank(&self) -> Rank {
        self.rank
    }

    pub fn participant_count(&self) -> u32 {
        self.participant_count
    }

    pub fn group_name(&self) -> &str {
        self.segment.name()
    }

    /// Block until every participant has called `synch` for this round.
    ///
    /// Publishes `consensus + 1` into this rank's generation slot, then
    /// rescans all per-rank slots until each has reached the target. Whoever
    /// observes full arrival writes the target into the consensus slot;
    /// multiple ranks may do so redundantly, writing the same value.
    ///
    /// Two consecutive calls never collapse into one round: each call raises
    /// this rank's slot past the previously published consensus, and returns
    /// only after every other rank has done the same.
    pub fn synch(&self) {
        let consensus = self.view.generation(self.participant_count);
        let target = consensus.load(Ordering::Acquire) + 1;
        self.view
            .generation(self.rank)
            .store(target, Ordering::Release);

        let mut spins: u32 = 0;
        loop {
            let mut arrived = true;
            for i in 0..self.participant_count {
                if self.view.generation(i).load(Ordering::Acquire) < target {
                    arrived = false;
                    break;
                }
            }
            if arrived {
                consensus.store(target, Ordering::Release);
                return;
            }

            spins = spins.wrapping_add(1);
            if spins % YIELD_INTERVAL == 0 {
                std::thread::yield_now();
            } else {
                std::hint::spin_loop();
            }
        }
    }

    /// Last generation published into the consensus slot.
    pub fn consensus_generation(&self) -> Generation {
        self.view
            .generation(self.participant_count)
            .load(Ordering::Acquire)
    }

    /// Publish a resource name into the group's rendezvous slot.
    ///
    /// Called by the creating rank before the rendezvous barrier; the barrier
    /// round makes the bytes visible to every reader of
    /// [`SharedBarrier::last_resource_name`].
    pub fn publish_resource_name(&self, name: &str) -> Result<(), BarrierError> {
        let bytes = name.as_bytes();
        if bytes.len() > RESOURCE_NAME_CAP {
            return Err(BarrierError::NameTooLong {
                len: bytes.len(),
                max: RESOURCE_NAME_CAP,
            });
        }

        // SAFETY: length checked against the fixed slot capacity; only the
        // creating rank writes here, pre-barrier.
        unsafe {
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), self.view.name_buf_ptr(), bytes.len());
        }
        self.view
            .name_len()
            .store(bytes.len() as u32, Ordering::Release);
        Ok(())
    }

    /// Read the most recently published resource name.
    pub fn last_resource_name(&self) -> String {
        let len = (self.view.name_len().load(Ordering::Acquire) as usize).min(RESOURCE_NAME_CAP);
        let mut buf = vec![0u8; len];
        // SAFETY: len is clamped to the slot capacity inside the mapping.
        unsafe {
            std::ptr::copy_nonoverlapping(self.view.name_buf_ptr(), buf.as_mut_ptr(), len);
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Mint the next allocation sequence number for this group.
    ///
    /// Only the coordinating rank (rank 0) advances this; the counter lives
    /// in the group segment so it is monotonic for the group's lifetime.
    pub fn next_allocation_seq(&self) -> u32 {
        self.view.alloc_seq().fetch_add(1, Ordering::SeqCst)
    }
}

// SAFETY: the view points into the segment owned by this struct; all shared
// fields are atomics or barrier-ordered byte copies.
unsafe impl Send for SharedBarrier {}
unsafe impl Sync for SharedBarrier {}
