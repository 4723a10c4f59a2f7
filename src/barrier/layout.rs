/*!
 * Group Segment Layout
 * Fixed byte layout shared between the launcher and every participant
 */

use crate::core::types::Size;
use std::sync::atomic::AtomicU32;

/// Capacity of the published-resource-name slot, in bytes.
pub const RESOURCE_NAME_CAP: usize = 64;

// Header field offsets. The generation arena trails the header with one slot
// per rank plus the consensus slot; its capacity is fixed at creation and the
// arena is only ever accessed by index.
const PARTICIPANTS_OFFSET: usize = 0;
const ALLOC_SEQ_OFFSET: usize = 4;
const NAME_LEN_OFFSET: usize = 8;
const NAME_BUF_OFFSET: usize = 12;
const GENERATIONS_OFFSET: usize = NAME_BUF_OFFSET + RESOURCE_NAME_CAP;

/// Sizing rule for the group segment.
///
/// The launcher allocates the segment with this size before any participant
/// starts; participants map it with the same size. Both sides must agree on
/// the participant count for the layout to line up.
pub struct BarrierLayout;

impl BarrierLayout {
    /// Byte size of a group segment for `participant_count` ranks.
    pub fn size_for(participant_count: u32) -> Size {
        GENERATIONS_OFFSET + (participant_count as Size + 1) * std::mem::size_of::<u32>()
    }
}

/// Typed view over a mapped group segment.
///
/// All multi-writer fields are atomics; the name buffer is written only by
/// rank 0 before a barrier round and read by the rest after it, so the
/// barrier's acquire/release pair orders those plain byte copies.
pub(crate) struct RegionView {
    base: *mut u8,
    participant_count: u32,
}

impl RegionView {
    /// # Safety
    ///
    /// `base` must point to a mapping of at least
    /// `BarrierLayout::size_for(participant_count)` bytes that outlives the
    /// view.
    pub unsafe fn new(base: *mut u8, participant_count: u32) -> Self {
        Self {
            base,
            participant_count,
        }
    }

    fn atomic_at(&self, offset: usize) -> &AtomicU32 {
        // SAFETY: offset is one of the 4-byte-aligned layout constants within
        // the mapping promised at construction.
        unsafe { &*(self.base.add(offset) as *const AtomicU32) }
    }

    pub fn participants(&self) -> &AtomicU32 {
        self.atomic_at(PARTICIPANTS_OFFSET)
    }

    pub fn alloc_seq(&self) -> &AtomicU32 {
        self.atomic_at(ALLOC_SEQ_OFFSET)
    }

    pub fn name_len(&self) -> &AtomicU32 {
        self.atomic_at(NAME_LEN_OFFSET)
    }

    pub fn name_buf_ptr(&self) -> *mut u8 {
        // SAFETY: NAME_BUF_OFFSET..+RESOURCE_NAME_CAP is inside the mapping.
        unsafe { self.base.add(NAME_BUF_OFFSET) }
    }

    /// Generation slot for `index`; index `participant_count` is the
    /// consensus slot.
    pub fn generation(&self, index: u32) -> &AtomicU32 {
        debug_assert!(index <= self.participant_count);
        self.atomic_at(GENERATIONS_OFFSET + index as usize * std::mem::size_of::<u32>())
    }
}
