/*!
 * Launch Module
 * Launcher-side contract for the well-known group segment
 */

use crate::barrier::layout::{BarrierLayout, RegionView};
use crate::barrier::BarrierError;
use crate::shm::{SharedSegment, ShmError};
use log::info;
use std::sync::atomic::Ordering;

/// Create and initialize the group segment for `participant_count` ranks.
///
/// This is the launcher's half of the startup contract: the segment must
/// exist, be sized by [`BarrierLayout::size_for`], and have its participant
/// count set and all generation slots zeroed *before* any participant process
/// starts. Fresh segments are zero-filled by the kernel, so only the
/// participant count needs an explicit store.
///
/// The returned handle is the launcher's own mapping; dropping it does not
/// remove the name. Call [`remove_group_segment`] only after every
/// participant has exited.
pub fn create_group_segment(
    group_name: &str,
    participant_count: u32,
) -> Result<SharedSegment, BarrierError> {
    if participant_count == 0 {
        return Err(BarrierError::InvalidParticipantCount(0));
    }

    let segment = SharedSegment::create(group_name, BarrierLayout::size_for(participant_count))?;
    // SAFETY: the mapping was just created with the layout's size for this
    // participant count.
    let view = unsafe { RegionView::new(segment.as_mut_ptr(), participant_count) };
    view.participants().store(participant_count, Ordering::Release);

    info!(
        "Initialized group segment '{}' for {} participants ({} bytes)",
        group_name,
        participant_count,
        segment.len()
    );
    Ok(segment)
}

/// Remove the group segment name after all participants have exited.
pub fn remove_group_segment(group_name: &str) -> Result<(), ShmError> {
    SharedSegment::unlink(group_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_rejects_empty_group() {
        assert!(matches!(
            create_group_segment("/shmpi-launch-none", 0),
            Err(BarrierError::InvalidParticipantCount(0))
        ));
    }

    #[test]
    fn test_create_sets_participant_count() {
        let name = format!("/shmpi-launch-{}", std::process::id());
        let segment = create_group_segment(&name, 3).unwrap();
        assert_eq!(segment.len(), BarrierLayout::size_for(3));

        // SAFETY: segment is sized for 3 participants.
        let view = unsafe { RegionView::new(segment.as_mut_ptr(), 3) };
        assert_eq!(view.participants().load(Ordering::Acquire), 3);
        for i in 0..=3 {
            assert_eq!(view.generation(i).load(Ordering::Acquire), 0);
        }

        remove_group_segment(&name).unwrap();
    }
}
