/*!
 * Process Context
 * Rank, mapped barrier, and the registry of arrays this process has opened
 */

use super::types::{ContextError, GroupConfig, SharedArray};
use crate::barrier::SharedBarrier;
use crate::core::types::Rank;
use crate::shm::SharedSegment;
use ahash::RandomState;
use dashmap::DashMap;
use log::{debug, info, warn};
use std::sync::Arc;

struct ArrayEntry {
    segment: Arc<SharedSegment>,
    element_count: usize,
    // Whether this rank created the segment and therefore unlinks the name
    created: bool,
}

/// Per-process handle to the coordination layer.
///
/// Owns this process's mapping of the group barrier and a registry of every
/// shared array it has opened. The registry entries are this process's own
/// handles (mapping + descriptor); the logical arrays are shared with the
/// whole group. All registered arrays are released at teardown.
pub struct ProcessContext {
    barrier: SharedBarrier,
    arrays: DashMap<String, ArrayEntry, RandomState>,
}

impl ProcessContext {
    /// Attach to a running group with this process's startup parameters.
    pub fn attach(config: GroupConfig) -> Result<Self, ContextError> {
        let barrier =
            SharedBarrier::attach(&config.group_name, config.rank, config.participant_count)?;
        info!(
            "Process context ready: rank {}/{} in group '{}'",
            config.rank, config.participant_count, config.group_name
        );
        Ok(Self {
            barrier,
            arrays: DashMap::with_hasher(RandomState::new()),
        })
    }

    pub fn rank(&self) -> Rank {
        self.barrier.rank()
    }

    pub fn participant_count(&self) -> u32 {
        self.barrier.participant_count()
    }

    pub fn barrier(&self) -> &SharedBarrier {
        &self.barrier
    }

    /// Block until every participant reaches the same synchronization point.
    pub fn synch(&self) {
        self.barrier.synch();
    }

    /// Collectively allocate a shared array of `element_count` doubles.
    ///
    /// Every rank must call this for the same logical allocation. Rank 0
    /// mints a fresh name, creates and maps the segment, publishes the name
    /// through the barrier's rendezvous slot and enters the barrier; the
    /// other ranks enter the barrier first, then open the published name. No
    /// rank returns before the rendezvous completes, so the returned pointer
    /// aliases the same zero-filled bytes everywhere.
    ///
    /// A rank that fails here after rank 0 published the name leaves the
    /// group stranded at the next barrier; there is no failure-notification
    /// protocol.
    pub fn allocate_array(&self, element_count: usize) -> Result<(String, SharedArray), ContextError> {
        if element_count == 0 {
            // Checked before any barrier entry so all ranks fail symmetrically
            return Err(ContextError::Shm(crate::shm::ShmError::InvalidSize(
                "shared arrays must hold at least one element".to_string(),
            )));
        }
        let byte_size = element_count * std::mem::size_of::<f64>();

        let (name, segment, created) = if self.barrier.rank() == 0 {
            let name = self.mint_array_name();
            let segment = SharedSegment::create(&name, byte_size)?;
            self.barrier.publish_resource_name(&name)?;
            self.barrier.synch();
            (name, segment, true)
        } else {
            self.barrier.synch();
            let name = self.barrier.last_resource_name();
            let segment = SharedSegment::open(&name, byte_size)?;
            (name, segment, false)
        };

        // Confirmation round: the name slot may only be reused for the next
        // allocation once every rank has read it and opened the segment.
        self.barrier.synch();

        let segment = Arc::new(segment);
        let array = SharedArray {
            segment: Arc::clone(&segment),
            element_count,
        };
        debug!(
            "Rank {} registered shared array '{}' ({} elements)",
            self.barrier.rank(),
            name,
            element_count
        );
        self.arrays.insert(
            name.clone(),
            ArrayEntry {
                segment,
                element_count,
                created,
            },
        );

        Ok((name, array))
    }

    /// Look up a registered array by name.
    pub fn array(&self, name: &str) -> Option<SharedArray> {
        self.arrays.get(name).map(|entry| SharedArray {
            segment: Arc::clone(&entry.segment),
            element_count: entry.element_count,
        })
    }

    /// Release this process's handle on a registered array, exactly once.
    ///
    /// Drops the registry's reference to the local mapping; the mapping is
    /// unmapped and closed when the last outstanding [`SharedArray`] handle
    /// drops. Only the creating rank unlinks the global name; removal is not
    /// reference-counted and affects only future opens, never the mappings
    /// other ranks still hold.
    pub fn release_array(&self, name: &str) -> Result<(), ContextError> {
        let (name, entry) = self
            .arrays
            .remove(name)
            .ok_or_else(|| ContextError::UnknownArray(name.to_string()))?;

        let created = entry.created;
        drop(entry); // registry's reference; live handles keep the mapping

        if created {
            SharedSegment::unlink(&name)?;
        }
        debug!(
            "Rank {} released shared array '{}'",
            self.barrier.rank(),
            name
        );
        Ok(())
    }

    fn mint_array_name(&self) -> String {
        // Deterministic token: group identity plus a monotonic allocation
        // sequence minted by the coordinator. Unique for the group's
        // lifetime; the group name separates concurrent groups.
        let seq = self.barrier.next_allocation_seq();
        format!("{}.a{}", self.barrier.group_name(), seq)
    }
}

impl Drop for ProcessContext {
    fn drop(&mut self) {
        let names: Vec<String> = self.arrays.iter().map(|e| e.key().clone()).collect();
        let count = names.len();
        for name in names {
            if let Err(e) = self.release_array(&name) {
                warn!("Failed to release array '{}' at teardown: {}", name, e);
            }
        }
        if count > 0 {
            info!(
                "Rank {} released {} shared arrays at teardown",
                self.barrier.rank(),
                count
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launch;
    use crate::shm::ShmError;

    fn group_for(tag: &str) -> String {
        format!("/shmpi-ctx-{}-{}", tag, std::process::id())
    }

    fn solo_context(tag: &str) -> (String, SharedSegment, ProcessContext) {
        let group = group_for(tag);
        let seg = launch::create_group_segment(&group, 1).unwrap();
        let ctx = ProcessContext::attach(GroupConfig::new(0, 1).with_group_name(&group)).unwrap();
        (group, seg, ctx)
    }

    #[test]
    fn test_allocate_and_release() {
        let (group, _seg, ctx) = solo_context("alloc");

        let (name, array) = ctx.allocate_array(16).unwrap();
        assert_eq!(array.element_count(), 16);
        assert_eq!(array.byte_size(), 128);
        assert!(ctx.array(&name).is_some());

        array.set(3, 2.5);
        assert_eq!(array.get(3), 2.5);

        ctx.release_array(&name).unwrap();
        assert!(ctx.array(&name).is_none());

        // Release is once-per-handle
        assert!(matches!(
            ctx.release_array(&name),
            Err(ContextError::UnknownArray(_))
        ));

        launch::remove_group_segment(&group).unwrap();
    }

    #[test]
    fn test_handles_survive_release() {
        let (group, _seg, ctx) = solo_context("survive");

        let (name, array) = ctx.allocate_array(4).unwrap();
        array.set(0, 7.25);
        ctx.release_array(&name).unwrap();

        // The handle shares ownership of the mapping, so reads through it
        // stay valid after release; only future opens of the name are gone.
        assert_eq!(array.get(0), 7.25);
        let clone = array.clone();
        assert_eq!(clone.get(0), 7.25);

        launch::remove_group_segment(&group).unwrap();
    }

    #[test]
    fn test_allocate_zero_elements_fails() {
        let (group, _seg, ctx) = solo_context("zero");
        assert!(matches!(
            ctx.allocate_array(0),
            Err(ContextError::Shm(ShmError::InvalidSize(_)))
        ));
        launch::remove_group_segment(&group).unwrap();
    }

    #[test]
    fn test_minted_names_are_distinct() {
        let (group, _seg, ctx) = solo_context("names");
        let (first, _) = ctx.allocate_array(4).unwrap();
        let (second, _) = ctx.allocate_array(4).unwrap();
        assert_ne!(first, second);
        assert!(first.starts_with(&group));
        launch::remove_group_segment(&group).unwrap();
    }

    #[test]
    fn test_teardown_releases_arrays() {
        let group = group_for("drop");
        let _seg = launch::create_group_segment(&group, 1).unwrap();
        let name;
        {
            let ctx =
                ProcessContext::attach(GroupConfig::new(0, 1).with_group_name(&group)).unwrap();
            let (n, _) = ctx.allocate_array(8).unwrap();
            name = n;
        }
        // The creator's teardown unlinked the name
        assert!(SharedSegment::open(&name, 64).is_err());
        launch::remove_group_segment(&group).unwrap();
    }
}
