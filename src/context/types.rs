/*!
 * Context Types
 * Group startup parameters and the shared array handle
 */

use crate::barrier::BarrierError;
use crate::core::types::Rank;
use crate::shm::{SharedSegment, ShmError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Well-known name of the group segment when the launcher does not choose one.
pub const DEFAULT_GROUP_NAME: &str = "/shmpi-group";

/// Startup parameters every participant is launched with.
///
/// The launcher guarantees the same `participant_count` and `group_name` for
/// the whole group; a mismatch between participants is undefined behavior of
/// the group, not detectable here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConfig {
    pub rank: Rank,
    pub participant_count: u32,
    pub group_name: String,
}

impl GroupConfig {
    pub fn new(rank: Rank, participant_count: u32) -> Self {
        Self {
            rank,
            participant_count,
            group_name: DEFAULT_GROUP_NAME.to_string(),
        }
    }

    pub fn with_group_name(mut self, name: impl Into<String>) -> Self {
        self.group_name = name.into();
        self
    }
}

/// Context error types
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "error", content = "details")]
pub enum ContextError {
    /// Array name is not registered with this process
    #[error("Array '{0}' is not registered with this process")]
    UnknownArray(String),

    #[error(transparent)]
    Shm(#[from] ShmError),

    #[error(transparent)]
    Barrier(#[from] BarrierError),
}

/// A process-local view of one allocated shared array.
///
/// The bytes alias the same logical memory in every participant after the
/// allocation rendezvous. Each handle shares ownership of this process's
/// mapping, so the mapping stays valid while any handle is alive, even after
/// the registering [`crate::context::ProcessContext`] has released the array.
/// Unlinking the global name is a separate, creator-only action.
#[derive(Clone)]
pub struct SharedArray {
    pub(crate) segment: Arc<SharedSegment>,
    pub(crate) element_count: usize,
}

impl SharedArray {
    #[inline]
    fn base(&self) -> *mut f64 {
        self.segment.as_mut_ptr().cast()
    }

    pub fn element_count(&self) -> usize {
        self.element_count
    }

    pub fn byte_size(&self) -> usize {
        self.element_count * std::mem::size_of::<f64>()
    }

    pub fn as_ptr(&self) -> *const f64 {
        self.base()
    }

    pub fn as_mut_ptr(&self) -> *mut f64 {
        self.base()
    }

    /// Read one element.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn get(&self, index: usize) -> f64 {
        assert!(index < self.element_count, "index {} out of bounds", index);
        // SAFETY: bounds checked above; the shared segment keeps the mapping
        // alive for as long as this handle exists.
        unsafe { self.base().add(index).read() }
    }

    /// Write one element.
    ///
    /// Callers must stay within their partition range for distributed writes;
    /// nothing enforces that at runtime.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn set(&self, index: usize, value: f64) {
        assert!(index < self.element_count, "index {} out of bounds", index);
        // SAFETY: bounds checked above; disjoint-range convention rules out
        // concurrent writers on the same element.
        unsafe { self.base().add(index).write(value) }
    }
}

impl fmt::Debug for SharedArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedArray")
            .field("segment", &self.segment.name())
            .field("element_count", &self.element_count)
            .finish()
    }
}
