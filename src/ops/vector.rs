/*!
 * Vector
 * Shared-memory vector of doubles with partitioned scalar operations
 */

use crate::context::{ContextError, ProcessContext, SharedArray};
use crate::ops::OpsError;
use crate::partition::RankAssignment;
use std::fmt;

/// A vector whose backing store is shared by every participant.
///
/// Construction is collective, like [`crate::ops::Matrix`].
pub struct Vector<'ctx> {
    pub(crate) ctx: &'ctx ProcessContext,
    pub(crate) name: String,
    pub(crate) data: SharedArray,
    pub(crate) len: usize,
}

impl<'ctx> Vector<'ctx> {
    /// Collectively allocate a vector of `len` doubles, zero-filled.
    pub fn new(ctx: &'ctx ProcessContext, len: usize) -> Result<Self, ContextError> {
        let (name, data) = ctx.allocate_array(len)?;
        Ok(Self {
            ctx,
            name,
            data,
            len,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Name of the backing shared segment.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read element `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn get(&self, index: usize) -> f64 {
        self.data.get(index)
    }

    /// Write element `index`; same visibility rules as matrix writes.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn set(&self, index: usize, value: f64) {
        self.data.set(index, value);
    }

    /// Copy the shared contents into a process-local vector.
    pub fn to_local_vec(&self) -> Vec<f64> {
        (0..self.len).map(|i| self.data.get(i)).collect()
    }

    /// Multiply by a scalar into a fresh shared vector, partitioned by index.
    pub fn scalar_mul(&self, scalar: f64) -> Result<Vector<'ctx>, OpsError> {
        let result = Vector::new(self.ctx, self.len)?;
        let assignment = RankAssignment::compute(
            self.len,
            self.ctx.participant_count(),
            self.ctx.rank(),
        );
        for i in assignment.indices() {
            result.data.set(i, self.data.get(i) * scalar);
        }
        self.ctx.synch();
        Ok(result)
    }
}

impl fmt::Display for Vector<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.len {
            writeln!(f, "{:.2}", self.get(i))?;
        }
        Ok(())
    }
}

impl Drop for Vector<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.ctx.release_array(&self.name) {
            log::warn!("Failed to release vector '{}': {}", self.name, e);
        }
    }
}
