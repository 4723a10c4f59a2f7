/*!
 * Matrix
 * Row-major matrix of doubles backed by a collectively allocated shared array
 */

use super::types::OpsError;
use crate::context::{ContextError, ProcessContext, SharedArray};
use std::fmt;

/// A matrix whose backing store is shared by every participant.
///
/// Construction is collective: every rank must call [`Matrix::new`] for the
/// same logical matrix, in the same order relative to other allocations. The
/// handle releases this process's view on drop; the creating rank also
/// unlinks the name.
pub struct Matrix<'ctx> {
    pub(crate) ctx: &'ctx ProcessContext,
    pub(crate) name: String,
    pub(crate) data: SharedArray,
    pub(crate) rows: usize,
    pub(crate) cols: usize,
}

impl<'ctx> Matrix<'ctx> {
    /// Collectively allocate a `rows` x `cols` matrix, zero-filled.
    pub fn new(ctx: &'ctx ProcessContext, rows: usize, cols: usize) -> Result<Self, ContextError> {
        let (name, data) = ctx.allocate_array(rows * cols)?;
        Ok(Self {
            ctx,
            name,
            data,
            rows,
            cols,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Name of the backing shared segment.
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub(crate) fn index(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.rows && col < self.cols);
        row * self.cols + col
    }

    /// Read element `(row, col)`.
    ///
    /// # Panics
    /// Panics if the position is out of bounds.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(
            row < self.rows && col < self.cols,
            "position ({}, {}) out of bounds for {}x{} matrix",
            row,
            col,
            self.rows,
            self.cols
        );
        self.data.get(row * self.cols + col)
    }

    /// Write element `(row, col)`.
    ///
    /// Distributed operations write only within their partition range; direct
    /// writes outside an operation follow the same convention and become
    /// visible to other ranks after the next barrier.
    ///
    /// # Panics
    /// Panics if the position is out of bounds.
    pub fn set(&self, row: usize, col: usize, value: f64) {
        assert!(
            row < self.rows && col < self.cols,
            "position ({}, {}) out of bounds for {}x{} matrix",
            row,
            col,
            self.rows,
            self.cols
        );
        self.data.set(row * self.cols + col, value);
    }

    /// Copy the shared contents into a process-local vector.
    pub fn to_local_vec(&self) -> Vec<f64> {
        (0..self.rows * self.cols).map(|i| self.data.get(i)).collect()
    }

    pub(crate) fn check_same_shape(&self, other: &Self, op: &str) -> Result<(), OpsError> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(OpsError::DimensionMismatch {
                op: op.to_string(),
                left_rows: self.rows,
                left_cols: self.cols,
                right_rows: other.rows,
                right_cols: other.cols,
            });
        }
        Ok(())
    }

    pub(crate) fn check_square(&self, op: &str) -> Result<(), OpsError> {
        if self.rows != self.cols {
            return Err(OpsError::NotSquare {
                op: op.to_string(),
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Matrix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            for col in 0..self.cols {
                if col > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{:.2}", self.get(row, col))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Drop for Matrix<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.ctx.release_array(&self.name) {
            log::warn!("Failed to release matrix '{}': {}", self.name, e);
        }
    }
}
