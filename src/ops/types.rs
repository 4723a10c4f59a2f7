/*!
 * Operation Types
 * Errors surfaced by the distributed algebra
 */

use crate::context::ContextError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Distributed operation error types
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "error", content = "details")]
pub enum OpsError {
    /// Operand shapes are incompatible for the operation
    #[error(
        "Dimension mismatch in {op}: left is {left_rows}x{left_cols}, \
         right is {right_rows}x{right_cols}"
    )]
    DimensionMismatch {
        op: String,
        left_rows: usize,
        left_cols: usize,
        right_rows: usize,
        right_cols: usize,
    },

    /// Operation requires a square matrix
    #[error("{op} requires a square matrix, got {rows}x{cols}")]
    NotSquare {
        op: String,
        rows: usize,
        cols: usize,
    },

    /// Determinant is zero; no inverse exists
    #[error("Singular matrix has no inverse")]
    SingularMatrix,

    /// Allocation or rendezvous failure underneath the operation
    #[error(transparent)]
    Context(#[from] ContextError),
}
