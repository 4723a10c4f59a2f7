/*!
 * Shared Memory Types
 * Common types, constants, and errors for named segments
 */

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shared memory error types
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "error", content = "details")]
pub enum ShmError {
    /// shm_open with O_CREAT failed
    #[error("Failed to create shared segment '{name}': {reason}")]
    ResourceCreateFailed { name: String, reason: String },

    /// shm_open on an existing segment failed
    #[error("Failed to open shared segment '{name}': {reason}")]
    ResourceOpenFailed { name: String, reason: String },

    /// mmap or ftruncate failed after the segment was opened
    #[error("Failed to map shared segment '{name}': {reason}")]
    MapFailed { name: String, reason: String },

    /// Requested segment size is unusable
    #[error("Invalid segment size: {0}")]
    InvalidSize(String),

    /// shm_unlink failed
    #[error("Failed to unlink shared segment '{name}': {reason}")]
    UnlinkFailed { name: String, reason: String },
}
