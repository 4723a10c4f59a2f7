/*!
 * Context Module
 * Per-process handle to the group: rank, barrier, and owned shared arrays
 */

pub mod context;
pub mod types;

// Re-export public API
pub use context::ProcessContext;
pub use types::{ContextError, GroupConfig, SharedArray};
