/*!
 * shmpi Library
 * Shared-memory coordination for cooperating process groups: a spin
 * rendezvous barrier, named shared array allocation, row/column work
 * partitioning, and the distributed matrix/vector algebra built on them
 */

pub mod barrier;
pub mod context;
pub mod core;
pub mod launch;
pub mod ops;
pub mod partition;
pub mod shm;

// Re-exports
pub use barrier::{BarrierError, BarrierLayout, SharedBarrier};
pub use context::{ContextError, GroupConfig, ProcessContext, SharedArray};
pub use ops::{Matrix, OpsError, Vector};
pub use partition::{PartitionRange, RankAssignment};
pub use shm::{SharedSegment, ShmError};
