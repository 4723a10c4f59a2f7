/*!
 * Error Types
 * Centralized re-exports of the per-module error enums
 */

pub use crate::barrier::BarrierError;
pub use crate::context::ContextError;
pub use crate::ops::OpsError;
pub use crate::shm::ShmError;
