/*!
 * Shared Memory Module
 * Named POSIX shared memory segments mapped independently by each process
 */

pub mod segment;
pub mod types;

// Re-export public API
pub use segment::SharedSegment;
pub use types::ShmError;
