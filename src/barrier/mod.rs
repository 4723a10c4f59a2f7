/*!
 * Barrier Module
 * Spin rendezvous barrier over a fixed-layout shared group segment
 */

pub mod barrier;
pub mod layout;
pub mod types;

// Re-export public API
pub use barrier::SharedBarrier;
pub use layout::BarrierLayout;
pub use types::BarrierError;
