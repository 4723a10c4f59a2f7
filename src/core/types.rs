/*!
 * Core Types
 * Common types used across the library
 */

/// Zero-based participant identifier within a fixed-size group
pub type Rank = u32;

/// Size type for memory operations
pub type Size = usize;

/// Barrier round counter
pub type Generation = u32;
