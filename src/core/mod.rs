/*!
 * Core Module
 * Shared types and error re-exports
 */

pub mod errors;
pub mod types;

pub use errors::*;
pub use types::*;
