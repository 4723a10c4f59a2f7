/*!
 * Distributed Operations Module
 * Matrix/vector algebra over collectively allocated shared arrays
 */

pub mod algebra;
pub mod dense;
pub mod inverse;
pub mod matrix;
pub mod types;
pub mod vector;

// Re-export public API
pub use matrix::Matrix;
pub use types::OpsError;
pub use vector::Vector;
