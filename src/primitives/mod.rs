//! Core compute primitives (Vector, Matrix).
//!
//! Feature tables, intensity vectors and cluster centroids are all
//! expressed with these two types.

mod matrix;
mod vector;

pub use matrix::Matrix;
pub use vector::Vector;
