//! # dexsim Core
//!
//! Core building blocks for the dexsim similarity engine.
//!
//! - [`Vector`] - Dense `f32` vector with SIMD-backed distance helpers
//! - [`FlatIndex`] - Exact (brute-force) nearest-neighbour index
//! - [`Distance`] - Euclidean (squared L2) or cosine (normalized inner product)
//! - [`Error`] - Error taxonomy shared by every dexsim crate
//!
//! ## Example
//!
//! ```rust
//! use dexsim_core::{Distance, FlatIndex, Vector};
//!
//! let vectors = vec![
//!     Vector::new(vec![1.0, 0.0]),
//!     Vector::new(vec![0.0, 1.0]),
//! ];
//! let index = FlatIndex::build(Distance::Cosine, vectors).unwrap();
//!
//! let hits = index.search(&Vector::new(vec![2.0, 0.1]), 1).unwrap();
//! assert_eq!(hits[0].position, 0);
//! ```

pub mod error;
pub mod index;
pub mod vector;

/// SIMD-optimized vector operations
///
/// - AVX2/FMA on x86_64
/// - NEON on ARM64/Apple Silicon
/// - scalar fallback elsewhere
pub mod simd;

pub use error::{Error, Result};
pub use index::{Distance, FlatIndex, SearchHit};
pub use vector::Vector;
