//! Halo-padded grid storage for the Wendroff stencil engine.
//!
//! [`Grid`] owns a dense `f64` array with bounds-checked point and offset
//! access. [`get_interior_points`] enumerates the cells a stage iterates:
//! the grid minus its halo ring.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod grid;
pub mod interior;

pub use grid::Grid;
pub use interior::{get_interior_points, InteriorPoints};
