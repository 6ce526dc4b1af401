//! Core types for the Wendroff stencil engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! vocabulary shared across the workspace: field and parameter identifiers,
//! grid geometry (shapes, offsets, halos, regions, access ranges), and the
//! error enums raised while touching grids and running stages.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod geometry;
pub mod id;

pub use error::{GridError, RunError, StageError};
pub use geometry::{AccessRange, Halo, Offset, OffsetList, Point, Region, Shape};
pub use id::{FieldName, ParamId};
