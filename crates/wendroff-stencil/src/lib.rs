//! Multi-stage stencil engine.
//!
//! A [`Stage`] is an elementwise update rule with a typed parameter list.
//! A [`Stencil`] binds an ordered sequence of stage calls to parameter
//! and scratch fields, validated once by [`StencilBuilder::build`], and
//! runs them for one timestep per [`Stencil::run`].
//!
//! Within a stage every read sees the grids as they were at stage entry;
//! writes land in staging buffers and are committed when the stage ends.
//! Stages run strictly in declared order, each observing all writes of
//! its predecessors.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod analysis;
pub mod boundary;
pub mod context;
pub mod error;
pub mod stage;
pub mod staging;
pub mod stencil;

pub use analysis::{AccessRanges, Dependency, DependencyGraph, RangeMismatch};
pub use boundary::{apply_boundary, validate_reflective, Boundary, BoundaryError, FieldRole};
pub use context::PointContext;
pub use error::ConfigError;
pub use stage::{ParamRole, ParamSpec, Stage, StageBody, StageBuilder};
pub use staging::StagingPool;
pub use stencil::{Bindings, FieldKind, StageCall, Stencil, StencilBuilder};
