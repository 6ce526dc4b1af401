//! Error types for grid access and stencil execution.
//!
//! Organised by subsystem: grid storage ([`GridError`]), a single stage's
//! point evaluation ([`StageError`]), and one stencil invocation
//! ([`RunError`]). Build-time configuration errors live with the stencil
//! builder.

use crate::geometry::{Offset, Point, Shape};
use crate::id::{FieldName, ParamId};
use thiserror::Error;

/// Errors from grid storage access.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// A coordinate, after applying an offset, falls outside the padded
    /// storage.
    #[error("point {point:?} offset by {offset} falls outside storage {shape}")]
    OutOfBounds {
        /// The base point.
        point: Point,
        /// The offset applied to it.
        offset: Offset,
        /// The storage shape.
        shape: Shape,
    },
    /// Two grids disagree on shape.
    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// The shape required.
        expected: Shape,
        /// The shape found.
        actual: Shape,
    },
    /// Backing data does not hold exactly one value per cell.
    #[error("data length {len} does not match shape {shape}")]
    LengthMismatch {
        /// The length supplied.
        len: usize,
        /// The shape it was meant for.
        shape: Shape,
    },
}

/// Errors from evaluating a stage body at one point.
///
/// Returned by the body closure and wrapped in [`RunError::Stage`] by the
/// scheduler.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StageError {
    /// Storage access failed.
    #[error(transparent)]
    Grid(#[from] GridError),
    /// The body read a parameter at an offset it did not declare.
    #[error("parameter {param} read at undeclared offset {offset}")]
    UndeclaredAccess {
        /// The parameter read.
        param: ParamId,
        /// The offending offset.
        offset: Offset,
    },
    /// The body read a write-only parameter.
    #[error("parameter {param} is write-only")]
    NotReadable {
        /// The parameter read.
        param: ParamId,
    },
    /// The body wrote a read-only parameter.
    #[error("parameter {param} is read-only")]
    NotWritable {
        /// The parameter written.
        param: ParamId,
    },
    /// The body used a parameter id the stage never declared.
    #[error("parameter {param} is not declared by this stage")]
    UnknownParam {
        /// The unknown id.
        param: ParamId,
    },
}

/// Errors from one stencil invocation.
///
/// Binding errors are reported before any grid is touched. A
/// [`RunError::Stage`] leaves the outputs of earlier stages committed and
/// discards the failing stage's writes.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RunError {
    /// A stage body failed.
    #[error("stage '{stage}' failed at point {point:?}: {source}")]
    Stage {
        /// Name of the failing stage.
        stage: String,
        /// The point being evaluated.
        point: Point,
        /// The underlying stage error.
        source: StageError,
    },
    /// A stencil parameter has no grid bound to it.
    #[error("parameter '{name}' is not bound")]
    UnboundParam {
        /// The parameter name.
        name: FieldName,
    },
    /// A binding names something that is not a parameter of the stencil.
    #[error("'{name}' is not a parameter of stencil '{stencil}'")]
    UnknownBinding {
        /// The stencil name.
        stencil: String,
        /// The binding name.
        name: FieldName,
    },
    /// The same parameter was bound twice.
    #[error("parameter '{name}' is bound more than once")]
    DuplicateBinding {
        /// The parameter name.
        name: FieldName,
    },
    /// A bound grid does not have the stencil's domain shape.
    #[error("grid bound to '{name}' has shape {actual}, stencil domain is {expected}")]
    BindingShape {
        /// The parameter name.
        name: FieldName,
        /// The stencil domain.
        expected: Shape,
        /// The bound grid's shape.
        actual: Shape,
    },
    /// The boundary policy could not be applied.
    #[error("boundary policy failed: {reason}")]
    Boundary {
        /// Description of the failure.
        reason: String,
    },
}
