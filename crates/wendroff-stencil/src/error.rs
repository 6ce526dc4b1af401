//! Build-time configuration errors.

use thiserror::Error;
use wendroff_core::{FieldName, Halo, Offset, Shape};

use crate::boundary::BoundaryError;

/// Errors detected while building a stage or assembling a stencil.
///
/// Every structural problem is caught here, so a stencil that builds can
/// only fail at `run` because of bad bindings or a failing stage body.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The stencil has no stage calls.
    #[error("stencil '{stencil}' has no stage calls")]
    EmptyStencil {
        /// Stencil name.
        stencil: String,
    },
    /// The domain has a zero-length axis.
    #[error("stencil '{stencil}' has empty domain {domain}")]
    EmptyDomain {
        /// Stencil name.
        stencil: String,
        /// The configured domain.
        domain: Shape,
    },
    /// The halo leaves no room for an interior.
    #[error("halo {halo} does not fit domain {domain}")]
    HaloTooWide {
        /// The configured halo.
        halo: Halo,
        /// The configured domain.
        domain: Shape,
    },
    /// A field name was declared twice on the stencil.
    #[error("field '{name}' is declared more than once")]
    DuplicateField {
        /// The repeated name.
        name: FieldName,
    },
    /// A formal parameter name was declared twice on one stage.
    #[error("stage '{stage}' declares parameter '{name}' more than once")]
    DuplicateParam {
        /// Stage name.
        stage: String,
        /// The repeated name.
        name: FieldName,
    },
    /// A readable parameter was declared with no offsets.
    #[error("stage '{stage}' reads parameter '{name}' at no offsets")]
    EmptyOffsets {
        /// Stage name.
        stage: String,
        /// The parameter.
        name: FieldName,
    },
    /// A stage was built without a body.
    #[error("stage '{stage}' has no body")]
    MissingBody {
        /// Stage name.
        stage: String,
    },
    /// A stage call supplied the wrong number of actual fields.
    #[error("stage '{stage}' takes {expected} fields, call supplies {actual}")]
    ArityMismatch {
        /// Stage name.
        stage: String,
        /// The stage's parameter count.
        expected: usize,
        /// The number of actuals supplied.
        actual: usize,
    },
    /// A stage call or boundary names a field the stencil does not declare.
    #[error("'{name}' used by '{user}' is not a field of the stencil")]
    UnknownField {
        /// Stage or boundary naming the field.
        user: String,
        /// The unknown name.
        name: FieldName,
    },
    /// A scratch field is read before any earlier call writes it.
    #[error("stage '{stage}' (call {call}) reads scratch field '{field}' before it is produced")]
    ForwardReference {
        /// Stage name.
        stage: String,
        /// Position of the call in the stencil.
        call: usize,
        /// The scratch field.
        field: FieldName,
    },
    /// One call binds a field to two formals with different offset patterns.
    #[error(
        "stage '{stage}' binds '{field}' to both '{first}' and '{second}' with different offsets"
    )]
    RangeConflict {
        /// Stage name.
        stage: String,
        /// The doubly bound actual field.
        field: FieldName,
        /// First formal.
        first: FieldName,
        /// Second formal.
        second: FieldName,
    },
    /// One call binds the same actual field to two writable formals.
    #[error("stage '{stage}' writes '{field}' through both '{first}' and '{second}'")]
    AliasedWrite {
        /// Stage name.
        stage: String,
        /// The doubly bound actual field.
        field: FieldName,
        /// First formal.
        first: FieldName,
        /// Second formal.
        second: FieldName,
    },
    /// A declared offset, applied over the call's compute region, leaves
    /// the domain storage.
    #[error("stage '{stage}' reads '{field}' at {offset}, outside storage {domain}")]
    OffsetOutsideStorage {
        /// Stage name.
        stage: String,
        /// The actual field.
        field: FieldName,
        /// The offending offset.
        offset: Offset,
        /// The stencil domain.
        domain: Shape,
    },
    /// The boundary policy is inconsistent with the domain or fields.
    #[error(transparent)]
    Boundary(#[from] BoundaryError),
}
