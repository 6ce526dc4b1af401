//! Shallow-water stencils for the Wendroff engine.
//!
//! Two integrators built from declared stages:
//!
//! 1. [`coupled_stencil`]: momentum(U) → momentum(V) → momentum(H) →
//!    dynamics, a smoothing-plus-Euler step over nine caller fields.
//! 2. [`lax_wendroff_stencil`]: half step in `x` → half step in `y` →
//!    final combine, with a reflective boundary.
//!
//! [`momentum_stencil`] and [`dynamics_stencil`] expose the coupled
//! stages on their own. Coefficients come from the configs in
//! [`config`], validated at construction.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod coupled;
pub mod fields;
pub mod lax_wendroff;

pub use config::{
    CoupledConfig, DynamicsConfig, KernelConfigError, KernelError, LaxWendroffConfig,
    MomentumConfig,
};
pub use coupled::{
    coupled_stencil, dynamics_stage, dynamics_stencil, momentum_stage, momentum_stencil,
    COUPLED_HALO,
};
pub use lax_wendroff::{
    final_step, half_step_x, half_step_y, lax_wendroff_boundary, lax_wendroff_stencil,
    LAX_WENDROFF_HALO,
};
