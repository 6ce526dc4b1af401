//! Field names used by the shallow-water stencils.
//!
//! `out_*` grids carry the state being advanced, `in_*` grids the state at
//! the start of the step, and `*d` grids the time derivatives. Scratch
//! names (`Hx`, `Uy`, ...) are owned by the stencils.

use wendroff_core::FieldName;

/// Height being advanced.
pub const OUT_H: FieldName = FieldName::from_static("out_H");
/// Height time derivative.
pub const OUT_HD: FieldName = FieldName::from_static("out_Hd");
/// Height at step start.
pub const IN_H: FieldName = FieldName::from_static("in_H");
/// `x` velocity being advanced.
pub const OUT_U: FieldName = FieldName::from_static("out_U");
/// `x` velocity time derivative.
pub const OUT_UD: FieldName = FieldName::from_static("out_Ud");
/// `x` velocity at step start.
pub const IN_U: FieldName = FieldName::from_static("in_U");
/// `y` velocity being advanced.
pub const OUT_V: FieldName = FieldName::from_static("out_V");
/// `y` velocity time derivative.
pub const OUT_VD: FieldName = FieldName::from_static("out_Vd");
/// `y` velocity at step start.
pub const IN_V: FieldName = FieldName::from_static("in_V");

/// Height `x` derivative input of the dynamics-only stencil.
pub const IN_HX: FieldName = FieldName::from_static("in_Hx");
/// Height `y` derivative input of the dynamics-only stencil.
pub const IN_HY: FieldName = FieldName::from_static("in_Hy");
/// `x` velocity `x` derivative input of the dynamics-only stencil.
pub const IN_UX: FieldName = FieldName::from_static("in_Ux");
/// `y` velocity `y` derivative input of the dynamics-only stencil.
pub const IN_VY: FieldName = FieldName::from_static("in_Vy");

/// Quantity diffused by the momentum-only stencil.
pub const OUT_M: FieldName = FieldName::from_static("out_M");
/// Its `x` derivative.
pub const OUT_MX: FieldName = FieldName::from_static("out_Mx");
/// Its `y` derivative.
pub const OUT_MY: FieldName = FieldName::from_static("out_My");
/// Its value at step start.
pub const IN_M: FieldName = FieldName::from_static("in_M");

/// Neighbour average scratch.
pub const MAVG: FieldName = FieldName::from_static("Mavg");
/// Height scratch along `x`.
pub const HX: FieldName = FieldName::from_static("Hx");
/// `x` velocity scratch along `x`.
pub const UX: FieldName = FieldName::from_static("Ux");
/// `y` velocity scratch along `x`.
pub const VX: FieldName = FieldName::from_static("Vx");
/// Height scratch along `y`.
pub const HY: FieldName = FieldName::from_static("Hy");
/// `x` velocity scratch along `y`.
pub const UY: FieldName = FieldName::from_static("Uy");
/// `y` velocity scratch along `y`.
pub const VY: FieldName = FieldName::from_static("Vy");

/// Caller-bound fields of the coupled stencil, in declaration order.
pub const COUPLED_PARAMS: [FieldName; 9] = [
    OUT_H, OUT_HD, IN_H, OUT_U, OUT_UD, IN_U, OUT_V, OUT_VD, IN_V,
];

/// Scratch fields of the coupled stencil.
pub const COUPLED_SCRATCH: [FieldName; 7] = [MAVG, HX, UX, VX, HY, UY, VY];

/// Caller-bound fields of the Lax-Wendroff stencil.
pub const LAX_WENDROFF_PARAMS: [FieldName; 3] = [OUT_H, OUT_U, OUT_V];

/// Scratch fields of the Lax-Wendroff stencil.
pub const LAX_WENDROFF_SCRATCH: [FieldName; 6] = [HX, UX, VX, HY, UY, VY];
