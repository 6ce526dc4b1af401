//! Coupled height/momentum integrator.
//!
//! Each quantity `M` in `{U, V, H}` first goes through the momentum stage:
//!
//! ```text
//! Mavg   = (M(+1,0) + M(-1,0) + M(0,+1) + M(0,-1)) / 4
//! Mx     = M(+1,0) - M(-1,0)
//! My     = M(0,+1) - M(0,-1)
//! out_M  = out_M * (1 - bl) + bl * Mavg
//! ```
//!
//! The dynamics stage then advances all three with one Euler step:
//!
//! ```text
//! Ud = -U * Ux - growth * Hx
//! Vd = -V * Vy - growth * Hy
//! Hd = Hd - H * (Ux + Vy)
//! out_X += dt * Xd
//! ```

use wendroff_core::{Halo, Offset, Shape};
use wendroff_stencil::{ConfigError, Stage, Stencil, StencilBuilder};

use crate::config::{CoupledConfig, DynamicsConfig, KernelError, MomentumConfig};
use crate::fields::*;

const EAST: Offset = Offset::xy(1, 0);
const WEST: Offset = Offset::xy(-1, 0);
const NORTH: Offset = Offset::xy(0, 1);
const SOUTH: Offset = Offset::xy(0, -1);

/// Halo of every coupled-family stencil.
pub const COUPLED_HALO: Halo = Halo::uniform(1);

/// Momentum stage with parameters `(out_M, out_Mx, out_My, in_M, Mavg)`.
pub fn momentum_stage(bl: f64) -> Result<Stage, ConfigError> {
    let mut b = Stage::builder("momentum");
    let out_m = b.read_write("out_M", [Offset::ZERO]);
    let out_mx = b.write("out_Mx");
    let out_my = b.write("out_My");
    let in_m = b.read("in_M", [EAST, WEST, NORTH, SOUTH]);
    let mavg = b.write("Mavg");
    b.body(move |ctx| {
        let e = ctx.read(in_m, EAST)?;
        let w = ctx.read(in_m, WEST)?;
        let n = ctx.read(in_m, NORTH)?;
        let s = ctx.read(in_m, SOUTH)?;
        let avg = (e + w + n + s) / 4.0;
        ctx.write(mavg, avg)?;
        ctx.write(out_mx, e - w)?;
        ctx.write(out_my, n - s)?;
        let m = ctx.centre(out_m)?;
        ctx.write(out_m, m * (1.0 - bl) + bl * avg)
    });
    b.build()
}

/// Dynamics stage with parameters
/// `(out_H, out_Hd, in_H, in_Hx, in_Hy, out_U, out_Ud, in_U, in_Ux,
/// out_V, out_Vd, in_V, in_Vy)`.
pub fn dynamics_stage(dt: f64, growth: f64) -> Result<Stage, ConfigError> {
    let c = [Offset::ZERO];
    let mut b = Stage::builder("dynamics");
    let out_h = b.read_write("out_H", c);
    let out_hd = b.read_write("out_Hd", c);
    let in_h = b.read("in_H", c);
    let in_hx = b.read("in_Hx", c);
    let in_hy = b.read("in_Hy", c);
    let out_u = b.read_write("out_U", c);
    let out_ud = b.write("out_Ud");
    let in_u = b.read("in_U", c);
    let in_ux = b.read("in_Ux", c);
    let out_v = b.read_write("out_V", c);
    let out_vd = b.write("out_Vd");
    let in_v = b.read("in_V", c);
    let in_vy = b.read("in_Vy", c);
    b.body(move |ctx| {
        let ux = ctx.centre(in_ux)?;
        let vy = ctx.centre(in_vy)?;
        let ud = -ctx.centre(in_u)? * ux - growth * ctx.centre(in_hx)?;
        let vd = -ctx.centre(in_v)? * vy - growth * ctx.centre(in_hy)?;
        let hd = ctx.centre(out_hd)? - ctx.centre(in_h)? * (ux + vy);
        ctx.write(out_ud, ud)?;
        ctx.write(out_vd, vd)?;
        ctx.write(out_hd, hd)?;

        let u = ctx.centre(out_u)?;
        let v = ctx.centre(out_v)?;
        let h = ctx.centre(out_h)?;
        ctx.write(out_u, u + dt * ud)?;
        ctx.write(out_v, v + dt * vd)?;
        ctx.write(out_h, h + dt * hd)
    });
    b.build()
}

/// The full coupled stencil: momentum for `U`, `V` and `H`, then
/// dynamics.
pub fn coupled_stencil(domain: Shape, config: &CoupledConfig) -> Result<Stencil, KernelError> {
    config.validate()?;
    let momentum = momentum_stage(config.bl)?;
    let dynamics = dynamics_stage(config.dt, config.growth)?;

    let mut builder = StencilBuilder::new("coupled", domain)
        .halo(COUPLED_HALO)
        .params(COUPLED_PARAMS);
    for name in COUPLED_SCRATCH {
        builder = builder.scratch(name);
    }
    let stencil = builder
        .call(&momentum, [OUT_U, UX, UY, IN_U, MAVG])
        .call(&momentum, [OUT_V, VX, VY, IN_V, MAVG])
        .call(&momentum, [OUT_H, HX, HY, IN_H, MAVG])
        .call(
            &dynamics,
            [
                OUT_H, OUT_HD, IN_H, HX, HY, OUT_U, OUT_UD, IN_U, UX, OUT_V, OUT_VD, IN_V, VY,
            ],
        )
        .build()?;
    Ok(stencil)
}

/// Momentum stage alone over `(out_M, out_Mx, out_My, in_M)`.
pub fn momentum_stencil(domain: Shape, config: &MomentumConfig) -> Result<Stencil, KernelError> {
    config.validate()?;
    let momentum = momentum_stage(config.bl)?;
    let stencil = StencilBuilder::new("momentum", domain)
        .halo(COUPLED_HALO)
        .params([OUT_M, OUT_MX, OUT_MY, IN_M])
        .scratch(MAVG)
        .call(&momentum, [OUT_M, OUT_MX, OUT_MY, IN_M, MAVG])
        .build()?;
    Ok(stencil)
}

/// Dynamics stage alone, with the derivative fields supplied by the
/// caller.
pub fn dynamics_stencil(domain: Shape, config: &DynamicsConfig) -> Result<Stencil, KernelError> {
    config.validate()?;
    let dynamics = dynamics_stage(config.dt, config.growth)?;
    let params = [
        OUT_H, OUT_HD, IN_H, IN_HX, IN_HY, OUT_U, OUT_UD, IN_U, IN_UX, OUT_V, OUT_VD, IN_V, IN_VY,
    ];
    let stencil = StencilBuilder::new("dynamics", domain)
        .halo(COUPLED_HALO)
        .params(params.clone())
        .call(&dynamics, params)
        .build()?;
    Ok(stencil)
}
