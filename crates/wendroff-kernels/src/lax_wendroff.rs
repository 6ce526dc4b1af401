//! Two-step Lax-Wendroff integrator for the shallow-water equations.
//!
//! State `q = (h, u, v)` holds height and the two momenta. Fluxes are
//!
//! ```text
//! F(q) = (u, u²/h + g/2·h², u·v/h)
//! G(q) = (v, v·u/h,         v²/h + g/2·h²)
//! ```
//!
//! The half steps average neighbouring cells and advance them by `dt/2`
//! along one axis, storing the face values in scratch. Scratch `Hx(p)`
//! sits between `H(p + (0,1))` and `H(p + (1,1))`; `Hy(p)` between
//! `H(p + (1,0))` and `H(p + (1,1))`. The final stage then differences
//! the face fluxes around each cell:
//!
//! ```text
//! q -= dt/dx · (F(q_x)(0,-1) - F(q_x)(-1,-1))
//!    + dt/dy · (G(q_y)(-1,0) - G(q_y)(-1,-1))
//! ```
//!
//! A reflective boundary refreshes the halo after every run.

use wendroff_core::{Halo, Offset, ParamId, Shape, StageError};
use wendroff_stencil::{
    Boundary, ConfigError, FieldRole, PointContext, Stage, Stencil, StencilBuilder,
};

use crate::config::{KernelError, LaxWendroffConfig};
use crate::fields::*;

/// Halo of the Lax-Wendroff stencil.
pub const LAX_WENDROFF_HALO: Halo = Halo::uniform(1);

type State = (f64, f64, f64);

fn flux_x((h, u, v): State, g: f64) -> State {
    (u, u * u / h + g / 2.0 * h * h, u * v / h)
}

fn flux_y((h, u, v): State, g: f64) -> State {
    (v, v * u / h, v * v / h + g / 2.0 * h * h)
}

fn read_state(
    ctx: &mut PointContext<'_>,
    [h, u, v]: [ParamId; 3],
    at: Offset,
) -> Result<State, StageError> {
    Ok((ctx.read(h, at)?, ctx.read(u, at)?, ctx.read(v, at)?))
}

fn half_step(
    name: &str,
    ahead: Offset,
    behind: Offset,
    coeff: f64,
    flux: fn(State, f64) -> State,
    g: f64,
) -> Result<Stage, ConfigError> {
    let taps = [ahead, behind];
    let mut b = Stage::builder(name);
    let h = b.read("h", taps);
    let u = b.read("u", taps);
    let v = b.read("v", taps);
    let h_face = b.write("h_face");
    let u_face = b.write("u_face");
    let v_face = b.write("v_face");
    b.body(move |ctx| {
        let q1 = read_state(ctx, [h, u, v], ahead)?;
        let q0 = read_state(ctx, [h, u, v], behind)?;
        let (f1, f0) = (flux(q1, g), flux(q0, g));
        ctx.write(h_face, (q1.0 + q0.0) / 2.0 - coeff * (f1.0 - f0.0))?;
        ctx.write(u_face, (q1.1 + q0.1) / 2.0 - coeff * (f1.1 - f0.1))?;
        ctx.write(v_face, (q1.2 + q0.2) / 2.0 - coeff * (f1.2 - f0.2))
    });
    b.build()
}

/// Half step along `x` with parameters `(H, U, V, Hx, Ux, Vx)`.
pub fn half_step_x(config: &LaxWendroffConfig) -> Result<Stage, ConfigError> {
    half_step(
        "half_step_x",
        Offset::xy(1, 1),
        Offset::xy(0, 1),
        config.dt / (2.0 * config.dx),
        flux_x,
        config.g,
    )
}

/// Half step along `y` with parameters `(H, U, V, Hy, Uy, Vy)`.
pub fn half_step_y(config: &LaxWendroffConfig) -> Result<Stage, ConfigError> {
    half_step(
        "half_step_y",
        Offset::xy(1, 1),
        Offset::xy(1, 0),
        config.dt / (2.0 * config.dy),
        flux_y,
        config.g,
    )
}

/// Full step with parameters `(H, U, V, Hx, Ux, Vx, Hy, Uy, Vy)`.
pub fn final_step(config: &LaxWendroffConfig) -> Result<Stage, ConfigError> {
    const RIGHT: Offset = Offset::xy(0, -1);
    const LEFT: Offset = Offset::xy(-1, -1);
    const TOP: Offset = Offset::xy(-1, 0);
    const BOTTOM: Offset = Offset::xy(-1, -1);

    let LaxWendroffConfig { dx, dy, dt, g } = *config;
    let (cx, cy) = (dt / dx, dt / dy);
    let mut b = Stage::builder("final_step");
    let h = b.read_write("h", [Offset::ZERO]);
    let u = b.read_write("u", [Offset::ZERO]);
    let v = b.read_write("v", [Offset::ZERO]);
    let hx = b.read("hx", [RIGHT, LEFT]);
    let ux = b.read("ux", [RIGHT, LEFT]);
    let vx = b.read("vx", [RIGHT, LEFT]);
    let hy = b.read("hy", [TOP, BOTTOM]);
    let uy = b.read("uy", [TOP, BOTTOM]);
    let vy = b.read("vy", [TOP, BOTTOM]);
    b.body(move |ctx| {
        let fr = flux_x(read_state(ctx, [hx, ux, vx], RIGHT)?, g);
        let fl = flux_x(read_state(ctx, [hx, ux, vx], LEFT)?, g);
        let gt = flux_y(read_state(ctx, [hy, uy, vy], TOP)?, g);
        let gb = flux_y(read_state(ctx, [hy, uy, vy], BOTTOM)?, g);

        let dh = cx * (fr.0 - fl.0) + cy * (gt.0 - gb.0);
        let du = cx * (fr.1 - fl.1) + cy * (gt.1 - gb.1);
        let dv = cx * (fr.2 - fl.2) + cy * (gt.2 - gb.2);
        let (h0, u0, v0) = (ctx.centre(h)?, ctx.centre(u)?, ctx.centre(v)?);
        ctx.write(h, h0 - dh)?;
        ctx.write(u, u0 - du)?;
        ctx.write(v, v0 - dv)
    });
    b.build()
}

/// The reflective boundary used by [`lax_wendroff_stencil`].
pub fn lax_wendroff_boundary() -> Boundary {
    Boundary::Reflective(vec![
        (OUT_H, FieldRole::Height),
        (OUT_U, FieldRole::VelocityX),
        (OUT_V, FieldRole::VelocityY),
    ])
}

/// Half step in `x`, half step in `y`, then the final combine, with a
/// reflective boundary on `out_H`, `out_U` and `out_V`.
pub fn lax_wendroff_stencil(
    domain: Shape,
    config: &LaxWendroffConfig,
) -> Result<Stencil, KernelError> {
    config.validate()?;
    let x = half_step_x(config)?;
    let y = half_step_y(config)?;
    let combine = final_step(config)?;

    let mut builder = StencilBuilder::new("lax_wendroff", domain)
        .halo(LAX_WENDROFF_HALO)
        .params(LAX_WENDROFF_PARAMS);
    for name in LAX_WENDROFF_SCRATCH {
        builder = builder.scratch(name);
    }
    let stencil = builder
        .call(&x, [OUT_H, OUT_U, OUT_V, HX, UX, VX])
        .call(&y, [OUT_H, OUT_U, OUT_V, HY, UY, VY])
        .call(&combine, [OUT_H, OUT_U, OUT_V, HX, UX, VX, HY, UY, VY])
        .boundary(lax_wendroff_boundary())
        .build()?;
    Ok(stencil)
}
