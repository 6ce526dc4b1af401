//! Reusable stage and stencil fixtures.
//!
//! - [`copy_stage`] copies one field to another at the centre point.
//! - [`diffusion_stage`] / [`diffusion_stencil`] average the four
//!   in-plane neighbours; the output never reads its own prior value.
//! - [`failing_stage`] fails deterministically at one point.
//! - [`two_pass_stencil`] chains a scratch producer into a consumer that
//!   reads it off-centre.

use wendroff_core::{Halo, Offset, Point, Shape};
use wendroff_stencil::{ConfigError, Stage, Stencil, StencilBuilder};

/// The 4-neighbour offsets.
pub const CROSS: [Offset; 4] = [
    Offset::xy(1, 0),
    Offset::xy(-1, 0),
    Offset::xy(0, 1),
    Offset::xy(0, -1),
];

/// `(src, dst)`: `dst = src` at every point.
pub fn copy_stage() -> Stage {
    let mut b = Stage::builder("copy");
    let src = b.read("src", [Offset::ZERO]);
    let dst = b.write("dst");
    b.body(move |ctx| {
        let v = ctx.centre(src)?;
        ctx.write(dst, v)
    });
    b.build().expect("copy stage is well formed")
}

/// `(src, dst)`: `dst = mean of the 4 neighbours of src`.
pub fn diffusion_stage() -> Stage {
    let mut b = Stage::builder("diffuse");
    let src = b.read("src", CROSS);
    let dst = b.write("dst");
    b.body(move |ctx| {
        let mut sum = 0.0;
        for offset in CROSS {
            sum += ctx.read(src, offset)?;
        }
        ctx.write(dst, sum / 4.0)
    });
    b.build().expect("diffusion stage is well formed")
}

/// Single-call stencil diffusing parameter `in` into parameter `out`.
pub fn diffusion_stencil(domain: Shape, halo: Halo) -> Stencil {
    StencilBuilder::new("diffusion", domain)
        .halo(halo)
        .params(["in", "out"])
        .call(&diffusion_stage(), ["in", "out"])
        .build()
        .expect("diffusion stencil is well formed")
}

/// `(src, dst)`: copies like [`copy_stage`] but fails at `at` with an
/// undeclared read.
pub fn failing_stage(at: Point) -> Stage {
    let mut b = Stage::builder("failing");
    let src = b.read("src", [Offset::ZERO]);
    let dst = b.write("dst");
    b.body(move |ctx| {
        if ctx.point() == at {
            ctx.read(src, Offset::xy(0, 1))?;
        }
        let v = ctx.centre(src)?;
        ctx.write(dst, v + 1.0)
    });
    b.build().expect("failing stage is well formed")
}

/// `in -> tmp -> out`: copies `in` into scratch `tmp`, then writes
/// `out = tmp(-1, 0) + tmp(1, 0)`. The copy must cover one cell either
/// side of the interior along `x`.
pub fn two_pass_stencil(domain: Shape, halo: Halo) -> Result<Stencil, ConfigError> {
    let mut b = Stage::builder("sum_x");
    let tmp = b.read("tmp", [Offset::xy(-1, 0), Offset::xy(1, 0)]);
    let out = b.write("out");
    b.body(move |ctx| {
        let v = ctx.read(tmp, Offset::xy(-1, 0))? + ctx.read(tmp, Offset::xy(1, 0))?;
        ctx.write(out, v)
    });
    let sum_x = b.build()?;

    StencilBuilder::new("two_pass", domain)
        .halo(halo)
        .params(["in", "out"])
        .scratch("tmp")
        .call(&copy_stage(), ["in", "tmp"])
        .call(&sum_x, ["tmp", "out"])
        .build()
}
