//! Test utilities and fixtures for Wendroff development.
//!
//! Initial-condition builders for the shallow-water stencils
//! ([`droplet`], [`CoupledFields`], [`LaxWendroffFields`]) and small
//! fixture stages in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use wendroff_core::Shape;
use wendroff_grid::Grid;
use wendroff_stencil::Bindings;

/// Background value of the coupled harness fields.
pub const BACKGROUND: f64 = 0.000_001;

/// Raise a circular droplet of height `1.0` centred on the grid.
///
/// Cells with `(x - nx/2)^2 + (y - ny/2)^2 < (nx/10)^2` are set, on every
/// `z` layer. On an 8x8 grid that is only the centre cell `(4, 4)`.
pub fn droplet(h: &mut Grid) {
    let shape = h.shape();
    let (cx, cy) = (shape.nx as f64 / 2.0, shape.ny as f64 / 2.0);
    let radius = shape.nx as f64 / 10.0;
    for x in 0..shape.nx {
        for y in 0..shape.ny {
            let (dx, dy) = (x as f64 - cx, y as f64 - cy);
            if dx * dx + dy * dy < radius * radius {
                for z in 0..shape.nz {
                    h[[x, y, z]] = 1.0;
                }
            }
        }
    }
}

/// The nine caller grids of the coupled height/momentum stencil.
///
/// `out_*` start at [`BACKGROUND`] with a droplet on `out_H`, `in_*` are
/// copies of them, and the derivative buffers start at zero.
#[derive(Clone, Debug, PartialEq)]
pub struct CoupledFields {
    pub out_h: Grid,
    pub out_hd: Grid,
    pub in_h: Grid,
    pub out_u: Grid,
    pub out_ud: Grid,
    pub in_u: Grid,
    pub out_v: Grid,
    pub out_vd: Grid,
    pub in_v: Grid,
}

impl CoupledFields {
    pub fn new(shape: Shape) -> Self {
        let mut out_h = Grid::filled(shape, BACKGROUND);
        droplet(&mut out_h);
        let out_u = Grid::filled(shape, BACKGROUND);
        let out_v = Grid::filled(shape, BACKGROUND);
        Self {
            in_h: out_h.clone(),
            in_u: out_u.clone(),
            in_v: out_v.clone(),
            out_h,
            out_hd: Grid::new(shape),
            out_u,
            out_ud: Grid::new(shape),
            out_v,
            out_vd: Grid::new(shape),
        }
    }

    /// Bind every grid under its parameter name.
    pub fn bindings(&mut self) -> Bindings<'_> {
        Bindings::new()
            .with("out_H", &mut self.out_h)
            .with("out_Hd", &mut self.out_hd)
            .with("in_H", &mut self.in_h)
            .with("out_U", &mut self.out_u)
            .with("out_Ud", &mut self.out_ud)
            .with("in_U", &mut self.in_u)
            .with("out_V", &mut self.out_v)
            .with("out_Vd", &mut self.out_vd)
            .with("in_V", &mut self.in_v)
    }

    /// Copy each `out_*` state grid into its `in_*` counterpart, ready for
    /// the next step.
    pub fn carry_over(&mut self) {
        self.in_h.clone_from(&self.out_h);
        self.in_u.clone_from(&self.out_u);
        self.in_v.clone_from(&self.out_v);
    }
}

/// Height and velocity grids of the Lax-Wendroff stencil.
#[derive(Clone, Debug, PartialEq)]
pub struct LaxWendroffFields {
    pub h: Grid,
    pub u: Grid,
    pub v: Grid,
}

impl LaxWendroffFields {
    /// Flat water of unit height at rest.
    pub fn still_water(shape: Shape) -> Self {
        Self {
            h: Grid::filled(shape, 1.0),
            u: Grid::new(shape),
            v: Grid::new(shape),
        }
    }

    /// Still water with a droplet of height `1.0 + height` centred on it.
    pub fn with_droplet(shape: Shape, height: f64) -> Self {
        let mut fields = Self::still_water(shape);
        let mut bump = Grid::new(shape);
        droplet(&mut bump);
        for (h, b) in fields.h.as_mut_slice().iter_mut().zip(bump.as_slice()) {
            *h += height * b;
        }
        fields
    }

    pub fn bindings(&mut self) -> Bindings<'_> {
        Bindings::new()
            .with("out_H", &mut self.h)
            .with("out_U", &mut self.u)
            .with("out_V", &mut self.v)
    }

    /// Total water volume over the interior cells of `shape` minus a
    /// one-cell halo.
    pub fn interior_volume(&self) -> f64 {
        let shape = self.h.shape();
        let mut total = 0.0;
        for x in 1..shape.nx.saturating_sub(1) {
            for y in 1..shape.ny.saturating_sub(1) {
                for z in 0..shape.nz {
                    total += self.h[[x, y, z]];
                }
            }
        }
        total
    }
}
