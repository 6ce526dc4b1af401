//! Wendroff: a multi-stage stencil engine with a shallow-water solver.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Wendroff sub-crates. For most users, adding `wendroff` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use wendroff::prelude::*;
//!
//! // A stage that averages the four in-plane neighbours of `src`.
//! const CROSS: [Offset; 4] = [
//!     Offset::xy(1, 0),
//!     Offset::xy(-1, 0),
//!     Offset::xy(0, 1),
//!     Offset::xy(0, -1),
//! ];
//! let mut b = Stage::builder("diffuse");
//! let src = b.read("src", CROSS);
//! let dst = b.write("dst");
//! b.body(move |ctx| {
//!     let mut sum = 0.0;
//!     for offset in CROSS {
//!         sum += ctx.read(src, offset)?;
//!     }
//!     ctx.write(dst, sum / 4.0)
//! });
//! let diffuse = b.build().unwrap();
//!
//! // Run it once over a 16×16 grid with a one-cell halo.
//! let shape = Shape::new(16, 16, 1);
//! let mut stencil = StencilBuilder::new("diffusion", shape)
//!     .halo(Halo::uniform(1))
//!     .params(["in", "out"])
//!     .call(&diffuse, ["in", "out"])
//!     .build()
//!     .unwrap();
//! assert_eq!(
//!     stencil.access_ranges().get("in"),
//!     Some(AccessRange::xy(-1, 1, -1, 1)),
//! );
//!
//! let mut input = Grid::filled(shape, 2.0);
//! let mut output = Grid::new(shape);
//! stencil
//!     .run(&mut Bindings::new().with("in", &mut input).with("out", &mut output))
//!     .unwrap();
//! assert_eq!(output[[8, 8, 0]], 2.0);
//! assert_eq!(output[[0, 8, 0]], 0.0);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `wendroff-core` | Geometry, field names, error types |
//! | [`grid`] | `wendroff-grid` | Dense grids and interior iteration |
//! | [`stencil`] | `wendroff-stencil` | Stages, stencils, range analysis, boundaries |
//! | [`kernels`] | `wendroff-kernels` | Coupled and Lax-Wendroff shallow-water stencils |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and errors (`wendroff-core`).
///
/// Contains [`types::Shape`], [`types::Halo`], [`types::Offset`],
/// [`types::AccessRange`], field names, and the run-time error types.
pub use wendroff_core as types;

/// Dense 3-D grids (`wendroff-grid`).
///
/// [`grid::Grid`] storage and the [`grid::get_interior_points`] iterator.
pub use wendroff_grid as grid;

/// Stage declaration, stencil assembly and execution (`wendroff-stencil`).
///
/// [`stencil::StencilBuilder`] is the main entry point; the analysis types
/// live here too.
pub use wendroff_stencil as stencil;

/// Shallow-water stencils (`wendroff-kernels`).
///
/// Includes [`kernels::coupled_stencil`] and
/// [`kernels::lax_wendroff_stencil`] with their configs.
pub use wendroff_kernels as kernels;

/// Common imports for typical Wendroff usage.
///
/// ```rust
/// use wendroff::prelude::*;
/// ```
///
/// This imports geometry, grids, the stage and stencil builders, analysis
/// results, and the shipped shallow-water stencils.
pub mod prelude {
    // Geometry
    pub use wendroff_core::{AccessRange, FieldName, Halo, Offset, Point, Region, Shape};

    // Errors
    pub use wendroff_core::{GridError, RunError, StageError};
    pub use wendroff_stencil::{BoundaryError, ConfigError};

    // Grid
    pub use wendroff_grid::{get_interior_points, Grid, InteriorPoints};

    // Stencil
    pub use wendroff_stencil::{
        AccessRanges, Bindings, Boundary, DependencyGraph, FieldRole, PointContext, Stage,
        StageBuilder, Stencil, StencilBuilder,
    };

    // Kernels
    pub use wendroff_kernels::{
        coupled_stencil, lax_wendroff_stencil, CoupledConfig, KernelError, LaxWendroffConfig,
    };
}
