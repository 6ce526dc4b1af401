//! Benchmark profiles and utilities for the Wendroff stencil engine.
//!
//! Provides pre-built stencil/field pairs for benchmarks and examples:
//!
//! - [`reference_profile`]: 100x100 Lax-Wendroff droplet (10K cells)
//! - [`stress_profile`]: 316x316 Lax-Wendroff droplet (~100K cells)
//! - [`coupled_profile`]: the coupled height/momentum stencil on an
//!   `n x n` droplet

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use tracing::{debug, info};
use wendroff_core::{RunError, Shape};
use wendroff_kernels::{
    coupled_stencil, lax_wendroff_stencil, CoupledConfig, KernelError, LaxWendroffConfig,
};
use wendroff_stencil::Stencil;
use wendroff_test_utils::{CoupledFields, LaxWendroffFields};

/// Height of the droplet above unit-depth water in the Lax-Wendroff
/// profiles.
pub const DROPLET_HEIGHT: f64 = 0.5;

/// A Lax-Wendroff stencil together with the grids it advances.
#[derive(Debug)]
pub struct LaxWendroffProfile {
    /// The assembled stencil.
    pub stencil: Stencil,
    /// Height and momenta.
    pub fields: LaxWendroffFields,
}

/// A coupled stencil together with its nine caller grids.
#[derive(Debug)]
pub struct CoupledProfile {
    /// The assembled stencil.
    pub stencil: Stencil,
    /// Inputs, outputs and derivatives.
    pub fields: CoupledFields,
}

/// Summary of a run of steps.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepSummary {
    /// Steps taken.
    pub steps: usize,
    /// Interior water volume after the last step.
    pub volume: f64,
    /// Largest height anywhere on the grid.
    pub max_height: f64,
}

fn lax_wendroff_profile(n: usize) -> Result<LaxWendroffProfile, KernelError> {
    let shape = Shape::new(n, n, 1);
    Ok(LaxWendroffProfile {
        stencil: lax_wendroff_stencil(shape, &LaxWendroffConfig::default())?,
        fields: LaxWendroffFields::with_droplet(shape, DROPLET_HEIGHT),
    })
}

/// Build a reference benchmark profile: 100x100 grid (10K cells).
///
/// dt=0.02 with g=9.81 keeps the Courant number near 0.08 at depth 1.5.
pub fn reference_profile() -> Result<LaxWendroffProfile, KernelError> {
    lax_wendroff_profile(100)
}

/// Build a stress benchmark profile: 316x316 grid (~100K cells).
pub fn stress_profile() -> Result<LaxWendroffProfile, KernelError> {
    lax_wendroff_profile(316)
}

/// Build the coupled stencil on an `n x n` droplet with default
/// coefficients.
pub fn coupled_profile(n: usize) -> Result<CoupledProfile, KernelError> {
    let shape = Shape::new(n, n, 1);
    Ok(CoupledProfile {
        stencil: coupled_stencil(shape, &CoupledConfig::default())?,
        fields: CoupledFields::new(shape),
    })
}

impl LaxWendroffProfile {
    /// Advance `steps` times.
    pub fn step(&mut self, steps: usize) -> Result<StepSummary, RunError> {
        for i in 0..steps {
            self.stencil.run(&mut self.fields.bindings())?;
            debug!(step = i + 1, "lax-wendroff step");
        }
        let summary = StepSummary {
            steps,
            volume: self.fields.interior_volume(),
            max_height: self
                .fields
                .h
                .as_slice()
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max),
        };
        info!(
            steps,
            volume = summary.volume,
            max_height = summary.max_height,
            "lax-wendroff run complete"
        );
        Ok(summary)
    }
}

impl CoupledProfile {
    /// Advance `steps` times, carrying each step's outputs into the next
    /// step's inputs.
    pub fn step(&mut self, steps: usize) -> Result<(), RunError> {
        for i in 0..steps {
            self.stencil.run(&mut self.fields.bindings())?;
            self.fields.carry_over();
            debug!(step = i + 1, "coupled step");
        }
        Ok(())
    }
}
