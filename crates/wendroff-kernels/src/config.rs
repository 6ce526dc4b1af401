//! Coefficient sets for the shallow-water stencils.
//!
//! Each config has a `Default` with the calibrated constants and a
//! `validate` that every stencil constructor calls before capturing the
//! values in its stage bodies.

use thiserror::Error;
use wendroff_stencil::ConfigError;

/// A coefficient outside its valid domain.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum KernelConfigError {
    /// The coefficient is NaN or infinite.
    #[error("{name} must be finite, got {value}")]
    NonFinite {
        /// Coefficient name.
        name: &'static str,
        /// The value supplied.
        value: f64,
    },
    /// A step or spacing is zero or negative.
    #[error("{name} must be > 0, got {value}")]
    NonPositive {
        /// Coefficient name.
        name: &'static str,
        /// The value supplied.
        value: f64,
    },
}

/// Errors from constructing a shallow-water stencil.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum KernelError {
    /// The coefficient set is invalid.
    #[error(transparent)]
    Config(#[from] KernelConfigError),
    /// The stencil failed to assemble.
    #[error(transparent)]
    Stencil(#[from] ConfigError),
}

fn finite(name: &'static str, value: f64) -> Result<(), KernelConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(KernelConfigError::NonFinite { name, value })
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), KernelConfigError> {
    finite(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(KernelConfigError::NonPositive { name, value })
    }
}

/// Coefficients of the coupled height/momentum stencil.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoupledConfig {
    /// Blend factor between a cell and its neighbour average.
    pub bl: f64,
    /// Coupling of height gradients into velocity.
    pub growth: f64,
    /// Euler step.
    pub dt: f64,
}

impl Default for CoupledConfig {
    fn default() -> Self {
        Self {
            bl: 0.2,
            growth: 1.2,
            dt: 0.15,
        }
    }
}

impl CoupledConfig {
    /// Check every coefficient.
    pub fn validate(&self) -> Result<(), KernelConfigError> {
        finite("bl", self.bl)?;
        finite("growth", self.growth)?;
        positive("dt", self.dt)
    }
}

/// Coefficients of the momentum-only stencil.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MomentumConfig {
    /// Blend factor between a cell and its neighbour average.
    pub bl: f64,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self { bl: 1.2 }
    }
}

impl MomentumConfig {
    /// Check every coefficient.
    pub fn validate(&self) -> Result<(), KernelConfigError> {
        finite("bl", self.bl)
    }
}

/// Coefficients of the dynamics-only stencil.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DynamicsConfig {
    /// Euler step.
    pub dt: f64,
    /// Coupling of height gradients into velocity.
    pub growth: f64,
}

impl Default for DynamicsConfig {
    fn default() -> Self {
        Self {
            dt: 0.01,
            growth: 0.2,
        }
    }
}

impl DynamicsConfig {
    /// Check every coefficient.
    pub fn validate(&self) -> Result<(), KernelConfigError> {
        positive("dt", self.dt)?;
        finite("growth", self.growth)
    }
}

/// Coefficients of the Lax-Wendroff stencil.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LaxWendroffConfig {
    /// Cell width along `x`.
    pub dx: f64,
    /// Cell width along `y`.
    pub dy: f64,
    /// Time step.
    pub dt: f64,
    /// Gravitational acceleration.
    pub g: f64,
}

impl Default for LaxWendroffConfig {
    fn default() -> Self {
        Self {
            dx: 1.0,
            dy: 1.0,
            dt: 0.02,
            g: 9.81,
        }
    }
}

impl LaxWendroffConfig {
    /// Check every coefficient.
    pub fn validate(&self) -> Result<(), KernelConfigError> {
        positive("dx", self.dx)?;
        positive("dy", self.dy)?;
        positive("dt", self.dt)?;
        finite("g", self.g)
    }

    /// Courant number `dt * sqrt(g * depth) / min(dx, dy)` for water of
    /// the given depth. The scheme is stable below one.
    pub fn courant(&self, depth: f64) -> f64 {
        self.dt * (self.g * depth).sqrt() / self.dx.min(self.dy)
    }
}
