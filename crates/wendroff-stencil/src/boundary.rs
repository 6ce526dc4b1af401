//! Boundary policies applied to halo cells after a stencil run.
//!
//! The reflective policy fills every halo cell from its mirror image
//! across the nearest interior face. Height-like fields are copied
//! (zero gradient). A velocity component is negated and halved across the
//! faces normal to it and halved across the tangential faces, modelling a
//! zero-flux wall. Corner cells take the diagonal mirror with both factors
//! applied.
//!
//! Only interior cells are ever read, so applying the policy twice without
//! an interior update leaves the halo unchanged.

use thiserror::Error;
use wendroff_core::{FieldName, Halo, Shape};
use wendroff_grid::Grid;

/// Physical meaning of a field, which decides how it reflects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldRole {
    /// Scalar height, copied unchanged.
    Height,
    /// Velocity component along `x`.
    VelocityX,
    /// Velocity component along `y`.
    VelocityY,
}

impl FieldRole {
    /// Multipliers applied across `x` faces and `y` faces.
    fn factors(self) -> (f64, f64) {
        match self {
            Self::Height => (1.0, 1.0),
            Self::VelocityX => (-0.5, 0.5),
            Self::VelocityY => (0.5, -0.5),
        }
    }
}

/// Boundary policy attached to a stencil.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Boundary {
    /// Halo cells are left as the caller supplied them.
    #[default]
    None,
    /// Reflect the named parameter fields.
    Reflective(Vec<(FieldName, FieldRole)>),
}

impl Boundary {
    /// The fields the policy touches.
    pub fn fields(&self) -> &[(FieldName, FieldRole)] {
        match self {
            Self::None => &[],
            Self::Reflective(fields) => fields,
        }
    }
}

/// Errors from validating or applying a boundary policy.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BoundaryError {
    /// The interior is narrower than a halo side, so some halo cells have
    /// no interior mirror.
    #[error("interior of {shape} is too narrow to mirror halo {halo}")]
    InteriorTooNarrow {
        /// The domain.
        shape: Shape,
        /// The halo.
        halo: Halo,
    },
    /// Grids passed together disagree on shape.
    #[error("boundary fields disagree on shape: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Shape of the first grid.
        expected: Shape,
        /// The disagreeing shape.
        actual: Shape,
    },
    /// A reflected field is not a parameter of the stencil.
    #[error("boundary field '{name}' is not a stencil parameter")]
    NotAParam {
        /// The field name.
        name: FieldName,
    },
    /// A field is listed twice.
    #[error("boundary field '{name}' is listed more than once")]
    DuplicateField {
        /// The field name.
        name: FieldName,
    },
}

/// Check that every halo cell of `shape` has an interior mirror.
pub fn validate_reflective(shape: Shape, halo: Halo) -> Result<(), BoundaryError> {
    let wide_enough = |n: usize, minus: usize, plus: usize| {
        n.checked_sub(minus + plus)
            .is_some_and(|interior| interior >= minus.max(plus))
    };
    if wide_enough(shape.nx, halo.minus_x, halo.plus_x)
        && wide_enough(shape.ny, halo.minus_y, halo.plus_y)
    {
        Ok(())
    } else {
        Err(BoundaryError::InteriorTooNarrow { shape, halo })
    }
}

/// Mirror source along one axis and whether the cell is a halo cell.
fn mirror(i: usize, n: usize, minus: usize, plus: usize) -> (usize, bool) {
    if i < minus {
        (2 * minus - 1 - i, true)
    } else if i >= n - plus {
        (2 * (n - plus) - 1 - i, true)
    } else {
        (i, false)
    }
}

/// Apply `boundary` to `fields` in place.
///
/// Every grid must have the same shape and that shape must satisfy
/// [`validate_reflective`].
pub fn apply_boundary(
    boundary: &Boundary,
    fields: &mut [(FieldRole, &mut Grid)],
    halo: Halo,
) -> Result<(), BoundaryError> {
    if matches!(boundary, Boundary::None) {
        return Ok(());
    }
    let Some(shape) = fields.first().map(|(_, g)| g.shape()) else {
        return Ok(());
    };
    for (_, grid) in fields.iter() {
        if grid.shape() != shape {
            return Err(BoundaryError::ShapeMismatch {
                expected: shape,
                actual: grid.shape(),
            });
        }
    }
    validate_reflective(shape, halo)?;

    for (role, grid) in fields.iter_mut() {
        reflect(grid, *role, halo);
    }
    Ok(())
}

fn reflect(grid: &mut Grid, role: FieldRole, halo: Halo) {
    let shape = grid.shape();
    let (fx, fy) = role.factors();
    let data = grid.as_mut_slice();
    for x in 0..shape.nx {
        let (sx, x_halo) = mirror(x, shape.nx, halo.minus_x, halo.plus_x);
        for y in 0..shape.ny {
            let (sy, y_halo) = mirror(y, shape.ny, halo.minus_y, halo.plus_y);
            if !x_halo && !y_halo {
                continue;
            }
            let mut factor = 1.0;
            if x_halo {
                factor *= fx;
            }
            if y_halo {
                factor *= fy;
            }
            for z in 0..shape.nz {
                let dst = (x * shape.ny + y) * shape.nz + z;
                let src = (sx * shape.ny + sy) * shape.nz + z;
                data[dst] = factor * data[src];
            }
        }
    }
}
