//! Dense `f64` grid with bounds-checked access.

use std::ops::{Index, IndexMut};

use wendroff_core::{GridError, Offset, Point, Shape};

/// A dense three-dimensional array of `f64` values, halo cells included.
///
/// Storage is row-major over `(x, y, z)`. The grid has no notion of which
/// cells are halo; that is decided by the stencil's [`Halo`] at run time.
/// Grids are allocated once by the caller and mutated in place; nothing
/// in the engine reallocates them.
///
/// [`Halo`]: wendroff_core::Halo
///
/// # Examples
///
/// ```
/// use wendroff_core::{Offset, Shape};
/// use wendroff_grid::Grid;
///
/// let mut h = Grid::filled(Shape::new(4, 4, 1), 1.0);
/// h.set([2, 2, 0], 3.0).unwrap();
/// assert_eq!(h.at_offset([1, 2, 0], Offset::xy(1, 0)).unwrap(), 3.0);
/// assert!(h.at_offset([0, 0, 0], Offset::xy(-1, 0)).is_err());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    shape: Shape,
    data: Vec<f64>,
}

impl Grid {
    /// A zero-filled grid.
    pub fn new(shape: Shape) -> Self {
        Self::filled(shape, 0.0)
    }

    /// A grid with every cell set to `value`.
    pub fn filled(shape: Shape, value: f64) -> Self {
        Self {
            shape,
            data: vec![value; shape.cell_count()],
        }
    }

    /// Wrap existing row-major data.
    ///
    /// Returns `Err(GridError::LengthMismatch)` unless `data` holds exactly
    /// one value per cell.
    pub fn from_vec(shape: Shape, data: Vec<f64>) -> Result<Self, GridError> {
        if data.len() != shape.cell_count() {
            return Err(GridError::LengthMismatch {
                len: data.len(),
                shape,
            });
        }
        Ok(Self { shape, data })
    }

    /// A grid whose cells are computed from their coordinates.
    pub fn from_fn(shape: Shape, mut f: impl FnMut(Point) -> f64) -> Self {
        let mut data = Vec::with_capacity(shape.cell_count());
        for x in 0..shape.nx {
            for y in 0..shape.ny {
                for z in 0..shape.nz {
                    data.push(f([x, y, z]));
                }
            }
        }
        Self { shape, data }
    }

    /// Storage shape.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the grid has no cells.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Linear index of `point + offset`.
    pub fn resolve(&self, point: Point, offset: Offset) -> Result<usize, GridError> {
        offset
            .apply(point)
            .and_then(|p| self.shape.linear_index(p))
            .ok_or(GridError::OutOfBounds {
                point,
                offset,
                shape: self.shape,
            })
    }

    /// Value at `point`.
    pub fn get(&self, point: Point) -> Result<f64, GridError> {
        self.at_offset(point, Offset::ZERO)
    }

    /// Value at `point + offset`.
    pub fn at_offset(&self, point: Point, offset: Offset) -> Result<f64, GridError> {
        let idx = self.resolve(point, offset)?;
        Ok(self.data[idx])
    }

    /// Overwrite the value at `point`.
    pub fn set(&mut self, point: Point, value: f64) -> Result<(), GridError> {
        let idx = self.resolve(point, Offset::ZERO)?;
        self.data[idx] = value;
        Ok(())
    }

    /// Set every cell to `value`.
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Copy all values from `other`, which must have the same shape.
    pub fn copy_from(&mut self, other: &Grid) -> Result<(), GridError> {
        if other.shape != self.shape {
            return Err(GridError::ShapeMismatch {
                expected: self.shape,
                actual: other.shape,
            });
        }
        self.data.copy_from_slice(&other.data);
        Ok(())
    }

    /// Row-major view of the storage.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Mutable row-major view of the storage.
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }
}

/// Unchecked-style indexing for tests and harness code.
///
/// # Panics
///
/// Panics if `point` is outside the storage. Use [`Grid::get`] for a
/// fallible lookup.
impl Index<Point> for Grid {
    type Output = f64;

    fn index(&self, point: Point) -> &f64 {
        match self.shape.linear_index(point) {
            Some(idx) => &self.data[idx],
            None => panic!("point {point:?} outside grid {}", self.shape),
        }
    }
}

impl IndexMut<Point> for Grid {
    fn index_mut(&mut self, point: Point) -> &mut f64 {
        match self.shape.linear_index(point) {
            Some(idx) => &mut self.data[idx],
            None => panic!("point {point:?} outside grid {}", self.shape),
        }
    }
}
