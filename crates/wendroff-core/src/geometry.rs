//! Grid geometry: points, offsets, shapes, halos, regions, and access ranges.
//!
//! Axes are ordered `(x, y, z)` and storage is row-major over that order, so
//! `z` is the fastest-varying axis. Halos only exist on the `x` and `y` axes.

use smallvec::SmallVec;
use std::fmt;
use std::ops::{Add, Neg};

/// An absolute cell coordinate `[x, y, z]` inside a grid's storage.
pub type Point = [usize; 3];

/// Neighbour-offset pattern of one stage parameter.
///
/// Eight inline slots cover the usual 5- and 9-point stencils without
/// touching the heap.
pub type OffsetList = SmallVec<[Offset; 8]>;

// ── Offset ─────────────────────────────────────────────────────────

/// A signed displacement from the point being evaluated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Offset {
    /// Displacement along `x`.
    pub dx: i32,
    /// Displacement along `y`.
    pub dy: i32,
    /// Displacement along `z`.
    pub dz: i32,
}

impl Offset {
    /// The centre point.
    pub const ZERO: Offset = Offset::new(0, 0, 0);

    /// Create an offset from its three components.
    pub const fn new(dx: i32, dy: i32, dz: i32) -> Self {
        Self { dx, dy, dz }
    }

    /// Create an in-plane offset (`dz = 0`).
    pub const fn xy(dx: i32, dy: i32) -> Self {
        Self::new(dx, dy, 0)
    }

    /// Whether this is the centre point.
    pub fn is_zero(self) -> bool {
        self == Self::ZERO
    }

    /// Apply the offset to `point`, returning `None` if any axis would go
    /// negative. Upper bounds are the caller's business.
    pub fn apply(self, point: Point) -> Option<Point> {
        let shift = |p: usize, d: i32| -> Option<usize> {
            let moved = p as i64 + i64::from(d);
            usize::try_from(moved).ok()
        };
        Some([
            shift(point[0], self.dx)?,
            shift(point[1], self.dy)?,
            shift(point[2], self.dz)?,
        ])
    }
}

impl Add for Offset {
    type Output = Offset;

    fn add(self, rhs: Offset) -> Offset {
        Offset::new(self.dx + rhs.dx, self.dy + rhs.dy, self.dz + rhs.dz)
    }
}

impl Neg for Offset {
    type Output = Offset;

    fn neg(self) -> Offset {
        Offset::new(-self.dx, -self.dy, -self.dz)
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.dx, self.dy, self.dz)
    }
}

// ── Shape ──────────────────────────────────────────────────────────

/// Full storage extent of a grid, halo cells included.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Shape {
    /// Cells along `x`.
    pub nx: usize,
    /// Cells along `y`.
    pub ny: usize,
    /// Cells along `z`.
    pub nz: usize,
}

impl Shape {
    /// Create a shape from its three extents.
    pub const fn new(nx: usize, ny: usize, nz: usize) -> Self {
        Self { nx, ny, nz }
    }

    /// The extents as an array indexed by axis.
    pub fn dims(&self) -> [usize; 3] {
        [self.nx, self.ny, self.nz]
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// Whether any axis has zero length.
    pub fn is_empty(&self) -> bool {
        self.cell_count() == 0
    }

    /// Whether `point` lies inside the storage.
    pub fn contains(&self, point: Point) -> bool {
        point[0] < self.nx && point[1] < self.ny && point[2] < self.nz
    }

    /// Row-major linear index of `point`, or `None` if it is out of range.
    pub fn linear_index(&self, point: Point) -> Option<usize> {
        if !self.contains(point) {
            return None;
        }
        Some((point[0] * self.ny + point[1]) * self.nz + point[2])
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.nx, self.ny, self.nz)
    }
}

// ── Halo ───────────────────────────────────────────────────────────

/// Width of the halo ring on each side of the `x` and `y` axes.
///
/// The halo lives inside the grid's storage: a 64x64 grid with a halo of
/// one cell per side has a 62x62 interior.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Halo {
    /// Cells below the interior on `x`.
    pub minus_x: usize,
    /// Cells above the interior on `x`.
    pub plus_x: usize,
    /// Cells below the interior on `y`.
    pub minus_y: usize,
    /// Cells above the interior on `y`.
    pub plus_y: usize,
}

impl Halo {
    /// No halo: the interior is the whole grid.
    pub const NONE: Halo = Halo::new(0, 0, 0, 0);

    /// Create a halo from `(minus_x, plus_x, minus_y, plus_y)`.
    pub const fn new(minus_x: usize, plus_x: usize, minus_y: usize, plus_y: usize) -> Self {
        Self {
            minus_x,
            plus_x,
            minus_y,
            plus_y,
        }
    }

    /// The same width on all four sides.
    pub const fn uniform(width: usize) -> Self {
        Self::new(width, width, width, width)
    }

    /// Whether the halo leaves a non-negative interior on `shape`.
    pub fn fits(&self, shape: Shape) -> bool {
        self.minus_x + self.plus_x <= shape.nx && self.minus_y + self.plus_y <= shape.ny
    }
}

impl fmt::Display for Halo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.minus_x, self.plus_x, self.minus_y, self.plus_y
        )
    }
}

// ── AccessRange ────────────────────────────────────────────────────

/// Bounding box of the offsets at which a field is read, relative to the
/// point being written. Bounds are inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AccessRange {
    /// Smallest `dx` read.
    pub min_x: i32,
    /// Largest `dx` read.
    pub max_x: i32,
    /// Smallest `dy` read.
    pub min_y: i32,
    /// Largest `dy` read.
    pub max_y: i32,
    /// Smallest `dz` read.
    pub min_z: i32,
    /// Largest `dz` read.
    pub max_z: i32,
}

impl AccessRange {
    /// The range covering only the centre point.
    pub const ZERO: AccessRange = AccessRange::from_offset(Offset::ZERO);

    /// Create an in-plane range `[min_x, max_x, min_y, max_y]`.
    pub const fn xy(min_x: i32, max_x: i32, min_y: i32, max_y: i32) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
            min_z: 0,
            max_z: 0,
        }
    }

    /// The degenerate range covering exactly `offset`.
    pub const fn from_offset(offset: Offset) -> Self {
        Self {
            min_x: offset.dx,
            max_x: offset.dx,
            min_y: offset.dy,
            max_y: offset.dy,
            min_z: offset.dz,
            max_z: offset.dz,
        }
    }

    /// Tightest range covering every offset, or `None` for an empty input.
    pub fn from_offsets<I: IntoIterator<Item = Offset>>(offsets: I) -> Option<Self> {
        let mut iter = offsets.into_iter();
        let mut range = Self::from_offset(iter.next()?);
        for offset in iter {
            range.include(offset);
        }
        Some(range)
    }

    /// Grow the range in place so it covers `offset`.
    pub fn include(&mut self, offset: Offset) {
        self.min_x = self.min_x.min(offset.dx);
        self.max_x = self.max_x.max(offset.dx);
        self.min_y = self.min_y.min(offset.dy);
        self.max_y = self.max_y.max(offset.dy);
        self.min_z = self.min_z.min(offset.dz);
        self.max_z = self.max_z.max(offset.dz);
    }

    /// Smallest range covering both `self` and `other`.
    pub fn union(self, other: AccessRange) -> AccessRange {
        AccessRange {
            min_x: self.min_x.min(other.min_x),
            max_x: self.max_x.max(other.max_x),
            min_y: self.min_y.min(other.min_y),
            max_y: self.max_y.max(other.max_y),
            min_z: self.min_z.min(other.min_z),
            max_z: self.max_z.max(other.max_z),
        }
    }

    /// Minkowski sum: every offset reachable by an offset in `self`
    /// followed by an offset in `other`.
    pub fn grow(self, other: AccessRange) -> AccessRange {
        AccessRange {
            min_x: self.min_x + other.min_x,
            max_x: self.max_x + other.max_x,
            min_y: self.min_y + other.min_y,
            max_y: self.max_y + other.max_y,
            min_z: self.min_z + other.min_z,
            max_z: self.max_z + other.max_z,
        }
    }

    /// Whether `offset` lies inside the range.
    pub fn contains(&self, offset: Offset) -> bool {
        (self.min_x..=self.max_x).contains(&offset.dx)
            && (self.min_y..=self.max_y).contains(&offset.dy)
            && (self.min_z..=self.max_z).contains(&offset.dz)
    }

    /// Whether the range covers only the centre point.
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// The in-plane bounds as `[min_x, max_x, min_y, max_y]`.
    pub fn xy_bounds(&self) -> [i32; 4] {
        [self.min_x, self.max_x, self.min_y, self.max_y]
    }
}

impl fmt::Display for AccessRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.min_x, self.max_x, self.min_y, self.max_y
        )?;
        if self.min_z != 0 || self.max_z != 0 {
            write!(f, " z[{}, {}]", self.min_z, self.max_z)?;
        }
        Ok(())
    }
}

// ── Region ─────────────────────────────────────────────────────────

/// A half-open box of cells `[lo, hi)` per axis.
///
/// Bounds are signed so a region can be grown past the storage edge and
/// then checked with [`Region::within`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Region {
    lo: [i64; 3],
    hi: [i64; 3],
}

impl Region {
    /// Create a region from explicit bounds.
    pub const fn new(lo: [i64; 3], hi: [i64; 3]) -> Self {
        Self { lo, hi }
    }

    /// The whole storage of `shape`.
    pub fn full(shape: Shape) -> Self {
        Self::interior(shape, Halo::NONE)
    }

    /// The cells of `shape` not covered by `halo`.
    pub fn interior(shape: Shape, halo: Halo) -> Self {
        Self {
            lo: [halo.minus_x as i64, halo.minus_y as i64, 0],
            hi: [
                shape.nx as i64 - halo.plus_x as i64,
                shape.ny as i64 - halo.plus_y as i64,
                shape.nz as i64,
            ],
        }
    }

    /// Lower bounds (inclusive).
    pub fn lo(&self) -> [i64; 3] {
        self.lo
    }

    /// Upper bounds (exclusive).
    pub fn hi(&self) -> [i64; 3] {
        self.hi
    }

    /// Grow the region by an access range: every point `p + o` with `p` in
    /// `self` and `o` in `range`.
    pub fn expanded(&self, range: &AccessRange) -> Region {
        Region {
            lo: [
                self.lo[0] + i64::from(range.min_x),
                self.lo[1] + i64::from(range.min_y),
                self.lo[2] + i64::from(range.min_z),
            ],
            hi: [
                self.hi[0] + i64::from(range.max_x),
                self.hi[1] + i64::from(range.max_y),
                self.hi[2] + i64::from(range.max_z),
            ],
        }
    }

    /// Cells along each axis (zero for inverted bounds).
    pub fn extent(&self) -> [usize; 3] {
        let len = |axis: usize| (self.hi[axis] - self.lo[axis]).max(0) as usize;
        [len(0), len(1), len(2)]
    }

    /// Number of cells in the region.
    pub fn len(&self) -> usize {
        self.extent().iter().product()
    }

    /// Whether the region has no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `point` lies inside the region.
    pub fn contains(&self, point: Point) -> bool {
        (0..3).all(|axis| {
            let p = point[axis] as i64;
            p >= self.lo[axis] && p < self.hi[axis]
        })
    }

    /// Whether every cell of the region lies inside `shape`'s storage.
    /// An empty region is always within.
    pub fn within(&self, shape: Shape) -> bool {
        if self.is_empty() {
            return true;
        }
        let dims = shape.dims();
        (0..3).all(|axis| self.lo[axis] >= 0 && self.hi[axis] <= dims[axis] as i64)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}..{}, {}..{}, {}..{}]",
            self.lo[0], self.hi[0], self.lo[1], self.hi[1], self.lo[2], self.hi[2]
        )
    }
}
