//! Point-set iteration over grid regions.
//!
//! [`InteriorPoints`] walks a [`Region`] in storage order (`z` fastest).
//! It is lazy, finite, and restartable: cloning a fresh iterator or calling
//! [`InteriorPoints::restart`] yields the same sequence again.

use std::iter::FusedIterator;

use wendroff_core::{Halo, Point, Region};

use crate::grid::Grid;

/// The points of `grid` not covered by `halo`.
///
/// ```
/// use wendroff_core::{Halo, Shape};
/// use wendroff_grid::{get_interior_points, Grid};
///
/// let g = Grid::new(Shape::new(8, 8, 1));
/// let pts: Vec<_> = get_interior_points(&g, Halo::uniform(1)).collect();
/// assert_eq!(pts.len(), 36);
/// assert_eq!(pts[0], [1, 1, 0]);
/// assert_eq!(pts[35], [6, 6, 0]);
/// ```
pub fn get_interior_points(grid: &Grid, halo: Halo) -> InteriorPoints {
    InteriorPoints::new(&Region::interior(grid.shape(), halo))
}

/// Iterator over the points of a region.
///
/// Negative lower bounds are clamped to zero; inverted bounds give an
/// empty iterator.
#[derive(Clone, Debug)]
pub struct InteriorPoints {
    lo: Point,
    hi: Point,
    cursor: Point,
    remaining: usize,
}

impl InteriorPoints {
    /// Iterate over every point of `region`.
    pub fn new(region: &Region) -> Self {
        let rlo = region.lo();
        let rhi = region.hi();
        let mut lo = [0usize; 3];
        let mut hi = [0usize; 3];
        for axis in 0..3 {
            lo[axis] = rlo[axis].max(0) as usize;
            hi[axis] = (rhi[axis].max(0) as usize).max(lo[axis]);
        }
        let remaining = (0..3).map(|axis| hi[axis] - lo[axis]).product();
        Self {
            lo,
            hi,
            cursor: lo,
            remaining,
        }
    }

    /// Rewind to the first point.
    pub fn restart(&mut self) {
        self.cursor = self.lo;
        self.remaining = (0..3).map(|axis| self.hi[axis] - self.lo[axis]).product();
    }
}

impl Iterator for InteriorPoints {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.remaining == 0 {
            return None;
        }
        let point = self.cursor;
        self.remaining -= 1;
        self.cursor[2] += 1;
        if self.cursor[2] == self.hi[2] {
            self.cursor[2] = self.lo[2];
            self.cursor[1] += 1;
            if self.cursor[1] == self.hi[1] {
                self.cursor[1] = self.lo[1];
                self.cursor[0] += 1;
            }
        }
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for InteriorPoints {}

impl FusedIterator for InteriorPoints {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use wendroff_core::{AccessRange, Shape};

    #[test]
    fn walks_in_storage_order() {
        let region = Region::new([1, 0, 0], [3, 2, 2]);
        let pts: Vec<Point> = InteriorPoints::new(&region).collect();
        assert_eq!(
            pts,
            vec![
                [1, 0, 0],
                [1, 0, 1],
                [1, 1, 0],
                [1, 1, 1],
                [2, 0, 0],
                [2, 0, 1],
                [2, 1, 0],
                [2, 1, 1],
            ]
        );
    }

    #[test]
    fn restart_and_clone_replay_the_sequence() {
        let g = Grid::new(Shape::new(5, 4, 1));
        let mut it = get_interior_points(&g, Halo::uniform(1));
        let fresh = it.clone();
        let first: Vec<Point> = it.by_ref().collect();
        assert_eq!(it.next(), None);
        it.restart();
        let second: Vec<Point> = it.collect();
        let third: Vec<Point> = fresh.collect();
        assert_eq!(first, second);
        assert_eq!(first, third);
        assert_eq!(first.len(), 3 * 2);
    }

    #[test]
    fn negative_bounds_are_clamped() {
        let shape = Shape::new(4, 4, 1);
        let grown = Region::interior(shape, Halo::uniform(1)).expanded(&AccessRange::xy(-2, 0, 0, 0));
        let pts: Vec<Point> = InteriorPoints::new(&grown).collect();
        assert_eq!(pts.first(), Some(&[0, 1, 0]));
        assert_eq!(pts.len(), 3 * 2);
    }

    #[test]
    fn oversized_halo_yields_nothing() {
        let g = Grid::new(Shape::new(2, 2, 1));
        assert_eq!(get_interior_points(&g, Halo::uniform(2)).count(), 0);
    }

    proptest! {
        #[test]
        fn interior_size_is_domain_minus_halo(
            nx in 0usize..16, ny in 0usize..16, nz in 1usize..3,
            mx in 0usize..3, px in 0usize..3, my in 0usize..3, py in 0usize..3,
        ) {
            let g = Grid::new(Shape::new(nx, ny, nz));
            let halo = Halo::new(mx, px, my, py);
            let it = get_interior_points(&g, halo);
            let expected = nx.saturating_sub(mx + px) * ny.saturating_sub(my + py) * nz;
            prop_assert_eq!(it.len(), expected);
            let pts: Vec<Point> = it.collect();
            prop_assert_eq!(pts.len(), expected);
            for p in pts {
                prop_assert!(p[0] >= mx && p[0] < nx - px);
                prop_assert!(p[1] >= my && p[1] < ny - py);
            }
        }
    }
}
