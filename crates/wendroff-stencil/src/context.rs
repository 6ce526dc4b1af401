//! Per-point execution context handed to stage bodies.
//!
//! [`PointContext`] splits access the same way for every stage: reads go
//! to the grids as they were when the stage started, writes go to staging
//! buffers that are committed after every point has been evaluated. Point
//! evaluation order is therefore unobservable.

use wendroff_core::{AccessRange, Offset, ParamId, Point, Region, StageError};
use wendroff_grid::Grid;

use crate::stage::ParamSpec;

/// Offsets actually dereferenced through one parameter during a recorded
/// (dry) run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ParamTrace {
    pub(crate) range: Option<AccessRange>,
    pub(crate) off_centre: bool,
}

impl ParamTrace {
    pub(crate) fn record(&mut self, offset: Offset) {
        match &mut self.range {
            Some(range) => range.include(offset),
            None => self.range = Some(AccessRange::from_offset(offset)),
        }
        self.off_centre |= !offset.is_zero();
    }
}

/// Execution context for one point of one stage call.
///
/// Parameters are addressed by the [`ParamId`]s the stage builder handed
/// out. Reads are checked against the declared offsets; writes are only
/// ever at the current point.
pub struct PointContext<'a> {
    point: Point,
    params: &'a [ParamSpec],
    views: &'a [&'a Grid],
    staged: &'a mut [Option<Vec<f64>>],
    masked: &'a [bool],
    interior: Region,
    trace: Option<&'a mut [ParamTrace]>,
}

impl<'a> PointContext<'a> {
    /// Build a context. `views[i]` is the frozen grid for parameter `i`;
    /// `staged[i]` is its staging buffer if writable. Writes through a
    /// parameter with `masked[i]` set are dropped outside `interior`.
    pub(crate) fn new(
        params: &'a [ParamSpec],
        views: &'a [&'a Grid],
        staged: &'a mut [Option<Vec<f64>>],
        masked: &'a [bool],
        interior: Region,
        trace: Option<&'a mut [ParamTrace]>,
    ) -> Self {
        Self {
            point: [0; 3],
            params,
            views,
            staged,
            masked,
            interior,
            trace,
        }
    }

    pub(crate) fn set_point(&mut self, point: Point) {
        self.point = point;
    }

    /// The point being evaluated, in storage coordinates.
    pub fn point(&self) -> Point {
        self.point
    }

    fn spec(&self, param: ParamId) -> Result<&'a ParamSpec, StageError> {
        self.params
            .get(param.index())
            .ok_or(StageError::UnknownParam { param })
    }

    /// Value of `param` at `point + offset`, as of stage entry.
    ///
    /// Fails with [`StageError::UndeclaredAccess`] if the offset was not
    /// declared for the parameter, or [`StageError::NotReadable`] if the
    /// parameter is write-only. Neither check applies while recording a
    /// dry run.
    pub fn read(&mut self, param: ParamId, offset: Offset) -> Result<f64, StageError> {
        let spec = self.spec(param)?;
        match self.trace.as_deref_mut() {
            Some(trace) => trace[param.index()].record(offset),
            None => {
                if !spec.role().is_readable() {
                    return Err(StageError::NotReadable { param });
                }
                if !spec.offsets().contains(&offset) {
                    return Err(StageError::UndeclaredAccess { param, offset });
                }
            }
        }
        Ok(self.views[param.index()].at_offset(self.point, offset)?)
    }

    /// Shorthand for reading `param` at the current point.
    pub fn centre(&mut self, param: ParamId) -> Result<f64, StageError> {
        self.read(param, Offset::ZERO)
    }

    /// Stage `value` for `param` at the current point.
    ///
    /// The write becomes visible once the whole stage has run. Writes to
    /// caller-bound fields outside the domain interior are dropped.
    pub fn write(&mut self, param: ParamId, value: f64) -> Result<(), StageError> {
        let spec = self.spec(param)?;
        let i = param.index();
        if !spec.role().is_writable() {
            if self.trace.is_some() {
                return Ok(());
            }
            return Err(StageError::NotWritable { param });
        }
        if self.masked[i] && !self.interior.contains(self.point) {
            return Ok(());
        }
        let idx = self.views[i].resolve(self.point, Offset::ZERO)?;
        if let Some(buf) = self.staged[i].as_mut() {
            buf[idx] = value;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::Stage;
    use wendroff_core::{Halo, Shape};

    fn stage() -> (Stage, ParamId, ParamId, ParamId) {
        let mut b = Stage::builder("probe");
        let a = b.read("a", [Offset::xy(1, 0), Offset::ZERO]);
        let w = b.write("w");
        let rw = b.read_write("rw", [Offset::ZERO]);
        b.body(|_| Ok(()));
        (b.build().unwrap(), a, w, rw)
    }

    #[test]
    fn reads_are_checked_against_declarations() {
        let (stage, a, w, _) = stage();
        let shape = Shape::new(4, 4, 1);
        let grid = Grid::from_fn(shape, |[x, y, _]| (x * 10 + y) as f64);
        let views = [&grid, &grid, &grid];
        let mut staged = vec![None, Some(grid.as_slice().to_vec()), None];
        let masked = [false; 3];
        let mut ctx = PointContext::new(
            stage.params(),
            &views,
            &mut staged,
            &masked,
            Region::interior(shape, Halo::uniform(1)),
            None,
        );
        ctx.set_point([1, 2, 0]);

        assert_eq!(ctx.read(a, Offset::xy(1, 0)).unwrap(), 22.0);
        assert_eq!(ctx.centre(a).unwrap(), 12.0);
        assert_eq!(
            ctx.read(a, Offset::xy(0, 1)),
            Err(StageError::UndeclaredAccess {
                param: a,
                offset: Offset::xy(0, 1)
            })
        );
        assert_eq!(ctx.centre(w), Err(StageError::NotReadable { param: w }));
        assert_eq!(
            ctx.centre(ParamId(9)),
            Err(StageError::UnknownParam { param: ParamId(9) })
        );
    }

    #[test]
    fn writes_are_staged_not_visible() {
        let (stage, a, _, rw) = stage();
        let shape = Shape::new(4, 4, 1);
        let grid = Grid::filled(shape, 1.0);
        let views = [&grid, &grid, &grid];
        let mut staged = vec![None, None, Some(grid.as_slice().to_vec())];
        let masked = [false; 3];
        {
            let mut ctx = PointContext::new(
                stage.params(),
                &views,
                &mut staged,
                &masked,
                Region::interior(shape, Halo::uniform(1)),
                None,
            );
            ctx.set_point([2, 2, 0]);
            ctx.write(rw, 9.0).unwrap();
            assert_eq!(ctx.centre(rw).unwrap(), 1.0);
            assert_eq!(ctx.write(a, 0.0), Err(StageError::NotWritable { param: a }));
        }
        let buf = staged[2].as_ref().unwrap();
        assert_eq!(buf[shape.linear_index([2, 2, 0]).unwrap()], 9.0);
    }

    #[test]
    fn masked_writes_outside_interior_are_dropped() {
        let (stage, _, w, _) = stage();
        let shape = Shape::new(4, 4, 1);
        let grid = Grid::new(shape);
        let views = [&grid, &grid, &grid];
        let mut staged = vec![None, Some(grid.as_slice().to_vec()), None];
        let masked = [false, true, false];
        {
            let mut ctx = PointContext::new(
                stage.params(),
                &views,
                &mut staged,
                &masked,
                Region::interior(shape, Halo::uniform(1)),
                None,
            );
            ctx.set_point([0, 1, 0]);
            ctx.write(w, 5.0).unwrap();
            ctx.set_point([1, 1, 0]);
            ctx.write(w, 6.0).unwrap();
        }
        let buf = staged[1].as_ref().unwrap();
        assert_eq!(buf[shape.linear_index([0, 1, 0]).unwrap()], 0.0);
        assert_eq!(buf[shape.linear_index([1, 1, 0]).unwrap()], 6.0);
    }

    #[test]
    fn recording_skips_declaration_checks() {
        let (stage, a, w, _) = stage();
        let shape = Shape::new(4, 4, 1);
        let grid = Grid::new(shape);
        let views = [&grid, &grid, &grid];
        let mut staged = vec![None, None, None];
        let masked = [false; 3];
        let mut trace = vec![ParamTrace::default(); 3];
        {
            let mut ctx = PointContext::new(
                stage.params(),
                &views,
                &mut staged,
                &masked,
                Region::interior(shape, Halo::uniform(1)),
                Some(trace.as_mut_slice()),
            );
            ctx.set_point([1, 1, 0]);
            ctx.read(a, Offset::xy(-1, 1)).unwrap();
            ctx.centre(w).unwrap();
            ctx.write(a, 1.0).unwrap();
        }
        assert_eq!(trace[0].range, Some(AccessRange::xy(-1, -1, 1, 1)));
        assert!(trace[0].off_centre);
        assert_eq!(trace[1].range, Some(AccessRange::ZERO));
        assert!(!trace[1].off_centre);
        assert_eq!(trace[2], ParamTrace::default());
    }
}
