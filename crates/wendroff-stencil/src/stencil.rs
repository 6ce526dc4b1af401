//! Stencil assembly and the per-timestep scheduler.
//!
//! [`StencilBuilder::build`] validates the stage-call sequence once and
//! precomputes, per call, the region it evaluates. [`Stencil::run`] then
//! executes one timestep against caller-bound grids with no further
//! structural checks in the hot path.
//!
//! # Compute regions
//!
//! Writes to caller-bound parameter fields are confined to the domain
//! interior. Writes to scratch fields cover the interior grown by the
//! call's compute extent: everything later consumers will read through
//! their declared offsets. Extents are computed backwards from the last
//! call, so a chain of scratch producers widens as it goes upstream.

use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::{debug, trace, warn};
use wendroff_core::{
    AccessRange, FieldName, Halo, Point, Region, RunError, Shape, StageError,
};
use wendroff_grid::{Grid, InteriorPoints};

use crate::analysis::{AccessRanges, DependencyGraph, RangeMismatch};
use crate::boundary::{apply_boundary, validate_reflective, Boundary, BoundaryError, FieldRole};
use crate::context::{ParamTrace, PointContext};
use crate::error::ConfigError;
use crate::stage::{ParamSpec, Stage};
use crate::staging::StagingPool;

// ── Fields ─────────────────────────────────────────────────────────

/// Whether a field is bound by the caller or owned by the stencil.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Bound to a caller grid at every run.
    Param,
    /// Owned by the stencil and persisted between runs.
    Scratch,
}

// ── Stage calls ────────────────────────────────────────────────────

/// A stage bound positionally to actual fields, with its precomputed
/// compute region.
#[derive(Clone, Debug)]
pub struct StageCall {
    stage: Stage,
    actuals: Vec<FieldName>,
    pub(crate) slots: Vec<usize>,
    pub(crate) masked: Vec<bool>,
    extent: AccessRange,
    region: Region,
}

impl StageCall {
    /// The stage being called.
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Actual field bound to each formal parameter, in order.
    pub fn actuals(&self) -> &[FieldName] {
        &self.actuals
    }

    /// How far past the interior this call evaluates.
    pub fn extent(&self) -> AccessRange {
        self.extent
    }

    /// The points this call evaluates.
    pub fn region(&self) -> Region {
        self.region
    }

    pub(crate) fn writes(&self, slot: usize) -> bool {
        self.stage
            .params()
            .iter()
            .zip(&self.slots)
            .any(|(p, &s)| s == slot && p.role().is_writable())
    }

    pub(crate) fn reads(&self) -> impl Iterator<Item = (usize, &ParamSpec)> + '_ {
        self.stage
            .params()
            .iter()
            .zip(&self.slots)
            .filter(|(p, _)| p.role().is_readable())
            .map(|(p, &s)| (s, p))
    }
}

/// Evaluate one call over its region and commit its writes.
///
/// On failure every staged write is discarded and the failing point is
/// returned alongside the error.
pub(crate) fn execute_call(
    call: &StageCall,
    grids: &mut [&mut Grid],
    pool: &mut StagingPool,
    interior: Region,
    trace: Option<&mut [ParamTrace]>,
) -> Result<(), (Point, StageError)> {
    let params = call.stage.params();
    let mut staged: SmallVec<[Option<Vec<f64>>; 16]> = params
        .iter()
        .zip(&call.slots)
        .map(|(p, &s)| {
            p.role()
                .is_writable()
                .then(|| pool.take_seeded(grids[s].as_slice()))
        })
        .collect();

    let outcome = {
        let views: SmallVec<[&Grid; 16]> = call.slots.iter().map(|&s| &*grids[s]).collect();
        let mut ctx = PointContext::new(params, &views, &mut staged, &call.masked, interior, trace);
        let mut outcome = Ok(());
        for point in InteriorPoints::new(&call.region) {
            ctx.set_point(point);
            if let Err(e) = call.stage.eval(&mut ctx) {
                outcome = Err((point, e));
                break;
            }
        }
        outcome
    };

    match outcome {
        Ok(()) => {
            for (buf, &s) in staged.into_iter().zip(&call.slots) {
                if let Some(buf) = buf {
                    grids[s].as_mut_slice().copy_from_slice(&buf);
                    pool.give_back(buf);
                }
            }
            Ok(())
        }
        Err(failure) => {
            for buf in staged.into_iter().flatten() {
                pool.give_back(buf);
            }
            Err(failure)
        }
    }
}

// ── Bindings ───────────────────────────────────────────────────────

/// Caller grids bound to parameter names for one run.
///
/// ```
/// use wendroff_core::Shape;
/// use wendroff_grid::Grid;
/// use wendroff_stencil::Bindings;
///
/// let shape = Shape::new(4, 4, 1);
/// let (mut a, mut b) = (Grid::new(shape), Grid::new(shape));
/// let mut bindings = Bindings::new();
/// bindings.bind("in", &mut a).bind("out", &mut b);
/// assert_eq!(bindings.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct Bindings<'g> {
    grids: IndexMap<FieldName, &'g mut Grid>,
    duplicate: Option<FieldName>,
}

impl<'g> Bindings<'g> {
    /// No bindings.
    pub fn new() -> Self {
        Self {
            grids: IndexMap::new(),
            duplicate: None,
        }
    }

    /// Bind `grid` to the parameter `name`.
    ///
    /// Binding a name twice keeps the first grid and makes the next
    /// [`Stencil::run`] fail with [`RunError::DuplicateBinding`].
    pub fn bind(&mut self, name: impl Into<FieldName>, grid: &'g mut Grid) -> &mut Self {
        let name = name.into();
        if self.grids.contains_key(&name) {
            self.duplicate.get_or_insert(name);
        } else {
            self.grids.insert(name, grid);
        }
        self
    }

    /// Owned-builder form of [`bind`](Self::bind).
    pub fn with(mut self, name: impl Into<FieldName>, grid: &'g mut Grid) -> Self {
        self.bind(name, grid);
        self
    }

    /// The grid bound to `name`.
    pub fn get(&self, name: &str) -> Option<&Grid> {
        self.grids.get(name).map(|g| &**g)
    }

    /// Number of bound parameters.
    pub fn len(&self) -> usize {
        self.grids.len()
    }

    /// Whether nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }
}

// ── Builder ────────────────────────────────────────────────────────

/// Builder for [`Stencil`].
///
/// Parameters are declared before scratch fields; field order is
/// declaration order. Stage calls run in the order they are added.
#[derive(Debug)]
pub struct StencilBuilder {
    name: String,
    domain: Shape,
    halo: Halo,
    params: Vec<FieldName>,
    scratch: Vec<FieldName>,
    calls: Vec<(Stage, Vec<FieldName>)>,
    boundary: Boundary,
}

impl StencilBuilder {
    /// Start a stencil over grids of shape `domain`.
    pub fn new(name: impl Into<String>, domain: Shape) -> Self {
        Self {
            name: name.into(),
            domain,
            halo: Halo::NONE,
            params: Vec::new(),
            scratch: Vec::new(),
            calls: Vec::new(),
            boundary: Boundary::None,
        }
    }

    /// Halo width per side. Defaults to [`Halo::NONE`].
    pub fn halo(mut self, halo: Halo) -> Self {
        self.halo = halo;
        self
    }

    /// Declare a caller-bound parameter field.
    pub fn param(mut self, name: impl Into<FieldName>) -> Self {
        self.params.push(name.into());
        self
    }

    /// Declare several parameter fields at once.
    pub fn params<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<FieldName>,
    {
        self.params.extend(names.into_iter().map(Into::into));
        self
    }

    /// Declare a stencil-owned scratch field.
    pub fn scratch(mut self, name: impl Into<FieldName>) -> Self {
        self.scratch.push(name.into());
        self
    }

    /// Append a call of `stage`, binding its formals to `actuals` by
    /// position.
    pub fn call<I, N>(mut self, stage: &Stage, actuals: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<FieldName>,
    {
        self.calls
            .push((stage.clone(), actuals.into_iter().map(Into::into).collect()));
        self
    }

    /// Boundary policy applied after the last call.
    pub fn boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    /// Validate the declaration and assemble the stencil.
    pub fn build(self) -> Result<Stencil, ConfigError> {
        let Self {
            name,
            domain,
            halo,
            params,
            scratch,
            calls,
            boundary,
        } = self;

        if domain.is_empty() {
            return Err(ConfigError::EmptyDomain {
                stencil: name,
                domain,
            });
        }
        if !halo.fits(domain) {
            return Err(ConfigError::HaloTooWide { halo, domain });
        }
        if calls.is_empty() {
            return Err(ConfigError::EmptyStencil { stencil: name });
        }

        let mut fields: IndexMap<FieldName, FieldKind> = IndexMap::new();
        for (field, kind) in params
            .into_iter()
            .map(|f| (f, FieldKind::Param))
            .chain(scratch.into_iter().map(|f| (f, FieldKind::Scratch)))
        {
            if fields.contains_key(&field) {
                return Err(ConfigError::DuplicateField { name: field });
            }
            fields.insert(field, kind);
        }
        let num_params = fields
            .values()
            .filter(|&&k| k == FieldKind::Param)
            .count();

        let mut resolved = Vec::with_capacity(calls.len());
        for (stage, actuals) in calls {
            resolved.push(resolve_call(stage, actuals, &fields, num_params)?);
        }

        check_forward_references(&resolved, num_params, &fields)?;
        assign_extents(&mut resolved, num_params);

        let interior = Region::interior(domain, halo);
        for call in &mut resolved {
            call.region = interior.expanded(&call.extent);
            for (slot, spec) in call.reads() {
                for &offset in spec.offsets() {
                    let reach = call.region.expanded(&AccessRange::from_offset(offset));
                    if !reach.within(domain) {
                        return Err(ConfigError::OffsetOutsideStorage {
                            stage: call.stage.name().to_owned(),
                            field: field_name(&fields, slot),
                            offset,
                            domain,
                        });
                    }
                }
            }
        }

        let boundary_slots = resolve_boundary(&boundary, &fields, num_params)?;
        if matches!(boundary, Boundary::Reflective(_)) {
            validate_reflective(domain, halo)?;
        }

        let scratch = (num_params..fields.len())
            .map(|_| Grid::new(domain))
            .collect();

        debug!(
            stencil = %name,
            domain = %domain,
            halo = %halo,
            calls = resolved.len(),
            params = num_params,
            scratch = fields.len() - num_params,
            "built stencil"
        );
        for (k, call) in resolved.iter().enumerate() {
            debug!(
                stencil = %name,
                call = k,
                stage = call.stage.name(),
                extent = %call.extent,
                region = %call.region,
                "scheduled stage call"
            );
        }

        Ok(Stencil {
            name,
            domain,
            halo,
            interior,
            fields,
            num_params,
            scratch,
            calls: resolved,
            boundary,
            boundary_slots,
            pool: StagingPool::new(),
        })
    }
}

fn field_name(fields: &IndexMap<FieldName, FieldKind>, slot: usize) -> FieldName {
    fields
        .get_index(slot)
        .map(|(name, _)| name.clone())
        .unwrap_or_else(|| FieldName::from(format!("#{slot}")))
}

fn resolve_call(
    stage: Stage,
    actuals: Vec<FieldName>,
    fields: &IndexMap<FieldName, FieldKind>,
    num_params: usize,
) -> Result<StageCall, ConfigError> {
    if actuals.len() != stage.arity() {
        return Err(ConfigError::ArityMismatch {
            stage: stage.name().to_owned(),
            expected: stage.arity(),
            actual: actuals.len(),
        });
    }
    let mut slots = Vec::with_capacity(actuals.len());
    for actual in &actuals {
        let slot = fields
            .get_index_of(actual)
            .ok_or_else(|| ConfigError::UnknownField {
                user: stage.name().to_owned(),
                name: actual.clone(),
            })?;
        slots.push(slot);
    }

    let params = stage.params();
    for a in 0..params.len() {
        for b in (a + 1)..params.len() {
            let (pa, pb) = (&params[a], &params[b]);
            if slots[a] == slots[b] && pa.role().is_writable() && pb.role().is_writable() {
                return Err(ConfigError::AliasedWrite {
                    stage: stage.name().to_owned(),
                    field: actuals[a].clone(),
                    first: pa.name().clone(),
                    second: pb.name().clone(),
                });
            }
            if slots[a] == slots[b]
                && pa.role().is_readable()
                && pb.role().is_readable()
                && !pa.same_offsets(pb)
            {
                return Err(ConfigError::RangeConflict {
                    stage: stage.name().to_owned(),
                    field: actuals[a].clone(),
                    first: pa.name().clone(),
                    second: pb.name().clone(),
                });
            }
        }
    }

    let masked = params
        .iter()
        .zip(&slots)
        .map(|(p, &s)| p.role().is_writable() && s < num_params)
        .collect();

    Ok(StageCall {
        stage,
        actuals,
        slots,
        masked,
        extent: AccessRange::ZERO,
        region: Region::new([0; 3], [0; 3]),
    })
}

fn check_forward_references(
    calls: &[StageCall],
    num_params: usize,
    fields: &IndexMap<FieldName, FieldKind>,
) -> Result<(), ConfigError> {
    let mut written = vec![false; fields.len()];
    for (k, call) in calls.iter().enumerate() {
        for (slot, _) in call.reads() {
            if slot >= num_params && !written[slot] {
                return Err(ConfigError::ForwardReference {
                    stage: call.stage.name().to_owned(),
                    call: k,
                    field: field_name(fields, slot),
                });
            }
        }
        for (spec, &slot) in call.stage.params().iter().zip(&call.slots) {
            if spec.role().is_writable() {
                written[slot] = true;
            }
        }
    }
    Ok(())
}

/// Propagate scratch read requirements backwards to their producers.
fn assign_extents(calls: &mut [StageCall], num_params: usize) {
    for k in (0..calls.len()).rev() {
        let demands: Vec<(usize, AccessRange)> = calls[k]
            .reads()
            .filter(|(slot, _)| *slot >= num_params)
            .filter_map(|(slot, spec)| {
                spec.declared_range()
                    .map(|range| (slot, calls[k].extent.grow(range)))
            })
            .collect();
        for (slot, need) in demands {
            if let Some(j) = (0..k).rev().find(|&j| calls[j].writes(slot)) {
                calls[j].extent = calls[j].extent.union(need);
            }
        }
    }
}

fn resolve_boundary(
    boundary: &Boundary,
    fields: &IndexMap<FieldName, FieldKind>,
    num_params: usize,
) -> Result<Vec<(usize, FieldRole)>, ConfigError> {
    let mut slots: Vec<(usize, FieldRole)> = Vec::new();
    for (name, role) in boundary.fields() {
        let slot = match fields.get_index_of(name) {
            Some(slot) if slot < num_params => slot,
            Some(_) => {
                return Err(BoundaryError::NotAParam { name: name.clone() }.into());
            }
            None => {
                return Err(ConfigError::UnknownField {
                    user: "boundary".to_owned(),
                    name: name.clone(),
                });
            }
        };
        if slots.iter().any(|&(s, _)| s == slot) {
            return Err(BoundaryError::DuplicateField { name: name.clone() }.into());
        }
        slots.push((slot, *role));
    }
    Ok(slots)
}

// ── Stencil ────────────────────────────────────────────────────────

/// A validated multi-stage stencil.
///
/// Owns its scratch grids and staging buffers; everything else is bound
/// per [`run`](Self::run).
#[derive(Debug)]
pub struct Stencil {
    name: String,
    domain: Shape,
    halo: Halo,
    interior: Region,
    fields: IndexMap<FieldName, FieldKind>,
    num_params: usize,
    scratch: Vec<Grid>,
    calls: Vec<StageCall>,
    boundary: Boundary,
    boundary_slots: Vec<(usize, FieldRole)>,
    pool: StagingPool,
}

impl Stencil {
    /// Stencil name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shape every bound grid must have.
    pub fn domain(&self) -> Shape {
        self.domain
    }

    /// Halo width per side.
    pub fn halo(&self) -> Halo {
        self.halo
    }

    /// The points parameter writes are confined to.
    pub fn interior(&self) -> Region {
        self.interior
    }

    /// Stage calls in execution order.
    pub fn calls(&self) -> &[StageCall] {
        &self.calls
    }

    /// The boundary policy.
    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    /// Every field with its kind, parameters first.
    pub fn fields(&self) -> impl Iterator<Item = (&FieldName, FieldKind)> + '_ {
        self.fields.iter().map(|(n, &k)| (n, k))
    }

    /// Names of the caller-bound parameters.
    pub fn param_names(&self) -> impl Iterator<Item = &FieldName> + '_ {
        self.fields.keys().take(self.num_params)
    }

    /// Kind of the field called `name`.
    pub fn field_kind(&self, name: &str) -> Option<FieldKind> {
        self.fields.get(name).copied()
    }

    /// Current contents of a scratch field.
    pub fn scratch(&self, name: &str) -> Option<&Grid> {
        let slot = self.fields.get_index_of(name)?;
        slot.checked_sub(self.num_params)
            .and_then(|i| self.scratch.get(i))
    }

    pub(crate) fn slot_name(&self, slot: usize) -> FieldName {
        field_name(&self.fields, slot)
    }

    pub(crate) fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Per-field access ranges from the declared offsets.
    pub fn access_ranges(&self) -> AccessRanges {
        AccessRanges::from_declarations(self)
    }

    /// Producer/consumer edges between stage calls.
    pub fn dependencies(&self) -> DependencyGraph {
        DependencyGraph::build(self)
    }

    /// Compare declared access ranges with those observed in a dry run,
    /// logging every disagreement.
    pub fn audit_ranges(&self) -> Result<Vec<RangeMismatch>, RunError> {
        let declared = AccessRanges::from_declarations(self);
        let observed = AccessRanges::from_dry_run(self)?;
        let mismatches = declared.diff(&observed);
        for m in &mismatches {
            warn!(
                stencil = %self.name,
                field = %m.field,
                declared = ?m.left,
                observed = ?m.right,
                "declared and observed access ranges disagree"
            );
        }
        Ok(mismatches)
    }

    /// Execute one timestep.
    ///
    /// Bindings are checked before any grid is touched. A failing stage
    /// leaves earlier stages' writes committed and discards its own.
    pub fn run(&mut self, bindings: &mut Bindings<'_>) -> Result<(), RunError> {
        if let Some(name) = &bindings.duplicate {
            return Err(RunError::DuplicateBinding { name: name.clone() });
        }
        let mut bound: Vec<Option<&mut Grid>> = (0..self.num_params).map(|_| None).collect();
        for (name, grid) in bindings.grids.iter_mut() {
            let slot = match self.fields.get_index_of(name) {
                Some(slot) if slot < self.num_params => slot,
                _ => {
                    return Err(RunError::UnknownBinding {
                        stencil: self.name.clone(),
                        name: name.clone(),
                    })
                }
            };
            if grid.shape() != self.domain {
                return Err(RunError::BindingShape {
                    name: name.clone(),
                    expected: self.domain,
                    actual: grid.shape(),
                });
            }
            bound[slot] = Some(&mut **grid);
        }

        let mut grids: Vec<&mut Grid> = Vec::with_capacity(self.fields.len());
        for (slot, grid) in bound.into_iter().enumerate() {
            match grid {
                Some(grid) => grids.push(grid),
                None => {
                    return Err(RunError::UnboundParam {
                        name: field_name(&self.fields, slot),
                    })
                }
            }
        }
        grids.extend(self.scratch.iter_mut());

        for (k, call) in self.calls.iter().enumerate() {
            trace!(
                stencil = %self.name,
                call = k,
                stage = call.stage.name(),
                points = call.region.len(),
                "running stage call"
            );
            execute_call(call, &mut grids, &mut self.pool, self.interior, None).map_err(
                |(point, source)| RunError::Stage {
                    stage: call.stage.name().to_owned(),
                    point,
                    source,
                },
            )?;
        }
        trace!(
            stencil = %self.name,
            buffers = self.pool.pooled(),
            slots = self.pool.capacity(),
            "staging pool after calls"
        );

        if !self.boundary_slots.is_empty() {
            let mut patched: Vec<(FieldRole, &mut Grid)> =
                Vec::with_capacity(self.boundary_slots.len());
            for (slot, grid) in grids.iter_mut().enumerate() {
                if let Some(&(_, role)) = self.boundary_slots.iter().find(|(s, _)| *s == slot) {
                    patched.push((role, &mut **grid));
                }
            }
            apply_boundary(&self.boundary, &mut patched, self.halo).map_err(|e| {
                RunError::Boundary {
                    reason: e.to_string(),
                }
            })?;
        }
        Ok(())
    }
}
