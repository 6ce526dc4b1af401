//! Access-range and dependency analysis over a built stencil.
//!
//! Two strategies compute per-field access ranges:
//!
//! - [`AccessRanges::from_declarations`] scans the offsets each stage call
//!   declares. Cheap and deterministic; this is what
//!   [`Stencil::access_ranges`] returns.
//! - [`AccessRanges::from_dry_run`] executes every call against
//!   zero-filled shadow grids with declaration checks off, recording the
//!   offsets the bodies actually dereference.
//!
//! Both report `Some(range)` for a field read at least once off-centre
//! (the range always covers the centre) and `None` for fields that are
//! only written or only read at the centre.

use indexmap::IndexMap;
use wendroff_core::{AccessRange, FieldName, RunError};
use wendroff_grid::Grid;

use crate::context::ParamTrace;
use crate::stencil::{execute_call, Stencil};
use crate::staging::StagingPool;

// ── Access ranges ──────────────────────────────────────────────────

/// Per-field access ranges for one stencil, in field declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessRanges {
    ranges: IndexMap<FieldName, Option<AccessRange>>,
}

/// A field on which two range analyses disagree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RangeMismatch {
    /// The field.
    pub field: FieldName,
    /// Range on the left-hand side of the comparison.
    pub left: Option<AccessRange>,
    /// Range on the right-hand side of the comparison.
    pub right: Option<AccessRange>,
}

impl AccessRanges {
    fn from_traces(stencil: &Stencil, traces: Vec<ParamTrace>) -> Self {
        let ranges = traces
            .into_iter()
            .enumerate()
            .map(|(slot, t)| {
                let range = match t.range {
                    Some(range) if t.off_centre => Some(range.union(AccessRange::ZERO)),
                    _ => None,
                };
                (stencil.slot_name(slot), range)
            })
            .collect();
        Self { ranges }
    }

    /// Ranges from the offsets each stage call declares.
    pub fn from_declarations(stencil: &Stencil) -> Self {
        let mut traces = vec![ParamTrace::default(); stencil.field_count()];
        for call in stencil.calls() {
            for (slot, spec) in call.reads() {
                for &offset in spec.offsets() {
                    traces[slot].record(offset);
                }
            }
        }
        Self::from_traces(stencil, traces)
    }

    /// Ranges observed by running every stage call once on zero-filled
    /// shadow grids. The stencil's own scratch fields are not touched.
    ///
    /// Fails if a body returns an error, for instance because an
    /// undeclared offset reaches outside storage.
    pub fn from_dry_run(stencil: &Stencil) -> Result<Self, RunError> {
        let n = stencil.field_count();
        let mut shadows: Vec<Grid> = (0..n).map(|_| Grid::new(stencil.domain())).collect();
        let mut grids: Vec<&mut Grid> = shadows.iter_mut().collect();
        let mut pool = StagingPool::new();
        let mut traces = vec![ParamTrace::default(); n];

        for call in stencil.calls() {
            let mut call_trace = vec![ParamTrace::default(); call.stage().arity()];
            execute_call(
                call,
                &mut grids,
                &mut pool,
                stencil.interior(),
                Some(call_trace.as_mut_slice()),
            )
            .map_err(|(point, source)| RunError::Stage {
                stage: call.stage().name().to_owned(),
                point,
                source,
            })?;
            for (t, &slot) in call_trace.iter().zip(&call.slots) {
                let merged = &mut traces[slot];
                if let Some(range) = t.range {
                    merged.range = Some(merged.range.map_or(range, |r| r.union(range)));
                }
                merged.off_centre |= t.off_centre;
            }
        }
        Ok(Self::from_traces(stencil, traces))
    }

    /// Range of `field`, or `None` if it is unbounded or unknown.
    pub fn get(&self, field: &str) -> Option<AccessRange> {
        self.ranges.get(field).copied().flatten()
    }

    /// Whether `field` belongs to the analysed stencil.
    pub fn contains(&self, field: &str) -> bool {
        self.ranges.contains_key(field)
    }

    /// All fields with their ranges.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, Option<AccessRange>)> + '_ {
        self.ranges.iter().map(|(k, &v)| (k, v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Whether there are no fields.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Fields whose ranges differ between `self` and `other`. Fields
    /// missing on one side compare as `None`.
    pub fn diff(&self, other: &AccessRanges) -> Vec<RangeMismatch> {
        let mut out = Vec::new();
        let names = self
            .ranges
            .keys()
            .chain(other.ranges.keys().filter(|k| !self.ranges.contains_key(*k)));
        for name in names {
            let left = self.get(name.as_str());
            let right = other.get(name.as_str());
            if left != right {
                out.push(RangeMismatch {
                    field: name.clone(),
                    left,
                    right,
                });
            }
        }
        out
    }
}

// ── Dependencies ───────────────────────────────────────────────────

/// A read-after-write edge between two stage calls.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Dependency {
    /// Index of the call that wrote the field.
    pub producer: usize,
    /// Index of the call that reads it.
    pub consumer: usize,
    /// The field carried along the edge.
    pub field: FieldName,
}

/// Producer/consumer graph over the stage calls of a stencil.
///
/// For every field a call reads, the edge comes from the most recent
/// earlier call writing that field. Fields nobody wrote earlier in the
/// timestep (caller inputs) contribute no edge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DependencyGraph {
    stages: Vec<String>,
    edges: Vec<Dependency>,
}

impl DependencyGraph {
    /// Derive the graph from a stencil's call sequence.
    pub fn build(stencil: &Stencil) -> Self {
        let calls = stencil.calls();
        let mut edges: Vec<Dependency> = Vec::new();
        for (k, call) in calls.iter().enumerate() {
            for (slot, _) in call.reads() {
                let Some(j) = (0..k).rev().find(|&j| calls[j].writes(slot)) else {
                    continue;
                };
                let dep = Dependency {
                    producer: j,
                    consumer: k,
                    field: stencil.slot_name(slot),
                };
                if !edges.contains(&dep) {
                    edges.push(dep);
                }
            }
        }
        Self {
            stages: calls.iter().map(|c| c.stage().name().to_owned()).collect(),
            edges,
        }
    }

    /// Number of stage calls (nodes).
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage name of node `call`.
    pub fn stage_name(&self, call: usize) -> Option<&str> {
        self.stages.get(call).map(String::as_str)
    }

    /// All edges, grouped by consumer in call order.
    pub fn edges(&self) -> &[Dependency] {
        &self.edges
    }

    /// Calls that `call` depends on, ascending.
    pub fn producers_of(&self, call: usize) -> Vec<usize> {
        let mut out: Vec<usize> = self
            .edges
            .iter()
            .filter(|e| e.consumer == call)
            .map(|e| e.producer)
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Calls that depend on `call`, ascending.
    pub fn consumers_of(&self, call: usize) -> Vec<usize> {
        let mut out: Vec<usize> = self
            .edges
            .iter()
            .filter(|e| e.producer == call)
            .map(|e| e.consumer)
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// A topological order of the calls, preferring lower indices, or
    /// `None` if the graph has a cycle.
    pub fn topological_order(&self) -> Option<Vec<usize>> {
        let n = self.stages.len();
        let mut indegree = vec![0usize; n];
        for (consumer, producers) in (0..n).map(|c| (c, self.producers_of(c))) {
            indegree[consumer] = producers.len();
        }
        let mut ready: std::collections::BTreeSet<usize> =
            (0..n).filter(|&c| indegree[c] == 0).collect();
        let mut order = Vec::with_capacity(n);
        while let Some(next) = ready.pop_first() {
            order.push(next);
            for consumer in self.consumers_of(next) {
                indegree[consumer] -= 1;
                if indegree[consumer] == 0 {
                    ready.insert(consumer);
                }
            }
        }
        (order.len() == n).then_some(order)
    }

    /// Whether the graph has no cycle.
    pub fn is_acyclic(&self) -> bool {
        self.topological_order().is_some()
    }

    /// Whether every edge points from an earlier call to a later one.
    pub fn edges_point_forward(&self) -> bool {
        self.edges.iter().all(|e| e.producer < e.consumer)
    }
}
