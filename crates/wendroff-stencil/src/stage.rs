//! Stage declaration: an elementwise update rule with typed parameters.
//!
//! A [`Stage`] has a fixed, ordered parameter list. Each parameter carries
//! a formal name, a [`ParamRole`], and for readable roles the neighbour
//! offsets the body is allowed to dereference. The body closure captures
//! any scalar coefficients at construction.
//!
//! Stages are immutable once built and cheap to clone; one stage may be
//! called several times in a stencil with different actual fields.

use std::fmt;
use std::sync::Arc;

use wendroff_core::{AccessRange, FieldName, Offset, OffsetList, ParamId, StageError};

use crate::context::PointContext;
use crate::error::ConfigError;

/// How a stage uses one of its parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamRole {
    /// Read at declared offsets, never written.
    Read,
    /// Written at the current point, never read.
    Write,
    /// Read at declared offsets and written at the current point.
    ReadWrite,
}

impl ParamRole {
    /// Whether the body may read this parameter.
    pub fn is_readable(self) -> bool {
        matches!(self, Self::Read | Self::ReadWrite)
    }

    /// Whether the body may write this parameter.
    pub fn is_writable(self) -> bool {
        matches!(self, Self::Write | Self::ReadWrite)
    }
}

/// One formal parameter of a stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamSpec {
    name: FieldName,
    role: ParamRole,
    offsets: OffsetList,
}

impl ParamSpec {
    /// Formal name.
    pub fn name(&self) -> &FieldName {
        &self.name
    }

    /// Read/write role.
    pub fn role(&self) -> ParamRole {
        self.role
    }

    /// Declared read offsets, in declaration order. Empty for write-only
    /// parameters.
    pub fn offsets(&self) -> &[Offset] {
        &self.offsets
    }

    /// Bounding box of the declared offsets, `None` for write-only
    /// parameters.
    pub fn declared_range(&self) -> Option<AccessRange> {
        AccessRange::from_offsets(self.offsets.iter().copied())
    }

    /// Whether the two parameters read the same set of offsets.
    pub(crate) fn same_offsets(&self, other: &ParamSpec) -> bool {
        let mut a: Vec<Offset> = self.offsets.to_vec();
        let mut b: Vec<Offset> = other.offsets.to_vec();
        a.sort_unstable();
        a.dedup();
        b.sort_unstable();
        b.dedup();
        a == b
    }
}

/// Signature of a stage body.
pub type StageBody = dyn Fn(&mut PointContext<'_>) -> Result<(), StageError> + Send + Sync;

struct StageInner {
    name: String,
    params: Vec<ParamSpec>,
    body: Box<StageBody>,
}

/// A named, immutable update rule.
///
/// # Examples
///
/// ```
/// use wendroff_core::Offset;
/// use wendroff_stencil::Stage;
///
/// let mut b = Stage::builder("laplacian");
/// let out = b.write("out");
/// let inp = b.read("in", [Offset::xy(1, 0), Offset::xy(-1, 0), Offset::ZERO]);
/// b.body(move |ctx| {
///     let lap = ctx.read(inp, Offset::xy(1, 0))? + ctx.read(inp, Offset::xy(-1, 0))?
///         - 2.0 * ctx.read(inp, Offset::ZERO)?;
///     ctx.write(out, lap)
/// });
/// let stage = b.build().unwrap();
/// assert_eq!(stage.arity(), 2);
/// ```
#[derive(Clone)]
pub struct Stage {
    inner: Arc<StageInner>,
}

impl Stage {
    /// Start declaring a stage.
    pub fn builder(name: impl Into<String>) -> StageBuilder {
        StageBuilder {
            name: name.into(),
            params: Vec::new(),
            body: None,
        }
    }

    /// Stage name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Ordered parameter list.
    pub fn params(&self) -> &[ParamSpec] {
        &self.inner.params
    }

    /// Number of parameters.
    pub fn arity(&self) -> usize {
        self.inner.params.len()
    }

    /// Look up a parameter by id.
    pub fn param(&self, id: ParamId) -> Option<&ParamSpec> {
        self.inner.params.get(id.index())
    }

    /// Look up a parameter id by formal name.
    pub fn param_id(&self, name: &str) -> Option<ParamId> {
        self.inner
            .params
            .iter()
            .position(|p| p.name.as_str() == name)
            .map(|i| ParamId(i as u32))
    }

    /// Evaluate the body at the context's current point.
    pub(crate) fn eval(&self, ctx: &mut PointContext<'_>) -> Result<(), StageError> {
        (self.inner.body)(ctx)
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("name", &self.inner.name)
            .field("params", &self.inner.params)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Stage`].
///
/// Parameter declarations hand back the [`ParamId`] the body uses to
/// address that parameter. Validation is deferred to [`build`](Self::build).
pub struct StageBuilder {
    name: String,
    params: Vec<ParamSpec>,
    body: Option<Box<StageBody>>,
}

impl StageBuilder {
    fn declare(&mut self, name: FieldName, role: ParamRole, offsets: OffsetList) -> ParamId {
        let id = ParamId(self.params.len() as u32);
        self.params.push(ParamSpec {
            name,
            role,
            offsets,
        });
        id
    }

    /// Declare a read-only parameter read at `offsets`.
    pub fn read(
        &mut self,
        name: impl Into<FieldName>,
        offsets: impl IntoIterator<Item = Offset>,
    ) -> ParamId {
        self.declare(name.into(), ParamRole::Read, offsets.into_iter().collect())
    }

    /// Declare a write-only parameter.
    pub fn write(&mut self, name: impl Into<FieldName>) -> ParamId {
        self.declare(name.into(), ParamRole::Write, OffsetList::new())
    }

    /// Declare a parameter that is read at `offsets` and written at the
    /// current point. Reads see the value from before the stage ran.
    pub fn read_write(
        &mut self,
        name: impl Into<FieldName>,
        offsets: impl IntoIterator<Item = Offset>,
    ) -> ParamId {
        self.declare(name.into(), ParamRole::ReadWrite, offsets.into_iter().collect())
    }

    /// Set the update rule.
    pub fn body<F>(&mut self, body: F) -> &mut Self
    where
        F: Fn(&mut PointContext<'_>) -> Result<(), StageError> + Send + Sync + 'static,
    {
        self.body = Some(Box::new(body));
        self
    }

    /// Finish the declaration.
    pub fn build(self) -> Result<Stage, ConfigError> {
        for (i, p) in self.params.iter().enumerate() {
            if self.params[..i].iter().any(|q| q.name == p.name) {
                return Err(ConfigError::DuplicateParam {
                    stage: self.name,
                    name: p.name.clone(),
                });
            }
            if p.role.is_readable() && p.offsets.is_empty() {
                return Err(ConfigError::EmptyOffsets {
                    stage: self.name,
                    name: p.name.clone(),
                });
            }
        }
        let Some(body) = self.body else {
            return Err(ConfigError::MissingBody { stage: self.name });
        };
        Ok(Stage {
            inner: Arc::new(StageInner {
                name: self.name,
                params: self.params,
                body,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(ctx: &mut PointContext<'_>) -> Result<(), StageError> {
        let _ = ctx.point();
        Ok(())
    }

    #[test]
    fn params_are_numbered_in_declaration_order() {
        let mut b = Stage::builder("s");
        let a = b.read("a", [Offset::ZERO]);
        let c = b.write("c");
        let d = b.read_write("d", [Offset::xy(1, 0)]);
        b.body(noop);
        let stage = b.build().unwrap();

        assert_eq!((a, c, d), (ParamId(0), ParamId(1), ParamId(2)));
        assert_eq!(stage.name(), "s");
        assert_eq!(stage.param_id("d"), Some(d));
        assert_eq!(stage.param(c).unwrap().role(), ParamRole::Write);
        assert_eq!(stage.param(ParamId(3)), None);
        assert_eq!(
            stage.param(d).unwrap().declared_range(),
            Some(AccessRange::xy(1, 1, 0, 0))
        );
        assert_eq!(stage.param(c).unwrap().declared_range(), None);
    }

    #[test]
    fn missing_body_is_rejected() {
        let mut b = Stage::builder("nobody");
        b.write("x");
        assert_eq!(
            b.build().unwrap_err(),
            ConfigError::MissingBody {
                stage: "nobody".into()
            }
        );
    }

    #[test]
    fn duplicate_param_is_rejected() {
        let mut b = Stage::builder("dup");
        b.write("x");
        b.read("x", [Offset::ZERO]);
        b.body(noop);
        assert!(matches!(
            b.build(),
            Err(ConfigError::DuplicateParam { name, .. }) if name.as_str() == "x"
        ));
    }

    #[test]
    fn readable_param_needs_offsets() {
        let mut b = Stage::builder("blind");
        b.read("x", []);
        b.body(noop);
        assert!(matches!(b.build(), Err(ConfigError::EmptyOffsets { .. })));
    }

    #[test]
    fn offset_sets_compare_unordered() {
        let mut b = Stage::builder("s");
        let p = b.read("p", [Offset::xy(1, 0), Offset::xy(-1, 0)]);
        let q = b.read("q", [Offset::xy(-1, 0), Offset::xy(1, 0), Offset::xy(1, 0)]);
        let r = b.read("r", [Offset::xy(1, 0)]);
        b.body(noop);
        let s = b.build().unwrap();
        let spec = |id| s.param(id).unwrap();
        assert!(spec(p).same_offsets(spec(q)));
        assert!(!spec(p).same_offsets(spec(r)));
    }

    #[test]
    fn stage_is_send_sync_and_clone_shares() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Stage>();

        let mut b = Stage::builder("shared");
        b.write("x");
        b.body(noop);
        let s = b.build().unwrap();
        let t = s.clone();
        assert!(Arc::ptr_eq(&s.inner, &t.inner));
    }
}
