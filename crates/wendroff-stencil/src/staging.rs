//! Reusable write buffers for stage execution.
//!
//! Every field a stage writes gets a staging buffer seeded with the
//! field's current contents. The body writes into the buffer while reads
//! keep seeing the untouched grid; the buffer is copied back when the
//! stage finishes. Buffers are returned to the pool afterwards, so a
//! stencil run in a loop stops allocating after its first call.

/// Pool of `f64` staging buffers.
#[derive(Debug, Default)]
pub struct StagingPool {
    free: Vec<Vec<f64>>,
}

impl StagingPool {
    /// An empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a buffer holding a copy of `seed`.
    pub fn take_seeded(&mut self, seed: &[f64]) -> Vec<f64> {
        let mut buf = self.free.pop().unwrap_or_default();
        buf.clear();
        buf.extend_from_slice(seed);
        buf
    }

    /// Return a buffer for reuse.
    pub fn give_back(&mut self, buf: Vec<f64>) {
        self.free.push(buf);
    }

    /// Buffers currently idle in the pool.
    pub(crate) fn pooled(&self) -> usize {
        self.free.len()
    }

    /// Total capacity of the idle buffers, in `f64` slots.
    pub(crate) fn capacity(&self) -> usize {
        self.free.iter().map(Vec::capacity).sum()
    }
}
