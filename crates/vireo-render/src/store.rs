//! Growable CPU-side vertex storage, split into opaque and transparent
//! partitions.
//!
//! Each partition is one contiguous vertex array whose length is always a
//! multiple of four, paired 1:1 with a batch-record array (one [`Batch`] per
//! quad). Clearing is logical: lengths drop to zero, capacity stays, so
//! steady-state frames allocate nothing.
//!
//! Growth uses a fixed increment rather than doubling: each growth step
//! reallocates a predictable amount, instead of doubling's amortized-cheap
//! but occasionally huge reallocations. The cost is more frequent growth
//! under heavy load; for a renderer that reaches its working size in a few
//! frames and then stays there, predictability wins.

use std::collections::TryReserveError;

use crate::blend::BlendMode;
use crate::device::{ShaderId, TextureId};
use crate::vertex::Vertex;

/// Quads added per growth step.
pub const GROWTH_INCREMENT_QUADS: usize = 256;

/// Which partition a quad was routed to. Decided once at add time and
/// immutable for the quad's lifetime within the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    Opaque,
    Transparent,
}

/// Per-quad metadata shared by its four vertices.
#[derive(Debug, Clone, Copy)]
pub struct Batch {
    /// Always 4.
    pub vertex_count: u32,
    /// Always 6 (two triangles).
    pub index_count: u32,
    pub texture: TextureId,
    pub shader: ShaderId,
    pub blend: BlendMode,
    /// Rebased depth bucket index.
    pub depth_key: u32,
    /// Monotonic add-order tag, for stable ordering among equal depths.
    pub sequence: u32,
}

#[derive(Debug, Default)]
struct PartitionBuffer {
    vertices: Vec<Vertex>,
    batches: Vec<Batch>,
}

impl PartitionBuffer {
    fn with_capacity(quads: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(quads * 4),
            batches: Vec::with_capacity(quads),
        }
    }

    fn reserve_quad(&mut self) -> Result<(), TryReserveError> {
        if self.vertices.len() + 4 > self.vertices.capacity() {
            self.vertices
                .try_reserve_exact(GROWTH_INCREMENT_QUADS * 4)?;
            self.batches.try_reserve_exact(GROWTH_INCREMENT_QUADS)?;
        }
        Ok(())
    }
}

/// The two-partition vertex store.
pub struct VertexStore {
    opaque: PartitionBuffer,
    transparent: PartitionBuffer,
}

impl VertexStore {
    /// Create a store with `initial_quads` of capacity per partition.
    pub fn with_capacity(initial_quads: usize) -> Self {
        Self {
            opaque: PartitionBuffer::with_capacity(initial_quads),
            transparent: PartitionBuffer::with_capacity(initial_quads),
        }
    }

    fn partition(&self, p: Partition) -> &PartitionBuffer {
        match p {
            Partition::Opaque => &self.opaque,
            Partition::Transparent => &self.transparent,
        }
    }

    fn partition_mut(&mut self, p: Partition) -> &mut PartitionBuffer {
        match p {
            Partition::Opaque => &mut self.opaque,
            Partition::Transparent => &mut self.transparent,
        }
    }

    /// Ensure room for one more quad in `p`, growing by the fixed increment
    /// when needed. Fails only if the allocator refuses.
    pub fn reserve_quad(&mut self, p: Partition) -> Result<(), TryReserveError> {
        self.partition_mut(p).reserve_quad()
    }

    /// Append one quad. Call [`reserve_quad`](Self::reserve_quad) first;
    /// with capacity in place this never allocates.
    pub fn append_quad(&mut self, p: Partition, vertices: [Vertex; 4], batch: Batch) {
        let buffer = self.partition_mut(p);
        debug_assert!(buffer.vertices.len() + 4 <= buffer.vertices.capacity());
        buffer.vertices.extend_from_slice(&vertices);
        buffer.batches.push(batch);
    }

    /// Number of quads currently in `p`.
    pub fn quad_count(&self, p: Partition) -> usize {
        self.partition(p).batches.len()
    }

    /// The partition's vertex data, in add order.
    ///
    /// The returned slice is invalidated by any append that grows the store;
    /// do not hold it across `append_quad` calls.
    pub fn vertices(&self, p: Partition) -> &[Vertex] {
        &self.partition(p).vertices
    }

    /// The partition's batch records, in add order.
    pub fn batches(&self, p: Partition) -> &[Batch] {
        &self.partition(p).batches
    }

    /// Logically clear both partitions; capacity is retained.
    pub fn clear(&mut self) {
        self.opaque.vertices.clear();
        self.opaque.batches.clear();
        self.transparent.vertices.clear();
        self.transparent.batches.clear();
    }
}
