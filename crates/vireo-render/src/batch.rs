//! The sprite batch renderer.
//!
//! Collects textured-quad draw requests over a frame, routes each into the
//! opaque or transparent partition with a derived depth coordinate, then
//! flushes the whole frame as a minimal sequence of device calls: one bulk
//! vertex upload per non-empty partition and one draw call per run of
//! consecutive quads sharing texture, shader and blend mode.
//!
//! A frame cycles through accumulate, upload, draw, clear. Nothing persists
//! across frames except buffer capacity and the last frame's statistics.

use vireo_core::geometry::{Rect, Size};
use vireo_core::math::{Mat4, Vec3};
use vireo_core::profiling::profile_function;

use crate::depth::DepthAssigner;
use crate::device::{DEFAULT_SHADER, RenderDevice, RenderTarget, RenderTargetId, ShaderId};
use crate::error::{AddError, RenderError};
use crate::quad::{SpriteParams, build_quad};
use crate::state::StateCache;
use crate::store::{Batch, Partition, VertexStore};
use crate::texture::SpriteTexture;
use crate::vertex::{QUAD_INDEX_COUNT, QUAD_VERTEX_COUNT, Vertex};

/// Construction parameters for a [`SpriteBatch`].
#[derive(Debug, Clone, Copy)]
pub struct SpriteBatchDescriptor {
    /// Hard per-frame quad limit; also bounds the accepted depth range to
    /// half of it on either side of zero.
    pub max_quads: u32,
    /// CPU-side capacity reserved up front, per partition.
    pub initial_quads: u32,
    /// Size of the default surface, used for the projection matrix when no
    /// render target is set.
    pub surface_size: Size<u32>,
    /// Shader used when a draw request does not name one.
    pub default_shader: ShaderId,
}

impl SpriteBatchDescriptor {
    pub fn new(surface_width: u32, surface_height: u32) -> Self {
        Self {
            surface_size: Size::new(surface_width, surface_height),
            ..Self::default()
        }
    }
}

impl Default for SpriteBatchDescriptor {
    fn default() -> Self {
        Self {
            max_quads: 2048,
            initial_quads: 256,
            surface_size: Size::new(1280, 720),
            default_shader: DEFAULT_SHADER,
        }
    }
}

/// Counters for one rendered frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameStats {
    pub quads_added: u32,
    pub opaque_quads: u32,
    pub transparent_quads: u32,
    /// Bulk vertex transfers issued; at most one per partition.
    pub uploads: u32,
    pub draw_calls: u32,
    pub texture_switches: u32,
    pub shader_switches: u32,
    pub blend_switches: u32,
    pub rejected_adds: u32,
    pub clamped_depths: u32,
    /// Lowest depth layer seen this frame; `i32::MAX` when no quads.
    pub min_depth: i32,
    /// Highest depth layer seen this frame; `i32::MIN` when no quads.
    pub max_depth: i32,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self {
            quads_added: 0,
            opaque_quads: 0,
            transparent_quads: 0,
            uploads: 0,
            draw_calls: 0,
            texture_switches: 0,
            shader_switches: 0,
            blend_switches: 0,
            rejected_adds: 0,
            clamped_depths: 0,
            min_depth: i32::MAX,
            max_depth: i32::MIN,
        }
    }
}

/// The batching engine. Generic over the GPU seam so the same control flow
/// drives the wgpu backend and the recording device used in tests.
pub struct SpriteBatch<D: RenderDevice> {
    device: D,
    store: VertexStore,
    depth: DepthAssigner,
    state: StateCache,
    max_quads: u32,
    num_added: u32,
    default_shader: ShaderId,
    surface_size: Size<u32>,
    target: Option<RenderTarget>,
    projection: Mat4,
    frame: FrameStats,
    completed: FrameStats,
}

impl<D: RenderDevice> SpriteBatch<D> {
    /// Create a renderer over `device`.
    ///
    /// Fails if the device cannot allocate GPU storage for
    /// `descriptor.max_quads` quads; there is no degraded mode without it.
    pub fn new(mut device: D, descriptor: SpriteBatchDescriptor) -> Result<Self, RenderError> {
        device.prepare(descriptor.max_quads)?;

        tracing::info!(
            max_quads = descriptor.max_quads,
            surface_width = descriptor.surface_size.width,
            surface_height = descriptor.surface_size.height,
            "sprite batch created"
        );

        Ok(Self {
            device,
            store: VertexStore::with_capacity(descriptor.initial_quads as usize),
            depth: DepthAssigner::new(descriptor.max_quads),
            state: StateCache::new(),
            max_quads: descriptor.max_quads,
            num_added: 0,
            default_shader: descriptor.default_shader,
            surface_size: descriptor.surface_size,
            target: None,
            projection: projection_for(descriptor.surface_size),
            frame: FrameStats::default(),
            completed: FrameStats::default(),
        })
    }

    /// Queue one sprite for this frame.
    ///
    /// A rejected add leaves everything accumulated so far untouched; the
    /// frame keeps rendering without the rejected quad.
    pub fn add<T: SpriteTexture + ?Sized>(
        &mut self,
        texture: &T,
        dest: Rect<f32>,
        params: &SpriteParams,
    ) -> Result<(), AddError> {
        if self.num_added >= self.max_quads {
            self.frame.rejected_adds += 1;
            tracing::warn!(
                max_quads = self.max_quads,
                "sprite batch full, draw request dropped"
            );
            return Err(AddError::CapacityExceeded {
                max_quads: self.max_quads,
            });
        }

        let transparent = texture.has_transparency() || !params.color.is_opaque();
        let partition = if transparent {
            Partition::Transparent
        } else {
            Partition::Opaque
        };

        // Reserve before anything else mutates, so a failed growth rejects
        // the add without leaving counters half-updated.
        self.store.reserve_quad(partition)?;

        let slot = self.depth.assign(params.depth);
        if slot.clamped {
            self.frame.clamped_depths += 1;
            tracing::warn!(
                depth = params.depth,
                clamped = slot.value,
                half_range = self.depth.half_range(),
                "depth layer outside the supported range"
            );
        }

        self.num_added += 1;
        let sequence = self.num_added;
        let depth_coord = if transparent {
            self.depth.transparent_depth(&slot)
        } else {
            self.depth.opaque_depth(&slot, sequence)
        };

        let mut vertices = [Vertex::ZERO; 4];
        build_quad(
            &mut vertices,
            texture.width() as f32,
            texture.height() as f32,
            dest,
            params.src,
            params.rotation,
            params.origin,
            params.flip,
            params.color,
            depth_coord,
        );

        self.store.append_quad(
            partition,
            vertices,
            Batch {
                vertex_count: QUAD_VERTEX_COUNT,
                index_count: QUAD_INDEX_COUNT,
                texture: texture.id(),
                shader: params.shader.unwrap_or(self.default_shader),
                blend: params.blend,
                depth_key: slot.index,
                sequence,
            },
        );

        self.frame.quads_added += 1;
        if transparent {
            self.frame.transparent_quads += 1;
        } else {
            self.frame.opaque_quads += 1;
        }
        self.frame.min_depth = self.frame.min_depth.min(slot.value);
        self.frame.max_depth = self.frame.max_depth.max(slot.value);

        Ok(())
    }

    /// Upload and draw everything accumulated since the last clear, then
    /// reset for the next frame.
    ///
    /// An empty frame touches the device not at all: no target bind, no
    /// uploads, no draws.
    pub fn render_all(&mut self) {
        profile_function!();

        if self.num_added > 0 {
            self.device.begin_frame(self.target.map(|t| t.id));

            let opaque_quads = self.store.quad_count(Partition::Opaque) as u32;
            let transparent_quads = self.store.quad_count(Partition::Transparent) as u32;

            if opaque_quads > 0 {
                self.device.upload(0, self.store.vertices(Partition::Opaque));
                self.frame.uploads += 1;
            }
            if transparent_quads > 0 {
                self.device
                    .upload(opaque_quads, self.store.vertices(Partition::Transparent));
                self.frame.uploads += 1;
            }

            self.state.invalidate();

            // Opaque runs flush newest-first: with depth write on and
            // pass-on-less, equal-depth overlaps then resolve to the most
            // recently added quad, matching the transparent partition's
            // tie rule. Transparent runs flush in add order.
            flush_runs(
                &mut self.device,
                &mut self.state,
                &mut self.frame,
                self.store.batches(Partition::Opaque),
                0,
                &self.projection,
                true,
            );
            flush_runs(
                &mut self.device,
                &mut self.state,
                &mut self.frame,
                self.store.batches(Partition::Transparent),
                opaque_quads,
                &self.projection,
                false,
            );

            self.device.end_frame();
        }

        self.completed = self.frame;
        self.clear_all();
    }

    /// Drop all accumulated quads and reset per-frame counters without
    /// touching the GPU. Capacity is retained everywhere.
    pub fn clear_all(&mut self) {
        self.store.clear();
        self.depth.clear();
        self.state.invalidate();
        self.num_added = 0;
        self.frame = FrameStats::default();
    }

    /// Redirect rendering to an offscreen target, or back to the default
    /// surface with `None`. The projection matrix follows the active
    /// target's size.
    pub fn set_render_target(&mut self, target: Option<RenderTarget>) {
        self.projection = match &target {
            Some(t) => projection_for(t.size),
            None => projection_for(self.surface_size),
        };
        self.target = target;
    }

    /// The active offscreen target, if any.
    pub fn render_target(&self) -> Option<RenderTargetId> {
        self.target.map(|t| t.id)
    }

    /// Quads accumulated since the last clear.
    pub fn pending_quads(&self) -> u32 {
        self.num_added
    }

    /// Statistics of the most recently rendered frame.
    pub fn stats(&self) -> FrameStats {
        self.completed
    }

    /// Access the underlying device (texture and target management live
    /// there for the wgpu backend).
    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }
}

/// Orthographic projection mapping pixel coordinates to clip space with the
/// origin at the top-left: scale by 2/size per axis (y negated), then
/// translate the origin into the corner.
fn projection_for(size: Size<u32>) -> Mat4 {
    let scale = Mat4::from_scale(Vec3::new(
        2.0 / size.width.max(1) as f32,
        -2.0 / size.height.max(1) as f32,
        1.0,
    ));
    Mat4::from_translation(Vec3::new(-1.0, 1.0, 0.0)) * scale
}

/// Walk one partition's batches in draw order, coalescing consecutive
/// batches that share the full bind state into single draw calls.
fn flush_runs<D: RenderDevice>(
    device: &mut D,
    state: &mut StateCache,
    stats: &mut FrameStats,
    batches: &[Batch],
    base_quad: u32,
    projection: &Mat4,
    newest_first: bool,
) {
    if newest_first {
        let order = (0..batches.len()).rev();
        flush_ordered(device, state, stats, batches, base_quad, projection, order);
    } else {
        let order = 0..batches.len();
        flush_ordered(device, state, stats, batches, base_quad, projection, order);
    }
}

fn flush_ordered<D: RenderDevice>(
    device: &mut D,
    state: &mut StateCache,
    stats: &mut FrameStats,
    batches: &[Batch],
    base_quad: u32,
    projection: &Mat4,
    order: impl Iterator<Item = usize>,
) {
    // A run is (lowest quad index, length); traversal in either direction
    // only ever extends it contiguously.
    let mut run: Option<(usize, usize)> = None;

    for i in order {
        let batch = &batches[i];
        if state.matches(batch) {
            let (start, len) = run.get_or_insert((i, 0));
            *start = (*start).min(i);
            *len += 1;
        } else {
            if let Some((start, len)) = run.take() {
                device.draw_quads(base_quad + start as u32, len as u32);
                stats.draw_calls += 1;
            }
            if state.use_texture(device, batch.texture) {
                stats.texture_switches += 1;
            }
            if state.use_shader(device, batch.shader, projection) {
                stats.shader_switches += 1;
            }
            if state.use_blend_mode(device, batch.blend) {
                stats.blend_switches += 1;
            }
            run = Some((i, 1));
        }
    }

    // Past the last batch the run always flushes, state change or not.
    if let Some((start, len)) = run {
        device.draw_quads(base_quad + start as u32, len as u32);
        stats.draw_calls += 1;
    }
}
