//! The wgpu backend: the production [`RenderDevice`] implementation.
//!
//! Translates the renderer's bind/draw stream into wgpu passes. Texture
//! binds become bind group switches, shader and blend binds select a
//! pipeline from a cache keyed by the pair, and quad runs draw as indexed
//! ranges over a shared static index buffer.

mod pipeline;
mod shaders;
mod target;
mod textures;

pub use shaders::{GRAYSCALE_SHADER, ShaderRegistry};
pub use target::TargetPool;
pub use textures::{Texture2d, TextureBindings};

use std::sync::Arc;

use ahash::HashMap;
use vireo_core::math::Mat4;
use vireo_core::profiling::profile_function;

use crate::blend::BlendMode;
use crate::color::Color;
use crate::context::GraphicsContext;
use crate::device::{RenderDevice, RenderTarget, RenderTargetId, ShaderId, TextureId};
use crate::error::RenderError;
use crate::vertex::Vertex;

struct FrameState {
    encoder: wgpu::CommandEncoder,
    pass: wgpu::RenderPass<'static>,
    current_shader: ShaderId,
    current_blend: BlendMode,
    bound_pipeline: Option<(ShaderId, BlendMode)>,
}

/// A `RenderDevice` backed by a wgpu device and queue.
pub struct WgpuDevice {
    context: Arc<GraphicsContext>,
    shaders: ShaderRegistry,
    textures: TextureBindings,
    targets: TargetPool,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: HashMap<(ShaderId, BlendMode), wgpu::RenderPipeline>,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    clear_color: Option<Color>,
    frame: Option<FrameState>,
}

impl WgpuDevice {
    /// Create a backend rendering to a default surface of the given size.
    pub fn new(context: Arc<GraphicsContext>, surface_width: u32, surface_height: u32) -> Self {
        let device = context.device();
        let queue = context.queue();

        let shaders = ShaderRegistry::new(device);
        let textures = TextureBindings::new(device, queue);
        let targets = TargetPool::new(device, surface_width, surface_height);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("vireo_sprite_pipeline_layout"),
            bind_group_layouts: &[textures.layout(), shaders.projection_layout()],
            push_constant_ranges: &[],
        });

        Self {
            context,
            shaders,
            textures,
            targets,
            pipeline_layout,
            pipelines: HashMap::default(),
            vertex_buffer: None,
            index_buffer: None,
            clear_color: None,
            frame: None,
        }
    }

    /// The shared graphics context.
    pub fn context(&self) -> &Arc<GraphicsContext> {
        &self.context
    }

    /// Upload raw RGBA pixels as a sprite texture.
    pub fn create_texture(&mut self, data: &[u8], width: u32, height: u32) -> Texture2d {
        self.textures
            .create_texture(self.context.device(), self.context.queue(), data, width, height)
    }

    /// Release a texture's cached bind group.
    pub fn release_texture(&mut self, id: TextureId) {
        self.textures.release(id);
    }

    /// Create an offscreen render target.
    pub fn create_render_target(&mut self, width: u32, height: u32) -> RenderTarget {
        self.targets
            .create_target(self.context.device(), width, height)
    }

    /// Release an offscreen render target.
    pub fn release_render_target(&mut self, id: RenderTargetId) {
        self.targets.release(id);
    }

    /// The color texture a frame rendered into, for readback.
    pub fn target_color_texture(&self, target: Option<RenderTargetId>) -> &wgpu::Texture {
        self.targets.color_texture(target)
    }

    /// Register an additional WGSL shader program.
    pub fn register_shader(&mut self, label: &str, source: &str) -> ShaderId {
        self.shaders
            .register(self.context.device(), label, source)
    }

    /// Clear the color attachment to this color at the start of each frame;
    /// `None` keeps the previous contents.
    pub fn set_clear_color(&mut self, color: Option<Color>) {
        self.clear_color = color;
    }
}

impl RenderDevice for WgpuDevice {
    fn prepare(&mut self, max_quads: u32) -> Result<(), RenderError> {
        let device = self.context.device();

        let vertex_bytes = max_quads as u64 * 4 * Vertex::SIZE;
        let index_bytes = max_quads as u64 * 6 * std::mem::size_of::<u32>() as u64;
        let max = device.limits().max_buffer_size;
        if vertex_bytes.max(index_bytes) > max {
            return Err(RenderError::BufferAllocation {
                requested: vertex_bytes.max(index_bytes),
                max,
            });
        }

        self.vertex_buffer = Some(pipeline::create_vertex_buffer(device, max_quads));
        self.index_buffer = Some(pipeline::create_index_buffer(
            device,
            self.context.queue(),
            max_quads,
        ));

        tracing::debug!(max_quads, vertex_bytes, "quad buffers created");
        Ok(())
    }

    fn begin_frame(&mut self, target: Option<RenderTargetId>) {
        profile_function!();

        let (Some(vertex_buffer), Some(index_buffer)) = (&self.vertex_buffer, &self.index_buffer)
        else {
            tracing::error!("begin_frame before prepare, frame dropped");
            return;
        };

        let resources = self.targets.resolve(target);

        let mut encoder =
            self.context
                .device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("vireo_frame_encoder"),
                });

        let color_load = match self.clear_color {
            Some(color) => wgpu::LoadOp::Clear(color.to_wgpu()),
            None => wgpu::LoadOp::Load,
        };

        let pass = encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("vireo_sprite_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &resources.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: color_load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &resources.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            })
            .forget_lifetime();

        let mut frame = FrameState {
            encoder,
            pass,
            current_shader: crate::device::DEFAULT_SHADER,
            current_blend: BlendMode::default(),
            bound_pipeline: None,
        };
        frame.pass.set_vertex_buffer(0, vertex_buffer.slice(..));
        frame
            .pass
            .set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);

        self.frame = Some(frame);
    }

    fn upload(&mut self, first_quad: u32, vertices: &[Vertex]) {
        let Some(vertex_buffer) = &self.vertex_buffer else {
            return;
        };
        self.context.queue().write_buffer(
            vertex_buffer,
            first_quad as u64 * 4 * Vertex::SIZE,
            bytemuck::cast_slice(vertices),
        );
    }

    fn bind_texture(&mut self, texture: TextureId) {
        let Some(frame) = self.frame.as_mut() else {
            return;
        };
        let bind_group = self
            .textures
            .bind_group(texture)
            .unwrap_or_else(|| self.textures.fallback());
        frame.pass.set_bind_group(0, bind_group, &[]);
    }

    fn bind_shader(&mut self, shader: ShaderId, projection: &Mat4) {
        let Some(frame) = self.frame.as_mut() else {
            return;
        };
        let shader = self.shaders.resolve(shader);

        // Each program owns its uniform buffer, so writing here cannot
        // clobber a matrix already pushed for another program this frame.
        self.context.queue().write_buffer(
            self.shaders.projection_buffer(shader),
            0,
            bytemuck::bytes_of(projection),
        );
        frame
            .pass
            .set_bind_group(1, self.shaders.projection_bind_group(shader), &[]);
        frame.current_shader = shader;
    }

    fn bind_blend_mode(&mut self, mode: BlendMode) {
        if let Some(frame) = self.frame.as_mut() {
            frame.current_blend = mode;
        }
    }

    fn draw_quads(&mut self, first_quad: u32, quad_count: u32) {
        let Some(frame) = self.frame.as_ref() else {
            return;
        };
        let key = (frame.current_shader, frame.current_blend);

        if !self.pipelines.contains_key(&key) {
            let pipeline = pipeline::create_sprite_pipeline(
                self.context.device(),
                self.shaders.module(key.0),
                &self.pipeline_layout,
                key.1,
            );
            self.pipelines.insert(key, pipeline);
        }

        let Some(frame) = self.frame.as_mut() else {
            return;
        };
        if frame.bound_pipeline != Some(key) {
            frame.pass.set_pipeline(&self.pipelines[&key]);
            frame.bound_pipeline = Some(key);
        }

        let first_index = first_quad * 6;
        let index_count = quad_count * 6;
        frame
            .pass
            .draw_indexed(first_index..first_index + index_count, 0, 0..1);
    }

    fn end_frame(&mut self) {
        profile_function!();

        let Some(frame) = self.frame.take() else {
            return;
        };
        // The pass borrows the encoder; end it before finishing.
        drop(frame.pass);
        self.context
            .queue()
            .submit(std::iter::once(frame.encoder.finish()));
    }
}
