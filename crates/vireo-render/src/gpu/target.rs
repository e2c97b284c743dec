//! Offscreen render targets.
//!
//! The backend owns a default target sized at construction plus any number
//! of caller-created offscreen targets, each with paired color and depth
//! textures.

use ahash::HashMap;
use vireo_core::geometry::Size;

use crate::device::{RenderTarget, RenderTargetId};

use super::pipeline;

pub struct TargetResources {
    pub color: wgpu::Texture,
    pub color_view: wgpu::TextureView,
    pub depth_view: wgpu::TextureView,
    _depth: wgpu::Texture,
    pub size: Size<u32>,
}

impl TargetResources {
    fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let (color, color_view) = pipeline::create_color_texture(device, width, height);
        let (depth, depth_view) = pipeline::create_depth_texture(device, width, height);
        Self {
            color,
            color_view,
            depth_view,
            _depth: depth,
            size: Size::new(width, height),
        }
    }
}

/// The default target plus offscreen targets, addressed by id.
pub struct TargetPool {
    default_target: TargetResources,
    offscreen: HashMap<RenderTargetId, TargetResources>,
    next_id: u32,
}

impl TargetPool {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        Self {
            default_target: TargetResources::new(device, width, height),
            offscreen: HashMap::default(),
            next_id: 1,
        }
    }

    /// Create an offscreen target of the given size.
    pub fn create_target(&mut self, device: &wgpu::Device, width: u32, height: u32) -> RenderTarget {
        let id = RenderTargetId(self.next_id);
        self.next_id += 1;
        self.offscreen
            .insert(id, TargetResources::new(device, width, height));
        RenderTarget {
            id,
            size: Size::new(width, height),
        }
    }

    /// Resolve a frame's target. Unknown ids fall back to the default
    /// surface with a warning rather than failing the frame.
    pub fn resolve(&self, target: Option<RenderTargetId>) -> &TargetResources {
        match target {
            None => &self.default_target,
            Some(id) => self.offscreen.get(&id).unwrap_or_else(|| {
                tracing::warn!(target = id.0, "unknown render target, using default surface");
                &self.default_target
            }),
        }
    }

    /// The color texture of a target, for readback or compositing.
    pub fn color_texture(&self, target: Option<RenderTargetId>) -> &wgpu::Texture {
        &self.resolve(target).color
    }

    /// Release an offscreen target's GPU resources.
    pub fn release(&mut self, id: RenderTargetId) {
        self.offscreen.remove(&id);
    }
}
