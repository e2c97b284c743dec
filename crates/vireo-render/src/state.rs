//! Last-bound GPU state tracking.
//!
//! The sole mechanism for state-change minimization: each `use_*` call is a
//! no-op when the requested value is already bound, and issues the device
//! bind otherwise. The cache only knows "last bound value"; it relies on the
//! batch renderer presenting batches in grouped order.

use vireo_core::math::Mat4;

use crate::blend::BlendMode;
use crate::device::{RenderDevice, ShaderId, TextureId};
use crate::store::Batch;

#[derive(Debug, Default)]
pub struct StateCache {
    texture: Option<TextureId>,
    shader: Option<ShaderId>,
    blend: Option<BlendMode>,
}

impl StateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all bound state, forcing the next `use_*` calls to bind.
    pub fn invalidate(&mut self) {
        self.texture = None;
        self.shader = None;
        self.blend = None;
    }

    /// Whether `batch` can join the run drawn with the current state.
    pub fn matches(&self, batch: &Batch) -> bool {
        self.texture == Some(batch.texture)
            && self.shader == Some(batch.shader)
            && self.blend == Some(batch.blend)
    }

    /// Bind `texture` if it differs from the cached one. Returns whether a
    /// bind was issued.
    pub fn use_texture<D: RenderDevice>(&mut self, device: &mut D, texture: TextureId) -> bool {
        if self.texture == Some(texture) {
            return false;
        }
        device.bind_texture(texture);
        self.texture = Some(texture);
        true
    }

    /// Bind `shader` if it differs from the cached one, pushing the
    /// projection matrix with it. The matrix travels once per shader switch,
    /// never per quad.
    pub fn use_shader<D: RenderDevice>(
        &mut self,
        device: &mut D,
        shader: ShaderId,
        projection: &Mat4,
    ) -> bool {
        if self.shader == Some(shader) {
            return false;
        }
        device.bind_shader(shader, projection);
        self.shader = Some(shader);
        true
    }

    /// Switch the blend mode if it differs from the cached one. Returns
    /// whether a switch was issued.
    pub fn use_blend_mode<D: RenderDevice>(&mut self, device: &mut D, blend: BlendMode) -> bool {
        if self.blend == Some(blend) {
            return false;
        }
        device.bind_blend_mode(blend);
        self.blend = Some(blend);
        true
    }
}
