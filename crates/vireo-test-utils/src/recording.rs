//! A GPU device that records calls instead of rendering.

use vireo_core::math::Mat4;
use vireo_render::{
    BlendMode, RenderDevice, RenderError, RenderTargetId, ShaderId, TextureId, Vertex,
};

/// One recorded device operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    Prepare {
        max_quads: u32,
    },
    BeginFrame {
        target: Option<RenderTargetId>,
    },
    Upload {
        first_quad: u32,
        quad_count: u32,
    },
    BindTexture(TextureId),
    BindShader {
        shader: ShaderId,
    },
    BindBlend(BlendMode),
    DrawQuads {
        first_quad: u32,
        quad_count: u32,
    },
    EndFrame,
}

/// Records every [`RenderDevice`] call for later assertion.
///
/// Uploaded vertex data is kept verbatim, so tests can inspect the exact
/// positions, depths, UVs and colors a frame produced.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    calls: Vec<DeviceCall>,
    uploads: Vec<(u32, Vec<Vertex>)>,
    fail_prepare: bool,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// A device whose `prepare` fails, for exercising fatal construction
    /// paths.
    pub fn failing() -> Self {
        Self {
            fail_prepare: true,
            ..Self::default()
        }
    }

    /// All recorded calls, in order.
    pub fn calls(&self) -> &[DeviceCall] {
        &self.calls
    }

    /// Forget everything recorded so far (useful between test steps).
    pub fn clear_calls(&mut self) {
        self.calls.clear();
        self.uploads.clear();
    }

    /// Total number of recorded calls.
    pub fn call_count(&self) -> usize {
        self.calls.len()
    }

    /// The `(first_quad, quad_count)` of every draw, in draw order.
    pub fn draws(&self) -> Vec<(u32, u32)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DeviceCall::DrawQuads {
                    first_quad,
                    quad_count,
                } => Some((*first_quad, *quad_count)),
                _ => None,
            })
            .collect()
    }

    pub fn draw_call_count(&self) -> usize {
        self.draws().len()
    }

    /// Bulk uploads as `(first_quad, vertices)`, in upload order.
    pub fn uploads(&self) -> &[(u32, Vec<Vertex>)] {
        &self.uploads
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.len()
    }

    /// Every uploaded vertex of the frame, in quad order across partitions.
    pub fn uploaded_vertices(&self) -> Vec<Vertex> {
        let mut uploads: Vec<_> = self.uploads.clone();
        uploads.sort_by_key(|(first_quad, _)| *first_quad);
        uploads
            .into_iter()
            .flat_map(|(_, vertices)| vertices)
            .collect()
    }

    pub fn texture_bind_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, DeviceCall::BindTexture(_)))
            .count()
    }

    pub fn shader_bind_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, DeviceCall::BindShader { .. }))
            .count()
    }

    pub fn blend_bind_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, DeviceCall::BindBlend(_)))
            .count()
    }

    pub fn begin_frame_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, DeviceCall::BeginFrame { .. }))
            .count()
    }
}

impl RenderDevice for RecordingDevice {
    fn prepare(&mut self, max_quads: u32) -> Result<(), RenderError> {
        if self.fail_prepare {
            return Err(RenderError::BufferAllocation {
                requested: max_quads as u64 * 4 * Vertex::SIZE,
                max: 0,
            });
        }
        self.calls.push(DeviceCall::Prepare { max_quads });
        Ok(())
    }

    fn begin_frame(&mut self, target: Option<RenderTargetId>) {
        self.calls.push(DeviceCall::BeginFrame { target });
    }

    fn upload(&mut self, first_quad: u32, vertices: &[Vertex]) {
        self.calls.push(DeviceCall::Upload {
            first_quad,
            quad_count: (vertices.len() / 4) as u32,
        });
        self.uploads.push((first_quad, vertices.to_vec()));
    }

    fn bind_texture(&mut self, texture: TextureId) {
        self.calls.push(DeviceCall::BindTexture(texture));
    }

    fn bind_shader(&mut self, shader: ShaderId, _projection: &Mat4) {
        self.calls.push(DeviceCall::BindShader { shader });
    }

    fn bind_blend_mode(&mut self, mode: BlendMode) {
        self.calls.push(DeviceCall::BindBlend(mode));
    }

    fn draw_quads(&mut self, first_quad: u32, quad_count: u32) {
        self.calls.push(DeviceCall::DrawQuads {
            first_quad,
            quad_count,
        });
    }

    fn end_frame(&mut self) {
        self.calls.push(DeviceCall::EndFrame);
    }
}
