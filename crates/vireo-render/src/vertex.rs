//! The GPU vertex format shared by both partitions.

/// Vertices per quad.
pub const QUAD_VERTEX_COUNT: u32 = 4;
/// Indices per quad (two triangles).
pub const QUAD_INDEX_COUNT: u32 = 6;

/// One sprite vertex: 20 bytes, tightly packed.
///
/// Texture coordinates are fixed-point, spanning the full `u16` range
/// (`Unorm16x2` on the GPU); sub-texel precision loss is visually negligible
/// at typical texture sizes and halves the bandwidth of `f32` UVs. Color is
/// packed 8 bits per channel (`Unorm8x4`). The depth component is derived by
/// the renderer, never supplied by callers.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Screen-space position and normalized depth.
    pub position: [f32; 3],
    /// Fixed-point texture coordinate.
    pub uv: [u16; 2],
    /// Packed RGBA color.
    pub color: [u8; 4],
}

impl Vertex {
    pub const ZERO: Vertex = Vertex {
        position: [0.0; 3],
        uv: [0; 2],
        color: [0; 4],
    };

    /// Size of one vertex in bytes.
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    /// Returns the wgpu vertex buffer layout.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRS: &[wgpu::VertexAttribute] = &wgpu::vertex_attr_array![
            // location 0: position (vec3)
            0 => Float32x3,
            // location 1: uv (unorm u16x2)
            1 => Unorm16x2,
            // location 2: color (unorm u8x4)
            2 => Unorm8x4,
        ];

        wgpu::VertexBufferLayout {
            array_stride: Self::SIZE as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: ATTRS,
        }
    }
}
