//! The shader registry.
//!
//! Shader programs are explicit resources owned by the registry rather than
//! process-wide globals, so independent renderer instances can carry their
//! own sets. Every program owns its projection uniform buffer and bind
//! group; binding a shader writes the matrix into that program's buffer, so
//! programs bound in the same frame never clobber each other's uniform.

use ahash::HashMap;
use vireo_core::math::Mat4;

use crate::device::{DEFAULT_SHADER, ShaderId};

use super::pipeline;

/// The grayscale post-tint shader, registered alongside the default.
pub const GRAYSCALE_SHADER: ShaderId = ShaderId(1);

/// WGSL source of the standard sprite shader.
const SPRITE_SHADER: &str = r#"
struct Projection {
    matrix: mat4x4<f32>,
}

@group(0) @binding(0) var sprite_texture: texture_2d<f32>;
@group(0) @binding(1) var sprite_sampler: sampler;
@group(1) @binding(0) var<uniform> projection: Projection;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) color: vec4<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) color: vec4<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var output: VertexOutput;
    output.position = projection.matrix * vec4<f32>(input.position, 1.0);
    output.uv = input.uv;
    output.color = input.color;
    return output;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(sprite_texture, sprite_sampler, input.uv) * input.color;
}
"#;

/// WGSL source of the grayscale variant: same vertex stage, luma fragment.
const GRAYSCALE_SHADER_SOURCE: &str = r#"
struct Projection {
    matrix: mat4x4<f32>,
}

@group(0) @binding(0) var sprite_texture: texture_2d<f32>;
@group(0) @binding(1) var sprite_sampler: sampler;
@group(1) @binding(0) var<uniform> projection: Projection;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) color: vec4<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) color: vec4<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var output: VertexOutput;
    output.position = projection.matrix * vec4<f32>(input.position, 1.0);
    output.uv = input.uv;
    output.color = input.color;
    return output;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    let sampled = textureSample(sprite_texture, sprite_sampler, input.uv) * input.color;
    let luma = dot(sampled.rgb, vec3<f32>(0.299, 0.587, 0.114));
    return vec4<f32>(luma, luma, luma, sampled.a);
}
"#;

struct ShaderEntry {
    label: String,
    module: wgpu::ShaderModule,
    projection_buffer: wgpu::Buffer,
    projection_bind_group: wgpu::BindGroup,
}

/// Registered shader programs and their projection uniforms.
pub struct ShaderRegistry {
    layout: wgpu::BindGroupLayout,
    entries: HashMap<ShaderId, ShaderEntry>,
    next_id: u32,
}

impl ShaderRegistry {
    /// Create the registry with the prebuilt default and grayscale programs.
    pub fn new(device: &wgpu::Device) -> Self {
        let layout = pipeline::create_projection_bind_group_layout(device);
        let mut registry = Self {
            layout,
            entries: HashMap::default(),
            next_id: 0,
        };

        let default = registry.register(device, "sprite_default", SPRITE_SHADER);
        debug_assert_eq!(default, DEFAULT_SHADER);
        let grayscale = registry.register(device, "sprite_grayscale", GRAYSCALE_SHADER_SOURCE);
        debug_assert_eq!(grayscale, GRAYSCALE_SHADER);

        registry
    }

    /// The projection bind group layout (group 1 of the sprite pipeline).
    pub fn projection_layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    /// Compile `source` and register it under a fresh id.
    pub fn register(&mut self, device: &wgpu::Device, label: &str, source: &str) -> ShaderId {
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let projection_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("vireo_shader_projection"),
            size: std::mem::size_of::<Mat4>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let projection_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("vireo_shader_projection_bg"),
            layout: &self.layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: projection_buffer.as_entire_binding(),
            }],
        });

        let id = ShaderId(self.next_id);
        self.next_id += 1;
        self.entries.insert(
            id,
            ShaderEntry {
                label: label.to_string(),
                module,
                projection_buffer,
                projection_bind_group,
            },
        );
        id
    }

    fn entry(&self, id: ShaderId) -> &ShaderEntry {
        self.entries
            .get(&id)
            .unwrap_or_else(|| &self.entries[&DEFAULT_SHADER])
    }

    /// Human-readable label of a registered shader.
    pub fn label(&self, id: ShaderId) -> &str {
        &self.entry(id).label
    }

    /// The compiled module, falling back to the default program for
    /// unregistered ids.
    pub fn module(&self, id: ShaderId) -> &wgpu::ShaderModule {
        &self.entry(id).module
    }

    /// The program's projection uniform buffer.
    pub fn projection_buffer(&self, id: ShaderId) -> &wgpu::Buffer {
        &self.entry(id).projection_buffer
    }

    /// The program's projection bind group.
    pub fn projection_bind_group(&self, id: ShaderId) -> &wgpu::BindGroup {
        &self.entry(id).projection_bind_group
    }

    /// Resolve an id to the one actually registered. Unknown ids fall back
    /// to the default program with a warning rather than failing the frame.
    pub fn resolve(&self, id: ShaderId) -> ShaderId {
        if self.entries.contains_key(&id) {
            id
        } else {
            tracing::warn!(shader = id.0, "unknown shader id, using default");
            DEFAULT_SHADER
        }
    }
}
