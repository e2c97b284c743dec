//! Texture upload and per-texture bind group caching.

use ahash::HashMap;

use crate::device::TextureId;
use crate::texture::SpriteTexture;

use super::pipeline;

/// A GPU texture created through [`TextureBindings::create_texture`].
#[derive(Debug)]
pub struct Texture2d {
    id: TextureId,
    width: u32,
    height: u32,
    transparent: bool,
    texture: wgpu::Texture,
}

impl Texture2d {
    /// The underlying wgpu texture.
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }
}

impl SpriteTexture for Texture2d {
    fn id(&self) -> TextureId {
        self.id
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn has_transparency(&self) -> bool {
        self.transparent
    }
}

/// Owns the texture bind group layout, a shared sampler, the 1x1 white
/// fallback, and one cached bind group per registered texture.
pub struct TextureBindings {
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    fallback_bind_group: wgpu::BindGroup,
    _fallback_texture: wgpu::Texture,
    cache: HashMap<TextureId, wgpu::BindGroup>,
    next_id: u64,
}

impl TextureBindings {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let layout = pipeline::create_texture_bind_group_layout(device);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("vireo_sprite_sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let fallback_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("vireo_fallback_texture"),
            size: wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &fallback_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &[255, 255, 255, 255],
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4),
                rows_per_image: Some(1),
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
        let fallback_view = fallback_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let fallback_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("vireo_fallback_bg"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&fallback_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        Self {
            layout,
            sampler,
            fallback_bind_group,
            _fallback_texture: fallback_texture,
            cache: HashMap::default(),
            next_id: 1,
        }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    /// Upload raw RGBA pixels as a new sprite texture.
    ///
    /// The transparency flag is derived from the data: any texel with alpha
    /// below 255 routes sprites using this texture to the transparent
    /// partition.
    pub fn create_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[u8],
        width: u32,
        height: u32,
    ) -> Texture2d {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("vireo_sprite_texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let id = TextureId(self.next_id);
        self.next_id += 1;

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("vireo_sprite_texture_bg"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        self.cache.insert(id, bind_group);

        let transparent = data.chunks_exact(4).any(|texel| texel[3] != 255);

        Texture2d {
            id,
            width,
            height,
            transparent,
            texture,
        }
    }

    /// Cached bind group for `id`, if the texture was created here.
    pub fn bind_group(&self, id: TextureId) -> Option<&wgpu::BindGroup> {
        self.cache.get(&id)
    }

    /// The 1x1 white fallback bind group.
    pub fn fallback(&self) -> &wgpu::BindGroup {
        &self.fallback_bind_group
    }

    /// Drop the cached bind group of a released texture.
    pub fn release(&mut self, id: TextureId) {
        self.cache.remove(&id);
    }
}
