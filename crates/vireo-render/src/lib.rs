//! Vireo's sprite batching and rendering core.
//!
//! A frame is a stream of [`SpriteBatch::add`] calls followed by one
//! [`SpriteBatch::render_all`]. Each add becomes four vertices in one of two
//! partitions (opaque or transparent) tagged with a derived depth
//! coordinate; rendering uploads each partition in a single bulk transfer
//! and walks the accumulated quads, coalescing neighbors that share
//! texture, shader and blend mode into single draw calls.
//!
//! The GPU is reached only through the [`RenderDevice`] seam. [`WgpuDevice`]
//! is the production implementation; tests drive the same engine against a
//! recording device from `vireo-test-utils`.
//!
//! ```no_run
//! use vireo_render::{
//!     GraphicsContext, Rect, SpriteBatch, SpriteBatchDescriptor, SpriteParams, WgpuDevice,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let context = GraphicsContext::new_sync()?;
//! let mut device = WgpuDevice::new(context, 1280, 720);
//! let texture = device.create_texture(&[255u8; 4 * 16 * 16], 16, 16);
//!
//! let mut batch = SpriteBatch::new(device, SpriteBatchDescriptor::new(1280, 720))?;
//! batch.add(
//!     &texture,
//!     Rect::new(100.0, 100.0, 32.0, 32.0),
//!     &SpriteParams::new().with_depth(1),
//! )?;
//! batch.render_all();
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod blend;
pub mod color;
pub mod context;
pub mod depth;
pub mod device;
pub mod error;
pub mod gpu;
pub mod quad;
pub mod state;
pub mod store;
pub mod texture;
pub mod vertex;

pub use batch::{FrameStats, SpriteBatch, SpriteBatchDescriptor};
pub use blend::BlendMode;
pub use color::Color;
pub use context::{GraphicsContext, GraphicsError};
pub use device::{
    DEFAULT_SHADER, RenderDevice, RenderTarget, RenderTargetId, ShaderId, TextureId,
};
pub use error::{AddError, RenderError};
pub use gpu::{GRAYSCALE_SHADER, Texture2d, WgpuDevice};
pub use quad::{Flip, SpriteParams};
pub use store::{Batch, Partition, VertexStore};
pub use texture::{SpriteTexture, TextureInfo};
pub use vertex::{QUAD_INDEX_COUNT, QUAD_VERTEX_COUNT, Vertex};

pub use vireo_core::geometry::{Rect, Size};
pub use vireo_core::math::{Mat4, Vec2};
