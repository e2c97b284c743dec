//! Test utilities for Vireo.
//!
//! The main component is [`RecordingDevice`] (behind the `mock` feature): a
//! [`vireo_render::RenderDevice`] that performs no GPU work and instead
//! records every call, so tests can assert on the exact sequence of uploads,
//! binds and draws a frame produces.
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "mock")]
//! # {
//! use vireo_render::{Rect, SpriteBatch, SpriteBatchDescriptor, SpriteParams, TextureId, TextureInfo};
//! use vireo_test_utils::RecordingDevice;
//!
//! let device = RecordingDevice::new();
//! let mut batch = SpriteBatch::new(device, SpriteBatchDescriptor::default()).unwrap();
//!
//! let texture = TextureInfo::new(TextureId(1), 16, 16);
//! batch
//!     .add(&texture, Rect::new(0.0, 0.0, 16.0, 16.0), &SpriteParams::new())
//!     .unwrap();
//! batch.render_all();
//!
//! assert_eq!(batch.device().draw_call_count(), 1);
//! # }
//! ```

#[cfg(feature = "mock")]
pub mod recording;

#[cfg(feature = "mock")]
pub use recording::{DeviceCall, RecordingDevice};
