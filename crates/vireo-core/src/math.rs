//! Math types backed by the SIMD-accelerated `glam` crate.
//!
//! The [`fast`] module re-exports everything from [`glam`]; the most common
//! types are re-exported at this module's root for convenience.
//!
//! # Examples
//!
//! ```
//! use vireo_core::math::{Mat4, Vec2, Vec3};
//!
//! let position = Vec2::new(10.0, 20.0);
//! let velocity = Vec2::new(1.0, 0.5);
//! let next = position + velocity * 0.016;
//!
//! let transform = Mat4::from_scale(Vec3::new(2.0, 2.0, 1.0));
//! # let _ = (next, transform);
//! ```
//!
//! [`glam`]: https://docs.rs/glam

/// Full re-export of the `glam` crate.
pub mod fast {
    pub use glam::*;
}

pub use fast::{Mat4, Vec2, Vec3, Vec4};
