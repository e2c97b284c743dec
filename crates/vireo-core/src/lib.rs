//! Vireo Core
//!
//! Shared utilities for the Vireo sprite renderer: logging setup, profiling
//! hooks, math re-exports and plain geometry primitives.

pub mod geometry;
pub mod logging;
pub mod math;
#[cfg(feature = "profiling")]
pub mod profiling;
