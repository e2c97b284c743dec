//! Error types for the batching core.

use std::collections::TryReserveError;
use std::fmt;

/// Fatal errors surfaced at renderer construction.
///
/// Rendering cannot proceed at all when one of these occurs, so they are
/// returned from constructors rather than reported and swallowed.
#[derive(Debug)]
pub enum RenderError {
    /// The requested quad capacity needs a GPU buffer larger than the device
    /// supports.
    BufferAllocation {
        /// Requested buffer size in bytes.
        requested: u64,
        /// The device's maximum buffer size in bytes.
        max: u64,
    },

    /// The GPU device rejected buffer creation for another reason.
    DeviceLost {
        /// Description of the failure.
        reason: String,
    },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::BufferAllocation { requested, max } => {
                write!(
                    f,
                    "vertex buffer of {} bytes exceeds the device limit of {} bytes",
                    requested, max
                )
            }
            RenderError::DeviceLost { reason } => {
                write!(f, "GPU device unavailable: {}", reason)
            }
        }
    }
}

impl std::error::Error for RenderError {}

/// Recoverable failures of a single draw request.
///
/// A failed `add` never disturbs previously accumulated quads; the frame
/// keeps rendering with whatever was accepted before the failure.
#[derive(Debug)]
pub enum AddError {
    /// The batch already holds the configured maximum number of quads.
    CapacityExceeded {
        /// The configured quad limit.
        max_quads: u32,
    },

    /// Growing the vertex store failed at the allocator level.
    OutOfMemory(TryReserveError),
}

impl fmt::Display for AddError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddError::CapacityExceeded { max_quads } => {
                write!(f, "sprite batch is full ({} quads)", max_quads)
            }
            AddError::OutOfMemory(e) => {
                write!(f, "vertex store growth failed: {}", e)
            }
        }
    }
}

impl std::error::Error for AddError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AddError::OutOfMemory(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TryReserveError> for AddError {
    fn from(err: TryReserveError) -> Self {
        AddError::OutOfMemory(err)
    }
}
