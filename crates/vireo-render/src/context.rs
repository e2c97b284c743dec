//! GPU instance/device acquisition.

use std::fmt;
use std::sync::Arc;

/// Errors raised while acquiring the GPU context.
///
/// Both are fatal: without an adapter and device nothing can render.
#[derive(Debug)]
pub enum GraphicsError {
    /// No suitable GPU adapter was found.
    NoAdapter(wgpu::RequestAdapterError),
    /// The adapter refused to create a device.
    NoDevice(wgpu::RequestDeviceError),
}

impl fmt::Display for GraphicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphicsError::NoAdapter(e) => write!(f, "no suitable GPU adapter: {}", e),
            GraphicsError::NoDevice(e) => write!(f, "failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for GraphicsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GraphicsError::NoAdapter(e) => Some(e),
            GraphicsError::NoDevice(e) => Some(e),
        }
    }
}

/// A shared graphics context.
///
/// Wrapped in `Arc` so renderers, texture uploads and target management can
/// share it without lifetime coupling.
pub struct GraphicsContext {
    instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl GraphicsContext {
    /// Create a context asynchronously.
    pub async fn new() -> Result<Arc<Self>, GraphicsError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(GraphicsError::NoAdapter)?;

        tracing::info!(adapter = %adapter.get_info().name, "GPU adapter acquired");

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("vireo_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            })
            .await
            .map_err(GraphicsError::NoDevice)?;

        Ok(Arc::new(Self {
            instance,
            adapter,
            device,
            queue,
        }))
    }

    /// Create a context synchronously, blocking on the async path.
    pub fn new_sync() -> Result<Arc<Self>, GraphicsError> {
        pollster::block_on(Self::new())
    }

    pub fn instance(&self) -> &wgpu::Instance {
        &self.instance
    }

    pub fn adapter(&self) -> &wgpu::Adapter {
        &self.adapter
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}
