use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// Honors `RUST_LOG` when set; otherwise defaults to `info` for the
/// workspace crates and quiets the chattier GPU stack internals.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,wgpu_core=warn,wgpu_hal=warn,naga=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
