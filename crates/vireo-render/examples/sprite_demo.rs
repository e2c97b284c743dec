//! Headless sprite batching demo.
//!
//! Renders a few frames of mixed opaque and transparent sprites into an
//! offscreen target and prints the per-frame statistics: quad counts, how
//! many draw calls the runs coalesced into, and the state switches issued.
//!
//! Run with: `cargo run -p vireo-render --example sprite_demo`

use vireo_core::logging;
use vireo_render::{
    Color, Flip, GraphicsContext, Rect, SpriteBatch, SpriteBatchDescriptor, SpriteParams,
    WgpuDevice,
};

const SURFACE_WIDTH: u32 = 1280;
const SURFACE_HEIGHT: u32 = 720;

/// A procedural checkerboard so the demo needs no asset files.
fn checkerboard(size: u32, on: [u8; 4], off: [u8; 4]) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let texel = if (x / 8 + y / 8) % 2 == 0 { on } else { off };
            pixels.extend_from_slice(&texel);
        }
    }
    pixels
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let context = GraphicsContext::new_sync()?;
    let mut device = WgpuDevice::new(context, SURFACE_WIDTH, SURFACE_HEIGHT);
    device.set_clear_color(Some(Color::BLACK));

    // One fully opaque texture, one with transparent holes.
    let tiles = device.create_texture(&checkerboard(64, [200, 60, 40, 255], [40, 60, 200, 255]), 64, 64);
    let glass = device.create_texture(&checkerboard(64, [255, 255, 255, 160], [0, 0, 0, 0]), 64, 64);

    let mut batch = SpriteBatch::new(
        device,
        SpriteBatchDescriptor::new(SURFACE_WIDTH, SURFACE_HEIGHT),
    )?;

    for frame in 0..3u32 {
        // A grid of opaque tiles on layer 0.
        for i in 0..12 {
            batch.add(
                &tiles,
                Rect::new(i as f32 * 100.0, 100.0, 96.0, 96.0),
                &SpriteParams::new(),
            )?;
        }

        // Rotating translucent panes above, layered by add order.
        for i in 0..6 {
            batch.add(
                &glass,
                Rect::new(120.0 + i as f32 * 150.0, 140.0, 128.0, 128.0),
                &SpriteParams::new()
                    .with_depth(1)
                    .with_rotation((frame * 15 + i * 30) as f32)
                    .with_color(Color::rgba(1.0, 1.0, 1.0, 0.7)),
            )?;
        }

        // One flipped tile sprite in front of everything.
        batch.add(
            &tiles,
            Rect::new(560.0, 300.0, 192.0, 192.0),
            &SpriteParams::new().with_depth(2).with_flip(Flip::Horizontal),
        )?;

        batch.render_all();

        let stats = batch.stats();
        println!(
            "frame {frame}: {} quads ({} opaque, {} transparent), {} uploads, {} draw calls, {} texture switches",
            stats.quads_added,
            stats.opaque_quads,
            stats.transparent_quads,
            stats.uploads,
            stats.draw_calls,
            stats.texture_switches,
        );
    }

    Ok(())
}
