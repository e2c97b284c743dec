//! Depth ordering and determinism of the produced vertex stream.

use vireo_render::{
    Rect, SpriteBatch, SpriteBatchDescriptor, SpriteParams, TextureId, TextureInfo, Vertex,
};
use vireo_test_utils::RecordingDevice;

fn new_batch(max_quads: u32) -> SpriteBatch<RecordingDevice> {
    let descriptor = SpriteBatchDescriptor {
        max_quads,
        ..Default::default()
    };
    let mut batch = SpriteBatch::new(RecordingDevice::new(), descriptor).unwrap();
    batch.device_mut().clear_calls();
    batch
}

fn transparent_texture(id: u64) -> TextureInfo {
    TextureInfo::new(TextureId(id), 16, 16).with_transparency()
}

fn opaque_texture(id: u64) -> TextureInfo {
    TextureInfo::new(TextureId(id), 16, 16)
}

fn dest() -> Rect<f32> {
    Rect::new(0.0, 0.0, 16.0, 16.0)
}

/// Depth coordinate of quad `i` in the uploaded stream.
fn quad_depth(vertices: &[Vertex], i: usize) -> f32 {
    vertices[i * 4].position[2]
}

#[test]
fn later_same_layer_transparent_renders_in_front() {
    let mut batch = new_batch(64);
    let texture = transparent_texture(1);

    batch
        .add(&texture, dest(), &SpriteParams::new().with_depth(5))
        .unwrap();
    batch
        .add(&texture, dest(), &SpriteParams::new().with_depth(5))
        .unwrap();
    batch.render_all();

    let vertices = batch.device().uploaded_vertices();
    let first = quad_depth(&vertices, 0);
    let second = quad_depth(&vertices, 1);
    // Pass-on-less depth testing: strictly smaller means strictly in front.
    assert!(
        second < first,
        "second add must be nearer: {second} vs {first}"
    );
}

#[test]
fn higher_layer_renders_in_front_of_lower() {
    let mut batch = new_batch(64);
    let texture = transparent_texture(1);

    batch
        .add(&texture, dest(), &SpriteParams::new().with_depth(1))
        .unwrap();
    batch
        .add(&texture, dest(), &SpriteParams::new().with_depth(2))
        .unwrap();
    batch.render_all();

    let vertices = batch.device().uploaded_vertices();
    assert!(quad_depth(&vertices, 1) < quad_depth(&vertices, 0));
}

#[test]
fn opaque_layers_order_the_same_way() {
    let mut batch = new_batch(64);
    let texture = opaque_texture(1);

    batch
        .add(&texture, dest(), &SpriteParams::new().with_depth(-3))
        .unwrap();
    batch
        .add(&texture, dest(), &SpriteParams::new().with_depth(3))
        .unwrap();
    batch.render_all();

    let vertices = batch.device().uploaded_vertices();
    assert!(quad_depth(&vertices, 1) < quad_depth(&vertices, 0));
}

#[test]
fn out_of_range_depth_clamps_and_proceeds() {
    let mut batch = new_batch(16);
    let texture = transparent_texture(1);

    batch
        .add(&texture, dest(), &SpriteParams::new().with_depth(1000))
        .unwrap();
    batch
        .add(&texture, dest(), &SpriteParams::new().with_depth(-1000))
        .unwrap();
    batch.render_all();

    let stats = batch.stats();
    assert_eq!(stats.quads_added, 2);
    assert_eq!(stats.clamped_depths, 2);
    // Clamped to the boundaries of [-8, 8] for a 16-quad batch.
    assert_eq!(stats.min_depth, -8);
    assert_eq!(stats.max_depth, 8);
}

#[test]
fn clamped_depth_behaves_like_the_boundary() {
    let mut batch = new_batch(16);
    let texture = transparent_texture(1);

    batch
        .add(&texture, dest(), &SpriteParams::new().with_depth(8))
        .unwrap();
    batch
        .add(&texture, dest(), &SpriteParams::new().with_depth(1000))
        .unwrap();
    batch.render_all();

    // The clamped add lands in the boundary bucket, so it behaves like a
    // second same-layer add: strictly in front of the first.
    let vertices = batch.device().uploaded_vertices();
    assert!(quad_depth(&vertices, 1) < quad_depth(&vertices, 0));
}

#[test]
fn depth_ordering_resets_every_frame() {
    let mut batch = new_batch(64);
    let texture = transparent_texture(1);

    batch
        .add(&texture, dest(), &SpriteParams::new().with_depth(3))
        .unwrap();
    batch.render_all();
    let first_frame = batch.device().uploaded_vertices();

    batch.device_mut().clear_calls();
    batch
        .add(&texture, dest(), &SpriteParams::new().with_depth(3))
        .unwrap();
    batch.render_all();
    let second_frame = batch.device().uploaded_vertices();

    // Same input sequence, same output, bit for bit.
    assert_eq!(first_frame, second_frame);
}

#[test]
fn identical_frames_are_deterministic() {
    let build = || {
        let mut batch = new_batch(64);
        let opaque = opaque_texture(1);
        let transparent = transparent_texture(2);
        for i in 0..10 {
            let params = SpriteParams::new().with_depth(i % 4 - 2);
            let rect = Rect::new(i as f32 * 4.0, 0.0, 16.0, 16.0);
            if i % 3 == 0 {
                batch.add(&transparent, rect, &params).unwrap();
            } else {
                batch.add(&opaque, rect, &params).unwrap();
            }
        }
        batch.render_all();
        (
            batch.device().uploaded_vertices(),
            batch.device().draws(),
        )
    };

    assert_eq!(build(), build());
}

#[test]
fn min_max_depth_trackers_follow_adds() {
    let mut batch = new_batch(64);
    let texture = opaque_texture(1);

    batch
        .add(&texture, dest(), &SpriteParams::new().with_depth(-2))
        .unwrap();
    batch
        .add(&texture, dest(), &SpriteParams::new().with_depth(5))
        .unwrap();
    batch.render_all();

    assert_eq!(batch.stats().min_depth, -2);
    assert_eq!(batch.stats().max_depth, 5);
}

#[test]
fn full_texture_uv_round_trip() {
    let mut batch = new_batch(64);
    // Odd texture sizes must still map the full fixed-point range.
    let texture = transparent_texture(1);
    let texture = TextureInfo {
        width: 7,
        height: 13,
        ..texture
    };

    batch.add(&texture, dest(), &SpriteParams::new()).unwrap();
    batch.render_all();

    let vertices = batch.device().uploaded_vertices();
    assert_eq!(vertices[0].uv, [0, 0]);
    assert_eq!(vertices[1].uv, [u16::MAX, 0]);
    assert_eq!(vertices[2].uv, [u16::MAX, u16::MAX]);
    assert_eq!(vertices[3].uv, [0, u16::MAX]);
}
