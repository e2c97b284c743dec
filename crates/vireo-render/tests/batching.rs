//! Draw submission behavior: uploads, run coalescing, capacity and routing.

use vireo_render::{
    AddError, Color, Rect, RenderError, RenderTarget, RenderTargetId, ShaderId, Size, SpriteBatch,
    SpriteBatchDescriptor, SpriteParams, TextureId, TextureInfo,
};
use vireo_test_utils::{DeviceCall, RecordingDevice};

fn new_batch(max_quads: u32) -> SpriteBatch<RecordingDevice> {
    let descriptor = SpriteBatchDescriptor {
        max_quads,
        ..Default::default()
    };
    let mut batch = SpriteBatch::new(RecordingDevice::new(), descriptor).unwrap();
    // Drop the construction-time Prepare record so frame assertions start
    // from a clean slate.
    batch.device_mut().clear_calls();
    batch
}

fn opaque_texture(id: u64) -> TextureInfo {
    TextureInfo::new(TextureId(id), 16, 16)
}

fn transparent_texture(id: u64) -> TextureInfo {
    TextureInfo::new(TextureId(id), 16, 16).with_transparency()
}

fn dest() -> Rect<f32> {
    Rect::new(0.0, 0.0, 16.0, 16.0)
}

#[test]
fn construction_failure_is_fatal() {
    let result = SpriteBatch::new(RecordingDevice::failing(), SpriteBatchDescriptor::default());
    assert!(matches!(
        result.err(),
        Some(RenderError::BufferAllocation { .. })
    ));
}

#[test]
fn empty_frame_touches_no_device() {
    let mut batch = new_batch(64);
    batch.render_all();
    assert_eq!(batch.device().call_count(), 0);
}

#[test]
fn clear_then_render_is_free() {
    let mut batch = new_batch(64);
    let texture = opaque_texture(1);
    batch.add(&texture, dest(), &SpriteParams::new()).unwrap();
    batch.add(&texture, dest(), &SpriteParams::new()).unwrap();

    batch.clear_all();
    batch.render_all();

    assert_eq!(batch.device().call_count(), 0);
    assert_eq!(batch.device().upload_count(), 0);
    assert_eq!(batch.device().draw_call_count(), 0);
}

#[test]
fn identical_state_coalesces_to_one_draw() {
    let mut batch = new_batch(64);
    let texture = opaque_texture(1);
    for _ in 0..3 {
        batch.add(&texture, dest(), &SpriteParams::new()).unwrap();
    }
    batch.render_all();

    assert_eq!(batch.device().draws(), vec![(0, 3)]);
}

#[test]
fn differing_texture_in_the_middle_splits_runs() {
    let mut batch = new_batch(64);
    let a = opaque_texture(1);
    let b = opaque_texture(2);

    batch.add(&a, dest(), &SpriteParams::new()).unwrap();
    batch.add(&b, dest(), &SpriteParams::new()).unwrap();
    batch.add(&a, dest(), &SpriteParams::new()).unwrap();
    batch.render_all();

    // Three runs of one quad each: one draw call per run.
    assert_eq!(batch.device().draw_call_count(), 3);
    let mut draws = batch.device().draws();
    draws.sort_unstable();
    assert_eq!(draws, vec![(0, 1), (1, 1), (2, 1)]);
}

#[test]
fn trailing_run_still_coalesces() {
    let mut batch = new_batch(64);
    let a = opaque_texture(1);
    let b = opaque_texture(2);

    batch.add(&a, dest(), &SpriteParams::new()).unwrap();
    batch.add(&a, dest(), &SpriteParams::new()).unwrap();
    batch.add(&b, dest(), &SpriteParams::new()).unwrap();
    batch.render_all();

    assert_eq!(batch.device().draw_call_count(), 2);
    let mut draws = batch.device().draws();
    draws.sort_unstable();
    assert_eq!(draws, vec![(0, 2), (2, 1)]);
}

#[test]
fn one_upload_per_nonempty_partition() {
    let mut batch = new_batch(64);
    let opaque = opaque_texture(1);
    let transparent = transparent_texture(2);

    batch.add(&opaque, dest(), &SpriteParams::new()).unwrap();
    batch.add(&transparent, dest(), &SpriteParams::new()).unwrap();
    batch.add(&transparent, dest(), &SpriteParams::new()).unwrap();
    batch.render_all();

    let uploads = batch.device().uploads();
    assert_eq!(uploads.len(), 2);
    // Opaque partition first at quad 0, transparent after it.
    assert_eq!(uploads[0].0, 0);
    assert_eq!(uploads[0].1.len(), 4);
    assert_eq!(uploads[1].0, 1);
    assert_eq!(uploads[1].1.len(), 8);
}

#[test]
fn single_partition_frame_uploads_once() {
    let mut batch = new_batch(64);
    let transparent = transparent_texture(2);
    batch.add(&transparent, dest(), &SpriteParams::new()).unwrap();
    batch.render_all();

    assert_eq!(batch.device().upload_count(), 1);
    assert_eq!(batch.device().uploads()[0].0, 0);
}

#[test]
fn capacity_rejection_keeps_prefix_intact() {
    let mut full = new_batch(2);
    let texture = opaque_texture(1);

    full.add(&texture, Rect::new(0.0, 0.0, 8.0, 8.0), &SpriteParams::new())
        .unwrap();
    full.add(&texture, Rect::new(8.0, 0.0, 8.0, 8.0), &SpriteParams::new())
        .unwrap();
    let rejected = full.add(&texture, Rect::new(16.0, 0.0, 8.0, 8.0), &SpriteParams::new());
    assert!(matches!(
        rejected,
        Err(AddError::CapacityExceeded { max_quads: 2 })
    ));
    full.render_all();

    // The same two adds without the rejected one produce identical uploads.
    let mut reference = new_batch(2);
    reference
        .add(&texture, Rect::new(0.0, 0.0, 8.0, 8.0), &SpriteParams::new())
        .unwrap();
    reference
        .add(&texture, Rect::new(8.0, 0.0, 8.0, 8.0), &SpriteParams::new())
        .unwrap();
    reference.render_all();

    assert_eq!(
        full.device().uploaded_vertices(),
        reference.device().uploaded_vertices()
    );
    assert_eq!(full.stats().quads_added, 2);
    assert_eq!(full.stats().rejected_adds, 1);
}

#[test]
fn opaque_texture_with_opaque_color_routes_opaque() {
    let mut batch = new_batch(64);
    let texture = opaque_texture(1);
    batch
        .add(&texture, dest(), &SpriteParams::new().with_color(Color::WHITE))
        .unwrap();
    batch.render_all();

    assert_eq!(batch.stats().opaque_quads, 1);
    assert_eq!(batch.stats().transparent_quads, 0);
}

#[test]
fn translucent_color_routes_transparent() {
    let mut batch = new_batch(64);
    let texture = opaque_texture(1);
    batch
        .add(
            &texture,
            dest(),
            &SpriteParams::new().with_color(Color::rgba(1.0, 1.0, 1.0, 0.5)),
        )
        .unwrap();
    batch.render_all();

    assert_eq!(batch.stats().transparent_quads, 1);
    assert_eq!(batch.stats().opaque_quads, 0);
}

#[test]
fn transparency_flagged_texture_routes_transparent() {
    let mut batch = new_batch(64);
    let texture = transparent_texture(1);
    batch
        .add(&texture, dest(), &SpriteParams::new().with_color(Color::WHITE))
        .unwrap();
    batch.render_all();

    assert_eq!(batch.stats().transparent_quads, 1);
}

#[test]
fn frame_is_bracketed_by_begin_and_end() {
    let mut batch = new_batch(64);
    let texture = opaque_texture(1);
    batch.add(&texture, dest(), &SpriteParams::new()).unwrap();
    batch.render_all();

    let calls = batch.device().calls();
    assert!(matches!(calls.first(), Some(DeviceCall::BeginFrame { .. })));
    assert!(matches!(calls.last(), Some(DeviceCall::EndFrame)));
}

#[test]
fn state_binds_once_for_uniform_frames() {
    let mut batch = new_batch(64);
    let texture = opaque_texture(1);
    for _ in 0..5 {
        batch.add(&texture, dest(), &SpriteParams::new()).unwrap();
    }
    batch.render_all();

    assert_eq!(batch.device().texture_bind_count(), 1);
    assert_eq!(batch.device().shader_bind_count(), 1);
    assert_eq!(batch.device().blend_bind_count(), 1);
}

#[test]
fn shader_matrix_pushed_once_per_switch() {
    let mut batch = new_batch(64);
    let texture = opaque_texture(1);
    let custom = ShaderId(7);

    batch.add(&texture, dest(), &SpriteParams::new()).unwrap();
    batch
        .add(&texture, dest(), &SpriteParams::new().with_shader(custom))
        .unwrap();
    batch.add(&texture, dest(), &SpriteParams::new()).unwrap();
    batch.render_all();

    // Three runs with two distinct shaders: one matrix push per switch,
    // never one per quad.
    assert_eq!(batch.device().shader_bind_count(), 3);
}

#[test]
fn opaque_draws_before_transparent() {
    let mut batch = new_batch(64);
    let opaque = opaque_texture(1);
    let transparent = transparent_texture(1);

    batch.add(&transparent, dest(), &SpriteParams::new()).unwrap();
    batch.add(&opaque, dest(), &SpriteParams::new()).unwrap();
    batch.render_all();

    // Opaque occupies quad 0, transparent quad 1; the opaque draw comes
    // first regardless of add order.
    assert_eq!(batch.device().draws(), vec![(0, 1), (1, 1)]);
}

#[test]
fn render_target_reaches_the_device() {
    let mut batch = new_batch(64);
    let target = RenderTarget {
        id: RenderTargetId(3),
        size: Size::new(256, 256),
    };
    batch.set_render_target(Some(target));

    let texture = opaque_texture(1);
    batch.add(&texture, dest(), &SpriteParams::new()).unwrap();
    batch.render_all();

    assert!(
        batch
            .device()
            .calls()
            .contains(&DeviceCall::BeginFrame {
                target: Some(RenderTargetId(3))
            })
    );

    batch.set_render_target(None);
    batch.device_mut().clear_calls();
    batch.add(&texture, dest(), &SpriteParams::new()).unwrap();
    batch.render_all();

    assert!(
        batch
            .device()
            .calls()
            .contains(&DeviceCall::BeginFrame { target: None })
    );
}
