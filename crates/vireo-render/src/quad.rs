//! Sprite-to-vertex geometry: positions, rotation, origin, flip, UV mapping
//! and color packing for one quad.

use vireo_core::geometry::Rect;
use vireo_core::math::Vec2;

use crate::blend::BlendMode;
use crate::color::Color;
use crate::device::ShaderId;
use crate::vertex::Vertex;

/// Mirror mode for a sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flip {
    #[default]
    None,
    Horizontal,
    Vertical,
}

/// Per-sprite draw parameters beyond the destination rectangle.
///
/// ```
/// use vireo_render::{Color, SpriteParams};
///
/// let params = SpriteParams::new()
///     .with_rotation(45.0)
///     .with_depth(2)
///     .with_color(Color::rgba(1.0, 1.0, 1.0, 0.5));
/// # let _ = params;
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SpriteParams {
    /// Sub-region of the texture to sample; `None` uses the full texture.
    pub src: Option<Rect<f32>>,
    /// Rotation in degrees around the origin.
    pub rotation: f32,
    /// Rotation/flip pivot relative to the destination position; `None`
    /// pivots at the top-left corner.
    pub origin: Option<Vec2>,
    pub flip: Flip,
    /// Depth layer; higher layers draw in front.
    pub depth: i32,
    pub color: Color,
    /// Shader override; `None` uses the renderer's default shader.
    pub shader: Option<ShaderId>,
    pub blend: BlendMode,
}

impl SpriteParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_src(mut self, src: Rect<f32>) -> Self {
        self.src = Some(src);
        self
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn with_flip(mut self, flip: Flip) -> Self {
        self.flip = flip;
        self
    }

    pub fn with_depth(mut self, depth: i32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_shader(mut self, shader: ShaderId) -> Self {
        self.shader = Some(shader);
        self
    }

    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }
}

/// Fixed-point UV corner offsets for a source rectangle.
///
/// Returns `(u, v, u_extent, v_extent)` scaled to the full `u16` range.
/// `None` covers the whole texture: `(0, 0, u16::MAX, u16::MAX)` for any
/// texture of at least 1x1.
fn source_uv(tex_width: f32, tex_height: f32, src: Option<Rect<f32>>) -> (u16, u16, u16, u16) {
    match src {
        None => (0, 0, u16::MAX, u16::MAX),
        Some(rect) => {
            let max = u16::MAX as f32;
            (
                (rect.x / tex_width * max) as u16,
                (rect.y / tex_height * max) as u16,
                (rect.width / tex_width * max) as u16,
                (rect.height / tex_height * max) as u16,
            )
        }
    }
}

/// Build the four vertices of one sprite quad into `out`.
///
/// Corner order is top-left, top-right, bottom-right, bottom-left in screen
/// space (y down). `depth` is the already-normalized depth coordinate; all
/// four vertices share it, along with the packed color.
#[allow(clippy::too_many_arguments)]
pub fn build_quad(
    out: &mut [Vertex; 4],
    tex_width: f32,
    tex_height: f32,
    dest: Rect<f32>,
    src: Option<Rect<f32>>,
    rotation: f32,
    origin: Option<Vec2>,
    flip: Flip,
    color: Color,
    depth: f32,
) {
    let mut x = dest.x;
    let mut y = dest.y;
    let mut origin = origin.unwrap_or(Vec2::ZERO);

    let mut scale_x = dest.width / tex_width;
    let mut scale_y = dest.height / tex_height;
    match flip {
        Flip::Horizontal => {
            // Negating the scale mirrors the quad; shifting the position and
            // origin keeps the pivot on the unflipped rectangle.
            scale_x = -scale_x;
            x += dest.width;
            origin.x -= dest.width;
        }
        Flip::Vertical => {
            scale_y = -scale_y;
            y += dest.height;
            origin.y -= dest.height;
        }
        Flip::None => {}
    }
    let scaled_width = tex_width * scale_x;
    let scaled_height = tex_height * scale_y;

    if rotation != 0.0 {
        let radians = rotation.to_radians();
        let (sin, cos) = radians.sin_cos();

        let x = x + origin.x;
        let y = y + origin.y;
        let width = scaled_width - origin.x;
        let height = scaled_height - origin.y;

        let corners = [
            (-origin.x, -origin.y),
            (width, -origin.y),
            (width, height),
            (-origin.x, height),
        ];
        for (vertex, (dx, dy)) in out.iter_mut().zip(corners) {
            vertex.position[0] = x + cos * dx - sin * dy;
            vertex.position[1] = y + sin * dx + cos * dy;
        }
    } else {
        // Common case: no trigonometry at all.
        out[0].position[0] = x;
        out[0].position[1] = y;
        out[1].position[0] = x + scaled_width;
        out[1].position[1] = y;
        out[2].position[0] = x + scaled_width;
        out[2].position[1] = y + scaled_height;
        out[3].position[0] = x;
        out[3].position[1] = y + scaled_height;
    }

    let (u, v, u_extent, v_extent) = source_uv(tex_width, tex_height, src);
    out[0].uv = [u, v];
    out[1].uv = [u.saturating_add(u_extent), v];
    out[2].uv = [u.saturating_add(u_extent), v.saturating_add(v_extent)];
    out[3].uv = [u, v.saturating_add(v_extent)];

    let packed = color.to_packed();
    for vertex in out.iter_mut() {
        vertex.position[2] = depth;
        vertex.color = packed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(out: &[Vertex; 4]) -> [[f32; 2]; 4] {
        [
            [out[0].position[0], out[0].position[1]],
            [out[1].position[0], out[1].position[1]],
            [out[2].position[0], out[2].position[1]],
            [out[3].position[0], out[3].position[1]],
        ]
    }

    fn build(
        dest: Rect<f32>,
        src: Option<Rect<f32>>,
        rotation: f32,
        origin: Option<Vec2>,
        flip: Flip,
    ) -> [Vertex; 4] {
        let mut out = [Vertex::ZERO; 4];
        build_quad(
            &mut out,
            64.0,
            32.0,
            dest,
            src,
            rotation,
            origin,
            flip,
            Color::WHITE,
            0.5,
        );
        out
    }

    #[test]
    fn unrotated_quad_covers_destination() {
        let out = build(Rect::new(10.0, 20.0, 128.0, 64.0), None, 0.0, None, Flip::None);
        assert_eq!(
            positions(&out),
            [
                [10.0, 20.0],
                [138.0, 20.0],
                [138.0, 84.0],
                [10.0, 84.0]
            ]
        );
    }

    #[test]
    fn full_turn_approximates_fast_path() {
        let dest = Rect::new(5.0, 7.0, 96.0, 48.0);
        let fast = build(dest, None, 0.0, None, Flip::None);

        // A full turn goes through the trigonometric path; the positions
        // must come back to the fast path's, within float tolerance.
        let turned = build(dest, None, 360.0, None, Flip::None);
        for (a, b) in fast.iter().zip(turned.iter()) {
            assert!((a.position[0] - b.position[0]).abs() < 1e-3);
            assert!((a.position[1] - b.position[1]).abs() < 1e-3);
        }
    }

    #[test]
    fn rotation_quarter_turn_about_origin() {
        // 90 degrees around the top-left corner: the top edge rotates to
        // point down the y axis.
        let out = build(
            Rect::new(0.0, 0.0, 64.0, 32.0),
            None,
            90.0,
            None,
            Flip::None,
        );
        let p = positions(&out);
        assert!((p[0][0]).abs() < 1e-4 && (p[0][1]).abs() < 1e-4);
        assert!((p[1][0]).abs() < 1e-4 && (p[1][1] - 64.0).abs() < 1e-3);
    }

    #[test]
    fn horizontal_flip_mirrors_in_place() {
        let dest = Rect::new(10.0, 0.0, 64.0, 32.0);
        let flipped = build(dest, None, 0.0, None, Flip::Horizontal);
        let p = positions(&flipped);

        // Same footprint, left and right edges swapped.
        assert_eq!(p[0], [74.0, 0.0]);
        assert_eq!(p[1], [10.0, 0.0]);
        assert_eq!(p[2], [10.0, 32.0]);
        assert_eq!(p[3], [74.0, 32.0]);
    }

    #[test]
    fn full_texture_uv_spans_fixed_point_range() {
        for (w, h) in [(1.0, 1.0), (64.0, 32.0), (1021.0, 3.0)] {
            // Both the implicit default and an explicit full-texture source
            // rect must span the whole range.
            for src in [None, Some(Rect::new(0.0, 0.0, w, h))] {
                let mut out = [Vertex::ZERO; 4];
                build_quad(
                    &mut out,
                    w,
                    h,
                    Rect::new(0.0, 0.0, w, h),
                    src,
                    0.0,
                    None,
                    Flip::None,
                    Color::WHITE,
                    0.0,
                );
                assert_eq!(out[0].uv, [0, 0]);
                assert_eq!(out[1].uv, [u16::MAX, 0]);
                assert_eq!(out[2].uv, [u16::MAX, u16::MAX]);
                assert_eq!(out[3].uv, [0, u16::MAX]);
            }
        }
    }

    #[test]
    fn source_rect_uv_is_truncated_fraction() {
        let out = build(
            Rect::new(0.0, 0.0, 32.0, 16.0),
            Some(Rect::new(16.0, 8.0, 32.0, 16.0)),
            0.0,
            None,
            Flip::None,
        );
        // 16/64 and 8/32 are both a quarter of the texture.
        let quarter = (0.25 * u16::MAX as f32) as u16;
        let half = (0.5 * u16::MAX as f32) as u16;
        assert_eq!(out[0].uv, [quarter, quarter]);
        assert_eq!(out[2].uv, [quarter + half, quarter + half]);
    }

    #[test]
    fn color_and_depth_shared_by_all_vertices() {
        let mut out = [Vertex::ZERO; 4];
        build_quad(
            &mut out,
            8.0,
            8.0,
            Rect::new(0.0, 0.0, 8.0, 8.0),
            None,
            0.0,
            None,
            Flip::None,
            Color::rgba(0.5, 0.25, 1.0, 0.999),
            0.75,
        );
        for vertex in &out {
            assert_eq!(vertex.color, [127, 63, 255, 254]);
            assert_eq!(vertex.position[2], 0.75);
        }
    }
}
