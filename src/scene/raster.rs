use crate::texture::Texture;
use crate::util::{Vector2f, Vector2i, Vector3f};

use super::camera::homogeneous_to_point;
use super::shader::{ClipVertex, Interpolate, Shader};
use super::{Color, FrameBuffer};

/// Triangles whose doubled screen area is below this are treated as degenerate.
pub const DEFAULT_DEGENERATE_EPSILON: f32 = 1e-2;

/// Weights returned for degenerate triangles, negative so every pixel gets rejected.
const DEGENERATE_BARYCENTRIC: [f32; 3] = [-1.0, 1.0, 1.0];

/// Barycentric coordinates (u, v, w) of `p` with respect to triangle abc, so that
/// p = u * a + v * b + w * c. Only x and y of the points are used.
///
/// If the triangle area is below `epsilon` the triangle is degenerate and the result is (-1, 1, 1).
pub fn barycentric(a: Vector3f, b: Vector3f, c: Vector3f, p: Vector3f, epsilon: f32) -> Vector3f {
    let s_x = Vector3f::new(c.x() - a.x(), b.x() - a.x(), a.x() - p.x());
    let s_y = Vector3f::new(c.y() - a.y(), b.y() - a.y(), a.y() - p.y());
    let t = s_x.cross(&s_y);
    if !(t.z().abs() >= epsilon) {
        return Vector3f::from(DEGENERATE_BARYCENTRIC);
    }
    return Vector3f::new(1.0 - (t.x() + t.y()) / t.z(), t.y() / t.z(), t.x() / t.z());
}

/// Inside test on barycentric weights. NaN weights count as outside.
fn is_inside(bar: Vector3f) -> bool {
    return bar.x() >= 0.0 && bar.y() >= 0.0 && bar.z() >= 0.0;
}

/// Scanline-free triangle rasterizer: bounding box scan with a barycentric inside test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rasterizer {
    pub degenerate_epsilon: f32,
}

impl Default for Rasterizer {
    fn default() -> Self {
        return Rasterizer { degenerate_epsilon: DEFAULT_DEGENERATE_EPSILON };
    }
}

impl Rasterizer {
    pub fn new(degenerate_epsilon: f32) -> Self {
        return Rasterizer { degenerate_epsilon };
    }

    /// Bounding box of the points clamped to the frame, None if nothing of it is on screen.
    fn bounding_box(points: &[Vector3f; 3], frame: &FrameBuffer) -> Option<(Vector2i, Vector2i)> {
        if frame.width() == 0 || frame.height() == 0 {
            return None;
        }
        let clamp = Vector2f::new((frame.width() - 1) as f32, (frame.height() - 1) as f32);
        let mut bbox_min = Vector2f::new(f32::MAX, f32::MAX);
        let mut bbox_max = Vector2f::new(-f32::MAX, -f32::MAX);
        for point in points {
            for j in 0..2 {
                bbox_min[j] = bbox_min[j].min(point[j]);
                bbox_max[j] = bbox_max[j].max(point[j]);
            }
        }
        let ll = Vector2i::new(
            bbox_min.x().floor().max(0.0) as i32,
            bbox_min.y().floor().max(0.0) as i32,
        );
        let ur = Vector2i::new(
            bbox_max.x().ceil().min(clamp.x()) as i32,
            bbox_max.y().ceil().min(clamp.y()) as i32,
        );
        if ll.x() > ur.x() || ll.y() > ur.y() {
            return None;
        }
        return Some((ll, ur));
    }

    /// Core loop shared by all triangle flavours. For every pixel inside the triangle whose
    /// interpolated depth beats the z-buffer, `fragment` is asked for a color, None discards the pixel.
    /// Returns the number of written pixels.
    pub fn rasterize<F>(&self, points: [Vector3f; 3], frame: &mut FrameBuffer, mut fragment: F) -> usize
    where
        F: FnMut(Vector3f) -> Option<Color>,
    {
        let Some((ll, ur)) = Rasterizer::bounding_box(&points, frame) else {
            return 0;
        };
        let [a, b, c] = points;
        let depths = Vector3f::new(a.z(), b.z(), c.z());
        let mut written = 0;
        for x in ll.x()..=ur.x() {
            for y in ll.y()..=ur.y() {
                let p = Vector3f::new(x as f32, y as f32, 0.0);
                let bar = barycentric(a, b, c, p, self.degenerate_epsilon);
                if !is_inside(bar) {
                    // If any of the coordinates are negative, point is not in the triangle, so skipping it.
                    continue;
                }
                let depth = bar.dot(&depths);
                if !(depth > frame.depth_at(x, y)) {
                    continue;
                }
                let Some(color) = fragment(bar) else {
                    continue;
                };
                if frame.set_pixel(x, y, color, depth) {
                    written += 1;
                }
            }
        }
        return written;
    }

    /// Shaded triangle. Clip space positions go through the perspective divide, varyings are
    /// interpolated per pixel and passed to the fragment stage together with the barycentric weights.
    pub fn draw_triangle<S: Shader>(
        &self,
        vertices: [ClipVertex<S::Varying>; 3],
        shader: &S,
        frame: &mut FrameBuffer,
    ) -> usize {
        let [a, b, c] = vertices;
        let points = [
            homogeneous_to_point(a.position),
            homogeneous_to_point(b.position),
            homogeneous_to_point(c.position),
        ];
        let varyings = [a.varying, b.varying, c.varying];
        return self.rasterize(points, frame, |bar| {
            let varying = S::Varying::interpolate(&varyings, bar);
            shader.fragment(&varying, bar)
        });
    }

    /// Triangle filled with a single color.
    pub fn draw_filled_triangle(&self, points: [Vector3f; 3], color: Color, frame: &mut FrameBuffer) -> usize {
        return self.rasterize(points, frame, |_| Some(color));
    }

    /// Unshaded textured triangle on screen space points. The texel at the interpolated uv is
    /// scaled by the interpolated intensity clamped to [0, 1], or copied when there are no intensities.
    pub fn draw_textured_triangle(
        &self,
        points: [Vector3f; 3],
        uvs: [Vector2f; 3],
        intensities: Option<Vector3f>,
        texture: &Texture,
        frame: &mut FrameBuffer,
    ) -> usize {
        return self.rasterize(points, frame, |bar| {
            let uv = Vector2f::interpolate(&uvs, bar);
            let texel = texture.sample_uv(uv);
            match intensities {
                Some(intensities) => {
                    let intensity = bar.dot(&intensities).clamp(0.0, 1.0);
                    Some(Color::blend(texel, Color::BLACK, intensity))
                }
                None => Some(texel),
            }
        });
    }
}
