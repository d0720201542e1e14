pub mod camera;
pub mod context;
pub mod raster;
pub mod shader;

use std::path::Path;

use anyhow::Context as _;
use image::{Rgb, RgbImage};
use tracing::debug;

use crate::model::Mesh;
use crate::util::{Vector2i, Vector3f};
use camera::homogeneous_to_point;
use context::RenderContext;
use raster::Rasterizer;
use shader::Shader;

/// Struct, representing raw rgb8 pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Color {
        return Color { r, g, b };
    }

    /// Get convex combination of two colors: t * c_1 + (1 - t) * c_2.
    /// t is unrestricted, channels saturate.
    pub fn blend(color_1: Color, color_2: Color, t: f32) -> Color {
        return Color {
            r: (t * color_1.r as f32 + (1.0 - t) * color_2.r as f32) as u8,
            g: (t * color_1.g as f32 + (1.0 - t) * color_2.g as f32) as u8,
            b: (t * color_1.b as f32 + (1.0 - t) * color_2.b as f32) as u8,
        };
    }
}

/// Which row of the presented image y = 0 ends up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Origin {
    /// (0, 0) is the bottom left pixel, the image gets flipped on presentation.
    #[default]
    BottomLeft,
    /// (0, 0) is the top left pixel, rows are presented as stored.
    TopLeft,
}

/// Number of pixels in a width x height frame, computed without u32 overflow.
fn pixel_count(width: u32, height: u32) -> usize {
    return width as usize * height as usize;
}

/// Color and depth buffers of one frame.
///
/// Both buffers are row-major with row 0 holding y = 0, the origin convention only matters when the
/// frame leaves the rasterizer through `to_image`. Depth grows towards the camera, the empty value is
/// negative infinity.
pub struct FrameBuffer {
    width: u32,
    height: u32,
    origin: Origin,
    z_buffer: Vec<f32>,    // z-buffer, which continuously fills out after clear() call with every new primitive drawn.
    render_data: Vec<u8>,  // Storing flat rgb8 array.
}

impl FrameBuffer {
    /// Generates cleared frame buffer with specified width and height and bottom left origin.
    pub fn new(width: u32, height: u32) -> FrameBuffer {
        return FrameBuffer::with_origin(width, height, Origin::BottomLeft);
    }

    pub fn with_origin(width: u32, height: u32, origin: Origin) -> FrameBuffer {
        let n_pixels = pixel_count(width, height);
        return FrameBuffer {
            width,
            height,
            origin,
            z_buffer: vec![f32::NEG_INFINITY; n_pixels],
            render_data: vec![0; 3 * n_pixels],
        };
    }

    pub fn width(&self) -> u32 {
        return self.width;
    }

    pub fn height(&self) -> u32 {
        return self.height;
    }

    pub fn origin(&self) -> Origin {
        return self.origin;
    }

    /// Sets all rendered pixels data to (0, 0, 0) and clears z-buffer.
    pub fn clear(&mut self) {
        self.z_buffer.fill(f32::NEG_INFINITY);
        self.render_data.fill(0);
    }

    /// Checking if coordinate is in frame bounds.
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        return x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height;
    }

    fn index(&self, x: i32, y: i32) -> usize {
        return x as usize + y as usize * self.width as usize;
    }

    /// Depth test and write in one step: color and depth are stored only if `depth` is strictly
    /// greater than what the pixel already holds. Returns whether the pixel was written.
    ///
    /// Coordinates outside of the frame are a bug in the caller. Debug builds panic, release builds
    /// ignore the write and return false.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color, depth: f32) -> bool {
        debug_assert!(
            self.in_bounds(x, y),
            "pixel ({}, {}) outside of {}x{} frame",
            x, y, self.width, self.height
        );
        if !self.in_bounds(x, y) {
            return false;
        }
        let index = self.index(x, y);
        if !(depth > self.z_buffer[index]) {
            return false;
        }
        self.z_buffer[index] = depth;
        self.render_data[3 * index + 0] = color.r;
        self.render_data[3 * index + 1] = color.g;
        self.render_data[3 * index + 2] = color.b;
        return true;
    }

    /// Overwrites color only, ignoring and keeping the z-buffer. Out of frame pixels are skipped.
    pub fn put_pixel(&mut self, x: i32, y: i32, color: Color) {
        if !self.in_bounds(x, y) {
            return;
        }
        let index = self.index(x, y);
        self.render_data[3 * index + 0] = color.r;
        self.render_data[3 * index + 1] = color.g;
        self.render_data[3 * index + 2] = color.b;
    }

    pub fn depth_at(&self, x: i32, y: i32) -> f32 {
        assert!(self.in_bounds(x, y), "pixel ({}, {}) outside of frame", x, y);
        return self.z_buffer[self.index(x, y)];
    }

    pub fn color_at(&self, x: i32, y: i32) -> Color {
        assert!(self.in_bounds(x, y), "pixel ({}, {}) outside of frame", x, y);
        let index = 3 * self.index(x, y);
        return Color::new(
            self.render_data[index],
            self.render_data[index + 1],
            self.render_data[index + 2],
        );
    }

    /// Rendered colors as a slice of 3 * (number of pixels), in storage order (row 0 is y = 0).
    pub fn as_render_data(&self) -> &[u8] {
        return &self.render_data[..];
    }

    /// Row of the stored buffers presented at image row `row`.
    fn stored_row(&self, row: u32) -> i32 {
        return match self.origin {
            Origin::BottomLeft => (self.height - 1 - row) as i32,
            Origin::TopLeft => row as i32,
        };
    }

    /// Frame as a top-down image, flipped vertically when the origin is in the bottom left.
    pub fn to_image(&self) -> RgbImage {
        return RgbImage::from_fn(self.width, self.height, |x, row| {
            let color = self.color_at(x as i32, self.stored_row(row));
            Rgb([color.r, color.g, color.b])
        });
    }

    /// Grayscale image of the z-buffer, normalized over the drawn pixels. Empty pixels are black.
    /// Lazy in a sense, that color data for the image is calculated only if this call is made.
    pub fn depth_image(&self) -> RgbImage {
        let drawn = self.z_buffer.iter().filter(|z| z.is_finite());
        let (z_min, z_max) = drawn.fold((f32::MAX, f32::MIN), |(min, max), &z| (min.min(z), max.max(z)));
        let scale = if z_max > z_min { z_max - z_min } else { 1.0 };
        return RgbImage::from_fn(self.width, self.height, |x, row| {
            let z = self.depth_at(x as i32, self.stored_row(row));
            if !z.is_finite() {
                return Rgb([0, 0, 0]);
            }
            // Keeping 0 for the background, drawn pixels start at 1.
            let value = (1.0 + (z - z_min) / scale * 254.0) as u8;
            Rgb([value, value, value])
        });
    }

    /// Writes the presented frame to an image file, format is picked from the extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        return write_image(&self.to_image(), path.as_ref());
    }

    /// Writes `depth_image` to an image file.
    pub fn save_depth<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        return write_image(&self.depth_image(), path.as_ref());
    }

    /// Draws a line between a and b coordinates with specified color
    /// via Bresenham's algorithm as presented in https://en.wikipedia.org/wiki/Bresenham%27s_line_algorithm
    /// Draws line over anything, but consequent primitive draw calls can disrespect it, since z-buffer doesn't change.
    pub fn draw_line(&mut self, a: Vector2i, b: Vector2i, color: Color) {
        let (mut x_0, mut y_0) = (a.x(), a.y());
        let (x_1, y_1) = (b.x(), b.y());
        let dx: i32 = (x_1 - x_0).abs();
        let sx: i32 = if x_0 < x_1 { 1 } else { -1 };
        let dy: i32 = -(y_1 - y_0).abs();
        let sy: i32 = if y_0 < y_1 { 1 } else { -1 };
        let mut error: i32 = dx + dy;

        loop {
            self.put_pixel(x_0, y_0, color);
            if x_0 == x_1 && y_0 == y_1 {
                break;
            }
            let e2 = 2 * error;
            if e2 >= dy {
                if x_0 == x_1 {
                    break;
                }
                error += dy;
                x_0 += sx;
            }
            if e2 <= dx {
                if y_0 == y_1 {
                    break;
                }
                error += dx;
                y_0 += sy;
            }
        }
    }
}

fn write_image(image: &RgbImage, path: &Path) -> anyhow::Result<()> {
    image
        .save(path)
        .with_context(|| format!("failed to write frame to {}", path.display()))?;
    return Ok(());
}

/// Counters for one pass over a mesh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub faces: usize,
    pub culled: usize,
    pub fragments: usize,
}

/// Screen space faces wound clockwise (or collapsed to a line) look away from the camera.
fn faces_away(points: &[Vector3f; 3]) -> bool {
    let e1 = points[1] - points[0];
    let e2 = points[2] - points[0];
    return e1.x() * e2.y() - e1.y() * e2.x() <= 0.0;
}

/// Draws every face of the mesh: three vertex shader calls, optional backface culling and rasterization.
pub fn render_mesh<S: Shader>(
    mesh: &Mesh,
    shader: &mut S,
    rasterizer: &Rasterizer,
    frame: &mut FrameBuffer,
    cull_back_faces: bool,
) -> FrameStats {
    let mut stats = FrameStats::default();
    for face in 0..mesh.n_faces() {
        stats.faces += 1;
        let vertices = [0, 1, 2].map(|corner| shader.vertex(face, corner));
        if cull_back_faces {
            let points = [
                homogeneous_to_point(vertices[0].position),
                homogeneous_to_point(vertices[1].position),
                homogeneous_to_point(vertices[2].position),
            ];
            if faces_away(&points) {
                stats.culled += 1;
                continue;
            }
        }
        stats.fragments += rasterizer.draw_triangle(vertices, &*shader, frame);
    }
    debug!(faces = stats.faces, culled = stats.culled, fragments = stats.fragments, "Mesh rendered");
    return stats;
}

/// Outlines every face of the mesh over the current frame contents.
pub fn draw_wireframe(mesh: &Mesh, context: &RenderContext, frame: &mut FrameBuffer, color: Color) {
    for face in 0..mesh.n_faces() {
        let points = [0, 1, 2].map(|corner| {
            let p = context.to_screen(mesh.position(face, corner));
            Vector2i::new(p.x().round() as i32, p.y().round() as i32)
        });
        for i in 0..3 {
            frame.draw_line(points[i], points[(i + 1) % 3], color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::new(255, 0, 0);
    const GREEN: Color = Color::new(0, 255, 0);

    #[test]
    fn new_frame_is_cleared() {
        let frame = FrameBuffer::new(4, 3);
        assert_eq!(frame.as_render_data().len(), 4 * 3 * 3);
        assert!(frame.as_render_data().iter().all(|&c| c == 0));
        assert_eq!(frame.depth_at(3, 2), f32::NEG_INFINITY);
    }

    #[test]
    fn set_pixel_keeps_closer_fragments_only() {
        let mut frame = FrameBuffer::new(4, 4);
        assert!(frame.set_pixel(1, 2, RED, 0.5));
        assert!(!frame.set_pixel(1, 2, GREEN, 0.2));
        assert_eq!(frame.color_at(1, 2), RED);
        assert!(frame.set_pixel(1, 2, GREEN, 0.7));
        assert_eq!(frame.color_at(1, 2), GREEN);
        assert_eq!(frame.depth_at(1, 2), 0.7);
    }

    #[test]
    fn depth_tie_keeps_first_write() {
        let mut frame = FrameBuffer::new(2, 2);
        assert!(frame.set_pixel(0, 0, RED, 0.5));
        assert!(!frame.set_pixel(0, 0, GREEN, 0.5));
        assert_eq!(frame.color_at(0, 0), RED);
    }

    #[test]
    fn repeated_write_is_idempotent() {
        let mut once = FrameBuffer::new(3, 3);
        let mut twice = FrameBuffer::new(3, 3);
        once.set_pixel(2, 1, RED, 0.3);
        twice.set_pixel(2, 1, RED, 0.3);
        twice.set_pixel(2, 1, RED, 0.3);
        assert_eq!(once.as_render_data(), twice.as_render_data());
        assert_eq!(once.depth_at(2, 1), twice.depth_at(2, 1));
    }

    #[test]
    fn clear_resets_color_and_depth() {
        let mut frame = FrameBuffer::new(2, 2);
        frame.set_pixel(1, 1, RED, 10.0);
        frame.clear();
        assert_eq!(frame.color_at(1, 1), Color::BLACK);
        assert_eq!(frame.depth_at(1, 1), f32::NEG_INFINITY);
        assert!(frame.set_pixel(1, 1, GREEN, -1000.0));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic]
    fn out_of_bounds_write_panics_in_debug() {
        let mut frame = FrameBuffer::new(2, 2);
        frame.set_pixel(2, 0, RED, 1.0);
    }

    #[test]
    fn presentation_flips_bottom_left_origin() {
        let mut frame = FrameBuffer::new(2, 3);
        frame.set_pixel(0, 0, RED, 1.0);
        let image = frame.to_image();
        assert_eq!(image.get_pixel(0, 2).0, [255, 0, 0]);
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0]);

        let mut frame = FrameBuffer::with_origin(2, 3, Origin::TopLeft);
        frame.set_pixel(0, 0, RED, 1.0);
        assert_eq!(frame.to_image().get_pixel(0, 0).0, [255, 0, 0]);
    }

    #[test]
    fn depth_image_normalizes_drawn_pixels() {
        let mut frame = FrameBuffer::with_origin(3, 1, Origin::TopLeft);
        frame.set_pixel(0, 0, RED, -2.0);
        frame.set_pixel(1, 0, RED, 2.0);
        let depth = frame.depth_image();
        assert_eq!(depth.get_pixel(0, 0).0, [1, 1, 1]);
        assert_eq!(depth.get_pixel(1, 0).0, [255, 255, 255]);
        assert_eq!(depth.get_pixel(2, 0).0, [0, 0, 0]);
    }

    #[test]
    fn pixel_count_does_not_overflow_u32() {
        assert_eq!(pixel_count(70_000, 70_000), 4_900_000_000);
        assert_eq!(pixel_count(0, 5), 0);
    }

    #[test]
    fn depth_view_is_written_to_file() {
        let mut frame = FrameBuffer::with_origin(2, 1, Origin::TopLeft);
        frame.set_pixel(0, 0, RED, 3.0);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("depth.png");
        frame.save_depth(&path).unwrap();
        let image = image::open(&path).unwrap().to_rgb8();
        assert_eq!(image.get_pixel(0, 0).0, [1, 1, 1]);
        assert_eq!(image.get_pixel(1, 0).0, [0, 0, 0]);

        assert!(frame.save_depth(dir.path().join("missing/depth.png")).is_err());
    }

    #[test]
    fn line_ignores_depth_and_clips() {
        let mut frame = FrameBuffer::new(5, 5);
        frame.set_pixel(2, 2, GREEN, 100.0);
        frame.draw_line(Vector2i::new(0, 0), Vector2i::new(6, 6), RED);
        for i in 0..5 {
            assert_eq!(frame.color_at(i, i), RED);
        }
        assert_eq!(frame.depth_at(2, 2), 100.0);
        assert_eq!(frame.color_at(1, 0), Color::BLACK);
    }

    #[test]
    fn blend_interpolates_channels() {
        assert_eq!(Color::blend(Color::WHITE, Color::BLACK, 0.5), Color::new(127, 127, 127));
        assert_eq!(Color::blend(RED, GREEN, 1.0), RED);
        assert_eq!(Color::blend(RED, GREEN, 0.0), GREEN);
    }

    #[test]
    fn back_faces_are_detected_by_winding() {
        let ccw = [
            Vector3f::new(0.0, 0.0, 0.0),
            Vector3f::new(1.0, 0.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
        ];
        let cw = [ccw[0], ccw[2], ccw[1]];
        assert!(!faces_away(&ccw));
        assert!(faces_away(&cw));
    }
}
