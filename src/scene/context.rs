use crate::util::{Matrix, Vector3f, Vector4f};

use super::camera::{homogeneous_to_point, projection, viewport, Camera};

/// Frame constants shared by the shader stages: transform matrices and light direction.
/// Built once per frame and handed to shaders by reference.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub width: u32,
    pub height: u32,
    pub depth: f32,
    pub model_view: Matrix,
    pub projection: Matrix,
    pub viewport: Matrix,
    pub vpmv_matrix: Matrix,          // Applied to vertices to get final screen coordinates.
    pub light_direction: Vector3f,    // World space, normalized.
}

impl RenderContext {
    /// Context for a `width` x `height` frame. The viewport leaves a 1/8 margin on every side and maps
    /// depth to [0, depth].
    pub fn new(camera: &Camera, light_direction: Vector3f, width: u32, height: u32, depth: f32) -> Self {
        let (w, h) = (width as i32, height as i32);
        let viewport = viewport(w / 8, h / 8, w * 3 / 4, h * 3 / 4, depth);
        return RenderContext::with_viewport(camera, light_direction, viewport, width, height, depth);
    }

    /// Context with a caller supplied viewport matrix.
    pub fn with_viewport(
        camera: &Camera,
        light_direction: Vector3f,
        viewport: Matrix,
        width: u32,
        height: u32,
        depth: f32,
    ) -> Self {
        let model_view = camera.view_matrix();
        let projection = projection(camera.projection_coefficient());
        let vpmv_matrix = &(&viewport * &projection) * &model_view;
        return RenderContext {
            width,
            height,
            depth,
            model_view,
            projection,
            viewport,
            vpmv_matrix,
            light_direction: light_direction.normalized(),
        };
    }

    /// Clip space position of a world space point.
    pub fn to_clip(&self, position: Vector3f) -> Vector4f {
        return &self.vpmv_matrix * position.embed::<4>(1.0);
    }

    /// Screen position of a world space point: pixel x, y and depth z.
    pub fn to_screen(&self, position: Vector3f) -> Vector3f {
        return homogeneous_to_point(self.to_clip(position));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        return Camera::new(
            Vector3f::new(0.0, 0.0, 3.0),
            Vector3f::new(0.0, 0.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
        );
    }

    #[test]
    fn center_projects_to_middle_of_viewport() {
        let context = RenderContext::new(&camera(), Vector3f::new(0.0, 0.0, 2.0), 80, 80, 255.0);
        let p = context.to_screen(Vector3f::new(0.0, 0.0, 0.0));
        assert!((p.x() - 40.0).abs() < 1e-3, "{}", p);
        assert!((p.y() - 40.0).abs() < 1e-3, "{}", p);
        assert!((context.light_direction.norm() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn closer_points_get_larger_depth() {
        let context = RenderContext::new(&camera(), Vector3f::new(0.0, 0.0, 1.0), 80, 80, 255.0);
        let near = context.to_screen(Vector3f::new(0.0, 0.0, 0.5));
        let far = context.to_screen(Vector3f::new(0.0, 0.0, -0.5));
        assert!(near.z() > far.z());
    }

    #[test]
    fn foreshortening_has_its_pinhole_in_the_eye() {
        let context = RenderContext::new(&camera(), Vector3f::new(0.0, 0.0, 1.0), 800, 800, 255.0);
        let middle = context.to_screen(Vector3f::new(0.0, 0.0, 0.0)).x();
        // 1 unit in front of the eye vs 3 units in front of it.
        let near = context.to_screen(Vector3f::new(1.0, 0.0, 2.0)).x() - middle;
        let far = context.to_screen(Vector3f::new(1.0, 0.0, 0.0)).x() - middle;
        assert!((near / far - 3.0).abs() < 1e-3, "{}", near / far);
    }

    #[test]
    fn points_behind_the_eye_get_negative_w() {
        let context = RenderContext::new(&camera(), Vector3f::new(0.0, 0.0, 1.0), 80, 80, 255.0);
        assert!(context.to_clip(Vector3f::new(0.0, 0.0, 4.0)).w() < 0.0);
        assert!(context.to_clip(Vector3f::new(0.0, 0.0, 2.5)).w() > 0.0);
    }
}
