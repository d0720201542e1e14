use std::path::Path;
use std::time;

use anyhow::{anyhow, bail};
use show_image::{create_window, event, ImageInfo, ImageView, WindowOptions};
use tracing::{info, warn};

use crate::config::RenderConfig;
use crate::model::Mesh;
use crate::scene::camera::Camera;
use crate::scene::context::RenderContext;
use crate::scene::raster::Rasterizer;
use crate::scene::shader::{GouraudShader, ShaderKind, TextureShader};
use crate::scene::{draw_wireframe, render_mesh, Color, FrameBuffer, FrameStats};
use crate::texture::Texture;

/// Helper, defining exit event to be an Escape key press.
fn is_exit_event(window_event: event::WindowEvent) -> bool {
    if let event::WindowEvent::KeyboardInput(event) = window_event {
        if event.input.key_code == Some(event::VirtualKeyCode::Escape) && event.input.state.is_released() {
            return true;
        }
    }

    return false;
}

/// Mesh and texture of the configured scene. Without a texture path the mesh is drawn in white.
pub fn load_assets(config: &RenderConfig) -> anyhow::Result<(Mesh, Texture)> {
    let mesh = Mesh::load(&config.model_path)?;
    info!(path = %config.model_path.display(), vertices = mesh.n_vertices(), faces = mesh.n_faces(), "Mesh loaded");

    let texture = match &config.texture_path {
        Some(path) => {
            let texture = Texture::load(path)?;
            info!(path = %path.display(), width = texture.width(), height = texture.height(), "Texture loaded");
            texture
        }
        None => {
            warn!("No texture given, using solid white");
            Texture::solid(Color::WHITE)
        }
    };
    return Ok((mesh, texture));
}

/// Clears `frame` and draws the mesh seen from `camera` with the configured shader.
pub fn render_frame(
    config: &RenderConfig,
    camera: &Camera,
    mesh: &Mesh,
    texture: &Texture,
    frame: &mut FrameBuffer,
) -> FrameStats {
    frame.clear();
    let context = RenderContext::new(camera, config.light_direction(), frame.width(), frame.height(), config.depth);
    let rasterizer = Rasterizer::new(config.degenerate_epsilon);

    let stats = match config.shader {
        ShaderKind::Gouraud => {
            let mut shader = GouraudShader::new(mesh, texture, &context);
            render_mesh(mesh, &mut shader, &rasterizer, frame, config.cull_back_faces)
        }
        ShaderKind::Texture => {
            let mut shader = TextureShader::new(mesh, texture, &context);
            render_mesh(mesh, &mut shader, &rasterizer, frame, config.cull_back_faces)
        }
    };

    if config.wireframe {
        draw_wireframe(mesh, &context, frame, Color::WHITE);
    }
    return stats;
}

/// Camera with its eye rotated by `angle` radians around the `up` axis through `center`.
pub fn orbit(camera: &Camera, angle: f32) -> Camera {
    let axis = camera.up.normalized();
    let offset = camera.eye - camera.center;
    let (sin, cos) = angle.sin_cos();
    // Rodrigues' rotation.
    let rotated = offset * cos + axis.cross(&offset) * sin + axis * (axis.dot(&offset) * (1.0 - cos));
    return Camera { eye: camera.center + rotated, ..*camera };
}

/// Renders according to `config`: a single frame written to `output_path` if set, a window otherwise.
pub fn run(config: RenderConfig) -> anyhow::Result<()> {
    let camera = config.camera();
    if camera.is_degenerate(config.parallel_tolerance) {
        bail!(
            "camera up {:?} is parallel to the view direction from {:?} to {:?}",
            config.up,
            config.eye,
            config.center
        );
    }

    let (mesh, texture) = load_assets(&config)?;

    return match &config.output_path {
        Some(path) => render_to_file(&config, &camera, &mesh, &texture, path),
        None => show_window(&config, &camera, &mesh, &texture),
    };
}

fn render_to_file(
    config: &RenderConfig,
    camera: &Camera,
    mesh: &Mesh,
    texture: &Texture,
    path: &Path,
) -> anyhow::Result<()> {
    let mut frame = FrameBuffer::new(config.width, config.height);
    let stats = render_frame(config, camera, mesh, texture, &mut frame);
    if config.depth_view {
        frame.save_depth(path)?;
    } else {
        frame.save(path)?;
    }
    info!(path = %path.display(), fragments = stats.fragments, culled = stats.culled, "Frame written");
    return Ok(());
}

/// Launches the window and redraws until Escape is released.
fn show_window(config: &RenderConfig, camera: &Camera, mesh: &Mesh, texture: &Texture) -> anyhow::Result<()> {
    let mut frame = FrameBuffer::new(config.width, config.height);

    let window_options: WindowOptions = WindowOptions {
        size: Some([config.width, config.height]),
        ..Default::default()
    };
    let window = create_window("output", window_options).map_err(|e| anyhow!("failed to create window: {e}"))?;
    let event_channel = window.event_channel().map_err(|e| anyhow!("failed to subscribe to window events: {e}"))?;

    let mut exit = false;
    let time_begin = time::Instant::now();
    let mut frame_counter_time_begin = time::Instant::now();
    let mut frame_counter: u32 = 0;
    while !exit {
        let passed_time = time::Instant::now().duration_since(time_begin).as_secs_f32();
        let frame_camera = orbit(camera, config.orbit_speed * passed_time);
        render_frame(config, &frame_camera, mesh, texture, &mut frame);

        let image = if config.depth_view { frame.depth_image() } else { frame.to_image() };
        let image_data = ImageView::new(ImageInfo::rgb8(config.width, config.height), image.as_raw());
        window.set_image("image", image_data).map_err(|e| anyhow!("failed to present frame: {e}"))?;

        // Draining the events piled up since the last frame, looking for the exit event.
        exit = event_channel
            .try_iter()
            .map(is_exit_event)
            .reduce(|was_exit_event, is_exit_event| was_exit_event || is_exit_event)
            .unwrap_or(false);

        if config.print_fps {
            frame_counter += 1;
            if time::Instant::now().duration_since(frame_counter_time_begin).as_secs_f32() > 1.0 {
                info!(fps = frame_counter, "Frame rate");
                frame_counter_time_begin = time::Instant::now();
                frame_counter = 0;
            }
        }
    }

    return Ok(());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::Vector3f;

    fn camera() -> Camera {
        return Camera::new(
            Vector3f::new(0.0, 0.0, 3.0),
            Vector3f::new(0.0, 0.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
        );
    }

    #[test]
    fn orbit_rotates_around_up() {
        let quarter = orbit(&camera(), std::f32::consts::FRAC_PI_2);
        assert!((quarter.eye - Vector3f::new(3.0, 0.0, 0.0)).norm() < 1e-5, "{}", quarter.eye);
        assert_eq!(quarter.center, camera().center);

        let full = orbit(&camera(), 2.0 * std::f32::consts::PI);
        assert!((full.eye - camera().eye).norm() < 1e-4);
        assert_eq!(orbit(&camera(), 0.0).eye, camera().eye);
    }

    #[test]
    fn degenerate_camera_is_refused() {
        let config = RenderConfig {
            eye: [0.0, 4.0, 0.0],
            up: [0.0, 1.0, 0.0],
            model_path: "/nonexistent/model.obj".into(),
            ..Default::default()
        };
        let error = run(config).unwrap_err();
        assert!(error.to_string().contains("parallel"), "{}", error);
    }

    #[test]
    fn missing_model_is_reported() {
        let config = RenderConfig { model_path: "/nonexistent/model.obj".into(), ..Default::default() };
        let error = load_assets(&config).unwrap_err();
        assert!(format!("{:#}", error).contains("/nonexistent/model.obj"));
    }

    #[test]
    fn depth_view_writes_the_z_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("triangle.obj");
        std::fs::write(&model_path, "v -1 -1 0\nv 1 -1 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n").unwrap();
        let output = dir.path().join("depth.png");
        let config = RenderConfig {
            width: 64,
            height: 64,
            eye: [0.0, 0.0, 3.0],
            model_path,
            output_path: Some(output.clone()),
            depth_view: true,
            ..Default::default()
        };
        run(config).unwrap();

        let image = image::open(&output).unwrap().to_rgb8();
        let [r, g, b] = image.get_pixel(32, 32).0;
        assert!(r >= 1 && r == g && g == b, "{:?}", [r, g, b]);
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0]);
    }

    #[test]
    fn render_frame_draws_and_outlines() {
        let mesh = Mesh::from_obj(std::io::Cursor::new("v -1 -1 0\nv 1 -1 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n")).unwrap();
        let texture = Texture::solid(Color::WHITE);
        let mut config = RenderConfig { width: 64, height: 64, ..Default::default() };
        let mut frame = FrameBuffer::new(64, 64);

        let stats = render_frame(&config, &camera(), &mesh, &texture, &mut frame);
        assert_eq!(stats.faces, 1);
        assert_eq!(stats.culled, 0);
        assert!(stats.fragments > 0);
        // Normal faces the light, the center is fully lit.
        assert!(frame.color_at(32, 30).g >= 254);

        config.shader = ShaderKind::Texture;
        config.wireframe = true;
        let textured = render_frame(&config, &camera(), &mesh, &texture, &mut frame);
        assert_eq!(textured.fragments, stats.fragments);
        assert_eq!(frame.color_at(32, 32), Color::WHITE);
    }
}
