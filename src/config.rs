//! Render configuration.
//!
//! Loaded from JSON, every field is optional and falls back to `RenderConfig::default()`.
//! Command line flags are applied on top by `main`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::scene::camera::{Camera, ViewAnchor};
use crate::scene::raster::DEFAULT_DEGENERATE_EPSILON;
use crate::scene::shader::ShaderKind;
use crate::util::Vector3f;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Depth range of the viewport, z ends up in [0, depth].
    pub depth: f32,
    pub model_path: PathBuf,
    pub texture_path: Option<PathBuf>,
    /// Render a single frame into this file instead of opening a window.
    pub output_path: Option<PathBuf>,
    pub shader: ShaderKind,
    pub eye: [f32; 3],
    pub center: [f32; 3],
    pub up: [f32; 3],
    pub view_anchor: ViewAnchor,
    /// Direction towards the light, world space. Normalized on use.
    pub light_direction: [f32; 3],
    pub cull_back_faces: bool,
    /// Draw face edges on top of the shaded mesh.
    pub wireframe: bool,
    /// Present the z-buffer as grayscale instead of the colors.
    pub depth_view: bool,
    /// Triangles whose doubled signed area is below this are skipped.
    pub degenerate_epsilon: f32,
    /// Camera setups whose `up` is closer than this to the view direction are rejected.
    pub parallel_tolerance: f32,
    /// Rotation of the eye around `center`, radians per second. Windowed mode only.
    pub orbit_speed: f32,
    pub print_fps: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        return Self {
            width: 800,
            height: 800,
            depth: 255.0,
            model_path: PathBuf::from("assets/model.obj"),
            texture_path: None,
            output_path: None,
            shader: ShaderKind::default(),
            eye: [1.0, 1.0, 3.0],
            center: [0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
            view_anchor: ViewAnchor::default(),
            light_direction: [0.0, 0.0, 1.0],
            cull_back_faces: true,
            wireframe: false,
            depth_view: false,
            degenerate_epsilon: DEFAULT_DEGENERATE_EPSILON,
            parallel_tolerance: 1e-6,
            orbit_speed: 0.0,
            print_fps: false,
        };
    }
}

impl RenderConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        return serde_json::from_str(s);
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_json_str(&text).with_context(|| format!("failed to parse config {}", path.display()))?;
        return Ok(config);
    }

    pub fn camera(&self) -> Camera {
        return Camera {
            eye: Vector3f::from(self.eye),
            center: Vector3f::from(self.center),
            up: Vector3f::from(self.up),
            anchor: self.view_anchor,
        };
    }

    pub fn light_direction(&self) -> Vector3f {
        return Vector3f::from(self.light_direction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_json_gives_defaults() {
        let config = RenderConfig::from_json_str("{}").unwrap();
        assert_eq!(config, RenderConfig::default());
        assert_eq!(config.width, 800);
        assert_eq!(config.shader, ShaderKind::Gouraud);
        assert_eq!(config.view_anchor, ViewAnchor::Center);
        assert!(!config.depth_view);
        assert!(config.cull_back_faces);
        assert!(config.output_path.is_none());
    }

    #[test]
    fn fields_override_defaults() {
        let config = RenderConfig::from_json_str(
            r#"{
                "width": 320,
                "shader": "texture",
                "view_anchor": "eye",
                "depth_view": true,
                "eye": [0, 0, 5],
                "texture_path": "assets/diffuse.tga",
                "orbit_speed": 0.5
            }"#,
        )
        .unwrap();
        assert_eq!(config.width, 320);
        assert_eq!(config.height, 800);
        assert_eq!(config.shader, ShaderKind::Texture);
        assert_eq!(config.texture_path, Some(PathBuf::from("assets/diffuse.tga")));
        assert_eq!(config.orbit_speed, 0.5);

        let camera = config.camera();
        assert_eq!(camera.eye, Vector3f::new(0.0, 0.0, 5.0));
        assert_eq!(camera.anchor, ViewAnchor::Eye);
        assert!(config.depth_view);
    }

    #[test]
    fn unknown_shader_is_an_error() {
        assert!(RenderConfig::from_json_str(r#"{ "shader": "phong" }"#).is_err());
    }

    #[test]
    fn from_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{ "depth": 1.0, "print_fps": true }"#).unwrap();
        let config = RenderConfig::from_file(file.path()).unwrap();
        assert_eq!(config.depth, 1.0);
        assert!(config.print_fps);

        let error = RenderConfig::from_file("/nonexistent/config.json").unwrap_err();
        assert!(error.to_string().contains("failed to read config"));
    }
}
