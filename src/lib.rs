//! Software rasterizer for triangle meshes: OBJ loading, camera transforms, barycentric
//! rasterization with a depth buffer and pluggable shaders.

pub mod app;
pub mod config;
pub mod model;
pub mod scene;
pub mod texture;
pub mod util;
