//! Shader stages plugged into the rasterizer.
//!
//! A shader is picked once per pipeline run. The vertex stage is called for each corner of a face and
//! returns the clip space position together with whatever the fragment stage needs later (the varying).
//! The rasterizer interpolates varyings with the barycentric weights of every covered pixel and hands
//! the result to the fragment stage, which either produces a color or discards the pixel.

use std::str::FromStr;

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::model::Mesh;
use crate::texture::Texture;
use crate::util::{Vector, Vector3f, Vector2f, Vector4f};

use super::context::RenderContext;
use super::Color;

/// Per-vertex value that can be blended across a triangle with barycentric weights.
pub trait Interpolate: Sized {
    fn interpolate(corners: &[Self; 3], bar: Vector3f) -> Self;
}

impl Interpolate for () {
    fn interpolate(_corners: &[Self; 3], _bar: Vector3f) -> Self {}
}

impl Interpolate for f32 {
    fn interpolate(corners: &[Self; 3], bar: Vector3f) -> Self {
        return bar.dot(&Vector3f::from(*corners));
    }
}

impl<const N: usize> Interpolate for Vector<f32, N> {
    fn interpolate(corners: &[Self; 3], bar: Vector3f) -> Self {
        return corners[0] * bar.x() + corners[1] * bar.y() + corners[2] * bar.z();
    }
}

impl<A: Interpolate + Clone, B: Interpolate + Clone> Interpolate for (A, B) {
    fn interpolate(corners: &[Self; 3], bar: Vector3f) -> Self {
        let firsts = [corners[0].0.clone(), corners[1].0.clone(), corners[2].0.clone()];
        let seconds = [corners[0].1.clone(), corners[1].1.clone(), corners[2].1.clone()];
        return (A::interpolate(&firsts, bar), B::interpolate(&seconds, bar));
    }
}

/// Output of the vertex stage for one corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipVertex<V> {
    pub position: Vector4f, // Homogeneous, perspective divide still pending.
    pub varying: V,
}

pub trait Shader {
    type Varying: Interpolate;

    /// Transforms corner `corner` of face `face`.
    fn vertex(&mut self, face: usize, corner: usize) -> ClipVertex<Self::Varying>;

    /// Color for a covered pixel, None discards it.
    fn fragment(&self, varying: &Self::Varying, bar: Vector3f) -> Option<Color>;
}

/// Diffuse texture modulated by per-vertex lighting interpolated across the face.
pub struct GouraudShader<'a> {
    mesh: &'a Mesh,
    texture: &'a Texture,
    context: &'a RenderContext,
}

impl<'a> GouraudShader<'a> {
    pub fn new(mesh: &'a Mesh, texture: &'a Texture, context: &'a RenderContext) -> Self {
        return GouraudShader { mesh, texture, context };
    }
}

impl<'a> Shader for GouraudShader<'a> {
    type Varying = (f32, Vector2f); // Light intensity and uv.

    fn vertex(&mut self, face: usize, corner: usize) -> ClipVertex<Self::Varying> {
        let normal = self.mesh.normal(face, corner).normalized();
        let intensity = normal.dot(&self.context.light_direction);
        let uv = self.mesh.tex_coord(face, corner).proj::<2>();
        return ClipVertex {
            position: self.context.to_clip(self.mesh.position(face, corner)),
            varying: (intensity, uv),
        };
    }

    fn fragment(&self, varying: &Self::Varying, _bar: Vector3f) -> Option<Color> {
        let (intensity, uv) = *varying;
        let color = self.texture.sample_uv(uv);
        return Some(Color::blend(color, Color::BLACK, intensity.clamp(0.0, 1.0)));
    }
}

/// Diffuse texture as is, no lighting.
pub struct TextureShader<'a> {
    mesh: &'a Mesh,
    texture: &'a Texture,
    context: &'a RenderContext,
}

impl<'a> TextureShader<'a> {
    pub fn new(mesh: &'a Mesh, texture: &'a Texture, context: &'a RenderContext) -> Self {
        return TextureShader { mesh, texture, context };
    }
}

impl<'a> Shader for TextureShader<'a> {
    type Varying = Vector2f;

    fn vertex(&mut self, face: usize, corner: usize) -> ClipVertex<Self::Varying> {
        return ClipVertex {
            position: self.context.to_clip(self.mesh.position(face, corner)),
            varying: self.mesh.tex_coord(face, corner).proj::<2>(),
        };
    }

    fn fragment(&self, uv: &Self::Varying, _bar: Vector3f) -> Option<Color> {
        return Some(self.texture.sample_uv(*uv));
    }
}

/// Shader selection for a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShaderKind {
    #[default]
    Gouraud,
    Texture,
}

impl FromStr for ShaderKind {
    type Err = anyhow::Error;

    fn from_str(name: &str) -> anyhow::Result<Self> {
        return match name {
            "gouraud" => Ok(ShaderKind::Gouraud),
            "texture" => Ok(ShaderKind::Texture),
            _ => bail!("unsupported shader '{}', expected 'gouraud' or 'texture'", name),
        };
    }
}
