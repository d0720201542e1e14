use std::path::Path;

use anyhow::{ensure, Context};
use image::{imageops, Rgb, RgbImage};

use crate::scene::Color;
use crate::util::Vector2f;

/// Nearest neighbour sampler over an rgb8 image. Row 0 is v = 0.
#[derive(Debug, Clone)]
pub struct Texture {
    image: RgbImage,
}

impl Texture {
    /// Decodes an image file and flips it vertically, so that v = 0 is the bottom row of the file.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Texture> {
        let path = path.as_ref();
        let decoded = image::open(path).with_context(|| format!("failed to load texture {}", path.display()))?;
        let mut image = decoded.to_rgb8();
        imageops::flip_vertical_in_place(&mut image);
        return Texture::from_image(image).with_context(|| format!("failed to load texture {}", path.display()));
    }

    /// Wraps an image as is, without flipping. Images without texels are rejected.
    pub fn from_image(image: RgbImage) -> anyhow::Result<Texture> {
        ensure!(image.width() > 0 && image.height() > 0, "texture is empty ({}x{})", image.width(), image.height());
        return Ok(Texture { image });
    }

    /// 1x1 texture, used for meshes rendered without one.
    pub fn solid(color: Color) -> Texture {
        return Texture { image: RgbImage::from_pixel(1, 1, Rgb([color.r, color.g, color.b])) };
    }

    pub fn width(&self) -> u32 {
        return self.image.width();
    }

    pub fn height(&self) -> u32 {
        return self.image.height();
    }

    /// Texel at (x, y). Out of range coordinates are clamped to the border.
    pub fn sample(&self, x: i32, y: i32) -> Color {
        let x = x.clamp(0, self.image.width() as i32 - 1) as u32;
        let y = y.clamp(0, self.image.height() as i32 - 1) as u32;
        let Rgb([r, g, b]) = *self.image.get_pixel(x, y);
        return Color { r, g, b };
    }

    /// Texel at (u * width, v * height).
    pub fn sample_uv(&self, uv: Vector2f) -> Color {
        let x = (uv.x() * self.image.width() as f32) as i32;
        let y = (uv.y() * self.image.height() as f32) as i32;
        return self.sample(x, y);
    }
}
