//! Texture tree: solid, checker, Perlin noise, image.

use crate::material::Color;
use crate::perlin::Perlin;
use crate::ppm::PpmImage;
use prism_math::{Interval, Point3};
use rand::RngCore;
use std::path::Path;
use std::sync::Arc;

/// Trait for textures: an RGB value as a function of surface
/// parameters and world position.
pub trait Texture: Send + Sync {
    fn value(&self, u: f64, v: f64, p: Point3) -> Color;
}

/// A single uniform color.
pub struct SolidColor {
    albedo: Color,
}

impl SolidColor {
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }
}

impl Texture for SolidColor {
    fn value(&self, _u: f64, _v: f64, _p: Point3) -> Color {
        self.albedo
    }
}

/// 3-D checkerboard over world space.
///
/// The cell is selected by the parity of the summed lattice indices of
/// the hit point, so the pattern is independent of surface UVs.
pub struct Checker {
    inv_scale: f64,
    even: Arc<dyn Texture>,
    odd: Arc<dyn Texture>,
}

impl Checker {
    pub fn new(scale: f64, even: Arc<dyn Texture>, odd: Arc<dyn Texture>) -> Self {
        Self {
            inv_scale: 1.0 / scale,
            even,
            odd,
        }
    }

    pub fn from_colors(scale: f64, even: Color, odd: Color) -> Self {
        Self::new(
            scale,
            Arc::new(SolidColor::new(even)),
            Arc::new(SolidColor::new(odd)),
        )
    }
}

impl Texture for Checker {
    fn value(&self, u: f64, v: f64, p: Point3) -> Color {
        let x = (self.inv_scale * p.x).floor() as i64;
        let y = (self.inv_scale * p.y).floor() as i64;
        let z = (self.inv_scale * p.z).floor() as i64;

        if (x + y + z) % 2 == 0 {
            self.even.value(u, v, p)
        } else {
            self.odd.value(u, v, p)
        }
    }
}

/// Marble-like texture driven by Perlin turbulence.
pub struct NoiseTexture {
    scale: f64,
    perlin: Perlin,
}

impl NoiseTexture {
    pub fn new(scale: f64, rng: &mut dyn RngCore) -> Self {
        Self {
            scale,
            perlin: Perlin::new(rng),
        }
    }
}

impl Texture for NoiseTexture {
    fn value(&self, _u: f64, _v: f64, p: Point3) -> Color {
        Color::splat(0.5)
            * (1.0 + (self.scale * p.z + 10.0 * self.perlin.turbulence(p, 7)).sin())
    }
}

/// Texture sampled from a PPM image.
///
/// A failed load is not an error: the texture answers solid cyan so
/// the problem is visible in the render.
pub struct ImageTexture {
    image: PpmImage,
}

impl ImageTexture {
    pub fn new(image: PpmImage) -> Self {
        Self { image }
    }

    /// Load from a P6 PPM file; on failure the texture holds an empty
    /// image and reports cyan everywhere.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let image = match PpmImage::load(path) {
            Ok(image) => image,
            Err(err) => {
                log::warn!("failed to load image texture {}: {err}", path.display());
                PpmImage::empty()
            }
        };
        Self::new(image)
    }
}

impl Texture for ImageTexture {
    fn value(&self, u: f64, v: f64, _p: Point3) -> Color {
        if self.image.height() == 0 {
            // Solid cyan marks a missing image.
            return Color::new(0.0, 1.0, 1.0);
        }

        let u = Interval::new(0.0, 1.0).clamp(u);
        let v = 1.0 - Interval::new(0.0, 1.0).clamp(v); // image rows grow downward

        let i = (u * self.image.width() as f64) as usize;
        let j = (v * self.image.height() as f64) as usize;
        let pixel = self.image.pixel(i, j);

        let color_scale = 1.0 / 255.0;
        Color::new(
            color_scale * pixel[0] as f64,
            color_scale * pixel[1] as f64,
            color_scale * pixel[2] as f64,
        )
    }
}
