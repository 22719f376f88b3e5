//! Fractal glass parallax over a still image.
//!
//! The image is drawn "cover"-fitted to the viewport and seen through
//! vertical fluted-glass stripes. The pointer's horizontal offset from the
//! centre slides the image sideways, more strongly where the glass bends
//! it most. Stripes fade out near the left and right edges.
//!
//! The same maths runs on the GPU ([`crate::shaders::GLASS_FRAGMENT`]) and
//! on the CPU here, which the `glass` subcommand uses for headless output.
//!
//! ```ignore
//! if let Some(effect) = GlassEffect::load("hero.jpg", GlassParams::default())? {
//!     effect.run()?;
//! }
//! ```

use std::path::Path;

use glam::Vec2;
use rayon::prelude::*;

use crate::error::TextureError;

/// Tunables of the glass effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlassParams {
    /// Fraction of the remaining distance the eased pointer covers per frame.
    pub lerp_factor: f32,
    pub parallax_strength: f32,
    /// How much the local glass bend amplifies the parallax.
    pub distortion_multiplier: f32,
    pub glass_strength: f32,
    /// Spacing of the 11 averaged taps, in uv units.
    pub glass_smoothness: f32,
    /// Stripes across the full width.
    pub stripes_frequency: f32,
    /// Width of the faded band at each side, in uv units.
    pub edge_padding: f32,
}

impl Default for GlassParams {
    fn default() -> Self {
        Self {
            lerp_factor: 0.1,
            parallax_strength: 0.25,
            distortion_multiplier: 15.0,
            glass_strength: 2.0,
            glass_smoothness: 0.0001,
            stripes_frequency: 35.0,
            edge_padding: 0.1,
        }
    }
}

/// Map a viewport uv to image uv so the image covers the viewport,
/// cropping the overflowing axis symmetrically.
pub fn cover_uv(uv: Vec2, resolution: Vec2, texture_size: Vec2) -> Vec2 {
    if texture_size.x < 1.0 || texture_size.y < 1.0 {
        return uv;
    }
    let s = resolution / texture_size;
    let scale = s.x.max(s.y);
    let scaled = texture_size * scale;
    let offset = (resolution - scaled) * 0.5;
    (uv * resolution - offset) / scaled
}

/// Sawtooth of period `1 / stripes` scaled by `strength`.
pub fn displacement(x: f32, stripes: f32, strength: f32) -> f32 {
    let modulus = 1.0 / stripes;
    (x - modulus * (x / modulus).floor()) * strength
}

/// Averaged sawtooth around `x`, added back onto `x`.
pub fn fractal_glass(x: f32, params: &GlassParams) -> f32 {
    let d: f32 = (-5..=5)
        .map(|i| {
            displacement(
                x + i as f32 * params.glass_smoothness,
                params.stripes_frequency,
                params.glass_strength,
            )
        })
        .sum();
    x + d / 11.0
}

/// 1 in the interior, easing to 0 within `padding` of either side.
pub fn smooth_edge(x: f32, padding: f32) -> f32 {
    if x < padding {
        smoothstep(0.0, padding, x)
    } else if x > 1.0 - padding {
        1.0 - smoothstep(1.0 - padding, 1.0, x)
    } else {
        1.0
    }
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Apply glass distortion and pointer parallax to a viewport uv.
///
/// `mouse` is the eased pointer in normalised viewport coordinates.
pub fn distort_uv(uv: Vec2, mouse: Vec2, params: &GlassParams) -> Vec2 {
    let base_x = uv.x;
    let edge = smooth_edge(base_x, params.edge_padding);

    let x = base_x + (fractal_glass(base_x, params) - base_x) * edge;
    let distortion = x - base_x;

    let direction = -(0.5 - mouse.x).signum();
    let parallax = direction
        * (mouse.x - 0.5).abs()
        * params.parallax_strength
        * (1.0 + distortion.abs() * params.distortion_multiplier);

    Vec2::new(x + parallax * edge, uv.y)
}

/// Pointer eased toward its target a fixed fraction per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlassPointer {
    current: Vec2,
    target: Vec2,
    lerp_factor: f32,
}

impl GlassPointer {
    /// Start centred and at rest.
    pub fn new(lerp_factor: f32) -> Self {
        Self {
            current: Vec2::splat(0.5),
            target: Vec2::splat(0.5),
            lerp_factor,
        }
    }

    /// Set the target from a screen position (y down) in a window of `size`.
    pub fn set_target(&mut self, screen: Vec2, size: Vec2) {
        if size.x <= 0.0 || size.y <= 0.0 {
            return;
        }
        self.target = Vec2::new(screen.x / size.x, 1.0 - screen.y / size.y);
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn current(&self) -> Vec2 {
        self.current
    }

    /// Advance one frame. Returns the eased position.
    pub fn update(&mut self) -> Vec2 {
        self.current = self.current.lerp(self.target, self.lerp_factor);
        self.current
    }
}

/// A loaded image plus glass parameters.
pub struct GlassEffect {
    pub(crate) image: image::RgbaImage,
    pub(crate) params: GlassParams,
}

impl GlassEffect {
    /// Load the image at `path`. A missing file yields `Ok(None)`.
    pub fn load(path: impl AsRef<Path>, params: GlassParams) -> Result<Option<Self>, TextureError> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("Glass image {} not found, skipping effect", path.display());
            return Ok(None);
        }
        let image = image::open(path)?.to_rgba8();
        log::info!("Loaded glass image {} ({}x{})", path.display(), image.width(), image.height());
        Ok(Some(Self { image, params }))
    }

    /// Wrap an already decoded image.
    pub fn from_image(image: image::RgbaImage, params: GlassParams) -> Self {
        Self { image, params }
    }

    pub fn params(&self) -> &GlassParams {
        &self.params
    }

    pub fn image(&self) -> &image::RgbaImage {
        &self.image
    }

    pub fn texture_size(&self) -> Vec2 {
        Vec2::new(self.image.width() as f32, self.image.height() as f32)
    }

    /// Render one frame on the CPU with the pointer at `mouse`.
    pub fn render(&self, mouse: Vec2, width: u32, height: u32) -> image::RgbaImage {
        let resolution = Vec2::new(width as f32, height as f32);
        let texture_size = self.texture_size();
        let mut out = image::RgbaImage::new(width, height);
        if width == 0 || height == 0 {
            return out;
        }

        let row_bytes = width as usize * 4;
        let buffer: &mut [u8] = &mut out;
        buffer
            .par_chunks_mut(row_bytes)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, pixel) in row.chunks_exact_mut(4).enumerate() {
                    // Image rows run top-down, uv runs bottom-up
                    let uv = Vec2::new((x as f32 + 0.5) / resolution.x, 1.0 - (y as f32 + 0.5) / resolution.y);
                    let distorted = distort_uv(uv, mouse, &self.params);
                    let cover = cover_uv(distorted, resolution, texture_size).clamp(Vec2::ZERO, Vec2::ONE);
                    pixel.copy_from_slice(&self.sample(cover));
                }
            });
        out
    }

    /// Bilinear, clamped sample at image uv (origin bottom-left).
    fn sample(&self, uv: Vec2) -> [u8; 4] {
        let (w, h) = self.image.dimensions();
        if w == 0 || h == 0 {
            return [0; 4];
        }
        let px = uv.x * w as f32 - 0.5;
        let py = (1.0 - uv.y) * h as f32 - 0.5;
        let x0 = px.floor();
        let y0 = py.floor();
        let fx = px - x0;
        let fy = py - y0;

        let fetch = |x: f32, y: f32| {
            let xi = (x as i64).clamp(0, w as i64 - 1) as u32;
            let yi = (y as i64).clamp(0, h as i64 - 1) as u32;
            self.image.get_pixel(xi, yi).0
        };
        let p00 = fetch(x0, y0);
        let p10 = fetch(x0 + 1.0, y0);
        let p01 = fetch(x0, y0 + 1.0);
        let p11 = fetch(x0 + 1.0, y0 + 1.0);

        let mut result = [0u8; 4];
        for c in 0..4 {
            let top = p00[c] as f32 + (p10[c] as f32 - p00[c] as f32) * fx;
            let bottom = p01[c] as f32 + (p11[c] as f32 - p01[c] as f32) * fx;
            result[c] = (top + (bottom - top) * fy).round().clamp(0.0, 255.0) as u8;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cover_uv_matching_aspect_is_identity() {
        let uv = Vec2::new(0.3, 0.7);
        let out = cover_uv(uv, Vec2::new(800.0, 400.0), Vec2::new(400.0, 200.0));
        assert!((out - uv).length() < 1e-6);
    }

    #[test]
    fn test_cover_uv_crops_wider_image() {
        // Square viewport, 2:1 image: the sides are cropped
        let res = Vec2::new(100.0, 100.0);
        let tex = Vec2::new(200.0, 100.0);
        let left = cover_uv(Vec2::new(0.0, 0.5), res, tex);
        let right = cover_uv(Vec2::new(1.0, 0.5), res, tex);
        assert!((left.x - 0.25).abs() < 1e-6);
        assert!((right.x - 0.75).abs() < 1e-6);
        assert!((left.y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_cover_uv_without_texture_passes_through() {
        let uv = Vec2::new(0.1, 0.9);
        assert_eq!(cover_uv(uv, Vec2::new(10.0, 10.0), Vec2::new(0.0, 0.0)), uv);
    }

    #[test]
    fn test_displacement_is_sawtooth() {
        let stripes = 10.0;
        assert!((displacement(0.05, stripes, 2.0) - 0.1).abs() < 1e-6);
        // Wraps at each stripe boundary
        assert!(displacement(0.1001, stripes, 2.0) < 0.001);
    }

    #[test]
    fn test_smooth_edge() {
        assert_eq!(smooth_edge(0.5, 0.1), 1.0);
        assert_eq!(smooth_edge(0.0, 0.1), 0.0);
        assert!(smooth_edge(1.0, 0.1).abs() < 1e-6);
        assert!((smooth_edge(0.05, 0.1) - 0.5).abs() < 1e-6);
        assert!((smooth_edge(0.95, 0.1) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_centered_pointer_has_no_parallax() {
        let params = GlassParams::default();
        let uv = Vec2::new(0.5, 0.5);
        let distorted = distort_uv(uv, Vec2::splat(0.5), &params);
        assert!((distorted.x - fractal_glass(0.5, &params)).abs() < 1e-6);
    }

    #[test]
    fn test_parallax_follows_pointer_side() {
        let params = GlassParams::default();
        let uv = Vec2::new(0.5, 0.5);
        let base = distort_uv(uv, Vec2::splat(0.5), &params).x;
        assert!(distort_uv(uv, Vec2::new(0.9, 0.5), &params).x > base);
        assert!(distort_uv(uv, Vec2::new(0.1, 0.5), &params).x < base);
    }

    #[test]
    fn test_pointer_eases_toward_target() {
        let mut pointer = GlassPointer::new(0.1);
        pointer.set_target(Vec2::new(100.0, 0.0), Vec2::new(100.0, 100.0));
        assert_eq!(pointer.target(), Vec2::new(1.0, 1.0));

        let first = pointer.update();
        assert!((first.x - 0.55).abs() < 1e-6);
        for _ in 0..200 {
            pointer.update();
        }
        assert!((pointer.current() - pointer.target()).length() < 1e-4);
    }

    #[test]
    fn test_missing_image_is_none() {
        let result = GlassEffect::load("/nonexistent/hero-image.png", GlassParams::default());
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn test_render_solid_image() {
        let image = image::RgbaImage::from_pixel(16, 8, image::Rgba([10, 200, 30, 255]));
        let effect = GlassEffect::from_image(image, GlassParams::default());
        let out = effect.render(Vec2::new(0.8, 0.5), 20, 10);
        assert_eq!(out.dimensions(), (20, 10));
        assert!(out.pixels().all(|p| p.0 == [10, 200, 30, 255]));
    }
}
