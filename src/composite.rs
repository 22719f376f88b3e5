//! Compositing pass: field + time + palette -> RGB.
//!
//! A pure function of its inputs. The field's velocity channels displace the
//! lookup into an animated interference pattern, which then picks weights
//! for a four-stop palette.

use glam::{Vec2, Vec3};
use rayon::prelude::*;

use crate::config::DisplayParams;
use crate::field::Field;

const PATTERN_STEPS: usize = 8;

/// Shade one pixel.
///
/// `frag` is the pixel centre in viewport pixels (origin bottom-left),
/// `velocity` the field's xy channels at that pixel.
pub fn composite_pixel(frag: Vec2, res: Vec2, velocity: Vec2, time: f32, params: &DisplayParams) -> Vec3 {
    let mr = res.x.min(res.y);
    let uv = (frag * 2.0 - res) / mr + velocity * (0.5 * params.distortion_amount);

    let mut d = -time * 0.5;
    let mut a = 0.0_f32;
    for i in 0..PATTERN_STEPS {
        let i = i as f32;
        a += (i - d - a * uv.x).cos();
        d += (uv.y * i + a).sin();
    }
    d += time * 0.5;

    let smooth = (params.softness * 0.1).clamp(0.0, 0.9);
    let soften = |m: f32| m + (0.5 - m) * smooth;
    let m1 = soften((uv.x * d).cos() * 0.5 + 0.5);
    let m2 = soften((uv.y * a).cos() * 0.5 + 0.5);
    let m3 = soften((d + a).sin() * 0.5 + 0.5);

    let [c1, c2, c3, c4] = params.colors;
    let col = c1.lerp(c2, m1).lerp(c3, m2).lerp(c4, m3 * 0.4);
    col * params.color_intensity
}

/// Composite a whole field into `out` (row-major, bottom row first).
pub fn composite(field: &Field, time: f32, params: &DisplayParams, out: &mut [Vec3]) {
    let width = field.width() as usize;
    if width == 0 {
        return;
    }
    debug_assert_eq!(out.len(), field.total_cells());
    let res = field.resolution();
    let cells = field.cells();

    out.par_chunks_mut(width)
        .zip(cells.par_chunks(width))
        .enumerate()
        .for_each(|(y, (row, src))| {
            for (x, (pixel, cell)) in row.iter_mut().zip(src).enumerate() {
                let frag = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                *pixel = composite_pixel(frag, res, cell.truncate().truncate(), time, params);
            }
        });
}
