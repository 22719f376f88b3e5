//! Simulation pass: advection, relaxation and pointer forcing.
//!
//! Each output cell is computed independently from the previous field, so
//! the pass is a parallel map over rows. It must never read the field it is
//! writing; callers get that guarantee from [`FieldPair::split`].
//!
//! Per cell, after the bootstrap frame:
//!
//! 1. trace the cell centre and its four diagonal neighbours backwards
//!    through the velocity field (semi-Lagrangian advection)
//! 2. relax the traced sample toward the average of its N/E/S/W samples
//! 3. correct the scalar channel by how much the traced quad grew or shrank
//! 4. push velocity down the scalar gradient
//! 5. decay, force, clamp
//!
//! [`FieldPair::split`]: crate::field::FieldPair::split

use glam::{Vec2, Vec4};
use rayon::prelude::*;

use crate::config::SimulationParams;
use crate::field::Field;
use crate::input::PointerSample;

/// Number of backward-trace steps per frame.
pub const TRACE_STEPS: usize = 8;
/// Every channel is clamped to `[-FIELD_LIMIT, FIELD_LIMIT]` after each pass.
pub const FIELD_LIMIT: f32 = 0.4;
/// Relaxation weights toward the neighbour average, per channel.
pub const RELAX_WEIGHTS: Vec4 = Vec4::new(0.15, 0.15, 0.95, 0.0);
/// Peak of the bootstrap scalar bump at the field centre.
pub const BOOTSTRAP_PEAK: f32 = 0.1;

const REFERENCE_AREA: f32 = 4.0;
const AREA_CORRECTION: f32 = 0.01;
const PRESSURE_SCALE: f32 = 100.0;
const MAX_STROKE: f32 = 10.0;
const ACTIVITY: f32 = 10.0;
const STATIONARY_SPEED: f32 = 2.0;
const STATIONARY_FALLOFF: f32 = 0.01;

/// Per-frame inputs of the simulation pass.
#[derive(Debug, Clone, Copy)]
pub struct PassInputs<'a> {
    pub params: &'a SimulationParams,
    /// Frames since the last reset. Frame 0 bootstraps the field.
    pub frame: u64,
    /// Pointer forcing, or `None` when the pointer is idle.
    pub pointer: Option<PointerSample>,
}

/// Run the simulation pass over the whole field.
///
/// `next` must have the same dimensions as `prev`.
pub fn simulate(prev: &Field, next: &mut Field, inputs: &PassInputs) {
    debug_assert_eq!(prev.width(), next.width());
    debug_assert_eq!(prev.height(), next.height());

    let width = next.width() as usize;
    if width == 0 {
        return;
    }
    let res = prev.resolution();

    next.cells_mut()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, cell) in row.iter_mut().enumerate() {
                let coord = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                *cell = if inputs.frame == 0 {
                    bootstrap_cell(coord, res)
                } else {
                    advect_cell(prev, coord, inputs)
                };
            }
        });
}

/// Analytic initial state: a scalar bump at the centre and a horizontal
/// wave in the auxiliary channel, with no velocity.
pub fn bootstrap_cell(coord: Vec2, res: Vec2) -> Vec4 {
    let wave = 0.5 + (0.2 * coord.x).sin() * 0.5;
    let q = (coord - 0.5 * res).length();
    let bump = BOOTSTRAP_PEAK * (-0.001 * q * q).exp();
    Vec4::new(0.0, 0.0, bump, wave).clamp(Vec4::splat(-FIELD_LIMIT), Vec4::splat(FIELD_LIMIT))
}

/// Compute the next value of one cell from the previous field.
pub fn advect_cell(prev: &Field, coord: Vec2, inputs: &PassInputs) -> Vec4 {
    let params = inputs.params;
    let res = prev.resolution();

    let mut v = coord;
    let mut a = coord + Vec2::new(1.0, 1.0);
    let mut b = coord + Vec2::new(1.0, -1.0);
    let mut c = coord + Vec2::new(-1.0, 1.0);
    let mut d = coord + Vec2::new(-1.0, -1.0);

    for _ in 0..TRACE_STEPS {
        v -= prev.sample(v).truncate().truncate();
        a -= prev.sample(a).truncate().truncate();
        b -= prev.sample(b).truncate().truncate();
        c -= prev.sample(c).truncate().truncate();
        d -= prev.sample(d).truncate().truncate();
    }

    let center = prev.sample(v);
    let n = prev.sample(v + Vec2::Y);
    let e = prev.sample(v + Vec2::X);
    let s = prev.sample(v - Vec2::Y);
    let w = prev.sample(v - Vec2::X);
    let average = 0.25 * (n + e + s + w);

    let mut me = center + (average - center) * RELAX_WEIGHTS;
    me.z -= AREA_CORRECTION * ((triangle_area(a, b, c) + triangle_area(b, c, d)) - REFERENCE_AREA);

    let gradient = Vec2::new(e.z - w.z, n.z - s.z);
    let push = PRESSURE_SCALE * gradient / res;
    me.x += push.x;
    me.y += push.y;

    me.x *= params.fluid_decay;
    me.y *= params.fluid_decay;
    me.z *= params.trail_length;

    if let Some(pointer) = inputs.pointer {
        me = apply_forcing(me, coord, &pointer, params);
    }

    me.clamp(Vec4::splat(-FIELD_LIMIT), Vec4::splat(FIELD_LIMIT))
}

/// Inject the pointer stroke into one cell.
fn apply_forcing(mut me: Vec4, coord: Vec2, pointer: &PointerSample, params: &SimulationParams) -> Vec4 {
    let stroke = pointer.velocity();
    let speed = stroke.length();
    let q = segment_distance(coord, pointer.position, pointer.previous);

    let m = if speed > 0.0 {
        stroke * (speed.min(MAX_STROKE) / speed)
    } else {
        Vec2::ZERO
    };

    let size_factor = 1e-4 / params.brush_size;
    let strength_factor = 0.03 * params.brush_strength;
    let falloff = (-size_factor * q * q * q).exp().sqrt();
    let amount = strength_factor * falloff;

    me.x += amount * m.x;
    me.y += amount * m.y;
    me.z += amount * ACTIVITY;
    me.w += amount * ACTIVITY;

    if speed < STATIONARY_SPEED {
        let influence = (-(coord - pointer.position).length() * STATIONARY_FALLOFF).exp();
        let cursor_decay = 1.0 + (params.stop_decay - 1.0) * influence;
        me.x *= cursor_decay;
        me.y *= cursor_decay;
        me.z *= cursor_decay;
    }

    me
}

/// Distance from `p` to the segment `a`-`b`.
pub fn segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return (p - a).length();
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (p - a - ab * t).length()
}

/// Triangle area by Heron's formula. Degenerate triangles give zero.
pub fn triangle_area(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    let la = (b - c).length();
    let lb = (c - a).length();
    let lc = (a - b).length();
    let s = 0.5 * (la + lb + lc);
    (s * (s - la) * (s - lb) * (s - lc)).max(0.0).sqrt()
}
