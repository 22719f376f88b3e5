//! Integration tests for the CPU pipeline.
//!
//! These drive the scheduler and passes the same way the windowed and
//! headless runners do, and check the behavioural guarantees of the effect:
//! boundedness, decay, bootstrap, resize and wraparound.

use std::time::{Duration, Instant};

use fluid_gradient::advect::{self, PassInputs, BOOTSTRAP_PEAK, FIELD_LIMIT};
use fluid_gradient::composite;
use fluid_gradient::{
    CpuBackend, Field, FluidBackend, FluidConfig, FrameScheduler, FrameStatus, Phase, PointerSample,
    SimulationParams, Time, Vec2, Vec3, Vec4,
};
use rand::{Rng, SeedableRng};

const STEP: Duration = Duration::from_micros(16_667);

fn scheduler_at(width: u32, height: u32, t0: Instant) -> FrameScheduler<CpuBackend> {
    let mut time = Time::starting_at(t0);
    time.set_fixed_delta(Some(STEP.as_secs_f32()));
    FrameScheduler::with_time(CpuBackend::new(FluidConfig::default(), width, height), time)
}

fn mean_speed(field: &Field) -> f32 {
    let total: f32 = field.cells().iter().map(|c| Vec2::new(c.x, c.y).length()).sum();
    total / field.total_cells() as f32
}

// ============================================================================
// Compositing
// ============================================================================

#[test]
fn test_compositing_is_bit_identical() {
    let t0 = Instant::now();
    let mut s = scheduler_at(24, 16, t0);
    for i in 0..5 {
        s.pointer_mut().on_move(Vec2::new(4.0 + i as f32 * 3.0, 8.0), t0 + STEP * i);
        s.tick_at(t0 + STEP * i);
    }

    let field = s.backend().fields().front();
    let params = FluidConfig::default().display;
    let mut a = vec![Vec3::ZERO; field.total_cells()];
    let mut b = vec![Vec3::ZERO; field.total_cells()];
    composite::composite(field, 1.75, &params, &mut a);
    composite::composite(field, 1.75, &params, &mut b);

    let bits = |v: &[Vec3]| v.iter().flat_map(|c| c.to_array().map(f32::to_bits)).collect::<Vec<_>>();
    assert_eq!(bits(&a), bits(&b));
}

// ============================================================================
// Simulation Bounds and Decay
// ============================================================================

#[test]
fn test_fuzzed_pointer_keeps_field_bounded() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(0x5eed);
    let t0 = Instant::now();
    let mut s = scheduler_at(12, 12, t0);

    for i in 0..10_000u32 {
        let now = t0 + STEP * i;
        // Mix of jumps, slow drags and idle stretches
        if rng.gen_bool(0.7) {
            let screen = Vec2::new(rng.gen_range(-20.0..32.0), rng.gen_range(-20.0..32.0));
            s.pointer_mut().on_move(screen, now);
        }
        assert_eq!(s.tick_at(now), FrameStatus::Rendered);

        let field = s.backend().fields().front();
        assert!(field.cells().iter().all(|c| c.is_finite()), "frame {}: non-finite cell", i);
        let max = field.max_abs();
        assert!(max <= FIELD_LIMIT, "frame {}: max |channel| = {}", i, max);
    }
}

#[test]
fn test_uniform_velocity_decays_monotonically() {
    // No scalar gradient, so only the decay factor acts on velocity
    let params = SimulationParams::default();
    let mut prev = Field::new(16, 16);
    prev.cells_mut().fill(Vec4::new(0.2, 0.1, 0.0, 0.5));
    let mut next = Field::new(16, 16);

    let mut last = mean_speed(&prev);
    for frame in 1..200 {
        let inputs = PassInputs { params: &params, frame, pointer: None };
        advect::simulate(&prev, &mut next, &inputs);
        std::mem::swap(&mut prev, &mut next);

        let speed = mean_speed(&prev);
        assert!(speed <= last, "frame {}: {} > {}", frame, speed, last);
        last = speed;
    }
    assert!(last < 0.01);
}

#[test]
fn test_stirred_velocity_decays_over_windows() {
    const WINDOW: u32 = 60;
    const WINDOWS: u32 = 5;

    let t0 = Instant::now();
    let mut s = scheduler_at(64, 64, t0);
    let center = Vec2::splat(32.0);
    for i in 0..60u32 {
        let angle = i as f32 * 0.2;
        s.pointer_mut().on_move(center + 18.0 * Vec2::new(angle.cos(), angle.sin()), t0 + STEP * i);
        s.tick_at(t0 + STEP * i);
    }

    // Frame-over-frame speed may rise while the scalar gradient pushes
    // velocity around; the envelope over a window must still shrink.
    let idle = t0 + STEP * 60 + Duration::from_millis(200);
    let mut peaks = Vec::new();
    for w in 0..WINDOWS {
        let mut peak = 0.0_f32;
        for i in 0..WINDOW {
            let now = idle + STEP * (w * WINDOW + i);
            assert!(s.pointer().forcing(now).is_none());
            s.tick_at(now);
            peak = peak.max(mean_speed(s.backend().fields().front()));
        }
        peaks.push(peak);
    }

    assert!(peaks[0] > 0.0);
    for pair in peaks.windows(2) {
        assert!(pair[1] < pair[0], "window peaks {:?}", peaks);
    }
    assert!(peaks[WINDOWS as usize - 1] < 0.25 * peaks[0], "window peaks {:?}", peaks);
}

// ============================================================================
// Bootstrap and Resize
// ============================================================================

#[test]
fn test_bootstrap_center_cell() {
    let mut s = scheduler_at(101, 101, Instant::now());
    assert_eq!(s.phase(), Phase::Bootstrapping);
    s.tick();

    let center = s.backend().fields().front().read(50, 50);
    assert_eq!(center.x, 0.0);
    assert_eq!(center.y, 0.0);
    assert!((center.z - BOOTSTRAP_PEAK).abs() < 1e-7);
}

#[test]
fn test_resize_resets_state() {
    let t0 = Instant::now();
    let mut s = scheduler_at(32, 32, t0);
    for i in 0..20 {
        s.pointer_mut().on_move(Vec2::new(i as f32, 16.0), t0 + STEP * i);
        s.tick_at(t0 + STEP * i);
    }
    assert_eq!(s.frame(), 20);

    // Backend-level resize clears both buffers
    let mut backend = CpuBackend::new(FluidConfig::default(), 8, 8);
    backend.fields_mut().buffer_mut(fluid_gradient::Buffer::A).write(1, 1, Vec4::ONE);
    backend.resize(10, 6).unwrap();
    assert_eq!(backend.fields().front().max_abs(), 0.0);
    assert_eq!(backend.fields().back().max_abs(), 0.0);

    // Scheduler-level resize restarts from the bootstrap frame
    s.request_resize(40, 24);
    assert_eq!(s.frame(), 20);
    s.tick_at(t0 + STEP * 20);
    assert_eq!(s.frame(), 1);
    assert_eq!(s.backend().size(), (40, 24));

    let res = Vec2::new(40.0, 24.0);
    let field = s.backend().fields().front();
    for (x, y) in [(0, 0), (13, 7), (39, 23)] {
        let expected = advect::bootstrap_cell(Vec2::new(x as f32 + 0.5, y as f32 + 0.5), res);
        assert_eq!(field.read(x, y), expected);
    }
}

#[test]
fn test_resize_is_deferred_to_tick_boundary() {
    let mut s = scheduler_at(8, 8, Instant::now());
    s.tick();
    s.tick();

    s.request_resize(16, 16);
    s.request_resize(12, 10);
    assert_eq!(s.backend().size(), (8, 8));
    assert_eq!(s.phase(), Phase::Steady);

    s.tick();
    // Only the latest request applies
    assert_eq!(s.backend().size(), (12, 10));
}

// ============================================================================
// Addressing
// ============================================================================

#[test]
fn test_sampling_wraps_toroidally() {
    let mut field = Field::new(7, 5);
    for (i, cell) in field.cells_mut().iter_mut().enumerate() {
        *cell = Vec4::splat(i as f32 * 0.01);
    }
    for y in [0.5, 1.25, 2.5, 4.9] {
        let a = field.sample(Vec2::new(7.0, y));
        let b = field.sample(Vec2::new(0.0, y));
        assert!((a - b).abs().max_element() < 1e-6, "y = {}: {:?} != {:?}", y, a, b);
    }
}

// ============================================================================
// Pointer Forcing
// ============================================================================

#[test]
fn test_forcing_peaks_under_pointer() {
    let params = SimulationParams::default();
    let prev = Field::new(100, 100);
    let mut next = Field::new(100, 100);
    let center = Vec2::new(50.5, 50.5);
    let inputs = PassInputs {
        params: &params,
        frame: 1,
        pointer: Some(PointerSample { position: center, previous: center }),
    };
    advect::simulate(&prev, &mut next, &inputs);

    let at_pointer = next.read(50, 50).z;
    let far = next.read(0, 50).z;
    assert!(at_pointer > far, "{} <= {}", at_pointer, far);
    assert!((at_pointer - 0.1275).abs() < 1e-4);
}

#[test]
fn test_moving_stroke_forces_along_its_direction() {
    let params = SimulationParams::default();
    let prev = Field::new(100, 100);
    let mut next = Field::new(100, 100);
    let inputs = PassInputs {
        params: &params,
        frame: 1,
        pointer: Some(PointerSample {
            position: Vec2::new(53.5, 50.5),
            previous: Vec2::new(47.5, 50.5),
        }),
    };
    advect::simulate(&prev, &mut next, &inputs);

    let at_pointer = next.read(50, 50);
    let far = next.read(0, 50);
    assert!(at_pointer.z > far.z, "{} <= {}", at_pointer.z, far.z);
    // Full-strength activity, no stationary decay
    assert!((at_pointer.z - 0.15).abs() < 1e-4);
    // Velocity follows the stroke
    assert!((at_pointer.x - 0.09).abs() < 1e-4);
    assert_eq!(at_pointer.y, 0.0);
    assert!(far.x > 0.0 && far.x < at_pointer.x);
}

#[test]
fn test_first_move_does_not_streak_from_origin() {
    let t0 = Instant::now();
    let mut moved = scheduler_at(200, 200, t0);
    let mut still = scheduler_at(200, 200, t0);
    moved.tick_at(t0);
    still.tick_at(t0);

    // Field (150, 150); a stroke from the origin would cross cell (40, 40)
    moved.pointer_mut().on_move(Vec2::new(150.0, 50.0), t0 + STEP);
    moved.tick_at(t0 + STEP);
    still.tick_at(t0 + STEP);

    let a = moved.backend().fields().front();
    let b = still.backend().fields().front();
    assert_eq!(a.read(40, 40), b.read(40, 40));
    assert_eq!(a.cells(), b.cells());
}

#[test]
fn test_idle_pointer_stops_forcing_but_resumes_with_correct_delta() {
    let t0 = Instant::now();
    let mut s = scheduler_at(16, 16, t0);
    s.tick_at(t0);

    s.pointer_mut().on_move(Vec2::new(2.0, 8.0), t0);
    s.pointer_mut().on_move(Vec2::new(6.0, 8.0), t0);
    assert!(s.pointer().forcing(t0 + Duration::from_millis(150)).is_none());

    s.pointer_mut().on_move(Vec2::new(9.0, 8.0), t0 + Duration::from_secs(2));
    let sample = s.pointer().forcing(t0 + Duration::from_secs(2)).unwrap();
    assert_eq!(sample.velocity(), Vec2::new(3.0, 0.0));
}
