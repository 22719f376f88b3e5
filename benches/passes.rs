//! Benchmarks for the CPU simulation and compositing passes.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{Vec2, Vec3};

use fluid_gradient::advect::{self, PassInputs};
use fluid_gradient::composite;
use fluid_gradient::{DisplayParams, Field, PointerSample, SimulationParams};

fn seeded_field(width: u32, height: u32) -> Field {
    let mut prev = Field::new(width, height);
    let mut next = Field::new(width, height);
    let params = SimulationParams::default();
    advect::simulate(&prev, &mut next, &PassInputs { params: &params, frame: 0, pointer: None });
    std::mem::swap(&mut prev, &mut next);
    prev
}

fn bench_simulate(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulate");
    let params = SimulationParams::default();

    for &(w, h) in &[(160u32, 90u32), (320, 180), (640, 360)] {
        let prev = seeded_field(w, h);
        let mut next = Field::new(w, h);
        let center = Vec2::new(w as f32, h as f32) * 0.5;
        let pointer = PointerSample { position: center, previous: center - Vec2::new(4.0, 1.0) };

        group.bench_with_input(BenchmarkId::new("idle", format!("{}x{}", w, h)), &(w, h), |b, _| {
            let inputs = PassInputs { params: &params, frame: 1, pointer: None };
            b.iter(|| advect::simulate(black_box(&prev), &mut next, &inputs))
        });

        group.bench_with_input(BenchmarkId::new("forced", format!("{}x{}", w, h)), &(w, h), |b, _| {
            let inputs = PassInputs { params: &params, frame: 1, pointer: Some(pointer) };
            b.iter(|| advect::simulate(black_box(&prev), &mut next, &inputs))
        });
    }

    group.finish();
}

fn bench_composite(c: &mut Criterion) {
    let mut group = c.benchmark_group("composite");
    let params = DisplayParams::default();

    for &(w, h) in &[(160u32, 90u32), (320, 180), (640, 360)] {
        let field = seeded_field(w, h);
        let mut out = vec![Vec3::ZERO; field.total_cells()];

        group.bench_with_input(BenchmarkId::from_parameter(format!("{}x{}", w, h)), &(w, h), |b, _| {
            b.iter(|| composite::composite(black_box(&field), 2.0, &params, &mut out))
        });
    }

    group.finish();
}

fn bench_composite_pixel(c: &mut Criterion) {
    let params = DisplayParams::default();
    let res = Vec2::new(1280.0, 720.0);
    c.bench_function("composite_pixel", |b| {
        b.iter(|| {
            composite::composite_pixel(
                black_box(Vec2::new(640.5, 360.5)),
                res,
                black_box(Vec2::new(0.1, -0.05)),
                3.0,
                &params,
            )
        })
    });
}

criterion_group!(benches, bench_simulate, bench_composite, bench_composite_pixel);
criterion_main!(benches);
