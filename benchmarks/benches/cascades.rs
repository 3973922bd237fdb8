//! Cascade pipeline benchmarks (criterion - wall-clock time).
//!
//! Run all:    cargo bench --manifest-path benchmarks/Cargo.toml --bench cascades
//! Filter:     cargo bench --manifest-path benchmarks/Cargo.toml --bench cascades -- pcf

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rein_csm::glam::{Vec2, Vec3};
use rein_csm::{
    Camera, CameraFrame, CascadeConfig, CascadedShadows, DepthImage, FrustumCorners, PcfKernel,
    ShadowQuery, SplitSet, Viewer, shadow_factor,
};

fn camera(far: f32) -> Camera {
    Camera::new_perspective(
        Vec3::new(0.0, 3.0, 8.0),
        Vec3::ZERO,
        Vec3::Y,
        60.0,
        16.0 / 9.0,
        0.1,
        far,
    )
}

// ---------------------------------------------------------------------------
// Splits
// ---------------------------------------------------------------------------

fn bench_splits(c: &mut Criterion) {
    let mut group = c.benchmark_group("splits");
    for &n in &[1u32, 2, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| SplitSet::compute(black_box(0.1), black_box(500.0), n, 0.5));
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Fitting
// ---------------------------------------------------------------------------

fn bench_update(c: &mut Criterion) {
    {
        let inverse = camera(200.0).view_projection_matrix().inverse();
        c.bench_function("frustum/unproject", |b| {
            b.iter(|| FrustumCorners::from_inverse_view_projection(black_box(inverse)));
        });
    }

    {
        let mut group = c.benchmark_group("cascades/update");
        let frame = CameraFrame::from_viewer(&camera(200.0));
        let to_light = Vec3::new(0.3, 1.0, 0.5);
        for &n in &[1u32, 2, 3, 4] {
            let shadows = CascadedShadows::new(CascadeConfig {
                cascade_count: n,
                ..CascadeConfig::default()
            })
            .expect("valid config");
            group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
                b.iter(|| shadows.update(black_box(&frame), to_light));
            });
        }
        group.finish();
    }
}

// ---------------------------------------------------------------------------
// PCF
// ---------------------------------------------------------------------------

fn bench_pcf(c: &mut Criterion) {
    let resolution = 1024;
    let image = DepthImage::from_fn(resolution, resolution, |x, y| {
        if (x / 16 + y / 16) % 2 == 0 { 0.25 } else { 1.0 }
    })
    .expect("non-empty checkerboard");
    let query = ShadowQuery {
        cascade: 0,
        uv: Vec2::new(0.37, 0.61),
        depth: 0.5,
        texel_size: 1.0 / resolution as f32,
        bias: 0.005,
    };

    let mut group = c.benchmark_group("pcf");
    for kernel in [
        PcfKernel::Single,
        PcfKernel::Pcf3x3,
        PcfKernel::Pcf5x5,
        PcfKernel::Pcf7x7,
    ] {
        group.bench_with_input(
            BenchmarkId::from_parameter(kernel.size()),
            &kernel,
            |b, &kernel| {
                b.iter(|| shadow_factor(&image, black_box(&query), kernel));
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_splits, bench_update, bench_pcf);
criterion_main!(benches);
