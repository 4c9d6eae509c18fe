use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use snowgrid::interpolation::{expand_grid_at, interpolate_idw, IdwParams};
use snowgrid::{strategic_points, Measurement, ILLINOIS_BOUNDS};

/// One measurement per strategic point with a north-south gradient.
fn strategic_samples() -> Vec<Measurement> {
    let now = Utc::now();
    strategic_points()
        .into_iter()
        .map(|p| Measurement::gridded(p.lat, p.lon, (p.lat - 36.0) * 1.5, p.name, now))
        .collect()
}

fn bench_single_idw(c: &mut Criterion) {
    let samples = strategic_samples();

    c.bench_function("idw_single_point_20_samples", |b| {
        b.iter(|| {
            black_box(interpolate_idw(
                black_box(-88.7),
                black_box(40.3),
                &samples,
                IdwParams::default(),
            ));
        });
    });
}

fn bench_expand_default_grid(c: &mut Criterion) {
    let samples = strategic_samples();
    let now = Utc::now();

    c.bench_function("expand_grid_0.5deg", |b| {
        b.iter(|| {
            black_box(
                expand_grid_at(&samples, 0.5, &ILLINOIS_BOUNDS, IdwParams::default(), now)
                    .unwrap(),
            );
        });
    });
}

fn bench_expand_fine_grid(c: &mut Criterion) {
    let samples = strategic_samples();
    let now = Utc::now();

    c.bench_function("expand_grid_0.05deg", |b| {
        b.iter(|| {
            black_box(
                expand_grid_at(&samples, 0.05, &ILLINOIS_BOUNDS, IdwParams::default(), now)
                    .unwrap(),
            );
        });
    });
}

criterion_group!(
    benches,
    bench_single_idw,
    bench_expand_default_grid,
    bench_expand_fine_grid,
);
criterion_main!(benches);
