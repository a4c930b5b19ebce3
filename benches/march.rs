//! Benchmarks for distance queries and raymarching

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sdf_march::prelude::*;

fn grid_scene(kind: AccelKind) -> Scene {
    let mut prims = Vec::new();
    for x in 0..6 {
        for y in 0..6 {
            prims.push(
                Primitive::sphere(0.2)
                    .translate(Vec3::new(x as f32 * 0.7 - 1.75, y as f32 * 0.7 - 1.75, 0.0)),
            );
        }
    }
    prims.push(Primitive::torus(0.8, 0.1).twist(0.5).translate(Vec3::new(0.0, 0.0, -1.0)));
    Scene::new(prims, kind)
}

fn bench_distance(c: &mut Criterion) {
    let mut group = c.benchmark_group("distance");
    let point = Vec3::new(0.3, -0.2, 0.8);

    for kind in AccelKind::ALL {
        let scene = grid_scene(kind);
        group.bench_with_input(BenchmarkId::from_parameter(kind), &scene, |b, scene| {
            b.iter(|| scene.distance(black_box(point)))
        });
    }

    group.bench_function("mandelbulb", |b| {
        let m = Primitive::mandelbulb();
        b.iter(|| m.sdf(black_box(Vec3::new(0.6, 0.4, 0.5))))
    });

    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for kind in [AccelKind::Octree, AccelKind::Bvh] {
        group.bench_function(kind.name(), |b| b.iter(|| grid_scene(black_box(kind))));
    }
    group.finish();
}

fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_32x32");
    group.throughput(Throughput::Elements(32 * 32));
    group.sample_size(20);

    let camera = Camera::orbit(0.2, 0.3, 5.0);
    let config = RaymarchConfig::default();
    for kind in AccelKind::ALL {
        for algorithm in Algorithm::ALL {
            let mut scene = grid_scene(kind);
            let id = BenchmarkId::new(algorithm.name(), kind);
            group.bench_function(id, |b| {
                b.iter(|| render_frame(&mut scene, algorithm, &config, &camera, 32, 32, 0.0))
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_distance, bench_build, bench_frame);
criterion_main!(benches);
