//! Benchmarks for UV layout operations.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::{Point2, Point3};
use rectuv::algo::boundary::boundary_loops;
use rectuv::algo::chain::sort_boundary_chains;
use rectuv::prelude::*;

fn create_quad_grid(n: usize) -> HalfEdgeMesh {
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    let mut faces = Vec::with_capacity(n * n);

    for j in 0..=n {
        for i in 0..=n {
            // A gentle bump keeps the surface non-developable.
            let x = i as f64 / n as f64;
            let y = j as f64 / n as f64;
            let z = 0.25 * (x * std::f64::consts::PI).sin() * (y * std::f64::consts::PI).sin();
            vertices.push(Point3::new(x, y, z));
        }
    }

    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;
            faces.push([v00, v10, v11, v01]);
        }
    }

    build_from_quads(&vertices, &faces).unwrap()
}

fn create_cylinder(segments: usize, rings: usize) -> HalfEdgeMesh {
    let mut vertices = Vec::with_capacity(segments * (rings + 1));
    for j in 0..=rings {
        for i in 0..segments {
            let angle = i as f64 / segments as f64 * std::f64::consts::TAU;
            vertices.push(Point3::new(angle.cos(), angle.sin(), j as f64 * 0.25));
        }
    }

    let mut faces = Vec::with_capacity(segments * rings);
    for j in 0..rings {
        for i in 0..segments {
            let a = j * segments + i;
            let b = j * segments + (i + 1) % segments;
            faces.push([a, b, b + segments, a + segments]);
        }
    }

    build_from_quads(&vertices, &faces).unwrap()
}

fn bench_boundary_chains(c: &mut Criterion) {
    let mesh = create_quad_grid(40);
    let patch = Patch::all(&mesh);

    c.bench_function("sort_boundary_chains_40x40", |b| {
        b.iter(|| {
            let loops = boundary_loops(&mesh, &patch);
            sort_boundary_chains(&mesh, &patch, &loops)
        });
    });
}

fn bench_conformal_relax(c: &mut Criterion) {
    let mut group = c.benchmark_group("conformal_relax");
    group.sample_size(10);

    for n in [8, 16, 32] {
        let mut mesh = create_quad_grid(n);
        let patch = Patch::all(&mesh);
        let loops: Vec<_> = patch.loops(&mesh).collect();
        for &l in &loops {
            let p = *mesh.position(mesh.origin(l));
            mesh.set_uv(l, Point2::new(p.x, p.y));
        }

        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                let mut work = mesh.clone();
                conformal_relax(&mut work, &patch, &RelaxOptions::default()).unwrap()
            });
        });
    }

    group.finish();
}

fn bench_rectangularize(c: &mut Criterion) {
    let mut group = c.benchmark_group("rectangularize");
    group.sample_size(10);

    for n in [12, 32] {
        let grid = create_quad_grid(n);
        let grid_patch = Patch::all(&grid);
        group.bench_with_input(BenchmarkId::new("grid", n), &n, |b, _| {
            b.iter(|| {
                let mut work = grid.clone();
                rectangularize(&mut work, &grid_patch, &RectangularizeOptions::default()).unwrap()
            });
        });
    }

    let tube = create_cylinder(16, 6);
    let tube_patch = Patch::all(&tube);
    group.bench_function("cylinder_16x6", |b| {
        b.iter(|| {
            let mut work = tube.clone();
            rectangularize(&mut work, &tube_patch, &RectangularizeOptions::default()).unwrap()
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_boundary_chains,
    bench_conformal_relax,
    bench_rectangularize
);
criterion_main!(benches);
