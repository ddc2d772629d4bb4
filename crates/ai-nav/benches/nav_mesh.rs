use ai_nav::{find_path, NavGraph, Navigator, PathDebug, Polygon, Vec2};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Square room with a grid of pillars.
fn pillar_hall(size: f32, pillars: usize) -> NavGraph {
    let contour = Polygon::rectangle(Vec2::ZERO, Vec2::new(size, size));
    let step = size / (pillars + 1) as f32;
    let mut shapes = Vec::with_capacity(pillars * pillars);
    for y in 1..=pillars {
        for x in 1..=pillars {
            let c = Vec2::new(x as f32 * step, y as f32 * step);
            let half = Vec2::new(step * 0.2, step * 0.2);
            shapes.push(Polygon::rectangle(c - half, c + half));
        }
    }
    NavGraph::new(&contour, &shapes, 0.25)
}

fn bench_nav_mesh(c: &mut Criterion) {
    let mut group = c.benchmark_group("ai-nav/navmesh");

    group.bench_function("build_8x8_pillars", |b| {
        b.iter(|| {
            let nav = pillar_hall(64.0, 8);
            black_box(nav.graph().node_count());
        })
    });

    let nav = pillar_hall(64.0, 8);
    let start = Vec2::new(0.5, 0.5);
    let goal = Vec2::new(63.5, 63.5);

    group.bench_function("find_path", |b| {
        b.iter(|| {
            let path = find_path(start, goal, &nav, None);
            black_box(path.len());
        })
    });

    let mut debug = PathDebug::default();
    group.bench_function("find_path_with_debug", |b| {
        b.iter(|| {
            let path = find_path(start, goal, &nav, Some(&mut debug));
            black_box(debug.portals.len() + path.len());
        })
    });

    group.bench_function("raycast", |b| {
        b.iter(|| black_box(nav.raycast(start, goal)))
    });

    group.finish();
}

criterion_group!(benches, bench_nav_mesh);
criterion_main!(benches);
