//! Criterion benchmarks for grid A*.
//!
//! Fixture: a 96x96 village with a fence line every 12 rows, each with a
//! single gap, so routes zig-zag instead of running straight.
//!
//! Run with: cargo bench -p hamlet-logic --bench pathfinding

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use hamlet_logic::grid::{Cell, GridLayout, Tilemap};
use hamlet_logic::pathfinding::find_path_cells;

const SIZE: i32 = 96;

fn fenced_village() -> Tilemap {
    let mut map = Tilemap::new(GridLayout::default());
    map.fill_ground(Cell::new(0, 0), Cell::new(SIZE - 1, SIZE - 1));
    for (i, y) in (12..SIZE).step_by(12).enumerate() {
        // Alternate the gap between the left and right ends
        let gap = if i % 2 == 0 { SIZE - 2 } else { 1 };
        for x in 0..SIZE {
            if x != gap {
                map.place_obstacle(Cell::new(x, y));
            }
        }
    }
    map
}

fn bench_astar(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_astar");

    let open = {
        let mut map = Tilemap::new(GridLayout::default());
        map.fill_ground(Cell::new(0, 0), Cell::new(SIZE - 1, SIZE - 1));
        map
    };
    let fenced = fenced_village();

    let corner = Cell::new(0, 0);
    let far = Cell::new(SIZE - 1, SIZE - 1);
    assert!(find_path_cells(&fenced, corner, far).is_some());

    group.bench_function("open_short", |b| {
        b.iter(|| black_box(find_path_cells(&open, corner, Cell::new(8, 5))));
    });

    group.bench_function("open_cross_map", |b| {
        b.iter(|| black_box(find_path_cells(&open, corner, far)));
    });

    group.bench_function("fenced_cross_map", |b| {
        b.iter(|| black_box(find_path_cells(&fenced, corner, far)));
    });

    // Worst case: goal walled off, the whole map is exhausted
    let mut sealed = open.clone();
    for cell in far.neighbors() {
        sealed.place_obstacle(cell);
    }
    group.bench_function("open_unreachable", |b| {
        b.iter(|| black_box(find_path_cells(&sealed, corner, far)));
    });

    group.finish();
}

criterion_group!(benches, bench_astar);
criterion_main!(benches);
