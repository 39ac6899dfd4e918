use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tui_match3::core::{find_matches, populate_match_free, CascadeResolver, Grid, SeededTiles};
use tui_match3::engine::{BoardEngine, EngineConfig, InstantPlayback};
use tui_match3::types::Coord;

fn dealt_grid(seed: u64) -> Grid {
    let mut grid = Grid::new(8, 8).unwrap();
    let mut tiles = SeededTiles::new(seed, 7).unwrap();
    populate_match_free(&mut grid, &mut tiles).unwrap();
    grid
}

fn bench_find_matches(c: &mut Criterion) {
    let settled = dealt_grid(12345);
    // Every other row a run of one kind.
    let rows: Vec<Vec<u8>> = (0..8)
        .map(|r| (0..8).map(|col| if r % 2 == 0 { 1 } else { (col % 3) as u8 + 2 }).collect())
        .collect();
    let refs: Vec<&[u8]> = rows.iter().map(Vec::as_slice).collect();
    let striped = Grid::from_rows(&refs).unwrap();

    c.bench_function("find_matches_settled_8x8", |b| {
        b.iter(|| find_matches(black_box(&settled)))
    });
    c.bench_function("find_matches_striped_8x8", |b| {
        b.iter(|| find_matches(black_box(&striped)))
    });
}

fn bench_layout(c: &mut Criterion) {
    let mut grid = Grid::new(8, 8).unwrap();
    let mut tiles = SeededTiles::new(12345, 7).unwrap();

    c.bench_function("populate_match_free_8x8", |b| {
        b.iter(|| populate_match_free(black_box(&mut grid), &mut tiles).unwrap())
    });
}

fn bench_resolve(c: &mut Criterion) {
    let mut tiles = SeededTiles::new(12345, 7).unwrap();
    let mut resolver = CascadeResolver::default();

    c.bench_function("resolve_all_after_row_fill", |b| {
        b.iter(|| {
            let mut grid = dealt_grid(7);
            for col in 0..8 {
                grid.set(Coord::new(col, 7), tui_match3::types::TileKind::new(1))
                    .unwrap();
            }
            let _ = resolver.resolve_all(black_box(&mut grid), &mut tiles);
        })
    });
}

fn bench_swap_roundtrip(c: &mut Criterion) {
    let cfg = EngineConfig::default();
    let tiles = SeededTiles::new(12345, cfg.gem_count).unwrap();
    let mut engine = BoardEngine::new(cfg, tiles).unwrap();
    engine.init_board().unwrap();
    let mut playback = InstantPlayback::attach(&engine);

    // Mostly rejected swaps, which is what a player does most of the time.
    c.bench_function("attempt_swap_and_settle", |b| {
        b.iter(|| {
            let _ = engine.attempt_swap(Coord::new(3, 3), Coord::new(4, 3));
            let _ = tui_match3::engine::run_until_idle(&mut engine, &mut playback);
        })
    });
}

criterion_group!(
    benches,
    bench_find_matches,
    bench_layout,
    bench_resolve,
    bench_swap_roundtrip
);
criterion_main!(benches);
