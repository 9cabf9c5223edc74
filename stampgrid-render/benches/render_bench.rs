use std::time::Instant;

use criterion::{criterion_group, criterion_main, Criterion};

use stampgrid_core::{search, BrowserConfig, Catalog, Size, StampRecord, ViewportTransform};
use stampgrid_render::{GridLayout, ImageLifecycleManager, IncrementalRenderer, MemorySurface};

fn big_catalog(n: usize) -> Catalog {
    Catalog::from_records(
        (0..n)
            .map(|i| {
                StampRecord::new(format!("S{i}"), 1840 + (i % 180) as i32, "Definitive")
                    .with_color(if i % 3 == 0 { "green" } else { "carmine" })
                    .with_image(format!("img/{i}.jpg"))
            })
            .collect(),
    )
}

fn bench_layout_plan(c: &mut Criterion) {
    let catalog = big_catalog(10_000);
    let layout = GridLayout::default();

    c.bench_function("plan_10k_records", |b| {
        b.iter(|| layout.plan(&catalog));
    });
}

fn bench_full_render(c: &mut Criterion) {
    let catalog = big_catalog(5_000);
    let config = BrowserConfig {
        chunk_size: 500,
        frame_deadline_ms: 1_000,
        ..BrowserConfig::default()
    };
    let plan = GridLayout::default().plan(&catalog);

    c.bench_function("render_5k_records", |b| {
        b.iter(|| {
            let mut renderer = IncrementalRenderer::new(&config);
            let mut images = ImageLifecycleManager::new(&config);
            let mut surface = MemorySurface::new();
            renderer.start(plan.clone());
            while !renderer
                .step(&catalog, &mut surface, &mut images, Instant::now())
                .finished
            {}
            surface
        });
    });
}

fn bench_visibility_recompute(c: &mut Criterion) {
    let catalog = big_catalog(5_000);
    let config = BrowserConfig {
        chunk_size: 5_000,
        frame_deadline_ms: 10_000,
        ..BrowserConfig::default()
    };
    let mut renderer = IncrementalRenderer::new(&config);
    let mut images = ImageLifecycleManager::new(&config);
    let mut surface = MemorySurface::new();
    renderer.start(GridLayout::default().plan(&catalog));
    while !renderer
        .step(&catalog, &mut surface, &mut images, Instant::now())
        .finished
    {}
    let container = Size::new(1280.0, 800.0);
    let mut offset = 0.0;

    c.bench_function("visibility_5k_nodes", |b| {
        b.iter(|| {
            offset -= 400.0;
            let t = ViewportTransform::new(1.0, 0.0, offset % 100_000.0).unwrap();
            images.update_viewport(&t, container, &mut surface);
        });
    });
}

fn bench_search(c: &mut Criterion) {
    let catalog = big_catalog(10_000);

    c.bench_function("search_10k_records", |b| {
        b.iter(|| search(&catalog, "green definitive"));
    });
}

criterion_group!(
    benches,
    bench_layout_plan,
    bench_full_render,
    bench_visibility_recompute,
    bench_search
);
criterion_main!(benches);
