use std::collections::HashSet;
use std::time::{Duration, Instant};

use stampgrid_core::{BrowserConfig, Catalog, InlineSource, Size, StampRecord};
use stampgrid_render::{
    CatalogBrowser, DecodedImage, FetchRequest, GridLayout, Highlight, ImageFetcher,
    ImageLoadError, MemorySurface,
};
use stampgrid_render::surface::MemoryNodeKind;

/// Fetcher that only records requests; tests decide when they complete.
#[derive(Default)]
struct ManualFetcher {
    pending: Vec<FetchRequest>,
    started: Vec<String>,
}

impl ImageFetcher for ManualFetcher {
    fn begin(&mut self, request: FetchRequest) {
        self.started.push(request.path.clone());
        self.pending.push(request);
    }
}

fn pixel() -> DecodedImage {
    DecodedImage {
        width: 1,
        height: 1,
        pixels: vec![10, 20, 30, 255],
    }
}

struct Harness {
    browser: CatalogBrowser,
    surface: MemorySurface,
    fetcher: ManualFetcher,
    now: Instant,
}

impl Harness {
    fn new(config: BrowserConfig, catalog: Catalog) -> Self {
        let browser = CatalogBrowser::new(
            config,
            catalog,
            GridLayout::default(),
            Size::new(1200.0, 800.0),
        )
        .unwrap();
        Self {
            browser,
            surface: MemorySurface::new(),
            fetcher: ManualFetcher::default(),
            now: Instant::now(),
        }
    }

    fn frame(&mut self) {
        self.browser
            .frame(&mut self.surface, &mut self.fetcher, self.now);
        // Past any input throttle.
        self.now += Duration::from_millis(40);
    }

    /// Complete every pending fetch successfully.
    fn complete_all(&mut self) {
        for request in std::mem::take(&mut self.fetcher.pending) {
            self.browser
                .on_fetch_complete(request.ticket, Ok(pixel()), &mut self.surface);
        }
    }

    /// Run frames, answering fetches, until nothing is left to do.
    fn settle(&mut self) {
        for _ in 0..10_000 {
            self.frame();
            self.complete_all();
            if !self.browser.needs_frame() {
                return;
            }
        }
        panic!("browser never settled");
    }
}

fn numbered(count: usize, years: impl Fn(usize) -> i32) -> Catalog {
    Catalog::from_records(
        (0..count)
            .map(|i| {
                StampRecord::new(i.to_string(), years(i), "Topic").with_image(format!("img/{i}.png"))
            })
            .collect(),
    )
}

#[test]
fn decades_get_one_marker_each_in_catalog_order() {
    let json = r#"{"stamps": [
        {"id": "b", "year": 1852, "mainTopic": "Queen"},
        {"id": "c", "year": 1935, "mainTopic": "Ship"},
        {"id": "a", "year": 1851, "mainTopic": "Queen"}
    ]}"#;
    let catalog = Catalog::load(&InlineSource(json)).unwrap();
    let mut h = Harness::new(BrowserConfig::default(), catalog);
    h.settle();

    assert_eq!(h.surface.marker_decades(), vec![1850, 1930]);
    let ids: Vec<String> = h
        .surface
        .item_nodes()
        .filter_map(|n| match &n.kind {
            MemoryNodeKind::Item { id, .. } => Some(id.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(ids, ["a", "b", "c"]);
    assert_eq!(h.surface.nodes.len(), 5);
    assert_eq!(h.surface.progress, None);
}

#[test]
fn large_catalog_renders_over_many_frames() {
    let config = BrowserConfig {
        chunk_size: 50,
        ..BrowserConfig::default()
    };
    let mut h = Harness::new(config, numbered(1_000, |i| 1840 + (i % 150) as i32));
    h.frame();
    assert!(h.surface.item_nodes().count() <= 50);
    assert!(matches!(h.surface.progress, Some((_, 1_000))));

    h.settle();
    assert_eq!(h.surface.item_nodes().count(), 1_000);
    let logged: Vec<usize> = h
        .surface
        .progress_log
        .iter()
        .filter_map(|p| p.map(|(done, _)| done))
        .collect();
    assert!(logged.windows(2).all(|w| w[0] <= w[1]), "progress never goes back");
}

#[test]
fn only_items_near_the_viewport_are_fetched() {
    let catalog = numbered(2_000, |i| 1840 + (i % 180) as i32);
    let mut h = Harness::new(BrowserConfig::default(), catalog);
    h.settle();

    assert!(!h.fetcher.started.is_empty());
    assert!(h.fetcher.started.len() < 200, "fetched {}", h.fetcher.started.len());
    // Container height 800 plus one viewport of prefetch margin.
    for path in &h.fetcher.started {
        let id = path.trim_start_matches("img/").trim_end_matches(".png");
        let index = h.browser.catalog().index_of(id).unwrap();
        let rect = h.browser.item_rect(index).unwrap();
        assert!(rect.y <= 1_600.0, "{path} at y={} fetched eagerly", rect.y);
    }
}

#[test]
fn scrolling_away_evicts_and_returning_refetches() {
    let mut h = Harness::new(BrowserConfig::default(), numbered(16, |_| 1900));
    h.settle();
    let first_round = h.fetcher.started.len();
    assert_eq!(first_round, 16);
    assert_eq!(h.browser.image_stats().cached, 16);

    h.browser.pan(0.0, -100_000.0);
    h.settle();
    assert_eq!(h.browser.image_stats().cached, 0);
    assert_eq!(h.surface.released.len(), 16);
    assert!(h.surface.item_nodes().all(|n| n.image.is_none()));

    h.browser.pan(0.0, 100_000.0);
    h.settle();
    assert_eq!(h.fetcher.started.len(), 32, "every image fetched again");
    let released: HashSet<_> = h.surface.released.iter().collect();
    assert!(h
        .surface
        .item_nodes()
        .all(|n| n.image.is_some_and(|handle| !released.contains(&handle))));
}

#[test]
fn sweep_holds_cache_at_ceiling() {
    let config = BrowserConfig {
        cache_ceiling: 20,
        sweep_batch: 5,
        sweep_interval_ms: 100,
        min_scale: 0.01,
        initial_scale: 0.05,
        ..BrowserConfig::default()
    };
    let mut h = Harness::new(config, numbered(200, |_| 1900));
    h.settle();
    // Let at least one more sweep interval pass.
    for _ in 0..5 {
        h.frame();
    }

    let stats = h.browser.image_stats();
    assert!(stats.cached <= 20, "cache holds {}", stats.cached);
    assert!(stats.evicted_total > 0);
    assert_eq!(h.fetcher.started.len(), 200, "evicted items are not refetched");
    let shown = h.surface.item_nodes().filter(|n| n.image.is_some()).count();
    assert_eq!(shown, stats.cached);
}

#[test]
fn result_arriving_after_scroll_away_is_discarded() {
    let mut h = Harness::new(BrowserConfig::default(), numbered(1, |_| 1900));
    h.frame();
    assert_eq!(h.fetcher.pending.len(), 1);

    h.browser.pan(0.0, -100_000.0);
    h.frame();
    h.complete_all();

    let stats = h.browser.image_stats();
    assert_eq!(stats.cached, 0);
    assert_eq!(stats.in_flight, 0);
    assert_eq!(stats.stale_total, 1);
    assert!(h.surface.item_nodes().all(|n| n.image.is_none()));
}

#[test]
fn failed_load_frees_its_slot() {
    let config = BrowserConfig {
        max_concurrent_loads: 1,
        ..BrowserConfig::default()
    };
    let mut h = Harness::new(config, numbered(2, |_| 1900));
    h.frame();
    assert_eq!(h.fetcher.started, ["img/0.png"]);

    let failed = h.fetcher.pending.remove(0);
    h.browser.on_fetch_complete(
        failed.ticket,
        Err(ImageLoadError::NotFound {
            path: failed.path.clone(),
        }),
        &mut h.surface,
    );
    h.frame();
    assert_eq!(h.fetcher.started, ["img/0.png", "img/1.png"]);
    assert_eq!(h.browser.image_stats().failed_total, 1);
}

#[test]
fn search_cycles_highlights_through_matches() {
    let mut h = Harness::new(BrowserConfig::default(), Catalog::sample());
    h.settle();

    let count = h.browser.query(&mut h.surface, "green");
    assert_eq!(count, 2);
    let current: Vec<_> = h
        .surface
        .highlighted()
        .into_iter()
        .filter(|(_, hl)| *hl == Highlight::Current)
        .collect();
    assert_eq!(current.len(), 1);

    let first = h.browser.search_state().current().unwrap();
    let second = h.browser.next_match(&mut h.surface).unwrap();
    assert_ne!(first.index, second.index);
    let back = h.browser.next_match(&mut h.surface).unwrap();
    assert_eq!(back, first, "cursor wraps");

    assert_eq!(h.browser.query(&mut h.surface, "zeppelin"), 0);
    assert!(h.surface.highlighted().is_empty());
}

#[test]
fn teardown_releases_all_images() {
    let mut h = Harness::new(BrowserConfig::default(), numbered(8, |_| 1900));
    h.settle();
    h.browser.teardown(&mut h.surface);
    assert!(h.surface.nodes.is_empty());
    assert_eq!(h.surface.released.len(), 8);
    assert_eq!(h.browser.image_stats().cached, 0);
}
