use std::time::Instant;

use tracing::{debug, info};

use stampgrid_core::{
    BrowserConfig, Catalog, Minimap, Point, Rect, SearchMatch, SearchState, Size, StampRecord,
    ViewportController, ViewportTransform,
};

use crate::cache::DecodedImage;
use crate::error::ImageLoadError;
use crate::highlight::HighlightOverlay;
use crate::images::{FetchTicket, ImageFetcher, ImageLifecycleManager, ImageStats};
use crate::layout::GridLayout;
use crate::renderer::{IncrementalRenderer, RenderPhase, RenderProgress};
use crate::surface::RenderSurface;

/// Summary of one [`CatalogBrowser::frame`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameReport {
    /// Items created this frame.
    pub emitted: usize,
    pub progress: RenderProgress,
    pub transform_applied: bool,
    pub evicted: usize,
    pub images: ImageStats,
}

/// Wires the catalog, layout, renderer, viewport, image manager, and search
/// together behind one frame-driven API.
#[derive(Debug)]
pub struct CatalogBrowser {
    config: BrowserConfig,
    catalog: Catalog,
    layout: GridLayout,
    viewport: ViewportController,
    renderer: IncrementalRenderer,
    images: ImageLifecycleManager,
    search: SearchState,
    highlight: HighlightOverlay,
    /// Transform last handed to the surface.
    applied: Option<ViewportTransform>,
}

impl CatalogBrowser {
    pub fn new(
        config: BrowserConfig,
        catalog: Catalog,
        layout: GridLayout,
        container: Size,
    ) -> crate::Result<Self> {
        config.validate()?;
        let mut renderer = IncrementalRenderer::new(&config);
        renderer.start(layout.plan(&catalog));
        info!(
            records = catalog.len(),
            columns = layout.columns,
            "Browser created"
        );
        Ok(Self {
            viewport: ViewportController::new(&config, container),
            images: ImageLifecycleManager::new(&config),
            renderer,
            search: SearchState::new(),
            highlight: HighlightOverlay::new(),
            applied: None,
            config,
            catalog,
            layout,
        })
    }

    /// One cooperative tick: render a chunk, apply the transform if due,
    /// react to visibility changes, start fetches, and sweep the cache.
    pub fn frame(
        &mut self,
        surface: &mut impl RenderSurface,
        fetcher: &mut impl ImageFetcher,
        now: Instant,
    ) -> FrameReport {
        let mut report = FrameReport::default();

        if self.renderer.is_rendering() {
            let outcome = self
                .renderer
                .step(&self.catalog, surface, &mut self.images, now);
            self.highlight
                .on_rendered(surface, &self.search, &outcome.emitted);
            report.emitted = outcome.emitted.len();
        }

        if let Some(transform) = self.viewport.flush(now) {
            surface.apply_transform(transform);
            self.applied = Some(transform);
            report.transform_applied = true;
        }

        if report.emitted > 0 || report.transform_applied {
            let transform = self.applied.unwrap_or_else(|| self.viewport.transform());
            self.images
                .update_viewport(&transform, self.viewport.container(), surface);
        }

        self.images.pump(fetcher, surface);
        report.evicted = self.images.sweep(now, surface);
        report.progress = self.renderer.progress();
        report.images = self.images.stats();
        report
    }

    /// Whether another frame would do work without new input.
    pub fn needs_frame(&self) -> bool {
        self.renderer.is_rendering() || self.viewport.is_dirty() || self.images.has_pending_work()
    }

    pub fn on_fetch_complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<DecodedImage, ImageLoadError>,
        surface: &mut impl RenderSurface,
    ) {
        self.images.on_fetch_complete(ticket, result, surface);
    }

    /// Swap in a new catalog, discarding every node and cached image.
    pub fn replace_catalog(&mut self, catalog: Catalog, surface: &mut impl RenderSurface) {
        self.renderer.teardown(surface);
        self.images.teardown(surface);
        self.highlight.reset();
        self.catalog = catalog;
        self.renderer.start(self.layout.plan(&self.catalog));
        self.viewport.reset();

        let query = self.search.query().to_string();
        if query.is_empty() {
            self.search.clear();
        } else {
            self.search.set_query(&self.catalog, &query);
        }
        info!(records = self.catalog.len(), "Catalog replaced");
    }

    /// Tear everything down; the browser is idle afterwards.
    pub fn teardown(&mut self, surface: &mut impl RenderSurface) {
        self.renderer.teardown(surface);
        self.images.teardown(surface);
        self.highlight.reset();
    }

    // -- Viewport ----------------------------------------------------------

    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.viewport.pan(dx, dy);
    }

    pub fn zoom(&mut self, factor: f32, around: Point) {
        self.viewport.zoom(factor, around);
    }

    pub fn zoom_step(&mut self, factor: f32) {
        self.viewport.zoom_step(factor);
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    pub fn set_container(&mut self, container: Size) {
        self.viewport.set_container(container);
    }

    pub fn center_on(&mut self, logical: Point) {
        self.viewport.center_on(logical);
    }

    pub fn jump_to_index(&mut self, index: usize) -> bool {
        match self.renderer.plan().item_rect(index) {
            Some(rect) => {
                self.viewport.jump_to(rect);
                true
            }
            None => false,
        }
    }

    pub fn jump_to_id(&mut self, id: &str) -> bool {
        match self.catalog.index_of(id) {
            Some(index) => self.jump_to_index(index),
            None => {
                debug!(id, "Jump target not in catalog");
                false
            }
        }
    }

    /// Bring the marker of `decade` into view.
    pub fn jump_to_decade(&mut self, decade: i32) -> bool {
        match self.renderer.plan().marker_rect(decade) {
            Some(rect) => {
                self.viewport.jump_to(rect);
                true
            }
            None => false,
        }
    }

    // -- Search ------------------------------------------------------------

    /// Run a query, highlight its matches, and jump to the best one.
    ///
    /// Returns the number of matches.
    pub fn query(&mut self, surface: &mut impl RenderSurface, query: &str) -> usize {
        let count = self.search.set_query(&self.catalog, query).len();
        self.refresh_highlights(surface);
        if let Some(m) = self.search.current() {
            self.jump_to_index(m.index);
        }
        count
    }

    pub fn clear_search(&mut self, surface: &mut impl RenderSurface) {
        self.search.clear();
        self.refresh_highlights(surface);
    }

    pub fn next_match(&mut self, surface: &mut impl RenderSurface) -> Option<SearchMatch> {
        let m = self.search.next()?;
        self.refresh_highlights(surface);
        self.jump_to_index(m.index);
        Some(m)
    }

    pub fn previous_match(&mut self, surface: &mut impl RenderSurface) -> Option<SearchMatch> {
        let m = self.search.previous()?;
        self.refresh_highlights(surface);
        self.jump_to_index(m.index);
        Some(m)
    }

    fn refresh_highlights(&mut self, surface: &mut impl RenderSurface) {
        self.highlight
            .apply(surface, &self.search, |i| self.renderer.node_of(i));
    }

    // -- Queries -----------------------------------------------------------

    /// Record under a screen-space point.
    pub fn record_at(&self, screen: Point) -> Option<(usize, &StampRecord)> {
        let logical = self.viewport.transform().screen_to_logical(screen);
        let index = self.renderer.plan().item_at(logical)?;
        Some((index, self.catalog.get(index)?))
    }

    pub fn minimap(&self, panel: Size) -> Minimap {
        Minimap::new(self.renderer.plan().bounds(), panel)
    }

    pub fn visible_logical_rect(&self) -> Rect {
        self.viewport.visible_logical_rect()
    }

    pub fn content_bounds(&self) -> Rect {
        self.renderer.plan().bounds()
    }

    pub fn item_rect(&self, index: usize) -> Option<Rect> {
        self.renderer.plan().item_rect(index)
    }

    pub fn transform(&self) -> ViewportTransform {
        self.viewport.transform()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn search_state(&self) -> &SearchState {
        &self.search
    }

    pub fn progress(&self) -> RenderProgress {
        self.renderer.progress()
    }

    pub fn phase(&self) -> RenderPhase {
        self.renderer.phase()
    }

    pub fn image_stats(&self) -> ImageStats {
        self.images.stats()
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }
}
