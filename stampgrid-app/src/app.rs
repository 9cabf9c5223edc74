use std::path::{Path, PathBuf};
use std::time::Instant;

use eframe::egui;
use tracing::{info, warn};

use stampgrid_core::{BrowserConfig, Capabilities, Catalog, FileSource, Size};
use stampgrid_render::{CatalogBrowser, FrameReport, GridLayout, RenderPhase};

use crate::app_dir::catalog_base;
use crate::image_worker::ImageWorker;
use crate::settings::AppSettings;
use crate::surface::EguiSurface;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Zoom sensitivity: maps ctrl+scroll delta to an exponential scale factor.
pub(crate) const ZOOM_SPEED: f32 = 0.003;
/// Scale factor of one zoom button or key press.
pub(crate) const ZOOM_STEP: f32 = 1.25;
/// Screen points panned per arrow-key press.
pub(crate) const PAN_STEP: f32 = 80.0;

/// HUD box margin (same for all corners).
pub(crate) const HUD_MARGIN: f32 = 8.0;
pub(crate) const HUD_CORNER_RADIUS: f32 = 6.0;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

pub(crate) struct StampGridApp {
    pub(crate) settings: AppSettings,
    pub(crate) browser: CatalogBrowser,
    pub(crate) surface: EguiSurface,
    pub(crate) worker: ImageWorker,

    /// Catalog document currently shown; `None` for the built-in sample.
    pub(crate) catalog_path: Option<PathBuf>,
    /// Load failure shown over the canvas until dismissed.
    pub(crate) banner: Option<String>,

    pub(crate) search_buf: String,
    /// The search field holds keyboard focus this frame.
    pub(crate) search_focused: bool,
    /// Catalog index whose details are open.
    pub(crate) detail: Option<usize>,

    pub(crate) show_hud: bool,
    pub(crate) show_minimap: bool,
    pub(crate) last_report: FrameReport,
}

impl StampGridApp {
    pub(crate) fn new(
        ctx: &egui::Context,
        settings: AppSettings,
        catalog_arg: Option<PathBuf>,
    ) -> stampgrid_render::Result<Self> {
        let capabilities = Capabilities {
            logical_cpus: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            screen_width: settings.window_width,
            touch: false,
        };
        let config = settings.browser_config(capabilities);
        info!(
            cpus = capabilities.logical_cpus,
            chunk_size = config.chunk_size,
            max_concurrent_loads = config.max_concurrent_loads,
            cache_ceiling = config.cache_ceiling,
            "Browser configuration"
        );

        let catalog_path = catalog_arg.or_else(|| {
            let p = settings.catalog_path.trim();
            (!p.is_empty()).then(|| PathBuf::from(p))
        });
        let (catalog, banner) = open_catalog(catalog_path.as_deref());
        let catalog_path = catalog_path.filter(|_| banner.is_none());

        let layout = match settings.columns {
            Some(columns) => {
                let base = GridLayout::default();
                GridLayout::new(columns, base.cell, base.gap, base.marker_height)?
            }
            None => GridLayout::fit_width(settings.window_width),
        };
        let container = Size::new(settings.window_width, settings.window_height);
        let browser = CatalogBrowser::new(config.clone(), catalog, layout, container)?;

        let base_dir = catalog_path
            .as_deref()
            .map(catalog_base)
            .unwrap_or_else(|| PathBuf::from("."));
        let worker = ImageWorker::new(ctx.clone(), config.max_concurrent_loads, base_dir);

        Ok(Self {
            show_minimap: settings.show_minimap,
            settings,
            browser,
            surface: EguiSurface::new(ctx.clone()),
            worker,
            catalog_path,
            banner,
            search_buf: String::new(),
            search_focused: false,
            detail: None,
            show_hud: true,
            last_report: FrameReport::default(),
        })
    }

    pub(crate) fn config(&self) -> &BrowserConfig {
        self.browser.config()
    }

    pub(crate) fn hud_alpha(&self) -> u8 {
        (self.settings.hud_panel_opacity.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    /// Ask for a catalog document and show it in place of the current one.
    pub(crate) fn open_catalog_dialog(&mut self) {
        let mut dialog = rfd::FileDialog::new().add_filter("Catalog", &["json"]);
        if let Some(dir) = self.catalog_path.as_deref().map(catalog_base) {
            if dir.is_dir() {
                dialog = dialog.set_directory(dir);
            }
        }
        if let Some(path) = dialog.pick_file() {
            self.load_catalog(Some(path));
        }
    }

    /// Re-read the current catalog document from disk.
    pub(crate) fn reload_catalog(&mut self) {
        let path = self.catalog_path.clone();
        self.load_catalog(path);
    }

    fn load_catalog(&mut self, path: Option<PathBuf>) {
        let (catalog, banner) = open_catalog(path.as_deref());
        self.banner = banner;
        self.catalog_path = path.filter(|_| self.banner.is_none());
        self.worker.set_base_dir(
            self.catalog_path
                .as_deref()
                .map(catalog_base)
                .unwrap_or_else(|| PathBuf::from(".")),
        );
        self.detail = None;
        self.browser.replace_catalog(catalog, &mut self.surface);
    }

    fn poll_images(&mut self) {
        for response in self.worker.poll() {
            self.browser
                .on_fetch_complete(response.ticket, response.result, &mut self.surface);
        }
    }

    fn draw_canvas(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(egui::Color32::from_gray(18)))
            .show(ctx, |ui| {
                let available = ui.available_size();
                self.browser
                    .set_container(Size::new(available.x.max(1.0), available.y.max(1.0)));

                let (response, painter) =
                    ui.allocate_painter(available, egui::Sense::click_and_drag());
                self.surface.paint(&painter, response.rect);

                if self.surface.is_empty_state() {
                    painter.text(
                        response.rect.center(),
                        egui::Align2::CENTER_CENTER,
                        "This catalog has no stamps to show",
                        egui::FontId::proportional(18.0),
                        egui::Color32::from_gray(160),
                    );
                }

                if let Some((done, total)) = self.surface.progress() {
                    if total > 0 {
                        let frac = (done as f32 / total as f32).clamp(0.0, 1.0);
                        let bar_h = 3.0;
                        let bar_y = response.rect.max.y - bar_h;
                        let bar_w = response.rect.width();

                        let bg_rect = egui::Rect::from_min_size(
                            egui::pos2(response.rect.min.x, bar_y),
                            egui::vec2(bar_w, bar_h),
                        );
                        painter.rect_filled(
                            bg_rect,
                            0.0,
                            egui::Color32::from_rgba_premultiplied(0, 0, 0, 120),
                        );
                        let fg_rect = egui::Rect::from_min_size(
                            egui::pos2(response.rect.min.x, bar_y),
                            egui::vec2(bar_w * frac, bar_h),
                        );
                        painter.rect_filled(
                            fg_rect,
                            0.0,
                            egui::Color32::from_rgb(80, 160, 255),
                        );
                    }
                }

                self.handle_canvas_input(ctx, &response);
            });
    }
}

/// Load the catalog at `path`, or the built-in sample when there is none or
/// it cannot be read. The second value is the message to show on failure.
fn open_catalog(path: Option<&Path>) -> (Catalog, Option<String>) {
    let Some(path) = path else {
        info!("No catalog configured, showing the built-in sample");
        return (Catalog::sample(), None);
    };
    match Catalog::load(&FileSource(path.to_path_buf())) {
        Ok(catalog) => {
            if !catalog.skipped().is_empty() {
                warn!(
                    skipped = catalog.skipped().len(),
                    "Some records could not be shown"
                );
            }
            (catalog, None)
        }
        Err(e) => {
            warn!("Catalog load failed, showing the built-in sample: {e}");
            (
                Catalog::sample(),
                Some(format!("Could not load the catalog. {e}")),
            )
        }
    }
}

// ---------------------------------------------------------------------------
// eframe::App
// ---------------------------------------------------------------------------

impl eframe::App for StampGridApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(egui::Visuals::dark());
        self.poll_images();

        self.last_report = self
            .browser
            .frame(&mut self.surface, &mut self.worker, Instant::now());

        self.draw_canvas(ctx);
        self.show_search_bar(ctx);
        self.show_toolbar(ctx);
        self.show_eras(ctx);
        self.show_hud(ctx);
        self.show_minimap(ctx);
        self.show_detail(ctx);
        self.handle_keyboard(ctx);

        if self.browser.needs_frame() {
            ctx.request_repaint();
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.browser.teardown(&mut self.surface);
        info!("Browser torn down on exit");
    }
}

impl StampGridApp {
    pub(crate) fn phase_label(&self) -> &'static str {
        match self.browser.phase() {
            RenderPhase::Idle => "Idle",
            RenderPhase::Rendering => "Rendering",
            RenderPhase::Done => "Done",
        }
    }
}
