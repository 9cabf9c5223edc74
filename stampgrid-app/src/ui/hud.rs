use eframe::egui;

use stampgrid_render::RenderPhase;

use crate::app::{StampGridApp, HUD_CORNER_RADIUS, HUD_MARGIN};

impl StampGridApp {
    pub(crate) fn show_hud(&mut self, ctx: &egui::Context) {
        self.show_banner(ctx);
        if !self.show_hud {
            return;
        }

        let hud_alpha = self.hud_alpha();
        let progress = self.last_report.progress;
        let images = self.last_report.images;
        let ceiling = self.config().cache_ceiling;
        let scale = self.browser.transform().scale;
        let skipped = self.browser.catalog().skipped().len();
        let source = self
            .catalog_path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "Built-in sample".to_string());

        // -- Bottom-left: render and image stats --
        egui::Area::new(egui::Id::new("hud_status"))
            .anchor(egui::Align2::LEFT_BOTTOM, [HUD_MARGIN, -HUD_MARGIN])
            .show(ctx, |ui| {
                egui::Frame::NONE
                    .fill(egui::Color32::from_black_alpha(hud_alpha))
                    .inner_margin(egui::Margin::same(8))
                    .corner_radius(HUD_CORNER_RADIUS)
                    .show(ui, |ui| {
                        ui.set_min_width(200.0);
                        ui.style_mut().visuals.override_text_color =
                            Some(egui::Color32::from_rgb(200, 200, 200));
                        ui.style_mut().spacing.item_spacing.y = 2.0;

                        ui.label(source);

                        let phase_color = match self.browser.phase() {
                            RenderPhase::Idle => egui::Color32::GRAY,
                            RenderPhase::Rendering => egui::Color32::YELLOW,
                            RenderPhase::Done => egui::Color32::from_rgb(100, 255, 100),
                        };
                        ui.colored_label(
                            phase_color,
                            format!(
                                "{}: {} / {}",
                                self.phase_label(),
                                progress.rendered,
                                progress.total
                            ),
                        );
                        if skipped > 0 {
                            ui.colored_label(
                                egui::Color32::from_rgb(255, 180, 50),
                                format!("{skipped} records skipped"),
                            );
                        }
                        ui.label(format!("Zoom: {:.0}%", scale * 100.0));
                        ui.label(format!(
                            "Images: {} loading, {} queued",
                            images.in_flight, images.queued
                        ));
                        ui.label(format!(
                            "Cache: {} / {ceiling} ({} textures)",
                            images.cached,
                            self.surface.texture_count()
                        ));
                        if images.failed_total > 0 {
                            ui.label(format!("Failed: {}", images.failed_total));
                        }
                    });
            });
    }

    /// Catalog load failure, shown until dismissed.
    fn show_banner(&mut self, ctx: &egui::Context) {
        let Some(message) = self.banner.clone() else {
            return;
        };
        egui::Area::new(egui::Id::new("hud_banner"))
            .anchor(egui::Align2::CENTER_TOP, [0.0, HUD_MARGIN])
            .show(ctx, |ui| {
                egui::Frame::NONE
                    .fill(egui::Color32::from_rgba_unmultiplied(120, 40, 30, 230))
                    .inner_margin(egui::Margin::same(8))
                    .corner_radius(HUD_CORNER_RADIUS)
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.colored_label(egui::Color32::WHITE, message.as_str());
                            ui.label(
                                egui::RichText::new("Showing the built-in sample.")
                                    .color(egui::Color32::from_gray(220)),
                            );
                            if ui.small_button("Open…").clicked() {
                                self.open_catalog_dialog();
                            }
                            if ui.small_button("Dismiss").clicked() {
                                self.banner = None;
                            }
                        });
                    });
            });
    }
}
