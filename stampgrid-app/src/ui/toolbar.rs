use eframe::egui;

use crate::app::{StampGridApp, ZOOM_STEP};

const TOOLBAR_MARGIN: f32 = 8.0;

impl StampGridApp {
    pub(crate) fn show_toolbar(&mut self, ctx: &egui::Context) {
        use egui_material_icons::icons::*;

        let icon_on = egui::Color32::from_rgb(200, 200, 200);
        let icon_off = egui::Color32::from_rgb(90, 90, 90);
        let mi = |icon: &str| egui::RichText::new(icon).size(18.0).color(icon_on);
        let mi_state = |icon: &str, active: bool| {
            egui::RichText::new(icon)
                .size(18.0)
                .color(if active { icon_on } else { icon_off })
        };

        let cell = egui::vec2(26.0, 22.0);

        let add_icon_btn =
            |ui: &mut egui::Ui, label: egui::RichText, enabled: bool| -> egui::Response {
                ui.allocate_ui_with_layout(
                    cell,
                    egui::Layout::centered_and_justified(egui::Direction::TopDown),
                    |ui| ui.add_enabled(enabled, egui::Button::new(label).frame(false)),
                )
                .inner
            };

        let transform = self.browser.transform();
        let config = self.config();
        let can_zoom_in = transform.scale < config.max_scale;
        let can_zoom_out = transform.scale > config.min_scale;
        let has_file = self.catalog_path.is_some();

        egui::Area::new(egui::Id::new("hud_toolbar"))
            .anchor(egui::Align2::RIGHT_TOP, [-TOOLBAR_MARGIN, TOOLBAR_MARGIN])
            .show(ctx, |ui| {
                egui::Frame::NONE
                    .fill(egui::Color32::from_black_alpha(160))
                    .inner_margin(egui::Margin::same(4))
                    .corner_radius(4.0)
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.spacing_mut().item_spacing.x = 0.0;

                            if add_icon_btn(ui, mi(ICON_ZOOM_IN), can_zoom_in)
                                .on_hover_text("Zoom in (+)")
                                .clicked()
                            {
                                self.browser.zoom_step(ZOOM_STEP);
                            }
                            if add_icon_btn(ui, mi(ICON_ZOOM_OUT), can_zoom_out)
                                .on_hover_text("Zoom out (-)")
                                .clicked()
                            {
                                self.browser.zoom_step(1.0 / ZOOM_STEP);
                            }
                            if add_icon_btn(ui, mi(ICON_RESTART_ALT), true)
                                .on_hover_text("Reset view (R)")
                                .clicked()
                            {
                                self.browser.reset_view();
                            }

                            ui.add_space(6.0);

                            if add_icon_btn(ui, mi_state(ICON_MAP, self.show_minimap), true)
                                .on_hover_text("Minimap (M)")
                                .clicked()
                            {
                                self.show_minimap = !self.show_minimap;
                            }
                            if add_icon_btn(ui, mi_state(ICON_INFO, self.show_hud), true)
                                .on_hover_text("Status (H)")
                                .clicked()
                            {
                                self.show_hud = !self.show_hud;
                            }

                            ui.add_space(6.0);

                            if add_icon_btn(ui, mi(ICON_FOLDER_OPEN), true)
                                .on_hover_text("Open catalog…")
                                .clicked()
                            {
                                self.open_catalog_dialog();
                            }
                            if add_icon_btn(ui, mi(ICON_REFRESH), has_file)
                                .on_hover_text("Reload catalog")
                                .clicked()
                            {
                                self.reload_catalog();
                            }
                        });
                    });
            });
    }
}
