use eframe::egui;

use stampgrid_core::{Point, Rect, Size};

use crate::app::{StampGridApp, HUD_CORNER_RADIUS, HUD_MARGIN};

const MIN_WIDTH: f32 = 60.0;

fn to_egui(origin: egui::Pos2, r: Rect) -> egui::Rect {
    egui::Rect::from_min_size(origin + egui::vec2(r.x, r.y), egui::vec2(r.width, r.height))
}

impl StampGridApp {
    /// Overview of the whole grid in the bottom-right corner. Clicking or
    /// dragging in it centres the main view on that spot.
    pub(crate) fn show_minimap(&mut self, ctx: &egui::Context) {
        if !self.show_minimap {
            return;
        }
        let bounds = self.browser.content_bounds();
        if bounds.width <= 0.0 || bounds.height <= 0.0 {
            return;
        }

        let height = self.settings.minimap_size.height();
        let width = (height * bounds.width / bounds.height).clamp(MIN_WIDTH, height * 1.5);
        let minimap = self.browser.minimap(Size::new(width, height));
        let hud_alpha = self.hud_alpha();

        egui::Area::new(egui::Id::new("hud_minimap"))
            .anchor(egui::Align2::RIGHT_BOTTOM, [-HUD_MARGIN, -HUD_MARGIN])
            .show(ctx, |ui| {
                egui::Frame::NONE
                    .fill(egui::Color32::from_black_alpha(hud_alpha))
                    .inner_margin(egui::Margin::same(4))
                    .corner_radius(HUD_CORNER_RADIUS)
                    .show(ui, |ui| {
                        let (rect, response) = ui.allocate_exact_size(
                            egui::vec2(width, height),
                            egui::Sense::click_and_drag(),
                        );
                        let painter = ui.painter_at(rect);

                        painter.rect_filled(
                            to_egui(rect.min, minimap.content_rect()),
                            0.0,
                            egui::Color32::from_gray(60),
                        );

                        let state = self.browser.search_state();
                        let current = state.current().map(|m| m.index);
                        for m in state.matches() {
                            let Some(item) = self.browser.item_rect(m.index) else {
                                continue;
                            };
                            let r = to_egui(rect.min, minimap.item_rect(&item));
                            // Items shrink below a pixel; keep matches visible.
                            let r = egui::Rect::from_center_size(
                                r.center(),
                                r.size().max(egui::vec2(3.0, 2.0)),
                            );
                            let color = if Some(m.index) == current {
                                egui::Color32::from_rgb(255, 140, 40)
                            } else {
                                egui::Color32::from_rgb(240, 220, 80)
                            };
                            painter.rect_filled(r, 0.0, color);
                        }

                        let indicator = minimap.indicator(self.browser.visible_logical_rect());
                        painter.rect_stroke(
                            to_egui(rect.min, indicator),
                            0.0,
                            egui::Stroke::new(1.5, egui::Color32::WHITE),
                            egui::StrokeKind::Inside,
                        );

                        if response.clicked() || response.dragged() {
                            if let Some(pos) = response.interact_pointer_pos() {
                                let local = Point::new(pos.x - rect.min.x, pos.y - rect.min.y);
                                self.browser.center_on(minimap.panel_to_logical(local));
                            }
                        }
                    });
            });
    }
}
