use eframe::egui;

use stampgrid_render::decade_color;

use crate::app::{StampGridApp, HUD_CORNER_RADIUS, HUD_MARGIN};

/// Vertical offset below the search bar.
const ERAS_TOP: f32 = 56.0;

impl StampGridApp {
    /// Decade index down the left edge; clicking a decade jumps to its marker.
    pub(crate) fn show_eras(&mut self, ctx: &egui::Context) {
        let decades = self.browser.catalog().decades();
        if decades.is_empty() {
            return;
        }
        let hud_alpha = self.hud_alpha();

        egui::Area::new(egui::Id::new("hud_eras"))
            .anchor(egui::Align2::LEFT_TOP, [HUD_MARGIN, ERAS_TOP])
            .show(ctx, |ui| {
                egui::Frame::NONE
                    .fill(egui::Color32::from_black_alpha(hud_alpha))
                    .inner_margin(egui::Margin::same(4))
                    .corner_radius(HUD_CORNER_RADIUS)
                    .show(ui, |ui| {
                        let max_height = (ui.available_height() - 3.0 * HUD_MARGIN).max(80.0);
                        egui::ScrollArea::vertical()
                            .max_height(max_height)
                            .show(ui, |ui| {
                                ui.spacing_mut().item_spacing.y = 2.0;
                                for decade in decades {
                                    let [r, g, b] = decade_color(decade);
                                    let label = egui::RichText::new(format!("{decade}s"))
                                        .color(egui::Color32::from_rgb(r, g, b))
                                        .size(13.0);
                                    if ui
                                        .add(egui::Button::new(label).frame(false))
                                        .on_hover_text(format!("Jump to the {decade}s"))
                                        .clicked()
                                    {
                                        self.browser.jump_to_decade(decade);
                                    }
                                }
                            });
                    });
            });
    }
}
