use eframe::egui;

use crate::app::{StampGridApp, HUD_CORNER_RADIUS, HUD_MARGIN};

impl StampGridApp {
    pub(crate) fn show_search_bar(&mut self, ctx: &egui::Context) {
        use egui_material_icons::icons::*;

        let hud_alpha = self.hud_alpha();
        let icon = |s: &str| egui::RichText::new(s).size(16.0);

        egui::Area::new(egui::Id::new("hud_search"))
            .anchor(egui::Align2::LEFT_TOP, [HUD_MARGIN, HUD_MARGIN])
            .show(ctx, |ui| {
                egui::Frame::NONE
                    .fill(egui::Color32::from_black_alpha(hud_alpha))
                    .inner_margin(egui::Margin::same(6))
                    .corner_radius(HUD_CORNER_RADIUS)
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.label(icon(ICON_SEARCH));
                            let response = ui.add(
                                egui::TextEdit::singleline(&mut self.search_buf)
                                    .hint_text("Topic, year, colour…")
                                    .desired_width(220.0),
                            );
                            if response.changed() {
                                if self.search_buf.trim().is_empty() {
                                    self.browser.clear_search(&mut self.surface);
                                } else {
                                    self.browser.query(&mut self.surface, &self.search_buf);
                                }
                            }
                            // Enter steps through matches and keeps the field focused.
                            if response.lost_focus()
                                && ui.input(|i| i.key_pressed(egui::Key::Enter))
                            {
                                if ui.input(|i| i.modifiers.shift) {
                                    self.browser.previous_match(&mut self.surface);
                                } else {
                                    self.browser.next_match(&mut self.surface);
                                }
                                response.request_focus();
                            }
                            // Enter and Escape that just left the field are
                            // handled here, not as shortcuts.
                            self.search_focused = response.has_focus() || response.lost_focus();
                            if response.lost_focus()
                                && ui.input(|i| i.key_pressed(egui::Key::Escape))
                            {
                                self.search_buf.clear();
                                self.browser.clear_search(&mut self.surface);
                            }

                            let state = self.browser.search_state();
                            let total = state.matches().len();
                            let position = state.current_position();
                            let has_matches = total > 0;

                            if !self.search_buf.trim().is_empty() {
                                let text = match position {
                                    Some(p) => format!("{} / {total}", p + 1),
                                    None => "No matches".to_string(),
                                };
                                ui.label(
                                    egui::RichText::new(text)
                                        .color(egui::Color32::from_gray(190)),
                                );
                            }

                            if ui
                                .add_enabled(
                                    has_matches,
                                    egui::Button::new(icon(ICON_EXPAND_LESS)).frame(false),
                                )
                                .on_hover_text("Previous match (Shift+Enter)")
                                .clicked()
                            {
                                self.browser.previous_match(&mut self.surface);
                            }
                            if ui
                                .add_enabled(
                                    has_matches,
                                    egui::Button::new(icon(ICON_EXPAND_MORE)).frame(false),
                                )
                                .on_hover_text("Next match (Enter)")
                                .clicked()
                            {
                                self.browser.next_match(&mut self.surface);
                            }
                            if ui
                                .add_enabled(
                                    !self.search_buf.is_empty(),
                                    egui::Button::new(icon(ICON_CLOSE)).frame(false),
                                )
                                .on_hover_text("Clear search")
                                .clicked()
                            {
                                self.search_buf.clear();
                                self.browser.clear_search(&mut self.surface);
                            }
                        });
                    });
            });
    }
}
