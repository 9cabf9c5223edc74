use eframe::egui;

use stampgrid_core::Point;

use crate::app::{StampGridApp, PAN_STEP, ZOOM_SPEED, ZOOM_STEP};

fn local(response: &egui::Response, pos: egui::Pos2) -> Point {
    Point::new(pos.x - response.rect.min.x, pos.y - response.rect.min.y)
}

impl StampGridApp {
    pub(crate) fn handle_canvas_input(&mut self, ctx: &egui::Context, response: &egui::Response) {
        if response.hovered() {
            // Pinch and ctrl+wheel arrive as a zoom delta; a plain wheel pans.
            let (zoom, scroll) = ctx.input(|i| (i.zoom_delta(), i.smooth_scroll_delta));
            if let Some(pos) = response.hover_pos() {
                if (zoom - 1.0).abs() > f32::EPSILON {
                    self.browser.zoom(zoom, local(response, pos));
                } else if scroll.y.abs() > 0.0 && ctx.input(|i| i.modifiers.alt) {
                    let factor = (scroll.y * ZOOM_SPEED).exp();
                    self.browser.zoom(factor, local(response, pos));
                } else if scroll != egui::Vec2::ZERO {
                    self.browser.pan(scroll.x, scroll.y);
                }
            }
        }

        if response.dragged_by(egui::PointerButton::Primary) {
            let delta = response.drag_delta();
            self.browser.pan(delta.x, delta.y);
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.detail = self
                    .browser
                    .record_at(local(response, pos))
                    .map(|(index, _)| index);
            }
        }
        if response.double_clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.browser.zoom(ZOOM_STEP * ZOOM_STEP, local(response, pos));
            }
        }
    }

    pub(crate) fn handle_keyboard(&mut self, ctx: &egui::Context) {
        // Keys typed into the search field are not shortcuts.
        if self.search_focused {
            return;
        }

        ctx.input(|input| {
            if input.key_pressed(egui::Key::ArrowLeft) {
                self.browser.pan(PAN_STEP, 0.0);
            }
            if input.key_pressed(egui::Key::ArrowRight) {
                self.browser.pan(-PAN_STEP, 0.0);
            }
            if input.key_pressed(egui::Key::ArrowUp) {
                self.browser.pan(0.0, PAN_STEP);
            }
            if input.key_pressed(egui::Key::ArrowDown) {
                self.browser.pan(0.0, -PAN_STEP);
            }
            if input.key_pressed(egui::Key::Plus) || input.key_pressed(egui::Key::Equals) {
                self.browser.zoom_step(ZOOM_STEP);
            }
            if input.key_pressed(egui::Key::Minus) {
                self.browser.zoom_step(1.0 / ZOOM_STEP);
            }
            if input.key_pressed(egui::Key::R) {
                self.browser.reset_view();
            }
            if input.key_pressed(egui::Key::H) {
                self.show_hud = !self.show_hud;
            }
            if input.key_pressed(egui::Key::M) {
                self.show_minimap = !self.show_minimap;
            }
            if input.key_pressed(egui::Key::Enter) {
                if input.modifiers.shift {
                    self.browser.previous_match(&mut self.surface);
                } else {
                    self.browser.next_match(&mut self.surface);
                }
            }
            if input.key_pressed(egui::Key::Escape) {
                self.detail = None;
            }
        });
    }
}
