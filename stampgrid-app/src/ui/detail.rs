use eframe::egui;

use crate::app::StampGridApp;

const PREVIEW_MAX: egui::Vec2 = egui::vec2(320.0, 320.0);

impl StampGridApp {
    /// Details of the clicked stamp, with its image once loaded.
    pub(crate) fn show_detail(&mut self, ctx: &egui::Context) {
        let Some(index) = self.detail else {
            return;
        };
        let Some(record) = self.browser.catalog().get(index) else {
            self.detail = None;
            return;
        };

        let mut open = true;
        egui::Window::new(format!("Stamp {}", record.id))
            .id(egui::Id::new("stamp_detail"))
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .default_pos(ctx.input(|i| i.pointer.hover_pos()).unwrap_or_default())
            .show(ctx, |ui| {
                match self.surface.texture_for(index) {
                    Some(tex) => {
                        let size = tex.size_vec2();
                        let scale = (PREVIEW_MAX.x / size.x)
                            .min(PREVIEW_MAX.y / size.y)
                            .min(1.0);
                        ui.image((tex.id(), size * scale));
                    }
                    None if record.image_path.is_empty() => {
                        ui.weak("No image for this stamp");
                    }
                    None => {
                        ui.weak("Image not loaded");
                    }
                }
                ui.separator();

                egui::Grid::new("stamp_detail_fields")
                    .num_columns(2)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        let mut row = |label: &str, value: &str| {
                            ui.strong(label);
                            ui.label(value);
                            ui.end_row();
                        };
                        row("Year", &record.year.to_string());
                        row("Topic", &record.main_topic);
                        if let Some(v) = &record.sub_topic {
                            row("Subtopic", v);
                        }
                        if let Some(v) = &record.denomination {
                            row("Denomination", v);
                        }
                        if let Some(v) = &record.color {
                            row("Colour", v);
                        }
                        if let Some(v) = &record.notes {
                            row("Notes", v);
                        }
                        if !record.image_path.is_empty() {
                            row("Image", &record.image_path);
                        }
                    });
            });

        if !open {
            self.detail = None;
        }
    }
}
