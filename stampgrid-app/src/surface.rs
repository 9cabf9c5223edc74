use std::collections::HashMap;

use eframe::egui;
use tracing::debug;

use stampgrid_core::{Rect, StampRecord, ViewportTransform};
use stampgrid_render::{
    Highlight, ImageHandle, ImageView, NodeId, PlaceholderVisual, RenderSurface,
};

/// Below this on-screen height item labels are not drawn.
const MIN_LABEL_HEIGHT: f32 = 28.0;

const CURRENT_STROKE: egui::Color32 = egui::Color32::from_rgb(255, 140, 40);
const MATCH_STROKE: egui::Color32 = egui::Color32::from_rgb(240, 220, 80);

fn rgb(c: [u8; 3]) -> egui::Color32 {
    egui::Color32::from_rgb(c[0], c[1], c[2])
}

enum NodeKind {
    Marker {
        decade: i32,
    },
    Item {
        label: String,
        background: egui::Color32,
        text: egui::Color32,
    },
}

struct SurfaceNode {
    kind: NodeKind,
    rect: Rect,
    image: Option<ImageHandle>,
    highlight: Highlight,
}

/// Render surface backed by egui: nodes are retained here and painted each
/// frame; decoded images become GPU textures keyed by their handle.
pub(crate) struct EguiSurface {
    ctx: egui::Context,
    nodes: Vec<SurfaceNode>,
    by_index: HashMap<usize, NodeId>,
    textures: HashMap<ImageHandle, egui::TextureHandle>,
    transform: Option<ViewportTransform>,
    progress: Option<(usize, usize)>,
    empty: bool,
}

impl EguiSurface {
    pub(crate) fn new(ctx: egui::Context) -> Self {
        Self {
            ctx,
            nodes: Vec::new(),
            by_index: HashMap::new(),
            textures: HashMap::new(),
            transform: None,
            progress: None,
            empty: false,
        }
    }

    pub(crate) fn progress(&self) -> Option<(usize, usize)> {
        self.progress
    }

    pub(crate) fn is_empty_state(&self) -> bool {
        self.empty
    }

    pub(crate) fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Texture currently shown for the record at catalog `index`.
    pub(crate) fn texture_for(&self, index: usize) -> Option<&egui::TextureHandle> {
        let node = self.by_index.get(&index)?;
        let handle = self.nodes.get(node.0)?.image?;
        self.textures.get(&handle)
    }

    /// Paint every node overlapping `canvas` under the last applied transform.
    pub(crate) fn paint(&self, painter: &egui::Painter, canvas: egui::Rect) {
        let Some(t) = self.transform else {
            return;
        };
        let origin = canvas.min.to_vec2();
        // Nodes are stored top to bottom; skip everything above the canvas.
        let top = -t.translate_y / t.scale;
        let start = self.nodes.partition_point(|n| n.rect.max().y < top);

        for node in &self.nodes[start..] {
            let r = t.rect_to_screen(&node.rect);
            let screen = egui::Rect::from_min_size(
                egui::pos2(r.x, r.y) + origin,
                egui::vec2(r.width, r.height),
            );
            if screen.min.y > canvas.max.y {
                break;
            }
            if !screen.intersects(canvas) {
                continue;
            }
            match &node.kind {
                NodeKind::Marker { decade } => paint_marker(painter, screen, *decade, t.scale),
                NodeKind::Item {
                    label,
                    background,
                    text,
                } => {
                    let texture = node.image.and_then(|h| self.textures.get(&h));
                    match texture {
                        Some(tex) => {
                            let uv = egui::Rect::from_min_max(
                                egui::pos2(0.0, 0.0),
                                egui::pos2(1.0, 1.0),
                            );
                            painter.rect_filled(screen, 2.0, egui::Color32::from_gray(30));
                            painter.image(
                                tex.id(),
                                fit(screen, tex.size_vec2()),
                                uv,
                                egui::Color32::WHITE,
                            );
                        }
                        None => {
                            painter.rect_filled(screen, 2.0, *background);
                            if screen.height() >= MIN_LABEL_HEIGHT {
                                painter.text(
                                    screen.center(),
                                    egui::Align2::CENTER_CENTER,
                                    label,
                                    egui::FontId::proportional((12.0 * t.scale).clamp(8.0, 24.0)),
                                    *text,
                                );
                            }
                        }
                    }
                    if let Some(stroke) = highlight_stroke(node.highlight) {
                        painter.rect_stroke(screen, 2.0, stroke, egui::StrokeKind::Outside);
                    }
                }
            }
        }
    }
}

fn paint_marker(painter: &egui::Painter, screen: egui::Rect, decade: i32, scale: f32) {
    let color = egui::Color32::from_gray(200);
    painter.line_segment(
        [screen.left_bottom(), screen.right_bottom()],
        egui::Stroke::new(1.0, egui::Color32::from_gray(90)),
    );
    painter.text(
        screen.left_center(),
        egui::Align2::LEFT_CENTER,
        format!("{decade}s"),
        egui::FontId::proportional((22.0 * scale).clamp(6.0, 40.0)),
        color,
    );
}

fn highlight_stroke(highlight: Highlight) -> Option<egui::Stroke> {
    match highlight {
        Highlight::None => None,
        Highlight::Match => Some(egui::Stroke::new(2.0, MATCH_STROKE)),
        Highlight::Current => Some(egui::Stroke::new(4.0, CURRENT_STROKE)),
    }
}

/// Largest rect with the image's aspect ratio centred inside `cell`.
fn fit(cell: egui::Rect, image: egui::Vec2) -> egui::Rect {
    if image.x <= 0.0 || image.y <= 0.0 {
        return cell;
    }
    let scale = (cell.width() / image.x).min(cell.height() / image.y);
    egui::Rect::from_center_size(cell.center(), image * scale)
}

impl RenderSurface for EguiSurface {
    fn append_marker(&mut self, decade: i32, rect: Rect) -> NodeId {
        self.nodes.push(SurfaceNode {
            kind: NodeKind::Marker { decade },
            rect,
            image: None,
            highlight: Highlight::None,
        });
        NodeId(self.nodes.len() - 1)
    }

    fn append_item(
        &mut self,
        index: usize,
        _record: &StampRecord,
        rect: Rect,
        placeholder: PlaceholderVisual,
    ) -> NodeId {
        self.nodes.push(SurfaceNode {
            kind: NodeKind::Item {
                text: rgb(placeholder.text_color()),
                background: rgb(placeholder.background),
                label: placeholder.label,
            },
            rect,
            image: None,
            highlight: Highlight::None,
        });
        let node = NodeId(self.nodes.len() - 1);
        self.by_index.insert(index, node);
        node
    }

    fn set_image(&mut self, node: NodeId, view: ImageView) {
        let image = match view {
            ImageView::Placeholder => None,
            ImageView::Loaded { handle, image } => {
                self.textures.entry(handle).or_insert_with(|| {
                    let color = egui::ColorImage::from_rgba_unmultiplied(
                        [image.width as usize, image.height as usize],
                        &image.pixels,
                    );
                    self.ctx.load_texture(
                        format!("stamp-{}", handle.id()),
                        color,
                        egui::TextureOptions::LINEAR,
                    )
                });
                Some(handle)
            }
        };
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.image = image;
        }
    }

    fn release_image(&mut self, handle: ImageHandle) {
        // Dropping the last TextureHandle frees the GPU texture.
        if self.textures.remove(&handle).is_some() {
            debug!(handle = handle.id(), "Texture released");
        }
    }

    fn set_highlight(&mut self, node: NodeId, highlight: Highlight) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.highlight = highlight;
        }
    }

    fn set_progress(&mut self, progress: Option<(usize, usize)>) {
        self.progress = progress;
    }

    fn show_empty_state(&mut self) {
        self.empty = true;
    }

    fn apply_transform(&mut self, transform: ViewportTransform) {
        self.transform = Some(transform);
        self.ctx.request_repaint();
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.by_index.clear();
        self.progress = None;
        self.empty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_match_is_drawn_heavier() {
        assert_eq!(highlight_stroke(Highlight::None), None);
        let current = highlight_stroke(Highlight::Current).unwrap();
        let other = highlight_stroke(Highlight::Match).unwrap();
        assert!(current.width > other.width);
        assert_eq!(current.color, CURRENT_STROKE);
    }

    #[test]
    fn fit_keeps_aspect_inside_cell() {
        let cell = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(100.0, 50.0));
        let r = fit(cell, egui::vec2(20.0, 20.0));
        assert_eq!(r.size(), egui::vec2(50.0, 50.0));
        assert_eq!(r.center(), cell.center());
    }

    #[test]
    fn highlights_and_textures_follow_nodes() {
        let mut surface = EguiSurface::new(egui::Context::default());
        let record = StampRecord::new("1", 1900, "Ship");
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let node = surface.append_item(0, &record, rect, PlaceholderVisual::for_record(&record));
        surface.set_highlight(node, Highlight::Current);
        assert_eq!(surface.nodes[node.0].highlight, Highlight::Current);
        assert!(surface.texture_for(0).is_none());

        surface.clear();
        assert!(surface.nodes.is_empty());
        assert!(surface.texture_for(0).is_none());
    }
}
