use crate::geometry::{Point, Rect, Size};

/// Scaled-down overview of the whole grid with a visible-region indicator.
///
/// The content bounds are fitted into the panel preserving aspect ratio and
/// centred, so tall catalogs become a narrow strip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Minimap {
    content: Rect,
    panel: Size,
    ratio: f32,
    offset: Point,
}

impl Minimap {
    pub fn new(content: Rect, panel: Size) -> Self {
        let ratio = if content.width > 0.0 && content.height > 0.0 {
            (panel.width / content.width).min(panel.height / content.height)
        } else {
            1.0
        };
        let offset = Point::new(
            (panel.width - content.width * ratio) / 2.0,
            (panel.height - content.height * ratio) / 2.0,
        );
        Self {
            content,
            panel,
            ratio,
            offset,
        }
    }

    pub fn panel(&self) -> Size {
        self.panel
    }

    /// Logical units to panel units.
    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    pub fn logical_to_panel(&self, p: Point) -> Point {
        Point::new(
            self.offset.x + (p.x - self.content.x) * self.ratio,
            self.offset.y + (p.y - self.content.y) * self.ratio,
        )
    }

    pub fn panel_to_logical(&self, p: Point) -> Point {
        Point::new(
            self.content.x + (p.x - self.offset.x) / self.ratio,
            self.content.y + (p.y - self.offset.y) / self.ratio,
        )
    }

    /// Panel rectangle covered by the content image.
    pub fn content_rect(&self) -> Rect {
        Rect::new(
            self.offset.x,
            self.offset.y,
            self.content.width * self.ratio,
            self.content.height * self.ratio,
        )
    }

    /// Panel-space rectangle of the visible region, clamped to the panel.
    ///
    /// Panning past the content is allowed, so the indicator may shrink to
    /// a sliver at the panel edge but never leaves it.
    pub fn indicator(&self, visible: Rect) -> Rect {
        let min = self.logical_to_panel(visible.min());
        let max = self.logical_to_panel(visible.max());
        let clamp_x = |v: f32| v.clamp(0.0, self.panel.width);
        let clamp_y = |v: f32| v.clamp(0.0, self.panel.height);
        Rect::from_min_max(
            Point::new(clamp_x(min.x), clamp_y(min.y)),
            Point::new(clamp_x(max.x), clamp_y(max.y)),
        )
    }

    /// Map a logical rectangle (a rendered item) into panel space.
    pub fn item_rect(&self, r: &Rect) -> Rect {
        let min = self.logical_to_panel(r.min());
        Rect::new(min.x, min.y, r.width * self.ratio, r.height * self.ratio)
    }
}
