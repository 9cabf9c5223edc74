use stampgrid_core::{Catalog, Point, Rect, Size};

use crate::error::RenderError;

/// Default cell size in logical units; stamps are portrait.
pub const CELL_SIZE: Size = Size::new(120.0, 150.0);
pub const CELL_GAP: f32 = 12.0;
pub const MARKER_HEIGHT: f32 = 40.0;

/// Fixed-column grid geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub columns: usize,
    pub cell: Size,
    pub gap: f32,
    pub marker_height: f32,
}

/// One planned node: a decade marker row or a stamp cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayoutEntry {
    Marker { decade: i32, rect: Rect },
    Item { index: usize, rect: Rect },
}

impl LayoutEntry {
    pub fn rect(&self) -> Rect {
        match self {
            Self::Marker { rect, .. } | Self::Item { rect, .. } => *rect,
        }
    }
}

/// Positions of every node, computed before any node exists.
#[derive(Debug, Clone, Default)]
pub struct LayoutPlan {
    entries: Vec<LayoutEntry>,
    item_rects: Vec<Rect>,
    bounds: Rect,
}

impl LayoutPlan {
    /// Entries in render order.
    pub fn entries(&self) -> &[LayoutEntry] {
        &self.entries
    }

    /// Logical rectangle of the record at catalog `index`.
    pub fn item_rect(&self, index: usize) -> Option<Rect> {
        self.item_rects.get(index).copied()
    }

    pub fn item_count(&self) -> usize {
        self.item_rects.len()
    }

    /// Bounding box of all content.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Rectangle of the marker for `decade`.
    pub fn marker_rect(&self, decade: i32) -> Option<Rect> {
        self.entries.iter().find_map(|e| match e {
            LayoutEntry::Marker { decade: d, rect } if *d == decade => Some(*rect),
            _ => None,
        })
    }

    /// Catalog index of the item under a logical point.
    pub fn item_at(&self, p: Point) -> Option<usize> {
        // Entries are laid out top to bottom, so rows ending above `p` can be skipped.
        let start = self.entries.partition_point(|e| e.rect().max().y <= p.y);
        self.entries[start..]
            .iter()
            .take_while(|e| e.rect().y <= p.y)
            .find_map(|e| match e {
                LayoutEntry::Item { index, rect } if rect.contains(p) => Some(*index),
                _ => None,
            })
    }
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            columns: 8,
            cell: CELL_SIZE,
            gap: CELL_GAP,
            marker_height: MARKER_HEIGHT,
        }
    }
}

impl GridLayout {
    pub fn new(columns: usize, cell: Size, gap: f32, marker_height: f32) -> crate::Result<Self> {
        if columns == 0 {
            return Err(RenderError::InvalidLayout {
                reason: "columns must be > 0".into(),
            });
        }
        if cell.is_empty() || gap < 0.0 || marker_height <= 0.0 {
            return Err(RenderError::InvalidLayout {
                reason: format!(
                    "cell {}×{}, gap {gap}, marker {marker_height} must be positive",
                    cell.width, cell.height
                ),
            });
        }
        Ok(Self {
            columns,
            cell,
            gap,
            marker_height,
        })
    }

    /// Default cell geometry with as many columns as fit in `width`.
    pub fn fit_width(width: f32) -> Self {
        let base = Self::default();
        let stride = base.cell.width + base.gap;
        let columns = ((width - base.gap) / stride).floor().max(1.0) as usize;
        Self { columns, ..base }
    }

    pub fn row_width(&self) -> f32 {
        self.columns as f32 * self.cell.width + (self.columns.saturating_sub(1)) as f32 * self.gap
    }

    /// Plan a marker row per decade followed by that decade's cells,
    /// flowing left to right in catalog order.
    pub fn plan(&self, catalog: &Catalog) -> LayoutPlan {
        let width = self.row_width();
        let mut entries = Vec::with_capacity(catalog.len() + catalog.len() / 8 + 1);
        let mut item_rects = Vec::with_capacity(catalog.len());
        let mut current_decade = None;
        let mut y = 0.0;
        let mut col = 0;

        for (index, record) in catalog.all().iter().enumerate() {
            let decade = record.decade();
            if current_decade != Some(decade) {
                if col > 0 {
                    y += self.cell.height + self.gap;
                    col = 0;
                }
                if current_decade.is_some() {
                    y += self.gap;
                }
                entries.push(LayoutEntry::Marker {
                    decade,
                    rect: Rect::new(0.0, y, width, self.marker_height),
                });
                y += self.marker_height + self.gap;
                current_decade = Some(decade);
            }

            let x = col as f32 * (self.cell.width + self.gap);
            let rect = Rect::new(x, y, self.cell.width, self.cell.height);
            entries.push(LayoutEntry::Item { index, rect });
            item_rects.push(rect);

            col += 1;
            if col == self.columns {
                col = 0;
                y += self.cell.height + self.gap;
            }
        }
        if col > 0 {
            y += self.cell.height;
        }

        LayoutPlan {
            entries,
            item_rects,
            bounds: Rect::new(0.0, 0.0, width, y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stampgrid_core::StampRecord;

    fn catalog(years: &[i32]) -> Catalog {
        Catalog::from_records(
            years
                .iter()
                .enumerate()
                .map(|(i, &y)| StampRecord::new(i.to_string(), y, "t"))
                .collect(),
        )
    }

    #[test]
    fn one_marker_per_decade_before_its_first_item() {
        let layout = GridLayout::new(2, Size::new(10.0, 10.0), 2.0, 5.0).unwrap();
        let plan = layout.plan(&catalog(&[1851, 1852, 1853, 1935]));
        let kinds: Vec<String> = plan
            .entries()
            .iter()
            .map(|e| match e {
                LayoutEntry::Marker { decade, .. } => format!("m{decade}"),
                LayoutEntry::Item { index, .. } => format!("i{index}"),
            })
            .collect();
        assert_eq!(kinds, ["m1850", "i0", "i1", "i2", "m1930", "i3"]);
    }

    #[test]
    fn items_do_not_overlap() {
        let layout = GridLayout::new(3, Size::new(10.0, 10.0), 2.0, 5.0).unwrap();
        let plan = layout.plan(&catalog(&[1850, 1851, 1852, 1853, 1860, 1861, 1900]));
        let rects: Vec<Rect> = plan.entries().iter().map(|e| e.rect()).collect();
        for (i, a) in rects.iter().enumerate() {
            for b in &rects[i + 1..] {
                assert!(!a.intersects(b), "{a:?} overlaps {b:?}");
            }
        }
        for r in &rects {
            assert!(plan.bounds().contains(r.min()));
        }
    }

    #[test]
    fn decade_starts_a_new_row() {
        let layout = GridLayout::new(4, Size::new(10.0, 10.0), 0.0, 5.0).unwrap();
        let plan = layout.plan(&catalog(&[1851, 1861]));
        let a = plan.item_rect(0).unwrap();
        let b = plan.item_rect(1).unwrap();
        assert_eq!(b.x, 0.0);
        assert!(b.y > a.y + a.height);
    }

    #[test]
    fn hit_test_finds_item() {
        let layout = GridLayout::new(2, Size::new(10.0, 10.0), 2.0, 5.0).unwrap();
        let plan = layout.plan(&catalog(&[1851, 1852, 1853]));
        let r = plan.item_rect(2).unwrap();
        assert_eq!(plan.item_at(r.center()), Some(2));
        assert_eq!(plan.item_at(Point::new(-5.0, -5.0)), None);
        // Marker row is not an item.
        assert_eq!(plan.item_at(Point::new(1.0, 1.0)), None);
    }

    #[test]
    fn fit_width_has_at_least_one_column() {
        assert_eq!(GridLayout::fit_width(10.0).columns, 1);
        assert!(GridLayout::fit_width(1400.0).columns > 5);
    }

    #[test]
    fn empty_catalog_has_empty_plan() {
        let plan = GridLayout::default().plan(&Catalog::default());
        assert!(plan.entries().is_empty());
        assert_eq!(plan.bounds().height, 0.0);
    }

    #[test]
    fn rejects_zero_columns() {
        assert!(GridLayout::new(0, CELL_SIZE, 1.0, 1.0).is_err());
    }
}
