use serde::{Deserialize, Serialize};

/// A point in either logical grid space or screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Axis-aligned rectangle given by its top-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_min_max(min: Point, max: Point) -> Self {
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    pub fn min(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn max(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }

    /// Grow every edge outward by the given amounts.
    pub fn expand(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(
            self.x - dx,
            self.y - dy,
            self.width + 2.0 * dx,
            self.height + 2.0 * dy,
        )
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        let min = Point::new(self.x.min(other.x), self.y.min(other.y));
        let max = Point::new(
            self.max().x.max(other.max().x),
            self.max().y.max(other.max().y),
        );
        Rect::from_min_max(min, max)
    }

    /// Horizontal and vertical separation between two rectangles; an axis
    /// on which they overlap reports 0.0.
    pub fn gap_to(&self, other: &Rect) -> (f32, f32) {
        let gx = (other.x - self.max().x).max(self.x - other.max().x).max(0.0);
        let gy = (other.y - self.max().y).max(self.y - other.max().y).max(0.0);
        (gx, gy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersects_is_exclusive_at_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.intersects(&Rect::new(10.0, 0.0, 5.0, 5.0)));
    }

    #[test]
    fn gap_measures_separation_per_axis() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(a.gap_to(&Rect::new(0.0, 30.0, 10.0, 10.0)), (0.0, 20.0));
        assert_eq!(a.gap_to(&Rect::new(-25.0, 0.0, 10.0, 10.0)), (15.0, 0.0));
        assert_eq!(a.gap_to(&Rect::new(2.0, 2.0, 1.0, 1.0)), (0.0, 0.0));
    }

    #[test]
    fn union_covers_both() {
        let u = Rect::new(0.0, 0.0, 1.0, 1.0).union(&Rect::new(5.0, -2.0, 1.0, 1.0));
        assert_eq!(u, Rect::new(0.0, -2.0, 6.0, 3.0));
    }
}
