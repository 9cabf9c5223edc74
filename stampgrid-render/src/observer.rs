use stampgrid_core::{Rect, Size, ViewportTransform};

use crate::surface::NodeId;

/// Where a node sits relative to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Overlaps the visible container.
    Intersecting,
    /// Off screen but within the prefetch margin.
    Near,
    /// Beyond the margin but not yet far enough to evict.
    Between,
    /// Beyond the eviction distance.
    Far,
}

impl Visibility {
    /// Whether an image should be requested for a node in this state.
    pub fn wants_image(self) -> bool {
        matches!(self, Self::Intersecting | Self::Near)
    }
}

/// A node whose [`Visibility`] changed since the last observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityChange {
    pub node: NodeId,
    pub visibility: Visibility,
    /// Distance from the nearest viewport edge in viewport heights.
    pub distance: f32,
}

#[derive(Debug, Clone)]
struct Observed {
    node: NodeId,
    rect: Rect,
    state: Option<Visibility>,
    distance: f32,
}

/// Tracks which registered nodes are in, near, or far from the viewport.
///
/// Only changes are reported, and a freshly registered node is reported on
/// the next observation even if nothing moved.
#[derive(Debug, Clone)]
pub struct VisibilityObserver {
    margin: f32,
    eviction_distance: f32,
    observed: Vec<Observed>,
}

impl VisibilityObserver {
    pub fn new(margin: f32, eviction_distance: f32) -> Self {
        Self {
            margin,
            eviction_distance,
            observed: Vec::new(),
        }
    }

    /// Start tracking a node at logical position `rect`.
    pub fn observe(&mut self, node: NodeId, rect: Rect) {
        self.observed.push(Observed {
            node,
            rect,
            state: None,
            distance: f32::INFINITY,
        });
    }

    pub fn clear(&mut self) {
        self.observed.clear();
    }

    pub fn len(&self) -> usize {
        self.observed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    /// Classify a screen-space rectangle against the container.
    pub fn classify(&self, screen: &Rect, container: Size) -> (Visibility, f32) {
        let view = Rect::new(0.0, 0.0, container.width, container.height);
        let (gx, gy) = screen.gap_to(&view);
        let height = container.height.max(1.0);
        let distance = gx.max(gy) / height;
        let visibility = if distance == 0.0 && screen.intersects(&view) {
            Visibility::Intersecting
        } else if distance <= self.margin {
            Visibility::Near
        } else if distance > self.eviction_distance {
            Visibility::Far
        } else {
            Visibility::Between
        };
        (visibility, distance)
    }

    /// Re-evaluate every node under `transform` and report the ones whose
    /// visibility changed.
    pub fn recompute(
        &mut self,
        transform: &ViewportTransform,
        container: Size,
    ) -> Vec<VisibilityChange> {
        let mut changes = Vec::new();
        for i in 0..self.observed.len() {
            let screen = transform.rect_to_screen(&self.observed[i].rect);
            let (visibility, distance) = self.classify(&screen, container);
            let entry = &mut self.observed[i];
            entry.distance = distance;
            if entry.state != Some(visibility) {
                entry.state = Some(visibility);
                changes.push(VisibilityChange {
                    node: entry.node,
                    visibility,
                    distance,
                });
            }
        }
        changes
    }

    /// Last computed distance of every node, for the cache sweep.
    pub fn distances(&self) -> impl Iterator<Item = (NodeId, f32)> + '_ {
        self.observed.iter().map(|o| (o.node, o.distance))
    }

    pub fn visibility_of(&self, node: NodeId) -> Option<Visibility> {
        self.observed
            .iter()
            .find(|o| o.node == node)
            .and_then(|o| o.state)
    }
}
