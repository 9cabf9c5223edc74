use std::sync::Arc;

use stampgrid_core::{Rect, StampRecord, ViewportTransform};

use crate::cache::{DecodedImage, ImageHandle};
use crate::placeholder::PlaceholderVisual;

/// Identifier of a node appended to a [`RenderSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Search marker on a rendered item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Highlight {
    #[default]
    None,
    /// Matches the query but is not the current match.
    Match,
    Current,
}

/// What an item's image slot currently displays.
#[derive(Debug, Clone)]
pub enum ImageView {
    Placeholder,
    Loaded {
        handle: ImageHandle,
        image: Arc<DecodedImage>,
    },
}

/// Display target of the renderer.
///
/// Nodes are append-only; only their image payload and highlight change
/// after creation, until [`clear`](Self::clear) tears everything down.
pub trait RenderSurface {
    fn append_marker(&mut self, decade: i32, rect: Rect) -> NodeId;

    fn append_item(
        &mut self,
        index: usize,
        record: &StampRecord,
        rect: Rect,
        placeholder: PlaceholderVisual,
    ) -> NodeId;

    fn set_image(&mut self, node: NodeId, view: ImageView);

    /// The handle has been freed; drop any resource derived from it.
    fn release_image(&mut self, handle: ImageHandle);

    fn set_highlight(&mut self, node: NodeId, highlight: Highlight);

    /// `Some((rendered, total))` while rendering, `None` once finished.
    fn set_progress(&mut self, progress: Option<(usize, usize)>);

    fn show_empty_state(&mut self);

    fn apply_transform(&mut self, transform: ViewportTransform);

    fn clear(&mut self);
}

// ---------------------------------------------------------------------------
// In-memory surface
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum MemoryNodeKind {
    Marker { decade: i32 },
    Item { index: usize, id: String },
}

#[derive(Debug, Clone)]
pub struct MemoryNode {
    pub kind: MemoryNodeKind,
    pub rect: Rect,
    pub placeholder: Option<PlaceholderVisual>,
    pub image: Option<ImageHandle>,
    pub highlight: Highlight,
}

/// Headless surface that records every call. Used by tests and benchmarks.
#[derive(Debug, Default)]
pub struct MemorySurface {
    pub nodes: Vec<MemoryNode>,
    pub progress: Option<(usize, usize)>,
    /// Every progress value ever set, in order.
    pub progress_log: Vec<Option<(usize, usize)>>,
    pub empty_state: bool,
    pub transform: Option<ViewportTransform>,
    pub transforms_applied: usize,
    pub released: Vec<ImageHandle>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: NodeId) -> &MemoryNode {
        &self.nodes[id.0]
    }

    pub fn item_nodes(&self) -> impl Iterator<Item = &MemoryNode> {
        self.nodes
            .iter()
            .filter(|n| matches!(n.kind, MemoryNodeKind::Item { .. }))
    }

    pub fn marker_decades(&self) -> Vec<i32> {
        self.nodes
            .iter()
            .filter_map(|n| match n.kind {
                MemoryNodeKind::Marker { decade } => Some(decade),
                _ => None,
            })
            .collect()
    }

    pub fn highlighted(&self) -> Vec<(NodeId, Highlight)> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.highlight != Highlight::None)
            .map(|(i, n)| (NodeId(i), n.highlight))
            .collect()
    }
}

impl RenderSurface for MemorySurface {
    fn append_marker(&mut self, decade: i32, rect: Rect) -> NodeId {
        self.nodes.push(MemoryNode {
            kind: MemoryNodeKind::Marker { decade },
            rect,
            placeholder: None,
            image: None,
            highlight: Highlight::None,
        });
        NodeId(self.nodes.len() - 1)
    }

    fn append_item(
        &mut self,
        index: usize,
        record: &StampRecord,
        rect: Rect,
        placeholder: PlaceholderVisual,
    ) -> NodeId {
        self.nodes.push(MemoryNode {
            kind: MemoryNodeKind::Item {
                index,
                id: record.id.clone(),
            },
            rect,
            placeholder: Some(placeholder),
            image: None,
            highlight: Highlight::None,
        });
        NodeId(self.nodes.len() - 1)
    }

    fn set_image(&mut self, node: NodeId, view: ImageView) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.image = match view {
                ImageView::Placeholder => None,
                ImageView::Loaded { handle, .. } => Some(handle),
            };
        }
    }

    fn release_image(&mut self, handle: ImageHandle) {
        self.released.push(handle);
    }

    fn set_highlight(&mut self, node: NodeId, highlight: Highlight) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.highlight = highlight;
        }
    }

    fn set_progress(&mut self, progress: Option<(usize, usize)>) {
        self.progress = progress;
        self.progress_log.push(progress);
    }

    fn show_empty_state(&mut self) {
        self.empty_state = true;
    }

    fn apply_transform(&mut self, transform: ViewportTransform) {
        self.transform = Some(transform);
        self.transforms_applied += 1;
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.progress = None;
        self.empty_state = false;
    }
}
