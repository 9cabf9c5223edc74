use stampgrid_core::{MatchRole, SearchState};

use crate::surface::{Highlight, NodeId, RenderSurface};

fn highlight_for(role: MatchRole) -> Highlight {
    match role {
        MatchRole::Current => Highlight::Current,
        MatchRole::Other => Highlight::Match,
    }
}

/// Keeps node highlights in sync with the search state.
///
/// Every previously marked node is cleared before new marks go on, so stale
/// highlights never survive a query change.
#[derive(Debug, Default)]
pub struct HighlightOverlay {
    marked: Vec<NodeId>,
}

impl HighlightOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-mark every rendered match. Matches not rendered yet are picked up
    /// by [`on_rendered`](Self::on_rendered).
    pub fn apply(
        &mut self,
        surface: &mut impl RenderSurface,
        state: &SearchState,
        node_of: impl Fn(usize) -> Option<NodeId>,
    ) {
        for node in self.marked.drain(..) {
            surface.set_highlight(node, Highlight::None);
        }
        for m in state.matches() {
            let (Some(node), Some(role)) = (node_of(m.index), state.role_of(m.index)) else {
                continue;
            };
            surface.set_highlight(node, highlight_for(role));
            self.marked.push(node);
        }
    }

    /// Mark freshly rendered nodes that already match.
    pub fn on_rendered(
        &mut self,
        surface: &mut impl RenderSurface,
        state: &SearchState,
        emitted: &[(usize, NodeId)],
    ) {
        if state.matches().is_empty() {
            return;
        }
        for &(index, node) in emitted {
            if let Some(role) = state.role_of(index) {
                surface.set_highlight(node, highlight_for(role));
                self.marked.push(node);
            }
        }
    }

    pub fn marked(&self) -> &[NodeId] {
        &self.marked
    }

    /// Forget marks without touching the surface, after it was cleared.
    pub fn reset(&mut self) {
        self.marked.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placeholder::PlaceholderVisual;
    use crate::surface::MemorySurface;
    use stampgrid_core::{Catalog, Rect, StampRecord};

    fn setup() -> (Catalog, MemorySurface) {
        let catalog = Catalog::from_records(vec![
            StampRecord::new("1", 1851, "Ship"),
            StampRecord::new("2", 1852, "Queen"),
            StampRecord::new("3", 1935, "Ship"),
        ]);
        let mut surface = MemorySurface::new();
        for (i, r) in catalog.all().iter().enumerate() {
            surface.append_item(i, r, Rect::default(), PlaceholderVisual::for_record(r));
        }
        (catalog, surface)
    }

    #[test]
    fn marks_current_and_other_matches() {
        let (catalog, mut surface) = setup();
        let mut state = SearchState::new();
        state.set_query(&catalog, "ship");
        let mut overlay = HighlightOverlay::new();
        overlay.apply(&mut surface, &state, |i| Some(NodeId(i)));
        assert_eq!(
            surface.highlighted(),
            vec![(NodeId(0), Highlight::Current), (NodeId(2), Highlight::Match)]
        );

        state.next();
        overlay.apply(&mut surface, &state, |i| Some(NodeId(i)));
        assert_eq!(
            surface.highlighted(),
            vec![(NodeId(0), Highlight::Match), (NodeId(2), Highlight::Current)]
        );
    }

    #[test]
    fn new_query_clears_old_marks() {
        let (catalog, mut surface) = setup();
        let mut state = SearchState::new();
        let mut overlay = HighlightOverlay::new();
        state.set_query(&catalog, "ship");
        overlay.apply(&mut surface, &state, |i| Some(NodeId(i)));
        state.set_query(&catalog, "queen");
        overlay.apply(&mut surface, &state, |i| Some(NodeId(i)));
        assert_eq!(surface.highlighted(), vec![(NodeId(1), Highlight::Current)]);

        state.clear();
        overlay.apply(&mut surface, &state, |i| Some(NodeId(i)));
        assert!(surface.highlighted().is_empty());
    }

    #[test]
    fn late_rendered_matches_are_marked() {
        let (catalog, mut surface) = setup();
        let mut state = SearchState::new();
        state.set_query(&catalog, "ship");
        let mut overlay = HighlightOverlay::new();
        // Only the first node exists when the query runs.
        overlay.apply(&mut surface, &state, |i| (i == 0).then_some(NodeId(i)));
        assert_eq!(surface.highlighted().len(), 1);
        overlay.on_rendered(&mut surface, &state, &[(1, NodeId(1)), (2, NodeId(2))]);
        assert_eq!(
            surface.highlighted(),
            vec![(NodeId(0), Highlight::Current), (NodeId(2), Highlight::Match)]
        );
    }
}
