use std::time::{Duration, Instant};

use tracing::{debug, info};

use stampgrid_core::{BrowserConfig, Catalog};

use crate::images::ImageLifecycleManager;
use crate::layout::{LayoutEntry, LayoutPlan};
use crate::placeholder::PlaceholderVisual;
use crate::surface::{NodeId, RenderSurface};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderPhase {
    #[default]
    Idle,
    Rendering,
    Done,
}

/// Records rendered so far out of the catalog total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderProgress {
    pub rendered: usize,
    pub total: usize,
}

impl RenderProgress {
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.rendered as f32 / self.total as f32
        }
    }
}

/// What one [`IncrementalRenderer::step`] produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// `(catalog index, node)` of every item created this step.
    pub emitted: Vec<(usize, NodeId)>,
    pub finished: bool,
}

/// Creates grid nodes a chunk at a time so large catalogs never block a frame.
///
/// Each call to [`step`](Self::step) walks the layout plan from where the
/// previous call stopped, emitting at most `chunk_size` records and yielding
/// early once the frame deadline passes.
#[derive(Debug)]
pub struct IncrementalRenderer {
    chunk_size: usize,
    frame_deadline: Duration,
    plan: LayoutPlan,
    cursor: usize,
    rendered: usize,
    /// Node of each catalog index, once rendered.
    nodes: Vec<Option<NodeId>>,
    phase: RenderPhase,
    started: Option<Instant>,
}

impl IncrementalRenderer {
    pub fn new(config: &BrowserConfig) -> Self {
        Self {
            chunk_size: config.chunk_size.max(1),
            frame_deadline: Duration::from_millis(config.frame_deadline_ms),
            plan: LayoutPlan::default(),
            cursor: 0,
            rendered: 0,
            nodes: Vec::new(),
            phase: RenderPhase::Idle,
            started: None,
        }
    }

    /// Begin rendering `plan`. Any previous render must be torn down first.
    pub fn start(&mut self, plan: LayoutPlan) {
        self.nodes = vec![None; plan.item_count()];
        self.plan = plan;
        self.cursor = 0;
        self.rendered = 0;
        self.phase = RenderPhase::Rendering;
        self.started = Some(Instant::now());
        debug!(
            records = self.nodes.len(),
            entries = self.plan.entries().len(),
            "Render started"
        );
    }

    /// Emit the next chunk of nodes.
    ///
    /// At least one entry is emitted per call so progress is guaranteed even
    /// under a zero deadline. Nodes are registered with `images` before this
    /// returns.
    pub fn step(
        &mut self,
        catalog: &Catalog,
        surface: &mut impl RenderSurface,
        images: &mut ImageLifecycleManager,
        frame_start: Instant,
    ) -> StepOutcome {
        let mut outcome = StepOutcome::default();
        if self.phase != RenderPhase::Rendering {
            outcome.finished = self.phase == RenderPhase::Done;
            return outcome;
        }

        if self.plan.item_count() == 0 {
            surface.show_empty_state();
            surface.set_progress(None);
            self.phase = RenderPhase::Done;
            outcome.finished = true;
            info!("Catalog is empty; nothing to render");
            return outcome;
        }

        let entries = self.plan.entries();
        let mut emitted_entries = 0usize;
        while self.cursor < entries.len() && outcome.emitted.len() < self.chunk_size {
            if emitted_entries > 0 && frame_start.elapsed() >= self.frame_deadline {
                break;
            }
            match entries[self.cursor] {
                LayoutEntry::Marker { decade, rect } => {
                    surface.append_marker(decade, rect);
                }
                LayoutEntry::Item { index, rect } => {
                    // The plan was built from this catalog.
                    let Some(record) = catalog.get(index) else {
                        self.cursor += 1;
                        continue;
                    };
                    let node = surface.append_item(
                        index,
                        record,
                        rect,
                        PlaceholderVisual::for_record(record),
                    );
                    images.register(node, rect, &record.image_path);
                    self.nodes[index] = Some(node);
                    self.rendered += 1;
                    outcome.emitted.push((index, node));
                }
            }
            self.cursor += 1;
            emitted_entries += 1;
        }

        if self.cursor >= entries.len() {
            self.phase = RenderPhase::Done;
            surface.set_progress(None);
            outcome.finished = true;
            let elapsed_ms = self
                .started
                .map(|s| s.elapsed().as_millis() as u64)
                .unwrap_or_default();
            info!(records = self.rendered, elapsed_ms, "Render complete");
        } else {
            surface.set_progress(Some((self.rendered, self.nodes.len())));
        }
        outcome
    }

    pub fn phase(&self) -> RenderPhase {
        self.phase
    }

    pub fn is_rendering(&self) -> bool {
        self.phase == RenderPhase::Rendering
    }

    pub fn progress(&self) -> RenderProgress {
        RenderProgress {
            rendered: self.rendered,
            total: self.nodes.len(),
        }
    }

    pub fn plan(&self) -> &LayoutPlan {
        &self.plan
    }

    /// Node of the record at catalog `index`, if rendered yet.
    pub fn node_of(&self, index: usize) -> Option<NodeId> {
        self.nodes.get(index).copied().flatten()
    }

    /// Drop every node and return to idle.
    pub fn teardown(&mut self, surface: &mut impl RenderSurface) {
        surface.clear();
        self.nodes.clear();
        self.plan = LayoutPlan::default();
        self.cursor = 0;
        self.rendered = 0;
        self.phase = RenderPhase::Idle;
        self.started = None;
    }
}
