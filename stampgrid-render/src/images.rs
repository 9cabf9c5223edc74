use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use stampgrid_core::{BrowserConfig, Rect, Size, ViewportTransform};

use crate::cache::{DecodedImage, ImageCache, ImageHandle};
use crate::error::ImageLoadError;
use crate::observer::{Visibility, VisibilityChange, VisibilityObserver};
use crate::surface::{ImageView, NodeId, RenderSurface};

// ---------------------------------------------------------------------------
// Fetching
// ---------------------------------------------------------------------------

/// Identifies one in-flight fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FetchTicket(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: FetchTicket,
    pub path: String,
}

/// Starts asynchronous image fetches.
///
/// Implementations must eventually report every ticket back through
/// [`ImageLifecycleManager::on_fetch_complete`], success or failure.
pub trait ImageFetcher {
    fn begin(&mut self, request: FetchRequest);
}

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

/// State of one rendered item's image slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Placeholder,
    /// Waiting for a free fetch slot.
    Queued,
    Loading(FetchTicket),
    Loaded(ImageHandle),
    /// Fetch or decode failed; the placeholder visual stays up.
    Failed,
}

#[derive(Debug, Clone)]
struct Slot {
    path: String,
    state: SlotState,
    visibility: Option<Visibility>,
}

#[derive(Debug, Clone)]
struct InFlight {
    path: String,
    started: Instant,
}

/// Counters shown in the HUD.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageStats {
    pub in_flight: usize,
    pub queued: usize,
    pub cached: usize,
    pub loaded_total: u64,
    pub failed_total: u64,
    pub evicted_total: u64,
    pub stale_total: u64,
}

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

/// Loads images for items near the viewport and evicts them once they drift
/// away, keeping fetch concurrency and cache size bounded.
#[derive(Debug)]
pub struct ImageLifecycleManager {
    observer: VisibilityObserver,
    slots: HashMap<NodeId, Slot>,
    /// Items currently intersecting the viewport.
    visible_queue: VecDeque<NodeId>,
    /// Items inside the prefetch margin only.
    prefetch_queue: VecDeque<NodeId>,
    in_flight: HashMap<FetchTicket, InFlight>,
    /// Path → ticket of the fetch already running for it.
    path_tickets: HashMap<String, FetchTicket>,
    cache: ImageCache,
    next_ticket: u64,
    max_concurrent: usize,
    cache_ceiling: usize,
    sweep_batch: usize,
    sweep_interval: Duration,
    last_sweep: Option<Instant>,
    stats: ImageStats,
}

impl ImageLifecycleManager {
    pub fn new(config: &BrowserConfig) -> Self {
        Self {
            observer: VisibilityObserver::new(config.viewport_margin, config.eviction_distance),
            slots: HashMap::new(),
            visible_queue: VecDeque::new(),
            prefetch_queue: VecDeque::new(),
            in_flight: HashMap::new(),
            path_tickets: HashMap::new(),
            cache: ImageCache::new(),
            next_ticket: 0,
            max_concurrent: config.max_concurrent_loads.max(1),
            cache_ceiling: config.cache_ceiling.max(1),
            sweep_batch: config.sweep_batch,
            sweep_interval: Duration::from_millis(config.sweep_interval_ms),
            last_sweep: None,
            stats: ImageStats::default(),
        }
    }

    /// Track a freshly rendered item. Items without an image path go
    /// straight to [`SlotState::Failed`] and never fetch.
    pub fn register(&mut self, node: NodeId, rect: Rect, image_path: &str) {
        let state = if image_path.is_empty() {
            SlotState::Failed
        } else {
            SlotState::Placeholder
        };
        self.slots.insert(
            node,
            Slot {
                path: image_path.to_string(),
                state,
                visibility: None,
            },
        );
        self.observer.observe(node, rect);
    }

    pub fn slot_state(&self, node: NodeId) -> Option<SlotState> {
        self.slots.get(&node).map(|s| s.state)
    }

    pub fn stats(&self) -> ImageStats {
        ImageStats {
            in_flight: self.in_flight.len(),
            queued: self
                .slots
                .values()
                .filter(|s| s.state == SlotState::Queued)
                .count(),
            cached: self.cache.len(),
            ..self.stats
        }
    }

    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn has_pending_work(&self) -> bool {
        !self.in_flight.is_empty()
            || !self.visible_queue.is_empty()
            || !self.prefetch_queue.is_empty()
    }

    /// Recompute visibility under a new transform and react to the changes.
    pub fn update_viewport(
        &mut self,
        transform: &ViewportTransform,
        container: Size,
        surface: &mut impl RenderSurface,
    ) {
        let changes = self.observer.recompute(transform, container);
        if !changes.is_empty() {
            debug!(changes = changes.len(), "Visibility changed");
        }
        for change in changes {
            self.on_visibility(change, surface);
        }
    }

    fn on_visibility(&mut self, change: VisibilityChange, surface: &mut impl RenderSurface) {
        let Some(slot) = self.slots.get_mut(&change.node) else {
            return;
        };
        slot.visibility = Some(change.visibility);
        let node = change.node;

        match (change.visibility, slot.state) {
            (Visibility::Intersecting, SlotState::Placeholder | SlotState::Queued) => {
                slot.state = SlotState::Queued;
                self.visible_queue.push_back(node);
            }
            (Visibility::Near, SlotState::Placeholder) => {
                slot.state = SlotState::Queued;
                self.prefetch_queue.push_back(node);
            }
            (Visibility::Between | Visibility::Far, SlotState::Queued) => {
                // Out of reach before its turn came; dropped lazily when popped.
                slot.state = SlotState::Placeholder;
            }
            (Visibility::Far, SlotState::Loading(_)) => {
                // No cancel in flight: the completion will find nobody waiting.
                slot.state = SlotState::Placeholder;
            }
            (Visibility::Far, SlotState::Loaded(handle)) => {
                let path = slot.path.clone();
                slot.state = SlotState::Placeholder;
                surface.set_image(node, ImageView::Placeholder);
                if self.cache.detach(&path, node) {
                    if let Some(evicted) = self.cache.evict(&path) {
                        surface.release_image(evicted.handle);
                        self.stats.evicted_total += 1;
                    }
                } else {
                    debug!(?handle, path = %path, "Image still shown elsewhere; kept");
                }
            }
            (Visibility::Far, SlotState::Failed) if !slot.path.is_empty() => {
                // Retry on the next approach.
                slot.state = SlotState::Placeholder;
            }
            _ => {}
        }
    }

    /// Start queued fetches while under the concurrency ceiling.
    pub fn pump(&mut self, fetcher: &mut impl ImageFetcher, surface: &mut impl RenderSurface) {
        while self.in_flight.len() < self.max_concurrent {
            let Some(node) = self.pop_queued() else {
                break;
            };
            let Some(slot) = self.slots.get_mut(&node) else {
                continue;
            };

            if let Some((handle, image)) = self.cache.get(&slot.path) {
                slot.state = SlotState::Loaded(handle);
                self.cache.attach(&slot.path, node);
                surface.set_image(node, ImageView::Loaded { handle, image });
                continue;
            }
            if let Some(&ticket) = self.path_tickets.get(&slot.path) {
                slot.state = SlotState::Loading(ticket);
                continue;
            }

            self.next_ticket += 1;
            let ticket = FetchTicket(self.next_ticket);
            slot.state = SlotState::Loading(ticket);
            self.in_flight.insert(
                ticket,
                InFlight {
                    path: slot.path.clone(),
                    started: Instant::now(),
                },
            );
            self.path_tickets.insert(slot.path.clone(), ticket);
            fetcher.begin(FetchRequest {
                ticket,
                path: slot.path.clone(),
            });
        }
    }

    /// Next queued node still waiting, visible items first.
    ///
    /// Visibility is re-checked on pop: a visible entry that has since
    /// dropped into the margin moves to the prefetch queue.
    fn pop_queued(&mut self) -> Option<NodeId> {
        while let Some(node) = self.visible_queue.pop_front() {
            let Some(slot) = self.slots.get(&node) else {
                continue;
            };
            if slot.state != SlotState::Queued {
                continue;
            }
            match slot.visibility {
                Some(Visibility::Intersecting) => return Some(node),
                Some(Visibility::Near) => self.prefetch_queue.push_back(node),
                _ => {}
            }
        }
        loop {
            let node = self.prefetch_queue.pop_front()?;
            let Some(slot) = self.slots.get(&node) else {
                continue;
            };
            let wanted = matches!(
                slot.visibility,
                Some(Visibility::Intersecting | Visibility::Near)
            );
            if slot.state == SlotState::Queued && wanted {
                return Some(node);
            }
        }
    }

    /// Apply the outcome of a fetch. The concurrency slot is always released;
    /// results nobody is waiting for any more are dropped.
    pub fn on_fetch_complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<DecodedImage, ImageLoadError>,
        surface: &mut impl RenderSurface,
    ) {
        let Some(flight) = self.in_flight.remove(&ticket) else {
            debug!(?ticket, "Completion for unknown ticket ignored");
            return;
        };
        if self.path_tickets.get(&flight.path) == Some(&ticket) {
            self.path_tickets.remove(&flight.path);
        }

        let waiting: Vec<NodeId> = self
            .slots
            .iter()
            .filter(|(_, s)| s.state == SlotState::Loading(ticket))
            .map(|(&n, _)| n)
            .collect();

        if waiting.is_empty() {
            self.stats.stale_total += 1;
            debug!(path = %flight.path, "Stale image result discarded");
            return;
        }

        match result {
            Ok(image) => {
                let (handle, image) = self.cache.insert(&flight.path, image);
                for node in waiting {
                    if let Some(slot) = self.slots.get_mut(&node) {
                        slot.state = SlotState::Loaded(handle);
                    }
                    self.cache.attach(&flight.path, node);
                    surface.set_image(
                        node,
                        ImageView::Loaded {
                            handle,
                            image: image.clone(),
                        },
                    );
                }
                self.stats.loaded_total += 1;
                debug!(
                    path = %flight.path,
                    elapsed_ms = flight.started.elapsed().as_millis() as u64,
                    "Image loaded"
                );
            }
            Err(e) => {
                for node in waiting {
                    if let Some(slot) = self.slots.get_mut(&node) {
                        slot.state = SlotState::Failed;
                    }
                    surface.set_image(node, ImageView::Placeholder);
                }
                self.stats.failed_total += 1;
                debug!(path = %flight.path, "Image load failed: {e}");
            }
        }
    }

    /// Periodic safety sweep: once per interval, trim the cache back under
    /// its ceiling by evicting the entries farthest from the viewport.
    ///
    /// Returns the number of evicted entries.
    pub fn sweep(&mut self, now: Instant, surface: &mut impl RenderSurface) -> usize {
        if let Some(last) = self.last_sweep {
            if now.saturating_duration_since(last) < self.sweep_interval {
                return 0;
            }
        }
        self.last_sweep = Some(now);
        self.enforce_ceiling(surface)
    }

    /// Trim the cache immediately, regardless of the sweep interval.
    pub fn enforce_ceiling(&mut self, surface: &mut impl RenderSurface) -> usize {
        if self.cache.len() <= self.cache_ceiling {
            return 0;
        }
        let target = self.cache_ceiling.saturating_sub(self.sweep_batch);
        let excess = self.cache.len() - target;

        let distances: HashMap<NodeId, f32> = self.observer.distances().collect();
        let mut ranked: Vec<(f32, u64, String)> = self
            .cache
            .entries()
            .map(|(path, users, seq)| {
                // An entry is as visible as its closest user.
                let d = users
                    .iter()
                    .filter_map(|n| distances.get(n))
                    .fold(f32::INFINITY, |acc, &d| acc.min(d));
                (d, seq, path.to_string())
            })
            .collect();
        // Farthest first, then oldest.
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));

        let mut evicted = 0;
        for (_, _, path) in ranked.into_iter().take(excess) {
            let Some(entry) = self.cache.evict(&path) else {
                continue;
            };
            for node in entry.users {
                if let Some(slot) = self.slots.get_mut(&node) {
                    slot.state = SlotState::Placeholder;
                }
                surface.set_image(node, ImageView::Placeholder);
            }
            surface.release_image(entry.handle);
            evicted += 1;
        }
        self.stats.evicted_total += evicted as u64;
        info!(
            evicted,
            remaining = self.cache.len(),
            ceiling = self.cache_ceiling,
            "Cache sweep"
        );
        evicted
    }

    /// Forget every item and free every cached image.
    pub fn teardown(&mut self, surface: &mut impl RenderSurface) {
        for handle in self.cache.clear() {
            surface.release_image(handle);
        }
        self.slots.clear();
        self.observer.clear();
        self.visible_queue.clear();
        self.prefetch_queue.clear();
        // In-flight tickets stay so their slots are released on completion;
        // with no slots left the results are discarded as stale.
        self.path_tickets.clear();
        self.last_sweep = None;
    }
}
