use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::BrowserConfig;
use crate::error::CoreError;
use crate::geometry::{Point, Rect, Size};
use crate::throttle::Throttle;

/// Affine map from logical grid coordinates to screen coordinates:
/// `screen = logical * scale + translate`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportTransform {
    pub scale: f32,
    pub translate_x: f32,
    pub translate_y: f32,
}

impl ViewportTransform {
    pub fn new(scale: f32, translate_x: f32, translate_y: f32) -> crate::Result<Self> {
        if scale <= 0.0 || !scale.is_finite() {
            return Err(CoreError::InvalidViewport {
                reason: format!("scale must be positive and finite, got {scale}"),
            });
        }
        Ok(Self {
            scale,
            translate_x,
            translate_y,
        })
    }

    #[inline]
    pub fn logical_to_screen(&self, p: Point) -> Point {
        Point::new(
            p.x * self.scale + self.translate_x,
            p.y * self.scale + self.translate_y,
        )
    }

    #[inline]
    pub fn screen_to_logical(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.translate_x) / self.scale,
            (p.y - self.translate_y) / self.scale,
        )
    }

    pub fn rect_to_screen(&self, r: &Rect) -> Rect {
        let min = self.logical_to_screen(r.min());
        Rect::new(min.x, min.y, r.width * self.scale, r.height * self.scale)
    }
}

/// Owns the pan/zoom state of the grid.
///
/// Every mutation marks the transform dirty; [`flush`](Self::flush) hands the
/// new transform to the surface and minimap, throttled for continuous input.
#[derive(Debug, Clone)]
pub struct ViewportController {
    transform: ViewportTransform,
    initial: ViewportTransform,
    container: Size,
    min_scale: f32,
    max_scale: f32,
    readable_scale: f32,
    throttle: Throttle,
    dirty: bool,
    force: bool,
}

impl ViewportController {
    pub fn new(config: &BrowserConfig, container: Size) -> Self {
        let initial = ViewportTransform {
            scale: config
                .initial_scale
                .clamp(config.min_scale, config.max_scale),
            translate_x: 0.0,
            translate_y: 0.0,
        };
        Self {
            transform: initial,
            initial,
            container,
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            readable_scale: config.readable_scale,
            throttle: Throttle::new(Duration::from_millis(config.input_throttle_ms)),
            dirty: true,
            force: true,
        }
    }

    pub fn transform(&self) -> ViewportTransform {
        self.transform
    }

    pub fn initial(&self) -> ViewportTransform {
        self.initial
    }

    pub fn container(&self) -> Size {
        self.container
    }

    pub fn set_container(&mut self, container: Size) {
        if container != self.container {
            self.container = container;
            self.mark(true);
        }
    }

    /// Move the grid by a screen-space delta. Unbounded.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.transform.translate_x += dx;
        self.transform.translate_y += dy;
        self.mark(false);
    }

    /// Multiply the scale by `factor`, keeping the logical point under the
    /// screen point `around` fixed.
    pub fn zoom(&mut self, factor: f32, around: Point) {
        if !(factor > 0.0 && factor.is_finite()) {
            return;
        }
        let anchor = self.transform.screen_to_logical(around);
        let scale = (self.transform.scale * factor).clamp(self.min_scale, self.max_scale);
        self.transform.scale = scale;
        self.transform.translate_x = around.x - anchor.x * scale;
        self.transform.translate_y = around.y - anchor.y * scale;
        self.mark(false);
    }

    /// Zoom around the centre of the container (toolbar buttons, keys).
    pub fn zoom_step(&mut self, factor: f32) {
        self.zoom(factor, self.container.center());
        self.force = true;
    }

    /// Centre `target` (logical) in the container at a readable scale.
    pub fn jump_to(&mut self, target: Rect) {
        let scale = self
            .transform
            .scale
            .max(self.readable_scale)
            .clamp(self.min_scale, self.max_scale);
        self.transform.scale = scale;
        self.center_at_scale(target.center(), scale);
        debug!(
            x = target.x,
            y = target.y,
            scale,
            "Jumped to target"
        );
    }

    /// Centre a logical point without changing the scale.
    pub fn center_on(&mut self, logical: Point) {
        self.center_at_scale(logical, self.transform.scale);
    }

    /// Restore the documented initial transform exactly.
    pub fn reset(&mut self) {
        self.transform = self.initial;
        self.mark(true);
    }

    /// The part of the logical grid currently on screen.
    pub fn visible_logical_rect(&self) -> Rect {
        let min = self.transform.screen_to_logical(Point::ZERO);
        let max = self
            .transform
            .screen_to_logical(Point::new(self.container.width, self.container.height));
        Rect::from_min_max(min, max)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Return the transform to reapply if it changed and the throttle allows.
    ///
    /// When throttled, the state stays dirty and a later flush applies it.
    pub fn flush(&mut self, now: Instant) -> Option<ViewportTransform> {
        if !self.dirty {
            return None;
        }
        if self.force {
            self.throttle.reset();
        }
        if !self.throttle.try_fire(now) {
            return None;
        }
        self.dirty = false;
        self.force = false;
        Some(self.transform)
    }

    /// How long until a pending throttled flush can run.
    pub fn flush_delay(&self, now: Instant) -> Option<Duration> {
        self.dirty.then(|| self.throttle.remaining(now))
    }

    fn center_at_scale(&mut self, logical: Point, scale: f32) {
        let c = self.container.center();
        self.transform.translate_x = c.x - logical.x * scale;
        self.transform.translate_y = c.y - logical.y * scale;
        self.mark(true);
    }

    fn mark(&mut self, force: bool) {
        self.dirty = true;
        self.force |= force;
    }
}
