use std::time::{Duration, Instant};

/// Rate limiter for high-frequency input (drag-pan, wheel-zoom).
///
/// Fires at most once per `interval`; callers keep their own dirty flag and
/// retry on a later frame so the final state is always applied.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns `true` and records `now` if the interval has elapsed.
    pub fn try_fire(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    /// Time until the next call to [`try_fire`](Self::try_fire) can succeed.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last {
            Some(last) => self
                .interval
                .saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }

    /// Force the next call to fire regardless of timing.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
