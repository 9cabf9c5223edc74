use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Capability detection
// ---------------------------------------------------------------------------

/// Broad class of the environment the browser runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentProfile {
    #[default]
    Capable,
    /// Mobile-class: few cores, narrow screen, or touch input.
    Constrained,
}

/// Facts about the host gathered once at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capabilities {
    pub logical_cpus: usize,
    /// Width of the primary screen or window in logical points.
    pub screen_width: f32,
    pub touch: bool,
}

impl Capabilities {
    pub fn detect_profile(self) -> EnvironmentProfile {
        let profile = if self.logical_cpus <= 4 || self.screen_width < 768.0 || self.touch {
            EnvironmentProfile::Constrained
        } else {
            EnvironmentProfile::Capable
        };
        info!(
            cpus = self.logical_cpus,
            screen_width = self.screen_width,
            touch = self.touch,
            ?profile,
            "Environment detected"
        );
        profile
    }
}

// ---------------------------------------------------------------------------
// Browser configuration
// ---------------------------------------------------------------------------

/// Tuning knobs for the renderer, image manager, and viewport.
///
/// Selected once at startup for the detected [`EnvironmentProfile`] and then
/// injected into the single renderer / image manager pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Maximum records emitted per renderer step.
    pub chunk_size: usize,
    /// Time budget of one renderer step.
    pub frame_deadline_ms: u64,
    /// Hard ceiling on image fetches in flight.
    pub max_concurrent_loads: usize,
    /// Maximum cached decoded images.
    pub cache_ceiling: usize,
    /// Prefetch margin around the viewport, in viewport heights.
    pub viewport_margin: f32,
    /// Distance beyond the nearest viewport edge, in viewport heights, past
    /// which a loaded image is evicted.
    pub eviction_distance: f32,
    /// Interval of the cache safety sweep.
    pub sweep_interval_ms: u64,
    /// Extra entries the sweep frees below the ceiling so it does not run
    /// again on the very next insert.
    pub sweep_batch: usize,
    /// Minimum interval between transform reapplications during drag/wheel.
    pub input_throttle_ms: u64,
    pub min_scale: f32,
    pub max_scale: f32,
    /// Scale `jump_to` enforces at minimum so the target is legible.
    pub readable_scale: f32,
    pub initial_scale: f32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self::for_profile(EnvironmentProfile::Capable)
    }
}

impl BrowserConfig {
    pub fn for_profile(profile: EnvironmentProfile) -> Self {
        match profile {
            EnvironmentProfile::Capable => Self {
                chunk_size: 60,
                frame_deadline_ms: 12,
                max_concurrent_loads: 8,
                cache_ceiling: 400,
                viewport_margin: 1.0,
                eviction_distance: 3.0,
                sweep_interval_ms: 2_000,
                sweep_batch: 50,
                input_throttle_ms: 16,
                min_scale: 0.1,
                max_scale: 4.0,
                readable_scale: 1.0,
                initial_scale: 1.0,
            },
            EnvironmentProfile::Constrained => Self {
                chunk_size: 20,
                frame_deadline_ms: 6,
                max_concurrent_loads: 3,
                cache_ceiling: 120,
                viewport_margin: 0.5,
                eviction_distance: 2.0,
                sweep_interval_ms: 1_000,
                sweep_batch: 20,
                input_throttle_ms: 33,
                min_scale: 0.1,
                max_scale: 3.0,
                readable_scale: 1.0,
                initial_scale: 1.0,
            },
        }
    }

    pub fn validate(&self) -> crate::Result<()> {
        let fail = |reason: String| Err(CoreError::InvalidConfig { reason });
        if self.chunk_size == 0 {
            return fail("chunk_size must be > 0".into());
        }
        if self.max_concurrent_loads == 0 {
            return fail("max_concurrent_loads must be > 0".into());
        }
        if self.cache_ceiling == 0 {
            return fail("cache_ceiling must be > 0".into());
        }
        if !(self.min_scale > 0.0 && self.min_scale.is_finite()) {
            return fail(format!("min_scale must be positive, got {}", self.min_scale));
        }
        if !(self.max_scale >= self.min_scale && self.max_scale.is_finite()) {
            return fail(format!(
                "max_scale ({}) must be >= min_scale ({})",
                self.max_scale, self.min_scale
            ));
        }
        if self.viewport_margin < 0.0 || self.eviction_distance < self.viewport_margin {
            return fail(format!(
                "eviction_distance ({}) must be >= viewport_margin ({}) >= 0",
                self.eviction_distance, self.viewport_margin
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_machines_are_classified_machines_as_constrained() {
        let phone = Capabilities {
            logical_cpus: 8,
            screen_width: 390.0,
            touch: true,
        };
        assert_eq!(phone.detect_profile(), EnvironmentProfile::Constrained);

        let laptop = Capabilities {
            logical_cpus: 2,
            screen_width: 1440.0,
            touch: false,
        };
        assert_eq!(laptop.detect_profile(), EnvironmentProfile::Constrained);

        let desktop = Capabilities {
            logical_cpus: 16,
            screen_width: 2560.0,
            touch: false,
        };
        assert_eq!(desktop.detect_profile(), EnvironmentProfile::Capable);
    }

    #[test]
    fn constrained_profile_is_more_conservative() {
        let fast = BrowserConfig::for_profile(EnvironmentProfile::Capable);
        let slow = BrowserConfig::for_profile(EnvironmentProfile::Constrained);
        assert!(slow.chunk_size < fast.chunk_size);
        assert!(slow.frame_deadline_ms < fast.frame_deadline_ms);
        assert!(slow.max_concurrent_loads < fast.max_concurrent_loads);
        assert!(slow.cache_ceiling < fast.cache_ceiling);
        assert!(slow.input_throttle_ms > fast.input_throttle_ms);
    }

    #[test]
    fn defaults_validate() {
        assert!(BrowserConfig::for_profile(EnvironmentProfile::Capable)
            .validate()
            .is_ok());
        assert!(BrowserConfig::for_profile(EnvironmentProfile::Constrained)
            .validate()
            .is_ok());
    }

    #[test]
    fn rejects_degenerate_values() {
        let base = BrowserConfig::default();
        for bad in [
            BrowserConfig { chunk_size: 0, ..base.clone() },
            BrowserConfig { max_concurrent_loads: 0, ..base.clone() },
            BrowserConfig { cache_ceiling: 0, ..base.clone() },
            BrowserConfig { min_scale: 0.0, ..base.clone() },
            BrowserConfig { max_scale: 0.05, ..base.clone() },
            BrowserConfig { eviction_distance: 0.1, ..base.clone() },
        ] {
            assert!(bad.validate().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let cfg: BrowserConfig = serde_json::from_str(r#"{"chunk_size": 5}"#).unwrap();
        assert_eq!(cfg.chunk_size, 5);
        assert_eq!(cfg.cache_ceiling, BrowserConfig::default().cache_ceiling);
    }
}
