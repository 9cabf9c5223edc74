use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use stampgrid_core::{BrowserConfig, Capabilities, EnvironmentProfile};

/// File name looked up next to the executable and in the config directory.
pub const SETTINGS_FILE: &str = "stampgrid.json";

// ---------------------------------------------------------------------------
// Browser overrides
// ---------------------------------------------------------------------------

/// Individual knobs layered on top of the profile defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserOverrides {
    pub chunk_size: Option<usize>,
    pub frame_deadline_ms: Option<u64>,
    pub max_concurrent_loads: Option<usize>,
    pub cache_ceiling: Option<usize>,
    pub viewport_margin: Option<f32>,
    pub eviction_distance: Option<f32>,
    pub sweep_interval_ms: Option<u64>,
    pub sweep_batch: Option<usize>,
    pub input_throttle_ms: Option<u64>,
    pub min_scale: Option<f32>,
    pub max_scale: Option<f32>,
}

impl BrowserOverrides {
    pub fn apply(&self, config: &mut BrowserConfig) {
        macro_rules! set {
            ($($field:ident),*) => {
                $(if let Some(v) = self.$field {
                    config.$field = v;
                })*
            };
        }
        set!(
            chunk_size,
            frame_deadline_ms,
            max_concurrent_loads,
            cache_ceiling,
            viewport_margin,
            eviction_distance,
            sweep_interval_ms,
            sweep_batch,
            input_throttle_ms,
            min_scale,
            max_scale
        );
    }
}

// ---------------------------------------------------------------------------
// Application settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Catalog document to open at startup. Relative paths resolve against
    /// the working directory.
    #[serde(default)]
    pub catalog_path: String,
    #[serde(default = "default_window_width")]
    pub window_width: f32,
    #[serde(default = "default_window_height")]
    pub window_height: f32,
    /// Forces a profile instead of probing the machine.
    #[serde(default)]
    pub profile: Option<EnvironmentProfile>,
    #[serde(default)]
    pub overrides: BrowserOverrides,
    /// Grid columns; fitted to the window width when absent.
    #[serde(default)]
    pub columns: Option<usize>,
    #[serde(default = "default_true")]
    pub show_minimap: bool,
    #[serde(default)]
    pub minimap_size: MinimapSize,
    /// HUD panel background opacity 0.0..=1.0.
    #[serde(default = "default_hud_panel_opacity")]
    pub hud_panel_opacity: f32,
}

/// Minimap panel height in points; the width follows the content aspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinimapSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl MinimapSize {
    pub fn height(self) -> f32 {
        match self {
            MinimapSize::Small => 160.0,
            MinimapSize::Medium => 240.0,
            MinimapSize::Large => 360.0,
        }
    }
}

fn default_window_width() -> f32 {
    1280.0
}
fn default_window_height() -> f32 {
    800.0
}
fn default_true() -> bool {
    true
}
fn default_hud_panel_opacity() -> f32 {
    0.65
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            catalog_path: String::new(),
            window_width: default_window_width(),
            window_height: default_window_height(),
            profile: None,
            overrides: BrowserOverrides::default(),
            columns: None,
            show_minimap: true,
            minimap_size: MinimapSize::default(),
            hud_panel_opacity: default_hud_panel_opacity(),
        }
    }
}

impl AppSettings {
    /// Read settings from the first candidate file that exists, falling back
    /// to defaults. Settings are never written back.
    pub fn load() -> Self {
        for path in candidate_paths() {
            if !path.exists() {
                debug!("No settings file at {}", path.display());
                continue;
            }
            match fs::read_to_string(&path) {
                Ok(json) => match serde_json::from_str::<AppSettings>(&json) {
                    Ok(settings) => {
                        info!("Loaded settings from {}", path.display());
                        return settings;
                    }
                    Err(e) => error!("Failed to parse {}: {e}", path.display()),
                },
                Err(e) => error!("Failed to read {}: {e}", path.display()),
            }
        }
        Self::default()
    }

    /// Browser configuration for this machine: the forced or detected profile
    /// with overrides applied. Invalid overrides are dropped.
    pub fn browser_config(&self, capabilities: Capabilities) -> BrowserConfig {
        let profile = self.profile.unwrap_or_else(|| capabilities.detect_profile());
        let base = BrowserConfig::for_profile(profile);
        let mut config = base.clone();
        self.overrides.apply(&mut config);
        match config.validate() {
            Ok(()) => config,
            Err(e) => {
                warn!("Ignoring browser overrides: {e}");
                base
            }
        }
    }
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = vec![crate::app_dir::exe_directory().join(SETTINGS_FILE)];
    if let Some(dir) = crate::app_dir::config_directory() {
        paths.push(dir.join(SETTINGS_FILE));
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capable() -> Capabilities {
        Capabilities {
            logical_cpus: 16,
            screen_width: 1920.0,
            touch: false,
        }
    }

    #[test]
    fn empty_document_gives_defaults() {
        let s: AppSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(s.window_width, 1280.0);
        assert!(s.show_minimap);
        assert_eq!(s.minimap_size, MinimapSize::Medium);
        assert!(s.catalog_path.is_empty());
    }

    #[test]
    fn profile_override_skips_detection() {
        let s: AppSettings = serde_json::from_str(r#"{"profile": "constrained"}"#).unwrap();
        let config = s.browser_config(capable());
        assert_eq!(config, BrowserConfig::for_profile(EnvironmentProfile::Constrained));
    }

    #[test]
    fn overrides_layer_onto_profile() {
        let s: AppSettings =
            serde_json::from_str(r#"{"overrides": {"cache_ceiling": 99, "chunk_size": 7}}"#)
                .unwrap();
        let config = s.browser_config(capable());
        assert_eq!(config.cache_ceiling, 99);
        assert_eq!(config.chunk_size, 7);
        assert_eq!(config.max_concurrent_loads, 8);
    }

    #[test]
    fn invalid_overrides_are_dropped() {
        let s: AppSettings =
            serde_json::from_str(r#"{"overrides": {"chunk_size": 0}}"#).unwrap();
        assert_eq!(s.browser_config(capable()), BrowserConfig::default());
    }
}
