//! Centralized viewer and synchronization options with TOML support.
//!
//! Scene defaults, post-construction tuning, the query-sync policy and toast
//! settings are consolidated here. Options serialize to/from TOML so a
//! deployment can ship its own `vision.toml`.

mod sync;
mod viewer;

use std::path::Path;

use serde::{Deserialize, Serialize};
pub use sync::{NotificationOptions, SyncOptions};
pub use viewer::{LibraryConfig, LogLevel, ViewerDefaults, ViewerTuning};

use crate::error::VisionError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[viewer]`) work correctly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Options {
    /// Scene defaults the viewer is built with and reset to.
    pub viewer: ViewerDefaults,
    /// Settings applied right after construction.
    pub tuning: ViewerTuning,
    /// Query synchronization policy.
    pub sync: SyncOptions,
    /// Toast settings.
    pub notifications: NotificationOptions,
}

impl Options {
    /// Parse options from TOML text. Missing fields use defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, VisionError> {
        toml::from_str(content)
            .map_err(|e| VisionError::OptionsParse(e.to_string()))
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, VisionError> {
        let content = std::fs::read_to_string(path).map_err(VisionError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), VisionError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| VisionError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(VisionError::Io)?;
        }
        std::fs::write(path, content).map_err(VisionError::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::{DragMode, VoxelCoordinate};

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed = Options::from_toml_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r#"
[viewer]
back_color = [0.0, 0.0, 0.0, 1.0]
log_level = "warn"

[sync]
default_drag_mode = "contrast"
"#;
        let opts = Options::from_toml_str(toml_str).unwrap();
        assert_eq!(opts.viewer.back_color, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(opts.viewer.log_level, LogLevel::Warn);
        assert!(opts.viewer.show_legend);
        assert_eq!(opts.sync.default_drag_mode, DragMode::Contrast);
        assert_eq!(opts.sync.initial_coordinate, VoxelCoordinate::new(1, 1, 1));
        assert_eq!(opts.tuning.drag_mode, DragMode::Pan);
        assert_eq!(opts.notifications.toast_duration_ms, 10_000);
    }

    #[test]
    fn tuning_defaults_to_nearest_neighbour_sampling() {
        assert!(ViewerTuning::default().nearest_interpolation);
        let opts =
            Options::from_toml_str("[tuning]\nnearest_interpolation = false")
                .unwrap();
        assert!(!opts.tuning.nearest_interpolation);
        assert!(opts.tuning.multiplanar_force_render);
    }

    #[test]
    fn malformed_toml_is_an_options_error() {
        let err = Options::from_toml_str("[viewer\nshow_legend = 1").unwrap_err();
        assert!(matches!(err, VisionError::OptionsParse(_)));
    }

    #[test]
    fn library_config_uses_library_names() {
        let json: serde_json::Value =
            serde_json::from_str(&ViewerDefaults::default().library_config_json())
                .unwrap();
        assert_eq!(json["show3Dcrosshair"], true);
        assert_eq!(json["showLegend"], true);
        assert_eq!(json["showMeasureUnits"], true);
        assert_eq!(json["logLevel"], "info");
        assert_eq!(json["backColor"].as_array().map(Vec::len), Some(4));
    }

    #[test]
    fn shipped_web_options_are_the_defaults() {
        let shipped = Options::from_toml_str(include_str!(
            "../../crates/vision-ui/vision.toml"
        ))
        .unwrap();
        assert_eq!(shipped, Options::default());
    }

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir().join("niivue-vision-options-test");
        let path = dir.join("vision.toml");
        let mut opts = Options::default();
        opts.tuning.crosshair_gap = 4.0;
        opts.save(&path).unwrap();
        assert_eq!(Options::load(&path).unwrap(), opts);
        let _ = std::fs::remove_dir_all(dir);
    }
}
