use serde::{Deserialize, Serialize};

use crate::volume::DragMode;

/// Severity threshold handed to the rendering library (and used for the
/// page's own console logger).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Everything, including per-frame chatter.
    Debug,
    /// Lifecycle events.
    #[default]
    Info,
    /// Recoverable problems.
    Warn,
    /// Failures only.
    Error,
    /// Nothing.
    Silent,
}

impl LogLevel {
    /// Name the rendering library expects.
    #[must_use]
    pub fn library_name(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Silent => "silent",
        }
    }

    /// Equivalent filter for the `log` facade.
    #[must_use]
    pub fn level_filter(self) -> log::LevelFilter {
        match self {
            Self::Debug => log::LevelFilter::Debug,
            Self::Info => log::LevelFilter::Info,
            Self::Warn => log::LevelFilter::Warn,
            Self::Error => log::LevelFilter::Error,
            Self::Silent => log::LevelFilter::Off,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Scene defaults the viewer is constructed with and reset back to.
pub struct ViewerDefaults {
    /// Draw the crosshair in the 3D render.
    pub show_3d_crosshair: bool,
    /// Draw the colorbar legend.
    pub show_legend: bool,
    /// Label measurements with physical units.
    pub show_measure_units: bool,
    /// Canvas clear color (RGBA, 0..1).
    pub back_color: [f32; 4],
    /// Library log verbosity.
    pub log_level: LogLevel,
}

impl Default for ViewerDefaults {
    fn default() -> Self {
        Self {
            show_3d_crosshair: true,
            show_legend: true,
            show_measure_units: true,
            back_color: [0.2, 0.2, 0.2, 1.0],
            log_level: LogLevel::Info,
        }
    }
}

/// The defaults as the rendering library names them.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LibraryConfig {
    /// `show3Dcrosshair`
    #[serde(rename = "show3Dcrosshair")]
    pub show_3d_crosshair: bool,
    /// `showLegend`
    pub show_legend: bool,
    /// `showMeasureUnits`
    pub show_measure_units: bool,
    /// `backColor`
    pub back_color: [f32; 4],
    /// `logLevel`
    pub log_level: &'static str,
}

impl ViewerDefaults {
    /// Translate to the rendering library's option names.
    #[must_use]
    pub fn library_config(&self) -> LibraryConfig {
        LibraryConfig {
            show_3d_crosshair: self.show_3d_crosshair,
            show_legend: self.show_legend,
            show_measure_units: self.show_measure_units,
            back_color: self.back_color,
            log_level: self.log_level.library_name(),
        }
    }

    /// JSON text of [`Self::library_config`], ready to cross into JS.
    #[must_use]
    pub fn library_config_json(&self) -> String {
        serde_json::to_string(&self.library_config()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Options applied once, right after the viewer is constructed.
pub struct ViewerTuning {
    /// Drag mode in effect until the payload has loaded.
    pub drag_mode: DragMode,
    /// Render every pane of the multiplanar layout even when hidden.
    pub multiplanar_force_render: bool,
    /// Keep 3D and 2D zoom levels in step.
    pub yoke_3d_to_2d_zoom: bool,
    /// Gap around the crosshair center, in pixels.
    pub crosshair_gap: f32,
    /// Nearest-neighbour sampling instead of smooth (trilinear)
    /// interpolation. Handed to the library's `setInterpolation` as is.
    pub nearest_interpolation: bool,
}

impl Default for ViewerTuning {
    fn default() -> Self {
        Self {
            drag_mode: DragMode::Pan,
            multiplanar_force_render: true,
            yoke_3d_to_2d_zoom: true,
            crosshair_gap: 10.0,
            nearest_interpolation: true,
        }
    }
}
