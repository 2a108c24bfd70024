//! Core data model shared by the controller, the viewer adapter and the
//! presentation shell.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ── Coordinates ──────────────────────────────────────────────────────────

/// One of the three voxel-space axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Left/right.
    X,
    /// Posterior/anterior.
    Y,
    /// Inferior/superior.
    Z,
}

impl Axis {
    /// All axes in x, y, z order.
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Query parameter name consulted first when reading a requested
    /// position.
    #[must_use]
    pub fn lower_key(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        }
    }

    /// Query parameter name the current position is mirrored to.
    #[must_use]
    pub fn upper_key(self) -> &'static str {
        match self {
            Self::X => "X",
            Self::Y => "Y",
            Self::Z => "Z",
        }
    }
}

/// Active crosshair position in volume voxel space.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub struct VoxelCoordinate {
    /// Column index.
    pub x: i32,
    /// Row index.
    pub y: i32,
    /// Slice index.
    pub z: i32,
}

impl VoxelCoordinate {
    /// Build a coordinate from its three components.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Component along `axis`.
    #[must_use]
    pub fn get(self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Replace the component along `axis`. Returns `true` if the value
    /// changed.
    pub fn set(&mut self, axis: Axis, value: i32) -> bool {
        let slot = match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        };
        let changed = *slot != value;
        *slot = value;
        changed
    }
}

impl fmt::Display for VoxelCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Intensity under the crosshair, as last reported by the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IntensitySample {
    /// Voxel value.
    pub value: f64,
    /// Frame index for 4D volumes (0 for static volumes).
    pub time_index: i64,
}

// ── Lifecycle ────────────────────────────────────────────────────────────

/// Load lifecycle of the payload volume.
///
/// `NotStarted → Loading → Loaded`, with `Loading → Failed` on rejection,
/// `Failed → Loading` when the load is retried and `Loading → NotStarted`
/// when the viewer goes away mid-load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// No load has been requested.
    #[default]
    NotStarted,
    /// A load is in flight.
    Loading,
    /// The payload finished loading.
    Loaded,
    /// The last load attempt was rejected.
    Failed,
}

impl LoadState {
    /// Whether a new load attempt may start from this state.
    #[must_use]
    pub fn can_begin(self) -> bool {
        matches!(self, Self::NotStarted | Self::Failed)
    }
}

/// Identifies one load attempt. Outcomes carrying an older ticket than the
/// current attempt are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadTicket(u64);

impl LoadTicket {
    /// Ticket of the attempt after this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

// ── Drag mode ────────────────────────────────────────────────────────────

/// How the viewer interprets mouse-drag gestures.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DragMode {
    /// Dragging does nothing beyond moving the crosshair.
    #[default]
    None,
    /// Dragging adjusts contrast and brightness.
    Contrast,
    /// Dragging measures a distance.
    Measurement,
    /// Dragging pans, the wheel zooms.
    Pan,
    /// Dragging moves the 3D clip plane.
    #[serde(rename = "slicer3d")]
    Slicer3D,
}

impl DragMode {
    /// Every mode, in menu order.
    pub const ALL: [Self; 5] = [
        Self::None,
        Self::Contrast,
        Self::Measurement,
        Self::Pan,
        Self::Slicer3D,
    ];

    /// Key of this mode in the rendering library's drag mode table.
    #[must_use]
    pub fn library_key(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Contrast => "contrast",
            Self::Measurement => "measurement",
            Self::Pan => "pan",
            Self::Slicer3D => "slicer3D",
        }
    }

    /// Human-readable menu label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Contrast => "Contrast",
            Self::Measurement => "Measurement",
            Self::Pan => "Pan / Zoom",
            Self::Slicer3D => "Slicer3D",
        }
    }
}

/// Error returned when a string names no known [`DragMode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDragMode(pub String);

impl fmt::Display for UnknownDragMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown drag mode: {}", self.0)
    }
}

impl std::error::Error for UnknownDragMode {}

impl FromStr for DragMode {
    type Err = UnknownDragMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.library_key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownDragMode(s.to_owned()))
    }
}

// ── Payload ──────────────────────────────────────────────────────────────

/// A volume to hand to the viewer's loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeSource {
    /// Full URL the volume is fetched from.
    pub url: String,
    /// Display name (final path segment of the URL).
    pub name: String,
}

impl VolumeSource {
    /// Derive the display name from the URL's final path segment. An URL
    /// ending in `/` falls back to the whole URL as its name.
    #[must_use]
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        let name = url
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .unwrap_or(&url)
            .to_owned();
        Self { url, name }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_reports_change() {
        let mut c = VoxelCoordinate::new(1, 2, 3);
        assert!(!c.set(Axis::Y, 2));
        assert!(c.set(Axis::Z, 9));
        assert_eq!(c, VoxelCoordinate::new(1, 2, 9));
        assert_eq!(c.get(Axis::Z), 9);
    }

    #[test]
    fn load_state_retry_only_from_failed() {
        assert!(LoadState::NotStarted.can_begin());
        assert!(LoadState::Failed.can_begin());
        assert!(!LoadState::Loading.can_begin());
        assert!(!LoadState::Loaded.can_begin());
    }

    #[test]
    fn drag_mode_parses_library_keys_case_insensitively() {
        assert_eq!("slicer3d".parse::<DragMode>(), Ok(DragMode::Slicer3D));
        assert_eq!("slicer3D".parse::<DragMode>(), Ok(DragMode::Slicer3D));
        assert_eq!(" Pan ".parse::<DragMode>(), Ok(DragMode::Pan));
        assert!("zoom".parse::<DragMode>().is_err());
    }

    #[test]
    fn volume_name_is_final_segment() {
        let src = VolumeSource::from_url("https://example.com/data/a.nii.gz");
        assert_eq!(src.name, "a.nii.gz");
        assert_eq!(src.url, "https://example.com/data/a.nii.gz");

        let dir = VolumeSource::from_url("https://example.com/data/");
        assert_eq!(dir.name, "https://example.com/data/");
    }
}
