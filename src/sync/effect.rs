//! What the controller asks the outside world to do, and what it shows.

use crate::volume::{DragMode, IntensitySample, VoxelCoordinate};

/// Side effect requested by a [`SyncController`](super::SyncController)
/// transition. The session executes them in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncEffect {
    /// Place the viewer crosshair (with the forced-change double move).
    MoveCrosshair(VoxelCoordinate),
    /// Switch the viewer's drag mode.
    SetDragMode(DragMode),
    /// Rewrite the address bar's `X`, `Y`, `Z` parameters.
    MirrorUrl(VoxelCoordinate),
}

/// Read-only view of the synchronized state for the presentation shell.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShellSnapshot {
    /// Current crosshair voxel.
    pub coordinate: VoxelCoordinate,
    /// Intensity under the crosshair, once the viewer reported one.
    pub sample: Option<IntensitySample>,
    /// Display name of the payload (last path segment).
    pub image_name: Option<String>,
    /// Full payload URL.
    pub image_path: Option<String>,
    /// A load is in flight.
    pub is_loading: bool,
    /// The payload finished loading.
    pub is_loaded: bool,
    /// The last load attempt failed and may be retried.
    pub load_failed: bool,
    /// Active drag mode.
    pub drag_mode: DragMode,
}
