use serde::{Deserialize, Serialize};

use crate::volume::{DragMode, VoxelCoordinate};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
/// Policy for the query-string driven synchronization.
pub struct SyncOptions {
    /// Drag mode switched to once the payload has loaded.
    pub default_drag_mode: DragMode,
    /// Crosshair position before the viewer reports one.
    pub initial_coordinate: VoxelCoordinate,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            default_drag_mode: DragMode::Measurement,
            initial_coordinate: VoxelCoordinate::new(1, 1, 1),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
/// Toast presentation settings.
pub struct NotificationOptions {
    /// How long custom toasts (metadata, about) stay up.
    pub toast_duration_ms: u32,
}

impl Default for NotificationOptions {
    fn default() -> Self {
        Self {
            toast_duration_ms: 10_000,
        }
    }
}
