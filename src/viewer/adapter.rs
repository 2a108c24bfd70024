//! Ownership of the viewer instance.
//!
//! The adapter constructs the viewer once per rendering surface, keeps the
//! receiving end of its location stream, and turns application requests
//! into library calls. Every command is a no-op while no viewer is attached
//! (before construction or after teardown).

use std::rc::Rc;
use std::sync::mpsc;

use super::{
    Descriptives, LoadFuture, LocationChange, LocationReport, LocationSink,
    VolumeViewer,
};
use crate::error::VisionError;
use crate::options::{ViewerDefaults, ViewerTuning};
use crate::volume::{DragMode, VolumeSource, VoxelCoordinate};

/// Voxel index far outside any volume, used to force a position change
/// before every crosshair move.
pub const CROSSHAIR_SENTINEL: i32 = -999_999;

/// A constructed viewer plus the receiving half of its location stream.
struct Attached<V> {
    viewer: V,
    events: mpsc::Receiver<LocationReport>,
}

/// Owns a [`VolumeViewer`] for the lifetime of its rendering surface.
pub struct ViewerAdapter<V> {
    slot: Option<Attached<V>>,
    defaults: ViewerDefaults,
    load_in_flight: bool,
}

impl<V: VolumeViewer> ViewerAdapter<V> {
    /// Create an adapter with no viewer attached yet. `defaults` are used
    /// for construction and for every later scene reset.
    #[must_use]
    pub fn new(defaults: ViewerDefaults) -> Self {
        Self {
            slot: None,
            defaults,
            load_in_flight: false,
        }
    }

    /// Build and tune the viewer.
    ///
    /// `build` receives the scene defaults and the [`LocationSink`] the
    /// library callback must report into; `wake` is invoked after every
    /// queued report. Returns `Ok(false)` without calling `build` when a
    /// viewer is already attached.
    pub fn initialize<F>(
        &mut self,
        tuning: &ViewerTuning,
        wake: Option<Rc<dyn Fn()>>,
        build: F,
    ) -> Result<bool, VisionError>
    where
        F: FnOnce(&ViewerDefaults, LocationSink) -> Result<V, VisionError>,
    {
        if self.slot.is_some() {
            log::debug!("viewer already attached, skipping construction");
            return Ok(false);
        }
        let (tx, rx) = mpsc::channel();
        let mut viewer = build(&self.defaults, LocationSink::new(tx, wake))?;
        viewer.apply_tuning(tuning);
        log::info!("viewer attached (drag mode {:?})", tuning.drag_mode);
        self.slot = Some(Attached { viewer, events: rx });
        Ok(true)
    }

    /// Whether a viewer is currently attached.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.slot.is_some()
    }

    /// Release the viewer. Reports the library sends afterwards are
    /// dropped.
    pub fn teardown(&mut self) {
        if self.slot.take().is_some() {
            log::info!("viewer released");
        }
        self.load_in_flight = false;
    }

    /// Read-only access to the attached viewer.
    #[must_use]
    pub fn viewer(&self) -> Option<&V> {
        self.slot.as_ref().map(|attached| &attached.viewer)
    }

    /// Mutable access to the attached viewer.
    pub fn viewer_mut(&mut self) -> Option<&mut V> {
        self.slot.as_mut().map(|attached| &mut attached.viewer)
    }

    /// Defaults the viewer was built with.
    #[must_use]
    pub fn defaults(&self) -> &ViewerDefaults {
        &self.defaults
    }

    /// Whether a load is currently in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.load_in_flight
    }

    /// Start loading `source`. Returns `None` (and does nothing) while
    /// another load is in flight or when no viewer is attached. Call
    /// [`Self::settle_load`] once the future resolves.
    pub fn load_volume(&mut self, source: &VolumeSource) -> Option<LoadFuture> {
        if self.load_in_flight {
            log::warn!("load already in flight, ignoring {}", source.url);
            return None;
        }
        let Some(attached) = self.slot.as_mut() else {
            log::debug!("no viewer attached, cannot load {}", source.url);
            return None;
        };
        self.load_in_flight = true;
        log::info!("loading payload {} from {}", source.name, source.url);
        Some(attached.viewer.load_volumes(std::slice::from_ref(source)))
    }

    /// Mark the in-flight load as finished, successfully or not.
    pub fn settle_load(&mut self) {
        self.load_in_flight = false;
    }

    /// Move the crosshair to `target`, always producing a location change.
    ///
    /// The library stays silent when asked to move to the current position,
    /// so the crosshair first goes to [`CROSSHAIR_SENTINEL`] on every axis
    /// and then to the target. Both moves are real changes from the
    /// library's point of view.
    pub fn move_crosshair(&mut self, target: VoxelCoordinate) {
        let Some(attached) = self.slot.as_mut() else {
            log::debug!("no viewer attached, crosshair move to {target} skipped");
            return;
        };
        attached.viewer.move_crosshair_in_vox(
            CROSSHAIR_SENTINEL,
            CROSSHAIR_SENTINEL,
            CROSSHAIR_SENTINEL,
        );
        attached
            .viewer
            .move_crosshair_in_vox(target.x, target.y, target.z);
    }

    /// Switch the drag gesture interpretation. The library reports nothing
    /// back.
    pub fn set_drag_mode(&mut self, mode: DragMode) {
        if let Some(attached) = self.slot.as_mut() {
            attached.viewer.set_drag_mode(mode);
        }
    }

    /// Reapply the stored defaults, crosshair included, and refocus the
    /// surface. Returns `false` when no viewer is attached.
    pub fn reset_scene(&mut self) -> bool {
        let Some(attached) = self.slot.as_mut() else {
            return false;
        };
        log::info!("resetting scene with {:?}", self.defaults);
        attached.viewer.set_defaults(&self.defaults, true);
        attached.viewer.focus();
        true
    }

    /// Summary statistics of the loaded volume, if a viewer is attached.
    #[must_use]
    pub fn query_descriptives(&self) -> Option<Descriptives> {
        self.viewer().map(VolumeViewer::descriptives)
    }

    /// Give keyboard focus to the rendering surface.
    pub fn focus(&self) {
        if let Some(viewer) = self.viewer() {
            viewer.focus();
        }
    }

    /// Drain and parse every queued location report, oldest first.
    #[must_use]
    pub fn drain_location_changes(&self) -> Vec<LocationChange> {
        let Some(attached) = self.slot.as_ref() else {
            return Vec::new();
        };
        let mut changes = Vec::new();
        while let Ok(report) = attached.events.try_recv() {
            let change = report.parse();
            if change.is_partial() {
                log::warn!("malformed location report: {report:?}");
            }
            changes.push(change);
        }
        changes
    }
}
