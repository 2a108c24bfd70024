//! Synchronization controller.
//!
//! The controller is the only writer of the crosshair coordinate, the
//! intensity sample, the load state and the one-time positioning flag.
//! Every transition is a plain method that updates that state and returns
//! the [`SyncEffect`]s the session must carry out; the controller never
//! touches the viewer or the page itself.
//!
//! Load lifecycle:
//!
//! ```text
//! NotStarted ──begin_load──▶ Loading ──complete_load(Ok)──▶ Loaded ──▶ one-time positioning
//!     ▲                       │  ▲  │
//!     └─────cancel_load───────┘  │  └──complete_load(Err)──▶ Failed
//!                                └──────────begin_load──────────┘
//! ```
//!
//! Every `begin_load` issues a fresh [`LoadTicket`]; `complete_load` only
//! accepts the outcome of the current one.

/// Effect vocabulary and shell snapshot.
pub mod effect;

pub use effect::{ShellSnapshot, SyncEffect};

use crate::error::VisionError;
use crate::options::SyncOptions;
use crate::query::QueryParams;
use crate::viewer::LocationChange;
use crate::volume::{
    Axis, DragMode, IntensitySample, LoadState, LoadTicket, VolumeSource,
    VoxelCoordinate,
};

/// State machine over the load lifecycle and crosshair position.
#[derive(Debug, Clone)]
pub struct SyncController {
    params: QueryParams,
    options: SyncOptions,
    load_state: LoadState,
    ticket: LoadTicket,
    synced: bool,
    coordinate: VoxelCoordinate,
    sample: Option<IntensitySample>,
    drag_mode: DragMode,
    image: Option<VolumeSource>,
}

impl SyncController {
    /// Controller over the startup query snapshot `params`.
    #[must_use]
    pub fn new(params: QueryParams, options: SyncOptions) -> Self {
        Self {
            coordinate: options.initial_coordinate,
            params,
            options,
            load_state: LoadState::NotStarted,
            ticket: LoadTicket::default(),
            synced: false,
            sample: None,
            drag_mode: DragMode::None,
            image: None,
        }
    }

    // ── Load lifecycle ───────────────────────────────────────────────────

    /// Start the payload load (or retry it after a failure).
    ///
    /// Returns the source to fetch, or `None` when there is no payload or
    /// a load is in flight or already done. Records the image identity and
    /// issues a new [`Self::load_ticket`].
    pub fn begin_load(&mut self) -> Option<VolumeSource> {
        if !self.load_state.can_begin() {
            log::debug!("load not started from state {:?}", self.load_state);
            return None;
        }
        let Some(url) = self.params.payload() else {
            log::info!("no payload parameter, nothing to load");
            return None;
        };
        let source = VolumeSource::from_url(url);
        self.load_state = LoadState::Loading;
        self.ticket = self.ticket.next();
        self.image = Some(source.clone());
        Some(source)
    }

    /// Abandon the in-flight load, back to `NotStarted`. Its outcome will
    /// be ignored. Returns `false` when no load was in flight.
    pub fn cancel_load(&mut self) -> bool {
        if self.load_state != LoadState::Loading {
            return false;
        }
        log::info!("payload load abandoned");
        self.load_state = LoadState::NotStarted;
        true
    }

    /// Whether `ticket` names the load currently in flight.
    #[must_use]
    pub fn is_current_load(&self, ticket: LoadTicket) -> bool {
        self.load_state == LoadState::Loading && ticket == self.ticket
    }

    /// Record the outcome of the load started by [`Self::begin_load`].
    ///
    /// Success moves to `Loaded` and immediately runs the one-time
    /// positioning; failure moves to `Failed`. Outcomes for any load other
    /// than the one in flight are stale and ignored.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: &Result<(), VisionError>,
    ) -> Vec<SyncEffect> {
        if !self.is_current_load(ticket) {
            log::warn!(
                "stale load outcome {ticket:?} ignored in state {:?}",
                self.load_state
            );
            return Vec::new();
        }
        match result {
            Ok(()) => {
                self.load_state = LoadState::Loaded;
                log::info!("payload loaded");
                self.apply_initial_position()
            }
            Err(e) => {
                self.load_state = LoadState::Failed;
                log::error!("payload failed to load: {e}");
                Vec::new()
            }
        }
    }

    /// One-time positioning from the query parameters.
    ///
    /// Runs only once the payload is loaded and only once per controller.
    /// Each strictly positive requested axis overrides the current one;
    /// the drag mode is switched to the configured default either way.
    pub fn apply_initial_position(&mut self) -> Vec<SyncEffect> {
        if self.load_state != LoadState::Loaded || self.synced {
            return Vec::new();
        }
        self.synced = true;

        let mut target = self.coordinate;
        let mut requested = false;
        for axis in Axis::ALL {
            if let Some(value) = self.params.requested(axis) {
                let _ = target.set(axis, value);
                requested = true;
            }
        }
        log::info!(
            "initial positioning: requested={requested} target={target}"
        );

        let mut effects = Vec::with_capacity(3);
        if requested {
            effects.push(SyncEffect::MoveCrosshair(target));
        }
        self.drag_mode = self.options.default_drag_mode;
        effects.push(SyncEffect::SetDragMode(self.drag_mode));
        if target != self.coordinate {
            self.coordinate = target;
            effects.push(SyncEffect::MirrorUrl(target));
        }
        effects
    }

    // ── User intents ─────────────────────────────────────────────────────

    /// User edit of a single axis. Editing to the current value is a no-op.
    pub fn set_axis(&mut self, axis: Axis, value: i32) -> Vec<SyncEffect> {
        let mut target = self.coordinate;
        if !target.set(axis, value) {
            return Vec::new();
        }
        self.set_coordinate(target)
    }

    /// User edit of the whole coordinate.
    pub fn set_coordinate(&mut self, target: VoxelCoordinate) -> Vec<SyncEffect> {
        if target == self.coordinate {
            return Vec::new();
        }
        self.coordinate = target;
        vec![SyncEffect::MoveCrosshair(target), SyncEffect::MirrorUrl(target)]
    }

    /// User choice of drag mode.
    pub fn set_drag_mode(&mut self, mode: DragMode) -> Vec<SyncEffect> {
        self.drag_mode = mode;
        vec![SyncEffect::SetDragMode(mode)]
    }

    // ── Viewer events ────────────────────────────────────────────────────

    /// Apply a parsed location report.
    ///
    /// Fields missing from `change` leave the corresponding state alone.
    /// The viewer already shows this position, so the only effect is a URL
    /// mirror, and only when the coordinate actually moved.
    pub fn on_location_change(&mut self, change: LocationChange) -> Vec<SyncEffect> {
        if change.intensity.is_some() || change.time_index.is_some() {
            let mut sample = self.sample.unwrap_or_default();
            if let Some(value) = change.intensity {
                sample.value = value;
            }
            if let Some(time_index) = change.time_index {
                sample.time_index = time_index;
            }
            self.sample = Some(sample);
        }
        match change.voxel {
            Some(voxel) if voxel != self.coordinate => {
                self.coordinate = voxel;
                vec![SyncEffect::MirrorUrl(voxel)]
            }
            _ => Vec::new(),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────

    /// Current load state.
    #[must_use]
    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    /// Ticket of the most recent load attempt.
    #[must_use]
    pub fn load_ticket(&self) -> LoadTicket {
        self.ticket
    }

    /// Whether the one-time positioning has run.
    #[must_use]
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    /// Current crosshair voxel.
    #[must_use]
    pub fn coordinate(&self) -> VoxelCoordinate {
        self.coordinate
    }

    /// Last reported intensity sample.
    #[must_use]
    pub fn sample(&self) -> Option<IntensitySample> {
        self.sample
    }

    /// Active drag mode.
    #[must_use]
    pub fn drag_mode(&self) -> DragMode {
        self.drag_mode
    }

    /// Payload being (or last) loaded.
    #[must_use]
    pub fn image(&self) -> Option<&VolumeSource> {
        self.image.as_ref()
    }

    /// The startup query snapshot.
    #[must_use]
    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    /// Everything the shell renders.
    #[must_use]
    pub fn snapshot(&self) -> ShellSnapshot {
        ShellSnapshot {
            coordinate: self.coordinate,
            sample: self.sample,
            image_name: self.image.as_ref().map(|s| s.name.clone()),
            image_path: self.image.as_ref().map(|s| s.url.clone()),
            is_loading: self.load_state == LoadState::Loading,
            is_loaded: self.load_state == LoadState::Loaded,
            load_failed: self.load_state == LoadState::Failed,
            drag_mode: self.drag_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::mirror_coordinates;

    const BASE: &str = "https://viewer.test/";

    fn controller(search: &str) -> SyncController {
        SyncController::new(QueryParams::parse(search), SyncOptions::default())
    }

    fn loaded(search: &str) -> (SyncController, Vec<SyncEffect>) {
        let mut c = controller(search);
        assert!(c.begin_load().is_some());
        let effects = c.complete_load(c.load_ticket(), &Ok(()));
        (c, effects)
    }

    #[test]
    fn begin_load_records_unquoted_image() {
        let mut c = controller("?payload='\"https://example.com/data/a.nii\"'");
        let source = c.begin_load().unwrap();
        assert_eq!(source.url, "https://example.com/data/a.nii");
        assert_eq!(source.name, "a.nii");
        assert_eq!(c.load_state(), LoadState::Loading);
        let snap = c.snapshot();
        assert!(snap.is_loading);
        assert_eq!(snap.image_name.as_deref(), Some("a.nii"));
        assert_eq!(
            snap.image_path.as_deref(),
            Some("https://example.com/data/a.nii")
        );
    }

    #[test]
    fn no_payload_means_no_load() {
        let mut c = controller("?x=4");
        assert!(c.begin_load().is_none());
        assert_eq!(c.load_state(), LoadState::NotStarted);
        assert!(controller("?payload=").begin_load().is_none());
    }

    #[test]
    fn second_begin_while_loading_is_rejected() {
        let mut c = controller("?payload=a.nii");
        assert!(c.begin_load().is_some());
        assert!(c.begin_load().is_none());
        assert_eq!(c.load_state(), LoadState::Loading);
    }

    #[test]
    fn missing_axes_are_left_alone() {
        let (c, effects) = loaded("?payload=a.nii&y=9");
        assert_eq!(c.coordinate(), VoxelCoordinate::new(1, 9, 1));
        assert_eq!(
            effects,
            [
                SyncEffect::MoveCrosshair(VoxelCoordinate::new(1, 9, 1)),
                SyncEffect::SetDragMode(DragMode::Measurement),
                SyncEffect::MirrorUrl(VoxelCoordinate::new(1, 9, 1)),
            ]
        );

        let (c, effects) = loaded("?payload=a.nii");
        assert_eq!(c.coordinate(), SyncOptions::default().initial_coordinate);
        assert_eq!(effects, [SyncEffect::SetDragMode(DragMode::Measurement)]);
    }

    #[test]
    fn lowercase_wins_and_applies_once() {
        let (mut c, effects) = loaded("?payload=a.nii&x=5&X=7");
        assert_eq!(c.coordinate().x, 5);
        assert!(effects.contains(&SyncEffect::MoveCrosshair(
            VoxelCoordinate::new(5, 1, 1)
        )));
        assert!(c.is_synced());

        let _ = c.set_axis(Axis::X, 20);
        assert!(c.apply_initial_position().is_empty());
        assert_eq!(c.coordinate().x, 20);
    }

    #[test]
    fn empty_lowercase_falls_through_to_uppercase() {
        let (c, _) = loaded("?payload=a.nii&x=&X=7");
        assert_eq!(c.coordinate().x, 7);
    }

    #[test]
    fn non_positive_and_garbage_axes_are_skipped() {
        let (c, effects) = loaded("?payload=a.nii&x=0&y=-4&z=abc");
        assert_eq!(c.coordinate(), VoxelCoordinate::new(1, 1, 1));
        assert_eq!(effects, [SyncEffect::SetDragMode(DragMode::Measurement)]);
    }

    #[test]
    fn positioning_fires_exactly_once() {
        let (mut c, first) = loaded("?payload=a.nii&z=3");
        assert!(!first.is_empty());
        assert!(c.complete_load(c.load_ticket(), &Ok(())).is_empty());
        assert!(c.apply_initial_position().is_empty());
        assert_eq!(c.load_state(), LoadState::Loaded);
    }

    #[test]
    fn positioning_waits_for_load() {
        let mut c = controller("?payload=a.nii&x=5");
        assert!(c.apply_initial_position().is_empty());
        let _ = c.begin_load();
        assert!(c.apply_initial_position().is_empty());
        assert!(!c.is_synced());
        assert_eq!(c.drag_mode(), DragMode::None);
    }

    #[test]
    fn failure_allows_retry_and_blocks_positioning() {
        let mut c = controller("?payload=a.nii&x=5");
        let _ = c.begin_load();
        let effects = c.complete_load(
            c.load_ticket(),
            &Err(VisionError::VolumeLoad("404".to_owned())),
        );
        assert!(effects.is_empty());
        assert_eq!(c.load_state(), LoadState::Failed);
        assert!(c.snapshot().load_failed);
        assert!(c.apply_initial_position().is_empty());

        assert!(c.begin_load().is_some());
        let effects = c.complete_load(c.load_ticket(), &Ok(()));
        assert_eq!(c.coordinate().x, 5);
        assert_eq!(effects.len(), 3);
    }

    #[test]
    fn cancelled_load_ignores_its_outcome_and_can_restart() {
        let mut c = controller("?payload=a.nii&x=5");
        let _ = c.begin_load();
        let abandoned = c.load_ticket();
        assert!(c.cancel_load());
        assert!(!c.cancel_load());
        assert_eq!(c.load_state(), LoadState::NotStarted);
        assert!(c.complete_load(abandoned, &Ok(())).is_empty());
        assert_eq!(c.load_state(), LoadState::NotStarted);

        assert!(c.begin_load().is_some());
        assert_ne!(c.load_ticket(), abandoned);
        assert!(c.complete_load(abandoned, &Ok(())).is_empty());
        assert_eq!(c.load_state(), LoadState::Loading);
        assert!(!c.is_synced());

        let effects = c.complete_load(c.load_ticket(), &Ok(()));
        assert_eq!(c.load_state(), LoadState::Loaded);
        assert_eq!(c.coordinate().x, 5);
        assert_eq!(effects.len(), 3);
    }

    #[test]
    fn user_edit_moves_and_mirrors() {
        let mut c = controller("");
        let effects = c.set_axis(Axis::Z, 40);
        let target = VoxelCoordinate::new(1, 1, 40);
        assert_eq!(
            effects,
            [SyncEffect::MoveCrosshair(target), SyncEffect::MirrorUrl(target)]
        );
        assert!(c.set_axis(Axis::Z, 40).is_empty());
    }

    #[test]
    fn viewer_change_mirrors_without_moving() {
        let mut c = controller("");
        let change = LocationChange {
            voxel: Some(VoxelCoordinate::new(10, 20, 30)),
            time_index: Some(0),
            intensity: Some(572.0),
        };
        assert_eq!(
            c.on_location_change(change),
            [SyncEffect::MirrorUrl(VoxelCoordinate::new(10, 20, 30))]
        );
        assert_eq!(
            c.sample(),
            Some(IntensitySample {
                value: 572.0,
                time_index: 0
            })
        );
        assert!(c.on_location_change(change).is_empty());
    }

    #[test]
    fn partial_change_keeps_other_fields() {
        let mut c = controller("");
        let _ = c.on_location_change(LocationChange {
            voxel: Some(VoxelCoordinate::new(2, 2, 2)),
            time_index: Some(3),
            intensity: Some(1.5),
        });
        let _ = c.on_location_change(LocationChange {
            voxel: None,
            time_index: None,
            intensity: Some(9.0),
        });
        assert_eq!(c.coordinate(), VoxelCoordinate::new(2, 2, 2));
        assert_eq!(
            c.sample(),
            Some(IntensitySample {
                value: 9.0,
                time_index: 3
            })
        );
    }

    #[test]
    fn mirrored_url_reloads_to_same_position() {
        let mut c = controller("");
        let _ = c.set_coordinate(VoxelCoordinate::new(12, 34, 56));
        let href = mirror_coordinates(
            &format!("{BASE}?payload=a.nii&x=3"),
            c.coordinate(),
        );
        let params = QueryParams::from_href(&href);
        assert_eq!(params.get("X"), Some("12"));
        assert_eq!(params.get("Y"), Some("34"));
        assert_eq!(params.get("Z"), Some("56"));

        let mut reloaded = SyncController::new(params, SyncOptions::default());
        let _ = reloaded.begin_load();
        let _ = reloaded.complete_load(reloaded.load_ticket(), &Ok(()));
        assert_eq!(reloaded.coordinate(), VoxelCoordinate::new(12, 34, 56));
    }
}
