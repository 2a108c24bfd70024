//! Composition root.
//!
//! A [`Session`] owns the controller, the viewer adapter, the notifier and
//! the page location, and is the single place where controller effects are
//! carried out. The shell holds one session for the lifetime of the page
//! and forwards every user intent to it.

use std::rc::Rc;
use std::time::Duration;

use crate::error::VisionError;
use crate::notify::{
    Notifier, PromiseMessages, PromiseOutcome, Toast, RESET_MESSAGE,
};
use crate::options::{Options, ViewerDefaults};
use crate::query::{mirror_coordinates, QueryParams};
use crate::sync::{ShellSnapshot, SyncController, SyncEffect};
use crate::viewer::{LoadFuture, LocationSink, ViewerAdapter, VolumeViewer};
use crate::volume::{Axis, DragMode, LoadState, LoadTicket, VoxelCoordinate};

/// Read and replace the page address without navigating.
pub trait PageLocation {
    /// Full current URL.
    fn href(&self) -> String;

    /// Replace the current history entry's URL.
    fn replace(&self, url: &str);
}

/// A load started by [`Session::start_load`]. Await `future`, then pass
/// `ticket` and its output to [`Session::finish_load`].
pub struct PendingLoad {
    /// Identifies this attempt.
    pub ticket: LoadTicket,
    /// Resolves when the library has fetched and decoded the volume.
    pub future: LoadFuture,
}

/// Controller, viewer, notifier and page location wired together.
pub struct Session<V, N, L> {
    controller: SyncController,
    adapter: ViewerAdapter<V>,
    notifier: N,
    location: L,
    options: Options,
    load_messages: PromiseMessages,
}

impl<V, N, L> Session<V, N, L>
where
    V: VolumeViewer,
    N: Notifier,
    L: PageLocation,
{
    /// Session over an explicit query snapshot.
    #[must_use]
    pub fn new(
        options: Options,
        params: QueryParams,
        notifier: N,
        location: L,
    ) -> Self {
        log::debug!("session parameters: {params:?}");
        Self {
            controller: SyncController::new(params, options.sync.clone()),
            adapter: ViewerAdapter::new(options.viewer.clone()),
            notifier,
            location,
            options,
            load_messages: PromiseMessages::payload_load(),
        }
    }

    /// Session over the query string of the page's current URL, parsed
    /// once here and never again.
    #[must_use]
    pub fn from_location(options: Options, notifier: N, location: L) -> Self {
        let params = QueryParams::from_href(&location.href());
        Self::new(options, params, notifier, location)
    }

    // ── Viewer lifecycle ─────────────────────────────────────────────────

    /// Construct the viewer for the rendering surface. A second call while
    /// attached is a no-op returning `Ok(false)`.
    pub fn attach<F>(
        &mut self,
        wake: Option<Rc<dyn Fn()>>,
        build: F,
    ) -> Result<bool, VisionError>
    where
        F: FnOnce(&ViewerDefaults, LocationSink) -> Result<V, VisionError>,
    {
        self.adapter.initialize(&self.options.tuning, wake, build)
    }

    /// Release the viewer when its surface goes away. A load still in
    /// flight is abandoned; the next attached viewer starts it over.
    pub fn teardown(&mut self) {
        self.adapter.teardown();
        let _ = self.controller.cancel_load();
    }

    /// Start loading the payload named in the query string.
    ///
    /// Returns the load for the caller to drive; pass its ticket and output
    /// to [`Self::finish_load`]. `None` when there is nothing to load, no
    /// viewer is attached, or a load is already running or done.
    pub fn start_load(&mut self) -> Option<PendingLoad> {
        if !self.adapter.is_attached() {
            log::debug!("load requested before the viewer is attached");
            return None;
        }
        if self.adapter.is_loading() {
            log::warn!("duplicate load request ignored");
            return None;
        }
        let source = self.controller.begin_load()?;
        let ticket = self.controller.load_ticket();
        let Some(future) = self.adapter.load_volume(&source) else {
            let effects = self.controller.complete_load(
                ticket,
                &Err(VisionError::VolumeLoad(
                    "viewer refused the load".to_owned(),
                )),
            );
            self.execute(effects);
            return None;
        };
        self.notifier
            .promise(&self.load_messages, &PromiseOutcome::Pending);
        Some(PendingLoad { ticket, future })
    }

    /// Start a new load after a failed one.
    pub fn retry_load(&mut self) -> Option<PendingLoad> {
        if self.controller.load_state() != LoadState::Failed {
            log::debug!(
                "retry ignored in state {:?}",
                self.controller.load_state()
            );
            return None;
        }
        log::info!("retrying payload load");
        self.start_load()
    }

    /// Settle a load started by [`Self::start_load`] or
    /// [`Self::retry_load`].
    ///
    /// Outcomes of an abandoned load (the viewer was torn down, or a newer
    /// attempt replaced it) are dropped without touching the viewer or
    /// notifying.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<(), VisionError>,
    ) {
        if !self.controller.is_current_load(ticket) {
            log::debug!("outcome of abandoned load {ticket:?} dropped");
            return;
        }
        self.adapter.settle_load();
        let effects = self.controller.complete_load(ticket, &result);
        match result {
            Ok(()) => {
                self.notifier
                    .promise(&self.load_messages, &PromiseOutcome::Resolved);
                self.execute(effects);
                self.adapter.focus();
            }
            Err(e) => {
                self.notifier.promise(
                    &self.load_messages,
                    &PromiseOutcome::Rejected(e.to_string()),
                );
                self.execute(effects);
            }
        }
        let _ = self.pump_viewer_events();
    }

    /// Apply every location report the viewer queued since the last pump.
    /// Returns `true` if any report was processed.
    ///
    /// Bursts (such as the double move of a crosshair placement) rewrite
    /// the URL only once, for the final position.
    pub fn pump_viewer_events(&mut self) -> bool {
        let changes = self.adapter.drain_location_changes();
        if changes.is_empty() {
            return false;
        }
        let mut mirror = None;
        for change in changes {
            for effect in self.controller.on_location_change(change) {
                match effect {
                    SyncEffect::MirrorUrl(target) => mirror = Some(target),
                    other => self.execute_one(other),
                }
            }
        }
        if let Some(target) = mirror {
            self.mirror_url(target);
        }
        true
    }

    // ── User intents ─────────────────────────────────────────────────────

    /// Coordinate input edit for one axis.
    pub fn set_axis(&mut self, axis: Axis, value: i32) {
        let effects = self.controller.set_axis(axis, value);
        self.execute(effects);
        let _ = self.pump_viewer_events();
    }

    /// Coordinate edit for all three axes at once.
    pub fn set_coordinate(&mut self, target: VoxelCoordinate) {
        let effects = self.controller.set_coordinate(target);
        self.execute(effects);
        let _ = self.pump_viewer_events();
    }

    /// Drag-mode menu selection.
    pub fn set_drag_mode(&mut self, mode: DragMode) {
        let effects = self.controller.set_drag_mode(mode);
        self.execute(effects);
    }

    /// Reapply the viewer defaults, crosshair included.
    pub fn reset_scene(&mut self) {
        if !self.adapter.is_attached() {
            log::debug!("reset requested without a viewer");
            return;
        }
        self.notifier.info(RESET_MESSAGE);
        let _ = self.adapter.reset_scene();
        let _ = self.pump_viewer_events();
    }

    /// Show the loaded volume's descriptive statistics.
    pub fn request_metadata(&self) {
        match self.adapter.query_descriptives() {
            Some(descriptives) => self
                .notifier
                .custom(Toast::metadata(&descriptives, self.toast_duration())),
            None => log::debug!("metadata requested without a viewer"),
        }
    }

    /// Show keyboard and mouse help.
    pub fn show_about(&self) {
        self.notifier.custom(Toast::about(self.toast_duration()));
    }

    // ── Accessors ────────────────────────────────────────────────────────

    /// State for the shell to render.
    #[must_use]
    pub fn snapshot(&self) -> ShellSnapshot {
        self.controller.snapshot()
    }

    /// The synchronization controller.
    #[must_use]
    pub fn controller(&self) -> &SyncController {
        &self.controller
    }

    /// The viewer adapter.
    #[must_use]
    pub fn adapter(&self) -> &ViewerAdapter<V> {
        &self.adapter
    }

    /// Mutable viewer adapter, for surface-level calls the session does
    /// not mediate.
    pub fn adapter_mut(&mut self) -> &mut ViewerAdapter<V> {
        &mut self.adapter
    }

    /// The injected notifier.
    #[must_use]
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// The injected page location.
    #[must_use]
    pub fn location(&self) -> &L {
        &self.location
    }

    /// Active options.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    // ── Effects ──────────────────────────────────────────────────────────

    fn toast_duration(&self) -> Duration {
        Duration::from_millis(u64::from(
            self.options.notifications.toast_duration_ms,
        ))
    }

    fn execute(&mut self, effects: Vec<SyncEffect>) {
        for effect in effects {
            self.execute_one(effect);
        }
    }

    fn execute_one(&mut self, effect: SyncEffect) {
        match effect {
            SyncEffect::MoveCrosshair(target) => {
                self.adapter.move_crosshair(target);
            }
            SyncEffect::SetDragMode(mode) => self.adapter.set_drag_mode(mode),
            SyncEffect::MirrorUrl(target) => self.mirror_url(target),
        }
    }

    fn mirror_url(&self, target: VoxelCoordinate) {
        let href = self.location.href();
        let next = mirror_coordinates(&href, target);
        if next != href {
            log::debug!("mirroring {target} into the address bar");
            self.location.replace(&next);
        }
    }
}
