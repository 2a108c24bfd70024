//! Test doubles for the viewer, notifier and page location.

use std::cell::{Cell, RefCell};

use crate::error::VisionError;
use crate::notify::{Notifier, PromiseMessages, PromiseOutcome, Toast};
use crate::options::{ViewerDefaults, ViewerTuning};
use crate::session::PageLocation;
use crate::viewer::{
    Descriptives, LoadFuture, LocationReport, LocationSink, VolumeViewer,
};
use crate::volume::{DragMode, VolumeSource, VoxelCoordinate};

// ── Viewer ───────────────────────────────────────────────────────────────

/// In-memory viewer over a 64³ volume. Like the real library it clamps
/// positions to the volume and reports only actual position changes.
pub(crate) struct FakeViewer {
    sink: LocationSink,
    position: VoxelCoordinate,
    pub(crate) dims: VoxelCoordinate,
    pub(crate) fail_loads: bool,
    pub(crate) load_calls: usize,
    pub(crate) loaded: Vec<VolumeSource>,
    pub(crate) moves: Vec<VoxelCoordinate>,
    pub(crate) drag_mode: Option<DragMode>,
    pub(crate) tuning: Option<ViewerTuning>,
    pub(crate) resets: Vec<bool>,
    focus_count: Cell<usize>,
}

impl FakeViewer {
    pub(crate) fn build(
        _defaults: &ViewerDefaults,
        sink: LocationSink,
    ) -> Result<Self, VisionError> {
        Ok(Self {
            sink,
            position: VoxelCoordinate::new(32, 32, 32),
            dims: VoxelCoordinate::new(64, 64, 64),
            fail_loads: false,
            load_calls: 0,
            loaded: Vec::new(),
            moves: Vec::new(),
            drag_mode: None,
            tuning: None,
            resets: Vec::new(),
            focus_count: Cell::new(0),
        })
    }

    pub(crate) fn build_failing_loads(
        defaults: &ViewerDefaults,
        sink: LocationSink,
    ) -> Result<Self, VisionError> {
        let mut viewer = Self::build(defaults, sink)?;
        viewer.fail_loads = true;
        Ok(viewer)
    }

    pub(crate) fn position(&self) -> VoxelCoordinate {
        self.position
    }

    pub(crate) fn focus_count(&self) -> usize {
        self.focus_count.get()
    }

    /// Simulate the user dragging the crosshair inside the canvas.
    pub(crate) fn drag_to(&mut self, target: VoxelCoordinate) {
        self.move_crosshair_in_vox(target.x, target.y, target.z);
    }

    fn intensity_at(voxel: VoxelCoordinate) -> i32 {
        voxel.x + voxel.y + voxel.z
    }
}

impl VolumeViewer for FakeViewer {
    fn apply_tuning(&mut self, tuning: &ViewerTuning) {
        self.tuning = Some(tuning.clone());
        self.drag_mode = Some(tuning.drag_mode);
    }

    fn load_volumes(&mut self, volumes: &[VolumeSource]) -> LoadFuture {
        self.load_calls += 1;
        self.loaded.extend_from_slice(volumes);
        let fail = self.fail_loads;
        Box::pin(async move {
            if fail {
                Err(VisionError::VolumeLoad("404 Not Found".to_owned()))
            } else {
                Ok(())
            }
        })
    }

    fn move_crosshair_in_vox(&mut self, x: i32, y: i32, z: i32) {
        self.moves.push(VoxelCoordinate::new(x, y, z));
        let clamped = VoxelCoordinate::new(
            x.clamp(0, self.dims.x - 1),
            y.clamp(0, self.dims.y - 1),
            z.clamp(0, self.dims.z - 1),
        );
        if clamped == self.position {
            return;
        }
        self.position = clamped;
        let label = format!(
            "{}×{}×{}×0 = {}",
            clamped.x,
            clamped.y,
            clamped.z,
            Self::intensity_at(clamped)
        );
        self.sink.report(LocationReport::new(clamped, label));
    }

    fn set_drag_mode(&mut self, mode: DragMode) {
        self.drag_mode = Some(mode);
    }

    fn set_defaults(&mut self, _defaults: &ViewerDefaults, reset_crosshair: bool) {
        self.resets.push(reset_crosshair);
    }

    fn descriptives(&self) -> Descriptives {
        [
            ("dims", format!("{}×{}×{}", self.dims.x, self.dims.y, self.dims.z)),
            ("volumes", self.loaded.len().to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect()
    }

    fn focus(&self) {
        self.focus_count.set(self.focus_count.get() + 1);
    }
}

// ── Notifier ─────────────────────────────────────────────────────────────

/// What a [`RecordingNotifier`] was asked to show.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Note {
    Info(String),
    Promise(String),
    Custom(Toast),
}

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    notes: RefCell<Vec<Note>>,
}

impl RecordingNotifier {
    pub(crate) fn notes(&self) -> Vec<Note> {
        self.notes.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn info(&self, message: &str) {
        self.notes.borrow_mut().push(Note::Info(message.to_owned()));
    }

    fn promise(&self, messages: &PromiseMessages, outcome: &PromiseOutcome) {
        let text = messages.for_outcome(outcome).to_owned();
        self.notes.borrow_mut().push(Note::Promise(text));
    }

    fn custom(&self, toast: Toast) {
        self.notes.borrow_mut().push(Note::Custom(toast));
    }
}

// ── Page location ────────────────────────────────────────────────────────

/// Address bar stand-in recording every replacement.
pub(crate) struct MemoryLocation {
    href: RefCell<String>,
    replacements: Cell<usize>,
}

impl MemoryLocation {
    pub(crate) fn new(href: &str) -> Self {
        Self {
            href: RefCell::new(href.to_owned()),
            replacements: Cell::new(0),
        }
    }

    pub(crate) fn replacements(&self) -> usize {
        self.replacements.get()
    }
}

impl PageLocation for MemoryLocation {
    fn href(&self) -> String {
        self.href.borrow().clone()
    }

    fn replace(&self, url: &str) {
        url.clone_into(&mut self.href.borrow_mut());
        self.replacements.set(self.replacements.get() + 1);
    }
}
