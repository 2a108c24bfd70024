//! Boundary to the external volumetric rendering library.
//!
//! [`VolumeViewer`] is the narrow surface the rest of the crate needs from
//! the library. The library talks back through a [`LocationSink`], whose
//! reports the [`ViewerAdapter`] drains and parses; it never sees
//! application state.

/// Owns the viewer instance and exposes imperative commands.
pub mod adapter;
/// Location-change report type and label parser.
pub mod report;

use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::mpsc;

pub use adapter::{ViewerAdapter, CROSSHAIR_SENTINEL};
pub use report::{LocationChange, LocationReport};

use crate::error::VisionError;
use crate::options::{ViewerDefaults, ViewerTuning};
use crate::volume::{DragMode, VolumeSource};

/// Completion of a volume load. Single-threaded: it is polled on the UI
/// thread and need not be `Send`.
pub type LoadFuture = Pin<Box<dyn Future<Output = Result<(), VisionError>>>>;

/// Commands the rendering library must support.
pub trait VolumeViewer {
    /// Apply post-construction settings (drag mode, forced multiplanar
    /// rendering, zoom yoking, crosshair gap, interpolation).
    fn apply_tuning(&mut self, tuning: &ViewerTuning);

    /// Start fetching `volumes`. The returned future settles when the
    /// library has finished (or failed) loading them.
    fn load_volumes(&mut self, volumes: &[VolumeSource]) -> LoadFuture;

    /// Place the crosshair at a voxel. The library only reports a location
    /// change when the position actually changes.
    fn move_crosshair_in_vox(&mut self, x: i32, y: i32, z: i32);

    /// Switch how drag gestures are interpreted.
    fn set_drag_mode(&mut self, mode: DragMode);

    /// Reapply scene defaults (contrast, pan/zoom and, optionally, the
    /// crosshair position).
    fn set_defaults(&mut self, defaults: &ViewerDefaults, reset_crosshair: bool);

    /// Summary statistics of the loaded volume.
    fn descriptives(&self) -> Descriptives;

    /// Give keyboard focus to the rendering surface.
    fn focus(&self) {}
}

// ── Location events ──────────────────────────────────────────────────────

/// Sending half of the location-change stream, handed to the library
/// callback when the viewer is built.
#[derive(Clone)]
pub struct LocationSink {
    tx: mpsc::Sender<LocationReport>,
    wake: Option<Rc<dyn Fn()>>,
}

impl LocationSink {
    pub(crate) fn new(
        tx: mpsc::Sender<LocationReport>,
        wake: Option<Rc<dyn Fn()>>,
    ) -> Self {
        Self { tx, wake }
    }

    /// Queue a report and poke the waker, if any. Reports sent after the
    /// adapter released the viewer are dropped.
    pub fn report(&self, report: LocationReport) {
        if self.tx.send(report).is_err() {
            log::debug!("location report after viewer teardown, dropped");
            return;
        }
        if let Some(wake) = &self.wake {
            wake();
        }
    }
}

// ── Descriptives ─────────────────────────────────────────────────────────

/// Key/value summary of the loaded volume (dimensions, ranges, robust
/// min/max and so on), already formatted for display. Entries keep the
/// order the library listed them in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Descriptives {
    entries: Vec<(String, String)>,
}

impl Descriptives {
    /// Flatten the library's statistics, given either as `[key, value]`
    /// pairs (the bridge sends `Object.entries`, which keeps the library's
    /// order) or as a plain object. Strings are kept verbatim, other values
    /// use their JSON text. Anything else yields an empty set.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Array(pairs) => pairs
                .iter()
                .filter_map(|pair| match pair.as_array()?.as_slice() {
                    [serde_json::Value::String(key), value] => {
                        Some((key.clone(), display_text(value)))
                    }
                    _ => None,
                })
                .collect(),
            serde_json::Value::Object(object) => object
                .iter()
                .map(|(key, value)| (key.clone(), display_text(value)))
                .collect(),
            _ => Self::default(),
        }
    }

    /// Entries in the order the library listed them.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no statistics are available.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn display_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A repeated key keeps its first position and takes the last value.
impl FromIterator<(String, String)> for Descriptives {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut entries: Vec<(String, String)> = Vec::new();
        for (key, value) in iter {
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = value,
                None => entries.push((key, value)),
            }
        }
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptives_keep_library_order() {
        let json = serde_json::json!([
            ["mean", 12.5],
            ["units", "mm"],
            ["dims", [64, 64, 32]],
            ["robust_min", 0],
        ]);
        let d = Descriptives::from_json(&json);
        assert_eq!(d.len(), 4);
        assert_eq!(d.get("mean"), Some("12.5"));
        assert_eq!(d.get("units"), Some("mm"));
        assert_eq!(d.get("dims"), Some("[64,64,32]"));
        let keys: Vec<&str> = d.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["mean", "units", "dims", "robust_min"]);
    }

    #[test]
    fn descriptives_flatten_json_object() {
        let json = serde_json::json!({ "mean": 12.5, "units": "mm" });
        let d = Descriptives::from_json(&json);
        assert_eq!(d.get("mean"), Some("12.5"));
        assert_eq!(d.get("units"), Some("mm"));
    }

    #[test]
    fn repeated_key_keeps_first_position() {
        let d: Descriptives = [("a", "1"), ("b", "2"), ("a", "3")]
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        let entries: Vec<(&str, &str)> = d.iter().collect();
        assert_eq!(entries, [("a", "3"), ("b", "2")]);
    }

    #[test]
    fn malformed_descriptives_are_empty() {
        assert!(Descriptives::from_json(&serde_json::json!(null)).is_empty());
        assert!(Descriptives::from_json(&serde_json::json!([1, 2])).is_empty());
        assert!(
            Descriptives::from_json(&serde_json::json!([[1, 2], ["k"]]))
                .is_empty()
        );
    }

    #[test]
    fn sink_drops_reports_after_receiver_is_gone() {
        let (tx, rx) = mpsc::channel();
        let sink = LocationSink::new(tx, None);
        drop(rx);
        sink.report(LocationReport::default());
    }
}
