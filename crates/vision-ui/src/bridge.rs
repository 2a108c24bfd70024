//! Browser side of the core's ports.
//!
//! - [`NiivueViewer`] binds the NiiVue JS library (loaded as a UMD script,
//!   see `Dioxus.toml`) to [`VolumeViewer`].
//! - [`BrowserLocation`] reads `window.location` and rewrites it through
//!   `history.replaceState`.
//! - [`ToastNotifier`] turns notifications into entries of a toast signal
//!   rendered by [`crate::shell::ToastStack`].

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use dioxus::signals::{Signal, Writable};
use niivue_vision::notify::{
    Notifier, PromiseMessages, PromiseOutcome, Toast, ToastBody,
};
use niivue_vision::options::{ViewerDefaults, ViewerTuning};
use niivue_vision::viewer::{
    Descriptives, LoadFuture, LocationReport, LocationSink, VolumeViewer,
};
use niivue_vision::volume::{DragMode, VolumeSource};
use niivue_vision::{PageLocation, VisionError};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

// ── NiiVue binding ───────────────────────────────────────────────────────

#[wasm_bindgen(inline_js = "
function __vision_lib() {
    const lib = globalThis.niivue;
    if (!lib || !lib.Niivue) {
        throw new Error('NiiVue script is not loaded');
    }
    return lib;
}

export function vision_create(canvas_id, config_json, on_location) {
    const lib = __vision_lib();
    const canvas = document.getElementById(canvas_id);
    if (!canvas) {
        throw new Error(`canvas #${canvas_id} not found`);
    }
    const config = JSON.parse(config_json);
    config.onLocationChange = (data) => {
        on_location(JSON.stringify({
            vox: Array.from(data.vox ?? []),
            string: String(data.string ?? ''),
        }));
    };
    const nv = new lib.Niivue(config);
    nv.attachToCanvas(canvas);
    return nv;
}

export function vision_apply_tuning(nv, drag_mode, force_render, yoke, gap, nearest) {
    nv.opts.dragMode = nv.dragModes[drag_mode];
    nv.opts.multiplanarForceRender = force_render;
    nv.opts.yoke3Dto2DZoom = yoke;
    nv.opts.crosshairGap = gap;
    nv.setInterpolation(nearest);
}

export function vision_load(nv, volumes_json) {
    return nv.loadVolumes(JSON.parse(volumes_json));
}

export function vision_move(nv, x, y, z) {
    nv.moveCrosshairInVox(x, y, z);
}

export function vision_set_drag_mode(nv, mode) {
    nv.opts.dragMode = nv.dragModes[mode];
}

export function vision_set_defaults(nv, config_json, reset_crosshair) {
    nv.setDefaults(JSON.parse(config_json), reset_crosshair);
}

export function vision_descriptives(nv) {
    return JSON.stringify(Object.entries(nv.getDescriptives({}) ?? {}));
}
")]
extern "C" {
    #[wasm_bindgen(catch)]
    fn vision_create(
        canvas_id: &str,
        config_json: &str,
        on_location: &js_sys::Function,
    ) -> Result<JsValue, JsValue>;

    fn vision_apply_tuning(
        nv: &JsValue,
        drag_mode: &str,
        force_render: bool,
        yoke: bool,
        gap: f32,
        nearest: bool,
    );

    #[wasm_bindgen(catch)]
    fn vision_load(
        nv: &JsValue,
        volumes_json: &str,
    ) -> Result<js_sys::Promise, JsValue>;

    fn vision_move(nv: &JsValue, x: i32, y: i32, z: i32);

    fn vision_set_drag_mode(nv: &JsValue, mode: &str);

    #[wasm_bindgen(catch)]
    fn vision_set_defaults(
        nv: &JsValue,
        config_json: &str,
        reset_crosshair: bool,
    ) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    fn vision_descriptives(nv: &JsValue) -> Result<String, JsValue>;
}

/// Best-effort text of a thrown JS value.
fn js_message(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{value:?}"))
}

/// A NiiVue instance attached to a canvas.
pub struct NiivueViewer {
    nv: JsValue,
    canvas_id: String,
    // Keeps the JS callback alive as long as the instance.
    _on_location: Closure<dyn FnMut(String)>,
}

impl NiivueViewer {
    /// Construct NiiVue on the canvas `canvas_id`, forwarding its location
    /// changes into `sink`.
    pub fn build(
        canvas_id: &str,
        defaults: &ViewerDefaults,
        sink: LocationSink,
    ) -> Result<Self, VisionError> {
        let on_location =
            Closure::<dyn FnMut(String)>::new(move |json: String| {
                match LocationReport::from_json(&json) {
                    Ok(report) => sink.report(report),
                    Err(e) => log::warn!("undecodable location report: {e}"),
                }
            });
        let nv = vision_create(
            canvas_id,
            &defaults.library_config_json(),
            on_location.as_ref().unchecked_ref(),
        )
        .map_err(|e| VisionError::ViewerInit(js_message(&e)))?;
        Ok(Self {
            nv,
            canvas_id: canvas_id.to_owned(),
            _on_location: on_location,
        })
    }
}

impl VolumeViewer for NiivueViewer {
    fn apply_tuning(&mut self, tuning: &ViewerTuning) {
        vision_apply_tuning(
            &self.nv,
            tuning.drag_mode.library_key(),
            tuning.multiplanar_force_render,
            tuning.yoke_3d_to_2d_zoom,
            tuning.crosshair_gap,
            tuning.nearest_interpolation,
        );
    }

    fn load_volumes(&mut self, volumes: &[VolumeSource]) -> LoadFuture {
        let started = serde_json::to_string(volumes)
            .map_err(|e| VisionError::VolumeLoad(e.to_string()))
            .and_then(|json| {
                vision_load(&self.nv, &json)
                    .map_err(|e| VisionError::VolumeLoad(js_message(&e)))
            });
        Box::pin(async move {
            let _ = JsFuture::from(started?)
                .await
                .map_err(|e| VisionError::VolumeLoad(js_message(&e)))?;
            Ok(())
        })
    }

    fn move_crosshair_in_vox(&mut self, x: i32, y: i32, z: i32) {
        vision_move(&self.nv, x, y, z);
    }

    fn set_drag_mode(&mut self, mode: DragMode) {
        vision_set_drag_mode(&self.nv, mode.library_key());
    }

    fn set_defaults(&mut self, defaults: &ViewerDefaults, reset_crosshair: bool) {
        if let Err(e) = vision_set_defaults(
            &self.nv,
            &defaults.library_config_json(),
            reset_crosshair,
        ) {
            log::warn!("setDefaults failed: {}", js_message(&e));
        }
    }

    fn descriptives(&self) -> Descriptives {
        match vision_descriptives(&self.nv) {
            Ok(json) => serde_json::from_str(&json)
                .map(|value| Descriptives::from_json(&value))
                .unwrap_or_default(),
            Err(e) => {
                log::warn!("getDescriptives failed: {}", js_message(&e));
                Descriptives::default()
            }
        }
    }

    fn focus(&self) {
        let element = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(&self.canvas_id))
            .and_then(|e| e.dyn_into::<web_sys::HtmlElement>().ok());
        if let Some(element) = element {
            let _ = element.focus();
        }
    }
}

// ── Page location ────────────────────────────────────────────────────────

/// `window.location` plus `history.replaceState`.
pub struct BrowserLocation;

impl PageLocation for BrowserLocation {
    fn href(&self) -> String {
        web_sys::window()
            .and_then(|w| w.location().href().ok())
            .unwrap_or_default()
    }

    fn replace(&self, url: &str) {
        let Some(history) = web_sys::window().and_then(|w| w.history().ok())
        else {
            return;
        };
        if let Err(e) =
            history.replace_state_with_url(&JsValue::NULL, "", Some(url))
        {
            log::warn!("history.replaceState failed: {}", js_message(&e));
        }
    }
}

// ── Toasts ───────────────────────────────────────────────────────────────

const INFO_DURATION: Duration = Duration::from_secs(4);
const SUCCESS_DURATION: Duration = Duration::from_secs(2);

/// Visual flavour of a toast entry.
#[derive(Debug, Clone, PartialEq)]
pub enum ToastKind {
    /// Plain message with an info icon.
    Info(String),
    /// Spinner; replaced when the operation settles.
    Loading(String),
    /// Operation succeeded.
    Success(String),
    /// Operation failed.
    Error(String),
    /// Titled card with a table or bullet sections.
    Card {
        /// Card heading.
        title: String,
        /// Card content.
        body: ToastBody,
    },
}

/// One visible toast.
#[derive(Debug, Clone, PartialEq)]
pub struct ToastEntry {
    /// Stable key for rendering and dismissal.
    pub id: u64,
    /// What to show.
    pub kind: ToastKind,
}

/// [`Notifier`] backed by a toast signal.
pub struct ToastNotifier {
    toasts: Signal<Vec<ToastEntry>>,
    next_id: Cell<u64>,
    pending: Cell<Option<u64>>,
}

impl ToastNotifier {
    /// Notifier pushing into `toasts`.
    pub fn new(toasts: Signal<Vec<ToastEntry>>) -> Self {
        Self {
            toasts,
            next_id: Cell::new(0),
            pending: Cell::new(None),
        }
    }

    fn push(&self, kind: ToastKind, duration: Option<Duration>) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let mut toasts = self.toasts;
        toasts.write().push(ToastEntry { id, kind });
        if let Some(duration) = duration {
            dismiss_after(toasts, id, duration);
        }
        id
    }
}

impl Notifier for ToastNotifier {
    fn info(&self, message: &str) {
        let _ = self.push(ToastKind::Info(message.to_owned()), Some(INFO_DURATION));
    }

    fn promise(&self, messages: &PromiseMessages, outcome: &PromiseOutcome) {
        if let Some(id) = self.pending.take() {
            dismiss(self.toasts, id);
        }
        let text = messages.for_outcome(outcome).to_owned();
        match outcome {
            PromiseOutcome::Pending => {
                let id = self.push(ToastKind::Loading(text), None);
                self.pending.set(Some(id));
            }
            PromiseOutcome::Resolved => {
                let _ = self.push(ToastKind::Success(text), Some(SUCCESS_DURATION));
            }
            PromiseOutcome::Rejected(reason) => {
                log::error!("{text}: {reason}");
                let _ = self.push(ToastKind::Error(text), Some(INFO_DURATION));
            }
        }
    }

    fn custom(&self, toast: Toast) {
        let Toast {
            title,
            body,
            duration,
        } = toast;
        let _ = self.push(ToastKind::Card { title, body }, Some(duration));
    }
}

/// Remove toast `id` now.
pub fn dismiss(mut toasts: Signal<Vec<ToastEntry>>, id: u64) {
    toasts.write().retain(|entry| entry.id != id);
}

fn dismiss_after(toasts: Signal<Vec<ToastEntry>>, id: u64, after: Duration) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let callback = Closure::once_into_js(move || dismiss(toasts, id));
    let millis = i32::try_from(after.as_millis()).unwrap_or(i32::MAX);
    if window
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.unchecked_ref(),
            millis,
        )
        .is_err()
    {
        log::warn!("could not schedule toast dismissal");
    }
}

/// Shared `Fn()` handle, as the location sink expects for its waker.
pub type Waker = Rc<dyn Fn()>;
