//! Dioxus web shell for niivue-vision.
//!
//! Compiled to WASM. Hosts the NiiVue canvas between a header (title,
//! reset, about, drag mode) and a footer (image name, coordinates,
//! intensity), and forwards every user intent to the core
//! [`Session`](niivue_vision::Session).

// `rsx!` event-handler expansion emits fully qualified paths.
#![allow(unused_qualifications)]

mod bridge;
mod shell;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use dioxus::prelude::*;
use niivue_vision::session::PendingLoad;
use niivue_vision::sync::ShellSnapshot;
use niivue_vision::{Options, Session};

use bridge::{BrowserLocation, NiivueViewer, ToastEntry, ToastNotifier, Waker};

/// Options shipped with the build.
const EMBEDDED_OPTIONS: &str = include_str!("../vision.toml");

/// Canvas the viewer attaches to.
pub const CANVAS_ID: &str = "niivue";

const STYLE: Asset = asset!("/assets/main.css");

/// The session as wired in the browser.
pub type AppSession = Session<NiivueViewer, ToastNotifier, BrowserLocation>;

fn main() {
    console_error_panic_hook::set_once();
    let parsed = Options::from_toml_str(EMBEDDED_OPTIONS);
    let options = parsed.as_ref().cloned().unwrap_or_default();
    if let Some(level) = options.viewer.log_level.level_filter().to_level() {
        let _ = console_log::init_with_level(level);
    }
    if let Err(e) = parsed {
        log::warn!("embedded vision.toml rejected, using defaults: {e}");
    }
    dioxus::LaunchBuilder::new().with_context(options).launch(app);
}

fn app() -> Element {
    let options = use_context::<Options>();
    let toasts: Signal<Vec<ToastEntry>> = use_signal(Vec::new);
    let session = use_hook(|| {
        Rc::new(RefCell::new(Session::from_location(
            options,
            ToastNotifier::new(toasts),
            BrowserLocation,
        )))
    });
    let initial = session.borrow().snapshot();
    let view = use_signal(move || initial);
    let _ = use_context_provider(|| AppContext {
        session,
        view,
        toasts,
    });

    rsx! {
        document::Link { rel: "stylesheet", href: STYLE }
        div { class: "app",
            shell::Header {}
            shell::Viewport {}
            shell::Footer {}
            shell::ToastStack {}
        }
    }
}

// ── Session access ───────────────────────────────────────────────────────

/// Handle shared by every component.
#[derive(Clone)]
pub struct AppContext {
    session: Rc<RefCell<AppSession>>,
    /// Latest snapshot of the synchronized state.
    pub view: Signal<ShellSnapshot>,
    /// Visible toasts.
    pub toasts: Signal<Vec<ToastEntry>>,
}

impl AppContext {
    /// Run `f` on the session and publish the resulting snapshot. Returns
    /// `None` if the session is already borrowed further up the stack.
    pub fn update<R>(&self, f: impl FnOnce(&mut AppSession) -> R) -> Option<R> {
        update_session(&self.session, self.view, f)
    }

    /// Build the viewer on the canvas and start the payload load.
    pub fn attach_and_load(&self) {
        let waker = self.waker();
        let attached = self.update(|s| {
            s.attach(Some(waker), |defaults, sink| {
                NiivueViewer::build(CANVAS_ID, defaults, sink)
            })
        });
        match attached {
            Some(Ok(true)) => self.start_load(),
            Some(Ok(false)) | None => {}
            Some(Err(e)) => log::error!("viewer construction failed: {e}"),
        }
    }

    /// Start the payload load, if there is one to start.
    pub fn start_load(&self) {
        if let Some(Some(pending)) = self.update(AppSession::start_load) {
            self.drive_load(pending);
        }
    }

    /// Retry after a failed load.
    pub fn retry_load(&self) {
        if let Some(Some(pending)) = self.update(AppSession::retry_load) {
            self.drive_load(pending);
        }
    }

    fn drive_load(&self, pending: PendingLoad) {
        let ctx = self.clone();
        let PendingLoad { ticket, future } = pending;
        wasm_bindgen_futures::spawn_local(async move {
            let result = future.await;
            let _ = ctx.update(|s| s.finish_load(ticket, result));
        });
    }

    /// Waker handed to the location sink. Holds the session weakly so the
    /// viewer (owned by the session) does not keep it alive.
    fn waker(&self) -> Waker {
        let session: Weak<RefCell<AppSession>> = Rc::downgrade(&self.session);
        let view = self.view;
        Rc::new(move || {
            if let Some(session) = session.upgrade() {
                // Re-entrant reports are pumped by the running operation.
                let _ = update_session(&session, view, AppSession::pump_viewer_events);
            }
        })
    }
}

fn update_session<R>(
    session: &RefCell<AppSession>,
    mut view: Signal<ShellSnapshot>,
    f: impl FnOnce(&mut AppSession) -> R,
) -> Option<R> {
    let Ok(mut session) = session.try_borrow_mut() else {
        return None;
    };
    let out = f(&mut session);
    let snapshot = session.snapshot();
    drop(session);
    if *view.peek() != snapshot {
        view.set(snapshot);
    }
    Some(out)
}
