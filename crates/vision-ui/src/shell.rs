//! Presentation components.
//!
//! Components only read [`AppContext::view`] and send intents through
//! [`AppContext::update`]; none of them touches the viewer directly.

use dioxus::prelude::*;
use niivue_vision::notify::ToastBody;
use niivue_vision::volume::{Axis, DragMode};

use crate::bridge::{self, ToastKind};
use crate::{AppContext, CANVAS_ID};

/// Title bar with reset, about and the drag-mode menu.
#[component]
pub fn Header() -> Element {
    let ctx = use_context::<AppContext>();
    let active = ctx.view.read().drag_mode;
    let reset_ctx = ctx.clone();
    let about_ctx = ctx.clone();

    rsx! {
        header { class: "header",
            div { class: "header-title",
                span { "NiiVue - Vision" }
                button {
                    class: "icon-button",
                    title: "Reset Scene",
                    onclick: move |_| {
                        let _ = reset_ctx.update(|s| s.reset_scene());
                    },
                    "\u{21bb}"
                }
                button {
                    class: "icon-button",
                    title: "About",
                    onclick: move |_| {
                        let _ = about_ctx.update(|s| s.show_about());
                    },
                    "\u{2139}"
                }
            }
            select {
                class: "drag-mode",
                value: active.library_key(),
                onchange: move |evt: Event<FormData>| {
                    match evt.value().parse::<DragMode>() {
                        Ok(mode) => {
                            let _ = ctx.update(|s| s.set_drag_mode(mode));
                        }
                        Err(e) => log::warn!("{e}"),
                    }
                },
                for mode in DragMode::ALL {
                    option {
                        value: mode.library_key(),
                        selected: mode == active,
                        {mode.label()}
                    }
                }
            }
        }
    }
}

/// Rendering surface. The viewer is built once the canvas is mounted and
/// released when it unmounts.
#[component]
pub fn Viewport() -> Element {
    let ctx = use_context::<AppContext>();
    let drop_ctx = ctx.clone();
    use_drop(move || {
        let _ = drop_ctx.update(|s| s.teardown());
    });

    rsx! {
        div { class: "viewport",
            canvas {
                id: CANVAS_ID,
                tabindex: "0",
                onmounted: move |_| ctx.attach_and_load(),
            }
        }
    }
}

/// Image identity, coordinate inputs and the sampled intensity.
#[component]
pub fn Footer() -> Element {
    let ctx = use_context::<AppContext>();
    let view = ctx.view.read().clone();
    let name = view.image_name.clone().unwrap_or_default();
    let path = view.image_path.clone().unwrap_or_default();
    let intensity = view
        .sample
        .map(|s| s.value.to_string())
        .unwrap_or_default();
    let time = view
        .sample
        .map(|s| s.time_index.to_string())
        .unwrap_or_default();
    let meta_ctx = ctx.clone();
    let retry_ctx = ctx.clone();

    rsx! {
        footer { class: "footer",
            div { class: "image",
                span {
                    class: "image-name",
                    title: "{path}",
                    onclick: move |_| {
                        let _ = meta_ctx.update(|s| s.request_metadata());
                    },
                    "\u{2139} {name}"
                }
                if view.is_loading {
                    span { class: "status", "loading\u{2026}" }
                }
                if view.load_failed {
                    button {
                        class: "retry",
                        onclick: move |_| retry_ctx.retry_load(),
                        "Retry"
                    }
                }
            }
            div { class: "coordinates",
                for axis in Axis::ALL {
                    CoordinateInput { axis, value: view.coordinate.get(axis) }
                }
                label { class: "readout", title: "Intensity",
                    input { r#type: "text", readonly: true, value: "{intensity}" }
                    span { "I" }
                }
                label { class: "readout", title: "Time index",
                    input { r#type: "text", readonly: true, value: "{time}" }
                    span { "T" }
                }
            }
        }
    }
}

#[component]
fn CoordinateInput(axis: Axis, value: i32) -> Element {
    let ctx = use_context::<AppContext>();
    let suffix = axis.upper_key();

    rsx! {
        label { class: "coordinate",
            input {
                r#type: "number",
                value: "{value}",
                onchange: move |evt: Event<FormData>| {
                    if let Ok(v) = evt.value().trim().parse::<i32>() {
                        let _ = ctx.update(|s| s.set_axis(axis, v));
                    }
                },
            }
            span { "{suffix}" }
        }
    }
}

/// Bottom-right toast column.
#[component]
pub fn ToastStack() -> Element {
    let ctx = use_context::<AppContext>();
    let toasts = ctx.toasts;
    let entries = toasts.read().clone();

    rsx! {
        div { class: "toasts",
            for entry in entries {
                div { key: "{entry.id}", class: "toast",
                    {render_toast(&entry.kind)}
                    button {
                        class: "toast-close",
                        onclick: move |_| bridge::dismiss(toasts, entry.id),
                        "\u{00d7}"
                    }
                }
            }
        }
    }
}

fn render_toast(kind: &ToastKind) -> Element {
    match kind {
        ToastKind::Info(text) => rsx! { p { class: "info", "\u{2139}\u{fe0f} {text}" } },
        ToastKind::Loading(text) => rsx! { p { class: "loading", "{text}" } },
        ToastKind::Success(text) => rsx! { p { class: "success", b { "{text}" } } },
        ToastKind::Error(text) => rsx! { p { class: "error", b { "{text}" } } },
        ToastKind::Card { title, body } => rsx! {
            p { class: "toast-title", "{title}" }
            {render_body(body)}
        },
    }
}

fn render_body(body: &ToastBody) -> Element {
    match body {
        ToastBody::Table(rows) => rsx! {
            table { class: "toast-table",
                tbody {
                    for (key, value) in rows.iter() {
                        tr { key: "{key}",
                            th { "{key}" }
                            td { "{value}" }
                        }
                    }
                }
            }
        },
        ToastBody::Sections(sections) => rsx! {
            for section in sections.iter() {
                div { class: "toast-section",
                    "{section.heading}"
                    ul {
                        for item in section.items.iter() {
                            li { "{item}" }
                        }
                    }
                }
            }
        },
    }
}
