//! User-visible notifications.
//!
//! The core never talks to a toast library directly. It is handed a
//! [`Notifier`] and describes what to show: a one-line info message, the
//! phases of a long-running operation, or a structured [`Toast`].

use std::time::Duration;

use crate::viewer::Descriptives;

/// Message shown when the scene is reset.
pub const RESET_MESSAGE: &str = "Resetting Scene";

/// Capability to show notifications.
pub trait Notifier {
    /// Short informational message.
    fn info(&self, message: &str);

    /// Progress of a long-running operation. Called with
    /// [`PromiseOutcome::Pending`] when it starts and again once it
    /// settles.
    fn promise(&self, messages: &PromiseMessages, outcome: &PromiseOutcome);

    /// Structured toast with a title and body.
    fn custom(&self, toast: Toast);
}

/// Phase of a promise-style notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromiseOutcome {
    /// Still running.
    Pending,
    /// Finished successfully.
    Resolved,
    /// Failed with the given reason.
    Rejected(String),
}

/// The three texts of a promise-style notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromiseMessages {
    /// Shown while pending.
    pub loading: String,
    /// Shown on success.
    pub success: String,
    /// Shown on failure.
    pub error: String,
}

impl PromiseMessages {
    /// Messages for the payload volume load.
    #[must_use]
    pub fn payload_load() -> Self {
        Self {
            loading: "Loading Payload...".to_owned(),
            success: "Loaded Payload".to_owned(),
            error: "Error Loading Payload".to_owned(),
        }
    }

    /// Text for `outcome`.
    #[must_use]
    pub fn for_outcome(&self, outcome: &PromiseOutcome) -> &str {
        match outcome {
            PromiseOutcome::Pending => &self.loading,
            PromiseOutcome::Resolved => &self.success,
            PromiseOutcome::Rejected(_) => &self.error,
        }
    }
}

// ── Toasts ───────────────────────────────────────────────────────────────

/// A titled, dismissible toast.
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    /// Heading line.
    pub title: String,
    /// Content below the heading.
    pub body: ToastBody,
    /// Time before the toast dismisses itself.
    pub duration: Duration,
}

/// Content of a [`Toast`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToastBody {
    /// Two-column key/value table.
    Table(Vec<(String, String)>),
    /// Headed bullet lists.
    Sections(Vec<ToastSection>),
}

/// One headed bullet list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastSection {
    /// List heading.
    pub heading: String,
    /// Bullet texts.
    pub items: Vec<String>,
}

impl ToastSection {
    fn new(heading: &str, items: &[&str]) -> Self {
        Self {
            heading: heading.to_owned(),
            items: items.iter().map(|item| (*item).to_owned()).collect(),
        }
    }
}

impl Toast {
    /// Table of the loaded volume's descriptive statistics.
    #[must_use]
    pub fn metadata(descriptives: &Descriptives, duration: Duration) -> Self {
        let rows = descriptives
            .iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Self {
            title: "Metadata".to_owned(),
            body: ToastBody::Table(rows),
            duration,
        }
    }

    /// Keyboard and mouse help.
    #[must_use]
    pub fn about(duration: Duration) -> Self {
        Self {
            title: "About".to_owned(),
            body: ToastBody::Sections(vec![
                ToastSection::new(
                    "Hotkeys",
                    &[
                        "Press v to cycle through the available views.",
                        "Press c to cycle through the different clip views.",
                        "Press Left Arrow or Right Arrow to move between different volumes.",
                    ],
                ),
                ToastSection::new(
                    "Mouse Controls",
                    &[
                        "Hold left mouse button and drag to move crosshairs.",
                        "Hold right mouse button to use the action selected in the header menu.",
                        "Use scroll wheel to move between slices (or zoom in/out, if in Pan / Zoom mode).",
                    ],
                ),
            ]),
            duration,
        }
    }
}
