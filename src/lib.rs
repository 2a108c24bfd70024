// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (thresholds in clippy.toml)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Core of a query-driven browser front end for a volumetric image viewer.
//!
//! The page URL names a payload volume and, optionally, a voxel to look at.
//! This crate loads the payload into an external rendering library, places
//! the crosshair once the volume is ready, keeps the crosshair position and
//! the intensity under it in sync with the viewer, and mirrors the position
//! back into the URL so it can be shared.
//!
//! # Key entry points
//!
//! - [`session::Session`] - wires everything together; the shell talks to
//!   nothing else
//! - [`sync::SyncController`] - the load/positioning state machine
//! - [`viewer::VolumeViewer`] - the seam to the rendering library
//! - [`query::QueryParams`] - the startup query snapshot
//! - [`options::Options`] - runtime configuration (viewer defaults, tuning,
//!   sync policy, notifications)
//!
//! # Architecture
//!
//! Everything runs on the UI thread. The rendering library reports location
//! changes into a [`viewer::LocationSink`]; the session drains those reports
//! after every command and whenever the sink's waker fires, feeds them to
//! the controller and executes the returned [`sync::SyncEffect`]s. The only
//! suspending operation is the volume load, whose future the shell drives
//! and hands back, tagged with its ticket, through
//! [`session::Session::finish_load`]. Tearing the viewer down abandons a
//! load in flight; its late outcome is dropped.

pub mod error;
pub mod notify;
pub mod options;
pub mod query;
pub mod session;
pub mod sync;
pub mod viewer;
pub mod volume;

#[cfg(test)]
mod testing;

pub use error::VisionError;
pub use options::Options;
pub use session::{PageLocation, Session};
