//! Crate-level error types.

use std::fmt;

/// Errors produced by the niivue-vision crate.
#[derive(Debug)]
pub enum VisionError {
    /// The rendering library could not be constructed or attached.
    ViewerInit(String),
    /// The payload volume failed to fetch or parse.
    VolumeLoad(String),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Generic I/O failure.
    Io(std::io::Error),
}

impl fmt::Display for VisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ViewerInit(msg) => write!(f, "viewer init error: {msg}"),
            Self::VolumeLoad(msg) => write!(f, "volume load error: {msg}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for VisionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for VisionError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
