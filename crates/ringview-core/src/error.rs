//! Error types for the rendering engine.
//!
//! Recoverable draw faults are not errors: widgets report those
//! through [`DrawOutcome`](crate::ui::DrawOutcome) so that a frame is never
//! aborted by a single bad widget.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by [`State`](crate::state::State) operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("unknown state key '{0}'")]
    UnknownKey(String),
    #[error("state key '{0}' already exists")]
    DuplicateKey(String),
    #[error("widget at '{0}' does not carry a value")]
    NoValue(String),
}

/// Errors reported by a [`RenderSink`](crate::sink::RenderSink).
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("sink initialization failed: {0}")]
    Init(String),
    #[error("sink render failed: {0}")]
    Render(String),
    #[error("operation not supported by this sink")]
    Unsupported,
}

/// Errors raised while loading face assets.
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("failed to read asset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode asset: {0}")]
    Decode(#[from] image::ImageError),
}

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors surfaced by [`View`](crate::view::View) to its owner.
#[derive(Error, Debug)]
pub enum ViewError {
    #[error("sink '{name}' failed: {source}")]
    Sink {
        name: String,
        #[source]
        source: SinkError,
    },
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Canvas(#[from] CanvasError),
    #[error("failed to start refresh ticker: {0}")]
    Ticker(#[source] std::io::Error),
}

/// Returned by an [`Extension`](crate::view::Extension) hook that failed.
///
/// Hook failures are logged and never abort a frame.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct HookError(pub String);

impl HookError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Raised when the pixel buffer for a frame cannot be allocated.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cannot allocate a {width}x{height} canvas")]
pub struct CanvasError {
    pub width: u32,
    pub height: u32,
}

/// Raised when an image cannot be composited onto the canvas.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeError {
    #[error("image has zero width or height")]
    EmptyImage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_error_converts_to_view_error() {
        let err = CanvasError { width: 0, height: 240 };
        assert_eq!(err.to_string(), "cannot allocate a 0x240 canvas");

        let view_err = ViewError::from(err);
        assert!(matches!(view_err, ViewError::Canvas(CanvasError { width: 0, height: 240 })));
        assert_eq!(view_err.to_string(), "cannot allocate a 0x240 canvas");
    }
}
