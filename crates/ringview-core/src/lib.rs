//! Hardware-independent core library for ringview
//!
//! This crate contains the status-display rendering engine of the device:
//! a keyed collection of widgets describing device state, dirty tracking
//! between frames, composition onto an RGB canvas and dispatch of finished
//! frames to render sinks (physical panel, emulator, network preview).
//!
//! The decision of *what* to display lives outside this crate; callers drive
//! it through [`view::View`] setters and `update`.

pub mod canvas;
pub mod config;
pub mod error;
pub mod faces;
pub mod sink;
pub mod state;
pub mod ui;
pub mod view;
pub mod voice;

pub use canvas::{Canvas, Frame};
pub use config::Config;
pub use error::{AssetError, CanvasError, ConfigError, HookError, SinkError, StateError, ViewError};
pub use sink::{Layout, RenderSink};
pub use state::State;
pub use ui::Widget;
pub use view::View;
