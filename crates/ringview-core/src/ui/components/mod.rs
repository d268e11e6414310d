// src/ui/components/mod.rs
//! Widget components library

pub mod curved;
pub mod labeled;
pub mod shapes;
pub mod text;

pub use curved::{CurvedText, GlyphPlacement, layout_arc};
pub use labeled::LabeledValue;
pub use shapes::{Bitmap, FilledRect, Line, Rect};
pub use text::{Text, wrap_text};
