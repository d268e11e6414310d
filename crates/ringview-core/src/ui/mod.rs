// src/ui/mod.rs
//! Ringview UI system: fonts, colors and the widget set drawn by the view.
//!
//! This module provides:
//! - The closed [`Widget`] variant set and its shared draw capability
//! - Draw outcomes for recoverable faults (degraded, never aborted)
//! - Bitmap and outline typefaces, with a fixed fallback when a font is missing
//! - Glyph tile rendering and rotation used by arc text

pub mod colors;
pub mod components;
pub mod fonts;
pub mod glyph;

pub use components::{Bitmap, CurvedText, FilledRect, GlyphPlacement, LabeledValue, Line, Rect, Text};
pub use fonts::{FontRef, Fonts, Typeface};

use crate::canvas::Canvas;

/// Result of drawing one widget.
///
/// Recoverable faults (missing font metrics, an image that cannot be
/// composited) degrade the widget instead of failing the frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOutcome {
    /// Drawn as configured.
    Drawn,
    /// Drawn with a simpler representation; the reason is logged by the view.
    Degraded(String),
    /// Nothing to draw (empty value).
    Skipped,
}

impl DrawOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }
}

/// A drawable unit bound to a state key.
#[derive(Debug, Clone)]
pub enum Widget {
    Bitmap(Bitmap),
    Line(Line),
    Rect(Rect),
    FilledRect(FilledRect),
    Text(Text),
    LabeledValue(LabeledValue),
    CurvedText(CurvedText),
}

impl Widget {
    /// Paint onto `canvas`.
    ///
    /// Takes `&mut self` because animated text advances its frame index.
    pub fn draw(&mut self, canvas: &mut Canvas) -> DrawOutcome {
        match self {
            Self::Bitmap(w) => w.draw(canvas),
            Self::Line(w) => w.draw(canvas),
            Self::Rect(w) => w.draw(canvas),
            Self::FilledRect(w) => w.draw(canvas),
            Self::Text(w) => w.draw(canvas),
            Self::LabeledValue(w) => w.draw(canvas),
            Self::CurvedText(w) => w.draw(canvas),
        }
    }

    /// Whether this widget holds a textual value.
    pub fn carries_value(&self) -> bool {
        matches!(self, Self::Text(_) | Self::LabeledValue(_) | Self::CurvedText(_))
    }

    /// Current textual value, `None` for shapes and for text without a value.
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Text(w) => w.value(),
            Self::LabeledValue(w) => Some(w.value()),
            Self::CurvedText(w) => Some(w.value()),
            _ => None,
        }
    }

    /// Assign a textual value.
    ///
    /// Returns `Some(changed)` for widgets that carry a value and `None` for
    /// shapes, which ignore the assignment.
    pub fn set_value(&mut self, value: &str) -> Option<bool> {
        match self {
            Self::Text(w) => Some(w.set_value(Some(value.to_owned()))),
            Self::LabeledValue(w) => Some(w.set_value(value.to_owned())),
            Self::CurvedText(w) => Some(w.set_value(value.to_owned())),
            _ => None,
        }
    }

    /// Remove the textual value (empty for widgets that always hold one).
    pub fn clear_value(&mut self) -> Option<bool> {
        match self {
            Self::Text(w) => Some(w.set_value(None)),
            Self::LabeledValue(w) => Some(w.set_value(String::new())),
            Self::CurvedText(w) => Some(w.set_value(String::new())),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Self::Text(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut Text> {
        match self {
            Self::Text(w) => Some(w),
            _ => None,
        }
    }
}

impl From<Bitmap> for Widget {
    fn from(w: Bitmap) -> Self {
        Self::Bitmap(w)
    }
}

impl From<Line> for Widget {
    fn from(w: Line) -> Self {
        Self::Line(w)
    }
}

impl From<Rect> for Widget {
    fn from(w: Rect) -> Self {
        Self::Rect(w)
    }
}

impl From<FilledRect> for Widget {
    fn from(w: FilledRect) -> Self {
        Self::FilledRect(w)
    }
}

impl From<Text> for Widget {
    fn from(w: Text) -> Self {
        Self::Text(w)
    }
}

impl From<LabeledValue> for Widget {
    fn from(w: LabeledValue) -> Self {
        Self::LabeledValue(w)
    }
}

impl From<CurvedText> for Widget {
    fn from(w: CurvedText) -> Self {
        Self::CurvedText(w)
    }
}
