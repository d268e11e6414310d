// src/ui/components/labeled.rs
//! Label + value pair drawn on one line.

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;

use crate::canvas::Canvas;
use crate::ui::DrawOutcome;
use crate::ui::colors::DEFAULT_FOREGROUND;
use crate::ui::fonts::{self, FontRef};

/// Horizontal pixels reserved per label character.
const LABEL_CHAR_PX: i32 = 5;

/// A `LABEL value` pair, e.g. `CH 06`.
///
/// Without a label only the value is drawn, in the label font.
#[derive(Debug, Clone)]
pub struct LabeledValue {
    position: Point,
    color: Rgb888,
    label: Option<String>,
    value: String,
    label_font: FontRef,
    text_font: FontRef,
    spacing: i32,
}

impl LabeledValue {
    pub fn new(
        label: Option<String>,
        value: impl Into<String>,
        position: Point,
        label_font: FontRef,
        text_font: FontRef,
    ) -> Self {
        Self {
            position,
            color: DEFAULT_FOREGROUND,
            label,
            value: value.into(),
            label_font,
            text_font,
            spacing: 5,
        }
    }

    pub fn with_color(mut self, color: Rgb888) -> Self {
        self.color = color;
        self
    }

    pub fn with_spacing(mut self, spacing: i32) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace the value, returning whether it changed.
    pub fn set_value(&mut self, value: String) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        true
    }

    /// Where the value starts, given the current label.
    pub fn value_position(&self) -> Point {
        match &self.label {
            Some(label) => {
                let offset = self.spacing + LABEL_CHAR_PX * label.chars().count() as i32;
                self.position + Point::new(offset, 0)
            }
            None => self.position,
        }
    }

    pub fn draw(&self, canvas: &mut Canvas) -> DrawOutcome {
        match &self.label {
            None => canvas.text(self.position, &self.value, self.label_font, self.color),
            Some(label) => {
                canvas.text(self.position, label, self.label_font, self.color);
                canvas.text(self.value_position(), &self.value, self.text_font, self.color);
            }
        }

        let issue = match &self.label {
            None => fonts::draw_issue(self.label_font, &self.value),
            Some(label) => fonts::draw_issue(self.label_font, label)
                .or_else(|| fonts::draw_issue(self.text_font, &self.value)),
        };
        issue.map_or(DrawOutcome::Drawn, DrawOutcome::Degraded)
    }
}
