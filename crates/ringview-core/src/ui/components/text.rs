// src/ui/components/text.rs
//! Text component with optional still image or animated frame sequence.
//!
//! The face widget is a [`Text`]: its textual value is what sinks without
//! image support would show, while an installed image (or frame sequence)
//! takes precedence when drawing onto the canvas.

use std::sync::Arc;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use image::RgbaImage;

use crate::canvas::Canvas;
use crate::faces::Frames;
use crate::ui::DrawOutcome;
use crate::ui::colors::DEFAULT_FOREGROUND;
use crate::ui::fonts::{self, FontRef};

/// Text widget anchored at its top-left corner.
///
/// # Animation
///
/// When a frame sequence with more than one frame is installed, every call to
/// [`Text::draw`] shows the current frame and then advances the index modulo
/// the sequence length. Installing a new sequence restarts it from frame 0.
/// A still image (single frame, or [`Text::set_image`]) never advances.
///
/// # Examples
/// ```ignore
/// let face = Text::new(Some("(◕‿‿◕)".into()), Point::new(40, 40), fonts.huge)
///     .with_color(colors::WHITE);
/// ```
#[derive(Debug, Clone)]
pub struct Text {
    position: Point,
    color: Rgb888,
    value: Option<String>,
    font: FontRef,
    wrap: Option<usize>,
    image: Option<Arc<RgbaImage>>,
    frames: Option<Frames>,
    frame_index: usize,
}

impl Text {
    pub fn new(value: Option<String>, position: Point, font: FontRef) -> Self {
        Self {
            position,
            color: DEFAULT_FOREGROUND,
            value,
            font,
            wrap: None,
            image: None,
            frames: None,
            frame_index: 0,
        }
    }

    pub fn with_color(mut self, color: Rgb888) -> Self {
        self.color = color;
        self
    }

    /// Wrap the value to lines of at most `max_chars` characters.
    pub fn with_wrap(mut self, max_chars: usize) -> Self {
        self.wrap = (max_chars > 0).then_some(max_chars);
        self
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Replace the textual value, returning whether it changed.
    pub fn set_value(&mut self, value: Option<String>) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        true
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Install a still image, dropping any frame sequence.
    pub fn set_image(&mut self, image: Option<Arc<RgbaImage>>) {
        self.frames = None;
        self.frame_index = 0;
        self.image = image;
    }

    /// Install a frame sequence and restart it at frame 0.
    ///
    /// An empty sequence removes every image so the text is drawn again.
    pub fn set_frames(&mut self, frames: Frames) {
        self.frame_index = 0;
        self.image = frames.first().cloned();
        self.frames = (!frames.is_empty()).then_some(frames);
    }

    /// Drop the image and frame sequence.
    pub fn clear_image(&mut self) {
        self.set_image(None);
    }

    /// Currently installed frame sequence, if any.
    pub fn frames(&self) -> Option<&Frames> {
        self.frames.as_ref()
    }

    /// Image that the next draw would fall back to when not animating.
    pub fn image(&self) -> Option<&Arc<RgbaImage>> {
        self.image.as_ref()
    }

    /// Index of the frame the next draw will show.
    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    pub fn draw(&mut self, canvas: &mut Canvas) -> DrawOutcome {
        if let Some(frames) = self.frames.as_ref().filter(|f| f.len() > 1) {
            self.image = Some(Arc::clone(&frames[self.frame_index]));
            self.frame_index = (self.frame_index + 1) % frames.len();
        }

        let mut degraded = None;
        if let Some(image) = &self.image {
            match canvas.paste_rgba(image, self.position) {
                Ok(()) => return DrawOutcome::Drawn,
                Err(e) => degraded = Some(format!("image composite failed, using text: {e}")),
            }
        }

        let Some(value) = self.value.as_deref() else {
            return degraded.map_or(DrawOutcome::Skipped, DrawOutcome::Degraded);
        };

        match self.wrap {
            Some(width) => canvas.text(self.position, &wrap_text(value, width), self.font, self.color),
            None => canvas.text(self.position, value, self.font, self.color),
        }

        if let Some(issue) = fonts::draw_issue(self.font, value) {
            degraded.get_or_insert(issue);
        }
        degraded.map_or(DrawOutcome::Drawn, DrawOutcome::Degraded)
    }
}

/// Greedy word wrap to lines of at most `width` characters.
///
/// Existing newlines are kept; words longer than `width` are split.
pub fn wrap_text(text: &str, width: usize) -> String {
    let width = width.max(1);
    let mut lines: Vec<String> = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_len = 0usize;

        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();

            while word.len() > width {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }

            let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
            if needed > width && current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current_len += word.len();
            current.extend(word);
        }

        if current_len > 0 || paragraph.trim().is_empty() {
            lines.push(current);
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(color: [u8; 4]) -> Arc<RgbaImage> {
        Arc::new(RgbaImage::from_pixel(2, 2, Rgba(color)))
    }

    fn sequence(n: usize) -> Frames {
        (0..n)
            .map(|i| solid([i as u8 * 10 + 10, 0, 0, 255]))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn test_animation_wraps_after_n_draws() {
        let frames = sequence(3);
        let mut text = Text::new(Some("x".into()), Point::zero(), None);
        text.set_frames(frames.clone());
        let mut canvas = Canvas::new(4, 4).unwrap();

        for i in 0..3 {
            text.draw(&mut canvas);
            assert!(Arc::ptr_eq(text.image().unwrap(), &frames[i]));
        }
        // (N+1)-th draw is back on frame 0
        text.draw(&mut canvas);
        assert!(Arc::ptr_eq(text.image().unwrap(), &frames[0]));
        assert_eq!(canvas.pixel(0, 0), Some(Rgb888::new(10, 0, 0)));
    }

    #[test]
    fn test_new_sequence_resets_index() {
        let mut text = Text::new(None, Point::zero(), None);
        let mut canvas = Canvas::new(4, 4).unwrap();
        text.set_frames(sequence(4));
        text.draw(&mut canvas);
        text.draw(&mut canvas);
        assert_eq!(text.frame_index(), 2);

        let replacement = sequence(2);
        text.set_frames(replacement.clone());
        assert_eq!(text.frame_index(), 0);
        assert!(Arc::ptr_eq(text.image().unwrap(), &replacement[0]));
    }

    #[test]
    fn test_still_image_never_advances() {
        let mut text = Text::new(None, Point::zero(), None);
        let mut canvas = Canvas::new(4, 4).unwrap();
        text.set_frames(sequence(1));
        text.draw(&mut canvas);
        text.draw(&mut canvas);
        assert_eq!(text.frame_index(), 0);

        text.set_image(Some(solid([1, 2, 3, 255])));
        assert!(text.frames().is_none());
        assert_eq!(text.draw(&mut canvas), DrawOutcome::Drawn);
        assert_eq!(canvas.pixel(1, 1), Some(Rgb888::new(1, 2, 3)));
    }

    #[test]
    fn test_empty_image_falls_back_to_text() {
        let mut text = Text::new(Some("A".into()), Point::zero(), None);
        text.set_image(Some(Arc::new(RgbaImage::new(0, 0))));
        let mut canvas = Canvas::new(20, 20).unwrap();

        assert!(matches!(text.draw(&mut canvas), DrawOutcome::Degraded(_)));
        assert!(canvas.as_image().pixels().any(|p| p[0] > 0));
    }

    #[test]
    fn test_unmapped_face_glyphs_degrade() {
        let mono = Some(fonts::Typeface::Mono(&embedded_graphics::mono_font::ascii::FONT_6X10));
        let mut text = Text::new(Some("(⇀‿‿↼)".into()), Point::zero(), mono);
        let mut canvas = Canvas::new(60, 20).unwrap();
        match text.draw(&mut canvas) {
            DrawOutcome::Degraded(reason) => assert!(reason.contains('⇀'), "{reason}"),
            other => panic!("expected degraded draw, got {other:?}"),
        }
    }

    #[test]
    fn test_face_draws_with_round_display_font() {
        let font = crate::ui::Fonts::round_display().huge;
        let mut text = Text::new(Some("(⇀‿‿↼)".into()), Point::zero(), font);
        let mut canvas = Canvas::new(120, 40).unwrap();
        assert_eq!(text.draw(&mut canvas), DrawOutcome::Drawn);
        assert!(canvas.as_image().pixels().any(|p| p[0] > 0));
    }

    #[test]
    fn test_no_value_no_image_is_skipped() {
        let mut text = Text::new(None, Point::zero(), None);
        let mut canvas = Canvas::new(4, 4).unwrap();
        assert_eq!(text.draw(&mut canvas), DrawOutcome::Skipped);
    }

    #[test]
    fn test_set_value_reports_change() {
        let mut text = Text::new(Some("a".into()), Point::zero(), None);
        assert!(!text.set_value(Some("a".into())));
        assert!(text.set_value(Some("b".into())));
        assert!(text.set_value(None));
        assert_eq!(text.value(), None);
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("the quick brown fox", 10), "the quick\nbrown fox");
        assert_eq!(wrap_text("abcdefghij", 4), "abcd\nefgh\nij");
        assert_eq!(wrap_text("one\ntwo three", 20), "one\ntwo three");
    }
}
