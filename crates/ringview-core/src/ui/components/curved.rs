// src/ui/components/curved.rs
//! Text laid out along a circular arc.
//!
//! Used for every counter around the rim of the round panel. Layout is split
//! from drawing: [`layout_arc`] is a pure function producing one
//! [`GlyphPlacement`] per character, and [`CurvedText::draw`] rasterizes,
//! rotates and composites each placement.
//!
//! # Angles
//!
//! Degrees, 0 pointing right, increasing clockwise (90 is the bottom of the
//! circle, 270 the top). Normal text runs clockwise with glyph bottoms toward
//! the center, which reads correctly along the top half. Flipped text runs
//! counter-clockwise with glyph tops toward the center, for the bottom half.

use core::f32::consts::PI;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;

use crate::canvas::Canvas;
use crate::ui::DrawOutcome;
use crate::ui::colors::DEFAULT_FOREGROUND;
use crate::ui::fonts::{self, FontRef};
use crate::ui::glyph;

/// Where a single character lands on the arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphPlacement {
    pub ch: char,
    /// Angle of the glyph center on the circle, in degrees.
    pub angle: f32,
    /// Glyph center in canvas coordinates.
    pub x: f32,
    pub y: f32,
    /// Clockwise tile rotation in degrees.
    pub rotation: f32,
}

/// Convert an arc length in pixels to degrees at `radius`.
#[inline]
fn arc_degrees(length: f32, radius: f32) -> f32 {
    (length / radius) * (180.0 / PI)
}

/// Lay out `text` along the circle, centered on `start_angle`.
///
/// Newlines become spaces and surrounding whitespace is trimmed; an empty
/// result (or a zero radius) produces no placements. Each glyph sits at the
/// middle of its own angular span, so a single character lands exactly on
/// `start_angle`.
pub fn layout_arc(
    text: &str,
    font: FontRef,
    center: Point,
    radius: u32,
    start_angle: f32,
    flip: bool,
) -> Vec<GlyphPlacement> {
    let text = text.replace('\n', " ");
    let text = text.trim();
    if text.is_empty() || radius == 0 {
        return Vec::new();
    }

    let r = radius as f32;
    let direction = if flip { -1.0 } else { 1.0 };
    let span = arc_degrees(fonts::text_width(font, text) as f32, r);
    let mut current = start_angle - direction * (span / 2.0);

    text.chars()
        .map(|ch| {
            let char_span = arc_degrees(fonts::glyph_metrics(font, ch).advance as f32, r);
            let angle = current + direction * (char_span / 2.0);
            current += direction * char_span;

            let rad = angle.to_radians();
            GlyphPlacement {
                ch,
                angle,
                x: center.x as f32 + r * rad.cos(),
                y: center.y as f32 + r * rad.sin(),
                rotation: angle + if flip { -90.0 } else { 90.0 },
            }
        })
        .collect()
}

/// Text drawn along an arc around `center`.
#[derive(Debug, Clone)]
pub struct CurvedText {
    value: String,
    center: Point,
    radius: u32,
    start_angle: f32,
    font: FontRef,
    color: Rgb888,
    flip: bool,
}

impl CurvedText {
    pub fn new(value: impl Into<String>, center: Point, radius: u32, start_angle: f32, font: FontRef) -> Self {
        Self {
            value: value.into(),
            center,
            radius,
            start_angle,
            font,
            color: DEFAULT_FOREGROUND,
            flip: false,
        }
    }

    pub fn with_color(mut self, color: Rgb888) -> Self {
        self.color = color;
        self
    }

    /// Run counter-clockwise with glyph tops toward the center.
    pub fn flipped(mut self) -> Self {
        self.flip = true;
        self
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

    pub fn layout(&self) -> Vec<GlyphPlacement> {
        layout_arc(&self.value, self.font, self.center, self.radius, self.start_angle, self.flip)
    }

    pub fn draw(&self, canvas: &mut Canvas) -> DrawOutcome {
        let placements = self.layout();
        if placements.is_empty() {
            return DrawOutcome::Skipped;
        }

        for p in &placements {
            if p.ch.is_whitespace() {
                continue;
            }
            let tile = glyph::render_glyph(p.ch, self.font, self.color);
            let rotated = glyph::rotate_expand(&tile, p.rotation);

            let top_left = Point::new(
                (p.x - rotated.width() as f32 / 2.0) as i32,
                (p.y - rotated.height() as f32 / 2.0) as i32,
            );
            if !canvas.overlaps(top_left, Size::new(rotated.width(), rotated.height())) {
                continue;
            }
            // Rotated tiles are never empty; a failure here would only skip one glyph.
            canvas.paste_rgba(&rotated, top_left).ok();
        }

        fonts::draw_issue(self.font, &self.value).map_or(DrawOutcome::Drawn, DrawOutcome::Degraded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::fonts::Typeface;
    use crate::ui::Fonts;
    use embedded_graphics::mono_font::ascii::FONT_6X10;

    const MONO: FontRef = Some(Typeface::Mono(&FONT_6X10));
    const CENTER: Point = Point::new(120, 120);

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_empty_text_is_noop() {
        assert!(layout_arc("", None, CENTER, 100, 0.0, false).is_empty());
        assert!(layout_arc(" \n ", None, CENTER, 100, 0.0, false).is_empty());

        let widget = CurvedText::new("  ", CENTER, 100, 0.0, MONO);
        let mut canvas = Canvas::new(240, 240).unwrap();
        assert_eq!(widget.draw(&mut canvas), DrawOutcome::Skipped);
        assert!(canvas.as_image().pixels().all(|p| p.0 == [0, 0, 0]));
    }

    #[test]
    fn test_single_char_lands_on_start_angle() {
        for (start, flip) in [(0.0, false), (90.0, true), (225.0, false)] {
            let placements = layout_arc("A", MONO, CENTER, 100, start, flip);
            assert_eq!(placements.len(), 1);
            let p = placements[0];
            assert!(close(p.angle, start), "angle {} != {}", p.angle, start);

            let rad = (start as f32).to_radians();
            assert!(close(p.x, 120.0 + 100.0 * rad.cos()));
            assert!(close(p.y, 120.0 + 100.0 * rad.sin()));
        }
    }

    #[test]
    fn test_right_edge_position_and_rotation() {
        let p = layout_arc("A", None, CENTER, 100, 0.0, false)[0];
        assert!(close(p.x, 220.0));
        assert!(close(p.y, 120.0));
        assert!(close(p.rotation, 90.0));

        let flipped = layout_arc("A", None, CENTER, 100, 0.0, true)[0];
        assert!(close(flipped.rotation, -90.0));
    }

    #[test]
    fn test_text_is_centered_and_ordered() {
        let placements = layout_arc("abcd", None, CENTER, 100, 270.0, false);
        assert_eq!(placements.len(), 4);

        // Clockwise: angles increase, symmetric around 270.
        assert!(placements.windows(2).all(|w| w[1].angle > w[0].angle));
        let mid = (placements[1].angle + placements[2].angle) / 2.0;
        assert!(close(mid, 270.0));

        // Each step is one 6px advance at radius 100.
        let step = arc_degrees(6.0, 100.0);
        assert!(close(placements[1].angle - placements[0].angle, step));
    }

    #[test]
    fn test_flip_runs_counter_clockwise() {
        let placements = layout_arc("ab", None, CENTER, 100, 90.0, true);
        assert!(placements[1].angle < placements[0].angle);
    }

    #[test]
    fn test_newlines_are_flattened() {
        let placements = layout_arc(" a\nb ", None, CENTER, 50, 0.0, false);
        let chars: String = placements.iter().map(|p| p.ch).collect();
        assert_eq!(chars, "a b");
    }

    #[test]
    fn test_draw_paints_near_arc() {
        let widget = CurvedText::new("HI", CENTER, 100, 270.0, MONO).with_color(Rgb888::WHITE);
        let mut canvas = Canvas::new(240, 240).unwrap();
        assert_eq!(widget.draw(&mut canvas), DrawOutcome::Drawn);

        let lit: Vec<(u32, u32)> = canvas
            .as_image()
            .enumerate_pixels()
            .filter(|(_, _, p)| p[0] > 0)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!lit.is_empty());
        // Top of the circle sits at y = 20.
        assert!(lit.iter().all(|&(_, y)| (5..=35).contains(&y)));
    }

    #[test]
    fn test_missing_font_degrades() {
        let widget = CurvedText::new("x", CENTER, 100, 0.0, None);
        let mut canvas = Canvas::new(240, 240).unwrap();
        assert!(matches!(widget.draw(&mut canvas), DrawOutcome::Degraded(_)));
    }

    #[test]
    fn test_bitmap_font_without_glyphs_degrades() {
        let widget = CurvedText::new("▌▌││ bob", CENTER, 100, 270.0, MONO);
        let mut canvas = Canvas::new(240, 240).unwrap();
        match widget.draw(&mut canvas) {
            DrawOutcome::Degraded(reason) => assert!(reason.contains('▌'), "{reason}"),
            other => panic!("expected degraded draw, got {other:?}"),
        }
    }

    #[test]
    fn test_outline_font_draws_bars() {
        let font = Fonts::round_display().bold_small;
        let widget = CurvedText::new("▌▌││ bob", CENTER, 100, 270.0, font).with_color(Rgb888::WHITE);
        let mut canvas = Canvas::new(240, 240).unwrap();
        assert_eq!(widget.draw(&mut canvas), DrawOutcome::Drawn);
        assert!(canvas.as_image().pixels().any(|p| p[0] > 0));
    }

    #[test]
    fn test_fully_offscreen_glyphs_are_skipped() {
        let widget = CurvedText::new("x", Point::new(-500, -500), 10, 0.0, MONO);
        let mut canvas = Canvas::new(20, 20).unwrap();
        assert_eq!(widget.draw(&mut canvas), DrawOutcome::Drawn);
        assert!(canvas.as_image().pixels().all(|p| p.0 == [0, 0, 0]));
    }
}
