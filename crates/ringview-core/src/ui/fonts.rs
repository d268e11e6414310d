//! Typefaces, glyph metrics and rasterization.
//!
//! Widgets hold a [`FontRef`]. A typeface is either an embedded-graphics
//! bitmap font or an outline font rendered with `rusttype`. Bitmap fonts only
//! cover their glyph table (usually ASCII) and draw `?` for anything else;
//! the bundled DejaVu Sans Mono covers every face, bar and heartbeat glyph the
//! view uses.
//!
//! A `None` font means "no metrics available": measurement falls back to a
//! fixed per-character box and drawing uses the built-in 6x10 font, so a
//! missing font degrades a widget instead of aborting the frame.

use std::convert::Infallible;
use std::sync::OnceLock;

use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_6X13_BOLD, FONT_7X13_BOLD};
use embedded_graphics::mono_font::mapping::GlyphMapping;
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text as EgText};
use rusttype::{Font, GlyphId, Scale, point};

static DEJAVU_MONO_TTF: &[u8] = include_bytes!("../../assets/fonts/DejaVuSansMono.ttf");
static DEJAVU_MONO_BOLD_TTF: &[u8] = include_bytes!("../../assets/fonts/DejaVuSansMono-Bold.ttf");

static DEJAVU_MONO: OnceLock<Option<Font<'static>>> = OnceLock::new();
static DEJAVU_MONO_BOLD: OnceLock<Option<Font<'static>>> = OnceLock::new();

/// Bundled DejaVu Sans Mono, `None` if it fails to parse.
pub fn dejavu_mono() -> Option<&'static Font<'static>> {
    DEJAVU_MONO
        .get_or_init(|| Font::try_from_bytes(DEJAVU_MONO_TTF))
        .as_ref()
}

/// Bundled DejaVu Sans Mono Bold, `None` if it fails to parse.
pub fn dejavu_mono_bold() -> Option<&'static Font<'static>> {
    DEJAVU_MONO_BOLD
        .get_or_init(|| Font::try_from_bytes(DEJAVU_MONO_BOLD_TTF))
        .as_ref()
}

/// A font the canvas can rasterize.
#[derive(Clone, Copy)]
pub enum Typeface {
    /// Bitmap font; limited to its glyph table.
    Mono(&'static MonoFont<'static>),
    /// Outline font at a pixel size, anti-aliased.
    Outline(&'static Font<'static>, f32),
}

impl core::fmt::Debug for Typeface {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Mono(font) => write!(f, "Mono({:?})", font.character_size),
            Self::Outline(_, px) => write!(f, "Outline({px}px)"),
        }
    }
}

/// Optional reference to a typeface.
pub type FontRef = Option<Typeface>;

/// Advance used when no font metrics are available.
pub const FALLBACK_ADVANCE_PX: u32 = 6;

/// Glyph box used when no font metrics are available.
pub const FALLBACK_GLYPH_SIZE: Size = Size::new(6, 12);

/// Horizontal advance and bounding box of a single glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphMetrics {
    pub advance: u32,
    pub size: Size,
}

fn outline_line_height(font: &Font<'_>, px: f32) -> u32 {
    let v = font.v_metrics(Scale::uniform(px));
    (v.ascent - v.descent).ceil().max(1.0) as u32
}

/// Measure one character.
pub fn glyph_metrics(font: FontRef, ch: char) -> GlyphMetrics {
    match font {
        Some(Typeface::Mono(font)) => GlyphMetrics {
            advance: font.character_size.width + font.character_spacing,
            size: font.character_size,
        },
        Some(Typeface::Outline(font, px)) => {
            let advance = font
                .glyph(ch)
                .scaled(Scale::uniform(px))
                .h_metrics()
                .advance_width
                .round()
                .max(0.0) as u32;
            GlyphMetrics {
                advance,
                size: Size::new(advance.max(1), outline_line_height(font, px)),
            }
        }
        None => GlyphMetrics {
            advance: FALLBACK_ADVANCE_PX,
            size: FALLBACK_GLYPH_SIZE,
        },
    }
}

/// Total advance width of a single-line string.
pub fn text_width(font: FontRef, text: &str) -> u32 {
    text.chars().map(|ch| glyph_metrics(font, ch).advance).sum()
}

/// Height of one line of text.
pub fn line_height(font: FontRef) -> u32 {
    match font {
        Some(Typeface::Mono(f)) => f.character_size.height,
        Some(Typeface::Outline(f, px)) => outline_line_height(f, px),
        None => FALLBACK_GLYPH_SIZE.height,
    }
}

/// Typeface actually used for rasterizing.
pub fn render_font(font: FontRef) -> Typeface {
    font.unwrap_or(Typeface::Mono(&FONT_6X10))
}

/// Whether the rasterizing typeface has a real glyph for `ch`.
pub fn has_glyph(font: FontRef, ch: char) -> bool {
    match render_font(font) {
        // Unmapped characters share the replacement glyph's index.
        Typeface::Mono(f) => ch == '?' || f.glyph_mapping.index(ch) != f.glyph_mapping.index('?'),
        Typeface::Outline(f, _) => f.glyph(ch).id() != GlyphId(0),
    }
}

/// Characters of `text` the font cannot draw, in order of first use.
pub fn missing_glyphs(font: FontRef, text: &str) -> Vec<char> {
    let mut missing = Vec::new();
    for ch in text.chars() {
        if ch != '\n' && !missing.contains(&ch) && !has_glyph(font, ch) {
            missing.push(ch);
        }
    }
    missing
}

/// Why drawing `text` in `font` will not be faithful, if it will not be.
pub fn draw_issue(font: FontRef, text: &str) -> Option<String> {
    let missing = missing_glyphs(font, text);
    let mut reasons = Vec::new();
    if font.is_none() {
        reasons.push("no font metrics, using fallback font".to_owned());
    }
    if !missing.is_empty() {
        let list: Vec<String> = missing.iter().map(|c| format!("{c:?}")).collect();
        reasons.push(format!("no glyph for {}", list.join(", ")));
    }
    (!reasons.is_empty()).then(|| reasons.join("; "))
}

/// Adapter feeding bitmap font pixels into a coverage callback.
struct Plotter<F> {
    plot: F,
}

impl<F> OriginDimensions for Plotter<F> {
    fn size(&self) -> Size {
        Size::new(i32::MAX as u32, i32::MAX as u32)
    }
}

impl<F: FnMut(i32, i32, f32)> DrawTarget for Plotter<F> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            if c.is_on() {
                (self.plot)(p.x, p.y, 1.0);
            }
        }
        Ok(())
    }
}

/// Rasterize `text` with its top-left corner at `origin`.
///
/// `plot(x, y, coverage)` is called for every touched pixel, coverage in
/// `0.0..=1.0`. Embedded newlines start a new line below the previous one.
pub fn rasterize(font: FontRef, text: &str, origin: Point, mut plot: impl FnMut(i32, i32, f32)) {
    match render_font(font) {
        Typeface::Mono(f) => {
            let style = MonoTextStyle::new(f, BinaryColor::On);
            let mut target = Plotter { plot };
            let Ok(_) = EgText::with_baseline(text, origin, style, Baseline::Top).draw(&mut target);
        }
        Typeface::Outline(f, px) => {
            let scale = Scale::uniform(px);
            let ascent = f.v_metrics(scale).ascent;
            let line_height = outline_line_height(f, px) as f32;

            for (i, line) in text.split('\n').enumerate() {
                let baseline = point(origin.x as f32, origin.y as f32 + i as f32 * line_height + ascent);
                for glyph in f.layout(line, scale, baseline) {
                    let Some(bb) = glyph.pixel_bounding_box() else {
                        continue;
                    };
                    glyph.draw(|gx, gy, v| plot(bb.min.x + gx as i32, bb.min.y + gy as i32, v));
                }
            }
        }
    }
}

fn outline_or(font: Option<&'static Font<'static>>, px: f32, fallback: &'static MonoFont<'static>) -> FontRef {
    Some(font.map_or(Typeface::Mono(fallback), |f| Typeface::Outline(f, px)))
}

/// The set of fonts a panel layout uses.
#[derive(Debug, Clone, Copy)]
pub struct Fonts {
    pub bold: FontRef,
    pub bold_small: FontRef,
    pub medium: FontRef,
    pub huge: FontRef,
    pub small: FontRef,
}

impl Fonts {
    /// Preset for the 240x240 round panel: DejaVu Sans Mono at 10/9/10/25/9px.
    ///
    /// Falls back to bitmap fonts of similar size if the bundled font cannot
    /// be parsed.
    pub fn round_display() -> Self {
        let regular = dejavu_mono();
        let bold = dejavu_mono_bold();
        Self {
            bold: outline_or(bold, 10.0, &FONT_7X13_BOLD),
            bold_small: outline_or(bold, 9.0, &FONT_6X13_BOLD),
            medium: outline_or(regular, 10.0, &profont::PROFONT_10_POINT),
            huge: outline_or(regular, 25.0, &profont::PROFONT_24_POINT),
            small: outline_or(regular, 9.0, &profont::PROFONT_9_POINT),
        }
    }
}

impl Default for Fonts {
    fn default() -> Self {
        Self::round_display()
    }
}
