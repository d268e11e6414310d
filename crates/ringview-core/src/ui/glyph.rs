//! Single-glyph tiles and arbitrary-angle rotation.
//!
//! Arc text is drawn one character at a time: each character is rasterized
//! onto a small transparent tile, the tile is rotated so the baseline is
//! tangent to the circle, then the rotated tile is alpha-composited onto the
//! canvas.

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use image::{Rgba, RgbaImage};

use crate::ui::fonts::{self, FontRef};

/// Transparent margin added around each glyph tile (split evenly per side).
pub const TILE_PADDING_PX: u32 = 20;

/// Rasterize `ch` onto a transparent tile sized to its box plus padding.
///
/// Glyph coverage becomes the tile's alpha channel.
pub fn render_glyph(ch: char, font: FontRef, color: Rgb888) -> RgbaImage {
    let metrics = fonts::glyph_metrics(font, ch);
    let mut tile = RgbaImage::new(
        metrics.size.width + TILE_PADDING_PX,
        metrics.size.height + TILE_PADDING_PX,
    );

    let origin = Point::new((TILE_PADDING_PX / 2) as i32, (TILE_PADDING_PX / 2) as i32);
    let mut buf = [0u8; 4];
    let (w, h) = tile.dimensions();
    fonts::rasterize(font, ch.encode_utf8(&mut buf), origin, |x, y, coverage| {
        if x < 0 || y < 0 || x as u32 >= w || y as u32 >= h {
            return;
        }
        let alpha = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
        let px = tile.get_pixel_mut(x as u32, y as u32);
        if alpha > px[3] {
            *px = Rgba([color.r(), color.g(), color.b(), alpha]);
        }
    });

    tile
}

/// Rotate `src` clockwise by `degrees`, expanding the output so nothing is cut.
///
/// Uses bilinear sampling with alpha weighting; uncovered output pixels stay
/// fully transparent.
pub fn rotate_expand(src: &RgbaImage, degrees: f32) -> RgbaImage {
    let (w, h) = src.dimensions();
    if w == 0 || h == 0 {
        return RgbaImage::new(0, 0);
    }

    let (sin, cos) = degrees.to_radians().sin_cos();
    // Snap tiny float noise so axis-aligned rotations keep exact sizes.
    let snap = |v: f32| if v.abs() < 1e-4 { 0.0 } else { v };
    let (sin, cos) = (snap(sin), snap(cos));

    let out_w = (w as f32 * cos.abs() + h as f32 * sin.abs()).round().max(1.0) as u32;
    let out_h = (w as f32 * sin.abs() + h as f32 * cos.abs()).round().max(1.0) as u32;
    let mut out = RgbaImage::new(out_w, out_h);

    let (src_cx, src_cy) = (w as f32 / 2.0, h as f32 / 2.0);
    let (dst_cx, dst_cy) = (out_w as f32 / 2.0, out_h as f32 / 2.0);

    for (x, y, px) in out.enumerate_pixels_mut() {
        let dx = x as f32 + 0.5 - dst_cx;
        let dy = y as f32 + 0.5 - dst_cy;
        // Inverse of the clockwise rotation in y-down screen space.
        let sx = dx * cos + dy * sin + src_cx - 0.5;
        let sy = -dx * sin + dy * cos + src_cy - 0.5;
        *px = sample_bilinear(src, sx, sy);
    }
    out
}

fn sample_bilinear(src: &RgbaImage, sx: f32, sy: f32) -> Rgba<u8> {
    let x0 = sx.floor();
    let y0 = sy.floor();
    let fx = sx - x0;
    let fy = sy - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let mut acc = [0.0f32; 3];
    let mut alpha = 0.0f32;

    for (ox, oy, weight) in [
        (0, 0, (1.0 - fx) * (1.0 - fy)),
        (1, 0, fx * (1.0 - fy)),
        (0, 1, (1.0 - fx) * fy),
        (1, 1, fx * fy),
    ] {
        if weight <= 0.0 {
            continue;
        }
        let (px, py) = (x0 + ox, y0 + oy);
        if px < 0 || py < 0 || px >= src.width() as i64 || py >= src.height() as i64 {
            continue;
        }
        let p = src.get_pixel(px as u32, py as u32);
        let a = p[3] as f32 / 255.0 * weight;
        for c in 0..3 {
            acc[c] += p[c] as f32 * a;
        }
        alpha += a;
    }

    if alpha <= f32::EPSILON {
        return Rgba([0, 0, 0, 0]);
    }
    Rgba([
        (acc[0] / alpha).round().clamp(0.0, 255.0) as u8,
        (acc[1] / alpha).round().clamp(0.0, 255.0) as u8,
        (acc[2] / alpha).round().clamp(0.0, 255.0) as u8,
        (alpha * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyph_tile_size_includes_padding() {
        let tile = render_glyph('A', None, Rgb888::WHITE);
        assert_eq!(tile.dimensions(), (6 + TILE_PADDING_PX, 12 + TILE_PADDING_PX));
        assert!(tile.pixels().any(|p| p[3] == 255));
    }

    #[test]
    fn test_outline_glyph_tile_has_coverage() {
        let font = crate::ui::Fonts::round_display().bold;
        let tile = render_glyph('‿', font, Rgb888::WHITE);
        let m = fonts::glyph_metrics(font, '‿');
        assert_eq!(tile.dimensions(), (m.size.width + TILE_PADDING_PX, m.size.height + TILE_PADDING_PX));
        assert!(tile.pixels().any(|p| p[3] > 0));
    }

    #[test]
    fn test_space_glyph_is_transparent() {
        let tile = render_glyph(' ', None, Rgb888::WHITE);
        assert!(tile.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_rotate_quarter_turn_swaps_dimensions() {
        let src = RgbaImage::new(10, 4);
        let out = rotate_expand(&src, 90.0);
        assert_eq!(out.dimensions(), (4, 10));
    }

    #[test]
    fn test_rotate_zero_keeps_pixels() {
        let mut src = RgbaImage::new(3, 3);
        src.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        let out = rotate_expand(&src, 0.0);
        assert_eq!(out.dimensions(), (3, 3));
        assert_eq!(out.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(out.get_pixel(2, 2)[3], 0);
    }

    #[test]
    fn test_rotate_quarter_turn_is_clockwise() {
        // A pixel in the top-left corner ends up in the top-right corner.
        let mut src = RgbaImage::new(4, 4);
        src.put_pixel(0, 0, Rgba([0, 255, 0, 255]));
        let out = rotate_expand(&src, 90.0);
        assert_eq!(out.get_pixel(3, 0), &Rgba([0, 255, 0, 255]));
        assert_eq!(out.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_rotate_diagonal_expands() {
        let src = RgbaImage::new(10, 10);
        let out = rotate_expand(&src, 45.0);
        assert_eq!(out.dimensions(), (14, 14));
    }
}
