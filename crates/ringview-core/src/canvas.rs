//! RGB raster canvas that every frame is composed onto.
//!
//! A fresh [`Canvas`] is allocated for each frame by the
//! [`View`](crate::view::View). Widgets paint onto it through the
//! embedded-graphics [`DrawTarget`] implementation or the helper primitives
//! below; once drawing completes the canvas is frozen into an immutable
//! [`Frame`] and handed to the render sinks.

use std::convert::Infallible;
use std::sync::Arc;

use embedded_graphics::Drawable as EgDrawable;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Arc as EgArc, Line as EgLine, PrimitiveStyle, Rectangle};
use image::{Rgb, RgbImage, RgbaImage};

use crate::error::{CanvasError, CompositeError};
use crate::ui::fonts::{self, FontRef};

/// Finished, immutable frame handed to sinks.
pub type Frame = Arc<RgbImage>;

/// Heap-backed RGB canvas implementing `DrawTarget<Color = Rgb888>`.
///
/// Pixels outside the canvas are silently clipped, so widgets can draw
/// partially off-screen (arc text near the rim does this constantly).
pub struct Canvas {
    pixels: RgbImage,
}

impl Canvas {
    /// Allocate a black canvas of the given size.
    pub fn new(width: u32, height: u32) -> Result<Self, CanvasError> {
        let err = CanvasError { width, height };
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(3))
            .ok_or(err)?;

        let mut buf = Vec::new();
        buf.try_reserve_exact(len).map_err(|_| err)?;
        buf.resize(len, 0u8);

        let pixels = RgbImage::from_raw(width, height, buf).ok_or(err)?;
        Ok(Self { pixels })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Read back one pixel, `None` when out of bounds.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgb888> {
        if !self.contains(x, y) {
            return None;
        }
        let p = self.pixels.get_pixel(x as u32, y as u32);
        Some(Rgb888::new(p[0], p[1], p[2]))
    }

    /// Borrow the underlying image.
    pub fn as_image(&self) -> &RgbImage {
        &self.pixels
    }

    /// Freeze the canvas into a shareable frame.
    pub fn into_frame(self) -> Frame {
        Arc::new(self.pixels)
    }

    #[inline]
    fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.pixels.width() && (y as u32) < self.pixels.height()
    }

    #[inline]
    fn put(&mut self, x: i32, y: i32, color: Rgb888) {
        if self.contains(x, y) {
            self.pixels
                .put_pixel(x as u32, y as u32, Rgb([color.r(), color.g(), color.b()]));
        }
    }

    fn blend(&mut self, x: i32, y: i32, color: Rgb888, coverage: f32) {
        if coverage <= 0.0 || !self.contains(x, y) {
            return;
        }
        if coverage >= 1.0 {
            self.put(x, y, color);
            return;
        }
        let dst = self.pixels.get_pixel_mut(x as u32, y as u32);
        for (c, src) in [color.r(), color.g(), color.b()].into_iter().enumerate() {
            dst[c] = (src as f32 * coverage + dst[c] as f32 * (1.0 - coverage)).round() as u8;
        }
    }

    // ------------------------------------------------------------------
    // Primitives
    // ------------------------------------------------------------------

    /// Stroke a line between two points.
    pub fn line(&mut self, from: Point, to: Point, color: Rgb888, width: u32) {
        let Ok(()) = EgLine::new(from, to)
            .into_styled(PrimitiveStyle::with_stroke(color, width.max(1)))
            .draw(self);
    }

    /// Outline the rectangle spanning both corners (inclusive).
    pub fn rectangle(&mut self, top_left: Point, bottom_right: Point, color: Rgb888) {
        let Ok(()) = Rectangle::with_corners(top_left, bottom_right)
            .into_styled(PrimitiveStyle::with_stroke(color, 1))
            .draw(self);
    }

    /// Fill the rectangle spanning both corners (inclusive).
    pub fn filled_rectangle(&mut self, top_left: Point, bottom_right: Point, color: Rgb888) {
        let Ok(()) = Rectangle::with_corners(top_left, bottom_right)
            .into_styled(PrimitiveStyle::with_fill(color))
            .draw(self);
    }

    /// Draw text with its top-left corner at `position`.
    ///
    /// Embedded newlines start a new line below the previous one. Outline
    /// fonts are blended by glyph coverage.
    pub fn text(&mut self, position: Point, text: &str, font: FontRef, color: Rgb888) {
        fonts::rasterize(font, text, position, |x, y, coverage| self.blend(x, y, color, coverage));
    }

    /// Stroke an arc around `center`.
    ///
    /// Angles are in degrees, 0 pointing right.
    pub fn arc(
        &mut self,
        center: Point,
        diameter: u32,
        start_deg: f32,
        sweep_deg: f32,
        color: Rgb888,
        width: u32,
    ) {
        let Ok(()) = EgArc::with_center(center, diameter, start_deg.deg(), sweep_deg.deg())
            .into_styled(PrimitiveStyle::with_stroke(color, width.max(1)))
            .draw(self);
    }

    /// Alpha-composite an RGBA image with its top-left corner at `top_left`.
    ///
    /// Parts of the image that fall outside the canvas are clipped.
    pub fn paste_rgba(&mut self, image: &RgbaImage, top_left: Point) -> Result<(), CompositeError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(CompositeError::EmptyImage);
        }

        for (x, y, src) in image.enumerate_pixels() {
            let alpha = src[3] as u32;
            if alpha == 0 {
                continue;
            }
            let cx = top_left.x + x as i32;
            let cy = top_left.y + y as i32;
            if !self.contains(cx, cy) {
                continue;
            }

            let dst = self.pixels.get_pixel_mut(cx as u32, cy as u32);
            if alpha == 255 {
                *dst = Rgb([src[0], src[1], src[2]]);
            } else {
                for c in 0..3 {
                    let blended = (src[c] as u32 * alpha + dst[c] as u32 * (255 - alpha) + 127) / 255;
                    dst[c] = blended as u8;
                }
            }
        }
        Ok(())
    }

    /// Copy an opaque image onto the canvas, clipped to its bounds.
    pub fn paste_rgb(&mut self, image: &RgbImage, top_left: Point) {
        for (x, y, src) in image.enumerate_pixels() {
            let cx = top_left.x + x as i32;
            let cy = top_left.y + y as i32;
            if self.contains(cx, cy) {
                self.pixels.put_pixel(cx as u32, cy as u32, *src);
            }
        }
    }

    /// Whether an image of `size` placed at `top_left` touches the canvas at all.
    pub fn overlaps(&self, top_left: Point, size: Size) -> bool {
        top_left.x + (size.width as i32) > 0
            && top_left.y + (size.height as i32) > 0
            && top_left.x < self.width() as i32
            && top_left.y < self.height() as i32
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.pixels.width(), self.pixels.height())
    }
}

impl DrawTarget for Canvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            self.put(coord.x, coord.y, color);
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };

        let rgb = Rgb([color.r(), color.g(), color.b()]);
        for y in area.top_left.y..=bottom_right.y {
            for x in area.top_left.x..=bottom_right.x {
                self.pixels.put_pixel(x as u32, y as u32, rgb);
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let rgb = Rgb([color.r(), color.g(), color.b()]);
        for px in self.pixels.pixels_mut() {
            *px = rgb;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faces::Face;
    use image::Rgba;

    #[test]
    fn test_new_canvas_is_black() {
        let canvas = Canvas::new(4, 3).unwrap();
        assert_eq!(canvas.width(), 4);
        assert_eq!(canvas.height(), 3);
        assert_eq!(canvas.pixel(3, 2), Some(Rgb888::BLACK));
        assert_eq!(canvas.pixel(4, 0), None);
    }

    #[test]
    fn test_filled_rectangle_is_inclusive_and_clipped() {
        let mut canvas = Canvas::new(10, 10).unwrap();
        canvas.filled_rectangle(Point::new(8, 8), Point::new(20, 20), Rgb888::RED);

        assert_eq!(canvas.pixel(8, 8), Some(Rgb888::RED));
        assert_eq!(canvas.pixel(9, 9), Some(Rgb888::RED));
        assert_eq!(canvas.pixel(7, 7), Some(Rgb888::BLACK));
    }

    #[test]
    fn test_line_draws_endpoints() {
        let mut canvas = Canvas::new(10, 10).unwrap();
        canvas.line(Point::new(0, 5), Point::new(9, 5), Rgb888::WHITE, 1);

        assert_eq!(canvas.pixel(0, 5), Some(Rgb888::WHITE));
        assert_eq!(canvas.pixel(9, 5), Some(Rgb888::WHITE));
        assert_eq!(canvas.pixel(5, 4), Some(Rgb888::BLACK));
    }

    #[test]
    fn test_rectangle_outline_leaves_inside_untouched() {
        let mut canvas = Canvas::new(10, 10).unwrap();
        canvas.rectangle(Point::new(1, 1), Point::new(8, 8), Rgb888::GREEN);

        assert_eq!(canvas.pixel(1, 1), Some(Rgb888::GREEN));
        assert_eq!(canvas.pixel(8, 4), Some(Rgb888::GREEN));
        assert_eq!(canvas.pixel(4, 4), Some(Rgb888::BLACK));
    }

    #[test]
    fn test_text_paints_pixels() {
        let mut canvas = Canvas::new(40, 20).unwrap();
        canvas.text(Point::new(0, 0), "W", None, Rgb888::WHITE);

        let lit = canvas.as_image().pixels().filter(|p| p[0] > 0).count();
        assert!(lit > 0, "text should light up some pixels");
    }

    #[test]
    fn test_text_renders_face_glyphs() {
        let font = crate::ui::Fonts::round_display().huge;
        let face = Face::Sleep.default_text();
        let substituted: String = face.chars().map(|c| if c.is_ascii() { c } else { '?' }).collect();

        let mut real = Canvas::new(200, 40).unwrap();
        real.text(Point::new(0, 0), face, font, Rgb888::WHITE);
        let mut fallback = Canvas::new(200, 40).unwrap();
        fallback.text(Point::new(0, 0), &substituted, font, Rgb888::WHITE);

        assert!(real.as_image().pixels().any(|p| p[0] > 0));
        assert_ne!(real.as_image(), fallback.as_image());
    }

    #[test]
    fn test_text_blends_partial_coverage() {
        let mut canvas = Canvas::new(2, 1).unwrap();
        canvas.blend(0, 0, Rgb888::new(200, 100, 0), 0.5);
        canvas.blend(1, 0, Rgb888::WHITE, 0.0);

        assert_eq!(canvas.pixel(0, 0), Some(Rgb888::new(100, 50, 0)));
        assert_eq!(canvas.pixel(1, 0), Some(Rgb888::BLACK));
    }

    #[test]
    fn test_arc_paints_pixels() {
        let mut canvas = Canvas::new(40, 40).unwrap();
        canvas.arc(Point::new(20, 20), 30, 0.0, 90.0, Rgb888::CYAN, 2);

        let lit = canvas.as_image().pixels().filter(|p| p[2] > 0).count();
        assert!(lit > 0);
    }

    #[test]
    fn test_paste_rgba_blends_and_skips_transparent() {
        let mut canvas = Canvas::new(4, 1).unwrap();
        let mut img = RgbaImage::new(3, 1);
        img.put_pixel(0, 0, Rgba([255, 255, 255, 255]));
        img.put_pixel(1, 0, Rgba([255, 255, 255, 0]));
        img.put_pixel(2, 0, Rgba([200, 100, 0, 128]));

        canvas.paste_rgba(&img, Point::new(0, 0)).unwrap();

        assert_eq!(canvas.pixel(0, 0), Some(Rgb888::WHITE));
        assert_eq!(canvas.pixel(1, 0), Some(Rgb888::BLACK));
        assert_eq!(canvas.pixel(2, 0), Some(Rgb888::new(100, 50, 0)));
    }

    #[test]
    fn test_paste_empty_image_fails() {
        let mut canvas = Canvas::new(4, 4).unwrap();
        let img = RgbaImage::new(0, 0);
        assert_eq!(
            canvas.paste_rgba(&img, Point::zero()),
            Err(CompositeError::EmptyImage)
        );
    }

    #[test]
    fn test_paste_rgb_clips() {
        let mut canvas = Canvas::new(4, 4).unwrap();
        let img = RgbImage::from_pixel(3, 3, Rgb([9, 8, 7]));
        canvas.paste_rgb(&img, Point::new(2, -1));

        assert_eq!(canvas.pixel(3, 1), Some(Rgb888::new(9, 8, 7)));
        assert_eq!(canvas.pixel(2, 0), Some(Rgb888::new(9, 8, 7)));
        assert_eq!(canvas.pixel(1, 0), Some(Rgb888::BLACK));
        assert_eq!(canvas.pixel(2, 2), Some(Rgb888::BLACK));
    }

    #[test]
    fn test_overlaps() {
        let canvas = Canvas::new(10, 10).unwrap();
        assert!(canvas.overlaps(Point::new(-4, -4), Size::new(5, 5)));
        assert!(!canvas.overlaps(Point::new(-5, 0), Size::new(5, 5)));
        assert!(!canvas.overlaps(Point::new(10, 0), Size::new(5, 5)));
    }
}
