// src/ui/components/shapes.rs
//! Static shape widgets: bitmaps, lines and rectangles.
//!
//! None of these carry a value; they are mostly used by extensions to add
//! decorations to the panel.

use std::path::Path;
use std::sync::Arc;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use image::RgbaImage;

use crate::canvas::Canvas;
use crate::error::AssetError;
use crate::ui::DrawOutcome;

/// Pre-decoded RGBA image pasted at a fixed position.
#[derive(Debug, Clone)]
pub struct Bitmap {
    image: Arc<RgbaImage>,
    position: Point,
}

impl Bitmap {
    pub fn new(image: Arc<RgbaImage>, position: Point) -> Self {
        Self { image, position }
    }

    /// Load an image file from disk.
    pub fn open(path: impl AsRef<Path>, position: Point) -> Result<Self, AssetError> {
        let image = image::open(path.as_ref())?.to_rgba8();
        Ok(Self::new(Arc::new(image), position))
    }

    pub fn draw(&self, canvas: &mut Canvas) -> DrawOutcome {
        match canvas.paste_rgba(&self.image, self.position) {
            Ok(()) => DrawOutcome::Drawn,
            Err(e) => DrawOutcome::Degraded(format!("bitmap not drawn: {e}")),
        }
    }
}

/// Stroked line between two points.
#[derive(Debug, Clone, Copy)]
pub struct Line {
    from: Point,
    to: Point,
    color: Rgb888,
    width: u32,
}

impl Line {
    pub fn new(from: Point, to: Point, color: Rgb888, width: u32) -> Self {
        Self { from, to, color, width }
    }

    pub fn draw(&self, canvas: &mut Canvas) -> DrawOutcome {
        canvas.line(self.from, self.to, self.color, self.width);
        DrawOutcome::Drawn
    }
}

/// Rectangle outline spanning two inclusive corners.
#[derive(Debug, Clone, Copy)]
pub struct Rect {
    top_left: Point,
    bottom_right: Point,
    color: Rgb888,
}

impl Rect {
    pub fn new(top_left: Point, bottom_right: Point, color: Rgb888) -> Self {
        Self { top_left, bottom_right, color }
    }

    pub fn draw(&self, canvas: &mut Canvas) -> DrawOutcome {
        canvas.rectangle(self.top_left, self.bottom_right, self.color);
        DrawOutcome::Drawn
    }
}

/// Solid rectangle spanning two inclusive corners.
#[derive(Debug, Clone, Copy)]
pub struct FilledRect {
    top_left: Point,
    bottom_right: Point,
    color: Rgb888,
}

impl FilledRect {
    pub fn new(top_left: Point, bottom_right: Point, color: Rgb888) -> Self {
        Self { top_left, bottom_right, color }
    }

    pub fn draw(&self, canvas: &mut Canvas) -> DrawOutcome {
        canvas.filled_rectangle(self.top_left, self.bottom_right, self.color);
        DrawOutcome::Drawn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_bitmap_pastes_image() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([9, 8, 7, 255]));
        let bitmap = Bitmap::new(Arc::new(img), Point::new(3, 3));
        let mut canvas = Canvas::new(8, 8).unwrap();

        assert_eq!(bitmap.draw(&mut canvas), DrawOutcome::Drawn);
        assert_eq!(canvas.pixel(4, 4), Some(Rgb888::new(9, 8, 7)));
        assert_eq!(canvas.pixel(2, 2), Some(Rgb888::BLACK));
    }

    #[test]
    fn test_empty_bitmap_degrades() {
        let bitmap = Bitmap::new(Arc::new(RgbaImage::new(0, 0)), Point::zero());
        let mut canvas = Canvas::new(8, 8).unwrap();
        assert!(bitmap.draw(&mut canvas).is_degraded());
    }

    #[test]
    fn test_open_missing_file_fails() {
        assert!(Bitmap::open("/nonexistent/ringview.png", Point::zero()).is_err());
    }

    #[test]
    fn test_rect_outline() {
        let mut canvas = Canvas::new(8, 8).unwrap();
        Rect::new(Point::new(1, 1), Point::new(6, 6), Rgb888::GREEN).draw(&mut canvas);
        assert_eq!(canvas.pixel(1, 3), Some(Rgb888::GREEN));
        assert_eq!(canvas.pixel(3, 3), Some(Rgb888::BLACK));
    }
}
