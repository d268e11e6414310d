//! Emulator sink: hands finished frames to the SDL main loop.

use std::convert::Infallible;
use std::sync::Arc;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use log::info;
use parking_lot::Mutex;

use ringview_core::error::SinkError;
use ringview_core::{Frame, Layout, RenderSink};

/// Frame waiting to be shown, shared between the view and the window loop.
pub type FrameSlot = Arc<Mutex<Option<Frame>>>;

/// Sink standing in for the round panel.
///
/// Rendering only swaps the pending frame, so the view thread never waits on
/// SDL. The window loop picks the frame up with [`EmulatorSink::take_pending`].
pub struct EmulatorSink {
    layout: Layout,
    pending: FrameSlot,
    shown: Option<Frame>,
}

impl EmulatorSink {
    pub fn new(layout: Layout) -> (Self, FrameSlot) {
        let pending = FrameSlot::default();
        let sink = Self {
            layout,
            pending: pending.clone(),
            shown: None,
        };
        (sink, pending)
    }

    /// Next frame for the window, if a new one arrived.
    pub fn take_pending(slot: &FrameSlot) -> Option<Frame> {
        slot.lock().take()
    }
}

impl RenderSink for EmulatorSink {
    fn name(&self) -> &str {
        "emulator"
    }

    fn initialize(&mut self) -> Result<(), SinkError> {
        info!("Emulator panel {}x{}", self.layout.width, self.layout.height);
        Ok(())
    }

    fn layout(&self) -> Layout {
        self.layout.clone()
    }

    fn render(&mut self, frame: &Frame) -> Result<(), SinkError> {
        if frame.dimensions() != (self.layout.width, self.layout.height) {
            return Err(SinkError::Render(format!(
                "frame is {:?}, panel is {}x{}",
                frame.dimensions(),
                self.layout.width,
                self.layout.height
            )));
        }
        *self.pending.lock() = Some(Arc::clone(frame));
        self.shown = Some(Arc::clone(frame));
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SinkError> {
        *self.pending.lock() = None;
        self.shown = None;
        Ok(())
    }

    fn image(&self) -> Option<Frame> {
        self.shown.clone()
    }
}

/// Copy a frame onto any RGB888 target, e.g. the simulator display.
pub fn blit<D>(frame: &Frame, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    target.draw_iter(frame.enumerate_pixels().map(|(x, y, p)| {
        Pixel(Point::new(x as i32, y as i32), Rgb888::new(p[0], p[1], p[2]))
    }))
}

/// [`blit`] for targets that cannot fail.
pub fn blit_infallible<D>(frame: &Frame, target: &mut D)
where
    D: DrawTarget<Color = Rgb888, Error = Infallible>,
{
    let Ok(()) = blit(frame, target);
}
