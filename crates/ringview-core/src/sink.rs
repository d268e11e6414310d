// src/sink.rs
//! Render sink contract, panel layouts and the preview forwarder.
//!
//! A sink is anything that consumes finished frames: a physical panel driver,
//! the desktop emulator, a network preview. Sinks receive an immutable
//! [`Frame`] and are never required to read it back.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use embedded_graphics::prelude::*;
use image::ImageFormat;
use parking_lot::Mutex;

use crate::canvas::Frame;
use crate::error::SinkError;

// ============================================================================
// Layout
// ============================================================================

/// Panel geometry and the anchor of every built-in widget.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    anchors: HashMap<String, Point>,
}

impl Layout {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            anchors: HashMap::new(),
        }
    }

    pub fn with_anchor(mut self, key: impl Into<String>, position: Point) -> Self {
        self.anchors.insert(key.into(), position);
        self
    }

    /// Anchor for `key`, the origin when the layout does not name it.
    pub fn anchor(&self, key: &str) -> Point {
        self.anchors.get(key).copied().unwrap_or(Point::zero())
    }

    pub fn center(&self) -> Point {
        Point::new((self.width / 2) as i32, (self.height / 2) as i32)
    }

    /// 240x240 round IPS panel.
    pub fn round_240() -> Self {
        Self::new(240, 240)
            .with_anchor("face", Point::new(40, 40))
            .with_anchor("name", Point::new(10, 15))
            .with_anchor("channel", Point::new(5, 110))
            .with_anchor("aps", Point::new(95, 8))
            .with_anchor("uptime", Point::new(165, 15))
            .with_anchor("status", Point::new(70, 205))
            .with_anchor("shakes", Point::new(10, 220))
            .with_anchor("mode", Point::new(165, 220))
            .with_anchor("friend_face", Point::new(10, 185))
            .with_anchor("friend_name", Point::new(50, 190))
    }
}

// ============================================================================
// Sink contract
// ============================================================================

/// Consumer of finished frames.
///
/// `render` is best-effort: the view logs an `Err` and moves on to the next
/// sink. Implementations must return promptly since the view holds its
/// render lock while dispatching.
pub trait RenderSink: Send {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Bring the output up. A failure here makes the sink unusable.
    fn initialize(&mut self) -> Result<(), SinkError>;

    /// Geometry and widget anchors for this panel.
    fn layout(&self) -> Layout;

    fn render(&mut self, frame: &Frame) -> Result<(), SinkError>;

    fn clear(&mut self) -> Result<(), SinkError>;

    /// Read back what is currently shown, when the output supports it.
    fn image(&self) -> Option<Frame> {
        None
    }
}

// ============================================================================
// Preview forwarder
// ============================================================================

#[derive(Default)]
struct PreviewInner {
    latest: Mutex<Option<Frame>>,
    generation: AtomicU64,
}

/// Latest-frame slot for preview consumers (e.g. a web UI).
///
/// Publishing replaces the previous frame, so a slow reader only ever skips
/// frames and never delays the view. Cloning yields another handle to the
/// same slot.
#[derive(Clone, Default)]
pub struct PreviewSlot {
    inner: Arc<PreviewInner>,
}

impl PreviewSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, frame: Frame) {
        *self.inner.latest.lock() = Some(frame);
        self.inner.generation.fetch_add(1, Ordering::Release);
    }

    pub fn latest(&self) -> Option<Frame> {
        self.inner.latest.lock().clone()
    }

    /// Number of frames published so far.
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::Acquire)
    }

    /// Latest frame encoded as PNG, `None` before the first publish.
    pub fn encode_png(&self) -> Result<Option<Vec<u8>>, image::ImageError> {
        let Some(frame) = self.latest() else {
            return Ok(None);
        };
        let mut bytes = Vec::new();
        frame.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(Some(bytes))
    }
}

impl core::fmt::Debug for PreviewSlot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PreviewSlot")
            .field("generation", &self.generation())
            .finish()
    }
}

// ============================================================================
// Test doubles
// ============================================================================

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    #[derive(Default)]
    pub struct Recorded {
        pub renders: usize,
        pub clears: usize,
        pub last: Option<Frame>,
    }

    /// Sink that records every call into a shared log.
    pub struct RecordingSink {
        pub name: String,
        pub layout: Layout,
        pub log: Arc<Mutex<Recorded>>,
        pub fail_init: bool,
        pub fail_render: bool,
    }

    impl RecordingSink {
        pub fn new(name: &str) -> (Self, Arc<Mutex<Recorded>>) {
            let log = Arc::new(Mutex::new(Recorded::default()));
            let sink = Self {
                name: name.to_owned(),
                layout: Layout::round_240(),
                log: log.clone(),
                fail_init: false,
                fail_render: false,
            };
            (sink, log)
        }
    }

    impl RenderSink for RecordingSink {
        fn name(&self) -> &str {
            &self.name
        }

        fn initialize(&mut self) -> Result<(), SinkError> {
            if self.fail_init {
                return Err(SinkError::Init("driver missing".into()));
            }
            Ok(())
        }

        fn layout(&self) -> Layout {
            self.layout.clone()
        }

        fn render(&mut self, frame: &Frame) -> Result<(), SinkError> {
            let mut log = self.log.lock();
            log.renders += 1;
            log.last = Some(frame.clone());
            if self.fail_render {
                return Err(SinkError::Render("bus error".into()));
            }
            Ok(())
        }

        fn clear(&mut self) -> Result<(), SinkError> {
            self.log.lock().clears += 1;
            Ok(())
        }

        fn image(&self) -> Option<Frame> {
            self.log.lock().last.clone()
        }
    }
}
