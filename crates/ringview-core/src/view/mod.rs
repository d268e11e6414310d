// src/view/mod.rs
//! Top-level display orchestrator.
//!
//! The [`View`] owns the widget [`State`], composes frames and dispatches them
//! to every registered [`RenderSink`]. It is cheap to clone; every clone is a
//! handle to the same display.
//!
//! # Locking
//!
//! Two locks, always taken in this order:
//! - the *render lock* guards sinks, render callbacks and the last frame, and
//!   is held for a whole [`View::update`] so frames are produced one at a
//!   time;
//! - the *state lock* guards widget values and dirty markers. Setters take
//!   only this one, so a `set` racing an in-flight update either makes it
//!   into that frame or stays dirty for the next one.
//!
//! State listeners and extension `on_update` hooks run with the state lock
//! held and must not call back into the view.

mod moods;
mod ticker;

pub use moods::{LastSession, Peer};

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use log::{debug, error, info, warn};
use parking_lot::{Mutex, RwLock};

use crate::canvas::{Canvas, Frame};
use crate::config::Config;
use crate::error::{HookError, ViewError};
use crate::faces::{DirectoryAssets, Face, FaceAssets, FaceFrameCache, FaceSet, MemoryAssets};
use crate::sink::{Layout, PreviewSlot, RenderSink};
use crate::state::State;
use crate::ui::colors::{CYAN, GREEN, WHITE};
use crate::ui::{CurvedText, DrawOutcome, Fonts, Text, Widget};
use crate::voice::{PlainVoice, Utterance, Voice};

use ticker::Ticker;

/// Keys skipped by the dirty check while no refresh ticker runs.
const IGNORED_WITHOUT_TICKER: &[&str] = &["uptime", "name"];
const IGNORED_NONE: &[&str] = &[];

/// Suffix toggled on the name by every refresh tick.
const HEARTBEAT: &str = " █";

/// Callback invoked with every dispatched frame.
pub type RenderCallback = Arc<dyn Fn(&Frame) + Send + Sync>;

/// Hook points for code that extends the display.
///
/// Hooks are fire-and-continue: an `Err` is logged with the extension name
/// and the frame goes on.
pub trait Extension: Send + Sync {
    fn name(&self) -> &str;

    /// Called once when the extension is added.
    fn on_setup(&self, _view: &View) -> Result<(), HookError> {
        Ok(())
    }

    /// Called for every frame that is drawn, just before the widgets.
    fn on_update(&self, _state: &mut State) -> Result<(), HookError> {
        Ok(())
    }
}

#[derive(Default)]
struct RenderTargets {
    sinks: Vec<Box<dyn RenderSink>>,
    callbacks: Vec<RenderCallback>,
    last: Option<Frame>,
}

impl RenderTargets {
    fn dispatch(&mut self, frame: &Frame) {
        for sink in &mut self.sinks {
            if let Err(e) = sink.render(frame) {
                error!("Sink '{}' failed to render: {}", sink.name(), e);
            }
        }
        for callback in &self.callbacks {
            callback(frame);
        }
        self.last = Some(Arc::clone(frame));
    }
}

struct ViewInner {
    width: u32,
    height: u32,
    render: Mutex<RenderTargets>,
    state: Mutex<State>,
    frozen: AtomicBool,
    ignore: RwLock<&'static [&'static str]>,
    faces: FaceFrameCache,
    face_set: FaceSet,
    face_size: u32,
    good_friend_threshold: u32,
    voice: Box<dyn Voice>,
    extensions: RwLock<Vec<Arc<dyn Extension>>>,
    preview: PreviewSlot,
    ticker: Mutex<Option<Ticker>>,
    variety: AtomicUsize,
}

impl Drop for ViewInner {
    fn drop(&mut self) {
        if let Some(mut ticker) = self.ticker.get_mut().take() {
            ticker.stop();
        }
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Configures and constructs a [`View`].
pub struct ViewBuilder {
    layout: Layout,
    config: Config,
    fonts: Fonts,
    assets: Option<Arc<dyn FaceAssets>>,
    voice: Box<dyn Voice>,
}

impl ViewBuilder {
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn with_fonts(mut self, fonts: Fonts) -> Self {
        self.fonts = fonts;
        self
    }

    /// Face image source; defaults to `ui.faces_dir`, or no images.
    pub fn with_assets(mut self, assets: Arc<dyn FaceAssets>) -> Self {
        self.assets = Some(assets);
        self
    }

    pub fn with_voice(mut self, voice: impl Voice + 'static) -> Self {
        self.voice = Box::new(voice);
        self
    }

    /// Build the default widget set and start the refresh ticker if enabled.
    pub fn build(self) -> Result<View, ViewError> {
        let Self {
            layout,
            config,
            fonts,
            assets,
            voice,
        } = self;

        let assets: Arc<dyn FaceAssets> = match (assets, &config.ui.faces_dir) {
            (Some(assets), _) => assets,
            (None, Some(dir)) => Arc::new(DirectoryAssets::new(dir)),
            (None, None) => Arc::new(MemoryAssets::new()),
        };
        let face_set = config.face_set();
        let state = default_state(&layout, &fonts, &face_set, voice.as_ref(), &config.main.name)?;

        info!(
            "View {}x{} with {} widgets, fps {}",
            layout.width,
            layout.height,
            state.len(),
            config.ui.fps
        );

        let view = View {
            inner: Arc::new(ViewInner {
                width: layout.width,
                height: layout.height,
                render: Mutex::new(RenderTargets::default()),
                state: Mutex::new(state),
                frozen: AtomicBool::new(false),
                ignore: RwLock::new(IGNORED_NONE),
                faces: FaceFrameCache::new(assets),
                face_set,
                face_size: config.ui.face_size,
                good_friend_threshold: config.ui.good_friend_threshold,
                voice,
                extensions: RwLock::new(Vec::new()),
                preview: PreviewSlot::new(),
                ticker: Mutex::new(None),
                variety: AtomicUsize::new(0),
            }),
        };

        view.start_refresh(config.ui.fps)?;
        Ok(view)
    }
}

/// Built-in widgets, in paint order.
fn default_state(
    layout: &Layout,
    fonts: &Fonts,
    face_set: &FaceSet,
    voice: &dyn Voice,
    name: &str,
) -> Result<State, ViewError> {
    let center = layout.center();
    let rim = layout.width.min(layout.height) / 2;
    let radius = |inset: u32| rim.saturating_sub(inset);

    let mut state = State::new();
    state.add_element(
        "channel",
        CurvedText::new("CH 00", center, radius(10), 180.0, fonts.medium).with_color(CYAN),
    )?;
    state.add_element(
        "aps",
        CurvedText::new("APS 0 (00)", center, radius(8), 270.0, fonts.medium).with_color(CYAN),
    )?;
    state.add_element(
        "uptime",
        CurvedText::new("UP 00:00:00", center, radius(10), 0.0, fonts.medium).with_color(CYAN),
    )?;
    state.add_element(
        "face",
        Text::new(
            Some(face_set.text(Face::Sleep).to_owned()),
            layout.anchor("face"),
            fonts.huge,
        )
        .with_color(WHITE),
    )?;
    state.add_element(
        "friend_face",
        Text::new(None, layout.anchor("friend_face"), fonts.bold).with_color(GREEN),
    )?;
    state.add_element(
        "friend_name",
        Text::new(None, layout.anchor("friend_name"), fonts.bold_small).with_color(GREEN),
    )?;
    state.add_element(
        "name",
        CurvedText::new(format!("{name}>"), center, radius(13), 225.0, fonts.bold).with_color(GREEN),
    )?;
    state.add_element(
        "status",
        CurvedText::new(voice.say(Utterance::Default), center, radius(13), 90.0, fonts.medium)
            .with_color(WHITE),
    )?;
    state.add_element(
        "shakes",
        CurvedText::new("PWND 0 (00)", center, radius(13), 135.0, fonts.medium).with_color(CYAN),
    )?;
    state.add_element(
        "mode",
        CurvedText::new("AUTO", center, radius(13), 45.0, fonts.bold).with_color(CYAN),
    )?;
    Ok(state)
}

/// Apply the per-key display format.
fn format_value(key: &str, value: &str) -> String {
    match key {
        "channel" => format!("CH {value}"),
        "aps" => format!("APS {value}"),
        "uptime" => format!("UP {value}"),
        "shakes" => format!("PWND {value}"),
        "name" => format!("{value}>"),
        _ => value.to_owned(),
    }
}

// ============================================================================
// View
// ============================================================================

#[derive(Clone)]
pub struct View {
    inner: Arc<ViewInner>,
}

impl View {
    pub fn builder(layout: Layout) -> ViewBuilder {
        ViewBuilder {
            layout,
            config: Config::default(),
            fonts: Fonts::default(),
            assets: None,
            voice: Box::new(PlainVoice),
        }
    }

    pub fn width(&self) -> u32 {
        self.inner.width
    }

    pub fn height(&self) -> u32 {
        self.inner.height
    }

    // ------------------------------------------------------------------
    // Values
    // ------------------------------------------------------------------

    /// Current (formatted) value of `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.state.lock().get(key).map(str::to_owned)
    }

    /// Format and store a value, returning whether it changed.
    ///
    /// Unknown keys are logged and ignored. Setting `face` also installs the
    /// matching face image, if one exists, on the face widget.
    pub fn set(&self, key: &str, value: &str) -> bool {
        let value = format_value(key, value);
        let frames = (key == "face").then(|| self.face_frames(&value));

        let mut state = self.inner.state.lock();
        if let Some(frames) = frames {
            install_face_frames(&mut state, frames);
        }
        match state.set(key, &value) {
            Ok(changed) => changed,
            Err(e) => {
                warn!("Ignoring value for '{}': {}", key, e);
                false
            }
        }
    }

    /// Remove the value of `key` (text widgets then draw nothing).
    pub fn unset(&self, key: &str) -> bool {
        match self.inner.state.lock().unset(key) {
            Ok(changed) => changed,
            Err(e) => {
                warn!("Ignoring unset of '{}': {}", key, e);
                false
            }
        }
    }

    fn face_frames(&self, value: &str) -> crate::faces::Frames {
        let inner = &*self.inner;
        let Some(face) = inner.face_set.lookup(value) else {
            return crate::faces::no_frames();
        };
        let size = (inner.face_size, inner.face_size);
        inner.faces.get_frames(face.name(), size)
    }

    /// Register a value-change callback for `key`.
    pub fn on_state_change(
        &self,
        key: &str,
        listener: impl Fn(Option<&str>, Option<&str>) + Send + Sync + 'static,
    ) {
        self.inner.state.lock().add_listener(key, listener);
    }

    // ------------------------------------------------------------------
    // Elements
    // ------------------------------------------------------------------

    pub fn has_element(&self, key: &str) -> bool {
        self.inner.state.lock().has_element(key)
    }

    /// Add a widget under the render lock; it paints after existing ones.
    pub fn add_element(&self, key: &str, widget: impl Into<Widget>) -> Result<(), ViewError> {
        let _render = self.inner.render.lock();
        self.inner.state.lock().add_element(key, widget)?;
        Ok(())
    }

    /// Remove a widget under the render lock, so no frame sees it half-gone.
    pub fn remove_element(&self, key: &str) -> Option<Widget> {
        let _render = self.inner.render.lock();
        self.inner.state.lock().remove_element(key)
    }

    // ------------------------------------------------------------------
    // Outputs
    // ------------------------------------------------------------------

    /// Initialize a sink and start sending it frames.
    ///
    /// An initialization failure is returned to the caller and the sink is
    /// dropped; the view keeps running.
    pub fn add_sink(&self, mut sink: Box<dyn RenderSink>) -> Result<(), ViewError> {
        if let Err(source) = sink.initialize() {
            error!("Sink '{}' failed to initialize: {}", sink.name(), source);
            return Err(ViewError::Sink {
                name: sink.name().to_owned(),
                source,
            });
        }
        info!("Sink '{}' ready", sink.name());
        self.inner.render.lock().sinks.push(sink);
        Ok(())
    }

    /// Call `callback` with every dispatched frame. Registering the same
    /// callback twice has no effect; returns whether it was added.
    pub fn on_render(&self, callback: RenderCallback) -> bool {
        let mut render = self.inner.render.lock();
        let id = Arc::as_ptr(&callback) as *const ();
        if render.callbacks.iter().any(|c| Arc::as_ptr(c) as *const () == id) {
            return false;
        }
        render.callbacks.push(callback);
        true
    }

    /// Run `on_setup` and register the extension for per-frame hooks.
    pub fn add_extension(&self, extension: Arc<dyn Extension>) {
        if let Err(e) = extension.on_setup(self) {
            warn!("Extension '{}' setup failed: {}", extension.name(), e);
        }
        self.inner.extensions.write().push(extension);
    }

    /// Last frame dispatched to the sinks.
    pub fn frame(&self) -> Option<Frame> {
        self.inner.render.lock().last.clone()
    }

    /// Handle to the latest-frame preview slot.
    pub fn preview(&self) -> PreviewSlot {
        self.inner.preview.clone()
    }

    /// Clear every sink.
    pub fn clear(&self) {
        for sink in &mut self.inner.render.lock().sinks {
            if let Err(e) = sink.clear() {
                error!("Sink '{}' failed to clear: {}", sink.name(), e);
            }
        }
    }

    // ------------------------------------------------------------------
    // Frames
    // ------------------------------------------------------------------

    /// Apply `patch`, then draw and dispatch a frame if anything changed.
    ///
    /// Returns whether a frame was dispatched. Frozen views, and views with
    /// nothing dirty outside the ignore set, do no work unless `force` is set
    /// (frozen ones not even then).
    pub fn update(&self, force: bool, patch: &[(&str, &str)]) -> Result<bool, ViewError> {
        for (key, value) in patch {
            self.set(key, value);
        }

        let inner = &*self.inner;
        let mut targets = inner.render.lock();
        if inner.frozen.load(Ordering::Acquire) {
            return Ok(false);
        }

        let mut state = inner.state.lock();
        let changes = state.changes(*inner.ignore.read());
        if !force && changes.is_empty() {
            return Ok(false);
        }
        debug!("Drawing frame (force: {}, changes: {:?})", force, changes);

        let mut canvas = Canvas::new(inner.width, inner.height).map_err(|e| {
            error!("No frame produced: {}", e);
            e
        })?;

        for extension in inner.extensions.read().iter() {
            if let Err(e) = extension.on_update(&mut state) {
                warn!("Extension '{}' update hook failed: {}", extension.name(), e);
            }
        }

        for (key, widget) in state.iter_mut() {
            if let DrawOutcome::Degraded(reason) = widget.draw(&mut canvas) {
                warn!("Widget '{}' degraded: {}", key, reason);
            }
        }
        state.reset();
        drop(state);

        let frame = canvas.into_frame();
        inner.preview.publish(Arc::clone(&frame));
        targets.dispatch(&frame);
        Ok(true)
    }

    /// Stop drawing for good. Every later `update` is a no-op.
    pub fn freeze(&self) {
        let _render = self.inner.render.lock();
        if !self.inner.frozen.swap(true, Ordering::AcqRel) {
            info!("View frozen");
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.inner.frozen.load(Ordering::Acquire)
    }

    // ------------------------------------------------------------------
    // Refresh ticker
    // ------------------------------------------------------------------

    /// (Re)start periodic refresh at `fps`.
    ///
    /// With `fps <= 0` no ticker runs and `uptime`/`name` changes alone no
    /// longer trigger a frame.
    pub fn start_refresh(&self, fps: f32) -> Result<(), ViewError> {
        self.stop();

        // Subnormal rates overflow the period; zero periods would spin.
        let period = (fps > 0.0)
            .then(|| Duration::try_from_secs_f32(1.0 / fps).ok())
            .flatten()
            .filter(|p| !p.is_zero());
        let Some(period) = period else {
            warn!("ui.fps is {}, the display will only update for major changes", fps);
            *self.inner.ignore.write() = IGNORED_WITHOUT_TICKER;
            return Ok(());
        };

        let weak: Weak<ViewInner> = Arc::downgrade(&self.inner);
        let ticker = Ticker::spawn("ringview-refresh", period, move || {
            let Some(inner) = weak.upgrade() else {
                return false;
            };
            let view = View { inner };
            view.heartbeat();
            if let Err(e) = view.update(false, &[]) {
                warn!("Non fatal error while refreshing view: {}", e);
            }
            true
        })
        .map_err(ViewError::Ticker)?;

        *self.inner.ignore.write() = IGNORED_NONE;
        *self.inner.ticker.lock() = Some(ticker);
        Ok(())
    }

    /// Stop the refresh ticker, waiting for an in-flight tick to finish.
    pub fn stop(&self) {
        let ticker = self.inner.ticker.lock().take();
        if let Some(mut ticker) = ticker {
            ticker.stop();
        }
    }

    pub fn is_refreshing(&self) -> bool {
        self.inner.ticker.lock().as_ref().is_some_and(Ticker::is_running)
    }

    /// Toggle the busy marker after the name.
    fn heartbeat(&self) {
        let mut state = self.inner.state.lock();
        let Some(name) = state.get("name") else {
            return;
        };
        let next = match name.strip_suffix(HEARTBEAT) {
            Some(plain) => plain.to_owned(),
            None => format!("{name}{HEARTBEAT}"),
        };
        if let Err(e) = state.set("name", &next) {
            debug!("Heartbeat skipped: {}", e);
        }
    }

    fn good_friend_threshold(&self) -> u32 {
        self.inner.good_friend_threshold
    }

    fn face_text(&self, face: Face) -> &str {
        self.inner.face_set.text(face)
    }

    /// Rotate through `choices` so repeated events vary.
    fn pick(&self, choices: &[Face]) -> Face {
        let n = self.inner.variety.fetch_add(1, Ordering::Relaxed);
        choices[n % choices.len()]
    }

    fn say(&self, utterance: Utterance<'_>) -> String {
        self.inner.voice.say(utterance)
    }
}

impl core::fmt::Debug for View {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("View")
            .field("width", &self.inner.width)
            .field("height", &self.inner.height)
            .field("frozen", &self.is_frozen())
            .finish()
    }
}

/// Put face frames on the face widget.
///
/// The same cached sequence keeps its animation position; an empty one drops
/// any image so the text is drawn.
fn install_face_frames(state: &mut State, frames: crate::faces::Frames) {
    let Some(face) = state.widget_mut("face").and_then(Widget::as_text_mut) else {
        return;
    };

    if frames.is_empty() {
        if face.image().is_some() {
            face.clear_image();
            state.touch("face");
        }
        return;
    }
    if face.frames().is_some_and(|current| Arc::ptr_eq(current, &frames)) {
        return;
    }

    debug!("Face image installed ({} frame(s))", frames.len());
    face.set_frames(frames);
    state.touch("face");
}
