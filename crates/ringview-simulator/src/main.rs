//! Desktop simulator for the ringview status display.
//!
//! Renders the core `View` in an SDL2 window via `embedded-graphics-simulator`.
//! Generates synthetic agent activity so every widget and mood can be
//! exercised without hardware.
//!
//! Usage: `ringview-simulator [config.toml]`
//!
//! # Key bindings
//!
//! | Key | Action                       |
//! |-----|------------------------------|
//! | 1   | New peer                     |
//! | 2   | Lost peer                    |
//! | 3   | Handshakes                   |
//! | 4   | Bored                        |
//! | 5   | Sad                          |
//! | 6   | Excited                      |
//! | 7   | Uploading                    |
//! | 8   | Manual mode summary          |
//! | W   | Nap for a few seconds        |
//! | S   | Shutdown (freezes the view)  |
//! | Q   | Quit                         |

mod emulator;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::{
    OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window, sdl2::Keycode,
};
use log::{error, info};

use ringview_core::faces::DirectoryAssets;
use ringview_core::view::{LastSession, Peer};
use ringview_core::{Config, Layout, View};

use emulator::EmulatorSink;

// ---------------------------------------------------------------------------
// Display constants
// ---------------------------------------------------------------------------

/// Pixel scale factor for the simulator window.
const WINDOW_SCALE: u32 = 2;

/// Target frame duration (~30 FPS).
const FRAME_DURATION: Duration = Duration::from_millis(33);

/// Interval between synthetic counter updates.
const MOCK_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Refresh rate used when no config file is given.
const DEFAULT_FPS: f32 = 2.0;

// ---------------------------------------------------------------------------
// Mock agent
// ---------------------------------------------------------------------------

/// Synthetic agent counters that move over time.
struct MockAgent {
    started: Instant,
    channel: u8,
    aps: u32,
    handshakes: u32,
    encounters: u32,
}

impl MockAgent {
    fn new() -> Self {
        Self {
            started: Instant::now(),
            channel: 1,
            aps: 0,
            handshakes: 0,
            encounters: 0,
        }
    }

    fn uptime(&self) -> String {
        let secs = self.started.elapsed().as_secs();
        format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
    }

    /// Hop channel and drift the visible AP count.
    fn tick(&mut self, view: &View) {
        self.channel = self.channel % 13 + 1;
        let t = self.started.elapsed().as_secs_f64();
        self.aps = (8.0 + 6.0 * (t / 20.0).sin()) as u32;

        let channel = self.channel.to_string();
        let aps = format!("{} ({})", self.aps, self.aps * 3);
        let uptime = self.uptime();
        let patch = [
            ("channel", channel.as_str()),
            ("aps", aps.as_str()),
            ("uptime", uptime.as_str()),
        ];
        if let Err(e) = view.update(false, &patch) {
            error!("Update error: {}", e);
        }
    }

    fn peer(&mut self) -> Peer {
        self.encounters += 1;
        Peer {
            name: "neighbour".into(),
            face: "(◕‿‿◕)".into(),
            rssi: -55 - (self.encounters as i32 * 7) % 40,
            pwnd_run: self.encounters,
            pwnd_total: self.encounters * 4,
            encounters: self.encounters,
        }
    }

    fn session(&self) -> LastSession {
        LastSession {
            epochs: 42,
            handshakes: self.handshakes,
            duration: self.uptime(),
            associated: self.aps,
            deauthed: 3,
            peers: self.encounters,
            last_peer: None,
            total_unique_handshakes: self.handshakes * 2,
        }
    }
}

// ---------------------------------------------------------------------------
// Key handling
// ---------------------------------------------------------------------------

/// Map an SDL keycode to a mood change. Returns `false` if the key is unbound.
fn handle_key(keycode: Keycode, view: &View, agent: &mut MockAgent) -> bool {
    match keycode {
        Keycode::Num1 | Keycode::Kp1 => {
            let peer = agent.peer();
            view.on_new_peer(&peer);
            view.set_closest_peer(Some(&peer), agent.encounters);
        }
        Keycode::Num2 | Keycode::Kp2 => {
            let peer = agent.peer();
            view.on_lost_peer(&peer);
            view.set_closest_peer(None, 0);
        }
        Keycode::Num3 | Keycode::Kp3 => {
            agent.handshakes += 1;
            view.set("shakes", &format!("{} ({})", agent.handshakes, agent.handshakes * 2));
            view.on_handshakes(1);
        }
        Keycode::Num4 | Keycode::Kp4 => view.on_bored(),
        Keycode::Num5 | Keycode::Kp5 => view.on_sad(),
        Keycode::Num6 | Keycode::Kp6 => view.on_excited(),
        Keycode::Num7 | Keycode::Kp7 => view.on_uploading("wigle.net"),
        Keycode::Num8 | Keycode::Kp8 => view.on_manual_mode(&agent.session()),
        Keycode::W => {
            // `wait` blocks, keep the window responsive
            let view = view.clone();
            thread::spawn(move || view.wait(4.0, true, true));
        }
        Keycode::S => view.on_shutdown(),
        _ => return false,
    }
    true
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

fn load_config() -> Option<Config> {
    match std::env::args().nth(1) {
        Some(path) => match Config::load(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                error!("Failed to load {}: {}", path, e);
                None
            }
        },
        None => {
            let mut config = Config::default();
            config.ui.fps = DEFAULT_FPS;
            Some(config)
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();
    info!("Starting ringview simulator");

    let Some(config) = load_config() else {
        std::process::exit(1);
    };

    let layout = Layout::round_240();
    info!(
        "Display: {}×{} (scale {}×)",
        layout.width, layout.height, WINDOW_SCALE
    );
    info!("Keys: 1=Peer 2=Lost 3=Shake 4=Bored 5=Sad 6=Excited 7=Upload 8=Manual W=Nap S=Shutdown Q=Quit");

    let mut builder = View::builder(layout.clone()).with_config(config.clone());
    if let Some(dir) = &config.ui.faces_dir {
        info!("Loading face images from {}", dir.display());
        builder = builder.with_assets(Arc::new(DirectoryAssets::new(dir)));
    }
    let view = match builder.build() {
        Ok(view) => view,
        Err(e) => {
            error!("Failed to build view: {}", e);
            std::process::exit(1);
        }
    };

    let (sink, pending) = EmulatorSink::new(layout.clone());
    if let Err(e) = view.add_sink(Box::new(sink)) {
        error!("Emulator sink unavailable: {}", e);
        std::process::exit(1);
    }

    // SDL2 display and window
    let mut display = SimulatorDisplay::<Rgb888>::new(Size::new(layout.width, layout.height));
    let output_settings = OutputSettingsBuilder::new().scale(WINDOW_SCALE).build();
    let mut window = Window::new("Ringview Simulator", &output_settings);

    let mut agent = MockAgent::new();
    let mut last_tick = Instant::now();

    view.on_starting();
    view.on_ai_ready();

    // The SDL window is lazily initialized on the first `update()` call.
    // We must call `update()` once before `events()` or it will panic.
    let _ = display.clear(Rgb888::BLACK);
    if let Some(frame) = EmulatorSink::take_pending(&pending) {
        emulator::blit_infallible(&frame, &mut display);
    }
    window.update(&display);

    // -----------------------------------------------------------------------
    // Main loop
    // -----------------------------------------------------------------------
    'running: loop {
        let frame_start = Instant::now();

        // --- SDL events ---------------------------------------------------
        for event in window.events() {
            match event {
                SimulatorEvent::Quit => break 'running,

                SimulatorEvent::KeyDown { keycode, .. } => {
                    if keycode == Keycode::Q || keycode == Keycode::Escape {
                        break 'running;
                    }
                    if !handle_key(keycode, &view, &mut agent) {
                        info!("Unbound key {:?}", keycode);
                    }
                }

                _ => {}
            }
        }

        // --- Mock agent ---------------------------------------------------
        if last_tick.elapsed() >= MOCK_TICK_INTERVAL {
            agent.tick(&view);
            last_tick = Instant::now();
        }

        // --- Present ------------------------------------------------------
        if let Some(frame) = EmulatorSink::take_pending(&pending) {
            emulator::blit_infallible(&frame, &mut display);
        }
        window.update(&display);

        // --- Frame pacing -------------------------------------------------
        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            thread::sleep(FRAME_DURATION - elapsed);
        }
    }

    view.stop();
    info!("Simulator exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emulator_sink_hands_over_frames() {
        let layout = Layout::round_240();
        let view = View::builder(layout.clone()).build().unwrap();
        let (sink, pending) = EmulatorSink::new(layout);
        view.add_sink(Box::new(sink)).unwrap();

        view.update(true, &[]).unwrap();
        let frame = EmulatorSink::take_pending(&pending).unwrap();
        assert_eq!(frame.dimensions(), (240, 240));
        assert!(EmulatorSink::take_pending(&pending).is_none());

        let mut display = SimulatorDisplay::<Rgb888>::new(Size::new(240, 240));
        emulator::blit_infallible(&frame, &mut display);
    }

    #[test]
    fn test_mock_agent_hops_channels() {
        let view = View::builder(Layout::round_240()).build().unwrap();
        let mut agent = MockAgent::new();
        for _ in 0..13 {
            agent.tick(&view);
        }
        assert_eq!(agent.channel, 1);
        assert_eq!(view.get("channel").as_deref(), Some("CH 1"));
    }
}
