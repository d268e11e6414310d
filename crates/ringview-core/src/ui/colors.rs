//! Color definitions for the black-background IPS panel.
//!
//! The panel is driven in full RGB888; the palette below is tuned for a dark
//! background so every widget defaults to a light foreground.

use embedded_graphics::pixelcolor::Rgb888;

// ============================================================================
// Base Colors
// ============================================================================

/// Canvas background.
pub const BLACK: Rgb888 = Rgb888::new(0, 0, 0);

/// Default widget foreground.
pub const WHITE: Rgb888 = Rgb888::new(255, 255, 255);

// ============================================================================
// Accent Colors
// ============================================================================

/// Device name and peer info.
pub const GREEN: Rgb888 = Rgb888::new(0, 255, 100);

/// Counters around the rim (channel, APs, uptime, handshakes, mode).
pub const CYAN: Rgb888 = Rgb888::new(0, 200, 255);

pub const RED: Rgb888 = Rgb888::new(255, 50, 50);

pub const YELLOW: Rgb888 = Rgb888::new(255, 255, 0);

/// Color a widget gets when none is specified.
pub const DEFAULT_FOREGROUND: Rgb888 = WHITE;
