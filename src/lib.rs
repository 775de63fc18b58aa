//! Firewall Siege - combat simulation core for a formation shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (projectiles, formation, boss, collisions)
//! - `persistence`: Versioned save envelope for snapshot/restore
//! - `tuning`: Data-driven game balance

pub mod persistence;
pub mod sim;
pub mod tuning;

pub use tuning::{Difficulty, Tuning, TuningError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per displayed frame)
    pub const SIM_DT: f64 = 1.0 / 60.0;

    /// Slack for comparing clock differences (far below one tick)
    pub const TIME_EPSILON: f64 = 1e-6;

    /// Play field dimensions (pixels, y grows downward)
    pub const SCREEN_WIDTH: f32 = 1200.0;
    pub const SCREEN_HEIGHT: f32 = 600.0;
}

/// Fallback direction for zero-length vectors (straight down the screen)
pub const FALLBACK_DIR: Vec2 = Vec2::new(0.0, 1.0);

/// Normalize a direction, falling back to straight down instead of dividing by zero
#[inline]
pub fn direction_or_down(v: Vec2) -> Vec2 {
    let len = v.length();
    if len > 0.0 && len.is_finite() {
        v / len
    } else {
        FALLBACK_DIR
    }
}

/// Unit vector for an angle measured from straight down (positive = toward +x)
#[inline]
pub fn dir_from_down(angle: f32) -> Vec2 {
    Vec2::new(angle.sin(), angle.cos())
}

/// True once `interval` seconds have passed since `since`.
///
/// Differences of tick timestamps (`i * SIM_DT - j * SIM_DT`) land a hair
/// below the whole-tick interval they represent, so the comparison allows
/// `TIME_EPSILON` of slack.
#[inline]
pub fn elapsed_at_least(now: f64, since: f64, interval: f64) -> bool {
    now - since >= interval - consts::TIME_EPSILON
}

/// True once strictly more than `interval` seconds have passed since `since`
#[inline]
pub fn elapsed_beyond(now: f64, since: f64, interval: f64) -> bool {
    now - since > interval + consts::TIME_EPSILON
}

/// Strict interior containment of a point in an axis-aligned rectangle
#[inline]
pub fn rect_contains(origin: Vec2, size: Vec2, point: Vec2) -> bool {
    point.x > origin.x
        && point.x < origin.x + size.x
        && point.y > origin.y
        && point.y < origin.y + size.y
}
