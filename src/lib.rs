//! Lasso Grid - a touch-driven number-capture arcade core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (geometry, spatial index, world model,
//!   cursor physics, gesture interpretation, lasso capture)
//! - `config`: Tunable simulation parameters with safe defaults
//! - `session`: Aggregate session progress and its JSON persistence envelope
//!
//! The crate is an in-process simulation library: the host shell feeds it raw
//! pointer events and variable-rate ticks, and reads back immutable snapshots
//! plus feedback events. It never touches audio, haptics, or the screen.

pub mod config;
pub mod session;
pub mod sim;

pub use config::SimConfig;
pub use session::SessionProgress;
pub use sim::{CapturePolicy, FeedbackEvent, GestureMode, Simulation};

/// Fixed world constants (tunables live in [`SimConfig`])
pub mod consts {
    /// World-space size of one number cell
    pub const CELL_SIZE: f32 = 48.0;

    /// Chance that a Dread entity spawns as a scary variant
    pub const SCARY_CHANCE: f32 = 0.04;

    /// Scary entities jitter this much faster than calm ones
    pub const SCARY_JITTER_RATE: f32 = 2.2;

    /// Render scale targets
    pub const BASE_SCALE: f32 = 1.0;
    pub const SCARY_SCALE: f32 = 1.35;

    /// Seconds between wellup pulses
    pub const WELLUP_PERIOD: f32 = 7.0;
    /// World-space radius of one wellup cluster
    pub const WELLUP_RADIUS: f32 = 140.0;

    /// Reference speed (px/s) where trackball sensitivity boost kicks in
    pub const BOOST_REF_SPEED: f32 = 900.0;
    /// Cap on the nonlinear trackball sensitivity boost
    pub const BOOST_CAP: f32 = 2.5;
    /// Speed (px/s) at which momentum friction reaches its high end
    pub const FRICTION_REF_SPEED: f32 = 1500.0;
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Move `current` toward `target` by at most `rate * dt`
#[inline]
pub fn approach(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    let step = rate * dt;
    if current < target {
        (current + step).min(target)
    } else {
        (current - step).max(target)
    }
}
