//! Cursor physics: trackball exploration and joystick pinpoint regimes
//!
//! Exploration applies scaled displacement directly on each move event (zero
//! perceived lag) and coasts on release with speed-dependent friction, like a
//! physical trackball. Pinpoint derives velocity from the offset between the
//! touch and a fixed anchor, with a dead-zone and a power-law gain curve.
//!
//! All position/velocity writes go through `&mut self` methods on this one
//! struct, so gesture-driven updates and momentum ticks cannot interleave.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::consts::*;

use super::geom::Rect;

/// Which physics regime the cursor is under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CursorMode {
    #[default]
    Exploration,
    Pinpoint,
}

/// Read-only cursor snapshot for the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorState {
    /// Screen-space position
    pub pos: Vec2,
    pub mode: CursorMode,
    /// Screen px/s
    pub vel: Vec2,
    pub is_moving: bool,
    /// Rendering cue, eases up while active
    pub glow: f32,
}

/// Owns all cursor motion
pub struct CursorPhysics {
    pub state: CursorState,
    /// Playable screen rectangle (excludes UI chrome)
    bounds: Rect,
}

impl CursorPhysics {
    pub fn new(bounds: Rect) -> Self {
        Self {
            state: CursorState {
                pos: bounds.center(),
                mode: CursorMode::Exploration,
                vel: Vec2::ZERO,
                is_moving: false,
                glow: 0.0,
            },
            bounds,
        }
    }

    pub fn set_bounds(&mut self, bounds: Rect, margin: f32) {
        self.bounds = bounds;
        self.clamp_to_bounds(margin);
    }

    fn clamp_to_bounds(&mut self, margin: f32) {
        let inner = self.bounds.expand(-margin);
        self.state.pos = inner.clamp_point(self.state.pos);
    }

    /// Trackball move event: apply the scaled displacement directly.
    ///
    /// Sensitivity boosts nonlinearly with gesture speed (capped) so fast
    /// swipes cover ground while slow ones stay precise.
    pub fn trackball_move(&mut self, delta: Vec2, dt_secs: f32, cfg: &SimConfig) {
        let dt = dt_secs.max(1e-3);
        let speed = delta.length() / dt;
        let boost = (1.0 + (speed / BOOST_REF_SPEED).powi(2)).min(BOOST_CAP);
        let gain = cfg.cursor_sensitivity * boost;

        self.state.pos += delta * gain;
        self.clamp_to_bounds(cfg.cursor_margin);
        self.state.vel = delta / dt;
        self.state.is_moving = delta.length_squared() > 0.0;
    }

    /// Release in exploration: begin momentum coast.
    ///
    /// Decisive flicks earn a tiered multiplier on top of the configured
    /// momentum factor, rewarding them with a longer coast.
    pub fn release(&mut self, cfg: &SimConfig) {
        let speed = self.state.vel.length();
        let tier = if speed >= cfg.flick_high {
            4.0
        } else if speed >= cfg.flick_medium {
            2.5
        } else if speed >= cfg.flick_low {
            1.8
        } else {
            1.0
        };
        self.state.vel *= cfg.momentum * tier;
        log::debug!("cursor released at {speed:.0} px/s, flick tier {tier}");
    }

    /// One momentum decay step, a pure recurrence of (velocity, dt).
    ///
    /// Friction is speed-dependent: near full speed it approaches
    /// `friction_high` (long coast), near rest it falls to `friction_low`
    /// (quick stop). Speeds below `stop_speed` snap to exactly zero, so the
    /// magnitude sequence is non-increasing and terminates.
    pub fn momentum_step(&mut self, dt_secs: f32, cfg: &SimConfig) {
        if self.state.vel == Vec2::ZERO {
            return;
        }
        let speed = self.state.vel.length();
        let t = (speed / FRICTION_REF_SPEED).min(1.0);
        let friction = cfg.friction_low + (cfg.friction_high - cfg.friction_low) * t;
        // Normalize the per-tick coefficient to a 60 Hz reference so variable
        // tick rates decay at the same wall-clock rate
        self.state.vel *= friction.powf(dt_secs * 60.0);
        self.state.pos += self.state.vel * dt_secs;
        self.clamp_to_bounds(cfg.cursor_margin);

        if self.state.vel.length() < cfg.stop_speed {
            self.state.vel = Vec2::ZERO;
            self.state.is_moving = false;
        }
    }

    /// Touch-down cancels any in-flight coast
    pub fn cancel_momentum(&mut self) {
        self.state.vel = Vec2::ZERO;
        self.state.is_moving = false;
    }

    /// Joystick move event: derive velocity from `touch − anchor`.
    ///
    /// Sub-deadzone offsets produce zero movement; beyond it, a power-law
    /// curve (exponent > 1) keeps small deflections disproportionately slow
    /// while large ones approach the capped max speed.
    pub fn joystick_move(&mut self, touch: Vec2, anchor: Vec2, cfg: &SimConfig) {
        let offset = touch - anchor;
        let len = offset.length();
        if len < cfg.deadzone {
            self.state.vel = Vec2::ZERO;
            return;
        }
        let span = (cfg.joystick_max_radius - cfg.deadzone).max(1.0);
        let t = ((len - cfg.deadzone) / span).clamp(0.0, 1.0);
        let gain = t.powf(cfg.joystick_exponent);
        self.state.vel = offset / len * gain * cfg.pinpoint_max_speed;
    }

    /// Integrate the current joystick velocity over one tick
    pub fn joystick_step(&mut self, dt_secs: f32, cfg: &SimConfig) {
        self.state.pos += self.state.vel * dt_secs;
        self.clamp_to_bounds(cfg.cursor_margin);
        self.state.is_moving = self.state.vel.length_squared() > 0.0;
    }

    /// Ease the glow cue toward its target for this frame
    pub fn glow_step(&mut self, dt_secs: f32) {
        let target = if self.state.is_moving || self.state.mode == CursorMode::Pinpoint {
            1.0
        } else {
            0.0
        };
        self.state.glow = crate::approach(self.state.glow, target, 3.0, dt_secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (CursorPhysics, SimConfig) {
        let bounds = Rect::new(Vec2::ZERO, Vec2::new(400.0, 700.0));
        (CursorPhysics::new(bounds), SimConfig::default())
    }

    #[test]
    fn test_trackball_moves_cursor() {
        let (mut c, cfg) = setup();
        let start = c.state.pos;
        c.trackball_move(Vec2::new(20.0, 0.0), 1.0 / 60.0, &cfg);
        assert!(c.state.pos.x > start.x);
        assert!(c.state.is_moving);
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let (mut c, cfg) = setup();
        for _ in 0..200 {
            c.trackball_move(Vec2::new(50.0, 50.0), 1.0 / 60.0, &cfg);
        }
        assert!(c.state.pos.x <= 400.0 - cfg.cursor_margin);
        assert!(c.state.pos.y <= 700.0 - cfg.cursor_margin);
    }

    #[test]
    fn test_momentum_decay_monotone_and_terminates() {
        let (mut c, cfg) = setup();
        c.state.vel = Vec2::new(900.0, -500.0);
        c.release(&cfg);

        let mut last = c.state.vel.length();
        let mut ticks = 0;
        while c.state.vel != Vec2::ZERO {
            c.momentum_step(1.0 / 60.0, &cfg);
            let speed = c.state.vel.length();
            assert!(speed <= last + 1e-3, "speed increased during decay");
            last = speed;
            ticks += 1;
            assert!(ticks < 10_000, "decay never terminated");
        }
        assert_eq!(c.state.vel, Vec2::ZERO);
    }

    #[test]
    fn test_flick_tiers_scale_release_velocity() {
        let (mut weak, cfg) = setup();
        let (mut strong, _) = setup();
        weak.state.vel = Vec2::new(cfg.flick_low * 0.5, 0.0);
        strong.state.vel = Vec2::new(cfg.flick_high + 1.0, 0.0);
        weak.release(&cfg);
        strong.release(&cfg);
        // Strong flick gets 4x tier vs. the 1x base tier
        let weak_ratio = weak.state.vel.x / (cfg.flick_low * 0.5);
        let strong_ratio = strong.state.vel.x / (cfg.flick_high + 1.0);
        assert!((weak_ratio - cfg.momentum).abs() < 1e-3);
        assert!((strong_ratio - cfg.momentum * 4.0).abs() < 1e-3);
    }

    #[test]
    fn test_joystick_deadzone() {
        let (mut c, cfg) = setup();
        let anchor = Vec2::new(200.0, 350.0);
        c.joystick_move(anchor + Vec2::new(cfg.deadzone * 0.5, 0.0), anchor, &cfg);
        assert_eq!(c.state.vel, Vec2::ZERO);
    }

    #[test]
    fn test_joystick_gain_is_superlinear() {
        let (mut c, cfg) = setup();
        let anchor = Vec2::new(200.0, 350.0);
        let span = cfg.joystick_max_radius - cfg.deadzone;

        c.joystick_move(anchor + Vec2::new(cfg.deadzone + span * 0.25, 0.0), anchor, &cfg);
        let quarter = c.state.vel.length();
        c.joystick_move(anchor + Vec2::new(cfg.deadzone + span * 0.5, 0.0), anchor, &cfg);
        let half = c.state.vel.length();
        c.joystick_move(anchor + Vec2::new(cfg.deadzone + span * 2.0, 0.0), anchor, &cfg);
        let capped = c.state.vel.length();

        // Doubling the deflection more than doubles the speed
        assert!(half > quarter * 2.0);
        // And the curve saturates at the configured max
        assert!((capped - cfg.pinpoint_max_speed).abs() < 1e-3);
    }

    #[test]
    fn test_touch_down_cancels_momentum() {
        let (mut c, cfg) = setup();
        c.state.vel = Vec2::new(500.0, 0.0);
        c.release(&cfg);
        c.cancel_momentum();
        assert_eq!(c.state.vel, Vec2::ZERO);
        c.momentum_step(1.0 / 60.0, &cfg);
        assert_eq!(c.state.vel, Vec2::ZERO);
    }
}
