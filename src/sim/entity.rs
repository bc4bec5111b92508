//! Number entities and their four tempers
//!
//! Every grid occupant belongs to exactly one temper, which fixes its value
//! pool and resting color. Drift jitter is a pure function of (id, time) so
//! identical seeds replay identical motion.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// The four fixed classification categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Temper {
    Woe,
    Frolic,
    Dread,
    Malice,
}

impl Temper {
    pub const ALL: [Temper; 4] = [Temper::Woe, Temper::Frolic, Temper::Dread, Temper::Malice];

    /// Stable bin index (session counters, UI slots)
    #[inline]
    pub fn index(&self) -> usize {
        match self {
            Temper::Woe => 0,
            Temper::Frolic => 1,
            Temper::Dread => 2,
            Temper::Malice => 3,
        }
    }

    /// Fixed pool of target digits for this temper
    pub fn values(&self) -> &'static [u8] {
        match self {
            Temper::Woe => &[1, 4, 7],
            Temper::Frolic => &[0, 2, 8],
            Temper::Dread => &[3, 6],
            Temper::Malice => &[5, 9],
        }
    }

    /// Resting color (linear RGB)
    pub fn base_color(&self) -> [f32; 3] {
        match self {
            Temper::Woe => [0.42, 0.58, 0.86],
            Temper::Frolic => [0.95, 0.80, 0.30],
            Temper::Dread => [0.62, 0.30, 0.72],
            Temper::Malice => [0.88, 0.32, 0.28],
        }
    }

    /// Only Dread spawns the rarer emphasized variant
    #[inline]
    pub fn can_be_scary(&self) -> bool {
        matches!(self, Temper::Dread)
    }
}

/// A captureable grid cell occupant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumberEntity {
    pub id: u32,
    /// Digit shown
    pub value: u8,
    /// Authoritative location in world space
    pub world_pos: Vec2,
    pub temper: Temper,
    /// Current / resting / goal colors for drift animation
    pub color: [f32; 3],
    pub base_color: [f32; 3],
    pub target_color: [f32; 3],
    /// Render scale, driven by proximity/animation, not gameplay
    pub scale: f32,
    /// Lasso-boundary stabilization currently applied
    pub is_pinned: bool,
    pub pin_strength: f32,
    /// Procedural jitter, recomputed per tick, never persisted
    #[serde(skip)]
    pub drift_offset: Vec2,
    /// Rarer emphasized variant within its temper
    pub is_scary: bool,
    /// Transient group-highlight animation strength
    pub wellup: f32,
}

impl NumberEntity {
    pub fn new(id: u32, value: u8, world_pos: Vec2, temper: Temper, is_scary: bool) -> Self {
        let base = temper.base_color();
        Self {
            id,
            value,
            world_pos,
            temper,
            color: base,
            base_color: base,
            target_color: base,
            scale: BASE_SCALE,
            is_pinned: false,
            pin_strength: 0.0,
            drift_offset: Vec2::ZERO,
            is_scary,
            wellup: 0.0,
        }
    }

    /// World position with jitter applied (what the renderer draws)
    #[inline]
    pub fn render_pos(&self) -> Vec2 {
        self.world_pos + self.drift_offset
    }

    /// Scale the animation eases toward
    #[inline]
    pub fn target_scale(&self) -> f32 {
        let base = if self.is_scary { SCARY_SCALE } else { BASE_SCALE };
        base + self.wellup * 0.25
    }

    /// Recompute this tick's drift offset; pin strength damps the jitter
    pub fn drift(&mut self, time_secs: f32, amplitude: f32) {
        let rate = if self.is_scary { SCARY_JITTER_RATE } else { 1.0 };
        let damp = (1.0 - self.pin_strength).clamp(0.0, 1.0);
        self.drift_offset = jitter(self.id, time_secs * rate) * amplitude * damp;
    }
}

/// Deterministic per-entity jitter, a pure function of (id, time)
///
/// Identical (id, time) always produces identical output, which keeps visual
/// replays reproducible. Phases and rates come from an integer hash of the id.
pub fn jitter(id: u32, time_secs: f32) -> Vec2 {
    use std::f32::consts::TAU;
    let hash = id.wrapping_mul(2654435761);
    let phase_x = (hash % 1000) as f32 / 1000.0 * TAU;
    let phase_y = ((hash >> 10) % 1000) as f32 / 1000.0 * TAU;
    let rate = 0.7 + ((hash >> 20) % 1000) as f32 / 1000.0 * 0.8;
    Vec2::new(
        (time_secs * rate + phase_x).sin(),
        (time_secs * rate * 1.31 + phase_y).cos(),
    )
}
