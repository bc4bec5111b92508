//! Tunable simulation parameters
//!
//! Every option has a safe default and is clamped into range by
//! [`SimConfig::sanitize`], so a bad value degrades the feel, never the tick
//! loop. Configs are hot-swappable: applying a new one does not reset entity
//! state.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Recognized tunable options for the simulation core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    // === World ===
    /// Grid dimensions in cells
    pub grid_cols: u32,
    pub grid_rows: u32,
    /// Probability a grid cell spawns an entity, in [0, 1]
    pub grid_density: f32,
    /// Spatial index cell size (world units, independent of entity size)
    pub index_cell_size: f32,
    /// Viewport size in world units
    pub viewport_size: Vec2,
    /// Viewport render scale
    pub viewport_scale: f32,
    /// How far the viewport may overshoot world bounds when panning
    pub viewport_margin: f32,
    /// Extra margin around the viewport for visibility queries (avoids pop-in)
    pub cull_margin: f32,

    // === Cursor: exploration (trackball) ===
    /// Base displacement gain for move events
    pub cursor_sensitivity: f32,
    /// Base momentum factor applied to release velocity
    pub momentum: f32,
    /// Per-tick friction at low speed (quick stop) and high speed (long coast)
    pub friction_low: f32,
    pub friction_high: f32,
    /// Speed below which momentum snaps to zero (px/s)
    pub stop_speed: f32,
    /// Release-speed thresholds (px/s) for the flick momentum boost tiers
    pub flick_low: f32,
    pub flick_medium: f32,
    pub flick_high: f32,
    /// Margin keeping the cursor inside the playable rect
    pub cursor_margin: f32,

    // === Cursor: pinpoint (joystick) ===
    /// Offsets below this produce no movement (px)
    pub deadzone: f32,
    /// Offset at which the joystick saturates (px)
    pub joystick_max_radius: f32,
    /// Power-law gain exponent, > 1 so small deflections crawl
    pub joystick_exponent: f32,
    /// Capped cursor speed in pinpoint mode (px/s)
    pub pinpoint_max_speed: f32,

    // === Gestures ===
    /// Press-and-hold time to enter pinpoint mode (ms)
    pub hold_ms: f64,
    /// Touch travel during pinpoint entry that turns the hold into a drag (px)
    pub entry_slop: f32,
    /// Cursor travel in pinpoint that begins a lasso trail (px)
    pub lasso_entry_travel: f32,

    // === Lasso ===
    /// Trail end must come within this distance of an earlier point to close
    pub closure_radius: f32,
    /// Closure candidates must sit at least this many points back
    pub min_loop_points: usize,
    /// Minimum enclosed area for a valid loop (world units²)
    pub min_loop_area: f32,
    /// Trail points closer together than this are coalesced
    pub min_segment_spacing: f32,
    /// Entities within this distance of the open trail get pinned
    pub stabilization_radius: f32,

    // === Animation ===
    /// Peak drift jitter amplitude (world units)
    pub drift_amplitude: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            grid_cols: 64,
            grid_rows: 48,
            grid_density: 0.55,
            index_cell_size: 96.0,
            viewport_size: Vec2::new(420.0, 720.0),
            viewport_scale: 1.0,
            viewport_margin: 64.0,
            cull_margin: 96.0,

            cursor_sensitivity: 1.0,
            momentum: 0.9,
            friction_low: 0.82,
            friction_high: 0.95,
            stop_speed: 12.0,
            flick_low: 600.0,
            flick_medium: 1200.0,
            flick_high: 2200.0,
            cursor_margin: 8.0,

            deadzone: 14.0,
            joystick_max_radius: 90.0,
            joystick_exponent: 1.8,
            pinpoint_max_speed: 320.0,

            hold_ms: 300.0,
            entry_slop: 12.0,
            lasso_entry_travel: 36.0,

            closure_radius: 28.0,
            min_loop_points: 8,
            min_loop_area: 900.0,
            min_segment_spacing: 6.0,
            stabilization_radius: 80.0,

            drift_amplitude: 3.5,
        }
    }
}

impl SimConfig {
    /// Clamp every option into its valid range, logging anything we had to fix
    pub fn sanitize(mut self) -> Self {
        fn clamp(fixed: &mut u32, name: &str, v: &mut f32, lo: f32, hi: f32) {
            let c = v.clamp(lo, hi);
            if !v.is_finite() || c != *v {
                *v = if v.is_finite() { c } else { lo };
                *fixed += 1;
                log::warn!("config option {name} out of range, clamped to {}", *v);
            }
        }

        let mut fixed = 0u32;

        clamp(&mut fixed, "grid_density", &mut self.grid_density, 0.0, 1.0);
        clamp(&mut fixed, "index_cell_size", &mut self.index_cell_size, 1.0, 4096.0);
        clamp(&mut fixed, "viewport_scale", &mut self.viewport_scale, 0.1, 8.0);
        clamp(&mut fixed, "viewport_margin", &mut self.viewport_margin, 0.0, 1024.0);
        clamp(&mut fixed, "cull_margin", &mut self.cull_margin, 0.0, 1024.0);
        clamp(&mut fixed, "viewport_size.x", &mut self.viewport_size.x, 64.0, 8192.0);
        clamp(&mut fixed, "viewport_size.y", &mut self.viewport_size.y, 64.0, 8192.0);

        clamp(&mut fixed, "cursor_sensitivity", &mut self.cursor_sensitivity, 0.1, 4.0);
        clamp(&mut fixed, "momentum", &mut self.momentum, 0.0, 2.0);
        clamp(&mut fixed, "friction_low", &mut self.friction_low, 0.01, 0.999);
        clamp(&mut fixed, "friction_high", &mut self.friction_high, 0.01, 0.999);
        if self.friction_high < self.friction_low {
            std::mem::swap(&mut self.friction_high, &mut self.friction_low);
            fixed += 1;
            log::warn!("friction bounds inverted, swapped");
        }
        clamp(&mut fixed, "stop_speed", &mut self.stop_speed, 0.1, 500.0);
        clamp(&mut fixed, "flick_low", &mut self.flick_low, 1.0, 100_000.0);
        clamp(&mut fixed, "flick_medium", &mut self.flick_medium, 1.0, 100_000.0);
        clamp(&mut fixed, "flick_high", &mut self.flick_high, 1.0, 100_000.0);
        clamp(&mut fixed, "cursor_margin", &mut self.cursor_margin, 0.0, 64.0);

        clamp(&mut fixed, "deadzone", &mut self.deadzone, 0.0, 200.0);
        clamp(&mut fixed, "joystick_max_radius", &mut self.joystick_max_radius, 1.0, 1000.0);
        if self.joystick_max_radius <= self.deadzone {
            self.joystick_max_radius = self.deadzone + 1.0;
            fixed += 1;
            log::warn!("joystick_max_radius below deadzone, bumped");
        }
        clamp(&mut fixed, "joystick_exponent", &mut self.joystick_exponent, 1.0, 6.0);
        clamp(&mut fixed, "pinpoint_max_speed", &mut self.pinpoint_max_speed, 1.0, 10_000.0);

        if !self.hold_ms.is_finite() || !(0.0..=10_000.0).contains(&self.hold_ms) {
            self.hold_ms = 300.0;
            fixed += 1;
            log::warn!("hold_ms out of range, reset to 300");
        }
        clamp(&mut fixed, "entry_slop", &mut self.entry_slop, 0.0, 200.0);
        clamp(&mut fixed, "lasso_entry_travel", &mut self.lasso_entry_travel, 0.0, 1000.0);

        clamp(&mut fixed, "closure_radius", &mut self.closure_radius, 1.0, 500.0);
        self.min_loop_points = self.min_loop_points.clamp(3, 256);
        clamp(&mut fixed, "min_loop_area", &mut self.min_loop_area, 0.0, 1e9);
        clamp(&mut fixed, "min_segment_spacing", &mut self.min_segment_spacing, 0.1, 100.0);
        clamp(&mut fixed, "stabilization_radius", &mut self.stabilization_radius, 0.0, 1000.0);

        clamp(&mut fixed, "drift_amplitude", &mut self.drift_amplitude, 0.0, 100.0);

        self.grid_cols = self.grid_cols.clamp(1, 512);
        self.grid_rows = self.grid_rows.clamp(1, 512);

        if fixed > 0 {
            log::info!("config sanitized, {fixed} option(s) clamped");
        }
        self
    }

    /// World bounds implied by the grid dimensions
    pub fn world_size(&self) -> Vec2 {
        Vec2::new(
            self.grid_cols as f32 * crate::consts::CELL_SIZE,
            self.grid_rows as f32 * crate::consts::CELL_SIZE,
        )
    }

    /// Playable screen rectangle size (viewport in screen units)
    pub fn screen_size(&self) -> Vec2 {
        self.viewport_size * self.viewport_scale
    }
}
