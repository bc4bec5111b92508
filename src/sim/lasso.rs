//! Lasso trail recording, stabilization, and capture resolution
//!
//! The trail is an append-only sequence of world-space cursor positions,
//! coalesced by a minimum segment spacing to bound memory. Stabilization
//! (pinning) is a cosmetic damping of drift near the open trail; it never by
//! itself captures anything. Capture happens only when the loop closes:
//! broad-phase on the loop's bounding box, then an exact point-in-polygon
//! test per candidate.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::consts::CELL_SIZE;

use super::geom::{bounding_box, closing_index, point_in_polygon, polygon_area};
use super::world::World;

/// Read-only lasso snapshot for the presentation layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LassoState {
    /// Recorded trail, time-ordered, world space
    pub points: Vec<Vec2>,
    pub active: bool,
    pub closed: bool,
    /// Entity ids resolved at the last closure
    pub captured: Vec<u32>,
    /// Steering anchor while in lasso mode (world space)
    pub center: Option<Vec2>,
}

/// Owns the trail lifecycle: begin → record → close/release → reset
pub struct LassoEngine {
    pub state: LassoState,
}

impl LassoEngine {
    pub fn new() -> Self {
        Self {
            state: LassoState::default(),
        }
    }

    /// Start a fresh trail anchored at `center` (world space)
    pub fn begin(&mut self, center: Vec2) {
        self.state = LassoState {
            points: Vec::new(),
            active: true,
            closed: false,
            captured: Vec::new(),
            center: Some(center),
        };
    }

    /// Append a trail point unless it sits closer than `min_spacing` to the
    /// previous one. Returns whether the point was recorded.
    pub fn record(&mut self, world_pos: Vec2, min_spacing: f32) -> bool {
        if !self.state.active {
            return false;
        }
        if let Some(&last) = self.state.points.last()
            && last.distance(world_pos) < min_spacing
        {
            return false;
        }
        self.state.points.push(world_pos);
        true
    }

    /// If the trail currently satisfies the closure predicate, return the
    /// closed sub-loop as a polygon
    pub fn closed_loop(&self, cfg: &SimConfig) -> Option<Vec<Vec2>> {
        let i = closing_index(&self.state.points, cfg.closure_radius, cfg.min_loop_points)?;
        let loop_points = &self.state.points[i..];
        (polygon_area(loop_points) >= cfg.min_loop_area).then(|| loop_points.to_vec())
    }

    /// Discard the trail; a lasso is never reused across captures
    pub fn reset(&mut self) {
        self.state = LassoState::default();
    }
}

impl Default for LassoEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Pin entities near the open trail with a quadratic falloff.
///
/// `pin = 1 − (d / radius)²` damps procedural drift so numbers near the
/// boundary hold still. Purely a feel cue — distance to the trail plays no
/// part in the capture test.
pub fn stabilize(world: &mut World, trail: &[Vec2], radius: f32) {
    if trail.is_empty() || radius <= 0.0 {
        return;
    }
    let near = bounding_box(trail).expand(radius + CELL_SIZE * 0.5);
    for id in world.query_rect(&near) {
        let Some(e) = world.entity(id) else { continue };
        let d = super::geom::distance_to_polyline(e.world_pos, trail);
        if d < radius {
            let t = d / radius;
            world.set_pin(id, 1.0 - t * t);
        }
    }
}

/// Exact captured set for a closed polygon: every entity whose authoritative
/// position tests inside, independent of trail order, all-or-nothing per
/// entity. Does not mutate the world; the caller removes entities once the
/// capture is accepted.
pub fn captured_set(world: &World, polygon: &[Vec2]) -> Vec<u32> {
    if polygon.len() < 3 {
        return Vec::new();
    }
    let bbox = bounding_box(polygon);
    world
        .query_rect(&bbox)
        .into_iter()
        .filter(|&id| {
            world
                .entity(id)
                .is_some_and(|e| point_in_polygon(e.world_pos, polygon))
        })
        .collect()
}
