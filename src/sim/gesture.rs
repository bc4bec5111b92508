//! Gesture interpretation state machine
//!
//! Turns the raw pointer stream into mode transitions:
//!
//! ```text
//! Exploration --down--> PinpointEntry --hold >= threshold--> Pinpoint
//!     ^                     |  (early up => flick, slop => drag)
//!     |                     v
//!     +<-------------- Exploration
//! Pinpoint --sustained trail--> Lasso --loop closed--> Capture --> Exploration
//! ```
//!
//! Every transition is synchronous with the triggering input event; the only
//! waiting is the explicit hold timer, polled against the merged event/tick
//! clock. The machine decides *what* happened; the simulation facade applies
//! the physics and lasso consequences.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;

/// Current gesture mode (one active at a time)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GestureMode {
    #[default]
    Exploration,
    PinpointEntry,
    Pinpoint,
    Lasso,
    Capture,
}

/// What the facade should do with a move event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveAction {
    /// No pointer down, or movement still buffered during pinpoint entry
    None,
    /// Entry slop exceeded: the hold became a drag; apply the buffered
    /// displacement as a trackball move
    BeginDrag { delta: Vec2, elapsed_secs: f32 },
    /// Plain exploration drag
    Trackball { delta: Vec2 },
    /// Steer the pinpoint joystick against the anchor
    Joystick { anchor: Vec2 },
    /// Sustained directional trail: lasso recording begins this event
    EnterLasso { anchor: Vec2 },
}

/// What the facade should do with an up event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReleaseAction {
    /// No pointer was down
    None,
    /// Tap/flick released before the hold threshold: apply buffered
    /// displacement with exploration physics, then start momentum
    Flick { delta: Vec2, elapsed_secs: f32 },
    /// End of an exploration drag: start momentum
    EndDrag,
    /// Pinpoint exited without a trail, no capture attempt
    ExitPinpoint,
    /// Lasso released: resolve if the loop already closes, else discard
    ReleaseLasso,
}

/// Interprets the pointer stream into gesture modes
pub struct GestureMachine {
    mode: GestureMode,
    touch_active: bool,
    down_at_ms: f64,
    down_pos: Vec2,
    last_touch: Vec2,
    last_event_ms: f64,
    /// Displacement buffered while deciding hold vs. drag
    entry_delta: Vec2,
    /// Joystick anchor, fixed at the moment pinpoint engages
    anchor: Vec2,
    /// Accumulated touch travel while in pinpoint (lasso entry detection)
    travel: f32,
}

impl GestureMachine {
    pub fn new() -> Self {
        Self {
            mode: GestureMode::Exploration,
            touch_active: false,
            down_at_ms: 0.0,
            down_pos: Vec2::ZERO,
            last_touch: Vec2::ZERO,
            last_event_ms: 0.0,
            entry_delta: Vec2::ZERO,
            anchor: Vec2::ZERO,
            travel: 0.0,
        }
    }

    #[inline]
    pub fn mode(&self) -> GestureMode {
        self.mode
    }

    #[inline]
    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    #[inline]
    pub fn touch_active(&self) -> bool {
        self.touch_active
    }

    /// Touch-down: unconditionally restarts the gesture in PinpointEntry
    pub fn touch_down(&mut self, now_ms: f64, p: Vec2) {
        self.mode = GestureMode::PinpointEntry;
        self.touch_active = true;
        self.down_at_ms = now_ms;
        self.down_pos = p;
        self.last_touch = p;
        self.last_event_ms = now_ms;
        self.entry_delta = Vec2::ZERO;
        self.travel = 0.0;
    }

    /// Promote PinpointEntry to Pinpoint once the hold timer matures.
    /// Returns true when the promotion happens on this poll.
    pub fn poll_hold(&mut self, now_ms: f64, cfg: &SimConfig) -> bool {
        if self.mode == GestureMode::PinpointEntry
            && self.touch_active
            && now_ms - self.down_at_ms >= cfg.hold_ms
        {
            self.mode = GestureMode::Pinpoint;
            self.anchor = self.last_touch;
            self.travel = 0.0;
            return true;
        }
        false
    }

    pub fn touch_move(&mut self, now_ms: f64, p: Vec2, cfg: &SimConfig) -> MoveAction {
        if !self.touch_active {
            return MoveAction::None;
        }
        let delta = p - self.last_touch;
        self.last_touch = p;
        self.last_event_ms = now_ms;

        match self.mode {
            GestureMode::PinpointEntry => {
                self.entry_delta += delta;
                if p.distance(self.down_pos) > cfg.entry_slop {
                    // Too much motion for a hold: this is an exploration drag
                    self.mode = GestureMode::Exploration;
                    let elapsed = ((now_ms - self.down_at_ms) / 1000.0).max(0.0) as f32;
                    return MoveAction::BeginDrag {
                        delta: self.entry_delta,
                        elapsed_secs: elapsed,
                    };
                }
                MoveAction::None
            }
            GestureMode::Exploration => MoveAction::Trackball { delta },
            GestureMode::Pinpoint => {
                let offset = p.distance(self.anchor);
                if offset > cfg.deadzone {
                    self.travel += delta.length();
                }
                if self.travel >= cfg.lasso_entry_travel {
                    self.mode = GestureMode::Lasso;
                    return MoveAction::EnterLasso { anchor: self.anchor };
                }
                MoveAction::Joystick { anchor: self.anchor }
            }
            GestureMode::Lasso => MoveAction::Joystick { anchor: self.anchor },
            // Capture resolves synchronously inside the facade; a move
            // arriving mid-resolution is dropped
            GestureMode::Capture => MoveAction::None,
        }
    }

    pub fn touch_up(&mut self, now_ms: f64, p: Vec2) -> ReleaseAction {
        if !self.touch_active {
            return ReleaseAction::None;
        }
        self.touch_active = false;
        self.last_touch = p;
        let prev = self.mode;
        self.mode = GestureMode::Exploration;

        match prev {
            GestureMode::PinpointEntry => {
                let elapsed = ((now_ms - self.down_at_ms) / 1000.0).max(0.0) as f32;
                ReleaseAction::Flick {
                    delta: p - self.down_pos,
                    elapsed_secs: elapsed,
                }
            }
            GestureMode::Exploration => ReleaseAction::EndDrag,
            GestureMode::Pinpoint => ReleaseAction::ExitPinpoint,
            GestureMode::Lasso => ReleaseAction::ReleaseLasso,
            GestureMode::Capture => ReleaseAction::None,
        }
    }

    /// Closure detected: enter the transient Capture state
    pub fn begin_capture(&mut self) {
        self.mode = GestureMode::Capture;
    }

    /// Resolution finished: back to exploration. The touch may still be down;
    /// a stale finger no longer drives a gesture until it lifts.
    pub fn finish_capture(&mut self) {
        self.mode = GestureMode::Exploration;
        self.touch_active = false;
    }
}

impl Default for GestureMachine {
    fn default() -> Self {
        Self::new()
    }
}
