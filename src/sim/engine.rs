//! Simulation facade
//!
//! Owns every subsystem and routes the two external clocks through a single
//! timeline: the irregular pointer-event stream and the variable-rate tick.
//! All mutation happens inside these entry points, in a fixed order per tick
//! (input deltas before spatial queries, capture resolution atomic within its
//! tick), so no locking is needed and no partial capture state is observable.

use glam::Vec2;

use crate::config::SimConfig;
use crate::consts::*;
use crate::session::SessionProgress;

use super::cursor::{CursorMode, CursorPhysics, CursorState};
use super::entity::{NumberEntity, Temper};
use super::gesture::{GestureMachine, GestureMode, MoveAction, ReleaseAction};
use super::lasso::{LassoEngine, LassoState, captured_set, stabilize};
use super::world::World;

/// Abstract feedback for the presentation layer (audio/haptics/visuals).
/// The core never drives those devices itself.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedbackEvent {
    /// A closed loop captured entities the policy accepted
    CaptureSuccess { ids: Vec<u32>, temper: Temper },
    /// A closed loop resolved but the policy rejected it (or it was empty)
    CaptureFailure { ids: Vec<u32> },
    /// The gesture mode changed
    ModeSwitch { mode: GestureMode },
}

/// When does a resolved capture count as a success?
///
/// Category matching is a shell-level game rule, so it is injected rather
/// than hard-coded. The default accepts any non-empty capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapturePolicy {
    /// Any non-empty captured set succeeds
    #[default]
    AnyNonEmpty,
    /// Every captured entity must match the target temper
    RequireTemper(Temper),
}

impl CapturePolicy {
    pub fn accepts(&self, tempers: &[Temper]) -> bool {
        match self {
            CapturePolicy::AnyNonEmpty => !tempers.is_empty(),
            CapturePolicy::RequireTemper(t) => {
                !tempers.is_empty() && tempers.iter().all(|x| x == t)
            }
        }
    }
}

type Listener = Box<dyn FnMut(&FeedbackEvent)>;

/// Top-level simulation context; construct one per independent game instance
pub struct Simulation {
    cfg: SimConfig,
    world: World,
    cursor: CursorPhysics,
    gesture: GestureMachine,
    lasso: LassoEngine,
    session: SessionProgress,
    policy: CapturePolicy,
    /// Merged event/tick clock (ms); event timestamps only move it forward
    clock_ms: f64,
    /// Simulation time driven by ticks (seconds), feeds the drift animation
    time_secs: f32,
    last_pointer_ms: f64,
    events: Vec<FeedbackEvent>,
    listeners: Vec<Listener>,
    wellup_timer: f32,
    wellup_count: u32,
}

impl Simulation {
    pub fn new(cfg: SimConfig, seed: u64) -> Self {
        let cfg = cfg.sanitize();
        let mut world = World::new(&cfg);
        world.generate(cfg.grid_density, seed, &cfg);
        let cursor = CursorPhysics::new(world.viewport.screen_rect());
        log::info!("simulation ready (seed {seed})");
        Self {
            cfg,
            world,
            cursor,
            gesture: GestureMachine::new(),
            lasso: LassoEngine::new(),
            session: SessionProgress::new(),
            policy: CapturePolicy::default(),
            clock_ms: 0.0,
            time_secs: 0.0,
            last_pointer_ms: 0.0,
            events: Vec::new(),
            listeners: Vec::new(),
            wellup_timer: WELLUP_PERIOD,
            wellup_count: 0,
        }
    }

    // === Read-only snapshots ===

    pub fn visible_entities(&self) -> Vec<&NumberEntity> {
        self.world.visible_entities(self.cfg.cull_margin)
    }

    pub fn cursor(&self) -> &CursorState {
        &self.cursor.state
    }

    pub fn lasso(&self) -> &LassoState {
        &self.lasso.state
    }

    pub fn session(&self) -> &SessionProgress {
        &self.session
    }

    pub fn mode(&self) -> GestureMode {
        self.gesture.mode()
    }

    pub fn config(&self) -> &SimConfig {
        &self.cfg
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    // === Configuration ===

    /// Hot-swap the configuration without resetting entity state
    pub fn set_config(&mut self, cfg: SimConfig) {
        self.cfg = cfg.sanitize();
        self.world.apply_view_config(&self.cfg);
        self.cursor
            .set_bounds(self.world.viewport.screen_rect(), self.cfg.cursor_margin);
        log::info!("config applied");
    }

    pub fn set_capture_policy(&mut self, policy: CapturePolicy) {
        self.policy = policy;
    }

    /// Restore persisted aggregate progress (per-frame state is never saved)
    pub fn restore_session(&mut self, progress: SessionProgress) {
        self.session = progress;
    }

    // === Feedback ===

    /// Subscribe to feedback events; listeners fire synchronously on emit
    pub fn on_feedback(&mut self, listener: impl FnMut(&FeedbackEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Take all events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<FeedbackEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: FeedbackEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
        self.events.push(event);
    }

    // === Pointer stream ===

    pub fn on_pointer_down(&mut self, p: Vec2, timestamp_ms: f64) {
        self.sync_clock(timestamp_ms);
        // A new gesture grant cancels any in-flight coast and trail
        self.cursor.cancel_momentum();
        if self.lasso.state.active {
            self.lasso.reset();
        }
        self.gesture.touch_down(self.clock_ms, p);
        self.last_pointer_ms = self.clock_ms;
    }

    pub fn on_pointer_move(&mut self, p: Vec2, timestamp_ms: f64) {
        self.sync_clock(timestamp_ms);
        self.poll_hold();

        let dt = ((self.clock_ms - self.last_pointer_ms) / 1000.0).clamp(0.001, 0.25) as f32;
        self.last_pointer_ms = self.clock_ms;

        match self.gesture.touch_move(self.clock_ms, p, &self.cfg) {
            MoveAction::None => {}
            MoveAction::BeginDrag { delta, elapsed_secs } => {
                self.cursor
                    .trackball_move(delta, elapsed_secs.max(0.001), &self.cfg);
            }
            MoveAction::Trackball { delta } => {
                self.cursor.trackball_move(delta, dt, &self.cfg);
            }
            MoveAction::Joystick { anchor } => {
                self.cursor.joystick_move(p, anchor, &self.cfg);
            }
            MoveAction::EnterLasso { anchor } => {
                self.cursor.joystick_move(p, anchor, &self.cfg);
                let center = self.world.viewport.screen_to_world(anchor);
                self.lasso.begin(center);
                self.emit(FeedbackEvent::ModeSwitch {
                    mode: GestureMode::Lasso,
                });
            }
        }

        self.advance_lasso();
    }

    pub fn on_pointer_up(&mut self, p: Vec2, timestamp_ms: f64) {
        self.sync_clock(timestamp_ms);
        // Promotion happens before the release so a full hold registers as
        // pinpoint even when the up event is the first thing we hear
        self.poll_hold();

        match self.gesture.touch_up(self.clock_ms, p) {
            ReleaseAction::None => {}
            ReleaseAction::Flick { delta, elapsed_secs } => {
                self.cursor
                    .trackball_move(delta, elapsed_secs.max(0.001), &self.cfg);
                self.cursor.release(&self.cfg);
            }
            ReleaseAction::EndDrag => {
                self.cursor.release(&self.cfg);
            }
            ReleaseAction::ExitPinpoint => {
                self.exit_to_exploration();
            }
            ReleaseAction::ReleaseLasso => {
                // Resolve if the trail already satisfies closure, else discard
                if let Some(polygon) = self.lasso.closed_loop(&self.cfg) {
                    self.resolve_capture(polygon);
                } else {
                    self.lasso.reset();
                    self.exit_to_exploration();
                }
            }
        }
        self.last_pointer_ms = self.clock_ms;
    }

    // === Frame tick ===

    /// Advance physics/animation by `dt_ms`. Callable at any rate; zero or
    /// negative deltas leave every position untouched.
    pub fn tick(&mut self, dt_ms: f64) {
        if !(dt_ms > 0.0) {
            return;
        }
        self.clock_ms += dt_ms;
        let dt = ((dt_ms / 1000.0) as f32).min(0.25);

        self.poll_hold();

        // Input-driven deltas first, then queries (ordering contract)
        match self.gesture.mode() {
            GestureMode::Exploration => {
                if !self.gesture.touch_active() {
                    self.cursor.momentum_step(dt, &self.cfg);
                }
            }
            GestureMode::Pinpoint | GestureMode::Lasso => {
                self.cursor.joystick_step(dt, &self.cfg);
            }
            GestureMode::PinpointEntry | GestureMode::Capture => {}
        }

        self.advance_lasso();

        self.time_secs += dt;
        self.world.animate(self.time_secs, dt, &self.cfg);

        self.wellup_timer -= dt;
        if self.wellup_timer <= 0.0 {
            self.wellup_timer += WELLUP_PERIOD;
            self.pulse_wellup();
        }

        self.cursor.state.mode = match self.gesture.mode() {
            GestureMode::Pinpoint | GestureMode::Lasso => CursorMode::Pinpoint,
            _ => CursorMode::Exploration,
        };
        self.cursor.glow_step(dt);
        self.session.elapsed_secs += dt as f64;
    }

    /// Pan the camera (clamped to world bounds plus the configured margin)
    pub fn pan_view(&mut self, dx: f32, dy: f32) {
        self.world.pan(Vec2::new(dx, dy), self.cfg.viewport_margin);
    }

    // === Internals ===

    fn sync_clock(&mut self, timestamp_ms: f64) {
        if timestamp_ms.is_finite() && timestamp_ms > self.clock_ms {
            self.clock_ms = timestamp_ms;
        }
    }

    fn poll_hold(&mut self) {
        if self.gesture.poll_hold(self.clock_ms, &self.cfg) {
            self.cursor.state.mode = CursorMode::Pinpoint;
            self.cursor.state.vel = Vec2::ZERO;
            self.emit(FeedbackEvent::ModeSwitch {
                mode: GestureMode::Pinpoint,
            });
        }
    }

    /// Record the trail at the cursor, apply stabilization, resolve closure
    fn advance_lasso(&mut self) {
        if !self.lasso.state.active {
            return;
        }
        let cursor_world = self.world.viewport.screen_to_world(self.cursor.state.pos);
        self.lasso.record(cursor_world, self.cfg.min_segment_spacing);
        stabilize(
            &mut self.world,
            &self.lasso.state.points,
            self.cfg.stabilization_radius,
        );
        if let Some(polygon) = self.lasso.closed_loop(&self.cfg) {
            self.resolve_capture(polygon);
        }
    }

    /// Atomic within the tick: captured set computed, policy applied, world
    /// updated, one feedback event emitted, lasso discarded
    fn resolve_capture(&mut self, polygon: Vec<Vec2>) {
        self.gesture.begin_capture();
        self.lasso.state.closed = true;

        let ids = captured_set(&self.world, &polygon);
        self.lasso.state.captured = ids.clone();
        let tempers: Vec<Temper> = ids
            .iter()
            .filter_map(|id| self.world.entity(*id))
            .map(|e| e.temper)
            .collect();

        if self.policy.accepts(&tempers) {
            let mut counts = [0u32; 4];
            for t in &tempers {
                counts[t.index()] += 1;
            }
            for id in &ids {
                self.world.remove(*id);
            }
            for t in Temper::ALL {
                if counts[t.index()] > 0 {
                    self.session.record_capture(t, counts[t.index()]);
                }
            }
            let dominant = Temper::ALL
                .into_iter()
                .max_by_key(|t| counts[t.index()])
                .unwrap_or(Temper::Woe);
            log::info!("captured {} entities ({dominant:?} dominant)", ids.len());
            self.emit(FeedbackEvent::CaptureSuccess {
                ids,
                temper: dominant,
            });
        } else {
            log::debug!("capture rejected ({} candidates)", ids.len());
            self.emit(FeedbackEvent::CaptureFailure { ids });
        }

        self.lasso.reset();
        self.gesture.finish_capture();
        self.exit_to_exploration();
    }

    fn exit_to_exploration(&mut self) {
        self.cursor.state.mode = CursorMode::Exploration;
        self.cursor.state.vel = Vec2::ZERO;
        self.cursor.state.is_moving = false;
        self.emit(FeedbackEvent::ModeSwitch {
            mode: GestureMode::Exploration,
        });
    }

    /// Deterministic periodic cluster highlight: the pulse index hashes to a
    /// grid cell, so identical seeds and tick sequences replay identically
    fn pulse_wellup(&mut self) {
        let h = self.wellup_count.wrapping_mul(2654435761);
        self.wellup_count = self.wellup_count.wrapping_add(1);
        let col = h % self.cfg.grid_cols.max(1);
        let row = (h >> 16) % self.cfg.grid_rows.max(1);
        let center = Vec2::new(
            (col as f32 + 0.5) * CELL_SIZE,
            (row as f32 + 0.5) * CELL_SIZE,
        );
        self.world.trigger_wellup(center, WELLUP_RADIUS);
    }
}
