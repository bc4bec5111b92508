//! Deterministic simulation core
//!
//! Everything here is pure state plus explicit inputs: pointer events carry
//! their own timestamps, ticks carry their deltas, and world generation takes
//! a seed. Given the same sequence, two instances stay bit-identical.

pub mod cursor;
pub mod engine;
pub mod entity;
pub mod geom;
pub mod gesture;
pub mod lasso;
pub mod spatial;
pub mod world;

pub use cursor::{CursorMode, CursorState};
pub use engine::{CapturePolicy, FeedbackEvent, Simulation};
pub use entity::{NumberEntity, Temper};
pub use geom::Rect;
pub use gesture::GestureMode;
pub use lasso::LassoState;
pub use spatial::SpatialGrid;
pub use world::{Viewport, World};
