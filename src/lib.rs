//! Redraw - call-order reactive runtime with an AABB collision pass
//!
//! Core modules:
//! - `runtime`: Slot store and the state/effect/memo/handle hooks
//! - `collision`: Per-tick collision registry, broad and narrow phase
//! - `entity`: Entity descriptor tree returned by tree-builders
//! - `motion`: Animator, physics and camera-bound hooks built on the runtime
//! - `draw`: Drawing backend interface and command generation
//! - `driver`: Frame loop tying the runtime to a backend
//! - `settings`: Driver configuration

pub mod collision;
pub mod draw;
pub mod driver;
pub mod entity;
pub mod error;
pub mod motion;
pub mod runtime;
pub mod settings;

pub use collision::{CollisionBody, CollisionDetail, CollisionEventData, CollisionState, ShapeKind};
pub use draw::{DrawBackend, DrawCommand, RecordingBackend};
pub use driver::{Driver, FixedRateScheduler, FrameScheduler, ImmediateScheduler, StopHandle, TickReport};
pub use entity::{Entity, EntityKind};
pub use error::{Result, RuntimeError};
pub use motion::{
    Animator, AnimatorParams, BoundingBox, EdgeResponse, Edges, use_animator, use_camera_bound, use_physics,
};
pub use runtime::{Dep, Handle, Hooks, Runtime, SetState, StateSetter, TickInfo, cleanup};
pub use settings::Settings;

/// Default attribute values and driver constants
pub mod consts {
    /// Canvas size when none is given
    pub const DEFAULT_CANVAS_WIDTH: u32 = 450;
    pub const DEFAULT_CANVAS_HEIGHT: u32 = 650;

    pub const DEFAULT_TARGET_FPS: u32 = 60;

    /// Entity attribute defaults
    pub const DEFAULT_FONT: &str = "16px Arial";
    pub const DEFAULT_TEXT_FILL: &str = "#000";
    pub const DEFAULT_BACKGROUND: &str = "#000";
    pub const DEFAULT_LINE_WIDTH: f32 = 1.0;

    /// Debug overlay for registered collision boxes
    pub const COLLISION_BOUND_COLOR: &str = "blue";
    pub const COLLISION_BOUND_LINE_WIDTH: f32 = 4.0;

    /// Downward acceleration of `use_physics`, pixels per second squared
    pub const GRAVITY: f32 = 980.0;
    /// Share of horizontal velocity kept by `Animator::stop_x`
    pub const STOP_X_FACTOR: f32 = 0.04;
}
