//! Reusable motion hooks composed from the stateful calls
//!
//! - [`use_animator`]: position and velocity slots advanced by the tick delta,
//!   optionally confined to a bounding box
//! - [`use_physics`]: an animator with gravity
//! - [`use_camera_bound`]: reports a position leaving the drawing surface

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{GRAVITY, STOP_X_FACTOR};
use crate::deps;
use crate::error::Result;
use crate::runtime::{Hooks, StateSetter};

/// What happens to velocity when a bounding box edge is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EdgeResponse {
    /// Zero the velocity on that axis
    #[default]
    Stop,
    /// Turn the velocity on that axis back inside
    Bounce,
}

/// Per-axis position limits; `None` leaves an axis free
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: Option<(f32, f32)>,
    pub y: Option<(f32, f32)>,
    pub response: EdgeResponse,
}

impl BoundingBox {
    pub fn new(x: Option<(f32, f32)>, y: Option<(f32, f32)>) -> Self {
        Self {
            x,
            y,
            response: EdgeResponse::Stop,
        }
    }

    pub fn bounce(mut self) -> Self {
        self.response = EdgeResponse::Bounce;
        self
    }

    /// Clamp `position` into the box, adjusting `velocity` on clamped axes
    pub fn confine(&self, position: Vec2, velocity: Vec2) -> (Vec2, Vec2) {
        let (x, vx) = confine_axis(self.x, position.x, velocity.x, self.response);
        let (y, vy) = confine_axis(self.y, position.y, velocity.y, self.response);
        (Vec2::new(x, y), Vec2::new(vx, vy))
    }
}

fn confine_axis(limits: Option<(f32, f32)>, p: f32, v: f32, response: EdgeResponse) -> (f32, f32) {
    let Some((lo, hi)) = limits else {
        return (p, v);
    };
    let at_edge = |inward: f32| match response {
        EdgeResponse::Stop => 0.0,
        EdgeResponse::Bounce => inward * v.abs(),
    };
    if p < lo {
        (lo, at_edge(1.0))
    } else if p > hi {
        (hi, at_edge(-1.0))
    } else {
        (p, v)
    }
}

/// Starting point and limits of an animator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimatorParams {
    pub position: Vec2,
    /// Velocity change of one steering call
    pub speed: f32,
    pub max_speed: f32,
    /// Constant acceleration, per second squared
    pub acceleration: Vec2,
    pub bounds: Option<BoundingBox>,
}

impl AnimatorParams {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            speed: 1.0,
            max_speed: f32::INFINITY,
            acceleration: Vec2::ZERO,
            bounds: None,
        }
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_max_speed(mut self, max_speed: f32) -> Self {
        self.max_speed = max_speed;
        self
    }

    pub fn with_acceleration(mut self, acceleration: Vec2) -> Self {
        self.acceleration = acceleration;
        self
    }

    pub fn with_bounds(mut self, bounds: BoundingBox) -> Self {
        self.bounds = Some(bounds);
        self
    }
}

/// Motion state of one animated body.
///
/// `position` and `velocity` are the values at the start of this tick. The
/// helpers write through the velocity slot and take effect on the next tick;
/// clones share the same slots, so an animator can be captured by handlers.
#[derive(Debug, Clone)]
pub struct Animator {
    pub position: Vec2,
    pub velocity: Vec2,
    speed: f32,
    position_slot: StateSetter<Vec2>,
    velocity_slot: StateSetter<Vec2>,
}

impl Animator {
    /// Velocity including writes made earlier in this tick
    pub fn latest_velocity(&self) -> Vec2 {
        self.velocity_slot.get()
    }

    pub fn set_position(&self, position: Vec2) {
        self.position_slot.set(position);
    }

    pub fn set_velocity(&self, velocity: Vec2) {
        self.velocity_slot.set(velocity);
    }

    pub fn update_velocity(&self, f: impl FnOnce(Vec2) -> Vec2) {
        self.velocity_slot.update(|v| f(*v));
    }

    /// Accelerate left, dropping any rightward motion first
    pub fn steer_left(&self) {
        let speed = self.speed;
        self.update_velocity(|v| Vec2::new(v.x.min(0.0) - speed, v.y));
    }

    pub fn steer_right(&self) {
        let speed = self.speed;
        self.update_velocity(|v| Vec2::new(v.x.max(0.0) + speed, v.y));
    }

    pub fn steer_down(&self) {
        let speed = self.speed;
        self.update_velocity(|v| Vec2::new(v.x, v.y + speed));
    }

    /// Nearly halt horizontal motion
    pub fn stop_x(&self) {
        self.update_velocity(|v| Vec2::new(v.x * STOP_X_FACTOR, v.y));
    }

    pub fn bounce_left(&self) {
        self.update_velocity(|v| Vec2::new(-v.x.abs(), v.y));
    }

    pub fn bounce_right(&self) {
        self.update_velocity(|v| Vec2::new(v.x.abs(), v.y));
    }

    pub fn bounce_up(&self) {
        self.update_velocity(|v| Vec2::new(v.x, -v.y.abs()));
    }

    pub fn bounce_down(&self) {
        self.update_velocity(|v| Vec2::new(v.x, v.y.abs()));
    }
}

/// Position and velocity slots advanced once per tick.
///
/// Takes two state slots. Velocity gains `acceleration * dt` and is capped at
/// `max_speed`, then moves the position; `bounds` clamps the result.
pub fn use_animator<H: Hooks>(rt: &mut H, params: AnimatorParams) -> Result<Animator> {
    let dt = rt.tick_info().delta.as_secs_f32();
    let (position, position_slot) = rt.use_state(params.position)?;
    let (velocity, velocity_slot) = rt.use_state(Vec2::ZERO)?;

    let mut next_velocity = (velocity + params.acceleration * dt).clamp_length_max(params.max_speed);
    let mut next_position = position + next_velocity * dt;
    if let Some(bounds) = params.bounds {
        (next_position, next_velocity) = bounds.confine(next_position, next_velocity);
    }
    position_slot.set(next_position);
    velocity_slot.set(next_velocity);

    Ok(Animator {
        position,
        velocity,
        speed: params.speed,
        position_slot,
        velocity_slot,
    })
}

/// An animator pulled down by [`GRAVITY`] unless another acceleration is given
pub fn use_physics<H: Hooks>(rt: &mut H, params: AnimatorParams) -> Result<Animator> {
    let params = if params.acceleration == Vec2::ZERO {
        params.with_acceleration(Vec2::new(0.0, GRAVITY))
    } else {
        params
    };
    use_animator(rt, params)
}

/// Surface edges a position lies beyond
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Edges {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl Edges {
    /// Edges of a `surface`-sized area at the origin that `position` is past
    pub fn crossed(position: Vec2, surface: Vec2) -> Self {
        Self {
            left: position.x < 0.0,
            right: position.x > surface.x,
            top: position.y < 0.0,
            bottom: position.y > surface.y,
        }
    }

    pub fn any(&self) -> bool {
        self.left || self.right || self.top || self.bottom
    }
}

/// Call `on_cross` when `position` leaves the surface.
///
/// Takes one effect slot keyed on the crossed edges, so the callback runs once
/// per crossing rather than on every tick spent outside.
pub fn use_camera_bound<H: Hooks>(
    rt: &mut H,
    position: Vec2,
    surface: Vec2,
    on_cross: impl FnOnce(Edges),
) -> Result<Edges> {
    let edges = Edges::crossed(position, surface);
    rt.use_effect(&deps![edges.left, edges.right, edges.top, edges.bottom], move || {
        if edges.any() {
            on_cross(edges);
        }
    })?;
    Ok(edges)
}
