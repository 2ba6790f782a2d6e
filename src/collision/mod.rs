//! Axis-aligned collision pass
//!
//! Bodies are registered during the tree build, resolved once after it, and
//! their results are read by the next tick's registrants:
//! - `geometry`: boxes, shape mapping, velocity sweep, narrow-phase test
//! - `engine`: per-tick registry, broad phase, dispatch

pub mod engine;
pub mod geometry;

pub use engine::{
    CollisionDetail, CollisionEngine, CollisionEntry, CollisionEventData, CollisionHandler,
    CollisionResults, CollisionState, EntryId, query_by_name,
};
pub use geometry::{CollisionBody, CollisionBox, Intersection, ShapeKind, check_intersection};
