//! Fatal usage errors
//!
//! Every variant is a programmer-facing contract violation. They are raised
//! at the offending call and abort the current tick's tree build; nothing in
//! the crate retries them.

use glam::Vec2;
use thiserror::Error;

use crate::collision::EntryId;
use crate::entity::EntityKind;
use crate::runtime::SlotKind;

/// Errors raised while building or resolving a tick.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// A dependency list changed length between ticks for the same slot.
    #[error(
        "dependency list at slot {position} changed length from {expected} to {found}; dependencies cannot be dynamic"
    )]
    DependencyArity {
        position: usize,
        expected: usize,
        found: usize,
    },
    /// A slot position was reached by a different kind of call than before.
    #[error("slot {position} was a {expected:?} call but is now a {found:?} call; call order drifted")]
    CallOrderDrift {
        position: usize,
        expected: SlotKind,
        found: SlotKind,
    },
    /// A slot position holds a value of another type than requested.
    #[error("slot {position} does not hold a value of type {expected}")]
    SlotTypeMismatch {
        position: usize,
        expected: &'static str,
    },
    /// A body was registered twice within one tick.
    #[error(
        "collision entry {id:?} ({name}) already registered this tick; only one collision per registrant is allowed"
    )]
    DuplicateRegistration { id: EntryId, name: String },
    /// A collision box with a non-finite corner or `min > max` on some axis.
    #[error("invalid collision box: min {min}, max {max}")]
    InvalidBox { min: Vec2, max: Vec2 },
    /// A text entity was given a child that is neither text nor a number.
    #[error("text entity can only render string or number children, found a {found:?} entity")]
    TextContent { found: EntityKind },
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, RuntimeError>;
