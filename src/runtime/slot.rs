//! Positional slot storage
//!
//! A slot is addressed only by how many stateful calls preceded it in the
//! current tick. The cursor is rewound once per tick; the slots themselves
//! live until the store is torn down.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::deps::Dep;
use crate::error::RuntimeError;

/// Cleanup returned by an effect, run before the effect re-runs or on teardown
pub type Cleanup = Box<dyn FnOnce()>;

/// Wrap a closure as an effect [`Cleanup`]
pub fn cleanup(f: impl FnOnce() + 'static) -> Cleanup {
    Box::new(f)
}

/// Values an effect may return: nothing, or something to run later
pub trait IntoCleanup {
    fn into_cleanup(self) -> Option<Cleanup>;
}

impl IntoCleanup for () {
    fn into_cleanup(self) -> Option<Cleanup> {
        None
    }
}

impl IntoCleanup for Cleanup {
    fn into_cleanup(self) -> Option<Cleanup> {
        Some(self)
    }
}

impl IntoCleanup for Option<Cleanup> {
    fn into_cleanup(self) -> Option<Cleanup> {
        self
    }
}

/// The four kinds of stateful call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotKind {
    State,
    Effect,
    Memo,
    Handle,
}

/// Stored data for one call position
pub(crate) enum Slot {
    /// Holds an `Rc<RefCell<T>>` shared with the state setter
    State(Rc<dyn Any>),
    Effect {
        deps: Vec<Dep>,
        cleanup: Option<Cleanup>,
    },
    Memo {
        deps: Vec<Dep>,
        value: Box<dyn Any>,
    },
    /// Holds an `Rc<RefCell<Option<T>>>` shared with the handle
    Handle(Rc<dyn Any>),
}

impl Slot {
    pub(crate) fn kind(&self) -> SlotKind {
        match self {
            Slot::State(_) => SlotKind::State,
            Slot::Effect { .. } => SlotKind::Effect,
            Slot::Memo { .. } => SlotKind::Memo,
            Slot::Handle(_) => SlotKind::Handle,
        }
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Effect { deps, cleanup } => f
                .debug_struct("Effect")
                .field("deps", deps)
                .field("has_cleanup", &cleanup.is_some())
                .finish(),
            Slot::Memo { deps, .. } => f.debug_struct("Memo").field("deps", deps).finish(),
            other => write!(f, "{:?}", other.kind()),
        }
    }
}

/// Error for a position reached by a different kind of call than before
pub(crate) fn drift(position: usize, stored: &Slot, requested: SlotKind) -> RuntimeError {
    RuntimeError::CallOrderDrift {
        position,
        expected: stored.kind(),
        found: requested,
    }
}

/// Slots in call order plus the per-tick cursor
#[derive(Debug, Default)]
pub(crate) struct SlotStore {
    slots: Vec<Slot>,
    cursor: usize,
}

impl SlotStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Rewind the cursor to the first position
    pub(crate) fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Claim the next position
    pub(crate) fn next_position(&mut self) -> usize {
        let position = self.cursor;
        self.cursor += 1;
        position
    }

    /// Positions claimed since the last reset
    pub(crate) fn visited(&self) -> usize {
        self.cursor
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Slot at `position`, or `None` when the position has never been reached
    pub(crate) fn existing(&mut self, position: usize) -> Option<&mut Slot> {
        self.slots.get_mut(position)
    }

    /// Store the first value for a freshly reached position
    pub(crate) fn insert(&mut self, position: usize, slot: Slot) {
        debug_assert_eq!(position, self.slots.len(), "slots are created in call order");
        log::trace!("slot {} created as {:?}", position, slot.kind());
        self.slots.push(slot);
    }

    /// Run every pending effect cleanup and forget all slots
    pub(crate) fn teardown(&mut self) {
        let mut cleanups = 0;
        for slot in self.slots.drain(..) {
            if let Slot::Effect {
                cleanup: Some(cleanup),
                ..
            } = slot
            {
                cleanup();
                cleanups += 1;
            }
        }
        self.cursor = 0;
        if cleanups > 0 {
            log::debug!("teardown ran {} effect cleanups", cleanups);
        }
    }
}
