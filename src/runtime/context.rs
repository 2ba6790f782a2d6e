//! The per-process runtime context
//!
//! Owns the slot store and the collision registry. The driver brackets each
//! tree build with [`Runtime::begin_tick`] and [`Runtime::end_tick`]; tests can
//! do the same by hand.

use std::any::{Any, type_name};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use super::deps::{Dep, deps_changed};
use super::hooks::{Handle, Hooks, StateSetter, TickInfo};
use super::slot::{IntoCleanup, Slot, SlotKind, SlotStore, drift};
use crate::collision::{CollisionBody, CollisionDetail, CollisionEngine, CollisionEntry, CollisionState, EntryId};
use crate::error::{Result, RuntimeError};

/// Slot store, collision registry and tick timing for one tree
#[derive(Debug, Default)]
pub struct Runtime {
    slots: SlotStore,
    collisions: CollisionEngine,
    tick: TickInfo,
}

impl Runtime {
    pub fn new() -> Self {
        Self {
            slots: SlotStore::new(),
            collisions: CollisionEngine::new(),
            tick: TickInfo::default(),
        }
    }

    /// Rewind call positions and empty the collision registry
    pub fn begin_tick(&mut self, delta: Duration) {
        self.tick = TickInfo {
            index: self.tick.index + 1,
            delta,
        };
        self.slots.reset();
        self.collisions.begin_tick();
    }

    /// Resolve this tick's collisions and dispatch handlers.
    ///
    /// Returns the number of intersecting pairs that were dispatched.
    pub fn end_tick(&mut self) -> usize {
        let visited = self.slots.visited();
        if visited < self.slots.len() {
            log::warn!(
                "tick {} reached {} of {} slots; stateful calls must not be conditional",
                self.tick.index,
                visited,
                self.slots.len()
            );
        }
        self.collisions.resolve();
        self.collisions.dispatched_pairs()
    }

    /// Run every pending effect cleanup and drop all slots
    pub fn teardown(&mut self) {
        self.slots.teardown();
        self.collisions = CollisionEngine::new();
    }

    pub fn collisions(&self) -> &CollisionEngine {
        &self.collisions
    }

    /// Number of slots created so far
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.slots.teardown();
    }
}

fn mismatch<T>(position: usize) -> RuntimeError {
    RuntimeError::SlotTypeMismatch {
        position,
        expected: type_name::<T>(),
    }
}

impl Hooks for Runtime {
    fn use_state<T: Clone + 'static>(&mut self, initial: T) -> Result<(T, StateSetter<T>)> {
        let position = self.slots.next_position();
        match self.slots.existing(position) {
            Some(Slot::State(stored)) => {
                let cell = stored
                    .clone()
                    .downcast::<RefCell<T>>()
                    .map_err(|_| mismatch::<T>(position))?;
                let value = cell.borrow().clone();
                Ok((value, StateSetter::new(cell)))
            }
            Some(other) => Err(drift(position, other, SlotKind::State)),
            None => {
                let cell = Rc::new(RefCell::new(initial.clone()));
                self.slots.insert(position, Slot::State(cell.clone()));
                Ok((initial, StateSetter::new(cell)))
            }
        }
    }

    fn use_effect<F, C>(&mut self, deps: &[Dep], effect: F) -> Result<()>
    where
        F: FnOnce() -> C,
        C: IntoCleanup,
    {
        let position = self.slots.next_position();
        match self.slots.existing(position) {
            Some(Slot::Effect {
                deps: previous,
                cleanup,
            }) => {
                if deps_changed(position, previous, deps)? {
                    log::debug!("effect {} re-running, deps {:?} -> {:?}", position, previous, deps);
                    if let Some(cleanup) = cleanup.take() {
                        cleanup();
                    }
                    *cleanup = effect().into_cleanup();
                    *previous = deps.to_vec();
                }
                Ok(())
            }
            Some(other) => Err(drift(position, other, SlotKind::Effect)),
            None => {
                let cleanup = effect().into_cleanup();
                self.slots.insert(
                    position,
                    Slot::Effect {
                        deps: deps.to_vec(),
                        cleanup,
                    },
                );
                Ok(())
            }
        }
    }

    fn use_memo<T, F>(&mut self, deps: &[Dep], factory: F) -> Result<T>
    where
        T: Clone + 'static,
        F: FnOnce() -> T,
    {
        let position = self.slots.next_position();
        match self.slots.existing(position) {
            Some(Slot::Memo {
                deps: previous,
                value,
            }) => {
                if !value.is::<T>() {
                    return Err(mismatch::<T>(position));
                }
                if deps_changed(position, previous, deps)? {
                    let fresh = factory();
                    *value = Box::new(fresh.clone());
                    *previous = deps.to_vec();
                    return Ok(fresh);
                }
                value
                    .downcast_ref::<T>()
                    .cloned()
                    .ok_or_else(|| mismatch::<T>(position))
            }
            Some(other) => Err(drift(position, other, SlotKind::Memo)),
            None => {
                let fresh = factory();
                self.slots.insert(
                    position,
                    Slot::Memo {
                        deps: deps.to_vec(),
                        value: Box::new(fresh.clone()),
                    },
                );
                Ok(fresh)
            }
        }
    }

    fn use_handle<T: 'static>(&mut self) -> Result<Handle<T>> {
        let position = self.slots.next_position();
        match self.slots.existing(position) {
            Some(Slot::Handle(stored)) => {
                let cell = stored
                    .clone()
                    .downcast::<RefCell<Option<T>>>()
                    .map_err(|_| mismatch::<T>(position))?;
                Ok(Handle::new(cell))
            }
            Some(other) => Err(drift(position, other, SlotKind::Handle)),
            None => {
                let cell: Rc<RefCell<Option<T>>> = Rc::new(RefCell::new(None));
                let stored: Rc<dyn Any> = cell.clone();
                self.slots.insert(position, Slot::Handle(stored));
                Ok(Handle::new(cell))
            }
        }
    }

    fn use_collision_when(
        &mut self,
        active: bool,
        body: CollisionBody,
        detail: CollisionDetail,
    ) -> Result<CollisionState> {
        let slot: Handle<EntryId> = self.use_handle()?;
        let collisions = &mut self.collisions;
        let id = slot.get_or_insert_with(|| collisions.allocate_id());
        let bounds = body.bounds()?;
        let events = self.collisions.results_for(id).to_vec();
        if active {
            self.collisions.register(CollisionEntry { id, bounds, detail })?;
        }
        Ok(CollisionState { id, bounds, events })
    }

    fn tick_info(&self) -> TickInfo {
        self.tick
    }
}
