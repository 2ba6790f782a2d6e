//! The stateful call surface handed to tree-builders
//!
//! Every method must be called unconditionally and in the same order on every
//! tick: the position of a call is its only identity.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use super::deps::Dep;
use super::slot::IntoCleanup;
use crate::collision::{CollisionBody, CollisionDetail, CollisionState};
use crate::error::Result;

/// A state write: a literal replacement or a function of the previous value
pub enum SetState<T> {
    Replace(T),
    Update(Box<dyn FnOnce(&T) -> T>),
}

impl<T> From<T> for SetState<T> {
    fn from(value: T) -> Self {
        SetState::Replace(value)
    }
}

/// Writer for one state slot.
///
/// Writes land in the slot immediately; there is no batching, the last write
/// before the next read wins.
pub struct StateSetter<T> {
    cell: Rc<RefCell<T>>,
}

impl<T> Clone for StateSetter<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for StateSetter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StateSetter").field(&self.cell.borrow()).finish()
    }
}

impl<T> StateSetter<T> {
    pub(crate) fn new(cell: Rc<RefCell<T>>) -> Self {
        Self { cell }
    }

    /// Replace the stored value
    pub fn set(&self, value: T) {
        *self.cell.borrow_mut() = value;
    }

    /// Derive the stored value from the previous one
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = f(&self.cell.borrow());
        *self.cell.borrow_mut() = next;
    }

    pub fn apply(&self, action: impl Into<SetState<T>>) {
        match action.into() {
            SetState::Replace(value) => self.set(value),
            SetState::Update(f) => self.update(f),
        }
    }

    /// Current stored value, including writes made earlier in this tick
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.cell.borrow().clone()
    }
}

/// Storage that survives across ticks and ignores dependency comparison
pub struct Handle<T> {
    cell: Rc<RefCell<Option<T>>>,
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("is_set", &self.is_set())
            .finish()
    }
}

impl<T> Handle<T> {
    pub(crate) fn new(cell: Rc<RefCell<Option<T>>>) -> Self {
        Self { cell }
    }

    pub fn get(&self) -> Option<T>
    where
        T: Clone,
    {
        self.cell.borrow().clone()
    }

    pub fn set(&self, value: T) {
        *self.cell.borrow_mut() = Some(value);
    }

    pub fn take(&self) -> Option<T> {
        self.cell.borrow_mut().take()
    }

    pub fn is_set(&self) -> bool {
        self.cell.borrow().is_some()
    }

    /// Borrow the stored value mutably for the duration of `f`
    pub fn with<R>(&self, f: impl FnOnce(Option<&mut T>) -> R) -> R {
        f(self.cell.borrow_mut().as_mut())
    }

    /// Return the stored value, storing `init()` first if the handle is empty
    pub fn get_or_insert_with(&self, init: impl FnOnce() -> T) -> T
    where
        T: Clone,
    {
        self.cell.borrow_mut().get_or_insert_with(init).clone()
    }

    /// Whether both handles address the same slot
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }
}

/// Frame timing for the tick being built
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInfo {
    /// 1-based tick counter, 0 before the first tick
    pub index: u64,
    /// Wall time between the start of the previous tick and this one
    pub delta: Duration,
}

/// Narrow interface the driver injects into every tree-builder
pub trait Hooks {
    /// Persistent value with a synchronous setter
    fn use_state<T: Clone + 'static>(&mut self, initial: T) -> Result<(T, StateSetter<T>)>;

    /// Run `effect` on first call and whenever `deps` changes
    fn use_effect<F, C>(&mut self, deps: &[Dep], effect: F) -> Result<()>
    where
        F: FnOnce() -> C,
        C: IntoCleanup;

    /// Cached value recomputed only when `deps` changes
    fn use_memo<T, F>(&mut self, deps: &[Dep], factory: F) -> Result<T>
    where
        T: Clone + 'static,
        F: FnOnce() -> T;

    /// Memoized closure identity; the same `Rc` comes back while `deps` are equal
    fn use_callback<F: 'static>(&mut self, deps: &[Dep], callback: F) -> Result<Rc<F>> {
        self.use_memo(deps, move || Rc::new(callback))
    }

    /// Opaque storage for values owned outside the tree
    fn use_handle<T: 'static>(&mut self) -> Result<Handle<T>>;

    /// Register a body for this tick's collision pass when `active`.
    ///
    /// The call occupies its position either way, so a body may drop in and
    /// out of the pass without disturbing later slots. The returned events are
    /// the ones resolved at the end of the previous tick.
    fn use_collision_when(
        &mut self,
        active: bool,
        body: CollisionBody,
        detail: CollisionDetail,
    ) -> Result<CollisionState>;

    fn use_collision(&mut self, body: CollisionBody, detail: CollisionDetail) -> Result<CollisionState> {
        self.use_collision_when(true, body, detail)
    }

    fn tick_info(&self) -> TickInfo;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setter_writes_are_immediate() {
        let setter = StateSetter::new(Rc::new(RefCell::new(1)));
        setter.set(5);
        assert_eq!(setter.get(), 5);
        setter.update(|n| n * 2);
        assert_eq!(setter.get(), 10);
    }

    #[test]
    fn test_apply_accepts_literal_or_updater() {
        let setter = StateSetter::new(Rc::new(RefCell::new(String::from("a"))));
        setter.apply(String::from("b"));
        assert_eq!(setter.get(), "b");
        setter.apply(SetState::Update(Box::new(|s: &String| format!("{s}c"))));
        assert_eq!(setter.get(), "bc");
    }

    #[test]
    fn test_handle_storage() {
        let handle: Handle<Vec<u32>> = Handle::new(Rc::new(RefCell::new(None)));
        assert!(!handle.is_set());
        assert_eq!(handle.get_or_insert_with(|| vec![1]), vec![1]);
        handle.with(|v| v.unwrap().push(2));
        assert_eq!(handle.take(), Some(vec![1, 2]));
        assert!(!handle.is_set());

        let other = handle.clone();
        assert!(handle.ptr_eq(&other));
    }
}
