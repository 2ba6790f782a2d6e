//! Call-order reactive runtime
//!
//! Tree-builders re-express persistent state, memoization, side effects and
//! mutable handles purely through the order of their calls:
//! - the first call of a tick gets slot 0, the next slot 1, and so on
//! - slots survive across ticks, only the position counter is rewound
//! - effects and memos recompute when their dependency list changes

pub mod context;
pub mod deps;
pub mod hooks;
pub mod slot;

pub use context::Runtime;
pub use deps::{Dep, deps_changed};
pub use hooks::{Handle, Hooks, SetState, StateSetter, TickInfo};
pub use slot::{Cleanup, IntoCleanup, SlotKind, cleanup};
