//! Dependency lists and the shallow comparator
//!
//! Effects and memos decide whether to recompute by comparing the list they
//! were last given against the one presented this tick. Comparison is
//! element-wise and shallow; the arity for a slot is fixed once it has been
//! seen.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RuntimeError};

/// One opaque dependency value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Dep {
    Unit,
    Bool(bool),
    Int(i64),
    /// Compared with `==`, so `NaN` never equals itself and always re-runs
    Float(f64),
    Str(String),
    Vec2(Vec2),
    /// Identity of something owned elsewhere (entity ids, pointers turned into integers)
    Id(u64),
}

impl From<()> for Dep {
    fn from(_: ()) -> Self {
        Dep::Unit
    }
}

impl From<bool> for Dep {
    fn from(v: bool) -> Self {
        Dep::Bool(v)
    }
}

macro_rules! int_dep {
    ($($t:ty),*) => {
        $(impl From<$t> for Dep {
            fn from(v: $t) -> Self {
                Dep::Int(v as i64)
            }
        })*
    };
}

int_dep!(i8, i16, i32, i64, u8, u16, u32, isize);

impl From<u64> for Dep {
    fn from(v: u64) -> Self {
        Dep::Id(v)
    }
}

impl From<usize> for Dep {
    fn from(v: usize) -> Self {
        Dep::Id(v as u64)
    }
}

impl From<f32> for Dep {
    fn from(v: f32) -> Self {
        Dep::Float(v as f64)
    }
}

impl From<f64> for Dep {
    fn from(v: f64) -> Self {
        Dep::Float(v)
    }
}

impl From<&str> for Dep {
    fn from(v: &str) -> Self {
        Dep::Str(v.to_owned())
    }
}

impl From<String> for Dep {
    fn from(v: String) -> Self {
        Dep::Str(v)
    }
}

impl From<char> for Dep {
    fn from(v: char) -> Self {
        Dep::Str(v.to_string())
    }
}

impl From<Vec2> for Dep {
    fn from(v: Vec2) -> Self {
        Dep::Vec2(v)
    }
}

/// Build a `Vec<Dep>` from heterogeneous values.
///
/// ```
/// use redraw::{Dep, deps};
///
/// let d = deps![1, "a", true];
/// assert_eq!(d, vec![Dep::Int(1), Dep::Str("a".into()), Dep::Bool(true)]);
/// assert!(deps![].is_empty());
/// ```
#[macro_export]
macro_rules! deps {
    () => {
        ::std::vec::Vec::<$crate::Dep>::new()
    };
    ($($dep:expr),+ $(,)?) => {
        ::std::vec![$($crate::Dep::from($dep)),+]
    };
}

/// Compare the stored dependency list of slot `position` with the new one.
///
/// Returns `Ok(true)` when any element differs, `Ok(false)` when all are
/// equal, and fails when the lengths disagree.
pub fn deps_changed(position: usize, previous: &[Dep], next: &[Dep]) -> Result<bool> {
    if previous.len() != next.len() {
        return Err(RuntimeError::DependencyArity {
            position,
            expected: previous.len(),
            found: next.len(),
        });
    }
    Ok(previous.iter().zip(next).any(|(a, b)| a != b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_equal_lists_unchanged() {
        let prev = deps![1, "a"];
        assert_eq!(deps_changed(0, &prev, &deps![1, "a"]), Ok(false));
    }

    #[test]
    fn test_any_element_differs() {
        let prev = deps![1, "a"];
        assert_eq!(deps_changed(0, &prev, &deps![1, "b"]), Ok(true));
        assert_eq!(deps_changed(0, &prev, &deps![2, "a"]), Ok(true));
    }

    #[test]
    fn test_length_change_is_fatal() {
        let prev = deps![1, "a"];
        let err = deps_changed(4, &prev, &deps![1, "a", true]).unwrap_err();
        assert_eq!(
            err,
            RuntimeError::DependencyArity {
                position: 4,
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn test_empty_lists_never_change() {
        assert_eq!(deps_changed(0, &[], &[]), Ok(false));
    }

    #[test]
    fn test_nan_always_changes() {
        let prev = deps![f64::NAN];
        assert_eq!(deps_changed(0, &prev, &deps![f64::NAN]), Ok(true));
    }

    #[test]
    fn test_kinds_do_not_coerce() {
        // 1 and "1" are different dependencies
        assert_eq!(deps_changed(0, &deps![1], &deps!["1"]), Ok(true));
        assert_eq!(deps_changed(0, &deps![1], &deps![1.0]), Ok(true));
    }

    proptest! {
        #[test]
        fn prop_list_equals_itself(values in proptest::collection::vec(any::<i64>(), 0..8)) {
            let list: Vec<Dep> = values.iter().copied().map(Dep::from).collect();
            prop_assert_eq!(deps_changed(0, &list, &list.clone()), Ok(false));
        }

        #[test]
        fn prop_arity_mismatch_always_errors(a in 0usize..6, b in 0usize..6) {
            prop_assume!(a != b);
            let prev = vec![Dep::Unit; a];
            let next = vec![Dep::Unit; b];
            prop_assert!(deps_changed(0, &prev, &next).is_err());
        }
    }
}
