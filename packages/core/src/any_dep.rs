//! Type-erased elementwise comparison for hook dependency arrays.
//!
//! Grounded on `nodes.rs`'s `AnyValue` trait (`any_cmp`/`our_typeid`, with a
//! blanket impl for any `T: PartialEq + 'static`), used there to compare
//! attribute values and reused here for `useEffect`/`useMemo`/`useCallback`
//! dependency lists whose element types are only known at the call site.

use std::any::{Any, TypeId};

/// A single dependency-array element, erased to `dyn AnyDep`.
pub trait AnyDep: Any {
    fn dep_eq(&self, other: &dyn AnyDep) -> bool;
    fn dep_type_id(&self) -> TypeId;
    fn as_any(&self) -> &dyn Any;
}

impl<T: PartialEq + Any> AnyDep for T {
    fn dep_eq(&self, other: &dyn AnyDep) -> bool {
        if self.type_id() != other.dep_type_id() {
            return false;
        }
        // Safety: type ids matched above, so the downcast is to the exact
        // concrete type `self` already is.
        let other = other.as_any().downcast_ref::<T>().expect("type id checked above");
        self == other
    }

    fn dep_type_id(&self) -> TypeId {
        self.type_id()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A dependency list passed to `use_effect`/`use_memo`/`use_callback`.
///
/// `None` means "no deps array was supplied" (always changed, per
/// `SPEC_FULL.md` §4.3's "missing deps ⇒ run every pass" policy). `Some(&[])`
/// means "empty deps" (run once).
pub type DepList<'a> = Option<&'a [Box<dyn AnyDep>]>;

/// Compares two previously-stored dependency lists per §4.3's policy:
/// differing lengths always compare as changed, and a missing list always
/// compares as changed.
pub(crate) fn deps_changed(prev: Option<&[Box<dyn AnyDep>]>, next: Option<&[Box<dyn AnyDep>]>) -> bool {
    match (prev, next) {
        (None, _) | (_, None) => true,
        (Some(a), Some(b)) => {
            if a.len() != b.len() {
                return true;
            }
            a.iter().zip(b.iter()).any(|(x, y)| !x.dep_eq(y.as_ref()))
        }
    }
}
