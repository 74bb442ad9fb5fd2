//! Arena key types.
//!
//! Grounded on `arena.rs`'s `ElementId(usize)` newtype-over-index pattern,
//! backed here by `slab::Slab` instead of the teacher's raw `Vec` + manual
//! freelist.

use std::fmt;

/// Identifies a hook node: one per live component instance.
///
/// Stable across renders of the same logical position (Invariant 2);
/// allocated lazily the first time the builder reaches that position.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
