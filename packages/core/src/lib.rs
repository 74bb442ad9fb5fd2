//! `weft-core`: a small declarative UI render core.
//!
//! An author describes UI as a tree of [`Element`]s; [`VirtualDom`] expands
//! that tree against a persistent hook-state tree, reconciles the result
//! against the previous pass, and drives a [`DomAdapter`] to bring a live
//! document in line. See each module's docs for the architectural seam it
//! covers, and `DESIGN.md` for what each is grounded on.

pub mod any_dep;
pub(crate) mod arena;
pub(crate) mod builder;
pub mod dom;
pub mod element;
pub mod error;
pub(crate) mod hook_tree;
pub mod hooks;
pub(crate) mod reconciler;
pub(crate) mod scheduler;
pub(crate) mod vnode;
mod virtual_dom;

pub use crate::any_dep::AnyDep;
pub use crate::dom::{Callback, DomAdapter, ListenerId, StyleValue, TestDom, TestHandle};
pub use crate::element::{component, fragment, intrinsic, suspense, Context, Element, PropMap, PropValue, RefObject};
pub use crate::error::RuntimeError;
pub use crate::hooks::{
    create_context, use_callback, use_context, use_effect, use_imperative_handle, use_memo, use_ref, use_reducer,
    use_resource, use_state, SetState,
};
pub use crate::scheduler::RuntimeConfig;
pub use crate::virtual_dom::VirtualDom;

/// Re-exports the surface most host programs and components need.
pub mod prelude {
    pub use crate::any_dep::AnyDep;
    pub use crate::dom::{DomAdapter, StyleValue, TestDom};
    pub use crate::element::{component, fragment, intrinsic, suspense, Context, Element};
    pub use crate::error::RuntimeError;
    pub use crate::hooks::{
        create_context, use_callback, use_context, use_effect, use_imperative_handle, use_memo, use_ref,
        use_reducer, use_resource, use_state,
    };
    pub use crate::scheduler::RuntimeConfig;
    pub use crate::VirtualDom;
}
