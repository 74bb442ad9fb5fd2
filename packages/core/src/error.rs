//! Error types surfaced across the public API.
//!
//! A pending resource (`crate::suspense::BuildSignal::Pending`) is
//! deliberately not a variant here: it is an internal control-flow signal
//! caught by the `Suspense` builder case and must never reach a host-visible
//! `Result`. See `suspense.rs`.

use thiserror::Error;

/// Errors a host program can observe from [`crate::VirtualDom`] operations.
#[derive(Error, Debug, Clone)]
pub enum RuntimeError {
    /// A hook (or [`crate::hooks::use_context`]) was invoked outside of a
    /// component render.
    #[error("hook called outside of a component render")]
    ContextError,

    /// A hook's cell at the current cursor has a different shape than the
    /// hook being invoked expects; this means hooks were called in a
    /// different order/count than the previous render of this instance.
    #[error("hook order changed between renders at cursor {cursor}")]
    HookOrderError {
        /// The cursor position at which the mismatch was detected.
        cursor: usize,
    },

    /// `use(resource)` was called with no ancestor `Suspense` boundary.
    #[error("no ancestor Suspense boundary found for this resource")]
    NoSuspenseBoundary,

    /// Anything else thrown by a user component, resource factory, or
    /// effect.
    #[error("{0}")]
    UserError(String),
}
