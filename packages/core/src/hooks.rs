//! The hook library (§4.3): state, effects, refs, memoization, callbacks,
//! imperative handles, context, and resources.
//!
//! Grounded on `scope.rs`'s `use_hook` initializer/cursor idiom and
//! `use_shared_state.rs`'s `Rc<RefCell<T>>`-based context sharing. Hooks
//! read the currently-entered node implicitly through [`Runtime::current`]
//! rather than taking an explicit scope handle, the "currently-entered
//! singleton" pattern `SPEC_FULL.md` §9 calls for.
//!
//! A hook invoked outside a render, or whose cell disagrees in shape with
//! the hook being called, panics with a private [`HookPanic`] payload
//! rather than returning a `Result` from every hook call site — this
//! mirrors how the distilled spec's own JS-flavored hooks "throw" on
//! misuse. The panic is always caught one frame up, in the builder's
//! composite-invocation case, the same `catch_unwind` pairing
//! `any_props.rs`'s `VProps::render` uses.

use std::any::Any;
use std::rc::{Rc, Weak};

use crate::any_dep::AnyDep;
use crate::arena::NodeId;
use crate::element::{new_context, Context, ContextId, RefObject};
use crate::error::RuntimeError;
use crate::hook_tree::{HookCell, Runtime};

/// The payload `catch_unwind` is expected to find when a hook call fails;
/// see the module docs.
pub(crate) struct HookPanic(pub RuntimeError);

fn require_runtime() -> Rc<Runtime> {
    match Runtime::current() {
        Some(rt) => rt,
        None => std::panic::panic_any(HookPanic(RuntimeError::ContextError)),
    }
}

fn require_node(rt: &Runtime) -> NodeId {
    match rt.current_node() {
        Ok(n) => n,
        Err(e) => std::panic::panic_any(HookPanic(e)),
    }
}

fn require_cursor(rt: &Runtime) -> usize {
    match rt.alloc_cursor() {
        Ok(c) => c,
        Err(e) => std::panic::panic_any(HookPanic(e)),
    }
}

fn hook_order_panic(cursor: usize) -> ! {
    std::panic::panic_any(HookPanic(RuntimeError::HookOrderError { cursor }))
}

/// The setter returned by [`use_state`]/[`use_reducer`]. Stays bound to the
/// hook node and cursor it was allocated at, so calling it after the
/// currently-entered pointer has moved on (e.g. from an event callback)
/// still targets the right instance.
pub struct SetState<T> {
    rt: Weak<Runtime>,
    node: NodeId,
    cursor: usize,
    _marker: std::marker::PhantomData<fn(T)>,
}

impl<T> Clone for SetState<T> {
    fn clone(&self) -> Self {
        SetState {
            rt: self.rt.clone(),
            node: self.node,
            cursor: self.cursor,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<T: 'static> SetState<T> {
    fn enqueue(&self, f: impl FnOnce(T) -> T + 'static) {
        let Some(rt) = self.rt.upgrade() else { return };
        rt.enqueue_update(
            self.node,
            self.cursor,
            Box::new(move |boxed: Box<dyn Any>| {
                let prev = *boxed.downcast::<T>().unwrap_or_else(|_| hook_order_panic(0));
                Box::new(f(prev)) as Box<dyn Any>
            }),
        );
    }

    /// Sets a constant next value (§4.3 `setValue(next)` with non-function
    /// `next`).
    pub fn set(&self, value: T) {
        self.enqueue(move |_| value);
    }

    /// Enqueues a functional update (§4.3 `setValue(next)` with function
    /// `next`).
    pub fn update(&self, f: impl FnOnce(T) -> T + 'static) {
        self.enqueue(f);
    }
}

fn state_cell<T: Clone + 'static>(rt: &Runtime, node: NodeId, cursor: usize, init: impl FnOnce() -> T) -> T {
    rt.with_cell(node, cursor, |cell| {
        if cell.is_none() {
            *cell = Some(HookCell::State(Box::new(init())));
        }
        match cell {
            Some(HookCell::State(v)) => match v.downcast_ref::<T>() {
                Some(v) => v.clone(),
                None => hook_order_panic(cursor),
            },
            _ => hook_order_panic(cursor),
        }
    })
}

/// §4.3 `useState`.
pub fn use_state<T: Clone + 'static>(init: impl FnOnce() -> T) -> (T, SetState<T>) {
    let rt = require_runtime();
    let node = require_node(&rt);
    let cursor = require_cursor(&rt);
    let value = state_cell(&rt, node, cursor, init);
    let setter = SetState {
        rt: Rc::downgrade(&rt),
        node,
        cursor,
        _marker: std::marker::PhantomData,
    };
    (value, setter)
}

/// §4.3 `useReducer`: same cell shape as `useState`, with the update thunk
/// expressed as `prev -> reducer(prev, action)`.
pub fn use_reducer<S: Clone + 'static, A: 'static>(
    reducer: fn(S, A) -> S,
    init: impl FnOnce() -> S,
) -> (S, impl Fn(A) + Clone) {
    let (value, setter) = use_state(init);
    let dispatch = move |action: A| {
        setter.update(move |prev| reducer(prev, action));
    };
    (value, dispatch)
}

/// §4.3 `useRef`: the returned object has stable identity across renders
/// of this instance (Invariant/testable-property 2).
pub fn use_ref<T: 'static>(init: impl FnOnce() -> T) -> RefObject {
    let rt = require_runtime();
    let node = require_node(&rt);
    let cursor = require_cursor(&rt);
    rt.with_cell(node, cursor, |cell| {
        if cell.is_none() {
            *cell = Some(HookCell::Ref(Rc::new(std::cell::RefCell::new(Box::new(init())))));
        }
        match cell {
            Some(HookCell::Ref(r)) => r.clone(),
            _ => hook_order_panic(cursor),
        }
    })
}

/// §4.3 `useMemo`: recomputes only when `deps` differ from the previous
/// call (testable property 3).
pub fn use_memo<T: Clone + 'static>(factory: impl FnOnce() -> T, deps: Option<Vec<Box<dyn AnyDep>>>) -> T {
    let rt = require_runtime();
    let node = require_node(&rt);
    let cursor = require_cursor(&rt);
    rt.with_cell(node, cursor, |cell| {
        let changed = match cell {
            Some(HookCell::Memo { deps: prev, .. }) => crate::any_dep::deps_changed(prev.as_deref(), deps.as_deref()),
            None => true,
            _ => hook_order_panic(cursor),
        };
        if changed {
            let value = factory();
            *cell = Some(HookCell::Memo {
                deps,
                value: Box::new(value),
            });
        }
        match cell {
            Some(HookCell::Memo { value, .. }) => match value.downcast_ref::<T>() {
                Some(v) => v.clone(),
                None => hook_order_panic(cursor),
            },
            _ => unreachable!(),
        }
    })
}

/// §4.3 `useCallback`, defined as `useMemo(|| fn, deps)`.
pub fn use_callback<F: Clone + 'static>(f: F, deps: Option<Vec<Box<dyn AnyDep>>>) -> F {
    use_memo(move || f, deps)
}

/// §4.3 `useImperativeHandle`: assigns `ref.current` from `build()` only
/// when `deps` change.
pub fn use_imperative_handle<T: 'static>(
    handle: &RefObject,
    build: impl FnOnce() -> T,
    deps: Option<Vec<Box<dyn AnyDep>>>,
) {
    let rt = require_runtime();
    let node = require_node(&rt);
    let cursor = require_cursor(&rt);
    let changed = rt.with_cell(node, cursor, |cell| {
        let changed = match cell {
            Some(HookCell::ImperativeHandle { deps: prev }) => {
                crate::any_dep::deps_changed(prev.as_deref(), deps.as_deref())
            }
            None => true,
            _ => hook_order_panic(cursor),
        };
        *cell = Some(HookCell::ImperativeHandle { deps });
        changed
    });
    if changed {
        *handle.borrow_mut() = Box::new(build());
    }
}

/// §4.3 `useEffect`. The callback and any prior cleanup are run by the
/// scheduler after reconciliation completes for this pass (§5 "Effects run
/// after reconciliation"), not inline here; this call only records the
/// intent to run and remembers the new dependency list.
pub fn use_effect(callback: impl FnOnce() -> Option<Box<dyn FnOnce()>> + 'static, deps: Option<Vec<Box<dyn AnyDep>>>) {
    let rt = require_runtime();
    let node = require_node(&rt);
    let cursor = require_cursor(&rt);
    let should_run = rt.with_cell(node, cursor, |cell| match cell {
        Some(HookCell::Effect { deps: prev, .. }) => crate::any_dep::deps_changed(prev.as_deref(), deps.as_deref()),
        None => true,
        _ => hook_order_panic(cursor),
    });
    if should_run {
        rt.with_cell(node, cursor, |cell| {
            let prev_cleanup = match cell.take() {
                Some(HookCell::Effect { cleanup, .. }) => cleanup,
                None => None,
                _ => hook_order_panic(cursor),
            };
            *cell = Some(HookCell::Effect {
                deps,
                cleanup: prev_cleanup,
            });
        });
        // Stash the callback itself in a side table keyed by (node, cursor)
        // rather than in the cell, so the cell's `cleanup` slot only ever
        // holds an actual cleanup closure. See `Runtime::take_pending_effects`.
        rt.stash_effect(node, cursor, Box::new(callback));
    } else {
        rt.with_cell(node, cursor, |cell| {
            if let Some(HookCell::Effect { deps: prev, .. }) = cell {
                *prev = deps;
            }
        });
    }
}

/// §4.3 `createContext`.
pub fn create_context<T: 'static>(default: T) -> Context<T> {
    new_context(default)
}

/// §4.3 `useContext`: walks from the current node up through parents for
/// the nearest published value, falling back to the context's default
/// (testable property 7).
pub fn use_context<T: 'static>(ctx: &Context<T>) -> Rc<T> {
    let rt = require_runtime();
    let node = require_node(&rt);
    match rt.lookup_context(node, ctx.id()) {
        Some(v) => v.downcast::<T>().unwrap_or_else(|_| ctx.default_value()),
        None => ctx.default_value(),
    }
}

pub(crate) fn publish_context(rt: &Runtime, node: NodeId, ctx: ContextId, value: Rc<dyn Any>) {
    rt.publish_context(node, ctx, value);
}

/// The payload a `Suspense` boundary's `catch_unwind` looks for (see
/// `builder.rs::invoke_component`), distinct from [`HookPanic`]: a pending
/// resource is control flow, not a failure, so it is never wrapped in a
/// `RuntimeError` on its way through the panic channel.
pub(crate) struct PendingSignal;

/// §4.3/§4.6 `use(resource)`'s resource branch. `factory` is invoked at most
/// once per key. Components have no `Result`-returning render signature to
/// propagate a pending/error state through, so — like every other hook
/// misuse in this module — an unresolved resource or a missing boundary
/// unwinds via `panic_any` and is caught one frame up in the builder.
pub fn use_resource<T: 'static>(
    factory: impl FnOnce() -> std::pin::Pin<Box<dyn std::future::Future<Output = T>>>,
) -> Rc<T> {
    let rt = require_runtime();
    let node = require_node(&rt);
    let cursor = require_cursor(&rt);
    let key = format!("{}:{}", node, cursor);
    let suspense = rt.suspense.borrow();
    let boundary = crate::suspense::nearest_boundary(&suspense, node, |n| rt.parent_of(n));
    let Some(boundary) = boundary else {
        drop(suspense);
        std::panic::panic_any(HookPanic(RuntimeError::NoSuspenseBoundary));
    };
    // Erase the output type so the cache can be generic over nothing but
    // `Any`: one `Pin<Box<dyn Future<Output = Box<dyn Any>>>>` shape for
    // every resource regardless of its concrete `T`.
    let erased: std::pin::Pin<Box<dyn std::future::Future<Output = Box<dyn Any>>>> =
        Box::pin(async move { Box::new(factory().await) as Box<dyn Any> });
    let value = match crate::suspense::create_resource(boundary, key, move || erased, &rt.sender) {
        Ok(v) => v,
        Err(crate::suspense::BuildSignal::Pending) => std::panic::panic_any(PendingSignal),
        Err(crate::suspense::BuildSignal::Error(e)) => std::panic::panic_any(HookPanic(e)),
    };
    value.downcast::<T>().unwrap_or_else(|_| hook_order_panic(cursor))
}
