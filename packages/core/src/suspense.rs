//! The suspense subsystem (§4.6): the resource cache and the internal
//! throw/catch protocol between [`crate::hooks::use_resource`] and the
//! builder's `Suspense` case.
//!
//! Grounded on `scheduler/suspense.rs`'s boundary/resource bookkeeping. The
//! reference design note that the pending signal "must not be confused
//! with user errors" is enforced here by the type system: [`BuildSignal`]
//! is a private enum distinct from the public [`crate::RuntimeError`], and
//! there is no `From` conversion between them.
//!
//! §5 notes that resource futures are polled by the runtime itself rather
//! than an external executor; since those futures are `Rc`-based and not
//! `Send`, the wake handle below is a hand-rolled `RawWaker` rather than
//! `futures_util`'s `Arc`-only `ArcWake` (which would require `Send`).

use std::any::Any;
use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context as TaskContext, Poll, RawWaker, RawWakerVTable, Waker};

use fxhash::FxHashMap;
use futures_channel::mpsc::UnboundedSender;

use crate::arena::NodeId;
use crate::error::RuntimeError;
use crate::scheduler::SchedulerMsg;

enum ResourceState {
    Pending(Pin<Box<dyn Future<Output = Box<dyn Any>>>>),
    Ready(Rc<dyn Any>),
}

/// One suspense boundary's cache, keyed by `"<hookNodeId>:<hookIndex>"`
/// (§3 "Resource cache").
#[derive(Default)]
pub(crate) struct ResourceCache {
    entries: RefCell<FxHashMap<String, ResourceState>>,
}

impl ResourceCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

/// A signal the builder's internal `Result` carries instead of panicking
/// for control flow (§4.6, §9 "Throw-for-control-flow").
pub(crate) enum BuildSignal {
    /// A resource is still pending; caught only by the nearest ancestor
    /// `Suspense` case.
    Pending,
    /// A genuine user-visible failure, propagated out of the pass.
    Error(RuntimeError),
}

impl From<RuntimeError> for BuildSignal {
    fn from(e: RuntimeError) -> Self {
        BuildSignal::Error(e)
    }
}

struct WakeData {
    sender: UnboundedSender<SchedulerMsg>,
}

unsafe fn rewaker_clone(data: *const ()) -> RawWaker {
    let rc = Rc::from_raw(data as *const WakeData);
    let cloned = rc.clone();
    std::mem::forget(rc);
    RawWaker::new(Rc::into_raw(cloned) as *const (), &VTABLE)
}

unsafe fn rewaker_wake(data: *const ()) {
    let rc = Rc::from_raw(data as *const WakeData);
    let _ = rc.sender.unbounded_send(SchedulerMsg::RequestRerender);
}

unsafe fn rewaker_wake_by_ref(data: *const ()) {
    let rc = Rc::from_raw(data as *const WakeData);
    let _ = rc.sender.unbounded_send(SchedulerMsg::RequestRerender);
    std::mem::forget(rc);
}

unsafe fn rewaker_drop(data: *const ()) {
    drop(Rc::from_raw(data as *const WakeData));
}

static VTABLE: RawWakerVTable = RawWakerVTable::new(rewaker_clone, rewaker_wake, rewaker_wake_by_ref, rewaker_drop);

fn make_waker(sender: UnboundedSender<SchedulerMsg>) -> Waker {
    let data = Rc::new(WakeData { sender });
    let raw = RawWaker::new(Rc::into_raw(data) as *const (), &VTABLE);
    // Safety: the vtable's four functions only ever operate on a pointer
    // produced by `Rc::into_raw(Rc<WakeData>)`, matching `rewaker_drop`'s
    // reconstruction, and every use is confined to the thread the `Rc`
    // was created on (the runtime is never sent across threads).
    unsafe { Waker::from_raw(raw) }
}

/// Polls every pending resource in `boundary` once. Futures that complete
/// move to `Ready`; futures that stay pending register `sender` as their
/// wake target so an external completion (e.g. a timer) requests the next
/// pass itself.
pub(crate) fn poll_boundary(boundary: &ResourceCache, sender: &UnboundedSender<SchedulerMsg>) {
    let keys: Vec<String> = boundary.entries.borrow().keys().cloned().collect();
    for key in keys {
        let mut entries = boundary.entries.borrow_mut();
        let Some(ResourceState::Pending(fut)) = entries.get_mut(&key) else {
            continue;
        };
        let waker = make_waker(sender.clone());
        let mut cx = TaskContext::from_waker(&waker);
        if let Poll::Ready(value) = fut.as_mut().poll(&mut cx) {
            entries.insert(key, ResourceState::Ready(Rc::from(value)));
            let _ = sender.unbounded_send(SchedulerMsg::RequestRerender);
        }
    }
}

/// Looks up or creates the resource at `key` in `boundary`, throwing
/// [`BuildSignal::Pending`] while unresolved (§4.6 steps 1-5).
pub(crate) fn create_resource(
    boundary: &ResourceCache,
    key: String,
    factory: impl FnOnce() -> Pin<Box<dyn Future<Output = Box<dyn Any>>>>,
    sender: &UnboundedSender<SchedulerMsg>,
) -> Result<Rc<dyn Any>, BuildSignal> {
    {
        let entries = boundary.entries.borrow();
        match entries.get(&key) {
            Some(ResourceState::Ready(v)) => return Ok(v.clone()),
            Some(ResourceState::Pending(_)) => return Err(BuildSignal::Pending),
            None => {}
        }
    }
    let fut = factory();
    boundary.entries.borrow_mut().insert(key, ResourceState::Pending(fut));
    // Nudge the scheduler immediately so the first poll happens without
    // waiting on an unrelated external wake.
    let _ = sender.unbounded_send(SchedulerMsg::RequestRerender);
    Err(BuildSignal::Pending)
}

pub(crate) fn nearest_boundary<'a>(
    suspense: &'a FxHashMap<NodeId, ResourceCache>,
    mut node: NodeId,
    parent_of: impl Fn(NodeId) -> Option<NodeId>,
) -> Option<&'a ResourceCache> {
    loop {
        if let Some(cache) = suspense.get(&node) {
            return Some(cache);
        }
        node = parent_of(node)?;
    }
}
