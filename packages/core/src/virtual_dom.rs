//! The top-level handle a host program drives (§4.7 entry point): owns the
//! hook-state tree, the update channel, the DOM adapter, and the previous
//! `VNode` tree.
//!
//! Grounded on the teacher's `virtual_dom.rs` top-level struct shape (owning
//! the arena, the scheduler channel, and the root scope).

use futures_channel::mpsc::UnboundedReceiver;
use std::rc::Rc;

use crate::dom::DomAdapter;
use crate::element::Element;
use crate::error::RuntimeError;
use crate::hook_tree::{Runtime, RuntimeGuard};
use crate::scheduler::{self, RuntimeConfig, SchedulerMsg};
use crate::vnode::VNode;

/// Ties a hook-state tree, an update channel, and a [`DomAdapter`] together
/// into one mountable unit.
///
/// `root` is called fresh at the start of every pass rather than held as a
/// single built `Element`: the `Element` graph is a stateless description,
/// state itself lives in the hook tree keyed by `(ComponentKey, slot)`, so
/// re-invoking `root` every pass is how the previous pass's state comes
/// back around to the same hook cells (§4.2 Invariant 2).
pub struct VirtualDom<A: DomAdapter> {
    runtime: Rc<Runtime>,
    receiver: UnboundedReceiver<SchedulerMsg>,
    adapter: A,
    container: A::Handle,
    root: fn() -> Element,
    tree: Option<VNode<A::Handle>>,
    config: RuntimeConfig,
}

impl<A: DomAdapter> VirtualDom<A> {
    /// Builds a new runtime over `adapter`, attached under `container`.
    ///
    /// With the default (synchronous) [`RuntimeConfig`] this performs the
    /// first build/reconcile pass before returning, so `container` already
    /// holds the initial tree. With `synchronous: false`, the caller must
    /// call [`VirtualDom::rerender`] once before anything is attached.
    pub fn mount(adapter: A, container: A::Handle, root: fn() -> Element, config: RuntimeConfig) -> Result<Self, RuntimeError> {
        let (sender, receiver) = futures_channel::mpsc::unbounded();
        let runtime = Runtime::new(sender);
        let mut vdom = VirtualDom {
            runtime,
            receiver,
            adapter,
            container,
            root,
            tree: None,
            config,
        };
        if config.synchronous {
            vdom.rerender()?;
        }
        Ok(vdom)
    }

    pub fn config(&self) -> RuntimeConfig {
        self.config
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    /// Runs exactly one build/reconcile pass (§4.7), regardless of whether
    /// anything is actually queued.
    pub fn rerender(&mut self) -> Result<(), RuntimeError> {
        let _guard = RuntimeGuard::new(self.runtime.clone());
        let root = (self.root)();
        scheduler::run_pass(&self.runtime, &mut self.adapter, &self.container, root, &mut self.tree)?;
        Ok(())
    }

    /// Drains every `RequestRerender` queued since the last call and, if at
    /// least one arrived, runs exactly one pass — many updates queued
    /// between two `flush` calls collapse into a single rebuild (§8 S1
    /// "counter coalescing"), matching the plain channel coalescing a
    /// synchronous host would otherwise have to implement by hand.
    ///
    /// Returns whether a pass actually ran.
    pub fn flush(&mut self) -> Result<bool, RuntimeError> {
        let mut dirty = false;
        while let Ok(Some(_msg)) = self.receiver.try_next() {
            dirty = true;
        }
        if dirty {
            self.rerender()?;
        }
        Ok(dirty)
    }

    /// The hook-state tree's root node, for diagnostics.
    pub(crate) fn runtime(&self) -> &Rc<Runtime> {
        &self.runtime
    }
}
