//! The hook-state tree (§4.2) and the process-wide "currently-entered"
//! pointer.
//!
//! Grounded on `runtime.rs`'s `thread_local! RUNTIMES: RefCell<Vec<Rc<Runtime>>>`
//! stack (`push_runtime`/`pop_runtime`/`with_runtime`/`Runtime::current`)
//! combined with `scope.rs`'s per-scope hook list and cursor (`use_hook`).
//! Context maps and provide/consume walking mirror
//! `use_shared_state.rs`'s `Rc<RefCell<T>>`-based sharing.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use fxhash::FxHashMap;
use futures_channel::mpsc::UnboundedSender;
use slab::Slab;

use crate::any_dep::AnyDep;
use crate::element::{ComponentKey, ContextId, RefObject};
use crate::arena::NodeId;
use crate::error::RuntimeError;
use crate::scheduler::SchedulerMsg;
use crate::suspense::ResourceCache;

/// Disambiguates sibling hook nodes that share a `ComponentKey` but have no
/// explicit author-supplied key (falls back to child position, the same
/// role an array index plays in the reference ecosystem's keyless lists).
#[derive(Clone, PartialEq, Eq, Hash)]
pub(crate) enum Slot {
    Keyed(String),
    Positional(usize),
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub(crate) struct ChildKey {
    pub component_key: ComponentKey,
    pub slot: Slot,
}

/// A single hook's persisted storage (§3 "Hook cell").
pub(crate) enum HookCell {
    /// Backs both `useState` and `useReducer`.
    State(Box<dyn Any>),
    Effect {
        deps: Option<Vec<Box<dyn AnyDep>>>,
        cleanup: Option<Box<dyn FnOnce()>>,
    },
    Memo {
        deps: Option<Vec<Box<dyn AnyDep>>>,
        value: Box<dyn Any>,
    },
    Ref(RefObject),
    ImperativeHandle {
        deps: Option<Vec<Box<dyn AnyDep>>>,
    },
}

pub(crate) struct QueuedUpdate {
    pub cursor: usize,
    pub apply: Box<dyn FnOnce(Box<dyn Any>) -> Box<dyn Any>>,
}

pub(crate) struct HookNodeData {
    pub parent: Option<NodeId>,
    pub children: FxHashMap<ChildKey, NodeId>,
    pub cells: Vec<Option<HookCell>>,
    pub cursor: usize,
    pub contexts: FxHashMap<ContextId, Rc<dyn Any>>,
    pub queue: Vec<QueuedUpdate>,
    pub active: bool,
}

impl HookNodeData {
    fn new(parent: Option<NodeId>) -> Self {
        HookNodeData {
            parent,
            children: FxHashMap::default(),
            cells: Vec::new(),
            cursor: 0,
            contexts: FxHashMap::default(),
            queue: Vec::new(),
            active: true,
        }
    }
}

/// Per-[`crate::VirtualDom`] runtime state: the hook tree, the
/// currently-entered node stack, the suspense resource caches, and the
/// channel used to request a re-render pass.
///
/// Exactly one `Runtime` is pushed onto [`RUNTIMES`] for the duration of a
/// build pass; hook functions reach it implicitly via [`Runtime::current`]
/// rather than threading an explicit handle through every component, the
/// same "currently-entered" idiom `runtime.rs` implements for scopes.
pub(crate) struct Runtime {
    nodes: RefCell<Slab<HookNodeData>>,
    root: NodeId,
    node_stack: RefCell<Vec<NodeId>>,
    pub(crate) sender: UnboundedSender<SchedulerMsg>,
    pub(crate) suspense: RefCell<FxHashMap<NodeId, ResourceCache>>,
    pending_effects: RefCell<Vec<(NodeId, usize)>>,
    #[allow(clippy::type_complexity)]
    effect_bodies: RefCell<FxHashMap<(NodeId, usize), Box<dyn FnOnce() -> Option<Box<dyn FnOnce()>>>>>,
}

thread_local! {
    static RUNTIMES: RefCell<Vec<Rc<Runtime>>> = RefCell::new(Vec::new());
}

pub(crate) fn push_runtime(runtime: Rc<Runtime>) {
    RUNTIMES.with(|stack| stack.borrow_mut().push(runtime));
}

pub(crate) fn pop_runtime() {
    RUNTIMES.with(|stack| {
        stack.borrow_mut().pop();
    });
}

pub(crate) fn with_runtime<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&Runtime) -> R,
{
    RUNTIMES.with(|stack| stack.borrow().last().map(|rt| f(rt)))
}

/// A push-on-create, pop-on-drop guard around the currently-active runtime.
pub(crate) struct RuntimeGuard;

impl RuntimeGuard {
    pub(crate) fn new(runtime: Rc<Runtime>) -> Self {
        push_runtime(runtime);
        RuntimeGuard
    }
}

impl Drop for RuntimeGuard {
    fn drop(&mut self) {
        pop_runtime();
    }
}

impl Runtime {
    pub(crate) fn new(sender: UnboundedSender<SchedulerMsg>) -> Rc<Self> {
        let mut nodes = Slab::new();
        let root_idx = nodes.insert(HookNodeData::new(None));
        Rc::new(Runtime {
            nodes: RefCell::new(nodes),
            root: NodeId(root_idx),
            node_stack: RefCell::new(Vec::new()),
            sender,
            suspense: RefCell::new(FxHashMap::default()),
            pending_effects: RefCell::new(Vec::new()),
            effect_bodies: RefCell::new(FxHashMap::default()),
        })
    }

    /// Records that the effect at `(node, cursor)` must run after this
    /// pass's reconciliation (§5 "Effects run after reconciliation").
    pub(crate) fn stash_effect(
        &self,
        node: NodeId,
        cursor: usize,
        body: Box<dyn FnOnce() -> Option<Box<dyn FnOnce()>>>,
    ) {
        self.pending_effects.borrow_mut().push((node, cursor));
        self.effect_bodies.borrow_mut().insert((node, cursor), body);
    }

    /// Drains the set of effects queued this pass, in the order they were
    /// recorded (component build order).
    pub(crate) fn take_pending_effects(&self) -> Vec<(NodeId, usize)> {
        std::mem::take(&mut self.pending_effects.borrow_mut())
    }

    pub(crate) fn take_effect_body(
        &self,
        node: NodeId,
        cursor: usize,
    ) -> Option<Box<dyn FnOnce() -> Option<Box<dyn FnOnce()>>>> {
        self.effect_bodies.borrow_mut().remove(&(node, cursor))
    }

    /// Runs any cleanup stored at `(node, cursor)`'s cell, if present.
    pub(crate) fn run_cleanup(&self, node: NodeId, cursor: usize) {
        let cleanup = self.with_cell(node, cursor, |cell| match cell {
            Some(HookCell::Effect { cleanup, .. }) => cleanup.take(),
            _ => None,
        });
        if let Some(cleanup) = cleanup {
            cleanup();
        }
    }

    pub(crate) fn store_cleanup(&self, node: NodeId, cursor: usize, cleanup: Option<Box<dyn FnOnce()>>) {
        self.with_cell(node, cursor, |cell| {
            if let Some(HookCell::Effect { cleanup: slot, .. }) = cell {
                *slot = cleanup;
            }
        });
    }

    pub(crate) fn current() -> Option<Rc<Runtime>> {
        RUNTIMES.with(|stack| stack.borrow().last().cloned())
    }

    pub(crate) fn root(&self) -> NodeId {
        self.root
    }

    /// Enters the child of the currently-entered node identified by
    /// `child_key`, creating it on first reach (Invariant 2). Resets its
    /// cursor and marks it active for this pass.
    pub(crate) fn enter(&self, child_key: ChildKey) -> NodeId {
        let parent = *self.node_stack.borrow().last().unwrap_or(&self.root);
        let mut nodes = self.nodes.borrow_mut();
        let existing = nodes[parent.0].children.get(&child_key).copied();
        let child_id = match existing {
            Some(id) => id,
            None => {
                let idx = nodes.insert(HookNodeData::new(Some(parent)));
                let id = NodeId(idx);
                nodes[parent.0].children.insert(child_key, id);
                id
            }
        };
        nodes[child_id.0].cursor = 0;
        nodes[child_id.0].active = true;
        drop(nodes);
        self.node_stack.borrow_mut().push(child_id);
        child_id
    }

    pub(crate) fn exit(&self) {
        self.node_stack.borrow_mut().pop();
    }

    pub(crate) fn current_node(&self) -> Result<NodeId, RuntimeError> {
        self.node_stack
            .borrow()
            .last()
            .copied()
            .ok_or(RuntimeError::ContextError)
    }

    pub(crate) fn alloc_cursor(&self) -> Result<usize, RuntimeError> {
        let node = self.current_node()?;
        let mut nodes = self.nodes.borrow_mut();
        let data = &mut nodes[node.0];
        let c = data.cursor;
        data.cursor += 1;
        Ok(c)
    }

    pub(crate) fn with_cell<R>(&self, node: NodeId, cursor: usize, f: impl FnOnce(&mut Option<HookCell>) -> R) -> R {
        let mut nodes = self.nodes.borrow_mut();
        let cells = &mut nodes[node.0].cells;
        if cells.len() <= cursor {
            cells.resize_with(cursor + 1, || None);
        }
        f(&mut cells[cursor])
    }

    pub(crate) fn enqueue_update(
        &self,
        node: NodeId,
        cursor: usize,
        apply: Box<dyn FnOnce(Box<dyn Any>) -> Box<dyn Any>>,
    ) {
        self.nodes.borrow_mut()[node.0]
            .queue
            .push(QueuedUpdate { cursor, apply });
        let _ = self.sender.unbounded_send(SchedulerMsg::RequestRerender);
    }

    pub(crate) fn publish_context(&self, node: NodeId, ctx: ContextId, value: Rc<dyn Any>) {
        self.nodes.borrow_mut()[node.0].contexts.insert(ctx, value);
    }

    pub(crate) fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.borrow()[node.0].parent
    }

    pub(crate) fn lookup_context(&self, start: NodeId, ctx: ContextId) -> Option<Rc<dyn Any>> {
        let nodes = self.nodes.borrow();
        let mut cur = Some(start);
        while let Some(id) = cur {
            let data = &nodes[id.0];
            if let Some(v) = data.contexts.get(&ctx) {
                return Some(v.clone());
            }
            cur = data.parent;
        }
        None
    }

    /// Drains every node's update queue into its cells, FIFO, then resets
    /// every cursor (§4.7 pass step 1).
    pub(crate) fn flush(&self) {
        let ids: Vec<NodeId> = {
            let nodes = self.nodes.borrow();
            nodes.iter().map(|(i, _)| NodeId(i)).collect()
        };
        for id in ids {
            let queue = std::mem::take(&mut self.nodes.borrow_mut()[id.0].queue);
            for update in queue {
                self.with_cell(id, update.cursor, |cell| {
                    if let Some(HookCell::State(value)) = cell {
                        let taken = std::mem::replace(value, Box::new(()));
                        *value = (update.apply)(taken);
                    }
                });
            }
            self.nodes.borrow_mut()[id.0].cursor = 0;
        }
    }

    /// Clears the active set before a build pass (§4.2 `startPass`).
    pub(crate) fn start_pass(&self) {
        let ids: Vec<NodeId> = {
            let nodes = self.nodes.borrow();
            nodes.iter().map(|(i, _)| NodeId(i)).collect()
        };
        for id in ids {
            self.nodes.borrow_mut()[id.0].active = id == self.root;
        }
    }

    pub(crate) fn mark_active(&self, id: NodeId) {
        self.nodes.borrow_mut()[id.0].active = true;
    }

    /// Drops every hook node not marked active this pass, recursively
    /// clearing their cells, queues, and contexts (§4.2 `endPass`).
    pub(crate) fn end_pass(&self) {
        self.prune(self.root);
    }

    fn prune(&self, node: NodeId) {
        let children: Vec<(ChildKey, NodeId)> = {
            let nodes = self.nodes.borrow();
            nodes[node.0]
                .children
                .iter()
                .map(|(k, v)| (k.clone(), *v))
                .collect()
        };
        for (key, child) in children {
            let active = self.nodes.borrow()[child.0].active;
            if active {
                self.prune(child);
            } else {
                self.drop_subtree(child);
                self.nodes.borrow_mut()[node.0].children.remove(&key);
            }
        }
    }

    /// Drops `node`'s subtree, running any live effect cleanup on the way
    /// out (§4.2 "unmount runs every live effect's cleanup exactly once",
    /// §8 S2's final "then unmount" step).
    fn drop_subtree(&self, node: NodeId) {
        let children: Vec<NodeId> = {
            let nodes = self.nodes.borrow();
            nodes[node.0].children.values().copied().collect()
        };
        for child in children {
            self.drop_subtree(child);
        }
        let data = self.nodes.borrow_mut().remove(node.0);
        for cell in data.cells {
            if let Some(HookCell::Effect { cleanup: Some(cleanup), .. }) = cell {
                cleanup();
            }
        }
        self.effect_bodies.borrow_mut().retain(|(n, _), _| *n != node);
        self.suspense.borrow_mut().remove(&node);
    }
}
