//! The element-to-virtual-tree builder (§4.4).
//!
//! Grounded on `factory.rs`'s recursive node-building and `diff.rs`'s
//! top-level creation traversal shape (control flow only — the bump-arena
//! and template machinery is not carried over; see `DESIGN.md`).

use std::any::Any;
use std::fmt;

use crate::element::{CompositeKind, ContextId, Element};
use crate::hook_tree::{ChildKey, Runtime, Slot};
use crate::hooks::{HookPanic, PendingSignal};
use crate::suspense::{BuildSignal, ResourceCache};
use crate::vnode::{VNode, VNodeKind};

fn slot_for(key: &Option<String>, index: usize) -> Slot {
    match key {
        Some(k) => Slot::Keyed(k.clone()),
        None => Slot::Positional(index),
    }
}

/// Invokes a plain component's `render`, converting a hook-misuse panic
/// (see `hooks.rs`) or an ordinary user panic into a [`BuildSignal::Error`]
/// instead of unwinding further, mirroring `any_props.rs`'s
/// `catch_unwind` + `tracing::error!` pairing.
fn invoke_component(any_props: &dyn crate::element::AnyProps) -> Result<Element, BuildSignal> {
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| any_props.render())) {
        Ok(el) => Ok(el),
        Err(payload) => {
            if payload.downcast_ref::<PendingSignal>().is_some() {
                // A resource suspended; this is control flow, not a
                // failure, so no `error!` and no `RuntimeError` involved.
                return Err(BuildSignal::Pending);
            }
            if let Some(HookPanic(e)) = payload.downcast_ref::<HookPanic>() {
                tracing::error!(error = %e, "component render failed");
                return Err(BuildSignal::Error(e.clone()));
            }
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "component panicked".to_string());
            tracing::error!(%message, "component render panicked");
            Err(BuildSignal::Error(crate::error::RuntimeError::UserError(message)))
        }
    }
}

fn build_list<H: Clone + PartialEq + fmt::Debug>(
    rt: &Runtime,
    items: Vec<Element>,
) -> Result<Vec<VNode<H>>, BuildSignal> {
    let mut out = Vec::new();
    for (i, el) in items.into_iter().enumerate() {
        if let Some(v) = build_one::<H>(rt, el, i)? {
            out.push(v);
        }
    }
    Ok(out)
}

fn group<H>(children: Vec<VNode<H>>, key: Option<String>, component_id: Option<crate::arena::NodeId>) -> VNode<H> {
    VNode {
        kind: VNodeKind::Group { children, handle: None },
        key,
        component_id,
    }
}

fn build_one<H: Clone + PartialEq + fmt::Debug>(
    rt: &Runtime,
    element: Element,
    index: usize,
) -> Result<Option<VNode<H>>, BuildSignal> {
    match element {
        // Case 1: null/undefined.
        Element::Null => Ok(None),

        // Case 2: primitive.
        Element::Text(value) => Ok(Some(VNode {
            kind: VNodeKind::Text { value, handle: None },
            key: None,
            component_id: None,
        })),

        // Case 3: array.
        Element::List(items) => {
            let children = build_list(rt, items)?;
            Ok(Some(group(children, None, None)))
        }

        // Case 5: intrinsic element.
        Element::Intrinsic(ie) => {
            let children = build_list(rt, ie.children)?;
            Ok(Some(VNode {
                kind: VNodeKind::Intrinsic {
                    tag: ie.tag,
                    props: ie.props,
                    children,
                    handle: None,
                },
                key: ie.key,
                component_id: None,
            }))
        }

        Element::Composite(ce) => {
            let key = ce.key;
            match ce.kind {
                // Case 4: fragment element.
                CompositeKind::Fragment(items) => {
                    let children = build_list(rt, items)?;
                    Ok(Some(group(children, key, None)))
                }

                // Case 6: context provider.
                CompositeKind::ContextProvider {
                    context_id,
                    value,
                    children,
                } => build_context_provider::<H>(rt, context_id, value, *children, key, index),

                // Case 7: suspense.
                CompositeKind::Suspense { children, fallback } => {
                    build_suspense::<H>(rt, *children, *fallback, key, index)
                }

                // Case 8: plain composite.
                CompositeKind::Plain(any_props) => build_plain::<H>(rt, any_props.as_ref(), key, index),
            }
        }
    }
}

fn build_context_provider<H: Clone + PartialEq + fmt::Debug>(
    rt: &Runtime,
    context_id: ContextId,
    value: std::rc::Rc<dyn Any>,
    children: Element,
    key: Option<String>,
    index: usize,
) -> Result<Option<VNode<H>>, BuildSignal> {
    let child_key = ChildKey {
        component_key: crate::element::ComponentKey::context_provider(context_id),
        slot: slot_for(&key, index),
    };
    let node_id = rt.enter(child_key);
    crate::hooks::publish_context(rt, node_id, context_id, value);
    let built = build_one::<H>(rt, children, 0);
    rt.exit();
    let built = built?.into_iter().collect();
    Ok(Some(group(built, key, Some(node_id))))
}

fn build_suspense<H: Clone + PartialEq + fmt::Debug>(
    rt: &Runtime,
    children: Element,
    fallback: Element,
    key: Option<String>,
    index: usize,
) -> Result<Option<VNode<H>>, BuildSignal> {
    let child_key = ChildKey {
        component_key: crate::element::ComponentKey::suspense(),
        slot: slot_for(&key, index),
    };
    let node_id = rt.enter(child_key);
    rt.suspense
        .borrow_mut()
        .entry(node_id)
        .or_insert_with(ResourceCache::new);
    let attempt = build_one::<H>(rt, children, 0);
    let result = match attempt {
        Ok(v) => Ok(v),
        Err(BuildSignal::Pending) => build_one::<H>(rt, fallback, 0),
        Err(e @ BuildSignal::Error(_)) => Err(e),
    };
    rt.exit();
    let built = result?.into_iter().collect();
    Ok(Some(group(built, key, Some(node_id))))
}

fn build_plain<H: Clone + PartialEq + fmt::Debug>(
    rt: &Runtime,
    any_props: &dyn crate::element::AnyProps,
    key: Option<String>,
    index: usize,
) -> Result<Option<VNode<H>>, BuildSignal> {
    let child_key = ChildKey {
        component_key: any_props.component_key(),
        slot: slot_for(&key, index),
    };
    let node_id = rt.enter(child_key);
    let rendered = invoke_component(any_props);
    let built = match rendered {
        Ok(el) => build_one::<H>(rt, el, 0),
        Err(sig) => Err(sig),
    };
    rt.exit();
    let built = built?;
    Ok(built.map(|mut v| {
        if v.component_id.is_none() {
            v.component_id = Some(node_id);
        }
        if v.key.is_none() {
            v.key = key;
        }
        v
    }))
}

/// Builds the root element into a `VNode` tree, or `None` for a null root
/// (§4.4 entry point). Always called inside a pass already bracketed by
/// `start_pass`/`end_pass` with the currently-entered pointer at the root.
pub(crate) fn build_root<H: Clone + PartialEq + fmt::Debug>(
    rt: &Runtime,
    root: Element,
) -> Result<Option<VNode<H>>, BuildSignal> {
    build_one::<H>(rt, root, 0)
}
