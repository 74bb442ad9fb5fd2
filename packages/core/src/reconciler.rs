//! The reconciler (§4.5): diffs a new `VNode` tree against the previous
//! one and mutates the live document through a [`DomAdapter`].
//!
//! Grounded on `diff.rs`'s create/diff/remove instruction shape and
//! `mutations.rs`'s per-kind mutation dispatch, narrowed to the plain
//! [`DomAdapter`] calls in `dom.rs` instead of a template mutation log.
//! The teacher's `longest-increasing-subsequence`-based keyed diff is not
//! carried forward: child reconciliation is index-aligned (§4.5, §9).

use std::rc::Rc;

use crate::dom::{DomAdapter, ListenerId, StyleValue};
use crate::element::{PropMap, PropValue};
use crate::vnode::{can_reuse, VNode, VNodeKind};

const LISTENER_PREFIX: &str = "on";
const GROUP_TAG: &str = "weft-group";

fn is_event_name(name: &str) -> bool {
    name.len() > LISTENER_PREFIX.len() && name.starts_with(LISTENER_PREFIX)
}

fn listener_id(cb: &Rc<dyn Fn(&dyn std::any::Any)>) -> ListenerId {
    ListenerId(Rc::as_ptr(cb) as *const () as u64)
}

fn apply_prop<A: DomAdapter>(adapter: &mut A, el: &A::Handle, name: &str, value: &PropValue) {
    match name {
        "__self" | "__source" => {}
        "style" => {
            if let PropValue::Style(s) = value {
                adapter.set_style(el, s);
            }
        }
        "className" => {
            if let PropValue::Text(s) = value {
                adapter.set_class(el, s);
            }
        }
        "ref" => {
            if let PropValue::Ref(r) = value {
                *r.borrow_mut() = Box::new(el.clone());
            }
        }
        _ if is_event_name(name) => {
            if let PropValue::Event(cb) = value {
                adapter.add_event(el, &name[LISTENER_PREFIX.len()..].to_lowercase(), listener_id(cb), cb.clone());
            }
        }
        _ => match value {
            PropValue::Text(s) => adapter.set_attr(el, name, s),
            PropValue::Number(n) => adapter.set_attr(el, name, &n.to_string()),
            PropValue::Bool(true) => adapter.set_attr(el, name, "true"),
            PropValue::Bool(false) => adapter.remove_attr(el, name),
            _ => {}
        },
    }
}

fn remove_prop<A: DomAdapter>(adapter: &mut A, el: &A::Handle, name: &str, value: &PropValue) {
    match name {
        "__self" | "__source" => {}
        "style" => adapter.set_style(el, &StyleValue::Text(String::new())),
        "className" => adapter.set_class(el, ""),
        _ if is_event_name(name) => {
            if let PropValue::Event(cb) = value {
                adapter.remove_event(el, &name[LISTENER_PREFIX.len()..].to_lowercase(), listener_id(cb));
            }
        }
        _ => adapter.remove_attr(el, name),
    }
}

fn apply_all_props<A: DomAdapter>(adapter: &mut A, el: &A::Handle, props: &PropMap) {
    for (name, value) in props.iter() {
        apply_prop(adapter, el, name, value);
    }
}

/// §4.5 prop diffing: remove anything dropped, (re-)apply everything
/// present in `new`. Re-applying unchanged props is intentionally simple
/// rather than value-diffed — the spec requires idempotence, not
/// minimality, here.
fn diff_props<A: DomAdapter>(adapter: &mut A, el: &A::Handle, old: &PropMap, new: &PropMap) {
    for (name, value) in old.iter() {
        if !new.contains_key(name) {
            remove_prop(adapter, el, name, value);
        }
    }
    apply_all_props(adapter, el, new);
}

fn materialize<A: DomAdapter>(adapter: &mut A, node: &mut VNode<A::Handle>) -> A::Handle {
    match &mut node.kind {
        VNodeKind::Text { value, handle } => {
            let h = adapter.create_text(value);
            *handle = Some(h.clone());
            h
        }
        VNodeKind::Intrinsic {
            tag,
            props,
            children,
            handle,
        } => {
            let h = adapter.create_element(tag);
            apply_all_props(adapter, &h, props);
            for child in children.iter_mut() {
                let ch = materialize(adapter, child);
                adapter.append(&h, &ch);
            }
            *handle = Some(h.clone());
            h
        }
        VNodeKind::Group { children, handle } => {
            let h = adapter.create_element(GROUP_TAG);
            adapter.set_style(&h, &StyleValue::Text("display:contents".to_string()));
            for child in children.iter_mut() {
                let ch = materialize(adapter, child);
                adapter.append(&h, &ch);
            }
            *handle = Some(h.clone());
            h
        }
    }
}

/// Reconciles one position: `new`/`old` may each be absent (§4.5's four
/// cases). Returns the tree to keep as `prevVTree` for this position.
pub(crate) fn reconcile<A: DomAdapter>(
    adapter: &mut A,
    container: &A::Handle,
    new: Option<VNode<A::Handle>>,
    old: Option<VNode<A::Handle>>,
) -> Option<VNode<A::Handle>> {
    match (new, old) {
        (None, Some(old)) => {
            if let Some(h) = old.dom_handle() {
                adapter.remove(container, &h);
            }
            None
        }
        (Some(mut new), None) => {
            let h = materialize(adapter, &mut new);
            adapter.append(container, &h);
            Some(new)
        }
        (Some(mut new), Some(old)) => {
            if can_reuse(&new, &old) {
                adopt(adapter, &mut new, old);
            } else {
                let new_handle = materialize(adapter, &mut new);
                match old.dom_handle() {
                    Some(old_handle) => adapter.replace(container, &new_handle, &old_handle),
                    None => adapter.append(container, &new_handle),
                }
            }
            Some(new)
        }
        (None, None) => None,
    }
}

fn reconcile_children<A: DomAdapter>(
    adapter: &mut A,
    container: &A::Handle,
    new_children: Vec<VNode<A::Handle>>,
    old_children: Vec<VNode<A::Handle>>,
) -> Vec<VNode<A::Handle>> {
    let max_len = new_children.len().max(old_children.len());
    let mut new_iter = new_children.into_iter();
    let mut old_iter = old_children.into_iter();
    let mut out = Vec::with_capacity(max_len);
    for _ in 0..max_len {
        if let Some(reconciled) = reconcile(adapter, container, new_iter.next(), old_iter.next()) {
            out.push(reconciled);
        }
    }
    out
}

/// Adopts `old`'s DOM handle(s) for a reused position, diffing props for
/// intrinsics and recursing into children (§4.5 "canReuse holds").
fn adopt<A: DomAdapter>(adapter: &mut A, new: &mut VNode<A::Handle>, old: VNode<A::Handle>) {
    match (&mut new.kind, old.kind) {
        (VNodeKind::Text { value, handle }, VNodeKind::Text { handle: old_handle, .. }) => {
            let h = old_handle.expect("reconciled old text node missing a materialized handle");
            adapter.set_text(&h, value);
            *handle = Some(h);
        }
        (
            VNodeKind::Intrinsic {
                props,
                children,
                handle,
                ..
            },
            VNodeKind::Intrinsic {
                props: old_props,
                children: old_children,
                handle: old_handle,
                ..
            },
        ) => {
            let h = old_handle.expect("reconciled old intrinsic missing a materialized handle");
            diff_props(adapter, &h, &old_props, &*props);
            let new_children = std::mem::take(children);
            *children = reconcile_children(adapter, &h, new_children, old_children);
            *handle = Some(h);
        }
        (VNodeKind::Group { children, handle }, VNodeKind::Group { children: old_children, handle: old_handle }) => {
            let h = old_handle.expect("reconciled old group missing a materialized handle");
            let new_children = std::mem::take(children);
            *children = reconcile_children(adapter, &h, new_children, old_children);
            *handle = Some(h);
        }
        _ => unreachable!("can_reuse guarantees matching VNodeKind variants"),
    }
}
