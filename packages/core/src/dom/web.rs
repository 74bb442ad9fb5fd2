//! A real-document [`DomAdapter`] backed by `web-sys` (feature `web`).
//!
//! Grounded on `packages/html/src/web_sys_bind/events.rs`'s use of `web-sys`
//! event and DOM-call types, narrowed to the plain operations this crate's
//! [`DomAdapter`] trait calls for.

use std::collections::HashMap;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, Node};

use super::{Callback, DomAdapter, ListenerId, StyleValue};

/// A live DOM node. `Node::is_same_node` stands in for `PartialEq` since
/// `web_sys::Node` itself only compares by `JsValue` identity of the
/// wrapper, not the underlying object.
#[derive(Clone)]
pub struct WebHandle(Node);

impl PartialEq for WebHandle {
    fn eq(&self, other: &Self) -> bool {
        self.0.is_same_node(Some(&other.0))
    }
}

impl std::fmt::Debug for WebHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WebHandle({:?})", self.0.node_name())
    }
}

/// Wires this crate's narrow [`DomAdapter`] interface onto a real
/// `web_sys::Document`.
///
/// Listener closures are kept alive in `listeners`, keyed by the
/// [`ListenerId`] the reconciler already derives from the callback's `Rc`
/// identity — dropping a `wasm_bindgen::Closure` detaches its JS-side
/// listener, so this map is what keeps a registered handler live between
/// `add_event` and the matching `remove_event`/prop removal.
pub struct WebDom {
    document: Document,
    listeners: HashMap<u64, Closure<dyn FnMut(Event)>>,
}

impl WebDom {
    pub fn new(document: Document) -> Self {
        WebDom {
            document,
            listeners: HashMap::new(),
        }
    }
}

impl DomAdapter for WebDom {
    type Handle = WebHandle;

    fn create_text(&mut self, text: &str) -> WebHandle {
        let node: Node = self.document.create_text_node(text).unchecked_into();
        WebHandle(node)
    }

    fn create_element(&mut self, tag: &str) -> WebHandle {
        let el = self.document.create_element(tag).expect("create_element");
        WebHandle(el.unchecked_into())
    }

    fn set_text(&mut self, node: &WebHandle, text: &str) {
        node.0.set_text_content(Some(text));
    }

    fn set_attr(&mut self, el: &WebHandle, name: &str, value: &str) {
        let element: &Element = el.0.unchecked_ref();
        let _ = element.set_attribute(name, value);
    }

    fn remove_attr(&mut self, el: &WebHandle, name: &str) {
        let element: &Element = el.0.unchecked_ref();
        let _ = element.remove_attribute(name);
    }

    fn set_style(&mut self, el: &WebHandle, style: &StyleValue) {
        let html_element: &HtmlElement = el.0.unchecked_ref();
        let css = html_element.style();
        match style {
            StyleValue::Text(s) => {
                let _ = css.set_css_text(s);
            }
            StyleValue::Map(pairs) => {
                for (name, value) in pairs {
                    let _ = css.set_property(name, value);
                }
            }
        }
    }

    fn set_class(&mut self, el: &WebHandle, class: &str) {
        let element: &Element = el.0.unchecked_ref();
        element.set_class_name(class);
    }

    fn add_event(&mut self, el: &WebHandle, event: &str, id: ListenerId, callback: Callback) {
        let closure = Closure::wrap(Box::new(move |ev: Event| {
            callback(&ev as &dyn std::any::Any);
        }) as Box<dyn FnMut(Event)>);
        let target: &EventTarget = el.0.unchecked_ref();
        let _ = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        self.listeners.insert(id.0, closure);
    }

    fn remove_event(&mut self, el: &WebHandle, event: &str, id: ListenerId) {
        if let Some(closure) = self.listeners.remove(&id.0) {
            let target: &EventTarget = el.0.unchecked_ref();
            let _ = target.remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        }
    }

    fn append(&mut self, parent: &WebHandle, child: &WebHandle) {
        let _ = parent.0.append_child(&child.0);
    }

    fn replace(&mut self, parent: &WebHandle, new: &WebHandle, old: &WebHandle) {
        let _ = parent.0.replace_child(&new.0, &old.0);
    }

    fn remove(&mut self, parent: &WebHandle, child: &WebHandle) {
        let _ = parent.0.remove_child(&child.0);
    }
}
