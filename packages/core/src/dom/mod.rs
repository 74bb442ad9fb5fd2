//! The DOM adapter (§4.1): the one interface the reconciler uses to mutate a
//! live document, plus the in-memory [`TestDom`] implementation used by the
//! integration test suite.
//!
//! Grounded on `mutations.rs`'s `WriteMutations` trait, narrowed from its
//! template-mutation surface down to the plain operations this spec calls
//! for, and on `DioxusLabs-dioxus`'s `test_dom.rs` for the shape of a
//! dedicated test-only double.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A CSS style value: either raw style text, or a property/value map.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum StyleValue {
    Text(String),
    Map(Vec<(String, String)>),
}

/// An opaque identifier for a registered event listener, used so a listener
/// can later be removed with `remove_event`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct ListenerId(pub u64);

/// The narrow document interface the reconciler depends on.
///
/// `Handle` is the adapter's live-node type (a `web-sys::Node` for the real
/// backend, or [`TestDom`]'s own handle for tests).
pub trait DomAdapter {
    type Handle: Clone + PartialEq + fmt::Debug + 'static;

    fn create_text(&mut self, text: &str) -> Self::Handle;
    fn create_element(&mut self, tag: &str) -> Self::Handle;
    fn set_text(&mut self, node: &Self::Handle, text: &str);

    fn set_attr(&mut self, el: &Self::Handle, name: &str, value: &str);
    fn remove_attr(&mut self, el: &Self::Handle, name: &str);
    fn set_style(&mut self, el: &Self::Handle, style: &StyleValue);
    fn set_class(&mut self, el: &Self::Handle, class: &str);

    fn add_event(&mut self, el: &Self::Handle, event: &str, id: ListenerId, callback: Callback);
    fn remove_event(&mut self, el: &Self::Handle, event: &str, id: ListenerId);

    fn append(&mut self, parent: &Self::Handle, child: &Self::Handle);
    fn replace(&mut self, parent: &Self::Handle, new: &Self::Handle, old: &Self::Handle);
    fn remove(&mut self, parent: &Self::Handle, child: &Self::Handle);
}

/// A recorded call against a [`TestDom`], kept for assertions in tests.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum DomOp {
    CreateText(TestHandle, String),
    CreateElement(TestHandle, String),
    SetText(TestHandle, String),
    SetAttr(TestHandle, String, String),
    RemoveAttr(TestHandle, String),
    SetStyle(TestHandle, StyleValue),
    SetClass(TestHandle, String),
    AddEvent(TestHandle, String, ListenerId),
    RemoveEvent(TestHandle, String, ListenerId),
    Append(TestHandle, TestHandle),
    Replace(TestHandle, TestHandle, TestHandle),
    Remove(TestHandle, TestHandle),
}

/// A handle into [`TestDom`]'s shadow tree.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct TestHandle(pub u64);

impl fmt::Debug for TestHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TestHandle({})", self.0)
    }
}

#[derive(Clone, Debug, Default)]
struct TestNode {
    kind: TestNodeKind,
    attrs: HashMap<String, String>,
    class: String,
    style: Option<StyleValue>,
    text: String,
    listeners: HashMap<String, (ListenerId, Callback)>,
    children: Vec<TestHandle>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
enum TestNodeKind {
    #[default]
    Element,
    Text,
}

/// An in-memory stand-in for a document, used by the test suite.
///
/// Every call is additionally recorded into `ops` so tests can assert on the
/// exact sequence of mutations the reconciler performed, mirroring how the
/// reference crate's `Mutations` log is asserted against in its own tests.
pub struct TestDom {
    nodes: RefCell<HashMap<TestHandle, TestNode>>,
    next: RefCell<u64>,
    pub ops: RefCell<Vec<DomOp>>,
}

impl Default for TestDom {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDom {
    pub fn new() -> Self {
        TestDom {
            nodes: RefCell::new(HashMap::new()),
            next: RefCell::new(0),
            ops: RefCell::new(Vec::new()),
        }
    }

    fn fresh(&self, kind: TestNodeKind) -> TestHandle {
        let mut next = self.next.borrow_mut();
        let id = TestHandle(*next);
        *next += 1;
        self.nodes.borrow_mut().insert(
            id,
            TestNode {
                kind,
                ..Default::default()
            },
        );
        id
    }

    /// Returns the text contents of a node, for assertions.
    pub fn text_of(&self, handle: &TestHandle) -> String {
        self.nodes
            .borrow()
            .get(handle)
            .map(|n| n.text.clone())
            .unwrap_or_default()
    }

    /// Returns the attribute value of a node, if set.
    pub fn attr_of(&self, handle: &TestHandle, name: &str) -> Option<String> {
        self.nodes.borrow().get(handle)?.attrs.get(name).cloned()
    }

    /// Returns the children handles of a node, in DOM order.
    pub fn children_of(&self, handle: &TestHandle) -> Vec<TestHandle> {
        self.nodes
            .borrow()
            .get(handle)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// Invokes the listener registered for `event` on `handle`, if any, as
    /// if the host document had just dispatched it. Lets tests drive event
    /// handlers (e.g. S1's click-to-increment counter) without a real
    /// document.
    pub fn dispatch(&self, handle: &TestHandle, event: &str, arg: &dyn std::any::Any) {
        let callback = self
            .nodes
            .borrow()
            .get(handle)
            .and_then(|n| n.listeners.get(event).map(|(_, cb)| cb.clone()));
        if let Some(cb) = callback {
            cb(arg);
        }
    }

    /// Flattens the text content of a node and its descendants, for
    /// human-readable assertions (mirrors `Element.textContent`).
    pub fn text_content(&self, handle: &TestHandle) -> String {
        let nodes = self.nodes.borrow();
        let Some(node) = nodes.get(handle) else {
            return String::new();
        };
        if node.kind == TestNodeKind::Text {
            return node.text.clone();
        }
        let mut out = String::new();
        for child in &node.children {
            out.push_str(&self.text_content(child));
        }
        out
    }
}

impl DomAdapter for TestDom {
    type Handle = TestHandle;

    fn create_text(&mut self, text: &str) -> TestHandle {
        let h = self.fresh(TestNodeKind::Text);
        self.nodes.borrow_mut().get_mut(&h).unwrap().text = text.to_string();
        self.ops.borrow_mut().push(DomOp::CreateText(h, text.to_string()));
        h
    }

    fn create_element(&mut self, tag: &str) -> TestHandle {
        let h = self.fresh(TestNodeKind::Element);
        self.ops.borrow_mut().push(DomOp::CreateElement(h, tag.to_string()));
        h
    }

    fn set_text(&mut self, node: &TestHandle, text: &str) {
        if let Some(n) = self.nodes.borrow_mut().get_mut(node) {
            n.text = text.to_string();
        }
        self.ops.borrow_mut().push(DomOp::SetText(*node, text.to_string()));
    }

    fn set_attr(&mut self, el: &TestHandle, name: &str, value: &str) {
        if let Some(n) = self.nodes.borrow_mut().get_mut(el) {
            n.attrs.insert(name.to_string(), value.to_string());
        }
        self.ops
            .borrow_mut()
            .push(DomOp::SetAttr(*el, name.to_string(), value.to_string()));
    }

    fn remove_attr(&mut self, el: &TestHandle, name: &str) {
        if let Some(n) = self.nodes.borrow_mut().get_mut(el) {
            n.attrs.remove(name);
        }
        self.ops.borrow_mut().push(DomOp::RemoveAttr(*el, name.to_string()));
    }

    fn set_style(&mut self, el: &TestHandle, style: &StyleValue) {
        if let Some(n) = self.nodes.borrow_mut().get_mut(el) {
            n.style = Some(style.clone());
        }
        self.ops.borrow_mut().push(DomOp::SetStyle(*el, style.clone()));
    }

    fn set_class(&mut self, el: &TestHandle, class: &str) {
        if let Some(n) = self.nodes.borrow_mut().get_mut(el) {
            n.class = class.to_string();
        }
        self.ops.borrow_mut().push(DomOp::SetClass(*el, class.to_string()));
    }

    fn add_event(&mut self, el: &TestHandle, event: &str, id: ListenerId, callback: Callback) {
        if let Some(n) = self.nodes.borrow_mut().get_mut(el) {
            n.listeners.insert(event.to_string(), (id, callback));
        }
        self.ops.borrow_mut().push(DomOp::AddEvent(*el, event.to_string(), id));
    }

    fn remove_event(&mut self, el: &TestHandle, event: &str, id: ListenerId) {
        if let Some(n) = self.nodes.borrow_mut().get_mut(el) {
            n.listeners.remove(event);
        }
        self.ops.borrow_mut().push(DomOp::RemoveEvent(*el, event.to_string(), id));
    }

    fn append(&mut self, parent: &TestHandle, child: &TestHandle) {
        if let Some(n) = self.nodes.borrow_mut().get_mut(parent) {
            n.children.push(*child);
        }
        self.ops.borrow_mut().push(DomOp::Append(*parent, *child));
    }

    fn replace(&mut self, parent: &TestHandle, new: &TestHandle, old: &TestHandle) {
        if let Some(n) = self.nodes.borrow_mut().get_mut(parent) {
            if let Some(pos) = n.children.iter().position(|c| c == old) {
                n.children[pos] = *new;
            }
        }
        self.ops.borrow_mut().push(DomOp::Replace(*parent, *new, *old));
    }

    fn remove(&mut self, parent: &TestHandle, child: &TestHandle) {
        if let Some(n) = self.nodes.borrow_mut().get_mut(parent) {
            n.children.retain(|c| c != child);
        }
        self.ops.borrow_mut().push(DomOp::Remove(*parent, *child));
    }
}

/// A reference-counted, shareable event callback, used by `ref` assignment
/// and event listener props alike.
pub type Callback = Rc<dyn Fn(&dyn std::any::Any)>;

#[cfg(feature = "web")]
pub mod web;
