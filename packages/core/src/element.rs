//! Author-facing element values (§3 "Element") and the type-erased
//! composite-component props object.
//!
//! Grounded on `any_props.rs` (`AnyProps` trait + `VProps<P>` impl) and
//! `factory.rs`'s "factory builds a node from typed props" idiom. The
//! bump-arena allocation those files use is not carried over (see
//! `DESIGN.md`); props are cloned into an owned, `Rc`-free virtual tree
//! instead.
//!
//! A JS-flavored spec models `Fragment`/`Suspense`/`Context.Provider` as
//! sentinel *tags* on a single composite shape, because JS has one element
//! shape for everything. Rust lets these be distinct enum variants instead
//! of a runtime tag comparison — same semantics, a proper sum type.

use std::any::{Any, TypeId};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;

use crate::dom::{Callback, StyleValue};

/// A ref object: stable across renders of the owning instance (§4.3
/// `useRef`), assigned by the reconciler when materializing an intrinsic
/// element that carries a `ref` prop.
pub type RefObject = Rc<std::cell::RefCell<Box<dyn Any>>>;

/// An untyped intrinsic-element prop value.
#[derive(Clone)]
pub enum PropValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Style(StyleValue),
    Event(Callback),
    Ref(RefObject),
    Any(Rc<dyn Any>),
}

impl std::fmt::Debug for PropValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropValue::Text(s) => write!(f, "Text({s:?})"),
            PropValue::Number(n) => write!(f, "Number({n})"),
            PropValue::Bool(b) => write!(f, "Bool({b})"),
            PropValue::Style(s) => write!(f, "Style({s:?})"),
            PropValue::Event(_) => write!(f, "Event(..)"),
            PropValue::Ref(_) => write!(f, "Ref(..)"),
            PropValue::Any(_) => write!(f, "Any(..)"),
        }
    }
}

/// Intrinsic-element props, keyed in authoring order (iteration order feeds
/// the reconciler's prop diff, so it is preserved rather than hashed away).
pub type PropMap = IndexMap<String, PropValue>;

/// Identifies one distinct `ComponentFn` + prop type, for stable component
/// identity (§9 "Stable component identity"): a fast, cheap-to-compute
/// signature, not a hash of prop contents.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ComponentKey {
    fn_ptr: usize,
    type_id: TypeId,
}

/// A fresh, process-unique context identity (§3 "Context object").
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ContextId(u64);

impl ContextId {
    fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        ContextId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub(crate) fn raw(&self) -> u64 {
        self.0
    }
}

struct SuspenseMarker;
struct ContextProviderMarker;

impl ComponentKey {
    /// Synthetic identity for a `Suspense` boundary at a given position —
    /// there is no user `fn` pointer to key off, so a fixed marker type
    /// plays that role instead.
    pub(crate) fn suspense() -> Self {
        ComponentKey {
            fn_ptr: 0,
            type_id: TypeId::of::<SuspenseMarker>(),
        }
    }

    /// Synthetic identity for a `Context.Provider` at a given position,
    /// distinguished by which context it carries.
    pub(crate) fn context_provider(ctx: ContextId) -> Self {
        ComponentKey {
            fn_ptr: ctx.raw() as usize,
            type_id: TypeId::of::<ContextProviderMarker>(),
        }
    }
}

/// A type-erased composite component ready to be invoked by the builder.
///
/// Reduced from the teacher's `AnyProps` (`render`/`memoize`/`props`/
/// `duplicate`) to just what this spec's builder needs: components are
/// always re-invoked on every pass (§4.4 case 8 has no memoization
/// short-circuit), so there is no live call site for a memoize/duplicate
/// step here.
pub trait AnyProps {
    fn render(&self) -> Element;
    fn component_key(&self) -> ComponentKey;
}

/// A concrete composite component bound to its props, erased behind
/// [`AnyProps`].
pub struct VProps<P> {
    props: P,
    render_fn: fn(P) -> Element,
}

impl<P: Clone + 'static> AnyProps for VProps<P> {
    fn render(&self) -> Element {
        (self.render_fn)(self.props.clone())
    }

    fn component_key(&self) -> ComponentKey {
        ComponentKey {
            fn_ptr: self.render_fn as usize,
            type_id: TypeId::of::<P>(),
        }
    }
}

/// An intrinsic (DOM-tag) element.
pub struct IntrinsicElement {
    pub tag: &'static str,
    pub props: PropMap,
    pub children: Vec<Element>,
    pub key: Option<String>,
}

/// The special behaviors a composite element can request (§4.4 cases 6-8).
pub enum CompositeKind {
    /// An ordinary user component.
    Plain(Rc<dyn AnyProps>),
    /// A grouping of children with no wrapping DOM node.
    Fragment(Vec<Element>),
    /// Guards `children`, substituting `fallback` while any resource inside
    /// `children` is pending (§4.6).
    Suspense {
        children: Box<Element>,
        fallback: Box<Element>,
    },
    /// Publishes `value` under `context_id` to the hook node created for
    /// this element, then renders `children` beneath it (§4.4 case 6).
    ContextProvider {
        context_id: ContextId,
        value: Rc<dyn Any>,
        children: Box<Element>,
    },
}

pub struct CompositeElement {
    pub kind: CompositeKind,
    pub key: Option<String>,
}

/// The author-facing UI value (§3 "Element").
pub enum Element {
    Null,
    Text(String),
    List(Vec<Element>),
    Intrinsic(IntrinsicElement),
    Composite(CompositeElement),
}

impl Element {
    pub fn null() -> Element {
        Element::Null
    }
}

impl From<String> for Element {
    fn from(s: String) -> Self {
        Element::Text(s)
    }
}

impl From<&str> for Element {
    fn from(s: &str) -> Self {
        Element::Text(s.to_string())
    }
}

impl From<f64> for Element {
    fn from(n: f64) -> Self {
        Element::Text(format!("{n}"))
    }
}

/// Builds an intrinsic element (§6 `createElement`).
pub fn intrinsic(tag: &'static str, props: PropMap, children: Vec<Element>, key: Option<String>) -> Element {
    Element::Intrinsic(IntrinsicElement {
        tag,
        props,
        children,
        key,
    })
}

/// Builds a composite element from a plain component function and its
/// props (§6 `createElement`).
pub fn component<P: Clone + 'static>(render_fn: fn(P) -> Element, props: P, key: Option<String>) -> Element {
    Element::Composite(CompositeElement {
        kind: CompositeKind::Plain(Rc::new(VProps { props, render_fn })),
        key,
    })
}

/// Builds a `Fragment` element (§6 `Fragment` sentinel).
pub fn fragment(children: Vec<Element>) -> Element {
    Element::Composite(CompositeElement {
        kind: CompositeKind::Fragment(children),
        key: None,
    })
}

/// Builds a `Suspense` element (§6 `Suspense` sentinel).
pub fn suspense(children: Element, fallback: Element) -> Element {
    Element::Composite(CompositeElement {
        kind: CompositeKind::Suspense {
            children: Box::new(children),
            fallback: Box::new(fallback),
        },
        key: None,
    })
}

/// A context created by [`crate::hooks::create_context`].
#[derive(Clone)]
pub struct Context<T> {
    pub(crate) id: ContextId,
    pub(crate) default: Rc<T>,
}

impl<T: 'static> Context<T> {
    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn default_value(&self) -> Rc<T> {
        self.default.clone()
    }

    /// Builds a `Context.Provider` element (§6 `Context` sentinel).
    pub fn provider(&self, value: T, children: Element) -> Element {
        Element::Composite(CompositeElement {
            kind: CompositeKind::ContextProvider {
                context_id: self.id,
                value: Rc::new(value),
                children: Box::new(children),
            },
            key: None,
        })
    }
}

pub(crate) fn new_context<T: 'static>(default: T) -> Context<T> {
    Context {
        id: ContextId::fresh(),
        default: Rc::new(default),
    }
}
