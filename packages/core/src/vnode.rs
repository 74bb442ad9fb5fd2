//! The runtime virtual-tree node (§3 "Virtual node (VNode)") produced by
//! the builder and consumed by the reconciler.
//!
//! `H` is the DOM adapter's handle type; a `VNode<H>` produced before
//! reconciliation carries no handles (`None` everywhere), and the
//! reconciler fills them in as it materializes or adopts DOM nodes.

use crate::arena::NodeId;
use crate::element::PropMap;

pub(crate) enum VNodeKind<H> {
    Text {
        value: String,
        handle: Option<H>,
    },
    Intrinsic {
        tag: &'static str,
        props: PropMap,
        children: Vec<VNode<H>>,
        handle: Option<H>,
    },
    /// A `Fragment`/`Suspense`/`Context.Provider` grouping (§4.5
    /// "grouping host"), materialized as a plain wrapping element so the
    /// group has a single handle for whole-group replace/remove, the same
    /// way ordinary intrinsics do.
    Group {
        children: Vec<VNode<H>>,
        handle: Option<H>,
    },
}

pub(crate) struct VNode<H> {
    pub kind: VNodeKind<H>,
    pub key: Option<String>,
    pub component_id: Option<NodeId>,
}

impl<H> VNode<H> {
    pub(crate) fn children(&self) -> &[VNode<H>] {
        match &self.kind {
            VNodeKind::Text { .. } => &[],
            VNodeKind::Intrinsic { children, .. } => children,
            VNodeKind::Group { children, .. } => children,
        }
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<VNode<H>> {
        match &mut self.kind {
            VNodeKind::Text { .. } => panic!("text nodes have no children"),
            VNodeKind::Intrinsic { children, .. } => children,
            VNodeKind::Group { children, .. } => children,
        }
    }

    pub(crate) fn same_type(a: &VNode<H>, b: &VNode<H>) -> bool {
        match (&a.kind, &b.kind) {
            (VNodeKind::Text { .. }, VNodeKind::Text { .. }) => true,
            (VNodeKind::Intrinsic { tag: t1, .. }, VNodeKind::Intrinsic { tag: t2, .. }) => t1 == t2,
            (VNodeKind::Group { .. }, VNodeKind::Group { .. }) => true,
            _ => false,
        }
    }
}

impl<H: Clone> VNode<H> {
    /// The DOM handle that represents this node's position in the tree
    /// (Invariant 4): the text/element handle for leaves, or the anchor
    /// for a grouping node.
    pub(crate) fn dom_handle(&self) -> Option<H> {
        match &self.kind {
            VNodeKind::Text { handle, .. } => handle.clone(),
            VNodeKind::Intrinsic { handle, .. } => handle.clone(),
            VNodeKind::Group { handle, .. } => handle.clone(),
        }
    }
}

/// Reuse eligibility (§4.5): `type`, `key`, and `component_id` must all
/// match (Invariant 3).
pub(crate) fn can_reuse<H>(new: &VNode<H>, old: &VNode<H>) -> bool {
    VNode::same_type(new, old) && new.key == old.key && new.component_id == old.component_id
}
