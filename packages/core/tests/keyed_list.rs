//! S5: keyed list reuse under index-aligned reconciliation (§4.5/§9).
//!
//! Removing an item in the middle of a keyed list shifts every later
//! sibling's index, so only items before the removal point are guaranteed
//! to keep their DOM identity here — a documented limitation of
//! index-aligned reconciliation (see `DESIGN.md`'s "Dropped teacher
//! dependencies" entry on `longest-increasing-subsequence`). Keys still
//! gate reuse, so nothing is silently cross-wired to the wrong item.

use std::cell::RefCell;

use weft_core::{DomAdapter, Element, RuntimeConfig, TestDom, VirtualDom};

thread_local! {
    static IDS: RefCell<Vec<i32>> = RefCell::new(vec![1, 2, 3]);
}

fn li(id: i32) -> Element {
    weft_core::intrinsic("li", weft_core::PropMap::new(), vec![], Some(id.to_string()))
}

fn root() -> Element {
    let ids = IDS.with(|i| i.borrow().clone());
    Element::List(ids.into_iter().map(li).collect())
}

#[test]
fn removing_a_middle_key_keeps_earlier_siblings_and_drops_the_removed_node() {
    IDS.with(|i| *i.borrow_mut() = vec![1, 2, 3]);

    let mut adapter = TestDom::new();
    let container = adapter.create_element("div");
    let mut dom = VirtualDom::mount(adapter, container, root, RuntimeConfig::default()).unwrap();

    // A bare list builds as a `Group` wrapper (§4.4 case 3) around the
    // individual keyed items.
    let group = dom.adapter().children_of(&container)[0];
    let before = dom.adapter().children_of(&group);
    assert_eq!(before.len(), 3);
    let (li1, li2) = (before[0], before[1]);

    IDS.with(|i| *i.borrow_mut() = vec![1, 3]);
    dom.rerender().unwrap();

    let after = dom.adapter().children_of(&group);
    assert_eq!(after.len(), 2);
    assert_eq!(after[0], li1, "key 1 sits before the removal and keeps its DOM node");
    assert!(!after.contains(&li2), "key 2's node must no longer be attached to the container");
}
