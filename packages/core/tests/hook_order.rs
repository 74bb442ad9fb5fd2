//! S6: repeating the same `useState` → `useEffect` → `useRef` call order on
//! a second render allocates the same cursor → cell shape each hook
//! expects, with no hook-order mismatch and a stable `useRef` identity.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use weft_core::{component, intrinsic, use_effect, use_ref, use_state, DomAdapter, Element, PropMap, RefObject, RuntimeConfig, TestDom, VirtualDom};

thread_local! {
    static FIRST_REF: RefCell<Option<RefObject>> = RefCell::new(None);
    static SAME_REF_ON_RERENDER: Cell<bool> = Cell::new(false);
}

fn three_hooks(_: ()) -> Element {
    let (n, _set) = use_state(|| 0i32);
    use_effect(|| None, None);
    let r = use_ref(|| 0i32);

    FIRST_REF.with(|slot| {
        let mut slot = slot.borrow_mut();
        match slot.as_ref() {
            None => *slot = Some(r.clone()),
            Some(first) => SAME_REF_ON_RERENDER.with(|s| s.set(Rc::ptr_eq(first, &r))),
        }
    });

    intrinsic("div", PropMap::new(), vec![n.to_string().into()], None)
}

fn root() -> Element {
    component(three_hooks, (), None)
}

#[test]
fn second_render_reuses_the_same_cell_shapes() {
    let mut adapter = TestDom::new();
    let container = adapter.create_element("div");
    let mut dom = VirtualDom::mount(adapter, container, root, RuntimeConfig::default()).unwrap();

    // A hook-order mismatch would turn this into a RuntimeError instead.
    dom.rerender().expect("second render must reuse cursor 0/1/2 without a hook-order mismatch");

    assert!(SAME_REF_ON_RERENDER.with(|s| s.get()), "useRef's identity must survive across renders of the same instance");
}
