//! S1: a click-driven counter coalesces many queued updates into one pass.

use std::rc::Rc;

use weft_core::dom::DomOp;
use weft_core::{
    component, intrinsic, use_state, Callback, DomAdapter, Element, PropMap, PropValue, RuntimeConfig, TestDom,
    VirtualDom,
};

fn counter(_: ()) -> Element {
    let (value, set_value) = use_state(|| 0i32);
    let mut props = PropMap::new();
    let setter = set_value.clone();
    let onclick: Callback = Rc::new(move |_: &dyn std::any::Any| setter.update(|n| n + 1));
    props.insert("onclick".to_string(), PropValue::Event(onclick));
    intrinsic("button", props, vec![value.to_string().into()], None)
}

fn root() -> Element {
    component(counter, (), None)
}

#[test]
fn seven_clicks_coalesce_into_one_pass() {
    let mut adapter = TestDom::new();
    let container = adapter.create_element("div");
    let mut dom = VirtualDom::mount(adapter, container, root, RuntimeConfig::default()).unwrap();

    let button = dom.adapter().children_of(&container)[0];
    let text_node = dom.adapter().children_of(&button)[0];
    assert_eq!(dom.adapter().text_of(&text_node), "0");

    for _ in 0..7 {
        dom.adapter().dispatch(&button, "click", &());
    }
    // Nothing has rebuilt yet: the DOM still reads the pre-click value.
    assert_eq!(dom.adapter().text_of(&text_node), "0");

    let ran = dom.flush().unwrap();
    assert!(ran);
    assert_eq!(dom.adapter().text_of(&text_node), "7");

    let set_text_calls = dom
        .adapter()
        .ops
        .borrow()
        .iter()
        .filter(|op| matches!(op, DomOp::SetText(h, _) if *h == text_node))
        .count();
    assert_eq!(set_text_calls, 1, "seven clicks must settle in a single SetText, not six intermediate ones");
}
