//! S3: a `Context.Provider` value is visible to any descendant and falls
//! back to the context's default when no provider is mounted.

use std::cell::RefCell;

use weft_core::{
    component, create_context, fragment, intrinsic, use_context, Context, DomAdapter, Element, PropMap,
    RuntimeConfig, TestDom, TestHandle, VirtualDom,
};

thread_local! {
    static CTX: RefCell<Option<Context<String>>> = RefCell::new(None);
    static PROVIDED: RefCell<bool> = RefCell::new(true);
}

fn ctx() -> Context<String> {
    CTX.with(|c| c.borrow().clone().expect("context not set up yet"))
}

fn inner(_: ()) -> Element {
    let value = use_context(&ctx());
    intrinsic("span", PropMap::new(), vec![value.as_str().into()], None)
}

fn root() -> Element {
    let ctx = ctx();
    let child = component(inner, (), None);
    if PROVIDED.with(|p| *p.borrow()) {
        ctx.provider("x".to_string(), child)
    } else {
        fragment(vec![child])
    }
}

fn text_under_span(dom: &VirtualDom<TestDom>, container: TestHandle) -> String {
    // Both `ctx.provider(...)` and `fragment(...)` wrap their child in a
    // `Group` (§4.4 case 6 / the Fragment arm), so the span sits one level
    // below the container, not directly under it.
    let group = dom.adapter().children_of(&container)[0];
    let span = dom.adapter().children_of(&group)[0];
    let text = dom.adapter().children_of(&span)[0];
    dom.adapter().text_of(&text)
}

#[test]
fn provided_value_reaches_the_nearest_consumer() {
    CTX.with(|c| *c.borrow_mut() = Some(create_context("d".to_string())));
    PROVIDED.with(|p| *p.borrow_mut() = true);

    let mut adapter = TestDom::new();
    let container = adapter.create_element("div");
    let dom = VirtualDom::mount(adapter, container, root, RuntimeConfig::default()).unwrap();
    assert_eq!(text_under_span(&dom, container), "x");
}

#[test]
fn missing_provider_falls_back_to_the_default() {
    CTX.with(|c| *c.borrow_mut() = Some(create_context("d".to_string())));
    PROVIDED.with(|p| *p.borrow_mut() = false);

    let mut adapter = TestDom::new();
    let container = adapter.create_element("div");
    let dom = VirtualDom::mount(adapter, container, root, RuntimeConfig::default()).unwrap();
    assert_eq!(text_under_span(&dom, container), "d");
}
