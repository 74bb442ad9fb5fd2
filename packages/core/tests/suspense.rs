//! S4: a pending resource shows the `Suspense` fallback, then the real
//! content once the backing future resolves, with the factory invoked
//! exactly once.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context as TaskContext, Poll};

use weft_core::{component, intrinsic, suspense, use_resource, DomAdapter, Element, PropMap, RuntimeConfig, TestDom, VirtualDom};

thread_local! {
    static FACTORY_CALLS: Cell<u32> = Cell::new(0);
    static READY: RefCell<Rc<Cell<bool>>> = RefCell::new(Rc::new(Cell::new(false)));
}

/// A future that stays `Pending` until an external flag is flipped, mimicking
/// a promise that resolves on "the next tick" without a real executor.
struct OnceReady {
    ready: Rc<Cell<bool>>,
    value: Cell<Option<String>>,
}

impl Future for OnceReady {
    type Output = String;

    fn poll(self: Pin<&mut Self>, _cx: &mut TaskContext<'_>) -> Poll<String> {
        if self.ready.get() {
            Poll::Ready(self.value.take().expect("polled again after resolving"))
        } else {
            Poll::Pending
        }
    }
}

fn resource(_: ()) -> Element {
    let ready = READY.with(|r| r.borrow().clone());
    let value = use_resource(move || -> Pin<Box<dyn Future<Output = String>>> {
        FACTORY_CALLS.with(|c| c.set(c.get() + 1));
        Box::pin(OnceReady { ready, value: Cell::new(Some("ok".to_string())) })
    });
    intrinsic("b", PropMap::new(), vec![value.as_str().into()], None)
}

fn root() -> Element {
    let fallback = intrinsic("i", PropMap::new(), vec!["load".into()], None);
    suspense(component(resource, (), None), fallback)
}

fn init_logger() {
    _ = tracing_subscriber::fmt().with_env_filter("debug,weft_core=trace").without_time().try_init();
}

#[test]
fn fallback_then_resolved_content_with_a_single_factory_call() {
    init_logger();
    READY.with(|r| *r.borrow_mut() = Rc::new(Cell::new(false)));
    FACTORY_CALLS.with(|c| c.set(0));

    let mut adapter = TestDom::new();
    let container = adapter.create_element("div");
    let mut dom = VirtualDom::mount(adapter, container, root, RuntimeConfig::default()).unwrap();

    let group = dom.adapter().children_of(&container)[0];
    let fallback_child = dom.adapter().children_of(&group)[0];
    assert_eq!(dom.adapter().text_content(&fallback_child), "load");
    assert_eq!(FACTORY_CALLS.with(|c| c.get()), 1);

    let ready = READY.with(|r| r.borrow().clone());
    ready.set(true);

    // This pass builds from the still-Pending cache entry and only polls
    // (promoting it to Ready) afterwards, so the fallback is still showing.
    dom.rerender().unwrap();
    let still_fallback = dom.adapter().children_of(&group)[0];
    assert_eq!(dom.adapter().text_content(&still_fallback), "load");

    // This pass builds against the now-Ready cache entry.
    dom.rerender().unwrap();
    let resolved_child = dom.adapter().children_of(&group)[0];
    assert_eq!(dom.adapter().text_content(&resolved_child), "ok");

    assert_eq!(FACTORY_CALLS.with(|c| c.get()), 1, "the resource factory must run at most once");
}
