//! S2: effect setup/cleanup ordering and counts across dependency changes
//! and an eventual unmount.

use std::cell::{Cell, RefCell};

use weft_core::{component, intrinsic, use_effect, AnyDep, DomAdapter, Element, PropMap, RuntimeConfig, TestDom, VirtualDom};

thread_local! {
    static LOG: RefCell<Vec<String>> = RefCell::new(Vec::new());
    static DEP: Cell<i32> = Cell::new(1);
    static ALIVE: Cell<bool> = Cell::new(true);
}

fn log(event: impl Into<String>) {
    LOG.with(|l| l.borrow_mut().push(event.into()));
}

fn effectful(_: ()) -> Element {
    let dep = DEP.with(|d| d.get());
    use_effect(
        move || {
            log(format!("setup({dep})"));
            Some(Box::new(move || log(format!("cleanup({dep})"))) as Box<dyn FnOnce()>)
        },
        Some(vec![Box::new(dep) as Box<dyn AnyDep>]),
    );
    intrinsic("div", PropMap::new(), vec![], None)
}

fn root() -> Element {
    if ALIVE.with(|a| a.get()) {
        component(effectful, (), None)
    } else {
        Element::null()
    }
}

#[test]
fn setup_cleanup_and_unmount_follow_the_expected_order() {
    let mut adapter = TestDom::new();
    let container = adapter.create_element("div");
    let mut dom = VirtualDom::mount(adapter, container, root, RuntimeConfig::default()).unwrap();
    assert_eq!(LOG.with(|l| l.borrow().clone()), vec!["setup(1)"]);

    // Same dep: a re-render must neither re-run setup nor run cleanup.
    dom.rerender().unwrap();
    assert_eq!(LOG.with(|l| l.borrow().clone()), vec!["setup(1)"]);

    // New dep: cleanup(1) then setup(2).
    DEP.with(|d| d.set(2));
    dom.rerender().unwrap();
    assert_eq!(LOG.with(|l| l.borrow().clone()), vec!["setup(1)", "cleanup(1)", "setup(2)"]);

    // Unmount: cleanup(2), with no further setup.
    ALIVE.with(|a| a.set(false));
    dom.rerender().unwrap();
    let log = LOG.with(|l| l.borrow().clone());
    assert_eq!(log, vec!["setup(1)", "cleanup(1)", "setup(2)", "cleanup(2)"]);
    assert_eq!(log.iter().filter(|e| e.starts_with("setup")).count(), 2);
    assert_eq!(log.iter().filter(|e| e.starts_with("cleanup")).count(), 2);
}
