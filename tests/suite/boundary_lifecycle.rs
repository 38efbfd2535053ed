//! End-to-end boundary lifecycle: healthy, faulted, reset, healthy again.

use std::cell::RefCell;
use std::rc::Rc;

use crate::common::{Probe, mount_guarded};
use cordon_engine::{BoundaryProps, CaughtError, Rendered, Runtime, RuntimeConfig, View};

#[test]
fn fallback_commits_in_the_faulting_pass() {
    let probe = Probe::new("meter", "meter online");
    let (mut runtime, _controller) = mount_guarded(&probe, "meter offline");
    runtime.render().expect("initial render");
    assert_eq!(runtime.committed().text_lines(), ["meter online"]);

    probe.fail_next("meter exploded");
    runtime.schedule().mark();
    runtime.pass().expect("faulting pass");

    // The pass that intercepted the fault already shows the fallback; no
    // intermediate tree without the children is ever committed.
    assert_eq!(runtime.committed().text_lines(), ["meter offline"]);
}

#[test]
fn empty_fallback_renders_nothing() {
    let probe = Probe::new("meter", "meter online");
    let mut runtime = Runtime::new(RuntimeConfig::default());
    assert!(runtime.committed().is_nothing());

    let controller = runtime.controller();
    let inner = controller.clone();
    let child = probe.view();
    runtime.mount(move || inner.wrapper().wrap(View::Empty, vec![child.clone()]));
    runtime.render().expect("initial render");
    assert_eq!(runtime.committed().text_lines(), ["meter online"]);

    probe.fail_next("meter exploded");
    runtime.schedule().mark();
    runtime.render().expect("faulting render");

    // The subtree is cordoned with nothing shown in its place.
    assert!(controller.has_error());
    assert!(runtime.committed().text_lines().is_empty());
    assert!(matches!(
        runtime.committed(),
        Rendered::Group { children, .. } if children[0].is_nothing()
    ));
}

#[test]
fn full_lifecycle_heals_after_reset() {
    let probe = Probe::new("meter", "meter online");
    let (mut runtime, controller) = mount_guarded(&probe, "meter offline");
    runtime.render().expect("initial render");

    probe.fail_next("meter exploded");
    runtime.schedule().mark();
    runtime.render().expect("faulting render");
    assert!(controller.has_error());
    assert_eq!(runtime.committed().text_lines(), ["meter offline"]);

    controller.reset();
    // A second reset has nothing left to clear.
    controller.reset();
    runtime.render().expect("recovery render");
    assert!(!controller.has_error());
    assert_eq!(runtime.committed().text_lines(), ["meter online"]);
}

#[test]
fn faulted_boundary_never_runs_its_children() {
    let probe = Probe::new("meter", "meter online");
    let (mut runtime, _controller) = mount_guarded(&probe, "meter offline");
    runtime.render().expect("initial render");

    probe.fail_next("meter exploded");
    runtime.schedule().mark();
    runtime.render().expect("faulting render");
    let runs_when_faulted = probe.runs();

    for _ in 0..5 {
        runtime.schedule().mark();
        runtime.render().expect("ticking render");
    }
    assert_eq!(probe.runs(), runs_when_faulted);
    assert_eq!(runtime.committed().text_lines(), ["meter offline"]);
}

#[test]
fn reset_without_an_error_is_inert() {
    let probe = Probe::new("meter", "meter online");
    let (mut runtime, controller) = mount_guarded(&probe, "meter offline");
    runtime.render().expect("initial render");

    let before = controller.wrapper();
    controller.reset();
    controller.reset();
    assert!(!runtime.is_dirty());
    assert!(before.identity().same(controller.wrapper().identity()));
}

#[test]
fn standalone_boundary_rearms_once_children_heal() {
    let probe = Probe::new("meter", "meter online");
    let mut runtime = Runtime::new(RuntimeConfig::default());
    let props = BoundaryProps::new(vec![probe.view()], View::text("meter offline"));
    runtime.mount(move || View::boundary(props.clone()));

    probe.fail_next("one bad read");
    runtime.render().expect("fault absorbed");
    assert_eq!(runtime.committed().text_lines(), ["meter offline"]);

    // With no controller feeding the error back in as the external value,
    // the next pass clears the captured state and remounts the children.
    runtime.schedule().mark();
    runtime.render().expect("healed render");
    assert_eq!(runtime.committed().text_lines(), ["meter online"]);
    assert_eq!(probe.runs(), 2);
}

#[test]
fn error_present_before_the_first_render_skips_children() {
    let probe = Probe::new("meter", "meter online");
    let (mut runtime, controller) = mount_guarded(&probe, "meter offline");

    controller.force_error(CaughtError::msg("prearmed"));
    runtime.render().expect("first render");

    // The boundary comes up already faulted; the children never run.
    assert_eq!(runtime.committed().text_lines(), ["meter offline"]);
    assert_eq!(probe.runs(), 0);
}

#[test]
fn controller_stores_the_exact_thrown_instance() {
    let thrown: Rc<RefCell<Option<CaughtError>>> = Rc::default();
    let mut runtime = Runtime::new(RuntimeConfig::default());
    let controller = runtime.controller();

    let inner = controller.clone();
    let stash = Rc::clone(&thrown);
    let flaky = View::component("flaky", move || {
        let error = CaughtError::msg("x");
        *stash.borrow_mut() = Some(error.clone());
        Err(error)
    });
    runtime.mount(move || {
        inner
            .wrapper()
            .wrap(View::text("fallen"), vec![flaky.clone()])
    });

    runtime.render().expect("fault absorbed");
    let thrown = thrown.borrow().clone().expect("component threw");
    let current = controller.current_error().expect("stored error");
    assert!(current.same(&thrown));
}

#[test]
fn forced_error_overrides_healthy_children() {
    let probe = Probe::new("meter", "meter online");
    let (mut runtime, controller) = mount_guarded(&probe, "meter offline");
    runtime.render().expect("initial render");
    let runs_before = probe.runs();

    controller.force_error(CaughtError::msg("ops override"));
    runtime.render().expect("forced render");

    // The fallback replaced the children without re-running them.
    assert_eq!(runtime.committed().text_lines(), ["meter offline"]);
    assert_eq!(probe.runs(), runs_before);
    let current = controller.current_error().expect("forced error");
    assert!(current.to_string().contains("ops override"));
}
