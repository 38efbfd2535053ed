//! Escalation paths: faults a boundary cannot absorb travel outward,
//! or surface as `Uncaught` when nothing encloses them.

use crate::common::{ObserverLog, Probe};
use cordon_engine::{BoundaryProps, RenderError, Runtime, RuntimeConfig, View};

#[test]
fn fallback_fault_escalates_to_the_enclosing_boundary() {
    let probe = Probe::new("meter", "meter online");
    let broken_fallback = Probe::new("broken-fallback", "should never settle");
    let mut runtime = Runtime::new(RuntimeConfig::default());
    let controller = runtime.controller();
    let log = ObserverLog::default();
    log.attach(&controller);

    let inner = controller.clone();
    let probe_view = probe.view();
    let fallback_view = broken_fallback.view();
    runtime.mount(move || {
        let guarded = View::boundary(BoundaryProps::new(
            vec![probe_view.clone()],
            fallback_view.clone(),
        ));
        inner
            .wrapper()
            .wrap(View::text("outer fallback"), vec![guarded])
    });

    probe.fail_next("meter read failed");
    broken_fallback.fail_next("fallback is broken too");
    runtime.render().expect("outer boundary absorbs the cascade");

    assert_eq!(runtime.committed().text_lines(), ["outer fallback"]);
    assert!(controller.has_error());
    let error = controller.current_error().expect("stored error");
    assert!(error.to_string().contains("fallback is broken too"));

    // The trace names the faulting component, then the synthesized
    // fallback frame the escalation passed through.
    let trace = log.trace_at(0).expect("trace captured");
    assert_eq!(trace.frames(), ["broken-fallback", "fallback"]);
}

#[test]
fn sibling_boundaries_isolate_faults_independently() {
    let left = Probe::new("left", "left content");
    let right = Probe::new("right", "right content");
    let mut runtime = Runtime::new(RuntimeConfig::default());

    // Props are built once and cloned per pass so the nodes are retained
    // rather than replaced on every pass.
    let left_props = BoundaryProps::new(vec![left.view()], View::text("left fallback"));
    let right_props = BoundaryProps::new(vec![right.view()], View::text("right fallback"));
    runtime.mount(move || {
        View::group(
            "split",
            vec![
                View::boundary(left_props.clone()),
                View::boundary(right_props.clone()),
            ],
        )
    });

    runtime.render().expect("initial render");
    left.fail_next("left went dark");
    runtime.schedule().mark();
    runtime.render().expect("left fault absorbed");
    assert_eq!(
        runtime.committed().text_lines(),
        ["left fallback", "right content"]
    );

    // While the left keeps faulting it stays cordoned; the right keeps
    // rendering normally throughout.
    let right_runs = right.runs();
    for _ in 0..2 {
        left.fail_next("left went dark");
        runtime.schedule().mark();
        runtime.render().expect("steady render");
        assert_eq!(
            runtime.committed().text_lines(),
            ["left fallback", "right content"]
        );
    }
    assert_eq!(right.runs(), right_runs + 2);
}

#[test]
fn faulting_fallback_at_root_is_uncaught() {
    let probe = Probe::new("meter", "meter online");
    let broken_fallback = Probe::new("broken-fallback", "never shown");
    let mut runtime = Runtime::new(RuntimeConfig::default());

    let props = BoundaryProps::new(vec![probe.view()], broken_fallback.view());
    runtime.mount(move || View::boundary(props.clone()));

    probe.fail_next("meter read failed");
    broken_fallback.fail_next("fallback is broken too");
    let err = runtime.render().expect_err("nothing encloses the boundary");
    match err {
        RenderError::Uncaught { error, trace } => {
            assert!(error.to_string().contains("fallback is broken too"));
            let trace = trace.expect("trace captured");
            assert_eq!(trace.frames(), ["broken-fallback", "fallback"]);
        }
        other => panic!("expected an uncaught fault, got {other:?}"),
    }
}

#[test]
fn fault_without_a_boundary_is_uncaught() {
    let probe = Probe::new("bare", "bare content");
    let mut runtime = Runtime::new(RuntimeConfig::default());
    let probe_view = probe.view();
    runtime.mount(move || View::group("root", vec![probe_view.clone()]));

    runtime.render().expect("initial render");
    probe.fail_next("nothing catches this");
    runtime.schedule().mark();
    match runtime.render() {
        Err(RenderError::Uncaught { error, trace }) => {
            assert!(error.to_string().contains("nothing catches this"));
            let trace = trace.expect("trace captured");
            assert_eq!(trace.frames(), ["bare", "root"]);
        }
        other => panic!("expected an uncaught fault, got {other:?}"),
    }

    // The failed pass never replaces the committed tree.
    assert_eq!(runtime.committed().text_lines(), ["bare content"]);

    // The retained tree was torn down, so the next render remounts.
    runtime.schedule().mark();
    runtime.render().expect("recovery render");
    assert_eq!(probe.runs(), 3);
}
