//! Scheduling, pass budgets, and panic capture at the runtime surface.

use crate::common::{ObserverLog, Probe, mount_guarded, mount_guarded_with};
use cordon_engine::{RenderError, Runtime, RuntimeConfig, View};

#[test]
fn pass_budget_comes_from_config() {
    let mut runtime = Runtime::new(RuntimeConfig {
        max_cascade_passes: 3,
        ..RuntimeConfig::default()
    });
    let schedule = runtime.schedule();
    runtime.mount(move || {
        // Re-marking during every build means the tree can never settle.
        schedule.mark();
        View::text("restless")
    });

    let err = runtime.render().expect_err("budget exhausted");
    assert!(matches!(err, RenderError::RenderLoop { passes: 3 }));
}

#[test]
fn interception_cascade_settles_in_two_passes() {
    let probe = Probe::new("meter", "meter online");
    let config = RuntimeConfig {
        max_cascade_passes: 2,
        ..RuntimeConfig::default()
    };
    let (mut runtime, controller) = mount_guarded_with(config, &probe, "meter offline");
    runtime.render().expect("initial render");
    let passes = runtime.stats().passes;

    // Interception stores the error and schedules a follow-up pass that
    // adopts it, so the whole cascade fits a budget of two.
    probe.fail_next("meter read failed");
    runtime.schedule().mark();
    runtime.render().expect("cascade settles inside the budget");
    assert_eq!(runtime.stats().passes, passes + 2);
    assert!(controller.has_error());
}

#[test]
fn repeated_marks_coalesce_into_one_pass() {
    let probe = Probe::new("meter", "meter online");
    let (mut runtime, _controller) = mount_guarded(&probe, "meter offline");
    runtime.render().expect("initial render");
    let passes = runtime.stats().passes;

    for _ in 0..3 {
        runtime.schedule().mark();
    }
    runtime.render().expect("coalesced render");
    assert_eq!(runtime.stats().passes, passes + 1);
    assert_eq!(probe.runs(), 2);
}

#[test]
fn stats_track_the_fault_lifecycle() {
    let probe = Probe::new("meter", "meter online");
    let (mut runtime, controller) = mount_guarded(&probe, "meter offline");
    runtime.render().expect("initial render");
    assert_eq!(runtime.stats().mounts, 1);

    probe.fail_next("meter read failed");
    runtime.schedule().mark();
    runtime.render().expect("fault absorbed");
    let stats = runtime.stats();
    assert_eq!(stats.faults_intercepted, 1);
    assert_eq!(stats.notifications_delivered, 1);
    assert_eq!(stats.unmounts, 1);

    controller.reset();
    runtime.render().expect("children remount");
    assert_eq!(runtime.stats().mounts, 2);
    assert_eq!(probe.runs(), 2);
}

#[test]
fn captured_panics_notify_like_errors() {
    let mut runtime = Runtime::new(RuntimeConfig::default());
    let controller = runtime.controller();
    let log = ObserverLog::default();
    log.attach(&controller);

    let inner = controller.clone();
    let kaboom = View::component("kaboom", || panic!("kaboom payload"));
    runtime.mount(move || {
        inner
            .wrapper()
            .wrap(View::text("fallback"), vec![kaboom.clone()])
    });

    runtime.render().expect("panic is absorbed");
    assert_eq!(runtime.committed().text_lines(), ["fallback"]);
    assert_eq!(log.len(), 1);
    assert!(log.error_at(0).is_panic());
    assert!(log.error_at(0).to_string().contains("kaboom payload"));
    let trace = log.trace_at(0).expect("trace captured");
    assert_eq!(trace.innermost(), Some("kaboom"));
}

#[test]
fn panics_propagate_when_capture_is_disabled() {
    let mut runtime = Runtime::new(RuntimeConfig {
        catch_panics: false,
        ..RuntimeConfig::default()
    });
    let controller = runtime.controller();

    let inner = controller.clone();
    let kaboom = View::component("kaboom", || panic!("kaboom payload"));
    runtime.mount(move || {
        inner
            .wrapper()
            .wrap(View::text("fallback"), vec![kaboom.clone()])
    });

    // With capture off, not even a guarded boundary absorbs a panic.
    let unwound =
        std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| runtime.render().map(|_| ())))
            .is_err();
    assert!(unwound);
    assert!(!controller.has_error());
}

#[test]
fn panic_capture_can_be_toggled_mid_session() {
    let mut runtime = Runtime::new(RuntimeConfig::default());
    let controller = runtime.controller();

    let inner = controller.clone();
    let kaboom = View::component("kaboom", || panic!("kaboom payload"));
    runtime.mount(move || {
        inner
            .wrapper()
            .wrap(View::text("fallback"), vec![kaboom.clone()])
    });

    assert!(runtime.config().catch_panics);
    runtime.render().expect("captured while enabled");
    assert!(controller.has_error());

    // Config changes take effect on the following pass.
    let capture = runtime.config().catch_panics;
    runtime.config_mut().catch_panics = !capture;
    controller.reset();
    let unwound =
        std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| runtime.render().map(|_| ())))
            .is_err();
    assert!(unwound);
}
