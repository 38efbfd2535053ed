//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use cordon_engine::{
    BoundaryController, CaughtError, Component, RenderTrace, Runtime, RuntimeConfig, View,
};

/// A component that counts its renders and can be scripted to fail once.
#[derive(Clone)]
pub struct Probe {
    runs: Rc<Cell<usize>>,
    fail_next: Rc<RefCell<Option<String>>>,
    component: Component,
}

impl Probe {
    pub fn new(name: &str, body: &str) -> Self {
        let runs = Rc::new(Cell::new(0));
        let fail_next = Rc::new(RefCell::new(None::<String>));
        let component = Component::new(name, {
            let runs = Rc::clone(&runs);
            let fail_next = Rc::clone(&fail_next);
            let body = body.to_string();
            move || {
                runs.set(runs.get() + 1);
                if let Some(message) = fail_next.borrow_mut().take() {
                    return Err(CaughtError::msg(message));
                }
                Ok(View::text(body.clone()))
            }
        });
        Self {
            runs,
            fail_next,
            component,
        }
    }

    /// A view node for this probe. Every call shares the same component
    /// identity, so the retained instance survives across passes.
    pub fn view(&self) -> View {
        View::Component(self.component.clone())
    }

    pub fn runs(&self) -> usize {
        self.runs.get()
    }

    /// Script the next render to fail with `message`.
    pub fn fail_next(&self, message: &str) {
        *self.fail_next.borrow_mut() = Some(message.to_string());
    }
}

/// Records every notification an observer receives.
#[derive(Clone, Default)]
pub struct ObserverLog {
    events: Rc<RefCell<Vec<(CaughtError, Option<RenderTrace>)>>>,
}

impl ObserverLog {
    pub fn attach(&self, controller: &BoundaryController) {
        let events = Rc::clone(&self.events);
        controller.set_observer(move |error, trace| {
            events.borrow_mut().push((error, trace));
        });
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn error_at(&self, index: usize) -> CaughtError {
        self.events.borrow()[index].0.clone()
    }

    pub fn trace_at(&self, index: usize) -> Option<RenderTrace> {
        self.events.borrow()[index].1.clone()
    }
}

/// Mount `probe` under a controller-managed boundary with a plain text
/// fallback. Returns the runtime and its controller.
pub fn mount_guarded(probe: &Probe, fallback: &str) -> (Runtime, BoundaryController) {
    mount_guarded_with(RuntimeConfig::default(), probe, fallback)
}

pub fn mount_guarded_with(
    config: RuntimeConfig,
    probe: &Probe,
    fallback: &str,
) -> (Runtime, BoundaryController) {
    let mut runtime = Runtime::new(config);
    let controller = runtime.controller();
    let inner = controller.clone();
    let child = probe.view();
    let fallback = fallback.to_string();
    runtime.mount(move || {
        inner
            .wrapper()
            .wrap(View::text(fallback.clone()), vec![child.clone()])
    });
    (runtime, controller)
}
