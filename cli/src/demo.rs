//! Interactive scenario: a small dashboard whose flaky flow sensor is
//! cordoned off behind a boundary.
//!
//! The clock and gauges keep updating every tick. Faulting the sensor
//! (by error, panic, or external injection) swaps in the fallback line
//! and detaches the sensor until the boundary is reset.

use crossterm::event::KeyCode;
use ratatui::Frame;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use cordon_engine::{
    BoundaryController, CaughtError, Component, RenderError, RenderTrace, Runtime, Schedule, View,
};
use cordon_tui::{FrameModel, UiOptions};

use crate::config::CordonConfig;

/// Status bar hints, as (key, action) pairs.
const KEY_HINTS: &[(&str, &str)] = &[
    ("f", "fail"),
    ("p", "panic"),
    ("x", "inject"),
    ("r", "reset"),
    ("c", "capture"),
    ("t", "traces"),
    ("q", "quit"),
];

/// What the flow sensor does on its next render. Consumed on read, so a
/// single key press produces a single fault.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum FaultPlan {
    #[default]
    Healthy,
    Fail,
    Panic,
}

pub struct DemoApp {
    runtime: Runtime,
    controller: BoundaryController,
    schedule: Schedule,
    options: UiOptions,
    ticks: Rc<Cell<u64>>,
    plan: Rc<Cell<FaultPlan>>,
    /// Trace of the most recent interception, kept for the fault panel.
    last_trace: Rc<RefCell<Option<RenderTrace>>>,
    injected: u32,
}

impl DemoApp {
    pub fn new(config: &CordonConfig) -> Self {
        let mut runtime = Runtime::new(config.runtime_config());
        let controller = runtime.controller();
        let schedule = runtime.schedule();

        let last_trace = Rc::new(RefCell::new(None));
        controller.set_observer({
            let last_trace = Rc::clone(&last_trace);
            move |error, trace| {
                tracing::warn!(%error, "boundary intercepted a fault");
                *last_trace.borrow_mut() = trace;
            }
        });

        let ticks = Rc::new(Cell::new(0_u64));
        let plan = Rc::new(Cell::new(FaultPlan::Healthy));
        runtime.mount(dashboard(&controller, &ticks, &plan));

        Self {
            runtime,
            controller,
            schedule,
            options: config.ui_options(),
            ticks,
            plan,
            last_trace,
            injected: 0,
        }
    }

    /// Advance the demo clock. Every tick re-renders the whole tree; a
    /// faulted boundary keeps its children detached through these passes.
    pub fn tick(&mut self) {
        self.ticks.set(self.ticks.get() + 1);
        self.schedule.mark();
    }

    /// Drive the runtime if anything marked it dirty.
    pub fn advance(&mut self) -> Result<(), RenderError> {
        if self.runtime.is_dirty() {
            self.runtime.render()?;
        }
        Ok(())
    }

    /// Returns true when the app should quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('f') => {
                self.plan.set(FaultPlan::Fail);
                self.schedule.mark();
            }
            KeyCode::Char('p') => {
                self.plan.set(FaultPlan::Panic);
                self.schedule.mark();
            }
            KeyCode::Char('x') => {
                self.injected += 1;
                // Injected from outside a render, so there is no trace.
                self.last_trace.borrow_mut().take();
                self.controller.force_error(CaughtError::msg(format!(
                    "operator-injected fault #{}",
                    self.injected
                )));
            }
            KeyCode::Char('r') => {
                self.last_trace.borrow_mut().take();
                self.controller.reset();
            }
            KeyCode::Char('c') => {
                let config = self.runtime.config_mut();
                config.catch_panics = !config.catch_panics;
                tracing::info!(catch_panics = config.catch_panics, "toggled panic capture");
            }
            KeyCode::Char('t') => {
                let config = self.runtime.config_mut();
                config.capture_traces = !config.capture_traces;
                tracing::info!(capture_traces = config.capture_traces, "toggled trace capture");
            }
            _ => {}
        }
        false
    }

    pub fn draw(&self, frame: &mut Frame<'_>) {
        let error = self.controller.current_error();
        let trace = self.last_trace.borrow();
        let model = FrameModel {
            tree: self.runtime.committed(),
            error: error.as_ref(),
            trace: trace.as_ref(),
            stats: self.runtime.stats(),
            hints: KEY_HINTS,
        };
        cordon_tui::draw(frame, &model, self.options);
    }
}

/// Root view builder.
///
/// Components are constructed once so their identity is stable across
/// passes; the closure clones them into a fresh tree each pass. The
/// boundary wrapper is fetched inside the closure so every pass binds the
/// controller's current error.
fn dashboard(
    controller: &BoundaryController,
    ticks: &Rc<Cell<u64>>,
    plan: &Rc<Cell<FaultPlan>>,
) -> impl Fn() -> View + 'static {
    let controller = controller.clone();
    let clock = clock_component(ticks);
    let gauges = gauges_component(ticks);
    let sensor = sensor_component(ticks, plan);

    move || {
        let cordoned = controller.wrapper().wrap(
            View::text("sensor offline - press r to reconnect"),
            vec![View::group(
                "sensors",
                vec![View::Component(sensor.clone())],
            )],
        );
        View::group(
            "dashboard",
            vec![
                View::Component(clock.clone()),
                View::Component(gauges.clone()),
                cordoned,
            ],
        )
    }
}

fn clock_component(ticks: &Rc<Cell<u64>>) -> Component {
    let ticks = Rc::clone(ticks);
    Component::new("clock", move || {
        Ok(View::text(format!("tick {}", ticks.get())))
    })
}

fn gauges_component(ticks: &Rc<Cell<u64>>) -> Component {
    let ticks = Rc::clone(ticks);
    Component::new("gauges", move || {
        let tick = ticks.get();
        Ok(View::group(
            "gauges",
            vec![
                View::text(format!("temp  {:5.1} C", 21.0 + wobble(tick, 3) * 2.0)),
                View::text(format!("load  {:5.2}", 0.42 + wobble(tick, 7) / 4.0)),
            ],
        ))
    })
}

fn sensor_component(ticks: &Rc<Cell<u64>>, plan: &Rc<Cell<FaultPlan>>) -> Component {
    let ticks = Rc::clone(ticks);
    let plan = Rc::clone(plan);
    Component::new("flow-sensor", move || {
        match plan.replace(FaultPlan::Healthy) {
            FaultPlan::Fail => return Err(CaughtError::msg("flow sensor read timed out")),
            FaultPlan::Panic => panic!("flow sensor wire unplugged"),
            FaultPlan::Healthy => {}
        }
        let tick = ticks.get();
        Ok(View::text(format!(
            "flow  {:5.1} L/min",
            12.0 + wobble(tick, 11) * 4.0
        )))
    })
}

/// Deterministic wobble in [-0.5, 0.5) so gauges visibly move between ticks.
fn wobble(tick: u64, seed: u64) -> f64 {
    let hashed = tick.wrapping_add(seed).wrapping_mul(2_654_435_761) % 1000;
    (hashed as f64) / 1000.0 - 0.5
}
