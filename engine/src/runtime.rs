//! Reference host runtime: deterministic render passes over a retained tree.
//!
//! The runtime owns an instance tree that persists between passes. Each pass
//! rebuilds the view from the root closure, reconciles it against the
//! retained instances by position and identity, and commits a [`Rendered`]
//! tree. Faults raised by components propagate toward the nearest enclosing
//! boundary, which detaches its children and commits its fallback in the
//! same pass. Observer notifications are queued during the pass and
//! delivered after the commit; a pass that fails outright drops its queue.

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, trace, warn};

use cordon_types::{
    BoundaryProps, CaughtError, Component, IdentityToken, NotifyFn, RenderTrace, Rendered, View,
};

use crate::boundary::{BoundaryState, RenderDecision};
use crate::controller::BoundaryController;

/// Shared dirty flag linking state mutations to the next render pass.
///
/// Clones share the flag. Anything holding one may request a pass; the
/// runtime clears it at the start of each pass, so mutations made while a
/// pass is running schedule the next one.
#[derive(Clone, Debug, Default)]
pub struct Schedule(Rc<Cell<bool>>);

impl Schedule {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a render pass.
    pub fn mark(&self) {
        self.0.set(true);
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.0.get()
    }

    /// Consume the request at the start of a pass.
    pub(crate) fn clear(&self) {
        self.0.set(false);
    }
}

/// Tuning for the reference runtime.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeConfig {
    /// Upper bound on passes per [`Runtime::render`] call before declaring
    /// a loop.
    pub max_cascade_passes: u32,
    /// Convert panics in component render closures into caught errors.
    pub catch_panics: bool,
    /// Build structural traces while faults propagate.
    pub capture_traces: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_cascade_passes: 8,
            catch_panics: true,
            capture_traces: true,
        }
    }
}

/// Counters accumulated across passes.
///
/// Mounts count component instantiations during a pass; unmounts count
/// components leaving the retained tree. Bulk discards are counted at the
/// subtree level, so mixed replace-and-fault passes may count a component
/// on both sides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    pub passes: u64,
    pub mounts: u64,
    pub unmounts: u64,
    pub faults_intercepted: u64,
    pub notifications_delivered: u64,
}

/// A pass that could not complete.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A fault reached the root with no enclosing boundary. The previously
    /// committed tree is left in place; the retained tree is torn down.
    #[error("uncaught render fault: {error}")]
    Uncaught {
        error: CaughtError,
        trace: Option<RenderTrace>,
    },
    /// The tree kept scheduling passes without settling.
    #[error("render did not settle within {passes} passes")]
    RenderLoop { passes: u32 },
}

/// A fault in flight toward the nearest enclosing boundary.
struct Fault {
    error: CaughtError,
    trace: Option<RenderTrace>,
}

impl Fault {
    fn pushed(mut self, frame: impl Into<String>) -> Self {
        if let Some(trace) = &mut self.trace {
            trace.push(frame);
        }
        self
    }
}

struct Notification {
    notify: NotifyFn,
    error: CaughtError,
    trace: Option<RenderTrace>,
}

struct Instance {
    id: u64,
    kind: Kind,
}

enum Kind {
    Empty,
    Text,
    Group {
        label: Rc<str>,
        children: Vec<Instance>,
    },
    Component {
        component: Component,
        output: Box<Instance>,
    },
    Boundary(Box<BoundaryInstance>),
}

struct BoundaryInstance {
    identity: IdentityToken,
    state: BoundaryState,
    body: BoundaryBody,
}

enum BoundaryBody {
    Children(Vec<Instance>),
    Fallback(Box<Instance>),
}

impl Instance {
    fn component_count(&self) -> u64 {
        match &self.kind {
            Kind::Empty | Kind::Text => 0,
            Kind::Group { children, .. } => count_components(children),
            Kind::Component { output, .. } => 1 + output.component_count(),
            Kind::Boundary(boundary) => match &boundary.body {
                BoundaryBody::Children(children) => count_components(children),
                BoundaryBody::Fallback(instance) => instance.component_count(),
            },
        }
    }
}

fn count_components(instances: &[Instance]) -> u64 {
    instances.iter().map(Instance::component_count).sum()
}

/// Deterministic single-threaded host for boundary trees.
pub struct Runtime {
    config: RuntimeConfig,
    schedule: Schedule,
    root: Option<Rc<dyn Fn() -> View>>,
    tree: Option<Instance>,
    committed: Rendered,
    pending: Vec<Notification>,
    stats: RuntimeStats,
    next_instance_id: u64,
}

impl Runtime {
    #[must_use]
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            config,
            schedule: Schedule::new(),
            root: None,
            tree: None,
            committed: Rendered::Nothing,
            pending: Vec::new(),
            stats: RuntimeStats::default(),
            next_instance_id: 0,
        }
    }

    /// Install the root view builder, discarding any retained tree, and
    /// schedule a pass.
    pub fn mount(&mut self, root: impl Fn() -> View + 'static) {
        if let Some(tree) = self.tree.take() {
            self.discard(Some(tree));
        }
        self.root = Some(Rc::new(root));
        self.schedule.mark();
    }

    /// A controller whose state changes schedule passes on this runtime.
    #[must_use]
    pub fn controller(&self) -> BoundaryController {
        BoundaryController::new(self.schedule.clone())
    }

    /// The shared dirty flag, for hosts that re-render on external events.
    #[must_use]
    pub fn schedule(&self) -> Schedule {
        self.schedule.clone()
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.schedule.is_dirty()
    }

    /// Output of the last successful pass.
    #[must_use]
    pub fn committed(&self) -> &Rendered {
        &self.committed
    }

    #[must_use]
    pub fn stats(&self) -> RuntimeStats {
        self.stats
    }

    #[must_use]
    pub fn config(&self) -> RuntimeConfig {
        self.config
    }

    /// Mutable runtime settings. Changes apply from the next pass.
    pub fn config_mut(&mut self) -> &mut RuntimeConfig {
        &mut self.config
    }

    /// Run passes until the tree settles, bounded by
    /// [`RuntimeConfig::max_cascade_passes`]. Always runs at least one pass.
    pub fn render(&mut self) -> Result<&Rendered, RenderError> {
        let budget = self.config.max_cascade_passes.max(1);
        let mut passes = 0_u32;
        loop {
            self.pass()?;
            passes += 1;
            if !self.schedule.is_dirty() {
                break;
            }
            if passes >= budget {
                warn!(passes, "tree did not settle; giving up");
                return Err(RenderError::RenderLoop { passes });
            }
        }
        trace!(passes, "render settled");
        Ok(&self.committed)
    }

    /// Run exactly one pass: rebuild the view, reconcile, commit, deliver
    /// queued notifications.
    pub fn pass(&mut self) -> Result<(), RenderError> {
        let Some(root) = self.root.clone() else {
            self.schedule.clear();
            return Ok(());
        };
        self.schedule.clear();
        self.stats.passes += 1;
        trace!(pass = self.stats.passes, "render pass");

        let view = root();
        let prev = self.tree.take();
        match self.reconcile(view, prev) {
            Ok((instance, rendered)) => {
                self.tree = Some(instance);
                self.committed = rendered;
                self.deliver_notifications();
                Ok(())
            }
            Err(fault) => {
                // No enclosing boundary. The commit is abandoned: the last
                // committed output stays, the retained tree is gone, and
                // queued notifications never fire.
                self.pending.clear();
                warn!(error = %fault.error, "fault reached the root with no boundary");
                Err(RenderError::Uncaught {
                    error: fault.error,
                    trace: fault.trace,
                })
            }
        }
    }

    fn deliver_notifications(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.pending);
        trace!(count = pending.len(), "delivering fault notifications");
        for notification in pending {
            self.stats.notifications_delivered += 1;
            (notification.notify)(notification.error, notification.trace);
        }
    }

    fn reconcile(&mut self, view: View, prev: Option<Instance>) -> Result<(Instance, Rendered), Fault> {
        match view {
            View::Empty => {
                let id = match prev {
                    Some(Instance {
                        id,
                        kind: Kind::Empty,
                    }) => id,
                    other => {
                        self.discard(other);
                        self.next_id()
                    }
                };
                Ok((
                    Instance {
                        id,
                        kind: Kind::Empty,
                    },
                    Rendered::Nothing,
                ))
            }
            View::Text(text) => {
                let id = match prev {
                    Some(Instance {
                        id,
                        kind: Kind::Text,
                    }) => id,
                    other => {
                        self.discard(other);
                        self.next_id()
                    }
                };
                Ok((
                    Instance {
                        id,
                        kind: Kind::Text,
                    },
                    Rendered::Text(text),
                ))
            }
            View::Group { label, children } => self.reconcile_group(label, children, prev),
            View::Component(component) => self.reconcile_component(component, prev),
            View::Boundary(props) => self.reconcile_boundary(*props, prev),
        }
    }

    fn reconcile_group(
        &mut self,
        label: Rc<str>,
        children: Vec<View>,
        prev: Option<Instance>,
    ) -> Result<(Instance, Rendered), Fault> {
        let (id, prev_children) = match prev {
            Some(Instance {
                id,
                kind:
                    Kind::Group {
                        label: prev_label,
                        children,
                    },
            }) if prev_label == label => (id, children),
            other => {
                self.discard(other);
                (self.next_id(), Vec::new())
            }
        };
        let (instances, rendered) = self
            .reconcile_children(children, prev_children)
            .map_err(|fault| fault.pushed(label.as_ref()))?;
        Ok((
            Instance {
                id,
                kind: Kind::Group {
                    label: Rc::clone(&label),
                    children: instances,
                },
            },
            Rendered::Group {
                label: label.to_string(),
                children: rendered,
            },
        ))
    }

    fn reconcile_component(
        &mut self,
        component: Component,
        prev: Option<Instance>,
    ) -> Result<(Instance, Rendered), Fault> {
        let (id, prev_output) = match prev {
            Some(Instance {
                id,
                kind:
                    Kind::Component {
                        component: prev_component,
                        output,
                    },
            }) if component.same_identity(&prev_component) => (id, Some(*output)),
            other => {
                self.discard(other);
                self.stats.mounts += 1;
                trace!(name = component.name(), "component mounted");
                (self.next_id(), None)
            }
        };
        let produced = self.run_component(&component)?;
        let (output, rendered) = self
            .reconcile(produced, prev_output)
            .map_err(|fault| fault.pushed(component.name()))?;
        Ok((
            Instance {
                id,
                kind: Kind::Component {
                    component,
                    output: Box::new(output),
                },
            },
            rendered,
        ))
    }

    fn reconcile_boundary(
        &mut self,
        props: BoundaryProps,
        prev: Option<Instance>,
    ) -> Result<(Instance, Rendered), Fault> {
        let BoundaryProps {
            children,
            fallback,
            external_error,
            on_caught,
            identity,
        } = props;

        let (id, mut state, body) = match prev {
            Some(Instance {
                id,
                kind: Kind::Boundary(boundary),
            }) if boundary.identity.same(&identity) => {
                let BoundaryInstance { state, body, .. } = *boundary;
                (id, state, body)
            }
            other => {
                self.discard(other);
                (
                    self.next_id(),
                    BoundaryState::new(),
                    BoundaryBody::Children(Vec::new()),
                )
            }
        };

        state.sync_external(external_error.as_ref());

        let (body, inner) = match state.decision() {
            RenderDecision::Children => {
                let prev_children = match body {
                    BoundaryBody::Children(list) => list,
                    BoundaryBody::Fallback(instance) => {
                        self.discard(Some(*instance));
                        Vec::new()
                    }
                };
                let detached = count_components(&prev_children);
                match self.reconcile_children(children, prev_children) {
                    Ok((instances, rendered)) => (BoundaryBody::Children(instances), rendered),
                    Err(fault) => {
                        // Interception: the protected subtree detaches
                        // wholesale and the fallback commits this same pass.
                        self.stats.unmounts += detached;
                        self.intercept(&mut state, &fault, on_caught.as_ref());
                        let (instance, rendered) = self
                            .reconcile(fallback, None)
                            .map_err(|escalated| escalated.pushed("fallback"))?;
                        (BoundaryBody::Fallback(Box::new(instance)), vec![rendered])
                    }
                }
            }
            RenderDecision::Fallback => {
                let prev_fallback = match body {
                    BoundaryBody::Fallback(instance) => Some(*instance),
                    BoundaryBody::Children(list) => {
                        self.stats.unmounts += count_components(&list);
                        None
                    }
                };
                // A fault here escalates to the next enclosing boundary:
                // a node never catches its own fallback.
                let (instance, rendered) = self
                    .reconcile(fallback, prev_fallback)
                    .map_err(|escalated| escalated.pushed("fallback"))?;
                (BoundaryBody::Fallback(Box::new(instance)), vec![rendered])
            }
        };

        Ok((
            Instance {
                id,
                kind: Kind::Boundary(Box::new(BoundaryInstance {
                    identity,
                    state,
                    body,
                })),
            },
            Rendered::Group {
                label: String::new(),
                children: inner,
            },
        ))
    }

    fn intercept(&mut self, state: &mut BoundaryState, fault: &Fault, on_caught: Option<&NotifyFn>) {
        let new_occurrence = state.record_caught(&fault.error);
        debug!(error = %fault.error, new_occurrence, "boundary intercepted fault");
        if !new_occurrence {
            return;
        }
        self.stats.faults_intercepted += 1;
        if let Some(notify) = on_caught {
            self.pending.push(Notification {
                notify: Rc::clone(notify),
                error: fault.error.clone(),
                trace: fault.trace.clone(),
            });
        }
    }

    fn reconcile_children(
        &mut self,
        views: Vec<View>,
        prev: Vec<Instance>,
    ) -> Result<(Vec<Instance>, Vec<Rendered>), Fault> {
        let mut prev_iter = prev.into_iter();
        let mut instances = Vec::with_capacity(views.len());
        let mut rendered = Vec::with_capacity(views.len());
        for view in views {
            let (instance, output) = self.reconcile(view, prev_iter.next())?;
            instances.push(instance);
            rendered.push(output);
        }
        for leftover in prev_iter {
            self.discard(Some(leftover));
        }
        Ok((instances, rendered))
    }

    fn run_component(&mut self, component: &Component) -> Result<View, Fault> {
        let outcome = if self.config.catch_panics {
            match panic::catch_unwind(AssertUnwindSafe(|| component.render())) {
                Ok(outcome) => outcome,
                Err(payload) => Err(CaughtError::from_panic(payload)),
            }
        } else {
            component.render()
        };
        outcome.map_err(|error| {
            debug!(component = component.name(), %error, "component fault");
            self.fault_at(error, component.name())
        })
    }

    fn fault_at(&self, error: CaughtError, frame: &str) -> Fault {
        let trace = self.config.capture_traces.then(|| {
            let mut trace = RenderTrace::new();
            trace.push(frame);
            trace
        });
        Fault { error, trace }
    }

    fn discard(&mut self, prev: Option<Instance>) {
        if let Some(instance) = prev {
            let removed = instance.component_count();
            if removed > 0 {
                trace!(removed, "unmounted component instances");
                self.stats.unmounts += removed;
            }
        }
    }

    fn next_id(&mut self) -> u64 {
        self.next_instance_id += 1;
        self.next_instance_id
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}
