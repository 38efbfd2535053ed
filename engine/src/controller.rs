//! Controller facade: owns the externally visible error and hands out
//! identity-stable wrapper factories.
//!
//! A controller and the boundary nodes built through its wrappers form one
//! isolation scope. The controller holds the current error; the wrapper
//! binds that error plus a notify callback into boundary props each pass.
//! The wrapper is memoized on the pair (error identity, callback identity),
//! so composition does not churn node identity and state survives unrelated
//! re-renders.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use cordon_types::{
    BoundaryProps, CaughtError, ErrorId, IdentityToken, NotifyFn, RenderTrace, View,
};

use crate::runtime::Schedule;

/// Memo key for the wrapper factory: rebuild only when one of these
/// identities changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FactoryKey {
    error: Option<ErrorId>,
    notify: usize,
}

struct Slot {
    current: Option<CaughtError>,
    schedule: Schedule,
}

struct Memo {
    key: FactoryKey,
    wrapper: BoundaryWrapper,
}

/// Identity-stable factory producing boundary views bound to one controller.
///
/// Clones share the identity token: every wrapper handed out for one memo
/// key is the same factory as far as reconciliation is concerned.
#[derive(Clone)]
pub struct BoundaryWrapper {
    external_error: Option<CaughtError>,
    on_caught: NotifyFn,
    identity: IdentityToken,
}

impl BoundaryWrapper {
    /// Build the boundary view for this pass.
    #[must_use]
    pub fn wrap(&self, fallback: View, children: Vec<View>) -> View {
        View::boundary(BoundaryProps {
            children,
            fallback,
            external_error: self.external_error.clone(),
            on_caught: Some(Rc::clone(&self.on_caught)),
            identity: self.identity.clone(),
        })
    }

    /// Token distinguishing one memoized factory from the next.
    #[must_use]
    pub fn identity(&self) -> &IdentityToken {
        &self.identity
    }
}

/// Owner of one boundary's externally visible error.
///
/// Cloning yields another handle to the same controller; all clones see the
/// same error slot and the same memoized wrapper.
#[derive(Clone)]
pub struct BoundaryController {
    slot: Rc<RefCell<Slot>>,
    notify: Rc<RefCell<NotifyFn>>,
    memo: Rc<RefCell<Option<Memo>>>,
}

impl BoundaryController {
    /// A controller whose state changes mark `schedule` dirty.
    #[must_use]
    pub fn new(schedule: Schedule) -> Self {
        let slot = Rc::new(RefCell::new(Slot {
            current: None,
            schedule,
        }));
        let notify = build_notify(&slot, None);
        Self {
            slot,
            notify: Rc::new(RefCell::new(notify)),
            memo: Rc::new(RefCell::new(None)),
        }
    }

    /// Install an observer forwarded every newly intercepted fault.
    ///
    /// Replacing the observer gives the notify callback a new identity, so
    /// the next [`wrapper`](Self::wrapper) call rebuilds the factory.
    pub fn set_observer(&self, observer: impl Fn(CaughtError, Option<RenderTrace>) + 'static) {
        let observer: NotifyFn = Rc::new(observer);
        *self.notify.borrow_mut() = build_notify(&self.slot, Some(observer));
    }

    /// The error currently shown by boundaries under this controller.
    #[must_use]
    pub fn current_error(&self) -> Option<CaughtError> {
        self.slot.borrow().current.clone()
    }

    #[must_use]
    pub fn has_error(&self) -> bool {
        self.slot.borrow().current.is_some()
    }

    /// Clear the current error so normal rendering resumes next pass.
    ///
    /// Idempotent: resetting an already-clear controller has no observable
    /// effect; it does not schedule a pass and the factory keeps its
    /// identity.
    pub fn reset(&self) {
        let mut slot = self.slot.borrow_mut();
        if slot.current.is_none() {
            trace!("reset ignored; no current error");
            return;
        }
        debug!("boundary reset");
        slot.current = None;
        slot.schedule.mark();
    }

    /// Adopt an error produced outside the render tree.
    ///
    /// The next pass renders the fallback exactly as if a descendant had
    /// thrown this occurrence. Forcing the occurrence that is already
    /// current is a no-op.
    pub fn force_error(&self, error: CaughtError) {
        let mut slot = self.slot.borrow_mut();
        if slot.current.as_ref().is_some_and(|cur| cur.same(&error)) {
            return;
        }
        debug!(%error, "external error forced");
        slot.current = Some(error);
        slot.schedule.mark();
    }

    /// The memoized wrapper factory for the current (error, callback) pair.
    ///
    /// Successive calls return factories sharing one identity token until
    /// the current error or the notify callback changes; then exactly one
    /// rebuild happens and retained boundary nodes are replaced.
    #[must_use]
    pub fn wrapper(&self) -> BoundaryWrapper {
        let notify = Rc::clone(&self.notify.borrow());
        let current = self.slot.borrow().current.clone();
        let key = FactoryKey {
            error: current.as_ref().map(CaughtError::id),
            notify: notify_identity(&notify),
        };

        let mut memo = self.memo.borrow_mut();
        if let Some(cached) = memo.as_ref() {
            if cached.key == key {
                return cached.wrapper.clone();
            }
        }

        trace!(faulted = current.is_some(), "rebuilding boundary wrapper");
        let wrapper = BoundaryWrapper {
            external_error: current,
            on_caught: notify,
            identity: IdentityToken::new(),
        };
        *memo = Some(Memo {
            key,
            wrapper: wrapper.clone(),
        });
        wrapper
    }
}

impl std::fmt::Debug for BoundaryController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundaryController")
            .field("current", &self.slot.borrow().current)
            .finish_non_exhaustive()
    }
}

/// The notify callback stores the intercepted error, schedules a pass, and
/// forwards to the observer. It holds the slot weakly: a callback that
/// outlives its controller does nothing.
fn build_notify(slot: &Rc<RefCell<Slot>>, observer: Option<NotifyFn>) -> NotifyFn {
    let weak: Weak<RefCell<Slot>> = Rc::downgrade(slot);
    Rc::new(move |error: CaughtError, trace: Option<RenderTrace>| {
        if let Some(slot) = weak.upgrade() {
            let mut slot = slot.borrow_mut();
            if slot.current.as_ref().is_none_or(|cur| !cur.same(&error)) {
                slot.current = Some(error.clone());
                slot.schedule.mark();
            }
        }
        // Slot borrow is released before user code runs; the observer may
        // call straight back into the controller.
        if let Some(observer) = &observer {
            observer(error, trace);
        }
    })
}

fn notify_identity(notify: &NotifyFn) -> usize {
    Rc::as_ptr(notify).cast::<()>() as usize
}
