//! Per-node boundary state and the render decision rule.

use tracing::debug;

use cordon_types::CaughtError;

/// What a boundary node renders this pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderDecision {
    /// Reconcile and render the protected children normally.
    Children,
    /// Render the fallback; children stay fully detached.
    Fallback,
}

/// The retained state of one boundary node: exactly the last caught error.
///
/// The decision rule runs once per pass, before the node's children are
/// considered:
///
/// 1. An external error that differs by identity from the captured one is
///    adopted. External reset and externally forced errors take precedence
///    over the node's own memory.
/// 2. A captured error selects the fallback; children are not reconciled.
/// 3. Otherwise children render normally.
///
/// A fresh interception in the same pass runs after step 1, so the freshly
/// caught error wins that pass and converges with the external value once
/// the observer has stored it.
#[derive(Debug, Default)]
pub struct BoundaryState {
    captured: Option<CaughtError>,
}

impl BoundaryState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn captured(&self) -> Option<&CaughtError> {
        self.captured.as_ref()
    }

    /// Step 1: adopt `external` when it differs by identity from the
    /// captured error. Returns true when state changed.
    pub fn sync_external(&mut self, external: Option<&CaughtError>) -> bool {
        let differs = match (external, self.captured.as_ref()) {
            (None, None) => false,
            (Some(ext), Some(cur)) => !ext.same(cur),
            _ => true,
        };
        if differs {
            debug!(
                adopted = external.is_some(),
                "boundary adopted external error state"
            );
            self.captured = external.cloned();
        }
        differs
    }

    /// Record a freshly intercepted fault. Returns false when this exact
    /// occurrence is already captured; interception is per occurrence, not
    /// per pass.
    pub fn record_caught(&mut self, error: &CaughtError) -> bool {
        if self.captured.as_ref().is_some_and(|cur| cur.same(error)) {
            return false;
        }
        self.captured = Some(error.clone());
        true
    }

    /// Steps 2 and 3: fallback while an error is captured, children otherwise.
    #[must_use]
    pub fn decision(&self) -> RenderDecision {
        if self.captured.is_some() {
            RenderDecision::Fallback
        } else {
            RenderDecision::Children
        }
    }
}
