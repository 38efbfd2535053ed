//! Core engine for cordon - boundary state machine and reference runtime.
//!
//! This crate hosts fault boundaries without terminal dependencies. The
//! split mirrors the two halves of the abstraction: [`BoundaryState`] is
//! the pure per-pass decision rule retained inside each node, and
//! [`BoundaryController`] is the stateful facade applications hold. The
//! [`Runtime`] is a deterministic single-threaded host that wires the two
//! together; real hosts can replace it as long as they honor the same
//! interception and precedence contract.

mod boundary;
mod controller;
mod runtime;

pub use boundary::{BoundaryState, RenderDecision};
pub use controller::{BoundaryController, BoundaryWrapper};
pub use runtime::{RenderError, Runtime, RuntimeConfig, RuntimeStats, Schedule};

// Re-export the domain types callers compose with.
pub use cordon_types::{
    BoundaryProps, CaughtError, Component, IdentityToken, NotifyFn, RenderTrace, Rendered, View,
};
