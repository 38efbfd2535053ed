//! Core domain types for cordon.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod error;
mod text;
mod trace;
mod view;

pub use error::{CaughtError, DynError, ErrorId, MessageError, PanicError};
pub use text::{single_line, truncate_with_ellipsis};
pub use trace::RenderTrace;
pub use view::{BoundaryProps, Component, IdentityToken, NotifyFn, RenderFn, Rendered, View};
