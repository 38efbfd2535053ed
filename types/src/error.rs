//! Error values caught and carried by fault boundaries.
//!
//! A [`CaughtError`] is a shared handle to the error a protected subtree
//! produced. Handles compare by identity, never by content: two errors with
//! identical messages are distinct occurrences, while clones of one handle
//! all refer to the same occurrence.

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Object-safe error form shared across the crate.
pub type DynError = dyn StdError + Send + Sync + 'static;

/// A shared, identity-compared handle to an error caught during rendering.
///
/// # Invariants
///
/// - Equality is reference equality on the underlying allocation
///   ([`Arc::ptr_eq`]); message content is never consulted.
/// - Cloning a handle preserves identity; constructing a new handle from
///   equal content does not.
#[derive(Clone)]
pub struct CaughtError(Arc<DynError>);

impl CaughtError {
    /// Wrap a concrete error value.
    pub fn new(error: impl StdError + Send + Sync + 'static) -> Self {
        Self(Arc::new(error))
    }

    /// Build an error that carries only a message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(MessageError(message.into()))
    }

    /// Adopt an already-shared error without re-wrapping it.
    #[must_use]
    pub fn from_arc(error: Arc<DynError>) -> Self {
        Self(error)
    }

    /// Convert a panic payload into an error, preserving string payloads.
    #[must_use]
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = match payload.downcast::<String>() {
            Ok(text) => *text,
            Err(payload) => match payload.downcast::<&'static str>() {
                Ok(text) => (*text).to_string(),
                Err(_) => "non-string panic payload".to_string(),
            },
        };
        Self::new(PanicError { payload: message })
    }

    /// Address-derived key naming this occurrence, usable in memo caches.
    ///
    /// Valid only while some handle to the occurrence is alive; the
    /// allocator may reuse the address afterwards.
    #[must_use]
    pub fn id(&self) -> ErrorId {
        ErrorId(Arc::as_ptr(&self.0).cast::<()>() as usize)
    }

    /// Whether two handles refer to the same occurrence.
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Whether this error was converted from a panic payload.
    #[must_use]
    pub fn is_panic(&self) -> bool {
        self.0.downcast_ref::<PanicError>().is_some()
    }

    #[must_use]
    pub fn as_dyn(&self) -> &DynError {
        &*self.0
    }
}

impl PartialEq for CaughtError {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl Eq for CaughtError {}

impl fmt::Display for CaughtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for CaughtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CaughtError").field(&self.0).finish()
    }
}

/// Plain-text error for faults that carry only a message.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct MessageError(String);

impl MessageError {
    #[must_use]
    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Error converted from a panic payload. Displays as the payload text so the
/// message survives the conversion unchanged.
#[derive(Debug, Error)]
#[error("{payload}")]
pub struct PanicError {
    payload: String,
}

impl PanicError {
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }
}

/// Copyable identity key for an error occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorId(usize);
