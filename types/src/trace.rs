//! Structural traces locating a fault inside the view tree.

use std::fmt;

/// Path from the faulting node up through its enclosing nodes, innermost
/// frame first.
///
/// Built by the host while an error propagates toward the nearest boundary.
/// Boundaries and observers treat it as opaque diagnostic text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderTrace {
    frames: Vec<String>,
}

impl RenderTrace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an enclosing frame. Callers push while unwinding, so frames
    /// stay ordered innermost first.
    pub fn push(&mut self, frame: impl Into<String>) {
        self.frames.push(frame.into());
    }

    #[must_use]
    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The frame closest to the fault, if any.
    #[must_use]
    pub fn innermost(&self) -> Option<&str> {
        self.frames.first().map(String::as_str)
    }
}

impl fmt::Display for RenderTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, frame) in self.frames.iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            write!(f, "    in {frame}")?;
        }
        Ok(())
    }
}
