//! The declarative view tree and its committed form.
//!
//! [`View`] is what applications build each pass: a cheap-to-clone tree of
//! text, groups, fallible components, and boundary nodes. [`Rendered`] is
//! the committed output of a pass: plain data with every closure already
//! evaluated, suitable for display.

use std::fmt;
use std::rc::Rc;

use crate::error::CaughtError;
use crate::trace::RenderTrace;

/// Render closure of a [`Component`]. A component that cannot produce a view
/// returns the error for the nearest enclosing boundary to intercept.
pub type RenderFn = Rc<dyn Fn() -> Result<View, CaughtError>>;

/// Observer invoked after a boundary intercepts a descendant fault.
pub type NotifyFn = Rc<dyn Fn(CaughtError, Option<RenderTrace>)>;

/// Reference-identity marker for values whose equality means "same
/// allocation". Used to key wrapper factories and retained node instances.
#[derive(Clone, Debug)]
pub struct IdentityToken(Rc<()>);

impl IdentityToken {
    #[must_use]
    pub fn new() -> Self {
        Self(Rc::new(()))
    }

    /// Address-derived key, stable while any clone of the token is alive.
    #[must_use]
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for IdentityToken {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for IdentityToken {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl Eq for IdentityToken {}

/// A named, fallible leaf producer in the view tree.
///
/// Identity is the closure allocation: clones share identity, separately
/// constructed components never do, even with equal names.
#[derive(Clone)]
pub struct Component {
    name: Rc<str>,
    render: RenderFn,
}

impl Component {
    pub fn new(
        name: impl AsRef<str>,
        render: impl Fn() -> Result<View, CaughtError> + 'static,
    ) -> Self {
        Self {
            name: Rc::from(name.as_ref()),
            render: Rc::new(render),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the render closure.
    pub fn render(&self) -> Result<View, CaughtError> {
        (self.render)()
    }

    #[must_use]
    pub fn same_identity(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.render, &other.render)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Inputs to a boundary node for one pass.
///
/// Rebuilt every pass by the owning wrapper; `identity` ties successive
/// props to one retained node instance, so a changed token replaces the
/// node (and discards its captured error) instead of updating it.
#[derive(Clone)]
pub struct BoundaryProps {
    /// The protected subtree. Not reconciled at all while the node is faulted.
    pub children: Vec<View>,
    /// Rendered in place of `children` while faulted. `View::Empty` renders nothing.
    pub fallback: View,
    /// Externally owned error, adopted by reference identity each pass.
    pub external_error: Option<CaughtError>,
    /// Invoked once per newly intercepted fault, after the pass commits.
    pub on_caught: Option<NotifyFn>,
    pub identity: IdentityToken,
}

impl BoundaryProps {
    /// Props for a standalone boundary with no controller attached.
    #[must_use]
    pub fn new(children: Vec<View>, fallback: View) -> Self {
        Self {
            children,
            fallback,
            external_error: None,
            on_caught: None,
            identity: IdentityToken::new(),
        }
    }
}

impl fmt::Debug for BoundaryProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundaryProps")
            .field("children", &self.children.len())
            .field("external_error", &self.external_error)
            .field("identity", &self.identity.id())
            .finish_non_exhaustive()
    }
}

/// A declarative view tree. Cheap to clone; closures are shared via `Rc`.
#[derive(Clone, Debug)]
pub enum View {
    /// Renders nothing. Also the conventional "no fallback" value.
    Empty,
    Text(String),
    Group { label: Rc<str>, children: Vec<View> },
    Component(Component),
    Boundary(Box<BoundaryProps>),
}

impl View {
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    #[must_use]
    pub fn group(label: impl AsRef<str>, children: Vec<View>) -> Self {
        Self::Group {
            label: Rc::from(label.as_ref()),
            children,
        }
    }

    #[must_use]
    pub fn component(
        name: impl AsRef<str>,
        render: impl Fn() -> Result<View, CaughtError> + 'static,
    ) -> Self {
        Self::Component(Component::new(name, render))
    }

    #[must_use]
    pub fn boundary(props: BoundaryProps) -> Self {
        Self::Boundary(Box::new(props))
    }
}

/// Committed output of a render pass: plain data, no closures.
///
/// A boundary showing its fallback contributes the fallback's rendering
/// here; its detached children contribute nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Rendered {
    #[default]
    Nothing,
    Text(String),
    Group {
        label: String,
        children: Vec<Rendered>,
    },
}

impl Rendered {
    #[must_use]
    pub fn is_nothing(&self) -> bool {
        matches!(self, Self::Nothing)
    }

    /// All text leaves in document order, for assertions and plain dumps.
    #[must_use]
    pub fn text_lines(&self) -> Vec<&str> {
        let mut lines = Vec::new();
        self.collect_text(&mut lines);
        lines
    }

    fn collect_text<'a>(&'a self, into: &mut Vec<&'a str>) {
        match self {
            Self::Nothing => {}
            Self::Text(text) => into.push(text),
            Self::Group { children, .. } => {
                for child in children {
                    child.collect_text(into);
                }
            }
        }
    }
}
