//! Interfaces to the logical document and its renderers.
//!
//! The document model, its change tracking and the per-node renderers live
//! outside this crate. These traits are the narrow views the engine needs.

use indexmap::IndexSet;

use crate::render::RenderObject;
use crate::types::LogicalId;

/// Read-only navigation over the logical document tree.
///
/// Used by the position locator to fall back to neighbouring nodes when a
/// node has no rendering of its own.
pub trait DocumentTree {
    fn parent(&self, node: LogicalId) -> Option<LogicalId>;

    fn children(&self, node: LogicalId) -> Vec<LogicalId>;

    fn index_in_parent(&self, node: LogicalId) -> Option<usize> {
        let parent = self.parent(node)?;
        self.children(parent).iter().position(|c| *c == node)
    }

    fn previous_sibling(&self, node: LogicalId) -> Option<LogicalId> {
        let parent = self.parent(node)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|c| *c == node)?;
        index.checked_sub(1).map(|i| siblings[i])
    }

    fn next_sibling(&self, node: LogicalId) -> Option<LogicalId> {
        let parent = self.parent(node)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|c| *c == node)?;
        siblings.get(index + 1).copied()
    }
}

/// Produces the declarative rendering of one logical node.
pub trait Renderer {
    /// `None` when the node cannot be rendered right now.
    fn render(&self, node: LogicalId) -> Option<RenderObject>;
}

impl<F> Renderer for F
where
    F: Fn(LogicalId) -> Option<RenderObject>,
{
    fn render(&self, node: LogicalId) -> Option<RenderObject> {
        self(node)
    }
}

/// Insertion-ordered set of logical nodes awaiting a pass.
///
/// Invalidating the same node twice between passes processes it once.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Invalidations {
    nodes: IndexSet<LogicalId>,
}

impl Invalidations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the node was already queued.
    pub fn insert(&mut self, node: LogicalId) -> bool {
        self.nodes.insert(node)
    }

    pub fn contains(&self, node: LogicalId) -> bool {
        self.nodes.contains(&node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = LogicalId> + '_ {
        self.nodes.iter().copied()
    }

    /// Move every queued node from `other` into `self`, keeping first-seen order.
    pub fn absorb(&mut self, other: &mut Invalidations) {
        self.nodes.extend(other.nodes.drain(..));
    }

    pub(crate) fn as_set(&self) -> &IndexSet<LogicalId> {
        &self.nodes
    }
}

impl Extend<LogicalId> for Invalidations {
    fn extend<T: IntoIterator<Item = LogicalId>>(&mut self, iter: T) {
        self.nodes.extend(iter);
    }
}

impl FromIterator<LogicalId> for Invalidations {
    fn from_iter<T: IntoIterator<Item = LogicalId>>(iter: T) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Invalidations {
    type Item = LogicalId;
    type IntoIter = indexmap::set::IntoIter<LogicalId>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}
