//! Host tree abstraction.
//!
//! The engine writes to an externally owned presentation tree (a live DOM, a
//! native widget tree, or the in-memory `MemoryTree`) through this trait.
//! Nodes are addressed by opaque `HostNodeId` handles issued by the host.

use std::ops::Range;

use miette::Diagnostic;

use crate::types::HostNodeId;

/// Error type for host tree operations.
#[derive(thiserror::Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("unknown host node {0}")]
    #[diagnostic(code(weft::host::unknown_node))]
    UnknownNode(HostNodeId),

    #[error("host node {0} is not a text node")]
    #[diagnostic(code(weft::host::not_text))]
    NotText(HostNodeId),

    #[error("host node {0} cannot hold children")]
    #[diagnostic(code(weft::host::not_container))]
    NotContainer(HostNodeId),

    #[error("char range {start}..{end} out of bounds for {node} (length {len})")]
    #[diagnostic(code(weft::host::out_of_bounds))]
    OutOfBounds {
        node: HostNodeId,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("inserting {child} under {parent} would create a cycle")]
    #[diagnostic(code(weft::host::cycle))]
    Cycle { parent: HostNodeId, child: HostNodeId },

    #[error("host rejected operation: {0}")]
    #[diagnostic(code(weft::host::rejected))]
    Rejected(String),
}

impl From<&str> for HostError {
    fn from(s: &str) -> Self {
        HostError::Rejected(s.to_string())
    }
}

impl From<String> for HostError {
    fn from(s: String) -> Self {
        HostError::Rejected(s)
    }
}

/// Mutable presentation tree the engine reconciles into.
///
/// Text offsets are in chars (Unicode scalar values). Implementations for
/// hosts that count UTF-16 code units convert at this boundary.
pub trait HostTree {
    // === Required: node creation ===

    fn create_element(&mut self, tag: &str) -> Result<HostNodeId, HostError>;

    fn create_text(&mut self, text: &str) -> Result<HostNodeId, HostError>;

    // === Required: inspection ===

    /// Tag name for elements, `None` for text nodes and unknown handles.
    fn tag_name(&self, node: HostNodeId) -> Option<&str>;

    /// Content for text nodes, `None` for elements and unknown handles.
    fn text(&self, node: HostNodeId) -> Option<&str>;

    fn parent(&self, node: HostNodeId) -> Option<HostNodeId>;

    fn first_child(&self, node: HostNodeId) -> Option<HostNodeId>;

    fn next_sibling(&self, node: HostNodeId) -> Option<HostNodeId>;

    fn previous_sibling(&self, node: HostNodeId) -> Option<HostNodeId>;

    // === Required: mutation ===

    /// Replace a char range of a text node in place (the node keeps its identity).
    fn replace_text(
        &mut self,
        node: HostNodeId,
        char_range: Range<usize>,
        text: &str,
    ) -> Result<(), HostError>;

    fn set_attribute(&mut self, node: HostNodeId, name: &str, value: &str)
    -> Result<(), HostError>;

    fn remove_attribute(&mut self, node: HostNodeId, name: &str) -> Result<(), HostError>;

    fn set_style(&mut self, node: HostNodeId, name: &str, value: &str) -> Result<(), HostError>;

    fn remove_style(&mut self, node: HostNodeId, name: &str) -> Result<(), HostError>;

    fn add_class(&mut self, node: HostNodeId, class: &str) -> Result<(), HostError>;

    fn remove_class(&mut self, node: HostNodeId, class: &str) -> Result<(), HostError>;

    /// Insert `child` under `parent` before `reference` (append when `None`).
    ///
    /// A child that is already attached elsewhere is moved.
    fn insert_before(
        &mut self,
        parent: HostNodeId,
        child: HostNodeId,
        reference: Option<HostNodeId>,
    ) -> Result<(), HostError>;

    /// Detach a node (and its subtree) from its parent.
    fn remove(&mut self, node: HostNodeId) -> Result<(), HostError>;

    // === Provided ===

    fn is_text(&self, node: HostNodeId) -> bool {
        self.text(node).is_some()
    }

    /// Length in chars of a text node, 0 for anything else.
    fn text_len(&self, node: HostNodeId) -> usize {
        self.text(node).map(|t| t.chars().count()).unwrap_or(0)
    }

    fn children(&self, node: HostNodeId) -> Vec<HostNodeId> {
        let mut out = Vec::new();
        let mut next = self.first_child(node);
        while let Some(child) = next {
            out.push(child);
            next = self.next_sibling(child);
        }
        out
    }

    fn child_count(&self, node: HostNodeId) -> usize {
        self.children(node).len()
    }

    fn index_in_parent(&self, node: HostNodeId) -> Option<usize> {
        let parent = self.parent(node)?;
        self.children(parent).iter().position(|c| *c == node)
    }

    /// Check whether `ancestor` contains `node` (inclusive).
    fn contains(&self, ancestor: HostNodeId, node: HostNodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }
}
