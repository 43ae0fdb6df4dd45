//! Core identity and position types shared by every part of the engine.
//!
//! Logical nodes and host nodes are both opaque handles: the engine only
//! compares them for identity and never dereferences them itself.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Handle to a node of the logical document tree.
///
/// The document model owns the node; the engine only relies on equality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LogicalId(pub u64);

/// Handle to a node of the host presentation tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HostNodeId(pub u64);

/// Small integer identity assigned to a reconciliation record.
///
/// Ids are never reused within one engine instance (until `clear`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub u32);

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "l{}", self.0)
    }
}

impl fmt::Display for HostNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "h{}", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Where a position sits relative to a logical node's own span.
///
/// `Inside` carries an offset in the node's local coordinate space: chars for
/// text-like nodes, child index for containers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Placement {
    Before,
    After,
    Inside(usize),
}

impl Placement {
    /// Coarse class of the placement, ignoring the inside offset.
    pub fn class(&self) -> PlacementClass {
        match self {
            Placement::Before => PlacementClass::Before,
            Placement::After => PlacementClass::After,
            Placement::Inside(_) => PlacementClass::Inside,
        }
    }
}

/// Placement without the offset, for round-trip comparisons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlacementClass {
    Before,
    After,
    Inside,
}

/// A position in the logical document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocPosition {
    pub node: LogicalId,
    pub placement: Placement,
}

impl DocPosition {
    pub fn before(node: LogicalId) -> Self {
        Self {
            node,
            placement: Placement::Before,
        }
    }

    pub fn after(node: LogicalId) -> Self {
        Self {
            node,
            placement: Placement::After,
        }
    }

    pub fn inside(node: LogicalId, offset: usize) -> Self {
        Self {
            node,
            placement: Placement::Inside(offset),
        }
    }

    /// Check whether two positions name the same node and placement class.
    ///
    /// `Inside(0)` and `Before` on the same node are treated as equivalent
    /// caret stops, since both resolve to the start of the node's content.
    /// This needs no document; `Reconciler::equivalent_positions` also
    /// relates `After` to the following sibling and to a text node's end.
    pub fn is_equivalent(&self, other: &DocPosition) -> bool {
        if self.node != other.node {
            return false;
        }
        match (self.placement, other.placement) {
            (Placement::Inside(a), Placement::Inside(b)) => a == b,
            (Placement::Inside(0), Placement::Before) | (Placement::Before, Placement::Inside(0)) => {
                true
            }
            (a, b) => a.class() == b.class(),
        }
    }
}

/// A point in the host tree: a node plus an offset inside it.
///
/// For text nodes the offset counts chars; for containers it is a child index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostPoint {
    pub node: HostNodeId,
    pub offset: usize,
}

impl HostPoint {
    pub fn new(node: HostNodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}
