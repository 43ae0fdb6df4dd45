//! Translation between logical document positions and host points.
//!
//! A host point between two siblings resolves to the start of the following
//! located sibling. Text offsets count chars across every fragment of the
//! text record, using the same split rules as text patching.

use crate::document::DocumentTree;
use crate::host::HostTree;
use crate::registry::{Content, Record, Registry};
use crate::text::split_offset;
use crate::types::{DocPosition, HostNodeId, HostPoint, LogicalId, Placement, RecordId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Edge {
    Start,
    End,
}

/// Read-only view over the registry and host tree for position queries.
pub struct Locator<'a, H: HostTree> {
    reg: &'a Registry,
    host: &'a H,
}

impl<'a, H: HostTree> Locator<'a, H> {
    pub fn new(reg: &'a Registry, host: &'a H) -> Self {
        Self { reg, host }
    }

    /// LocationSet of the record owning `node`, or of its nearest located ancestor.
    pub fn from_external(&self, node: HostNodeId) -> Vec<LogicalId> {
        let Some(id) = self.tracked_ancestor(node) else {
            return Vec::new();
        };
        let mut current = Some(id);
        while let Some(id) = current {
            let Some(record) = self.reg.get(id) else { break };
            if !record.locations.is_empty() {
                return record.locations.clone();
            }
            current = record.parent;
        }
        Vec::new()
    }

    /// Map a host point to a logical position.
    pub fn locate(&self, node: HostNodeId, offset: usize) -> Option<DocPosition> {
        let position = if self.host.is_text(node) {
            self.text_point(node, offset)
        } else if self.host.tag_name(node).is_some() {
            self.container_point(node, offset)
        } else {
            None
        };
        tracing::trace!(
            target: "weft::locate",
            node = %node,
            offset,
            position = ?position,
            "located host point"
        );
        position
    }

    fn text_point(&self, node: HostNodeId, offset: usize) -> Option<DocPosition> {
        let offset = offset.min(self.host.text_len(node));
        if let Some(record) = self.record(node)
            && record.content.is_text()
        {
            if let Some(location) = record.locations.first() {
                let start = self.fragment_start(record, node);
                return Some(DocPosition::inside(*location, start + offset));
            }
            return self.owner_position(node);
        }
        self.around(node)
    }

    fn container_point(&self, node: HostNodeId, offset: usize) -> Option<DocPosition> {
        let children = self.host.children(node);
        if children.is_empty() {
            if let Some(record) = self.record(node)
                && let Some(location) = record.locations.first()
            {
                return Some(if offset == 0 {
                    DocPosition::before(*location)
                } else {
                    DocPosition::after(*location)
                });
            }
            return self.around(node);
        }

        let split = offset.min(children.len());
        for child in &children[split..] {
            if let Some(position) = self.edge(*child, Edge::Start) {
                return Some(position);
            }
        }
        for child in children[..split].iter().rev() {
            if let Some(position) = self.edge(*child, Edge::End) {
                return Some(position);
            }
        }
        self.owner_position(node)
    }

    /// Position at the start or end of a host node, if anything there is located.
    fn edge(&self, node: HostNodeId, edge: Edge) -> Option<DocPosition> {
        let record = self.record(node)?;
        if let Some(location) = record.locations.first() {
            return Some(match (&record.content, edge) {
                (Content::Text(_), Edge::Start) => {
                    DocPosition::inside(*location, self.fragment_start(record, node))
                }
                (Content::Text(_), Edge::End) => DocPosition::inside(
                    *location,
                    self.fragment_start(record, node) + self.host.text_len(node),
                ),
                (_, Edge::Start) => DocPosition::before(*location),
                (_, Edge::End) => DocPosition::after(*location),
            });
        }
        if record.content.is_text() {
            return None;
        }
        let children = self.host.children(node);
        match edge {
            Edge::Start => children.iter().find_map(|c| self.edge(*c, Edge::Start)),
            Edge::End => children.iter().rev().find_map(|c| self.edge(*c, Edge::End)),
        }
    }

    /// Fallback for untracked nodes: previous siblings, next siblings, then owner.
    fn around(&self, node: HostNodeId) -> Option<DocPosition> {
        let mut sibling = self.host.previous_sibling(node);
        while let Some(s) = sibling {
            if let Some(position) = self.edge(s, Edge::End) {
                return Some(position);
            }
            sibling = self.host.previous_sibling(s);
        }
        let mut sibling = self.host.next_sibling(node);
        while let Some(s) = sibling {
            if let Some(position) = self.edge(s, Edge::Start) {
                return Some(position);
            }
            sibling = self.host.next_sibling(s);
        }
        self.owner_position(self.host.parent(node)?)
    }

    /// `Inside(0)` of the nearest located record at or above `node`.
    fn owner_position(&self, node: HostNodeId) -> Option<DocPosition> {
        let id = self.tracked_ancestor(node)?;
        let mut current = Some(id);
        while let Some(id) = current {
            let record = self.reg.get(id)?;
            if let Some(location) = record.locations.first() {
                return Some(DocPosition::inside(*location, 0));
            }
            current = record.parent;
        }
        None
    }

    fn tracked_ancestor(&self, node: HostNodeId) -> Option<RecordId> {
        let mut current = Some(node);
        while let Some(n) = current {
            if let Some(id) = self.reg.record_for_host(n) {
                return Some(id);
            }
            current = self.host.parent(n);
        }
        None
    }

    fn record(&self, node: HostNodeId) -> Option<&'a Record> {
        self.reg.get(self.reg.record_for_host(node)?)
    }

    fn fragment_start(&self, record: &Record, node: HostNodeId) -> usize {
        record
            .host_nodes
            .iter()
            .take_while(|n| **n != node)
            .map(|n| self.host.text_len(*n))
            .sum()
    }

    /// Map a logical position to a host point.
    ///
    /// Nodes without a located record resolve through the document: the end
    /// of the previous sibling, else the start of the next one, else the
    /// start of the parent, repeating upward.
    pub fn get_locations<D>(&self, document: &D, position: DocPosition) -> Option<HostPoint>
    where
        D: DocumentTree + ?Sized,
    {
        if let Some(point) = self.direct(document, position) {
            return Some(point);
        }
        tracing::trace!(
            target: "weft::locate",
            node = %position.node,
            "no located record, falling back to neighbours"
        );

        let mut current = position.node;
        for _ in 0..=self.reg.len() {
            let mut sibling = document.previous_sibling(current);
            while let Some(s) = sibling {
                if let Some(point) = self.direct(document, DocPosition::after(s)) {
                    return Some(point);
                }
                sibling = document.previous_sibling(s);
            }
            let mut sibling = document.next_sibling(current);
            while let Some(s) = sibling {
                if let Some(point) = self.direct(document, DocPosition::before(s)) {
                    return Some(point);
                }
                sibling = document.next_sibling(s);
            }
            let parent = document.parent(current)?;
            if let Some(point) = self.direct(document, DocPosition::inside(parent, 0)) {
                return Some(point);
            }
            current = parent;
        }
        None
    }

    /// Check whether two positions name the same caret stop.
    ///
    /// Extends `DocPosition::is_equivalent` with what the document and the
    /// rendering know: the end of a text node is its last offset, and the end
    /// of a node is the start of its next sibling.
    pub fn equivalent<D>(&self, document: &D, a: DocPosition, b: DocPosition) -> bool
    where
        D: DocumentTree + ?Sized,
    {
        self.normalize(document, a)
            .is_equivalent(&self.normalize(document, b))
    }

    fn normalize<D>(&self, document: &D, position: DocPosition) -> DocPosition
    where
        D: DocumentTree + ?Sized,
    {
        if position.placement != Placement::After {
            return position;
        }
        let text = self
            .reg
            .located_at(position.node)
            .iter()
            .filter_map(|id| self.reg.get(*id))
            .find(|record| record.content.is_text());
        if let Some(record) = text {
            let len = record.host_nodes.iter().map(|n| self.host.text_len(*n)).sum();
            return DocPosition::inside(position.node, len);
        }
        match document.next_sibling(position.node) {
            Some(next) => DocPosition::before(next),
            None => position,
        }
    }

    fn direct<D>(&self, document: &D, position: DocPosition) -> Option<HostPoint>
    where
        D: DocumentTree + ?Sized,
    {
        self.reg
            .located_at(position.node)
            .iter()
            .find_map(|id| self.resolve(document, *id, position))
    }

    fn resolve<D>(&self, document: &D, id: RecordId, position: DocPosition) -> Option<HostPoint>
    where
        D: DocumentTree + ?Sized,
    {
        let record = self.reg.get(id)?;
        match &record.content {
            Content::Text(_) => {
                let offset = match position.placement {
                    Placement::Before => 0,
                    Placement::Inside(k) => k,
                    Placement::After => usize::MAX,
                };
                self.text_offset(record, offset)
            }
            Content::Element { .. } => {
                let element = *record.host_nodes.first()?;
                match position.placement {
                    Placement::Before => self.boundary(element, false),
                    Placement::After => self.boundary(element, true),
                    Placement::Inside(k) => {
                        let kids = document.children(position.node);
                        let through_child = if let Some(kid) = kids.get(k) {
                            self.direct(document, DocPosition::before(*kid))
                        } else if let Some(last) = kids.last() {
                            self.direct(document, DocPosition::after(*last))
                        } else {
                            None
                        };
                        through_child.or_else(|| {
                            Some(HostPoint::new(element, k.min(self.host.child_count(element))))
                        })
                    }
                }
            }
            Content::Fragment | Content::Native { .. } => {
                let nodes = self.reg.flat_host_nodes(id);
                let point = match position.placement {
                    Placement::After => nodes.last().and_then(|n| self.boundary(*n, true)),
                    _ => nodes.first().and_then(|n| self.boundary(*n, false)),
                };
                point.or_else(|| self.empty_point(record))
            }
        }
    }

    fn text_offset(&self, record: &Record, offset: usize) -> Option<HostPoint> {
        let lens: Vec<usize> = record
            .host_nodes
            .iter()
            .map(|n| self.host.text_len(*n))
            .collect();
        match split_offset(&lens, offset) {
            Some((index, local)) => Some(HostPoint::new(record.host_nodes[index], local)),
            None => self.empty_point(record),
        }
    }

    /// Point just before (or after) a node, in its parent.
    fn boundary(&self, node: HostNodeId, after: bool) -> Option<HostPoint> {
        let parent = self.host.parent(node)?;
        let index = self.host.index_in_parent(node)?;
        Some(HostPoint::new(parent, index + usize::from(after)))
    }

    /// Where a record with no host nodes would sit in its container.
    fn empty_point(&self, record: &Record) -> Option<HostPoint> {
        let container = record.container?;
        let mut current = record.id;
        for _ in 0..=self.reg.len() {
            let Some(parent_id) = self.reg.get(current)?.parent else {
                return Some(HostPoint::new(container, 0));
            };
            let parent = self.reg.get(parent_id)?;
            let index = parent.children.iter().position(|c| *c == current)?;
            for sibling in parent.children[..index].iter().rev() {
                if let Some(last) = self.reg.flat_host_nodes(*sibling).last()
                    && self.host.parent(*last) == Some(container)
                {
                    return self.boundary(*last, true);
                }
            }
            if !parent.content.is_fragment() {
                break;
            }
            current = parent_id;
        }
        Some(HostPoint::new(container, 0))
    }
}
