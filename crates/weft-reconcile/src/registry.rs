//! Identity registry: records and the indexes that reach them.
//!
//! Records live in an arena keyed by `RecordId`. Parent/child links are ids,
//! never references, so removal is a table operation and the whole state can
//! be snapshotted for tests.

use std::collections::HashMap;

use serde::Serialize;
use smol_str::SmolStr;

use crate::render::{Attributes, Hooks, NativeSlot, RenderObject};
use crate::types::{HostNodeId, LogicalId, RecordId};

/// Shallow copy of a render object: everything except its children.
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    Element { tag: SmolStr, attrs: Attributes },
    Text(String),
    Fragment,
    Native {
        nodes: Vec<HostNodeId>,
        slots: Vec<NativeSlot>,
    },
}

impl Content {
    pub fn of(object: &RenderObject) -> Self {
        match object {
            RenderObject::Element(e) => Content::Element {
                tag: e.tag.clone(),
                attrs: e.attrs.clone(),
            },
            RenderObject::Text(t) => Content::Text(t.text.clone()),
            RenderObject::Fragment(_) => Content::Fragment,
            RenderObject::Native(n) => Content::Native {
                nodes: n.nodes.clone(),
                slots: n.slots.clone(),
            },
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Content::Element { .. })
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Content::Text(_))
    }

    pub fn is_fragment(&self) -> bool {
        matches!(self, Content::Fragment)
    }

    /// Slot container receiving the rendering of `node`, for native content.
    pub fn slot_for(&self, node: LogicalId) -> Option<HostNodeId> {
        match self {
            Content::Native { slots, .. } => slots
                .iter()
                .find(|s| s.node == node)
                .map(|s| s.container),
            _ => None,
        }
    }

    fn summary(&self) -> String {
        match self {
            Content::Element { tag, attrs } if attrs.is_empty() => format!("<{}>", tag),
            Content::Element { tag, attrs } => format!("<{} +{}>", tag, attrs.len()),
            Content::Text(text) => format!("{:?}", text),
            Content::Fragment => "fragment".to_string(),
            Content::Native { nodes, .. } => format!("native x{}", nodes.len()),
        }
    }
}

/// The engine's identity for one render object instance.
#[derive(Clone, Debug)]
pub struct Record {
    pub id: RecordId,
    /// Logical node whose rendering produced this record.
    pub owner: LogicalId,
    pub content: Content,
    pub parent: Option<RecordId>,
    pub children: Vec<RecordId>,
    /// Own host nodes: one element, the text fragments, or the raw native nodes.
    pub host_nodes: Vec<HostNodeId>,
    /// Host container the record's nodes are inserted into.
    pub container: Option<HostNodeId>,
    /// Every logical node this record renders (owner, placeholders, locations).
    pub rendered_by: Vec<LogicalId>,
    /// LocationSet.
    pub locations: Vec<LogicalId>,
    pub hooks: Option<Hooks>,
}

impl Record {
    pub fn new(id: RecordId, owner: LogicalId, content: Content) -> Self {
        Self {
            id,
            owner,
            content,
            parent: None,
            children: Vec::new(),
            host_nodes: Vec::new(),
            container: None,
            rendered_by: Vec::new(),
            locations: Vec::new(),
            hooks: None,
        }
    }

    /// Host element this record contributes as a container for its children.
    pub fn own_container(&self) -> Option<HostNodeId> {
        match self.content {
            Content::Element { .. } => self.host_nodes.first().copied(),
            _ => None,
        }
    }
}

/// Serializable view of a record, for tests and debug dumps.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RecordSnapshot {
    pub id: RecordId,
    pub owner: LogicalId,
    pub content: String,
    pub parent: Option<RecordId>,
    pub children: Vec<RecordId>,
    pub host_nodes: Vec<HostNodeId>,
    pub locations: Vec<LogicalId>,
}

/// Bidirectional identity tables scoped to one engine instance.
#[derive(Debug, Default)]
pub struct Registry {
    records: HashMap<RecordId, Record>,
    next_id: u32,
    /// Root record of each rendered logical node.
    from_logical: HashMap<LogicalId, RecordId>,
    from_host: HashMap<HostNodeId, RecordId>,
    /// Records produced by each logical node's rendering (its matching pool).
    owned: HashMap<LogicalId, Vec<RecordId>>,
    /// Records whose LocationSet contains each logical node.
    located: HashMap<LogicalId, Vec<RecordId>>,
    /// Native slot containers and the logical node rendered into each.
    slots: HashMap<HostNodeId, LogicalId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_id(&mut self) -> RecordId {
        let id = RecordId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.get(&id)
    }

    /// Mutable access for fields that are not indexed (content, links, hooks).
    ///
    /// Host nodes must go through `set_host_nodes` so the reverse index
    /// stays consistent.
    pub fn get_mut(&mut self, id: RecordId) -> Option<&mut Record> {
        self.records.get_mut(&id)
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// Register a record, replacing any previous record with the same id.
    pub fn associate(&mut self, record: Record) {
        let id = record.id;
        if self.records.contains_key(&id) {
            self.unindex(id);
        }
        for node in &record.host_nodes {
            self.from_host.insert(*node, id);
        }
        let owned = self.owned.entry(record.owner).or_default();
        if !owned.contains(&id) {
            owned.push(id);
        }
        for location in &record.locations {
            let located = self.located.entry(*location).or_default();
            if !located.contains(&id) {
                located.push(id);
            }
        }
        if let Content::Native { slots, .. } = &record.content {
            for slot in slots {
                self.slots.insert(slot.container, slot.node);
            }
        }
        self.records.insert(id, record);
    }

    /// Remove a record and all its index entries.
    ///
    /// Unknown ids are ignored. The caller is responsible for the record's
    /// detach hook, which is why the record is handed back.
    pub fn release(&mut self, id: RecordId) -> Option<Record> {
        if !self.records.contains_key(&id) {
            return None;
        }
        self.unindex(id);
        let record = self.records.remove(&id)?;
        if self.from_logical.get(&record.owner) == Some(&id) {
            self.from_logical.remove(&record.owner);
        }
        Some(record)
    }

    fn unindex(&mut self, id: RecordId) {
        let Some(record) = self.records.get(&id) else {
            return;
        };
        for node in &record.host_nodes {
            if self.from_host.get(node) == Some(&id) {
                self.from_host.remove(node);
            }
        }
        if let Some(owned) = self.owned.get_mut(&record.owner) {
            owned.retain(|r| *r != id);
            if owned.is_empty() {
                self.owned.remove(&record.owner);
            }
        }
        for location in &record.locations {
            if let Some(located) = self.located.get_mut(location) {
                located.retain(|r| *r != id);
                if located.is_empty() {
                    self.located.remove(location);
                }
            }
        }
        if let Content::Native { slots, .. } = &record.content {
            for slot in slots {
                if self.slots.get(&slot.container) == Some(&slot.node) {
                    self.slots.remove(&slot.container);
                }
            }
        }
    }

    /// Replace a record's own host nodes, keeping `from_host` in sync.
    pub fn set_host_nodes(&mut self, id: RecordId, nodes: Vec<HostNodeId>) {
        let Some(record) = self.records.get_mut(&id) else {
            return;
        };
        for node in &record.host_nodes {
            if self.from_host.get(node) == Some(&id) {
                self.from_host.remove(node);
            }
        }
        for node in &nodes {
            self.from_host.insert(*node, id);
        }
        record.host_nodes = nodes;
    }

    pub fn root_of(&self, node: LogicalId) -> Option<RecordId> {
        self.from_logical.get(&node).copied()
    }

    pub fn set_root(&mut self, node: LogicalId, id: RecordId) -> Option<RecordId> {
        self.from_logical.insert(node, id)
    }

    /// Logical node whose rendering fills a native slot container.
    pub fn slot_owner(&self, container: HostNodeId) -> Option<LogicalId> {
        self.slots.get(&container).copied()
    }

    pub fn record_for_host(&self, node: HostNodeId) -> Option<RecordId> {
        self.from_host.get(&node).copied()
    }

    pub fn is_tracked(&self, node: HostNodeId) -> bool {
        self.from_host.contains_key(&node)
    }

    pub fn host_nodes(&self, id: RecordId) -> &[HostNodeId] {
        self.records
            .get(&id)
            .map(|r| r.host_nodes.as_slice())
            .unwrap_or(&[])
    }

    pub fn rendered_by(&self, id: RecordId) -> &[LogicalId] {
        self.records
            .get(&id)
            .map(|r| r.rendered_by.as_slice())
            .unwrap_or(&[])
    }

    pub fn locations(&self, id: RecordId) -> &[LogicalId] {
        self.records
            .get(&id)
            .map(|r| r.locations.as_slice())
            .unwrap_or(&[])
    }

    pub fn owned_by(&self, node: LogicalId) -> &[RecordId] {
        self.owned.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn located_at(&self, node: LogicalId) -> &[RecordId] {
        self.located.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Host nodes a record places into its container, flattening fragments.
    pub fn flat_host_nodes(&self, id: RecordId) -> Vec<HostNodeId> {
        let mut out = Vec::new();
        self.collect_flat(id, &mut out);
        out
    }

    fn collect_flat(&self, id: RecordId, out: &mut Vec<HostNodeId>) {
        let Some(record) = self.records.get(&id) else {
            return;
        };
        match record.content {
            Content::Fragment => {
                for child in &record.children {
                    self.collect_flat(*child, out);
                }
            }
            _ => out.extend_from_slice(&record.host_nodes),
        }
    }

    /// Number of ancestors, guarding against corrupted cycles.
    pub fn depth(&self, id: RecordId) -> usize {
        let mut depth = 0;
        let mut current = self.records.get(&id).and_then(|r| r.parent);
        while let Some(parent) = current {
            depth += 1;
            if depth > self.records.len() {
                break;
            }
            current = self.records.get(&parent).and_then(|r| r.parent);
        }
        depth
    }

    /// Records sorted by id, as serializable snapshots.
    pub fn snapshot(&self) -> Vec<RecordSnapshot> {
        let mut ids: Vec<RecordId> = self.records.keys().copied().collect();
        ids.sort();
        ids.into_iter()
            .filter_map(|id| self.records.get(&id))
            .map(|r| RecordSnapshot {
                id: r.id,
                owner: r.owner,
                content: r.content.summary(),
                parent: r.parent,
                children: r.children.clone(),
                host_nodes: r.host_nodes.clone(),
                locations: r.locations.clone(),
            })
            .collect()
    }

    /// Drop every record and index. Ids keep counting up.
    pub fn clear(&mut self) -> Vec<Record> {
        self.from_logical.clear();
        self.from_host.clear();
        self.owned.clear();
        self.located.clear();
        self.slots.clear();
        let mut records: Vec<Record> = self.records.drain().map(|(_, r)| r).collect();
        records.sort_by_key(|r| r.id);
        records
    }
}
