//! Host mutation phase.
//!
//! Consumes a `Plan` whose records are already committed to the registry and
//! brings the host tree in line: patch or create each record's own nodes
//! (parents before children), lay out every container that may have changed,
//! then remove orphaned nodes nobody reclaimed.

use std::collections::HashSet;

use indexmap::IndexSet;

use crate::config::ReconcileConfig;
use crate::diff::{AttrDelta, Diff, Plan};
use crate::host::{HostError, HostTree};
use crate::registry::{Content, Record, Registry};
use crate::render::{Attributes, Hooks};
use crate::text::{FragmentEdit, plan_fragments};
use crate::types::{HostNodeId, LogicalId, RecordId};

/// Lifecycle transition to deliver once host writes are done.
#[derive(Clone, Debug)]
pub enum HookCall {
    Attach(Hooks, Vec<HostNodeId>),
    Detach(Hooks, Vec<HostNodeId>),
}

impl HookCall {
    pub fn deliver(&self) {
        match self {
            HookCall::Attach(hooks, nodes) => hooks.attach(nodes),
            HookCall::Detach(hooks, nodes) => hooks.detach(nodes),
        }
    }
}

/// Host node released this pass, removed at the end unless reclaimed.
#[derive(Debug)]
struct Orphan {
    node: HostNodeId,
    container: Option<HostNodeId>,
    /// Tag and attributes, for element nodes that may be recycled.
    element: Option<(smol_str::SmolStr, Attributes)>,
    claimed: bool,
}

/// Counters and queued hooks produced by one application.
#[derive(Debug, Default)]
pub struct Applied {
    pub hooks: Vec<HookCall>,
    pub updated: usize,
    pub recycled: usize,
    pub moved: usize,
    pub removed_nodes: usize,
}

pub struct Applier<'a, H: HostTree> {
    reg: &'a mut Registry,
    host: &'a mut H,
    config: &'a ReconcileConfig,
    mount: HostNodeId,
    root: LogicalId,
    orphans: Vec<Orphan>,
    dirty: IndexSet<HostNodeId>,
    out: Applied,
}

impl<'a, H: HostTree> Applier<'a, H> {
    pub fn new(
        reg: &'a mut Registry,
        host: &'a mut H,
        config: &'a ReconcileConfig,
        mount: HostNodeId,
        root: LogicalId,
    ) -> Self {
        Self {
            reg,
            host,
            config,
            mount,
            root,
            orphans: Vec::new(),
            dirty: IndexSet::new(),
            out: Applied::default(),
        }
    }

    pub fn run(mut self, plan: Plan) -> Result<Applied, HostError> {
        for record in plan.released {
            self.release(record);
        }

        let mut diffs = plan.diffs;
        diffs.sort_by_key(|d| self.reg.depth(d.record));
        for diff in &diffs {
            self.apply(diff)?;
        }

        let dirty = std::mem::take(&mut self.dirty);
        for container in dirty {
            self.layout(container)?;
        }
        self.cleanup()?;

        tracing::debug!(
            target: "weft::apply",
            updated = self.out.updated,
            recycled = self.out.recycled,
            moved = self.out.moved,
            removed = self.out.removed_nodes,
            hooks = self.out.hooks.len(),
            "applied pass"
        );
        Ok(self.out)
    }

    fn release(&mut self, record: Record) {
        let element = match &record.content {
            Content::Element { tag, attrs } => Some((tag.clone(), attrs.clone())),
            _ => None,
        };
        for node in &record.host_nodes {
            self.orphans.push(Orphan {
                node: *node,
                container: record.container,
                element: element.clone(),
                claimed: false,
            });
        }
        if let Some(hooks) = record.hooks {
            self.out.hooks.push(HookCall::Detach(hooks, record.host_nodes));
        }
    }

    fn apply(&mut self, diff: &Diff) -> Result<(), HostError> {
        let id = diff.record;
        let container = self.container_for(id);
        let Some(record) = self.reg.get_mut(id) else {
            return Ok(());
        };
        record.container = container;
        let content = record.content.clone();
        let old_nodes = record.host_nodes.clone();
        let children = record.children.clone();

        match container {
            Some(c) => {
                self.dirty.insert(c);
            }
            None => tracing::warn!(
                target: "weft::apply",
                record = %id,
                "record has no host container, its nodes stay detached"
            ),
        }

        match &content {
            Content::Element { tag, .. } => self.apply_element(id, diff, container, tag)?,
            Content::Text(text) => self.apply_text(id, diff, container, text)?,
            Content::Native { nodes, .. } => self.apply_native(id, diff, container, nodes)?,
            Content::Fragment => {}
        }

        if content.is_element()
            && let Some(own) = self.reg.host_nodes(id).first()
        {
            self.dirty.insert(*own);
        }
        let new_nodes = self.reg.host_nodes(id).to_vec();
        self.transition(id, diff.created, &old_nodes, &new_nodes);
        for child in children {
            self.relocate(child);
        }
        if !diff.created {
            self.out.updated += 1;
        }
        Ok(())
    }

    fn apply_element(
        &mut self,
        id: RecordId,
        diff: &Diff,
        container: Option<HostNodeId>,
        tag: &str,
    ) -> Result<(), HostError> {
        let existing = self
            .reg
            .host_nodes(id)
            .first()
            .copied()
            .filter(|n| self.host.tag_name(*n).is_some());
        if let Some(node) = existing
            && !diff.force_redraw
        {
            return self.patch_attributes(node, &diff.attrs);
        }

        let attrs = match self.reg.get(id).map(|r| &r.content) {
            Some(Content::Element { attrs, .. }) => attrs.clone(),
            _ => Attributes::default(),
        };
        let recycled = if diff.force_redraw {
            None
        } else {
            self.recycle(tag, container)
        };
        let (node, delta) = match recycled {
            Some((node, old)) => {
                self.out.recycled += 1;
                tracing::trace!(
                    target: "weft::apply",
                    record = %id,
                    node = %node,
                    tag,
                    "recycled orphaned element"
                );
                (node, AttrDelta::between(&old, &attrs))
            }
            None => (self.host.create_element(tag)?, AttrDelta::full(&attrs)),
        };
        self.patch_attributes(node, &delta)?;

        if let Some(old) = existing {
            tracing::trace!(
                target: "weft::apply",
                record = %id,
                old = %old,
                new = %node,
                "force redraw replaced element"
            );
            self.orphans.push(Orphan {
                node: old,
                container,
                element: None,
                claimed: false,
            });
        }
        self.reg.set_host_nodes(id, vec![node]);
        Ok(())
    }

    fn recycle(
        &mut self,
        tag: &str,
        container: Option<HostNodeId>,
    ) -> Option<(HostNodeId, Attributes)> {
        if !self.config.recycle_orphans {
            return None;
        }
        let host = &*self.host;
        let reg = &*self.reg;
        let orphan = self.orphans.iter_mut().find(|o| {
            !o.claimed
                && o.container == container
                && o.element.as_ref().is_some_and(|(t, _)| t == tag)
                && host.tag_name(o.node) == Some(tag)
                && !reg.is_tracked(o.node)
        })?;
        orphan.claimed = true;
        let attrs = orphan.element.as_ref().map(|(_, a)| a.clone()).unwrap_or_default();
        Some((orphan.node, attrs))
    }

    fn patch_attributes(&mut self, node: HostNodeId, delta: &AttrDelta) -> Result<(), HostError> {
        for name in &delta.remove_plain {
            self.host.remove_attribute(node, name)?;
        }
        for name in &delta.remove_style {
            self.host.remove_style(node, name)?;
        }
        for class in &delta.remove_class {
            self.host.remove_class(node, class)?;
        }
        for (name, value) in &delta.set_plain {
            self.host.set_attribute(node, name, value)?;
        }
        for (name, value) in &delta.set_style {
            self.host.set_style(node, name, value)?;
        }
        for class in &delta.add_class {
            self.host.add_class(node, class)?;
        }
        if !delta.is_empty() {
            tracing::trace!(
                target: "weft::apply",
                node = %node,
                changes = delta.len(),
                "patched attributes"
            );
        }
        Ok(())
    }

    fn apply_text(
        &mut self,
        id: RecordId,
        diff: &Diff,
        container: Option<HostNodeId>,
        text: &str,
    ) -> Result<(), HostError> {
        let owned = self.reg.host_nodes(id).to_vec();
        let fragments: Vec<HostNodeId> = owned
            .iter()
            .copied()
            .filter(|n| self.host.is_text(*n))
            .collect();
        if fragments.len() != owned.len() {
            tracing::warn!(
                target: "weft::apply",
                record = %id,
                dropped = owned.len() - fragments.len(),
                "text record held non-text host nodes, dropping them"
            );
        }

        if diff.force_redraw && !fragments.is_empty() {
            for node in &fragments {
                self.orphans.push(Orphan {
                    node: *node,
                    container,
                    element: None,
                    claimed: false,
                });
            }
            let nodes = if text.is_empty() {
                Vec::new()
            } else {
                vec![self.host.create_text(text)?]
            };
            self.reg.set_host_nodes(id, nodes);
            return Ok(());
        }

        if fragments.is_empty() {
            let nodes = if text.is_empty() {
                Vec::new()
            } else {
                vec![self.host.create_text(text)?]
            };
            self.reg.set_host_nodes(id, nodes);
            return Ok(());
        }

        let current: Vec<String> = fragments
            .iter()
            .map(|n| self.host.text(*n).unwrap_or_default().to_string())
            .collect();
        let current: Vec<&str> = current.iter().map(String::as_str).collect();
        let edits = plan_fragments(&current, text);

        let mut removed = HashSet::new();
        for edit in &edits {
            match edit {
                FragmentEdit::Replace { index, range, text } => {
                    self.host.replace_text(fragments[*index], range.clone(), text)?;
                }
                FragmentEdit::Remove { index } => {
                    self.host.remove(fragments[*index])?;
                    removed.insert(*index);
                }
            }
        }
        tracing::trace!(
            target: "weft::apply",
            record = %id,
            fragments = fragments.len(),
            edits = edits.len(),
            "patched text"
        );

        let remaining: Vec<HostNodeId> = fragments
            .into_iter()
            .enumerate()
            .filter(|(i, _)| !removed.contains(i))
            .map(|(_, n)| n)
            .collect();
        self.reg.set_host_nodes(id, remaining);
        Ok(())
    }

    /// Swap in a changed raw list without a redraw: dropped nodes become
    /// orphans, kept nodes stay put, and layout inserts the new ones.
    fn apply_native(
        &mut self,
        id: RecordId,
        diff: &Diff,
        container: Option<HostNodeId>,
        nodes: &[HostNodeId],
    ) -> Result<(), HostError> {
        let old = self.reg.host_nodes(id).to_vec();
        if old == nodes && !diff.force_redraw {
            return Ok(());
        }
        for node in &old {
            if !nodes.contains(node) {
                self.orphans.push(Orphan {
                    node: *node,
                    container,
                    element: None,
                    claimed: false,
                });
            }
        }
        if diff.force_redraw {
            // detached here, re-inserted by layout
            for node in nodes {
                if self.host.parent(*node).is_some() {
                    self.host.remove(*node)?;
                }
            }
        }
        tracing::trace!(
            target: "weft::apply",
            record = %id,
            old = old.len(),
            new = nodes.len(),
            forced = diff.force_redraw,
            "replaced native content"
        );
        self.reg.set_host_nodes(id, nodes.to_vec());
        Ok(())
    }

    /// Queue hooks for a real attach/detach transition.
    fn transition(&mut self, id: RecordId, created: bool, old: &[HostNodeId], new: &[HostNodeId]) {
        let Some(hooks) = self.reg.get(id).and_then(|r| r.hooks.clone()) else {
            return;
        };
        if created {
            self.out.hooks.push(HookCall::Attach(hooks, new.to_vec()));
            return;
        }
        if old.first() == new.first() {
            return;
        }
        if !old.is_empty() {
            self.out
                .hooks
                .push(HookCall::Detach(hooks.clone(), old.to_vec()));
        }
        if !new.is_empty() {
            self.out.hooks.push(HookCall::Attach(hooks, new.to_vec()));
        }
    }

    /// Host container a record's nodes belong in, derived from its parent.
    fn container_for(&self, id: RecordId) -> Option<HostNodeId> {
        let record = self.reg.get(id)?;
        let Some(parent) = record.parent else {
            return Some(self.mount);
        };
        let parent = self.reg.get(parent)?;
        match &parent.content {
            Content::Element { .. } => parent.host_nodes.first().copied(),
            Content::Fragment => parent.container,
            Content::Native { .. } => parent.content.slot_for(record.owner),
            Content::Text(_) => None,
        }
    }

    /// Update containers below a processed record, through fragments.
    fn relocate(&mut self, id: RecordId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let container = self.container_for(id);
            let Some(record) = self.reg.get_mut(id) else {
                continue;
            };
            if record.container == container {
                continue;
            }
            tracing::trace!(
                target: "weft::apply",
                record = %id,
                from = ?record.container,
                to = ?container,
                "record moved to another container"
            );
            record.container = container;
            if let Some(c) = container {
                self.dirty.insert(c);
            }
            if record.content.is_fragment() {
                stack.extend(record.children.iter().copied());
            }
        }
    }

    /// Host nodes that should sit in `container`, in order.
    fn desired_children(&self, container: HostNodeId) -> Option<Vec<HostNodeId>> {
        if container == self.mount {
            return Some(
                self.reg
                    .root_of(self.root)
                    .map(|r| self.reg.flat_host_nodes(r))
                    .unwrap_or_default(),
            );
        }
        if let Some(id) = self.reg.record_for_host(container)
            && let Some(record) = self.reg.get(id)
            && record.own_container() == Some(container)
        {
            return Some(
                record
                    .children
                    .iter()
                    .flat_map(|c| self.reg.flat_host_nodes(*c))
                    .collect(),
            );
        }
        let slot = self.reg.slot_owner(container)?;
        Some(
            self.reg
                .root_of(slot)
                .map(|r| self.reg.flat_host_nodes(r))
                .unwrap_or_default(),
        )
    }

    /// Cursor walk over the live children, moving only out-of-place nodes.
    ///
    /// Nodes the container should not hold (untracked nodes, orphans) are
    /// stepped over and never touched here.
    fn layout(&mut self, container: HostNodeId) -> Result<(), HostError> {
        let Some(desired) = self.desired_children(container) else {
            tracing::trace!(
                target: "weft::apply",
                container = %container,
                "container no longer live, skipping layout"
            );
            return Ok(());
        };
        let wanted: HashSet<HostNodeId> = desired.iter().copied().collect();

        let mut cursor = self.host.first_child(container);
        for node in desired {
            while let Some(c) = cursor {
                if c == node || wanted.contains(&c) {
                    break;
                }
                cursor = self.host.next_sibling(c);
            }
            if cursor == Some(node) {
                cursor = self.host.next_sibling(node);
                continue;
            }
            self.host.insert_before(container, node, cursor)?;
            self.out.moved += 1;
        }
        Ok(())
    }

    /// Remove orphans still attached somewhere, outermost first.
    fn cleanup(&mut self) -> Result<(), HostError> {
        let pending: Vec<HostNodeId> = self
            .orphans
            .iter()
            .filter(|o| !o.claimed && !self.reg.is_tracked(o.node))
            .map(|o| o.node)
            .collect();
        let set: HashSet<HostNodeId> = pending.iter().copied().collect();

        for node in pending {
            if self.host.parent(node).is_none() {
                continue;
            }
            let mut ancestor = self.host.parent(node);
            let mut nested = false;
            while let Some(a) = ancestor {
                if set.contains(&a) {
                    nested = true;
                    break;
                }
                ancestor = self.host.parent(a);
            }
            if nested {
                continue;
            }
            self.host.remove(node)?;
            self.out.removed_nodes += 1;
        }
        Ok(())
    }
}
