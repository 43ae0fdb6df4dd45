//! In-memory host tree.
//!
//! Used by headless hosts and by tests. Every mutation is appended to an
//! operation log so callers can assert exactly which writes a pass made.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Write as _;
use std::ops::Range;

use smol_str::SmolStr;

use crate::host::{HostError, HostTree};
use crate::types::HostNodeId;

/// A recorded host mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostOp {
    CreateElement { node: HostNodeId, tag: SmolStr },
    CreateText { node: HostNodeId, text: String },
    ReplaceText { node: HostNodeId, range: Range<usize>, text: String },
    SplitText { node: HostNodeId, at: usize, new_node: HostNodeId },
    SetAttribute { node: HostNodeId, name: SmolStr, value: String },
    RemoveAttribute { node: HostNodeId, name: SmolStr },
    SetStyle { node: HostNodeId, name: SmolStr, value: String },
    RemoveStyle { node: HostNodeId, name: SmolStr },
    AddClass { node: HostNodeId, class: SmolStr },
    RemoveClass { node: HostNodeId, class: SmolStr },
    Insert { parent: HostNodeId, child: HostNodeId, before: Option<HostNodeId> },
    Remove { node: HostNodeId },
}

#[derive(Clone, Debug)]
enum MemKind {
    Element {
        tag: SmolStr,
        attrs: BTreeMap<SmolStr, String>,
        style: BTreeMap<SmolStr, String>,
        class: BTreeSet<SmolStr>,
    },
    Text(String),
}

#[derive(Clone, Debug)]
struct MemNode {
    kind: MemKind,
    parent: Option<HostNodeId>,
    children: Vec<HostNodeId>,
}

/// Host tree kept entirely in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryTree {
    nodes: HashMap<HostNodeId, MemNode>,
    next_id: u64,
    ops: Vec<HostOp>,
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tree with a detached root element; its creation is not logged.
    pub fn with_root(tag: &str) -> (Self, HostNodeId) {
        let mut tree = Self::new();
        let root = tree.alloc(MemKind::Element {
            tag: SmolStr::new(tag),
            attrs: BTreeMap::new(),
            style: BTreeMap::new(),
            class: BTreeSet::new(),
        });
        (tree, root)
    }

    /// Operations recorded since the last `take_ops`.
    pub fn ops(&self) -> &[HostOp] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<HostOp> {
        std::mem::take(&mut self.ops)
    }

    pub fn attribute(&self, node: HostNodeId, name: &str) -> Option<&str> {
        match &self.nodes.get(&node)?.kind {
            MemKind::Element { attrs, .. } => attrs.get(name).map(String::as_str),
            MemKind::Text(_) => None,
        }
    }

    pub fn style(&self, node: HostNodeId, name: &str) -> Option<&str> {
        match &self.nodes.get(&node)?.kind {
            MemKind::Element { style, .. } => style.get(name).map(String::as_str),
            MemKind::Text(_) => None,
        }
    }

    pub fn has_class(&self, node: HostNodeId, name: &str) -> bool {
        match self.nodes.get(&node).map(|n| &n.kind) {
            Some(MemKind::Element { class, .. }) => class.contains(name),
            _ => false,
        }
    }

    /// Split a text node at a char offset, the way a host editor does during
    /// native input. The new node holds the tail and follows the original.
    pub fn split_text(&mut self, node: HostNodeId, at: usize) -> Result<HostNodeId, HostError> {
        let (head, tail, parent) = {
            let n = self.nodes.get(&node).ok_or(HostError::UnknownNode(node))?;
            let MemKind::Text(text) = &n.kind else {
                return Err(HostError::NotText(node));
            };
            let len = text.chars().count();
            if at > len {
                return Err(HostError::OutOfBounds {
                    node,
                    start: at,
                    end: at,
                    len,
                });
            }
            let byte = char_to_byte(text, at);
            (text[..byte].to_string(), text[byte..].to_string(), n.parent)
        };

        let new_node = self.alloc(MemKind::Text(tail));
        if let Some(MemKind::Text(text)) = self.nodes.get_mut(&node).map(|n| &mut n.kind) {
            *text = head;
        }
        if let Some(parent) = parent {
            let index = self.position_in(parent, node).map(|i| i + 1);
            if let (Some(index), Some(p)) = (index, self.nodes.get_mut(&parent)) {
                p.children.insert(index, new_node);
            }
            if let Some(n) = self.nodes.get_mut(&new_node) {
                n.parent = Some(parent);
            }
        }
        self.ops.push(HostOp::SplitText { node, at, new_node });
        Ok(new_node)
    }

    /// Serialize a subtree to compact markup for assertions.
    ///
    /// Attributes come first, then `class`, then `style`, each sorted.
    pub fn to_markup(&self, node: HostNodeId) -> String {
        let mut out = String::new();
        self.write_markup(node, &mut out);
        out
    }

    /// Markup of a node's children only.
    pub fn inner_markup(&self, node: HostNodeId) -> String {
        let mut out = String::new();
        for child in self.children(node) {
            self.write_markup(child, &mut out);
        }
        out
    }

    fn write_markup(&self, node: HostNodeId, out: &mut String) {
        let Some(n) = self.nodes.get(&node) else {
            return;
        };
        match &n.kind {
            MemKind::Text(text) => out.push_str(text),
            MemKind::Element {
                tag,
                attrs,
                style,
                class,
            } => {
                let _ = write!(out, "<{}", tag);
                for (k, v) in attrs {
                    let _ = write!(out, " {}=\"{}\"", k, v);
                }
                if !class.is_empty() {
                    let joined: Vec<&str> = class.iter().map(SmolStr::as_str).collect();
                    let _ = write!(out, " class=\"{}\"", joined.join(" "));
                }
                if !style.is_empty() {
                    let joined: Vec<String> =
                        style.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                    let _ = write!(out, " style=\"{}\"", joined.join("; "));
                }
                out.push('>');
                for child in &n.children {
                    self.write_markup(*child, out);
                }
                let _ = write!(out, "</{}>", tag);
            }
        }
    }

    fn alloc(&mut self, kind: MemKind) -> HostNodeId {
        let id = HostNodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            MemNode {
                kind,
                parent: None,
                children: Vec::new(),
            },
        );
        id
    }

    fn position_in(&self, parent: HostNodeId, child: HostNodeId) -> Option<usize> {
        self.nodes
            .get(&parent)?
            .children
            .iter()
            .position(|c| *c == child)
    }

    fn element_mut(
        &mut self,
        node: HostNodeId,
    ) -> Result<
        (
            &mut BTreeMap<SmolStr, String>,
            &mut BTreeMap<SmolStr, String>,
            &mut BTreeSet<SmolStr>,
        ),
        HostError,
    > {
        let n = self
            .nodes
            .get_mut(&node)
            .ok_or(HostError::UnknownNode(node))?;
        match &mut n.kind {
            MemKind::Element {
                attrs,
                style,
                class,
                ..
            } => Ok((attrs, style, class)),
            MemKind::Text(_) => Err(HostError::NotContainer(node)),
        }
    }

    fn detach(&mut self, node: HostNodeId) {
        let parent = self.nodes.get(&node).and_then(|n| n.parent);
        if let Some(parent) = parent {
            if let Some(p) = self.nodes.get_mut(&parent) {
                p.children.retain(|c| *c != node);
            }
        }
        if let Some(n) = self.nodes.get_mut(&node) {
            n.parent = None;
        }
    }
}

fn char_to_byte(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(b, _)| b)
        .unwrap_or(text.len())
}

impl HostTree for MemoryTree {
    fn create_element(&mut self, tag: &str) -> Result<HostNodeId, HostError> {
        let node = self.alloc(MemKind::Element {
            tag: SmolStr::new(tag),
            attrs: BTreeMap::new(),
            style: BTreeMap::new(),
            class: BTreeSet::new(),
        });
        self.ops.push(HostOp::CreateElement {
            node,
            tag: SmolStr::new(tag),
        });
        Ok(node)
    }

    fn create_text(&mut self, text: &str) -> Result<HostNodeId, HostError> {
        let node = self.alloc(MemKind::Text(text.to_string()));
        self.ops.push(HostOp::CreateText {
            node,
            text: text.to_string(),
        });
        Ok(node)
    }

    fn tag_name(&self, node: HostNodeId) -> Option<&str> {
        match &self.nodes.get(&node)?.kind {
            MemKind::Element { tag, .. } => Some(tag.as_str()),
            MemKind::Text(_) => None,
        }
    }

    fn text(&self, node: HostNodeId) -> Option<&str> {
        match &self.nodes.get(&node)?.kind {
            MemKind::Text(text) => Some(text.as_str()),
            MemKind::Element { .. } => None,
        }
    }

    fn parent(&self, node: HostNodeId) -> Option<HostNodeId> {
        self.nodes.get(&node)?.parent
    }

    fn first_child(&self, node: HostNodeId) -> Option<HostNodeId> {
        self.nodes.get(&node)?.children.first().copied()
    }

    fn next_sibling(&self, node: HostNodeId) -> Option<HostNodeId> {
        let parent = self.parent(node)?;
        let siblings = &self.nodes.get(&parent)?.children;
        let index = siblings.iter().position(|c| *c == node)?;
        siblings.get(index + 1).copied()
    }

    fn previous_sibling(&self, node: HostNodeId) -> Option<HostNodeId> {
        let parent = self.parent(node)?;
        let siblings = &self.nodes.get(&parent)?.children;
        let index = siblings.iter().position(|c| *c == node)?;
        index.checked_sub(1).and_then(|i| siblings.get(i).copied())
    }

    fn children(&self, node: HostNodeId) -> Vec<HostNodeId> {
        self.nodes
            .get(&node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn replace_text(
        &mut self,
        node: HostNodeId,
        char_range: Range<usize>,
        text: &str,
    ) -> Result<(), HostError> {
        let n = self
            .nodes
            .get_mut(&node)
            .ok_or(HostError::UnknownNode(node))?;
        let MemKind::Text(content) = &mut n.kind else {
            return Err(HostError::NotText(node));
        };
        let len = content.chars().count();
        if char_range.start > char_range.end || char_range.end > len {
            return Err(HostError::OutOfBounds {
                node,
                start: char_range.start,
                end: char_range.end,
                len,
            });
        }
        let start = char_to_byte(content, char_range.start);
        let end = char_to_byte(content, char_range.end);
        content.replace_range(start..end, text);
        self.ops.push(HostOp::ReplaceText {
            node,
            range: char_range,
            text: text.to_string(),
        });
        Ok(())
    }

    fn set_attribute(
        &mut self,
        node: HostNodeId,
        name: &str,
        value: &str,
    ) -> Result<(), HostError> {
        let (attrs, _, _) = self.element_mut(node)?;
        attrs.insert(SmolStr::new(name), value.to_string());
        self.ops.push(HostOp::SetAttribute {
            node,
            name: SmolStr::new(name),
            value: value.to_string(),
        });
        Ok(())
    }

    fn remove_attribute(&mut self, node: HostNodeId, name: &str) -> Result<(), HostError> {
        let (attrs, _, _) = self.element_mut(node)?;
        attrs.remove(name);
        self.ops.push(HostOp::RemoveAttribute {
            node,
            name: SmolStr::new(name),
        });
        Ok(())
    }

    fn set_style(&mut self, node: HostNodeId, name: &str, value: &str) -> Result<(), HostError> {
        let (_, style, _) = self.element_mut(node)?;
        style.insert(SmolStr::new(name), value.to_string());
        self.ops.push(HostOp::SetStyle {
            node,
            name: SmolStr::new(name),
            value: value.to_string(),
        });
        Ok(())
    }

    fn remove_style(&mut self, node: HostNodeId, name: &str) -> Result<(), HostError> {
        let (_, style, _) = self.element_mut(node)?;
        style.remove(name);
        self.ops.push(HostOp::RemoveStyle {
            node,
            name: SmolStr::new(name),
        });
        Ok(())
    }

    fn add_class(&mut self, node: HostNodeId, class: &str) -> Result<(), HostError> {
        let (_, _, classes) = self.element_mut(node)?;
        classes.insert(SmolStr::new(class));
        self.ops.push(HostOp::AddClass {
            node,
            class: SmolStr::new(class),
        });
        Ok(())
    }

    fn remove_class(&mut self, node: HostNodeId, class: &str) -> Result<(), HostError> {
        let (_, _, classes) = self.element_mut(node)?;
        classes.remove(class);
        self.ops.push(HostOp::RemoveClass {
            node,
            class: SmolStr::new(class),
        });
        Ok(())
    }

    fn insert_before(
        &mut self,
        parent: HostNodeId,
        child: HostNodeId,
        reference: Option<HostNodeId>,
    ) -> Result<(), HostError> {
        if !self.nodes.contains_key(&child) {
            return Err(HostError::UnknownNode(child));
        }
        match self.nodes.get(&parent).map(|n| &n.kind) {
            None => return Err(HostError::UnknownNode(parent)),
            Some(MemKind::Text(_)) => return Err(HostError::NotContainer(parent)),
            Some(MemKind::Element { .. }) => {}
        }
        if self.contains(child, parent) {
            return Err(HostError::Cycle { parent, child });
        }

        self.detach(child);
        let index = match reference {
            Some(r) => self
                .position_in(parent, r)
                .ok_or(HostError::UnknownNode(r))?,
            None => self.nodes.get(&parent).map(|p| p.children.len()).unwrap_or(0),
        };
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.insert(index, child);
        }
        if let Some(c) = self.nodes.get_mut(&child) {
            c.parent = Some(parent);
        }
        self.ops.push(HostOp::Insert {
            parent,
            child,
            before: reference,
        });
        Ok(())
    }

    fn remove(&mut self, node: HostNodeId) -> Result<(), HostError> {
        if !self.nodes.contains_key(&node) {
            return Err(HostError::UnknownNode(node));
        }
        self.detach(node);
        self.ops.push(HostOp::Remove { node });
        Ok(())
    }
}
