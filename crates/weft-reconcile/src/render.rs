//! Declarative render objects produced by node renderers.
//!
//! A renderer turns one logical node into a `RenderObject` tree. The engine
//! consumes these trees and never hands them back: everything it needs to
//! remember is copied into reconciliation records.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;

use smol_str::SmolStr;

use crate::types::{HostNodeId, LogicalId};

/// Lifecycle capability implemented by renderer-supplied objects.
///
/// Called only on real transitions: when a record is first associated with
/// host nodes (or its host nodes are replaced), and when it releases them.
/// Reusing a record across passes never calls either method.
pub trait Lifecycle {
    /// The record now owns these host nodes.
    fn on_attach(&self, _nodes: &[HostNodeId]) {}

    /// The record no longer owns these host nodes.
    fn on_detach(&self, _nodes: &[HostNodeId]) {}
}

/// Shared handle to a `Lifecycle` implementation.
#[derive(Clone)]
pub struct Hooks(Rc<dyn Lifecycle>);

impl Hooks {
    pub fn new(lifecycle: impl Lifecycle + 'static) -> Self {
        Self(Rc::new(lifecycle))
    }

    pub(crate) fn attach(&self, nodes: &[HostNodeId]) {
        self.0.on_attach(nodes);
    }

    pub(crate) fn detach(&self, nodes: &[HostNodeId]) {
        self.0.on_detach(nodes);
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Hooks(..)")
    }
}

/// Element attributes split into the three families the host patches separately.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes {
    pub plain: BTreeMap<SmolStr, String>,
    pub style: BTreeMap<SmolStr, String>,
    pub class: BTreeSet<SmolStr>,
}

impl Attributes {
    pub fn is_empty(&self) -> bool {
        self.plain.is_empty() && self.style.is_empty() && self.class.is_empty()
    }

    /// Total number of entries across all three families.
    pub fn len(&self) -> usize {
        self.plain.len() + self.style.len() + self.class.len()
    }
}

/// Per-object metadata: where carets land and which hooks to call.
#[derive(Clone, Debug, Default)]
pub struct RenderMeta {
    /// LocationSet: logical nodes whose caret position resolves to this object.
    pub locations: Vec<LogicalId>,
    pub hooks: Option<Hooks>,
}

/// A child slot of an element or fragment.
#[derive(Clone, Debug)]
pub enum Child {
    /// Nested render object, owned by the same logical node.
    Render(RenderObject),
    /// Placeholder: splice in the rendering of another logical node.
    Logical(LogicalId),
}

#[derive(Clone, Debug)]
pub struct ElementRender {
    pub tag: SmolStr,
    pub attrs: Attributes,
    pub children: Vec<Child>,
    pub meta: RenderMeta,
}

#[derive(Clone, Debug)]
pub struct TextRender {
    pub text: String,
    pub meta: RenderMeta,
}

#[derive(Clone, Debug)]
pub struct FragmentRender {
    pub children: Vec<Child>,
    pub meta: RenderMeta,
}

/// Marker inside a native subtree naming where a logical node is spliced in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NativeSlot {
    /// Host container inside the raw content that receives the rendering.
    pub container: HostNodeId,
    pub node: LogicalId,
}

#[derive(Clone, Debug)]
pub struct NativeRender {
    /// Pre-existing host nodes, inserted verbatim.
    pub nodes: Vec<HostNodeId>,
    pub slots: Vec<NativeSlot>,
    pub meta: RenderMeta,
}

/// Declarative description of what a logical node looks like in the host tree.
#[derive(Clone, Debug)]
pub enum RenderObject {
    Element(ElementRender),
    Text(TextRender),
    /// Groups children without a host node of its own.
    Fragment(FragmentRender),
    /// Raw host content handed through untouched.
    Native(NativeRender),
}

impl RenderObject {
    pub fn element(tag: impl Into<SmolStr>) -> Self {
        RenderObject::Element(ElementRender {
            tag: tag.into(),
            attrs: Attributes::default(),
            children: Vec::new(),
            meta: RenderMeta::default(),
        })
    }

    pub fn text(text: impl Into<String>) -> Self {
        RenderObject::Text(TextRender {
            text: text.into(),
            meta: RenderMeta::default(),
        })
    }

    pub fn fragment() -> Self {
        RenderObject::Fragment(FragmentRender {
            children: Vec::new(),
            meta: RenderMeta::default(),
        })
    }

    pub fn native(nodes: impl IntoIterator<Item = HostNodeId>) -> Self {
        RenderObject::Native(NativeRender {
            nodes: nodes.into_iter().collect(),
            slots: Vec::new(),
            meta: RenderMeta::default(),
        })
    }

    pub fn meta(&self) -> &RenderMeta {
        match self {
            RenderObject::Element(e) => &e.meta,
            RenderObject::Text(t) => &t.meta,
            RenderObject::Fragment(f) => &f.meta,
            RenderObject::Native(n) => &n.meta,
        }
    }

    fn meta_mut(&mut self) -> &mut RenderMeta {
        match self {
            RenderObject::Element(e) => &mut e.meta,
            RenderObject::Text(t) => &mut t.meta,
            RenderObject::Fragment(f) => &mut f.meta,
            RenderObject::Native(n) => &mut n.meta,
        }
    }

    /// Children for container variants; empty for text and native objects.
    pub fn children(&self) -> &[Child] {
        match self {
            RenderObject::Element(e) => &e.children,
            RenderObject::Fragment(f) => &f.children,
            RenderObject::Text(_) | RenderObject::Native(_) => &[],
        }
    }

    pub fn with_attr(mut self, key: impl Into<SmolStr>, value: impl Into<String>) -> Self {
        if let RenderObject::Element(ref mut e) = self {
            e.attrs.plain.insert(key.into(), value.into());
        }
        self
    }

    pub fn with_style(mut self, key: impl Into<SmolStr>, value: impl Into<String>) -> Self {
        if let RenderObject::Element(ref mut e) = self {
            e.attrs.style.insert(key.into(), value.into());
        }
        self
    }

    pub fn with_class(mut self, class: impl Into<SmolStr>) -> Self {
        if let RenderObject::Element(ref mut e) = self {
            e.attrs.class.insert(class.into());
        }
        self
    }

    /// Append a nested render object. No-op on text and native objects.
    pub fn with_child(mut self, child: RenderObject) -> Self {
        match self {
            RenderObject::Element(ref mut e) => e.children.push(Child::Render(child)),
            RenderObject::Fragment(ref mut f) => f.children.push(Child::Render(child)),
            RenderObject::Text(_) | RenderObject::Native(_) => {}
        }
        self
    }

    /// Append a placeholder for another logical node's rendering.
    pub fn with_logical(mut self, node: LogicalId) -> Self {
        match self {
            RenderObject::Element(ref mut e) => e.children.push(Child::Logical(node)),
            RenderObject::Fragment(ref mut f) => f.children.push(Child::Logical(node)),
            RenderObject::Text(_) | RenderObject::Native(_) => {}
        }
        self
    }

    /// Declare a slot inside native content. No-op on other variants.
    pub fn with_slot(mut self, container: HostNodeId, node: LogicalId) -> Self {
        if let RenderObject::Native(ref mut n) = self {
            n.slots.push(NativeSlot { container, node });
        }
        self
    }

    /// Add a logical node to this object's LocationSet.
    pub fn located_at(mut self, node: LogicalId) -> Self {
        let meta = self.meta_mut();
        if !meta.locations.contains(&node) {
            meta.locations.push(node);
        }
        self
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.meta_mut().hooks = Some(hooks);
        self
    }

    /// Short variant name, used in log fields.
    pub fn kind_name(&self) -> &'static str {
        match self {
            RenderObject::Element(_) => "element",
            RenderObject::Text(_) => "text",
            RenderObject::Fragment(_) => "fragment",
            RenderObject::Native(_) => "native",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn test_builders_ignore_wrong_variant() {
        let text = RenderObject::text("hi")
            .with_attr("id", "x")
            .with_child(RenderObject::text("nested"))
            .with_logical(LogicalId(1));
        match text {
            RenderObject::Text(t) => assert_eq!(t.text, "hi"),
            other => panic!("expected text, got {}", other.kind_name()),
        }
    }

    #[test]
    fn test_element_builder() {
        let el = RenderObject::element("p")
            .with_attr("id", "a")
            .with_style("color", "red")
            .with_class("quote")
            .with_child(RenderObject::text("x"))
            .with_logical(LogicalId(7))
            .located_at(LogicalId(3))
            .located_at(LogicalId(3));

        let RenderObject::Element(e) = &el else {
            panic!("expected element");
        };
        assert_eq!(e.tag, "p");
        assert_eq!(e.attrs.len(), 3);
        assert_eq!(e.children.len(), 2);
        assert!(matches!(e.children[1], Child::Logical(LogicalId(7))));
        assert_eq!(el.meta().locations, vec![LogicalId(3)]);
    }

    #[test]
    fn test_hooks_dispatch() {
        struct Counter(Rc<Cell<usize>>);
        impl Lifecycle for Counter {
            fn on_attach(&self, nodes: &[HostNodeId]) {
                self.0.set(self.0.get() + nodes.len());
            }
        }

        let count = Rc::new(Cell::new(0));
        let hooks = Hooks::new(Counter(count.clone()));
        hooks.attach(&[HostNodeId(1), HostNodeId(2)]);
        hooks.detach(&[HostNodeId(1)]);
        assert_eq!(count.get(), 2);
        assert_eq!(format!("{:?}", hooks), "Hooks(..)");
    }
}
