//! Matching new render objects against prior records and planning diffs.
//!
//! Planning runs entirely against the registry: it decides which record each
//! new render object becomes, commits the new record contents and links, and
//! releases every record no longer reachable from the document root. No host
//! writes happen here; the applier consumes the resulting `Plan`.

use std::collections::{HashMap, HashSet};

use indexmap::{IndexMap, IndexSet};
use smol_str::SmolStr;

use crate::config::MatchWeights;
use crate::registry::{Content, Record, Registry};
use crate::render::{Attributes, Child, Hooks, RenderObject};
use crate::score::{Candidate, similarity};
use crate::types::{HostNodeId, LogicalId, RecordId};

/// Child slot of a flattened render object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlatChild {
    /// Index of a nested object in the same flattened list.
    Object(usize),
    /// Placeholder for another logical node's rendering.
    Logical(LogicalId),
}

/// One render object with its subtree replaced by indexes.
#[derive(Clone, Debug)]
pub struct FlatObject {
    pub content: Content,
    pub parent: Option<usize>,
    pub children: Vec<FlatChild>,
    pub rendered_by: Vec<LogicalId>,
    pub locations: Vec<LogicalId>,
    pub hooks: Option<Hooks>,
    /// Text of the object and its nested objects, used to break score ties.
    pub text: String,
}

/// Flatten a rendering in pre-order, walking through fragments and elements.
///
/// Native slots become placeholder children of the native object.
pub fn flatten(owner: LogicalId, root: &RenderObject) -> Vec<FlatObject> {
    let mut out = Vec::new();
    push_flat(owner, root, None, &mut out);
    out
}

fn push_flat(
    owner: LogicalId,
    object: &RenderObject,
    parent: Option<usize>,
    out: &mut Vec<FlatObject>,
) -> usize {
    let index = out.len();
    let meta = object.meta();
    out.push(FlatObject {
        content: Content::of(object),
        parent,
        children: Vec::new(),
        rendered_by: Vec::new(),
        locations: meta.locations.clone(),
        hooks: meta.hooks.clone(),
        text: String::new(),
    });

    let mut children = Vec::new();
    let mut rendered_by = vec![owner];
    if let RenderObject::Native(native) = object {
        for slot in &native.slots {
            children.push(FlatChild::Logical(slot.node));
            push_unique(&mut rendered_by, slot.node);
        }
    }
    for child in object.children() {
        match child {
            Child::Render(nested) => {
                let nested = push_flat(owner, nested, Some(index), out);
                children.push(FlatChild::Object(nested));
            }
            Child::Logical(node) => {
                children.push(FlatChild::Logical(*node));
                push_unique(&mut rendered_by, *node);
            }
        }
    }
    for location in &meta.locations {
        push_unique(&mut rendered_by, *location);
    }

    let text = match object {
        RenderObject::Text(t) => t.text.clone(),
        _ => children
            .iter()
            .filter_map(|c| match c {
                FlatChild::Object(i) => Some(out[*i].text.as_str()),
                FlatChild::Logical(_) => None,
            })
            .collect(),
    };

    let flat = &mut out[index];
    flat.children = children;
    flat.rendered_by = rendered_by;
    flat.text = text;
    index
}

fn push_unique(list: &mut Vec<LogicalId>, node: LogicalId) {
    if !list.contains(&node) {
        list.push(node);
    }
}

/// A prior record competing for the new objects of one rendering.
#[derive(Clone, Copy, Debug)]
pub struct PoolEntry<'a> {
    pub record: &'a Record,
    pub text: &'a str,
}

/// Greedy best-first assignment of prior records to new objects.
///
/// Pairs are ranked by similarity, then by text affinity, then by pre-order
/// position, so an object inserted before matched content does not steal the
/// record of the identical sibling that follows it. Each record and each
/// object is used at most once.
pub fn assign(
    weights: &MatchWeights,
    flat: &[FlatObject],
    pool: &[PoolEntry<'_>],
) -> Vec<Option<RecordId>> {
    let mut pairs = Vec::new();
    for (i, object) in flat.iter().enumerate() {
        let new = Candidate {
            content: &object.content,
            rendered_by: &object.rendered_by,
            locations: &object.locations,
        };
        for (j, entry) in pool.iter().enumerate() {
            let old = Candidate {
                content: &entry.record.content,
                rendered_by: &entry.record.rendered_by,
                locations: &entry.record.locations,
            };
            let score = similarity(weights, new, old);
            if score > 0.0 {
                let affinity = crate::text::affix_ratio(&object.text, entry.text);
                pairs.push((score, affinity, i, j));
            }
        }
    }
    pairs.sort_by(|a, b| {
        b.0.total_cmp(&a.0)
            .then(b.1.total_cmp(&a.1))
            .then(a.2.cmp(&b.2))
            .then(a.3.cmp(&b.3))
    });

    let mut assigned = vec![None; flat.len()];
    let mut used = vec![false; pool.len()];
    for (_, _, i, j) in pairs {
        if assigned[i].is_some() || used[j] {
            continue;
        }
        assigned[i] = Some(pool[j].record.id);
        used[j] = true;
    }
    assigned
}

/// Surgical attribute changes, applied removals first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttrDelta {
    pub remove_plain: Vec<SmolStr>,
    pub set_plain: Vec<(SmolStr, String)>,
    pub remove_style: Vec<SmolStr>,
    pub set_style: Vec<(SmolStr, String)>,
    pub remove_class: Vec<SmolStr>,
    pub add_class: Vec<SmolStr>,
}

impl AttrDelta {
    pub fn between(old: &Attributes, new: &Attributes) -> Self {
        Self {
            remove_plain: old
                .plain
                .keys()
                .filter(|k| !new.plain.contains_key(*k))
                .cloned()
                .collect(),
            set_plain: new
                .plain
                .iter()
                .filter(|(k, v)| old.plain.get(*k) != Some(*v))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            remove_style: old
                .style
                .keys()
                .filter(|k| !new.style.contains_key(*k))
                .cloned()
                .collect(),
            set_style: new
                .style
                .iter()
                .filter(|(k, v)| old.style.get(*k) != Some(*v))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            remove_class: old.class.difference(&new.class).cloned().collect(),
            add_class: new.class.difference(&old.class).cloned().collect(),
        }
    }

    /// Every entry of `attrs`, for freshly created elements.
    pub fn full(attrs: &Attributes) -> Self {
        Self::between(&Attributes::default(), attrs)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        self.remove_plain.len()
            + self.set_plain.len()
            + self.remove_style.len()
            + self.set_style.len()
            + self.remove_class.len()
            + self.add_class.len()
    }
}

/// Pending change for one record.
///
/// A diff only covers nodes the record keeps or gains. Host nodes it loses
/// are not listed here: released records carry theirs in `Plan::released`,
/// and the applier pools nodes dropped by a redraw or a changed native list
/// as orphans, removing whatever is not reclaimed once layout is done.
#[derive(Clone, Debug, PartialEq)]
pub struct Diff {
    pub record: RecordId,
    /// The record did not exist before this pass.
    pub created: bool,
    /// Replace the record's host nodes instead of patching them.
    pub force_redraw: bool,
    pub attrs: AttrDelta,
    pub removed_children: Vec<RecordId>,
}

impl Diff {
    fn touch(record: RecordId) -> Self {
        Self {
            record,
            created: false,
            force_redraw: false,
            attrs: AttrDelta::default(),
            removed_children: Vec::new(),
        }
    }
}

/// Outcome of the planning phase.
#[derive(Debug, Default)]
pub struct Plan {
    pub diffs: Vec<Diff>,
    /// Records dropped from the registry, with the host nodes they held.
    pub released: Vec<Record>,
    pub rendered: usize,
    pub created: usize,
    pub unchanged: usize,
}

/// Inputs of one pass, borrowed from the caller's `Pass`.
pub struct PlanInput<'a> {
    pub root: LogicalId,
    pub invalidated: &'a IndexSet<LogicalId>,
    pub renderings: &'a IndexMap<LogicalId, RenderObject>,
    pub force_redraw: &'a HashSet<HostNodeId>,
}

struct Staged {
    owner: LogicalId,
    flat: Vec<FlatObject>,
    ids: Vec<RecordId>,
    created: Vec<bool>,
}

struct Prior {
    content: Content,
    children: Vec<RecordId>,
}

/// Match, commit and release. See the module docs.
pub fn plan(reg: &mut Registry, weights: &MatchWeights, input: PlanInput<'_>) -> Plan {
    let mut plan = Plan::default();

    // 1. Match each rendering against the records of its previous rendering.
    let mut staged = Vec::new();
    let mut to_remove = Vec::new();
    for node in input.invalidated {
        let Some(object) = input.renderings.get(node) else {
            match reg.root_of(*node) {
                Some(record) => tracing::error!(
                    target: "weft::diff",
                    node = %node,
                    record = %record,
                    "missing rendering for invalidated node, reusing prior record"
                ),
                None => tracing::debug!(
                    target: "weft::diff",
                    node = %node,
                    "invalidated node has neither a rendering nor a record"
                ),
            }
            continue;
        };

        let flat = flatten(*node, object);
        let pool_ids = pool_in_order(reg, *node);
        let texts: Vec<String> = pool_ids.iter().map(|id| record_text(reg, *id)).collect();
        let pool: Vec<PoolEntry<'_>> = pool_ids
            .iter()
            .zip(&texts)
            .filter_map(|(id, text)| reg.get(*id).map(|record| PoolEntry { record, text }))
            .collect();
        let matches = assign(weights, &flat, &pool);

        let matched: HashSet<RecordId> = matches.iter().flatten().copied().collect();
        to_remove.extend(pool_ids.iter().copied().filter(|id| !matched.contains(id)));

        let mut ids = Vec::with_capacity(flat.len());
        let mut created = Vec::with_capacity(flat.len());
        for (i, m) in matches.into_iter().enumerate() {
            let id = match m {
                Some(id) => id,
                None => reg.alloc_id(),
            };
            tracing::trace!(
                target: "weft::diff",
                node = %node,
                object = i,
                record = %id,
                reused = m.is_some(),
                "matched render object"
            );
            ids.push(id);
            created.push(m.is_none());
        }
        staged.push(Staged {
            owner: *node,
            flat,
            ids,
            created,
        });
    }

    let staged_ids: HashSet<RecordId> = staged.iter().flat_map(|s| s.ids.iter().copied()).collect();
    let staged_roots: IndexMap<LogicalId, RecordId> =
        staged.iter().map(|s| (s.owner, s.ids[0])).collect();

    // Prior state, captured before anything is committed.
    let mut prior: IndexMap<RecordId, Prior> = IndexMap::new();
    for s in &staged {
        for (i, id) in s.ids.iter().enumerate() {
            if s.created[i] {
                continue;
            }
            if let Some(record) = reg.get(*id) {
                prior.insert(
                    *id,
                    Prior {
                        content: record.content.clone(),
                        children: record.children.clone(),
                    },
                );
            }
        }
    }
    let old_roots: IndexMap<LogicalId, (Option<RecordId>, Option<RecordId>)> = staged
        .iter()
        .map(|s| {
            let root = reg.root_of(s.owner);
            let parent = root.and_then(|r| reg.get(r)).and_then(|r| r.parent);
            (s.owner, (root, parent))
        })
        .collect();

    // 2. Resolve children, including placeholders.
    let mut new_parent: IndexMap<RecordId, RecordId> = IndexMap::new();
    let mut resolved: Vec<Vec<Vec<RecordId>>> = Vec::with_capacity(staged.len());
    for s in &staged {
        let mut per_object = Vec::with_capacity(s.flat.len());
        for (i, object) in s.flat.iter().enumerate() {
            let parent = s.ids[i];
            let mut kids = Vec::with_capacity(object.children.len());
            for child in &object.children {
                let id = match child {
                    FlatChild::Object(j) => Some(s.ids[*j]),
                    FlatChild::Logical(m) if *m == s.owner => {
                        tracing::warn!(
                            target: "weft::diff",
                            node = %m,
                            "rendering references itself, skipping placeholder"
                        );
                        None
                    }
                    FlatChild::Logical(m) => {
                        let id = staged_roots.get(m).copied().or_else(|| reg.root_of(*m));
                        if id.is_none() {
                            tracing::error!(
                                target: "weft::diff",
                                node = %m,
                                parent = %s.owner,
                                "placeholder names a node with no rendering, skipping"
                            );
                        }
                        id
                    }
                };
                let Some(id) = id else { continue };
                if new_parent.contains_key(&id) {
                    tracing::warn!(
                        target: "weft::diff",
                        record = %id,
                        "record placed twice in one pass, keeping first placement"
                    );
                    continue;
                }
                new_parent.insert(id, parent);
                kids.push(id);
            }
            per_object.push(kids);
        }
        resolved.push(per_object);
    }

    let prior_parent: HashMap<RecordId, RecordId> = new_parent
        .keys()
        .filter_map(|child| Some((*child, reg.get(*child)?.parent?)))
        .collect();

    // 3. Commit new record contents.
    for (s, kids) in staged.iter().zip(resolved) {
        for ((i, object), children) in s.flat.iter().enumerate().zip(kids) {
            let id = s.ids[i];
            let (host_nodes, container) = reg
                .get(id)
                .map(|r| (r.host_nodes.clone(), r.container))
                .unwrap_or_default();
            let mut record = Record::new(id, s.owner, object.content.clone());
            record.parent = new_parent.get(&id).copied();
            record.children = children;
            record.host_nodes = host_nodes;
            record.container = container;
            record.rendered_by = object.rendered_by.clone();
            record.locations = object.locations.clone();
            record.hooks = object.hooks.clone();
            reg.associate(record);
        }
    }

    // Roots: attach, cascade into the previous parent, or give up.
    let mut touched: IndexSet<RecordId> = IndexSet::new();
    let mut dangling = Vec::new();
    for (owner, root) in &staged_roots {
        let (old_root, old_parent) = old_roots.get(owner).copied().unwrap_or_default();
        reg.set_root(*owner, *root);
        if new_parent.contains_key(root) || *owner == input.root {
            continue;
        }
        match (old_root, old_parent) {
            (Some(old_root), Some(q)) if !staged_ids.contains(&q) && reg.contains(q) => {
                if let Some(parent) = reg.get_mut(q) {
                    for child in parent.children.iter_mut() {
                        if *child == old_root {
                            *child = *root;
                        }
                    }
                    if !parent.children.contains(root) {
                        tracing::warn!(
                            target: "weft::diff",
                            parent = %q,
                            record = %root,
                            "parent lost track of child root, appending"
                        );
                        parent.children.push(*root);
                    }
                }
                if let Some(record) = reg.get_mut(*root) {
                    record.parent = Some(q);
                }
                if old_root != *root {
                    tracing::trace!(
                        target: "weft::diff",
                        node = %owner,
                        parent = %q,
                        old = %old_root,
                        new = %root,
                        "root record replaced, cascading into parent"
                    );
                    touched.insert(q);
                }
            }
            _ => {
                tracing::warn!(
                    target: "weft::diff",
                    node = %owner,
                    "rendered node is not placed anywhere, releasing its records"
                );
                dangling.push(*root);
            }
        }
    }

    // Records moving away from a parent that was not re-rendered.
    for (child, parent) in &new_parent {
        if let Some(q) = prior_parent.get(child).copied()
            && q != *parent
            && !staged_ids.contains(&q)
            && let Some(record) = reg.get_mut(q)
            && record.children.contains(child)
        {
            record.children.retain(|c| c != child);
            touched.insert(q);
        }
        if !staged_ids.contains(child)
            && let Some(record) = reg.get_mut(*child)
        {
            record.parent = Some(*parent);
        }
    }

    // 4. Release everything that fell out of the tree.
    let mut candidates: Vec<RecordId> = to_remove;
    for (id, before) in &prior {
        if let Some(record) = reg.get(*id) {
            candidates.extend(
                before
                    .children
                    .iter()
                    .filter(|c| !record.children.contains(c))
                    .copied(),
            );
        }
    }
    candidates.extend(dangling);
    let live_root = reg.root_of(input.root);
    for candidate in candidates {
        if reg.contains(candidate) && !is_attached(reg, candidate, live_root) {
            release_subtree(reg, candidate, &mut plan.released);
        }
    }

    // 5. Diffs for surviving staged records.
    for s in &staged {
        plan.rendered += 1;
        for (i, id) in s.ids.iter().enumerate() {
            let Some(record) = reg.get(*id) else {
                continue;
            };
            let force = record
                .host_nodes
                .iter()
                .any(|n| input.force_redraw.contains(n));
            if s.created[i] {
                plan.created += 1;
                let attrs = match &record.content {
                    Content::Element { attrs, .. } => AttrDelta::full(attrs),
                    _ => AttrDelta::default(),
                };
                plan.diffs.push(Diff {
                    record: *id,
                    created: true,
                    force_redraw: false,
                    attrs,
                    removed_children: Vec::new(),
                });
                continue;
            }
            let Some(before) = prior.get(id) else {
                continue;
            };
            let unchanged = before.content == record.content && before.children == record.children;
            if unchanged && !force && !touched.contains(id) {
                plan.unchanged += 1;
                continue;
            }
            let attrs = match (&before.content, &record.content) {
                (Content::Element { attrs: old, .. }, Content::Element { attrs: new, .. }) => {
                    AttrDelta::between(old, new)
                }
                _ => AttrDelta::default(),
            };
            plan.diffs.push(Diff {
                record: *id,
                created: false,
                force_redraw: force,
                attrs,
                removed_children: before
                    .children
                    .iter()
                    .filter(|c| !record.children.contains(c))
                    .copied()
                    .collect(),
            });
        }
    }

    // Parents rewritten by cascades or moves, and forced records outside the pass.
    let mut seen: HashSet<RecordId> = plan.diffs.iter().map(|d| d.record).collect();
    for id in touched {
        if reg.contains(id) && seen.insert(id) {
            plan.diffs.push(Diff::touch(id));
        }
    }
    for node in input.force_redraw {
        if let Some(id) = reg.record_for_host(*node)
            && seen.insert(id)
        {
            let mut diff = Diff::touch(id);
            diff.force_redraw = true;
            plan.diffs.push(diff);
        }
    }

    tracing::debug!(
        target: "weft::diff",
        rendered = plan.rendered,
        created = plan.created,
        unchanged = plan.unchanged,
        diffs = plan.diffs.len(),
        released = plan.released.len(),
        "planned pass"
    );
    plan
}

/// Prior records of `owner` in the pre-order of its last rendering.
fn pool_in_order(reg: &Registry, owner: LogicalId) -> Vec<RecordId> {
    let mut out = Vec::new();
    if let Some(root) = reg.root_of(owner) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(record) = reg.get(id) else { continue };
            if record.owner != owner || out.contains(&id) {
                continue;
            }
            out.push(id);
            stack.extend(record.children.iter().rev().copied());
        }
    }
    for id in reg.owned_by(owner) {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    out
}

/// Text of a record and its same-owner descendants.
fn record_text(reg: &Registry, id: RecordId) -> String {
    let mut out = String::new();
    let mut stack = vec![id];
    let owner = reg.get(id).map(|r| r.owner);
    while let Some(id) = stack.pop() {
        let Some(record) = reg.get(id) else { continue };
        if Some(record.owner) != owner {
            continue;
        }
        match &record.content {
            Content::Text(text) => out.push_str(text),
            _ => stack.extend(record.children.iter().rev().copied()),
        }
    }
    out
}

/// Whether a record hangs off the document root through consistent links.
fn is_attached(reg: &Registry, id: RecordId, live_root: Option<RecordId>) -> bool {
    let mut current = id;
    for _ in 0..=reg.len() {
        let Some(record) = reg.get(current) else {
            return false;
        };
        match record.parent {
            None => return Some(current) == live_root,
            Some(parent) => {
                let linked = reg
                    .get(parent)
                    .is_some_and(|p| p.children.contains(&current));
                if !linked {
                    return false;
                }
                current = parent;
            }
        }
    }
    false
}

/// Release a record and every descendant still pointing at it.
fn release_subtree(reg: &mut Registry, id: RecordId, out: &mut Vec<Record>) {
    let mut stack = vec![id];
    while let Some(id) = stack.pop() {
        let Some(record) = reg.release(id) else {
            continue;
        };
        tracing::trace!(
            target: "weft::diff",
            record = %id,
            owner = %record.owner,
            "released record"
        );
        for child in record.children.iter().rev() {
            if reg.get(*child).is_some_and(|c| c.parent == Some(id)) {
                stack.push(*child);
            }
        }
        out.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_preorder_through_fragments() {
        let object = RenderObject::element("div")
            .with_child(
                RenderObject::fragment()
                    .with_child(RenderObject::text("a"))
                    .with_logical(LogicalId(5)),
            )
            .with_child(RenderObject::text("b"));
        let flat = flatten(LogicalId(1), &object);

        assert_eq!(flat.len(), 4);
        assert_eq!(flat[0].children, vec![FlatChild::Object(1), FlatChild::Object(3)]);
        assert_eq!(flat[1].content, Content::Fragment);
        assert_eq!(flat[1].children, vec![FlatChild::Object(2), FlatChild::Logical(LogicalId(5))]);
        assert_eq!(flat[1].rendered_by, vec![LogicalId(1), LogicalId(5)]);
        assert_eq!(flat[2].parent, Some(1));
        assert_eq!(flat[0].text, "ab");
    }

    #[test]
    fn test_flatten_native_slots() {
        let object = RenderObject::native([HostNodeId(9)]).with_slot(HostNodeId(10), LogicalId(4));
        let flat = flatten(LogicalId(1), &object);
        assert_eq!(flat[0].children, vec![FlatChild::Logical(LogicalId(4))]);
    }

    #[test]
    fn test_attr_delta() {
        let old = Attributes {
            plain: [("id".into(), "a".to_string()), ("title".into(), "t".to_string())].into(),
            style: [("color".into(), "red".to_string())].into(),
            class: ["x".into(), "y".into()].into(),
        };
        let new = Attributes {
            plain: [("id".into(), "b".to_string()), ("title".into(), "t".to_string())].into(),
            style: Default::default(),
            class: ["y".into(), "z".into()].into(),
        };
        let delta = AttrDelta::between(&old, &new);
        assert_eq!(delta.remove_plain, Vec::<SmolStr>::new());
        assert_eq!(delta.set_plain, vec![(SmolStr::new("id"), "b".to_string())]);
        assert_eq!(delta.remove_style, vec![SmolStr::new("color")]);
        assert_eq!(delta.remove_class, vec![SmolStr::new("x")]);
        assert_eq!(delta.add_class, vec![SmolStr::new("z")]);
        assert_eq!(delta.len(), 4);
        assert!(AttrDelta::between(&new, &new).is_empty());
    }

    fn record(id: u32, content: Content) -> Record {
        let mut r = Record::new(RecordId(id), LogicalId(1), content);
        r.rendered_by = vec![LogicalId(1)];
        r
    }

    #[test]
    fn test_inserted_sibling_does_not_steal_match() {
        let w = MatchWeights::default();
        let old_p = record(0, Content::Element {
            tag: "p".into(),
            attrs: Attributes::default(),
        });
        let pool = [PoolEntry {
            record: &old_p,
            text: "kept",
        }];
        let object = RenderObject::fragment()
            .with_child(RenderObject::element("p").with_child(RenderObject::text("new")))
            .with_child(RenderObject::element("p").with_child(RenderObject::text("kept")));
        let flat = flatten(LogicalId(1), &object);
        let assigned = assign(&w, &flat, &pool);

        // fragment, p(new), "new", p(kept), "kept"
        assert_eq!(assigned, vec![None, None, None, Some(RecordId(0)), None]);
    }

    #[test]
    fn test_assign_prefers_higher_score() {
        let w = MatchWeights::default();
        let a = record(0, Content::Text("hello".into()));
        let b = record(1, Content::Text("world".into()));
        let pool = [
            PoolEntry {
                record: &a,
                text: "hello",
            },
            PoolEntry {
                record: &b,
                text: "world",
            },
        ];
        let object = RenderObject::fragment()
            .with_child(RenderObject::text("world!"))
            .with_child(RenderObject::text("hello"));
        let flat = flatten(LogicalId(1), &object);
        let assigned = assign(&w, &flat, &pool);
        assert_eq!(assigned, vec![None, Some(RecordId(1)), Some(RecordId(0))]);
    }
}
