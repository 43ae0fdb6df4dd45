//! Position mapping between logical positions and host points.

use std::collections::HashMap;

use weft_reconcile::{
    DocPosition, DocumentTree, HostNodeId, HostPoint, HostTree, LogicalId, MemoryTree, Pass,
    Reconciler, RenderObject,
};

const ROOT: LogicalId = LogicalId(0);
const P1: LogicalId = LogicalId(1);
const P2: LogicalId = LogicalId(2);
const T1: LogicalId = LogicalId(3);
const T2: LogicalId = LogicalId(4);
/// Child of P1 that has no rendering of its own.
const E: LogicalId = LogicalId(5);

struct Doc {
    children: HashMap<LogicalId, Vec<LogicalId>>,
}

impl Doc {
    fn new() -> Self {
        let children = [
            (ROOT, vec![P1, P2]),
            (P1, vec![T1, E]),
            (P2, vec![T2]),
        ]
        .into_iter()
        .collect();
        Self { children }
    }
}

impl DocumentTree for Doc {
    fn parent(&self, node: LogicalId) -> Option<LogicalId> {
        self.children
            .iter()
            .find(|(_, kids)| kids.contains(&node))
            .map(|(parent, _)| *parent)
    }

    fn children(&self, node: LogicalId) -> Vec<LogicalId> {
        self.children.get(&node).cloned().unwrap_or_default()
    }
}

struct Fixture {
    engine: Reconciler<MemoryTree>,
    doc: Doc,
    div: HostNodeId,
    p1: HostNodeId,
    hello: HostNodeId,
}

/// `<div><p>hello</p><p>world</p></div>`
fn fixture() -> Fixture {
    let (tree, mount) = MemoryTree::with_root("body");
    let engine = Reconciler::new(tree, mount, ROOT);
    engine
        .update(
            Pass::new()
                .render(
                    ROOT,
                    RenderObject::element("div")
                        .with_logical(P1)
                        .with_logical(P2),
                )
                .render(P1, RenderObject::element("p").located_at(P1).with_logical(T1))
                .render(T1, RenderObject::text("hello").located_at(T1))
                .render(P2, RenderObject::element("p").located_at(P2).with_logical(T2))
                .render(T2, RenderObject::text("world").located_at(T2)),
        )
        .unwrap();
    let div = engine.to_external(ROOT)[0];
    let p1 = engine.to_external(P1)[0];
    let hello = engine.to_external(T1)[0];
    Fixture {
        engine,
        doc: Doc::new(),
        div,
        p1,
        hello,
    }
}

// === Host to logical ===

#[test]
fn test_locate_text_offsets() {
    let f = fixture();
    assert_eq!(f.engine.locate(f.hello, 2), Some(DocPosition::inside(T1, 2)));
    assert_eq!(f.engine.locate(f.hello, 99), Some(DocPosition::inside(T1, 5)));
}

#[test]
fn test_locate_between_siblings() {
    let f = fixture();
    assert_eq!(f.engine.locate(f.div, 0), Some(DocPosition::before(P1)));
    assert_eq!(f.engine.locate(f.div, 1), Some(DocPosition::before(P2)));
    assert_eq!(f.engine.locate(f.div, 2), Some(DocPosition::after(P2)));
    assert_eq!(
        f.engine.locate(f.engine.mount(), 0),
        Some(DocPosition::before(P1))
    );
}

#[test]
fn test_locate_inside_element_descends_to_text() {
    let f = fixture();
    assert_eq!(f.engine.locate(f.p1, 0), Some(DocPosition::inside(T1, 0)));
    assert_eq!(f.engine.locate(f.p1, 1), Some(DocPosition::inside(T1, 5)));
}

#[test]
fn test_locate_untracked_node_uses_neighbours() {
    let f = fixture();
    let br = {
        let mut host = f.engine.host_mut();
        let br = host.create_element("br").unwrap();
        host.insert_before(f.p1, br, None).unwrap();
        br
    };

    assert_eq!(f.engine.locate(br, 0), Some(DocPosition::inside(T1, 5)));
    assert_eq!(f.engine.from_external(br), vec![P1]);
}

#[test]
fn test_locate_across_fragments() {
    let f = fixture();
    let tail = f.engine.host_mut().split_text(f.hello, 2).unwrap();
    assert!(f.engine.adopt_fragment(f.hello, tail));

    assert_eq!(f.engine.locate(tail, 0), Some(DocPosition::inside(T1, 2)));
    assert_eq!(f.engine.locate(tail, 1), Some(DocPosition::inside(T1, 3)));
    assert_eq!(
        f.engine.get_locations(&f.doc, DocPosition::inside(T1, 3)),
        Some(HostPoint::new(tail, 1))
    );
    assert_eq!(
        f.engine.get_locations(&f.doc, DocPosition::inside(T1, 1)),
        Some(HostPoint::new(f.hello, 1))
    );
}

#[test]
fn test_external_lookups() {
    let f = fixture();
    assert_eq!(f.engine.from_external(f.hello), vec![T1]);
    assert_eq!(f.engine.from_external(f.div), Vec::<LogicalId>::new());
    assert_eq!(f.engine.to_external(P1), vec![f.p1]);
    assert!(f.engine.to_external(E).is_empty());
}

// === Logical to host ===

#[test]
fn test_get_locations_direct() {
    let f = fixture();
    assert_eq!(
        f.engine.get_locations(&f.doc, DocPosition::inside(T1, 3)),
        Some(HostPoint::new(f.hello, 3))
    );
    assert_eq!(
        f.engine.get_locations(&f.doc, DocPosition::before(P2)),
        Some(HostPoint::new(f.div, 1))
    );
    assert_eq!(
        f.engine.get_locations(&f.doc, DocPosition::after(P2)),
        Some(HostPoint::new(f.div, 2))
    );
    assert_eq!(
        f.engine.get_locations(&f.doc, DocPosition::after(T1)),
        Some(HostPoint::new(f.hello, 5))
    );
}

#[test]
fn test_get_locations_inside_container() {
    let f = fixture();
    assert_eq!(
        f.engine.get_locations(&f.doc, DocPosition::inside(P1, 0)),
        Some(HostPoint::new(f.hello, 0))
    );
    // second child has no rendering, fall back to a child index
    assert_eq!(
        f.engine.get_locations(&f.doc, DocPosition::inside(P1, 1)),
        Some(HostPoint::new(f.p1, 1))
    );
}

#[test]
fn test_get_locations_falls_back_to_previous_sibling() {
    let f = fixture();
    assert_eq!(
        f.engine.get_locations(&f.doc, DocPosition::before(E)),
        Some(HostPoint::new(f.hello, 5))
    );
    assert_eq!(
        f.engine.get_locations(&f.doc, DocPosition::inside(LogicalId(99), 0)),
        None
    );
}

#[test]
fn test_text_positions_round_trip() {
    let f = fixture();
    for offset in 0..=5 {
        let position = DocPosition::inside(T1, offset);
        let point = f.engine.get_locations(&f.doc, position).unwrap();
        assert_eq!(f.engine.locate(point.node, point.offset), Some(position));
    }
}

#[test]
fn test_element_boundaries_round_trip() {
    let f = fixture();
    for position in [
        DocPosition::before(P1),
        DocPosition::after(P1),
        DocPosition::before(P2),
        DocPosition::after(P2),
        DocPosition::after(T1),
    ] {
        let point = f.engine.get_locations(&f.doc, position).unwrap();
        let back = f.engine.locate(point.node, point.offset).unwrap();
        assert!(
            f.engine.equivalent_positions(&f.doc, back, position),
            "{position:?} came back as {back:?}"
        );
    }
}

#[test]
fn test_end_of_node_equivalences() {
    let f = fixture();
    let same = |a: DocPosition, b: DocPosition| f.engine.equivalent_positions(&f.doc, a, b);

    assert!(same(DocPosition::after(P1), DocPosition::before(P2)));
    assert!(same(DocPosition::after(T1), DocPosition::inside(T1, 5)));
    assert!(same(DocPosition::before(T1), DocPosition::inside(T1, 0)));
    assert!(!same(DocPosition::after(T1), DocPosition::inside(T1, 4)));
    assert!(!same(DocPosition::after(P2), DocPosition::before(P1)));
    // the document-free check stays strict
    assert!(!DocPosition::after(P1).is_equivalent(&DocPosition::before(P2)));
}
