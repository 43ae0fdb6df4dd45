//! Similarity comparator used to match new render objects to prior records.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::MatchWeights;
use crate::registry::Content;
use crate::render::Attributes;
use crate::text::affix_ratio;
use crate::types::LogicalId;

/// The parts of a render object or record that take part in scoring.
#[derive(Clone, Copy, Debug)]
pub struct Candidate<'a> {
    pub content: &'a Content,
    pub rendered_by: &'a [LogicalId],
    pub locations: &'a [LogicalId],
}

/// Score how well `new` could reuse the record described by `old`.
///
/// Returns `0.0` when the pair can never match (different variant, or
/// different tag for elements). Otherwise the score is at least
/// `weights.base`; see `MatchWeights` for the bonuses.
pub fn similarity(weights: &MatchWeights, new: Candidate<'_>, old: Candidate<'_>) -> f64 {
    let structural = match (new.content, old.content) {
        (
            Content::Element { tag: a, attrs: x },
            Content::Element { tag: b, attrs: y },
        ) => {
            if a != b {
                return 0.0;
            }
            attribute_overlap(x, y)
        }
        (Content::Text(a), Content::Text(b)) => affix_ratio(a, b),
        (Content::Fragment, Content::Fragment) => 1.0,
        (Content::Native { nodes: a, .. }, Content::Native { nodes: b, .. }) => {
            set_overlap(a.iter(), b.iter())
        }
        _ => return 0.0,
    };

    weights.base
        + weights.attributes * structural
        + weights.logical_overlap * set_overlap(new.rendered_by.iter(), old.rendered_by.iter())
        + weights.location_overlap * set_overlap(new.locations.iter(), old.locations.iter())
}

/// Sum of the per-family overlap ratios (plain, style, class).
fn attribute_overlap(a: &Attributes, b: &Attributes) -> f64 {
    map_overlap(&a.plain, &b.plain)
        + map_overlap(&a.style, &b.style)
        + set_overlap(a.class.iter(), b.class.iter())
}

fn map_overlap<K: Ord, V: PartialEq>(a: &BTreeMap<K, V>, b: &BTreeMap<K, V>) -> f64 {
    let total = a.len().max(b.len());
    if total == 0 {
        return 1.0;
    }
    let matching = a
        .iter()
        .filter(|(k, v)| b.get(*k).is_some_and(|other| other == *v))
        .count();
    matching as f64 / total as f64
}

/// `matching / max(len_a, len_b)`, with two empty sides counting as identical.
fn set_overlap<'a, T>(a: impl Iterator<Item = &'a T>, b: impl Iterator<Item = &'a T>) -> f64
where
    T: Ord + 'a,
{
    let a: BTreeSet<&T> = a.collect();
    let b: BTreeSet<&T> = b.collect();
    let total = a.len().max(b.len());
    if total == 0 {
        return 1.0;
    }
    a.intersection(&b).count() as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HostNodeId;
    use smol_str::SmolStr;

    fn element(tag: &str, attrs: &[(&str, &str)]) -> Content {
        let mut a = Attributes::default();
        for (k, v) in attrs {
            a.plain.insert(SmolStr::new(k), v.to_string());
        }
        Content::Element {
            tag: SmolStr::new(tag),
            attrs: a,
        }
    }

    fn cand<'a>(content: &'a Content, by: &'a [LogicalId], at: &'a [LogicalId]) -> Candidate<'a> {
        Candidate {
            content,
            rendered_by: by,
            locations: at,
        }
    }

    #[test]
    fn test_tag_mismatch_scores_zero() {
        let w = MatchWeights::default();
        let p = element("p", &[]);
        let div = element("div", &[]);
        assert_eq!(similarity(&w, cand(&p, &[], &[]), cand(&div, &[], &[])), 0.0);
        let text = Content::Text("p".into());
        assert_eq!(similarity(&w, cand(&p, &[], &[]), cand(&text, &[], &[])), 0.0);
    }

    #[test]
    fn test_attributes_dominate_logical_overlap() {
        let w = MatchWeights::default();
        let new = element("a", &[("href", "x")]);
        let same_attrs = element("a", &[("href", "x")]);
        let other_attrs = element("a", &[("href", "y")]);
        let l = [LogicalId(1)];

        let by_attrs = similarity(&w, cand(&new, &[], &[]), cand(&same_attrs, &[], &[]));
        let by_logical = similarity(&w, cand(&new, &l, &[]), cand(&other_attrs, &l, &[]));
        assert!(by_attrs > by_logical);
    }

    #[test]
    fn test_logical_overlap_dominates_location_overlap() {
        let w = MatchWeights::default();
        let text = Content::Text("x".into());
        let by = [LogicalId(1)];
        let at = [LogicalId(2)];

        let by_owner = similarity(&w, cand(&text, &by, &[]), cand(&text, &by, &[LogicalId(9)]));
        let by_location = similarity(&w, cand(&text, &by, &at), cand(&text, &[LogicalId(8)], &at));
        assert!(by_owner > by_location);
    }

    #[test]
    fn test_text_uses_affix_ratio() {
        let w = MatchWeights::default();
        let a = Content::Text("hello".into());
        let b = Content::Text("hellx".into());
        let c = Content::Text("zzzzz".into());
        let close = similarity(&w, cand(&a, &[], &[]), cand(&b, &[], &[]));
        let far = similarity(&w, cand(&a, &[], &[]), cand(&c, &[], &[]));
        assert!(close > far);
        // still a valid match: text nodes are rewritten in place
        assert!(far >= w.base);
    }

    #[test]
    fn test_native_node_overlap() {
        let w = MatchWeights::default();
        let a = Content::Native {
            nodes: vec![HostNodeId(1), HostNodeId(2)],
            slots: Vec::new(),
        };
        let b = Content::Native {
            nodes: vec![HostNodeId(2), HostNodeId(3)],
            slots: Vec::new(),
        };
        let score = similarity(&w, cand(&a, &[], &[]), cand(&b, &[], &[]));
        assert_eq!(score, w.base + w.attributes * 0.5 + w.logical_overlap + w.location_overlap);
    }
}
