//! Longest-common-affix text patching across fragmented text nodes.
//!
//! Host editors split a text run into several adjacent text nodes while the
//! user types. The engine treats those nodes as fragments of one record and
//! rewrites only the span between the common prefix and common suffix.

use std::ops::Range;

/// Common prefix and suffix of two strings, in chars.
///
/// The suffix never overlaps the prefix on either side.
pub fn common_affix(old: &str, new: &str) -> (usize, usize) {
    let prefix = old
        .chars()
        .zip(new.chars())
        .take_while(|(a, b)| a == b)
        .count();
    let old_len = old.chars().count();
    let new_len = new.chars().count();
    let max_suffix = old_len.min(new_len) - prefix;
    let suffix = old
        .chars()
        .rev()
        .zip(new.chars().rev())
        .take(max_suffix)
        .take_while(|(a, b)| a == b)
        .count();
    (prefix, suffix)
}

/// Fraction of the longer string covered by the common affix, in `0.0..=1.0`.
pub fn affix_ratio(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    let (prefix, suffix) = common_affix(a, b);
    (prefix + suffix) as f64 / longest as f64
}

/// One host write needed to turn the fragments' text into the new text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FragmentEdit {
    /// Replace a char range inside fragment `index`.
    Replace {
        index: usize,
        range: Range<usize>,
        text: String,
    },
    /// Fragment `index` ends up empty and is dropped.
    Remove { index: usize },
}

/// Plan the minimal edits turning `fragments` (in order) into `new`.
///
/// Only the changed middle span is touched. Deletions spanning several
/// fragments trim each one; the inserted text lands in the first fragment
/// the span touches (a pure insertion on a boundary extends the fragment
/// before it). Fragments left empty are removed instead of rewritten.
/// An empty fragment list yields no edits: the caller creates a node.
pub fn plan_fragments(fragments: &[&str], new: &str) -> Vec<FragmentEdit> {
    if fragments.is_empty() {
        return Vec::new();
    }
    let old: String = fragments.concat();
    let old_len = old.chars().count();
    let new_len = new.chars().count();
    let (prefix, suffix) = common_affix(&old, new);

    let start = prefix;
    let end = old_len - suffix;
    let insert: String = new.chars().skip(prefix).take(new_len - prefix - suffix).collect();

    let lens: Vec<usize> = fragments.iter().map(|f| f.chars().count()).collect();
    let target = target_fragment(&lens, start, end);

    let mut edits = Vec::new();
    let mut offset = 0;
    for (index, len) in lens.iter().copied().enumerate() {
        let frag_start = offset;
        let frag_end = offset + len;
        offset = frag_end;

        let cut_start = start.max(frag_start).min(frag_end);
        let cut_end = end.min(frag_end).max(cut_start);
        let cut = cut_start - frag_start..cut_end - frag_start;
        let text = if index == target { insert.as_str() } else { "" };

        let remaining = len - cut.len() + text.chars().count();
        if remaining == 0 {
            edits.push(FragmentEdit::Remove { index });
        } else if !cut.is_empty() || !text.is_empty() {
            edits.push(FragmentEdit::Replace {
                index,
                range: cut,
                text: text.to_string(),
            });
        }
    }
    edits
}

fn target_fragment(lens: &[usize], start: usize, end: usize) -> usize {
    let mut offset = 0;
    for (index, len) in lens.iter().copied().enumerate() {
        let frag_end = offset + len;
        let hit = if start == end {
            start <= frag_end
        } else {
            start < frag_end
        };
        if hit {
            return index;
        }
        offset = frag_end;
    }
    lens.len().saturating_sub(1)
}

/// Locate a char offset across fragments: `(fragment index, local offset)`.
///
/// Offsets on a boundary resolve to the start of the following fragment,
/// except at the very end, which resolves to the end of the last fragment.
pub fn split_offset(lens: &[usize], offset: usize) -> Option<(usize, usize)> {
    let mut start = 0;
    for (index, len) in lens.iter().copied().enumerate() {
        if offset < start + len {
            return Some((index, offset - start));
        }
        start += len;
    }
    let last = lens.len().checked_sub(1)?;
    Some((last, lens[last].min(offset.saturating_sub(start - lens[last]))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_affix() {
        assert_eq!(common_affix("hello", "hello"), (5, 0));
        assert_eq!(common_affix("hello", "help"), (3, 0));
        assert_eq!(common_affix("abc", "xbc"), (0, 2));
        assert_eq!(common_affix("aa aa aa aa", "aa bb aa aa"), (3, 6));
        // suffix must not reuse prefix chars
        assert_eq!(common_affix("aaa", "aa"), (2, 0));
        assert_eq!(common_affix("", "x"), (0, 0));
    }

    #[test]
    fn test_affix_ratio() {
        assert_eq!(affix_ratio("", ""), 1.0);
        assert_eq!(affix_ratio("abcd", "abcd"), 1.0);
        assert_eq!(affix_ratio("abcd", "xyzw"), 0.0);
        assert_eq!(affix_ratio("abcd", "abxd"), 0.75);
    }

    #[test]
    fn test_single_fragment_edit() {
        assert_eq!(
            plan_fragments(&["hello world"], "hello rust"),
            vec![FragmentEdit::Replace {
                index: 0,
                range: 6..11,
                text: "rust".to_string()
            }]
        );
    }

    #[test]
    fn test_unchanged_text_has_no_edits() {
        assert!(plan_fragments(&["ab", "cd"], "abcd").is_empty());
    }

    #[test]
    fn test_middle_fragment_only() {
        let edits = plan_fragments(&["aa ", "aa ", "aa ", "aa"], "aa bb aa aa");
        assert_eq!(
            edits,
            vec![FragmentEdit::Replace {
                index: 1,
                range: 0..2,
                text: "bb".to_string()
            }]
        );
    }

    #[test]
    fn test_deletion_across_fragments() {
        let edits = plan_fragments(&["abc", "def", "ghi"], "abi");
        assert_eq!(
            edits,
            vec![
                FragmentEdit::Replace {
                    index: 0,
                    range: 2..3,
                    text: String::new()
                },
                FragmentEdit::Remove { index: 1 },
                FragmentEdit::Replace {
                    index: 2,
                    range: 0..2,
                    text: String::new()
                },
            ]
        );
    }

    #[test]
    fn test_insertion_on_boundary_extends_previous() {
        let edits = plan_fragments(&["ab", "cd"], "abXcd");
        assert_eq!(
            edits,
            vec![FragmentEdit::Replace {
                index: 0,
                range: 2..2,
                text: "X".to_string()
            }]
        );
    }

    #[test]
    fn test_clearing_removes_everything() {
        assert_eq!(
            plan_fragments(&["ab", "cd"], ""),
            vec![FragmentEdit::Remove { index: 0 }, FragmentEdit::Remove { index: 1 }]
        );
    }

    #[test]
    fn test_split_offset() {
        let lens = [3, 3, 2];
        assert_eq!(split_offset(&lens, 0), Some((0, 0)));
        assert_eq!(split_offset(&lens, 3), Some((1, 0)));
        assert_eq!(split_offset(&lens, 7), Some((2, 1)));
        assert_eq!(split_offset(&lens, 8), Some((2, 2)));
        assert_eq!(split_offset(&lens, 20), Some((2, 2)));
        assert_eq!(split_offset(&[], 0), None);
    }
}
