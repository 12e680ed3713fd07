//! Identifier comparison and ordering
//!
//! Orders identifiers by document position so annotations and reading
//! locations can be sorted. Steps compare by child ordinal, then by
//! the character offset of their sub-location; ID anchors and the
//! spatial/temporal fields carry no ordering meaning.

use std::cmp::Ordering;

use crate::types::{Identifier, Part, Step};

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_sequences(&self.parts, &other.parts)
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Part {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_sequences(&self.steps, &other.steps)
    }
}

impl PartialOrd for Part {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Step {
    fn cmp(&self, other: &Self) -> Ordering {
        // an absent index sorts like index zero
        let index_cmp = self
            .node_index
            .unwrap_or(0)
            .cmp(&other.node_index.unwrap_or(0));
        if index_cmp != Ordering::Equal {
            return index_cmp;
        }

        let offset = |step: &Step| step.sub_location.as_ref().and_then(|s| s.offset);
        offset(self).cmp(&offset(other))
    }
}

impl PartialOrd for Step {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compare two step or part sequences element-wise; when one is a
/// prefix of the other, the longer (deeper) one comes after
fn compare_sequences<T: Ord>(a: &[T], b: &[T]) -> Ordering {
    for (item_a, item_b) in a.iter().zip(b.iter()) {
        let cmp = item_a.cmp(item_b);
        if cmp != Ordering::Equal {
            return cmp;
        }
    }
    a.len().cmp(&b.len())
}

/// Whether `a` comes before `b` in document order
pub fn is_before(a: &Identifier, b: &Identifier) -> bool {
    a < b
}

/// Whether `a` comes after `b` in document order
pub fn is_after(a: &Identifier, b: &Identifier) -> bool {
    a > b
}

/// Whether an identifier falls within an inclusive range
pub fn is_in_range(id: &Identifier, start: &Identifier, end: &Identifier) -> bool {
    id >= start && id <= end
}

/// Compare two identifier strings, or `None` if either fails to parse
pub fn compare_identifier_strings(a: &str, b: &str) -> Option<Ordering> {
    let id_a = crate::parser::parse(a).ok()?;
    let id_b = crate::parser::parse(b).ok()?;
    Some(id_a.cmp(&id_b))
}
