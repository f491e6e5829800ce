//! Index ordering for document summaries.

use std::cmp::Ordering;

use crate::document::DocumentSummary;

/// Return summaries in index order.
///
/// Documents with an `order` come first, ascending. Ties and documents
/// without an `order` fall back to title, then identifier. The pipeline
/// itself returns enumeration order; callers opt into this ordering.
#[must_use]
pub fn sorted_for_index(summaries: &[DocumentSummary]) -> Vec<DocumentSummary> {
    let mut sorted = summaries.to_vec();
    sorted.sort_by(compare);
    sorted
}

fn compare(a: &DocumentSummary, b: &DocumentSummary) -> Ordering {
    let by_order = match (a.order, b.order) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_order
        .then_with(|| a.title.cmp(&b.title))
        .then_with(|| a.id.cmp(&b.id))
}
