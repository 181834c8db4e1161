//! Cursor-to-page lookup over the boundary list

use smallvec::SmallVec;

use crate::document::DocRange;
use crate::pagination::PageBoundary;

/// Containment slack at page seams. Boundary hit-testing rounds at page
/// edges, so an offset sitting exactly on a seam matches the later page.
pub const SEAM_TOLERANCE: usize = 1;

/// One page break inside an element: (offset within the element's
/// cursor space, 1-based page number)
pub type PageBreak = (usize, usize);

/// Find the 1-based page containing `offset`.
///
/// Falls back to `fallback_page_count` when no boundary matches (stale
/// boundaries mid-recompute). Returns 0 when the list is empty.
pub fn locate_page(offset: usize, boundaries: &[PageBoundary], fallback_page_count: usize) -> usize {
    if boundaries.is_empty() {
        return 0;
    }
    for (index, boundary) in boundaries.iter().enumerate() {
        if offset + SEAM_TOLERANCE >= boundary.first && offset < boundary.last {
            return index + 1;
        }
    }
    fallback_page_count
}

/// Every page boundary falling inside an element's segment range.
///
/// Reported offsets are relative to the element's cursor space, which
/// starts after the heading sub-region at `body_start`; the heading start
/// itself still counts as a possible break point. The first element of
/// the document always reports a break for page 1 at offset 0.
pub fn page_breaks_in(
    range: DocRange,
    body_start: usize,
    is_first_element: bool,
    boundaries: &[PageBoundary],
) -> SmallVec<[PageBreak; 4]> {
    let mut breaks: SmallVec<[PageBreak; 4]> = SmallVec::new();

    if is_first_element && !boundaries.is_empty() {
        breaks.push((0, 1));
    }

    for (index, boundary) in boundaries.iter().enumerate() {
        if boundary.first <= range.first || boundary.first >= range.last {
            continue;
        }
        let offset = boundary.first.saturating_sub(body_start);
        let page = index + 1;
        if breaks.last() != Some(&(offset, page)) {
            breaks.push((offset, page));
        }
    }

    breaks
}
