//! Page boundary evaluation
//!
//! Walks the laid-out pages and hit-tests the content rectangle corners
//! of each page to find its first and last document offset. The final
//! page's end is clamped to the document end.

use crate::layout::DocumentLayout;
use crate::Point;

/// The offset extent of one rendered page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBoundary {
    pub first: usize,
    pub last: usize,
}

/// Produce one boundary per rendered page, in page order
pub fn recompute_boundaries(layout: &DocumentLayout, content_width: f32, content_height: f32) -> Vec<PageBoundary> {
    let page_count = layout.page_count();
    let mut boundaries = Vec::with_capacity(page_count);

    let top_left = Point { x: 0.0, y: 0.0 };
    let bottom_right = Point {
        x: content_width,
        y: content_height,
    };

    for page in 0..page_count {
        let first = layout.hit_test(page, top_left).unwrap_or(0);
        let last = if page + 1 == page_count {
            layout.end_offset()
        } else {
            layout.hit_test(page, bottom_right).unwrap_or(first)
        };
        boundaries.push(PageBoundary {
            first,
            last: last.max(first),
        });
    }

    debug_assert!(boundaries_are_ordered(&boundaries));
    boundaries
}

/// Ordered and non-overlapping except at shared seams
pub fn boundaries_are_ordered(boundaries: &[PageBoundary]) -> bool {
    boundaries.windows(2).all(|w| w[0].last <= w[1].first)
        && boundaries.iter().all(|b| b.first <= b.last)
}
