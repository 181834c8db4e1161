//! Pagination: page boundary evaluation and cursor-to-page lookup

mod boundary;
mod locator;

pub use boundary::{boundaries_are_ordered, recompute_boundaries, PageBoundary};
pub use locator::{locate_page, page_breaks_in, PageBreak, SEAM_TOLERANCE};
