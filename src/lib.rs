//! Scriptflow: screenplay-to-flowing-document synchronization
//!
//! Keeps a paginated, flowable rich-text representation continuously and
//! incrementally consistent with a structured screenplay model:
//! - Full materialization of the flowing document from the model
//! - Minimal incremental edits (insert/remove/move/re-heading/paragraph
//!   edits) without a full rebuild
//! - Debounced page-boundary recomputation that never blocks edits
//! - Cheap "what page is the cursor on" and per-scene page-break queries

pub mod document;
pub mod format;
pub mod layout;
pub mod model;
pub mod pagination;
pub mod render;
pub mod sync;

// Re-export primary types
pub use document::{BlockTag, DocRange, FlowBlock, FlowDocument, FrameId, InsertPos};
pub use format::{PageGeometry, ParagraphFormat, ScreenplayFormat, TextAlign};
pub use layout::{DocumentLayout, FontMetrics, LineBreaker};
pub use model::{
    BreakKind, ElementId, ElementKind, LocationType, ModelEvent, Moment, ParagraphKind, Scene,
    SceneHeading, SceneId, SceneParagraph, Screenplay, ScreenplayElement,
};
pub use pagination::{locate_page, PageBoundary, PageBreak};
pub use render::{PlainTextPrinter, PrintDevice, PrintError};
pub use sync::{SegmentMap, SyncEngine, SyncEvent, BOUNDARY_DEBOUNCE, RELOAD_DEBOUNCE};

/// Layout coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Layout rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_point() {
        let rect = Rect::new(10.0, 10.0, 100.0, 50.0);
        assert!(rect.contains_point(Point { x: 10.0, y: 10.0 }));
        assert!(rect.contains_point(Point { x: 110.0, y: 60.0 }));
        assert!(!rect.contains_point(Point { x: 9.0, y: 10.0 }));
        assert!(!rect.contains_point(Point { x: 10.0, y: 61.0 }));
    }
}
