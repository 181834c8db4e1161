//! Element-to-frame bookkeeping

use rustc_hash::FxHashMap;

use crate::document::FrameId;
use crate::model::ElementId;

/// Maps each screenplay element to its segment (frame) in the flowing
/// document. Keys are unique per element; no two elements share a frame.
#[derive(Debug, Default)]
pub struct SegmentMap {
    map: FxHashMap<ElementId, FrameId>,
}

impl SegmentMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, element: ElementId, frame: FrameId) {
        self.map.insert(element, frame);
    }

    pub fn get(&self, element: ElementId) -> Option<FrameId> {
        self.map.get(&element).copied()
    }

    pub fn remove(&mut self, element: ElementId) -> Option<FrameId> {
        self.map.remove(&element)
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn contains(&self, element: ElementId) -> bool {
        self.map.contains_key(&element)
    }
}
