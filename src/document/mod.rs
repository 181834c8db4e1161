//! Flowing document: ordered frames of typed text blocks
//!
//! The document is exclusively owned and mutated by the sync engine.
//! Frames are addressed by arena-style ids; their start offsets are
//! cached and shifted when siblings change, so range queries stay cheap.

mod frame;

pub use frame::{BlockTag, FlowBlock, Frame, FrameId};

use rustc_hash::FxHashMap;

/// Half-open offset range `[first, last)` in document space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocRange {
    pub first: usize,
    pub last: usize,
}

impl DocRange {
    pub fn len(&self) -> usize {
        self.last.saturating_sub(self.first)
    }

    pub fn is_empty(&self) -> bool {
        self.last <= self.first
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.first && offset < self.last
    }
}

/// Where to create a new frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPos {
    Start,
    End,
    After(FrameId),
}

/// The flowing document
#[derive(Debug, Default)]
pub struct FlowDocument {
    frames: FxHashMap<FrameId, Frame>,
    order: Vec<FrameId>,
    next_frame_id: u64,
}

impl FlowDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard all frames and blocks
    pub fn clear(&mut self) {
        self.frames.clear();
        self.order.clear();
    }

    pub fn frame_count(&self) -> usize {
        self.order.len()
    }

    /// Total length in document-offset space
    pub fn len(&self) -> usize {
        self.order
            .last()
            .and_then(|id| self.frames.get(id))
            .map(Frame::end_offset)
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn order(&self) -> &[FrameId] {
        &self.order
    }

    pub fn first_frame(&self) -> Option<FrameId> {
        self.order.first().copied()
    }

    /// Create an empty frame at the given position
    pub fn create_frame(&mut self, pos: InsertPos) -> FrameId {
        let id = FrameId(self.next_frame_id);
        self.next_frame_id += 1;

        let index = match pos {
            InsertPos::Start => 0,
            InsertPos::End => self.order.len(),
            InsertPos::After(after) => self
                .order
                .iter()
                .position(|&f| f == after)
                .map(|i| i + 1)
                .unwrap_or(self.order.len()),
        };

        let first_offset = if index == 0 {
            0
        } else {
            self.frames[&self.order[index - 1]].end_offset()
        };

        self.frames.insert(
            id,
            Frame {
                first_offset,
                blocks: Vec::new(),
            },
        );
        self.order.insert(index, id);
        id
    }

    /// Remove a frame and its region; shifts successors back
    pub fn remove_frame(&mut self, id: FrameId) -> bool {
        let Some(index) = self.order.iter().position(|&f| f == id) else {
            return false;
        };
        let len = self.frames[&id].len();
        self.order.remove(index);
        self.frames.remove(&id);
        self.shift_from(index, -(len as isize));
        true
    }

    /// Replace the whole content of a frame; shifts successors by the delta
    pub fn set_frame_blocks(&mut self, id: FrameId, blocks: Vec<FlowBlock>) {
        let Some(index) = self.order.iter().position(|&f| f == id) else {
            return;
        };
        let frame = self.frames.get_mut(&id).expect("ordered frame must exist");
        let old_len = frame.len();
        frame.blocks = blocks;
        let delta = frame.len() as isize - old_len as isize;
        self.shift_from(index + 1, delta);
    }

    pub fn frame(&self, id: FrameId) -> Option<&Frame> {
        self.frames.get(&id)
    }

    pub fn frame_range(&self, id: FrameId) -> Option<DocRange> {
        self.frames.get(&id).map(|f| DocRange {
            first: f.first_offset,
            last: f.end_offset(),
        })
    }

    /// Replace one block of a frame in place
    pub fn replace_block(&mut self, id: FrameId, block_index: usize, block: FlowBlock) {
        let Some(index) = self.order.iter().position(|&f| f == id) else {
            return;
        };
        let frame = self.frames.get_mut(&id).expect("ordered frame must exist");
        let Some(slot) = frame.blocks.get_mut(block_index) else {
            return;
        };
        let delta = block.len() as isize - slot.len() as isize;
        *slot = block;
        self.shift_from(index + 1, delta);
    }

    /// Insert one block into a frame
    pub fn insert_block(&mut self, id: FrameId, block_index: usize, block: FlowBlock) {
        let Some(index) = self.order.iter().position(|&f| f == id) else {
            return;
        };
        let frame = self.frames.get_mut(&id).expect("ordered frame must exist");
        let block_index = block_index.min(frame.blocks.len());
        let delta = block.len() as isize;
        frame.blocks.insert(block_index, block);
        self.shift_from(index + 1, delta);
    }

    /// Remove one block from a frame
    pub fn remove_block(&mut self, id: FrameId, block_index: usize) {
        let Some(index) = self.order.iter().position(|&f| f == id) else {
            return;
        };
        let frame = self.frames.get_mut(&id).expect("ordered frame must exist");
        if block_index >= frame.blocks.len() {
            return;
        }
        let delta = -(frame.blocks[block_index].len() as isize);
        frame.blocks.remove(block_index);
        self.shift_from(index + 1, delta);
    }

    /// Iterate all blocks in document order with their start offsets
    pub fn iter_blocks(&self) -> impl Iterator<Item = (usize, &FlowBlock)> + '_ {
        self.order.iter().flat_map(move |id| {
            let frame = &self.frames[id];
            let mut offset = frame.first_offset;
            frame.blocks.iter().map(move |block| {
                let at = offset;
                offset += block.len();
                (at, block)
            })
        })
    }

    /// Extract plain text for a document-offset range; block separators
    /// render as newlines, except the final separator of the document
    pub fn slice(&self, first: usize, last: usize) -> String {
        let total = self.len();
        let mut out = String::new();
        for (at, block) in self.iter_blocks() {
            let text_end = at + block.text.len();
            if text_end + 1 <= first {
                continue;
            }
            if at >= last {
                break;
            }
            let from = first.saturating_sub(at).min(block.text.len());
            let to = last.saturating_sub(at).min(block.text.len());
            if from < to {
                out.push_str(&block.text[from..to]);
            }
            // The one-byte separator sits at text_end
            if text_end >= first && text_end < last && text_end + 1 < total {
                out.push('\n');
            }
        }
        out
    }

    /// Full plain text, blocks separated by newlines
    pub fn text(&self) -> String {
        self.slice(0, self.len())
    }

    fn shift_from(&mut self, order_index: usize, delta: isize) {
        if delta == 0 {
            return;
        }
        for id in &self.order[order_index..] {
            let frame = self.frames.get_mut(id).expect("ordered frame must exist");
            frame.first_offset = (frame.first_offset as isize + delta) as usize;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ParagraphKind;

    fn block(text: &str) -> FlowBlock {
        FlowBlock::new(BlockTag::Paragraph(0), ParagraphKind::Action, text)
    }

    #[test]
    fn test_create_and_offsets() {
        let mut doc = FlowDocument::new();
        let a = doc.create_frame(InsertPos::End);
        doc.set_frame_blocks(a, vec![block("aaaa")]); // len 5
        let b = doc.create_frame(InsertPos::End);
        doc.set_frame_blocks(b, vec![block("bb")]); // len 3

        assert_eq!(doc.frame_range(a).unwrap(), DocRange { first: 0, last: 5 });
        assert_eq!(doc.frame_range(b).unwrap(), DocRange { first: 5, last: 8 });
        assert_eq!(doc.len(), 8);
    }

    #[test]
    fn test_insert_between_shifts_successors() {
        let mut doc = FlowDocument::new();
        let a = doc.create_frame(InsertPos::End);
        doc.set_frame_blocks(a, vec![block("aaaa")]);
        let c = doc.create_frame(InsertPos::End);
        doc.set_frame_blocks(c, vec![block("cc")]);

        let b = doc.create_frame(InsertPos::After(a));
        doc.set_frame_blocks(b, vec![block("bbb")]); // len 4

        assert_eq!(doc.order(), &[a, b, c]);
        assert_eq!(doc.frame_range(b).unwrap(), DocRange { first: 5, last: 9 });
        assert_eq!(doc.frame_range(c).unwrap(), DocRange { first: 9, last: 12 });
    }

    #[test]
    fn test_remove_restores_offsets() {
        let mut doc = FlowDocument::new();
        let a = doc.create_frame(InsertPos::End);
        doc.set_frame_blocks(a, vec![block("aaaa")]);
        let before = doc.frame_range(a).unwrap();

        let b = doc.create_frame(InsertPos::Start);
        doc.set_frame_blocks(b, vec![block("bbb")]);
        assert_eq!(doc.frame_range(a).unwrap().first, 4);

        assert!(doc.remove_frame(b));
        assert_eq!(doc.frame_range(a).unwrap(), before);
        assert!(!doc.remove_frame(b));
    }

    #[test]
    fn test_block_edits_shift() {
        let mut doc = FlowDocument::new();
        let a = doc.create_frame(InsertPos::End);
        doc.set_frame_blocks(a, vec![block("one"), block("two")]); // len 8
        let b = doc.create_frame(InsertPos::End);
        doc.set_frame_blocks(b, vec![block("x")]);
        assert_eq!(doc.frame_range(b).unwrap().first, 8);

        doc.replace_block(a, 0, block("longer"));
        assert_eq!(doc.frame_range(b).unwrap().first, 11);

        doc.remove_block(a, 1);
        assert_eq!(doc.frame_range(b).unwrap().first, 7);

        doc.insert_block(a, 0, block("hi"));
        assert_eq!(doc.frame_range(b).unwrap().first, 10);
    }

    #[test]
    fn test_text_and_slice() {
        let mut doc = FlowDocument::new();
        let a = doc.create_frame(InsertPos::End);
        doc.set_frame_blocks(a, vec![block("one"), block("two")]);

        assert_eq!(doc.text(), "one\ntwo");
        assert_eq!(doc.slice(0, 3), "one");
        assert_eq!(doc.slice(0, 4), "one\n");
        assert_eq!(doc.slice(4, 7), "two");
    }

    #[test]
    fn test_clear() {
        let mut doc = FlowDocument::new();
        let a = doc.create_frame(InsertPos::End);
        doc.set_frame_blocks(a, vec![block("one")]);
        doc.clear();
        assert!(doc.is_empty());
        assert_eq!(doc.frame_count(), 0);
    }
}
