//! Frames and typed text blocks

use crate::model::ParagraphKind;

/// Stable identifier for frames that survives sibling edits
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FrameId(pub u64);

/// What part of its source element a block renders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTag {
    /// The scene heading line
    SceneHeading,
    /// Body paragraph at the given index within its scene
    Paragraph(usize),
    /// Break marker title ("ACT", ...)
    BreakTitle,
    /// Stand-in body of an omitted scene
    Omitted,
    /// Placeholder for a scene with nothing to render
    Empty,
}

/// One formatted paragraph of the flowing document
#[derive(Debug, Clone, PartialEq)]
pub struct FlowBlock {
    pub tag: BlockTag,
    pub kind: ParagraphKind,
    pub text: String,
}

impl FlowBlock {
    pub fn new(tag: BlockTag, kind: ParagraphKind, text: impl Into<String>) -> Self {
        Self {
            tag,
            kind,
            text: text.into(),
        }
    }

    /// Footprint in document-offset space: text bytes plus one separator
    pub fn len(&self) -> usize {
        self.text.len() + 1
    }
}

/// A contiguous run of blocks belonging to one screenplay element
#[derive(Debug, Clone, Default)]
pub struct Frame {
    /// Cached start offset, maintained by the document on sibling edits
    pub(super) first_offset: usize,
    pub(super) blocks: Vec<FlowBlock>,
}

impl Frame {
    pub fn blocks(&self) -> &[FlowBlock] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.iter().map(FlowBlock::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn first_offset(&self) -> usize {
        self.first_offset
    }

    pub fn end_offset(&self) -> usize {
        self.first_offset + self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_len_counts_separator() {
        let block = FlowBlock::new(BlockTag::Paragraph(0), ParagraphKind::Action, "abc");
        assert_eq!(block.len(), 4);

        let empty = FlowBlock::new(BlockTag::Empty, ParagraphKind::Action, "");
        assert_eq!(empty.len(), 1);
    }

    #[test]
    fn test_frame_len() {
        let mut frame = Frame::default();
        frame.blocks.push(FlowBlock::new(BlockTag::SceneHeading, ParagraphKind::Heading, "INT. X - DAY"));
        frame.blocks.push(FlowBlock::new(BlockTag::Paragraph(0), ParagraphKind::Action, "Hello"));
        assert_eq!(frame.len(), 13 + 6);
    }
}
