//! Page-filling layout over the flowing document

use std::ops::Range;

use crate::document::{DocRange, FlowDocument};
use crate::format::ScreenplayFormat;
use crate::layout::line_break::LineBreaker;
use crate::model::ParagraphKind;
use crate::Point;

/// One laid-out line with its place on a page
#[derive(Debug, Clone)]
pub struct LineBox {
    /// Document-offset range; the final line of a block also covers the
    /// block separator, so ranges tile the offset space without gaps
    pub range: DocRange,
    pub kind: ParagraphKind,
    /// Grapheme cluster count, for horizontal hit-testing
    pub chars: usize,
    /// Position within the page content rectangle
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub page: usize,
}

/// The laid-out document: measured lines assigned to pages
#[derive(Debug, Default)]
pub struct DocumentLayout {
    lines: Vec<LineBox>,
    page_lines: Vec<Range<usize>>,
    end_offset: usize,
}

impl DocumentLayout {
    /// Lay out every block of the document against the format's page
    pub fn build(doc: &FlowDocument, format: &ScreenplayFormat) -> Self {
        let content_width = format.page().content_width();
        let content_height = format.page().content_height();
        let breaker = LineBreaker::new();

        let mut lines: Vec<LineBox> = Vec::new();
        let mut page_lines: Vec<Range<usize>> = Vec::new();
        let mut page_start = 0usize;
        let mut page = 0usize;
        let mut y = 0.0f32;
        let mut first_block = true;

        for (at, block) in doc.iter_blocks() {
            let pf = format.element_format(block.kind);
            let block_width = pf.block_width(content_width);
            let block_x = pf.block_x(content_width);
            let broken = breaker.break_text(&block.text, &pf.font, block_width);

            let mut top = if first_block { 0.0 } else { pf.top_margin() };
            first_block = false;

            let last_index = broken.len() - 1;
            for (i, line) in broken.iter().enumerate() {
                let height = pf.font.line_height;

                if y + top + height > content_height && y > 0.0 {
                    page_lines.push(page_start..lines.len());
                    page += 1;
                    page_start = lines.len();
                    y = 0.0;
                    // Margins collapse at the top of a page
                    top = 0.0;
                }

                let last = if i == last_index {
                    at + block.text.len() + 1
                } else {
                    at + line.range.end
                };

                lines.push(LineBox {
                    range: DocRange {
                        first: at + line.range.start,
                        last,
                    },
                    kind: block.kind,
                    chars: line.chars,
                    x: block_x,
                    y: y + top,
                    width: line.width,
                    height,
                    page,
                });
                y += top + height;
                top = 0.0;
            }
        }

        if !lines.is_empty() {
            page_lines.push(page_start..lines.len());
        }

        Self {
            lines,
            page_lines,
            end_offset: doc.len(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_lines.len()
    }

    pub fn end_offset(&self) -> usize {
        self.end_offset
    }

    pub fn lines(&self) -> &[LineBox] {
        &self.lines
    }

    /// Lines on one page, in top-to-bottom order
    pub fn page_lines(&self, page: usize) -> &[LineBox] {
        self.page_lines
            .get(page)
            .map(|r| &self.lines[r.clone()])
            .unwrap_or(&[])
    }

    /// Map a point in a page's content rectangle to a document offset
    pub fn hit_test(&self, page: usize, point: Point) -> Option<usize> {
        let lines = self.page_lines(page);
        if lines.is_empty() {
            return None;
        }

        let line = lines
            .iter()
            .find(|l| point.y < l.y + l.height)
            .unwrap_or_else(|| lines.last().expect("page has lines"));

        if point.x <= line.x {
            return Some(line.range.first);
        }
        if line.width <= 0.0 || point.x >= line.x + line.width {
            return Some(line.range.last);
        }

        // Proportional within the line; exact for monospace text
        let rel = ((point.x - line.x) / line.width).clamp(0.0, 1.0);
        let chars = (rel * line.chars as f32).round() as usize;
        Some((line.range.first + chars).min(line.range.last))
    }
}
