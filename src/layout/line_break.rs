//! Line breaking algorithm

use std::ops::Range;

use unicode_linebreak::{linebreaks, BreakOpportunity};
use unicode_segmentation::UnicodeSegmentation;

use crate::layout::font::FontMetrics;

/// One measured line of a block
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Byte range within the block text
    pub range: Range<usize>,
    /// Grapheme cluster count
    pub chars: usize,
    /// Measured width in points
    pub width: f32,
}

/// Line breaker
#[derive(Debug, Default)]
pub struct LineBreaker;

impl LineBreaker {
    pub fn new() -> Self {
        Self
    }

    /// Break block text into measured lines not exceeding `max_width`
    pub fn break_text(&self, text: &str, font: &FontMetrics, max_width: f32) -> Vec<Line> {
        if text.is_empty() {
            // Empty block still occupies one line
            return vec![Line {
                range: 0..0,
                chars: 0,
                width: 0.0,
            }];
        }

        // Soft break opportunities; explicit newlines are handled below
        let allowed: Vec<usize> = linebreaks(text)
            .filter(|(_, op)| *op == BreakOpportunity::Allowed)
            .map(|(idx, _)| idx)
            .collect();

        // Never wedge a line narrower than one character
        let max_width = max_width.max(font.default_width);

        let mut lines = Vec::new();
        let mut line_start = 0usize;
        // Graphemes on the current line: (byte offset, width)
        let mut pending: Vec<(usize, f32)> = Vec::new();
        let mut x = 0.0f32;

        for (idx, grapheme) in text.grapheme_indices(true) {
            if grapheme == "\n" || grapheme == "\r\n" {
                lines.push(Line {
                    range: line_start..idx,
                    chars: pending.len(),
                    width: x,
                });
                line_start = idx + grapheme.len();
                pending.clear();
                x = 0.0;
                continue;
            }

            let width = font.grapheme_width(grapheme);

            // Trailing whitespace hangs past the margin; the break lands
            // after it, at the next printable grapheme.
            let hangs = grapheme.chars().all(char::is_whitespace);

            if x + width > max_width && !pending.is_empty() && !hangs {
                // Break at the last allowed opportunity inside the line
                let break_at = allowed
                    .iter()
                    .copied()
                    .filter(|&p| p > line_start && p <= idx)
                    .next_back();

                if let Some(p) = break_at {
                    let split = pending.iter().position(|&(o, _)| o >= p).unwrap_or(pending.len());
                    let line_width: f32 = pending[..split].iter().map(|&(_, w)| w).sum();
                    lines.push(Line {
                        range: line_start..p,
                        chars: split,
                        width: line_width,
                    });
                    pending.drain(..split);
                    line_start = p;
                } else {
                    // Emergency break at the current grapheme
                    lines.push(Line {
                        range: line_start..idx,
                        chars: pending.len(),
                        width: x,
                    });
                    pending.clear();
                    line_start = idx;
                }
                x = pending.iter().map(|&(_, w)| w).sum();
            }

            pending.push((idx, width));
            x += width;
        }

        lines.push(Line {
            range: line_start..text.len(),
            chars: pending.len(),
            width: x,
        });

        lines
    }
}
