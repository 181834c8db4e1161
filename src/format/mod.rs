//! Formatting provider
//!
//! Supplies per-paragraph-type block/character formatting and page
//! geometry. The sync engine consumes this; it never mutates it. Every
//! setter bumps a revision counter so consumers can skip work when
//! nothing changed.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::layout::FontMetrics;
use crate::model::ParagraphKind;
use crate::Rect;

/// Page size and margins, in points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        // US Letter with the customary 1.5" binding margin
        Self {
            page_width: 612.0,
            page_height: 792.0,
            margin_top: 72.0,
            margin_bottom: 72.0,
            margin_left: 108.0,
            margin_right: 72.0,
        }
    }
}

impl PageGeometry {
    /// Usable content width
    pub fn content_width(&self) -> f32 {
        self.page_width - self.margin_left - self.margin_right
    }

    /// Usable content height per page
    pub fn content_height(&self) -> f32 {
        self.page_height - self.margin_top - self.margin_bottom
    }

    /// Content rectangle in page coordinates
    pub fn content_rect(&self) -> Rect {
        Rect::new(
            self.margin_left,
            self.margin_top,
            self.content_width(),
            self.content_height(),
        )
    }
}

/// Horizontal placement of a block or its text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Block and character format for one paragraph type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParagraphFormat {
    pub font: FontMetrics,
    /// Block width as a fraction of the content width
    pub width_fraction: f32,
    /// Placement of the block within the content width
    pub block_align: TextAlign,
    pub text_align: TextAlign,
    /// Vertical space before the block, in lines
    pub top_margin_lines: f32,
}

impl ParagraphFormat {
    fn new(width_fraction: f32, block_align: TextAlign, top_margin_lines: f32) -> Self {
        Self {
            font: FontMetrics::default(),
            width_fraction,
            block_align,
            text_align: TextAlign::Left,
            top_margin_lines,
        }
    }

    /// Block width in points for a given content width
    pub fn block_width(&self, content_width: f32) -> f32 {
        content_width * self.width_fraction
    }

    /// X offset of the block from the content left edge
    pub fn block_x(&self, content_width: f32) -> f32 {
        let width = self.block_width(content_width);
        match self.block_align {
            TextAlign::Left => 0.0,
            TextAlign::Center => (content_width - width) / 2.0,
            TextAlign::Right => content_width - width,
        }
    }

    /// Vertical space before the block in points
    pub fn top_margin(&self) -> f32 {
        self.top_margin_lines * self.font.line_height
    }
}

/// The full formatting rule set consumed by the sync engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenplayFormat {
    default_font: FontMetrics,
    page: PageGeometry,
    device_pixel_ratio: f32,
    formats: FxHashMap<ParagraphKind, ParagraphFormat>,
    revision: u64,
}

impl Default for ScreenplayFormat {
    fn default() -> Self {
        let mut formats = FxHashMap::default();
        formats.insert(ParagraphKind::Heading, ParagraphFormat::new(1.0, TextAlign::Left, 2.0));
        formats.insert(ParagraphKind::Action, ParagraphFormat::new(1.0, TextAlign::Left, 1.0));
        formats.insert(ParagraphKind::Character, ParagraphFormat::new(0.4, TextAlign::Center, 1.0));
        formats.insert(ParagraphKind::Dialogue, ParagraphFormat::new(0.6, TextAlign::Center, 0.0));
        formats.insert(
            ParagraphKind::Parenthetical,
            ParagraphFormat::new(0.5, TextAlign::Center, 0.0),
        );
        formats.insert(ParagraphKind::Shot, ParagraphFormat::new(1.0, TextAlign::Left, 1.0));
        let mut transition = ParagraphFormat::new(1.0, TextAlign::Left, 1.0);
        transition.text_align = TextAlign::Right;
        formats.insert(ParagraphKind::Transition, transition);

        Self {
            default_font: FontMetrics::default(),
            page: PageGeometry::default(),
            device_pixel_ratio: 1.0,
            formats,
            revision: 0,
        }
    }
}

impl ScreenplayFormat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic counter, bumped by every setter
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn default_font(&self) -> &FontMetrics {
        &self.default_font
    }

    pub fn page(&self) -> &PageGeometry {
        &self.page
    }

    pub fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }

    /// Format for one paragraph type; falls back to the Action format
    pub fn element_format(&self, kind: ParagraphKind) -> &ParagraphFormat {
        self.formats
            .get(&kind)
            .or_else(|| self.formats.get(&ParagraphKind::Action))
            .expect("format table always carries an Action entry")
    }

    pub fn set_default_font(&mut self, font: FontMetrics) {
        self.default_font = font;
        self.revision += 1;
    }

    pub fn set_page(&mut self, page: PageGeometry) {
        self.page = page;
        self.revision += 1;
    }

    pub fn set_device_pixel_ratio(&mut self, ratio: f32) {
        self.device_pixel_ratio = ratio;
        self.revision += 1;
    }

    pub fn set_element_format(&mut self, kind: ParagraphKind, format: ParagraphFormat) {
        self.formats.insert(kind, format);
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_geometry() {
        let page = PageGeometry::default();
        assert_eq!(page.content_width(), 432.0); // 612 - 108 - 72
        assert_eq!(page.content_height(), 648.0); // 792 - 72 - 72
        let rect = page.content_rect();
        assert_eq!(rect.x, 108.0);
        assert_eq!(rect.height, 648.0);
    }

    #[test]
    fn test_block_placement() {
        let format = ParagraphFormat::new(0.5, TextAlign::Center, 1.0);
        assert_eq!(format.block_width(400.0), 200.0);
        assert_eq!(format.block_x(400.0), 100.0);

        let format = ParagraphFormat::new(0.25, TextAlign::Right, 0.0);
        assert_eq!(format.block_x(400.0), 300.0);
    }

    #[test]
    fn test_every_kind_has_a_format() {
        let format = ScreenplayFormat::default();
        for kind in ParagraphKind::ALL {
            let pf = format.element_format(kind);
            assert!(pf.width_fraction > 0.0);
        }
    }

    #[test]
    fn test_setters_bump_revision() {
        let mut format = ScreenplayFormat::default();
        let r0 = format.revision();
        format.set_device_pixel_ratio(2.0);
        assert_eq!(format.revision(), r0 + 1);
        format.set_page(PageGeometry::default());
        assert_eq!(format.revision(), r0 + 2);
    }
}
