//! Print: handing the laid-out document to an external renderer
//!
//! The engine never rasterizes anything itself. A [`PrintDevice`] is the
//! seam to the real renderer; [`PlainTextPrinter`] is the reference
//! implementation used by tests and command-line tooling.

use std::io::Write;

use thiserror::Error;

use crate::document::FlowDocument;
use crate::format::{PageGeometry, ScreenplayFormat};
use crate::layout::DocumentLayout;
use crate::model::ParagraphKind;
use crate::Rect;

/// Failures at the device seam
#[derive(Debug, Error)]
pub enum PrintError {
    #[error("print device I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("device rejected page {page}: {reason}")]
    Rejected { page: usize, reason: String },
}

/// External renderer interface
pub trait PrintDevice {
    fn begin_page(&mut self, number: usize, geometry: &PageGeometry) -> Result<(), PrintError>;

    /// Page header text; devices without headers can keep the default
    fn header(&mut self, _text: &str) -> Result<(), PrintError> {
        Ok(())
    }

    /// One laid-out line, positioned in page coordinates
    fn line(&mut self, kind: ParagraphKind, text: &str, rect: Rect) -> Result<(), PrintError>;

    fn end_page(&mut self, number: usize) -> Result<(), PrintError>;
}

/// Walk the laid-out pages and hand every line to the device
pub fn print_document(
    doc: &FlowDocument,
    format: &ScreenplayFormat,
    title: &str,
    author: &str,
    device: &mut dyn PrintDevice,
) -> Result<(), PrintError> {
    let layout = DocumentLayout::build(doc, format);
    let content = format.page().content_rect();

    for page in 0..layout.page_count() {
        let number = page + 1;
        device.begin_page(number, format.page())?;

        if number == 1 {
            if !title.is_empty() && !author.is_empty() {
                device.header(&format!("{} by {}", title, author))?;
            } else if !title.is_empty() {
                device.header(title)?;
            }
        } else {
            device.header(&format!("{}.", number))?;
        }

        for line in layout.page_lines(page) {
            let text = doc.slice(line.range.first, line.range.last.min(doc.len()));
            let text = text.trim_end_matches('\n');
            let rect = Rect::new(
                content.x + line.x,
                content.y + line.y,
                line.width,
                line.height,
            );
            device.line(line.kind, text, rect)?;
        }

        device.end_page(number)?;
    }

    Ok(())
}

/// Reference device: pages as plain text with simple separators
pub struct PlainTextPrinter<W: Write> {
    out: W,
    pages: usize,
}

impl<W: Write> PlainTextPrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out, pages: 0 }
    }

    pub fn pages_printed(&self) -> usize {
        self.pages
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> PrintDevice for PlainTextPrinter<W> {
    fn begin_page(&mut self, number: usize, _geometry: &PageGeometry) -> Result<(), PrintError> {
        self.pages += 1;
        writeln!(self.out, "--- page {} ---", number)?;
        Ok(())
    }

    fn header(&mut self, text: &str) -> Result<(), PrintError> {
        writeln!(self.out, "{}", text)?;
        Ok(())
    }

    fn line(&mut self, _kind: ParagraphKind, text: &str, _rect: Rect) -> Result<(), PrintError> {
        writeln!(self.out, "{}", text)?;
        Ok(())
    }

    fn end_page(&mut self, _number: usize) -> Result<(), PrintError> {
        writeln!(self.out)?;
        Ok(())
    }
}
