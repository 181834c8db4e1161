//! Font metrics for layout

use serde::{Deserialize, Serialize};

/// Metrics needed for text layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontMetrics {
    /// Line height in points
    pub line_height: f32,
    /// Width of ASCII characters (0-127)
    pub char_widths: Vec<f32>,
    /// Default width for non-ASCII characters
    pub default_width: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        // 12pt Courier: 10 characters per inch, single-spaced lines
        let default_width = 7.2;
        let char_widths = vec![default_width; 128];

        Self {
            line_height: 12.0,
            char_widths,
            default_width,
        }
    }
}

impl FontMetrics {
    pub fn new(line_height: f32, char_widths: Vec<f32>, default_width: f32) -> Self {
        Self {
            line_height,
            char_widths,
            default_width,
        }
    }

    /// Get width of a character
    pub fn width(&self, c: char) -> f32 {
        if c.is_ascii() {
            if let Some(w) = self.char_widths.get(c as usize) {
                return *w;
            }
        }
        self.default_width
    }

    /// Width of one grapheme cluster
    pub fn grapheme_width(&self, grapheme: &str) -> f32 {
        if grapheme == "\t" {
            return self.default_width * 4.0;
        }
        if grapheme.chars().all(char::is_control) {
            return 0.0;
        }
        grapheme.chars().map(|c| self.width(c)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_metrics() {
        let font = FontMetrics::default();
        assert_eq!(font.width('a'), 7.2);
        assert_eq!(font.width('€'), 7.2);
        assert_eq!(font.grapheme_width("\t"), 7.2 * 4.0);
        assert_eq!(font.grapheme_width("ab"), 14.4);
    }

    #[test]
    fn test_custom_widths() {
        let mut widths = vec![8.0; 128];
        widths['i' as usize] = 4.0;
        let font = FontMetrics::new(10.0, widths, 8.0);
        assert_eq!(font.width('i'), 4.0);
        assert_eq!(font.width('m'), 8.0);
    }
}
