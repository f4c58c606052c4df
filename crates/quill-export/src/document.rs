//! Text-flow export: paginate a prompt title and response body into a
//! multi-page document.
//!
//! The walk emits placement calls against a [`PageSink`] so the pagination
//! logic stays independent of the PDF backend. Coordinates are millimeters
//! with the origin at the top-left of the page.

use crate::layout::{self, A4_HEIGHT_MM, A4_WIDTH_MM};

/// Title font size in points (bold).
pub const TITLE_FONT_SIZE_PT: f32 = 14.0;

/// Body font size in points.
pub const BODY_FONT_SIZE_PT: f32 = 11.0;

const TITLE_LINE_HEIGHT_MM: f32 = 7.0;
const TITLE_GAP_MM: f32 = 10.0;
const BODY_LINE_HEIGHT_MM: f32 = 6.0;

/// Which font a placed line uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Title,
    Body,
}

/// Receiver for placed lines and page breaks.
pub trait PageSink {
    /// Place one line of text. `y` is the distance from the top of the
    /// current page in millimeters.
    fn place_text(&mut self, text: &str, x: f32, y: f32, style: TextStyle);

    /// Start a new page; subsequent placements land on it.
    fn new_page(&mut self);
}

/// Composes the title and word-wrapped response body onto pages.
pub struct ResponseDocument {
    margin: f32,
}

impl ResponseDocument {
    pub fn new(margin_mm: f32) -> Self {
        Self { margin: margin_mm }
    }

    /// Walk the wrapped title and body lines onto the sink, breaking to a
    /// new page before any body line that would cross the bottom margin.
    /// An empty response is a no-op.
    pub fn compose(&self, prompt: &str, response: &str, sink: &mut impl PageSink) {
        if response.is_empty() {
            return;
        }

        let content_width = A4_WIDTH_MM - self.margin * 2.0;
        let mut cursor = self.margin;

        let title = format!("AI Response for: \"{prompt}\"");
        let title_budget = layout::monospace_chars_per_line(content_width, TITLE_FONT_SIZE_PT);
        for line in layout::wrap_text(&title, title_budget) {
            sink.place_text(&line, self.margin, cursor, TextStyle::Title);
            cursor += TITLE_LINE_HEIGHT_MM;
        }
        cursor += TITLE_GAP_MM;

        let body_budget = layout::monospace_chars_per_line(content_width, BODY_FONT_SIZE_PT);
        for line in layout::wrap_text(response, body_budget) {
            if cursor + BODY_LINE_HEIGHT_MM > A4_HEIGHT_MM - self.margin {
                sink.new_page();
                cursor = self.margin;
            }
            sink.place_text(&line, self.margin, cursor, TextStyle::Body);
            cursor += BODY_LINE_HEIGHT_MM;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        page_breaks: usize,
        placed: Vec<(usize, f32, String, TextStyle)>,
    }

    impl PageSink for RecordingSink {
        fn place_text(&mut self, text: &str, _x: f32, y: f32, style: TextStyle) {
            self.placed.push((self.page_breaks, y, text.to_string(), style));
        }

        fn new_page(&mut self) {
            self.page_breaks += 1;
        }
    }

    fn long_body(lines: usize) -> String {
        (0..lines)
            .map(|i| format!("line {i}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_empty_response_is_noop() {
        let mut sink = RecordingSink::default();
        ResponseDocument::new(15.0).compose("Hello", "", &mut sink);
        assert!(sink.placed.is_empty());
        assert_eq!(sink.page_breaks, 0);
    }

    #[test]
    fn test_title_placed_at_top_margin() {
        let mut sink = RecordingSink::default();
        ResponseDocument::new(15.0).compose("Hello", "short answer", &mut sink);

        let (page, y, text, style) = &sink.placed[0];
        assert_eq!(*page, 0);
        assert_eq!(*y, 15.0);
        assert_eq!(*style, TextStyle::Title);
        assert!(text.contains("AI Response for: \"Hello\""));
    }

    #[test]
    fn test_body_starts_after_title_and_gap() {
        let mut sink = RecordingSink::default();
        ResponseDocument::new(15.0).compose("Hi", "short answer", &mut sink);

        // Single title line at 15mm, then 7mm line height plus 10mm gap.
        let body = sink
            .placed
            .iter()
            .find(|(_, _, _, style)| *style == TextStyle::Body)
            .unwrap();
        assert_eq!(body.1, 15.0 + 7.0 + 10.0);
        assert_eq!(body.2, "short answer");
    }

    #[test]
    fn test_long_title_wraps_to_multiple_lines() {
        let prompt = "x".repeat(150);
        let mut sink = RecordingSink::default();
        ResponseDocument::new(15.0).compose(&prompt, "body", &mut sink);

        let title_lines: Vec<_> = sink
            .placed
            .iter()
            .filter(|(_, _, _, style)| *style == TextStyle::Title)
            .collect();
        assert!(title_lines.len() > 1);
        for (i, line) in title_lines.iter().enumerate() {
            assert_eq!(line.1, 15.0 + i as f32 * 7.0);
        }
    }

    #[test]
    fn test_long_body_spills_onto_more_pages() {
        let mut sink = RecordingSink::default();
        ResponseDocument::new(15.0).compose("Hi", &long_body(100), &mut sink);

        assert!(sink.page_breaks >= 1);

        // No placed line may cross the bottom margin.
        for (_, y, _, _) in &sink.placed {
            assert!(
                y + BODY_LINE_HEIGHT_MM <= A4_HEIGHT_MM - 15.0,
                "line at {y}mm crosses the bottom margin"
            );
            assert!(*y >= 15.0);
        }
    }

    #[test]
    fn test_page_break_resets_cursor_to_top_margin() {
        let mut sink = RecordingSink::default();
        ResponseDocument::new(15.0).compose("Hi", &long_body(100), &mut sink);

        let first_on_second_page = sink
            .placed
            .iter()
            .find(|(page, _, _, _)| *page == 1)
            .unwrap();
        assert_eq!(first_on_second_page.1, 15.0);
    }

    #[test]
    fn test_body_lines_keep_source_order() {
        let mut sink = RecordingSink::default();
        ResponseDocument::new(15.0).compose("Hi", &long_body(100), &mut sink);

        let body_texts: Vec<&str> = sink
            .placed
            .iter()
            .filter(|(_, _, _, style)| *style == TextStyle::Body)
            .map(|(_, _, text, _)| text.as_str())
            .collect();
        assert_eq!(body_texts.len(), 100);
        assert_eq!(body_texts[0], "line 0");
        assert_eq!(body_texts[99], "line 99");
    }
}
