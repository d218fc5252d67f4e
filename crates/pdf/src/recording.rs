//! A surface that remembers what was drawn.
//!
//! Used by layout tests to assert on geometry and text without parsing PDF
//! bytes.

use crate::surface::Surface;
use crate::types::{Color, Font, PageSize, Point, RasterImage, Rect, Stroke};
use crate::PdfError;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Fill {
        rect: Rect,
        color: Color,
    },
    StrokeRect {
        rect: Rect,
        stroke: Stroke,
    },
    Line {
        from: Point,
        to: Point,
        stroke: Stroke,
    },
    Text {
        text: String,
        at: Point,
        font: Font,
        color: Color,
    },
    Image {
        key: String,
        frame: Rect,
    },
}

/// A drawing operation and the page it landed on.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub page: usize,
    pub op: DrawOp,
}

#[derive(Debug)]
pub struct RecordingSurface {
    size: PageSize,
    pages: usize,
    current: usize,
    pub ops: Vec<Recorded>,
}

impl RecordingSurface {
    pub fn new(size: PageSize) -> Self {
        Self {
            size,
            pages: 1,
            current: 0,
            ops: Vec::new(),
        }
    }

    fn push(&mut self, op: DrawOp) {
        self.ops.push(Recorded {
            page: self.current,
            op,
        });
    }

    /// Every text run, in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|r| match &r.op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Text runs drawn on one page.
    pub fn texts_on(&self, page: usize) -> Vec<&str> {
        self.ops
            .iter()
            .filter(|r| r.page == page)
            .filter_map(|r| match &r.op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// First text run equal to `needle`, with its page and position.
    pub fn find_text(&self, needle: &str) -> Option<(usize, Point, Font)> {
        self.ops.iter().find_map(|r| match &r.op {
            DrawOp::Text { text, at, font, .. } if text == needle => Some((r.page, *at, *font)),
            _ => None,
        })
    }

    /// Whether a text run contains `needle`.
    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().iter().any(|t| t.contains(needle))
    }

    pub fn fills(&self) -> Vec<(usize, Rect, Color)> {
        self.ops
            .iter()
            .filter_map(|r| match &r.op {
                DrawOp::Fill { rect, color } => Some((r.page, *rect, *color)),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn page_size(&self) -> PageSize {
        self.size
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.push(DrawOp::Fill { rect, color });
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke) {
        self.push(DrawOp::StrokeRect { rect, stroke });
    }

    fn line(&mut self, from: Point, to: Point, stroke: Stroke) {
        self.push(DrawOp::Line { from, to, stroke });
    }

    fn show_text(&mut self, line: &str, at: Point, font: Font, color: Color) {
        self.push(DrawOp::Text {
            text: line.to_string(),
            at,
            font,
            color,
        });
    }

    fn image(&mut self, image: &RasterImage, frame: Rect) {
        self.push(DrawOp::Image {
            key: image.key.clone(),
            frame,
        });
    }

    fn add_page(&mut self) {
        self.pages += 1;
        self.current = self.pages - 1;
    }

    fn page_count(&self) -> usize {
        self.pages
    }

    fn current_page(&self) -> usize {
        self.current
    }

    fn switch_to_page(&mut self, index: usize) -> Result<(), PdfError> {
        if index >= self.pages {
            return Err(PdfError::PageOutOfRange(index));
        }
        self.current = index;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::TextStyle;
    use crate::types::{Align, VAlign};

    #[test]
    fn test_records_page_of_each_op() {
        let mut s = RecordingSurface::new(PageSize::A4_LANDSCAPE);
        s.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Color::BLACK);
        s.add_page();
        s.show_text("x", Point::new(1.0, 2.0), Font::regular(8.0), Color::BLACK);
        s.switch_to_page(0).unwrap();
        s.show_text("y", Point::new(1.0, 2.0), Font::regular(8.0), Color::BLACK);
        assert_eq!(s.page_count(), 2);
        assert_eq!(s.texts_on(0), vec!["y"]);
        assert_eq!(s.texts_on(1), vec!["x"]);
        assert_eq!(s.fills().len(), 1);
    }

    #[test]
    fn test_text_alignment() {
        let mut s = RecordingSurface::new(PageSize::A4_LANDSCAPE);
        let font = Font::regular(10.0);
        let frame = Rect::new(100.0, 50.0, 200.0, 40.0);
        let w = s.measure_width("ABC", font);

        s.text("ABC", frame, &TextStyle::new(font).align(Align::Right));
        let (_, at, _) = s.find_text("ABC").unwrap();
        assert!((at.x - (300.0 - w)).abs() < 1e-3);
        assert_eq!(at.y, 50.0);

        s.ops.clear();
        s.text(
            "ABC",
            frame,
            &TextStyle::new(font).align(Align::Center).valign(VAlign::Middle),
        );
        let (_, at, _) = s.find_text("ABC").unwrap();
        assert!((at.x - (100.0 + (200.0 - w) / 2.0)).abs() < 1e-3);
        assert!((at.y - (50.0 + (40.0 - 11.5) / 2.0)).abs() < 1e-3);
    }

    #[test]
    fn test_text_wraps_into_lines() {
        let mut s = RecordingSurface::new(PageSize::A4_LANDSCAPE);
        s.text(
            "AAA AAA AAA",
            Rect::new(0.0, 0.0, 45.0, 100.0),
            &TextStyle::new(Font::regular(10.0)),
        );
        assert_eq!(s.texts(), vec!["AAA AAA", "AAA"]);
        let (_, second, _) = s.find_text("AAA").unwrap();
        assert!((second.y - 11.5).abs() < 1e-3);
    }
}
