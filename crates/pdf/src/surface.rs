//! The drawing seam.
//!
//! Layout code draws through [`Surface`] and never sees a concrete writer, so
//! the same composition can produce a PDF ([`crate::writer::LopdfSurface`]) or
//! a list of operations to assert on ([`crate::recording::RecordingSurface`]).
//!
//! All coordinates use a top-left origin with `y` growing downward.

use crate::metrics;
use crate::types::{Align, Color, Font, PageSize, Point, RasterImage, Rect, Stroke, VAlign};
use crate::PdfError;

/// How a block of text is placed inside its frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    pub color: Color,
    pub align: Align,
    pub valign: VAlign,
}

impl TextStyle {
    pub fn new(font: Font) -> Self {
        Self {
            font,
            color: Color::BLACK,
            align: Align::Left,
            valign: VAlign::Top,
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn valign(mut self, valign: VAlign) -> Self {
        self.valign = valign;
        self
    }
}

pub trait Surface {
    fn page_size(&self) -> PageSize;

    fn fill_rect(&mut self, rect: Rect, color: Color);

    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke);

    fn line(&mut self, from: Point, to: Point, stroke: Stroke);

    /// Draw one line of text whose line box has its top-left corner at `at`.
    fn show_text(&mut self, line: &str, at: Point, font: Font, color: Color);

    /// Draw an image scaled to fill `frame`.
    fn image(&mut self, image: &RasterImage, frame: Rect);

    /// Start a new page and make it current.
    fn add_page(&mut self);

    fn page_count(&self) -> usize;

    /// Zero-based index of the page receiving draw calls.
    fn current_page(&self) -> usize;

    /// Redirect draw calls to an already created page.
    fn switch_to_page(&mut self, index: usize) -> Result<(), PdfError>;

    fn measure_width(&self, text: &str, font: Font) -> f32 {
        metrics::text_width(text, font)
    }

    /// Height of `text` wrapped to `width`.
    fn measure_height(&self, text: &str, width: f32, font: Font) -> f32 {
        metrics::wrapped_height(text, width, font)
    }

    /// Wrap `text` to the frame width and draw it aligned inside the frame.
    /// Text that overflows the frame height is still drawn.
    fn text(&mut self, text: &str, frame: Rect, style: &TextStyle) {
        let lines = metrics::wrap_lines(text, frame.w, style.font);
        if lines.is_empty() {
            return;
        }
        let lh = metrics::line_height(style.font);
        let total = lines.len() as f32 * lh;
        let mut y = match style.valign {
            VAlign::Top => frame.y,
            VAlign::Middle => frame.y + ((frame.h - total) / 2.0).max(0.0),
            VAlign::Bottom => frame.bottom() - total,
        };
        for line in &lines {
            let w = self.measure_width(line, style.font);
            let x = match style.align {
                Align::Left => frame.x,
                Align::Center => frame.x + (frame.w - w) / 2.0,
                Align::Right => frame.right() - w,
            };
            self.show_text(line, Point::new(x, y), style.font, style.color);
            y += lh;
        }
    }
}
