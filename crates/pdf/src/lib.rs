//! Drawing primitives for landscape report documents.
//!
//! The crate knows nothing about the records it lays out. It offers:
//!
//! - [`Surface`]: the drawing contract every document is written against
//! - [`LopdfSurface`]: a surface that produces PDF bytes through lopdf
//! - [`RecordingSurface`]: a surface that records draw calls for tests
//! - [`layout`]: grids with spans, column taxonomies and text fitting
//! - [`paginate`]: page breaks with a repeated header band and deferred
//!   footers

use thiserror::Error;

pub mod images;
pub mod layout;
pub mod metrics;
pub mod paginate;
pub mod recording;
pub mod surface;
pub mod types;
pub mod writer;

pub use images::{decode_image, detect_image_format};
pub use paginate::{stamp_footers, HeaderBand, Paginator};
pub use recording::RecordingSurface;
pub use surface::{Surface, TextStyle};
pub use types::*;
pub use writer::LopdfSurface;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Image decoding error: {0}")]
    Image(String),
    #[error("Unsupported image format: {0}")]
    UnsupportedImage(ImageFormat),
    #[error("PDF writing error: {0}")]
    Write(String),
    #[error("Page {0} does not exist")]
    PageOutOfRange(usize),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Draw a stroked box with a centred label where an image could not be
/// loaded.
pub fn draw_placeholder(surface: &mut dyn Surface, frame: Rect, label: &str) {
    surface.stroke_rect(frame, Stroke::new(Color::rgb(0x99, 0x99, 0x99), 0.8));
    let style = TextStyle::new(Font::bold(9.0))
        .color(Color::rgb(0x66, 0x66, 0x66))
        .align(Align::Center)
        .valign(VAlign::Middle);
    surface.text(label, frame, &style);
}

/// Draw `image` when present, otherwise a placeholder box with `label`.
pub fn draw_image_or_placeholder(
    surface: &mut dyn Surface,
    image: Option<&RasterImage>,
    frame: Rect,
    label: &str,
) {
    match image {
        Some(image) => surface.image(image, frame),
        None => draw_placeholder(surface, frame, label),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::DrawOp;

    #[test]
    fn test_missing_image_draws_placeholder() {
        let mut s = RecordingSurface::new(PageSize::A4_LANDSCAPE);
        draw_image_or_placeholder(&mut s, None, Rect::new(38.0, 30.0, 80.0, 80.0), "LOGO");
        assert!(matches!(s.ops[0].op, DrawOp::StrokeRect { .. }));
        assert_eq!(s.texts(), vec!["LOGO"]);
    }

    #[test]
    fn test_present_image_is_placed() {
        let mut s = RecordingSurface::new(PageSize::A4_LANDSCAPE);
        let image = RasterImage {
            key: "left".into(),
            width: 1,
            height: 1,
            rgb: vec![0, 0, 0],
        };
        let frame = Rect::new(38.0, 30.0, 80.0, 80.0);
        draw_image_or_placeholder(&mut s, Some(&image), frame, "LOGO");
        assert_eq!(
            s.ops[0].op,
            DrawOp::Image {
                key: "left".into(),
                frame
            }
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            PdfError::UnsupportedImage(ImageFormat::Gif).to_string(),
            "Unsupported image format: gif"
        );
        assert_eq!(PdfError::PageOutOfRange(4).to_string(), "Page 4 does not exist");
    }
}
