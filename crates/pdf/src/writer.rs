//! PDF output through lopdf.
//!
//! Draw calls are buffered as content-stream operations per page, so any
//! earlier page can be revisited with [`Surface::switch_to_page`] before the
//! document is serialised by [`LopdfSurface::finish`].

use std::collections::BTreeMap;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::metrics::{encode_win_ansi, ASCENT};
use crate::surface::Surface;
use crate::types::{Color, Font, PageSize, Point, RasterImage, Rect, Stroke, Weight};
use crate::PdfError;

const REGULAR_FONT: &str = "F1";
const BOLD_FONT: &str = "F2";

// ---------------------------------------------------------------------------
// Operation builders
// ---------------------------------------------------------------------------

fn real(v: f32) -> Object {
    Object::Real(v)
}

fn rgb_operands(color: Color) -> Vec<Object> {
    color.unit().into_iter().map(real).collect()
}

/// Largest rect with the image's aspect ratio that fits `frame`, centred in it.
fn fit_image(image: &RasterImage, frame: Rect) -> Rect {
    let (iw, ih) = (image.width.max(1) as f32, image.height.max(1) as f32);
    let scale = (frame.w / iw).min(frame.h / ih);
    let (w, h) = (iw * scale, ih * scale);
    Rect::new(
        frame.x + (frame.w - w) / 2.0,
        frame.y + (frame.h - h) / 2.0,
        w,
        h,
    )
}

fn font_resource(weight: Weight) -> &'static str {
    match weight {
        Weight::Regular => REGULAR_FONT,
        Weight::Bold => BOLD_FONT,
    }
}

/// A multi-page document under construction.
pub struct LopdfSurface {
    size: PageSize,
    pages: Vec<Vec<Operation>>,
    current: usize,
    /// Image key -> (resource name, pixels), embedded once each.
    images: BTreeMap<String, (String, RasterImage)>,
}

impl LopdfSurface {
    /// A document with one empty page.
    pub fn new(size: PageSize) -> Self {
        Self {
            size,
            pages: vec![Vec::new()],
            current: 0,
            images: BTreeMap::new(),
        }
    }

    fn ops(&mut self) -> &mut Vec<Operation> {
        &mut self.pages[self.current]
    }

    /// Flip a top-left `y` into PDF user space.
    fn flip(&self, y: f32) -> f32 {
        self.size.height - y
    }

    fn image_name(&mut self, image: &RasterImage) -> String {
        let next = format!("Im{}", self.images.len() + 1);
        self.images
            .entry(image.key.clone())
            .or_insert_with(|| (next, image.clone()))
            .0
            .clone()
    }

    /// Serialise every buffered page.
    pub fn finish(self) -> Result<Vec<u8>, PdfError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => Font::regular(1.0).base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        let bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => Font::bold(1.0).base_font(),
            "Encoding" => "WinAnsiEncoding",
        });

        let mut xobjects = lopdf::Dictionary::new();
        for (name, image) in self.images.values() {
            let mut stream = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => image.width as i64,
                    "Height" => image.height as i64,
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8_i64,
                },
                image.rgb.clone(),
            );
            if let Err(e) = stream.compress() {
                log::warn!("Image {name} left uncompressed: {e}");
            }
            let id = doc.add_object(stream);
            xobjects.set(name.as_bytes().to_vec(), id);
        }

        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                REGULAR_FONT => regular_id,
                BOLD_FONT => bold_id,
            },
            "XObject" => xobjects,
        });

        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());
        for operations in self.pages {
            let bytes = Content { operations }
                .encode()
                .map_err(|e| PdfError::Write(e.to_string()))?;
            let mut stream = Stream::new(dictionary! {}, bytes);
            if let Err(e) = stream.compress() {
                log::warn!("Page content left uncompressed: {e}");
            }
            let content_id = doc.add_object(stream);
            let page_id: ObjectId = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![
                    real(0.0),
                    real(0.0),
                    real(self.size.width),
                    real(self.size.height),
                ],
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out)
            .map_err(|e| PdfError::Write(e.to_string()))?;
        Ok(out)
    }
}

impl Surface for LopdfSurface {
    fn page_size(&self) -> PageSize {
        self.size
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let y = self.flip(rect.bottom());
        let ops = self.ops();
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new("rg", rgb_operands(color)));
        ops.push(Operation::new(
            "re",
            vec![real(rect.x), real(y), real(rect.w), real(rect.h)],
        ));
        ops.push(Operation::new("f", vec![]));
        ops.push(Operation::new("Q", vec![]));
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke) {
        let y = self.flip(rect.bottom());
        let ops = self.ops();
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new("RG", rgb_operands(stroke.color)));
        ops.push(Operation::new("w", vec![real(stroke.width)]));
        ops.push(Operation::new(
            "re",
            vec![real(rect.x), real(y), real(rect.w), real(rect.h)],
        ));
        ops.push(Operation::new("S", vec![]));
        ops.push(Operation::new("Q", vec![]));
    }

    fn line(&mut self, from: Point, to: Point, stroke: Stroke) {
        let (y0, y1) = (self.flip(from.y), self.flip(to.y));
        let ops = self.ops();
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new("RG", rgb_operands(stroke.color)));
        ops.push(Operation::new("w", vec![real(stroke.width)]));
        ops.push(Operation::new("m", vec![real(from.x), real(y0)]));
        ops.push(Operation::new("l", vec![real(to.x), real(y1)]));
        ops.push(Operation::new("S", vec![]));
        ops.push(Operation::new("Q", vec![]));
    }

    fn show_text(&mut self, line: &str, at: Point, font: Font, color: Color) {
        if line.is_empty() {
            return;
        }
        let baseline = self.flip(at.y + font.size * ASCENT);
        let ops = self.ops();
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![font_resource(font.weight).into(), real(font.size)],
        ));
        ops.push(Operation::new("rg", rgb_operands(color)));
        ops.push(Operation::new("Td", vec![real(at.x), real(baseline)]));
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(encode_win_ansi(line), StringFormat::Literal)],
        ));
        ops.push(Operation::new("ET", vec![]));
    }

    fn image(&mut self, image: &RasterImage, frame: Rect) {
        let name = self.image_name(image);
        let frame = fit_image(image, frame);
        let y = self.flip(frame.bottom());
        let ops = self.ops();
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new(
            "cm",
            vec![
                real(frame.w),
                real(0.0),
                real(0.0),
                real(frame.h),
                real(frame.x),
                real(y),
            ],
        ));
        ops.push(Operation::new("Do", vec![Object::Name(name.into_bytes())]));
        ops.push(Operation::new("Q", vec![]));
    }

    fn add_page(&mut self) {
        self.pages.push(Vec::new());
        self.current = self.pages.len() - 1;
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn current_page(&self) -> usize {
        self.current
    }

    fn switch_to_page(&mut self, index: usize) -> Result<(), PdfError> {
        if index >= self.pages.len() {
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

    fn logo(key: &str) -> RasterImage {
        RasterImage {
            key: key.to_string(),
            width: 1,
            height: 1,
            rgb: vec![255, 0, 0],
        }
    }

    #[test]
    fn test_finish_writes_every_page() {
        let mut s = LopdfSurface::new(PageSize::A4_LANDSCAPE);
        s.text(
            "BANCO DE HORAS",
            Rect::new(38.0, 40.0, 700.0, 20.0),
            &TextStyle::new(Font::bold(10.0)),
        );
        s.add_page();
        s.fill_rect(Rect::new(38.0, 127.0, 100.0, 22.0), Color::BLACK);
        let bytes = s.finish().unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn test_images_are_embedded_once() {
        let mut s = LopdfSurface::new(PageSize::A4_LANDSCAPE);
        s.image(&logo("left"), Rect::new(38.0, 30.0, 80.0, 80.0));
        s.add_page();
        s.image(&logo("left"), Rect::new(38.0, 30.0, 80.0, 80.0));
        s.image(&logo("right"), Rect::new(700.0, 30.0, 80.0, 80.0));
        assert_eq!(s.images.len(), 2);
        assert_eq!(s.images["left"].0, "Im1");
        assert_eq!(s.images["right"].0, "Im2");

        let bytes = s.finish().unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let image_count = doc
            .objects
            .values()
            .filter(|o| match o {
                Object::Stream(st) => st
                    .dict
                    .get(b"Subtype")
                    .and_then(|v| v.as_name())
                    .map(|n| n == b"Image")
                    .unwrap_or(false),
                _ => false,
            })
            .count();
        assert_eq!(image_count, 2);
    }

    #[test]
    fn test_image_keeps_aspect_ratio() {
        let wide = RasterImage {
            key: "wide".to_string(),
            width: 4,
            height: 1,
            rgb: vec![0; 12],
        };
        let mut s = LopdfSurface::new(PageSize::A4_LANDSCAPE);
        s.image(&wide, Rect::new(38.0, 30.0, 80.0, 80.0));

        let cm = s.pages[0].iter().find(|op| op.operator == "cm").unwrap();
        let operand = |i: usize| cm.operands[i].as_float().unwrap();
        assert!((operand(0) - 80.0).abs() < 1e-3);
        assert!((operand(3) - 20.0).abs() < 1e-3);
        assert!((operand(0) / operand(3) - 4.0).abs() < 1e-3);
        assert!((operand(4) - 38.0).abs() < 1e-3);
        // 20pt tall, centred vertically: top at 60, bottom at 80.
        let bottom = PageSize::A4_LANDSCAPE.height - 80.0;
        assert!((operand(5) - bottom).abs() < 1e-3);
    }

    #[test]
    fn test_tall_image_is_centred_horizontally() {
        let tall = RasterImage {
            key: "tall".to_string(),
            width: 1,
            height: 2,
            rgb: vec![0; 6],
        };
        let fitted = fit_image(&tall, Rect::new(0.0, 0.0, 80.0, 80.0));
        assert!((fitted.w - 40.0).abs() < 1e-3);
        assert!((fitted.h - 80.0).abs() < 1e-3);
        assert!((fitted.x - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_switch_to_page_bounds() {
        let mut s = LopdfSurface::new(PageSize::A4_LANDSCAPE);
        s.add_page();
        assert_eq!(s.current_page(), 1);
        s.switch_to_page(0).unwrap();
        assert_eq!(s.current_page(), 0);
        assert!(matches!(
            s.switch_to_page(2),
            Err(PdfError::PageOutOfRange(2))
        ));
    }

    #[test]
    fn test_coordinates_are_flipped() {
        let mut s = LopdfSurface::new(PageSize::A4_LANDSCAPE);
        s.fill_rect(Rect::new(10.0, 0.0, 20.0, 100.0), Color::WHITE);
        let re = s.pages[0]
            .iter()
            .find(|op| op.operator == "re")
            .unwrap();
        let y = re.operands[1].as_float().unwrap();
        assert!((y - (PageSize::A4_LANDSCAPE.height - 100.0)).abs() < 1e-3);
    }
}
