use crate::types::{ImageFormat, RasterImage};
use crate::PdfError;

/// Longest side, in pixels, an embedded image is reduced to.
pub const MAX_EMBED_PIXELS: u32 = 600;

/// Detect the image format from raw bytes using magic byte signatures.
///
/// Returns `ImageFormat::Unknown` if the bytes are too short (< 8) or no
/// known signature matches.
pub fn detect_image_format(bytes: &[u8]) -> ImageFormat {
    if bytes.len() < 8 {
        return ImageFormat::Unknown;
    }

    // JPEG: FF D8 FF
    if bytes[..3] == [0xFF, 0xD8, 0xFF] {
        return ImageFormat::Jpeg;
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if bytes[..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] {
        return ImageFormat::Png;
    }

    if &bytes[..6] == b"GIF87a" || &bytes[..6] == b"GIF89a" {
        return ImageFormat::Gif;
    }

    if &bytes[..2] == b"BM" {
        return ImageFormat::Bmp;
    }

    // WebP: "RIFF" at offset 0 and "WEBP" at offset 8
    if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return ImageFormat::WebP;
    }

    ImageFormat::Unknown
}

/// Decode PNG or JPEG bytes into RGB pixels.
///
/// Images larger than [`MAX_EMBED_PIXELS`] on either side are downscaled,
/// keeping the aspect ratio. Transparent pixels are composited over white.
pub fn decode_image(key: &str, bytes: &[u8]) -> Result<RasterImage, PdfError> {
    let format = match detect_image_format(bytes) {
        ImageFormat::Png => image::ImageFormat::Png,
        ImageFormat::Jpeg => image::ImageFormat::Jpeg,
        other => return Err(PdfError::UnsupportedImage(other)),
    };

    let decoded = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| PdfError::Image(e.to_string()))?;
    let decoded = if decoded.width() > MAX_EMBED_PIXELS || decoded.height() > MAX_EMBED_PIXELS {
        decoded.thumbnail(MAX_EMBED_PIXELS, MAX_EMBED_PIXELS)
    } else {
        decoded
    };

    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
    for px in rgba.pixels() {
        let [r, g, b, a] = px.0;
        rgb.extend([r, g, b].map(|c| over_white(c, a)));
    }

    Ok(RasterImage {
        key: key.to_string(),
        width,
        height,
        rgb,
    })
}

fn over_white(channel: u8, alpha: u8) -> u8 {
    let a = alpha as u32;
    ((channel as u32 * a + 255 * (255 - a) + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(img: image::RgbaImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_detect_formats() {
        assert_eq!(
            detect_image_format(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0]),
            ImageFormat::Jpeg
        );
        assert_eq!(
            detect_image_format(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
            ImageFormat::Png
        );
        assert_eq!(detect_image_format(b"GIF89a\0\0"), ImageFormat::Gif);
        assert_eq!(detect_image_format(b"BM\0\0\0\0\0\0"), ImageFormat::Bmp);
        assert_eq!(detect_image_format(b"RIFF\0\0\0\0WEBP"), ImageFormat::WebP);
        assert_eq!(detect_image_format(b"short"), ImageFormat::Unknown);
        assert_eq!(detect_image_format(b"<html>...</html>"), ImageFormat::Unknown);
    }

    #[test]
    fn test_decode_rejects_unsupported() {
        let err = decode_image("logo", b"GIF89a\0\0\0\0").unwrap_err();
        assert!(matches!(err, PdfError::UnsupportedImage(ImageFormat::Gif)));
    }

    #[test]
    fn test_decode_flattens_alpha_over_white() {
        let mut img = image::RgbaImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgba([0, 0, 0, 255]));
        img.put_pixel(1, 0, image::Rgba([0, 0, 0, 0]));
        let raster = decode_image("logo", &png_bytes(img)).unwrap();
        assert_eq!(raster.width, 2);
        assert_eq!(raster.height, 1);
        assert_eq!(raster.rgb, vec![0, 0, 0, 255, 255, 255]);
    }

    #[test]
    fn test_decode_downscales_large_images() {
        let img = image::RgbaImage::from_pixel(1200, 300, image::Rgba([10, 20, 30, 255]));
        let raster = decode_image("big", &png_bytes(img)).unwrap();
        assert_eq!(raster.width, MAX_EMBED_PIXELS);
        assert_eq!(raster.height, 150);
        assert_eq!(raster.rgb.len(), (raster.width * raster.height * 3) as usize);
    }

    #[test]
    fn test_over_white() {
        assert_eq!(over_white(0, 255), 0);
        assert_eq!(over_white(0, 0), 255);
        assert_eq!(over_white(100, 255), 100);
    }
}
