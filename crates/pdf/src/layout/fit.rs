use crate::metrics;
use crate::surface::Surface;
use crate::types::Font;

/// Step between candidate font sizes when fitting text.
pub const FIT_STEP: f32 = 0.5;

/// Largest font size, from `max` down to `min` in [`FIT_STEP`] steps, at
/// which `text` wrapped to `width` is no taller than `available`.
///
/// Falls back to `min` when nothing fits; the text then overflows.
pub fn fit_font_size(
    surface: &dyn Surface,
    text: &str,
    width: f32,
    available: f32,
    font: Font,
    max: f32,
    min: f32,
) -> f32 {
    let mut size = max;
    while size >= min {
        if surface.measure_height(text, width, font.with_size(size)) <= available {
            return size;
        }
        size -= FIT_STEP;
    }
    min
}

/// Final height of a row: the tallest requirement, never below `min`.
pub fn row_height(required: &[f32], min: f32) -> f32 {
    required.iter().copied().fold(min, f32::max)
}

/// `text` as a single line no wider than `width`, ellipsised if cut.
pub fn clamp_text(text: &str, width: f32, font: Font) -> String {
    metrics::clamp_with_ellipsis(text, width, font)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordingSurface;
    use crate::types::PageSize;

    #[test]
    fn test_fit_keeps_max_when_it_fits() {
        let s = RecordingSurface::new(PageSize::A4_LANDSCAPE);
        let size = fit_font_size(&s, "ASIGNATURA", 200.0, 18.0, Font::regular(8.0), 8.0, 6.0);
        assert_eq!(size, 8.0);
    }

    #[test]
    fn test_fit_shrinks_until_it_fits() {
        let s = RecordingSurface::new(PageSize::A4_LANDSCAPE);
        // Two lines at 8pt need 18.4pt; at 7.5pt 17.25pt.
        let text = "INGENIERIA DE SISTEMAS";
        let width = metrics::text_width("INGENIERIA DE", Font::regular(8.0)) + 1.0;
        let size = fit_font_size(&s, text, width, 18.0, Font::regular(8.0), 8.0, 6.0);
        assert_eq!(size, 7.5);
    }

    #[test]
    fn test_fit_falls_back_to_min() {
        let s = RecordingSurface::new(PageSize::A4_LANDSCAPE);
        let size = fit_font_size(&s, "A B C D E F G", 5.0, 5.0, Font::regular(8.0), 8.0, 6.0);
        assert_eq!(size, 6.0);
    }

    #[test]
    fn test_row_height_floors_at_min() {
        assert_eq!(row_height(&[12.0, 31.5, 24.0], 40.0), 40.0);
        assert_eq!(row_height(&[12.0, 51.5], 40.0), 51.5);
        assert_eq!(row_height(&[], 22.0), 22.0);
    }

    #[test]
    fn test_clamp_text() {
        let font = Font::regular(8.0);
        assert_eq!(clamp_text("  LUN   7-9 ", 100.0, font), "LUN 7-9");
        assert!(clamp_text("LUNES A VIERNES DE 7 A 9", 40.0, font).ends_with('…'));
    }
}
