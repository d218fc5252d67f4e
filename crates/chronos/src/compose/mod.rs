//! Document composition.
//!
//! Every document is drawn against [`pdf::Surface`] from already aggregated
//! data and a [`BuildContext`]. Builders are synchronous and keep no state
//! between calls.

pub mod ledger;
pub mod movement;
pub mod proposal;

use chrono::{Datelike, Local, NaiveDate};
use chronos_core::period::PeriodList;
use pdf::{Align, Color, Font, LopdfSurface, PageSize, Rect, Surface, TextStyle, VAlign};

use crate::assets::Logos;

pub const PAGE: PageSize = PageSize::A4_LANDSCAPE;

pub const UNIVERSITY: &str = "UNIVERSIDAD NACIONAL AUTÓNOMA DE MÉXICO";
pub const FACULTY: &str = "FACULTAD DE ESTUDIOS SUPERIORES ARAGÓN";
pub const LOGO_LABEL: &str = "LOGO";

const MONTHS: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// Inputs shared by every page of one build.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub periods: PeriodList,
    pub logos: Logos,
    /// Date printed on proposal footers.
    pub today: NaiveDate,
}

impl BuildContext {
    pub fn new(periods: PeriodList, logos: Logos) -> Self {
        Self {
            periods,
            logos,
            today: Local::now().date_naive(),
        }
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }
}

/// `Nezahualcóyotl, Estado de México, a DD de Mes del YYYY`.
pub fn footer_date_line(date: NaiveDate) -> String {
    let month = MONTHS[date.month0() as usize];
    format!(
        "Nezahualcóyotl, Estado de México, a {:02} de {} del {}",
        date.day(),
        month,
        date.year()
    )
}

pub fn new_surface() -> LopdfSurface {
    LopdfSurface::new(PAGE)
}

/// Both logos, or placeholders where they are missing.
pub fn draw_logos(surface: &mut dyn Surface, logos: &Logos, left: Rect, right: Rect) {
    pdf::draw_image_or_placeholder(surface, logos.left.as_ref(), left, LOGO_LABEL);
    pdf::draw_image_or_placeholder(surface, logos.right.as_ref(), right, LOGO_LABEL);
}

/// Centred bold title lines starting at `top`; each line advances by its
/// size plus `gap`. Returns the `y` below the last line.
pub fn draw_titles(
    surface: &mut dyn Surface,
    lines: &[(&str, f32)],
    x: f32,
    width: f32,
    top: f32,
    gap: f32,
) -> f32 {
    let mut y = top;
    for (text, size) in lines {
        let style = TextStyle::new(Font::bold(*size))
            .align(Align::Center)
            .valign(VAlign::Top);
        surface.text(text, Rect::new(x, y, width, size * 1.2), &style);
        y += size + gap;
    }
    y
}

/// One line of text clamped to `width` with an ellipsis.
pub fn draw_clamped(
    surface: &mut dyn Surface,
    text: &str,
    at: pdf::Point,
    width: f32,
    font: Font,
    color: Color,
) {
    let line = pdf::layout::clamp_text(text, width, font);
    surface.show_text(&line, at, font, color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdf::RecordingSurface;

    #[test]
    fn test_footer_date_line() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        assert_eq!(
            footer_date_line(date),
            "Nezahualcóyotl, Estado de México, a 05 de Marzo del 2026"
        );
        let date = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert!(footer_date_line(date).ends_with("31 de Diciembre del 2025"));
    }

    #[test]
    fn test_missing_logos_draw_placeholders() {
        let mut s = RecordingSurface::new(PAGE);
        draw_logos(
            &mut s,
            &Logos::default(),
            Rect::new(38.0, 30.0, 80.0, 80.0),
            Rect::new(723.89, 30.0, 80.0, 80.0),
        );
        assert_eq!(s.texts(), vec![LOGO_LABEL, LOGO_LABEL]);
    }

    #[test]
    fn test_titles_advance_by_size_and_gap() {
        let mut s = RecordingSurface::new(PAGE);
        let bottom = draw_titles(&mut s, &[(UNIVERSITY, 13.0), (FACULTY, 12.0)], 0.0, PAGE.width, 40.0, 3.0);
        assert_eq!(bottom, 40.0 + 16.0 + 15.0);
        assert_eq!(s.find_text(FACULTY).unwrap().1.y, 56.0);
    }
}
