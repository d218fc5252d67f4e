//! Page breaking with a repeated header band and deferred footers.

use crate::surface::Surface;
use crate::PdfError;

/// Something drawn at the top of every page.
pub trait HeaderBand {
    /// Draw the band starting at `top` and return the first free `y` below it.
    fn draw(&self, surface: &mut dyn Surface, top: f32) -> f32;
}

impl<F> HeaderBand for F
where
    F: Fn(&mut dyn Surface, f32) -> f32,
{
    fn draw(&self, surface: &mut dyn Surface, top: f32) -> f32 {
        self(surface, top)
    }
}

/// Tracks the vertical cursor and breaks pages before a row would cross the
/// bottom margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paginator {
    /// Where the header band starts on a fresh page.
    pub top: f32,
    /// Lowest `y` any row may reach.
    pub bottom: f32,
    cursor: f32,
    page_start: f32,
}

impl Paginator {
    /// `cursor` is the first free `y` on the current page, usually just
    /// below its header band.
    pub fn new(top: f32, bottom: f32, cursor: f32) -> Self {
        Self {
            top,
            bottom,
            cursor,
            page_start: cursor,
        }
    }

    pub fn cursor(&self) -> f32 {
        self.cursor
    }

    pub fn advance(&mut self, dy: f32) {
        self.cursor += dy;
    }

    /// Make room for a block `required` points tall.
    ///
    /// When the block would cross the bottom margin a new page is started,
    /// the header is replayed and the cursor moves below it. A block taller
    /// than an empty page is left on the current page rather than breaking
    /// forever. Returns the cursor the block should be drawn at.
    pub fn ensure_fits(
        &mut self,
        surface: &mut dyn Surface,
        required: f32,
        header: &dyn HeaderBand,
    ) -> f32 {
        let page_is_empty = self.cursor <= self.page_start;
        if self.cursor + required > self.bottom && !page_is_empty {
            surface.add_page();
            self.cursor = header.draw(surface, self.top);
            self.page_start = self.cursor;
            log::debug!("page break, now on page {}", surface.page_count());
        }
        self.cursor
    }
}

/// Revisit every page once all of them exist and let `footer` draw on it
/// with its one-based number and the total count.
pub fn stamp_footers<F>(surface: &mut dyn Surface, mut footer: F) -> Result<(), PdfError>
where
    F: FnMut(&mut dyn Surface, usize, usize),
{
    let total = surface.page_count();
    for index in 0..total {
        surface.switch_to_page(index)?;
        footer(&mut *surface, index + 1, total);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordingSurface;
    use crate::types::{Color, Font, PageSize, Point, Rect};

    fn band(surface: &mut dyn Surface, top: f32) -> f32 {
        surface.show_text("HEADER", Point::new(0.0, top), Font::bold(9.0), Color::BLACK);
        top + 50.0
    }

    #[test]
    fn test_row_that_fits_stays() {
        let mut s = RecordingSurface::new(PageSize::A4_LANDSCAPE);
        let mut p = Paginator::new(20.0, 500.0, 100.0);
        p.advance(10.0);
        assert_eq!(p.ensure_fits(&mut s, 40.0, &band), 110.0);
        assert_eq!(s.page_count(), 1);
    }

    #[test]
    fn test_break_replays_header() {
        let mut s = RecordingSurface::new(PageSize::A4_LANDSCAPE);
        let mut p = Paginator::new(20.0, 500.0, 70.0);
        p.advance(400.0);
        let y = p.ensure_fits(&mut s, 40.0, &band);
        assert_eq!(y, 70.0);
        assert_eq!(s.page_count(), 2);
        assert_eq!(s.texts_on(1), vec!["HEADER"]);
    }

    #[test]
    fn test_rows_never_cross_bottom() {
        let mut s = RecordingSurface::new(PageSize::A4_LANDSCAPE);
        let mut p = Paginator::new(20.0, 500.0, 70.0);
        let heights = [40.0, 55.5, 61.0, 40.0, 90.0, 40.0, 44.0, 120.0, 40.0, 40.0, 73.0];
        for h in heights.iter().cycle().take(60) {
            let y = p.ensure_fits(&mut s, *h, &band);
            s.fill_rect(Rect::new(0.0, y, 10.0, *h), Color::BLACK);
            p.advance(*h);
        }
        for (_, rect, _) in s.fills() {
            assert!(rect.bottom() <= 500.0);
            assert!(rect.y >= 70.0);
        }
        assert!(s.page_count() > 1);
    }

    #[test]
    fn test_oversized_row_on_fresh_page_does_not_loop() {
        let mut s = RecordingSurface::new(PageSize::A4_LANDSCAPE);
        let mut p = Paginator::new(20.0, 500.0, 70.0);
        assert_eq!(p.ensure_fits(&mut s, 1000.0, &band), 70.0);
        assert_eq!(s.page_count(), 1);
    }

    #[test]
    fn test_stamp_footers_sees_total() {
        let mut s = RecordingSurface::new(PageSize::A4_LANDSCAPE);
        s.add_page();
        s.add_page();
        stamp_footers(&mut s, |surface, n, total| {
            surface.show_text(
                &format!("Página {n} de {total}"),
                Point::new(0.0, 550.0),
                Font::regular(8.0),
                Color::BLACK,
            );
        })
        .unwrap();
        assert_eq!(s.texts_on(0), vec!["Página 1 de 3"]);
        assert_eq!(s.texts_on(2), vec!["Página 3 de 3"]);
    }
}
