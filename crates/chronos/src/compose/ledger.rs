//! The hour-bank ledger ("BANCO DE HORAS").
//!
//! One block per holder: a `PARCIAL` row per appointment title, then a
//! `TOTAL` row. Each row shows `HT / HP` and their sum for every configured
//! period. Rows are never split across pages; the banded header is replayed
//! on each new page and the footer is stamped once the page count is known.

use chronos_core::aggregate::{
    summarize_holders, HolderKey, HolderSummary, HourPair, SubjectBucket, NOT_AVAILABLE,
};
use chronos_core::records::{AssignmentRecord, RosterEntry};
use pdf::layout::{split_even, Cell, Grid, GridStyle};
use pdf::{
    stamp_footers, Align, Color, Font, Paginator, PdfError, Point, Rect, Stroke, Surface,
    TextStyle, VAlign,
};

use super::{draw_clamped, draw_logos, draw_titles, new_surface, BuildContext, FACULTY, PAGE, UNIVERSITY};
use crate::prelude::*;

const MARGIN: f32 = 38.0;
const COL_ACADEMIC: f32 = 180.0;
const COL_CAREER: f32 = 120.0;
const COL_TITLE: f32 = 135.0;
const COL_KIND: f32 = 60.0;
const FIXED_COLUMNS: usize = 4;

const LOGO_TOP: f32 = 30.0;
const LOGO_SIZE: f32 = 80.0;
const TITLE_TOP: f32 = 40.0;
const HEADER_TOP: f32 = 127.0;
const BAND_H: f32 = 22.0;

const MIN_ROW_H: f32 = 40.0;
const HOLDER_GAP: f32 = 14.0;
const FOOTER_RESERVE: f32 = 24.0;
const PAGE_LABEL_W: f32 = 70.0;
const CELL_PAD: f32 = 6.0;
const IDENTITY_PAD: f32 = 8.0;

const NAME_FONT: f32 = 9.5;
const META_FONT: f32 = 8.0;
const TITLE_FONT: f32 = 8.5;

const KIND_FILL: Color = Color::rgb(0xE9, 0xE9, 0xE9);
const TOTAL_FILL: Color = Color::rgb(0xF5, 0xF5, 0xF5);
const GRID_LINE: Color = Color::rgb(0xBD, 0xBD, 0xBD);
const FOOTER_TEXT: Color = Color::rgb(0x66, 0x66, 0x66);
const FOOTER_LINE: Color = Color::rgb(0xCF, 0xCF, 0xCF);

pub const DOCUMENT_TITLE: &str = "BANCO DE HORAS";
pub const NO_DATA: &str = "SIN DATOS";

/// Lowest `y` a ledger row may reach.
pub const ROWS_BOTTOM: f32 = PAGE.height - MARGIN - FOOTER_RESERVE;

/// Caller overrides for the ledger.
#[derive(Debug, Clone, Default)]
pub struct LedgerOptions {
    /// Semester printed under the document title; defaults to the last
    /// configured period.
    pub semester: Option<String>,
    pub observations: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowKind {
    Partial,
    Total,
}

impl RowKind {
    fn label(self) -> &'static str {
        match self {
            RowKind::Partial => "PARCIAL",
            RowKind::Total => "TOTAL",
        }
    }
}

struct LedgerRow<'a> {
    identity: Option<&'a HolderKey>,
    career: Option<&'a str>,
    title: &'a str,
    kind: RowKind,
    slots: Vec<HourPair>,
}

/// Column geometry: four fixed columns, then one per period sharing what is
/// left.
struct Columns {
    widths: Vec<f32>,
    offsets: Vec<f32>,
    labels: Vec<String>,
}

impl Columns {
    fn new(labels: Vec<String>) -> Self {
        let content = PAGE.width - 2.0 * MARGIN;
        let fixed = COL_ACADEMIC + COL_CAREER + COL_TITLE + COL_KIND;
        let mut widths = vec![COL_ACADEMIC, COL_CAREER, COL_TITLE, COL_KIND];
        widths.extend(split_even(content - fixed, labels.len()));

        let mut offsets = Vec::with_capacity(widths.len());
        let mut x = MARGIN;
        for w in &widths {
            offsets.push(x);
            x += w;
        }
        Self {
            widths,
            offsets,
            labels,
        }
    }

    fn rect(&self, col: usize, y: f32, h: f32) -> Rect {
        Rect::new(self.offsets[col], y, self.widths[col], h)
    }

    fn content_width(&self) -> f32 {
        self.widths.iter().sum()
    }
}

/// Render the ledger for every holder in `records`.
pub fn render_ledger(
    records: &[AssignmentRecord],
    roster: &[RosterEntry],
    ctx: &BuildContext,
    options: &LedgerOptions,
) -> Result<Vec<u8>, Error> {
    let holders = summarize_holders(records, roster, &ctx.periods);
    log::info!(
        "Ledger: {} holders from {} assignments",
        holders.len(),
        records.len()
    );
    let mut surface = new_surface();
    draw_ledger(&mut surface, &holders, ctx, options)?;
    Ok(surface.finish()?)
}

/// Stand-in holder drawn when there is nothing to report.
pub fn placeholder_holder(slot_count: usize) -> HolderSummary {
    HolderSummary {
        key: HolderKey {
            name: NO_DATA.to_string(),
            tax_id: NOT_AVAILABLE.to_string(),
            worker: NOT_AVAILABLE.to_string(),
        },
        career: NOT_AVAILABLE.to_string(),
        subjects: vec![SubjectBucket {
            title: NOT_AVAILABLE.to_string(),
            slots: vec![HourPair::default(); slot_count],
        }],
    }
}

/// Draw the ledger onto `surface`, which must hold one empty page.
pub fn draw_ledger(
    surface: &mut dyn Surface,
    holders: &[HolderSummary],
    ctx: &BuildContext,
    options: &LedgerOptions,
) -> Result<(), PdfError> {
    let columns = Columns::new(ctx.periods.labels());
    let semester = options
        .semester
        .clone()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| columns.labels.last().cloned())
        .unwrap_or_default();

    let header = |s: &mut dyn Surface, _top: f32| -> f32 { draw_page_header(s, ctx, &columns, &semester) };

    let placeholder;
    let holders = if holders.is_empty() {
        placeholder = [placeholder_holder(ctx.periods.len())];
        &placeholder[..]
    } else {
        holders
    };

    let first = header(surface, 0.0);
    let mut pager = Paginator::new(0.0, ROWS_BOTTOM, first);
    for holder in holders {
        for row in holder_rows(holder) {
            let h = measure_row(surface, &row);
            let y = pager.ensure_fits(surface, h, &header);
            draw_row(surface, &columns, &row, y, h);
            pager.advance(h);
        }
        pager.advance(HOLDER_GAP);
    }

    let observations = options.observations.clone().unwrap_or_default();
    stamp_footers(surface, |s, page, total| {
        draw_footer(s, &columns, &observations, page, total)
    })
}

fn holder_rows(holder: &HolderSummary) -> Vec<LedgerRow<'_>> {
    let mut rows: Vec<LedgerRow> = holder
        .subjects
        .iter()
        .enumerate()
        .map(|(i, subject)| LedgerRow {
            identity: (i == 0).then_some(&holder.key),
            career: Some(holder.career.as_str()),
            title: subject.title.as_str(),
            kind: RowKind::Partial,
            slots: subject.slots.clone(),
        })
        .collect();
    rows.push(LedgerRow {
        identity: rows.is_empty().then_some(&holder.key),
        career: None,
        title: "",
        kind: RowKind::Total,
        slots: holder.totals(),
    });
    rows
}

/// Hour count as printed: at most two decimals, none when whole.
fn hours(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    f!("{}", rounded + 0.0)
}

fn identity_meta(key: &HolderKey) -> String {
    f!("RFC: {}\nNÚMERO DE TRABAJADOR: {}", key.tax_id, key.worker)
}

/// Height a row needs: the identity block and the wrapped title, never less
/// than [`MIN_ROW_H`].
fn measure_row(surface: &dyn Surface, row: &LedgerRow) -> f32 {
    let text_w = COL_ACADEMIC - 2.0 * IDENTITY_PAD;
    let identity_h = row.identity.map_or(0.0, |key| {
        let name_h = surface.measure_height(&key.name, text_w, Font::bold(NAME_FONT));
        let meta_h = surface.measure_height(&identity_meta(key), text_w, Font::regular(META_FONT));
        4.0 + name_h + 4.0 + meta_h + 4.0
    });
    let title_w = COL_TITLE - 2.0 * CELL_PAD;
    let title_h = surface.measure_height(row.title, title_w, Font::regular(TITLE_FONT)) + 2.0 * CELL_PAD;
    pdf::layout::row_height(&[identity_h.max(title_h).max(24.0).ceil()], MIN_ROW_H)
}

fn draw_row(surface: &mut dyn Surface, columns: &Columns, row: &LedgerRow, y: f32, h: f32) {
    let mut grid = Grid::new(
        Point::new(MARGIN, y),
        columns.content_width(),
        1,
        columns.widths.len(),
    )
    .with_column_widths(&columns.widths)
    .with_row_heights(&[h]);

    if let Some(career) = row.career {
        grid.set(0, 1, Cell::new(career));
    }
    grid.set(0, 2, Cell::new(row.title).valign(VAlign::Top));
    grid.set(0, 3, Cell::new(row.kind.label()).fill(KIND_FILL).bold().size(9.0));
    for (i, slot) in row.slots.iter().take(columns.labels.len()).enumerate() {
        let text = f!(
            "{} / {}\n{}",
            hours(slot.theoretical),
            hours(slot.practical),
            hours(slot.sum())
        );
        grid.set(0, FIXED_COLUMNS + i, Cell::new(text).bold().size(9.0));
    }

    let style = GridStyle {
        font_size: TITLE_FONT,
        padding: CELL_PAD,
        border: Some(Stroke::new(GRID_LINE, 0.6)),
        body_fill: (row.kind == RowKind::Total).then_some(TOTAL_FILL),
        ..GridStyle::default()
    };
    grid.draw(surface, &style);

    // Cells carry one font; the identity block mixes two.
    if let Some(key) = row.identity {
        let academic = columns.rect(0, y, h);
        let text_w = academic.w - 2.0 * IDENTITY_PAD;
        let name_font = Font::bold(NAME_FONT);
        let name_h = surface.measure_height(&key.name, text_w, name_font);
        surface.text(
            &key.name,
            Rect::new(academic.x + IDENTITY_PAD, y + 4.0, text_w, name_h),
            &TextStyle::new(name_font),
        );
        let meta = identity_meta(key);
        let meta_font = Font::regular(META_FONT);
        let meta_h = surface.measure_height(&meta, text_w, meta_font);
        surface.text(
            &meta,
            Rect::new(academic.x + IDENTITY_PAD, y + 4.0 + name_h + 4.0, text_w, meta_h),
            &TextStyle::new(meta_font),
        );
    }
}

fn draw_page_header(
    surface: &mut dyn Surface,
    ctx: &BuildContext,
    columns: &Columns,
    semester: &str,
) -> f32 {
    draw_logos(
        surface,
        &ctx.logos,
        Rect::new(MARGIN, LOGO_TOP, LOGO_SIZE, LOGO_SIZE),
        Rect::new(PAGE.width - MARGIN - LOGO_SIZE, LOGO_TOP, LOGO_SIZE, LOGO_SIZE),
    );
    let semester_line = f!("SEMESTRE {semester}");
    draw_titles(
        surface,
        &[
            (UNIVERSITY, 13.0),
            (FACULTY, 12.0),
            (DOCUMENT_TITLE, 10.0),
            (semester_line.as_str(), 10.0),
        ],
        MARGIN + LOGO_SIZE,
        PAGE.width - 2.0 * (MARGIN + LOGO_SIZE),
        TITLE_TOP,
        3.0,
    );

    let periods = columns.labels.len();
    let mut grid = Grid::new(
        Point::new(MARGIN, HEADER_TOP),
        columns.content_width(),
        3,
        FIXED_COLUMNS + periods,
    )
    .with_column_widths(&columns.widths)
    .with_row_heights(&[BAND_H; 3]);

    grid.set(0, 0, Cell::new("ACADÉMICO").row_span(3).valign(VAlign::Top));
    grid.set(0, 1, Cell::new("CARRERA").row_span(3).valign(VAlign::Top));
    grid.set(0, 2, Cell::new("NOMBRAMIENTO").span(2).row_span(3).valign(VAlign::Top));
    grid.set(0, FIXED_COLUMNS, Cell::new("SEMESTRE").span(periods).valign(VAlign::Top));
    for (i, label) in columns.labels.iter().enumerate() {
        grid.set(1, FIXED_COLUMNS + i, Cell::new(label.as_str()));
        grid.set(2, FIXED_COLUMNS + i, Cell::new("HT / HP"));
    }

    let style = GridStyle {
        font_size: 9.0,
        border: Some(Stroke::new(Color::WHITE, 0.8)),
        header_rows: 3,
        header_fill: Some(Color::BLACK),
        header_text: Color::WHITE,
        header_bold: true,
        ..GridStyle::default()
    };
    grid.draw(surface, &style)
}

fn draw_footer(surface: &mut dyn Surface, columns: &Columns, observations: &str, page: usize, total: usize) {
    let y = PAGE.height - MARGIN - 10.0;
    let font = Font::regular(8.0);
    let label = "Observaciones:";
    surface.show_text(label, Point::new(MARGIN, y), font, FOOTER_TEXT);

    let label_w = surface.measure_width(label, font);
    let obs_w = columns.content_width() - PAGE_LABEL_W;
    let line_start = MARGIN + label_w + 6.0;
    let line_end = MARGIN + obs_w - 8.0;
    surface.line(
        Point::new(line_start, y + 8.0),
        Point::new(line_end, y + 8.0),
        Stroke::new(FOOTER_LINE, 0.6),
    );
    if !observations.trim().is_empty() {
        draw_clamped(
            surface,
            observations.trim(),
            Point::new(line_start + 2.0, y - 1.0),
            line_end - line_start - 2.0,
            font,
            Color::BLACK,
        );
    }

    surface.text(
        &f!("Página {page} de {total}"),
        Rect::new(MARGIN + obs_w, y, PAGE_LABEL_W, 10.0),
        &TextStyle::new(font).color(FOOTER_TEXT).align(Align::Right),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::Logos;
    use chronos_core::period::PeriodList;
    use pdf::recording::DrawOp;
    use pdf::RecordingSurface;
    use serde_json::json;

    fn ctx() -> BuildContext {
        BuildContext::new(PeriodList::parse("2024-II,2025-I").unwrap(), Logos::default())
    }

    fn record(name: &str, tax: &str, month: i64, year: i64, teo: i64, pra: i64) -> AssignmentRecord {
        serde_json::from_value(json!({
            "profesor": name,
            "rfc": tax,
            "numTrabajador": "100",
            "categoria": "PROF. ASIG. \"B\"",
            "mesIni": month,
            "anoIni": year,
            "horasTeoricas": teo,
            "horasPracticas": pra,
        }))
        .unwrap()
    }

    fn kind_rows(s: &RecordingSurface) -> Vec<(usize, Rect)> {
        s.fills()
            .into_iter()
            .filter(|(_, _, c)| *c == KIND_FILL)
            .map(|(p, r, _)| (p, r))
            .collect()
    }

    #[test]
    fn test_holder_block_has_partial_and_total_rows() {
        let records = vec![record("ANA", "X1", 8, 24, 4, 0), record("ANA", "X1", 2, 25, 2, 1)];
        let holders = summarize_holders(&records, &[], &ctx().periods);
        let mut s = RecordingSurface::new(PAGE);
        draw_ledger(&mut s, &holders, &ctx(), &LedgerOptions::default()).unwrap();

        let texts = s.texts();
        assert_eq!(texts.iter().filter(|t| **t == "PARCIAL").count(), 1);
        assert_eq!(texts.iter().filter(|t| **t == "TOTAL").count(), 1);
        assert_eq!(texts.iter().filter(|t| **t == "ANA").count(), 1);
        assert!(s.contains_text("PROFESOR DE ASIGNATURA \"B\""));
        // Slots [[4,0],[2,1]] on the partial row and the total row.
        assert_eq!(texts.iter().filter(|t| **t == "4 / 0").count(), 2);
        assert_eq!(texts.iter().filter(|t| **t == "2 / 1").count(), 2);
        assert!(s.contains_text("SEMESTRE 2025-I"));
        assert_eq!(s.texts_on(0).last(), Some(&"Página 1 de 1"));
    }

    #[test]
    fn test_rows_share_the_grid_engine() {
        let records = vec![record("ANA", "X1", 8, 24, 4, 2)];
        let holders = summarize_holders(&records, &[], &ctx().periods);
        let mut s = RecordingSurface::new(PAGE);
        draw_ledger(&mut s, &holders, &ctx(), &LedgerOptions::default()).unwrap();

        // Every total-row cell but the kind cell takes the row fill.
        let total_cells: Vec<Rect> = s
            .fills()
            .into_iter()
            .filter(|(_, _, c)| *c == TOTAL_FILL)
            .map(|(_, r, _)| r)
            .collect();
        assert_eq!(total_cells.len(), FIXED_COLUMNS + 2 - 1);
        let columns = Columns::new(ctx().periods.labels());
        let right = total_cells.iter().map(|r| r.right()).fold(0.0_f32, f32::max);
        assert!((right - (MARGIN + columns.content_width())).abs() < 1e-3);
        assert!(total_cells.windows(2).all(|w| w[0].y == w[1].y));

        let (_, _, font) = s.find_text("4 / 2").unwrap();
        assert_eq!(font, Font::bold(9.0));
        assert!(s.texts().contains(&"6"));
    }

    #[test]
    fn test_hours_print_without_float_noise() {
        assert_eq!(hours(4.0), "4");
        assert_eq!(hours(0.1 + 0.2), "0.3");
        assert_eq!(hours(1.5), "1.5");
        assert_eq!(hours(-0.0), "0");
    }

    #[test]
    fn test_no_data_renders_placeholder() {
        let mut s = RecordingSurface::new(PAGE);
        draw_ledger(&mut s, &[], &ctx(), &LedgerOptions::default()).unwrap();
        assert!(s.contains_text(NO_DATA));
        assert_eq!(s.page_count(), 1);
    }

    #[test]
    fn test_rows_break_pages_and_replay_header() {
        let records: Vec<AssignmentRecord> = (0..40)
            .map(|i| record(&f!("HOLDER {i}"), &f!("T{i}"), 8, 24, 4, 0))
            .collect();
        let holders = summarize_holders(&records, &[], &ctx().periods);
        let mut s = RecordingSurface::new(PAGE);
        draw_ledger(&mut s, &holders, &ctx(), &LedgerOptions::default()).unwrap();

        let pages = s.page_count();
        assert!(pages > 1);
        for page in 0..pages {
            let texts = s.texts_on(page);
            assert!(texts.contains(&"ACADÉMICO"), "page {page} lacks header");
            assert!(texts.contains(&f!("Página {} de {}", page + 1, pages).as_str()));
        }
        let rows = kind_rows(&s);
        assert_eq!(rows.len(), 80);
        for (_, rect) in rows {
            assert!(rect.bottom() <= ROWS_BOTTOM + 1e-3);
            assert!(rect.y >= HEADER_TOP + 3.0 * BAND_H - 1e-3);
        }
    }

    #[test]
    fn test_row_height_floor_and_growth() {
        let s = RecordingSurface::new(PAGE);
        let key = HolderKey {
            name: "ANA".into(),
            tax_id: "X1".into(),
            worker: "1".into(),
        };
        let short = LedgerRow {
            identity: None,
            career: None,
            title: "",
            kind: RowKind::Total,
            slots: vec![],
        };
        assert_eq!(measure_row(&s, &short), MIN_ROW_H);

        let long_name = "MARIA DE LOS ANGELES GUADALUPE HERNANDEZ DE LA CONCEPCION RODRIGUEZ";
        let tall_key = HolderKey {
            name: long_name.into(),
            ..key
        };
        let tall = LedgerRow {
            identity: Some(&tall_key),
            ..short
        };
        assert!(measure_row(&s, &tall) > MIN_ROW_H);
    }

    #[test]
    fn test_footer_observations_and_page_label() {
        let mut s = RecordingSurface::new(PAGE);
        let options = LedgerOptions {
            semester: Some("2026-I".into()),
            observations: Some("Revisado".into()),
        };
        draw_ledger(&mut s, &[], &ctx(), &options).unwrap();
        assert!(s.contains_text("SEMESTRE 2026-I"));
        assert!(s.contains_text("Revisado"));
        assert!(s
            .ops
            .iter()
            .any(|r| matches!(r.op, DrawOp::Line { stroke, .. } if stroke.color == FOOTER_LINE)));
    }

    #[test]
    fn test_render_ledger_produces_pdf() {
        let records = vec![record("ANA", "X1", 8, 24, 4, 0)];
        let bytes = render_ledger(&records, &[], &ctx(), &LedgerOptions::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
