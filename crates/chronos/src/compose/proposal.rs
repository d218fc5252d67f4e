//! Per-holder movement proposals ("FORMA DE MOVIMIENTOS DE PERSONAL
//! ACADÉMICO").
//!
//! A holder's proposal is one sheet per career. Each sheet has a header
//! with logos and titles, the career/unit bar, the assignment table, a
//! totals row, an observation line and the signature footer. A sheet whose
//! rows overflow continues on a new page with the whole frame redrawn.

use chronos_core::pages::{
    proposal_for_worker, proposals_for_all, HolderProposal, PageOverrides, ReportPage, ReportRow,
    RowField,
};
use chronos_core::records::{AssignmentRecord, RosterEntry};
use pdf::layout::{
    clamp_text, fit_font_size, group_bands, resolve_widths, Cell, ColumnSpec, Grid, GridStyle,
};
use pdf::{Align, Color, Font, Paginator, Point, Rect, Stroke, Surface, TextStyle, VAlign};

use super::{
    draw_clamped, draw_logos, draw_titles, footer_date_line, new_surface, BuildContext, FACULTY,
    PAGE, UNIVERSITY,
};
use crate::archive::worker_file_name;
use crate::prelude::*;

const MARGIN: f32 = 22.0;
const INNER_W: f32 = PAGE.width - 2.0 * MARGIN;

const HEADER_TOP: f32 = 32.0;
const LOGO_SLOT: f32 = 160.0;
const LOGO_SIZE: f32 = 90.0;

const INFO_H: f32 = 18.0;
const BAND_H: f32 = 18.0;
/// Body rows never grow: long subject names shrink to fit and schedules are
/// cut with an ellipsis, so every sheet keeps the same row count per page.
const ROW_H: f32 = 22.0;
const OBSERVATION_H: f32 = 26.0;

/// Top of the footer block; the date line and motto sit just above it.
const FOOTER_TOP: f32 = PAGE.height - 122.0;
/// Lowest `y` any table content may reach.
pub const ROWS_BOTTOM: f32 = FOOTER_TOP - 32.0;

const INFO_FILL: Color = Color::rgb(0xCC, 0xD9, 0xEA);
const INFO_BORDER: Color = Color::rgb(0x7E, 0x9B, 0xC0);
const HEAD_FILL: Color = Color::rgb(0xE5, 0xEA, 0xF0);
const ROW_FILL: Color = Color::rgb(0xF9, 0xFB, 0xFD);
const ROW_LINE: Color = Color::rgb(0xC7, 0xCF, 0xD6);
const TOTAL_FILL: Color = Color::rgb(0xEE, 0xEE, 0xEE);

pub const DOCUMENT_TITLE: &str = "FORMA DE MOVIMIENTOS DE PERSONAL ACADÉMICO";
pub const MOTTO: &str = "“POR MI RAZA HABLARÁ EL ESPÍRITU”";
const PERSONNEL_OFFICE: &str = "DEPTO. DE PERSONAL";

/// The proposal table, left to right.
pub fn proposal_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::fixed("mov", "Mov.", 36.0),
        ColumnSpec::fixed("causa", "Causa", 60.0),
        ColumnSpec::fixed("cat", "Categoria", 52.0),
        ColumnSpec::fixed("iD", "D", 22.0).in_group("INICIO"),
        ColumnSpec::fixed("iM", "M", 22.0).in_group("INICIO"),
        ColumnSpec::fixed("iA", "A", 32.0).in_group("INICIO"),
        ColumnSpec::fixed("tD", "D", 22.0).in_group("TERMINO"),
        ColumnSpec::fixed("tM", "M", 22.0).in_group("TERMINO"),
        ColumnSpec::fixed("tA", "A", 32.0).in_group("TERMINO"),
        ColumnSpec::fixed("plan", "Plan", 32.0),
        ColumnSpec::fixed("cve", "CVE Asig.", 36.0),
        ColumnSpec::flexible("asig", "Nombre Asignatura / Actividad", 320.0),
        ColumnSpec::fixed("grupo", "Grupo", 32.0),
        ColumnSpec::fixed("teo", "Teo.", 30.0).in_group("HORAS"),
        ColumnSpec::fixed("pra", "Prác.", 30.0).in_group("HORAS"),
        ColumnSpec::fixed("tot", "Tot.", 30.0).in_group("HORAS"),
        ColumnSpec::flexible("hor", "Horario", 200.0),
        ColumnSpec::fixed("salon", "Salón", 48.0),
    ]
}

/// Resolved table geometry for one build.
struct Table {
    specs: Vec<ColumnSpec>,
    fields: Vec<Option<RowField>>,
    widths: Vec<f32>,
    offsets: Vec<f32>,
}

impl Table {
    fn new() -> Self {
        let specs = proposal_columns();
        let widths = resolve_widths(&specs, INNER_W);
        let fields = specs.iter().map(|c| RowField::from_key(&c.key)).collect();
        let mut offsets = Vec::with_capacity(widths.len());
        let mut x = MARGIN;
        for w in &widths {
            offsets.push(x);
            x += w;
        }
        Self {
            specs,
            fields,
            widths,
            offsets,
        }
    }

    fn rect(&self, col: usize, y: f32, h: f32) -> Rect {
        Rect::new(self.offsets[col], y, self.widths[col], h)
    }

    fn position(&self, field: RowField) -> Option<usize> {
        self.fields.iter().position(|f| *f == Some(field))
    }
}

/// Metadata overrides and the footer date for a proposal build.
#[derive(Debug, Clone, Default)]
pub struct ProposalOptions {
    pub overrides: PageOverrides,
    /// Replaces the generated date line.
    pub date_line: Option<String>,
}

impl ProposalOptions {
    fn date_line(&self, ctx: &BuildContext) -> String {
        self.date_line
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| footer_date_line(ctx.today))
    }

    fn apply(&self, pages: &[ReportPage]) -> Vec<ReportPage> {
        pages
            .iter()
            .cloned()
            .map(|mut page| {
                self.overrides.apply(&mut page);
                page
            })
            .collect()
    }
}

/// One sheet to draw: a career page and the names on its signature line.
pub struct Sheet<'a> {
    pub page: &'a ReportPage,
    /// Shown under "CONFORMIDAD INTERESADO(A)".
    pub holder: &'a str,
    pub date_line: &'a str,
}

/// Draw `sheets` one after another. The first sheet goes on the current
/// page, which must be empty.
pub fn draw_sheets(surface: &mut dyn Surface, ctx: &BuildContext, sheets: &[Sheet]) {
    let table = Table::new();
    for (i, sheet) in sheets.iter().enumerate() {
        if i > 0 {
            surface.add_page();
        }
        draw_sheet(surface, ctx, &table, sheet);
    }
}

fn draw_sheet(surface: &mut dyn Surface, ctx: &BuildContext, table: &Table, sheet: &Sheet) {
    let frame = |s: &mut dyn Surface, _top: f32| -> f32 { draw_frame(s, ctx, table, sheet) };

    let first = frame(surface, 0.0);
    let mut pager = Paginator::new(0.0, ROWS_BOTTOM, first);
    for row in &sheet.page.rows {
        let y = pager.ensure_fits(surface, ROW_H, &frame);
        draw_row(surface, table, row, y);
        pager.advance(ROW_H);
    }

    let y = pager.ensure_fits(surface, ROW_H + OBSERVATION_H, &frame);
    draw_totals(surface, table, &sheet.page.rows, y);
    draw_observations(surface, &sheet.page.observations, y + ROW_H);
}

/// Everything that repeats on each physical page. Returns where the table
/// body starts.
fn draw_frame(surface: &mut dyn Surface, ctx: &BuildContext, table: &Table, sheet: &Sheet) -> f32 {
    let y = draw_header(surface, ctx, &sheet.page.period);
    let y = draw_info_bar(surface, &sheet.page.career, &sheet.page.unit, y);
    let body = draw_table_header(surface, table, y);
    draw_footer(surface, sheet);
    body
}

fn draw_header(surface: &mut dyn Surface, ctx: &BuildContext, period: &str) -> f32 {
    let inset = (LOGO_SLOT - LOGO_SIZE) / 2.0;
    draw_logos(
        surface,
        &ctx.logos,
        Rect::new(MARGIN + inset, HEADER_TOP, LOGO_SIZE, LOGO_SIZE),
        Rect::new(
            PAGE.width - MARGIN - LOGO_SLOT + inset,
            HEADER_TOP,
            LOGO_SIZE,
            LOGO_SIZE,
        ),
    );
    let period_line = f!("PERIODO ESCOLAR {period}");
    let titles_bottom = draw_titles(
        surface,
        &[
            (UNIVERSITY, 16.0),
            (FACULTY, 12.0),
            (DOCUMENT_TITLE, 12.0),
            (period_line.as_str(), 12.0),
        ],
        MARGIN + LOGO_SLOT,
        INNER_W - 2.0 * LOGO_SLOT,
        HEADER_TOP,
        4.0,
    );
    titles_bottom.max(HEADER_TOP + LOGO_SIZE) + 24.0
}

fn draw_info_bar(surface: &mut dyn Surface, career: &str, unit: &str, y: f32) -> f32 {
    let bar = Rect::new(MARGIN, y, INNER_W, INFO_H);
    surface.fill_rect(bar, INFO_FILL);
    surface.stroke_rect(bar, Stroke::new(INFO_BORDER, 0.8));

    let label = Font::bold(8.0);
    let value = Font::regular(8.0);
    let text_y = y + (INFO_H - 8.0 * 1.15) / 2.0;
    let mid = MARGIN + INNER_W / 2.0;

    surface.show_text("CARRERA O ÁREA:", Point::new(MARGIN + 6.0, text_y), label, Color::BLACK);
    draw_clamped(
        surface,
        career,
        Point::new(MARGIN + 90.0, text_y),
        mid - MARGIN - 96.0,
        value,
        Color::BLACK,
    );
    surface.show_text("UNIDAD RESPONSABLE:", Point::new(mid + 6.0, text_y), label, Color::BLACK);
    draw_clamped(
        surface,
        unit,
        Point::new(mid + 110.0, text_y),
        MARGIN + INNER_W - mid - 116.0,
        value,
        Color::BLACK,
    );
    y + 2.0 * INFO_H
}

fn draw_table_header(surface: &mut dyn Surface, table: &Table, y: f32) -> f32 {
    let mut grid = Grid::new(Point::new(MARGIN, y), INNER_W, 2, table.specs.len())
        .with_column_widths(&table.widths)
        .with_row_heights(&[BAND_H, BAND_H]);

    let title_cell = |spec: &ColumnSpec| {
        let size = match spec.key.as_str() {
            "asig" => 7.0,
            "cve" => 6.0,
            _ => 8.0,
        };
        Cell::new(spec.title.as_str()).size(size)
    };

    for band in group_bands(&table.specs) {
        match &band.title {
            Some(title) => {
                grid.set(0, band.start, Cell::new(title.as_str()).span(band.span));
                for col in band.start..band.start + band.span {
                    grid.set(1, col, title_cell(&table.specs[col]));
                }
            }
            None => grid.set(0, band.start, title_cell(&table.specs[band.start]).row_span(2)),
        }
    }

    let style = GridStyle {
        font_size: 8.0,
        padding: 2.0,
        border: Some(Stroke::new(INFO_BORDER, 0.6)),
        header_rows: 2,
        header_fill: Some(HEAD_FILL),
        header_text: Color::BLACK,
        header_bold: true,
        ..GridStyle::default()
    };
    grid.draw(surface, &style)
}

fn draw_row(surface: &mut dyn Surface, table: &Table, row: &ReportRow, y: f32) {
    let line = Stroke::new(ROW_LINE, 0.6);
    surface.fill_rect(Rect::new(MARGIN, y, INNER_W, ROW_H), ROW_FILL);

    for (col, field) in table.fields.iter().enumerate() {
        let rect = table.rect(col, y, ROW_H);
        surface.stroke_rect(rect, line);
        let Some(field) = *field else {
            continue;
        };
        let text = row.cell(field);
        if text.is_empty() {
            continue;
        }
        let base = Font::regular(8.0);
        let inner = Rect::new(rect.x + 3.0, rect.y + 2.0, rect.w - 6.0, rect.h - 4.0);
        match field {
            RowField::Category | RowField::SubjectName => {
                let size = fit_font_size(&*surface, &text, inner.w, inner.h, base, 8.0, 6.0);
                surface.text(
                    &text,
                    inner,
                    &TextStyle::new(base.with_size(size))
                        .align(Align::Center)
                        .valign(VAlign::Middle),
                );
            }
            RowField::Schedule => {
                let clamped = clamp_text(&text, inner.w, base);
                surface.text(
                    &clamped,
                    inner,
                    &TextStyle::new(base).align(Align::Center).valign(VAlign::Middle),
                );
            }
            _ => surface.text(
                &text,
                inner,
                &TextStyle::new(base).align(Align::Center).valign(VAlign::Middle),
            ),
        }
    }
}

fn draw_totals(surface: &mut dyn Surface, table: &Table, rows: &[ReportRow], y: f32) {
    let line = Stroke::new(ROW_LINE, 0.6);
    let bold = TextStyle::new(Font::bold(8.0)).valign(VAlign::Middle);
    surface.fill_rect(Rect::new(MARGIN, y, INNER_W, ROW_H), TOTAL_FILL);

    let label_end = table.position(RowField::Group).map_or(0, |g| g + 1);
    let label_w = table.offsets.get(label_end).copied().unwrap_or(MARGIN) - MARGIN;
    let label = Rect::new(MARGIN, y, label_w, ROW_H);
    surface.stroke_rect(label, line);
    surface.text(
        "Totales:",
        Rect::new(label.x, y, label.w - 6.0, ROW_H),
        &bold.align(Align::Right),
    );

    let sums = [
        (RowField::Theoretical, rows.iter().map(|r| r.theoretical).sum::<i64>()),
        (RowField::Practical, rows.iter().map(|r| r.practical).sum()),
        (RowField::Total, rows.iter().map(|r| r.total).sum()),
    ];
    for col in label_end..table.widths.len() {
        let rect = table.rect(col, y, ROW_H);
        surface.stroke_rect(rect, line);
        let sum = sums
            .iter()
            .find(|(field, _)| table.fields[col] == Some(*field))
            .map(|(_, sum)| sum);
        if let Some(sum) = sum {
            surface.text(&sum.to_string(), rect, &bold.align(Align::Center));
        }
    }
}

fn draw_observations(surface: &mut dyn Surface, observations: &str, y: f32) -> f32 {
    let font = Font::bold(8.0);
    surface.show_text("Observaciones:", Point::new(MARGIN + 6.0, y + 6.0), font, Color::BLACK);
    let line_y = y + 16.0;
    surface.line(
        Point::new(MARGIN + 90.0, line_y),
        Point::new(MARGIN + INNER_W, line_y),
        Stroke::new(ROW_LINE, 0.6),
    );
    if !observations.trim().is_empty() {
        draw_clamped(
            surface,
            observations.trim(),
            Point::new(MARGIN + 94.0, y + 6.0),
            INNER_W - 98.0,
            Font::regular(8.0),
            Color::BLACK,
        );
    }
    y + OBSERVATION_H
}

fn draw_footer(surface: &mut dyn Surface, sheet: &Sheet) {
    let center = |font| TextStyle::new(font).align(Align::Center);
    surface.text(
        sheet.date_line,
        Rect::new(MARGIN, FOOTER_TOP - 24.0, INNER_W, 10.0),
        &center(Font::regular(8.0)),
    );
    surface.text(
        MOTTO,
        Rect::new(MARGIN, FOOTER_TOP - 11.0, INNER_W, 10.0),
        &center(Font::bold(8.0)),
    );

    let signatures = [
        ("CONFORMIDAD INTERESADO(A)", sheet.holder),
        ("JEFE DE CARRERA", sheet.page.signer.as_str()),
        ("SELLO Y FIRMA DE RECIBIDO", PERSONNEL_OFFICE),
    ];
    let col_w = INNER_W / signatures.len() as f32;
    let line_y = FOOTER_TOP + 64.0;
    for (i, (label, name)) in signatures.iter().enumerate() {
        let x = MARGIN + col_w * i as f32;
        surface.line(
            Point::new(x + 30.0, line_y),
            Point::new(x + col_w - 30.0, line_y),
            Stroke::new(Color::BLACK, 0.8),
        );
        surface.text(label, Rect::new(x, line_y + 8.0, col_w, 10.0), &center(Font::bold(8.0)));
        surface.text(name, Rect::new(x, line_y + 26.0, col_w, 10.0), &center(Font::regular(8.0)));
    }
}

fn render_holders(
    proposals: &[HolderProposal],
    ctx: &BuildContext,
    options: &ProposalOptions,
) -> Result<Vec<u8>, Error> {
    let date_line = options.date_line(ctx);
    let date_line = date_line.as_str();
    let pages: Vec<(Vec<ReportPage>, &str)> = proposals
        .iter()
        .map(|p| (options.apply(&p.pages), p.display_name.as_str()))
        .collect();
    let sheets: Vec<Sheet> = pages
        .iter()
        .flat_map(|(pages, holder)| {
            let holder = *holder;
            pages.iter().map(move |page| Sheet {
                page,
                holder,
                date_line,
            })
        })
        .collect();
    if sheets.is_empty() {
        return Err(Error::NothingToRender("no proposal pages".into()));
    }

    let mut surface = new_surface();
    draw_sheets(&mut surface, ctx, &sheets);
    Ok(surface.finish()?)
}

/// Proposal for one worker number.
pub fn render_proposal(
    records: &[AssignmentRecord],
    roster: &[RosterEntry],
    worker: i64,
    ctx: &BuildContext,
    options: &ProposalOptions,
) -> Result<Vec<u8>, Error> {
    let proposal = proposal_for_worker(records, roster, worker)
        .filter(|p| !p.pages.is_empty())
        .ok_or_else(|| Error::NotFound(f!("no data for worker {worker}")))?;
    log::info!(
        "Proposal for worker {worker}: {} pages",
        proposal.pages.len()
    );
    render_holders(&[proposal], ctx, options)
}

/// Every holder's proposal in one document, by ascending worker number.
pub fn render_all(
    records: &[AssignmentRecord],
    roster: &[RosterEntry],
    ctx: &BuildContext,
    options: &ProposalOptions,
) -> Result<Vec<u8>, Error> {
    let proposals = proposals_for_all(records, roster);
    if proposals.is_empty() {
        return Err(Error::NothingToRender("no holders with a worker number".into()));
    }
    log::info!("Proposals for {} holders", proposals.len());
    render_holders(&proposals, ctx, options)
}

/// One named document per holder, ready for [`crate::archive::zip_documents`].
pub fn render_archive(
    records: &[AssignmentRecord],
    roster: &[RosterEntry],
    ctx: &BuildContext,
    options: &ProposalOptions,
) -> Result<Vec<(String, Vec<u8>)>, Error> {
    let proposals = proposals_for_all(records, roster);
    if proposals.is_empty() {
        return Err(Error::NothingToRender("no holders with a worker number".into()));
    }
    proposals
        .iter()
        .map(|p| {
            let name = worker_file_name(&p.display_name, Some(p.worker));
            let bytes = render_holders(std::slice::from_ref(p), ctx, options)?;
            Ok((name, bytes))
        })
        .collect()
}
