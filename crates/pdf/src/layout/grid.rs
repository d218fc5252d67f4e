use crate::surface::{Surface, TextStyle};
use crate::types::{Align, Color, Font, Point, Rect, Stroke, VAlign};

/// Row height used when none is given.
pub const DEFAULT_ROW_HEIGHT: f32 = 20.0;

/// Split `total` into `n` column widths.
///
/// The integral part is divided as evenly as integer division allows, with
/// the remainder handed to the leftmost columns one unit each. Any fractional
/// part of `total` lands on the last column, so the widths always sum to
/// `total`.
pub fn split_even(total: f32, n: usize) -> Vec<f32> {
    if n == 0 {
        return Vec::new();
    }
    let whole = total.max(0.0).floor();
    let units = whole as u64;
    let base = units / n as u64;
    let extra = (units % n as u64) as usize;
    let mut widths: Vec<f32> = (0..n)
        .map(|i| (base + u64::from(i < extra)) as f32)
        .collect();
    if let Some(last) = widths.last_mut() {
        *last += total.max(0.0) - whole;
    }
    widths
}

/// One grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    pub align: Align,
    pub valign: VAlign,
    pub fill: Option<Color>,
    pub color: Option<Color>,
    pub bold: bool,
    pub size: Option<f32>,
    pub col_span: usize,
    pub row_span: usize,
}

impl Cell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            align: Align::Center,
            valign: VAlign::Middle,
            fill: None,
            color: None,
            bold: false,
            size: None,
            col_span: 1,
            row_span: 1,
        }
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn valign(mut self, valign: VAlign) -> Self {
        self.valign = valign;
        self
    }

    pub fn fill(mut self, color: Color) -> Self {
        self.fill = Some(color);
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn size(mut self, size: f32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn span(mut self, cols: usize) -> Self {
        self.col_span = cols.max(1);
        self
    }

    pub fn row_span(mut self, rows: usize) -> Self {
        self.row_span = rows.max(1);
        self
    }
}

/// Paint applied to every cell unless the cell overrides it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridStyle {
    pub font_size: f32,
    pub padding: f32,
    pub text_color: Color,
    pub border: Option<Stroke>,
    /// Leading rows drawn as header rows.
    pub header_rows: usize,
    pub header_fill: Option<Color>,
    pub header_text: Color,
    pub header_bold: bool,
    pub body_fill: Option<Color>,
}

impl Default for GridStyle {
    fn default() -> Self {
        Self {
            font_size: 9.0,
            padding: 4.0,
            text_color: Color::BLACK,
            border: Some(Stroke::new(Color::BLACK, 0.5)),
            header_rows: 0,
            header_fill: None,
            header_text: Color::BLACK,
            header_bold: true,
            body_fill: None,
        }
    }
}

/// A rectangular table laid out from an origin.
#[derive(Debug, Clone)]
pub struct Grid {
    origin: Point,
    columns: Vec<f32>,
    rows: Vec<f32>,
    cells: Vec<Vec<Option<Cell>>>,
}

impl Grid {
    /// A grid whose columns split `total_width` evenly and whose rows use
    /// [`DEFAULT_ROW_HEIGHT`].
    pub fn new(origin: Point, total_width: f32, row_count: usize, col_count: usize) -> Self {
        Self {
            origin,
            columns: split_even(total_width, col_count),
            rows: vec![DEFAULT_ROW_HEIGHT; row_count],
            cells: vec![vec![None; col_count]; row_count],
        }
    }

    /// Use explicit column widths. Missing entries keep their even share.
    /// The grid keeps its width: a shortfall goes to the last column, and
    /// widths that add up to more than the total are scaled down together.
    pub fn with_column_widths(mut self, widths: &[f32]) -> Self {
        let total: f32 = self.columns.iter().sum();
        for (slot, w) in self.columns.iter_mut().zip(widths) {
            *slot = w.max(0.0);
        }
        let sum: f32 = self.columns.iter().sum();
        if sum > total && sum > 0.0 {
            let scale = total / sum;
            self.columns.iter_mut().for_each(|w| *w *= scale);
        } else if let Some(last) = self.columns.last_mut() {
            *last += total - sum;
        }
        self
    }

    pub fn with_row_heights(mut self, heights: &[f32]) -> Self {
        for (slot, h) in self.rows.iter_mut().zip(heights) {
            *slot = *h;
        }
        self
    }

    /// Place a cell. Out-of-range positions are ignored.
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        if let Some(slot) = self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            *slot = Some(cell);
        }
    }

    pub fn column_widths(&self) -> &[f32] {
        &self.columns
    }

    pub fn height(&self) -> f32 {
        self.rows.iter().sum()
    }

    /// Positions hidden under an earlier cell's span. Spans are clamped to
    /// the grid edges.
    pub fn covered(&self) -> Vec<Vec<bool>> {
        let (nr, nc) = (self.rows.len(), self.columns.len());
        let mut mask = vec![vec![false; nc]; nr];
        for r in 0..nr {
            for c in 0..nc {
                if mask[r][c] {
                    continue;
                }
                let Some(cell) = &self.cells[r][c] else {
                    continue;
                };
                for rr in r..(r + cell.row_span).min(nr) {
                    for cc in c..(c + cell.col_span).min(nc) {
                        if (rr, cc) != (r, c) {
                            mask[rr][cc] = true;
                        }
                    }
                }
            }
        }
        mask
    }

    fn frame(&self, row: usize, col: usize, cell: Option<&Cell>) -> Rect {
        let (row_span, col_span) = cell.map(|c| (c.row_span, c.col_span)).unwrap_or((1, 1));
        let x = self.origin.x + self.columns[..col].iter().sum::<f32>();
        let y = self.origin.y + self.rows[..row].iter().sum::<f32>();
        let w = self.columns[col..(col + col_span).min(self.columns.len())]
            .iter()
            .sum();
        let h = self.rows[row..(row + row_span).min(self.rows.len())]
            .iter()
            .sum();
        Rect::new(x, y, w, h)
    }

    /// Draw every cell not covered by a span and return the bottom edge.
    pub fn draw(&self, surface: &mut dyn Surface, style: &GridStyle) -> f32 {
        let covered = self.covered();
        for (r, row) in self.cells.iter().enumerate() {
            let header = r < style.header_rows;
            for (c, cell) in row.iter().enumerate() {
                if covered[r][c] {
                    continue;
                }
                let rect = self.frame(r, c, cell.as_ref());
                let fill = cell
                    .as_ref()
                    .and_then(|cell| cell.fill)
                    .or(if header { style.header_fill } else { style.body_fill });
                if let Some(color) = fill {
                    surface.fill_rect(rect, color);
                }
                if let Some(stroke) = style.border.filter(|s| s.width > 0.0) {
                    surface.stroke_rect(rect, stroke);
                }
                if let Some(cell) = cell {
                    draw_cell_text(surface, cell, rect, header, style);
                }
            }
        }
        self.origin.y + self.height()
    }
}

fn draw_cell_text(
    surface: &mut dyn Surface,
    cell: &Cell,
    rect: Rect,
    header: bool,
    style: &GridStyle,
) {
    if cell.text.trim().is_empty() {
        return;
    }
    let size = cell.size.unwrap_or(style.font_size);
    let font = if cell.bold || (header && style.header_bold) {
        Font::bold(size)
    } else {
        Font::regular(size)
    };
    let color = cell
        .color
        .unwrap_or(if header { style.header_text } else { style.text_color });

    let pad = style.padding;
    let width = (rect.w - 2.0 * pad).max(0.0);
    let text_h = surface.measure_height(&cell.text, width, font);
    let y = match cell.valign {
        VAlign::Top => rect.y + pad,
        VAlign::Middle => rect.y + ((rect.h - text_h) / 2.0).max(0.0),
        VAlign::Bottom => rect.bottom() - text_h - pad,
    };
    let frame = Rect::new(rect.x + pad, y, width, text_h);
    let text_style = TextStyle::new(font).color(color).align(cell.align);
    surface.text(&cell.text, frame, &text_style);
}

/// Draw a grid in one call: `cells` are `(row, col, cell)` triples.
#[allow(clippy::too_many_arguments)]
pub fn draw_grid(
    surface: &mut dyn Surface,
    origin: Point,
    total_width: f32,
    row_count: usize,
    col_count: usize,
    column_widths: Option<&[f32]>,
    row_heights: Option<&[f32]>,
    cells: Vec<(usize, usize, Cell)>,
    style: &GridStyle,
) -> f32 {
    let mut grid = Grid::new(origin, total_width, row_count, col_count);
    if let Some(widths) = column_widths {
        grid = grid.with_column_widths(widths);
    }
    if let Some(heights) = row_heights {
        grid = grid.with_row_heights(heights);
    }
    for (r, c, cell) in cells {
        grid.set(r, c, cell);
    }
    grid.draw(surface, style)
}
