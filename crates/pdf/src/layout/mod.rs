//! Table layout: even and negotiated column widths, spanned grids and
//! auto-fitted text.

pub mod columns;
pub mod fit;
pub mod grid;

pub use columns::{group_bands, negotiate_flexible, resolve_widths, ColumnSpec, ColumnWidth, GroupBand};
pub use fit::{clamp_text, fit_font_size, row_height};
pub use grid::{draw_grid, split_even, Cell, Grid, GridStyle};
