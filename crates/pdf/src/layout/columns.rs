//! Column taxonomies.
//!
//! A document describes its table once as a list of [`ColumnSpec`]s; widths
//! and the grouped header band are derived from that list.

/// Smallest width a flexible column is squeezed to when space runs out.
pub const FLEX_FLOOR: f32 = 60.0;

/// Share of the remaining width given to the first flexible column.
pub const FLEX_SHARE: f32 = 0.65;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnWidth {
    Fixed(f32),
    /// Sized from whatever the fixed columns leave over.
    Flexible { min: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub key: String,
    pub title: String,
    pub group: Option<String>,
    pub width: ColumnWidth,
}

impl ColumnSpec {
    pub fn fixed(key: impl Into<String>, title: impl Into<String>, width: f32) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            group: None,
            width: ColumnWidth::Fixed(width),
        }
    }

    pub fn flexible(key: impl Into<String>, title: impl Into<String>, min: f32) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            group: None,
            width: ColumnWidth::Flexible { min },
        }
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// Split `remaining` between two flexible columns.
///
/// The default split is [`FLEX_SHARE`] / rest. When that leaves either
/// column under its minimum:
///
/// - if both minimums cannot be met, the space is split in proportion to the
///   minimums and the first column is clamped to `[FLEX_FLOOR, remaining -
///   FLEX_FLOOR]`;
/// - otherwise both are raised to their minimums and the one with more slack
///   gives the overage back.
///
/// Except for a non-positive `remaining`, the two widths always sum to
/// `remaining`.
pub fn negotiate_flexible(remaining: f32, min_a: f32, min_b: f32) -> (f32, f32) {
    if remaining <= 0.0 {
        return (min_a, min_b);
    }

    let a = (remaining * FLEX_SHARE).round();
    let b = remaining - a;
    if a >= min_a && b >= min_b {
        return (a, b);
    }

    if remaining < min_a + min_b {
        let proportional = (remaining * min_a / (min_a + min_b)).round();
        let a = if remaining < 2.0 * FLEX_FLOOR {
            remaining / 2.0
        } else {
            proportional.clamp(FLEX_FLOOR, remaining - FLEX_FLOOR)
        };
        return (a, remaining - a);
    }

    let (mut a, mut b) = (a.max(min_a), b.max(min_b));
    let overage = a + b - remaining;
    if overage > 0.0 {
        if a - min_a >= b - min_b {
            a -= overage;
        } else {
            b -= overage;
        }
    }
    (a, b)
}

/// Resolve every column's width for a table `total` points wide.
///
/// Two flexible columns are negotiated with [`negotiate_flexible`]; a single
/// one takes the whole remainder; more than two share it evenly, none below
/// its minimum.
pub fn resolve_widths(columns: &[ColumnSpec], total: f32) -> Vec<f32> {
    let fixed: f32 = columns
        .iter()
        .filter_map(|c| match c.width {
            ColumnWidth::Fixed(w) => Some(w),
            ColumnWidth::Flexible { .. } => None,
        })
        .sum();
    let flex_mins: Vec<f32> = columns
        .iter()
        .filter_map(|c| match c.width {
            ColumnWidth::Flexible { min } => Some(min),
            ColumnWidth::Fixed(_) => None,
        })
        .collect();
    let remaining = total - fixed;

    let flex_widths: Vec<f32> = match flex_mins.as_slice() {
        [] => Vec::new(),
        [min] => vec![remaining.max(*min)],
        [min_a, min_b] => {
            let (a, b) = negotiate_flexible(remaining, *min_a, *min_b);
            vec![a, b]
        }
        mins => {
            let share = remaining / mins.len() as f32;
            mins.iter().map(|m| share.max(*m)).collect()
        }
    };

    let mut flex = flex_widths.into_iter();
    columns
        .iter()
        .map(|c| match c.width {
            ColumnWidth::Fixed(w) => w,
            ColumnWidth::Flexible { min } => flex.next().unwrap_or(min),
        })
        .collect()
}

/// A run of adjacent columns in the top header band.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupBand {
    /// Group title, or `None` for a column that stands alone.
    pub title: Option<String>,
    pub start: usize,
    pub span: usize,
}

/// Merge adjacent columns sharing a group into one band each.
pub fn group_bands(columns: &[ColumnSpec]) -> Vec<GroupBand> {
    let mut bands: Vec<GroupBand> = Vec::new();
    for (i, column) in columns.iter().enumerate() {
        match (bands.last_mut(), &column.group) {
            (Some(band), Some(group)) if band.title.as_ref() == Some(group) => band.span += 1,
            _ => bands.push(GroupBand {
                title: column.group.clone(),
                start: i,
                span: 1,
            }),
        }
    }
    bands
}
