//! Value coercion helpers shared by every ingestion path.
//!
//! Stored records and CSV rows carry loosely typed values (numbers as
//! strings, `"-"` for "nothing", two-digit years). Everything here is total:
//! bad input degrades to a default instead of failing.

use std::cmp::Ordering;
use std::collections::HashMap;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Year used when a raw year cannot be interpreted at all.
pub const FALLBACK_YEAR: i64 = 2000;

/// Coerce a loosely typed value into an integer.
///
/// Returns `default` for empty input, `"-"` and anything that does not parse
/// as a number. Fractional values are truncated toward zero.
pub fn coerce_int(value: Option<&str>, default: i64) -> i64 {
    let Some(raw) = value else {
        return default;
    };
    let s = raw.trim();
    if s.is_empty() || s == "-" {
        return default;
    }
    if let Ok(n) = s.parse::<i64>() {
        return n;
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() => f.trunc() as i64,
        _ => default,
    }
}

/// Coerce a loosely typed value into a number, keeping any fraction.
///
/// Same rules as [`coerce_int`] for what counts as missing.
pub fn coerce_number(value: Option<&str>, default: f64) -> f64 {
    let Some(raw) = value else {
        return default;
    };
    let s = raw.trim();
    if s.is_empty() || s == "-" {
        return default;
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() => f,
        _ => default,
    }
}

/// Format a day/month/year fragment as at least two characters, left-padded
/// with zeros. Missing input renders as `"00"`.
pub fn zero_pad2(value: Option<&str>) -> String {
    let s = value.map(str::trim).unwrap_or("");
    format!("{:0>2}", s)
}

/// Normalise a subject code to four characters, left-padded with zeros.
///
/// Blank input stays blank and codes already four characters or longer pass
/// through untouched.
pub fn pad_subject_code(value: Option<&str>) -> String {
    let s = value.map(str::trim).unwrap_or("");
    if s.is_empty() {
        return String::new();
    }
    format!("{:0>4}", s)
}

/// Expand a possibly two-digit year.
///
/// `0..=79` maps to `2000..=2079`, `80..=99` to `1980..=1999`, years from
/// 1900 on pass through, and everything else becomes [`FALLBACK_YEAR`].
pub fn normalize_year(raw: Option<&str>) -> i64 {
    let y = coerce_int(raw, 0);
    match y {
        y if y >= 1900 => y,
        0..=79 => 2000 + y,
        80..=99 => 1900 + y,
        _ => FALLBACK_YEAR,
    }
}

/// Strip combining diacritics (`"Aragón"` -> `"Aragon"`).
pub fn strip_diacritics(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Fold a string for identity comparisons: trimmed, upper-cased, without
/// diacritics. Two strings match "regardless of accents and case" iff their
/// folded forms are equal.
pub fn fold_for_match(text: &str) -> String {
    strip_diacritics(text.trim()).to_uppercase()
}

/// Compare two labels the way a Spanish-locale collation would for the
/// labels we sort (career names): accents and case are ignored first, then
/// used as tie-breakers so the order stays total and deterministic.
pub fn compare_es(a: &str, b: &str) -> Ordering {
    let ka = strip_diacritics(a).to_lowercase();
    let kb = strip_diacritics(b).to_lowercase();
    ka.cmp(&kb)
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

/// Plurality vote over a set of values.
///
/// Blank values and `"-"` are ignored. Ties resolve to the value seen first,
/// so the result depends only on input order, never on hash iteration.
pub fn most_frequent_non_empty<'a, I>(values: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for v in values {
        let s = v.trim();
        if s.is_empty() || s == "-" {
            continue;
        }
        let count = counts.entry(s).or_insert(0);
        if *count == 0 {
            order.push(s);
        }
        *count += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for s in order {
        let c = counts[s];
        match best {
            Some((_, bc)) if bc >= c => {}
            _ => best = Some((s, c)),
        }
    }
    best.map(|(s, _)| s.to_string())
}
