//! Font metrics for the two standard Helvetica faces.
//!
//! Widths are the Adobe AFM advance widths in 1/1000 em. Characters outside
//! printable ASCII fall back to their base letter after canonical
//! decomposition (`Á` measures as `A`), then to a handful of explicit
//! entries, then to [`FALLBACK_WIDTH`].

use unicode_normalization::UnicodeNormalization;

use crate::types::{Font, Weight};

/// Width used for characters with no metric.
pub const FALLBACK_WIDTH: u16 = 556;

/// Line advance as a multiple of the font size.
pub const LINE_GAP: f32 = 1.15;

/// Distance from the top of a line box to the baseline, as a multiple of the
/// font size.
pub const ASCENT: f32 = 0.75;

pub const ELLIPSIS: char = '…';

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,      // 'p'..'~'
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

fn special_width(c: char, weight: Weight) -> Option<u16> {
    let bold = weight == Weight::Bold;
    let w = match c {
        '…' | '—' | '‰' => 1000,
        '–' | '€' | '«' | '»' => 556,
        '“' | '”' => {
            if bold {
                500
            } else {
                333
            }
        }
        '‘' | '’' => {
            if bold {
                278
            } else {
                222
            }
        }
        '°' => 400,
        '¿' => 611,
        '¡' => 333,
        'º' => 365,
        'ª' => 370,
        '\u{00A0}' => 278,
        _ => return None,
    };
    Some(w)
}

/// Advance width of one character in 1/1000 em.
pub fn char_width(c: char, weight: Weight) -> u16 {
    let table = match weight {
        Weight::Regular => &HELVETICA,
        Weight::Bold => &HELVETICA_BOLD,
    };
    let ascii = |c: char| {
        let code = c as u32;
        (32..127).contains(&code).then(|| table[(code - 32) as usize])
    };
    if let Some(w) = ascii(c) {
        return w;
    }
    if let Some(w) = special_width(c, weight) {
        return w;
    }
    c.nfd()
        .next()
        .and_then(ascii)
        .unwrap_or(FALLBACK_WIDTH)
}

/// Width of a single line of text in points.
pub fn text_width(text: &str, font: Font) -> f32 {
    let units: u32 = text.chars().map(|c| char_width(c, font.weight) as u32).sum();
    units as f32 * font.size / 1000.0
}

pub fn line_height(font: Font) -> f32 {
    font.size * LINE_GAP
}

/// Break text into lines no wider than `width`.
///
/// Explicit newlines always break. Words are packed greedily; a word wider
/// than the line on its own is split between characters.
pub fn wrap_lines(text: &str, width: f32, font: Font) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if text_width(&candidate, font) <= width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if text_width(word, font) <= width {
                current = word.to_string();
                continue;
            }
            for c in word.chars() {
                let mut next = current.clone();
                next.push(c);
                if !current.is_empty() && text_width(&next, font) > width {
                    lines.push(std::mem::replace(&mut current, c.to_string()));
                } else {
                    current = next;
                }
            }
        }
        lines.push(current);
    }
    while lines.last().is_some_and(|l| l.is_empty()) && lines.len() > 1 {
        lines.pop();
    }
    if lines.len() == 1 && lines[0].is_empty() {
        lines.clear();
    }
    lines
}

/// Height of `text` once wrapped to `width`.
pub fn wrapped_height(text: &str, width: f32, font: Font) -> f32 {
    wrap_lines(text, width, font).len() as f32 * line_height(font)
}

/// Shorten text to one line no wider than `width`, ending in an ellipsis
/// when anything was cut.
pub fn clamp_with_ellipsis(text: &str, width: f32, font: Font) -> String {
    let single = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text_width(&single, font) <= width {
        return single;
    }
    let chars: Vec<char> = single.chars().collect();
    let with_ellipsis = |n: usize| {
        let mut s: String = chars[..n].iter().collect::<String>().trim_end().to_string();
        s.push(ELLIPSIS);
        s
    };

    // Longest prefix that still fits once the ellipsis is appended.
    let (mut lo, mut hi) = (0usize, chars.len());
    while lo < hi {
        let mid = (lo + hi + 1) / 2;
        if text_width(&with_ellipsis(mid), font) <= width {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    if lo == 0 && text_width(&with_ellipsis(0), font) > width {
        return String::new();
    }
    with_ellipsis(lo)
}

/// Encode text for a simple font using WinAnsiEncoding. Characters the
/// encoding cannot express become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7E}' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‰' => 0x89,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '\t' => b' ',
            _ => b'?',
        })
        .collect()
}
