//! Tolerant delimited-text ingestion.
//!
//! The parser accepts what spreadsheet exports actually produce: quoted
//! fields with embedded delimiters or newlines, doubled quotes, CR-LF or LF
//! line endings, and the odd unterminated quote. It never fails; malformed
//! input degrades to whatever fields could be recovered.
//!
//! Header labels are folded and looked up in [`HEADER_ALIASES`] so that
//! `Num_Trabajador`, `num trabajador` and `NUMTRABAJADOR` all land on the
//! same canonical field name.

use serde_json::{Map, Value};

use crate::normalize::strip_diacritics;
use crate::records::AssignmentRecord;

/// Folded header label -> canonical field name.
pub const HEADER_ALIASES: &[(&str, &str)] = &[
    // identity
    ("numtrabajador", "workerNumber"),
    ("numerotrabajador", "workerNumber"),
    ("numerodetrabajador", "workerNumber"),
    ("trabajador", "workerNumber"),
    ("workernumber", "workerNumber"),
    ("profesor", "profesor"),
    ("interesado", "profesor"),
    ("rfc", "rfc"),
    // page metadata
    ("carrera", "career"),
    ("unidad", "unit"),
    ("jefe", "signer"),
    ("observaciones", "observations"),
    ("periodo", "period"),
    // movement codes
    ("tipo", "movementType"),
    ("mov", "movementType"),
    ("causa", "cause"),
    ("categoria", "category"),
    ("cat", "category"),
    // start date
    ("diaini", "startDay"),
    ("diainicio", "startDay"),
    ("diain", "startDay"),
    ("id", "startDay"),
    ("mesini", "startMonth"),
    ("mesinicio", "startMonth"),
    ("mesin", "startMonth"),
    ("im", "startMonth"),
    ("anoini", "startYear"),
    ("anioini", "startYear"),
    ("ia", "startYear"),
    // end date
    ("diafin", "endDay"),
    ("td", "endDay"),
    ("mesfin", "endMonth"),
    ("tm", "endMonth"),
    ("anofin", "endYear"),
    ("aniofin", "endYear"),
    ("ta", "endYear"),
    // subject
    ("planestudios", "studyPlan"),
    ("plan", "studyPlan"),
    ("cveasignatura", "subjectCode"),
    ("clave", "subjectCode"),
    ("cve", "subjectCode"),
    ("nombreasignatura", "subjectName"),
    ("asignatura", "subjectName"),
    ("nombre", "subjectName"),
    ("asig", "subjectName"),
    ("grupo", "group"),
    // hours
    ("horasteoricas", "theoreticalHours"),
    ("teo", "theoreticalHours"),
    ("horaspracticas", "practicalHours"),
    ("pra", "practicalHours"),
    ("horastotal", "totalHours"),
    ("tot", "totalHours"),
    // place and time
    ("horario", "schedule"),
    ("hor", "schedule"),
    ("salon", "room"),
    ("aula", "room"),
];

/// Split delimited text into rows of raw fields.
///
/// - `"` opens a quoted run anywhere in a field; `""` inside it is a literal
///   quote.
/// - `\r` outside quotes is dropped, so CR-LF and LF behave the same.
/// - A quote that never closes swallows the rest of the input into the final
///   field.
pub fn parse_delimited(text: &str, delimiter: char) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(ch);
            }
            continue;
        }

        match ch {
            '"' => in_quotes = true,
            '\n' => {
                record.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut record));
            }
            '\r' => {}
            c if c == delimiter => record.push(std::mem::take(&mut field)),
            c => field.push(c),
        }
    }

    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        rows.push(record);
    }
    rows
}

/// [`parse_delimited`] with a comma delimiter.
pub fn parse_csv(text: &str) -> Vec<Vec<String>> {
    parse_delimited(text, ',')
}

/// Fold a header label: lower-case, no diacritics, no whitespace, hyphens or
/// underscores.
pub fn fold_header(label: &str) -> String {
    strip_diacritics(&label.to_lowercase())
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .collect()
}

/// Canonical field name for a header label. Unrecognised labels pass
/// through verbatim (trimmed).
pub fn canonical_header(label: &str) -> String {
    let folded = fold_header(label);
    HEADER_ALIASES
        .iter()
        .find(|(alias, _)| *alias == folded)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| label.trim().to_string())
}

/// One data row keyed by canonical header name, in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvRow(pub Vec<(String, String)>);

impl CsvRow {
    /// Value of a column. When two columns share a canonical name the
    /// rightmost one wins.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// JSON object view of the row. Blank and `"-"` cells are left out so
    /// they read as missing rather than as values.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (k, v) in &self.0 {
            let t = v.trim();
            if t.is_empty() || t == "-" {
                continue;
            }
            map.insert(k.clone(), Value::String(t.to_string()));
        }
        Value::Object(map)
    }

    pub fn to_record(&self) -> Option<AssignmentRecord> {
        serde_json::from_value(self.to_json()).ok()
    }
}

/// Parse CSV text into canonical rows: the first row supplies the headers,
/// entirely blank rows are dropped, short rows are padded with blanks.
pub fn rows_from_csv(text: &str) -> Vec<CsvRow> {
    let raw = parse_csv(text.trim());
    let Some((header, body)) = raw.split_first() else {
        return Vec::new();
    };
    let headers: Vec<String> = header.iter().map(|h| canonical_header(h)).collect();

    body.iter()
        .filter(|rec| rec.iter().any(|v| !v.trim().is_empty()))
        .map(|rec| {
            CsvRow(
                headers
                    .iter()
                    .enumerate()
                    .map(|(i, h)| (h.clone(), rec.get(i).cloned().unwrap_or_default()))
                    .collect(),
            )
        })
        .collect()
}

/// Parse CSV text straight into assignment records.
pub fn records_from_csv(text: &str) -> Vec<AssignmentRecord> {
    rows_from_csv(text)
        .iter()
        .filter_map(CsvRow::to_record)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::pad_subject_code;

    #[test]
    fn test_parse_quoted_fields() {
        let rows = parse_csv("a,\"b,c\",\"say \"\"hi\"\"\"\n1,2,3\n");
        assert_eq!(
            rows,
            vec![
                vec!["a", "b,c", "say \"hi\""],
                vec!["1", "2", "3"],
            ]
        );
    }

    #[test]
    fn test_parse_crlf_and_embedded_newline() {
        let rows = parse_csv("a,b\r\n\"x\ny\",z\r\n");
        assert_eq!(rows, vec![vec!["a", "b"], vec!["x\ny", "z"]]);
    }

    #[test]
    fn test_parse_last_line_without_newline() {
        let rows = parse_csv("a,b\n1,");
        assert_eq!(rows, vec![vec!["a", "b"], vec!["1", ""]]);
    }

    #[test]
    fn test_parse_unclosed_quote_flushes_rest() {
        let rows = parse_csv("a,\"open\nstill open");
        assert_eq!(rows, vec![vec!["a", "open\nstill open"]]);
    }

    #[test]
    fn test_parse_custom_delimiter() {
        let rows = parse_delimited("a;b;\"c;d\"", ';');
        assert_eq!(rows, vec![vec!["a", "b", "c;d"]]);
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse_csv("").is_empty());
    }

    #[test]
    fn test_canonical_headers() {
        let headers: Vec<String> = "Num_Trabajador,Profesor,CVE,Teo"
            .split(',')
            .map(canonical_header)
            .collect();
        assert_eq!(
            headers,
            vec!["workerNumber", "profesor", "subjectCode", "theoreticalHours"]
        );
    }

    #[test]
    fn test_canonical_header_folding() {
        assert_eq!(canonical_header(" Año-Ini "), "startYear");
        assert_eq!(canonical_header("Categoría"), "category");
        assert_eq!(canonical_header("Horas Prácticas"), "practicalHours");
        assert_eq!(canonical_header("iD"), "startDay");
        assert_eq!(canonical_header(" Extra Col "), "Extra Col");
    }

    #[test]
    fn test_rows_from_csv_drops_blank_rows() {
        let rows = rows_from_csv("Profesor,CVE\nA,17\n , \n\nB\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("profesor"), Some("A"));
        assert_eq!(rows[1].get("subjectCode"), Some(""));
    }

    #[test]
    fn test_duplicate_canonical_header_rightmost_wins() {
        let rows = rows_from_csv("cve,clave\n1,2\n");
        assert_eq!(rows[0].get("subjectCode"), Some("2"));
    }

    #[test]
    fn test_records_from_csv() {
        let csv = "Num_Trabajador,Profesor,CVE,Teo,Hor\n809328,\"LOPEZ, ANA\",17,4,-\n";
        let records = records_from_csv(csv);
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.worker_id(), 809328);
        assert_eq!(r.name.as_deref(), Some("LOPEZ, ANA"));
        assert_eq!(pad_subject_code(r.subject_code.as_deref()), "0017");
        assert_eq!(r.theoretical(), 4);
        assert_eq!(r.schedule, None);
    }
}
