//! Raw input records: teaching assignments and instructor roster entries.
//!
//! Both collections arrive with loosely typed scalars (worker numbers as
//! numbers or strings, hours as `"4"`, `4` or `"-"`), so every field is kept
//! as an optional trimmed string and interpreted through the helpers in
//! [`crate::normalize`].

use serde::{Deserialize, Deserializer, Serialize};

use crate::normalize::{coerce_int, coerce_number, normalize_year};
use crate::period::{Half, Period};

/// One teaching assignment instance.
///
/// Field names serialize with the stored (Spanish) spelling and accept the
/// canonical CSV spelling produced by [`crate::csv`] as an alias.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    #[serde(rename = "profesor", alias = "name", default, deserialize_with = "stringish")]
    pub name: Option<String>,
    #[serde(rename = "rfc", alias = "taxId", default, deserialize_with = "stringish")]
    pub tax_id: Option<String>,
    #[serde(
        rename = "numTrabajador",
        alias = "workerNumber",
        alias = "num_trabajador",
        alias = "trabajador",
        default,
        deserialize_with = "stringish"
    )]
    pub worker_number: Option<String>,
    #[serde(rename = "carrera", alias = "career", default, deserialize_with = "stringish")]
    pub career: Option<String>,
    #[serde(rename = "unidad", alias = "unit", default, deserialize_with = "stringish")]
    pub unit: Option<String>,
    #[serde(rename = "jefe", alias = "signer", default, deserialize_with = "stringish")]
    pub signer: Option<String>,
    #[serde(
        rename = "observaciones",
        alias = "observations",
        default,
        deserialize_with = "stringish"
    )]
    pub observations: Option<String>,
    #[serde(rename = "periodo", alias = "period", default, deserialize_with = "stringish")]
    pub period: Option<String>,

    #[serde(rename = "tipo", alias = "movementType", default, deserialize_with = "stringish")]
    pub movement_type: Option<String>,
    #[serde(rename = "causa", alias = "cause", default, deserialize_with = "stringish")]
    pub cause: Option<String>,
    #[serde(rename = "categoria", alias = "category", default, deserialize_with = "stringish")]
    pub category: Option<String>,

    #[serde(rename = "diaIni", alias = "startDay", default, deserialize_with = "stringish")]
    pub start_day: Option<String>,
    #[serde(rename = "mesIni", alias = "startMonth", default, deserialize_with = "stringish")]
    pub start_month: Option<String>,
    #[serde(rename = "anoIni", alias = "startYear", default, deserialize_with = "stringish")]
    pub start_year: Option<String>,
    #[serde(rename = "diaFin", alias = "endDay", default, deserialize_with = "stringish")]
    pub end_day: Option<String>,
    #[serde(rename = "mesFin", alias = "endMonth", default, deserialize_with = "stringish")]
    pub end_month: Option<String>,
    #[serde(rename = "anoFin", alias = "endYear", default, deserialize_with = "stringish")]
    pub end_year: Option<String>,

    #[serde(rename = "planEstudios", alias = "studyPlan", default, deserialize_with = "stringish")]
    pub study_plan: Option<String>,
    #[serde(
        rename = "cveAsignatura",
        alias = "subjectCode",
        alias = "claveAsignatura",
        default,
        deserialize_with = "stringish"
    )]
    pub subject_code: Option<String>,
    #[serde(
        rename = "nombreAsignatura",
        alias = "subjectName",
        default,
        deserialize_with = "stringish"
    )]
    pub subject_name: Option<String>,
    #[serde(rename = "grupo", alias = "group", default, deserialize_with = "stringish")]
    pub group: Option<String>,

    #[serde(
        rename = "horasTeoricas",
        alias = "theoreticalHours",
        alias = "horasTeoricasTotal",
        default,
        deserialize_with = "hours"
    )]
    pub theoretical_hours: Option<String>,
    #[serde(
        rename = "horasPracticas",
        alias = "practicalHours",
        alias = "horasPracticasTotal",
        default,
        deserialize_with = "hours"
    )]
    pub practical_hours: Option<String>,
    #[serde(rename = "horasTotal", alias = "totalHours", default, deserialize_with = "hours")]
    pub total_hours: Option<String>,

    #[serde(rename = "horario", alias = "schedule", default, deserialize_with = "stringish")]
    pub schedule: Option<String>,
    #[serde(rename = "salon", alias = "room", default, deserialize_with = "stringish")]
    pub room: Option<String>,
}

/// One instructor roster row. Same shape as an assignment; its career field
/// is authoritative and its assignment fields serve as a template row when
/// the holder has no assignments of their own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RosterEntry(pub AssignmentRecord);

impl std::ops::Deref for RosterEntry {
    type Target = AssignmentRecord;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<AssignmentRecord> for RosterEntry {
    fn from(record: AssignmentRecord) -> Self {
        RosterEntry(record)
    }
}

/// Accept a JSON string, number, bool or null. Strings are trimmed and blank
/// strings become `None`; arrays and objects are ignored.
fn stringish<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => {
            let t = s.trim();
            (!t.is_empty()).then(|| t.to_string())
        }
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Like [`stringish`], but a blank hour count stays present: only a missing
/// or null field lets another field stand in for it.
fn hours<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s.trim().to_string()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

impl AssignmentRecord {
    /// Theoretical hours, strictly from the theoretical field.
    pub fn theoretical(&self) -> i64 {
        coerce_int(self.theoretical_hours.as_deref(), 0)
    }

    /// Theoretical hours for hour banking: records without a theoretical
    /// field bank their total as theoretical time. Fractions are kept.
    pub fn banked_theoretical(&self) -> f64 {
        let hours = self
            .theoretical_hours
            .as_deref()
            .or(self.total_hours.as_deref());
        coerce_number(hours, 0.0)
    }

    /// Practical hours for hour banking, fractions kept.
    pub fn banked_practical(&self) -> f64 {
        coerce_number(self.practical_hours.as_deref(), 0.0)
    }

    pub fn practical(&self) -> i64 {
        coerce_int(self.practical_hours.as_deref(), 0)
    }

    /// Total hours, defaulting to theoretical + practical.
    pub fn total(&self) -> i64 {
        coerce_int(
            self.total_hours.as_deref(),
            self.theoretical() + self.practical(),
        )
    }

    /// Worker number coerced to an integer; `0` when absent or non-numeric.
    pub fn worker_id(&self) -> i64 {
        coerce_int(self.worker_number.as_deref(), 0)
    }

    /// Period the assignment starts in: month 7 or later is the second half.
    pub fn start_period(&self) -> Period {
        let month = match coerce_int(self.start_month.as_deref(), 1) {
            0 => 1,
            m => m,
        };
        let half = if month >= 7 { Half::Second } else { Half::First };
        Period::new(normalize_year(self.start_year.as_deref()), half)
    }

    /// Period a proposal page is filed under, preferring the end date.
    ///
    /// Months `1..=6` are the first half; anything else, including
    /// out-of-range months, is the second half.
    pub fn filing_period(&self) -> Period {
        let year = self.end_year.as_deref().or(self.start_year.as_deref());
        let month = self.end_month.as_deref().or(self.start_month.as_deref());
        let m = coerce_int(month, 1);
        let half = if (1..=6).contains(&m) {
            Half::First
        } else {
            Half::Second
        };
        Period::new(normalize_year(year), half)
    }

    /// Whether the record carries any year at all.
    pub fn has_year(&self) -> bool {
        self.start_year.is_some() || self.end_year.is_some()
    }
}

/// Borrow an optional field as `&str`, blank when absent.
pub fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_stored_spelling() {
        let rec: AssignmentRecord = serde_json::from_value(json!({
            "profesor": " ABURTO CAMACHO BLANCA ",
            "rfc": "AUCB800101",
            "numTrabajador": 809328,
            "horasTeoricas": "4",
            "horasPracticas": null,
            "diaIni": 7,
            "salon": ""
        }))
        .unwrap();

        assert_eq!(rec.name.as_deref(), Some("ABURTO CAMACHO BLANCA"));
        assert_eq!(rec.worker_number.as_deref(), Some("809328"));
        assert_eq!(rec.worker_id(), 809328);
        assert_eq!(rec.theoretical(), 4);
        assert_eq!(rec.practical(), 0);
        assert_eq!(rec.start_day.as_deref(), Some("7"));
        assert_eq!(rec.room, None);
    }

    #[test]
    fn test_deserialize_canonical_spelling() {
        let rec: AssignmentRecord = serde_json::from_value(json!({
            "workerNumber": "12",
            "subjectCode": "17",
            "theoreticalHours": "3",
            "startMonth": "8"
        }))
        .unwrap();

        assert_eq!(rec.worker_id(), 12);
        assert_eq!(rec.subject_code.as_deref(), Some("17"));
        assert_eq!(rec.theoretical(), 3);
    }

    #[test]
    fn test_ignores_unknown_and_nested_values() {
        let rec: AssignmentRecord = serde_json::from_value(json!({
            "profesor": {"nested": true},
            "extra": "ignored"
        }))
        .unwrap();
        assert_eq!(rec.name, None);
    }

    #[test]
    fn test_total_defaults_to_sum() {
        let rec = AssignmentRecord {
            theoretical_hours: Some("2".into()),
            practical_hours: Some("3".into()),
            ..Default::default()
        };
        assert_eq!(rec.total(), 5);

        let rec = AssignmentRecord {
            total_hours: Some("9".into()),
            ..rec
        };
        assert_eq!(rec.total(), 9);
    }

    #[test]
    fn test_banked_theoretical_falls_back_to_total() {
        let rec = AssignmentRecord {
            total_hours: Some("6".into()),
            ..Default::default()
        };
        assert_eq!(rec.theoretical(), 0);
        assert_eq!(rec.banked_theoretical(), 6.0);
    }

    #[test]
    fn test_blank_theoretical_hours_do_not_fall_back() {
        let rec: AssignmentRecord = serde_json::from_value(json!({
            "horasTeoricas": " ",
            "horasPracticas": "1.5",
            "horasTotal": 6
        }))
        .unwrap();
        assert_eq!(rec.theoretical_hours.as_deref(), Some(""));
        assert_eq!(rec.banked_theoretical(), 0.0);
        assert_eq!(rec.banked_practical(), 1.5);
        assert_eq!(rec.total(), 6);

        let rec: AssignmentRecord = serde_json::from_value(json!({
            "horasTeoricas": null,
            "horasTotal": "4.5"
        }))
        .unwrap();
        assert_eq!(rec.banked_theoretical(), 4.5);
    }

    #[test]
    fn test_start_period() {
        let rec = AssignmentRecord {
            start_month: Some("8".into()),
            start_year: Some("24".into()),
            ..Default::default()
        };
        assert_eq!(rec.start_period().to_string(), "2024-II");

        let rec = AssignmentRecord {
            start_month: Some("2".into()),
            start_year: Some("2025".into()),
            ..Default::default()
        };
        assert_eq!(rec.start_period().to_string(), "2025-I");
    }

    #[test]
    fn test_start_period_missing_month_is_first_half() {
        let rec = AssignmentRecord {
            start_month: Some("0".into()),
            start_year: Some("23".into()),
            ..Default::default()
        };
        assert_eq!(rec.start_period().to_string(), "2023-I");
    }

    #[test]
    fn test_filing_period_prefers_end_date() {
        let rec = AssignmentRecord {
            start_month: Some("8".into()),
            start_year: Some("23".into()),
            end_month: Some("1".into()),
            end_year: Some("24".into()),
            ..Default::default()
        };
        assert_eq!(rec.filing_period().to_string(), "2024-I");
    }

    #[test]
    fn test_filing_period_out_of_range_month_is_second_half() {
        let rec = AssignmentRecord {
            end_month: Some("13".into()),
            end_year: Some("25".into()),
            ..Default::default()
        };
        assert_eq!(rec.filing_period().to_string(), "2025-II");
    }

    #[test]
    fn test_roster_entry_is_transparent() {
        let entry: RosterEntry =
            serde_json::from_value(json!({"profesor": "X", "carrera": "ICO"})).unwrap();
        assert_eq!(entry.career.as_deref(), Some("ICO"));
        assert_eq!(serde_json::to_value(&entry).unwrap()["carrera"], "ICO");
    }
}
