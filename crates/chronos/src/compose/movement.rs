//! Single movement form drawn from an explicit row payload.

use chronos_core::aggregate::NOT_AVAILABLE;
use chronos_core::normalize::{coerce_int, pad_subject_code};
use chronos_core::pages::{ReportPage, ReportRow, RowField, DEFAULT_PERIOD, DEFAULT_SIGNER, DEFAULT_UNIT};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::proposal::{draw_sheets, Sheet};
use super::{footer_date_line, new_surface, BuildContext};
use crate::prelude::*;

/// Request body of a movement form. Every field is optional except `rows`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementForm {
    pub periodo: Option<String>,
    pub carrera: Option<String>,
    pub unidad: Option<String>,
    pub interesado: Option<String>,
    pub jefe: Option<String>,
    pub fecha: Option<String>,
    pub observaciones: Option<String>,
    #[serde(rename = "logoLeftUrl")]
    pub logo_left_url: Option<String>,
    #[serde(rename = "logoRightUrl")]
    pub logo_right_url: Option<String>,
    /// Table rows keyed by column key (`mov`, `causa`, `cat`, `iD`, ...).
    pub rows: Vec<Map<String, Value>>,
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn or_default(value: &Option<String>, default: &str) -> String {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}

/// Build one table row from a keyed JSON object. Unknown keys are ignored;
/// `tot` defaults to `teo + pra`.
pub fn row_from_map(map: &Map<String, Value>) -> ReportRow {
    let get = |field: RowField| map.get(field.key()).and_then(text_of);
    let theoretical = coerce_int(get(RowField::Theoretical).as_deref(), 0);
    let practical = coerce_int(get(RowField::Practical).as_deref(), 0);
    let text = |field: RowField| get(field).unwrap_or_default();

    ReportRow {
        movement: text(RowField::Movement),
        cause: text(RowField::Cause),
        category: text(RowField::Category),
        start_day: text(RowField::StartDay),
        start_month: text(RowField::StartMonth),
        start_year: text(RowField::StartYear),
        end_day: text(RowField::EndDay),
        end_month: text(RowField::EndMonth),
        end_year: text(RowField::EndYear),
        study_plan: text(RowField::StudyPlan),
        subject_code: pad_subject_code(get(RowField::SubjectCode).as_deref()),
        subject_name: text(RowField::SubjectName),
        group: text(RowField::Group),
        theoretical,
        practical,
        total: coerce_int(get(RowField::Total).as_deref(), theoretical + practical),
        schedule: text(RowField::Schedule),
        room: text(RowField::Room),
    }
}

impl MovementForm {
    /// The page this form describes.
    pub fn page(&self) -> ReportPage {
        ReportPage {
            period: or_default(&self.periodo, DEFAULT_PERIOD),
            career: or_default(&self.carrera, NOT_AVAILABLE),
            unit: or_default(&self.unidad, DEFAULT_UNIT),
            signer: or_default(&self.jefe, DEFAULT_SIGNER),
            observations: or_default(&self.observaciones, ""),
            rows: self.rows.iter().map(row_from_map).collect(),
        }
    }
}

pub fn render_movement(form: &MovementForm, ctx: &BuildContext) -> Result<Vec<u8>, Error> {
    if form.rows.is_empty() {
        return Err(Error::NothingToRender("the form has no rows".into()));
    }
    let page = form.page();
    let holder = or_default(&form.interesado, NOT_AVAILABLE);
    let date_line = form
        .fecha
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| footer_date_line(ctx.today));
    log::info!("Movement form: {} rows", page.rows.len());

    let mut surface = new_surface();
    draw_sheets(
        &mut surface,
        ctx,
        &[Sheet {
            page: &page,
            holder: &holder,
            date_line: &date_line,
        }],
    );
    Ok(surface.finish()?)
}
