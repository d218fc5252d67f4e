//! HTTP API over the document builders.
//!
//! Every handler validates its input and loads its data before any bytes
//! are produced, so failures always come back as a JSON error with a
//! status code. Document builds run on the blocking pool.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chronos_core::csv::records_from_csv;
use chronos_core::normalize::coerce_int;
use chronos_core::pages::PageOverrides;
use serde::Deserialize;
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};

use crate::archive::zip_documents;
use crate::compose::ledger::{render_ledger, LedgerOptions};
use crate::compose::movement::{render_movement, MovementForm};
use crate::compose::proposal::{render_all, render_archive, render_proposal, ProposalOptions};
use crate::prelude::{eprintln, *};
use crate::storage::{parse_collection, Store, ASSIGNMENTS_KEY, ROSTER_KEY};

type ApiResult<T> = std::result::Result<T, Error>;

const PDF: &str = "application/pdf";
const ZIP: &str = "application/zip";

#[derive(Debug, clap::Parser)]
#[command(name = "serve")]
#[command(about = "Serve the HTTP API")]
pub struct App {
    /// Port to listen on
    #[arg(short, long, env = "CHRONOS_PORT", default_value = "3000")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, env = "CHRONOS_HOST", default_value = "127.0.0.1")]
    pub host: String,
}

#[derive(Clone)]
pub struct AppState {
    global: Arc<crate::Global>,
    store: Store,
    client: reqwest::Client,
}

impl AppState {
    pub fn new(global: crate::Global) -> Self {
        Self {
            store: global.store(),
            global: Arc::new(global),
            client: reqwest::Client::new(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/cargar-horario", post(load_assignments).get(show_assignments))
        .route("/api/cargar-profesores", post(load_roster).get(show_roster))
        .route("/api/horario-general-pdf", get(ledger_pdf))
        .route("/api/propuesta", get(proposal_pdf))
        .route("/api/propuestas-all", get(all_proposals_pdf))
        .route("/api/propuestas-from-csv", post(csv_proposals))
        .route("/api/forma-movimientos-pdf", post(movement_pdf))
        .layer(cors)
        .with_state(state)
}

/// Module entry point
pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let addr = f!("{}:{}", app.host, app.port);
    let verbose = global.verbose;
    let router = router(AppState::new(global));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| eyre!("Failed to bind to {}: {}", addr, e))?;

    if verbose {
        eprintln!("chronos listening on http://{}", addr);
    }
    log::info!("Listening on {addr}");

    axum::serve(listener, router)
        .await
        .map_err(|e| eyre!("Server error: {e}"))?;

    Ok(())
}

fn document(bytes: Vec<u8>, content_type: &str, disposition: &str, file_name: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                f!("{disposition}; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

async fn build<T, F>(job: F) -> ApiResult<T>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| Error::Render(e.to_string()))?
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

fn replace_collection(store: &Store, key: &str, body: &str) -> ApiResult<Json<Value>> {
    let items = parse_collection(body)?;
    let count = store
        .replace(key, &items)
        .map_err(|e| Error::Storage(e.to_string()))?;
    Ok(Json(serde_json::json!({ "stored": count })))
}

fn show_collection(store: &Store, key: &str) -> ApiResult<Json<Value>> {
    let values = store.values(key);
    if values.is_empty() {
        return Err(Error::NotFound(f!("nothing stored under {key}")));
    }
    Ok(Json(Value::Array(values)))
}

async fn load_assignments(State(state): State<AppState>, body: String) -> ApiResult<Json<Value>> {
    replace_collection(&state.store, ASSIGNMENTS_KEY, &body)
}

async fn show_assignments(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    show_collection(&state.store, ASSIGNMENTS_KEY)
}

async fn load_roster(State(state): State<AppState>, body: String) -> ApiResult<Json<Value>> {
    replace_collection(&state.store, ROSTER_KEY, &body)
}

async fn show_roster(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    show_collection(&state.store, ROSTER_KEY)
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct LedgerQuery {
    semestre: Option<String>,
    observaciones: Option<String>,
}

async fn ledger_pdf(
    State(state): State<AppState>,
    Query(query): Query<LedgerQuery>,
) -> ApiResult<Response> {
    let records = state.store.assignments();
    let roster = state.store.roster();
    let ctx = state.global.build_context(&state.client, None, None).await;
    let options = LedgerOptions {
        semester: query.semestre,
        observations: query.observaciones,
    };
    let bytes = build(move || render_ledger(&records, &roster, &ctx, &options)).await?;
    Ok(document(bytes, PDF, "inline", "horario-general.pdf"))
}

/// Page metadata overrides shared by the proposal routes.
#[derive(Debug, Default, Deserialize)]
pub struct ProposalQuery {
    worker: Option<String>,
    #[serde(rename = "numTrabajador")]
    worker_number: Option<String>,
    periodo: Option<String>,
    unidad: Option<String>,
    jefe: Option<String>,
    observaciones: Option<String>,
    fecha: Option<String>,
}

impl ProposalQuery {
    fn options(&self) -> ProposalOptions {
        ProposalOptions {
            overrides: PageOverrides {
                period: self.periodo.clone(),
                unit: self.unidad.clone(),
                signer: self.jefe.clone(),
                observations: self.observaciones.clone(),
            },
            date_line: self.fecha.clone(),
        }
    }

    fn worker(&self) -> ApiResult<i64> {
        let raw = self
            .worker
            .as_deref()
            .or(self.worker_number.as_deref())
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .ok_or_else(|| Error::InvalidInput("missing ?worker parameter".into()))?;
        match coerce_int(Some(raw), 0) {
            0 => Err(Error::InvalidInput(f!("invalid worker number {raw:?}"))),
            worker => Ok(worker),
        }
    }
}

async fn proposal_pdf(
    State(state): State<AppState>,
    Query(query): Query<ProposalQuery>,
) -> ApiResult<Response> {
    let worker = query.worker()?;
    let records = state.store.assignments();
    let roster = state.store.roster();
    let ctx = state.global.build_context(&state.client, None, None).await;
    let options = query.options();
    let bytes = build(move || render_proposal(&records, &roster, worker, &ctx, &options)).await?;
    Ok(document(bytes, PDF, "inline", &f!("Propuesta-{worker}.pdf")))
}

async fn all_proposals_pdf(
    State(state): State<AppState>,
    Query(query): Query<ProposalQuery>,
) -> ApiResult<Response> {
    let records = state.store.assignments();
    let roster = state.store.roster();
    let ctx = state.global.build_context(&state.client, None, None).await;
    let options = query.options();
    let bytes = build(move || render_all(&records, &roster, &ctx, &options))
        .await
        .map_err(|e| match e {
            Error::NothingToRender(msg) => Error::NotFound(msg),
            e => e,
        })?;
    Ok(document(bytes, PDF, "inline", "Propuestas-todos.pdf"))
}

/// `true`, `1` or `zip`, in any case.
fn zip_flag(value: &Value) -> bool {
    let text = match value {
        Value::String(s) => s.trim().to_ascii_lowercase(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        _ => return false,
    };
    matches!(text.as_str(), "true" | "1" | "zip")
}

/// CSV text and archive flag from a raw `text/csv` body or a
/// `{"csv": "...", "zip": ...}` JSON body. Query flags win.
fn csv_request(body: &str, query: &HashMap<String, String>) -> ApiResult<(String, bool)> {
    let query_zip = ["isZip", "iszip", "zip"]
        .iter()
        .find_map(|k| query.get(*k))
        .map(|v| zip_flag(&Value::String(v.clone())));

    let trimmed = body.trim();
    let (text, body_zip) = match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => {
            let text = map
                .get("csv")
                .and_then(Value::as_str)
                .ok_or_else(|| Error::InvalidInput("send text/csv or {\"csv\": \"...\"}".into()))?
                .to_string();
            let zip = ["isZip", "zip"]
                .iter()
                .find_map(|k| map.get(*k))
                .map(zip_flag);
            (text, zip)
        }
        _ if trimmed.contains(',') => (body.to_string(), None),
        _ => {
            return Err(Error::InvalidInput(
                "send text/csv or {\"csv\": \"...\"}".into(),
            ))
        }
    };
    Ok((text, query_zip.or(body_zip).unwrap_or(false)))
}

async fn csv_proposals(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    body: String,
) -> ApiResult<Response> {
    let (text, zip) = csv_request(&body, &query)?;
    let records = records_from_csv(&text);
    if records.is_empty() {
        return Err(Error::InvalidInput("empty or invalid CSV".into()));
    }
    if records.iter().all(|r| r.worker_id() == 0) {
        return Err(Error::InvalidInput("the CSV has no valid worker numbers".into()));
    }

    let ctx = state.global.build_context(&state.client, None, None).await;
    let options = ProposalOptions::default();
    if zip {
        let bytes = build(move || {
            let documents = render_archive(&records, &[], &ctx, &options)?;
            zip_documents(&documents)
        })
        .await?;
        Ok(document(bytes, ZIP, "attachment", "Propuestas-desde-CSV.zip"))
    } else {
        let bytes = build(move || render_all(&records, &[], &ctx, &options)).await?;
        Ok(document(bytes, PDF, "inline", "Propuestas-desde-CSV.pdf"))
    }
}

async fn movement_pdf(State(state): State<AppState>, body: String) -> ApiResult<Response> {
    let form: MovementForm = serde_json::from_str(&body)
        .map_err(|e| Error::InvalidInput(f!("invalid movement form: {e}")))?;
    let ctx = state
        .global
        .build_context(
            &state.client,
            form.logo_left_url.as_deref(),
            form.logo_right_url.as_deref(),
        )
        .await;
    let bytes = build(move || render_movement(&form, &ctx)).await?;
    Ok(document(bytes, PDF, "inline", "forma-movimientos.pdf"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_zip_flag() {
        assert!(zip_flag(&Value::String("TRUE".into())));
        assert!(zip_flag(&Value::String("zip".into())));
        assert!(zip_flag(&Value::Bool(true)));
        assert!(zip_flag(&serde_json::json!(1)));
        assert!(!zip_flag(&Value::String("no".into())));
        assert!(!zip_flag(&Value::Null));
    }

    #[test]
    fn test_csv_request_raw_body() {
        let (text, zip) = csv_request("Profesor,Teo\nANA,4\n", &query(&[("zip", "1")])).unwrap();
        assert!(text.starts_with("Profesor,Teo"));
        assert!(zip);
    }

    #[test]
    fn test_csv_request_json_body() {
        let body = r#"{"csv": "Profesor,Teo\nANA,4", "isZip": "true"}"#;
        let (text, zip) = csv_request(body, &HashMap::new()).unwrap();
        assert_eq!(text, "Profesor,Teo\nANA,4");
        assert!(zip);

        let (_, zip) = csv_request(body, &query(&[("zip", "false")])).unwrap();
        assert!(!zip);
    }

    #[test]
    fn test_csv_request_rejects_other_bodies() {
        assert!(matches!(
            csv_request("", &HashMap::new()),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            csv_request(r#"{"rows": []}"#, &HashMap::new()),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_proposal_query_worker() {
        let q = ProposalQuery {
            worker_number: Some(" 809328 ".into()),
            ..Default::default()
        };
        assert_eq!(q.worker().unwrap(), 809328);
        assert!(matches!(
            ProposalQuery::default().worker(),
            Err(Error::InvalidInput(_))
        ));
        let q = ProposalQuery {
            worker: Some("abc".into()),
            ..Default::default()
        };
        assert!(matches!(q.worker(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_collection_routes_use_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        assert!(matches!(
            show_collection(&store, ROSTER_KEY),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            replace_collection(&store, ROSTER_KEY, "[]"),
            Err(Error::InvalidInput(_))
        ));
        let Json(reply) = replace_collection(&store, ROSTER_KEY, r#"[{"profesor":"ANA"}]"#).unwrap();
        assert_eq!(reply["stored"], 1);
        let Json(stored) = show_collection(&store, ROSTER_KEY).unwrap();
        assert_eq!(stored.as_array().map(Vec::len), Some(1));
    }
}
