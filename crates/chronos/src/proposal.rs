use std::path::PathBuf;

use chronos_core::csv::records_from_csv;
use chronos_core::pages::PageOverrides;
use chronos_core::records::{AssignmentRecord, RosterEntry};

use crate::archive::zip_documents;
use crate::compose::proposal::{render_all, render_archive, render_proposal, ProposalOptions};
use crate::compose::BuildContext;
use crate::prelude::{eprintln, *};

#[derive(Debug, clap::Parser)]
#[command(name = "proposal")]
#[command(about = "Render assignment proposals for one holder, every holder or a CSV file")]
pub struct App {
    /// Worker number of a single holder
    #[arg(short, long, conflicts_with_all = ["all", "csv"])]
    worker: Option<i64>,

    /// Every stored holder with a worker number, in one document
    #[arg(long)]
    all: bool,

    /// Read assignments from a CSV file instead of the store
    #[arg(long, conflicts_with = "all")]
    csv: Option<PathBuf>,

    /// One document per holder, packed into a ZIP archive
    #[arg(long, conflicts_with = "worker")]
    zip: bool,

    #[clap(flatten)]
    meta: MetaOptions,

    /// Output file (a name is derived from the mode when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Metadata printed on every page; each one overrides what the data says.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct MetaOptions {
    /// Period label
    #[arg(long)]
    period: Option<String>,

    /// Responsible unit
    #[arg(long)]
    unit: Option<String>,

    /// Head of career who signs
    #[arg(long)]
    signer: Option<String>,

    /// Observation line
    #[arg(long)]
    observations: Option<String>,

    /// Footer date line
    #[arg(long)]
    date: Option<String>,
}

impl From<MetaOptions> for ProposalOptions {
    fn from(meta: MetaOptions) -> Self {
        ProposalOptions {
            overrides: PageOverrides {
                period: meta.period,
                unit: meta.unit,
                signer: meta.signer,
                observations: meta.observations,
            },
            date_line: meta.date,
        }
    }
}

/// What a run renders and where it lands by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Single(i64),
    All,
    Archive,
}

fn default_output(mode: Mode, from_csv: bool) -> String {
    let source = if from_csv { "-desde-CSV" } else { "" };
    match mode {
        Mode::Single(worker) => f!("Propuesta-{worker}.pdf"),
        Mode::All if from_csv => "Propuestas-desde-CSV.pdf".to_string(),
        Mode::All => "Propuestas-todos.pdf".to_string(),
        Mode::Archive => f!("Propuestas{source}.zip"),
    }
}

fn build(
    mode: Mode,
    records: &[AssignmentRecord],
    roster: &[RosterEntry],
    ctx: &BuildContext,
    options: &ProposalOptions,
) -> std::result::Result<Vec<u8>, Error> {
    match mode {
        Mode::Single(worker) => render_proposal(records, roster, worker, ctx, options),
        Mode::All => render_all(records, roster, ctx, options),
        Mode::Archive => zip_documents(&render_archive(records, roster, ctx, options)?),
    }
}

/// Module entry point
pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let mode = match (app.worker, app.zip, app.all || app.csv.is_some()) {
        (Some(worker), _, _) => Mode::Single(worker),
        (None, true, _) => Mode::Archive,
        (None, false, true) => Mode::All,
        (None, false, false) => return Err(eyre!("Pass --worker <N>, --all or --csv <FILE>")),
    };

    let (records, roster) = match &app.csv {
        Some(path) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| f!("Failed to read {}", path.display()))?;
            let records = records_from_csv(&text);
            if records.is_empty() {
                return Err(Error::InvalidInput(f!("{} has no data rows", path.display())).into());
            }
            (records, Vec::new())
        }
        None => {
            let store = global.store();
            (store.assignments(), store.roster())
        }
    };
    if global.verbose {
        eprintln!(
            "{:?}: {} assignments, {} roster entries",
            mode,
            records.len(),
            roster.len()
        );
    }

    let client = reqwest::Client::new();
    let ctx = global.build_context(&client, None, None).await;
    let options = ProposalOptions::from(app.meta);

    let bytes = tokio::task::spawn_blocking(move || build(mode, &records, &roster, &ctx, &options))
        .await
        .context("Proposal build panicked")??;

    let output = app
        .output
        .unwrap_or_else(|| PathBuf::from(default_output(mode, app.csv.is_some())));
    crate::write_output(&output, &bytes, &global)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_default_output_names() {
        assert_eq!(default_output(Mode::Single(809328), false), "Propuesta-809328.pdf");
        assert_eq!(default_output(Mode::All, false), "Propuestas-todos.pdf");
        assert_eq!(default_output(Mode::All, true), "Propuestas-desde-CSV.pdf");
        assert_eq!(default_output(Mode::Archive, true), "Propuestas-desde-CSV.zip");
    }

    #[test]
    fn test_meta_becomes_overrides() {
        let app = App::try_parse_from([
            "proposal",
            "--all",
            "--period",
            "2025-II",
            "--date",
            "a 01 de Enero del 2030",
        ])
        .unwrap();
        let options = ProposalOptions::from(app.meta);
        assert_eq!(options.overrides.period.as_deref(), Some("2025-II"));
        assert_eq!(options.date_line.as_deref(), Some("a 01 de Enero del 2030"));
    }

    #[test]
    fn test_worker_conflicts_with_all() {
        assert!(App::try_parse_from(["proposal", "--worker", "7", "--all"]).is_err());
    }
}
