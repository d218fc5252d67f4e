use std::path::PathBuf;

use crate::compose::ledger::{render_ledger, LedgerOptions};
use crate::prelude::{eprintln, *};

#[derive(Debug, clap::Parser)]
#[command(name = "ledger")]
#[command(about = "Render the hour-bank ledger for every stored assignment")]
pub struct App {
    /// Semester printed under the title (defaults to the last configured period)
    #[arg(long, env = "CHRONOS_SEMESTER")]
    semester: Option<String>,

    /// Free text for the footer observation line
    #[arg(long)]
    observations: Option<String>,

    /// Output file
    #[arg(short, long, default_value = "horario-general.pdf")]
    output: PathBuf,
}

/// Module entry point
pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let store = global.store();
    let records = store.assignments();
    let roster = store.roster();
    if global.verbose {
        eprintln!(
            "Loaded {} assignments and {} roster entries from {}",
            records.len(),
            roster.len(),
            store.root().display()
        );
    }

    let client = reqwest::Client::new();
    let ctx = global.build_context(&client, None, None).await;
    let options = LedgerOptions {
        semester: app.semester,
        observations: app.observations,
    };

    let bytes = tokio::task::spawn_blocking(move || render_ledger(&records, &roster, &ctx, &options))
        .await
        .context("Ledger build panicked")??;

    crate::write_output(&app.output, &bytes, &global)
}
