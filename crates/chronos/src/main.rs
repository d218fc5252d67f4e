use std::path::{Path, PathBuf};

use crate::prelude::{eprintln, println, *};
use chronos_core::period::PeriodList;
use clap::Parser;

mod archive;
mod assets;
mod compose;
mod error;
mod ledger;
mod load;
mod movement;
mod prelude;
mod proposal;
mod serve;
mod storage;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Academic workload reports: hour-bank ledgers, assignment proposals and movement forms"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Directory holding the stored assignment and roster collections
    #[clap(long, env = "CHRONOS_DATA_DIR", global = true, default_value = "./data")]
    data_dir: PathBuf,

    /// Configured periods, as a comma list or a JSON array
    #[clap(
        long,
        env = "CHRONOS_PERIODS",
        global = true,
        default_value = "2024-II,2025-I,2025-II,2026-I"
    )]
    periods: PeriodList,

    /// Left header logo (URL or local path)
    #[clap(long, env = "CHRONOS_LOGO_LEFT", global = true)]
    logo_left: Option<String>,

    /// Right header logo (URL or local path)
    #[clap(long, env = "CHRONOS_LOGO_RIGHT", global = true)]
    logo_right: Option<String>,

    /// Whether to display additional information.
    #[clap(long, env = "CHRONOS_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

impl Global {
    pub fn store(&self) -> storage::Store {
        storage::Store::new(&self.data_dir)
    }

    /// Per-build context with freshly fetched logos. Request-level logo
    /// sources win over the configured ones.
    pub async fn build_context(
        &self,
        client: &reqwest::Client,
        left: Option<&str>,
        right: Option<&str>,
    ) -> compose::BuildContext {
        let left = left.or(self.logo_left.as_deref());
        let right = right.or(self.logo_right.as_deref());
        let logos = assets::load_logos(client, left, right).await;
        compose::BuildContext::new(self.periods.clone(), logos)
    }
}

/// Write a finished document and report where it went.
pub fn write_output(path: &Path, bytes: &[u8], global: &Global) -> Result<()> {
    std::fs::write(path, bytes).with_context(|| f!("Failed to write {}", path.display()))?;
    if global.verbose {
        eprintln!("{} bytes", bytes.len());
    }
    println!("{}", path.display());
    Ok(())
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Replace or show the stored assignment and roster collections
    Load(crate::load::App),

    /// Render the hour-bank ledger
    Ledger(crate::ledger::App),

    /// Render assignment proposals
    Proposal(crate::proposal::App),

    /// Render a movement form from a JSON payload
    Movement(crate::movement::App),

    /// Serve the HTTP API
    Serve(crate::serve::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Load(sub_app) => crate::load::run(sub_app, app.global).await,
        SubCommands::Ledger(sub_app) => crate::ledger::run(sub_app, app.global).await,
        SubCommands::Proposal(sub_app) => crate::proposal::run(sub_app, app.global).await,
        SubCommands::Movement(sub_app) => crate::movement::run(sub_app, app.global).await,
        SubCommands::Serve(sub_app) => crate::serve::run(sub_app, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
