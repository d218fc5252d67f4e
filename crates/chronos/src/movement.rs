use std::path::PathBuf;

use crate::compose::movement::{render_movement, MovementForm};
use crate::prelude::*;

#[derive(Debug, clap::Parser)]
#[command(name = "movement")]
#[command(about = "Render a movement form from a JSON payload")]
pub struct App {
    /// JSON file with `rows` and optional `periodo`, `carrera`, `unidad`,
    /// `interesado`, `jefe`, `fecha` and `observaciones`
    input: PathBuf,

    /// Output file
    #[arg(short, long, default_value = "forma-movimientos.pdf")]
    output: PathBuf,
}

/// Module entry point
pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let body = tokio::fs::read_to_string(&app.input)
        .await
        .with_context(|| f!("Failed to read {}", app.input.display()))?;
    let form: MovementForm = serde_json::from_str(&body)
        .map_err(|e| Error::InvalidInput(f!("{}: {e}", app.input.display())))?;

    let client = reqwest::Client::new();
    let ctx = global
        .build_context(
            &client,
            form.logo_left_url.as_deref(),
            form.logo_right_url.as_deref(),
        )
        .await;

    let bytes = tokio::task::spawn_blocking(move || render_movement(&form, &ctx))
        .await
        .context("Movement form build panicked")??;

    crate::write_output(&app.output, &bytes, &global)
}
