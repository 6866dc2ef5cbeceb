pub mod core;
pub mod db;
pub mod repositories;
pub mod schemas;
pub mod services;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use crate::core::{config::Settings, state::AppState, telemetry};

/// Opens the portal store, seeds it on first run, and returns the shared
/// state the embedding shell hands to the UI layer.
pub fn init() -> anyhow::Result<AppState> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    core::metrics::init(&settings)?;

    let store = Arc::new(db::open_store(&settings)?);
    let state = AppState::new(settings, store);

    if let Err(err) = core::bootstrap::ensure_admin(&state) {
        tracing::error!(error = %err, "Failed to ensure default admin");
    }
    if let Err(err) = core::bootstrap::seed_catalog(&state) {
        tracing::error!(error = %err, "Failed to seed catalog fixtures");
    }

    Ok(state)
}

pub fn run() -> anyhow::Result<()> {
    let state = init()?;

    let subjects = repositories::subjects::all(state.store())?;
    let exams = repositories::exams::all(state.store())?;

    tracing::info!(
        data_dir = %state.store().root().display(),
        environment = %state.settings().runtime().environment.as_str(),
        subjects = subjects.len(),
        exams = exams.len(),
        "Bagrut portal store ready"
    );

    Ok(())
}
