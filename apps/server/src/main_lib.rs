use std::sync::Arc;

use crate::config::Config;
use stashbook_core::{
    snapshot::{SnapshotService, SnapshotServiceTrait},
    state::AppStore,
};
use stashbook_storage_sqlite::{AssetStore, FileKeyValueStore};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub app_store: Arc<AppStore>,
    pub snapshot_service: Arc<dyn SnapshotServiceTrait>,
}

pub fn init_tracing() {
    let log_format = std::env::var("STASHBOOK_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Opens the asset store, runs the one-shot legacy import and loads the mirror.
pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let asset_store = Arc::new(AssetStore::new(config.db_path.clone()));
    let legacy_storage = Arc::new(FileKeyValueStore::new(config.legacy_dir.clone()));

    let app_store = Arc::new(AppStore::new(asset_store.clone(), legacy_storage));
    app_store.initialize_app().await?;
    tracing::info!("Database path in use: {}", config.db_path);

    if let Some(report) = app_store.legacy_import_report().filter(|r| r.found) {
        tracing::info!(
            "Legacy data import: {} assets imported, {} skipped, {} holdings discarded",
            report.assets_imported,
            report.assets_skipped,
            report.holdings_discarded
        );
    }

    let snapshot_service: Arc<dyn SnapshotServiceTrait> =
        Arc::new(SnapshotService::new(asset_store.clone(), asset_store));

    Ok(Arc::new(AppState {
        app_store,
        snapshot_service,
    }))
}
