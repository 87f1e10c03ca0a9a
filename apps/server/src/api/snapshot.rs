use std::sync::Arc;

use crate::{
    error::ApiResult,
    main_lib::AppState,
    models::{ImportMode, ImportParams, ImportResponse, ValidationResponse},
};
use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use stashbook_core::snapshot::{snapshot_file_name, ClearSummary};

async fn export_snapshot(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let body = state.snapshot_service.export_snapshot_json()?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        snapshot_file_name(Utc::now().date_naive())
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

async fn validate_snapshot(
    State(state): State<Arc<AppState>>,
    body: String,
) -> ApiResult<Json<ValidationResponse>> {
    let document = state.snapshot_service.parse_snapshot(&body)?;
    Ok(Json(ValidationResponse {
        valid: true,
        assets: document.assets.len(),
        holdings: document.holdings.len(),
    }))
}

/// Validates the whole document before anything is cleared or written.
async fn import_snapshot(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ImportParams>,
    body: String,
) -> ApiResult<Json<ImportResponse>> {
    let document = state.snapshot_service.parse_snapshot(&body)?;

    let cleared = match params.mode {
        ImportMode::Replace => Some(
            state
                .app_store
                .reload_after(state.snapshot_service.clear_all())
                .await?,
        ),
        ImportMode::Merge => None,
    };
    let imported = state
        .app_store
        .reload_after(state.snapshot_service.merge_import(document))
        .await?;

    Ok(Json(ImportResponse {
        mode: params.mode,
        imported,
        cleared,
    }))
}

async fn clear_snapshot(State(state): State<Arc<AppState>>) -> ApiResult<Json<ClearSummary>> {
    let cleared = state
        .app_store
        .reload_after(state.snapshot_service.clear_all())
        .await?;
    Ok(Json(cleared))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/snapshot/export", get(export_snapshot))
        .route("/snapshot/validate", post(validate_snapshot))
        .route("/snapshot/import", post(import_snapshot))
        .route("/snapshot/clear", post(clear_snapshot))
}
