use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use stashbook_core::{
    assets::{Asset, AssetUpdate, NewAsset},
    constants::INSTITUTION_SUGGESTIONS,
    state::AssetsState,
};

async fn get_assets(State(state): State<Arc<AppState>>) -> ApiResult<Json<AssetsState>> {
    Ok(Json(state.app_store.state()?))
}

async fn create_asset(
    State(state): State<Arc<AppState>>,
    Json(new_asset): Json<NewAsset>,
) -> ApiResult<Json<Asset>> {
    let asset = state.app_store.add_asset(new_asset).await?;
    Ok(Json(asset))
}

async fn update_asset(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(update): Json<AssetUpdate>,
) -> ApiResult<Json<Asset>> {
    let asset = state.app_store.update_asset(&id, update).await?;
    Ok(Json(asset))
}

async fn delete_asset(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    state.app_store.delete_asset(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn reload_assets(State(state): State<Arc<AppState>>) -> ApiResult<Json<AssetsState>> {
    state.app_store.reload_data()?;
    Ok(Json(state.app_store.state()?))
}

async fn list_institutions() -> Json<Vec<&'static str>> {
    Json(INSTITUTION_SUGGESTIONS.to_vec())
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/assets", get(get_assets).post(create_asset))
        .route("/assets/reload", post(reload_assets))
        .route("/assets/{id}", put(update_asset).delete(delete_asset))
        .route("/institutions", get(list_institutions))
}
