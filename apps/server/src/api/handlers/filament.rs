//! Filament handlers

use crate::{
    api::{
        extract::{parse_id_list, IdPath, JsonBody, QueryParams},
        handlers::deleted,
    },
    models::{FilamentCreate, FilamentFilter, FilamentUpdate},
    state::AppState,
    Result,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct ListFilamentsQuery {
    /// Comma-separated vendor ids.
    #[serde(rename = "vendor.id")]
    pub vendor_id: Option<String>,
    pub name: Option<String>,
    pub material: Option<String>,
}

pub async fn create_filament(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<FilamentCreate>,
) -> Result<Response> {
    let filament = state.filament_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(filament)).into_response())
}

pub async fn list_filaments(
    State(state): State<AppState>,
    QueryParams(q): QueryParams<ListFilamentsQuery>,
) -> Result<Response> {
    let filter = FilamentFilter {
        vendor_ids: parse_id_list(q.vendor_id.as_deref())?,
        name: q.name,
        material: q.material,
    };
    let filaments = state.filament_service.list(&filter).await?;
    Ok((StatusCode::OK, Json(filaments)).into_response())
}

pub async fn get_filament(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Response> {
    let filament = state.filament_service.get(id).await?;
    Ok((StatusCode::OK, Json(filament)).into_response())
}

pub async fn update_filament(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    JsonBody(changes): JsonBody<FilamentUpdate>,
) -> Result<Response> {
    let filament = state.filament_service.update(id, changes).await?;
    Ok((StatusCode::OK, Json(filament)).into_response())
}

pub async fn delete_filament(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Response> {
    state.filament_service.delete(id).await?;
    Ok(deleted())
}
