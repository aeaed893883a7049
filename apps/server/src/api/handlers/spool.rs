//! Spool handlers

use crate::{
    api::{
        extract::{parse_id_list, IdPath, JsonBody, QueryParams},
        handlers::deleted,
    },
    models::{SpoolCreate, SpoolFilter, SpoolUpdate, SpoolUse},
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
pub struct ListSpoolsQuery {
    #[serde(rename = "filament.id")]
    pub filament_id: Option<String>,
    #[serde(rename = "vendor.id")]
    pub vendor_id: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub allow_archived: bool,
}

pub async fn create_spool(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<SpoolCreate>,
) -> Result<Response> {
    let spool = state.spool_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(spool)).into_response())
}

pub async fn list_spools(
    State(state): State<AppState>,
    QueryParams(q): QueryParams<ListSpoolsQuery>,
) -> Result<Response> {
    let filter = SpoolFilter {
        filament_ids: parse_id_list(q.filament_id.as_deref())?,
        vendor_ids: parse_id_list(q.vendor_id.as_deref())?,
        location: q.location,
        allow_archived: q.allow_archived,
    };
    let spools = state.spool_service.list(&filter).await?;
    Ok((StatusCode::OK, Json(spools)).into_response())
}

pub async fn get_spool(State(state): State<AppState>, IdPath(id): IdPath) -> Result<Response> {
    let spool = state.spool_service.get(id).await?;
    Ok((StatusCode::OK, Json(spool)).into_response())
}

pub async fn update_spool(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    JsonBody(changes): JsonBody<SpoolUpdate>,
) -> Result<Response> {
    let spool = state.spool_service.update(id, changes).await?;
    Ok((StatusCode::OK, Json(spool)).into_response())
}

/// Record filament consumption for a spool.
pub async fn use_spool(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    JsonBody(usage): JsonBody<SpoolUse>,
) -> Result<Response> {
    let spool = state.spool_service.use_spool(id, usage).await?;
    Ok((StatusCode::OK, Json(spool)).into_response())
}

pub async fn delete_spool(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Response> {
    state.spool_service.delete(id).await?;
    Ok(deleted())
}
