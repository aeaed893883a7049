//! Vendor handlers

use crate::{
    api::{
        extract::{IdPath, JsonBody, QueryParams},
        handlers::deleted,
    },
    models::{VendorCreate, VendorFilter, VendorUpdate},
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
pub struct ListVendorsQuery {
    pub name: Option<String>,
    pub external_id: Option<String>,
}

pub async fn create_vendor(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<VendorCreate>,
) -> Result<Response> {
    let vendor = state.vendor_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(vendor)).into_response())
}

pub async fn list_vendors(
    State(state): State<AppState>,
    QueryParams(q): QueryParams<ListVendorsQuery>,
) -> Result<Response> {
    let filter = VendorFilter {
        name: q.name,
        external_id: q.external_id,
    };
    let vendors = state.vendor_service.list(&filter).await?;
    Ok((StatusCode::OK, Json(vendors)).into_response())
}

pub async fn get_vendor(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Response> {
    let vendor = state.vendor_service.get(id).await?;
    Ok((StatusCode::OK, Json(vendor)).into_response())
}

pub async fn update_vendor(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    JsonBody(changes): JsonBody<VendorUpdate>,
) -> Result<Response> {
    let vendor = state.vendor_service.update(id, changes).await?;
    Ok((StatusCode::OK, Json(vendor)).into_response())
}

pub async fn delete_vendor(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Response> {
    state.vendor_service.delete(id).await?;
    Ok(deleted())
}
