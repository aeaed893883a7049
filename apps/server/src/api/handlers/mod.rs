//! Request handlers

pub mod filament;
pub mod health;
pub mod spool;
pub mod vendor;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Body returned by successful deletes.
pub(crate) fn deleted() -> Response {
    (StatusCode::OK, Json(json!({}))).into_response()
}
