use crate::api::handlers::{filament, health, spool, vendor};
use crate::state::AppState;
use axum::{
    routing::{get, put},
    Router,
};

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health::health_check))
}

/// Entity routes, mounted under `/api/v1`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/vendor", get(vendor::list_vendors).post(vendor::create_vendor))
        .route(
            "/vendor/:id",
            get(vendor::get_vendor)
                .patch(vendor::update_vendor)
                .delete(vendor::delete_vendor),
        )
        .route(
            "/filament",
            get(filament::list_filaments).post(filament::create_filament),
        )
        .route(
            "/filament/:id",
            get(filament::get_filament)
                .patch(filament::update_filament)
                .delete(filament::delete_filament),
        )
        .route("/spool", get(spool::list_spools).post(spool::create_spool))
        .route(
            "/spool/:id",
            get(spool::get_spool)
                .patch(spool::update_spool)
                .delete(spool::delete_spool),
        )
        .route("/spool/:id/use", put(spool::use_spool))
}
