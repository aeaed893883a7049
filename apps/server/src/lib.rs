//! Spoolyard server library
//!
//! REST API for vendors, filaments and spools. Storage identifiers are 64-bit
//! integers and always cross the HTTP boundary in their lossless string form
//! (see `spoolyard_ids`).

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;

pub use error::{Error, Result};
