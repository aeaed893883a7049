//! Typed client for the Spoolyard REST API.
//!
//! Every response is checked with [`spoolyard_ids::verify_graph`] before it
//! is decoded, so a server that leaks a numeric identifier anywhere in a body
//! is reported as [`ClientError::Identifier`] rather than silently accepted.
//!
//! ```no_run
//! # async fn demo() -> Result<(), spoolyard_client::ClientError> {
//! use spoolyard_client::Client;
//! use spoolyard_models::VendorCreate;
//!
//! let client = Client::new("http://localhost:7912")?;
//! let vendor = client.create_vendor(&VendorCreate::new("Prusa")).await?;
//! client.delete_vendor(vendor.id).await?;
//! # Ok(())
//! # }
//! ```

mod client;
pub mod contract;
mod error;

pub use client::Client;
pub use error::ClientError;
