//! Persistence layer
//!
//! `EntityStore` is the seam between services and storage. The PostgreSQL
//! implementation is used in deployments; the in-memory one backs tests and
//! throwaway instances.

pub mod memory;
pub mod postgres;
pub mod rowid;
pub mod traits;

pub use memory::MemoryStore;
pub use postgres::{create_pool, PostgresStore};
pub use traits::EntityStore;
