//! Business logic layer
//!
//! Services validate input, enforce references between entities and compose
//! the embedded response models from store records.

pub mod filament;
pub mod spool;
pub(crate) mod validation;
pub mod vendor;

pub use filament::FilamentService;
pub use spool::SpoolService;
pub use vendor::VendorService;
