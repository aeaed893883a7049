//! Request and response models for the spoolyard API.
//!
//! Every identifier is a [`spoolyard_ids::Id`], so responses carry ids as
//! strings at every nesting level: a `Spool` embeds its `Filament`, which
//! embeds its `Vendor`, and each of the three renders its own `id`.

pub mod filament;
pub mod patch;
pub mod spool;
pub mod vendor;

pub use filament::{Filament, FilamentCreate, FilamentUpdate};
pub use spool::{Spool, SpoolCreate, SpoolUpdate, SpoolUse};
pub use vendor::{Vendor, VendorCreate, VendorUpdate};

pub use spoolyard_ids::Id;
