//! Storage-level records and list filters
//!
//! Records hold foreign keys (`vendor_id`, `filament_id`); the wire models in
//! `spoolyard_models` hold the embedded entities instead. Services turn the
//! former into the latter.

use chrono::{DateTime, Utc};
use spoolyard_ids::Id;

pub use spoolyard_models::{
    patch,
    Filament, FilamentCreate, FilamentUpdate, Spool, SpoolCreate, SpoolUpdate, SpoolUse, Vendor,
    VendorCreate, VendorUpdate,
};

/// Vendors have no outbound references, so the record is the wire model.
pub type VendorRecord = Vendor;

#[derive(Debug, Clone, PartialEq)]
pub struct FilamentRecord {
    pub id: Id,
    pub registered: DateTime<Utc>,
    pub vendor_id: Id,
    pub name: Option<String>,
    pub material: Option<String>,
    pub price: Option<f64>,
    pub density: f64,
    pub diameter: f64,
    pub weight: Option<f64>,
    pub spool_weight: Option<f64>,
    pub article_number: Option<String>,
    pub comment: Option<String>,
    pub settings_extruder_temp: Option<i32>,
    pub settings_bed_temp: Option<i32>,
    pub color_hex: Option<String>,
    pub external_id: Option<String>,
}

impl FilamentRecord {
    /// Embed the referenced vendor.
    pub fn into_filament(self, vendor: Vendor) -> Filament {
        debug_assert_eq!(self.vendor_id, vendor.id);
        Filament {
            id: self.id,
            registered: self.registered,
            name: self.name,
            vendor,
            material: self.material,
            price: self.price,
            density: self.density,
            diameter: self.diameter,
            weight: self.weight,
            spool_weight: self.spool_weight,
            article_number: self.article_number,
            comment: self.comment,
            settings_extruder_temp: self.settings_extruder_temp,
            settings_bed_temp: self.settings_bed_temp,
            color_hex: self.color_hex,
            external_id: self.external_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpoolRecord {
    pub id: Id,
    pub registered: DateTime<Utc>,
    pub filament_id: Id,
    pub first_used: Option<DateTime<Utc>>,
    pub last_used: Option<DateTime<Utc>>,
    pub price: Option<f64>,
    pub initial_weight: Option<f64>,
    pub spool_weight: Option<f64>,
    pub used_weight: f64,
    pub location: Option<String>,
    pub lot_nr: Option<String>,
    pub comment: Option<String>,
    pub archived: bool,
}

/// Field values for a new vendor; the store assigns `id` and `registered`.
pub type NewVendor = VendorCreate;

#[derive(Debug, Clone, PartialEq)]
pub struct NewFilament {
    pub vendor_id: Id,
    pub name: Option<String>,
    pub material: Option<String>,
    pub price: Option<f64>,
    pub density: f64,
    pub diameter: f64,
    pub weight: Option<f64>,
    pub spool_weight: Option<f64>,
    pub article_number: Option<String>,
    pub comment: Option<String>,
    pub settings_extruder_temp: Option<i32>,
    pub settings_bed_temp: Option<i32>,
    pub color_hex: Option<String>,
    pub external_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSpool {
    pub filament_id: Id,
    pub first_used: Option<DateTime<Utc>>,
    pub last_used: Option<DateTime<Utc>>,
    pub price: Option<f64>,
    pub initial_weight: Option<f64>,
    pub spool_weight: Option<f64>,
    pub used_weight: f64,
    pub location: Option<String>,
    pub lot_nr: Option<String>,
    pub comment: Option<String>,
    pub archived: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VendorFilter {
    pub name: Option<String>,
    pub external_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilamentFilter {
    pub vendor_ids: Option<Vec<Id>>,
    pub name: Option<String>,
    pub material: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpoolFilter {
    pub filament_ids: Option<Vec<Id>>,
    /// Matches spools whose filament belongs to one of these vendors.
    pub vendor_ids: Option<Vec<Id>>,
    pub location: Option<String>,
    pub allow_archived: bool,
}

/// Case-insensitive substring match used by the name-like filters.
pub fn text_matches(value: Option<&str>, needle: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(needle) => value
            .map(|v| v.to_lowercase().contains(&needle.to_lowercase()))
            .unwrap_or(false),
    }
}
