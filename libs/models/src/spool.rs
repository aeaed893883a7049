use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spoolyard_ids::Id;

use crate::filament::Filament;
use crate::patch::nullable;

/// A physical spool. Embeds its filament, which embeds its vendor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spool {
    pub id: Id,
    pub registered: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_used: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
    pub filament: Filament,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spool_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_weight: Option<f64>,
    pub used_weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_length: Option<f64>,
    pub used_length: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lot_nr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub archived: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpoolCreate {
    pub filament_id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_used: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spool_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lot_nr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default)]
    pub archived: bool,
}

impl SpoolCreate {
    pub fn new(filament_id: Id) -> Self {
        Self {
            filament_id,
            first_used: None,
            last_used: None,
            price: None,
            initial_weight: None,
            spool_weight: None,
            used_weight: None,
            location: None,
            lot_nr: None,
            comment: None,
            archived: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpoolUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filament_id: Option<Id>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub first_used: Option<Option<DateTime<Utc>>>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_used: Option<Option<DateTime<Utc>>>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<Option<f64>>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub initial_weight: Option<Option<f64>>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub spool_weight: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_weight: Option<f64>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub location: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub lot_nr: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub comment: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

/// Body of `PUT /spool/{id}/use`. Exactly one of the two must be set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpoolUse {
    /// Grams consumed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_weight: Option<f64>,
    /// Millimetres consumed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_length: Option<f64>,
}
