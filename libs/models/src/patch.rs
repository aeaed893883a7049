//! Partial-update helpers.
//!
//! PATCH bodies distinguish three states per nullable field: absent (leave
//! unchanged), `null` (clear) and a value (set). That maps onto
//! `Option<Option<T>>` with `#[serde(default, deserialize_with = "nullable")]`.

use serde::{Deserialize, Deserializer};

pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Apply a tri-state patch value to a nullable field.
pub fn apply<T>(field: &mut Option<T>, patch: Option<Option<T>>) {
    if let Some(value) = patch {
        *field = value;
    }
}
