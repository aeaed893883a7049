//! Filament service
//!
//! Filaments are stored with a `vendor_id` and returned with the full vendor
//! embedded. Lists fetch all referenced vendors in one store call.

use spoolyard_ids::Id;
use std::{collections::HashMap, sync::Arc};

use crate::{
    db::EntityStore,
    models::{
        patch, Filament, FilamentCreate, FilamentFilter, FilamentRecord, FilamentUpdate,
        NewFilament,
    },
    services::{
        validation::{
            max_len, non_negative, non_negative_int, normalize_color_hex, positive,
            MAX_COMMENT_LEN, MAX_EXTERNAL_ID_LEN, MAX_NAME_LEN,
        },
        vendor::join_ids,
    },
    Error, Result,
};

const REFERENCE_SAMPLE: usize = 5;

pub struct FilamentService {
    store: Arc<dyn EntityStore>,
}

impl FilamentService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, input: FilamentCreate) -> Result<Filament> {
        let new = NewFilament {
            vendor_id: input.vendor_id,
            name: input.name,
            material: input.material,
            price: input.price,
            density: input.density,
            diameter: input.diameter,
            weight: input.weight,
            spool_weight: input.spool_weight,
            article_number: input.article_number,
            comment: input.comment,
            settings_extruder_temp: input.settings_extruder_temp,
            settings_bed_temp: input.settings_bed_temp,
            color_hex: normalize_color_hex(input.color_hex)?,
            external_id: input.external_id,
        };
        validate(&FieldsRef::from(&new))?;

        let vendor = self
            .store
            .get_vendor(new.vendor_id)
            .await?
            .ok_or_else(|| missing_vendor(new.vendor_id))?;

        let record = self.store.insert_filament(new).await?;
        tracing::info!(filament_id = %record.id, vendor_id = %vendor.id, "Created filament");
        Ok(record.into_filament(vendor))
    }

    pub async fn get(&self, id: Id) -> Result<Filament> {
        let record = self.get_record(id).await?;
        self.embed_one(record).await
    }

    pub async fn list(&self, filter: &FilamentFilter) -> Result<Vec<Filament>> {
        let records = self.store.list_filaments(filter).await?;
        embed_vendors(self.store.as_ref(), records).await
    }

    pub async fn update(&self, id: Id, changes: FilamentUpdate) -> Result<Filament> {
        let mut record = self.get_record(id).await?;

        if let Some(vendor_id) = changes.vendor_id {
            record.vendor_id = vendor_id;
        }
        if let Some(density) = changes.density {
            record.density = density;
        }
        if let Some(diameter) = changes.diameter {
            record.diameter = diameter;
        }
        patch::apply(&mut record.name, changes.name);
        patch::apply(&mut record.material, changes.material);
        patch::apply(&mut record.price, changes.price);
        patch::apply(&mut record.weight, changes.weight);
        patch::apply(&mut record.spool_weight, changes.spool_weight);
        patch::apply(&mut record.article_number, changes.article_number);
        patch::apply(&mut record.comment, changes.comment);
        patch::apply(&mut record.settings_extruder_temp, changes.settings_extruder_temp);
        patch::apply(&mut record.settings_bed_temp, changes.settings_bed_temp);
        patch::apply(&mut record.external_id, changes.external_id);
        if let Some(color_hex) = changes.color_hex {
            record.color_hex = normalize_color_hex(color_hex)?;
        }

        validate(&FieldsRef::from(&record))?;

        let vendor = self
            .store
            .get_vendor(record.vendor_id)
            .await?
            .ok_or_else(|| missing_vendor(record.vendor_id))?;

        if !self.store.update_filament(&record).await? {
            return Err(Error::not_found("filament", id));
        }
        tracing::info!(filament_id = %id, "Updated filament");
        Ok(record.into_filament(vendor))
    }

    /// Delete a filament. Fails with a conflict while spools still reference it.
    pub async fn delete(&self, id: Id) -> Result<()> {
        let referencing = self
            .store
            .spools_referencing_filament(id, REFERENCE_SAMPLE)
            .await?;
        if !referencing.is_empty() {
            return Err(Error::ReferentialViolation(format!(
                "filament {id} is referenced by spool(s) {}",
                join_ids(&referencing)
            )));
        }

        if !self.store.delete_filament(id).await? {
            return Err(Error::not_found("filament", id));
        }
        tracing::info!(filament_id = %id, "Deleted filament");
        Ok(())
    }

    async fn get_record(&self, id: Id) -> Result<FilamentRecord> {
        self.store
            .get_filament(id)
            .await?
            .ok_or_else(|| Error::not_found("filament", id))
    }

    async fn embed_one(&self, record: FilamentRecord) -> Result<Filament> {
        let mut embedded = embed_vendors(self.store.as_ref(), vec![record]).await?;
        embedded
            .pop()
            .ok_or_else(|| Error::Internal("filament vanished while embedding".into()))
    }
}

/// Replace each record's `vendor_id` with the vendor it points at.
pub(crate) async fn embed_vendors(
    store: &dyn EntityStore,
    records: Vec<FilamentRecord>,
) -> Result<Vec<Filament>> {
    let mut vendor_ids: Vec<Id> = records.iter().map(|r| r.vendor_id).collect();
    vendor_ids.sort_unstable();
    vendor_ids.dedup();

    let vendors: HashMap<Id, _> = store
        .get_vendors(&vendor_ids)
        .await?
        .into_iter()
        .map(|v| (v.id, v))
        .collect();

    records
        .into_iter()
        .map(|record| {
            let vendor = vendors.get(&record.vendor_id).cloned().ok_or_else(|| {
                Error::Internal(format!(
                    "filament {} references missing vendor {}",
                    record.id, record.vendor_id
                ))
            })?;
            Ok(record.into_filament(vendor))
        })
        .collect()
}

fn missing_vendor(id: Id) -> Error {
    Error::ReferentialViolation(format!("vendor {id} does not exist"))
}

/// Borrowed view over the validated fields of a new or existing filament.
struct FieldsRef<'a> {
    name: Option<&'a str>,
    material: Option<&'a str>,
    article_number: Option<&'a str>,
    comment: Option<&'a str>,
    external_id: Option<&'a str>,
    density: f64,
    diameter: f64,
    price: Option<f64>,
    weight: Option<f64>,
    spool_weight: Option<f64>,
    settings_extruder_temp: Option<i32>,
    settings_bed_temp: Option<i32>,
}

macro_rules! fields_ref_from {
    ($ty:ty) => {
        impl<'a> From<&'a $ty> for FieldsRef<'a> {
            fn from(f: &'a $ty) -> Self {
                FieldsRef {
                    name: f.name.as_deref(),
                    material: f.material.as_deref(),
                    article_number: f.article_number.as_deref(),
                    comment: f.comment.as_deref(),
                    external_id: f.external_id.as_deref(),
                    density: f.density,
                    diameter: f.diameter,
                    price: f.price,
                    weight: f.weight,
                    spool_weight: f.spool_weight,
                    settings_extruder_temp: f.settings_extruder_temp,
                    settings_bed_temp: f.settings_bed_temp,
                }
            }
        }
    };
}

fields_ref_from!(NewFilament);
fields_ref_from!(FilamentRecord);

fn validate(f: &FieldsRef<'_>) -> Result<()> {
    max_len("name", f.name, MAX_NAME_LEN)?;
    max_len("material", f.material, MAX_NAME_LEN)?;
    max_len("article_number", f.article_number, MAX_NAME_LEN)?;
    max_len("comment", f.comment, MAX_COMMENT_LEN)?;
    max_len("external_id", f.external_id, MAX_EXTERNAL_ID_LEN)?;
    positive("density", f.density)?;
    positive("diameter", f.diameter)?;
    if let Some(weight) = f.weight {
        positive("weight", weight)?;
    }
    non_negative("price", f.price)?;
    non_negative("spool_weight", f.spool_weight)?;
    non_negative_int("settings_extruder_temp", f.settings_extruder_temp)?;
    non_negative_int("settings_bed_temp", f.settings_bed_temp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::MemoryStore, models::VendorCreate, services::VendorService};

    fn services() -> (VendorService, FilamentService) {
        let store: Arc<dyn EntityStore> = Arc::new(MemoryStore::new());
        (
            VendorService::new(store.clone()),
            FilamentService::new(store),
        )
    }

    #[tokio::test]
    async fn create_embeds_vendor() {
        let (vendors, filaments) = services();
        let vendor = vendors.create(VendorCreate::new("Prusa")).await.unwrap();

        let filament = filaments
            .create(FilamentCreate::new(vendor.id, 1.24, 1.75))
            .await
            .unwrap();

        assert_eq!(filament.vendor, vendor);
        assert_eq!(filaments.get(filament.id).await.unwrap(), filament);
    }

    #[tokio::test]
    async fn create_with_unknown_vendor_conflicts() {
        let (_, filaments) = services();
        let err = filaments
            .create(FilamentCreate::new(Id::new(77).unwrap(), 1.24, 1.75))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ReferentialViolation(_)));
    }

    #[tokio::test]
    async fn create_validates_density_and_color() {
        let (vendors, filaments) = services();
        let vendor = vendors.create(VendorCreate::new("Prusa")).await.unwrap();

        let err = filaments
            .create(FilamentCreate::new(vendor.id, 0.0, 1.75))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let mut input = FilamentCreate::new(vendor.id, 1.24, 1.75);
        input.color_hex = Some("#1a2b3c".into());
        let filament = filaments.create(input).await.unwrap();
        assert_eq!(filament.color_hex.as_deref(), Some("1A2B3C"));
    }

    #[tokio::test]
    async fn update_can_move_filament_to_another_vendor() {
        let (vendors, filaments) = services();
        let first = vendors.create(VendorCreate::new("A")).await.unwrap();
        let second = vendors.create(VendorCreate::new("B")).await.unwrap();
        let filament = filaments
            .create(FilamentCreate::new(first.id, 1.24, 1.75))
            .await
            .unwrap();

        let changes = FilamentUpdate {
            vendor_id: Some(second.id),
            ..Default::default()
        };
        let updated = filaments.update(filament.id, changes).await.unwrap();
        assert_eq!(updated.vendor.id, second.id);

        // The first vendor is no longer referenced.
        vendors.delete(first.id).await.unwrap();
        let err = vendors.delete(second.id).await.unwrap_err();
        assert!(matches!(err, Error::ReferentialViolation(_)));
    }
}
