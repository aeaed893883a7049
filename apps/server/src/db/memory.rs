//! In-memory `EntityStore` implementation.
//!
//! All tables sit behind one lock so reference checks and writes observe a
//! consistent snapshot. `BTreeMap` keeps list results ordered by id.

use async_trait::async_trait;
use chrono::Utc;
use spoolyard_ids::Id;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::{
    db::{rowid::RowIdGenerator, traits::EntityStore},
    models::{
        text_matches, FilamentFilter, FilamentRecord, NewFilament, NewSpool, NewVendor,
        SpoolFilter, SpoolRecord, VendorFilter, VendorRecord,
    },
    Error, Result,
};

#[derive(Default)]
struct Tables {
    vendors: BTreeMap<Id, VendorRecord>,
    filaments: BTreeMap<Id, FilamentRecord>,
    spools: BTreeMap<Id, SpoolRecord>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    ids: RowIdGenerator,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn id_in(ids: &Option<Vec<Id>>, id: Id) -> bool {
    ids.as_ref().map_or(true, |ids| ids.contains(&id))
}

fn missing_reference(entity: &str, id: Id) -> Error {
    Error::ReferentialViolation(format!("{entity} {id} does not exist"))
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn insert_vendor(&self, vendor: NewVendor) -> Result<VendorRecord> {
        let record = VendorRecord {
            id: self.ids.next_id()?,
            registered: Utc::now(),
            name: vendor.name,
            comment: vendor.comment,
            empty_spool_weight: vendor.empty_spool_weight,
            external_id: vendor.external_id,
        };

        let mut tables = self.tables.write().await;
        tables.vendors.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_vendor(&self, id: Id) -> Result<Option<VendorRecord>> {
        Ok(self.tables.read().await.vendors.get(&id).cloned())
    }

    async fn get_vendors(&self, ids: &[Id]) -> Result<Vec<VendorRecord>> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.vendors.get(id).cloned())
            .collect())
    }

    async fn list_vendors(&self, filter: &VendorFilter) -> Result<Vec<VendorRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .vendors
            .values()
            .filter(|v| text_matches(Some(v.name.as_str()), filter.name.as_deref()))
            .filter(|v| {
                filter
                    .external_id
                    .as_ref()
                    .map_or(true, |ext| v.external_id.as_ref() == Some(ext))
            })
            .cloned()
            .collect())
    }

    async fn update_vendor(&self, vendor: &VendorRecord) -> Result<bool> {
        let mut tables = self.tables.write().await;
        match tables.vendors.get_mut(&vendor.id) {
            Some(existing) => {
                *existing = vendor.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_vendor(&self, id: Id) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if tables.filaments.values().any(|f| f.vendor_id == id) {
            return Err(Error::ReferentialViolation(format!(
                "vendor {id} is still referenced by filaments"
            )));
        }
        Ok(tables.vendors.remove(&id).is_some())
    }

    async fn filaments_referencing_vendor(&self, vendor_id: Id, limit: usize) -> Result<Vec<Id>> {
        let tables = self.tables.read().await;
        Ok(tables
            .filaments
            .values()
            .filter(|f| f.vendor_id == vendor_id)
            .map(|f| f.id)
            .take(limit)
            .collect())
    }

    async fn insert_filament(&self, filament: NewFilament) -> Result<FilamentRecord> {
        let mut tables = self.tables.write().await;
        if !tables.vendors.contains_key(&filament.vendor_id) {
            return Err(missing_reference("vendor", filament.vendor_id));
        }

        let record = FilamentRecord {
            id: self.ids.next_id()?,
            registered: Utc::now(),
            vendor_id: filament.vendor_id,
            name: filament.name,
            material: filament.material,
            price: filament.price,
            density: filament.density,
            diameter: filament.diameter,
            weight: filament.weight,
            spool_weight: filament.spool_weight,
            article_number: filament.article_number,
            comment: filament.comment,
            settings_extruder_temp: filament.settings_extruder_temp,
            settings_bed_temp: filament.settings_bed_temp,
            color_hex: filament.color_hex,
            external_id: filament.external_id,
        };
        tables.filaments.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_filament(&self, id: Id) -> Result<Option<FilamentRecord>> {
        Ok(self.tables.read().await.filaments.get(&id).cloned())
    }

    async fn get_filaments(&self, ids: &[Id]) -> Result<Vec<FilamentRecord>> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.filaments.get(id).cloned())
            .collect())
    }

    async fn list_filaments(&self, filter: &FilamentFilter) -> Result<Vec<FilamentRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .filaments
            .values()
            .filter(|f| id_in(&filter.vendor_ids, f.vendor_id))
            .filter(|f| text_matches(f.name.as_deref(), filter.name.as_deref()))
            .filter(|f| text_matches(f.material.as_deref(), filter.material.as_deref()))
            .cloned()
            .collect())
    }

    async fn update_filament(&self, filament: &FilamentRecord) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if !tables.vendors.contains_key(&filament.vendor_id) {
            return Err(missing_reference("vendor", filament.vendor_id));
        }
        match tables.filaments.get_mut(&filament.id) {
            Some(existing) => {
                *existing = filament.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_filament(&self, id: Id) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if tables.spools.values().any(|s| s.filament_id == id) {
            return Err(Error::ReferentialViolation(format!(
                "filament {id} is still referenced by spools"
            )));
        }
        Ok(tables.filaments.remove(&id).is_some())
    }

    async fn spools_referencing_filament(
        &self,
        filament_id: Id,
        limit: usize,
    ) -> Result<Vec<Id>> {
        let tables = self.tables.read().await;
        Ok(tables
            .spools
            .values()
            .filter(|s| s.filament_id == filament_id)
            .map(|s| s.id)
            .take(limit)
            .collect())
    }

    async fn insert_spool(&self, spool: NewSpool) -> Result<SpoolRecord> {
        let mut tables = self.tables.write().await;
        if !tables.filaments.contains_key(&spool.filament_id) {
            return Err(missing_reference("filament", spool.filament_id));
        }

        let record = SpoolRecord {
            id: self.ids.next_id()?,
            registered: Utc::now(),
            filament_id: spool.filament_id,
            first_used: spool.first_used,
            last_used: spool.last_used,
            price: spool.price,
            initial_weight: spool.initial_weight,
            spool_weight: spool.spool_weight,
            used_weight: spool.used_weight,
            location: spool.location,
            lot_nr: spool.lot_nr,
            comment: spool.comment,
            archived: spool.archived,
        };
        tables.spools.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_spool(&self, id: Id) -> Result<Option<SpoolRecord>> {
        Ok(self.tables.read().await.spools.get(&id).cloned())
    }

    async fn list_spools(&self, filter: &SpoolFilter) -> Result<Vec<SpoolRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .spools
            .values()
            .filter(|s| filter.allow_archived || !s.archived)
            .filter(|s| id_in(&filter.filament_ids, s.filament_id))
            .filter(|s| match &filter.vendor_ids {
                None => true,
                Some(vendor_ids) => tables
                    .filaments
                    .get(&s.filament_id)
                    .is_some_and(|f| vendor_ids.contains(&f.vendor_id)),
            })
            .filter(|s| text_matches(s.location.as_deref(), filter.location.as_deref()))
            .cloned()
            .collect())
    }

    async fn update_spool(&self, spool: &SpoolRecord) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if !tables.filaments.contains_key(&spool.filament_id) {
            return Err(missing_reference("filament", spool.filament_id));
        }
        match tables.spools.get_mut(&spool.id) {
            Some(existing) => {
                *existing = spool.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_spool(&self, id: Id) -> Result<bool> {
        Ok(self.tables.write().await.spools.remove(&id).is_some())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
