//! Spool service
//!
//! Spools embed their filament, which embeds its vendor. Remaining weight and
//! the length figures are derived on every read and never stored.

use chrono::Utc;
use spoolyard_ids::Id;
use std::{collections::HashMap, f64::consts::PI, sync::Arc};

use crate::{
    db::EntityStore,
    models::{
        patch, Filament, NewSpool, Spool, SpoolCreate, SpoolFilter, SpoolRecord, SpoolUpdate,
        SpoolUse,
    },
    services::{
        filament::embed_vendors,
        validation::{max_len, non_negative, MAX_COMMENT_LEN, MAX_NAME_LEN},
    },
    Error, Result,
};

pub struct SpoolService {
    store: Arc<dyn EntityStore>,
}

impl SpoolService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, input: SpoolCreate) -> Result<Spool> {
        let new = NewSpool {
            filament_id: input.filament_id,
            first_used: input.first_used,
            last_used: input.last_used,
            price: input.price,
            initial_weight: input.initial_weight,
            spool_weight: input.spool_weight,
            used_weight: input.used_weight.unwrap_or(0.0),
            location: input.location,
            lot_nr: input.lot_nr,
            comment: input.comment,
            archived: input.archived,
        };
        validate(
            new.price,
            new.initial_weight,
            new.spool_weight,
            new.used_weight,
            new.location.as_deref(),
            new.lot_nr.as_deref(),
            new.comment.as_deref(),
        )?;

        let filament = self.filament(new.filament_id).await?;
        let record = self.store.insert_spool(new).await?;
        tracing::info!(spool_id = %record.id, filament_id = %filament.id, "Created spool");
        Ok(compose(record, filament))
    }

    pub async fn get(&self, id: Id) -> Result<Spool> {
        let record = self.get_record(id).await?;
        let filament = self.filament(record.filament_id).await?;
        Ok(compose(record, filament))
    }

    pub async fn list(&self, filter: &SpoolFilter) -> Result<Vec<Spool>> {
        let records = self.store.list_spools(filter).await?;

        let mut filament_ids: Vec<Id> = records.iter().map(|r| r.filament_id).collect();
        filament_ids.sort_unstable();
        filament_ids.dedup();

        let filament_records = self.store.get_filaments(&filament_ids).await?;
        let filaments: HashMap<Id, Filament> = embed_vendors(self.store.as_ref(), filament_records)
            .await?
            .into_iter()
            .map(|f| (f.id, f))
            .collect();

        records
            .into_iter()
            .map(|record| {
                let filament = filaments.get(&record.filament_id).cloned().ok_or_else(|| {
                    Error::Internal(format!(
                        "spool {} references missing filament {}",
                        record.id, record.filament_id
                    ))
                })?;
                Ok(compose(record, filament))
            })
            .collect()
    }

    pub async fn update(&self, id: Id, changes: SpoolUpdate) -> Result<Spool> {
        let mut record = self.get_record(id).await?;

        if let Some(filament_id) = changes.filament_id {
            record.filament_id = filament_id;
        }
        if let Some(used_weight) = changes.used_weight {
            record.used_weight = used_weight;
        }
        if let Some(archived) = changes.archived {
            record.archived = archived;
        }
        patch::apply(&mut record.first_used, changes.first_used);
        patch::apply(&mut record.last_used, changes.last_used);
        patch::apply(&mut record.price, changes.price);
        patch::apply(&mut record.initial_weight, changes.initial_weight);
        patch::apply(&mut record.spool_weight, changes.spool_weight);
        patch::apply(&mut record.location, changes.location);
        patch::apply(&mut record.lot_nr, changes.lot_nr);
        patch::apply(&mut record.comment, changes.comment);

        validate(
            record.price,
            record.initial_weight,
            record.spool_weight,
            record.used_weight,
            record.location.as_deref(),
            record.lot_nr.as_deref(),
            record.comment.as_deref(),
        )?;

        let filament = self.filament(record.filament_id).await?;
        self.save(&record).await?;
        tracing::info!(spool_id = %id, "Updated spool");
        Ok(compose(record, filament))
    }

    /// Consume filament from a spool, by weight (grams) or length (mm).
    ///
    /// Negative amounts put filament back. `used_weight` never drops below 0.
    pub async fn use_spool(&self, id: Id, usage: SpoolUse) -> Result<Spool> {
        let mut record = self.get_record(id).await?;
        let filament = self.filament(record.filament_id).await?;

        let weight = match (usage.use_weight, usage.use_length) {
            (Some(weight), None) => weight,
            (None, Some(length)) => weight_from_length(length, filament.diameter, filament.density),
            _ => {
                return Err(Error::Validation(
                    "exactly one of use_weight or use_length must be given".into(),
                ))
            }
        };
        if !weight.is_finite() {
            return Err(Error::Validation("usage must be a finite number".into()));
        }

        let now = Utc::now();
        record.used_weight = (record.used_weight + weight).max(0.0);
        record.first_used.get_or_insert(now);
        record.last_used = Some(now);

        self.save(&record).await?;
        tracing::info!(spool_id = %id, grams = weight, "Recorded spool usage");
        Ok(compose(record, filament))
    }

    pub async fn delete(&self, id: Id) -> Result<()> {
        if !self.store.delete_spool(id).await? {
            return Err(Error::not_found("spool", id));
        }
        tracing::info!(spool_id = %id, "Deleted spool");
        Ok(())
    }

    async fn get_record(&self, id: Id) -> Result<SpoolRecord> {
        self.store
            .get_spool(id)
            .await?
            .ok_or_else(|| Error::not_found("spool", id))
    }

    async fn save(&self, record: &SpoolRecord) -> Result<()> {
        if !self.store.update_spool(record).await? {
            return Err(Error::not_found("spool", record.id));
        }
        Ok(())
    }

    /// Fetch a referenced filament with its vendor embedded.
    async fn filament(&self, id: Id) -> Result<Filament> {
        let record = self.store.get_filament(id).await?.ok_or_else(|| {
            Error::ReferentialViolation(format!("filament {id} does not exist"))
        })?;
        let mut embedded = embed_vendors(self.store.as_ref(), vec![record]).await?;
        embedded
            .pop()
            .ok_or_else(|| Error::Internal("filament vanished while embedding".into()))
    }
}

#[allow(clippy::too_many_arguments)]
fn validate(
    price: Option<f64>,
    initial_weight: Option<f64>,
    spool_weight: Option<f64>,
    used_weight: f64,
    location: Option<&str>,
    lot_nr: Option<&str>,
    comment: Option<&str>,
) -> Result<()> {
    non_negative("price", price)?;
    non_negative("initial_weight", initial_weight)?;
    non_negative("spool_weight", spool_weight)?;
    non_negative("used_weight", Some(used_weight))?;
    max_len("location", location, MAX_NAME_LEN)?;
    max_len("lot_nr", lot_nr, MAX_NAME_LEN)?;
    max_len("comment", comment, MAX_COMMENT_LEN)
}

/// Cross-section area in mm².
fn cross_section(diameter_mm: f64) -> f64 {
    PI * (diameter_mm / 2.0).powi(2)
}

/// Length in mm of `weight` grams of filament.
pub(crate) fn length_from_weight(weight: f64, diameter_mm: f64, density: f64) -> f64 {
    // g / (g/cm³) = cm³; x1000 for mm³.
    weight / density * 1000.0 / cross_section(diameter_mm)
}

/// Weight in grams of `length` mm of filament.
pub(crate) fn weight_from_length(length_mm: f64, diameter_mm: f64, density: f64) -> f64 {
    length_mm * cross_section(diameter_mm) / 1000.0 * density
}

/// Build the response model, filling in derived fields.
fn compose(record: SpoolRecord, filament: Filament) -> Spool {
    let remaining_weight = record
        .initial_weight
        .or(filament.weight)
        .map(|initial| (initial - record.used_weight).max(0.0));
    let used_length = length_from_weight(record.used_weight, filament.diameter, filament.density);
    let remaining_length =
        remaining_weight.map(|w| length_from_weight(w, filament.diameter, filament.density));

    Spool {
        id: record.id,
        registered: record.registered,
        first_used: record.first_used,
        last_used: record.last_used,
        filament,
        price: record.price,
        initial_weight: record.initial_weight,
        spool_weight: record.spool_weight,
        remaining_weight,
        used_weight: record.used_weight,
        remaining_length,
        used_length,
        location: record.location,
        lot_nr: record.lot_nr,
        comment: record.comment,
        archived: record.archived,
    }
}
