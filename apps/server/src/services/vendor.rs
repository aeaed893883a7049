//! Vendor service

use spoolyard_ids::Id;
use std::sync::Arc;

use crate::{
    db::EntityStore,
    models::{patch, Vendor, VendorCreate, VendorFilter, VendorUpdate},
    services::validation::{
        max_len, non_negative, require_name, MAX_COMMENT_LEN, MAX_EXTERNAL_ID_LEN,
    },
    Error, Result,
};

/// How many referencing ids to list in a delete conflict message.
const REFERENCE_SAMPLE: usize = 5;

pub struct VendorService {
    store: Arc<dyn EntityStore>,
}

impl VendorService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, input: VendorCreate) -> Result<Vendor> {
        validate(
            &input.name,
            input.comment.as_deref(),
            input.external_id.as_deref(),
            input.empty_spool_weight,
        )?;

        let vendor = self.store.insert_vendor(input).await?;
        tracing::info!(vendor_id = %vendor.id, name = %vendor.name, "Created vendor");
        Ok(vendor)
    }

    pub async fn get(&self, id: Id) -> Result<Vendor> {
        self.store
            .get_vendor(id)
            .await?
            .ok_or_else(|| Error::not_found("vendor", id))
    }

    pub async fn list(&self, filter: &VendorFilter) -> Result<Vec<Vendor>> {
        self.store.list_vendors(filter).await
    }

    pub async fn update(&self, id: Id, changes: VendorUpdate) -> Result<Vendor> {
        let mut vendor = self.get(id).await?;

        if let Some(name) = changes.name {
            vendor.name = name;
        }
        patch::apply(&mut vendor.comment, changes.comment);
        patch::apply(&mut vendor.empty_spool_weight, changes.empty_spool_weight);
        patch::apply(&mut vendor.external_id, changes.external_id);

        validate(
            &vendor.name,
            vendor.comment.as_deref(),
            vendor.external_id.as_deref(),
            vendor.empty_spool_weight,
        )?;

        if !self.store.update_vendor(&vendor).await? {
            return Err(Error::not_found("vendor", id));
        }
        tracing::info!(vendor_id = %id, "Updated vendor");
        Ok(vendor)
    }

    /// Delete a vendor. Fails with a conflict while filaments still reference it.
    pub async fn delete(&self, id: Id) -> Result<()> {
        let referencing = self
            .store
            .filaments_referencing_vendor(id, REFERENCE_SAMPLE)
            .await?;
        if !referencing.is_empty() {
            return Err(Error::ReferentialViolation(format!(
                "vendor {id} is referenced by filament(s) {}",
                join_ids(&referencing)
            )));
        }

        if !self.store.delete_vendor(id).await? {
            return Err(Error::not_found("vendor", id));
        }
        tracing::info!(vendor_id = %id, "Deleted vendor");
        Ok(())
    }
}

fn validate(
    name: &str,
    comment: Option<&str>,
    external_id: Option<&str>,
    empty_spool_weight: Option<f64>,
) -> Result<()> {
    require_name("name", name)?;
    max_len("comment", comment, MAX_COMMENT_LEN)?;
    max_len("external_id", external_id, MAX_EXTERNAL_ID_LEN)?;
    non_negative("empty_spool_weight", empty_spool_weight)
}

pub(crate) fn join_ids(ids: &[Id]) -> String {
    ids.iter()
        .map(Id::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
