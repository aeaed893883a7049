//! Store trait definition

use crate::{
    models::{
        FilamentFilter, FilamentRecord, NewFilament, NewSpool, NewVendor, SpoolFilter,
        SpoolRecord, VendorFilter, VendorRecord,
    },
    Result,
};
use async_trait::async_trait;
use spoolyard_ids::Id;

/// Abstract interface for entity persistence.
///
/// Ids are assigned by the store on insert. Lists are ordered by id. Updates
/// replace the whole record and report whether a row matched; deletes report
/// whether a row was removed.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn insert_vendor(&self, vendor: NewVendor) -> Result<VendorRecord>;

    async fn get_vendor(&self, id: Id) -> Result<Option<VendorRecord>>;

    /// Fetch several vendors at once. Missing ids are skipped.
    async fn get_vendors(&self, ids: &[Id]) -> Result<Vec<VendorRecord>>;

    async fn list_vendors(&self, filter: &VendorFilter) -> Result<Vec<VendorRecord>>;

    async fn update_vendor(&self, vendor: &VendorRecord) -> Result<bool>;

    async fn delete_vendor(&self, id: Id) -> Result<bool>;

    /// Ids of filaments referencing a vendor, at most `limit`.
    async fn filaments_referencing_vendor(&self, vendor_id: Id, limit: usize) -> Result<Vec<Id>>;

    async fn insert_filament(&self, filament: NewFilament) -> Result<FilamentRecord>;

    async fn get_filament(&self, id: Id) -> Result<Option<FilamentRecord>>;

    async fn get_filaments(&self, ids: &[Id]) -> Result<Vec<FilamentRecord>>;

    async fn list_filaments(&self, filter: &FilamentFilter) -> Result<Vec<FilamentRecord>>;

    async fn update_filament(&self, filament: &FilamentRecord) -> Result<bool>;

    async fn delete_filament(&self, id: Id) -> Result<bool>;

    /// Ids of spools referencing a filament, at most `limit`.
    async fn spools_referencing_filament(&self, filament_id: Id, limit: usize)
        -> Result<Vec<Id>>;

    async fn insert_spool(&self, spool: NewSpool) -> Result<SpoolRecord>;

    async fn get_spool(&self, id: Id) -> Result<Option<SpoolRecord>>;

    async fn list_spools(&self, filter: &SpoolFilter) -> Result<Vec<SpoolRecord>>;

    async fn update_spool(&self, spool: &SpoolRecord) -> Result<bool>;

    async fn delete_spool(&self, id: Id) -> Result<bool>;

    /// Health check
    async fn ping(&self) -> Result<()>;
}
