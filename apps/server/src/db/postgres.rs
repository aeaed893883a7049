//! PostgreSQL-backed `EntityStore` implementation
//!
//! Also runs against CockroachDB, where `BIGSERIAL` keys come from
//! `unique_rowid()` and routinely exceed 2^53.

use async_trait::async_trait;
use spoolyard_ids::Id;
use sqlx::{postgres::PgRow, PgPool, Row};

use crate::{
    config::DatabaseConfig,
    db::traits::EntityStore,
    models::{
        FilamentFilter, FilamentRecord, NewFilament, NewSpool, NewVendor, SpoolFilter,
        SpoolRecord, VendorFilter, VendorRecord,
    },
    Error, Result,
};

const VENDOR_COLUMNS: &str = "id, registered, name, comment, empty_spool_weight, external_id";

const FILAMENT_COLUMNS: &str = "id, registered, vendor_id, name, material, price, density, \
     diameter, weight, spool_weight, article_number, comment, settings_extruder_temp, \
     settings_bed_temp, color_hex, external_id";

const SPOOL_COLUMNS: &str = "id, registered, filament_id, first_used, last_used, price, \
     initial_weight, spool_weight, used_weight, location, lot_nr, comment, archived";

/// PostgreSQL-backed EntityStore implementation
#[derive(Clone)]
pub struct PostgresStore {
    pub(crate) pool: PgPool,
}

/// Create the connection pool with per-connection statement and lock timeouts.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    tracing::info!("Creating database connection pool...");

    let statement_timeout = config.statement_timeout_seconds;
    let lock_timeout = config.lock_timeout_seconds;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .min_connections(config.pool_min_size)
        .max_connections(config.pool_max_size)
        .acquire_timeout(std::time::Duration::from_secs(config.pool_timeout_seconds))
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                sqlx::query(&format!("SET statement_timeout = '{}s'", statement_timeout))
                    .execute(&mut *conn)
                    .await?;
                sqlx::query(&format!("SET lock_timeout = '{}s'", lock_timeout))
                    .execute(&mut *conn)
                    .await?;
                Ok(())
            })
        })
        .connect(&config.url)
        .await
        .map_err(Error::Database)?;

    tracing::info!(
        "Database pool created (min: {}, max: {})",
        config.pool_min_size,
        config.pool_max_size
    );

    Ok(pool)
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn row_id(row: &PgRow, column: &str) -> Result<Id> {
    let raw: i64 = row.try_get(column)?;
    Id::new(raw).map_err(|e| Error::Internal(format!("Corrupt {column} in database: {e}")))
}

fn raw_ids(ids: &[Id]) -> Vec<i64> {
    ids.iter().map(|id| id.get()).collect()
}

/// Foreign-key failures surface as client errors, not 500s.
fn map_write_error(e: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_foreign_key_violation() {
            return Error::ReferentialViolation(db_err.message().to_string());
        }
    }
    Error::Database(e)
}

/// Substring pattern for `ILIKE .. ESCAPE '\'`. Wildcards in the needle match literally.
fn like_pattern(needle: &Option<String>) -> Option<String> {
    needle.as_ref().map(|n| {
        let mut pattern = String::with_capacity(n.len() + 2);
        pattern.push('%');
        for c in n.chars() {
            if matches!(c, '\\' | '%' | '_') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        pattern
    })
}

fn vendor_from_row(row: &PgRow) -> Result<VendorRecord> {
    Ok(VendorRecord {
        id: row_id(row, "id")?,
        registered: row.try_get("registered")?,
        name: row.try_get("name")?,
        comment: row.try_get("comment")?,
        empty_spool_weight: row.try_get("empty_spool_weight")?,
        external_id: row.try_get("external_id")?,
    })
}

fn filament_from_row(row: &PgRow) -> Result<FilamentRecord> {
    Ok(FilamentRecord {
        id: row_id(row, "id")?,
        registered: row.try_get("registered")?,
        vendor_id: row_id(row, "vendor_id")?,
        name: row.try_get("name")?,
        material: row.try_get("material")?,
        price: row.try_get("price")?,
        density: row.try_get("density")?,
        diameter: row.try_get("diameter")?,
        weight: row.try_get("weight")?,
        spool_weight: row.try_get("spool_weight")?,
        article_number: row.try_get("article_number")?,
        comment: row.try_get("comment")?,
        settings_extruder_temp: row.try_get("settings_extruder_temp")?,
        settings_bed_temp: row.try_get("settings_bed_temp")?,
        color_hex: row.try_get("color_hex")?,
        external_id: row.try_get("external_id")?,
    })
}

fn spool_from_row(row: &PgRow) -> Result<SpoolRecord> {
    Ok(SpoolRecord {
        id: row_id(row, "id")?,
        registered: row.try_get("registered")?,
        filament_id: row_id(row, "filament_id")?,
        first_used: row.try_get("first_used")?,
        last_used: row.try_get("last_used")?,
        price: row.try_get("price")?,
        initial_weight: row.try_get("initial_weight")?,
        spool_weight: row.try_get("spool_weight")?,
        used_weight: row.try_get("used_weight")?,
        location: row.try_get("location")?,
        lot_nr: row.try_get("lot_nr")?,
        comment: row.try_get("comment")?,
        archived: row.try_get("archived")?,
    })
}

#[async_trait]
impl EntityStore for PostgresStore {
    async fn insert_vendor(&self, vendor: NewVendor) -> Result<VendorRecord> {
        let sql = format!(
            "INSERT INTO vendor (name, comment, empty_spool_weight, external_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {VENDOR_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(&vendor.name)
            .bind(&vendor.comment)
            .bind(vendor.empty_spool_weight)
            .bind(&vendor.external_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)?;
        vendor_from_row(&row)
    }

    async fn get_vendor(&self, id: Id) -> Result<Option<VendorRecord>> {
        let sql = format!("SELECT {VENDOR_COLUMNS} FROM vendor WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(vendor_from_row).transpose()
    }

    async fn get_vendors(&self, ids: &[Id]) -> Result<Vec<VendorRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {VENDOR_COLUMNS} FROM vendor WHERE id = ANY($1) ORDER BY id");
        let rows = sqlx::query(&sql)
            .bind(raw_ids(ids))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(vendor_from_row).collect()
    }

    async fn list_vendors(&self, filter: &VendorFilter) -> Result<Vec<VendorRecord>> {
        let sql = format!(
            "SELECT {VENDOR_COLUMNS} FROM vendor
             WHERE ($1::TEXT IS NULL OR name ILIKE $1 ESCAPE '\\')
               AND ($2::TEXT IS NULL OR external_id = $2)
             ORDER BY id"
        );
        let rows = sqlx::query(&sql)
            .bind(like_pattern(&filter.name))
            .bind(&filter.external_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(vendor_from_row).collect()
    }

    async fn update_vendor(&self, vendor: &VendorRecord) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE vendor
             SET name = $2, comment = $3, empty_spool_weight = $4, external_id = $5
             WHERE id = $1",
        )
        .bind(vendor.id.get())
        .bind(&vendor.name)
        .bind(&vendor.comment)
        .bind(vendor.empty_spool_weight)
        .bind(&vendor.external_id)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_vendor(&self, id: Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM vendor WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(map_write_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn filaments_referencing_vendor(&self, vendor_id: Id, limit: usize) -> Result<Vec<Id>> {
        let rows = sqlx::query("SELECT id FROM filament WHERE vendor_id = $1 ORDER BY id LIMIT $2")
            .bind(vendor_id.get())
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(|r| row_id(r, "id")).collect()
    }

    async fn insert_filament(&self, filament: NewFilament) -> Result<FilamentRecord> {
        let sql = format!(
            "INSERT INTO filament (vendor_id, name, material, price, density, diameter, weight,
                 spool_weight, article_number, comment, settings_extruder_temp,
                 settings_bed_temp, color_hex, external_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING {FILAMENT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(filament.vendor_id.get())
            .bind(&filament.name)
            .bind(&filament.material)
            .bind(filament.price)
            .bind(filament.density)
            .bind(filament.diameter)
            .bind(filament.weight)
            .bind(filament.spool_weight)
            .bind(&filament.article_number)
            .bind(&filament.comment)
            .bind(filament.settings_extruder_temp)
            .bind(filament.settings_bed_temp)
            .bind(&filament.color_hex)
            .bind(&filament.external_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)?;
        filament_from_row(&row)
    }

    async fn get_filament(&self, id: Id) -> Result<Option<FilamentRecord>> {
        let sql = format!("SELECT {FILAMENT_COLUMNS} FROM filament WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(filament_from_row).transpose()
    }

    async fn get_filaments(&self, ids: &[Id]) -> Result<Vec<FilamentRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql =
            format!("SELECT {FILAMENT_COLUMNS} FROM filament WHERE id = ANY($1) ORDER BY id");
        let rows = sqlx::query(&sql)
            .bind(raw_ids(ids))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(filament_from_row).collect()
    }

    async fn list_filaments(&self, filter: &FilamentFilter) -> Result<Vec<FilamentRecord>> {
        let sql = format!(
            "SELECT {FILAMENT_COLUMNS} FROM filament
             WHERE ($1::BIGINT[] IS NULL OR vendor_id = ANY($1))
               AND ($2::TEXT IS NULL OR name ILIKE $2 ESCAPE '\\')
               AND ($3::TEXT IS NULL OR material ILIKE $3 ESCAPE '\\')
             ORDER BY id"
        );
        let rows = sqlx::query(&sql)
            .bind(filter.vendor_ids.as_deref().map(raw_ids))
            .bind(like_pattern(&filter.name))
            .bind(like_pattern(&filter.material))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(filament_from_row).collect()
    }

    async fn update_filament(&self, filament: &FilamentRecord) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE filament
             SET vendor_id = $2, name = $3, material = $4, price = $5, density = $6,
                 diameter = $7, weight = $8, spool_weight = $9, article_number = $10,
                 comment = $11, settings_extruder_temp = $12, settings_bed_temp = $13,
                 color_hex = $14, external_id = $15
             WHERE id = $1",
        )
        .bind(filament.id.get())
        .bind(filament.vendor_id.get())
        .bind(&filament.name)
        .bind(&filament.material)
        .bind(filament.price)
        .bind(filament.density)
        .bind(filament.diameter)
        .bind(filament.weight)
        .bind(filament.spool_weight)
        .bind(&filament.article_number)
        .bind(&filament.comment)
        .bind(filament.settings_extruder_temp)
        .bind(filament.settings_bed_temp)
        .bind(&filament.color_hex)
        .bind(&filament.external_id)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_filament(&self, id: Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM filament WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(map_write_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn spools_referencing_filament(
        &self,
        filament_id: Id,
        limit: usize,
    ) -> Result<Vec<Id>> {
        let rows = sqlx::query("SELECT id FROM spool WHERE filament_id = $1 ORDER BY id LIMIT $2")
            .bind(filament_id.get())
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(|r| row_id(r, "id")).collect()
    }

    async fn insert_spool(&self, spool: NewSpool) -> Result<SpoolRecord> {
        let sql = format!(
            "INSERT INTO spool (filament_id, first_used, last_used, price, initial_weight,
                 spool_weight, used_weight, location, lot_nr, comment, archived)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {SPOOL_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(spool.filament_id.get())
            .bind(spool.first_used)
            .bind(spool.last_used)
            .bind(spool.price)
            .bind(spool.initial_weight)
            .bind(spool.spool_weight)
            .bind(spool.used_weight)
            .bind(&spool.location)
            .bind(&spool.lot_nr)
            .bind(&spool.comment)
            .bind(spool.archived)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)?;
        spool_from_row(&row)
    }

    async fn get_spool(&self, id: Id) -> Result<Option<SpoolRecord>> {
        let sql = format!("SELECT {SPOOL_COLUMNS} FROM spool WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(spool_from_row).transpose()
    }

    async fn list_spools(&self, filter: &SpoolFilter) -> Result<Vec<SpoolRecord>> {
        let sql = format!(
            "SELECT {SPOOL_COLUMNS} FROM spool
             WHERE ($1 OR archived = FALSE)
               AND ($2::BIGINT[] IS NULL OR filament_id = ANY($2))
               AND ($3::BIGINT[] IS NULL OR filament_id IN (
                    SELECT id FROM filament WHERE vendor_id = ANY($3)))
               AND ($4::TEXT IS NULL OR location ILIKE $4 ESCAPE '\\')
             ORDER BY id"
        );
        let rows = sqlx::query(&sql)
            .bind(filter.allow_archived)
            .bind(filter.filament_ids.as_deref().map(raw_ids))
            .bind(filter.vendor_ids.as_deref().map(raw_ids))
            .bind(like_pattern(&filter.location))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(spool_from_row).collect()
    }

    async fn update_spool(&self, spool: &SpoolRecord) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE spool
             SET filament_id = $2, first_used = $3, last_used = $4, price = $5,
                 initial_weight = $6, spool_weight = $7, used_weight = $8, location = $9,
                 lot_nr = $10, comment = $11, archived = $12
             WHERE id = $1",
        )
        .bind(spool.id.get())
        .bind(spool.filament_id.get())
        .bind(spool.first_used)
        .bind(spool.last_used)
        .bind(spool.price)
        .bind(spool.initial_weight)
        .bind(spool.spool_weight)
        .bind(spool.used_weight)
        .bind(&spool.location)
        .bind(&spool.lot_nr)
        .bind(&spool.comment)
        .bind(spool.archived)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_spool(&self, id: Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM spool WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(&None), None);
        assert_eq!(like_pattern(&Some("PLA".into())).as_deref(), Some("%PLA%"));
        assert_eq!(
            like_pattern(&Some(r"50%_a\b".into())).as_deref(),
            Some(r"%50\%\_a\\b%")
        );
    }
}
