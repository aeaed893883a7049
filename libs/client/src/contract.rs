//! End-to-end identifier contract scenarios.
//!
//! Each scenario creates entities, checks that every identifier in the raw
//! response bodies is a decimal string, and deletes what it created in
//! reverse order. A failing delete fails the scenario.

use serde_json::Value;
use std::fmt;
use spoolyard_ids::{decode, Id};
use spoolyard_models::{FilamentCreate, SpoolCreate, VendorCreate};

use crate::{Client, ClientError};

/// Outcome of one scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioReport {
    pub name: &'static str,
    /// Every entity created (and deleted again) by the scenario.
    pub created: Vec<(EntityKind, Id)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Vendor,
    Filament,
    Spool,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Vendor => "vendor",
            EntityKind::Filament => "filament",
            EntityKind::Spool => "spool",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractReport {
    pub scenarios: Vec<ScenarioReport>,
}

/// Run every scenario in order, stopping at the first failure.
pub async fn run_all(client: &Client) -> Result<ContractReport, ClientError> {
    let mut report = ContractReport::default();
    report.scenarios.push(vendor_roundtrip(client).await?);
    report.scenarios.push(filament_embeds_vendor(client).await?);
    report.scenarios.push(spool_embeds_filament(client).await?);
    report.scenarios.push(list_ids_are_strings(client).await?);
    Ok(report)
}

/// Create a vendor, check its id, delete it.
pub async fn vendor_roundtrip(client: &Client) -> Result<ScenarioReport, ClientError> {
    let mut created = Created::new("vendor_roundtrip");
    let result = async {
        let vendor = client.create_vendor(&VendorCreate::new("Test Vendor")).await?;
        created.push(EntityKind::Vendor, vendor.id);

        let raw = client.get_raw(&format!("vendor/{}", vendor.id)).await?;
        expect_string_id(&raw, &["id"], vendor.id)?;
        Ok::<(), ClientError>(())
    }
    .await;
    created.finish(client, result).await
}

/// Create vendor and filament; the filament embeds the vendor.
pub async fn filament_embeds_vendor(client: &Client) -> Result<ScenarioReport, ClientError> {
    let mut created = Created::new("filament_embeds_vendor");
    let result = async {
        let vendor = client.create_vendor(&VendorCreate::new("Test Vendor")).await?;
        created.push(EntityKind::Vendor, vendor.id);
        let filament = client
            .create_filament(&FilamentCreate::new(vendor.id, 1.25, 1.75))
            .await?;
        created.push(EntityKind::Filament, filament.id);

        let raw = client.get_raw(&format!("filament/{}", filament.id)).await?;
        expect_string_id(&raw, &["id"], filament.id)?;
        expect_string_id(&raw, &["vendor", "id"], vendor.id)?;
        Ok::<(), ClientError>(())
    }
    .await;
    created.finish(client, result).await
}

/// Create vendor, filament and spool; the spool embeds both.
pub async fn spool_embeds_filament(client: &Client) -> Result<ScenarioReport, ClientError> {
    let mut created = Created::new("spool_embeds_filament");
    let result = async {
        let vendor = client.create_vendor(&VendorCreate::new("Test Vendor")).await?;
        created.push(EntityKind::Vendor, vendor.id);
        let filament = client
            .create_filament(&FilamentCreate::new(vendor.id, 1.25, 1.75))
            .await?;
        created.push(EntityKind::Filament, filament.id);
        let spool = client.create_spool(&SpoolCreate::new(filament.id)).await?;
        created.push(EntityKind::Spool, spool.id);

        let raw = client.get_raw(&format!("spool/{}", spool.id)).await?;
        expect_string_id(&raw, &["id"], spool.id)?;
        expect_string_id(&raw, &["filament", "id"], filament.id)?;
        expect_string_id(&raw, &["filament", "vendor", "id"], vendor.id)?;
        Ok::<(), ClientError>(())
    }
    .await;
    created.finish(client, result).await
}

/// After one creation, the vendor list is non-empty and every element has a
/// string id.
pub async fn list_ids_are_strings(client: &Client) -> Result<ScenarioReport, ClientError> {
    let mut created = Created::new("list_ids_are_strings");
    let result = async {
        let vendor = client.create_vendor(&VendorCreate::new("Test Vendor")).await?;
        created.push(EntityKind::Vendor, vendor.id);

        let raw = client.get_raw("vendor").await?;
        let items = raw
            .as_array()
            .ok_or_else(|| ClientError::Contract("vendor list is not an array".into()))?;
        if items.is_empty() {
            return Err(ClientError::Contract(
                "vendor list is empty after a creation".into(),
            ));
        }
        for item in items {
            string_id_at(item, &["id"])?;
        }
        if !items
            .iter()
            .any(|item| string_id_at(item, &["id"]).ok() == Some(vendor.id))
        {
            return Err(ClientError::Contract(format!(
                "vendor {} missing from list",
                vendor.id
            )));
        }
        Ok::<(), ClientError>(())
    }
    .await;
    created.finish(client, result).await
}

/// Entities created by a scenario, deleted newest first.
struct Created {
    name: &'static str,
    entities: Vec<(EntityKind, Id)>,
}

impl Created {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            entities: Vec::new(),
        }
    }

    fn push(&mut self, kind: EntityKind, id: Id) {
        self.entities.push((kind, id));
    }

    async fn finish(
        self,
        client: &Client,
        outcome: Result<(), ClientError>,
    ) -> Result<ScenarioReport, ClientError> {
        for (kind, id) in self.entities.iter().rev() {
            let deleted = match kind {
                EntityKind::Spool => client.delete_spool(*id).await,
                EntityKind::Filament => client.delete_filament(*id).await,
                EntityKind::Vendor => client.delete_vendor(*id).await,
            };
            if let Err(e) = deleted {
                tracing::error!(
                    scenario = self.name,
                    kind = kind.as_str(),
                    id = %id,
                    error = %e,
                    "Cleanup failed"
                );
                // A scenario failure takes precedence over the cleanup failure.
                outcome?;
                return Err(e);
            }
        }

        outcome?;
        tracing::info!(scenario = self.name, "Scenario passed");
        Ok(ScenarioReport {
            name: self.name,
            created: self.entities,
        })
    }
}

fn string_id_at(value: &Value, path: &[&str]) -> Result<Id, ClientError> {
    let field = path
        .iter()
        .try_fold(value, |v, key| v.get(key))
        .ok_or_else(|| ClientError::Contract(format!("missing field {}", path.join("."))))?;
    let text = field.as_str().ok_or_else(|| {
        ClientError::Contract(format!("{} is not a string: {field}", path.join(".")))
    })?;
    decode(text).map_err(|e| ClientError::Contract(format!("{}: {e}", path.join("."))))
}

fn expect_string_id(value: &Value, path: &[&str], expected: Id) -> Result<(), ClientError> {
    let actual = string_id_at(value, path)?;
    if actual != expected {
        return Err(ClientError::Contract(format!(
            "{} is {actual}, expected {expected}",
            path.join(".")
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_ids_are_found_at_nested_paths() {
        let body = json!({"id": "3", "filament": {"vendor": {"id": "9223372036854775807"}}});
        assert_eq!(string_id_at(&body, &["id"]).unwrap(), Id::new(3).unwrap());
        assert_eq!(
            string_id_at(&body, &["filament", "vendor", "id"]).unwrap(),
            Id::new(i64::MAX).unwrap()
        );
    }

    #[test]
    fn numeric_ids_break_the_contract() {
        let body = json!({"id": 3});
        assert!(matches!(
            string_id_at(&body, &["id"]),
            Err(ClientError::Contract(_))
        ));
        assert!(string_id_at(&body, &["vendor", "id"]).is_err());
    }

    #[test]
    fn entity_kinds_display_as_paths() {
        assert_eq!(EntityKind::Vendor.to_string(), "vendor");
        assert_eq!(EntityKind::Filament.to_string(), "filament");
        assert_eq!(EntityKind::Spool.as_str(), "spool");
    }
}
