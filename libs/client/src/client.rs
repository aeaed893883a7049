use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use spoolyard_ids::{verify_graph, Id};
use spoolyard_models::{
    Filament, FilamentCreate, FilamentUpdate, Spool, SpoolCreate, SpoolUpdate, SpoolUse, Vendor,
    VendorCreate, VendorUpdate,
};
use url::Url;

use crate::ClientError;

const API_PREFIX: &str = "api/v1/";

/// Async client for the Spoolyard API. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base: Url,
}

impl Client {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_http_client(base_url, reqwest::Client::new())
    }

    pub fn with_http_client(base_url: &str, http: reqwest::Client) -> Result<Self, ClientError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub async fn health(&self) -> Result<Value, ClientError> {
        let url = self.base.join("health")?;
        self.send(self.http.get(url)).await
    }

    pub async fn create_vendor(&self, input: &VendorCreate) -> Result<Vendor, ClientError> {
        self.call(Method::POST, "vendor", &[], Some(input)).await
    }

    pub async fn list_vendors(&self) -> Result<Vec<Vendor>, ClientError> {
        self.call(Method::GET, "vendor", &[], None::<&()>).await
    }

    pub async fn get_vendor(&self, id: Id) -> Result<Vendor, ClientError> {
        self.call(Method::GET, &format!("vendor/{id}"), &[], None::<&()>)
            .await
    }

    pub async fn update_vendor(
        &self,
        id: Id,
        changes: &VendorUpdate,
    ) -> Result<Vendor, ClientError> {
        self.call(Method::PATCH, &format!("vendor/{id}"), &[], Some(changes))
            .await
    }

    pub async fn delete_vendor(&self, id: Id) -> Result<(), ClientError> {
        self.delete(&format!("vendor/{id}")).await
    }

    pub async fn create_filament(&self, input: &FilamentCreate) -> Result<Filament, ClientError> {
        self.call(Method::POST, "filament", &[], Some(input)).await
    }

    /// List filaments, optionally only those of one vendor.
    pub async fn list_filaments(&self, vendor: Option<Id>) -> Result<Vec<Filament>, ClientError> {
        let query: Vec<(&str, String)> = vendor
            .map(|id| ("vendor.id", id.to_string()))
            .into_iter()
            .collect();
        self.call(Method::GET, "filament", &query, None::<&()>).await
    }

    pub async fn get_filament(&self, id: Id) -> Result<Filament, ClientError> {
        self.call(Method::GET, &format!("filament/{id}"), &[], None::<&()>)
            .await
    }

    pub async fn update_filament(
        &self,
        id: Id,
        changes: &FilamentUpdate,
    ) -> Result<Filament, ClientError> {
        self.call(Method::PATCH, &format!("filament/{id}"), &[], Some(changes))
            .await
    }

    pub async fn delete_filament(&self, id: Id) -> Result<(), ClientError> {
        self.delete(&format!("filament/{id}")).await
    }

    pub async fn create_spool(&self, input: &SpoolCreate) -> Result<Spool, ClientError> {
        self.call(Method::POST, "spool", &[], Some(input)).await
    }

    /// List spools, optionally only those of one filament. Archived spools
    /// are included.
    pub async fn list_spools(&self, filament: Option<Id>) -> Result<Vec<Spool>, ClientError> {
        let mut query = vec![("allow_archived", "true".to_string())];
        if let Some(id) = filament {
            query.push(("filament.id", id.to_string()));
        }
        self.call(Method::GET, "spool", &query, None::<&()>).await
    }

    pub async fn get_spool(&self, id: Id) -> Result<Spool, ClientError> {
        self.call(Method::GET, &format!("spool/{id}"), &[], None::<&()>)
            .await
    }

    pub async fn update_spool(&self, id: Id, changes: &SpoolUpdate) -> Result<Spool, ClientError> {
        self.call(Method::PATCH, &format!("spool/{id}"), &[], Some(changes))
            .await
    }

    pub async fn use_spool(&self, id: Id, usage: &SpoolUse) -> Result<Spool, ClientError> {
        self.call(Method::PUT, &format!("spool/{id}/use"), &[], Some(usage))
            .await
    }

    pub async fn delete_spool(&self, id: Id) -> Result<(), ClientError> {
        self.delete(&format!("spool/{id}")).await
    }

    /// Fetch any API path as untyped JSON. Identifier fields are still
    /// verified.
    pub async fn get_raw(&self, path: &str) -> Result<Value, ClientError> {
        let url = self.api_url(path)?;
        self.send(self.http.get(url)).await
    }

    async fn delete(&self, path: &str) -> Result<(), ClientError> {
        let _: Value = self.call(Method::DELETE, path, &[], None::<&()>).await?;
        Ok(())
    }

    async fn call<B, T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.api_url(path)?;
        let mut request = self.http.request(method, url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let value = self.send(request).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Send a request, fail on non-2xx, and verify identifier fields.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), body = %text, "Request failed");
            return Err(ClientError::Transport {
                status: status.as_u16(),
                body: text,
            });
        }

        let value: Value = if text.is_empty() || status == StatusCode::NO_CONTENT {
            Value::Null
        } else {
            serde_json::from_str(&text)?
        };
        verify_graph(&value)?;
        Ok(value)
    }

    fn api_url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base.join(API_PREFIX)?.join(path)?)
    }
}
