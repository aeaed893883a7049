//! Shared helpers for server integration tests.
//!
//! Every test gets a fresh router over its own in-memory store and drives it
//! with `tower::ServiceExt::oneshot`, so no database or socket is needed.

use std::{future::Future, pin::Pin};

use anyhow::Context;
use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use spoolyard::{api::create_router, config::Config, state::AppState};
use tower::ServiceExt;

pub type TestFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

#[derive(Clone)]
pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Vec<u8>>,
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        self.request_with_extra_headers(method, uri, body, &[]).await
    }

    pub async fn request_with_extra_headers(
        &self,
        method: Method,
        uri: &str,
        body: Option<Vec<u8>>,
        extra_headers: &[(&str, &str)],
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        for (name, value) in extra_headers {
            builder = builder.header(*name, *value);
        }
        let request = builder.body(body.map(Body::from).unwrap_or_else(Body::empty))?;

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await?.to_bytes();
        Ok((status, headers, bytes))
    }

    /// Send a JSON body (or none) and parse the JSON response.
    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> anyhow::Result<(StatusCode, Value)> {
        let body = body.map(|b| to_json_body(&b)).transpose()?;
        let (status, _headers, bytes) = self.request(method, uri, body).await?;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .with_context(|| format!("response is not JSON: {:?}", bytes))?
        };
        Ok((status, value))
    }

    pub async fn create_vendor(&self, name: &str) -> anyhow::Result<Value> {
        let (status, body) = self
            .json(Method::POST, "/api/v1/vendor", Some(json!({ "name": name })))
            .await?;
        assert_status(status, StatusCode::CREATED, "create vendor");
        Ok(body)
    }

    pub async fn create_filament(&self, vendor_id: &str) -> anyhow::Result<Value> {
        let (status, body) = self
            .json(
                Method::POST,
                "/api/v1/filament",
                Some(json!({ "vendor_id": vendor_id, "density": 1.25, "diameter": 1.75 })),
            )
            .await?;
        assert_status(status, StatusCode::CREATED, "create filament");
        Ok(body)
    }

    pub async fn create_spool(&self, filament_id: &str) -> anyhow::Result<Value> {
        let (status, body) = self
            .json(
                Method::POST,
                "/api/v1/spool",
                Some(json!({ "filament_id": filament_id })),
            )
            .await?;
        assert_status(status, StatusCode::CREATED, "create spool");
        Ok(body)
    }

    pub async fn delete(&self, uri: &str) -> anyhow::Result<()> {
        let (status, body) = self.json(Method::DELETE, uri, None).await?;
        assert_status(status, StatusCode::OK, uri);
        assert_eq!(body, json!({}));
        Ok(())
    }
}

pub fn test_config() -> Config {
    Config::in_memory()
}

pub async fn with_test_app<F>(test: F) -> anyhow::Result<()>
where
    F: FnOnce(TestApp) -> TestFuture,
{
    with_test_app_with_config(|_| {}, test).await
}

pub async fn with_test_app_with_config<C, F>(configure: C, test: F) -> anyhow::Result<()>
where
    C: FnOnce(&mut Config),
    F: FnOnce(TestApp) -> TestFuture,
{
    let mut config = test_config();
    configure(&mut config);
    let state = AppState::new(config).await?;
    let app = TestApp {
        router: create_router(state),
    };
    test(app).await
}

pub fn assert_status(actual: StatusCode, expected: StatusCode, context: &str) {
    assert_eq!(actual, expected, "unexpected status for {context}");
}

pub fn to_json_body(value: &Value) -> anyhow::Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

/// The string id at `pointer`, asserting it is a decimal string.
pub fn string_id(value: &Value, pointer: &str) -> String {
    let field = value
        .pointer(pointer)
        .unwrap_or_else(|| panic!("missing {pointer} in {value}"));
    let text = field
        .as_str()
        .unwrap_or_else(|| panic!("{pointer} is not a string: {field}"));
    assert!(
        !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()),
        "{pointer} is not a decimal id: {text}"
    );
    text.to_string()
}
