//! Referential Integrity Tests
//!
//! References are always checked:
//! - writes pointing at a missing vendor or filament are rejected with 409
//! - deleting a vendor or filament that is still referenced is rejected with 409

use crate::support::{assert_status, string_id, with_test_app};
use axum::http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn filament_with_unknown_vendor_conflicts() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, body) = app
                .json(
                    Method::POST,
                    "/api/v1/filament",
                    Some(json!({
                        "vendor_id": "9223372036854775807",
                        "density": 1.25,
                        "diameter": 1.75
                    })),
                )
                .await?;
            assert_status(status, StatusCode::CONFLICT, "dangling vendor");
            assert!(body["message"]
                .as_str()
                .unwrap()
                .contains("9223372036854775807"));
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn spool_with_unknown_filament_conflicts() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, _) = app
                .json(
                    Method::POST,
                    "/api/v1/spool",
                    Some(json!({ "filament_id": "1" })),
                )
                .await?;
            assert_status(status, StatusCode::CONFLICT, "dangling filament");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn patch_to_unknown_vendor_conflicts() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let vendor_id = string_id(&app.create_vendor("A").await?, "/id");
            let filament_id = string_id(&app.create_filament(&vendor_id).await?, "/id");

            let (status, _) = app
                .json(
                    Method::PATCH,
                    &format!("/api/v1/filament/{filament_id}"),
                    Some(json!({ "vendor_id": "12345" })),
                )
                .await?;
            assert_status(status, StatusCode::CONFLICT, "patch to dangling vendor");

            // Unchanged.
            let (_, filament) = app
                .json(Method::GET, &format!("/api/v1/filament/{filament_id}"), None)
                .await?;
            assert_eq!(string_id(&filament, "/vendor/id"), vendor_id);
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn referenced_entities_cannot_be_deleted() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let vendor_id = string_id(&app.create_vendor("A").await?, "/id");
            let filament_id = string_id(&app.create_filament(&vendor_id).await?, "/id");
            let spool_id = string_id(&app.create_spool(&filament_id).await?, "/id");

            let (status, _) = app
                .json(Method::DELETE, &format!("/api/v1/vendor/{vendor_id}"), None)
                .await?;
            assert_status(status, StatusCode::CONFLICT, "delete referenced vendor");

            let (status, body) = app
                .json(
                    Method::DELETE,
                    &format!("/api/v1/filament/{filament_id}"),
                    None,
                )
                .await?;
            assert_status(status, StatusCode::CONFLICT, "delete referenced filament");
            assert!(body["message"].as_str().unwrap().contains(&spool_id));

            // Children first, then parents.
            app.delete(&format!("/api/v1/spool/{spool_id}")).await?;
            app.delete(&format!("/api/v1/filament/{filament_id}")).await?;
            app.delete(&format!("/api/v1/vendor/{vendor_id}")).await?;
            Ok(())
        })
    })
    .await
}
