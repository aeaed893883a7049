use crate::support::{assert_status, string_id, with_test_app};
use axum::http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn create_normalizes_color_and_embeds_vendor() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let vendor = app.create_vendor("Prusa").await?;
            let vendor_id = string_id(&vendor, "/id");

            let (status, filament) = app
                .json(
                    Method::POST,
                    "/api/v1/filament",
                    Some(json!({
                        "vendor_id": vendor_id,
                        "name": "Galaxy Black",
                        "material": "PLA",
                        "density": 1.24,
                        "diameter": 1.75,
                        "weight": 1000.0,
                        "settings_extruder_temp": 215,
                        "color_hex": "#3d3e3d"
                    })),
                )
                .await?;

            assert_status(status, StatusCode::CREATED, "create filament");
            assert_eq!(filament["color_hex"], "3D3E3D");
            assert_eq!(filament["vendor"], vendor);
            assert!(filament.get("vendor_id").is_none());
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn create_validates_physical_properties() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let vendor = app.create_vendor("Prusa").await?;
            let vendor_id = string_id(&vendor, "/id");

            for body in [
                json!({ "vendor_id": vendor_id, "density": 0, "diameter": 1.75 }),
                json!({ "vendor_id": vendor_id, "density": 1.24, "diameter": -1 }),
                json!({ "vendor_id": vendor_id, "density": 1.24 }),
                json!({
                    "vendor_id": vendor_id,
                    "density": 1.24,
                    "diameter": 1.75,
                    "color_hex": "blue",
                }),
                json!({
                    "vendor_id": vendor_id,
                    "density": 1.24,
                    "diameter": 1.75,
                    "external_id": "x".repeat(257),
                }),
            ] {
                let (status, _) = app
                    .json(Method::POST, "/api/v1/filament", Some(body.clone()))
                    .await?;
                assert_status(status, StatusCode::BAD_REQUEST, &body.to_string());
            }
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn list_filters_by_vendor_ids() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let a = string_id(&app.create_vendor("A").await?, "/id");
            let b = string_id(&app.create_vendor("B").await?, "/id");
            let c = string_id(&app.create_vendor("C").await?, "/id");
            let fa = string_id(&app.create_filament(&a).await?, "/id");
            let fb = string_id(&app.create_filament(&b).await?, "/id");
            app.create_filament(&c).await?;

            let (status, list) = app
                .json(Method::GET, &format!("/api/v1/filament?vendor.id={a},{b}"), None)
                .await?;
            assert_status(status, StatusCode::OK, "filtered list");
            let ids: Vec<_> = list
                .as_array()
                .unwrap()
                .iter()
                .map(|f| string_id(f, "/id"))
                .collect();
            assert_eq!(ids, vec![fa, fb]);

            let (status, _) = app
                .json(Method::GET, "/api/v1/filament?vendor.id=1,x", None)
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "malformed filter id");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn patch_can_change_vendor() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let a = string_id(&app.create_vendor("A").await?, "/id");
            let b = string_id(&app.create_vendor("B").await?, "/id");
            let filament = app.create_filament(&a).await?;
            let id = string_id(&filament, "/id");

            let (status, updated) = app
                .json(
                    Method::PATCH,
                    &format!("/api/v1/filament/{id}"),
                    Some(json!({ "vendor_id": b, "material": "PETG" })),
                )
                .await?;
            assert_status(status, StatusCode::OK, "patch filament");
            assert_eq!(string_id(&updated, "/id"), id);
            assert_eq!(string_id(&updated, "/vendor/id"), b);
            assert_eq!(updated["material"], "PETG");
            Ok(())
        })
    })
    .await
}
