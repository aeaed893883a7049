use crate::support::{assert_status, string_id, with_test_app, TestApp};
use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

async fn filament_with_weight(app: &TestApp) -> anyhow::Result<String> {
    let vendor = app.create_vendor("Prusa").await?;
    let (status, filament) = app
        .json(
            Method::POST,
            "/api/v1/filament",
            Some(json!({
                "vendor_id": string_id(&vendor, "/id"),
                "density": 1.24,
                "diameter": 1.75,
                "weight": 1000.0
            })),
        )
        .await?;
    assert_status(status, StatusCode::CREATED, "create filament");
    Ok(string_id(&filament, "/id"))
}

fn as_f64(value: &Value) -> f64 {
    value.as_f64().unwrap_or_else(|| panic!("not a number: {value}"))
}

#[tokio::test]
async fn create_fills_derived_fields() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let filament_id = filament_with_weight(&app).await?;

            let (status, spool) = app
                .json(
                    Method::POST,
                    "/api/v1/spool",
                    Some(json!({
                        "filament_id": filament_id,
                        "initial_weight": 800.0,
                        "used_weight": 100.0,
                        "location": "Shelf A",
                        "lot_nr": "L-0042"
                    })),
                )
                .await?;

            assert_status(status, StatusCode::CREATED, "create spool");
            assert_eq!(as_f64(&spool["remaining_weight"]), 700.0);
            assert_eq!(as_f64(&spool["used_weight"]), 100.0);
            assert!(as_f64(&spool["used_length"]) > 0.0);
            assert!(as_f64(&spool["remaining_length"]) > as_f64(&spool["used_length"]));
            assert_eq!(spool["archived"], false);
            // Lot numbers are free text, not identifiers.
            assert_eq!(spool["lot_nr"], "L-0042");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn use_endpoint_consumes_weight_and_length() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let filament_id = filament_with_weight(&app).await?;
            let spool = app.create_spool(&filament_id).await?;
            let uri = format!("/api/v1/spool/{}/use", string_id(&spool, "/id"));

            let (status, used) = app
                .json(Method::PUT, &uri, Some(json!({ "use_weight": 25.0 })))
                .await?;
            assert_status(status, StatusCode::OK, "use by weight");
            assert_eq!(as_f64(&used["used_weight"]), 25.0);
            assert_eq!(as_f64(&used["remaining_weight"]), 975.0);
            assert!(used["first_used"].is_string());
            assert!(used["last_used"].is_string());

            let (status, used) = app
                .json(Method::PUT, &uri, Some(json!({ "use_length": 1000.0 })))
                .await?;
            assert_status(status, StatusCode::OK, "use by length");
            assert!(as_f64(&used["used_weight"]) > 25.0);

            let (status, _) = app
                .json(
                    Method::PUT,
                    &uri,
                    Some(json!({ "use_weight": 1.0, "use_length": 1.0 })),
                )
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "both amounts");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn list_filters_and_hides_archived() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let first = filament_with_weight(&app).await?;
            let second = filament_with_weight(&app).await?;
            let s1 = string_id(&app.create_spool(&first).await?, "/id");
            let s2 = string_id(&app.create_spool(&second).await?, "/id");

            let (status, archived) = app
                .json(
                    Method::PATCH,
                    &format!("/api/v1/spool/{s2}"),
                    Some(json!({ "archived": true })),
                )
                .await?;
            assert_status(status, StatusCode::OK, "archive spool");
            assert_eq!(archived["archived"], true);

            let ids = |list: &Value| -> Vec<String> {
                list.as_array()
                    .unwrap()
                    .iter()
                    .map(|s| string_id(s, "/id"))
                    .collect()
            };

            let (_, active) = app.json(Method::GET, "/api/v1/spool", None).await?;
            assert_eq!(ids(&active), vec![s1.clone()]);

            let (_, all) = app
                .json(Method::GET, "/api/v1/spool?allow_archived=true", None)
                .await?;
            assert_eq!(ids(&all), vec![s1.clone(), s2.clone()]);

            let (_, by_filament) = app
                .json(
                    Method::GET,
                    &format!("/api/v1/spool?filament.id={second}&allow_archived=true"),
                    None,
                )
                .await?;
            assert_eq!(ids(&by_filament), vec![s2]);
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn list_filters_by_vendor() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let a = string_id(&app.create_vendor("A").await?, "/id");
            let b = string_id(&app.create_vendor("B").await?, "/id");
            let fa = string_id(&app.create_filament(&a).await?, "/id");
            let fb = string_id(&app.create_filament(&b).await?, "/id");
            app.create_spool(&fa).await?;
            let sb = string_id(&app.create_spool(&fb).await?, "/id");

            let (status, list) = app
                .json(Method::GET, &format!("/api/v1/spool?vendor.id={b}"), None)
                .await?;
            assert_status(status, StatusCode::OK, "vendor filter");
            let items = list.as_array().unwrap();
            assert_eq!(items.len(), 1);
            assert_eq!(string_id(&items[0], "/id"), sb);
            assert_eq!(string_id(&items[0], "/filament/vendor/id"), b);
            Ok(())
        })
    })
    .await
}
