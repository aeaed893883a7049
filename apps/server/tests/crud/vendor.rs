use crate::support::{assert_status, string_id, with_test_app};
use axum::http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn create_returns_full_vendor() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, vendor) = app
                .json(
                    Method::POST,
                    "/api/v1/vendor",
                    Some(json!({
                        "name": "Polymaker",
                        "comment": "PolyTerra line",
                        "empty_spool_weight": 140.0,
                        "external_id": "polymaker"
                    })),
                )
                .await?;

            assert_status(status, StatusCode::CREATED, "create vendor");
            string_id(&vendor, "/id");
            assert_eq!(vendor["name"], "Polymaker");
            assert_eq!(vendor["comment"], "PolyTerra line");
            assert_eq!(vendor["empty_spool_weight"], 140.0);
            // Free-text external ids are not identifiers and pass through as given.
            assert_eq!(vendor["external_id"], "polymaker");
            assert!(vendor["registered"].is_string());
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn create_rejects_invalid_bodies() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            for body in [
                json!({}),
                json!({ "name": "" }),
                json!({ "name": "x".repeat(65) }),
                json!({ "name": "ok", "id": "5" }),
                json!({ "name": "ok", "empty_spool_weight": -1.0 }),
                json!({ "name": "ok", "external_id": "x".repeat(257) }),
            ] {
                let (status, error) = app
                    .json(Method::POST, "/api/v1/vendor", Some(body.clone()))
                    .await?;
                assert_status(status, StatusCode::BAD_REQUEST, &body.to_string());
                assert!(error["message"].is_string());
            }
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn patch_rejects_overlong_external_id() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let vendor = app.create_vendor("Polymaker").await?;
            let uri = format!("/api/v1/vendor/{}", string_id(&vendor, "/id"));

            let (status, _) = app
                .json(
                    Method::PATCH,
                    &uri,
                    Some(json!({ "external_id": "x".repeat(256) })),
                )
                .await?;
            assert_status(status, StatusCode::OK, "256 characters fit");

            let (status, error) = app
                .json(
                    Method::PATCH,
                    &uri,
                    Some(json!({ "external_id": "x".repeat(257) })),
                )
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "257 characters");
            assert_eq!(
                error["message"],
                "Validation error: external_id must be at most 256 characters"
            );
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn get_unknown_vendor_is_not_found() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, body) = app
                .json(Method::GET, "/api/v1/vendor/9007199254740993", None)
                .await?;
            assert_status(status, StatusCode::NOT_FOUND, "unknown vendor");
            assert_eq!(
                body["message"],
                "No vendor with ID 9007199254740993 found."
            );
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn patch_updates_fields_but_never_the_id() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let vendor = app.create_vendor("Prusa").await?;
            let id = string_id(&vendor, "/id");
            let uri = format!("/api/v1/vendor/{id}");

            let (status, updated) = app
                .json(
                    Method::PATCH,
                    &uri,
                    Some(json!({ "name": "Prusa Research", "comment": "Prague" })),
                )
                .await?;
            assert_status(status, StatusCode::OK, "patch vendor");
            assert_eq!(string_id(&updated, "/id"), id);
            assert_eq!(updated["name"], "Prusa Research");
            assert_eq!(updated["comment"], "Prague");
            assert_eq!(updated["registered"], vendor["registered"]);

            // `null` clears a nullable field.
            let (_, cleared) = app
                .json(Method::PATCH, &uri, Some(json!({ "comment": null })))
                .await?;
            assert!(cleared.get("comment").is_none());

            // The id is not patchable.
            let (status, _) = app
                .json(Method::PATCH, &uri, Some(json!({ "id": "1" })))
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "patch id");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn list_filters_by_name_and_external_id() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            app.create_vendor("Prusa").await?;
            app.create_vendor("Polymaker").await?;
            app.json(
                Method::POST,
                "/api/v1/vendor",
                Some(json!({ "name": "eSun", "external_id": "esun" })),
            )
            .await?;

            let (_, by_name) = app.json(Method::GET, "/api/v1/vendor?name=pol", None).await?;
            let names: Vec<_> = by_name
                .as_array()
                .unwrap()
                .iter()
                .map(|v| v["name"].as_str().unwrap().to_string())
                .collect();
            assert_eq!(names, vec!["Polymaker"]);

            let (_, by_external) = app
                .json(Method::GET, "/api/v1/vendor?external_id=esun", None)
                .await?;
            assert_eq!(by_external.as_array().unwrap().len(), 1);
            assert_eq!(by_external[0]["name"], "eSun");

            // `%` and `_` are plain characters in name filters.
            for wildcard in ["_", "%25"] {
                let uri = format!("/api/v1/vendor?name={wildcard}");
                let (_, matched) = app.json(Method::GET, &uri, None).await?;
                assert_eq!(matched, json!([]), "{uri}");
            }
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn delete_twice_is_not_found() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let vendor = app.create_vendor("Prusa").await?;
            let uri = format!("/api/v1/vendor/{}", string_id(&vendor, "/id"));

            app.delete(&uri).await?;
            let (status, _) = app.json(Method::DELETE, &uri, None).await?;
            assert_status(status, StatusCode::NOT_FOUND, "second delete");
            Ok(())
        })
    })
    .await
}
