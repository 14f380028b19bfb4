//! Tests that guarded endpoints require the API key in the request body.
#![cfg(test)]

use crate::{colabora_test, TestingTools, TEST_API_KEY};
use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[actix_rt::test]
async fn correct_key_proceeds() -> Result<()> {
    colabora_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client
                .post("/api/buscar")
                .json(&json!({ "tema": "", "key": TEST_API_KEY }))
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::OK);

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn wrong_key_is_forbidden() -> Result<()> {
    colabora_test(
        |_| (),
        |TestingTools {
             test_client,
             mut metrics_watcher,
             ..
         }| async move {
            let response = test_client
                .post("/api/buscar")
                .json(&json!({ "tema": "", "key": "api-key-incorrecto" }))
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::FORBIDDEN);
            let body: Value = response.json().await?;
            assert_eq!(body, json!({ "error": "Access denied: invalid API key" }));
            assert!(metrics_watcher.has_incr("auth.rejected"));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn missing_key_is_forbidden() -> Result<()> {
    colabora_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client
                .post("/api/buscar")
                .json(&json!({ "tema": "" }))
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::FORBIDDEN);
            let body: Value = response.json().await?;
            assert_eq!(body, json!({ "error": "Access denied: missing API key" }));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn body_that_is_not_json_is_forbidden() -> Result<()> {
    colabora_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client
                .get("/api/iniciativa")
                .body(format!("key={}", TEST_API_KEY))
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::FORBIDDEN);

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn guarded_requests_are_timed() -> Result<()> {
    colabora_test(
        |_| (),
        |TestingTools {
             test_client,
             mut metrics_watcher,
             ..
         }| async move {
            test_client
                .get("/api/iniciativa")
                .json(&json!({ "entidad": "entidad1", "legislatura": "legislatura1" }))
                .send()
                .await?;

            assert!(metrics_watcher.has(|msg| msg.name == "request.duration"));

            Ok(())
        },
    )
    .await
}
