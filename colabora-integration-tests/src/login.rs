//! Tests that the login endpoint hands out the API key.
#![cfg(test)]

use crate::{colabora_test, TestingTools, TEST_API_KEY};
use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[actix_rt::test]
async fn login_ok() -> Result<()> {
    colabora_test(
        |_| (),
        |TestingTools {
             test_client,
             mut metrics_watcher,
             ..
         }| async move {
            let response = test_client
                .post("/api/login")
                .json(&json!({ "username": "usuario_api", "password": "contrasena_api" }))
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::OK);
            let body: Value = response.json().await?;
            assert_eq!(
                body,
                json!({ "result": "ok: ingreso correcto", "key": TEST_API_KEY })
            );
            assert!(metrics_watcher.has_incr("login.granted"));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn login_error() -> Result<()> {
    colabora_test(
        |_| (),
        |TestingTools {
             test_client,
             mut metrics_watcher,
             ..
         }| async move {
            let response = test_client
                .post("/api/login")
                .json(&json!({ "username": "usuario_api", "password": "contrasena" }))
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::OK);
            let body: Value = response.json().await?;
            assert_eq!(body, json!({ "result": "error: ingreso denegado" }));
            assert_eq!(metrics_watcher.counter_total("login.denied"), 1.0);
            assert!(!metrics_watcher.has_incr("login.granted"));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn login_hands_out_configured_key() -> Result<()> {
    colabora_test(
        |settings| settings.auth.api_key = "otra-key".to_string(),
        |TestingTools { test_client, .. }| async move {
            let body: Value = test_client
                .post("/api/login")
                .json(&json!({ "username": "usuario_api", "password": "contrasena_api" }))
                .send()
                .await?
                .json()
                .await?;

            assert_eq!(body["key"], json!("otra-key"));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn login_does_not_need_key() -> Result<()> {
    colabora_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client
                .post("/api/login")
                .json(&json!({ "username": "nadie", "password": "nada", "key": "api-key-incorrecto" }))
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::OK);

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn login_without_password_is_bad_request() -> Result<()> {
    colabora_test(
        |_| (),
        |TestingTools {
             test_client,
             mut metrics_watcher,
             ..
         }| async move {
            let response = test_client
                .post("/api/login")
                .json(&json!({ "username": "usuario_api" }))
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(
                response
                    .headers()
                    .get("content-type")
                    .and_then(|v| v.to_str().ok()),
                Some("application/json")
            );
            let body: Value = response.json().await?;
            let error = body["error"].as_str().expect("error should be a string");
            assert!(error.starts_with("Malformed body: "), "got {:?}", error);
            assert!(error.contains("password"), "got {:?}", error);
            assert!(!metrics_watcher.has_incr("login.granted"));
            assert!(!metrics_watcher.has_incr("login.denied"));

            Ok(())
        },
    )
    .await
}
