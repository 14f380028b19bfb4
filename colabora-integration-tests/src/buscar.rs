//! Tests for the topic search page.
#![cfg(test)]

use crate::{colabora_test, TestingTools, TEST_API_KEY};
use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[actix_rt::test]
async fn search_without_input_lists_everything() -> Result<()> {
    colabora_test(
        |_| (),
        |TestingTools {
             test_client,
             mut metrics_watcher,
             ..
         }| async move {
            let response = test_client
                .post("/api/buscar")
                .json(&json!({ "tema": "", "key": TEST_API_KEY }))
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                response
                    .headers()
                    .get("content-type")
                    .and_then(|v| v.to_str().ok()),
                Some("text/html; charset=utf-8")
            );
            let page = response.text().await?;
            assert!(page.contains("<td>tema1</td>"));
            assert!(page.contains("<td>tema2</td>"));
            assert!(page.contains("<td>tema3</td>"));
            assert!(metrics_watcher.has_histogram("search.results", 3.0));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn search_with_input() -> Result<()> {
    colabora_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client
                .post("/api/buscar")
                .json(&json!({ "tema": "1", "key": TEST_API_KEY }))
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::OK);
            let page = response.text().await?;
            assert!(page.contains("<td>tema1</td>"));
            assert!(!page.contains("<td>tema2</td>"));
            assert!(!page.contains("<td>tema3</td>"));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn search_without_results() -> Result<()> {
    colabora_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client
                .post("/api/buscar")
                .json(&json!({ "tema": "tema4", "key": TEST_API_KEY }))
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::OK);
            let page = response.text().await?;
            assert!(!page.contains("<td>tema1</td>"));
            assert!(!page.contains("<td>tema3</td>"));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn search_is_case_sensitive_by_default() -> Result<()> {
    colabora_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let page = test_client
                .post("/api/buscar")
                .json(&json!({ "tema": "TEMA1", "key": TEST_API_KEY }))
                .send()
                .await?
                .text()
                .await?;

            assert!(!page.contains("<td>tema1</td>"));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn search_case_insensitive_when_configured() -> Result<()> {
    colabora_test(
        |settings| settings.search.case_sensitive = false,
        |TestingTools { test_client, .. }| async move {
            let page = test_client
                .post("/api/buscar")
                .json(&json!({ "tema": "TEMA1", "key": TEST_API_KEY }))
                .send()
                .await?
                .text()
                .await?;

            assert!(page.contains("<td>tema1</td>"));
            assert!(!page.contains("<td>tema3</td>"));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn search_sees_created_initiatives() -> Result<()> {
    colabora_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            test_client
                .post("/api/iniciativa")
                .json(&json!({
                    "entidad": "entidad3",
                    "legislatura": "legislatura2",
                    "numero": 1,
                    "tema": "salud",
                    "cambios": "cambios",
                    "documento": "documento",
                    "key": TEST_API_KEY,
                }))
                .send()
                .await?;

            let page = test_client
                .post("/api/buscar")
                .json(&json!({ "tema": "salud", "key": TEST_API_KEY }))
                .send()
                .await?
                .text()
                .await?;

            assert!(page.contains("<td>salud</td>"));
            assert!(!page.contains("<td>tema1</td>"));

            Ok(())
        },
    )
    .await
}
