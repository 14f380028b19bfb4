//! Tests that Colabora conforms to [Dockerflow](https://github.com/mozilla-services/dockerflow).
#![cfg(test)]

use crate::{colabora_test, TestingTools};
use anyhow::Result;
use reqwest::StatusCode;
use serde::Deserialize;

#[actix_rt::test]
async fn lbheartbeat_works() -> Result<()> {
    colabora_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/__lbheartbeat__").send().await?;

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.content_length(), Some(0));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn heartbeat_works() -> Result<()> {
    colabora_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/__heartbeat__").send().await?;

            assert!(response.status().is_success());
            assert_eq!(
                response
                    .headers()
                    .get_all("content-type")
                    .iter()
                    .collect::<Vec<_>>(),
                vec!["application/json"]
            );

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn version_works() -> Result<()> {
    colabora_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/__version__").send().await?;

            assert!(response.status().is_success());

            #[derive(Deserialize, Debug)]
            #[allow(dead_code)]
            struct VersionInfo {
                source: String,
                version: String,
                commit: String,
                build: String,
            }
            let body: Result<VersionInfo, _> = response.json().await;
            assert!(body.is_ok());

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn root_redirects_to_documentation() -> Result<()> {
    colabora_test(
        |settings| settings.public_documentation = Some("https://example.com/docs".to_string()),
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/").send().await?;

            assert_eq!(response.status(), StatusCode::FOUND);
            assert_eq!(
                response.headers().get("location").and_then(|v| v.to_str().ok()),
                Some("https://example.com/docs")
            );

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn health_checks_do_not_need_key() -> Result<()> {
    colabora_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/__heartbeat__").send().await?;
            assert_eq!(response.status(), StatusCode::OK);

            Ok(())
        },
    )
    .await
}
