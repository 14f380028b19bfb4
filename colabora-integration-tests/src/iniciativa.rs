//! Tests for listing, creating, updating and removing initiatives.
#![cfg(test)]

use crate::{colabora_test, TestReqwestClient, TestingTools, TEST_API_KEY};
use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

const PATH: &str = "/api/iniciativa";

/// List the initiatives of `entidad1`/`legislatura1`.
async fn list_numbers(test_client: &TestReqwestClient) -> Result<Vec<i64>> {
    let body: Value = test_client
        .get(PATH)
        .json(&json!({
            "entidad": "entidad1",
            "legislatura": "legislatura1",
            "key": TEST_API_KEY,
        }))
        .send()
        .await?
        .json()
        .await?;

    Ok(body["result"]
        .as_array()
        .expect("result should be a list")
        .iter()
        .filter_map(|initiative| initiative["numero"].as_i64())
        .collect())
}

#[actix_rt::test]
async fn list_works() -> Result<()> {
    colabora_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client
                .get(PATH)
                .json(&json!({
                    "entidad": "entidad1",
                    "legislatura": "legislatura1",
                    "key": TEST_API_KEY,
                }))
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::OK);
            let body: Value = response.json().await?;
            assert_eq!(body["result"].as_array().map(Vec::len), Some(2));
            assert_eq!(
                body["result"][0],
                json!({
                    "entidad": "entidad1",
                    "legislatura": "legislatura1",
                    "numero": 1,
                    "tema": "tema1",
                    "cambios": "cambios1",
                    "documento": "documento1",
                })
            );

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn list_without_key_is_forbidden() -> Result<()> {
    colabora_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client
                .get(PATH)
                .json(&json!({ "entidad": "entidad1", "legislatura": "legislatura1" }))
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::FORBIDDEN);

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn create_without_key_is_forbidden() -> Result<()> {
    colabora_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client
                .post(PATH)
                .json(&json!({
                    "entidad": "entidad1",
                    "legislatura": "legislatura1",
                    "numero": 4,
                    "cambios": "cambios4",
                    "documento": "documento4",
                }))
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::FORBIDDEN);
            assert_eq!(list_numbers(&test_client).await?, vec![1, 3]);

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn create_ok() -> Result<()> {
    colabora_test(
        |_| (),
        |TestingTools {
             test_client,
             mut metrics_watcher,
             ..
         }| async move {
            let response = test_client
                .post(PATH)
                .json(&json!({
                    "entidad": "entidad1",
                    "legislatura": "legislatura1",
                    "numero": 4,
                    "cambios": "cambios4",
                    "documento": "documento4",
                    "key": TEST_API_KEY,
                }))
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::OK);
            let body: Value = response.json().await?;
            assert_eq!(body, json!({ "result": "ok: iniciativa 4 creada" }));
            assert_eq!(list_numbers(&test_client).await?, vec![1, 3, 4]);
            assert!(metrics_watcher.has_incr("initiative.create.ok"));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn create_error() -> Result<()> {
    colabora_test(
        |_| (),
        |TestingTools {
             test_client,
             mut metrics_watcher,
             ..
         }| async move {
            let response = test_client
                .post(PATH)
                .json(&json!({
                    "entidad": "entidad1",
                    "legislatura": "legislatura1",
                    "numero": 3,
                    "cambios": "cambios3",
                    "documento": "documento3",
                    "key": TEST_API_KEY,
                }))
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::OK);
            let body: Value = response.json().await?;
            assert_eq!(body, json!({ "result": "error: iniciativa 3 no creada" }));
            assert!(metrics_watcher.has_incr("initiative.create.error"));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn update_without_key_is_forbidden() -> Result<()> {
    colabora_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client
                .patch(PATH)
                .json(&json!({
                    "entidad": "entidad1",
                    "legislatura": "legislatura1",
                    "numero": 3,
                    "cambios": "cambios33",
                    "documento": "documento33",
                }))
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::FORBIDDEN);

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn update_ok() -> Result<()> {
    colabora_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client
                .patch(PATH)
                .json(&json!({
                    "entidad": "entidad1",
                    "legislatura": "legislatura1",
                    "numero": 3,
                    "cambios": "cambios33",
                    "documento": "documento33",
                    "key": TEST_API_KEY,
                }))
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::OK);
            let body: Value = response.json().await?;
            assert_eq!(body, json!({ "result": "ok: iniciativa 3 actualizada" }));

            let listed: Value = test_client
                .get(PATH)
                .json(&json!({
                    "entidad": "entidad1",
                    "legislatura": "legislatura1",
                    "key": TEST_API_KEY,
                }))
                .send()
                .await?
                .json()
                .await?;
            let updated = &listed["result"][1];
            assert_eq!(updated["numero"], json!(3));
            assert_eq!(updated["cambios"], json!("cambios33"));
            assert_eq!(updated["documento"], json!("documento33"));
            assert_eq!(updated["tema"], json!("tema3"));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn update_error() -> Result<()> {
    colabora_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client
                .patch(PATH)
                .json(&json!({
                    "entidad": "entidad1",
                    "legislatura": "legislatura1",
                    "numero": 2,
                    "cambios": "cambios22",
                    "documento": "documento22",
                    "key": TEST_API_KEY,
                }))
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::OK);
            let body: Value = response.json().await?;
            assert_eq!(body, json!({ "result": "error: iniciativa 2 no actualizada" }));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn remove_without_key_is_forbidden() -> Result<()> {
    colabora_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client
                .delete(PATH)
                .json(&json!({
                    "entidad": "entidad1",
                    "legislatura": "legislatura1",
                    "numero": 3,
                    "cambios": "cambios33",
                    "documento": "documento33",
                }))
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::FORBIDDEN);
            assert_eq!(list_numbers(&test_client).await?, vec![1, 3]);

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn remove_ok() -> Result<()> {
    colabora_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client
                .delete(PATH)
                .json(&json!({
                    "entidad": "entidad1",
                    "legislatura": "legislatura1",
                    "numero": 3,
                    "cambios": "cambios33",
                    "documento": "documento33",
                    "key": TEST_API_KEY,
                }))
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::OK);
            let body: Value = response.json().await?;
            assert_eq!(body, json!({ "result": "ok: iniciativa 3 removida" }));
            assert_eq!(list_numbers(&test_client).await?, vec![1]);

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn remove_error() -> Result<()> {
    colabora_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client
                .delete(PATH)
                .json(&json!({
                    "entidad": "entidad1",
                    "legislatura": "legislatura1",
                    "numero": 2,
                    "cambios": "cambios22",
                    "documento": "documento22",
                    "key": TEST_API_KEY,
                }))
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::OK);
            let body: Value = response.json().await?;
            assert_eq!(body, json!({ "result": "error: iniciativa 2 no removida" }));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn create_then_remove_restores_listing() -> Result<()> {
    colabora_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let before = list_numbers(&test_client).await?;
            let initiative = json!({
                "entidad": "entidad1",
                "legislatura": "legislatura1",
                "numero": 9,
                "tema": "tema9",
                "cambios": "cambios9",
                "documento": "documento9",
                "key": TEST_API_KEY,
            });

            let created: Value = test_client.post(PATH).json(&initiative).send().await?.json().await?;
            assert_eq!(created, json!({ "result": "ok: iniciativa 9 creada" }));
            let again: Value = test_client.post(PATH).json(&initiative).send().await?.json().await?;
            assert_eq!(again, json!({ "result": "error: iniciativa 9 no creada" }));
            assert_eq!(list_numbers(&test_client).await?.len(), before.len() + 1);

            let removed: Value = test_client.delete(PATH).json(&initiative).send().await?.json().await?;
            assert_eq!(removed, json!({ "result": "ok: iniciativa 9 removida" }));
            let again: Value = test_client.delete(PATH).json(&initiative).send().await?.json().await?;
            assert_eq!(again, json!({ "result": "error: iniciativa 9 no removida" }));
            assert_eq!(list_numbers(&test_client).await?, before);

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn authorized_request_missing_fields_is_bad_request() -> Result<()> {
    colabora_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client
                .post(PATH)
                .json(&json!({ "entidad": "entidad1", "key": TEST_API_KEY }))
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);

            Ok(())
        },
    )
    .await
}
