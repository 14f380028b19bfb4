#![warn(missing_docs, clippy::missing_docs_in_private_items)]
// None of the tests are seen by the linter, so none of the utilities are marked
// as used. But docs don't generate for the below if they are `#[cfg(test)]`.
// This is a compromise.
#![allow(dead_code)]

//! Tests for Colabora that work by reading from the external API only.
//!
//! Since the URL endpoints Colabora exposes to the world are its public API,
//! and clients depend on them, the paths and bodies used in tests here are
//! important details, and used to keep compatibility.
//!
//! This is structured as a separate crate so that it produces a single test
//! binary instead of one test per file like would happen if this were
//! `colabora/tests/...`.
//!
//! The primary tool used by tests is [`colabora_test`], which starts a server
//! loaded with the test fixtures and provides helpers to talk to it and to
//! inspect the metrics it sends. It then calls the test function that is
//! passed to it, providing those tools as an argument.
//!
//! ```
//! use colabora_integration_tests::{colabora_test, TestingTools};
//! use reqwest::StatusCode;
//!
//! #[actix_rt::test]
//! async fn lbheartbeat_works() {
//!     colabora_test(
//!         |_| (),
//!         |TestingTools { test_client, .. }| async move {
//!             let response = test_client
//!                 .get("/__lbheartbeat__")
//!                 .send()
//!                 .await
//!                 .expect("failed to execute request");
//!
//!             assert_eq!(response.status(), StatusCode::OK);
//!         },
//!     )
//!     .await
//! }
//! ```

mod auth;
mod buscar;
mod dockerflow;
mod iniciativa;
mod login;
mod utils;

pub use crate::utils::{
    metrics::MetricsWatcher,
    test_tools::{colabora_test, TestReqwestClient, TestingTools, TEST_API_KEY},
};
