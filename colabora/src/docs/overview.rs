//! # High level overview of Colabora
//!
//! This project is structured as a [Cargo Workspace][] that contains one crate
//! for each broad area of behavior. Each crate can be compiled and tested on
//! its own or together with the rest.
//!
//! [Cargo Workspace]: https://doc.rust-lang.org/book/ch14-03-cargo-workspaces.html
//!
//! ## [`colabora`](../)
//!
//! The binary. It loads settings, sets up logging and metrics, and runs the
//! web server.
//!
//! ## [`colabora-settings`](../../colabora_settings/index.html)
//!
//! Defines and documents the settings of the application, including the API
//! key and the login credentials.
//!
//! ## [`colabora-store`](../../colabora_store/index.html)
//!
//! The initiative model, the `InitiativeRepository` trait with its in-memory
//! implementation, and the topic search.
//!
//! ## [`colabora-web`](../../colabora_web/index.html)
//!
//! The HTTP API: the key gate, login, the initiative endpoints, the search
//! page, and health checks.
//!
//! ## [`colabora-integration-tests`](../../colabora_integration_tests/index.html)
//!
//! Tests that start the whole server and talk to it over HTTP.
