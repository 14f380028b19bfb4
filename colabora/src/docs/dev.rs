//! # Developer documentation for working on Colabora
//!
//! ## tl;dr
//!
//! Run the main app
//! ```shell
//! $ cargo run -p colabora
//! ```
//!
//! Run specific tests for one crate
//! ```shell
//! $ cargo test -p colabora-integration-tests -- iniciativa
//! ```
//!
//! ## Local configuration
//!
//! The default configuration is development, which has human-oriented logging
//! and debugging enabled. Settings are layered as described in
//! [`colabora_settings`].
//!
//! The API key and login credentials in `config/base.yaml` are placeholders.
//! Deployments must replace them, either in `config/local.yaml` (which is not
//! checked in) or through the environment:
//!
//! ```shell
//! $ COLABORA_AUTH__API_KEY=... COLABORA_AUTH__PASSWORD=... cargo run -p colabora
//! ```
//!
//! To start with some initiatives, point `store.fixtures` at a YAML or JSON
//! file holding a list of them. `config/fixtures/test.yaml` is an example.
