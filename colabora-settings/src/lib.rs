//! # Colabora Settings
//!
//! Configuration is specified in several ways, with later methods overriding earlier ones.
//!
//! 1. A base configuration checked into the repository, in `config/base.yaml`.
//!    This provides the default values for most settings.
//! 2. Per-environment configuration files in the `config` directory. The
//!    environment is selected using the environment variable `COLABORA_ENV`.
//!    The settings for that environment are then loaded from
//!    `config/${env}.yaml`, if it exists. The default environment is
//!    "development".
//! 3. A local configuration file not checked into the repository, at
//!    `config/local.yaml`. This is the place for the deployment's API key and
//!    login credentials.
//! 4. Environment variables that begin with `COLABORA_` and use `__` as a level
//!    separator. For example, `Settings::auth::api_key` can be controlled from
//!    the environment variable `COLABORA_AUTH__API_KEY`.
//!
//! Tests should use `Settings::load_for_tests` which only reads from
//! `config/base.yaml`, `config/test.yaml`, and `config/local_test.yaml` (if it
//! exists). It does not read from environment variables.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

mod logging;

pub use logging::{DirectiveWrapper, LogFormat, LoggingSettings};

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};

/// The API key in `config/base.yaml`, only fit for development and tests.
const PLACEHOLDER_API_KEY: &str = "api-key-cambiar";

/// The login password in `config/base.yaml`.
const PLACEHOLDER_PASSWORD: &str = "contrasena_api";

/// Top level settings object for Colabora.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    /// The environment Colabora is running in. Should only be set with the
    /// `COLABORA_ENV` environment variable.
    pub env: String,

    /// Enable additional features to debug the application. This should not be
    /// set to true in production environments.
    pub debug: bool,

    /// A URL to redirect visitors of `/` to. If unset, a short plain text
    /// description is served instead.
    pub public_documentation: Option<String>,

    /// Settings for the HTTP server.
    pub http: HttpSettings,

    /// The shared secret and the login credentials that hand it out.
    pub auth: AuthSettings,

    /// Settings for the topic search.
    pub search: SearchSettings,

    /// Settings for the initiative store.
    pub store: StoreSettings,

    /// Logging settings.
    pub logging: LoggingSettings,

    /// Metrics settings.
    pub metrics: MetricsSettings,
}

/// Settings for the HTTP server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpSettings {
    /// The host and port to listen on, such as "127.0.0.1:8080" or "0.0.0.0:80".
    pub listen: SocketAddr,

    /// The number of workers to use. Optional. If no value is provided, the
    /// number of logical cores will be used.
    pub workers: Option<usize>,
}

/// Settings for the API key gate and the login endpoint.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// The single API key accepted by every guarded endpoint. It lives as
    /// long as the server does; rotating it means restarting.
    pub api_key: String,

    /// The user name accepted by the login endpoint.
    pub username: String,

    /// The password accepted by the login endpoint.
    pub password: String,
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("api_key", &"<redacted>")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Settings for the topic search.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Whether `tema` matching distinguishes upper and lower case.
    pub case_sensitive: bool,
}

/// Settings for the initiative store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreSettings {
    /// A YAML or JSON file with initiatives to load at startup. If not set,
    /// the store starts empty.
    pub fixtures: Option<PathBuf>,
}

/// Settings for the statsd metrics sink.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MetricsSettings {
    /// The host to send metrics to.
    pub sink_host: String,

    /// The port to send metrics to.
    pub sink_port: u16,

    /// The maximum number of metrics to buffer before dropping new ones.
    pub max_queue_size: usize,
}

impl MetricsSettings {
    /// The `host:port` pair of the statsd sink.
    pub fn sink_address(&self) -> String {
        format!("{}:{}", self.sink_host, self.sink_port)
    }
}

impl Settings {
    /// Load settings from configuration files and environment variables.
    ///
    /// # Errors
    /// If any of the configured values are invalid, or if any of the required
    /// configuration files are missing.
    pub fn load() -> Result<Self, ConfigError> {
        let colabora_env =
            std::env::var("COLABORA_ENV").unwrap_or_else(|_| "development".to_string());

        let settings: Self = Config::builder()
            // Start off with the base config.
            .add_source(File::with_name("./config/base"))
            // Merge in an environment specific config.
            .add_source(File::with_name(&format!("config/{}", colabora_env)).required(false))
            // Add a local configuration file that is `.gitignore`ed.
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables that start with "COLABORA_" and have
            // "__" to separate levels. For example, `COLABORA_HTTP__LISTEN`
            // maps to `Settings::http::listen`.
            .add_source(
                Environment::with_prefix("COLABORA")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override("env", colabora_env.as_str())?
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from configuration files for tests.
    ///
    /// `changer` is called with the loaded settings, and can modify them
    /// before they are returned.
    ///
    /// # Panics
    /// If the test configuration cannot be loaded.
    pub fn load_for_tests<F: FnOnce(&mut Self)>(changer: F) -> Self {
        let root = workspace_root();

        let mut settings: Self = Config::builder()
            .add_source(File::from(root.join("config/base")))
            .add_source(File::from(root.join("config/test")))
            .add_source(File::from(root.join("config/local_test")).required(false))
            .set_override("env", "test")
            .expect("Could not set env for tests")
            .build()
            .expect("Could not load settings for tests")
            .try_deserialize()
            .expect("Could not convert settings");

        // Test fixtures are named relative to the workspace, but tests run
        // from the directory of each crate.
        if let Some(fixtures) = settings.store.fixtures.as_mut() {
            if fixtures.is_relative() {
                *fixtures = root.join(&fixtures);
            }
        }

        changer(&mut settings);
        settings
    }

    /// Check constraints the config crate cannot express.
    ///
    /// Production must not run with the credentials checked into
    /// `config/base.yaml`.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.api_key.is_empty() {
            return Err(ConfigError::Message(
                "auth.api_key must not be empty".to_string(),
            ));
        }
        if self.env == "production" {
            if self.auth.api_key == PLACEHOLDER_API_KEY {
                return Err(ConfigError::Message(
                    "auth.api_key must be replaced in production".to_string(),
                ));
            }
            if self.auth.password == PLACEHOLDER_PASSWORD {
                return Err(ConfigError::Message(
                    "auth.password must be replaced in production".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// The root of the cargo workspace, where `config/` lives.
fn workspace_root() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/.."))
}

#[cfg(test)]
mod tests {
    use super::Settings;

    #[test]
    fn test_settings_load() {
        let settings = Settings::load_for_tests(|_| ());
        assert_eq!(settings.env, "test");
        assert!(!settings.auth.api_key.is_empty());
        assert!(settings.search.case_sensitive);
    }

    #[test]
    fn test_fixtures_resolve_from_workspace() {
        let settings = Settings::load_for_tests(|_| ());
        let fixtures = settings.store.fixtures.expect("test config names fixtures");
        assert!(fixtures.is_absolute() || fixtures.starts_with(super::workspace_root()));
        assert!(fixtures.exists(), "missing {:?}", fixtures);
    }

    #[test]
    fn test_changer_applies() {
        let settings = Settings::load_for_tests(|s| s.search.case_sensitive = false);
        assert!(!settings.search.case_sensitive);
    }

    #[test]
    fn test_empty_api_key_is_rejected() {
        let settings = Settings::load_for_tests(|s| s.auth.api_key = String::new());
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_placeholder_credentials_allowed_outside_production() {
        let settings = Settings::load_for_tests(|_| ());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_placeholder_api_key_rejected_in_production() {
        let settings = Settings::load_for_tests(|s| {
            s.env = "production".to_string();
            s.auth.password = "otra_contrasena".to_string();
        });
        let error = settings.validate().expect_err("placeholder key in production");
        assert!(error.to_string().contains("auth.api_key"));
    }

    #[test]
    fn test_placeholder_password_rejected_in_production() {
        let settings = Settings::load_for_tests(|s| {
            s.env = "production".to_string();
            s.auth.api_key = "una-clave-real".to_string();
        });
        let error = settings.validate().expect_err("placeholder password in production");
        assert!(error.to_string().contains("auth.password"));
    }

    #[test]
    fn test_replaced_credentials_accepted_in_production() {
        let settings = Settings::load_for_tests(|s| {
            s.env = "production".to_string();
            s.auth.api_key = "una-clave-real".to_string();
            s.auth.password = "otra_contrasena".to_string();
        });
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_auth_debug_hides_secrets() {
        let settings = Settings::load_for_tests(|_| ());
        let printed = format!("{:?}", settings.auth);
        assert!(!printed.contains(&settings.auth.api_key));
        assert!(!printed.contains(&settings.auth.password));
    }
}
