use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::{ops::AddAssign, str::FromStr};
use tracing_subscriber::{filter::Directive, EnvFilter};

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// The minimum level that logs should be reported at.
    ///
    /// Each entry can be one of `ERROR`, `WARN`, `INFO`, `DEBUG`, or `TRACE` (in
    /// increasing verbosity), with an optional component that specifies the
    /// source of the logs.
    ///
    /// The contents of the environment variable `RUST_LOG` are appended to
    /// these, so they take precedence over the config file.
    ///
    /// # Examples
    ///
    /// The configurations below are identical
    ///
    /// ```yaml
    /// # config/local.yaml
    /// logging:
    ///   levels:
    ///     - INFO                # default to INFO
    ///     - colabora_web=DEBUG  # noisier logs from colabora_web
    /// ```
    ///
    /// ```shell
    /// RUST_LOG=INFO,colabora_web=DEBUG
    /// ```
    pub levels: DirectiveWrapper,

    /// The format to output logs in.
    pub format: LogFormat,
}

/// Output formats for log events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// [`tracing-subscriber`]'s human targeted, pretty format. Includes more
    /// information, Multiple lines per log event.
    Pretty,

    /// Newline delimited JSON. One line per log event.
    Json,

    /// [`tracing-subscriber`]'s default format. One line per log event.
    Compact,
}

/// A list of `tracing` filter directives, such as `INFO` or
/// `colabora_web=DEBUG`.
///
/// `Directive` itself can't be cloned or serialized, so the directives are
/// kept as validated strings. Config files give a list, environment variables
/// a single comma separated string; both are accepted. Directives from
/// `RUST_LOG` are appended after the configured ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDirectives", into = "Vec<String>")]
pub struct DirectiveWrapper(Vec<String>);

/// The shapes directives can be written in.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawDirectives {
    /// `"INFO,colabora_web=DEBUG"`
    Joined(String),
    /// `["INFO", "colabora_web=DEBUG"]`
    Listed(Vec<String>),
}

impl TryFrom<RawDirectives> for DirectiveWrapper {
    type Error = anyhow::Error;

    fn try_from(raw: RawDirectives) -> Result<Self, Self::Error> {
        let mut directives = match raw {
            RawDirectives::Joined(joined) => joined.parse()?,
            RawDirectives::Listed(listed) => {
                let mut directives = Self(Vec::new());
                for entry in listed {
                    directives += entry.parse()?;
                }
                directives
            }
        };

        match std::env::var("RUST_LOG") {
            Ok(rust_log) if !rust_log.is_empty() => {
                directives += rust_log.parse().context("RUST_LOG")?;
            }
            _ => {}
        }

        Ok(directives)
    }
}

impl From<DirectiveWrapper> for Vec<String> {
    fn from(directives: DirectiveWrapper) -> Self {
        directives.0
    }
}

impl FromStr for DirectiveWrapper {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .map(|part| {
                // Targets are module paths, which are spelled with underscores.
                if part.contains('-') {
                    bail!("log directive {:?} names a target with a hyphen", part);
                }
                part.parse::<Directive>()
                    .with_context(|| format!("invalid log directive {:?}", part))?;
                Ok(part.to_string())
            })
            .collect::<Result<_, _>>()
            .map(Self)
    }
}

impl AddAssign for DirectiveWrapper {
    fn add_assign(&mut self, rhs: Self) {
        self.0.extend(rhs.0)
    }
}

impl From<&DirectiveWrapper> for EnvFilter {
    fn from(directives: &DirectiveWrapper) -> Self {
        directives
            .0
            .iter()
            .filter_map(|directive| directive.parse::<Directive>().ok())
            .fold(EnvFilter::default(), EnvFilter::add_directive)
    }
}

#[cfg(test)]
mod tests {
    use super::{DirectiveWrapper, LogFormat};
    use parameterized::parameterized;

    #[parameterized(input = { "INFO", "colabora_web=DEBUG", "WARN,colabora_store=TRACE" })]
    fn test_valid_directives(input: &str) {
        assert!(input.parse::<DirectiveWrapper>().is_ok());
    }

    #[test]
    fn test_hyphenated_targets_rejected() {
        assert!("colabora-web=DEBUG".parse::<DirectiveWrapper>().is_err());
    }

    #[test]
    fn test_deserialize_from_list() {
        let wrapper: DirectiveWrapper =
            serde_json::from_value(serde_json::json!(["INFO", "colabora_web=DEBUG"]))
                .expect("list of directives should deserialize");
        let expected: DirectiveWrapper = "INFO,colabora_web=DEBUG".parse().unwrap();
        // RUST_LOG may add entries at the end.
        assert!(wrapper.0.starts_with(&expected.0));
    }

    #[test]
    fn test_deserialize_from_joined_string() {
        let wrapper: DirectiveWrapper =
            serde_json::from_value(serde_json::json!("WARN, colabora_store=TRACE"))
                .expect("joined directives should deserialize");
        assert!(wrapper.0.starts_with(&["WARN".to_string(), "colabora_store=TRACE".to_string()]));
    }

    #[test]
    fn test_deserialize_rejects_bad_directive() {
        let result: Result<DirectiveWrapper, _> =
            serde_json::from_value(serde_json::json!(["INFO", "colabora-web=DEBUG"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_log_format_names() {
        let format: LogFormat = serde_json::from_value(serde_json::json!("json")).unwrap();
        assert_eq!(format, LogFormat::Json);
    }
}
