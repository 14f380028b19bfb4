// Only overview documentation that is not relevant to one of the more specific
// crates should go here.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! A key-authenticated web API to track legislative initiatives.
//!
//! Colabora is split into several subcrates that work in collaboration.
//!
//! - [colabora-integration-tests](../colabora_integration_tests/index.html)
//! - [colabora-settings](../colabora_settings/index.html)
//! - [colabora-store](../colabora_store/index.html)
//! - [colabora-web](../colabora_web/index.html)

mod docs;

use anyhow::{Context, Result};
use cadence::{QueuingMetricSink, StatsdClient, UdpMetricSink};
use colabora_settings::{LogFormat, Settings};
use std::net::{TcpListener, UdpSocket};
use tracing_log::LogTracer;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

/// Primary entry point
#[actix_rt::main]
async fn main() -> Result<()> {
    let settings = colabora_settings::Settings::load().context("Loading settings")?;
    init_logging(&settings).context("Initializing logging")?;
    let metrics_client = init_metrics(&settings).context("Initializing metrics")?;
    let listener = TcpListener::bind(settings.http.listen).context("Binding port")?;

    tracing::info!(
        r#type = "app.starting",
        env = %settings.env,
        listen = %settings.http.listen,
        "Starting colabora"
    );

    colabora_web::run(listener, metrics_client, settings)
        .context("Starting colabora-web server")?
        .await
        .context("Running colabora-web server")?;

    Ok(())
}

/// Set up logging for Colabora, based on settings and the `RUST_LOG` environment variable.
fn init_logging(settings: &Settings) -> Result<()> {
    LogTracer::init()?;
    let env_filter: EnvFilter = (&settings.logging.levels).into();
    let registry = tracing_subscriber::registry().with(env_filter);

    match settings.logging.format {
        LogFormat::Pretty => tracing::subscriber::set_global_default(
            registry.with(tracing_subscriber::fmt::layer().pretty()),
        )?,
        LogFormat::Compact => tracing::subscriber::set_global_default(
            registry.with(tracing_subscriber::fmt::layer().compact()),
        )?,
        LogFormat::Json => tracing::subscriber::set_global_default(
            registry.with(tracing_subscriber::fmt::layer().json().flatten_event(true)),
        )?,
    };

    Ok(())
}

/// Build a statsd client that sends to the configured sink without blocking
/// request handling.
fn init_metrics(settings: &Settings) -> Result<StatsdClient> {
    let socket = UdpSocket::bind("0.0.0.0:0").context("Binding metrics socket")?;
    socket.set_nonblocking(true)?;
    let udp_sink = UdpMetricSink::from(settings.metrics.sink_address(), socket)
        .context("Connecting to metrics sink")?;
    let sink = QueuingMetricSink::with_capacity(udp_sink, settings.metrics.max_queue_size);
    Ok(StatsdClient::from_sink("colabora", sink))
}
