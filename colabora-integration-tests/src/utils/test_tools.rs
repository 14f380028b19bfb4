//! Tools for running tests

use crate::utils::metrics::MetricsWatcher;
use colabora_settings::Settings;
use reqwest::{redirect, Client, ClientBuilder, RequestBuilder};
use std::{future::Future, net::TcpListener};
use tracing_futures::Instrument;
use tracing_subscriber::layer::SubscriberExt;

/// The API key configured for tests in `config/base.yaml`.
pub const TEST_API_KEY: &str = "api-key-cambiar";

/// Run a test with a fully configured Colabora server.
///
/// The server will listen on a port assigned arbitrarily by the OS, and starts
/// with the initiatives in `config/fixtures/test.yaml`. Every call gets its
/// own server, so tests may change the store freely.
///
/// A suite of tools will be passed to the test function in the form of an
/// instance of [`TestingTools`]. It includes an HTTP client configured to use
/// the test server and a collector for the metrics the server sends.
///
/// # Example
///
/// ```
/// # use colabora_integration_tests::{colabora_test, TestingTools};
/// #[actix_rt::test]
/// async fn a_test() {
///     colabora_test(
///         |settings| settings.search.case_sensitive = false,
///         |TestingTools { test_client, .. }| async move {
///             assert!(true) // Test goes here
///         }
///     ).await
/// }
/// ```
///
/// # Panics
/// May panic if tests could not be set up correctly.
pub async fn colabora_test<FSettings, FTest, Fut>(
    settings_changer: FSettings,
    test: FTest,
) -> Fut::Output
where
    FSettings: FnOnce(&mut Settings),
    FTest: FnOnce(TestingTools) -> Fut,
    Fut: Future,
{
    let test_span = tracing::info_span!("colabora_test");

    // Load settings
    let settings = Settings::load_for_tests(settings_changer);

    // Send logs from the test thread to the test output.
    let env_filter: tracing_subscriber::EnvFilter = (&settings.logging.levels).into();
    let tracing_subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().pretty().with_test_writer());
    let _tracing_subscriber_guard = tracing::subscriber::set_default(tracing_subscriber);

    // Setup metrics
    let (metrics_watcher, metrics_client) = MetricsWatcher::new_with_client();

    // Run server in the background
    let listener = TcpListener::bind(settings.http.listen).expect("Failed to bind to a port");
    let address = listener.local_addr().unwrap().to_string();
    let server =
        colabora_web::run(listener, metrics_client, settings).expect("Failed to start server");
    let server_handle = server.handle();
    tokio::spawn(server);
    let test_client = TestReqwestClient::new(address);

    // Assemble the tools
    let tools = TestingTools {
        test_client,
        metrics_watcher,
    };

    // Run the test
    let rv = test(tools).instrument(test_span).await;
    server_handle.stop(false).await;
    rv
}

/// A set of tools for tests.
///
/// The fields of this struct are marked as non-exhaustive, meaning that any
/// destructuring of this struct will require a `..` "and the rest" entry, even
/// if all present items are named. This makes adding tools in the future easier,
/// since old tests won't need to be rewritten to account for the added tools.
#[non_exhaustive]
pub struct TestingTools {
    /// A wrapper around a `reqwest::client` that automatically uses the
    /// Colabora server under test.
    pub test_client: TestReqwestClient,

    /// To make assertions about metrics.
    pub metrics_watcher: MetricsWatcher,
}

/// A wrapper around a `[reqwest::client]` that automatically sends requests to
/// the test server.
///
/// The client is configured to not follow any redirects.
pub struct TestReqwestClient {
    /// The wrapped client.
    client: Client,

    /// The server address to implicitly use for all requests.
    address: String,
}

impl TestReqwestClient {
    /// Construct a new test client that uses `address` for every request given.
    pub fn new(address: String) -> Self {
        let client = ClientBuilder::new()
            .redirect(redirect::Policy::none())
            .build()
            .expect("Could not build test client");
        Self { client, address }
    }

    /// The full URL of `path` on the test server.
    ///
    /// The path should start with `/`, such as `/__heartbeat__`.
    fn url(&self, path: &str) -> String {
        assert!(path.starts_with('/'));
        format!("http://{}{}", &self.address, path)
    }

    /// Start building a GET request to the test server with the path specified.
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    /// Start building a POST request to the test server with the path specified.
    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    /// Start building a PATCH request to the test server with the path specified.
    pub fn patch(&self, path: &str) -> RequestBuilder {
        self.client.patch(self.url(path))
    }

    /// Start building a DELETE request to the test server with the path specified.
    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(self.url(path))
    }
}
