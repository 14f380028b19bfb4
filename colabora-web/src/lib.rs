#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! Web server for [Colabora](../colabora/index.html)'s API.
//!
//! Every endpoint except login and the health checks requires the
//! deployment's API key in the `key` field of its JSON body. Requests without
//! it get `403 Forbidden`. Authorized requests always get `200 OK`, with the
//! business outcome carried in the body.

mod auth;
mod dockerflow;
mod endpoints;
mod errors;
mod html;
mod keys;
mod logging;
mod login;
mod middleware;

pub use crate::auth::{AuthFailure, AuthGate, Keyed, KEY_FIELD};
pub use crate::errors::{HandlerError, HandlerErrorKind};
pub use crate::html::render_listing;
pub use crate::keys::{ApiKey, KeyStore};
pub use crate::login::{LoginResult, LoginService};

use std::{net::TcpListener, sync::Arc};

use actix_cors::Cors;
use actix_web::{
    dev::Server,
    get,
    web::{self, Data},
    App, HttpResponse, HttpServer,
};
use anyhow::{Context, Result};
use cadence::StatsdClient;
use colabora_settings::Settings;
use colabora_store::{InitiativeRepository, MemoryRepository, TopicMatcher, TopicSearch};
use tracing_actix_web::TracingLogger;

use crate::logging::ColaboraRootSpanBuilder;

/// The shared state every worker's `App` is built from.
#[derive(Clone)]
pub struct AppState {
    /// Settings the server was started with.
    pub settings: Settings,
    /// The key gate for guarded endpoints.
    pub auth_gate: AuthGate,
    /// The login service.
    pub login: LoginService,
    /// The initiative store.
    pub repository: Arc<dyn InitiativeRepository>,
    /// The topic search.
    pub search: TopicSearch,
    /// Where metrics are sent.
    pub metrics_client: StatsdClient,
}

impl AppState {
    /// Build the state from settings, around an existing repository.
    pub fn new(
        settings: Settings,
        repository: Arc<dyn InitiativeRepository>,
        metrics_client: StatsdClient,
    ) -> Self {
        let key_store = Arc::new(KeyStore::new(ApiKey::new(settings.auth.api_key.clone())));
        Self {
            auth_gate: AuthGate::new(Arc::clone(&key_store)),
            login: LoginService::new(&settings.auth, key_store),
            search: TopicSearch::new(TopicMatcher::from_settings(&settings)),
            repository,
            metrics_client,
            settings,
        }
    }

    /// Register the state as app data and mount every route.
    pub fn configure(&self, config: &mut web::ServiceConfig) {
        config
            .app_data(Data::new(self.settings.clone()))
            .app_data(Data::new(self.auth_gate.clone()))
            .app_data(Data::new(self.login.clone()))
            .app_data(Data::from(Arc::clone(&self.repository)))
            .app_data(Data::new(self.search))
            .app_data(Data::new(self.metrics_client.clone()))
            .service(web::scope("/api/login").configure(endpoints::login::configure))
            .service(web::scope("/api/iniciativa").configure(endpoints::iniciativa::configure))
            .service(web::scope("/api/buscar").configure(endpoints::buscar::configure))
            .service(root_info)
            // Add the behavior necessary to satisfy Dockerflow.
            .configure(dockerflow::configure);
    }
}

/// Run the web server
///
/// The returned server is a `Future` that must either be `.await`ed, or run it
/// as a background task using `tokio::spawn`.
///
/// Most of the details from `settings` will be respected, except for those that
/// go into building the listener (the host and port). If you want to respect the
/// settings specified in that object, you must include them in the construction
/// of `listener`.
///
/// # Errors
///
/// Returns an error if the initiative store cannot be set up, or if the server
/// cannot be started on the provided listener.
///
/// # Examples
///
/// ```no_run
/// # tokio_test::block_on(async {
/// let listener = std::net::TcpListener::bind("127.0.0.1:8080")
///     .expect("Failed to bind port");
/// let settings = colabora_settings::Settings::load()
///     .expect("Failed to load settings");
/// let metrics_client = cadence::StatsdClient::from_sink("colabora", cadence::NopMetricSink);
/// colabora_web::run(listener, metrics_client, settings)
///     .expect("Failed to start server")
///     .await
///     .expect("Fatal error while running server");
/// # })
/// ```
pub fn run(
    listener: TcpListener,
    metrics_client: StatsdClient,
    settings: Settings,
) -> Result<Server> {
    let repository =
        MemoryRepository::from_settings(&settings).context("Setting up initiative store")?;
    run_with_repository(listener, metrics_client, settings, Arc::new(repository))
}

/// Run the web server on top of an existing initiative store.
///
/// # Errors
///
/// Returns an error if the server cannot be started on the provided listener.
pub fn run_with_repository(
    listener: TcpListener,
    metrics_client: StatsdClient,
    settings: Settings,
    repository: Arc<dyn InitiativeRepository>,
) -> Result<Server> {
    let num_workers = settings.http.workers;
    let state = AppState::new(settings, repository, metrics_client);

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(middleware::Metrics)
            .wrap(Cors::permissive())
            .wrap(TracingLogger::<ColaboraRootSpanBuilder>::new())
            .configure(|config| state.configure(config))
    })
    .listen(listener)
    .context("Listening for connections")?;

    if let Some(n) = num_workers {
        server = server.workers(n);
    }

    Ok(server.run())
}

/// The root view, to provide information about what this service is.
///
/// Redirects to documentation if it is configured, or provides a short
/// message otherwise.
#[get("/")]
async fn root_info(settings: Data<Settings>) -> HttpResponse {
    match &settings.public_documentation {
        Some(redirect_url) => HttpResponse::Found()
            .insert_header(("location", redirect_url.to_string()))
            .finish(),
        None => HttpResponse::Ok()
            .content_type("text/plain")
            .body("Colabora is a service for tracking legislative initiatives."),
    }
}

#[cfg(test)]
mod tests {
    use super::AppState;
    use actix_web::{http::StatusCode, test, App};
    use cadence::{NopMetricSink, StatsdClient};
    use colabora_settings::Settings;
    use colabora_store::MemoryRepository;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn state() -> AppState {
        let settings = Settings::load_for_tests(|_| ());
        let repository =
            MemoryRepository::from_settings(&settings).expect("test fixtures should load");
        AppState::new(
            settings,
            Arc::new(repository),
            StatsdClient::from_sink("colabora-test", NopMetricSink),
        )
    }

    #[actix_rt::test]
    async fn test_list_requires_key() {
        let state = state();
        let app = test::init_service(App::new().configure(|config| state.configure(config))).await;

        let request = test::TestRequest::get()
            .uri("/api/iniciativa")
            .set_json(json!({ "entidad": "entidad1", "legislatura": "legislatura1" }))
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[actix_rt::test]
    async fn test_list_with_key() {
        let state = state();
        let app = test::init_service(App::new().configure(|config| state.configure(config))).await;

        let request = test::TestRequest::get()
            .uri("/api/iniciativa")
            .set_json(json!({
                "entidad": "entidad1",
                "legislatura": "legislatura1",
                "key": "api-key-cambiar",
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, request).await;

        let numbers: Vec<i64> = body["result"]
            .as_array()
            .expect("result should be a list")
            .iter()
            .map(|initiative| initiative["numero"].as_i64().unwrap())
            .collect();
        assert_eq!(numbers, vec![1, 3]);
    }

    #[actix_rt::test]
    async fn test_create_conflict_is_ok_status() {
        let state = state();
        let app = test::init_service(App::new().configure(|config| state.configure(config))).await;

        let request = test::TestRequest::post()
            .uri("/api/iniciativa")
            .set_json(json!({
                "entidad": "entidad1",
                "legislatura": "legislatura1",
                "numero": 3,
                "cambios": "cambios3",
                "documento": "documento3",
                "key": "api-key-cambiar",
            }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = test::read_body_json(response).await;
        assert_eq!(body, json!({ "result": "error: iniciativa 3 no creada" }));
    }

    #[actix_rt::test]
    async fn test_authorized_malformed_body() {
        let state = state();
        let app = test::init_service(App::new().configure(|config| state.configure(config))).await;

        let request = test::TestRequest::patch()
            .uri("/api/iniciativa")
            .set_json(json!({ "numero": "tres", "key": "api-key-cambiar" }))
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    async fn test_malformed_login_gets_json_error() {
        let state = state();
        let app = test::init_service(App::new().configure(|config| state.configure(config))).await;

        let request = test::TestRequest::post()
            .uri("/api/login")
            .set_json(json!({ "username": "usuario_api" }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(response).await;
        let error = body["error"].as_str().expect("error should be a string");
        assert!(error.starts_with("Malformed body: "), "got {:?}", error);
    }

    #[actix_rt::test]
    async fn test_root_info() {
        let state = state();
        let app = test::init_service(App::new().configure(|config| state.configure(config))).await;

        let response = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
