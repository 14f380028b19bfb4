//! The login endpoint, which trades credentials for the API key.

use actix_web::{
    post,
    web::{Data, Json, JsonConfig, ServiceConfig},
    HttpResponse,
};
use cadence::{CountedExt, StatsdClient};
use serde::{Deserialize, Serialize};

use crate::{
    errors::HandlerErrorKind,
    keys::ApiKey,
    login::{LoginResult, LoginService},
};

/// Configure a route to use the login service.
///
/// Bodies that don't deserialize get the same `{"error": ...}` response as
/// every other endpoint.
pub fn configure(config: &mut ServiceConfig) {
    config
        .app_data(JsonConfig::default().error_handler(|error, _request| {
            tracing::debug!(r#type = "web.login.malformed", %error, "Malformed login body");
            HandlerErrorKind::MalformedBody(error.to_string()).into()
        }))
        .service(login);
}

/// The body of a login request.
#[derive(Deserialize)]
struct LoginRequest {
    /// The user name to check.
    username: String,
    /// The password to check.
    password: String,
}

/// The body of a login response.
#[derive(Debug, Serialize)]
struct LoginResponse<'a> {
    /// `ok: ingreso correcto` or `error: ingreso denegado`.
    result: &'static str,
    /// The API key, only on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<&'a ApiKey>,
}

/// Check credentials and, if they match, hand out the API key.
///
/// This endpoint is not behind the API key gate. A denied login is still a
/// `200 OK`.
#[post("")]
async fn login(
    Json(request): Json<LoginRequest>,
    service: Data<LoginService>,
    metrics_client: Data<StatsdClient>,
) -> HttpResponse {
    let result = service.login(&request.username, &request.password);

    let response = match &result {
        LoginResult::Granted { key } => {
            tracing::info!(
                r#type = "web.login.granted",
                username = %request.username,
                "Login granted"
            );
            metrics_client.incr("login.granted").ok();
            LoginResponse {
                result: "ok: ingreso correcto",
                key: Some(key),
            }
        }
        LoginResult::Denied => {
            tracing::info!(
                r#type = "web.login.denied",
                username = %request.username,
                "Login denied"
            );
            metrics_client.incr("login.denied").ok();
            LoginResponse {
                result: "error: ingreso denegado",
                key: None,
            }
        }
    };

    HttpResponse::Ok().json(response)
}
