//! The API key gate in front of every endpoint except login.
//!
//! Guarded endpoints take their body through [`Keyed`], which checks the
//! `key` field of the JSON body before the handler runs. A request without
//! the deployment's key never reaches business logic; it ends with `403`.

use std::sync::Arc;

use actix_web::{
    dev::Payload,
    web::{Bytes, Data},
    Error as ActixError, FromRequest, HttpRequest,
};
use cadence::{CountedExt, StatsdClient};
use futures_util::{future::LocalBoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::{
    errors::{HandlerError, HandlerErrorKind},
    keys::KeyStore,
};

/// The name of the body field that carries the API key.
pub const KEY_FIELD: &str = "key";

/// Why a request was turned away.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// The body has no `key` field.
    #[error("missing API key")]
    Missing,

    /// The body's `key` is not the deployment's key.
    #[error("invalid API key")]
    Invalid,
}

impl AuthFailure {
    /// A short name, suitable for metrics and log fields.
    pub fn name(self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Invalid => "invalid",
        }
    }
}

/// Accepts or rejects a supplied key, consulting the [`KeyStore`].
#[derive(Debug, Clone)]
pub struct AuthGate {
    /// The source of the valid key.
    key_store: Arc<KeyStore>,
}

impl AuthGate {
    /// Create a gate that admits requests carrying `key_store`'s key.
    pub fn new(key_store: Arc<KeyStore>) -> Self {
        Self { key_store }
    }

    /// Decide whether a request that supplied `key` may proceed.
    ///
    /// # Errors
    /// [`AuthFailure::Missing`] if no key was supplied, or
    /// [`AuthFailure::Invalid`] if it is not the current key.
    pub fn authorize(&self, key: Option<&str>) -> Result<(), AuthFailure> {
        match key {
            None => Err(AuthFailure::Missing),
            Some(key) if self.key_store.accepts(key) => Ok(()),
            Some(_) => Err(AuthFailure::Invalid),
        }
    }

    /// Authorize a parsed JSON body by its `key` field.
    ///
    /// A body that isn't an object, or a `key` that isn't a string, counts as
    /// missing or invalid respectively.
    pub fn authorize_body(&self, body: &Value) -> Result<(), AuthFailure> {
        match body.get(KEY_FIELD) {
            None | Some(Value::Null) => self.authorize(None),
            Some(Value::String(key)) => self.authorize(Some(key)),
            Some(_) => Err(AuthFailure::Invalid),
        }
    }
}

/// An extractor for a JSON body that must carry the API key.
///
/// The key is checked first. Only then is the body deserialized into `T`,
/// which ignores the `key` field unless it asks for it.
#[derive(Debug)]
pub struct Keyed<T>(pub T);

impl<T> FromRequest for Keyed<T>
where
    T: DeserializeOwned + 'static,
{
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let body = Bytes::from_request(req, payload);
        let req = req.clone();

        async move {
            let gate = req
                .app_data::<Data<AuthGate>>()
                .ok_or_else(HandlerError::internal)?;

            let bytes = body.await?;
            // Anything that doesn't parse can't carry a key.
            let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

            if let Err(failure) = gate.authorize_body(&body) {
                tracing::warn!(
                    r#type = "web.auth.rejected",
                    reason = failure.name(),
                    path = req.path(),
                    "Rejected request without a valid API key"
                );
                if let Some(metrics_client) = req.app_data::<Data<StatsdClient>>() {
                    metrics_client
                        .incr_with_tags("auth.rejected")
                        .with_tag("reason", failure.name())
                        .send();
                }
                return Err(HandlerError::from(failure).into());
            }

            let inner = serde_json::from_value(body)
                .map_err(|error| HandlerErrorKind::MalformedBody(error.to_string()))?;
            Ok(Keyed(inner))
        }
        .boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::{AuthFailure, AuthGate, Keyed};
    use crate::keys::{ApiKey, KeyStore};
    use actix_web::{test::TestRequest, web::Data, FromRequest};
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::Arc;

    const KEY: &str = "api-key-cambiar";

    fn gate() -> AuthGate {
        AuthGate::new(Arc::new(KeyStore::new(ApiKey::new(KEY))))
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Tema {
        tema: String,
    }

    #[test]
    fn test_authorize() {
        let gate = gate();
        assert_eq!(gate.authorize(Some(KEY)), Ok(()));
        assert_eq!(gate.authorize(Some("api-key-incorrecto")), Err(AuthFailure::Invalid));
        assert_eq!(gate.authorize(None), Err(AuthFailure::Missing));
    }

    #[test]
    fn test_authorize_body() {
        let gate = gate();
        assert_eq!(gate.authorize_body(&json!({ "key": KEY })), Ok(()));
        assert_eq!(gate.authorize_body(&json!({})), Err(AuthFailure::Missing));
        assert_eq!(gate.authorize_body(&json!({ "key": null })), Err(AuthFailure::Missing));
        assert_eq!(gate.authorize_body(&json!({ "key": 42 })), Err(AuthFailure::Invalid));
        assert_eq!(gate.authorize_body(&json!("key")), Err(AuthFailure::Missing));
    }

    async fn extract(body: serde_json::Value) -> Result<Keyed<Tema>, actix_web::Error> {
        let (req, mut payload) = TestRequest::default()
            .app_data(Data::new(gate()))
            .set_json(body)
            .to_http_parts();
        Keyed::<Tema>::from_request(&req, &mut payload).await
    }

    #[actix_rt::test]
    async fn test_extract_with_correct_key() {
        let Keyed(tema) = extract(json!({ "key": KEY, "tema": "1" }))
            .await
            .expect("request should be authorized");
        assert_eq!(tema, Tema { tema: "1".to_string() });
    }

    #[actix_rt::test]
    async fn test_extract_with_wrong_key() {
        let error = extract(json!({ "key": "api-key-incorrecto", "tema": "1" }))
            .await
            .expect_err("request should be rejected");
        assert_eq!(error.as_response_error().status_code(), 403);
    }

    #[actix_rt::test]
    async fn test_extract_without_key() {
        let error = extract(json!({ "tema": "1" }))
            .await
            .expect_err("request should be rejected");
        assert_eq!(error.as_response_error().status_code(), 403);
    }

    #[actix_rt::test]
    async fn test_extract_malformed_after_auth() {
        let error = extract(json!({ "key": KEY }))
            .await
            .expect_err("body lacks tema");
        assert_eq!(error.as_response_error().status_code(), 400);
    }

    #[actix_rt::test]
    async fn test_extract_non_json_body() {
        let (req, mut payload) = TestRequest::default()
            .app_data(Data::new(gate()))
            .set_payload("not json")
            .to_http_parts();
        let error = Keyed::<Tema>::from_request(&req, &mut payload)
            .await
            .expect_err("request should be rejected");
        assert_eq!(error.as_response_error().status_code(), 403);
    }

    /// A writer that appends to a buffer shared with the test.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[actix_rt::test]
    async fn test_rejection_is_logged() {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        extract(json!({ "key": "api-key-incorrecto", "tema": "1" }))
            .await
            .expect_err("request should be rejected");

        let logs = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("web.auth.rejected"), "logs were: {}", logs);
        assert!(logs.contains("invalid"), "logs were: {}", logs);
        assert!(!logs.contains("api-key-incorrecto"), "logs were: {}", logs);
    }
}
