//! Any errors that colabora-web might generate, and supporting implementations.

use std::error::Error;
use std::fmt;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use backtrace::Backtrace;
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthFailure;

/// The standard error for web handlers.
///
/// Only failures that stop a request before business logic runs, or that come
/// from the server itself, become a `HandlerError`. Business outcomes such as
/// "initiative already exists" are ordinary `200 OK` responses.
pub struct HandlerError {
    /// The wrapped error value.
    kind: HandlerErrorKind,
    /// The backtrace related to the wrapped error.
    pub(crate) backtrace: Backtrace,
}

/// An error that happened in a web handler.
#[derive(Error, Debug)]
pub enum HandlerErrorKind {
    /// A generic error, when there is nothing more specific to say.
    #[error("Internal error")]
    Internal,

    /// The request did not carry the deployment's API key.
    #[error("Access denied: {0}")]
    Forbidden(#[from] AuthFailure),

    /// The request was authorized, but its body is not what the endpoint needs.
    #[error("Malformed body: {0}")]
    MalformedBody(String),
}

impl HandlerErrorKind {
    /// Convert the error to an HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::MalformedBody(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<HandlerErrorKind> for actix_web::Error {
    fn from(kind: HandlerErrorKind) -> Self {
        let error: HandlerError = kind.into();
        error.into()
    }
}

impl From<AuthFailure> for actix_web::Error {
    fn from(failure: AuthFailure) -> Self {
        HandlerErrorKind::from(failure).into()
    }
}

impl HandlerError {
    /// Access the wrapped error.
    pub fn kind(&self) -> &HandlerErrorKind {
        &self.kind
    }

    /// Get an `HandlerError` representing an `Internal` error.
    pub fn internal() -> Self {
        HandlerErrorKind::Internal.into()
    }
}

impl Error for HandlerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.kind.source()
    }
}

impl<T> From<T> for HandlerError
where
    HandlerErrorKind: From<T>,
{
    fn from(item: T) -> Self {
        HandlerError {
            kind: HandlerErrorKind::from(item),
            backtrace: Backtrace::new(),
        }
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

impl fmt::Debug for HandlerError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        // Name the debug struct after the error kind, so that log consumers
        // that group by type don't lump different errors together.
        fmt.debug_struct(&format!("HandlerError/{:?}", &self.kind))
            .field("kind", &self.kind)
            .field("backtrace", &self.backtrace)
            .finish()
    }
}

impl ResponseError for HandlerError {
    fn status_code(&self) -> StatusCode {
        self.kind().status_code()
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.kind().to_string() }))
    }
}

#[cfg(test)]
mod tests {
    use super::{HandlerError, HandlerErrorKind};
    use crate::auth::AuthFailure;
    use actix_web::{body::to_bytes, http::StatusCode, ResponseError};
    use pretty_assertions::assert_eq;

    #[actix_rt::test]
    async fn test_forbidden_response() {
        let error: HandlerError = AuthFailure::Missing.into();
        assert_eq!(error.status_code(), StatusCode::FORBIDDEN);

        let response = error.error_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "Access denied: missing API key");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            HandlerError::internal().status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let malformed: HandlerError = HandlerErrorKind::MalformedBody("numero".into()).into();
        assert_eq!(malformed.status_code(), StatusCode::BAD_REQUEST);
    }
}
