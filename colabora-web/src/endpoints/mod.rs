//! Web handlers for the Colabora API.
//!
//! Every handler answers an authorized request with `200 OK` and a `result`
//! field, whether or not the business operation succeeded. See
//! [`colabora_store::CrudOutcome`].

pub mod buscar;
pub mod iniciativa;
pub mod login;

use serde::Serialize;

/// The envelope all JSON responses are wrapped in.
#[derive(Debug, Serialize)]
pub(crate) struct ResultResponse<T> {
    /// The payload, or a `ok: ...`/`error: ...` message.
    pub result: T,
}
