//! Web handlers to list, create, update and remove initiatives.

use actix_web::{
    delete, get, patch, post,
    web::{Data, ServiceConfig},
    HttpResponse,
};
use cadence::{CountedExt, StatsdClient};
use colabora_store::{
    CrudOutcome, Initiative, InitiativeChanges, InitiativeKey, InitiativeRepository, StoreError,
};
use serde::Deserialize;

use crate::{auth::Keyed, endpoints::ResultResponse, errors::HandlerError};

/// Configure the routes of the initiatives resource.
pub fn configure(config: &mut ServiceConfig) {
    config
        .service(list)
        .service(create)
        .service(update)
        .service(remove);
}

/// Selects the initiatives of one entity and term.
#[derive(Debug, Deserialize)]
struct ListRequest {
    /// The entity to list.
    entidad: String,
    /// The term to list.
    legislatura: String,
}

/// The body of an update.
#[derive(Debug, Deserialize)]
struct UpdateRequest {
    /// The entity of the initiative to update.
    entidad: String,
    /// The term of the initiative to update.
    legislatura: String,
    /// The number of the initiative to update.
    numero: i64,
    /// The new description of the changes.
    cambios: String,
    /// The new document.
    documento: String,
}

/// Identifies the initiative to remove.
#[derive(Debug, Deserialize)]
struct RemoveRequest {
    /// The entity of the initiative to remove.
    entidad: String,
    /// The term of the initiative to remove.
    legislatura: String,
    /// The number of the initiative to remove.
    numero: i64,
}

/// List the initiatives of an entity in a legislative term.
#[get("")]
async fn list(
    Keyed(request): Keyed<ListRequest>,
    repository: Data<dyn InitiativeRepository>,
) -> Result<HttpResponse, HandlerError> {
    let initiatives = repository
        .list(&request.entidad, &request.legislatura)
        .await
        .map_err(store_failure)?;

    tracing::debug!(
        r#type = "web.iniciativa.list",
        entidad = %request.entidad,
        legislatura = %request.legislatura,
        count = initiatives.len(),
        "Listing initiatives"
    );

    Ok(HttpResponse::Ok().json(ResultResponse {
        result: initiatives,
    }))
}

/// Create an initiative, unless one with the same identity exists.
#[post("")]
async fn create(
    Keyed(initiative): Keyed<Initiative>,
    repository: Data<dyn InitiativeRepository>,
    metrics_client: Data<StatsdClient>,
) -> Result<HttpResponse, HandlerError> {
    let outcome = repository.create(initiative).await.map_err(store_failure)?;
    Ok(outcome_response(&outcome, &metrics_client))
}

/// Replace the changes and document of an existing initiative.
#[patch("")]
async fn update(
    Keyed(request): Keyed<UpdateRequest>,
    repository: Data<dyn InitiativeRepository>,
    metrics_client: Data<StatsdClient>,
) -> Result<HttpResponse, HandlerError> {
    let UpdateRequest {
        entidad,
        legislatura,
        numero,
        cambios,
        documento,
    } = request;
    let key = InitiativeKey::new(entidad, legislatura, numero);

    let outcome = repository
        .update(&key, InitiativeChanges { cambios, documento })
        .await
        .map_err(store_failure)?;
    Ok(outcome_response(&outcome, &metrics_client))
}

/// Remove an existing initiative.
#[delete("")]
async fn remove(
    Keyed(request): Keyed<RemoveRequest>,
    repository: Data<dyn InitiativeRepository>,
    metrics_client: Data<StatsdClient>,
) -> Result<HttpResponse, HandlerError> {
    let key = InitiativeKey::new(request.entidad, request.legislatura, request.numero);
    let outcome = repository.remove(&key).await.map_err(store_failure)?;
    Ok(outcome_response(&outcome, &metrics_client))
}

/// Report a business outcome. Successes and failures are both `200 OK`.
fn outcome_response(outcome: &CrudOutcome, metrics_client: &StatsdClient) -> HttpResponse {
    let action = outcome.action().name();
    let status = if outcome.is_success() { "ok" } else { "error" };

    tracing::info!(
        r#type = "web.iniciativa.outcome",
        action,
        success = outcome.is_success(),
        result = %outcome,
        "Initiative mutation finished"
    );
    metrics_client
        .incr(&format!("initiative.{}.{}", action, status))
        .ok();

    HttpResponse::Ok().json(ResultResponse {
        result: outcome.to_string(),
    })
}

/// Log a storage failure and hide its details from the client.
pub(crate) fn store_failure(error: StoreError) -> HandlerError {
    tracing::error!(%error, r#type = "web.store.error", "Error using the initiative store");
    HandlerError::internal()
}
