//! The topic search page.

use actix_web::{
    http::header::ContentType,
    post,
    web::{Data, ServiceConfig},
    HttpResponse,
};
use cadence::{Histogrammed, StatsdClient};
use colabora_store::{InitiativeRepository, TopicSearch};
use serde::Deserialize;

use crate::{
    auth::Keyed, endpoints::iniciativa::store_failure, errors::HandlerError, html::render_listing,
};

/// Configure a route to use the topic search.
pub fn configure(config: &mut ServiceConfig) {
    config.service(buscar);
}

/// The body of a search.
#[derive(Debug, Deserialize)]
struct SearchRequest {
    /// The text to look for in topics. Empty or absent lists everything.
    #[serde(default)]
    tema: String,
}

/// Render the initiatives whose topic contains the requested text.
#[post("")]
async fn buscar(
    Keyed(request): Keyed<SearchRequest>,
    repository: Data<dyn InitiativeRepository>,
    search: Data<TopicSearch>,
    metrics_client: Data<StatsdClient>,
) -> Result<HttpResponse, HandlerError> {
    let found = search
        .search(repository.get_ref(), &request.tema)
        .await
        .map_err(store_failure)?;

    tracing::debug!(
        r#type = "web.buscar.results",
        result_count = found.len(),
        "Rendering search results"
    );
    metrics_client
        .histogram("search.results", found.len() as u64)
        .ok();

    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(render_listing(&found)))
}
