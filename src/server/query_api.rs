//! `llm-verktoy-api` routes: fetch the roster, filter it, summarize it.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::ApiError;
use crate::roster_client::RosterClient;
use crate::summary::{Summarizer, SummaryCriteria, filter_consultants};

pub const ROOT_MESSAGE: &str = "LLM Verktøy API er oppe og kjører";

/// Router state. Cheap to clone — both fields wrap a `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct QueryState {
    pub roster: RosterClient,
    pub summarizer: Summarizer,
}

#[derive(Debug, Deserialize)]
pub struct SummaryParams {
    #[serde(rename = "min_tilgjengelighet_prosent")]
    pub min_availability: f64,
    #[serde(rename = "påkrevd_ferdighet")]
    pub skill: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub sammendrag: String,
}

pub fn router(state: QueryState) -> Router {
    super::service_routes(ROOT_MESSAGE)
        .route("/tilgjengelige-konsulenter/sammendrag", get(summary))
        .with_state(state)
}

/// GET /tilgjengelige-konsulenter/sammendrag
async fn summary(
    State(state): State<QueryState>,
    params: Result<Query<SummaryParams>, QueryRejection>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::unprocessable(e.body_text()))?;
    if !params.min_availability.is_finite() {
        return Err(ApiError::unprocessable(
            "min_tilgjengelighet_prosent must be a finite number",
        ));
    }

    let roster = state.roster.fetch_all().await?;

    let criteria = SummaryCriteria {
        min_availability: params.min_availability,
        skill: params.skill,
    };
    let matches = filter_consultants(&roster, criteria.min_availability, &criteria.skill);
    debug!(roster = roster.len(), matches = matches.len(), "roster filtered");

    let summary = state.summarizer.summarize(&matches, &criteria).await;
    info!(
        min_availability = criteria.min_availability,
        skill = %criteria.skill,
        matches = matches.len(),
        source = summary.source.as_str(),
        "summary rendered"
    );

    Ok(Json(SummaryResponse { sammendrag: summary.text }))
}
