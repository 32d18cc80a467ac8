//! `konsulent-api` routes.

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get};

use crate::roster::{Consultant, Roster};

pub const ROOT_MESSAGE: &str = "Konsulent API er oppe og kjører";

pub fn router(roster: Arc<Roster>) -> Router {
    super::service_routes(ROOT_MESSAGE)
        .route("/konsulenter", get(list_consultants))
        .with_state(roster)
}

/// GET /konsulenter — the whole roster, insertion order.
async fn list_consultants(State(roster): State<Arc<Roster>>) -> Json<Vec<Consultant>> {
    Json(roster.all().to_vec())
}
