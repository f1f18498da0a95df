//! Query endpoint

use axum::{extract::State, Json};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{QueryRequest, QueryResponse};

/// POST /api/query - Answer a question from the textbook collection
///
/// Pipeline failures are reported in the body (`status = "error"`) with
/// HTTP 200; only malformed requests are rejected with an HTTP error.
pub async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>> {
    let question = request.validate()?;

    tracing::info!("Query: \"{}\"", question);

    let response = state.agent().ask(question).await;

    Ok(Json(response))
}
