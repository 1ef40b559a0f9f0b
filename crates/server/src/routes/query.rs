use crate::error::ServerResult;
use crate::state::ServerState;
use assist_knowledge::AnswerResult;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct QueryParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: String,
}

/// `GET /query?q=...`
pub async fn query_get(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<QueryParams>,
) -> ServerResult<Json<AnswerResult>> {
    answer(&state, &params.q).await
}

/// `POST /query` with `{"query": "..."}`
pub async fn query_post(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<QueryRequest>,
) -> ServerResult<Json<AnswerResult>> {
    answer(&state, &request.query).await
}

async fn answer(state: &ServerState, query: &str) -> ServerResult<Json<AnswerResult>> {
    tracing::debug!(query_len = query.len(), "Handling query");
    let result = state.pipeline.run(query).await?;
    Ok(Json(result))
}
