use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::llm::ChatMessage;
use crate::pipeline::{self, ChatOutcome};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequestBody {
    pub query: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

/// POST /api/deep_searcher
///
/// Runs one query through the full answer pipeline and returns the reply
/// together with the routing decision the pipeline took.
pub async fn deep_searcher(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatRequestBody>,
) -> Result<Json<ChatOutcome>, ApiError> {
    if body.query.trim().is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".to_string()));
    }

    let request_id = Uuid::new_v4();
    tracing::info!("[{}] Query received ({} chars)", request_id, body.query.chars().count());

    let outcome = pipeline::run_pipeline(&state, body.query, body.history).await?;

    tracing::info!(
        "[{}] Decision: {}, reply: {} chars",
        request_id,
        outcome.router_decision.as_str(),
        outcome.reply.chars().count()
    );

    Ok(Json(outcome))
}
