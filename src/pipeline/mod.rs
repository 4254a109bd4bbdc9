// Answer Pipeline Module
// Graph-driven router -> retrieve -> summarize -> synthesize flow

use serde::Serialize;

use crate::errors::ApiError;
use crate::llm::ChatMessage;
use crate::state::AppState;

pub mod builder;
pub mod node;
pub mod nodes;
pub mod runtime;
pub mod state;

pub use builder::build_answer_graph;
pub use node::{GraphError, Node, NodeContext, NodeOutput};
pub use runtime::GraphRuntime;
pub use state::{RequestState, RetrievedSource, RouteDecision, SourceSummary};

/// Final result of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct ChatOutcome {
    pub reply: String,
    pub router_decision: RouteDecision,
}

/// Run one query through the answer graph. By the time the graph finishes,
/// every backend fault has been contained into the reply text, so an `Err`
/// here means the graph itself is miswired.
pub async fn run_pipeline(
    app: &AppState,
    query: String,
    history: Vec<ChatMessage>,
) -> Result<ChatOutcome, ApiError> {
    let mut state = RequestState::new(query, history);
    let ctx = NodeContext { app };

    app.graph.run(&mut state, &ctx).await?;

    let reply = state
        .reply
        .take()
        .unwrap_or_else(|| "No response generated.".to_string());

    Ok(ChatOutcome {
        reply,
        router_decision: state.decision,
    })
}
