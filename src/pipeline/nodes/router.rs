// Router node
// Classifies whether a query needs fresh web data or a direct answer

use async_trait::async_trait;

use crate::llm::{ChatMessage, CompletionRequest};
use crate::pipeline::node::{GraphError, Node, NodeContext, NodeOutput};
use crate::pipeline::state::{RequestState, RouteDecision};

const ROUTER_PROMPT: &str = r#"# Role
You are an intelligent query router.

# Task
Classify the incoming user query into one of two categories based on whether it requires external information.

# Instructions
- **SEARCH:** Choose this for questions about current events, breaking news, weather, dynamic facts, or technical documentation (e.g., "GTA 6 release date", "Stock price of Apple", "Latest Python version").
- **NO_SEARCH:** Choose this for greetings, established general knowledge, creative writing, coding help, or philosophical questions (e.g., "Hello", "Write a poem", "What is the capital of France?").
- **Output:** Reply ONLY with the word 'SEARCH' or 'NO_SEARCH'. Do not provide explanations or extra text."#;

pub struct RouterNode;

impl RouterNode {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RouterNode {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Node for RouterNode {
    fn id(&self) -> &'static str {
        "router"
    }

    fn name(&self) -> &'static str {
        "Query Router"
    }

    async fn execute(
        &self,
        state: &mut RequestState,
        ctx: &NodeContext<'_>,
    ) -> Result<NodeOutput, GraphError> {
        let request = CompletionRequest::new(
            vec![
                ChatMessage::system(ROUTER_PROMPT),
                ChatMessage::user(state.query.as_str()),
            ],
            0.0,
        );

        // Classification failure must not break the request; a direct answer
        // is the fail-safe.
        let decision = match ctx.app.completion.complete(request).await {
            Ok(raw) => parse_decision(&raw),
            Err(err) => {
                tracing::warn!("Router classification failed, defaulting to NO_SEARCH: {}", err);
                RouteDecision::NoSearch
            }
        };

        state.decision = decision;
        tracing::info!("Router decision: {}", decision.as_str());

        let branch = match decision {
            RouteDecision::Search => "search",
            RouteDecision::NoSearch => "direct",
        };
        Ok(NodeOutput::Branch(branch.to_string()))
    }
}

/// Normalize the classifier output and force it into a decision. Substring
/// containment tolerates a model that wraps the token in extra words.
fn parse_decision(raw: &str) -> RouteDecision {
    let normalized = raw.trim().to_uppercase();
    if normalized.contains("SEARCH") && !normalized.contains("NO") {
        RouteDecision::Search
    } else {
        RouteDecision::NoSearch
    }
}
