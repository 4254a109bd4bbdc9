// Pipeline state
// Per-request state threaded through the node graph

use serde::{Deserialize, Serialize};

use crate::llm::ChatMessage;

/// Routing decision for a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteDecision {
    Search,
    #[default]
    NoSearch,
}

impl RouteDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteDecision::Search => "SEARCH",
            RouteDecision::NoSearch => "NO_SEARCH",
        }
    }
}

/// One retrieved web source, ready for summarization.
#[derive(Debug, Clone)]
pub struct RetrievedSource {
    /// 1-based position in the search results.
    pub source_id: u32,
    pub title: Option<String>,
    pub url: String,
    /// Extracted page text, or the search snippet when extraction failed.
    pub content: String,
}

/// Query-focused summary of one source.
#[derive(Debug, Clone)]
pub struct SourceSummary {
    pub source_id: u32,
    pub text: String,
}

/// Main pipeline state
#[derive(Debug, Clone)]
pub struct RequestState {
    // Core input and history
    pub query: String,
    pub history: Vec<ChatMessage>,

    // Routing
    pub decision: RouteDecision,

    // Search path state
    pub sources: Vec<RetrievedSource>,
    pub summaries: Vec<SourceSummary>,
    pub context: Option<String>,

    // Final output
    pub reply: Option<String>,
}

impl RequestState {
    pub fn new(query: String, history: Vec<ChatMessage>) -> Self {
        Self {
            query,
            history,
            decision: RouteDecision::default(),
            sources: Vec::new(),
            summaries: Vec::new(),
            context: None,
            reply: None,
        }
    }
}

/// Concatenate summaries into the labeled context block the answer stage
/// consumes. Summaries arrive in source order; pairing is positional.
pub fn assemble_context(sources: &[RetrievedSource], summaries: &[SourceSummary]) -> String {
    let mut context = String::new();
    for (source, summary) in sources.iter().zip(summaries) {
        context.push_str(&format!(
            "--- Source {} ({}) ---\n{}\n\n",
            source.source_id, source.url, summary.text
        ));
    }
    context
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(id: u32, url: &str) -> RetrievedSource {
        RetrievedSource {
            source_id: id,
            title: Some(format!("Title {}", id)),
            url: url.to_string(),
            content: String::new(),
        }
    }

    fn summary(id: u32, text: &str) -> SourceSummary {
        SourceSummary {
            source_id: id,
            text: text.to_string(),
        }
    }

    #[test]
    fn decision_default_is_no_search() {
        assert_eq!(RouteDecision::default(), RouteDecision::NoSearch);
    }

    #[test]
    fn decision_serializes_as_wire_tokens() {
        assert_eq!(
            serde_json::to_string(&RouteDecision::Search).unwrap(),
            "\"SEARCH\""
        );
        assert_eq!(
            serde_json::to_string(&RouteDecision::NoSearch).unwrap(),
            "\"NO_SEARCH\""
        );
    }

    #[test]
    fn decision_as_str_matches_serialization() {
        for decision in [RouteDecision::Search, RouteDecision::NoSearch] {
            let json = serde_json::to_string(&decision).unwrap();
            assert_eq!(json, format!("\"{}\"", decision.as_str()));
        }
    }

    #[test]
    fn request_state_new_initializes_empty() {
        let state = RequestState::new("what is rust".to_string(), Vec::new());

        assert_eq!(state.query, "what is rust");
        assert!(state.history.is_empty());
        assert_eq!(state.decision, RouteDecision::NoSearch);
        assert!(state.sources.is_empty());
        assert!(state.summaries.is_empty());
        assert!(state.context.is_none());
        assert!(state.reply.is_none());
    }

    #[test]
    fn assemble_context_labels_each_source() {
        let sources = vec![
            source(1, "https://a.example/post"),
            source(2, "https://b.example/wiki"),
        ];
        let summaries = vec![summary(1, "First summary."), summary(2, "Second summary.")];

        let context = assemble_context(&sources, &summaries);

        assert_eq!(
            context,
            "--- Source 1 (https://a.example/post) ---\nFirst summary.\n\n\
             --- Source 2 (https://b.example/wiki) ---\nSecond summary.\n\n"
        );
    }

    #[test]
    fn assemble_context_preserves_source_order() {
        let sources = vec![
            source(1, "https://one.example"),
            source(2, "https://two.example"),
            source(3, "https://three.example"),
        ];
        let summaries = vec![summary(1, "one"), summary(2, "two"), summary(3, "three")];

        let context = assemble_context(&sources, &summaries);

        let first = context.find("Source 1").unwrap();
        let second = context.find("Source 2").unwrap();
        let third = context.find("Source 3").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn assemble_context_of_nothing_is_empty() {
        assert_eq!(assemble_context(&[], &[]), "");
    }
}
