// Summarize node
// Concurrent per-source summarization and context assembly

use async_trait::async_trait;
use futures_util::future::join_all;

use crate::llm::{ChatMessage, CompletionBackend, CompletionRequest};
use crate::pipeline::node::{GraphError, Node, NodeContext, NodeOutput};
use crate::pipeline::state::{assemble_context, RequestState, RetrievedSource, SourceSummary};

const SUMMARIZER_PROMPT: &str = r#"# Role
You are an expert text summarizer.

# Task
You will receive a large text and a specific user query. Your goal is to generate a summary that answers the query using ONLY the provided text.

# Guidelines
1. **Relevance:** Focus strictly on facts and details relevant to the user's query.
2. **Conciseness:** Keep the summary concise and to the point.
3. **Length:** Ensure the total length is under 300 words.
4. **Formatting:** Use a mix of paragraphs for context and bullet points for listing facts/features.
5. **Flow:** Maintain the logical flow of the original article.
6. **Cleanliness:** Completely remove ads, navigation menus, fluff, and irrelevant content.
7. **Grounding:** Do NOT add any external knowledge or extra content. Summarize only what is provided in the text."#;

/// Upper bound on the text sent per source, to bound cost and latency.
const MAX_SOURCE_CHARS: usize = 15_000;

pub struct SummarizeNode;

impl SummarizeNode {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SummarizeNode {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Node for SummarizeNode {
    fn id(&self) -> &'static str {
        "summarize"
    }

    fn name(&self) -> &'static str {
        "Source Summarizer"
    }

    async fn execute(
        &self,
        state: &mut RequestState,
        ctx: &NodeContext<'_>,
    ) -> Result<NodeOutput, GraphError> {
        tracing::info!("Summarizing {} sources concurrently", state.sources.len());

        // join_all keeps results in input order, so summaries line up with
        // sources without re-sorting.
        let jobs = state
            .sources
            .iter()
            .map(|source| summarize_source(ctx.app.completion.as_ref(), &state.query, source));
        let summaries = join_all(jobs).await;

        state.summaries = summaries;
        state.context = Some(assemble_context(&state.sources, &state.summaries));
        Ok(NodeOutput::Continue)
    }
}

/// Summarize one source. Never fails: a backend error becomes placeholder
/// text so one bad source cannot abort the batch.
async fn summarize_source(
    completion: &dyn CompletionBackend,
    query: &str,
    source: &RetrievedSource,
) -> SourceSummary {
    let user_message = format!(
        "USER QUERY: {}\n\nRAW TEXT:\n{}",
        query,
        truncate_chars(&source.content, MAX_SOURCE_CHARS)
    );
    let request = CompletionRequest::new(
        vec![
            ChatMessage::system(SUMMARIZER_PROMPT),
            ChatMessage::user(user_message),
        ],
        0.3,
    );

    let text = match completion.complete(request).await {
        Ok(summary) => summary,
        Err(err) => {
            tracing::warn!("Summarization failed for source {}: {}", source.source_id, err);
            format!("Summary unavailable for this source: {}", err)
        }
    };

    SourceSummary {
        source_id: source.source_id,
        text,
    }
}

/// Truncate to at most `max` characters without splitting a UTF-8 boundary.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
