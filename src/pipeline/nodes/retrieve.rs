// Retrieve node
// Web search plus per-result page extraction

use async_trait::async_trait;

use crate::pipeline::node::{GraphError, Node, NodeContext, NodeOutput};
use crate::pipeline::state::{RequestState, RetrievedSource};

/// Video platforms yield no extractable text, so they are filtered at the
/// search layer.
const EXCLUDED_DOMAINS: [&str; 3] = ["youtube.com", "vimeo.com", "tiktok.com"];

const MAX_RESULTS: u32 = 3;

const NO_RESULTS_REPLY: &str = "I couldn't find any relevant results online.";

const EMPTY_SNIPPET_FALLBACK: &str = "No content available.";

pub struct RetrieveNode;

impl RetrieveNode {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RetrieveNode {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Node for RetrieveNode {
    fn id(&self) -> &'static str {
        "retrieve"
    }

    fn name(&self) -> &'static str {
        "Web Retriever"
    }

    async fn execute(
        &self,
        state: &mut RequestState,
        ctx: &NodeContext<'_>,
    ) -> Result<NodeOutput, GraphError> {
        let hits = match ctx
            .app
            .search
            .search(&state.query, MAX_RESULTS, &EXCLUDED_DOMAINS)
            .await
        {
            Ok(hits) => hits,
            Err(err) => {
                tracing::warn!("Web search failed: {}", err);
                Vec::new()
            }
        };

        if hits.is_empty() {
            tracing::info!("No search results for query, short-circuiting");
            state.reply = Some(NO_RESULTS_REPLY.to_string());
            return Ok(NodeOutput::Final);
        }

        let mut sources = Vec::with_capacity(hits.len());
        for (i, hit) in hits.iter().enumerate() {
            let source_id = (i + 1) as u32;
            tracing::info!("Fetching source {}: {}", source_id, hit.url);

            let content = match ctx.app.extractor.extract(&hit.url).await {
                Ok(Some(text)) => {
                    tracing::debug!("Extracted {} chars from {}", text.chars().count(), hit.url);
                    text
                }
                Ok(None) => {
                    tracing::info!("No readable content at {}, using snippet", hit.url);
                    snippet_or_default(&hit.snippet)
                }
                Err(err) => {
                    tracing::warn!("Fetch failed for {}: {}, using snippet", hit.url, err);
                    snippet_or_default(&hit.snippet)
                }
            };

            sources.push(RetrievedSource {
                source_id,
                title: (!hit.title.trim().is_empty()).then(|| hit.title.clone()),
                url: hit.url.clone(),
                content,
            });
        }

        tracing::info!("Retrieved {} sources", sources.len());
        state.sources = sources;
        Ok(NodeOutput::Continue)
    }
}

fn snippet_or_default(snippet: &str) -> String {
    if snippet.trim().is_empty() {
        EMPTY_SNIPPET_FALLBACK.to_string()
    } else {
        snippet.to_string()
    }
}
