pub mod brave;
pub mod tavily;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::SearchConfig;
use crate::errors::ApiError;

pub use brave::BraveSearch;
pub use tavily::TavilySearch;

/// One web search hit as returned by a provider.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Web search capability used by the retrieval stage.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// return the provider name (e.g. "tavily", "brave")
    fn name(&self) -> &str;

    /// Run one search, returning at most `max_results` hits with every
    /// `exclude_domains` entry filtered out.
    async fn search(
        &self,
        query: &str,
        max_results: u32,
        exclude_domains: &[&str],
    ) -> Result<Vec<SearchHit>, ApiError>;
}

/// Instantiate the provider named by `search.provider`.
pub fn from_config(config: &SearchConfig) -> Arc<dyn SearchBackend> {
    match config.provider.as_str() {
        "brave" => Arc::new(BraveSearch::new(config)),
        "tavily" => Arc::new(TavilySearch::new(config)),
        other => {
            tracing::warn!("Unknown search provider '{}', using tavily", other);
            Arc::new(TavilySearch::new(config))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_selection_by_name() {
        let mut config = SearchConfig::default();
        assert_eq!(from_config(&config).name(), "tavily");

        config.provider = "brave".to_string();
        assert_eq!(from_config(&config).name(), "brave");

        config.provider = "bing".to_string();
        assert_eq!(from_config(&config).name(), "tavily");
    }
}
