use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::SearchConfig;
use crate::errors::ApiError;

use super::{SearchBackend, SearchHit};

const TAVILY_ENDPOINT: &str = "https://api.tavily.com/search";

/// Tavily search API client. The API accepts a JSON POST and handles domain
/// exclusion server-side.
pub struct TavilySearch {
    api_key: String,
    timeout: Duration,
    client: Client,
}

impl TavilySearch {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            client: Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    url: String,
    #[serde(default)]
    title: String,
    /// Tavily calls its snippet field "content".
    #[serde(default)]
    content: String,
}

#[async_trait]
impl SearchBackend for TavilySearch {
    fn name(&self) -> &str {
        "tavily"
    }

    async fn search(
        &self,
        query: &str,
        max_results: u32,
        exclude_domains: &[&str],
    ) -> Result<Vec<SearchHit>, ApiError> {
        let body = json!({
            "query": query,
            "max_results": max_results,
            "search_depth": "basic",
            "include_answer": false,
            "include_raw_content": false,
            "exclude_domains": exclude_domains,
        });

        let res = self
            .client
            .post(TAVILY_ENDPOINT)
            .timeout(self.timeout)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::provider)?;

        if !res.status().is_success() {
            return Err(ApiError::Provider(format!(
                "Tavily search failed: {}",
                res.status()
            )));
        }

        let payload: TavilyResponse = res.json().await.map_err(ApiError::provider)?;
        Ok(hits_from_response(payload))
    }
}

fn hits_from_response(payload: TavilyResponse) -> Vec<SearchHit> {
    payload
        .results
        .into_iter()
        .filter(|result| !result.url.is_empty())
        .map(|result| SearchHit {
            title: result.title,
            url: result.url,
            snippet: result.content,
        })
        .collect()
}
