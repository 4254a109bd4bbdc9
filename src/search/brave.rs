use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::config::SearchConfig;
use crate::errors::ApiError;

use super::{SearchBackend, SearchHit};

/// Brave web search client. Brave has no exclusion parameter, so denylisted
/// domains are filtered out of the response here.
pub struct BraveSearch {
    api_key: String,
    timeout: Duration,
    client: Client,
}

impl BraveSearch {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl SearchBackend for BraveSearch {
    fn name(&self) -> &str {
        "brave"
    }

    async fn search(
        &self,
        query: &str,
        max_results: u32,
        exclude_domains: &[&str],
    ) -> Result<Vec<SearchHit>, ApiError> {
        let url = format!(
            "https://api.search.brave.com/res/v1/web/search?q={}&count={}",
            urlencoding::encode(query),
            max_results
        );

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .header("X-Subscription-Token", &self.api_key)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(ApiError::provider)?;

        if !response.status().is_success() {
            return Err(ApiError::Provider(format!(
                "Brave search failed: {}",
                response.status()
            )));
        }

        let payload: Value = response.json().await.map_err(ApiError::provider)?;
        Ok(hits_from_payload(&payload, max_results, exclude_domains))
    }
}

fn hits_from_payload(payload: &Value, max_results: u32, exclude_domains: &[&str]) -> Vec<SearchHit> {
    let mut hits = Vec::new();

    if let Some(items) = payload
        .get("web")
        .and_then(|w| w.get("results"))
        .and_then(|v| v.as_array())
    {
        for item in items {
            if hits.len() as u32 >= max_results {
                break;
            }

            let title = item.get("title").and_then(|v| v.as_str()).unwrap_or("");
            let url = item.get("url").and_then(|v| v.as_str()).unwrap_or("");
            let snippet = item
                .get("description")
                .and_then(|v| v.as_str())
                .unwrap_or("");

            if url.is_empty() || is_excluded(url, exclude_domains) {
                continue;
            }

            hits.push(SearchHit {
                title: title.to_string(),
                url: url.to_string(),
                snippet: snippet.to_string(),
            });
        }
    }

    hits
}

/// Host-suffix match against the denylist: `youtube.com` excludes both the
/// apex domain and any subdomain.
fn is_excluded(raw_url: &str, exclude_domains: &[&str]) -> bool {
    let Ok(parsed) = url::Url::parse(raw_url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };

    exclude_domains
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)))
}
