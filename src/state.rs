use std::sync::Arc;

use crate::config::AppConfig;
use crate::extract::{ContentExtractor, HttpExtractor};
use crate::llm::{CompletionBackend, OpenAiClient};
use crate::pipeline::{build_answer_graph, GraphRuntime};
use crate::search::{self, SearchBackend};

pub struct AppState {
    pub config: AppConfig,
    pub completion: Arc<dyn CompletionBackend>,
    pub search: Arc<dyn SearchBackend>,
    pub extractor: Arc<dyn ContentExtractor>,
    pub graph: GraphRuntime,
}

impl AppState {
    /// Wire up production backends from configuration.
    pub fn initialize(config: AppConfig) -> anyhow::Result<Arc<Self>> {
        let completion = Arc::new(OpenAiClient::new(&config.llm));
        let search = search::from_config(&config.search);
        let extractor = Arc::new(HttpExtractor::new(&config.fetch));
        Self::with_backends(config, completion, search, extractor)
    }

    /// Assemble state around caller-provided backends. Tests inject mocks
    /// through this path.
    pub fn with_backends(
        config: AppConfig,
        completion: Arc<dyn CompletionBackend>,
        search: Arc<dyn SearchBackend>,
        extractor: Arc<dyn ContentExtractor>,
    ) -> anyhow::Result<Arc<Self>> {
        let graph = build_answer_graph()?;

        Ok(Arc::new(AppState {
            config,
            completion,
            search,
            extractor,
            graph,
        }))
    }
}
