use async_trait::async_trait;

use crate::errors::ApiError;
use super::types::CompletionRequest;

/// Text-generation capability used by every pipeline stage. Injected at
/// construction so callers own the client lifecycle and tests can substitute
/// a scripted backend.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// return the provider name (e.g. "openai")
    fn name(&self) -> &str;

    /// run one chat completion and return the assistant text
    async fn complete(&self, request: CompletionRequest) -> Result<String, ApiError>;
}
