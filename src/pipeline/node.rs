// Node trait and types
// Base abstraction for pipeline stages

use async_trait::async_trait;

use crate::errors::ApiError;
use crate::state::AppState;

use super::state::RequestState;

/// Context passed to nodes during execution.
pub struct NodeContext<'a> {
    /// Shared application state (backends, config).
    pub app: &'a AppState,
}

/// Output from a node execution.
#[derive(Debug, Clone)]
pub enum NodeOutput {
    /// Continue along the default edge.
    Continue,
    /// Follow the conditional edge matching this branch label.
    Branch(String),
    /// Graph execution complete.
    Final,
}

/// Structural graph failure (missing node, bad wiring, step overrun).
/// Backend faults never surface here; each node contains those and
/// produces a benign output instead.
#[derive(Debug, Clone)]
pub struct GraphError {
    pub node_id: String,
    pub message: String,
}

impl GraphError {
    pub fn new(node_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "graph error in {}: {}", self.node_id, self.message)
    }
}

impl std::error::Error for GraphError {}

impl From<GraphError> for ApiError {
    fn from(err: GraphError) -> Self {
        ApiError::internal(err.to_string())
    }
}

/// Node trait - all pipeline stages implement this
#[async_trait]
pub trait Node: Send + Sync {
    /// Unique identifier for this node
    fn id(&self) -> &'static str;

    /// Human-readable name for display
    fn name(&self) -> &'static str {
        self.id()
    }

    /// Execute the node logic
    async fn execute(
        &self,
        state: &mut RequestState,
        ctx: &NodeContext<'_>,
    ) -> Result<NodeOutput, GraphError>;
}
