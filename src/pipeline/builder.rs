// Graph Builder
// Constructs the query-answering graph using petgraph

use super::node::GraphError;
use super::nodes::{RetrieveNode, RouterNode, SummarizeNode, SynthesizeNode};
use super::runtime::{GraphBuilder, GraphRuntime};

/// Build the query-answering graph.
///
/// `router` branches: "search" walks retrieve -> summarize -> synthesize,
/// "direct" jumps straight to synthesize. `retrieve` may finish the graph
/// early when the web returns nothing.
pub fn build_answer_graph() -> Result<GraphRuntime, GraphError> {
    GraphBuilder::new()
        .entry("router")
        .max_steps(10)
        .node(Box::new(RouterNode::new()))
        .node(Box::new(RetrieveNode::new()))
        .node(Box::new(SummarizeNode::new()))
        .node(Box::new(SynthesizeNode::new()))
        // Router edges (conditional routing based on decision)
        .conditional_edge("router", "retrieve", "search")
        .conditional_edge("router", "synthesize", "direct")
        // Search path (default edges)
        .edge("retrieve", "summarize")
        .edge("summarize", "synthesize")
        .build()
}
