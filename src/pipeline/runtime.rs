// Graph Runtime - petgraph based
// Directed-graph execution engine for the answer pipeline

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;

use super::node::{GraphError, Node, NodeContext, NodeOutput};
use super::state::RequestState;

/// Edge condition for graph routing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EdgeCondition {
    /// Always follow this edge (default edge)
    Always,
    /// Follow this edge when the node branches with this label
    OnBranch(String),
}

impl EdgeCondition {
    pub fn on(branch: impl Into<String>) -> Self {
        Self::OnBranch(branch.into())
    }

    pub fn matches(&self, branch: Option<&str>) -> bool {
        match (self, branch) {
            (EdgeCondition::Always, None) => true,
            (EdgeCondition::OnBranch(expected), Some(actual)) => expected == actual,
            _ => false,
        }
    }
}

/// petgraph-based pipeline runtime
pub struct GraphRuntime {
    /// The underlying directed graph
    graph: DiGraph<Box<dyn Node>, EdgeCondition>,
    /// Map from node ID to NodeIndex for lookup
    node_indices: HashMap<String, NodeIndex>,
    /// Entry point node ID
    entry_node_id: String,
    /// Maximum execution steps (recursion limit)
    max_steps: usize,
}

impl GraphRuntime {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_indices: HashMap::new(),
            entry_node_id: String::new(),
            max_steps: 50,
        }
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, node: Box<dyn Node>) -> NodeIndex {
        let id = node.id().to_string();
        let index = self.graph.add_node(node);
        self.node_indices.insert(id, index);
        index
    }

    /// Add a conditional edge between two nodes
    pub fn add_conditional_edge(
        &mut self,
        from: &str,
        to: &str,
        condition: EdgeCondition,
    ) -> Result<(), GraphError> {
        let from_idx = self
            .node_indices
            .get(from)
            .ok_or_else(|| GraphError::new(from, format!("source node not found: {}", from)))?;
        let to_idx = self
            .node_indices
            .get(to)
            .ok_or_else(|| GraphError::new(to, format!("target node not found: {}", to)))?;

        self.graph.add_edge(*from_idx, *to_idx, condition);
        Ok(())
    }

    /// Execute the graph from the entry node until a node returns `Final`.
    pub async fn run(
        &self,
        state: &mut RequestState,
        ctx: &NodeContext<'_>,
    ) -> Result<(), GraphError> {
        if self.entry_node_id.is_empty() {
            return Err(GraphError::new("runtime", "no entry node set"));
        }

        let mut current_idx = *self.node_indices.get(&self.entry_node_id).ok_or_else(|| {
            GraphError::new(
                "runtime",
                format!("entry node not found: {}", self.entry_node_id),
            )
        })?;

        let mut step = 0;

        loop {
            if step >= self.max_steps {
                return Err(GraphError::new(
                    "runtime",
                    format!("maximum steps ({}) exceeded", self.max_steps),
                ));
            }

            let node = self
                .graph
                .node_weight(current_idx)
                .ok_or_else(|| GraphError::new("runtime", "node not found in graph"))?;

            let node_id = node.id();
            tracing::debug!("Executing node: {} (step {})", node_id, step);

            let output = node.execute(state, ctx).await?;

            match output {
                NodeOutput::Final => {
                    tracing::debug!("Graph execution complete at node: {}", node_id);
                    return Ok(());
                }
                NodeOutput::Continue => {
                    current_idx = self.resolve_next_node(current_idx, None)?;
                }
                NodeOutput::Branch(branch) => {
                    current_idx = self.resolve_next_node(current_idx, Some(&branch))?;
                }
            }

            step += 1;
        }
    }

    /// Resolve the next node based on outgoing edges
    fn resolve_next_node(
        &self,
        current_idx: NodeIndex,
        branch: Option<&str>,
    ) -> Result<NodeIndex, GraphError> {
        let current_id = self
            .graph
            .node_weight(current_idx)
            .map(|n| n.id())
            .unwrap_or("unknown");

        let mut edges_with_targets: Vec<(NodeIndex, &EdgeCondition)> = Vec::new();
        for edge_ref in self.graph.edges_directed(current_idx, Direction::Outgoing) {
            edges_with_targets.push((edge_ref.target(), edge_ref.weight()));
        }

        if edges_with_targets.is_empty() {
            return Err(GraphError::new(
                current_id,
                format!("no outgoing edges from node: {}", current_id),
            ));
        }

        // First, try to find an edge matching the branch label
        if let Some(label) = branch {
            for (target_idx, weight) in &edges_with_targets {
                if let EdgeCondition::OnBranch(expected) = weight {
                    if expected == label {
                        return Ok(*target_idx);
                    }
                }
            }
        }

        // Fall back to default (Always) edge
        for (target_idx, weight) in &edges_with_targets {
            if **weight == EdgeCondition::Always {
                if let Some(label) = branch {
                    tracing::warn!(
                        "Branch '{}' not matched for node '{}', using default edge",
                        label,
                        current_id
                    );
                }
                return Ok(*target_idx);
            }
        }

        Err(GraphError::new(
            current_id,
            format!("no matching edge for branch: {:?}", branch.unwrap_or("(none)")),
        ))
    }
}

impl Default for GraphRuntime {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing graphs fluently
pub struct GraphBuilder {
    runtime: GraphRuntime,
    pending_edges: Vec<(String, String, EdgeCondition)>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            runtime: GraphRuntime::new(),
            pending_edges: Vec::new(),
        }
    }

    pub fn entry(mut self, node_id: impl Into<String>) -> Self {
        self.runtime.entry_node_id = node_id.into();
        self
    }

    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.runtime.max_steps = max_steps;
        self
    }

    pub fn node(mut self, node: Box<dyn Node>) -> Self {
        self.runtime.add_node(node);
        self
    }

    pub fn edge(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.pending_edges
            .push((from.into(), to.into(), EdgeCondition::Always));
        self
    }

    pub fn conditional_edge(
        mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        self.pending_edges
            .push((from.into(), to.into(), EdgeCondition::on(branch)));
        self
    }

    pub fn build(mut self) -> Result<GraphRuntime, GraphError> {
        for (from, to, condition) in self.pending_edges {
            self.runtime.add_conditional_edge(&from, &to, condition)?;
        }
        Ok(self.runtime)
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[test]
    fn edge_condition_matching() {
        assert!(EdgeCondition::Always.matches(None));
        assert!(!EdgeCondition::Always.matches(Some("search")));

        assert!(EdgeCondition::on("search").matches(Some("search")));
        assert!(!EdgeCondition::on("search").matches(Some("direct")));
        assert!(!EdgeCondition::on("search").matches(None));
    }

    struct StubNode(&'static str);

    #[async_trait]
    impl Node for StubNode {
        fn id(&self) -> &'static str {
            self.0
        }

        async fn execute(
            &self,
            _state: &mut RequestState,
            _ctx: &NodeContext<'_>,
        ) -> Result<NodeOutput, GraphError> {
            Ok(NodeOutput::Final)
        }
    }

    #[test]
    fn builder_rejects_edges_to_unknown_nodes() {
        let result = GraphBuilder::new()
            .entry("a")
            .node(Box::new(StubNode("a")))
            .edge("a", "missing")
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn builder_wires_known_nodes() {
        let result = GraphBuilder::new()
            .entry("a")
            .node(Box::new(StubNode("a")))
            .node(Box::new(StubNode("b")))
            .edge("a", "b")
            .conditional_edge("a", "b", "retry")
            .build();

        assert!(result.is_ok());
    }
}
