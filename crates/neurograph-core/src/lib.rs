//! Core domain types shared across the entire NeuroGraph workspace.
//!
//! The central value is [`Graph`]: an ordered list of typed nodes plus a list
//! of directed edges describing a neural network architecture. Graphs are
//! produced by an external model service and are only ever replaced
//! wholesale, never patched in place.

mod chat;
mod error;
mod upload;

pub use chat::{ChatMessage, ChatResponse, Conversation, GraphUpdate, Role};
pub use error::{CoreError, CoreResult, GraphValidationError};
pub use upload::UploadedFile;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Identifier for nodes within a [`Graph`].
///
/// Identifiers are chosen by the model service (e.g. `"conv1"`), so they are
/// free-form strings rather than generated integers.
#[derive(
    Debug, Default, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Create a node identifier from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A single architectural unit (layer, input, output, ...) in the graph.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    /// Unique identifier for this node.
    pub id: NodeId,
    /// Human readable label shown on the canvas.
    pub label: String,
    /// Open-vocabulary type tag, e.g. `conv`, `linear`, `pool`, `input`, `output`.
    #[serde(rename = "type")]
    pub node_type: String,
    /// Free-text explanation of what the layer does.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Display color suggested by the model service (CSS color string).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_color: Option<String>,
}

impl GraphNode {
    /// Create a node with the required fields only.
    pub fn new(id: impl Into<NodeId>, label: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            node_type: node_type.into(),
            description: None,
            suggested_color: None,
        }
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach a suggested color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.suggested_color = Some(color.into());
        self
    }
}

/// Directed connection between two nodes.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GraphEdge {
    /// Originating node identifier.
    pub source: NodeId,
    /// Destination node identifier.
    pub target: NodeId,
    /// Optional label, typically a tensor shape or operation name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl GraphEdge {
    /// Create an unlabeled edge.
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            label: None,
        }
    }

    /// Attach a label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Node/edge structure representing an analyzed model architecture.
///
/// Not required to be acyclic or connected, and may be empty.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Graph {
    /// All nodes, in the order the service returned them.
    pub nodes: Vec<GraphNode>,
    /// All edges connecting nodes.
    pub edges: Vec<GraphEdge>,
}

impl Graph {
    /// Creates an empty graph with no nodes or edges.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a graph from its parts.
    pub fn new(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
        Self { nodes, edges }
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph has no nodes and no edges.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Look up a node by identifier.
    pub fn node(&self, id: &NodeId) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// Check structural integrity: non-empty unique node ids and edges whose
    /// endpoints name existing nodes.
    pub fn validate(&self) -> Result<(), GraphValidationError> {
        let mut seen: HashSet<&NodeId> = HashSet::with_capacity(self.nodes.len());
        for (index, node) in self.nodes.iter().enumerate() {
            if node.id.0.trim().is_empty() {
                return Err(GraphValidationError::EmptyNodeId { index });
            }
            if !seen.insert(&node.id) {
                return Err(GraphValidationError::DuplicateNodeId {
                    id: node.id.clone(),
                });
            }
        }

        for (index, edge) in self.edges.iter().enumerate() {
            for endpoint in [&edge.source, &edge.target] {
                if !seen.contains(endpoint) {
                    return Err(GraphValidationError::DanglingEdge {
                        index,
                        missing: endpoint.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Convert to a petgraph `StableDiGraph` for analysis.
    /// Returns the graph and a mapping from `NodeId` to `NodeIndex`.
    ///
    /// Edges with unknown endpoints are skipped.
    pub fn to_petgraph(
        &self,
    ) -> (
        StableDiGraph<GraphNode, Option<String>>,
        HashMap<NodeId, NodeIndex>,
    ) {
        let mut graph = StableDiGraph::new();
        let mut id_to_index = HashMap::new();

        for node in &self.nodes {
            let idx = graph.add_node(node.clone());
            id_to_index.insert(node.id.clone(), idx);
        }

        for edge in &self.edges {
            if let (Some(&from_idx), Some(&to_idx)) =
                (id_to_index.get(&edge.source), id_to_index.get(&edge.target))
            {
                graph.add_edge(from_idx, to_idx, edge.label.clone());
            }
        }

        (graph, id_to_index)
    }

    /// Compute counts and shape information for display.
    pub fn summary(&self) -> GraphSummary {
        let (graph, _) = self.to_petgraph();
        let mut node_types: BTreeMap<String, usize> = BTreeMap::new();
        for node in &self.nodes {
            *node_types.entry(node.node_type.clone()).or_default() += 1;
        }

        GraphSummary {
            nodes: self.node_count(),
            edges: self.edge_count(),
            node_types,
            is_acyclic: !petgraph::algo::is_cyclic_directed(&graph),
        }
    }
}

/// Aggregate statistics about a [`Graph`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSummary {
    /// Number of nodes.
    pub nodes: usize,
    /// Number of edges.
    pub edges: usize,
    /// Node count per type tag.
    pub node_types: BTreeMap<String, usize>,
    /// Whether the edges form a DAG.
    pub is_acyclic: bool,
}

impl fmt::Display for GraphSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} nodes, {} edges", self.nodes, self.edges)?;
        if !self.is_acyclic {
            write!(f, " (cyclic)")?;
        }
        Ok(())
    }
}
