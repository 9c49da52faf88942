//! Holder for the current graph.

use neurograph_core::Graph;

/// Single source of truth for "the current graph".
///
/// Every change is a whole-graph replacement; there is no incremental node or
/// edge editing and no validation here.
#[derive(Debug, Clone, Default)]
pub struct GraphState {
    current: Option<Graph>,
    revision: u64,
}

impl GraphState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the graph wholesale. `None` means "no graph yet".
    /// Returns the new revision.
    pub fn set(&mut self, graph: Option<Graph>) -> u64 {
        self.current = graph;
        self.revision += 1;
        self.revision
    }

    /// The current graph, if any.
    pub fn get(&self) -> Option<&Graph> {
        self.current.as_ref()
    }

    /// Number of replacements performed so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
