//! Events broadcast to renderers and other observers of a session.

use neurograph_core::{ChatMessage, GraphSummary};
use serde::{Deserialize, Serialize};

use crate::layout::LayoutState;

/// Which long-running operation an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Code analysis (generate).
    Analysis,
    /// A chat turn.
    Chat,
}

/// Change notification emitted after the session state was mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The current graph was replaced. `summary` is null when cleared.
    GraphReplaced {
        revision: u64,
        summary: Option<GraphSummary>,
    },
    /// A message was appended to the conversation.
    MessageAppended { index: usize, message: ChatMessage },
    /// An operation started or finished.
    BusyChanged { operation: Operation, busy: bool },
    /// Panel visibility changed.
    LayoutChanged { layout: LayoutState },
    /// The source text was replaced.
    CodeChanged { chars: usize },
    /// The set of uploaded files changed.
    FilesChanged { names: Vec<String> },
    /// An operation failed.
    ErrorRaised { operation: Operation, message: String },
    /// The error slot was cleared.
    ErrorCleared,
}
