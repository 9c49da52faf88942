//! Conversation types for the assistant chat panel.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Graph;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Written by the user.
    User,
    /// Written by the model service.
    Model,
}

impl Role {
    /// Wire label used by OpenAI-compatible chat APIs.
    pub fn completion_role(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "assistant",
        }
    }
}

/// One message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who wrote the message.
    pub role: Role,
    /// Message text.
    pub text: String,
}

impl ChatMessage {
    /// A user-authored message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    /// An assistant-authored message.
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// Append-only message log for a session.
///
/// Messages are never edited or reordered once pushed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    /// Create an empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return its position.
    pub fn push(&mut self, message: ChatMessage) -> usize {
        self.messages.push(message);
        self.messages.len() - 1
    }

    /// All messages in issuance order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Most recent message.
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether no message has been sent yet.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Iterate over messages.
    pub fn iter(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }
}

/// Whether a chat turn replaces the current graph.
///
/// On the wire this is an optional graph: absent or `null` means
/// [`GraphUpdate::Retain`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<Graph>", into = "Option<Graph>")]
pub enum GraphUpdate {
    /// Keep the current graph untouched.
    #[default]
    Retain,
    /// Replace the current graph wholesale.
    Replace(Graph),
}

impl GraphUpdate {
    /// The replacement graph, if any.
    pub fn graph(&self) -> Option<&Graph> {
        match self {
            GraphUpdate::Retain => None,
            GraphUpdate::Replace(graph) => Some(graph),
        }
    }

    /// Whether this update replaces the graph.
    pub fn is_replace(&self) -> bool {
        matches!(self, GraphUpdate::Replace(_))
    }
}

impl From<Option<Graph>> for GraphUpdate {
    fn from(value: Option<Graph>) -> Self {
        match value {
            Some(graph) => GraphUpdate::Replace(graph),
            None => GraphUpdate::Retain,
        }
    }
}

impl From<GraphUpdate> for Option<Graph> {
    fn from(value: GraphUpdate) -> Self {
        match value {
            GraphUpdate::Retain => None,
            GraphUpdate::Replace(graph) => Some(graph),
        }
    }
}

/// Answer from the model service for one chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    /// Answer text shown in the conversation.
    pub answer: String,
    /// Optional full replacement for the current graph.
    #[serde(default)]
    #[schemars(with = "Option<Graph>")]
    pub updated_graph: GraphUpdate,
}

impl ChatResponse {
    /// An answer that leaves the graph untouched.
    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            answer: text.into(),
            updated_graph: GraphUpdate::Retain,
        }
    }

    /// An answer that replaces the graph.
    pub fn with_graph(text: impl Into<String>, graph: Graph) -> Self {
        Self {
            answer: text.into(),
            updated_graph: GraphUpdate::Replace(graph),
        }
    }
}
