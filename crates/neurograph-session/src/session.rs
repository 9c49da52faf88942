//! The session controller.
//!
//! A [`Session`] owns every piece of mutable UI state (source text, uploaded
//! files, current graph, conversation, layout, error slot) and is the only
//! place that state is mutated. Panels hold an `Arc<Session>` and call into
//! it; renderers observe changes through [`Session::subscribe`].

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use neurograph_core::{ChatMessage, Conversation, Graph, GraphSummary, GraphUpdate, UploadedFile};
use neurograph_llm::{
    AnalysisRequest, ChatRequest, ModelService, ServiceError, ServiceResult, DEFAULT_TIMEOUT,
};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{SessionError, SessionResult};
use crate::events::{Operation, SessionEvent};
use crate::graph_state::GraphState;
use crate::layout::LayoutState;

/// Example model shown in the code panel of a fresh session.
pub const DEFAULT_CODE: &str = r#"import torch
import torch.nn as nn
import torch.nn.functional as F

# Example: Paste your complex model here or upload files

class SimpleNet(nn.Module):
    def __init__(self):
        super(SimpleNet, self).__init__()
        self.conv1 = nn.Conv2d(1, 10, kernel_size=5)
        self.conv2 = nn.Conv2d(10, 20, kernel_size=5)
        self.fc1 = nn.Linear(320, 50)
        self.fc2 = nn.Linear(50, 10)

    def forward(self, x):
        x = F.relu(F.max_pool2d(self.conv1(x), 2))
        x = F.relu(F.max_pool2d(self.conv2(x), 2))
        x = x.view(-1, 320)
        x = F.relu(self.fc1(x))
        x = self.fc2(x)
        return x
"#;

const EVENT_CAPACITY: usize = 100;

/// Tunables for a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Upper bound on one model service call.
    pub request_timeout: Duration,
    /// Largest accepted uploaded file, in bytes.
    pub max_upload_bytes: u64,
    /// Source text the code panel starts with.
    pub initial_code: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_TIMEOUT,
            max_upload_bytes: 512 * 1024,
            initial_code: DEFAULT_CODE.to_string(),
        }
    }
}

/// Why a request was not issued. Not an error: the action is simply not
/// offered in this state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Nothing but whitespace to send.
    EmptyInput,
    /// A request of the same kind is still outstanding.
    Busy,
}

/// Result of [`Session::generate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerateOutcome {
    /// A new graph replaced the current one.
    Applied { summary: GraphSummary },
    /// No request was issued.
    Skipped { reason: SkipReason },
}

/// Result of [`Session::send_chat`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChatOutcome {
    /// The assistant answered; `graph_updated` tells whether the graph was replaced.
    Answered { answer: String, graph_updated: bool },
    /// No request was issued.
    Skipped { reason: SkipReason },
}

/// Name and size of an uploaded file, without its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
}

/// Point-in-time copy of everything a front end needs to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub code: String,
    pub files: Vec<FileInfo>,
    pub graph: Option<Graph>,
    pub conversation: Vec<ChatMessage>,
    pub layout: LayoutState,
    pub generating: bool,
    pub chatting: bool,
    pub last_error: Option<String>,
}

#[derive(Debug, Default)]
struct SessionState {
    code: String,
    files: Vec<UploadedFile>,
    graph: GraphState,
    conversation: Conversation,
    layout: LayoutState,
    last_error: Option<String>,
}

/// Owned session state plus the model service it talks to.
pub struct Session {
    id: Uuid,
    service: Arc<dyn ModelService>,
    config: SessionConfig,
    state: RwLock<SessionState>,
    generating: AtomicBool,
    chatting: AtomicBool,
    events: broadcast::Sender<SessionEvent>,
}

/// Clears a busy flag when the guarded operation ends, however it ends.
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
    operation: Operation,
    events: &'a broadcast::Sender<SessionEvent>,
}

impl<'a> BusyGuard<'a> {
    fn acquire(
        flag: &'a AtomicBool,
        operation: Operation,
        events: &'a broadcast::Sender<SessionEvent>,
    ) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        let _ = events.send(SessionEvent::BusyChanged {
            operation,
            busy: true,
        });
        Some(Self {
            flag,
            operation,
            events,
        })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
        let _ = self.events.send(SessionEvent::BusyChanged {
            operation: self.operation,
            busy: false,
        });
    }
}

impl Session {
    /// Create a session with default configuration.
    pub fn new(service: Arc<dyn ModelService>) -> Self {
        Self::with_config(service, SessionConfig::default())
    }

    /// Create a session with explicit configuration.
    pub fn with_config(service: Arc<dyn ModelService>, config: SessionConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let state = SessionState {
            code: config.initial_code.clone(),
            ..SessionState::default()
        };
        let id = Uuid::new_v4();
        debug!(session = %id, service = %service.name(), "session_created");

        Self {
            id,
            service,
            config,
            state: RwLock::new(state),
            generating: AtomicBool::new(false),
            chatting: AtomicBool::new(false),
            events,
        }
    }

    /// Unique identifier of this session.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Active configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    // =========================================================================
    // Graph state
    // =========================================================================

    /// The current graph, or `None` before the first successful analysis.
    pub async fn graph(&self) -> Option<Graph> {
        self.state.read().await.graph.get().cloned()
    }

    /// Replace the current graph wholesale. No validation is performed.
    pub async fn set_graph(&self, graph: Option<Graph>) {
        let mut state = self.state.write().await;
        self.replace_graph(&mut state, graph);
    }

    fn replace_graph(&self, state: &mut SessionState, graph: Option<Graph>) {
        let summary = graph.as_ref().map(Graph::summary);
        let revision = state.graph.set(graph);
        self.emit(SessionEvent::GraphReplaced { revision, summary });
    }

    // =========================================================================
    // Code panel
    // =========================================================================

    /// Current source text.
    pub async fn code(&self) -> String {
        self.state.read().await.code.clone()
    }

    /// Replace the source text.
    pub async fn set_code(&self, code: impl Into<String>) {
        let code = code.into();
        let chars = code.chars().count();
        self.state.write().await.code = code;
        self.emit(SessionEvent::CodeChanged { chars });
    }

    /// Uploaded files, in upload order.
    pub async fn files(&self) -> Vec<UploadedFile> {
        self.state.read().await.files.clone()
    }

    /// Add an uploaded file, replacing any earlier file with the same name.
    pub async fn add_file(&self, file: UploadedFile) -> SessionResult<()> {
        file.ensure_within(self.config.max_upload_bytes)?;
        info!(name = %file.name, size = %file.human_size(), "file_uploaded");

        let names = {
            let mut state = self.state.write().await;
            match state.files.iter_mut().find(|f| f.name == file.name) {
                Some(existing) => *existing = file,
                None => state.files.push(file),
            }
            file_names(&state.files)
        };
        self.emit(SessionEvent::FilesChanged { names });
        Ok(())
    }

    /// Remove an uploaded file by name.
    pub async fn remove_file(&self, name: &str) -> SessionResult<UploadedFile> {
        let (removed, names) = {
            let mut state = self.state.write().await;
            let position = state
                .files
                .iter()
                .position(|f| f.name == name)
                .ok_or_else(|| SessionError::FileNotFound(name.to_string()))?;
            let removed = state.files.remove(position);
            (removed, file_names(&state.files))
        };
        self.emit(SessionEvent::FilesChanged { names });
        Ok(removed)
    }

    /// Drop all uploaded files.
    pub async fn clear_files(&self) {
        self.state.write().await.files.clear();
        self.emit(SessionEvent::FilesChanged { names: Vec::new() });
    }

    // =========================================================================
    // Analysis
    // =========================================================================

    /// Whether an analysis request is outstanding.
    pub fn is_generating(&self) -> bool {
        self.generating.load(Ordering::Acquire)
    }

    /// Send the code (and uploaded files) to the model service and replace the
    /// current graph with the result.
    ///
    /// Blank input or an outstanding analysis skip the call entirely. On
    /// failure the previous graph is kept and the error slot is set.
    pub async fn generate(&self) -> SessionResult<GenerateOutcome> {
        let request = {
            let state = self.state.read().await;
            AnalysisRequest::new(state.code.clone()).with_files(state.files.clone())
        };
        if !request.has_input() {
            debug!(session = %self.id, "analysis_skipped_empty_input");
            return Ok(GenerateOutcome::Skipped {
                reason: SkipReason::EmptyInput,
            });
        }

        let Some(_busy) = BusyGuard::acquire(&self.generating, Operation::Analysis, &self.events)
        else {
            debug!(session = %self.id, "analysis_skipped_busy");
            return Ok(GenerateOutcome::Skipped {
                reason: SkipReason::Busy,
            });
        };

        self.clear_error().await;
        info!(
            session = %self.id,
            chars = request.code.len(),
            files = request.files.len(),
            "analysis_request_start"
        );
        let started = Instant::now();

        let result = self
            .bounded(self.service.analyze(&request))
            .await
            .map_err(SessionError::from)
            .and_then(|graph| {
                graph.validate()?;
                Ok(graph)
            });

        match result {
            Ok(graph) => {
                let summary = graph.summary();
                {
                    let mut state = self.state.write().await;
                    self.replace_graph(&mut state, Some(graph));
                    if state.layout.open_chat() {
                        self.emit(SessionEvent::LayoutChanged {
                            layout: state.layout,
                        });
                    }
                }
                info!(
                    session = %self.id,
                    nodes = summary.nodes,
                    edges = summary.edges,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "analysis_request_complete"
                );
                Ok(GenerateOutcome::Applied { summary })
            }
            Err(err) => Err(self.fail(Operation::Analysis, err).await),
        }
    }

    // =========================================================================
    // Chat
    // =========================================================================

    /// Whether a chat turn is outstanding.
    pub fn is_chatting(&self) -> bool {
        self.chatting.load(Ordering::Acquire)
    }

    /// Conversation so far.
    pub async fn conversation(&self) -> Vec<ChatMessage> {
        self.state.read().await.conversation.messages().to_vec()
    }

    /// Run one chat turn.
    ///
    /// The user message is appended before the call and stays in the log even
    /// if the call fails. On success the answer is appended and, when the
    /// service returned a graph, the current graph is replaced wholesale.
    pub async fn send_chat(&self, message: &str) -> SessionResult<ChatOutcome> {
        let message = message.trim();
        if message.is_empty() {
            return Ok(ChatOutcome::Skipped {
                reason: SkipReason::EmptyInput,
            });
        }

        let Some(_busy) = BusyGuard::acquire(&self.chatting, Operation::Chat, &self.events) else {
            debug!(session = %self.id, "chat_skipped_busy");
            return Ok(ChatOutcome::Skipped {
                reason: SkipReason::Busy,
            });
        };

        let request = {
            let mut state = self.state.write().await;
            let history = state.conversation.messages().to_vec();
            let user_message = ChatMessage::user(message);
            let index = state.conversation.push(user_message.clone());
            self.emit(SessionEvent::MessageAppended {
                index,
                message: user_message,
            });

            ChatRequest {
                message: message.to_string(),
                code: state.code.clone(),
                graph: state.graph.get().cloned(),
                history,
                files: state.files.clone(),
            }
        };

        info!(
            session = %self.id,
            history = request.history.len(),
            has_graph = request.graph.is_some(),
            "chat_turn_start"
        );
        let started = Instant::now();

        let result = self
            .bounded(self.service.chat(&request))
            .await
            .map_err(SessionError::from)
            .and_then(|response| {
                if let GraphUpdate::Replace(graph) = &response.updated_graph {
                    graph.validate()?;
                }
                Ok(response)
            });

        let response = match result {
            Ok(response) => response,
            Err(err) => return Err(self.fail(Operation::Chat, err).await),
        };

        let graph_updated = response.updated_graph.is_replace();
        {
            let mut state = self.state.write().await;
            let model_message = ChatMessage::model(response.answer.clone());
            let index = state.conversation.push(model_message.clone());
            self.emit(SessionEvent::MessageAppended {
                index,
                message: model_message,
            });

            if let GraphUpdate::Replace(graph) = response.updated_graph {
                self.replace_graph(&mut state, Some(graph));
            }
            if state.last_error.take().is_some() {
                self.emit(SessionEvent::ErrorCleared);
            }
        }

        info!(
            session = %self.id,
            graph_updated,
            duration_ms = started.elapsed().as_millis() as u64,
            "chat_turn_complete"
        );
        Ok(ChatOutcome::Answered {
            answer: response.answer,
            graph_updated,
        })
    }

    // =========================================================================
    // Layout and errors
    // =========================================================================

    /// Current panel visibility.
    pub async fn layout(&self) -> LayoutState {
        self.state.read().await.layout
    }

    /// Flip the code panel.
    pub async fn toggle_code_panel(&self) -> LayoutState {
        let mut state = self.state.write().await;
        state.layout.toggle_code();
        self.emit(SessionEvent::LayoutChanged {
            layout: state.layout,
        });
        state.layout
    }

    /// Flip the chat panel.
    pub async fn toggle_chat_panel(&self) -> LayoutState {
        let mut state = self.state.write().await;
        state.layout.toggle_chat();
        self.emit(SessionEvent::LayoutChanged {
            layout: state.layout,
        });
        state.layout
    }

    /// Message of the most recent failure, until dismissed.
    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.last_error.clone()
    }

    /// Clear the error slot.
    pub async fn dismiss_error(&self) {
        self.clear_error().await;
    }

    async fn clear_error(&self) {
        if self.state.write().await.last_error.take().is_some() {
            self.emit(SessionEvent::ErrorCleared);
        }
    }

    /// Everything a renderer needs, captured under one lock.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read().await;
        SessionSnapshot {
            id: self.id,
            code: state.code.clone(),
            files: state
                .files
                .iter()
                .map(|f| FileInfo {
                    name: f.name.clone(),
                    size: f.size(),
                })
                .collect(),
            graph: state.graph.get().cloned(),
            conversation: state.conversation.messages().to_vec(),
            layout: state.layout,
            generating: self.is_generating(),
            chatting: self.is_chatting(),
            last_error: state.last_error.clone(),
        }
    }

    /// Apply the session timeout on top of whatever the service enforces.
    async fn bounded<T>(&self, call: impl Future<Output = ServiceResult<T>>) -> ServiceResult<T> {
        let after = self.config.request_timeout;
        tokio::time::timeout(after, call)
            .await
            .unwrap_or_else(|_| Err(ServiceError::Timeout { after }))
    }

    /// Record a failure in the error slot and hand it back to the caller.
    async fn fail(&self, operation: Operation, err: SessionError) -> SessionError {
        let message = err.to_string();
        warn!(session = %self.id, ?operation, "operation failed: {message}");
        self.state.write().await.last_error = Some(message.clone());
        self.emit(SessionEvent::ErrorRaised { operation, message });
        err
    }
}

fn file_names(files: &[UploadedFile]) -> Vec<String> {
    files.iter().map(|f| f.name.clone()).collect()
}
