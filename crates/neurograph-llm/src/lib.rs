//! Model service boundary for NeuroGraph.
//!
//! Everything that leaves the process goes through [`ModelService`]: source
//! code in, [`Graph`] out for analysis; a question plus context in,
//! [`ChatResponse`] out for chat. The prompt and wire format are owned by the
//! implementation; callers only see these shapes and [`ServiceError`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use neurograph_llm::{AnalysisRequest, LlmResolver, ModelService, OpenAiService};
//!
//! # async fn run() -> Result<(), neurograph_llm::ServiceError> {
//! let service = OpenAiService::new(LlmResolver::from_env())?;
//! let graph = service
//!     .analyze(&AnalysisRequest::new("class Net(nn.Module): ..."))
//!     .await?;
//! println!("{} nodes", graph.node_count());
//! # Ok(())
//! # }
//! ```

mod error;
mod openai;
mod prompt;
mod resolver;

pub use error::{ServiceError, ServiceResult};
pub use openai::{OpenAiService, DEFAULT_TIMEOUT};
pub use prompt::{analysis_payload, chat_payload, scrub_response, PromptTemplate};
pub use resolver::LlmResolver;

use async_trait::async_trait;
use neurograph_core::{ChatMessage, ChatResponse, Graph, UploadedFile};
use serde::{Deserialize, Serialize};

/// Input for turning source code into a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Main source text from the code panel.
    pub code: String,
    /// Additional uploaded files.
    #[serde(default)]
    pub files: Vec<UploadedFile>,
}

impl AnalysisRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            files: Vec::new(),
        }
    }

    pub fn with_files(mut self, files: Vec<UploadedFile>) -> Self {
        self.files = files;
        self
    }

    /// Whether there is anything to analyze at all.
    pub fn has_input(&self) -> bool {
        !self.code.trim().is_empty() || self.files.iter().any(|f| !f.is_blank())
    }
}

/// Input for one chat turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The new user message.
    pub message: String,
    /// Current source text.
    pub code: String,
    /// Current graph, if one has been generated.
    pub graph: Option<Graph>,
    /// Messages exchanged before `message`, oldest first.
    #[serde(default)]
    pub history: Vec<ChatMessage>,
    /// Uploaded files for extra context.
    #[serde(default)]
    pub files: Vec<UploadedFile>,
}

/// The external model service.
#[async_trait]
pub trait ModelService: Send + Sync {
    /// Turn source code into an architecture graph.
    async fn analyze(&self, request: &AnalysisRequest) -> ServiceResult<Graph>;

    /// Answer a question about the code/graph, optionally editing the graph.
    async fn chat(&self, request: &ChatRequest) -> ServiceResult<ChatResponse>;

    /// Short name for logs.
    fn name(&self) -> String {
        "model-service".to_string()
    }
}
