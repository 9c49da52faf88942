//! Prompt templates and payload builders.

use neurograph_core::{ChatResponse, Graph, UploadedFile};
use schemars::schema_for;
use serde_json::json;

use crate::{AnalysisRequest, ChatRequest};

/// System prompt sent ahead of every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    pub system_prompt: String,
}

impl PromptTemplate {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: prompt.into(),
        }
    }

    /// Prompt asking the model to turn source code into a [`Graph`].
    pub fn analysis() -> Self {
        let schema = serde_json::to_string_pretty(&schema_for!(Graph))
            .unwrap_or_else(|_| "{}".into());
        let prompt = [
            "You are an expert deep learning engineer who reads neural network source code (PyTorch, TensorFlow, JAX, Keras, ...) and extracts its architecture.",
            "Return the architecture as a directed graph in JSON matching this schema:",
            &format!("```json\n{schema}\n```"),
            "Use one node per layer or significant operation, include explicit input and output nodes, and give every node a unique short id.",
            "Use lowercase type tags such as input, output, conv, linear, pool, activation, norm, dropout, attention, embedding, recurrent, reshape, merge.",
            "Label edges with tensor shapes when they can be inferred. Every edge must reference existing node ids.",
            "Reply with the JSON object only, never wrap it in explanations.",
        ]
        .join("\n\n");
        Self::new(prompt)
    }

    /// Prompt for follow-up questions and graph edits.
    pub fn chat() -> Self {
        let schema = serde_json::to_string_pretty(&schema_for!(ChatResponse))
            .unwrap_or_else(|_| "{}".into());
        let prompt = [
            "You are an assistant helping a user understand and edit a neural network architecture diagram.",
            "Each request carries the current source code, the current graph (or null) and the user's question.",
            "Answer as JSON matching this schema:",
            &format!("```json\n{schema}\n```"),
            "Put your explanation in `answer`. Only when the user asks to change the diagram, set `updatedGraph` to the COMPLETE new graph (it replaces the old one, it is not a patch); otherwise omit it or use null.",
            "Every edge in `updatedGraph` must reference existing node ids, and node ids must be unique.",
            "Reply with the JSON object only.",
        ]
        .join("\n\n");
        Self::new(prompt)
    }
}

/// Render the user message for an analysis call.
pub fn analysis_payload(request: &AnalysisRequest) -> String {
    let mut payload = String::from("Analyze the following neural network code and return its architecture graph.\n");
    if !request.code.trim().is_empty() {
        payload.push_str(&format!("\n### Main code\n```\n{}\n```\n", request.code.trim()));
    }
    push_files(&mut payload, &request.files);
    payload
}

/// Render the final user message for a chat call, carrying code, graph and
/// uploaded files as context.
pub fn chat_payload(request: &ChatRequest) -> String {
    let context = json!({
        "code": request.code,
        "graph": request.graph,
    });
    let mut payload = format!(
        "Current context:\n```json\n{}\n```\n",
        serde_json::to_string_pretty(&context).unwrap_or_else(|_| "{}".into())
    );
    push_files(&mut payload, &request.files);
    payload.push_str(&format!("\nUser question: {}", request.message.trim()));
    payload
}

fn push_files(payload: &mut String, files: &[UploadedFile]) {
    for file in files.iter().filter(|f| !f.is_blank()) {
        payload.push_str(&format!(
            "\n### File: {}\n```\n{}\n```\n",
            file.name,
            file.content.trim()
        ));
    }
}

/// Strip markdown fences and a leading `json` tag the model may add.
pub fn scrub_response(raw: &str) -> &str {
    raw.trim()
        .trim_matches('`')
        .trim_start_matches("json")
        .trim_matches(['`', ' ', '\n', '\r'])
}
