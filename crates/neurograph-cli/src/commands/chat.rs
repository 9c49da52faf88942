//! Chat command implementation.
//!
//! One question against a code file, with an optional graph from an earlier
//! `analyze` run as context.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use neurograph_core::Graph;
use neurograph_session::ChatOutcome;

use crate::commands::{analyze::read_source, open_session};
use crate::config::Config;

/// Execute the chat command.
pub async fn execute(
    config: &Config,
    path: &Path,
    message: &str,
    graph_path: Option<&Path>,
) -> Result<()> {
    if message.trim().is_empty() {
        bail!("Nothing to send: the message is blank");
    }

    let code = read_source(path)?.content;
    let graph = graph_path.map(load_graph).transpose()?;

    let session = open_session(config)?;
    session.set_code(code).await;
    session.set_graph(graph).await;

    match session.send_chat(message).await.context("Chat turn failed")? {
        ChatOutcome::Answered {
            answer,
            graph_updated,
        } => {
            println!("{answer}");
            if graph_updated {
                if let Some(graph) = session.graph().await {
                    eprintln!("🔁 Graph updated: {}", graph.summary());
                    println!("\n{}", serde_json::to_string_pretty(&graph)?);
                }
            }
        }
        ChatOutcome::Skipped { .. } => bail!("Nothing to send: the message is blank"),
    }
    Ok(())
}

fn load_graph(path: &Path) -> Result<Graph> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read graph from {}", path.display()))?;
    let graph: Graph = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a graph document", path.display()))?;
    graph
        .validate()
        .with_context(|| format!("{} holds an invalid graph", path.display()))?;
    Ok(graph)
}
