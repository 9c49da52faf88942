//! Analyze command implementation.
//!
//! Reads source files, runs one analysis and prints the resulting graph.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use humansize::{format_size, DECIMAL};
use neurograph_core::{Graph, UploadedFile};
use neurograph_session::GenerateOutcome;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::commands::open_session;
use crate::config::Config;

/// How the graph is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The graph document as pretty JSON.
    Json,
    /// Counts, node types and an adjacency listing.
    Summary,
}

/// Execute the analyze command.
pub async fn execute(
    config: &Config,
    paths: &[PathBuf],
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let sources = collect_sources(paths)?;
    let Some((main, extra)) = sources.split_first() else {
        bail!("No readable source files found");
    };

    let total: u64 = sources.iter().map(UploadedFile::size).sum();
    eprintln!(
        "📄 Analyzing {} file(s), {}",
        sources.len(),
        format_size(total, DECIMAL)
    );

    let session = open_session(config)?;
    session.set_code(main.content.clone()).await;
    for file in extra {
        session
            .add_file(file.clone())
            .await
            .with_context(|| format!("Cannot attach {}", file.name))?;
    }

    match session.generate().await.context("Analysis failed")? {
        GenerateOutcome::Applied { summary } => eprintln!("✅ {summary}"),
        GenerateOutcome::Skipped { .. } => bail!("Nothing to analyze: every input is blank"),
    }

    let graph = session
        .graph()
        .await
        .context("Analysis finished without a graph")?;
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&graph)?,
        OutputFormat::Summary => render_summary(&graph),
    };

    match output {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("💾 Saved to {}", path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

/// Read every input path. Explicit files must be text; files found while
/// walking a directory are skipped when they are not.
fn collect_sources(paths: &[PathBuf]) -> Result<Vec<UploadedFile>> {
    let mut sources = Vec::new();

    for path in paths {
        if path.is_dir() {
            let walker = WalkDir::new(path)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || !is_hidden(e));
            for entry in walker {
                let entry = entry.with_context(|| format!("Failed to walk {}", path.display()))?;
                if !entry.file_type().is_file() {
                    continue;
                }
                match read_source(entry.path()) {
                    Ok(file) => sources.push(file),
                    Err(e) => warn!(path = %entry.path().display(), "skipping file: {e:#}"),
                }
            }
        } else if path.is_file() {
            sources.push(read_source(path)?);
        } else {
            bail!("Path not found: {}", path.display());
        }
    }

    debug!(files = sources.len(), "sources_collected");
    Ok(sources)
}

/// Read one file as an uploaded source file.
pub fn read_source(path: &Path) -> Result<UploadedFile> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(UploadedFile::from_bytes(path.display().to_string(), bytes)?)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn render_summary(graph: &Graph) -> String {
    let summary = graph.summary();
    let mut out = String::new();
    let _ = writeln!(out, "{summary}");

    if !summary.node_types.is_empty() {
        let types: Vec<String> = summary
            .node_types
            .iter()
            .map(|(kind, count)| format!("{kind}={count}"))
            .collect();
        let _ = writeln!(out, "types: {}", types.join(", "));
    }

    let _ = writeln!(out, "\nnodes:");
    for node in &graph.nodes {
        let _ = writeln!(out, "  {} [{}] {}", node.id, node.node_type, node.label);
    }
    if !graph.edges.is_empty() {
        let _ = writeln!(out, "\nedges:");
        for edge in &graph.edges {
            match &edge.label {
                Some(label) => {
                    let _ = writeln!(out, "  {} -> {} ({label})", edge.source, edge.target);
                }
                None => {
                    let _ = writeln!(out, "  {} -> {}", edge.source, edge.target);
                }
            }
        }
    }
    out.trim_end().to_string()
}
