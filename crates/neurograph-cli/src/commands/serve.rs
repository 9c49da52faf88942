//! Serve command implementation.
//!
//! - `/api/*` - REST and WebSocket endpoints (via neurograph-api)
//! - `/` - Optional static front end from `--static-dir`

use std::path::Path;

use anyhow::{bail, Context, Result};
use axum::Router;
use neurograph_api::{create_api_router, create_api_state};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::info;

use crate::commands::open_session;
use crate::config::Config;

/// Execute the serve command.
pub async fn execute(config: &Config, host: &str, port: u16, static_dir: Option<&Path>) -> Result<()> {
    let model = config.resolver()?.model_name;
    let session = open_session(config)?;
    let api_router = create_api_router(create_api_state(session.clone()));

    let mut app = Router::new().nest("/api", api_router);
    if let Some(dir) = static_dir {
        if !dir.is_dir() {
            bail!("Static directory not found: {}", dir.display());
        }
        app = app.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true));
    }

    let listener = TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind {host}:{port}"))?;
    let addr = listener.local_addr()?;
    info!(%addr, session = %session.id(), model = %model, "server_listening");

    println!();
    println!("🚀 NeuroGraph Server");
    println!("   API:   http://{addr}/api/health");
    println!("   WS:    ws://{addr}/api/ws");
    println!("   Model: {model}");
    if let Some(dir) = static_dir {
        println!("   UI:    http://{addr}/ ({})", dir.display());
    }
    println!();
    println!("   Press Ctrl+C to stop");
    println!();

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    info!("server_stopped");
    Ok(())
}
