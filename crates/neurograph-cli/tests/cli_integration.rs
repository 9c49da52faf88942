//! Integration tests for the ngw CLI.
//!
//! Every run gets a private HOME so no real config file is touched. Model
//! calls go to an in-process mock endpoint or to a closed port.
//!
//! Run with: `cargo test --package neurograph-cli --test cli_integration`

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use axum::{routing::post, Json, Router};
use serde_json::{json, Value};
use tempfile::TempDir;

const LLM_VARS: [&str; 6] = [
    "NEUROGRAPH_LLM_API_URL",
    "NEUROGRAPH_LLM_API_KEY",
    "NEUROGRAPH_LLM_MODEL",
    "OPENAI_API_URL",
    "OPENAI_API_KEY",
    "OPENAI_MODEL_NAME",
];

/// Helper to run ngw in an isolated home directory.
fn run_ngw(home: &Path, envs: &[(&str, &str)], args: &[&str]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_ngw"));
    for var in LLM_VARS {
        command.env_remove(var);
    }
    command
        .current_dir(home)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .envs(envs.iter().copied())
        .args(args)
        .output()
        .expect("Failed to execute ngw command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Serve a chat completions endpoint that always answers with `content`.
async fn spawn_mock_llm(content: Value) -> String {
    let reply = json!({
        "choices": [{"message": {"role": "assistant", "content": content.to_string()}}]
    });
    let router = Router::new().route(
        "/v1/chat/completions",
        post(move || {
            let reply = reply.clone();
            async move { Json(reply) }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/v1")
}

// =============================================================================
// Basic commands
// =============================================================================

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    let output = run_ngw(home.path(), &[], &["--help"]);

    assert!(output.status.success());
    let text = stdout(&output);
    for command in ["serve", "analyze", "chat", "config"] {
        assert!(text.contains(command), "missing {command} in help");
    }
}

#[test]
fn test_version() {
    let home = TempDir::new().unwrap();
    let output = run_ngw(home.path(), &[], &["--version"]);

    assert!(output.status.success());
    assert!(stdout(&output).starts_with("ngw "));
}

#[test]
fn test_analyze_requires_paths() {
    let home = TempDir::new().unwrap();
    let output = run_ngw(home.path(), &[], &["analyze"]);

    assert!(!output.status.success());
}

// =============================================================================
// Config
// =============================================================================

#[test]
fn test_config_set_get_roundtrip() {
    let home = TempDir::new().unwrap();

    let output = run_ngw(home.path(), &[], &["config", "set", "port", "4123"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let output = run_ngw(home.path(), &[], &["config", "get", "port"]);
    assert_eq!(stdout(&output).trim(), "4123");

    let output = run_ngw(home.path(), &[], &["config", "reset"]);
    assert!(output.status.success());
    let output = run_ngw(home.path(), &[], &["config", "get", "port"]);
    assert_eq!(stdout(&output).trim(), "3000");
}

#[test]
fn test_config_env_overrides_file() {
    let home = TempDir::new().unwrap();
    run_ngw(home.path(), &[], &["config", "set", "model", "from-file"]);

    let output = run_ngw(
        home.path(),
        &[("NEUROGRAPH_LLM_MODEL", "from-env")],
        &["config", "get", "model"],
    );
    assert_eq!(stdout(&output).trim(), "from-env");
}

#[test]
fn test_config_unknown_key_fails() {
    let home = TempDir::new().unwrap();
    let output = run_ngw(home.path(), &[], &["config", "get", "github-token"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Unknown config key"));
}

#[test]
fn test_config_path_is_under_home() {
    let home = TempDir::new().unwrap();
    let output = run_ngw(home.path(), &[], &["config", "path"]);

    assert!(output.status.success());
    assert!(stdout(&output).trim().ends_with("config.json"));
}

// =============================================================================
// Analyze and chat without a reachable model
// =============================================================================

#[test]
fn test_analyze_blank_file_makes_no_call() {
    let home = TempDir::new().unwrap();
    let model = home.path().join("model.py");
    fs::write(&model, "   \n\n").unwrap();

    let output = run_ngw(
        home.path(),
        &[("NEUROGRAPH_LLM_API_URL", "http://127.0.0.1:9/v1")],
        &["analyze", model.to_str().unwrap()],
    );

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Nothing to analyze"));
}

#[test]
fn test_analyze_empty_directory_fails() {
    let home = TempDir::new().unwrap();
    let sources = home.path().join("src");
    fs::create_dir_all(&sources).unwrap();

    let output = run_ngw(home.path(), &[], &["analyze", sources.to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("No readable source files"));
}

#[test]
fn test_analyze_unreachable_service_fails() {
    let home = TempDir::new().unwrap();
    let model = home.path().join("model.py");
    fs::write(&model, "class Net(nn.Module): pass").unwrap();

    let output = run_ngw(
        home.path(),
        &[
            ("NEUROGRAPH_LLM_API_URL", "http://127.0.0.1:9/v1"),
            ("NEUROGRAPH_TIMEOUT_SECS", "5"),
        ],
        &["analyze", model.to_str().unwrap()],
    );

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Analysis failed"));
    assert!(stdout(&output).trim().is_empty());
}

#[test]
fn test_chat_blank_message_fails_fast() {
    let home = TempDir::new().unwrap();
    let model = home.path().join("model.py");
    fs::write(&model, "class Net: pass").unwrap();

    let output = run_ngw(
        home.path(),
        &[],
        &["chat", model.to_str().unwrap(), "--message", "   "],
    );

    assert!(!output.status.success());
    assert!(stderr(&output).contains("message is blank"));
}

// =============================================================================
// Against a mock model endpoint
// =============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_analyze_prints_graph_json() {
    let url = spawn_mock_llm(json!({
        "nodes": [
            {"id": "in", "label": "Input", "type": "input"},
            {"id": "n1", "label": "Conv", "type": "conv"}
        ],
        "edges": [{"source": "in", "target": "n1"}]
    }))
    .await;

    let home = TempDir::new().unwrap();
    let model = home.path().join("model.py");
    fs::write(&model, "class Net: ...").unwrap();
    let home_path = home.path().to_path_buf();
    let model_arg = model.to_str().unwrap().to_string();

    let output = tokio::task::spawn_blocking(move || {
        run_ngw(
            &home_path,
            &[("NEUROGRAPH_LLM_API_URL", url.as_str())],
            &["analyze", &model_arg],
        )
    })
    .await
    .unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let graph: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(graph["nodes"].as_array().unwrap().len(), 2);
    assert_eq!(graph["edges"][0]["target"], "n1");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_analyze_summary_to_file() {
    let url = spawn_mock_llm(json!({
        "nodes": [{"id": "fc", "label": "Linear", "type": "linear"}],
        "edges": []
    }))
    .await;

    let home = TempDir::new().unwrap();
    let model = home.path().join("model.py");
    fs::write(&model, "class Net: ...").unwrap();
    let out_file = home.path().join("summary.txt");
    let home_path = home.path().to_path_buf();
    let args = vec![
        "analyze".to_string(),
        model.to_str().unwrap().to_string(),
        "--format".to_string(),
        "summary".to_string(),
        "--output".to_string(),
        out_file.to_str().unwrap().to_string(),
    ];

    let output = tokio::task::spawn_blocking(move || {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        run_ngw(&home_path, &[("NEUROGRAPH_LLM_API_URL", url.as_str())], &args)
    })
    .await
    .unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let summary = fs::read_to_string(&out_file).unwrap();
    assert!(summary.starts_with("1 nodes, 0 edges"));
    assert!(summary.contains("fc [linear] Linear"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_chat_prints_answer_and_updated_graph() {
    let url = spawn_mock_llm(json!({
        "answer": "Removed.",
        "updatedGraph": {"nodes": [], "edges": []}
    }))
    .await;

    let home = TempDir::new().unwrap();
    let model = home.path().join("model.py");
    fs::write(&model, "class Net: ...").unwrap();
    let graph = home.path().join("graph.json");
    fs::write(
        &graph,
        r#"{"nodes":[{"id":"n1","label":"Conv","type":"conv"}],"edges":[]}"#,
    )
    .unwrap();
    let home_path = home.path().to_path_buf();
    let args = vec![
        "chat".to_string(),
        model.to_str().unwrap().to_string(),
        "--message".to_string(),
        "remove n1".to_string(),
        "--graph".to_string(),
        graph.to_str().unwrap().to_string(),
    ];

    let output = tokio::task::spawn_blocking(move || {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        run_ngw(&home_path, &[("NEUROGRAPH_LLM_API_URL", url.as_str())], &args)
    })
    .await
    .unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.starts_with("Removed."));
    assert!(text.contains("\"nodes\": []"));
}
