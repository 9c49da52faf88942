//! NeuroGraph CLI - turn neural network source code into architecture graphs.
//!
//! `ngw serve` runs the REST + WebSocket API a browser front end talks to;
//! `ngw analyze` and `ngw chat` run one request from the terminal.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

mod commands;
mod config;

use commands::{analyze::OutputFormat, config as config_cmd};
use config::Config;

/// NeuroGraph CLI - visualize neural network architectures from code.
#[derive(Parser, Debug)]
#[command(
    name = "ngw",
    author,
    version,
    about = "NeuroGraph: architecture graphs from neural network source code",
    long_about = None
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the REST + WebSocket API.
    Serve {
        /// Address to bind (defaults to the configured host).
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (defaults to the configured port).
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory with a static front end to serve at `/`.
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Analyze source files into an architecture graph.
    ///
    /// The first file is the main code; every further file (directories are
    /// walked) is sent along as an uploaded file.
    Analyze {
        /// Files or directories to read.
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Write the graph to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Ask one question about a model, optionally editing a prior graph.
    Chat {
        /// Source file with the model code.
        path: PathBuf,

        /// The question or edit request.
        #[arg(short, long)]
        message: String,

        /// Graph JSON from an earlier `analyze` run.
        #[arg(short, long)]
        graph: Option<PathBuf>,
    },

    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration.
    Show,

    /// Set a configuration value.
    Set {
        /// Configuration key.
        key: String,
        /// Configuration value.
        value: String,
    },

    /// Get a configuration value.
    Get {
        /// Configuration key.
        key: String,
    },

    /// Reset configuration to defaults.
    Reset,

    /// Show path to config file.
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        Level::ERROR
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };

    // Logs go to stderr so graph output on stdout stays parseable.
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load()?;

    match cli.command {
        Commands::Serve {
            host,
            port,
            static_dir,
        } => {
            let host = host.unwrap_or_else(|| config.host.clone());
            let port = port.unwrap_or(config.port);
            commands::serve::execute(&config, &host, port, static_dir.as_deref()).await?;
        }

        Commands::Analyze {
            paths,
            format,
            output,
        } => {
            commands::analyze::execute(&config, &paths, format, output.as_deref()).await?;
        }

        Commands::Chat {
            path,
            message,
            graph,
        } => {
            commands::chat::execute(&config, &path, &message, graph.as_deref()).await?;
        }

        Commands::Config(config_cmd_inner) => {
            let mut config = config;
            match config_cmd_inner {
                ConfigCommands::Show => {
                    config_cmd::show(&config)?;
                }
                ConfigCommands::Set { key, value } => {
                    config_cmd::set(&mut config, &key, &value)?;
                }
                ConfigCommands::Get { key } => {
                    config_cmd::get(&config, &key)?;
                }
                ConfigCommands::Reset => {
                    config_cmd::reset()?;
                }
                ConfigCommands::Path => {
                    if let Some(path) = Config::config_file_path() {
                        println!("{}", path.display());
                    } else {
                        println!("(no config file path available)");
                    }
                }
            }
        }
    }

    Ok(())
}
