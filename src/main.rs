//! ReasonChat - hidden-reasoning chat client for local Ollama models
//!
//! An interactive shell that:
//! - prompts the model to reason privately across bounded iterations
//! - streams the hidden thinking (toggle with /verbose and /quiet)
//! - forces a conclusion when the iteration budget runs out
//! - keeps conversation history in memory and saves it as JSON on demand

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt};

use reasonchat::config::{FileConfig, ReasoningConfig};
use reasonchat::provider::OllamaProvider;
use reasonchat::repl;

const DEFAULT_HOST: &str = "http://localhost:11434";

#[derive(Parser)]
#[command(name = "reasonchat")]
#[command(about = "Hidden-reasoning chat client for local Ollama models")]
struct Args {
    /// Ollama base URL
    #[arg(long, env = "OLLAMA_HOST")]
    host: Option<String>,

    /// Model to use
    #[arg(long, short = 'm')]
    model: Option<String>,

    /// Sampling temperature (0.0-1.0)
    #[arg(long)]
    temperature: Option<f32>,

    /// Maximum reasoning iterations (2-10)
    #[arg(long)]
    iterations: Option<u32>,

    /// Hide the thinking process
    #[arg(long, short = 'q')]
    quiet: bool,

    /// Config file path (defaults to ~/.reasonchat/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (from ~/.reasonchat/.env or current dir)
    let env_path = dirs::home_dir()
        .map(|h| h.join(".reasonchat").join(".env"))
        .filter(|p| p.exists());
    if let Some(path) = env_path {
        let _ = dotenvy::from_path(&path);
    } else {
        let _ = dotenvy::dotenv(); // fallback to current dir
    }

    // Initialize logging
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();

    // Load config file (~/.reasonchat/config.toml unless overridden)
    let file = match args.config {
        Some(ref path) => FileConfig::load_from(path),
        None => FileConfig::load(),
    };

    // Resolve values: CLI args > env vars (handled by clap) > config file > defaults
    let host = args.host.or(file.host).unwrap_or_else(|| DEFAULT_HOST.into());

    let mut config = ReasoningConfig::default();
    if let Some(model) = args.model.or(file.model) {
        config.model = model;
    }
    // CLI values fail fast; file values warn and fall back to defaults
    if let Some(temp) = args.temperature {
        config.set_temperature(temp)?;
    } else if let Some(temp) = file.temperature {
        if let Err(e) = config.set_temperature(temp) {
            eprintln!("Warning: ignoring config temperature: {}", e);
        }
    }
    if let Some(iters) = args.iterations {
        config.set_max_iterations(iters)?;
    } else if let Some(iters) = file.max_iterations {
        if let Err(e) = config.set_max_iterations(iters) {
            eprintln!("Warning: ignoring config max_iterations: {}", e);
        }
    }

    repl::print_banner(&config, &host);

    let provider = Arc::new(OllamaProvider::new(host.clone()));

    repl::run(provider, config, host, !args.quiet).await
}
