//! Configuration for reasonchat
//!
//! Two layers: `ReasoningConfig` holds the per-run reasoning parameters
//! (read-only during a run, mutated only by explicit REPL commands), and
//! `FileConfig` is the optional overlay loaded from
//! `~/.reasonchat/config.toml`.

use anyhow::{Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default model name served by the local endpoint
pub const DEFAULT_MODEL: &str = "reasonchat";

/// Parameters of the reasoning protocol for one session turn
#[derive(Debug, Clone)]
pub struct ReasoningConfig {
    /// Iteration budget for the hidden-reasoning loop
    pub max_iterations: u32,
    /// Sampling temperature in [0.0, 1.0]
    pub temperature: f32,
    /// Model identifier passed to the gateway
    pub model: String,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            temperature: 0.7,
            model: DEFAULT_MODEL.into(),
        }
    }
}

impl ReasoningConfig {
    /// Set the sampling temperature, rejecting out-of-range values
    pub fn set_temperature(&mut self, temperature: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&temperature) {
            bail!("Temperature must be between 0.0 and 1.0");
        }
        self.temperature = temperature;
        Ok(())
    }

    /// Set the iteration budget, rejecting values outside [2, 10]
    pub fn set_max_iterations(&mut self, iterations: u32) -> Result<()> {
        if !(2..=10).contains(&iterations) {
            bail!("Iterations must be between 2 and 10");
        }
        self.max_iterations = iterations;
        Ok(())
    }
}

/// Optional file configuration from ~/.reasonchat/config.toml
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    /// Ollama base URL
    pub host: Option<String>,

    /// Model identifier
    pub model: Option<String>,

    /// Sampling temperature
    pub temperature: Option<f32>,

    /// Reasoning iteration budget
    pub max_iterations: Option<u32>,
}

impl FileConfig {
    /// Load config from the default path, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    /// Load config from an explicit path, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

/// Get the application dot-directory (~/.reasonchat)
pub fn app_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_default().join(".reasonchat")
}

/// Get the config file path
pub fn config_path() -> PathBuf {
    app_dir().join("config.toml")
}
