//! Interactive REPL for reasonchat
//!
//! Readline interface with command history, slash commands for session
//! configuration, and streaming display of the model's thinking. Ctrl-C
//! cancels an in-flight turn without committing anything to history.

pub mod colors;

use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::{self, ReasoningConfig};
use crate::provider::Provider;
use crate::reasoning::{Orchestrator, RunOutcome, TurnObserver};
use crate::session::Session;

/// Prints thinking output as the orchestrator folds the stream
struct ReplObserver {
    verbose: bool,
}

impl TurnObserver for ReplObserver {
    fn iteration_started(&self, index: u32, max: u32) {
        if self.verbose {
            print!("\n{}", colors::thinking_header(index, max));
            let _ = io::stdout().flush();
        }
    }

    fn thinking_delta(&self, text: &str) {
        if self.verbose {
            print!("{}", text);
            let _ = io::stdout().flush();
        }
    }

    fn iteration_finished(&self, _index: u32) {
        if self.verbose {
            println!();
        }
    }

    fn finalization_started(&self) {
        if self.verbose {
            println!("{}", colors::status("Forcing a conclusion..."));
        }
    }
}

/// REPL state
pub struct Repl {
    /// Readline editor with history
    editor: DefaultEditor,
    /// Reasoning run driver
    orchestrator: Orchestrator,
    /// Mutable-by-command reasoning parameters
    config: ReasoningConfig,
    /// Conversation history and thinking logs
    session: Session,
    /// Show thinking output while it streams
    verbose: bool,
    /// Ollama base URL, kept for the banner and /debug
    host: String,
    /// Cancellation flag for Ctrl+C during a run
    cancelled: Arc<AtomicBool>,
    /// Readline history file path
    history_path: PathBuf,
    /// Directory where /save writes conversation logs
    log_dir: PathBuf,
}

impl Repl {
    pub fn new(
        provider: Arc<dyn Provider>,
        reasoning_config: ReasoningConfig,
        host: String,
        verbose: bool,
    ) -> Result<Self> {
        let editor = DefaultEditor::new()?;
        let cancelled = Arc::new(AtomicBool::new(false));

        Ok(Self {
            editor,
            orchestrator: Orchestrator::new(provider).with_cancel_token(Arc::clone(&cancelled)),
            config: reasoning_config,
            session: Session::new(),
            verbose,
            host,
            cancelled,
            history_path: config::app_dir().join("history"),
            log_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        })
    }

    fn load_history(&mut self) {
        if self.history_path.exists() {
            let _ = self.editor.load_history(&self.history_path);
        }
    }

    fn save_history(&mut self) {
        if let Some(parent) = self.history_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = self.editor.save_history(&self.history_path);
    }

    /// Run the REPL loop
    pub async fn run(&mut self) -> Result<()> {
        self.load_history();

        // Ctrl+C during a run flips the cancel flag; the orchestrator
        // notices between stream chunks and aborts without committing
        let cancelled = Arc::clone(&self.cancelled);
        tokio::spawn(async move {
            loop {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancelled.store(true, Ordering::SeqCst);
                }
            }
        });

        println!("{}", colors::note("Type a question or '/help' for commands"));
        println!();

        loop {
            let readline = self.editor.readline(&colors::prompt());

            match readline {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    self.editor.add_history_entry(&line)?;

                    if trimmed.starts_with('/') {
                        if self.handle_command(trimmed)? {
                            break;
                        }
                        continue;
                    }

                    self.process_input(trimmed).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("{}", colors::warning("^C (type /exit to quit)"));
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("{}", colors::warning("Goodbye!"));
                    break;
                }
                Err(err) => {
                    eprintln!("{}", colors::error(&format!("Error: {:?}", err)));
                    break;
                }
            }
        }

        self.save_history();
        Ok(())
    }

    /// Handle a slash command; returns true when the REPL should exit
    fn handle_command(&mut self, cmd: &str) -> Result<bool> {
        let parts: Vec<&str> = cmd.splitn(2, ' ').collect();
        let command = parts[0].to_lowercase();
        let arg = parts.get(1).map(|a| a.trim()).unwrap_or("");

        match command.as_str() {
            "/help" => {
                println!("{}", colors::status("Commands:"));
                println!("  /help              - Show this help");
                println!("  /exit, /quit       - Exit the application");
                println!("  /model <name>      - Change the model (e.g., /model llama3)");
                println!("  /temp <0.0-1.0>    - Set temperature");
                println!("  /iterations <2-10> - Set maximum reasoning iterations");
                println!("  /verbose           - Show thinking process");
                println!("  /quiet             - Hide thinking process");
                println!("  /clear             - Clear screen");
                println!("  /history           - Show conversation history");
                println!("  /save              - Save conversation log");
                println!("  /debug             - Show technical details");
            }
            "/exit" | "/quit" => {
                if !self.session.is_empty() {
                    let save = self
                        .editor
                        .readline(&colors::warning("Save conversation history? (y/n): "))
                        .unwrap_or_default();
                    if save.trim().eq_ignore_ascii_case("y") {
                        self.cmd_save();
                    }
                }
                println!("{}", colors::warning("Goodbye!"));
                return Ok(true);
            }
            "/model" => {
                if arg.is_empty() {
                    println!("Usage: /model <name>");
                } else {
                    self.config.model = arg.to_string();
                    println!("{}", colors::status(&format!("Model set to: {}", self.config.model)));
                }
            }
            "/temp" => match arg.parse::<f32>() {
                Ok(temp) => match self.config.set_temperature(temp) {
                    Ok(()) => println!(
                        "{}",
                        colors::status(&format!("Temperature set to: {}", self.config.temperature))
                    ),
                    Err(e) => println!("{}", colors::error(&e.to_string())),
                },
                Err(_) => println!("{}", colors::error("Invalid temperature value.")),
            },
            "/iterations" => match arg.parse::<u32>() {
                Ok(iters) => match self.config.set_max_iterations(iters) {
                    Ok(()) => println!(
                        "{}",
                        colors::status(&format!(
                            "Maximum iterations set to: {}",
                            self.config.max_iterations
                        ))
                    ),
                    Err(e) => println!("{}", colors::error(&e.to_string())),
                },
                Err(_) => println!("{}", colors::error("Invalid iteration value.")),
            },
            "/verbose" => {
                self.verbose = true;
                println!("{}", colors::status("Showing thinking process"));
            }
            "/quiet" => {
                self.verbose = false;
                println!("{}", colors::status("Hiding thinking process"));
            }
            "/clear" => {
                print!("\x1b[2J\x1b[1;1H");
                print_banner(&self.config, &self.host);
            }
            "/history" => {
                if self.session.is_empty() {
                    println!("No conversation yet.");
                } else {
                    println!("\n=== Conversation History ==={}", self.session.render_history());
                    println!("\n=========================");
                }
            }
            "/save" => {
                self.cmd_save();
            }
            "/debug" => {
                println!("{}", colors::status("=== Debug Information ==="));
                println!("Host: {}", self.host);
                println!("Model: {}", self.config.model);
                println!("Temperature: {}", self.config.temperature);
                println!("Max iterations: {}", self.config.max_iterations);
                println!(
                    "Conversation history length: {} messages",
                    self.session.message_count()
                );
                println!("Thinking logs count: {}", self.session.log_count());
                println!("{}", colors::status("========================"));
            }
            _ => {
                println!("Unknown command: {}. Try /help", command);
            }
        }
        Ok(false)
    }

    fn cmd_save(&self) {
        match self.session.save_log(&self.log_dir) {
            Ok(path) => println!(
                "{}",
                colors::status(&format!("Conversation saved to: {}", path.display()))
            ),
            Err(e) => println!("{}", colors::error(&format!("Error saving conversation: {}", e))),
        }
    }

    /// Run one reasoning turn and commit it unless cancelled
    async fn process_input(&mut self, input: &str) {
        self.cancelled.store(false, Ordering::SeqCst);

        if !self.verbose {
            println!("{}", colors::status("Thinking..."));
        }

        let observer = ReplObserver {
            verbose: self.verbose,
        };

        let outcome = self
            .orchestrator
            .run(&self.config, input, self.session.recent_window(), &observer)
            .await;

        match outcome {
            RunOutcome::Cancelled => {
                println!("\n{}", colors::warning("Cancelled. Type /exit to quit."));
            }
            other => {
                if let Some(result) = other.into_result() {
                    self.session.record_turn(input, &result);
                    println!("\n{}{}\n", colors::answer_label(), result.answer);
                }
            }
        }
    }
}

/// Print the startup banner
pub fn print_banner(config: &ReasoningConfig, host: &str) {
    println!();
    println!(
        "  {} {}",
        colors::banner_accent("ReasonChat"),
        colors::note(env!("CARGO_PKG_VERSION"))
    );
    println!("{}", colors::separator(50));
    println!("{}", colors::banner_line("Model", &config.model));
    println!("{}", colors::banner_line("Host", host));
    println!(
        "{}",
        colors::banner_line("Iterations", &config.max_iterations.to_string())
    );
    println!(
        "{}",
        colors::banner_line("Temperature", &config.temperature.to_string())
    );
    println!("{}", colors::separator(50));
    println!();
}

/// Entry point for the REPL
pub async fn run(
    provider: Arc<dyn Provider>,
    config: ReasoningConfig,
    host: String,
    verbose: bool,
) -> Result<()> {
    let mut repl = Repl::new(provider, config, host, verbose)?;
    repl.run().await
}
