//! Conversation history and thinking-log persistence
//!
//! Owns the long-lived chat history across turns. The orchestrator only
//! ever sees a bounded read-only window of it; answers are appended here by
//! the shell after a turn commits, so a cancelled or in-flight turn leaves
//! history untouched.

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::provider::Message;
use crate::reasoning::{HISTORY_WINDOW, ReasoningResult};

/// Per-turn record of the hidden reasoning behind an answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThinkingLog {
    pub id: String,
    pub user_input: String,
    pub thinking: String,
    pub iterations: u32,
}

/// Persisted log file shape
#[derive(Serialize)]
struct LogFile<'a> {
    timestamp: String,
    conversation: &'a [Message],
    thinking_logs: &'a [ThinkingLog],
}

/// One chat session: message history plus per-turn thinking logs
#[derive(Debug, Default)]
pub struct Session {
    messages: Vec<Message>,
    thinking_logs: Vec<ThinkingLog>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full history, oldest first
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The bounded suffix of history handed to the orchestrator
    pub fn recent_window(&self) -> &[Message] {
        let tail = self.messages.len().saturating_sub(HISTORY_WINDOW);
        &self.messages[tail..]
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn log_count(&self) -> usize {
        self.thinking_logs.len()
    }

    /// Commit a completed turn: user message, final answer, thinking log
    pub fn record_turn(&mut self, user_input: &str, result: &ReasoningResult) {
        self.messages.push(Message::user(user_input));
        self.messages.push(Message::assistant(result.answer.clone()));
        self.thinking_logs.push(ThinkingLog {
            id: Uuid::new_v4().to_string(),
            user_input: user_input.to_string(),
            thinking: result.thinking.clone(),
            iterations: result.iterations_used,
        });
    }

    /// Save the conversation and thinking logs as pretty-printed JSON.
    /// Returns the path of the written file.
    pub fn save_log(&self, dir: &Path) -> Result<PathBuf> {
        let timestamp = Local::now().format("%Y%m%d-%H%M%S").to_string();
        let path = dir.join(format!("reasonchat_conversation_{}.json", timestamp));

        let log = LogFile {
            timestamp,
            conversation: &self.messages,
            thinking_logs: &self.thinking_logs,
        };

        let json = serde_json::to_string_pretty(&log)?;
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;

        Ok(path)
    }

    /// Render history for display: numbered entries, long content truncated
    pub fn render_history(&self) -> String {
        let mut out = String::new();
        for (i, msg) in self.messages.iter().enumerate() {
            let role = {
                let s = msg.role.as_str();
                let mut c = s.chars();
                match c.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + c.as_str(),
                    None => String::new(),
                }
            };
            let content: String = if msg.content.chars().count() > 200 {
                format!("{}...", msg.content.chars().take(200).collect::<String>())
            } else {
                msg.content.clone()
            };
            out.push_str(&format!("\n{}. {}: {}", i + 1, role, content));
        }
        out
    }
}
