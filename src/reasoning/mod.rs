//! Iterative hidden-reasoning orchestration
//!
//! Drives repeated calls to the inference gateway: the model is told to
//! think privately and emit a `Final Answer:` marker once ready. Each
//! iteration streams a completion, folds it into the transcript, and checks
//! for a conclusion; when the iteration budget runs out, a single forced
//! finalization call extracts the best available answer.
//!
//! The orchestrator holds no global state and owns nothing long-lived: the
//! caller supplies the config and a read-only history window, and commits
//! the returned answer itself.

mod prompt;
mod types;

pub use prompt::{
    CONTINUE_PROMPT, CONTINUE_REWRITE, FALLBACK_ANSWER, FORCE_PROMPT, build_system_prompt,
    canned_response,
};
pub use types::{IterationRecord, ReasoningResult, ThinkingTranscript};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;

use crate::config::ReasoningConfig;
use crate::extract::{contains_marker, extract_answer};
use crate::provider::{ChatRequest, Message, Provider, Role, StreamEvent};

/// Maximum number of prior history messages included in a run's transcript
pub const HISTORY_WINDOW: usize = 6;

/// Presentation seam for observing a run as it happens.
///
/// The orchestrator's fold never depends on the observer; implementations
/// subscribe to the same delta sequence the fold consumes.
pub trait TurnObserver: Send + Sync {
    fn iteration_started(&self, _index: u32, _max: u32) {}
    fn thinking_delta(&self, _text: &str) {}
    fn iteration_finished(&self, _index: u32) {}
    fn finalization_started(&self) {}
}

/// Observer that ignores everything; used by tests and quiet callers
pub struct NullObserver;

impl TurnObserver for NullObserver {}

/// How a reasoning run ended.
///
/// Projected to [`ReasoningResult`] at the boundary via
/// [`RunOutcome::into_result`]; `Cancelled` is the one outcome that
/// produces no result and must not be committed to history.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Trivial input answered from the canned table; no gateway call made
    ShortCircuit { answer: String, note: String },
    /// The model emitted a usable marker section within the budget
    Concluded {
        answer: String,
        transcript: ThinkingTranscript,
        iterations: u32,
    },
    /// Budget exhausted; answer obtained by the forced finalization call
    ForcedConclusion {
        answer: String,
        transcript: ThinkingTranscript,
        iterations: u32,
    },
    /// A gateway call failed; the run aborted fail-fast
    Errored {
        answer: String,
        thinking: String,
        iterations: u32,
    },
    /// The run was interrupted; nothing may be committed
    Cancelled,
}

impl RunOutcome {
    /// Project to the caller-facing result. `None` for cancelled runs.
    pub fn into_result(self) -> Option<ReasoningResult> {
        match self {
            Self::ShortCircuit { answer, note } => Some(ReasoningResult {
                answer,
                thinking: note,
                iterations_used: 0,
            }),
            Self::Concluded {
                answer,
                transcript,
                iterations,
            }
            | Self::ForcedConclusion {
                answer,
                transcript,
                iterations,
            } => Some(ReasoningResult {
                answer,
                thinking: transcript.render(),
                iterations_used: iterations,
            }),
            Self::Errored {
                answer,
                thinking,
                iterations,
            } => Some(ReasoningResult {
                answer,
                thinking,
                iterations_used: iterations,
            }),
            Self::Cancelled => None,
        }
    }
}

/// Result of folding one streamed completion
enum StreamFold {
    Complete(String),
    Failed(String),
    Cancelled,
}

/// The reasoning run driver
pub struct Orchestrator {
    provider: Arc<dyn Provider>,
    cancel: Arc<AtomicBool>,
}

impl Orchestrator {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share a cancellation token with the caller (e.g. a Ctrl-C handler)
    pub fn with_cancel_token(mut self, token: Arc<AtomicBool>) -> Self {
        self.cancel = token;
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Run the reasoning protocol for one user query.
    ///
    /// `recent_history` is a read-only view of prior turns; at most the
    /// last [`HISTORY_WINDOW`] messages are included in the transcript.
    /// Never panics past this boundary: gateway failures come back as
    /// [`RunOutcome::Errored`].
    pub async fn run(
        &self,
        config: &ReasoningConfig,
        user_input: &str,
        recent_history: &[Message],
        observer: &dyn TurnObserver,
    ) -> RunOutcome {
        // Trivial conversational turns skip the protocol entirely
        if let Some(reply) = canned_response(user_input) {
            return RunOutcome::ShortCircuit {
                answer: reply.to_string(),
                note: format!(
                    "Simple greeting detected: '{}'. Providing direct response.",
                    user_input
                ),
            };
        }

        // Seed the transcript: system prompt, bounded history tail, query
        let mut messages =
            Vec::with_capacity(recent_history.len().min(HISTORY_WINDOW) + 2);
        messages.push(Message::system(build_system_prompt(config.max_iterations)));
        let tail = recent_history.len().saturating_sub(HISTORY_WINDOW);
        messages.extend_from_slice(&recent_history[tail..]);
        messages.push(Message::user(user_input));

        let mut transcript = ThinkingTranscript::new();
        let mut iteration: u32 = 0;
        let mut final_answer = String::new();

        while iteration < config.max_iterations {
            if self.is_cancelled() {
                return RunOutcome::Cancelled;
            }
            iteration += 1;

            // A carried-over continuation prompt gets rewritten to a
            // canonical instruction so repeated nesting cannot drift
            if let Some(last) = messages.last_mut() {
                if last.role == Role::User && last.content.contains("Continue") {
                    last.content = CONTINUE_REWRITE.to_string();
                }
            }

            observer.iteration_started(iteration, config.max_iterations);
            tracing::debug!(iteration, max = config.max_iterations, "reasoning step");

            let request = ChatRequest {
                model: config.model.clone(),
                messages: messages.clone(),
                temperature: config.temperature,
            };

            let rx = match self.provider.chat_stream(request).await {
                Ok(rx) => rx,
                Err(e) => {
                    tracing::warn!(iteration, error = %e, "gateway call failed");
                    return RunOutcome::Errored {
                        answer: format!("Error: {}", e),
                        thinking: format!("Error occurred during iteration {}: {}", iteration, e),
                        iterations: iteration,
                    };
                }
            };

            let thinking_text = match self.collect_stream(rx, observer).await {
                StreamFold::Complete(text) => text,
                StreamFold::Cancelled => return RunOutcome::Cancelled,
                StreamFold::Failed(e) => {
                    // The transcript is ambiguous after a partial stream;
                    // abort without committing the fragment
                    tracing::warn!(iteration, error = %e, "stream failed mid-flight");
                    return RunOutcome::Errored {
                        answer: format!("Error: {}", e),
                        thinking: format!("Error occurred during iteration {}: {}", iteration, e),
                        iterations: iteration,
                    };
                }
            };
            observer.iteration_finished(iteration);

            transcript.push(IterationRecord {
                index: iteration,
                raw_text: thinking_text.clone(),
            });
            messages.push(Message::assistant(thinking_text.clone()));

            if contains_marker(&thinking_text) {
                let extracted = extract_answer(&thinking_text);
                // An empty marker section does not count as a conclusion
                if !extracted.is_empty() {
                    final_answer = extracted;
                    break;
                }
            }

            // Let the model decide when to conclude
            messages.push(Message::user(CONTINUE_PROMPT));
        }

        if final_answer.is_empty() {
            // Budget exhausted: force a conclusion with one extra call.
            // This terminal turn reuses the full transcript as-is and
            // skips the continuation rewrite.
            observer.finalization_started();
            messages.push(Message::user(FORCE_PROMPT));

            let request = ChatRequest {
                model: config.model.clone(),
                messages,
                temperature: config.temperature,
            };

            match self.provider.chat(request).await {
                Ok(forced_text) => {
                    transcript.set_conclusion(forced_text.clone());
                    let extracted = extract_answer(&forced_text);
                    final_answer = if extracted.is_empty() {
                        forced_text
                    } else {
                        extracted
                    };
                }
                Err(e) => {
                    tracing::warn!(error = %e, "forced finalization failed");
                    return RunOutcome::Errored {
                        answer: format!("Error during final response: {}", e),
                        thinking: format!(
                            "{}\n\nError during final response: {}",
                            transcript.render(),
                            e
                        ),
                        iterations: iteration,
                    };
                }
            }

            if final_answer.is_empty() {
                final_answer = FALLBACK_ANSWER.to_string();
            }

            return RunOutcome::ForcedConclusion {
                answer: final_answer,
                transcript,
                iterations: iteration,
            };
        }

        RunOutcome::Concluded {
            answer: final_answer,
            transcript,
            iterations: iteration,
        }
    }

    /// Fold a streamed completion into a single string, forwarding each
    /// delta to the observer and polling the cancel token between chunks
    async fn collect_stream(
        &self,
        mut rx: mpsc::Receiver<StreamEvent>,
        observer: &dyn TurnObserver,
    ) -> StreamFold {
        let mut text = String::new();

        loop {
            if self.is_cancelled() {
                return StreamFold::Cancelled;
            }

            tokio::select! {
                event = rx.recv() => {
                    match event {
                        Some(StreamEvent::TextDelta(delta)) => {
                            observer.thinking_delta(&delta);
                            text.push_str(&delta);
                        }
                        Some(StreamEvent::Error(e)) => return StreamFold::Failed(e),
                        Some(StreamEvent::Done) | None => break,
                    }
                }
                // Small timeout to allow cancellation checks
                _ = tokio::time::sleep(tokio::time::Duration::from_millis(50)) => {}
            }
        }

        StreamFold::Complete(text)
    }
}
