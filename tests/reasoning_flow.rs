//! End-to-end reasoning runs against scripted providers
//!
//! Exercises the orchestrator's full state machine: short-circuit, early
//! conclusion, forced finalization, fail-fast error handling, history
//! windowing, and cancellation.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::mpsc;

use reasonchat::config::ReasoningConfig;
use reasonchat::provider::{ChatRequest, GatewayError, Message, Provider, Role, StreamEvent};
use reasonchat::reasoning::{
    CONTINUE_REWRITE, NullObserver, Orchestrator, RunOutcome,
};

/// One scripted gateway response
enum Step {
    /// Stream (or return) this text, split across two chunks when streamed
    Text(&'static str),
    /// Fail at call time
    Fail(&'static str),
    /// Stream a partial delta, then fail mid-stream
    FailMidStream(&'static str, &'static str),
}

/// Provider that replays a fixed script and records every request
struct ScriptedProvider {
    script: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<ChatRequest>>,
    stream_calls: AtomicUsize,
    chat_calls: AtomicUsize,
}

impl ScriptedProvider {
    fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(steps.into()),
            requests: Mutex::new(Vec::new()),
            stream_calls: AtomicUsize::new(0),
            chat_calls: AtomicUsize::new(0),
        })
    }

    fn next_step(&self) -> Step {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .expect("script exhausted: more gateway calls than scripted")
    }

    fn recorded_requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn chat(&self, request: ChatRequest) -> Result<String, GatewayError> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        match self.next_step() {
            Step::Text(t) => Ok(t.to_string()),
            Step::Fail(m) | Step::FailMidStream(_, m) => Err(GatewayError::Network(m.into())),
        }
    }

    async fn chat_stream(
        &self,
        request: ChatRequest,
    ) -> Result<mpsc::Receiver<StreamEvent>, GatewayError> {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);

        match self.next_step() {
            Step::Fail(m) => Err(GatewayError::Network(m.into())),
            Step::Text(t) => {
                let (tx, rx) = mpsc::channel(8);
                let text = t.to_string();
                tokio::spawn(async move {
                    // Split arbitrarily: reassembly must not depend on chunking
                    let mid = (0..=text.len() / 2)
                        .rev()
                        .find(|i| text.is_char_boundary(*i))
                        .unwrap_or(0);
                    let (a, b) = text.split_at(mid);
                    for part in [a, b] {
                        if !part.is_empty() {
                            let _ = tx.send(StreamEvent::TextDelta(part.to_string())).await;
                        }
                    }
                    let _ = tx.send(StreamEvent::Done).await;
                });
                Ok(rx)
            }
            Step::FailMidStream(partial, m) => {
                let (tx, rx) = mpsc::channel(8);
                let partial = partial.to_string();
                let msg = m.to_string();
                tokio::spawn(async move {
                    let _ = tx.send(StreamEvent::TextDelta(partial)).await;
                    let _ = tx.send(StreamEvent::Error(msg)).await;
                });
                Ok(rx)
            }
        }
    }
}

fn config_with_max(max_iterations: u32) -> ReasoningConfig {
    let mut config = ReasoningConfig::default();
    config.set_max_iterations(max_iterations).unwrap();
    config
}

#[tokio::test]
async fn canned_input_skips_the_gateway() {
    let provider = ScriptedProvider::new(vec![]);
    let orchestrator = Orchestrator::new(provider.clone());

    let outcome = orchestrator
        .run(&ReasoningConfig::default(), "  HELLO ", &[], &NullObserver)
        .await;

    let result = outcome.into_result().unwrap();
    assert_eq!(result.answer, "Hey there! What can I help you with today?");
    assert_eq!(result.iterations_used, 0);
    assert!(!result.thinking.is_empty());
    assert_eq!(provider.stream_calls.load(Ordering::SeqCst), 0);
    assert_eq!(provider.chat_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn marker_on_second_iteration_concludes_early() {
    let provider = ScriptedProvider::new(vec![
        Step::Text("Thought: I need to think more about this."),
        Step::Text("Analysis: narrowing it down.\n\nFinal Answer: 42"),
    ]);
    let orchestrator = Orchestrator::new(provider.clone());

    let outcome = orchestrator
        .run(&config_with_max(5), "what is the answer?", &[], &NullObserver)
        .await;

    assert!(matches!(outcome, RunOutcome::Concluded { .. }));
    let result = outcome.into_result().unwrap();
    assert_eq!(result.answer, "42");
    assert_eq!(result.iterations_used, 2);
    assert!(result.thinking.contains("=== Iteration 1 ==="));
    assert!(result.thinking.contains("=== Iteration 2 ==="));
    assert_eq!(provider.stream_calls.load(Ordering::SeqCst), 2);
    assert_eq!(provider.chat_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn budget_exhaustion_forces_exactly_one_extra_call() {
    let provider = ScriptedProvider::new(vec![
        Step::Text("Thought: still thinking."),
        Step::Text("Thought: still thinking."),
        Step::Text("Thought: still thinking."),
        Step::Text("Thought: still thinking."),
        Step::Text("Thought: still thinking."),
        Step::Text("My best guess is 42."),
    ]);
    let orchestrator = Orchestrator::new(provider.clone());

    let outcome = orchestrator
        .run(&config_with_max(5), "hard question", &[], &NullObserver)
        .await;

    assert!(matches!(outcome, RunOutcome::ForcedConclusion { .. }));
    let result = outcome.into_result().unwrap();
    assert_eq!(result.answer, "My best guess is 42.");
    assert!(!result.answer.is_empty());
    assert_eq!(result.iterations_used, 5);
    assert!(result.thinking.contains("=== Conclusion ==="));
    assert_eq!(provider.stream_calls.load(Ordering::SeqCst), 5);
    assert_eq!(provider.chat_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn empty_marker_section_does_not_conclude() {
    let provider = ScriptedProvider::new(vec![
        Step::Text("Analysis: working on it.\n\nFinal Answer:"),
        Step::Text("Final Answer: done now"),
    ]);
    let orchestrator = Orchestrator::new(provider.clone());

    let outcome = orchestrator
        .run(&config_with_max(5), "tricky one", &[], &NullObserver)
        .await;

    let result = outcome.into_result().unwrap();
    assert_eq!(result.answer, "done now");
    assert_eq!(result.iterations_used, 2);
}

#[tokio::test]
async fn first_call_failure_aborts_fail_fast() {
    let provider = ScriptedProvider::new(vec![Step::Fail("connection refused")]);
    let orchestrator = Orchestrator::new(provider.clone());

    let outcome = orchestrator
        .run(&config_with_max(5), "anything", &[], &NullObserver)
        .await;

    assert!(matches!(outcome, RunOutcome::Errored { .. }));
    let result = outcome.into_result().unwrap();
    assert!(result.answer.contains("connection refused"));
    assert_eq!(result.iterations_used, 1);
    assert!(result.thinking.contains("iteration 1"));
    // No retry, no forced finalization
    assert_eq!(provider.stream_calls.load(Ordering::SeqCst), 1);
    assert_eq!(provider.chat_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn mid_stream_failure_discards_the_fragment() {
    let provider = ScriptedProvider::new(vec![Step::FailMidStream(
        "partial thinki",
        "stream reset",
    )]);
    let orchestrator = Orchestrator::new(provider.clone());

    let outcome = orchestrator
        .run(&config_with_max(5), "anything", &[], &NullObserver)
        .await;

    let result = outcome.into_result().unwrap();
    assert!(result.answer.contains("stream reset"));
    // The partial delta is not used as an answer or a transcript entry
    assert!(!result.answer.contains("partial thinki"));
    assert!(!result.thinking.contains("partial thinki"));
    assert_eq!(result.iterations_used, 1);
}

#[tokio::test]
async fn forced_finalization_failure_reports_transcript() {
    let provider = ScriptedProvider::new(vec![
        Step::Text("Thought: round one."),
        Step::Text("Thought: round two."),
        Step::Fail("model went away"),
    ]);
    let orchestrator = Orchestrator::new(provider.clone());

    let outcome = orchestrator
        .run(&config_with_max(2), "anything", &[], &NullObserver)
        .await;

    assert!(matches!(outcome, RunOutcome::Errored { .. }));
    let result = outcome.into_result().unwrap();
    assert!(result.answer.contains("model went away"));
    assert_eq!(result.iterations_used, 2);
    // Completed iterations survive in the error report
    assert!(result.thinking.contains("=== Iteration 2 ==="));
    assert!(result.thinking.contains("model went away"));
}

#[tokio::test]
async fn history_window_caps_at_six_in_order() {
    let history: Vec<Message> = (0..10)
        .map(|i| {
            if i % 2 == 0 {
                Message::user(format!("question {}", i))
            } else {
                Message::assistant(format!("answer {}", i))
            }
        })
        .collect();

    let provider = ScriptedProvider::new(vec![Step::Text("Final Answer: ok")]);
    let orchestrator = Orchestrator::new(provider.clone());

    let outcome = orchestrator
        .run(&config_with_max(5), "current question", &history, &NullObserver)
        .await;
    assert!(matches!(outcome, RunOutcome::Concluded { .. }));

    let requests = provider.recorded_requests();
    assert_eq!(requests.len(), 1);
    let messages = &requests[0].messages;

    // system + 6 windowed + current user
    assert_eq!(messages.len(), 8);
    assert_eq!(messages[0].role, Role::System);
    assert_eq!(messages[1].content, "question 4");
    assert_eq!(messages[6].content, "answer 9");
    assert_eq!(messages[7].content, "current question");
    assert_eq!(messages[7].role, Role::User);
}

#[tokio::test]
async fn continuation_prompt_is_rewritten_before_resend() {
    let provider = ScriptedProvider::new(vec![
        Step::Text("Thought: not done yet."),
        Step::Text("Final Answer: done"),
    ]);
    let orchestrator = Orchestrator::new(provider.clone());

    let outcome = orchestrator
        .run(&config_with_max(5), "slow question", &[], &NullObserver)
        .await;
    assert!(matches!(outcome, RunOutcome::Concluded { .. }));

    let requests = provider.recorded_requests();
    assert_eq!(requests.len(), 2);
    let last = requests[1].messages.last().unwrap();
    assert_eq!(last.role, Role::User);
    assert_eq!(last.content, CONTINUE_REWRITE);
}

#[tokio::test]
async fn cancellation_commits_nothing() {
    let provider = ScriptedProvider::new(vec![]);
    let cancel = Arc::new(AtomicBool::new(true));
    let orchestrator = Orchestrator::new(provider.clone()).with_cancel_token(cancel);

    let outcome = orchestrator
        .run(&config_with_max(5), "anything", &[], &NullObserver)
        .await;

    assert!(matches!(outcome, RunOutcome::Cancelled));
    assert!(outcome.into_result().is_none());
    assert_eq!(provider.stream_calls.load(Ordering::SeqCst), 0);
}
