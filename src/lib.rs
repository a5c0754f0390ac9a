//! ReasonChat - hidden-reasoning chat client for local Ollama models
//!
//! Wraps a local chat endpoint with a multi-step reasoning protocol: the
//! model is prompted to think privately across bounded iterations and emit
//! a `Final Answer:` marker once it has a user-facing conclusion; if the
//! budget runs out, a single forced-finalization call extracts the best
//! available answer.

pub mod config;
pub mod extract;
pub mod provider;
pub mod reasoning;
pub mod repl;
pub mod session;
