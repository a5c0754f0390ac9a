//! Prompt templates and the canned-response table
//!
//! The system prompt's marker contract (literal `Final Answer:`, emitted
//! case-insensitively detectable, answer text only after it) is load-bearing
//! for the extractor and must stay in sync with `crate::extract`.

/// Continuation nudge appended after an inconclusive iteration
pub const CONTINUE_PROMPT: &str =
    "Continue if you need more thinking steps, or provide your Final Answer if you're ready.";

/// Canonical rewrite applied when a carried-over continuation prompt would
/// otherwise be nested into itself across iterations
pub const CONTINUE_REWRITE: &str =
    "Continue thinking about this problem. You can provide a Final Answer when you're ready.";

/// Final request sent when the iteration budget runs out
pub const FORCE_PROMPT: &str =
    "Please provide your best final answer based on your reasoning so far.";

/// Answer of last resort; the orchestrator never returns an empty answer
/// on a non-error path
pub const FALLBACK_ANSWER: &str =
    "I couldn't reach a clear answer. Please try rephrasing your question!";

/// Fixed replies for trivial conversational inputs, keyed by the
/// trimmed, lowercased user input
const CANNED_RESPONSES: &[(&str, &str)] = &[
    ("hello", "Hey there! What can I help you with today?"),
    ("hi", "Hi! What's up?"),
    ("hey", "Hey! What's on your mind?"),
    ("hello there", "Hey there! How can I help?"),
    ("hi there", "Hi there! Need anything?"),
    (
        "what is your name?",
        "I'm an AI assistant powered by reasoning. What can I help you with?",
    ),
    (
        "who are you?",
        "I'm your AI assistant with some serious thinking skills! What's on your mind?",
    ),
    ("thank you", "No problem! Let me know if you need anything else!"),
    ("thanks", "Anytime! Anything else you're curious about?"),
    ("goodbye", "Later! Come back if you have more questions!"),
    ("bye", "See ya! Have a good one!"),
];

/// Look up a canned reply for a trivial input, if any
pub fn canned_response(user_input: &str) -> Option<&'static str> {
    let normalized = user_input.trim().to_lowercase();
    CANNED_RESPONSES
        .iter()
        .find(|(phrase, _)| *phrase == normalized)
        .map(|(_, reply)| *reply)
}

/// Build the system prompt enforcing hidden internal reasoning
pub fn build_system_prompt(max_iterations: u32) -> String {
    format!(
        r#"
You are a Reasoning AI assistant designed to provide accurate, concise, and relevant answers.

For each user query, follow this structured process:

1. **Complexity Assessment**
- Assess query complexity (1-Simple to 3-Complex):
  1: Direct recall (facts, definitions, greetings)
  2: Moderate analysis or connecting concepts
  3: Deep reasoning or complex analysis
- Perform assessment internally

2. **Reasoning Process** (NEVER SHOWN TO USER)
- Break complex questions into manageable steps
- Consider multiple approaches when appropriate
- Think step-by-step through calculations and logic
- Verify work and check for errors
- Consider edge cases and counterarguments
- Use up to {max_iterations} internal thinking steps
- Focus on accuracy over complexity
- Reduce hallucinations by cross-referencing facts

3. **Response Structure**
- Keep all reasoning completely internal
- ONLY share what follows "Final Answer:"
- Format:

Final Answer: [Your complete, verified response]

4. **Quality Standards**
- Prioritize accuracy above all
- Verify facts and calculations internally
- Provide clear, concise answers
- Address the question directly
- Acknowledge limitations when uncertain
- Choose reasonable interpretations for ambiguity

Core Rules:
- NEVER show internal thinking to users
- ALWAYS use "Final Answer:" tag
- Focus on correct answers over showing work
- Take time to verify complex solutions
- Maintain helpful but direct tone

Remember: Provide accurate, helpful answers, keeping all reasoning internal and for your use only.
"#
    )
}
