//! Data types produced by a reasoning run

/// One completed gateway call within a reasoning run
#[derive(Debug, Clone)]
pub struct IterationRecord {
    /// 1-based iteration index
    pub index: u32,
    /// Full accumulated text of the model's response
    pub raw_text: String,
}

/// Append-only record of everything the model generated during one run
#[derive(Debug, Clone, Default)]
pub struct ThinkingTranscript {
    records: Vec<IterationRecord>,
    conclusion: Option<String>,
}

impl ThinkingTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: IterationRecord) {
        self.records.push(record);
    }

    /// Record the forced-finalization response; not an iteration
    pub fn set_conclusion(&mut self, text: String) {
        self.conclusion = Some(text);
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.conclusion.is_none()
    }

    /// Render the transcript with labeled per-iteration sections
    pub fn render(&self) -> String {
        let mut sections: Vec<String> = self
            .records
            .iter()
            .map(|r| format!("=== Iteration {} ===\n{}", r.index, r.raw_text))
            .collect();
        if let Some(ref conclusion) = self.conclusion {
            sections.push(format!("=== Conclusion ===\n{}", conclusion));
        }
        sections.join("\n\n")
    }
}

/// The outcome of one reasoning run, produced exactly once per user query
#[derive(Debug, Clone)]
pub struct ReasoningResult {
    /// The user-facing answer; never empty on a non-error path
    pub answer: String,
    /// Rendered thinking transcript (or a synthetic note / error report)
    pub thinking: String,
    /// Iterations consumed; the forced-finalization call is not counted
    pub iterations_used: u32,
}
