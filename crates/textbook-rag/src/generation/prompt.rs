//! Prompt assembly under a fixed size budget
//!
//! The question is placed before the context. Backends with a hard input
//! limit truncate from the end, so anything cut is context, never the question.

use crate::config::PromptBudget;
use crate::types::Chunk;

/// Heading that introduces the retrieved context block
pub const CONTEXT_HEADER: &str = "Context:";

/// Closing instruction after the context block
const ANSWER_INSTRUCTION: &str =
    "Answer the question based on the context above. Provide a detailed answer.";

/// A prompt together with what went into it
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltPrompt {
    pub text: String,
    /// Number of chunks admitted, at most `max_chunks`
    pub chunks_used: usize,
    /// True when the fallback (no context) template was used
    pub fallback: bool,
    /// True when the final hard cut at `max_prompt_chars` was applied
    pub truncated: bool,
}

/// Prompt builder that enforces a [`PromptBudget`]
#[derive(Debug, Clone, Default)]
pub struct PromptBudgeter {
    budget: PromptBudget,
}

impl PromptBudgeter {
    pub fn new(budget: PromptBudget) -> Self {
        Self { budget }
    }

    pub fn budget(&self) -> &PromptBudget {
        &self.budget
    }

    /// Chunks that will be admitted into the prompt, highest relevance first
    pub fn admitted<'a>(&self, chunks: &'a [Chunk]) -> &'a [Chunk] {
        &chunks[..chunks.len().min(self.budget.max_chunks)]
    }

    /// Build the prompt text for a question
    pub fn build_prompt(&self, query: &str, chunks: &[Chunk]) -> String {
        self.build(query, chunks).text
    }

    /// Build the prompt and report how the budget was applied
    pub fn build(&self, query: &str, chunks: &[Chunk]) -> BuiltPrompt {
        let admitted = self.admitted(chunks);

        let (text, fallback) = if admitted.is_empty() {
            (self.fallback_prompt(query), true)
        } else {
            let context = self.build_context(admitted);
            (
                format!(
                    "Question: {query}\n\n{header}\n{context}\n\n{instruction}\n\nAnswer:",
                    query = query,
                    header = CONTEXT_HEADER,
                    context = context,
                    instruction = ANSWER_INSTRUCTION,
                ),
                false,
            )
        };

        let (text, truncated) = truncate_chars(text, self.budget.max_prompt_chars);

        BuiltPrompt {
            text,
            chunks_used: admitted.len(),
            fallback,
            truncated,
        }
    }

    /// Labeled context block: `Context 1: ...`, separated by blank lines
    pub fn build_context(&self, chunks: &[Chunk]) -> String {
        chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| {
                let (content, _) =
                    truncate_chars(chunk.content.clone(), self.budget.max_chars_per_chunk);
                format!("Context {}: {}", i + 1, content)
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Prompt used when no chunk survived sanitization
    pub fn fallback_prompt(&self, query: &str) -> String {
        format!(
            "Question: {}\n\nAnswer: I don't have specific information about this topic in my knowledge base. Please ask about {}.",
            query, self.budget.domain_hint
        )
    }
}

/// Length of the `Context N: ` label for a 1-based index
pub fn context_label_len(index: usize) -> usize {
    format!("Context {}: ", index).chars().count()
}

/// Cut `text` to at most `max_chars` characters on a char boundary
fn truncate_chars(mut text: String, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => {
            text.truncate(byte_idx);
            (text, true)
        }
        None => (text, false),
    }
}
