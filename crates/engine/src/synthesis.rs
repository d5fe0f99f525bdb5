//! Answer synthesis
//!
//! Drives the generative backend when one is configured and falls back to
//! deterministic extractive synthesis whenever the backend is absent, fails,
//! or times out. No backend failure ever reaches the caller.

use crate::context::{take_chars, ContextPacker};
use crate::retrieval::Passage;
use fablore_common::backend::AnswerBackend;
use fablore_common::config::{BackendConfig, ContextConfig};
use std::sync::Arc;
use tracing::{debug, warn};

/// Answer returned when synthesis is asked to work from nothing
pub const NO_RELEVANT_INFORMATION: &str =
    "I don't have relevant information to answer your question about semiconductor manufacturing.";

/// Lead-in sentence for the extractive fallback
const FALLBACK_LEAD_IN: &str = "Based on the available information about semiconductor manufacturing:";

/// Passages excerpted by the fallback
const FALLBACK_PASSAGE_COUNT: usize = 3;

/// Content longer than this is excerpted rather than quoted verbatim
const FALLBACK_VERBATIM_CHARS: usize = 200;

/// Excerpt length for long content
const FALLBACK_EXCERPT_CHARS: usize = 500;

/// System instruction fixing the assistant's domain expertise and style
const SYSTEM_PROMPT: &str = "\
You are an expert in semiconductor manufacturing and technology with deep knowledge of:
- Semiconductor fabrication processes and evolution over the last 30 years
- AI applications in chip design and manufacturing
- Historical technological milestones in the semiconductor industry
- Current trends and future directions in semiconductor technology

Your responses should be:
- Technically accurate and detailed
- Based on the provided context documents
- Include historical perspective when relevant
- Mention specific years, companies, and technologies when available
- Acknowledge if information is limited or uncertain

Always cite the most relevant sources from the context when providing your answer.";

/// Synthesizer producing an answer from ranked passages
pub struct AnswerSynthesizer {
    backend: Arc<dyn AnswerBackend>,
    packer: ContextPacker,
    config: BackendConfig,
}

impl AnswerSynthesizer {
    /// Create a synthesizer over the given backend
    pub fn new(
        backend: Arc<dyn AnswerBackend>,
        context_config: &ContextConfig,
        backend_config: BackendConfig,
    ) -> Self {
        Self {
            backend,
            packer: ContextPacker::new(context_config.max_context_chars),
            config: backend_config,
        }
    }

    /// Produce an answer for `question` from ranked passages
    ///
    /// Empty input yields the canned no-information answer. A configured
    /// backend is tried first under the configured timeout; any failure
    /// degrades to the extractive fallback.
    pub async fn synthesize(&self, question: &str, passages: &[Passage]) -> String {
        if passages.is_empty() {
            return NO_RELEVANT_INFORMATION.to_string();
        }

        if !self.backend.is_configured() {
            debug!("No generative backend configured, using extractive synthesis");
            return self.extractive_answer(passages);
        }

        let user_prompt = self.build_user_prompt(question, passages);
        let completion = self.backend.complete(
            SYSTEM_PROMPT,
            &user_prompt,
            self.config.max_output_tokens,
            self.config.temperature,
        );

        match tokio::time::timeout(self.config.timeout(), completion).await {
            Ok(Ok(answer)) => answer.trim().to_string(),
            Ok(Err(e)) => {
                warn!(error = %e, "Backend completion failed, using extractive fallback");
                self.extractive_answer(passages)
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.config.timeout().as_millis() as u64,
                    "Backend completion timed out, using extractive fallback"
                );
                self.extractive_answer(passages)
            }
        }
    }

    /// Build the user instruction embedding the packed context
    fn build_user_prompt(&self, question: &str, passages: &[Passage]) -> String {
        let context = self.packer.pack(passages);

        format!(
            "Based on the following context about semiconductor manufacturing and technology, \
             please answer this question: {question}\n\n\
             Context:\n{context}\n\n\
             Please provide a comprehensive answer that includes:\n\
             1. Direct answer to the question\n\
             2. Historical context if relevant\n\
             3. Current state of the technology\n\
             4. Future implications if applicable\n\
             5. Specific examples and data points from the sources"
        )
    }

    /// Extractive fallback: excerpt the top passages verbatim
    fn extractive_answer(&self, passages: &[Passage]) -> String {
        let top = &passages[..passages.len().min(FALLBACK_PASSAGE_COUNT)];

        let excerpts: Vec<String> = top
            .iter()
            .map(|passage| {
                if passage.content.chars().count() > FALLBACK_VERBATIM_CHARS {
                    format!("{}...", take_chars(&passage.content, FALLBACK_EXCERPT_CHARS))
                } else {
                    passage.content.clone()
                }
            })
            .collect();

        let mut answer = format!("{}\n\n{}", FALLBACK_LEAD_IN, excerpts.join("\n\n"));

        let mut sources: Vec<&str> = Vec::new();
        for passage in top {
            let source = passage.source().unwrap_or("Unknown source");
            if !sources.contains(&source) {
                sources.push(source);
            }
        }

        if !sources.is_empty() {
            answer.push_str(&format!("\n\nSources: {}", sources.join(", ")));
        }

        answer
    }
}
