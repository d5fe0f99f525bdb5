//! Query engine pipeline
//!
//! The caller-facing surface: one-shot Retrieve -> Pack -> Synthesize ->
//! Score per query, plus timeline mining. Collaborators are injected at
//! construction so tests can substitute fakes. Under normal operation no
//! error crosses this boundary; every failure mode degrades to a valid,
//! typed answer.

use crate::retrieval::{MultiCollectionRetriever, Passage};
use crate::scoring;
use crate::synthesis::AnswerSynthesizer;
use crate::timeline::{Timeline, TimelineMiner};
use fablore_common::backend::{create_backend, AnswerBackend};
use fablore_common::config::EngineConfig;
use fablore_common::errors::Result;
use fablore_common::store::DocumentStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};

/// Answer returned when retrieval comes back empty
pub const NO_INFORMATION_ANSWER: &str =
    "I don't have enough information to answer that question about semiconductor manufacturing. \
     Please try rephrasing your question or check if the knowledge base has been updated recently.";

/// One question for the engine
#[derive(Debug, Clone)]
pub struct QueryRequest {
    /// The question to answer
    pub question: String,

    /// Whether to return source passages alongside the answer
    pub include_sources: bool,

    /// Maximum number of source passages to use
    pub max_sources: usize,

    /// Specific collections to search; None searches the configured defaults
    pub collections: Option<Vec<String>>,
}

impl QueryRequest {
    /// Build a request with default options
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            include_sources: true,
            max_sources: 10,
            collections: None,
        }
    }
}

/// Answer with provenance and quality metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResult {
    /// The answer text
    pub answer: String,

    /// Source passages the answer drew on (empty when not requested)
    pub sources: Vec<Passage>,

    /// Confidence in [0, 1]
    pub confidence: f32,

    /// Wall-clock processing time in seconds
    pub processing_time_seconds: f64,
}

/// The retrieval-augmented query engine
pub struct QueryEngine {
    retriever: Arc<MultiCollectionRetriever>,
    synthesizer: AnswerSynthesizer,
    miner: TimelineMiner,
    config: EngineConfig,
}

impl QueryEngine {
    /// Create an engine over the given collaborators
    pub fn new(
        store: Arc<dyn DocumentStore>,
        backend: Arc<dyn AnswerBackend>,
        config: EngineConfig,
    ) -> Self {
        let retriever = Arc::new(MultiCollectionRetriever::new(
            store,
            config.retrieval.clone(),
        ));
        let synthesizer = AnswerSynthesizer::new(backend, &config.context, config.backend.clone());
        let miner = TimelineMiner::new(
            Arc::clone(&retriever),
            config.retrieval.timeline_max_sources,
        );

        Self {
            retriever,
            synthesizer,
            miner,
            config,
        }
    }

    /// Create an engine selecting the backend from configuration
    pub fn from_config(store: Arc<dyn DocumentStore>, config: EngineConfig) -> Self {
        let backend = create_backend(&config.backend);
        Self::new(store, backend, config)
    }

    /// Answer `question` with the configured defaults
    pub async fn ask(&self, question: &str) -> AnswerResult {
        self.query(QueryRequest {
            question: question.to_string(),
            include_sources: true,
            max_sources: self.config.retrieval.default_max_sources,
            collections: None,
        })
        .await
    }

    /// Answer a query
    ///
    /// Never fails: empty retrieval yields the canned no-information answer,
    /// backend failures fall back to extractive synthesis inside the
    /// synthesizer, and anything unexpected is reported in user-facing
    /// language with empty sources and zero confidence.
    pub async fn query(&self, request: QueryRequest) -> AnswerResult {
        let started = Instant::now();

        match self.run_pipeline(&request).await {
            Ok(mut result) => {
                result.processing_time_seconds = started.elapsed().as_secs_f64();
                result
            }
            Err(e) => {
                error!(error = %e, "Query pipeline failed");
                AnswerResult {
                    answer: format!(
                        "I encountered an error while processing your question: {}",
                        e
                    ),
                    sources: Vec::new(),
                    confidence: 0.0,
                    processing_time_seconds: started.elapsed().as_secs_f64(),
                }
            }
        }
    }

    /// Build the chronological timeline for `topic`
    pub async fn build_timeline(&self, topic: &str) -> Timeline {
        self.miner.build_timeline(topic).await
    }

    async fn run_pipeline(&self, request: &QueryRequest) -> Result<AnswerResult> {
        let passages = self
            .retriever
            .retrieve(
                &request.question,
                request.max_sources,
                request.collections.as_deref(),
            )
            .await;

        if passages.is_empty() {
            debug!("Retrieval returned no passages above threshold");
            return Ok(AnswerResult {
                answer: NO_INFORMATION_ANSWER.to_string(),
                sources: Vec::new(),
                confidence: 0.0,
                processing_time_seconds: 0.0,
            });
        }

        let answer = self.synthesizer.synthesize(&request.question, &passages).await;
        let confidence = scoring::confidence(&passages, &answer);

        let sources = if request.include_sources {
            passages
        } else {
            Vec::new()
        };

        Ok(AnswerResult {
            answer,
            sources,
            confidence,
            processing_time_seconds: 0.0,
        })
    }
}
