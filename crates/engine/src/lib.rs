//! FabLore Query Engine
//!
//! Retrieval-augmented question answering over the semiconductor knowledge
//! base:
//! - Multi-collection retrieval with relevance filtering
//! - Context packing under a character budget
//! - Answer synthesis with a deterministic extractive fallback
//! - Confidence scoring
//! - Historical timeline mining
//!
//! The engine holds no mutable state; every query runs the one-shot
//! Retrieve -> Pack -> Synthesize -> Score pipeline and no failure crosses
//! the public boundary as an error.

pub mod context;
pub mod engine;
pub mod retrieval;
pub mod scoring;
pub mod synthesis;
pub mod timeline;

// Re-export commonly used types
pub use engine::{AnswerResult, QueryEngine, QueryRequest};
pub use retrieval::{MultiCollectionRetriever, Passage};
pub use synthesis::AnswerSynthesizer;
pub use timeline::{Timeline, TimelineEvent, TimelineMiner, YearRange};
