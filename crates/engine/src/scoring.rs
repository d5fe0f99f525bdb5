//! Confidence scoring
//!
//! Derives a [0, 1] confidence from retrieval quality and answer shape. The
//! score is a heuristic summary, not a calibrated probability: it weighs how
//! many passages survived filtering, how relevant they were on average, and
//! how complete the answer looks.

use crate::retrieval::Passage;

/// Weight on the passage-count term
const PASSAGE_COUNT_WEIGHT: f32 = 0.3;

/// Weight on the average relevance term
const RELEVANCE_WEIGHT: f32 = 0.5;

/// Weight on the answer-completeness term
const ANSWER_LENGTH_WEIGHT: f32 = 0.2;

/// Passage count at which the count term saturates
const PASSAGE_COUNT_SATURATION: f32 = 10.0;

/// Answer length (characters) at which the completeness term saturates
const ANSWER_LENGTH_SATURATION: f32 = 500.0;

/// Score an answer against the passages that produced it
///
/// Returns 0.0 for an empty retrieval. Deterministic given identical inputs.
pub fn confidence(passages: &[Passage], answer: &str) -> f32 {
    if passages.is_empty() {
        return 0.0;
    }

    let count_factor = (passages.len() as f32 / PASSAGE_COUNT_SATURATION).min(1.0);

    let avg_relevance =
        passages.iter().map(|p| p.relevance_score).sum::<f32>() / passages.len() as f32;

    let length_factor = (answer.chars().count() as f32 / ANSWER_LENGTH_SATURATION).min(1.0);

    let score = PASSAGE_COUNT_WEIGHT * count_factor
        + RELEVANCE_WEIGHT * avg_relevance
        + ANSWER_LENGTH_WEIGHT * length_factor;

    score.min(1.0)
}
