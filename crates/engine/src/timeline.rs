//! Historical timeline mining
//!
//! Extracts year-tagged events from retrieved content for a topic. The scan
//! is a bounded numeric token match, not semantic date parsing: four-digit
//! tokens are kept only when they fall inside the recognized ranges. Years
//! are deduplicated within a single passage, not across the retrieval set,
//! so a year mentioned by two passages produces two events.

use crate::context::take_chars;
use crate::retrieval::MultiCollectionRetriever;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Inclusive year ranges recognized by the miner
const YEAR_RANGES: [(i32, i32); 2] = [(1950, 1999), (2000, 2029)];

/// Keywords appended to the topic to steer retrieval toward history
const TIMELINE_KEYWORDS: &str =
    "historical timeline evolution development years decades milestones";

/// Characters of passage content kept as the event snippet
const SNIPPET_CHARS: usize = 200;

/// One year-tagged event mined from a passage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEvent {
    /// Four-digit year the passage mentions
    pub year: i32,

    /// Content preview from the originating passage
    pub snippet: String,

    /// Source document of the originating passage
    pub source: String,

    /// Relevance score of the originating passage
    pub relevance: f32,
}

/// First and last year of a non-empty timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

/// Chronological timeline for one topic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline {
    /// Topic the timeline was mined for
    pub topic: String,

    /// Events sorted ascending by year
    pub timeline: Vec<TimelineEvent>,

    /// Number of events
    pub total_events: usize,

    /// Span of the timeline; absent when no events were found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_range: Option<YearRange>,
}

/// Miner reusing the multi-collection retriever
pub struct TimelineMiner {
    retriever: Arc<MultiCollectionRetriever>,
    max_sources: usize,
}

impl TimelineMiner {
    /// Create a miner with an elevated source cap
    pub fn new(retriever: Arc<MultiCollectionRetriever>, max_sources: usize) -> Self {
        Self {
            retriever,
            max_sources,
        }
    }

    /// Build the chronological timeline for `topic`
    pub async fn build_timeline(&self, topic: &str) -> Timeline {
        let query = format!("{} {}", topic, TIMELINE_KEYWORDS);
        let passages = self.retriever.retrieve(&query, self.max_sources, None).await;

        let mut events: Vec<TimelineEvent> = Vec::new();
        for passage in &passages {
            let source = passage.source().unwrap_or("Unknown").to_string();
            for year in extract_years(&passage.content) {
                events.push(TimelineEvent {
                    year,
                    snippet: format!("{}...", take_chars(&passage.content, SNIPPET_CHARS)),
                    source: source.clone(),
                    relevance: passage.relevance_score,
                });
            }
        }

        events.sort_by_key(|e| e.year);

        let year_range = match (events.first(), events.last()) {
            (Some(first), Some(last)) => Some(YearRange {
                start: first.year,
                end: last.year,
            }),
            _ => None,
        };

        debug!(topic, events = events.len(), "Timeline mined");

        Timeline {
            topic: topic.to_string(),
            total_events: events.len(),
            timeline: events,
            year_range,
        }
    }
}

/// Distinct in-range years mentioned in `content`, in first-mention order
fn extract_years(content: &str) -> Vec<i32> {
    static YEAR_TOKEN: OnceLock<Regex> = OnceLock::new();
    let pattern = YEAR_TOKEN
        .get_or_init(|| Regex::new(r"\b(19\d{2}|20\d{2})\b").expect("year pattern is valid"));

    let mut seen = HashSet::new();
    let mut years = Vec::new();

    for token in pattern.find_iter(content) {
        let Ok(year) = token.as_str().parse::<i32>() else {
            continue;
        };
        if YEAR_RANGES.iter().any(|&(lo, hi)| (lo..=hi).contains(&year)) && seen.insert(year) {
            years.push(year);
        }
    }

    years
}
