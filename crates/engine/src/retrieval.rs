//! Multi-collection retrieval
//!
//! Fans a query out across the configured collections, merges the results,
//! filters against the similarity threshold, and truncates to the source
//! cap. Collection fetches are independent read operations and run
//! concurrently; a failed collection contributes zero passages and never
//! aborts the retrieval.

use fablore_common::config::RetrievalConfig;
use fablore_common::store::{DocumentStore, StoredPassage};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Overfetch margin per collection so post-merge filtering still fills the cap
const PER_COLLECTION_MARGIN: usize = 2;

/// One retrieved passage with relevance metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passage {
    /// Passage text
    pub content: String,

    /// Provenance metadata (source, title, url, timestamp, type)
    pub metadata: HashMap<String, String>,

    /// Vector distance from the query
    pub distance: f32,

    /// 1 - distance; may go negative for very dissimilar vectors
    pub relevance_score: f32,

    /// Collection this passage came from
    pub collection: String,
}

impl Passage {
    /// Build a passage from a store result, tagging its collection
    pub fn from_stored(stored: StoredPassage, collection: &str) -> Self {
        let relevance_score = 1.0 - stored.distance;
        Self {
            content: stored.content,
            metadata: stored.metadata,
            distance: stored.distance,
            relevance_score,
            collection: collection.to_string(),
        }
    }

    /// Source document identifier from metadata, if present and non-empty
    pub fn source(&self) -> Option<&str> {
        self.metadata
            .get("source")
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// Retriever spanning the topic-partitioned collections of one store
pub struct MultiCollectionRetriever {
    store: Arc<dyn DocumentStore>,
    config: RetrievalConfig,
}

impl MultiCollectionRetriever {
    /// Create a new retriever over the given store
    pub fn new(store: Arc<dyn DocumentStore>, config: RetrievalConfig) -> Self {
        Self { store, config }
    }

    /// Retrieve passages relevant to `question` across `collections`
    ///
    /// Falls back to the configured default collections when none are named.
    /// The result is sorted descending by relevance score (ties keep
    /// collection declaration order), filtered against the similarity
    /// threshold, and truncated to `max_sources`. An all-failed or all-empty
    /// retrieval yields an empty set, not an error.
    pub async fn retrieve(
        &self,
        question: &str,
        max_sources: usize,
        collections: Option<&[String]>,
    ) -> Vec<Passage> {
        let collections: Vec<String> = match collections {
            Some(named) => named.to_vec(),
            None => self.config.default_collections.clone(),
        };

        if collections.is_empty() {
            debug!("No collections to search");
            return Vec::new();
        }

        let per_collection = max_sources / collections.len() + PER_COLLECTION_MARGIN;

        let fetches = collections
            .iter()
            .map(|name| self.fetch_collection(question, name, per_collection));
        let fetched = futures::future::join_all(fetches).await;

        let mut passages: Vec<Passage> = fetched.into_iter().flatten().collect();

        // Stable sort: ties keep the order collections were declared in
        passages.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(Ordering::Equal)
        });

        passages.retain(|p| p.relevance_score >= self.config.similarity_threshold);
        passages.truncate(max_sources);

        debug!(
            count = passages.len(),
            max_sources, "Retrieval complete"
        );

        passages
    }

    /// Query one collection, isolating any failure
    async fn fetch_collection(
        &self,
        question: &str,
        collection: &str,
        n_results: usize,
    ) -> Vec<Passage> {
        match self
            .store
            .query_collection(question, collection, n_results)
            .await
        {
            Ok(stored) => {
                debug!(collection, count = stored.len(), "Collection query returned");
                stored
                    .into_iter()
                    .map(|s| Passage::from_stored(s, collection))
                    .collect()
            }
            Err(e) => {
                warn!(collection, error = %e, "Collection query failed, skipping");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use fablore_common::errors::{EngineError, Result};
    use fablore_common::store::MemoryStore;

    /// Store whose every query fails
    struct BrokenStore;

    #[async_trait]
    impl DocumentStore for BrokenStore {
        async fn query_collection(
            &self,
            _query_text: &str,
            collection: &str,
            _n_results: usize,
        ) -> Result<Vec<StoredPassage>> {
            Err(EngineError::store(collection, "store unavailable"))
        }
    }

    /// Store where only the named collections fail
    struct PartiallyBrokenStore {
        inner: MemoryStore,
        broken: Vec<String>,
    }

    #[async_trait]
    impl DocumentStore for PartiallyBrokenStore {
        async fn query_collection(
            &self,
            query_text: &str,
            collection: &str,
            n_results: usize,
        ) -> Result<Vec<StoredPassage>> {
            if self.broken.iter().any(|b| b == collection) {
                return Err(EngineError::store(collection, "timeout"));
            }
            self.inner.query_collection(query_text, collection, n_results).await
        }
    }

    fn config_with_threshold(threshold: f32) -> RetrievalConfig {
        RetrievalConfig {
            similarity_threshold: threshold,
            ..RetrievalConfig::default()
        }
    }

    fn retriever_over(store: impl DocumentStore + 'static) -> MultiCollectionRetriever {
        MultiCollectionRetriever::new(Arc::new(store), config_with_threshold(0.7))
    }

    #[test]
    fn test_relevance_from_distance() {
        let passage = Passage::from_stored(StoredPassage::new("text", "src", 0.25), "documents");
        assert!((passage.relevance_score - 0.75).abs() < f32::EPSILON);
        assert_eq!(passage.collection, "documents");
    }

    #[test]
    fn test_relevance_can_go_negative() {
        let passage = Passage::from_stored(StoredPassage::new("text", "src", 1.4), "documents");
        assert!(passage.relevance_score < 0.0);
    }

    #[tokio::test]
    async fn test_retrieve_filters_below_threshold() {
        let mut store = MemoryStore::new();
        store.insert(
            "documents",
            vec![
                StoredPassage::new("above", "a.com", 0.1),  // relevance 0.9
                StoredPassage::new("below", "b.com", 0.5),  // relevance 0.5
            ],
        );

        let retriever = retriever_over(store);
        let passages = retriever.retrieve("query", 10, None).await;

        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].content, "above");
        // nothing below the configured threshold survives
        assert!(passages.iter().all(|p| p.relevance_score >= 0.7));
    }

    #[tokio::test]
    async fn test_retrieve_sorts_descending() {
        let mut store = MemoryStore::new();
        store.insert(
            "documents",
            vec![
                StoredPassage::new("second", "a.com", 0.2),
                StoredPassage::new("first", "a.com", 0.05),
            ],
        );

        let retriever = retriever_over(store);
        let passages = retriever.retrieve("query", 10, None).await;

        assert_eq!(passages[0].content, "first");
        assert_eq!(passages[1].content, "second");
    }

    #[tokio::test]
    async fn test_retrieve_ties_keep_declaration_order() {
        let mut store = MemoryStore::new();
        store.insert(
            "documents",
            vec![StoredPassage::new("from documents", "a.com", 0.2)],
        );
        store.insert(
            "patents",
            vec![StoredPassage::new("from patents", "b.com", 0.2)],
        );

        let retriever = retriever_over(store);
        let collections = vec!["patents".to_string(), "documents".to_string()];
        let passages = retriever.retrieve("query", 10, Some(&collections)).await;

        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0].content, "from patents");
        assert_eq!(passages[1].content, "from documents");
    }

    #[tokio::test]
    async fn test_retrieve_truncates_to_max_sources() {
        let mut store = MemoryStore::new();
        store.insert(
            "documents",
            (0..8)
                .map(|i| StoredPassage::new(format!("passage {}", i), "a.com", 0.1))
                .collect(),
        );

        let retriever = retriever_over(store);
        let collections = vec!["documents".to_string()];
        let passages = retriever.retrieve("query", 3, Some(&collections)).await;

        assert_eq!(passages.len(), 3);
    }

    #[tokio::test]
    async fn test_failed_collections_are_isolated() {
        let mut inner = MemoryStore::new();
        inner.insert(
            "documents",
            vec![StoredPassage::new("survivor", "a.com", 0.1)],
        );

        let store = PartiallyBrokenStore {
            inner,
            broken: vec!["patents".to_string(), "news_articles".to_string()],
        };

        let retriever = retriever_over(store);
        let passages = retriever.retrieve("query", 10, None).await;

        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].content, "survivor");
    }

    #[tokio::test]
    async fn test_all_failed_yields_empty_set() {
        let retriever = retriever_over(BrokenStore);
        let passages = retriever.retrieve("query", 10, None).await;
        assert!(passages.is_empty());
    }

    #[tokio::test]
    async fn test_empty_collection_list_yields_empty_set() {
        let retriever = retriever_over(MemoryStore::new());
        let none: Vec<String> = Vec::new();
        let passages = retriever.retrieve("query", 10, Some(&none)).await;
        assert!(passages.is_empty());
    }
}
