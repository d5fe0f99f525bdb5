//! Document store abstraction
//!
//! The engine reads topic-partitioned collections through this trait. The
//! backing index is opaque; any vector store that can answer a text query
//! with distance-scored passages qualifies. Distance-to-relevance conversion
//! is the engine's responsibility, not the store's.

use crate::errors::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One raw passage as returned by a document store query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredPassage {
    /// Passage text
    pub content: String,

    /// Provenance metadata (source, title, url, timestamp, type)
    #[serde(default)]
    pub metadata: HashMap<String, String>,

    /// Vector distance from the query; lower is closer, may exceed 1.0
    pub distance: f32,
}

impl StoredPassage {
    /// Create a passage with a single `source` metadata entry
    pub fn new(content: impl Into<String>, source: impl Into<String>, distance: f32) -> Self {
        let mut metadata = HashMap::new();
        metadata.insert("source".to_string(), source.into());
        Self {
            content: content.into(),
            metadata,
            distance,
        }
    }

    /// Attach a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Trait for querying a topic-partitioned document store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Query one collection for the passages nearest to `query_text`
    async fn query_collection(
        &self,
        query_text: &str,
        collection: &str,
        n_results: usize,
    ) -> Result<Vec<StoredPassage>>;
}

/// In-memory document store for tests and local development
///
/// Returns seeded passages in insertion order, capped at `n_results`.
/// Unknown collections yield an empty result rather than an error, matching
/// the behavior of a store with missing partitions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: HashMap<String, Vec<StoredPassage>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a collection with passages
    pub fn insert(&mut self, collection: impl Into<String>, passages: Vec<StoredPassage>) {
        self.collections
            .entry(collection.into())
            .or_default()
            .extend(passages);
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn query_collection(
        &self,
        _query_text: &str,
        collection: &str,
        n_results: usize,
    ) -> Result<Vec<StoredPassage>> {
        let passages = match self.collections.get(collection) {
            Some(passages) => passages.iter().take(n_results).cloned().collect(),
            None => {
                tracing::debug!(collection, "Collection not present in memory store");
                Vec::new()
            }
        };
        Ok(passages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_returns_seeded_passages() {
        let mut store = MemoryStore::new();
        store.insert(
            "documents",
            vec![
                StoredPassage::new("EUV lithography overview", "asml.com", 0.1),
                StoredPassage::new("DUV immersion scanners", "asml.com", 0.3),
            ],
        );

        let results = store.query_collection("euv", "documents", 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].content, "EUV lithography overview");
    }

    #[tokio::test]
    async fn test_memory_store_caps_results() {
        let mut store = MemoryStore::new();
        let passages = (0..5)
            .map(|i| StoredPassage::new(format!("passage {}", i), "fab.io", 0.2))
            .collect();
        store.insert("news_articles", passages);

        let results = store
            .query_collection("fab", "news_articles", 3)
            .await
            .unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn test_memory_store_unknown_collection_is_empty() {
        let store = MemoryStore::new();
        let results = store.query_collection("anything", "patents", 10).await.unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_with_metadata() {
        let passage = StoredPassage::new("content", "ieee.org", 0.2)
            .with_metadata("title", "Scaling Laws")
            .with_metadata("timestamp", "2021-06-01T12:00:00Z");
        assert_eq!(passage.metadata.get("title").unwrap(), "Scaling Laws");
        assert_eq!(passage.metadata.get("source").unwrap(), "ieee.org");
    }
}
