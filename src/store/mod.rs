//! Vector store for indexed debate documents.

pub mod embedder;
pub mod memory;

pub use embedder::{Embedder, HashingEmbedder};
pub use memory::InMemoryVectorStore;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::Result;
use crate::filter::{DocumentFilter, MetadataFilter};
use crate::ingestion::DebateDocument;

/// What `add` does with a document whose id is already stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupPolicy {
    /// Replace the stored document in place.
    #[default]
    UpsertById,
    /// Keep both copies.
    Append,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown dedup policy {0:?}, expected \"upsert\" or \"append\"")]
pub struct UnknownDedupPolicy(pub String);

impl FromStr for DedupPolicy {
    type Err = UnknownDedupPolicy;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "upsert" | "upsert_by_id" => Ok(DedupPolicy::UpsertById),
            "append" => Ok(DedupPolicy::Append),
            _ => Err(UnknownDedupPolicy(raw.to_string())),
        }
    }
}

impl fmt::Display for DedupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DedupPolicy::UpsertById => f.write_str("upsert"),
            DedupPolicy::Append => f.write_str("append"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredDocument {
    pub document: DebateDocument,
    pub score: f32,
}

/// Outcome of an `add` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AddSummary {
    pub inserted: usize,
    pub replaced: usize,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Store `documents`, applying the store's [`DedupPolicy`].
    async fn add(&self, documents: &[DebateDocument]) -> Result<AddSummary>;

    /// Up to `k` documents passing both filters, most similar to `query` first.
    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
        metadata: Option<&MetadataFilter>,
        content: Option<&DocumentFilter>,
    ) -> Result<Vec<ScoredDocument>>;

    /// Number of stored documents.
    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_policy_parsing() {
        assert_eq!("upsert".parse::<DedupPolicy>().unwrap(), DedupPolicy::UpsertById);
        assert_eq!(" Append ".parse::<DedupPolicy>().unwrap(), DedupPolicy::Append);
        assert!("sometimes".parse::<DedupPolicy>().is_err());
        assert_eq!(DedupPolicy::default(), DedupPolicy::UpsertById);
        assert_eq!(DedupPolicy::Append.to_string(), "append");
    }
}
