//! In-memory vector store using cosine similarity.
//!
//! Documents live in insertion order behind a `tokio::sync::RwLock`. When a
//! snapshot path is configured the full store is written out after every
//! `add` and read back on open.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use ndarray::{Array1, Array2};
use tokio::sync::{Mutex, RwLock};

use super::{AddSummary, DedupPolicy, Embedder, ScoredDocument, VectorStore};
use crate::error::{AppError, Result};
use crate::filter::{DocumentFilter, MetadataFilter};
use crate::ingestion::DebateDocument;
use crate::persistence::StoreSnapshot;

struct Entry {
    document: DebateDocument,
    embedding: Array1<f32>,
}

#[derive(Default)]
struct Inner {
    entries: Vec<Entry>,
    /// Position of the latest entry for each id.
    by_id: HashMap<String, usize>,
}

impl Inner {
    fn push(&mut self, entry: Entry) {
        self.by_id
            .insert(entry.document.id.clone(), self.entries.len());
        self.entries.push(entry);
    }
}

pub struct InMemoryVectorStore {
    embedder: Arc<dyn Embedder>,
    policy: DedupPolicy,
    snapshot_path: Option<PathBuf>,
    inner: RwLock<Inner>,
    /// Held from snapshot capture until the file is replaced, so snapshots
    /// land one at a time and in the order they were taken.
    persist_lock: Mutex<()>,
}

impl InMemoryVectorStore {
    pub fn new(embedder: Arc<dyn Embedder>, policy: DedupPolicy) -> Self {
        Self {
            embedder,
            policy,
            snapshot_path: None,
            inner: RwLock::new(Inner::default()),
            persist_lock: Mutex::new(()),
        }
    }

    /// Open a store backed by the snapshot at `path`, loading it if present.
    ///
    /// A snapshot written with a different embedding width is ignored.
    pub fn open(embedder: Arc<dyn Embedder>, policy: DedupPolicy, path: PathBuf) -> Result<Self> {
        let mut inner = Inner::default();
        match StoreSnapshot::load(&path)? {
            Some(snapshot) if snapshot.embedding_dim() == embedder.dimensions() => {
                for (document, row) in snapshot
                    .documents
                    .into_iter()
                    .zip(snapshot.embeddings.outer_iter())
                {
                    inner.push(Entry {
                        document,
                        embedding: row.to_owned(),
                    });
                }
            }
            Some(snapshot) => {
                tracing::warn!(
                    snapshot_dim = snapshot.embedding_dim(),
                    embedder_dim = embedder.dimensions(),
                    "Snapshot embedding width differs, starting empty"
                );
            }
            None => {}
        }

        tracing::info!(
            path = %path.display(),
            documents = inner.entries.len(),
            policy = %policy,
            "Vector store opened"
        );

        Ok(Self {
            embedder,
            policy,
            snapshot_path: Some(path),
            inner: RwLock::new(inner),
            persist_lock: Mutex::new(()),
        })
    }

    pub fn policy(&self) -> DedupPolicy {
        self.policy
    }

    /// Copy of every stored document, in storage order.
    pub async fn documents(&self) -> Vec<DebateDocument> {
        let inner = self.inner.read().await;
        inner.entries.iter().map(|e| e.document.clone()).collect()
    }

    fn snapshot_of(&self, inner: &Inner) -> Result<StoreSnapshot> {
        let dim = self.embedder.dimensions();
        let mut data = Vec::with_capacity(inner.entries.len() * dim);
        for entry in &inner.entries {
            data.extend(entry.embedding.iter().copied());
        }
        let embeddings = Array2::from_shape_vec((inner.entries.len(), dim), data)
            .map_err(|e| AppError::Store(format!("Failed to build snapshot: {e}")))?;
        let documents = inner.entries.iter().map(|e| e.document.clone()).collect();
        StoreSnapshot::new(documents, embeddings)
    }

    async fn persist(&self, snapshot: StoreSnapshot) -> Result<()> {
        let Some(path) = self.snapshot_path.clone() else {
            return Ok(());
        };
        tokio::task::spawn_blocking(move || snapshot.save(&path))
            .await
            .map_err(|e| AppError::Store(format!("Snapshot task failed: {e}")))?
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn add(&self, documents: &[DebateDocument]) -> Result<AddSummary> {
        if documents.is_empty() {
            return Ok(AddSummary::default());
        }

        let texts: Vec<&str> = documents.iter().map(|d| d.page_content.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let mut summary = AddSummary::default();
        let snapshot = {
            let mut inner = self.inner.write().await;
            for (document, embedding) in documents.iter().zip(embeddings) {
                let entry = Entry {
                    document: document.clone(),
                    embedding,
                };
                match (self.policy, inner.by_id.get(&document.id).copied()) {
                    (DedupPolicy::UpsertById, Some(pos)) => {
                        inner.entries[pos] = entry;
                        summary.replaced += 1;
                    }
                    _ => {
                        inner.push(entry);
                        summary.inserted += 1;
                    }
                }
            }
            match self.snapshot_path {
                Some(_) => {
                    let turn = self.persist_lock.lock().await;
                    Some((turn, self.snapshot_of(&inner)?))
                }
                None => None,
            }
        };

        if let Some((_turn, snapshot)) = snapshot {
            self.persist(snapshot).await?;
        }

        tracing::debug!(
            inserted = summary.inserted,
            replaced = summary.replaced,
            "Documents added to vector store"
        );
        Ok(summary)
    }

    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
        metadata: Option<&MetadataFilter>,
        content: Option<&DocumentFilter>,
    ) -> Result<Vec<ScoredDocument>> {
        if k == 0 {
            return Ok(Vec::new());
        }
        let query_embedding = self.embedder.embed(query).await?;

        let inner = self.inner.read().await;
        let mut scored: Vec<ScoredDocument> = inner
            .entries
            .iter()
            .filter(|e| metadata.map_or(true, |f| f.matches(&e.document.metadata)))
            .filter(|e| content.map_or(true, |f| f.matches(&e.document.page_content)))
            .map(|e| ScoredDocument {
                document: e.document.clone(),
                score: query_embedding.dot(&e.embedding),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);
        Ok(scored)
    }

    async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }
}
