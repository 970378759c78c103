//! Debate indexing: flatten, then add to the vector store.
//!
//! [`DebateIndexer`] does the work inline. [`IndexQueue`] runs it on a single
//! background worker fed by a bounded channel, so tool calls can schedule
//! indexing without waiting for it. Failures are logged and counted and never
//! reach the tool that scheduled the job.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::client::ParliamentClient;
use crate::error::{AppError, Result};
use crate::ingestion::flatten_debate;
use crate::schema::debates::Debate;
use crate::store::{AddSummary, VectorStore};

pub struct DebateIndexer {
    parliament: ParliamentClient,
    store: Arc<dyn VectorStore>,
}

impl DebateIndexer {
    pub fn new(parliament: ParliamentClient, store: Arc<dyn VectorStore>) -> Self {
        Self { parliament, store }
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    /// Flatten an already fetched debate and store its documents.
    pub async fn index_debate(&self, debate: &Debate) -> Result<AddSummary> {
        let documents = flatten_debate(debate);
        let summary = self
            .store
            .add(&documents)
            .await
            .map_err(|e| AppError::Indexing(e.to_string()))?;

        metrics::counter!("indexed_documents_total")
            .increment((summary.inserted + summary.replaced) as u64);
        tracing::info!(
            ext_id = debate.overview.as_ref().map(|o| o.ext_id.as_str()),
            documents = documents.len(),
            inserted = summary.inserted,
            replaced = summary.replaced,
            "Debate indexed"
        );
        Ok(summary)
    }

    /// Fetch the debate with external id `ext_id`, then index it.
    pub async fn index_ext_id(&self, ext_id: &str) -> Result<AddSummary> {
        let debate = self.parliament.get_debate(ext_id).await?;
        self.index_debate(&debate).await
    }
}

/// A batch of debates to fetch and index.
#[derive(Debug)]
pub struct IndexJob {
    pub id: Uuid,
    pub debate_ext_ids: Vec<String>,
    done: oneshot::Sender<IndexReport>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexReport {
    pub job_id: Uuid,
    pub debates_indexed: usize,
    pub documents: usize,
    /// `(ext_id, error)` for every debate that failed.
    pub failures: Vec<(String, String)>,
}

/// Handle to a queued job. Dropping it does not cancel the job.
#[derive(Debug)]
pub struct IndexTicket {
    pub job_id: Uuid,
    done: oneshot::Receiver<IndexReport>,
}

impl IndexTicket {
    /// Wait for the worker to finish the job. `None` if the worker went away.
    pub async fn wait(self) -> Option<IndexReport> {
        self.done.await.ok()
    }
}

#[derive(Clone)]
pub struct IndexQueue {
    sender: mpsc::Sender<IndexJob>,
}

impl IndexQueue {
    /// Start the worker. It runs until every `IndexQueue` clone is dropped.
    pub fn spawn(indexer: Arc<DebateIndexer>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let worker = tokio::spawn(run_worker(indexer, receiver));
        (Self { sender }, worker)
    }

    /// Queue `ext_ids` for indexing without waiting.
    ///
    /// Blank and repeated ids are dropped. Returns `None` when there is
    /// nothing to do or the queue is full or closed.
    pub fn enqueue<I>(&self, ext_ids: I) -> Option<IndexTicket>
    where
        I: IntoIterator<Item = String>,
    {
        let mut seen = HashSet::new();
        let debate_ext_ids: Vec<String> = ext_ids
            .into_iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty() && seen.insert(id.clone()))
            .collect();
        if debate_ext_ids.is_empty() {
            return None;
        }

        let (done, receiver) = oneshot::channel();
        let job = IndexJob {
            id: Uuid::new_v4(),
            debate_ext_ids,
            done,
        };
        let job_id = job.id;
        let count = job.debate_ext_ids.len();

        match self.sender.try_send(job) {
            Ok(()) => {
                metrics::counter!("indexing_jobs_total", "outcome" => "queued").increment(1);
                tracing::debug!(%job_id, debates = count, "Indexing job queued");
                Some(IndexTicket {
                    job_id,
                    done: receiver,
                })
            }
            Err(mpsc::error::TrySendError::Full(job)) => {
                metrics::counter!("indexing_jobs_total", "outcome" => "dropped").increment(1);
                metrics::counter!("indexing_failures_total").increment(1);
                tracing::warn!(
                    job_id = %job.id,
                    debates = count,
                    "Indexing queue full, dropping job"
                );
                None
            }
            Err(mpsc::error::TrySendError::Closed(job)) => {
                metrics::counter!("indexing_jobs_total", "outcome" => "dropped").increment(1);
                tracing::error!(job_id = %job.id, "Indexing worker stopped, dropping job");
                None
            }
        }
    }

    /// Wait until every job queued before this call has finished.
    ///
    /// Queues an empty marker job behind them; the single worker runs jobs in
    /// order, so the marker completes last. `false` if the worker is gone.
    pub async fn flush(&self) -> bool {
        let (done, receiver) = oneshot::channel();
        let marker = IndexJob {
            id: Uuid::new_v4(),
            debate_ext_ids: Vec::new(),
            done,
        };
        if self.sender.send(marker).await.is_err() {
            return false;
        }
        receiver.await.is_ok()
    }
}

async fn run_worker(indexer: Arc<DebateIndexer>, mut receiver: mpsc::Receiver<IndexJob>) {
    tracing::info!("Indexing worker started");

    while let Some(job) = receiver.recv().await {
        let start = Instant::now();
        let mut report = IndexReport {
            job_id: job.id,
            ..IndexReport::default()
        };

        for ext_id in &job.debate_ext_ids {
            match indexer.index_ext_id(ext_id).await {
                Ok(summary) => {
                    report.debates_indexed += 1;
                    report.documents += summary.inserted + summary.replaced;
                }
                Err(e) => {
                    metrics::counter!("indexing_failures_total").increment(1);
                    tracing::error!(
                        job_id = %job.id,
                        ext_id = ext_id.as_str(),
                        error = %e,
                        "Background indexing failed"
                    );
                    report.failures.push((ext_id.clone(), e.to_string()));
                }
            }
        }

        if job.debate_ext_ids.is_empty() {
            let _ = job.done.send(report);
            continue;
        }

        tracing::info!(
            job_id = %job.id,
            debates = report.debates_indexed,
            documents = report.documents,
            failures = report.failures.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Indexing job finished"
        );
        // The scheduler usually dropped its ticket already.
        let _ = job.done.send(report);
    }

    tracing::info!("Indexing worker stopped");
}
