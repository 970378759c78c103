//! Hansard debate tools: fetch-and-index and semantic search.

use std::sync::Arc;
use std::time::Instant;

use axum::{body::Bytes, extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{record_call, required_params};
use crate::error::{Result, ValidationError};
use crate::filter::{DebateSearchParams, DocumentFilter};
use crate::schema::debates::Debate;
use crate::schema::{check_range, check_required_text, Validate};
use crate::state::AppState;

/// Largest `k` a search may ask for.
pub const MAX_K: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct GetDebateRequest {
    /// Hansard external id of the debate section.
    #[serde(rename = "debateId", alias = "debate_id")]
    pub debate_id: String,
}

impl Validate for GetDebateRequest {
    fn validate(&self) -> std::result::Result<(), ValidationError> {
        check_required_text("debateId", &self.debate_id)
    }
}

/// POST /tools/get_debate - Fetch a debate tree and index it before returning.
///
/// Indexing is best-effort: a failure is logged and the debate is still returned.
pub async fn get_debate_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Debate>> {
    record_call("get_debate");
    let request: GetDebateRequest = required_params(&body)?;
    let debate = state.parliament.get_debate(&request.debate_id).await?;

    if let Err(e) = state.indexer.index_debate(&debate).await {
        metrics::counter!("indexing_failures_total").increment(1);
        tracing::error!(
            debate_id = %request.debate_id,
            error = %e,
            "Indexing failed, returning debate anyway"
        );
    }

    Ok(Json(debate))
}

#[derive(Debug, Deserialize)]
pub struct SearchDebatesRequest {
    pub query: String,
    #[serde(default)]
    pub k: Option<i64>,
    /// Metadata equality filter.
    #[serde(default)]
    pub filter: Option<DebateSearchParams>,
    /// Content filter tree, compiled separately to keep its error kinds.
    #[serde(rename = "where_document", alias = "whereDocument", default)]
    pub where_document: Option<Value>,
}

impl Validate for SearchDebatesRequest {
    fn validate(&self) -> std::result::Result<(), ValidationError> {
        check_required_text("query", &self.query)?;
        match self.k {
            Some(k) => check_range("k", k, 1, MAX_K),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DocumentResult {
    pub id: String,
    pub page_content: String,
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct SearchDebatesResponse {
    pub results: Vec<DocumentResult>,
    pub query: String,
    pub count: usize,
}

/// POST /tools/search_debates - Similarity search over indexed debate speeches.
pub async fn search_debates_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<SearchDebatesResponse>> {
    let start_time = Instant::now();
    record_call("search_debates");
    let request: SearchDebatesRequest = required_params(&body)?;

    let k = request
        .k
        .map(|k| k as usize)
        .unwrap_or(state.config.search_default_k);
    let metadata = request
        .filter
        .as_ref()
        .map(DebateSearchParams::to_metadata_filter)
        .transpose()?
        .filter(|f| !f.is_empty());
    let content = request
        .where_document
        .clone()
        .filter(|raw| !raw.is_null())
        .map(DocumentFilter::parse)
        .transpose()?;

    let scored = state
        .store
        .similarity_search(&request.query, k, metadata.as_ref(), content.as_ref())
        .await?;

    let results: Vec<DocumentResult> = scored
        .into_iter()
        .map(|s| DocumentResult {
            id: s.document.id,
            page_content: s.document.page_content,
            metadata: s.document.metadata,
        })
        .collect();

    let total_time = start_time.elapsed();
    tracing::info!(
        query = %request.query,
        k,
        results = results.len(),
        metadata_filter = metadata.is_some(),
        content_filter = content.is_some(),
        total_ms = total_time.as_millis() as u64,
        "Debate search completed"
    );
    metrics::histogram!("search_latency_ms").record(total_time.as_millis() as f64);

    Ok(Json(SearchDebatesResponse {
        count: results.len(),
        results,
        query: request.query,
    }))
}
