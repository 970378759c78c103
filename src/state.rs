use crate::client::parliament::ParliamentUrls;
use crate::client::{CompaniesClient, HttpTransport, ParliamentClient, ReqwestTransport, RetryPolicy};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::indexing::{DebateIndexer, IndexQueue};
use crate::store::{Embedder, HashingEmbedder, InMemoryVectorStore, VectorStore};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Application state shared across all request handlers.
pub struct AppState {
    /// `None` when no API key is configured; the company tools then answer 503.
    pub companies: Option<CompaniesClient>,
    pub parliament: ParliamentClient,
    pub indexer: Arc<DebateIndexer>,
    pub index_queue: IndexQueue,
    pub store: Arc<dyn VectorStore>,
    /// Flag indicating the service is ready (clients built, store opened)
    pub ready: AtomicBool,
    pub config: Arc<Config>,
}

impl AppState {
    /// Build the production state: `reqwest` transport and the in-memory
    /// store, restored from its snapshot when `STORE_PATH` is set.
    ///
    /// Must be called inside a Tokio runtime; the indexing worker is spawned here.
    pub fn new(config: Config) -> Result<Self> {
        let transport = ReqwestTransport::new(config.http_timeout)
            .map_err(|e| AppError::Transport(e.to_string()))?;

        let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::new(config.embedding_dim));
        let store: Arc<dyn VectorStore> = match &config.store_path {
            Some(path) => Arc::new(InMemoryVectorStore::open(
                embedder,
                config.dedup_policy,
                path.clone(),
            )?),
            None => Arc::new(InMemoryVectorStore::new(embedder, config.dedup_policy)),
        };

        Ok(Self::with_parts(config, Arc::new(transport), store))
    }

    /// Assemble state around an arbitrary transport and store.
    pub fn with_parts(
        config: Config,
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        let policy = RetryPolicy::from_config(&config);

        let companies = match CompaniesClient::new(
            transport.clone(),
            policy,
            config.companies_base_url.clone(),
            config.company_api_key.clone(),
        ) {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!(error = %e, "Company registry tools disabled");
                None
            }
        };

        let parliament =
            ParliamentClient::new(transport, policy, ParliamentUrls::from_config(&config));
        let indexer = Arc::new(DebateIndexer::new(parliament.clone(), store.clone()));
        let (index_queue, _worker) =
            IndexQueue::spawn(indexer.clone(), config.index_queue_capacity);

        let state = Self {
            companies,
            parliament,
            indexer,
            index_queue,
            store,
            ready: AtomicBool::new(false),
            config: Arc::new(config),
        };

        state.ready.store(true, Ordering::SeqCst);
        state
    }

    /// The companies client, or the error explaining why it is unavailable.
    pub fn companies(&self) -> Result<&CompaniesClient> {
        self.companies
            .as_ref()
            .ok_or(AppError::MissingCredential(crate::client::companies::API_KEY_VAR))
    }

    /// Check if the service is ready to handle requests.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}
