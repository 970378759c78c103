//! govdata - UK companies register and Parliament data as callable tools
//!
//! This library exposes the schema layer, upstream clients, debate indexing
//! pipeline and tool handlers, enabling integration tests and embedding the
//! tool router in other applications.

pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod indexing;
pub mod ingestion;
pub mod persistence;
pub mod schema;
pub mod state;
pub mod store;

// Re-export key types for convenience
pub use client::{CompaniesClient, HttpTransport, ParliamentClient, RetryPolicy};
pub use config::Config;
pub use error::{AppError, Result, ValidationError};
pub use filter::{DocumentFilter, MetadataFilter};
pub use handlers::router;
pub use indexing::{DebateIndexer, IndexQueue, IndexReport, IndexTicket};
pub use ingestion::{flatten_debate, DebateDocument};
pub use state::AppState;
pub use store::{DedupPolicy, InMemoryVectorStore, VectorStore};
