//! Ingestion module for turning debate trees into indexable documents.

pub mod flatten;
pub mod types;

pub use flatten::{filter_complex_metadata, flatten_debate};
pub use types::DebateDocument;
