//! Type definitions for the ingestion module.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One indexable speech cut out of a debate tree.
///
/// `metadata` holds the debate overview fields merged with the item's own
/// fields, keyed by upstream name, with only scalar values kept. The item's
/// text is the `page_content`, never a metadata entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateDocument {
    /// `"{overviewId}-{itemId}"`. Stable across re-flattening.
    pub id: String,

    pub page_content: String,

    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl DebateDocument {
    pub fn new(id: String, page_content: String, metadata: Map<String, Value>) -> Self {
        Self {
            id,
            page_content,
            metadata,
        }
    }
}
