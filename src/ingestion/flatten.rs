//! Debate tree flattening.
//!
//! Walks a [`Debate`] depth-first, parent before children, and turns every
//! attributed speech into a [`DebateDocument`]. Items that fail to project are
//! logged and skipped so one bad record does not drop the whole debate.

use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::ingestion::types::DebateDocument;
use crate::schema::debates::{Debate, DebateItem, DebateOverview};
use crate::schema::{WireFields, WireOptions};

/// Upstream key of the item text, excluded from metadata.
const TEXT_KEY: &str = "Value";

/// Flatten `debate` and all of its descendants.
///
/// Ordering is the parent's own qualifying items in their original order,
/// followed by each child debate's documents in turn.
pub fn flatten_debate(debate: &Debate) -> Vec<DebateDocument> {
    let mut documents = Vec::new();
    let mut stack = vec![debate];

    while let Some(node) = stack.pop() {
        stack.extend(node.child_debates.iter().rev());

        let Some(overview) = node.overview.as_ref() else {
            if node.items.iter().any(DebateItem::is_attributed_speech) {
                tracing::debug!(
                    items = node.items.len(),
                    "Skipping items of debate without overview"
                );
            }
            continue;
        };

        for item in node.items.iter().filter(|item| item.is_attributed_speech()) {
            match to_document(overview, item) {
                Ok(document) => documents.push(document),
                Err(e) => {
                    tracing::warn!(
                        debate = overview.ext_id.as_str(),
                        item_id = ?item.item_id,
                        error = %e,
                        "Skipping debate item"
                    );
                }
            }
        }
    }

    tracing::debug!(
        debates = debate.node_count(),
        documents = documents.len(),
        "Debate flattening complete"
    );

    documents
}

/// Synthetic document id. A missing item id renders as `none`.
pub fn document_id(overview: &DebateOverview, item: &DebateItem) -> String {
    match item.item_id {
        Some(item_id) => format!("{}-{}", overview.id, item_id),
        None => format!("{}-none", overview.id),
    }
}

fn to_document(
    overview: &DebateOverview,
    item: &DebateItem,
) -> Result<DebateDocument, ValidationError> {
    let text = item
        .value
        .clone()
        .ok_or_else(|| ValidationError::MissingRequiredField(TEXT_KEY.to_string()))?;

    Ok(DebateDocument::new(
        document_id(overview, item),
        text,
        merge_metadata(overview, item)?,
    ))
}

/// Overview fields, then item fields on top. The item wins on collisions.
pub fn merge_metadata(
    overview: &DebateOverview,
    item: &DebateItem,
) -> Result<Map<String, Value>, ValidationError> {
    let mut metadata = overview.to_wire(WireOptions::QUERY)?;
    let mut item_fields = item.to_wire(WireOptions::QUERY)?;
    item_fields.remove(TEXT_KEY);
    metadata.extend(item_fields);
    Ok(filter_complex_metadata(metadata))
}

/// Keep only scalar metadata values; nested structures and nulls are dropped.
pub fn filter_complex_metadata(metadata: Map<String, Value>) -> Map<String, Value> {
    metadata
        .into_iter()
        .filter(|(_, value)| matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_)))
        .collect()
}
