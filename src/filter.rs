//! Filter expressions for debate search.
//!
//! [`DocumentFilter`] is a boolean tree over the document text. Each node on
//! the wire is an object with exactly one of `$contains`, `$not_contains`,
//! `$and` or `$or`. [`MetadataFilter`] is a flat equality map built from
//! [`DebateSearchParams`].

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::ValidationError;
use crate::schema::debates::{Source, ITEM_FIELDS, OVERVIEW_FIELDS};
use crate::schema::{scrub_none_sentinels, timestamp, unconstrained, WireFields, WireOptions};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireDocumentFilter", into = "WireDocumentFilter")]
pub enum DocumentFilter {
    Contains(String),
    NotContains(String),
    And(Vec<DocumentFilter>),
    Or(Vec<DocumentFilter>),
}

/// Wire shape of one filter node before the single-operator check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireDocumentFilter {
    #[serde(
        rename = "$contains",
        alias = "contains",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub contains: Option<String>,
    #[serde(
        rename = "$not_contains",
        alias = "not_contains",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub not_contains: Option<String>,
    #[serde(rename = "$and", alias = "and", default, skip_serializing_if = "Option::is_none")]
    pub and: Option<Vec<WireDocumentFilter>>,
    #[serde(rename = "$or", alias = "or", default, skip_serializing_if = "Option::is_none")]
    pub or: Option<Vec<WireDocumentFilter>>,
}

impl TryFrom<WireDocumentFilter> for DocumentFilter {
    type Error = ValidationError;

    fn try_from(wire: WireDocumentFilter) -> Result<Self, Self::Error> {
        let mut set = Vec::new();
        if wire.contains.is_some() {
            set.push("$contains");
        }
        if wire.not_contains.is_some() {
            set.push("$not_contains");
        }
        if wire.and.is_some() {
            set.push("$and");
        }
        if wire.or.is_some() {
            set.push("$or");
        }
        if set.len() > 1 {
            return Err(ValidationError::MultipleOperators(set));
        }

        match wire {
            WireDocumentFilter {
                contains: Some(text),
                ..
            } => Ok(DocumentFilter::Contains(text)),
            WireDocumentFilter {
                not_contains: Some(text),
                ..
            } => Ok(DocumentFilter::NotContains(text)),
            WireDocumentFilter { and: Some(nodes), .. } => {
                compile_all(nodes, "$and").map(DocumentFilter::And)
            }
            WireDocumentFilter { or: Some(nodes), .. } => {
                compile_all(nodes, "$or").map(DocumentFilter::Or)
            }
            _ => Err(ValidationError::NoOperator),
        }
    }
}

fn compile_all(
    nodes: Vec<WireDocumentFilter>,
    op: &'static str,
) -> Result<Vec<DocumentFilter>, ValidationError> {
    if nodes.is_empty() {
        return Err(ValidationError::EmptyCombinator(op));
    }
    nodes.into_iter().map(DocumentFilter::try_from).collect()
}

impl From<DocumentFilter> for WireDocumentFilter {
    fn from(filter: DocumentFilter) -> Self {
        match filter {
            DocumentFilter::Contains(text) => Self {
                contains: Some(text),
                ..Self::default()
            },
            DocumentFilter::NotContains(text) => Self {
                not_contains: Some(text),
                ..Self::default()
            },
            DocumentFilter::And(nodes) => Self {
                and: Some(nodes.into_iter().map(Into::into).collect()),
                ..Self::default()
            },
            DocumentFilter::Or(nodes) => Self {
                or: Some(nodes.into_iter().map(Into::into).collect()),
                ..Self::default()
            },
        }
    }
}

impl DocumentFilter {
    /// Decode and compile a raw filter tree, keeping the typed error.
    pub fn parse(mut raw: Value) -> Result<Self, ValidationError> {
        scrub_none_sentinels(&mut raw);
        let wire: WireDocumentFilter =
            serde_json::from_value(raw).map_err(|e| ValidationError::Malformed(e.to_string()))?;
        Self::try_from(wire)
    }

    pub fn contains(text: impl Into<String>) -> Self {
        DocumentFilter::Contains(text.into())
    }

    pub fn not_contains(text: impl Into<String>) -> Self {
        DocumentFilter::NotContains(text.into())
    }

    /// The wire dictionary understood by the vector store.
    pub fn to_wire_format(&self) -> Value {
        match self {
            DocumentFilter::Contains(text) => json!({ "$contains": text }),
            DocumentFilter::NotContains(text) => json!({ "$not_contains": text }),
            DocumentFilter::And(nodes) => {
                json!({ "$and": nodes.iter().map(Self::to_wire_format).collect::<Vec<_>>() })
            }
            DocumentFilter::Or(nodes) => {
                json!({ "$or": nodes.iter().map(Self::to_wire_format).collect::<Vec<_>>() })
            }
        }
    }

    /// Case-insensitive substring evaluation against `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.matches_lowered(&text.to_lowercase())
    }

    fn matches_lowered(&self, lowered: &str) -> bool {
        match self {
            DocumentFilter::Contains(needle) => lowered.contains(&needle.to_lowercase()),
            DocumentFilter::NotContains(needle) => !lowered.contains(&needle.to_lowercase()),
            DocumentFilter::And(nodes) => nodes.iter().all(|n| n.matches_lowered(lowered)),
            DocumentFilter::Or(nodes) => nodes.iter().any(|n| n.matches_lowered(lowered)),
        }
    }
}

/// Exact-equality constraints on document metadata. Empty matches everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataFilter(pub Map<String, Value>);

impl MetadataFilter {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn matches(&self, metadata: &Map<String, Value>) -> bool {
        self.0
            .iter()
            .all(|(key, expected)| metadata.get(key) == Some(expected))
    }
}

/// Partially populated document metadata used as a search filter.
///
/// Shares the upstream keys of the debate overview and item records so a
/// populated field compares directly against indexed metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebateSearchParams {
    #[serde(rename = "Id", alias = "id", default)]
    pub id: Option<i64>,
    #[serde(rename = "ExtId", alias = "ext_id", default)]
    pub ext_id: Option<String>,
    #[serde(rename = "Title", alias = "title", default)]
    pub title: Option<String>,
    #[serde(rename = "HRSTag", alias = "hrs_tag", default)]
    pub hrs_tag: Option<String>,
    #[serde(rename = "Date", alias = "date", default, with = "timestamp::option")]
    pub date: Option<NaiveDateTime>,
    #[serde(rename = "Location", alias = "location", default)]
    pub location: Option<String>,
    #[serde(rename = "House", alias = "house", default)]
    pub house: Option<String>,
    #[serde(rename = "Source", alias = "source", default)]
    pub source: Option<Source>,
    #[serde(rename = "VolumeNo", alias = "volume_no", default)]
    pub volume_no: Option<i64>,
    #[serde(
        rename = "ContentLastUpdated",
        alias = "content_last_updated",
        default,
        with = "timestamp::option"
    )]
    pub content_last_updated: Option<NaiveDateTime>,
    #[serde(rename = "DebateTypeId", alias = "debate_type_id", default)]
    pub debate_type_id: Option<i64>,
    #[serde(rename = "SectionType", alias = "section_type", default)]
    pub section_type: Option<i64>,
    #[serde(rename = "NextDebateExtId", alias = "next_debate_ext_id", default)]
    pub next_debate_ext_id: Option<String>,
    #[serde(rename = "NextDebateTitle", alias = "next_debate_title", default)]
    pub next_debate_title: Option<String>,
    #[serde(rename = "PreviousDebateExtId", alias = "previous_debate_ext_id", default)]
    pub previous_debate_ext_id: Option<String>,
    #[serde(rename = "PreviousDebateTitle", alias = "previous_debate_title", default)]
    pub previous_debate_title: Option<String>,
    #[serde(rename = "ItemType", alias = "item_type", default)]
    pub item_type: Option<String>,
    #[serde(rename = "ItemId", alias = "item_id", default)]
    pub item_id: Option<i64>,
    #[serde(rename = "MemberId", alias = "member_id", default)]
    pub member_id: Option<i64>,
    #[serde(rename = "AttributedTo", alias = "attributed_to", default)]
    pub attributed_to: Option<String>,
    #[serde(rename = "OrderInSection", alias = "order_in_section", default)]
    pub order_in_section: Option<i64>,
    #[serde(rename = "Timecode", alias = "timecode", default, with = "timestamp::option")]
    pub timecode: Option<NaiveDateTime>,
    #[serde(rename = "ExternalId", alias = "external_id", default)]
    pub external_id: Option<String>,
    #[serde(rename = "HansardSection", alias = "hansard_section", default)]
    pub hansard_section: Option<String>,
    #[serde(rename = "UIN", alias = "uin", default)]
    pub uin: Option<String>,
    #[serde(rename = "IsReiteration", alias = "is_reiteration", default)]
    pub is_reiteration: Option<bool>,
}

unconstrained!(DebateSearchParams);

impl WireFields for DebateSearchParams {
    // Overview and item tables together. `HRSTag` appears in both and maps to
    // the same Rust name, so the first match is correct.
    const FIELDS: &'static [(&'static str, &'static str)] = &[
        ("id", "Id"),
        ("ext_id", "ExtId"),
        ("title", "Title"),
        ("hrs_tag", "HRSTag"),
        ("date", "Date"),
        ("location", "Location"),
        ("house", "House"),
        ("source", "Source"),
        ("volume_no", "VolumeNo"),
        ("content_last_updated", "ContentLastUpdated"),
        ("debate_type_id", "DebateTypeId"),
        ("section_type", "SectionType"),
        ("next_debate_ext_id", "NextDebateExtId"),
        ("next_debate_title", "NextDebateTitle"),
        ("previous_debate_ext_id", "PreviousDebateExtId"),
        ("previous_debate_title", "PreviousDebateTitle"),
        ("item_type", "ItemType"),
        ("item_id", "ItemId"),
        ("member_id", "MemberId"),
        ("attributed_to", "AttributedTo"),
        ("order_in_section", "OrderInSection"),
        ("timecode", "Timecode"),
        ("external_id", "ExternalId"),
        ("hansard_section", "HansardSection"),
        ("uin", "UIN"),
        ("is_reiteration", "IsReiteration"),
    ];
}

impl DebateSearchParams {
    /// Set fields become equality constraints keyed by upstream name.
    pub fn to_metadata_filter(&self) -> Result<MetadataFilter, ValidationError> {
        self.to_wire(WireOptions::QUERY).map(MetadataFilter)
    }

    /// Every upstream key a filter may use. Matches the keys flattening emits.
    pub fn known_keys() -> impl Iterator<Item = &'static str> {
        OVERVIEW_FIELDS
            .iter()
            .chain(ITEM_FIELDS.iter())
            .map(|(_, wire)| *wire)
            .filter(|wire| *wire != "Value")
    }
}
