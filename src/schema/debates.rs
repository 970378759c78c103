//! Hansard debate records.
//!
//! A [`Debate`] is a tree: each node carries an optional overview, its own
//! ordered items, and any number of child debates.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::timestamp;
use super::{null_as_default, unconstrained, WireFields};

/// Publication stage of the Hansard record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Source {
    RollingHansard,
    DailyHansard,
    BoundVolume,
    Historic,
}

impl TryFrom<i64> for Source {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Source::RollingHansard),
            2 => Ok(Source::DailyHansard),
            3 => Ok(Source::BoundVolume),
            4 => Ok(Source::Historic),
            other => Err(format!("unknown source {other}, expected 1..=4")),
        }
    }
}

impl From<Source> for i64 {
    fn from(source: Source) -> Self {
        match source {
            Source::RollingHansard => 1,
            Source::DailyHansard => 2,
            Source::BoundVolume => 3,
            Source::Historic => 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DebateOverview {
    #[serde(rename = "Id", alias = "id")]
    pub id: i64,
    #[serde(rename = "ExtId", alias = "ext_id")]
    pub ext_id: String,
    #[serde(rename = "Title", alias = "title")]
    pub title: String,
    #[serde(rename = "HRSTag", alias = "hrs_tag")]
    pub hrs_tag: String,
    #[serde(rename = "Date", alias = "date", with = "timestamp")]
    pub date: NaiveDateTime,
    #[serde(rename = "Location", alias = "location")]
    pub location: String,
    #[serde(rename = "House", alias = "house")]
    pub house: String,
    #[serde(rename = "Source", alias = "source")]
    pub source: Source,
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
}

pub(crate) const OVERVIEW_FIELDS: &[(&str, &str)] = &[
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
];

impl WireFields for DebateOverview {
    const FIELDS: &'static [(&'static str, &'static str)] = OVERVIEW_FIELDS;
}

/// Entry in a debate's navigation tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SectionTreeItem {
    #[serde(rename = "Id", alias = "id", default)]
    pub id: Option<i64>,
    #[serde(rename = "Title", alias = "title", default)]
    pub title: Option<String>,
    #[serde(rename = "ParentId", alias = "parent_id", default)]
    pub parent_id: Option<i64>,
    #[serde(rename = "SortOrder", alias = "sort_order", default)]
    pub sort_order: Option<i64>,
    #[serde(rename = "ExternalId", alias = "external_id", default)]
    pub external_id: Option<String>,
    #[serde(rename = "HRSTag", alias = "hrs_tag", default)]
    pub hrs_tag: Option<String>,
    #[serde(rename = "HansardSection", alias = "hansard_section", default)]
    pub hansard_section: Option<String>,
    #[serde(rename = "Timecode", alias = "timecode", default, with = "timestamp::option")]
    pub timecode: Option<NaiveDateTime>,
}

/// A speech, intervention or procedural line within a debate.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DebateItem {
    #[serde(rename = "ItemType", alias = "item_type", default)]
    pub item_type: Option<String>,
    #[serde(rename = "ItemId", alias = "item_id", default)]
    pub item_id: Option<i64>,
    #[serde(rename = "MemberId", alias = "member_id", default)]
    pub member_id: Option<i64>,
    #[serde(rename = "AttributedTo", alias = "attributed_to", default)]
    pub attributed_to: Option<String>,
    #[serde(rename = "Value", alias = "value", default)]
    pub value: Option<String>,
    #[serde(rename = "OrderInSection", alias = "order_in_section", default)]
    pub order_in_section: Option<i64>,
    #[serde(rename = "Timecode", alias = "timecode", default, with = "timestamp::option")]
    pub timecode: Option<NaiveDateTime>,
    #[serde(rename = "ExternalId", alias = "external_id", default)]
    pub external_id: Option<String>,
    #[serde(rename = "HRSTag", alias = "hrs_tag", default)]
    pub hrs_tag: Option<String>,
    #[serde(rename = "HansardSection", alias = "hansard_section", default)]
    pub hansard_section: Option<String>,
    #[serde(rename = "UIN", alias = "uin", default)]
    pub uin: Option<String>,
    #[serde(rename = "IsReiteration", alias = "is_reiteration", default)]
    pub is_reiteration: Option<bool>,
}

pub(crate) const ITEM_FIELDS: &[(&str, &str)] = &[
    ("item_type", "ItemType"),
    ("item_id", "ItemId"),
    ("member_id", "MemberId"),
    ("attributed_to", "AttributedTo"),
    ("value", "Value"),
    ("order_in_section", "OrderInSection"),
    ("timecode", "Timecode"),
    ("external_id", "ExternalId"),
    ("hrs_tag", "HRSTag"),
    ("hansard_section", "HansardSection"),
    ("uin", "UIN"),
    ("is_reiteration", "IsReiteration"),
];

impl WireFields for DebateItem {
    const FIELDS: &'static [(&'static str, &'static str)] = ITEM_FIELDS;
}

impl DebateItem {
    /// Attributed to a member and carrying non-empty text. Whitespace counts as text.
    pub fn is_attributed_speech(&self) -> bool {
        self.member_id.is_some() && self.value.as_deref().is_some_and(|text| !text.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Debate {
    #[serde(rename = "Overview", alias = "overview", default)]
    pub overview: Option<DebateOverview>,
    #[serde(
        rename = "Navigator",
        alias = "navigator",
        default,
        deserialize_with = "null_as_default"
    )]
    pub navigator: Vec<SectionTreeItem>,
    #[serde(rename = "Items", alias = "items", default, deserialize_with = "null_as_default")]
    pub items: Vec<DebateItem>,
    #[serde(
        rename = "ChildDebates",
        alias = "child_debates",
        default,
        deserialize_with = "null_as_default"
    )]
    pub child_debates: Vec<Debate>,
}

impl Debate {
    /// Number of debate nodes in the tree, including `self`.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.child_debates.iter());
        }
        count
    }
}

unconstrained!(DebateOverview, SectionTreeItem, DebateItem, Debate);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::schema::{normalize, WireOptions};
    use serde_json::json;

    fn overview_json() -> serde_json::Value {
        json!({
            "Id": 42,
            "ExtId": "ABC-123",
            "Title": "Immigration Policy",
            "HRSTag": "hs_8Question",
            "Date": "2024-03-05",
            "Location": "Commons Chamber",
            "House": "Commons",
            "Source": 1,
            "VolumeNo": "None"
        })
    }

    #[test]
    fn test_overview_date_is_widened() {
        let overview: DebateOverview = normalize(overview_json()).unwrap();
        assert_eq!(
            overview.date,
            timestamp::parse_timestamp("2024-03-05T00:00:00").unwrap()
        );
        assert_eq!(overview.volume_no, None);
        assert_eq!(overview.source, Source::RollingHansard);

        let wire = overview.to_wire(WireOptions::QUERY).unwrap();
        assert_eq!(wire["Date"], "2024-03-05T00:00:00");
        assert_eq!(wire["Source"], 1);
        assert!(!wire.contains_key("VolumeNo"));
    }

    #[test]
    fn test_overview_requires_date() {
        let mut raw = overview_json();
        raw.as_object_mut().unwrap().remove("Date");
        let err = normalize::<DebateOverview>(raw).unwrap_err();
        assert_eq!(err, ValidationError::MissingRequiredField("Date".to_string()));
    }

    #[test]
    fn test_unknown_source_is_rejected() {
        let mut raw = overview_json();
        raw["Source"] = json!(9);
        assert!(matches!(
            normalize::<DebateOverview>(raw).unwrap_err(),
            ValidationError::Malformed(_)
        ));
    }

    #[test]
    fn test_item_timecode_accepts_both_shapes() {
        let short: DebateItem = normalize(json!({ "Timecode": "2024-03-05" })).unwrap();
        let long: DebateItem = normalize(json!({ "Timecode": "2024-03-05T00:00:00" })).unwrap();
        assert_eq!(short.timecode, long.timecode);
    }

    #[test]
    fn test_attributed_speech_rule() {
        let speech = DebateItem {
            member_id: Some(7),
            value: Some("I rise to speak.".into()),
            ..Default::default()
        };
        let empty = DebateItem {
            value: Some(String::new()),
            ..speech.clone()
        };
        let whitespace = DebateItem {
            value: Some("   ".into()),
            ..speech.clone()
        };
        let anonymous = DebateItem {
            member_id: None,
            ..speech.clone()
        };

        assert!(speech.is_attributed_speech());
        assert!(!empty.is_attributed_speech());
        assert!(whitespace.is_attributed_speech());
        assert!(!anonymous.is_attributed_speech());
    }

    #[test]
    fn test_nested_tree_decodes() {
        let debate: Debate = normalize(json!({
            "Overview": overview_json(),
            "Navigator": null,
            "Items": [{ "ItemId": 1, "MemberId": 7, "Value": "Hello" }],
            "ChildDebates": [{
                "Overview": null,
                "ChildDebates": [{ "Items": [] }]
            }]
        }))
        .unwrap();

        assert!(debate.navigator.is_empty());
        assert_eq!(debate.items.len(), 1);
        assert_eq!(debate.node_count(), 3);
        assert!(debate.child_debates[0].overview.is_none());
    }
}
