//! Paginated envelope shared by every search endpoint.

use serde::{Deserialize, Serialize};

use super::{check_min, null_as_default, unconstrained, Validate};
use crate::error::ValidationError;

fn default_take() -> i64 {
    20
}

/// HATEOAS link attached to parliamentary resources.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Link {
    #[serde(default)]
    pub rel: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
}

unconstrained!(Link);

/// Paginated search result over any record type.
///
/// The three upstream paging dialects (`skip`/`take`, `start_index`/
/// `items_per_page`, `totalResults`/`total_results`) all decode into the same
/// fields; output always uses `skip`, `take` and `totalResults`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct SearchResult<T> {
    #[serde(default = "Vec::new", deserialize_with = "null_as_default")]
    pub items: Vec<T>,

    #[serde(rename = "totalResults", alias = "total_results", default)]
    pub total_results: i64,

    #[serde(alias = "start_index", alias = "startIndex", default)]
    pub skip: i64,

    #[serde(alias = "items_per_page", alias = "itemsPerPage", default = "default_take")]
    pub take: i64,

    #[serde(default)]
    pub links: Option<Vec<Link>>,

    #[serde(rename = "resultContext", alias = "result_context", default)]
    pub result_context: Option<String>,

    #[serde(rename = "resultType", alias = "result_type", default)]
    pub result_type: Option<String>,

    #[serde(default)]
    pub etag: Option<String>,

    #[serde(default)]
    pub kind: Option<String>,
}

impl<T> SearchResult<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Validate> Validate for SearchResult<T> {
    fn validate(&self) -> Result<(), ValidationError> {
        check_min("skip", self.skip, 0)?;
        if self.take > 0 && self.items.len() as i64 > self.take {
            return Err(ValidationError::InvalidValue {
                field: "items",
                message: format!(
                    "page holds {} items but take is {}",
                    self.items.len(),
                    self.take
                ),
            });
        }
        self.items.validate()
    }
}

/// Members API wrapper around every resource it returns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item<T> {
    #[serde(default = "Option::default")]
    pub value: Option<T>,
    #[serde(default)]
    pub links: Option<Vec<Link>>,
}

impl<T: Validate> Validate for Item<T> {
    fn validate(&self) -> Result<(), ValidationError> {
        self.value.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::normalize;
    use serde_json::json;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Row {
        id: i64,
    }

    unconstrained!(Row);

    #[test]
    fn test_companies_dialect() {
        let page: SearchResult<Row> = normalize(json!({
            "items": [{ "id": 1 }],
            "items_per_page": 20,
            "start_index": 0,
            "total_results": 1,
            "kind": "search#companies"
        }))
        .unwrap();

        assert_eq!(page.len(), 1);
        assert_eq!(page.total_results, 1);
        assert_eq!(page.take, 20);

        let out = serde_json::to_value(&page).unwrap();
        assert_eq!(out["totalResults"], 1);
        assert_eq!(out["skip"], 0);
    }

    #[test]
    fn test_members_dialect_with_null_items() {
        let page: SearchResult<Item<Row>> = normalize(json!({
            "items": null,
            "totalResults": 0,
            "skip": 0,
            "take": 5,
            "resultContext": "None"
        }))
        .unwrap();

        assert!(page.is_empty());
        assert_eq!(page.take, 5);
        assert_eq!(page.result_context, None);
    }

    #[test]
    fn test_more_items_than_take_is_rejected() {
        let err = normalize::<SearchResult<Row>>(json!({
            "items": [{ "id": 1 }, { "id": 2 }],
            "skip": 0,
            "take": 1
        }))
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValue { field: "items", .. }));
    }

    #[test]
    fn test_negative_skip_is_rejected() {
        let err = normalize::<SearchResult<Row>>(json!({ "skip": -1 })).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { field: "skip", .. }));
    }
}
