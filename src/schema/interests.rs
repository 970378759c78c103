//! Register of Interests API records and parameters.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::timestamp;
use super::{check_min, check_range, unconstrained, Link, SearchResult, Validate, WireFields};
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegisterType {
    Commons,
    Lords,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterestsSortOrder {
    PublishingDateDescending,
    CategoryAscending,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FieldTypeInfo {
    #[serde(rename = "currencyCode", alias = "currency_code", default)]
    pub currency_code: Option<String>,
}

/// Typed field of an interest.
///
/// `values` holds rows of nested fields (e.g. one row per payment in a
/// multi-row financial disclosure), nesting without bound.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InterestField {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", alias = "field_type", default)]
    pub field_type: Option<String>,
    #[serde(rename = "typeInfo", alias = "type_info", default)]
    pub type_info: Option<FieldTypeInfo>,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub values: Option<Vec<Vec<InterestField>>>,
}

impl InterestField {
    /// Number of fields in this subtree, including `self`.
    pub fn count_nested(&self) -> usize {
        1 + self
            .values
            .iter()
            .flatten()
            .flatten()
            .map(InterestField::count_nested)
            .sum::<usize>()
    }
}

/// Member summary as embedded in an interest.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InterestMember {
    pub id: i64,
    #[serde(rename = "nameListAs", alias = "name_list_as", default)]
    pub name_list_as: Option<String>,
    #[serde(rename = "nameDisplayAs", alias = "name_display_as", default)]
    pub name_display_as: Option<String>,
    #[serde(rename = "nameFullTitle", alias = "name_full_title", default)]
    pub name_full_title: Option<String>,
    #[serde(rename = "nameAddressAs", alias = "name_address_as", default)]
    pub name_address_as: Option<String>,
    #[serde(default)]
    pub house: Option<String>,
    #[serde(rename = "memberFrom", alias = "member_from", default)]
    pub member_from: Option<String>,
    #[serde(default)]
    pub party: Option<String>,
    #[serde(default)]
    pub links: Option<Vec<Link>>,
}

/// Category an interest can be registered under.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PublishedCategory {
    pub id: i64,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "parentCategoryIds", alias = "parent_category_ids", default)]
    pub parent_category_ids: Option<Vec<i64>>,
    #[serde(rename = "registerType", alias = "register_type", default)]
    pub register_type: Option<RegisterType>,
    #[serde(default)]
    pub links: Option<Vec<Link>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PublishedRegister {
    pub id: i64,
    #[serde(rename = "publishedDate", alias = "published_date", default)]
    pub published_date: Option<String>,
    #[serde(rename = "type", alias = "register_type", default)]
    pub register_type: Option<RegisterType>,
    #[serde(default)]
    pub links: Option<Vec<Link>>,
}

/// Published version of an interest. Child interests nest without bound.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PublishedInterest {
    pub id: i64,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(rename = "parentInterestId", alias = "parent_interest_id", default)]
    pub parent_interest_id: Option<i64>,
    #[serde(
        rename = "registrationDate",
        alias = "registration_date",
        default,
        with = "timestamp::date_option"
    )]
    pub registration_date: Option<NaiveDate>,
    #[serde(
        rename = "publishedDate",
        alias = "published_date",
        default,
        with = "timestamp::date_option"
    )]
    pub published_date: Option<NaiveDate>,
    #[serde(
        rename = "updatedDates",
        alias = "updated_dates",
        default,
        with = "timestamp::date_list_option"
    )]
    pub updated_dates: Option<Vec<NaiveDate>>,
    #[serde(default)]
    pub member: Option<InterestMember>,
    #[serde(default)]
    pub category: Option<PublishedCategory>,
    #[serde(rename = "register", alias = "published_register", default)]
    pub published_register: Option<PublishedRegister>,
    #[serde(default)]
    pub fields: Option<Vec<InterestField>>,
    #[serde(rename = "childInterests", alias = "child_interests", default)]
    pub child_interests: Option<Vec<PublishedInterest>>,
    #[serde(default)]
    pub links: Option<Vec<Link>>,
    #[serde(default)]
    pub rectified: bool,
    #[serde(rename = "rectifiedDetails", alias = "rectified_details", default)]
    pub rectified_details: Option<String>,
}

impl PublishedInterest {
    /// Depth-first walk over this interest and all of its descendants.
    pub fn descendants(&self) -> Vec<&PublishedInterest> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(interest) = stack.pop() {
            out.push(interest);
            if let Some(children) = &interest.child_interests {
                stack.extend(children.iter().rev());
            }
        }
        out
    }
}

unconstrained!(
    FieldTypeInfo,
    InterestField,
    InterestMember,
    PublishedCategory,
    PublishedRegister,
    PublishedInterest,
);

pub type InterestSearchResult = SearchResult<PublishedInterest>;
pub type CategorySearchResult = SearchResult<PublishedCategory>;

fn default_take() -> i64 {
    20
}

fn default_true() -> bool {
    true
}

/// Skip/take paging accepted by every interests endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PagingParams {
    #[serde(rename = "Skip", alias = "skip", default)]
    pub skip: i64,
    #[serde(rename = "Take", alias = "take", default = "default_take")]
    pub take: i64,
}

impl Default for PagingParams {
    fn default() -> Self {
        Self {
            skip: 0,
            take: default_take(),
        }
    }
}

impl Validate for PagingParams {
    fn validate(&self) -> Result<(), ValidationError> {
        check_min("skip", self.skip, 0)?;
        check_range("take", self.take, 1, 20)
    }
}

impl WireFields for PagingParams {
    const FIELDS: &'static [(&'static str, &'static str)] = &[("skip", "Skip"), ("take", "Take")];
}

/// `/Interests` parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InterestsParams {
    #[serde(rename = "Skip", alias = "skip", default)]
    pub skip: i64,
    #[serde(rename = "Take", alias = "take", default = "default_take")]
    pub take: i64,
    #[serde(rename = "MemberId", alias = "member_id", default)]
    pub member_id: Option<i64>,
    #[serde(rename = "CategoryId", alias = "category_id", default)]
    pub category_id: Option<i64>,
    #[serde(
        rename = "PublishedFrom",
        alias = "published_from",
        default,
        with = "timestamp::date_option"
    )]
    pub published_from: Option<NaiveDate>,
    #[serde(
        rename = "PublishedTo",
        alias = "published_to",
        default,
        with = "timestamp::date_option"
    )]
    pub published_to: Option<NaiveDate>,
    #[serde(rename = "SortOrder", alias = "sort_order", default)]
    pub sort_order: Option<InterestsSortOrder>,
    #[serde(
        rename = "ExpandChildInterests",
        alias = "expand_child_interests",
        default = "default_true"
    )]
    pub expand_child_interests: bool,
}

impl Default for InterestsParams {
    fn default() -> Self {
        Self {
            skip: 0,
            take: default_take(),
            member_id: None,
            category_id: None,
            published_from: None,
            published_to: None,
            sort_order: None,
            expand_child_interests: true,
        }
    }
}

impl Validate for InterestsParams {
    fn validate(&self) -> Result<(), ValidationError> {
        check_min("skip", self.skip, 0)?;
        check_range("take", self.take, 1, 20)?;
        if let (Some(from), Some(to)) = (self.published_from, self.published_to) {
            if from > to {
                return Err(ValidationError::InvalidValue {
                    field: "PublishedFrom",
                    message: format!("{from} is after {to}"),
                });
            }
        }
        Ok(())
    }
}

impl WireFields for InterestsParams {
    const FIELDS: &'static [(&'static str, &'static str)] = &[
        ("skip", "Skip"),
        ("take", "Take"),
        ("member_id", "MemberId"),
        ("category_id", "CategoryId"),
        ("published_from", "PublishedFrom"),
        ("published_to", "PublishedTo"),
        ("sort_order", "SortOrder"),
        ("expand_child_interests", "ExpandChildInterests"),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{normalize, to_query};
    use serde_json::json;

    #[test]
    fn test_interests_defaults_on_the_wire() {
        let params: InterestsParams = normalize(json!({})).unwrap();
        let pairs = to_query(&params).unwrap();

        assert!(pairs.contains(&("Skip".into(), "0".into())));
        assert!(pairs.contains(&("Take".into(), "20".into())));
        assert!(pairs.contains(&("ExpandChildInterests".into(), "true".into())));
        assert_eq!(pairs.len(), 3);
    }

    #[test]
    fn test_take_capped_at_twenty() {
        let err = normalize::<InterestsParams>(json!({ "take": 21 })).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { field: "take", max: 20, .. }));
        assert!(normalize::<PagingParams>(json!({ "Take": 0 })).is_err());
    }

    #[test]
    fn test_sort_order_enum() {
        let params: InterestsParams =
            normalize(json!({ "SortOrder": "CategoryAscending", "MemberId": 172 })).unwrap();
        let pairs = to_query(&params).unwrap();
        assert!(pairs.contains(&("SortOrder".into(), "CategoryAscending".into())));
        assert!(pairs.contains(&("MemberId".into(), "172".into())));

        assert!(normalize::<InterestsParams>(json!({ "SortOrder": "INVALID" })).is_err());
    }

    #[test]
    fn test_category_requires_id() {
        let err = normalize::<PublishedCategory>(json!({ "name": "Gifts" })).unwrap_err();
        assert_eq!(err, ValidationError::MissingRequiredField("id".to_string()));

        let err = normalize::<PublishedCategory>(json!({ "id": "None", "name": "Gifts" })).unwrap_err();
        assert!(matches!(err, ValidationError::Malformed(_) | ValidationError::MissingRequiredField(_)));
    }

    #[test]
    fn test_interest_tree_with_nested_fields() {
        let page: InterestSearchResult = normalize(json!({
            "skip": 0,
            "take": 20,
            "totalResults": 1,
            "items": [{
                "id": 1,
                "summary": "Payments from Example plc",
                "registrationDate": "2024-05-01",
                "publishedDate": "2024-05-08T00:00:00",
                "updatedDates": ["2024-06-01"],
                "category": { "id": 3, "name": "Employment and earnings", "registerType": "Commons" },
                "register": { "id": 9, "publishedDate": "2024-05-08", "type": "Commons" },
                "fields": [{
                    "name": "Payments",
                    "type": "Table",
                    "values": [[
                        { "name": "Amount", "type": "Decimal", "typeInfo": { "currencyCode": "GBP" }, "value": 1200.5 },
                        { "name": "Hours", "type": "Table", "values": [[{ "name": "Note", "value": "None" }]] }
                    ]]
                }],
                "childInterests": [{
                    "id": 2,
                    "parentInterestId": 1,
                    "childInterests": [{ "id": 3, "parentInterestId": 2 }]
                }],
                "rectified": false
            }]
        }))
        .unwrap();

        let interest = &page.items[0];
        let ids: Vec<i64> = interest.descendants().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let fields = interest.fields.as_ref().unwrap();
        assert_eq!(fields[0].count_nested(), 4);
        let nested = &fields[0].values.as_ref().unwrap()[0][1].values.as_ref().unwrap()[0][0];
        assert_eq!(nested.value, None);
        assert_eq!(
            interest.published_register.as_ref().unwrap().register_type,
            Some(RegisterType::Commons)
        );
    }
}
