//! Companies registry search records and parameters.
//!
//! The registry already uses snake_case keys, so upstream key and Rust name
//! coincide for every field here.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::timestamp;
use super::{
    check_min, check_range, check_required_text, unconstrained, SearchResult, Validate, WireFields,
};
use crate::error::ValidationError;

fn default_page_size() -> i64 {
    20
}

/// `/search/companies` parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompanySearchParams {
    /// Company name or number.
    pub q: String,
    #[serde(default = "default_page_size")]
    pub items_per_page: i64,
    #[serde(default)]
    pub start_index: i64,
    /// Space-separated restrictions, e.g. `active-companies`.
    #[serde(default)]
    pub restrictions: Option<String>,
}

impl CompanySearchParams {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            items_per_page: default_page_size(),
            start_index: 0,
            restrictions: None,
        }
    }
}

impl Validate for CompanySearchParams {
    fn validate(&self) -> Result<(), ValidationError> {
        check_required_text("q", &self.q)?;
        check_range("items_per_page", self.items_per_page, 1, 100)?;
        check_min("start_index", self.start_index, 0)
    }
}

impl WireFields for CompanySearchParams {
    const FIELDS: &'static [(&'static str, &'static str)] = &[
        ("q", "q"),
        ("items_per_page", "items_per_page"),
        ("start_index", "start_index"),
        ("restrictions", "restrictions"),
    ];
}

/// `/advanced-search/companies` parameters. Every filter is optional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdvancedSearchParams {
    #[serde(default)]
    pub company_name_includes: Option<String>,
    #[serde(default)]
    pub company_name_excludes: Option<String>,
    #[serde(default)]
    pub company_status: Option<Vec<String>>,
    #[serde(default)]
    pub company_subtype: Option<Vec<String>>,
    #[serde(default)]
    pub company_type: Option<Vec<String>>,
    #[serde(default, with = "timestamp::date_option")]
    pub dissolved_from: Option<NaiveDate>,
    #[serde(default, with = "timestamp::date_option")]
    pub dissolved_to: Option<NaiveDate>,
    #[serde(default, with = "timestamp::date_option")]
    pub incorporated_from: Option<NaiveDate>,
    #[serde(default, with = "timestamp::date_option")]
    pub incorporated_to: Option<NaiveDate>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub sic_codes: Option<Vec<String>>,
    #[serde(default = "default_page_size")]
    pub size: i64,
    #[serde(default)]
    pub start_index: i64,
}

impl Default for AdvancedSearchParams {
    fn default() -> Self {
        Self {
            company_name_includes: None,
            company_name_excludes: None,
            company_status: None,
            company_subtype: None,
            company_type: None,
            dissolved_from: None,
            dissolved_to: None,
            incorporated_from: None,
            incorporated_to: None,
            location: None,
            sic_codes: None,
            size: default_page_size(),
            start_index: 0,
        }
    }
}

fn check_date_order(
    field: &'static str,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<(), ValidationError> {
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err(ValidationError::InvalidValue {
                field,
                message: format!("{from} is after {to}"),
            });
        }
    }
    Ok(())
}

impl Validate for AdvancedSearchParams {
    fn validate(&self) -> Result<(), ValidationError> {
        check_range("size", self.size, 1, 5000)?;
        check_min("start_index", self.start_index, 0)?;
        check_date_order("dissolved_from", self.dissolved_from, self.dissolved_to)?;
        check_date_order("incorporated_from", self.incorporated_from, self.incorporated_to)
    }
}

impl WireFields for AdvancedSearchParams {
    const FIELDS: &'static [(&'static str, &'static str)] = &[
        ("company_name_includes", "company_name_includes"),
        ("company_name_excludes", "company_name_excludes"),
        ("company_status", "company_status"),
        ("company_subtype", "company_subtype"),
        ("company_type", "company_type"),
        ("dissolved_from", "dissolved_from"),
        ("dissolved_to", "dissolved_to"),
        ("incorporated_from", "incorporated_from"),
        ("incorporated_to", "incorporated_to"),
        ("location", "location"),
        ("sic_codes", "sic_codes"),
        ("size", "size"),
        ("start_index", "start_index"),
    ];
}

/// `/search/officers` parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OfficerSearchParams {
    pub q: String,
    #[serde(default = "default_page_size")]
    pub items_per_page: i64,
    #[serde(default)]
    pub start_index: i64,
}

impl Validate for OfficerSearchParams {
    fn validate(&self) -> Result<(), ValidationError> {
        check_required_text("q", &self.q)?;
        check_range("items_per_page", self.items_per_page, 1, 100)?;
        check_min("start_index", self.start_index, 0)
    }
}

impl WireFields for OfficerSearchParams {
    const FIELDS: &'static [(&'static str, &'static str)] = &[
        ("q", "q"),
        ("items_per_page", "items_per_page"),
        ("start_index", "start_index"),
    ];
}

/// Postal address. The registered-office variant omits `care_of` and `premises`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Address {
    #[serde(default)]
    pub address_line_1: Option<String>,
    #[serde(default)]
    pub address_line_2: Option<String>,
    #[serde(default)]
    pub care_of: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub po_box: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub premises: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

/// Character offset pairs for highlighting. Passed through unchecked.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchMatches {
    #[serde(default)]
    pub address_snippet: Option<Vec<i64>>,
    #[serde(default)]
    pub snippet: Option<Vec<i64>>,
    #[serde(default)]
    pub title: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResourceLinks {
    #[serde(rename = "self", alias = "self_link", default)]
    pub self_link: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CompanyRecord {
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub address_snippet: Option<String>,
    #[serde(default)]
    pub company_number: Option<String>,
    #[serde(default)]
    pub company_status: Option<String>,
    #[serde(default)]
    pub company_type: Option<String>,
    #[serde(default, with = "timestamp::date_option")]
    pub date_of_cessation: Option<NaiveDate>,
    #[serde(default, with = "timestamp::date_option")]
    pub date_of_creation: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub description_identifier: Option<Vec<Option<String>>>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub links: Option<ResourceLinks>,
    #[serde(default)]
    pub matches: Option<SearchMatches>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AdvancedCompanyRecord {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub company_number: Option<String>,
    #[serde(default)]
    pub company_status: Option<String>,
    #[serde(default)]
    pub company_type: Option<String>,
    #[serde(default, with = "timestamp::date_option")]
    pub date_of_cessation: Option<NaiveDate>,
    #[serde(default, with = "timestamp::date_option")]
    pub date_of_creation: Option<NaiveDate>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub registered_office_address: Option<Address>,
    #[serde(default)]
    pub sic_codes: Option<Vec<String>>,
}

/// `/advanced-search/companies` response. Not paginated like the others.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AdvancedSearchResponse {
    #[serde(default)]
    pub etag: Option<String>,
    #[serde(default)]
    pub hits: Option<i64>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub items: Vec<AdvancedCompanyRecord>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub top_hit: Option<AdvancedCompanyRecord>,
}

/// Partial date of birth (month and year only).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateOfBirth {
    pub month: i64,
    pub year: i64,
}

impl Validate for DateOfBirth {
    fn validate(&self) -> Result<(), ValidationError> {
        check_range("date_of_birth.month", self.month, 1, 12)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OfficerRecord {
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub address_snippet: Option<String>,
    #[serde(default)]
    pub appointment_count: Option<i64>,
    #[serde(default)]
    pub date_of_birth: Option<DateOfBirth>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub description_identifiers: Option<Vec<Option<String>>>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub links: Option<ResourceLinks>,
    #[serde(default)]
    pub matches: Option<SearchMatches>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl Validate for OfficerRecord {
    fn validate(&self) -> Result<(), ValidationError> {
        self.date_of_birth.validate()
    }
}

impl Validate for AdvancedSearchResponse {
    fn validate(&self) -> Result<(), ValidationError> {
        self.items.validate()?;
        self.top_hit.validate()
    }
}

unconstrained!(Address, SearchMatches, ResourceLinks, CompanyRecord, AdvancedCompanyRecord);

pub type CompanySearchResponse = SearchResult<CompanyRecord>;
pub type OfficerSearchResponse = SearchResult<OfficerRecord>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{normalize, to_query, SearchResult};
    use serde_json::json;

    #[test]
    fn test_items_per_page_bounds() {
        assert!(normalize::<CompanySearchParams>(json!({ "q": "Tesla", "items_per_page": 100 })).is_ok());

        let err = normalize::<CompanySearchParams>(json!({ "q": "Tesla", "items_per_page": 101 }))
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::OutOfRange {
                field: "items_per_page",
                value: 101,
                min: 1,
                max: 100
            }
        );

        assert!(normalize::<CompanySearchParams>(json!({ "q": "Tesla", "items_per_page": 0 })).is_err());
    }

    #[test]
    fn test_advanced_size_bounds() {
        assert!(normalize::<AdvancedSearchParams>(json!({ "size": 5000 })).is_ok());
        let err = normalize::<AdvancedSearchParams>(json!({ "size": 5001 })).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { field: "size", .. }));
    }

    #[test]
    fn test_query_is_required() {
        let err = normalize::<CompanySearchParams>(json!({ "items_per_page": 5 })).unwrap_err();
        assert_eq!(err, ValidationError::MissingRequiredField("q".to_string()));

        let err = normalize::<OfficerSearchParams>(json!({ "q": "  " })).unwrap_err();
        assert_eq!(err, ValidationError::MissingRequiredField("q".to_string()));
    }

    #[test]
    fn test_advanced_date_order() {
        let err = normalize::<AdvancedSearchParams>(json!({
            "incorporated_from": "2021-01-01",
            "incorporated_to": "2020-01-01"
        }))
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValue { field: "incorporated_from", .. }));
    }

    #[test]
    fn test_advanced_query_pairs() {
        let params: AdvancedSearchParams = normalize(json!({
            "company_status": ["active", "dissolved"],
            "dissolved_from": "2020-01-01",
            "location": "Wales"
        }))
        .unwrap();

        let pairs = to_query(&params).unwrap();
        assert!(pairs.contains(&("company_status".into(), "active".into())));
        assert!(pairs.contains(&("company_status".into(), "dissolved".into())));
        assert!(pairs.contains(&("dissolved_from".into(), "2020-01-01".into())));
        assert!(pairs.contains(&("size".into(), "20".into())));
        assert!(!pairs.iter().any(|(k, _)| k == "sic_codes"));
    }

    #[test]
    fn test_company_page_decodes() {
        let page: SearchResult<CompanyRecord> = normalize(json!({
            "items": [{
                "title": "TESLA MOTORS LIMITED",
                "company_number": "05899337",
                "company_status": "active",
                "date_of_creation": "2006-08-02",
                "date_of_cessation": "None",
                "links": { "self": "/company/05899337" },
                "matches": { "title": [1, 5] },
                "description_identifier": ["incorporated-on", null]
            }],
            "items_per_page": 20,
            "start_index": 0,
            "total_results": 1
        }))
        .unwrap();

        let company = &page.items[0];
        assert_eq!(company.date_of_cessation, None);
        assert_eq!(company.matches.as_ref().unwrap().title, Some(vec![1, 5]));
        assert_eq!(
            company.links.as_ref().unwrap().self_link.as_deref(),
            Some("/company/05899337")
        );
    }

    #[test]
    fn test_officer_birth_month_checked() {
        let err = normalize::<SearchResult<OfficerRecord>>(json!({
            "items": [{ "title": "SMITH, John", "date_of_birth": { "month": 13, "year": 1970 } }],
            "items_per_page": 20,
            "start_index": 0,
            "total_results": 1
        }))
        .unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { field: "date_of_birth.month", .. }));
    }
}
