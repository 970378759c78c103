//! Property tests for sentinel scrubbing and paging bounds.

use govdata::schema::companies::{AdvancedSearchParams, CompanySearchParams, OfficerSearchParams};
use govdata::schema::interests::{CategorySearchResult, InterestsParams, PagingParams};
use govdata::schema::members::{
    LordsInterestsRegisterParams, MemberSearchParams, MembershipStatus, Party,
};
use govdata::schema::{normalize, scrub_none_sentinels};
use govdata::ValidationError;
use proptest::prelude::*;
use serde_json::{json, Value};

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        Just(json!("None")),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-zA-Z ]{0,8}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Object holding `base`, with every key in `keys` whose mask bit is set
/// replaced by the sentinel.
fn with_sentinels(base: Value, keys: &[&str], mask: u32) -> Value {
    let mut raw = base;
    if let Value::Object(map) = &mut raw {
        for (i, key) in keys.iter().enumerate() {
            if mask & (1 << i) != 0 {
                map.insert(key.to_string(), json!("None"));
            }
        }
    }
    raw
}

fn contains_sentinel(value: &Value) -> bool {
    match value {
        Value::String(s) => s == "None",
        Value::Array(items) => items.iter().any(contains_sentinel),
        Value::Object(map) => map.values().any(contains_sentinel),
        _ => false,
    }
}

proptest! {
    #[test]
    fn scrub_removes_every_sentinel(mut value in arb_json()) {
        scrub_none_sentinels(&mut value);
        prop_assert!(!contains_sentinel(&value));
    }

    #[test]
    fn scrub_is_idempotent(mut value in arb_json()) {
        scrub_none_sentinels(&mut value);
        let once = value.clone();
        scrub_none_sentinels(&mut value);
        prop_assert_eq!(once, value);
    }

    #[test]
    fn items_per_page_bounds(n in -50i64..200) {
        let result = normalize::<CompanySearchParams>(json!({ "q": "Tesla", "items_per_page": n }));
        prop_assert_eq!(result.is_ok(), (1..=100).contains(&n));
    }

    #[test]
    fn advanced_size_bounds(n in -10i64..6000) {
        let result = normalize::<AdvancedSearchParams>(json!({ "size": n }));
        prop_assert_eq!(result.is_ok(), (1..=5000).contains(&n));
    }

    #[test]
    fn interests_take_bounds(n in -5i64..40) {
        let result = normalize::<InterestsParams>(json!({ "Take": n }));
        prop_assert_eq!(result.is_ok(), (1..=20).contains(&n));
    }

    #[test]
    fn optional_params_accept_sentinel(field in prop::sample::select(vec![
        "MemberId", "CategoryId", "PublishedFrom", "PublishedTo", "SortOrder",
    ])) {
        let mut raw = serde_json::Map::new();
        raw.insert(field.to_string(), json!("None"));
        prop_assert!(normalize::<InterestsParams>(Value::Object(raw)).is_ok());
    }

    #[test]
    fn sentinel_on_defaulted_company_fields(mask in 0u32..4) {
        let keys = ["items_per_page", "start_index"];
        let params: CompanySearchParams =
            normalize(with_sentinels(json!({ "q": "Tesla" }), &keys, mask)).unwrap();
        prop_assert_eq!(params.items_per_page, 20);
        prop_assert_eq!(params.start_index, 0);

        let params: OfficerSearchParams =
            normalize(with_sentinels(json!({ "q": "Musk" }), &keys, mask)).unwrap();
        prop_assert_eq!(params.items_per_page, 20);
        prop_assert_eq!(params.start_index, 0);

        let params: AdvancedSearchParams =
            normalize(with_sentinels(json!({}), &["size", "start_index"], mask)).unwrap();
        prop_assert_eq!(params.size, 20);
        prop_assert_eq!(params.start_index, 0);
    }

    #[test]
    fn sentinel_on_defaulted_parliament_fields(mask in 0u32..8) {
        let params: InterestsParams = normalize(with_sentinels(
            json!({}),
            &["Skip", "Take", "ExpandChildInterests"],
            mask,
        ))
        .unwrap();
        prop_assert_eq!(params.skip, 0);
        prop_assert_eq!(params.take, 20);
        prop_assert!(params.expand_child_interests);

        let params: PagingParams =
            normalize(with_sentinels(json!({}), &["Skip", "Take"], mask)).unwrap();
        prop_assert_eq!((params.skip, params.take), (0, 20));

        let params: MemberSearchParams =
            normalize(with_sentinels(json!({ "Name": "Smith" }), &["Skip", "Take"], mask)).unwrap();
        prop_assert_eq!((params.skip, params.take), (0, 20));

        let params: LordsInterestsRegisterParams = normalize(with_sentinels(
            json!({ "searchTerm": "May" }),
            &["includeDeleted", "page"],
            mask,
        ))
        .unwrap();
        prop_assert!(!params.include_deleted);
    }

    #[test]
    fn sentinel_on_record_flags(mask in 0u32..8) {
        let party: Party = normalize(with_sentinels(
            json!({ "id": 4, "name": "Labour" }),
            &["isLordsMainParty", "isLordsSpiritualParty", "isIndependentParty"],
            mask,
        ))
        .unwrap();
        prop_assert!(!party.is_independent_party);

        let status: MembershipStatus = normalize(with_sentinels(
            json!({ "statusDescription": "Current Member" }),
            &["statusIsActive", "statusId", "statusNotes"],
            mask,
        ))
        .unwrap();
        prop_assert_eq!(status.status_id, 0);
    }

    #[test]
    fn sentinel_on_envelope_counters(mask in 0u32..8) {
        let page: CategorySearchResult = normalize(with_sentinels(
            json!({ "items": [{ "id": 1, "name": "Gifts" }] }),
            &["totalResults", "skip", "take"],
            mask,
        ))
        .unwrap();
        prop_assert_eq!(page.items.len(), 1);
        prop_assert_eq!(page.skip, 0);
        prop_assert_eq!(page.take, 20);
    }
}

#[test]
fn sentinel_on_required_field_reports_missing_field() {
    assert_eq!(
        normalize::<CompanySearchParams>(json!({ "q": "None" })).unwrap_err(),
        ValidationError::MissingRequiredField("q".to_string())
    );
    assert_eq!(
        normalize::<govdata::schema::interests::PublishedCategory>(json!({ "id": "None" }))
            .unwrap_err(),
        ValidationError::MissingRequiredField("id".to_string())
    );
}
