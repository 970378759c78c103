//! Members API records and parameters.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::timestamp;
use super::{check_min, check_range, unconstrained, Item, SearchResult, Validate, WireFields};
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum House {
    Commons,
    Lords,
}

impl TryFrom<i64> for House {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(House::Commons),
            2 => Ok(House::Lords),
            other => Err(format!("unknown house {other}, expected 1 (Commons) or 2 (Lords)")),
        }
    }
}

impl From<House> for i64 {
    fn from(house: House) -> Self {
        match house {
            House::Commons => 1,
            House::Lords => 2,
        }
    }
}

fn default_take() -> i64 {
    20
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Party {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub abbreviation: Option<String>,
    #[serde(rename = "backgroundColour", alias = "background_colour", default)]
    pub background_colour: Option<String>,
    #[serde(rename = "foregroundColour", alias = "foreground_colour", default)]
    pub foreground_colour: Option<String>,
    #[serde(rename = "isLordsMainParty", alias = "is_lords_main_party", default)]
    pub is_lords_main_party: bool,
    #[serde(rename = "isLordsSpiritualParty", alias = "is_lords_spiritual_party", default)]
    pub is_lords_spiritual_party: bool,
    #[serde(rename = "governmentType", alias = "government_type", default)]
    pub government_type: Option<i64>,
    #[serde(rename = "isIndependentParty", alias = "is_independent_party", default)]
    pub is_independent_party: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MembershipStatus {
    #[serde(rename = "statusIsActive", alias = "status_is_active", default)]
    pub status_is_active: bool,
    #[serde(rename = "statusDescription", alias = "status_description", default)]
    pub status_description: Option<String>,
    #[serde(rename = "statusNotes", alias = "status_notes", default)]
    pub status_notes: Option<String>,
    #[serde(rename = "statusId", alias = "status_id", default)]
    pub status_id: i64,
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(
        rename = "statusStartDate",
        alias = "status_start_date",
        default,
        with = "timestamp::option"
    )]
    pub status_start_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HouseMembership {
    #[serde(rename = "membershipFrom", alias = "membership_from", default)]
    pub membership_from: Option<String>,
    #[serde(rename = "membershipFromId", alias = "membership_from_id", default)]
    pub membership_from_id: Option<i64>,
    #[serde(default)]
    pub house: Option<House>,
    #[serde(
        rename = "membershipStartDate",
        alias = "membership_start_date",
        default,
        with = "timestamp::option"
    )]
    pub membership_start_date: Option<NaiveDateTime>,
    #[serde(
        rename = "membershipEndDate",
        alias = "membership_end_date",
        default,
        with = "timestamp::option"
    )]
    pub membership_end_date: Option<NaiveDateTime>,
    #[serde(rename = "membershipEndReason", alias = "membership_end_reason", default)]
    pub membership_end_reason: Option<String>,
    #[serde(rename = "membershipEndReasonId", alias = "membership_end_reason_id", default)]
    pub membership_end_reason_id: Option<i64>,
    #[serde(
        rename = "membershipEndReasonNotes",
        alias = "membership_end_reason_notes",
        default
    )]
    pub membership_end_reason_notes: Option<String>,
    #[serde(rename = "membershipStatus", alias = "membership_status", default)]
    pub membership_status: Option<MembershipStatus>,
}

/// A Member of either House with their latest party and house membership.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Member {
    pub id: i64,
    #[serde(rename = "nameListAs", alias = "name_list_as", default)]
    pub name_list_as: Option<String>,
    #[serde(rename = "nameDisplayAs", alias = "name_display_as", default)]
    pub name_display_as: Option<String>,
    #[serde(rename = "nameFullTitle", alias = "name_full_title", default)]
    pub name_full_title: Option<String>,
    #[serde(rename = "nameAddressAs", alias = "name_address_as", default)]
    pub name_address_as: Option<String>,
    #[serde(rename = "latestParty", alias = "latest_party", default)]
    pub latest_party: Option<Party>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(rename = "latestHouseMembership", alias = "latest_house_membership", default)]
    pub latest_house_membership: Option<HouseMembership>,
    #[serde(rename = "thumbnailUrl", alias = "thumbnail_url", default)]
    pub thumbnail_url: Option<String>,
}

/// Per-debate contribution counters for one member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DebateContribution {
    #[serde(rename = "totalContributions", alias = "total_contributions", default)]
    pub total_contributions: i64,
    #[serde(rename = "debateTitle", alias = "debate_title", default)]
    pub debate_title: Option<String>,
    #[serde(rename = "debateId", alias = "debate_id", default)]
    pub debate_id: i64,
    #[serde(rename = "debateWebsiteId", alias = "debate_website_id", default)]
    pub debate_website_id: Option<String>,
    #[serde(rename = "sittingDate", alias = "sitting_date", with = "timestamp")]
    pub sitting_date: NaiveDateTime,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub house: Option<String>,
    #[serde(
        rename = "firstTimecode",
        alias = "first_timecode",
        default,
        with = "timestamp::option"
    )]
    pub first_timecode: Option<NaiveDateTime>,
    #[serde(rename = "speechCount", alias = "speech_count", default)]
    pub speech_count: i64,
    #[serde(rename = "questionCount", alias = "question_count", default)]
    pub question_count: i64,
    #[serde(
        rename = "supplementaryQuestionCount",
        alias = "supplementary_question_count",
        default
    )]
    pub supplementary_question_count: i64,
    #[serde(rename = "interventionCount", alias = "intervention_count", default)]
    pub intervention_count: i64,
    #[serde(rename = "answerCount", alias = "answer_count", default)]
    pub answer_count: i64,
    #[serde(rename = "pointsOfOrderCount", alias = "points_of_order_count", default)]
    pub points_of_order_count: i64,
    #[serde(rename = "statementsCount", alias = "statements_count", default)]
    pub statements_count: i64,
}

/// Registered interest from the Lords register. Children nest without bound.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RegisteredInterest {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub interest: Option<String>,
    #[serde(rename = "sortOrder", alias = "sort_order", default)]
    pub sort_order: Option<i64>,
    #[serde(rename = "createdWhen", alias = "created_when", default, with = "timestamp::option")]
    pub created_when: Option<NaiveDateTime>,
    #[serde(
        rename = "lastAmendedWhen",
        alias = "last_amended_when",
        default,
        with = "timestamp::option"
    )]
    pub last_amended_when: Option<NaiveDateTime>,
    #[serde(rename = "deletedWhen", alias = "deleted_when", default, with = "timestamp::option")]
    pub deleted_when: Option<NaiveDateTime>,
    #[serde(rename = "isCorrection", alias = "is_correction", default)]
    pub is_correction: bool,
    #[serde(rename = "childInterests", alias = "child_interests", default)]
    pub child_interests: Option<Vec<RegisteredInterest>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RegisteredInterestCategory {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "sortOrder", alias = "sort_order", default)]
    pub sort_order: Option<i64>,
    #[serde(default)]
    pub interests: Option<Vec<RegisteredInterest>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MembersInterests {
    #[serde(default)]
    pub member: Option<Member>,
    #[serde(rename = "interestCategories", alias = "interest_categories", default)]
    pub interest_categories: Option<Vec<RegisteredInterestCategory>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Staff {
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub forename: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MembersStaff {
    #[serde(default)]
    pub member: Option<Member>,
    #[serde(default)]
    pub staff: Option<Vec<Staff>>,
}

unconstrained!(
    Party,
    MembershipStatus,
    HouseMembership,
    Member,
    DebateContribution,
    RegisteredInterest,
    RegisteredInterestCategory,
    MembersInterests,
    Staff,
    MembersStaff,
);

pub type MemberSearchResult = SearchResult<Item<Member>>;
pub type ContributionSearchResult = SearchResult<Item<DebateContribution>>;
pub type LordsInterestsSearchResult = SearchResult<Item<MembersInterests>>;
pub type LordsStaffSearchResult = SearchResult<Item<MembersStaff>>;

/// `/Members/Search` parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemberSearchParams {
    #[serde(rename = "Skip", alias = "skip", default)]
    pub skip: i64,
    #[serde(rename = "Take", alias = "take", default = "default_take")]
    pub take: i64,
    #[serde(rename = "Name", alias = "name", default)]
    pub name: Option<String>,
    #[serde(rename = "Location", alias = "location", default)]
    pub location: Option<String>,
    #[serde(rename = "PostTitle", alias = "post_title", default)]
    pub post_title: Option<String>,
    #[serde(rename = "PartyId", alias = "party_id", default)]
    pub party_id: Option<i64>,
    #[serde(rename = "House", alias = "house", default)]
    pub house: Option<House>,
    #[serde(rename = "ConstituencyId", alias = "constituency_id", default)]
    pub constituency_id: Option<i64>,
    #[serde(rename = "NameStartsWith", alias = "name_starts_with", default)]
    pub name_starts_with: Option<String>,
    #[serde(rename = "Gender", alias = "gender", default)]
    pub gender: Option<String>,
    #[serde(
        rename = "MembershipStartedSince",
        alias = "membership_started_since",
        default,
        with = "timestamp::option"
    )]
    pub membership_started_since: Option<NaiveDateTime>,
    #[serde(
        rename = "MembershipEnded.MembershipEndedSince",
        alias = "membership_ended_since",
        default,
        with = "timestamp::option"
    )]
    pub membership_ended_since: Option<NaiveDateTime>,
    #[serde(
        rename = "MembershipEnded.MembershipEndReasonIds",
        alias = "membership_end_reason_ids",
        default
    )]
    pub membership_end_reason_ids: Option<Vec<i64>>,
    #[serde(
        rename = "MembershipInDateRange.WasMemberOnOrAfter",
        alias = "was_member_on_or_after",
        default,
        with = "timestamp::option"
    )]
    pub was_member_on_or_after: Option<NaiveDateTime>,
    #[serde(
        rename = "MembershipInDateRange.WasMemberOnOrBefore",
        alias = "was_member_on_or_before",
        default,
        with = "timestamp::option"
    )]
    pub was_member_on_or_before: Option<NaiveDateTime>,
    #[serde(
        rename = "MembershipInDateRange.WasMemberOfHouse",
        alias = "was_member_of_house",
        default
    )]
    pub was_member_of_house: Option<House>,
    #[serde(rename = "IsEligible", alias = "is_eligible", default)]
    pub is_eligible: Option<bool>,
    #[serde(rename = "IsCurrentMember", alias = "is_current_member", default)]
    pub is_current_member: Option<bool>,
    #[serde(rename = "PolicyInterestId", alias = "policy_interest_id", default)]
    pub policy_interest_id: Option<i64>,
    #[serde(rename = "Experience", alias = "experience", default)]
    pub experience: Option<String>,
}

impl Default for MemberSearchParams {
    fn default() -> Self {
        Self {
            skip: 0,
            take: default_take(),
            name: None,
            location: None,
            post_title: None,
            party_id: None,
            house: None,
            constituency_id: None,
            name_starts_with: None,
            gender: None,
            membership_started_since: None,
            membership_ended_since: None,
            membership_end_reason_ids: None,
            was_member_on_or_after: None,
            was_member_on_or_before: None,
            was_member_of_house: None,
            is_eligible: None,
            is_current_member: None,
            policy_interest_id: None,
            experience: None,
        }
    }
}

impl Validate for MemberSearchParams {
    fn validate(&self) -> Result<(), ValidationError> {
        check_min("skip", self.skip, 0)?;
        check_range("take", self.take, 1, 20)
    }
}

impl WireFields for MemberSearchParams {
    const FIELDS: &'static [(&'static str, &'static str)] = &[
        ("skip", "Skip"),
        ("take", "Take"),
        ("name", "Name"),
        ("location", "Location"),
        ("post_title", "PostTitle"),
        ("party_id", "PartyId"),
        ("house", "House"),
        ("constituency_id", "ConstituencyId"),
        ("name_starts_with", "NameStartsWith"),
        ("gender", "Gender"),
        ("membership_started_since", "MembershipStartedSince"),
        ("membership_ended_since", "MembershipEnded.MembershipEndedSince"),
        ("membership_end_reason_ids", "MembershipEnded.MembershipEndReasonIds"),
        ("was_member_on_or_after", "MembershipInDateRange.WasMemberOnOrAfter"),
        ("was_member_on_or_before", "MembershipInDateRange.WasMemberOnOrBefore"),
        ("was_member_of_house", "MembershipInDateRange.WasMemberOfHouse"),
        ("is_eligible", "IsEligible"),
        ("is_current_member", "IsCurrentMember"),
        ("policy_interest_id", "PolicyInterestId"),
        ("experience", "Experience"),
    ];
}

/// `/LordsInterests/Register` parameters. Pages hold 20 results.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LordsInterestsRegisterParams {
    #[serde(rename = "searchTerm", alias = "search_term", default)]
    pub search_term: Option<String>,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(rename = "includeDeleted", alias = "include_deleted", default)]
    pub include_deleted: bool,
}

impl Validate for LordsInterestsRegisterParams {
    fn validate(&self) -> Result<(), ValidationError> {
        match self.page {
            Some(page) => check_min("page", page, 0),
            None => Ok(()),
        }
    }
}

impl WireFields for LordsInterestsRegisterParams {
    const FIELDS: &'static [(&'static str, &'static str)] = &[
        ("search_term", "searchTerm"),
        ("page", "page"),
        ("include_deleted", "includeDeleted"),
    ];
}

/// `/LordsInterests/Staff` parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LordsInterestsStaffParams {
    #[serde(rename = "searchTerm", alias = "search_term", default)]
    pub search_term: Option<String>,
    #[serde(default)]
    pub page: Option<i64>,
}

impl Validate for LordsInterestsStaffParams {
    fn validate(&self) -> Result<(), ValidationError> {
        match self.page {
            Some(page) => check_min("page", page, 0),
            None => Ok(()),
        }
    }
}

impl WireFields for LordsInterestsStaffParams {
    const FIELDS: &'static [(&'static str, &'static str)] =
        &[("search_term", "searchTerm"), ("page", "page")];
}

/// Input of the contribution-summary tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContributionSummaryParams {
    #[serde(rename = "memberId", alias = "member_id")]
    pub member_id: i64,
    #[serde(default)]
    pub page: Option<i64>,
}

impl Validate for ContributionSummaryParams {
    fn validate(&self) -> Result<(), ValidationError> {
        check_min("memberId", self.member_id, 1)?;
        match self.page {
            Some(page) => check_min("page", page, 0),
            None => Ok(()),
        }
    }
}

impl WireFields for ContributionSummaryParams {
    const FIELDS: &'static [(&'static str, &'static str)] =
        &[("member_id", "memberId"), ("page", "page")];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{normalize, to_query, WireOptions};
    use serde_json::json;

    #[test]
    fn test_member_page_decodes() {
        let page: MemberSearchResult = normalize(json!({
            "items": [{
                "value": {
                    "id": 172,
                    "nameDisplayAs": "Ms Diane Abbott",
                    "latestParty": { "id": 8, "name": "Independent", "isIndependentParty": true },
                    "gender": "F",
                    "latestHouseMembership": {
                        "membershipFrom": "Hackney North and Stoke Newington",
                        "house": 1,
                        "membershipStartDate": "1987-06-11",
                        "membershipEndDate": "None",
                        "membershipStatus": { "statusIsActive": true, "statusId": 0 }
                    },
                    "thumbnailUrl": "https://members-api.parliament.uk/api/Members/172/Thumbnail"
                },
                "links": [{ "rel": "self", "href": "/Members/172", "method": "GET" }]
            }],
            "totalResults": 1,
            "resultContext": "Abbott",
            "skip": 0,
            "take": 20
        }))
        .unwrap();

        let member = page.items[0].value.as_ref().unwrap();
        assert_eq!(member.name_display_as.as_deref(), Some("Ms Diane Abbott"));
        let membership = member.latest_house_membership.as_ref().unwrap();
        assert_eq!(membership.house, Some(House::Commons));
        assert_eq!(membership.membership_end_date, None);
        assert_eq!(
            membership.membership_start_date.unwrap().to_string(),
            "1987-06-11 00:00:00"
        );
        assert!(member.latest_party.as_ref().unwrap().is_independent_party);
    }

    #[test]
    fn test_unknown_house_rejected() {
        assert!(normalize::<MemberSearchParams>(json!({ "House": 3 })).is_err());
    }

    #[test]
    fn test_member_params_accept_both_spellings() {
        let by_alias: MemberSearchParams =
            normalize(json!({ "Name": "Smith", "MembershipEnded.MembershipEndedSince": "2019-12-12" }))
                .unwrap();
        let by_name: MemberSearchParams =
            normalize(json!({ "name": "Smith", "membership_ended_since": "2019-12-12T00:00:00" }))
                .unwrap();
        assert_eq!(by_alias, by_name);
    }

    #[test]
    fn test_member_params_wire() {
        let params = MemberSearchParams {
            house: Some(House::Lords),
            is_current_member: Some(true),
            membership_end_reason_ids: Some(vec![1, 4]),
            ..MemberSearchParams::default()
        };

        let pairs = to_query(&params).unwrap();
        assert!(pairs.contains(&("House".into(), "2".into())));
        assert!(pairs.contains(&("IsCurrentMember".into(), "true".into())));
        assert!(pairs.contains(&("MembershipEnded.MembershipEndReasonIds".into(), "4".into())));
        assert!(pairs.contains(&("Take".into(), "20".into())));

        let by_name = params
            .to_wire(WireOptions {
                by_alias: false,
                exclude_absent: true,
            })
            .unwrap();
        assert_eq!(by_name.get("house"), Some(&json!(2)));
    }

    #[test]
    fn test_take_bounds() {
        assert!(normalize::<MemberSearchParams>(json!({ "Take": 20 })).is_ok());
        assert!(normalize::<MemberSearchParams>(json!({ "Take": 21 })).is_err());
    }

    #[test]
    fn test_lords_register_include_deleted_lowercase() {
        let params: LordsInterestsRegisterParams = normalize(json!({ "searchTerm": "May" })).unwrap();
        let pairs = to_query(&params).unwrap();
        assert!(pairs.contains(&("searchTerm".into(), "May".into())));
        assert!(pairs.contains(&("includeDeleted".into(), "false".into())));
        assert!(!pairs.iter().any(|(k, _)| k == "page"));
    }

    #[test]
    fn test_recursive_registered_interests() {
        let page: LordsInterestsSearchResult = normalize(json!({
            "items": [{
                "value": {
                    "member": { "id": 3898 },
                    "interestCategories": [{
                        "id": 1,
                        "name": "Category 1: Directorships",
                        "interests": [{
                            "id": 10,
                            "interest": "Director, Example Ltd",
                            "createdWhen": "2020-01-01",
                            "childInterests": [{
                                "id": 11,
                                "interest": "Payment",
                                "childInterests": [{ "id": 12, "interest": "Nested" }]
                            }]
                        }]
                    }]
                }
            }],
            "totalResults": 1,
            "skip": 0,
            "take": 20
        }))
        .unwrap();

        let interests = page.items[0].value.as_ref().unwrap().interest_categories.as_ref().unwrap()[0]
            .interests
            .as_ref()
            .unwrap();
        let child = &interests[0].child_interests.as_ref().unwrap()[0];
        assert_eq!(child.child_interests.as_ref().unwrap()[0].id, 12);
    }
}
