//! Parliamentary interests, members and Hansard client. No credentials.

use std::sync::Arc;

use super::{endpoint, HttpRequest, HttpTransport, RetryPolicy, Upstream};
use crate::config::Config;
use crate::error::{Result, ValidationError};
use crate::schema::debates::Debate;
use crate::schema::interests::{
    CategorySearchResult, InterestSearchResult, InterestsParams, PagingParams,
};
use crate::schema::members::{
    ContributionSearchResult, ContributionSummaryParams, LordsInterestsRegisterParams,
    LordsInterestsSearchResult, LordsInterestsStaffParams, LordsStaffSearchResult,
    MemberSearchParams, MemberSearchResult,
};
use crate::schema::{check_required_text, to_query, Validate, WireFields};

#[derive(Debug, Clone)]
pub struct ParliamentUrls {
    pub interests: String,
    pub members: String,
    pub hansard: String,
}

impl ParliamentUrls {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interests: config.interests_base_url.clone(),
            members: config.members_base_url.clone(),
            hansard: config.hansard_base_url.clone(),
        }
    }
}

#[derive(Clone)]
pub struct ParliamentClient {
    upstream: Upstream,
    urls: ParliamentUrls,
}

impl ParliamentClient {
    pub fn new(transport: Arc<dyn HttpTransport>, policy: RetryPolicy, urls: ParliamentUrls) -> Self {
        Self {
            upstream: Upstream::new(transport, policy),
            urls,
        }
    }

    /// Request for `base/path`, with `params` as the query when present.
    fn request<P: WireFields + Validate>(
        base: &str,
        path: &str,
        params: Option<&P>,
    ) -> Result<HttpRequest> {
        let request = HttpRequest::get(endpoint(base, path));
        match params {
            Some(params) => {
                params.validate()?;
                Ok(request.with_query(to_query(params)?))
            }
            None => Ok(request),
        }
    }

    pub async fn get_interests(
        &self,
        params: Option<&InterestsParams>,
    ) -> Result<InterestSearchResult> {
        let request = Self::request(&self.urls.interests, "Interests", params)?;
        self.upstream.fetch(request).await
    }

    pub async fn get_categories(
        &self,
        params: Option<&PagingParams>,
    ) -> Result<CategorySearchResult> {
        let request = Self::request(&self.urls.interests, "Categories", params)?;
        self.upstream.fetch(request).await
    }

    pub async fn search_members(
        &self,
        params: Option<&MemberSearchParams>,
    ) -> Result<MemberSearchResult> {
        let request = Self::request(&self.urls.members, "Members/Search", params)?;
        self.upstream.fetch(request).await
    }

    pub async fn get_lords_interests(
        &self,
        params: Option<&LordsInterestsRegisterParams>,
    ) -> Result<LordsInterestsSearchResult> {
        let request = Self::request(&self.urls.members, "LordsInterests/Register", params)?;
        self.upstream.fetch(request).await
    }

    pub async fn get_lords_staff(
        &self,
        params: Option<&LordsInterestsStaffParams>,
    ) -> Result<LordsStaffSearchResult> {
        let request = Self::request(&self.urls.members, "LordsInterests/Staff", params)?;
        self.upstream.fetch(request).await
    }

    /// The member id goes in the path. `page` is only sent when non-zero.
    pub async fn get_member_contribution_summary(
        &self,
        params: &ContributionSummaryParams,
    ) -> Result<ContributionSearchResult> {
        params.validate()?;
        let path = format!("Members/{}/ContributionSummary", params.member_id);
        let mut request = HttpRequest::get(endpoint(&self.urls.members, &path));
        if let Some(page) = params.page.filter(|page| *page > 0) {
            request = request.with_query(vec![("page".to_string(), page.to_string())]);
        }
        self.upstream.fetch(request).await
    }

    pub async fn get_debate(&self, ext_id: &str) -> Result<Debate> {
        validate_ext_id(ext_id)?;
        let path = format!("Debates/Debate/{}.json", ext_id.trim());
        let request = HttpRequest::get(endpoint(&self.urls.hansard, &path));
        self.upstream.fetch(request).await
    }
}

/// External ids are interpolated into the path, so only id characters pass.
fn validate_ext_id(ext_id: &str) -> std::result::Result<(), ValidationError> {
    check_required_text("debateId", ext_id)?;
    let ok = ext_id
        .trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !ok {
        return Err(ValidationError::InvalidValue {
            field: "debateId",
            message: format!("{ext_id:?} is not a debate external id"),
        });
    }
    Ok(())
}
