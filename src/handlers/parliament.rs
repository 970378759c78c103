//! Parliamentary interests and members tools.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};

use super::{optional_params, record_call, required_params};
use crate::error::Result;
use crate::schema::interests::{
    CategorySearchResult, InterestSearchResult, InterestsParams, PagingParams,
};
use crate::schema::members::{
    ContributionSearchResult, ContributionSummaryParams, LordsInterestsRegisterParams,
    LordsInterestsSearchResult, LordsInterestsStaffParams, LordsStaffSearchResult,
    MemberSearchParams, MemberSearchResult,
};
use crate::state::AppState;

/// POST /tools/get_interests - Published Commons register of interests.
pub async fn get_interests_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<InterestSearchResult>> {
    record_call("get_interests");
    let params: Option<InterestsParams> = optional_params(&body)?;
    let response = state.parliament.get_interests(params.as_ref()).await?;
    tracing::info!(
        items = response.len(),
        total_results = response.total_results,
        "Interests fetched"
    );
    Ok(Json(response))
}

pub async fn get_lords_interests_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<LordsInterestsSearchResult>> {
    record_call("get_lords_interests");
    let params: Option<LordsInterestsRegisterParams> = optional_params(&body)?;
    let response = state.parliament.get_lords_interests(params.as_ref()).await?;
    tracing::info!(items = response.len(), "Lords interests fetched");
    Ok(Json(response))
}

pub async fn get_lords_staff_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<LordsStaffSearchResult>> {
    record_call("get_lords_staff");
    let params: Option<LordsInterestsStaffParams> = optional_params(&body)?;
    let response = state.parliament.get_lords_staff(params.as_ref()).await?;
    tracing::info!(items = response.len(), "Lords staff fetched");
    Ok(Json(response))
}

pub async fn get_members_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<MemberSearchResult>> {
    record_call("get_members");
    let params: Option<MemberSearchParams> = optional_params(&body)?;
    let response = state.parliament.search_members(params.as_ref()).await?;
    tracing::info!(
        items = response.len(),
        total_results = response.total_results,
        "Members fetched"
    );
    Ok(Json(response))
}

pub async fn get_categories_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<CategorySearchResult>> {
    record_call("get_categories");
    let params: Option<PagingParams> = optional_params(&body)?;
    let response = state.parliament.get_categories(params.as_ref()).await?;
    Ok(Json(response))
}

/// POST /tools/get_member_contribution_summary
///
/// Returns as soon as the summary is fetched. Every debate on the page is
/// queued for background indexing.
pub async fn get_contribution_summary_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ContributionSearchResult>> {
    record_call("get_member_contribution_summary");
    let params: ContributionSummaryParams = required_params(&body)?;
    let response = state
        .parliament
        .get_member_contribution_summary(&params)
        .await?;

    let ext_ids = response
        .items
        .iter()
        .filter_map(|item| item.value.as_ref())
        .filter_map(|contribution| contribution.debate_website_id.clone());

    match state.index_queue.enqueue(ext_ids) {
        Some(ticket) => tracing::info!(
            member_id = params.member_id,
            job_id = %ticket.job_id,
            "Contribution debates queued for indexing"
        ),
        None => tracing::debug!(member_id = params.member_id, "Nothing queued for indexing"),
    }

    Ok(Json(response))
}
